//! Scenario tests for navigation and gated rendering

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use insitu_studio::auth::{AuthSession, Credentials, LocalAuthProvider, RegisterData};
use insitu_studio::config::Settings;
use insitu_studio::library::{Collections, ImageLibrary};
use insitu_studio::routing::{default_routes, LocationSink, RenderDecision, Router, View};
use insitu_studio::store::{DiskFileStore, MemoryStore};

/// Records host-location traffic so tests can assert on it
#[derive(Default)]
struct RecordingLocation {
    pushes: Mutex<Vec<String>>,
    backs: AtomicUsize,
}

impl LocationSink for RecordingLocation {
    fn push(&self, path: &str) {
        self.pushes.lock().push(path.to_string());
    }

    fn back(&self) {
        self.backs.fetch_add(1, Ordering::SeqCst);
    }
}

async fn session_with(labels: Vec<String>) -> Arc<AuthSession> {
    let settings = Settings::default();
    let library = Arc::new(ImageLibrary::new(
        Arc::new(MemoryStore::new()),
        Arc::new(DiskFileStore::new(
            std::env::temp_dir().join("insitu-router-tests"),
            "http://localhost/images",
        )),
        Collections::from(&settings.persistence),
    ));

    let provider = Arc::new(LocalAuthProvider::new());
    provider.seed_account(
        &RegisterData {
            email: "user@example.com".to_string(),
            password: "pw".to_string(),
            name: "User".to_string(),
        },
        labels,
    );
    Arc::new(AuthSession::new(provider, library))
}

async fn signed_in_session(labels: Vec<String>) -> Arc<AuthSession> {
    let session = session_with(labels).await;
    session
        .login(&Credentials {
            email: "user@example.com".to_string(),
            password: "pw".to_string(),
        })
        .await
        .unwrap();
    session
}

fn router(session: Arc<AuthSession>, location: Arc<RecordingLocation>) -> Router {
    Router::new(default_routes(), session, location, "/")
}

#[tokio::test]
async fn unauthenticated_protected_route_renders_login_in_place() {
    let session = session_with(Vec::new()).await;
    let location = Arc::new(RecordingLocation::default());
    let router = router(session, location);

    router.navigate("/dashboard");
    assert_eq!(router.resolve(), RenderDecision::Login);

    // The attempted path was recorded once, with no duplicate entry.
    assert_eq!(router.current_path(), "/dashboard");
    assert_eq!(router.history_len(), 2);
}

#[tokio::test]
async fn authenticated_protected_route_renders_its_view() {
    let session = signed_in_session(Vec::new()).await;
    let location = Arc::new(RecordingLocation::default());
    let router = router(session, location);

    router.navigate("/dashboard");
    match router.resolve() {
        RenderDecision::Render { view, .. } => assert_eq!(view, View::Dashboard),
        other => panic!("expected render decision, got {:?}", other),
    }
}

#[tokio::test]
async fn admin_route_denied_without_admin_label() {
    let session = signed_in_session(Vec::new()).await;
    let location = Arc::new(RecordingLocation::default());
    let router = router(session, location);

    router.navigate("/admin");
    assert_eq!(router.resolve(), RenderDecision::AccessDenied);
}

#[tokio::test]
async fn admin_route_allowed_with_admin_label() {
    let session = signed_in_session(vec!["admin".to_string()]).await;
    let location = Arc::new(RecordingLocation::default());
    let router = router(session, location);

    router.navigate("/admin");
    match router.resolve() {
        RenderDecision::Render { view, .. } => assert_eq!(view, View::Admin),
        other => panic!("expected render decision, got {:?}", other),
    }
}

#[tokio::test]
async fn unmatched_path_renders_fallback() {
    let session = session_with(Vec::new()).await;
    let location = Arc::new(RecordingLocation::default());
    let router = router(session, location);

    router.navigate("/no/such/page");
    assert_eq!(router.resolve(), RenderDecision::NotFound);
}

#[tokio::test]
async fn navigate_to_current_path_is_a_no_op() {
    let session = session_with(Vec::new()).await;
    let location = Arc::new(RecordingLocation::default());
    let router = router(session, location.clone());

    router.navigate("/gallery");
    router.navigate("/gallery");

    assert_eq!(router.history_len(), 2);
    assert_eq!(location.pushes.lock().len(), 1);
}

#[tokio::test]
async fn go_back_restores_previous_path_and_delegates_to_host() {
    let session = session_with(Vec::new()).await;
    let location = Arc::new(RecordingLocation::default());
    let router = router(session, location.clone());

    router.navigate("/gallery");
    router.navigate("/search");
    router.go_back();

    assert_eq!(router.current_path(), "/gallery");
    assert_eq!(router.history_len(), 2);
    assert_eq!(location.backs.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn go_back_with_single_entry_is_a_no_op() {
    let session = session_with(Vec::new()).await;
    let location = Arc::new(RecordingLocation::default());
    let router = router(session, location.clone());

    router.go_back();

    assert_eq!(router.current_path(), "/");
    assert_eq!(router.history_len(), 1);
    assert_eq!(location.backs.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn external_navigation_does_not_push_history() {
    let session = session_with(Vec::new()).await;
    let location = Arc::new(RecordingLocation::default());
    let router = router(session, location.clone());

    router.navigate("/gallery");
    let before = router.history_len();

    // Host back/forward signal: current path changes, history does not grow.
    router.sync_external("/");
    assert_eq!(router.current_path(), "/");
    assert_eq!(router.history_len(), before);
    assert_eq!(location.pushes.lock().len(), 1);
}

#[tokio::test]
async fn listeners_fire_on_every_navigation() {
    let session = session_with(Vec::new()).await;
    let location = Arc::new(RecordingLocation::default());
    let router = router(session, location);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    router.on_navigate(move |path| sink.lock().push(path.to_string()));

    router.navigate("/gallery");
    router.sync_external("/search");
    router.go_back();

    assert_eq!(
        seen.lock().clone(),
        vec!["/gallery".to_string(), "/search".to_string(), "/".to_string()]
    );
}

#[tokio::test]
async fn dynamic_segment_params_reach_the_render_decision() {
    let session = session_with(Vec::new()).await;
    let location = Arc::new(RecordingLocation::default());
    let router = router(session, location);

    router.navigate("/shared/tok-123");
    match router.resolve() {
        RenderDecision::Render { view, params } => {
            assert_eq!(view, View::SharedImage);
            assert_eq!(params.get("shareId").map(String::as_str), Some("tok-123"));
        }
        other => panic!("expected render decision, got {:?}", other),
    }
}
