//! Client-side style router with auth and admin gating

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::auth::AuthSession;

/// Target views the application can render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Login,
    Register,
    Dashboard,
    Gallery,
    Search,
    Profile,
    Admin,
    SharedImage,
}

/// One route: a path pattern plus required-authorization metadata.
///
/// Patterns are matched segment by segment; a `:name` segment matches any
/// single path segment and captures it as a parameter.
#[derive(Debug, Clone)]
pub struct Route {
    pub pattern: String,
    pub view: View,
    pub requires_auth: bool,
    pub admin_only: bool,
}

impl Route {
    pub fn new(pattern: impl Into<String>, view: View) -> Self {
        Self {
            pattern: pattern.into(),
            view,
            requires_auth: false,
            admin_only: false,
        }
    }

    pub fn requires_auth(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    pub fn admin_only(mut self) -> Self {
        self.admin_only = true;
        self
    }
}

/// A matched route with its captured path parameters
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: HashMap<String, String>,
}

/// First route whose pattern fits the path wins; table order is the only
/// priority.
pub fn match_route<'a>(path: &str, table: &'a [Route]) -> Option<RouteMatch<'a>> {
    let path_segments: Vec<&str> = path.split('/').collect();

    table.iter().find_map(|route| {
        let pattern_segments: Vec<&str> = route.pattern.split('/').collect();
        if pattern_segments.len() != path_segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (pattern_segment, path_segment) in pattern_segments.iter().zip(&path_segments) {
            if let Some(name) = pattern_segment.strip_prefix(':') {
                params.insert(name.to_string(), (*path_segment).to_string());
            } else if pattern_segment != path_segment {
                return None;
            }
        }
        Some(RouteMatch { route, params })
    })
}

/// Outcome of evaluating the current path against the table and the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderDecision {
    /// Render the matched route's view
    Render {
        view: View,
        params: HashMap<String, String>,
    },
    /// Route requires authentication and no identity is present
    Login,
    /// Route is admin-only and the identity lacks the admin label
    AccessDenied,
    /// No route matched
    NotFound,
}

/// Externally observable location (the host environment's address bar).
/// Pushes mirror in-app navigations; `back` delegates to the host history.
pub trait LocationSink: Send + Sync {
    fn push(&self, path: &str);
    fn back(&self);
}

/// Sink for headless use: navigation state lives only in the router
#[derive(Default)]
pub struct NullLocation;

impl LocationSink for NullLocation {
    fn push(&self, _path: &str) {}
    fn back(&self) {}
}

struct NavigationState {
    current_path: String,
    history: Vec<String>,
}

type Listener = Box<dyn Fn(&str) + Send + Sync>;

/// Router: current path, route table and history stack, consulting the auth
/// session on every render decision.
pub struct Router {
    routes: Vec<Route>,
    session: Arc<AuthSession>,
    location: Arc<dyn LocationSink>,
    state: RwLock<NavigationState>,
    listeners: RwLock<Vec<Listener>>,
}

impl Router {
    pub fn new(
        routes: Vec<Route>,
        session: Arc<AuthSession>,
        location: Arc<dyn LocationSink>,
        initial_path: impl Into<String>,
    ) -> Self {
        let initial_path = initial_path.into();
        Self {
            routes,
            session,
            location,
            state: RwLock::new(NavigationState {
                current_path: initial_path.clone(),
                history: vec![initial_path],
            }),
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub fn current_path(&self) -> String {
        self.state.read().current_path.clone()
    }

    pub fn history_len(&self) -> usize {
        self.state.read().history.len()
    }

    /// Register a listener notified after every path change
    pub fn on_navigate(&self, listener: impl Fn(&str) + Send + Sync + 'static) {
        self.listeners.write().push(Box::new(listener));
    }

    /// Navigate to a path. No-op when already there; otherwise the path is
    /// appended to history, becomes current, and is pushed to the host
    /// location so in-app and host state stay consistent.
    pub fn navigate(&self, path: &str) {
        {
            let mut state = self.state.write();
            if state.current_path == path {
                return;
            }
            state.history.push(path.to_string());
            state.current_path = path.to_string();
        }
        self.location.push(path);
        debug!(path, "Navigated");
        self.notify(path);
    }

    /// Pop the most recent history entry. A no-op with a single entry left.
    pub fn go_back(&self) {
        let previous = {
            let mut state = self.state.write();
            if state.history.len() <= 1 {
                return;
            }
            state.history.pop();
            let previous = state
                .history
                .last()
                .cloned()
                .unwrap_or_else(|| "/".to_string());
            state.current_path = previous.clone();
            previous
        };
        self.location.back();
        self.notify(&previous);
    }

    /// Resynchronize after a host-driven navigation (back/forward). Updates
    /// the current path WITHOUT pushing a history entry, so host back events
    /// do not duplicate.
    pub fn sync_external(&self, path: &str) {
        {
            let mut state = self.state.write();
            if state.current_path == path {
                return;
            }
            state.current_path = path.to_string();
        }
        self.notify(path);
    }

    /// Evaluate the render decision for the current path
    pub fn resolve(&self) -> RenderDecision {
        let path = self.current_path();
        match match_route(&path, &self.routes) {
            None => RenderDecision::NotFound,
            Some(matched) => {
                if matched.route.requires_auth && !self.session.is_authenticated() {
                    return RenderDecision::Login;
                }
                if matched.route.admin_only && !self.session.is_admin() {
                    return RenderDecision::AccessDenied;
                }
                RenderDecision::Render {
                    view: matched.route.view,
                    params: matched.params,
                }
            }
        }
    }

    fn notify(&self, path: &str) {
        for listener in self.listeners.read().iter() {
            listener(path);
        }
    }
}

/// The application's route table
pub fn default_routes() -> Vec<Route> {
    vec![
        Route::new("/", View::Home),
        Route::new("/login", View::Login),
        Route::new("/register", View::Register),
        Route::new("/dashboard", View::Dashboard).requires_auth(),
        Route::new("/gallery", View::Gallery),
        Route::new("/search", View::Search),
        Route::new("/profile", View::Profile).requires_auth(),
        Route::new("/admin", View::Admin).requires_auth().admin_only(),
        Route::new("/shared/:shareId", View::SharedImage),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Vec<Route> {
        default_routes()
    }

    #[test]
    fn test_match_literal_path() {
        let table = table();
        let matched = match_route("/gallery", &table).unwrap();
        assert_eq!(matched.route.view, View::Gallery);
        assert!(matched.params.is_empty());
    }

    #[test]
    fn test_match_requires_equal_segment_count() {
        let table = table();
        assert!(match_route("/gallery/extra", &table).is_none());
        assert!(match_route("/shared", &table).is_none());
    }

    #[test]
    fn test_placeholder_captures_segment() {
        let table = table();
        let matched = match_route("/shared/abc123", &table).unwrap();
        assert_eq!(matched.route.view, View::SharedImage);
        assert_eq!(matched.params.get("shareId").map(String::as_str), Some("abc123"));
    }

    #[test]
    fn test_first_match_wins() {
        let table = vec![
            Route::new("/items/:id", View::Gallery),
            Route::new("/items/special", View::Admin),
        ];
        let matched = match_route("/items/special", &table).unwrap();
        assert_eq!(matched.route.view, View::Gallery);
    }

    #[test]
    fn test_match_is_deterministic() {
        let table = table();
        for _ in 0..3 {
            let matched = match_route("/dashboard", &table).unwrap();
            assert_eq!(matched.route.view, View::Dashboard);
        }
        assert!(match_route("/nope", &table).is_none());
        assert!(match_route("/nope", &table).is_none());
    }
}
