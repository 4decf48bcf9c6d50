//! Unit tests for the image library over the in-memory store

use std::sync::Arc;

use insitu_studio::config::Settings;
use insitu_studio::error::AppError;
use insitu_studio::library::{Collections, ImageLibrary, Stored};
use insitu_studio::store::records::{
    Dimensions, GeneratedImageRecord, GenerationSettings, ImageMetadata,
};
use insitu_studio::store::{DiskFileStore, MemoryStore};

fn library() -> ImageLibrary {
    let settings = Settings::default();
    ImageLibrary::new(
        Arc::new(MemoryStore::new()),
        Arc::new(DiskFileStore::new(
            std::env::temp_dir().join("insitu-library-tests"),
            "http://localhost/images",
        )),
        Collections::from(&settings.persistence),
    )
}

fn record(user_id: &str, title: &str, is_public: bool) -> GeneratedImageRecord {
    GeneratedImageRecord {
        user_id: user_id.to_string(),
        title: title.to_string(),
        description: None,
        prompt: format!("{} scene", title),
        image_url: "data:image/png;base64,aW1n".to_string(),
        thumbnail_url: None,
        original_image_url: String::new(),
        settings: GenerationSettings {
            model: "test-model".to_string(),
            style: None,
            quality: Some("standard".to_string()),
            size: Some("auto".to_string()),
        },
        metadata: ImageMetadata {
            file_size: 3,
            dimensions: Dimensions {
                width: 1024,
                height: 1024,
            },
            format: "png".to_string(),
        },
        is_public,
        tags: vec![title.to_lowercase()],
        favorite_count: 0,
        share_count: 0,
    }
}

async fn seed_user(library: &ImageLibrary, user_id: &str) {
    library
        .ensure_user_profile(user_id, &format!("{}@example.com", user_id), user_id)
        .await
        .unwrap();
}

async fn seed_image(
    library: &ImageLibrary,
    user_id: &str,
    title: &str,
    is_public: bool,
) -> Stored<GeneratedImageRecord> {
    library
        .save_generated_image(&record(user_id, title, is_public))
        .await
        .unwrap()
}

#[tokio::test]
async fn ensure_profile_is_idempotent() {
    let library = library();
    let first = library
        .ensure_user_profile("u1", "u1@example.com", "One")
        .await
        .unwrap();
    let second = library
        .ensure_user_profile("u1", "changed@example.com", "Changed")
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.record.email, "u1@example.com");
}

#[tokio::test]
async fn saving_an_image_bumps_the_owner_stat() {
    let library = library();
    seed_user(&library, "u1").await;

    seed_image(&library, "u1", "Lamp", false).await;
    seed_image(&library, "u1", "Chair", false).await;

    let profile = library.get_user_profile("u1").await.unwrap().unwrap();
    assert_eq!(profile.record.stats.images_generated, 2);
}

#[tokio::test]
async fn favorite_flow_adjusts_both_counters() {
    let library = library();
    seed_user(&library, "owner").await;
    seed_user(&library, "fan").await;
    let image = seed_image(&library, "owner", "Lamp", true).await;

    library.add_favorite("fan", &image.id).await.unwrap();
    assert!(library.is_favorited("fan", &image.id).await.unwrap());

    let stored = library.get_image(&image.id).await.unwrap().unwrap();
    assert_eq!(stored.record.favorite_count, 1);
    let fan = library.get_user_profile("fan").await.unwrap().unwrap();
    assert_eq!(fan.record.stats.favorite_count, 1);

    let favorites = library.get_user_favorites("fan", 10, 0).await.unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].id, image.id);

    library.remove_favorite("fan", &image.id).await.unwrap();
    assert!(!library.is_favorited("fan", &image.id).await.unwrap());
    let stored = library.get_image(&image.id).await.unwrap().unwrap();
    assert_eq!(stored.record.favorite_count, 0);
}

#[tokio::test]
async fn removing_a_missing_favorite_clamps_at_zero() {
    let library = library();
    seed_user(&library, "fan").await;
    seed_user(&library, "owner").await;
    let image = seed_image(&library, "owner", "Lamp", true).await;

    // Nothing to remove: counters stay untouched at zero.
    library.remove_favorite("fan", &image.id).await.unwrap();
    let stored = library.get_image(&image.id).await.unwrap().unwrap();
    assert_eq!(stored.record.favorite_count, 0);
    let fan = library.get_user_profile("fan").await.unwrap().unwrap();
    assert_eq!(fan.record.stats.favorite_count, 0);
}

#[tokio::test]
async fn share_flow_creates_a_resolvable_link() {
    let library = library();
    seed_user(&library, "u1").await;
    let image = seed_image(&library, "u1", "Lamp", true).await;

    let share = library.create_share("u1", &image.id, None).await.unwrap();
    assert!(share.record.share_url.starts_with("share/"));
    assert!(share.record.is_active);
    assert_eq!(share.record.view_count, 0);

    let resolved = library
        .get_share_by_url(&share.record.share_url)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(resolved.id, share.id);

    library.record_share_view(&share.id).await.unwrap();
    library.record_share_view(&share.id).await.unwrap();
    let resolved = library
        .get_share_by_url(&share.record.share_url)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(resolved.record.view_count, 2);

    let stored = library.get_image(&image.id).await.unwrap().unwrap();
    assert_eq!(stored.record.share_count, 1);
}

#[tokio::test]
async fn delete_requires_ownership() {
    let library = library();
    seed_user(&library, "owner").await;
    let image = seed_image(&library, "owner", "Lamp", false).await;

    let err = library.delete_image(&image.id, "intruder").await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
    assert!(library.get_image(&image.id).await.unwrap().is_some());

    library.delete_image(&image.id, "owner").await.unwrap();
    assert!(library.get_image(&image.id).await.unwrap().is_none());
    let profile = library.get_user_profile("owner").await.unwrap().unwrap();
    assert_eq!(profile.record.stats.images_generated, 0);
}

#[tokio::test]
async fn search_is_scoped_to_public_images() {
    let library = library();
    seed_user(&library, "u1").await;
    seed_image(&library, "u1", "Copper Lamp", true).await;
    seed_image(&library, "u1", "Copper Kettle", false).await;
    seed_image(&library, "u1", "Oak Chair", true).await;

    let hits = library.search_images("copper", 10).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].record.title, "Copper Lamp");
}

#[tokio::test]
async fn search_matches_tags_and_prompt() {
    let library = library();
    seed_user(&library, "u1").await;
    seed_image(&library, "u1", "Lamp", true).await;

    // record() derives prompt "Lamp scene" and tag "lamp".
    assert_eq!(library.search_images("scene", 10).await.unwrap().len(), 1);
    assert_eq!(library.search_images("lamp", 10).await.unwrap().len(), 1);
    assert!(library.search_images("garden", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn listings_are_newest_first_and_paged() {
    let library = library();
    seed_user(&library, "u1").await;
    for title in ["One", "Two", "Three"] {
        seed_image(&library, "u1", title, true).await;
    }

    let all = library.get_user_images("u1", 10, 0).await.unwrap();
    assert_eq!(all.len(), 3);

    let page = library.get_public_images(2, 1).await.unwrap();
    assert_eq!(page.len(), 2);
}

#[tokio::test]
async fn system_stats_reflect_totals() {
    let library = library();
    seed_user(&library, "u1").await;
    seed_user(&library, "u2").await;
    let image = seed_image(&library, "u1", "Lamp", true).await;
    library.create_share("u1", &image.id, None).await.unwrap();

    let stats = library.get_system_stats().await.unwrap();
    assert_eq!(stats.total_users, 2);
    assert_eq!(stats.total_images, 1);
    assert_eq!(stats.total_shares, 1);

    let users = library.get_all_users(10, 0).await.unwrap();
    assert_eq!(users.len(), 2);
}

#[tokio::test]
async fn profile_updates_apply_patches() {
    let library = library();
    let profile = library
        .ensure_user_profile("u1", "u1@example.com", "One")
        .await
        .unwrap();

    let updated = library
        .update_profile(&profile.id, serde_json::json!({"bio": "product photographer"}))
        .await
        .unwrap();
    assert_eq!(updated.record.bio.as_deref(), Some("product photographer"));
    assert_eq!(updated.record.name, "One");
}
