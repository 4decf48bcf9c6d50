//! Image library: profiles, generated images, favorites and shares over the
//! document/file store collaborators.
//!
//! Counter maintenance is read-modify-write against the store; the store
//! contract has no atomic increment, so concurrent adjustments from two
//! sessions can lose updates. Decrements clamp at zero.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use crate::config::PersistenceConfig;
use crate::error::{AppError, Result};
use crate::store::records::{
    FavoriteRecord, GeneratedImageRecord, ImageCounter, ShareRecord, StatField, SystemStats,
    UserProfile, UserStats,
};
use crate::store::traits::{Document, DocumentStore, FileStore, Query};

/// Collection names for the persisted state layout
#[derive(Debug, Clone)]
pub struct Collections {
    pub users: String,
    pub images: String,
    pub favorites: String,
    pub shares: String,
}

impl From<&PersistenceConfig> for Collections {
    fn from(config: &PersistenceConfig) -> Self {
        Self {
            users: config.users_collection.clone(),
            images: config.images_collection.clone(),
            favorites: config.favorites_collection.clone(),
            shares: config.shares_collection.clone(),
        }
    }
}

/// A typed record together with its store identity
#[derive(Debug, Clone)]
pub struct Stored<T> {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub record: T,
}

fn typed<T: DeserializeOwned>(document: &Document) -> Result<Stored<T>> {
    Ok(Stored {
        id: document.id.clone(),
        created_at: document.created_at,
        record: document.parse()?,
    })
}

fn typed_page<T: DeserializeOwned>(documents: &[Document]) -> Result<Vec<Stored<T>>> {
    documents.iter().map(typed).collect()
}

/// Service over the persistence collaborators
pub struct ImageLibrary {
    documents: Arc<dyn DocumentStore>,
    files: Arc<dyn FileStore>,
    collections: Collections,
}

impl ImageLibrary {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        files: Arc<dyn FileStore>,
        collections: Collections,
    ) -> Self {
        Self {
            documents,
            files,
            collections,
        }
    }

    // --- User profiles ---

    /// Fetch a profile by owner identity, creating it on first sign-in.
    pub async fn ensure_user_profile(
        &self,
        user_id: &str,
        email: &str,
        name: &str,
    ) -> Result<Stored<UserProfile>> {
        if let Some(existing) = self.get_user_profile(user_id).await? {
            return Ok(existing);
        }

        let profile = UserProfile::new(user_id, email, name);
        let document = self
            .documents
            .create(&self.collections.users, serde_json::to_value(&profile)?)
            .await?;
        debug!(user_id, "Created user profile");
        typed(&document)
    }

    pub async fn get_user_profile(&self, user_id: &str) -> Result<Option<Stored<UserProfile>>> {
        let page = self
            .documents
            .list(
                &self.collections.users,
                &Query::new().equal("user_id", user_id).limit(1),
            )
            .await?;
        page.documents.first().map(typed).transpose()
    }

    /// Apply a profile edit (name, bio, preferences, ...)
    pub async fn update_profile(
        &self,
        profile_id: &str,
        patch: Value,
    ) -> Result<Stored<UserProfile>> {
        let document = self
            .documents
            .update(&self.collections.users, profile_id, patch)
            .await?;
        typed(&document)
    }

    /// Store an avatar image and point the profile at its URL
    pub async fn upload_avatar(&self, user_id: &str, bytes: &[u8]) -> Result<String> {
        let stored = self.files.save(bytes).await?;

        if let Some(profile) = self.get_user_profile(user_id).await? {
            self.update_profile(&profile.id, json!({"avatar": stored.url}))
                .await?;
        }
        Ok(stored.url)
    }

    // --- Generated images ---

    /// Persist one generated image and bump the owner's generation counter.
    pub async fn save_generated_image(
        &self,
        record: &GeneratedImageRecord,
    ) -> Result<Stored<GeneratedImageRecord>> {
        let document = self
            .documents
            .create(&self.collections.images, serde_json::to_value(record)?)
            .await?;

        self.increment_user_stat(&record.user_id, StatField::ImagesGenerated)
            .await?;

        typed(&document)
    }

    pub async fn get_user_images(
        &self,
        user_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Stored<GeneratedImageRecord>>> {
        let page = self
            .documents
            .list(
                &self.collections.images,
                &Query::new()
                    .equal("user_id", user_id)
                    .newest_first()
                    .limit(limit)
                    .offset(offset),
            )
            .await?;
        typed_page(&page.documents)
    }

    pub async fn get_public_images(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Stored<GeneratedImageRecord>>> {
        let page = self
            .documents
            .list(
                &self.collections.images,
                &Query::new()
                    .equal("is_public", true)
                    .newest_first()
                    .limit(limit)
                    .offset(offset),
            )
            .await?;
        typed_page(&page.documents)
    }

    pub async fn get_image(&self, image_id: &str) -> Result<Option<Stored<GeneratedImageRecord>>> {
        let document = self.documents.get(&self.collections.images, image_id).await?;
        document.as_ref().map(typed).transpose()
    }

    pub async fn update_image(
        &self,
        image_id: &str,
        patch: Value,
    ) -> Result<Stored<GeneratedImageRecord>> {
        let document = self
            .documents
            .update(&self.collections.images, image_id, patch)
            .await?;
        typed(&document)
    }

    /// Delete an image after verifying ownership, adjusting the owner's stat.
    pub async fn delete_image(&self, image_id: &str, user_id: &str) -> Result<()> {
        let image = self
            .get_image(image_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("image '{}'", image_id)))?;

        if image.record.user_id != user_id {
            return Err(AppError::Unauthorized(format!(
                "image '{}' is not owned by '{}'",
                image_id, user_id
            )));
        }

        self.documents
            .delete(&self.collections.images, image_id)
            .await?;
        self.decrement_user_stat(user_id, StatField::ImagesGenerated)
            .await?;
        Ok(())
    }

    // --- Favorites ---

    pub async fn add_favorite(
        &self,
        user_id: &str,
        image_id: &str,
    ) -> Result<Stored<FavoriteRecord>> {
        let favorite = FavoriteRecord {
            user_id: user_id.to_string(),
            image_id: image_id.to_string(),
        };
        let document = self
            .documents
            .create(&self.collections.favorites, serde_json::to_value(&favorite)?)
            .await?;

        self.increment_image_counter(image_id, ImageCounter::FavoriteCount)
            .await?;
        self.increment_user_stat(user_id, StatField::FavoriteCount)
            .await?;

        typed(&document)
    }

    pub async fn remove_favorite(&self, user_id: &str, image_id: &str) -> Result<()> {
        let page = self
            .documents
            .list(
                &self.collections.favorites,
                &Query::new()
                    .equal("user_id", user_id)
                    .equal("image_id", image_id)
                    .limit(1),
            )
            .await?;

        if let Some(favorite) = page.documents.first() {
            self.documents
                .delete(&self.collections.favorites, &favorite.id)
                .await?;
            self.decrement_image_counter(image_id, ImageCounter::FavoriteCount)
                .await?;
            self.decrement_user_stat(user_id, StatField::FavoriteCount)
                .await?;
        }
        Ok(())
    }

    pub async fn is_favorited(&self, user_id: &str, image_id: &str) -> Result<bool> {
        let page = self
            .documents
            .list(
                &self.collections.favorites,
                &Query::new()
                    .equal("user_id", user_id)
                    .equal("image_id", image_id)
                    .limit(1),
            )
            .await?;
        Ok(page.total > 0)
    }

    /// The user's favorited images, newest favorite first.
    pub async fn get_user_favorites(
        &self,
        user_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Stored<GeneratedImageRecord>>> {
        let favorites = self
            .documents
            .list(
                &self.collections.favorites,
                &Query::new()
                    .equal("user_id", user_id)
                    .newest_first()
                    .limit(limit)
                    .offset(offset),
            )
            .await?;

        let image_ids: Vec<Value> = favorites
            .documents
            .iter()
            .map(|favorite| {
                favorite
                    .parse::<FavoriteRecord>()
                    .map(|record| Value::from(record.image_id))
            })
            .collect::<Result<_>>()?;
        if image_ids.is_empty() {
            return Ok(Vec::new());
        }

        let images = self
            .documents
            .list(
                &self.collections.images,
                &Query::new().any_of("$id", image_ids),
            )
            .await?;
        typed_page(&images.documents)
    }

    // --- Shares ---

    pub async fn create_share(
        &self,
        user_id: &str,
        image_id: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Stored<ShareRecord>> {
        let share = ShareRecord {
            user_id: user_id.to_string(),
            image_id: image_id.to_string(),
            share_url: format!("share/{}", Uuid::new_v4()),
            expires_at,
            view_count: 0,
            is_active: true,
        };
        let document = self
            .documents
            .create(&self.collections.shares, serde_json::to_value(&share)?)
            .await?;

        self.increment_image_counter(image_id, ImageCounter::ShareCount)
            .await?;
        self.increment_user_stat(user_id, StatField::ShareCount)
            .await?;

        typed(&document)
    }

    pub async fn get_share_by_url(&self, share_url: &str) -> Result<Option<Stored<ShareRecord>>> {
        let page = self
            .documents
            .list(
                &self.collections.shares,
                &Query::new().equal("share_url", share_url).limit(1),
            )
            .await?;
        page.documents.first().map(typed).transpose()
    }

    pub async fn record_share_view(&self, share_id: &str) -> Result<()> {
        let document = self
            .documents
            .get(&self.collections.shares, share_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("share '{}'", share_id)))?;

        let share: ShareRecord = document.parse()?;
        self.documents
            .update(
                &self.collections.shares,
                share_id,
                json!({"view_count": share.view_count + 1}),
            )
            .await?;
        Ok(())
    }

    // --- Search ---

    /// Text search over public images: title, description, prompt and tags.
    pub async fn search_images(
        &self,
        text: &str,
        limit: usize,
    ) -> Result<Vec<Stored<GeneratedImageRecord>>> {
        let mut results: Vec<Stored<GeneratedImageRecord>> = Vec::new();

        for field in ["title", "description", "prompt", "tags"] {
            let page = self
                .documents
                .list(
                    &self.collections.images,
                    &Query::new()
                        .equal("is_public", true)
                        .contains(field, text)
                        .limit(limit),
                )
                .await?;

            for document in &page.documents {
                if !results.iter().any(|r| r.id == document.id) {
                    results.push(typed(document)?);
                }
            }
            if results.len() >= limit {
                break;
            }
        }

        results.truncate(limit);
        Ok(results)
    }

    // --- Admin ---

    pub async fn get_all_users(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Stored<UserProfile>>> {
        let page = self
            .documents
            .list(
                &self.collections.users,
                &Query::new().newest_first().limit(limit).offset(offset),
            )
            .await?;
        typed_page(&page.documents)
    }

    pub async fn get_system_stats(&self) -> Result<SystemStats> {
        let users = self
            .documents
            .list(&self.collections.users, &Query::new().limit(1))
            .await?;
        let images = self
            .documents
            .list(&self.collections.images, &Query::new().limit(1))
            .await?;
        let shares = self
            .documents
            .list(&self.collections.shares, &Query::new().limit(1))
            .await?;

        Ok(SystemStats {
            total_users: users.total,
            total_images: images.total,
            total_shares: shares.total,
            storage_used: 0,
            active_users: 0,
        })
    }

    // --- Counter helpers (read-modify-write, decrements clamp at zero) ---

    async fn increment_user_stat(&self, user_id: &str, stat: StatField) -> Result<()> {
        self.adjust_user_stat(user_id, stat, 1).await
    }

    async fn decrement_user_stat(&self, user_id: &str, stat: StatField) -> Result<()> {
        self.adjust_user_stat(user_id, stat, -1).await
    }

    async fn adjust_user_stat(&self, user_id: &str, stat: StatField, delta: i64) -> Result<()> {
        let Some(profile) = self.get_user_profile(user_id).await? else {
            return Ok(());
        };

        let mut stats: UserStats = profile.record.stats;
        let slot = match stat {
            StatField::ImagesGenerated => &mut stats.images_generated,
            StatField::FavoriteCount => &mut stats.favorite_count,
            StatField::ShareCount => &mut stats.share_count,
        };
        *slot = (*slot as i64 + delta).max(0) as u32;

        self.documents
            .update(
                &self.collections.users,
                &profile.id,
                json!({"stats": serde_json::to_value(&stats)?}),
            )
            .await?;
        Ok(())
    }

    async fn increment_image_counter(&self, image_id: &str, counter: ImageCounter) -> Result<()> {
        self.adjust_image_counter(image_id, counter, 1).await
    }

    async fn decrement_image_counter(&self, image_id: &str, counter: ImageCounter) -> Result<()> {
        self.adjust_image_counter(image_id, counter, -1).await
    }

    async fn adjust_image_counter(
        &self,
        image_id: &str,
        counter: ImageCounter,
        delta: i64,
    ) -> Result<()> {
        let Some(image) = self.get_image(image_id).await? else {
            return Ok(());
        };

        let current = match counter {
            ImageCounter::FavoriteCount => image.record.favorite_count,
            ImageCounter::ShareCount => image.record.share_count,
        };
        let next = (current as i64 + delta).max(0) as u32;

        self.documents
            .update(
                &self.collections.images,
                image_id,
                json!({ counter.key(): next }),
            )
            .await?;
        Ok(())
    }
}
