//! Typed shapes for the persisted collections

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-user display preferences
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Preferences {
    pub theme: String,
    pub notifications: bool,
    pub public_profile: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: "system".to_string(),
            notifications: true,
            public_profile: false,
        }
    }
}

/// Aggregate counters mirrored onto the profile
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserStats {
    pub images_generated: u32,
    pub favorite_count: u32,
    pub share_count: u32,
}

/// Owner identity's display data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub stats: UserStats,
}

impl UserProfile {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            name: name.into(),
            avatar: None,
            bio: None,
            preferences: Preferences::default(),
            stats: UserStats::default(),
        }
    }
}

/// Opaque generation settings recorded with each image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub model: String,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub quality: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub file_size: u64,
    pub dimensions: Dimensions,
    pub format: String,
}

/// One generated image as persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedImageRecord {
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub prompt: String,
    pub image_url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    pub original_image_url: String,
    pub settings: GenerationSettings,
    pub metadata: ImageMetadata,
    pub is_public: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub favorite_count: u32,
    #[serde(default)]
    pub share_count: u32,
}

/// Thin join record: a user favorited an image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteRecord {
    pub user_id: String,
    pub image_id: String,
}

/// Thin join record plus share-specific fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareRecord {
    pub user_id: String,
    pub image_id: String,
    pub share_url: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub view_count: u32,
    pub is_active: bool,
}

/// Aggregate totals for the admin surface
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemStats {
    pub total_users: usize,
    pub total_images: usize,
    pub total_shares: usize,
    pub storage_used: u64,
    pub active_users: usize,
}

/// Profile stat adjusted through the increment/decrement helpers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatField {
    ImagesGenerated,
    FavoriteCount,
    ShareCount,
}

impl StatField {
    pub fn key(&self) -> &'static str {
        match self {
            StatField::ImagesGenerated => "images_generated",
            StatField::FavoriteCount => "favorite_count",
            StatField::ShareCount => "share_count",
        }
    }
}

/// Per-image counter adjusted through dedicated operations only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageCounter {
    FavoriteCount,
    ShareCount,
}

impl ImageCounter {
    pub fn key(&self) -> &'static str {
        match self {
            ImageCounter::FavoriteCount => "favorite_count",
            ImageCounter::ShareCount => "share_count",
        }
    }
}
