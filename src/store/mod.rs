//! Persistence layer
//!
//! Handlers only talk to the `Store` and `BotNameSource` traits, so the game
//! logic runs the same against SQLite and the in-memory store used in tests.

mod memory;
mod sqlite;

use async_trait::async_trait;
use std::collections::HashSet;

use crate::error::StoreResult;
use crate::types::*;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Lookup tables for bot name generation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameTables {
    pub predefined: Vec<String>,
    pub adjectives: Vec<String>,
    pub nouns: Vec<String>,
}

/// Source of bot name lookup tables
#[async_trait]
pub trait BotNameSource: Send + Sync {
    async fn load_name_tables(&self) -> StoreResult<NameTables>;
}

/// Relational store for images and player progress
#[async_trait]
pub trait Store: BotNameSource {
    /// Look up a single image
    async fn get_image(&self, id: &str) -> StoreResult<Option<Image>>;

    /// All images, ordered by id
    async fn list_images(&self) -> StoreResult<Vec<Image>>;

    /// Insert or replace images (used when loading a manifest)
    async fn upsert_images(&self, images: &[Image]) -> StoreResult<()>;

    async fn seen_image_ids(&self, username: &str) -> StoreResult<HashSet<ImageId>>;

    async fn mark_images_seen(&self, username: &str, image_ids: &[ImageId]) -> StoreResult<()>;

    async fn daily_record(
        &self,
        username: &str,
        date: &str,
    ) -> StoreResult<Option<DailyChallengeRecord>>;

    /// Upsert keyed by (username, date)
    async fn save_daily_record(&self, record: &DailyChallengeRecord) -> StoreResult<()>;

    async fn progress(&self, username: &str, date: &str) -> StoreResult<Option<ProgressSnapshot>>;

    /// Upsert keyed by (username, date)
    async fn save_progress(&self, snapshot: &ProgressSnapshot) -> StoreResult<()>;

    async fn award_avatar(&self, username: &str, avatar: &str) -> StoreResult<()>;

    async fn avatars(&self, username: &str) -> StoreResult<Vec<String>>;
}

/// Default bot name tables, seeded into fresh databases
pub const DEFAULT_PREDEFINED_NAMES: &[&str] = &[
    "PixelPeeper",
    "Shutterbug",
    "xX_Lens_Xx",
    "marie.k",
    "TotallyHuman",
    "jonas_photo",
    "NightOwl",
    "FrameByFrame",
];

pub const DEFAULT_ADJECTIVES: &[&str] = &[
    "Sneaky", "Happy", "Curious", "Sleepy", "Brave", "Clever", "Fuzzy", "Swift",
];

pub const DEFAULT_NOUNS: &[&str] = &[
    "Panda", "Pixel", "Falcon", "Otter", "Camera", "Badger", "Comet", "Lynx",
];

impl NameTables {
    pub fn defaults() -> Self {
        Self {
            predefined: DEFAULT_PREDEFINED_NAMES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            adjectives: DEFAULT_ADJECTIVES.iter().map(|s| s.to_string()).collect(),
            nouns: DEFAULT_NOUNS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Load images from a JSON manifest (an array of `Image`) into the store
pub async fn load_manifest(store: &dyn Store, path: &str) -> StoreResult<usize> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| crate::error::StoreError::Manifest(format!("{}: {}", path, e)))?;
    let images: Vec<Image> = serde_json::from_str(&raw)
        .map_err(|e| crate::error::StoreError::Manifest(format!("{}: {}", path, e)))?;
    store.upsert_images(&images).await?;
    Ok(images.len())
}
