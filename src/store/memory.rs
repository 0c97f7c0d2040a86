use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::{BotNameSource, NameTables, Store};
use crate::error::{StoreError, StoreResult};
use crate::types::*;

/// In-memory store. Used by tests and by `--memory` runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    images: RwLock<BTreeMap<ImageId, Image>>,
    seen: RwLock<HashMap<Username, HashSet<ImageId>>>,
    daily_records: RwLock<HashMap<(Username, String), DailyChallengeRecord>>,
    progress: RwLock<HashMap<(Username, String), ProgressSnapshot>>,
    avatars: RwLock<HashMap<Username, Vec<String>>>,
    name_tables: RwLock<NameTables>,
    /// When set, every write fails with `StoreError::Unavailable`
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            name_tables: RwLock::new(NameTables::defaults()),
            ..Default::default()
        }
    }

    pub fn with_images(images: Vec<Image>) -> Self {
        let mut store = Self::new();
        store.images = RwLock::new(images.into_iter().map(|i| (i.id.clone(), i)).collect());
        store
    }

    pub async fn set_name_tables(&self, tables: NameTables) {
        *self.name_tables.write().await = tables;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Drop an image, e.g. to simulate a manifest reload removing it
    pub async fn remove_image(&self, id: &str) -> Option<Image> {
        self.images.write().await.remove(id)
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl BotNameSource for MemoryStore {
    async fn load_name_tables(&self) -> StoreResult<NameTables> {
        Ok(self.name_tables.read().await.clone())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_image(&self, id: &str) -> StoreResult<Option<Image>> {
        Ok(self.images.read().await.get(id).cloned())
    }

    async fn list_images(&self) -> StoreResult<Vec<Image>> {
        Ok(self.images.read().await.values().cloned().collect())
    }

    async fn upsert_images(&self, images: &[Image]) -> StoreResult<()> {
        self.check_writable()?;
        let mut stored = self.images.write().await;
        for image in images {
            stored.insert(image.id.clone(), image.clone());
        }
        Ok(())
    }

    async fn seen_image_ids(&self, username: &str) -> StoreResult<HashSet<ImageId>> {
        Ok(self
            .seen
            .read()
            .await
            .get(username)
            .cloned()
            .unwrap_or_default())
    }

    async fn mark_images_seen(&self, username: &str, image_ids: &[ImageId]) -> StoreResult<()> {
        self.check_writable()?;
        self.seen
            .write()
            .await
            .entry(username.to_string())
            .or_default()
            .extend(image_ids.iter().cloned());
        Ok(())
    }

    async fn daily_record(
        &self,
        username: &str,
        date: &str,
    ) -> StoreResult<Option<DailyChallengeRecord>> {
        Ok(self
            .daily_records
            .read()
            .await
            .get(&(username.to_string(), date.to_string()))
            .cloned())
    }

    async fn save_daily_record(&self, record: &DailyChallengeRecord) -> StoreResult<()> {
        self.check_writable()?;
        self.daily_records.write().await.insert(
            (record.username.clone(), record.date.clone()),
            record.clone(),
        );
        Ok(())
    }

    async fn progress(&self, username: &str, date: &str) -> StoreResult<Option<ProgressSnapshot>> {
        Ok(self
            .progress
            .read()
            .await
            .get(&(username.to_string(), date.to_string()))
            .cloned())
    }

    async fn save_progress(&self, snapshot: &ProgressSnapshot) -> StoreResult<()> {
        self.check_writable()?;
        self.progress.write().await.insert(
            (snapshot.username.clone(), snapshot.date.clone()),
            snapshot.clone(),
        );
        Ok(())
    }

    async fn award_avatar(&self, username: &str, avatar: &str) -> StoreResult<()> {
        self.check_writable()?;
        let mut avatars = self.avatars.write().await;
        let owned = avatars.entry(username.to_string()).or_default();
        if !owned.iter().any(|a| a == avatar) {
            owned.push(avatar.to_string());
        }
        Ok(())
    }

    async fn avatars(&self, username: &str) -> StoreResult<Vec<String>> {
        Ok(self
            .avatars
            .read()
            .await
            .get(username)
            .cloned()
            .unwrap_or_default())
    }
}
