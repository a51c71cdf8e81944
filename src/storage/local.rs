//! Local filesystem storage implementation.
//!
//! Each category is one JSON array in `{root}/{storage_key}.json`. Every
//! mutation reads the whole list, changes it in memory, and writes the
//! whole list back.
//!
//! ## Features
//!
//! - **Seeding**: opening the store creates `[]` for every missing category
//! - **Atomic writes**: data goes to a temp file that is renamed into place,
//!   so a failed write leaves the previous list intact
//! - **Lenient reads**: a missing or corrupt file reads as an empty list
//! - **Strict writes**: mutations refuse to rewrite a file they cannot decode

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::{Category, Document, Draft, Record};
use crate::storage::{RecordStore, by_subcategory, most_recent, search};
use crate::utils::generate_id;

/// Local filesystem storage backend.
pub struct LocalStore {
    root_dir: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl LocalStore {
    /// Open a store rooted at the given directory, seeding empty categories.
    pub async fn open(root_dir: impl Into<PathBuf>) -> Result<Self> {
        let store = Self {
            root_dir: root_dir.into(),
            write_lock: Mutex::new(()),
        };
        tokio::fs::create_dir_all(&store.root_dir).await?;

        for category in Category::ALL {
            if store.read_bytes(category).await?.is_none() {
                store.write_bytes(category, b"[]").await?;
                log::debug!("Seeded empty list for {}", category);
            }
        }

        Ok(store)
    }

    /// Get the full path for a category's list.
    fn path(&self, category: Category) -> PathBuf {
        self.root_dir.join(format!("{}.json", category.storage_key()))
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, category: Category, bytes: &[u8]) -> Result<()> {
        let path = self.path(category);

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, category: Category) -> Result<Option<Vec<u8>>> {
        let path = self.path(category);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read and decode a category's list.
    async fn load(&self, category: Category) -> Result<Vec<Record>> {
        let Some(bytes) = self.read_bytes(category).await? else {
            return Ok(Vec::new());
        };

        let docs: Vec<Document> = serde_json::from_slice(&bytes)?;
        docs.into_iter()
            .map(|doc| Record::from_document(category, doc))
            .collect()
    }

    /// Encode and write a category's full list.
    async fn save(&self, category: Category, records: &[Record]) -> Result<()> {
        let docs = records
            .iter()
            .map(|r| r.to_document().map(Value::Object))
            .collect::<Result<Vec<_>>>()?;
        let bytes = serde_json::to_vec_pretty(&docs)?;

        self.write_bytes(category, &bytes).await.inspect_err(|e| {
            log::error!("Failed to save {} items: {}", category, e);
        })
    }
}

#[async_trait]
impl RecordStore for LocalStore {
    fn backend_name(&self) -> &'static str {
        "local"
    }

    async fn get_all_items(&self, category: Category) -> Vec<Record> {
        self.load(category).await.unwrap_or_else(|e| {
            log::warn!("Error getting {} items: {}", category, e);
            Vec::new()
        })
    }

    async fn get_item(&self, category: Category, id: &str) -> Option<Record> {
        self.get_all_items(category)
            .await
            .into_iter()
            .find(|r| r.id() == id)
    }

    async fn add_item(&self, mut draft: Draft) -> Result<Record> {
        let category = draft.category();
        let _guard = self.write_lock.lock().await;

        draft.set_id(generate_id());
        let record = draft.into_record();

        let mut records = self.load(category).await?;
        records.push(record.clone());
        self.save(category, &records).await?;

        log::info!("Added {} item {}", category, record.id());
        Ok(record)
    }

    async fn update_item(&self, category: Category, id: &str, patch: Draft) -> Result<Record> {
        let _guard = self.write_lock.lock().await;

        let mut records = self.load(category).await?;
        let slot = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| AppError::not_found(category, id))?;

        let merged = slot.merged(&patch, Utc::now())?;
        *slot = merged.clone();
        self.save(category, &records).await?;

        log::info!("Updated {} item {}", category, id);
        Ok(merged)
    }

    async fn delete_item(&self, category: Category, id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut records = self.load(category).await?;
        let before = records.len();
        records.retain(|r| r.id() != id);
        self.save(category, &records).await?;

        if records.len() < before {
            log::info!("Deleted {} item {}", category, id);
        }
        Ok(())
    }

    async fn search_items(&self, category: Category, term: &str) -> Vec<Record> {
        search(self.get_all_items(category).await, term)
    }

    async fn get_items_by_category(&self, category: Category, subcategory: &str) -> Vec<Record> {
        by_subcategory(self.get_all_items(category).await, subcategory)
    }

    async fn get_recent_items(&self, category: Category, limit: usize) -> Vec<Record> {
        most_recent(self.get_all_items(category).await, limit)
    }
}
