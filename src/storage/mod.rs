//! Storage abstractions for portal records.
//!
//! Two interchangeable backends implement [`RecordStore`]:
//! - [`LocalStore`]: one JSON list per category in a local directory
//! - [`RemoteStore`]: one Firestore collection per category over REST
//!
//! ## Local layout
//!
//! ```text
//! {root}/
//! ├── localhub_lost_and_found.json
//! ├── localhub_carpool.json
//! ├── localhub_updates.json
//! ├── localhub_education.json
//! ├── localhub_business.json
//! ├── localhub_phone_book.json
//! └── localhub_sell.json
//! ```
//!
//! Mutations surface failures to the caller. Reads never do: they log and
//! return an empty result so a listing can still render.

pub mod document;
pub mod local;
pub mod remote;

use std::sync::Arc;

use async_trait::async_trait;
use futures::future;

use crate::error::Result;
use crate::models::{Category, Config, Draft, Record};
use crate::utils::http::create_async_client;

// Re-export for convenience
pub use local::LocalStore;
pub use remote::RemoteStore;

/// Default row count for [`RecordStore::get_recent_items`].
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Uniform CRUD interface over one storage backend.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;

    /// All records of a category, in stored order.
    async fn get_all_items(&self, category: Category) -> Vec<Record>;

    /// The record with `id`, if present.
    async fn get_item(&self, category: Category, id: &str) -> Option<Record>;

    /// Create a record from a draft. The category comes from the draft.
    async fn add_item(&self, draft: Draft) -> Result<Record>;

    /// Merge the set fields of `patch` into an existing record.
    ///
    /// Fails with `NotFound` when `id` is absent.
    async fn update_item(&self, category: Category, id: &str, patch: Draft) -> Result<Record>;

    /// Remove a record. Removing an absent id succeeds.
    async fn delete_item(&self, category: Category, id: &str) -> Result<()>;

    /// Records with `term` in any string field, ignoring case.
    async fn search_items(&self, category: Category, term: &str) -> Vec<Record>;

    /// Records whose own `category` field equals `subcategory`.
    async fn get_items_by_category(&self, category: Category, subcategory: &str) -> Vec<Record>;

    /// Newest records first, at most `limit`.
    async fn get_recent_items(&self, category: Category, limit: usize) -> Vec<Record>;
}

/// Build the backend selected by `storage.use_remote`.
///
/// Called once at startup; the returned handle is shared for the rest of
/// the process.
pub async fn open_store(config: &Config) -> Result<Arc<dyn RecordStore>> {
    let store: Arc<dyn RecordStore> = if config.storage.use_remote {
        let client = create_async_client(&config.http)?;
        Arc::new(RemoteStore::new(client, config.remote.clone())?)
    } else {
        Arc::new(LocalStore::open(&config.storage.local_dir).await?)
    };

    log::info!("Using {} record store", store.backend_name());
    Ok(store)
}

/// Record count of every category, fetched concurrently.
pub async fn category_counts(store: &dyn RecordStore) -> Vec<(Category, usize)> {
    let counts = Category::ALL
        .into_iter()
        .map(|category| async move { (category, store.get_all_items(category).await.len()) });
    future::join_all(counts).await
}

/// Client-side search shared by both backends.
pub(crate) fn search(records: Vec<Record>, term: &str) -> Vec<Record> {
    records.into_iter().filter(|r| r.matches(term)).collect()
}

/// Client-side subcategory filter.
pub(crate) fn by_subcategory(records: Vec<Record>, subcategory: &str) -> Vec<Record> {
    records
        .into_iter()
        .filter(|r| r.subcategory() == Some(subcategory))
        .collect()
}

/// Newest first by creation time, truncated to `limit`.
pub(crate) fn most_recent(mut records: Vec<Record>, limit: usize) -> Vec<Record> {
    records.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    records.truncate(limit);
    records
}
