//! Remote document store implementation (Cloud Firestore REST API).
//!
//! Each category is one collection, each record one document keyed by the
//! record id. Category filters and recency ordering run server-side through
//! `:runQuery`; search fetches the collection and filters locally, since
//! the service has no full-text search.
//!
//! ```text
//! {base_url}/projects/{project}/databases/{database}/documents/
//! ├── lostAndfounds/{id}
//! ├── carpool/{id}
//! ├── ...
//! └── sell/{id}
//! ```

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::{Value, json};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Category, Document, Draft, Record, RemoteConfig, CREATED_AT, UPDATED_AT};
use crate::storage::document::{
    FirestoreDocument, ListDocumentsResponse, RunQueryItem, encode_fields, encode_value,
};
use crate::storage::{RecordStore, search};
use crate::utils::generate_id;
use crate::utils::http::error_body;

/// Documents requested per listing page.
const DEFAULT_PAGE_SIZE: u32 = 300;

/// Current time at the precision Firestore stores (microseconds).
fn stored_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Firestore-backed record store.
pub struct RemoteStore {
    client: Client,
    config: RemoteConfig,
    documents_root: Url,
    page_size: u32,
}

impl RemoteStore {
    /// Create a remote store for the configured project and database.
    pub fn new(client: Client, config: RemoteConfig) -> Result<Self> {
        if config.project_id.trim().is_empty() {
            return Err(AppError::config("remote.project_id is not set"));
        }

        let documents_root = Url::parse(&format!(
            "{}/projects/{}/databases/{}/documents",
            config.base_url.trim_end_matches('/'),
            config.project_id,
            config.database
        ))?;

        Ok(Self {
            client,
            config,
            documents_root,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Override the listing page size.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// URL of a collection or of one document in it.
    fn document_url(&self, category: Category, id: Option<&str>) -> Result<Url> {
        let mut url = self.documents_root.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| AppError::config("remote.base_url cannot be a base URL"))?;
            segments.push(category.collection());
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    /// URL of the `runQuery` endpoint.
    fn run_query_url(&self) -> Result<Url> {
        Ok(Url::parse(&format!("{}:runQuery", self.documents_root))?)
    }

    /// Attach credentials to a request.
    fn request(&self, method: Method, mut url: Url) -> RequestBuilder {
        if let Some(key) = self.config.api_key.as_deref().filter(|k| !k.is_empty()) {
            url.query_pairs_mut().append_pair("key", key);
        }

        let builder = self.client.request(method, url);
        match self.config.auth_token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Turn non-success responses into errors.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(AppError::remote(status.as_u16(), error_body(response).await))
        }
    }

    /// Decode documents, skipping any that no longer fit the record shape.
    fn decode_all(
        category: Category,
        documents: impl IntoIterator<Item = FirestoreDocument>,
    ) -> Vec<Record> {
        documents
            .into_iter()
            .filter_map(|document| {
                let name = document.name.clone();
                Record::from_document(category, document.into_plain())
                    .inspect_err(|e| log::warn!("Skipping document {}: {}", name, e))
                    .ok()
            })
            .collect()
    }

    /// Fetch a whole collection, following page tokens.
    async fn list_documents(&self, category: Category) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.document_url(category, None)?;
            url.query_pairs_mut()
                .append_pair("pageSize", &self.page_size.to_string());
            if let Some(token) = &page_token {
                url.query_pairs_mut().append_pair("pageToken", token);
            }

            let response = Self::check(self.request(Method::GET, url).send().await?).await?;
            let page: ListDocumentsResponse = response.json().await?;
            records.extend(Self::decode_all(category, page.documents));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        log::debug!("Fetched {} {} documents", records.len(), category);
        Ok(records)
    }

    /// Fetch one document directly.
    async fn fetch_document(&self, category: Category, id: &str) -> Result<Option<Record>> {
        let url = self.document_url(category, Some(id))?;
        let response = self.request(Method::GET, url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let document: FirestoreDocument = Self::check(response).await?.json().await?;
        Ok(Some(Record::from_document(category, document.into_plain())?))
    }

    /// Run a structured query against one collection.
    async fn run_query(&self, category: Category, mut query: Value) -> Result<Vec<Record>> {
        query["from"] = json!([{ "collectionId": category.collection() }]);
        let body = json!({ "structuredQuery": query });

        let response = self
            .request(Method::POST, self.run_query_url()?)
            .json(&body)
            .send()
            .await?;
        let items: Vec<RunQueryItem> = Self::check(response).await?.json().await?;

        Ok(Self::decode_all(
            category,
            items.into_iter().filter_map(|item| item.document),
        ))
    }

    /// Plain JSON body without the id, which lives in the document name.
    fn body_fields(mut doc: Document) -> Value {
        doc.remove("id");
        json!({ "fields": encode_fields(&doc) })
    }
}

#[async_trait]
impl RecordStore for RemoteStore {
    fn backend_name(&self) -> &'static str {
        "remote"
    }

    async fn get_all_items(&self, category: Category) -> Vec<Record> {
        self.list_documents(category).await.unwrap_or_else(|e| {
            log::warn!("Failed to list {} documents: {}", category, e);
            Vec::new()
        })
    }

    async fn get_item(&self, category: Category, id: &str) -> Option<Record> {
        self.fetch_document(category, id).await.unwrap_or_else(|e| {
            log::warn!("Failed to fetch {} document {}: {}", category, id, e);
            None
        })
    }

    async fn add_item(&self, mut draft: Draft) -> Result<Record> {
        let category = draft.category();
        let id = draft.id().map(str::to_string).unwrap_or_else(generate_id);
        draft.set_id(id.as_str());
        draft.set_created_at(stored_now());
        let record = draft.into_record();

        let url = self.document_url(category, Some(&id))?;
        let response = self
            .request(Method::PATCH, url)
            .json(&Self::body_fields(record.to_document()?))
            .send()
            .await?;
        Self::check(response).await.inspect_err(|e| {
            log::error!("Failed to add {} document: {}", category, e);
        })?;

        log::info!("Added {} document {}", category, id);
        Ok(record)
    }

    async fn update_item(&self, category: Category, id: &str, patch: Draft) -> Result<Record> {
        if patch.category() != category {
            return Err(AppError::CategoryMismatch {
                expected: category,
                found: patch.category(),
            });
        }

        let mut fields = patch.to_patch()?;
        fields.remove("id");
        fields.remove(CREATED_AT);
        fields.insert(UPDATED_AT.to_string(), Value::String(stored_now().to_rfc3339()));

        let mut url = self.document_url(category, Some(id))?;
        {
            let mut query = url.query_pairs_mut();
            for key in fields.keys() {
                query.append_pair("updateMask.fieldPaths", key);
            }
            query.append_pair("currentDocument.exists", "true");
        }

        let response = self
            .request(Method::PATCH, url)
            .json(&Self::body_fields(fields))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::not_found(category, id));
        }
        Self::check(response).await.inspect_err(|e| {
            log::error!("Failed to update {} document {}: {}", category, id, e);
        })?;

        log::info!("Updated {} document {}", category, id);
        self.fetch_document(category, id)
            .await?
            .ok_or_else(|| AppError::not_found(category, id))
    }

    async fn delete_item(&self, category: Category, id: &str) -> Result<()> {
        let url = self.document_url(category, Some(id))?;
        let response = self.request(Method::DELETE, url).send().await?;
        if response.status() != StatusCode::NOT_FOUND {
            Self::check(response).await.inspect_err(|e| {
                log::error!("Failed to delete {} document {}: {}", category, id, e);
            })?;
        }

        log::info!("Deleted {} document {}", category, id);
        Ok(())
    }

    async fn search_items(&self, category: Category, term: &str) -> Vec<Record> {
        search(self.get_all_items(category).await, term)
    }

    async fn get_items_by_category(&self, category: Category, subcategory: &str) -> Vec<Record> {
        let query = json!({
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": "category" },
                    "op": "EQUAL",
                    "value": encode_value(&Value::String(subcategory.to_string())),
                }
            }
        });

        self.run_query(category, query).await.unwrap_or_else(|e| {
            log::warn!("Category query on {} failed: {}", category, e);
            Vec::new()
        })
    }

    async fn get_recent_items(&self, category: Category, limit: usize) -> Vec<Record> {
        if limit == 0 {
            return Vec::new();
        }

        let query = json!({
            "orderBy": [{
                "field": { "fieldPath": CREATED_AT },
                "direction": "DESCENDING",
            }],
            "limit": limit.min(i32::MAX as usize),
        });

        self.run_query(category, query).await.unwrap_or_else(|e| {
            log::warn!("Recency query on {} failed: {}", category, e);
            Vec::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BusinessDraft, SellDraft};
    use crate::utils::testing;
    use axum::Router;
    use axum::extract::State;
    use axum::http::{Method as HttpMethod, StatusCode as HttpStatus, Uri};
    use axum::response::{IntoResponse, Response as HttpResponse};
    use axum::Json;
    use chrono::{Duration, SecondsFormat, Timelike};
    use serde_json::Map;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    type Fields = Map<String, Value>;

    /// Minimal in-memory stand-in for the Firestore REST surface.
    #[derive(Default)]
    struct FakeFirestore {
        collections: Mutex<HashMap<String, BTreeMap<String, Fields>>>,
        requests: Mutex<Vec<String>>,
        failing: AtomicBool,
    }

    impl FakeFirestore {
        fn document_json(collection: &str, id: &str, fields: &Fields) -> Value {
            json!({
                "name": format!("projects/hub/databases/(default)/documents/{collection}/{id}"),
                "fields": fields,
            })
        }

        fn not_found() -> HttpResponse {
            (
                HttpStatus::NOT_FOUND,
                Json(json!({ "error": { "code": 404, "status": "NOT_FOUND" } })),
            )
                .into_response()
        }

        fn seed(&self, collection: &str, id: &str, fields: Value) {
            let Value::Object(fields) = fields else { panic!("fields must be an object") };
            self.collections
                .lock()
                .unwrap()
                .entry(collection.to_string())
                .or_default()
                .insert(id.to_string(), fields);
        }

        fn timestamp(fields: &Fields, path: &str) -> Option<DateTime<chrono::FixedOffset>> {
            fields
                .get(path)?
                .get("timestampValue")?
                .as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        }

        /// Firestore keeps microseconds and answers in UTC with a `Z` suffix.
        fn truncate_timestamps(fields: &mut Fields) {
            for value in fields.values_mut() {
                let Some(raw) = value.get("timestampValue").and_then(Value::as_str) else {
                    continue;
                };
                if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
                    let stored = at
                        .with_timezone(&Utc)
                        .trunc_subsecs(6)
                        .to_rfc3339_opts(SecondsFormat::AutoSi, true);
                    *value = json!({ "timestampValue": stored });
                }
            }
        }

        fn run_query(&self, body: &Value) -> HttpResponse {
            let query = &body["structuredQuery"];
            let collection = query["from"][0]["collectionId"].as_str().unwrap_or_default();
            let docs = self.collections.lock().unwrap();
            let mut rows: Vec<(String, Fields)> = docs
                .get(collection)
                .map(|c| c.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                .unwrap_or_default();

            if let Some(filter) = query.get("where").map(|w| &w["fieldFilter"]) {
                let path = filter["field"]["fieldPath"].as_str().unwrap_or_default();
                rows.retain(|(_, fields)| fields.get(path) == Some(&filter["value"]));
            }
            if let Some(order) = query.get("orderBy").and_then(|o| o.get(0)) {
                let path = order["field"]["fieldPath"].as_str().unwrap_or_default();
                rows.sort_by(|a, b| Self::timestamp(&b.1, path).cmp(&Self::timestamp(&a.1, path)));
            }
            if let Some(limit) = query.get("limit").and_then(Value::as_u64) {
                rows.truncate(limit as usize);
            }

            let mut out: Vec<Value> = rows
                .iter()
                .map(|(id, fields)| {
                    json!({ "document": Self::document_json(collection, id, fields), "readTime": "2025-01-01T00:00:00Z" })
                })
                .collect();
            if out.is_empty() {
                out.push(json!({ "readTime": "2025-01-01T00:00:00Z" }));
            }
            Json(Value::Array(out)).into_response()
        }
    }

    async fn handle(
        State(fake): State<Arc<FakeFirestore>>,
        method: HttpMethod,
        uri: Uri,
        body: String,
    ) -> HttpResponse {
        fake.requests
            .lock()
            .unwrap()
            .push(format!("{} {}", method, uri.path()));
        if fake.failing.load(Ordering::SeqCst) {
            return (HttpStatus::INTERNAL_SERVER_ERROR, "backend down").into_response();
        }

        let params: Vec<(String, String)> = url::form_urlencoded::parse(
            uri.query().unwrap_or_default().as_bytes(),
        )
        .into_owned()
        .collect();
        let path = uri.path();
        let rest = &path[path.find("/documents").expect("documents path") + "/documents".len()..];

        if rest == ":runQuery" && method == HttpMethod::POST {
            let body: Value = serde_json::from_str(&body).unwrap();
            return fake.run_query(&body);
        }

        let segments: Vec<&str> = rest.trim_start_matches('/').split('/').collect();
        let collection = segments[0].to_string();
        let mut collections = fake.collections.lock().unwrap();
        let docs = collections.entry(collection.clone()).or_default();

        match (method, segments.get(1)) {
            (HttpMethod::GET, None) => {
                let page_size: usize = params
                    .iter()
                    .find(|(k, _)| k == "pageSize")
                    .and_then(|(_, v)| v.parse().ok())
                    .unwrap_or(usize::MAX);
                let start: usize = params
                    .iter()
                    .find(|(k, _)| k == "pageToken")
                    .and_then(|(_, v)| v.parse().ok())
                    .unwrap_or(0);
                let page: Vec<Value> = docs
                    .iter()
                    .skip(start)
                    .take(page_size)
                    .map(|(id, f)| FakeFirestore::document_json(&collection, id, f))
                    .collect();
                let mut out = json!({});
                if !page.is_empty() {
                    out["documents"] = Value::Array(page);
                }
                if start.saturating_add(page_size) < docs.len() {
                    out["nextPageToken"] = json!((start + page_size).to_string());
                }
                Json(out).into_response()
            }
            (HttpMethod::GET, Some(id)) => match docs.get(*id) {
                Some(fields) => Json(FakeFirestore::document_json(&collection, id, fields)).into_response(),
                None => FakeFirestore::not_found(),
            },
            (HttpMethod::PATCH, Some(id)) => {
                let body: Value = serde_json::from_str(&body).unwrap();
                let mut incoming = body["fields"].as_object().cloned().unwrap_or_default();
                FakeFirestore::truncate_timestamps(&mut incoming);
                let mask: Vec<&String> = params
                    .iter()
                    .filter(|(k, _)| k == "updateMask.fieldPaths")
                    .map(|(_, v)| v)
                    .collect();
                let must_exist = params
                    .iter()
                    .any(|(k, v)| k == "currentDocument.exists" && v == "true");

                if must_exist && !docs.contains_key(*id) {
                    return FakeFirestore::not_found();
                }
                if mask.is_empty() {
                    docs.insert(id.to_string(), incoming);
                } else {
                    let existing = docs.entry(id.to_string()).or_default();
                    for path in mask {
                        match incoming.get(path) {
                            Some(value) => existing.insert(path.clone(), value.clone()),
                            None => existing.remove(path),
                        };
                    }
                }
                Json(FakeFirestore::document_json(&collection, id, &docs[*id])).into_response()
            }
            (HttpMethod::DELETE, Some(id)) => {
                docs.remove(*id);
                Json(json!({})).into_response()
            }
            _ => (HttpStatus::METHOD_NOT_ALLOWED, "unsupported").into_response(),
        }
    }

    async fn fake_store() -> (Arc<FakeFirestore>, RemoteStore) {
        let fake = Arc::new(FakeFirestore::default());
        let router = Router::new().fallback(handle).with_state(Arc::clone(&fake));
        let base = testing::serve(router).await;

        let config = RemoteConfig {
            project_id: "hub".to_string(),
            base_url: format!("{base}/v1"),
            api_key: Some("test-key".to_string()),
            ..RemoteConfig::default()
        };
        let store = RemoteStore::new(Client::new(), config).unwrap();
        (fake, store)
    }

    fn desk(category: &str) -> Draft {
        SellDraft {
            title: Some("Standing desk".into()),
            description: Some("Pickup only, CASH preferred".into()),
            price: Some(200.0),
            category: Some(category.into()),
            ..Default::default()
        }
        .into()
    }

    fn requests(fake: &FakeFirestore) -> Vec<String> {
        fake.requests.lock().unwrap().clone()
    }

    #[test]
    fn test_new_requires_project() {
        let err = RemoteStore::new(Client::new(), RemoteConfig::default()).err().unwrap();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_document_urls() {
        let config = RemoteConfig {
            project_id: "hub".to_string(),
            ..RemoteConfig::default()
        };
        let store = RemoteStore::new(Client::new(), config).unwrap();

        let url = store.document_url(Category::PhoneBook, Some("a/b")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://firestore.googleapis.com/v1/projects/hub/databases/(default)/documents/phone_book/a%2Fb"
        );
        assert!(store.run_query_url().unwrap().as_str().ends_with("/documents:runQuery"));
    }

    #[tokio::test]
    async fn test_add_then_get_round_trip() {
        let (fake, store) = fake_store().await;

        let added = store.add_item(desk("furniture")).await.unwrap();
        assert_eq!(added.created_at().nanosecond() % 1_000, 0);

        let fetched = store.get_item(Category::Sell, added.id()).await;
        assert_eq!(fetched, Some(added.clone()));

        let collections = fake.collections.lock().unwrap();
        let stored = &collections["sell"][added.id()];
        assert!(stored["createdAt"].get("timestampValue").is_some());
        assert!(stored.get("id").is_none());
    }

    #[tokio::test]
    async fn test_add_keeps_caller_id() {
        let (_fake, store) = fake_store().await;
        let mut draft = desk("furniture");
        draft.set_id("desk-1");

        let added = store.add_item(draft).await.unwrap();
        assert_eq!(added.id(), "desk-1");
        assert!(store.get_item(Category::Sell, "desk-1").await.is_some());
    }

    #[tokio::test]
    async fn test_update_merges_and_rereads() {
        let (fake, store) = fake_store().await;
        let added = store.add_item(desk("furniture")).await.unwrap();

        let patch = SellDraft {
            status: Some("sold".into()),
            ..Default::default()
        };
        let updated = store
            .update_item(Category::Sell, added.id(), patch.into())
            .await
            .unwrap();

        let (Record::Sell(before), Record::Sell(after)) = (&added, &updated) else {
            panic!("expected sell records");
        };
        assert_eq!(after.status, "sold");
        assert_eq!(updated.updated_at().map(|t| t.nanosecond() % 1_000), Some(0));
        assert_eq!(after.title, before.title);
        assert_eq!(after.price, before.price);
        assert_eq!(after.created_at, before.created_at);

        let log = requests(&fake);
        let patch_request = log.iter().rev().find(|r| r.starts_with("PATCH")).unwrap();
        assert!(patch_request.ends_with(&format!("/sell/{}", added.id())));
        assert!(log.last().unwrap().starts_with("GET"));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let (fake, store) = fake_store().await;

        let err = store
            .update_item(Category::Sell, "nonexistent-id", Draft::empty(Category::Sell))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(fake.collections.lock().unwrap()["sell"].is_empty());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (_fake, store) = fake_store().await;
        let added = store.add_item(desk("furniture")).await.unwrap();

        store.delete_item(Category::Sell, added.id()).await.unwrap();
        store.delete_item(Category::Sell, added.id()).await.unwrap();
        store.delete_item(Category::Sell, "never-existed").await.unwrap();
        assert!(store.get_all_items(Category::Sell).await.is_empty());
    }

    #[tokio::test]
    async fn test_get_all_follows_pages_and_isolates() {
        let (_fake, store) = fake_store().await;
        let store = store.with_page_size(2);
        for _ in 0..5 {
            store.add_item(desk("furniture")).await.unwrap();
        }

        assert_eq!(store.get_all_items(Category::Sell).await.len(), 5);
        assert!(store.get_all_items(Category::Carpool).await.is_empty());
    }

    #[tokio::test]
    async fn test_category_filter_runs_server_side() {
        let (fake, store) = fake_store().await;
        store.add_item(desk("furniture")).await.unwrap();
        store.add_item(desk("office")).await.unwrap();

        let office = store.get_items_by_category(Category::Sell, "office").await;
        assert_eq!(office.len(), 1);
        assert_eq!(office[0].subcategory(), Some("office"));
        assert!(requests(&fake).last().unwrap().ends_with("/documents:runQuery"));

        assert!(store.get_items_by_category(Category::Sell, "toys").await.is_empty());
    }

    #[tokio::test]
    async fn test_recent_items_newest_first() {
        let (fake, store) = fake_store().await;
        let now = Utc::now();
        for (id, hours_ago) in [("t1", 3), ("t2", 2), ("t3", 1)] {
            fake.seed(
                "business",
                id,
                json!({
                    "name": { "stringValue": id },
                    "createdAt": { "timestampValue": (now - Duration::hours(hours_ago)).to_rfc3339() },
                }),
            );
        }

        let recent = store.get_recent_items(Category::Business, 2).await;
        let ids: Vec<_> = recent.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["t3", "t2"]);
    }

    #[tokio::test]
    async fn test_search_filters_client_side() {
        let (_fake, store) = fake_store().await;
        store.add_item(desk("furniture")).await.unwrap();
        store
            .add_item(
                BusinessDraft {
                    name: Some("Bakery".into()),
                    ..Default::default()
                }
                .into(),
            )
            .await
            .unwrap();

        assert_eq!(store.search_items(Category::Sell, "cash").await.len(), 1);
        assert!(store.search_items(Category::Sell, "bakery").await.is_empty());
    }

    #[tokio::test]
    async fn test_failures_degrade_reads_and_surface_writes() {
        let (fake, store) = fake_store().await;
        let added = store.add_item(desk("furniture")).await.unwrap();
        fake.failing.store(true, Ordering::SeqCst);

        assert!(store.get_all_items(Category::Sell).await.is_empty());
        assert!(store.get_item(Category::Sell, added.id()).await.is_none());
        assert!(store.get_recent_items(Category::Sell, 5).await.is_empty());

        let err = store.add_item(desk("furniture")).await.unwrap_err();
        assert!(matches!(err, AppError::Remote { status: 500, .. }));
        assert!(store.delete_item(Category::Sell, added.id()).await.is_err());
    }
}
