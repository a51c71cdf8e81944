//! Startup context owning the selected store and the feed services.

use std::sync::Arc;

use crate::error::Result;
use crate::models::Config;
use crate::services::{NewsService, WeatherService};
use crate::storage::{RecordStore, open_store};
use crate::utils::http::create_async_client;

/// Everything a caller needs, built once from configuration.
pub struct Portal {
    store: Arc<dyn RecordStore>,
    weather: WeatherService,
    news: NewsService,
}

impl Portal {
    /// Select the storage backend and build the feed services.
    pub async fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let client = create_async_client(&config.http)?;
        let store = open_store(config).await?;

        Ok(Self {
            store,
            weather: WeatherService::new(client.clone(), config.weather.clone()),
            news: NewsService::new(client, config.news.clone()),
        })
    }

    /// The active record store.
    pub fn store(&self) -> Arc<dyn RecordStore> {
        Arc::clone(&self.store)
    }

    pub fn weather(&self) -> &WeatherService {
        &self.weather
    }

    pub fn news(&self) -> &NewsService {
        &self.news
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Draft, UpdateDraft};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_portal_uses_local_store() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.storage.local_dir = tmp.path().to_path_buf();

        let portal = Portal::from_config(&config).await.unwrap();
        assert_eq!(portal.store().backend_name(), "local");

        let draft = Draft::from(UpdateDraft {
            title: Some("Water outage Tuesday".into()),
            ..Default::default()
        });
        let added = portal.store().add_item(draft).await.unwrap();
        let all = portal.store().get_all_items(Category::Updates).await;
        assert_eq!(all, vec![added]);
    }

    #[tokio::test]
    async fn test_portal_rejects_invalid_config() {
        let mut config = Config::default();
        config.storage.use_remote = true;

        assert!(Portal::from_config(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_news_without_key_is_fallback() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.storage.local_dir = tmp.path().to_path_buf();

        let portal = Portal::from_config(&config).await.unwrap();
        let feed = portal.news().news().await;
        assert_eq!(feed.articles[0].id, "fallback-1");
    }
}
