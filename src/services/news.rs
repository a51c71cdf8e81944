//! Headlines from the NewsAPI `everything` endpoint.

use reqwest::Client;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{NewsArticle, NewsArticleDraft, NewsConfig, NewsFeed};
use crate::services::cache::FeedCache;
use crate::utils::http::{error_body, url_with_params};

/// Id of the placeholder article served when the feed is unavailable.
pub const FALLBACK_ARTICLE_ID: &str = "fallback-1";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    total_results: u64,
    #[serde(default)]
    articles: Vec<ApiArticle>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ApiArticle {
    source: Option<ApiSource>,
    author: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    url_to_image: Option<String>,
    published_at: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiSource {
    name: Option<String>,
}

impl ApiArticle {
    fn into_article(self) -> NewsArticle {
        NewsArticle::create(NewsArticleDraft {
            id: self.url.as_deref().map(article_id),
            title: self.title,
            description: self.description,
            url: self.url,
            image_url: self.url_to_image,
            source: self.source.and_then(|s| s.name),
            author: self.author,
            published_at: self.published_at,
            content: self.content,
        })
    }
}

/// Article id derived from its URL: the last path segment, alphanumerics only.
pub fn article_id(url: &str) -> String {
    url.rsplit('/')
        .next()
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

/// News feed with a TTL cache.
pub struct NewsService {
    client: Client,
    config: NewsConfig,
    cache: FeedCache<NewsFeed>,
}

impl NewsService {
    pub fn new(client: Client, config: NewsConfig) -> Self {
        let cache = FeedCache::new(config.cache_ttl());
        Self {
            client,
            config,
            cache,
        }
    }

    /// Latest articles, served from cache while fresh.
    ///
    /// Never fails: fetch errors yield [`NewsService::fallback`].
    pub async fn news(&self) -> NewsFeed {
        match self.cache.get_fresh() {
            Some(feed) => {
                log::debug!("News served from cache");
                feed
            }
            None => self.refresh().await,
        }
    }

    /// Fetch now, bypassing the cache. Only successful fetches are cached.
    pub async fn refresh(&self) -> NewsFeed {
        match self.fetch().await {
            Ok(feed) => {
                self.cache.store(feed.clone());
                feed
            }
            Err(e) => {
                log::warn!("Error fetching news data: {}", e);
                self.fallback()
            }
        }
    }

    /// One request to the news API.
    pub async fn fetch(&self) -> Result<NewsFeed> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AppError::feed("news API key is not configured"))?;

        let page_size = self.config.page_size.to_string();
        let url = url_with_params(
            &self.config.api_url,
            &[
                ("q", self.config.query.as_str()),
                ("language", self.config.language.as_str()),
                ("apiKey", api_key),
                ("pageSize", page_size.as_str()),
                ("sortBy", self.config.sort_by.as_str()),
            ],
        )?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = error_body(response).await;
            return Err(AppError::feed(format!("news API error {}: {}", status, body)));
        }

        let body: EverythingResponse = response.json().await?;
        if body.status != "ok" {
            return Err(AppError::feed(format!(
                "news API returned status {:?}: {}",
                body.status,
                body.message.unwrap_or_default()
            )));
        }

        let articles: Vec<NewsArticle> =
            body.articles.into_iter().map(ApiArticle::into_article).collect();
        log::debug!("Fetched {} news articles", articles.len());
        Ok(NewsFeed::new(articles, body.total_results))
    }

    /// Feed holding a single placeholder article.
    pub fn fallback(&self) -> NewsFeed {
        let placeholder = NewsArticle::create(NewsArticleDraft {
            id: Some(FALLBACK_ARTICLE_ID.to_string()),
            title: Some("Local news".to_string()),
            description: Some("Updates from the local community".to_string()),
            url: Some("#".to_string()),
            source: Some("LocalHub".to_string()),
            author: Some("Editorial".to_string()),
            content: Some("Local news coming soon".to_string()),
            ..Default::default()
        });
        NewsFeed::new(vec![placeholder], 1)
    }
}
