//! Read-only snapshots from the external weather and news feeds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::items::{date_or_now, text, text_or};

/// Coarse weather category used to pick an icon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherKind {
    #[default]
    Clear,
    Cloudy,
    Rainy,
    Stormy,
    Snowy,
    Foggy,
}

/// The current weather.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub temperature: i64,
    pub description: String,
    pub icon: WeatherKind,
    pub location: String,
    pub max_temperature: Option<i64>,
    pub min_temperature: Option<i64>,
    pub humidity: f64,
    pub wind_speed: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherDraft {
    pub temperature: Option<i64>,
    pub description: Option<String>,
    pub icon: Option<WeatherKind>,
    pub location: Option<String>,
    pub max_temperature: Option<i64>,
    pub min_temperature: Option<i64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Location reported when none is given.
pub const DEFAULT_LOCATION: &str = "Israel";

impl WeatherSnapshot {
    pub fn create(draft: WeatherDraft) -> Self {
        Self {
            temperature: draft.temperature.unwrap_or(0),
            description: text(draft.description),
            icon: draft.icon.unwrap_or_default(),
            location: text_or(draft.location, DEFAULT_LOCATION),
            max_temperature: draft.max_temperature,
            min_temperature: draft.min_temperature,
            humidity: draft.humidity.unwrap_or(0.0),
            wind_speed: draft.wind_speed.unwrap_or(0.0),
            timestamp: draft.timestamp.unwrap_or_else(Utc::now),
        }
    }
}

/// A news article from the aggregation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub image_url: String,
    pub source: String,
    pub author: String,
    pub published_at: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewsArticleDraft {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub source: Option<String>,
    pub author: Option<String>,
    pub published_at: Option<String>,
    pub content: Option<String>,
}

impl NewsArticle {
    pub fn create(draft: NewsArticleDraft) -> Self {
        Self {
            id: text(draft.id),
            title: text(draft.title),
            description: text(draft.description),
            url: text(draft.url),
            image_url: text(draft.image_url),
            source: text(draft.source),
            author: text(draft.author),
            published_at: date_or_now(draft.published_at, Utc::now()),
            content: text(draft.content),
        }
    }
}

/// One fetched page of articles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsFeed {
    pub articles: Vec<NewsArticle>,
    pub total_results: u64,
    pub timestamp: DateTime<Utc>,
}

impl NewsFeed {
    pub fn new(articles: Vec<NewsArticle>, total_results: u64) -> Self {
        Self {
            articles,
            total_results,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_defaults() {
        let weather = WeatherSnapshot::create(WeatherDraft::default());

        assert_eq!(weather.temperature, 0);
        assert_eq!(weather.icon, WeatherKind::Clear);
        assert_eq!(weather.location, "Israel");
        assert_eq!(weather.max_temperature, None);
        assert_eq!(weather.min_temperature, None);
        assert_eq!(weather.humidity, 0.0);
    }

    #[test]
    fn test_weather_wire_names() {
        let weather = WeatherSnapshot::create(WeatherDraft {
            icon: Some(WeatherKind::Stormy),
            max_temperature: Some(31),
            ..Default::default()
        });
        let value = serde_json::to_value(&weather).unwrap();

        assert_eq!(value["icon"], "stormy");
        assert_eq!(value["maxTemperature"], 31);
        assert!(value["minTemperature"].is_null());
        assert!(value.get("windSpeed").is_some());
    }

    #[test]
    fn test_news_article_defaults() {
        let article = NewsArticle::create(NewsArticleDraft {
            title: Some("Road works on Herzl St".into()),
            ..Default::default()
        });

        assert_eq!(article.title, "Road works on Herzl St");
        assert_eq!(article.author, "");
        assert!(DateTime::parse_from_rfc3339(&article.published_at).is_ok());
    }
}
