//! Current weather from the Open-Meteo daily forecast.

use reqwest::Client;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{WeatherConfig, WeatherDraft, WeatherKind, WeatherSnapshot};
use crate::services::cache::FeedCache;
use crate::utils::http::{error_body, url_with_params};

const DAILY_FIELDS: &str = "apparent_temperature_mean,temperature_2m_max,temperature_2m_min,weather_code";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: DailyForecast,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DailyForecast {
    apparent_temperature_mean: Vec<Option<f64>>,
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    weather_code: Vec<Option<i64>>,
}

/// Map a WMO weather interpretation code to a description and kind.
pub fn describe_code(code: i64) -> (&'static str, WeatherKind) {
    match code {
        0 => ("Clear sky", WeatherKind::Clear),
        1 => ("Mainly clear", WeatherKind::Clear),
        2 => ("Partly cloudy", WeatherKind::Cloudy),
        3 => ("Overcast", WeatherKind::Cloudy),
        45 | 48 => ("Fog", WeatherKind::Foggy),
        51 => ("Light drizzle", WeatherKind::Rainy),
        53 => ("Moderate drizzle", WeatherKind::Rainy),
        55 => ("Dense drizzle", WeatherKind::Rainy),
        61 => ("Slight rain", WeatherKind::Rainy),
        63 => ("Rain", WeatherKind::Rainy),
        65 => ("Heavy rain", WeatherKind::Rainy),
        71 | 73 | 75 | 77 | 85 => ("Snow", WeatherKind::Snowy),
        86 => ("Heavy snow", WeatherKind::Snowy),
        80 => ("Rain showers", WeatherKind::Rainy),
        81 => ("Showers", WeatherKind::Rainy),
        82 => ("Violent rain showers", WeatherKind::Rainy),
        95 => ("Thunderstorm", WeatherKind::Stormy),
        96 | 99 => ("Thunderstorm with rain", WeatherKind::Stormy),
        _ => ("Unknown", WeatherKind::Clear),
    }
}

/// Weather feed with a TTL cache.
pub struct WeatherService {
    client: Client,
    config: WeatherConfig,
    cache: FeedCache<WeatherSnapshot>,
}

impl WeatherService {
    pub fn new(client: Client, config: WeatherConfig) -> Self {
        let cache = FeedCache::new(config.cache_ttl());
        Self {
            client,
            config,
            cache,
        }
    }

    /// The current weather, served from cache while fresh.
    ///
    /// Never fails: fetch errors yield [`WeatherService::fallback`].
    pub async fn current_weather(&self) -> WeatherSnapshot {
        match self.cache.get_fresh() {
            Some(snapshot) => {
                log::debug!("Weather served from cache");
                snapshot
            }
            None => self.refresh().await,
        }
    }

    /// Fetch now, bypassing the cache. Only successful fetches are cached.
    pub async fn refresh(&self) -> WeatherSnapshot {
        match self.fetch().await {
            Ok(snapshot) => {
                self.cache.store(snapshot.clone());
                snapshot
            }
            Err(e) => {
                log::warn!("Error fetching weather data: {}", e);
                self.fallback()
            }
        }
    }

    /// One request to the forecast API.
    pub async fn fetch(&self) -> Result<WeatherSnapshot> {
        let url = url_with_params(
            &self.config.api_url,
            &[
                ("latitude", self.config.latitude.to_string()),
                ("longitude", self.config.longitude.to_string()),
                ("daily", DAILY_FIELDS.to_string()),
                ("timezone", self.config.timezone.clone()),
                ("forecast_days", "1".to_string()),
            ],
        )?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = error_body(response).await;
            return Err(AppError::feed(format!("weather API error {}: {}", status, body)));
        }

        let forecast: ForecastResponse = response.json().await?;
        let daily = forecast.daily;
        let first = |values: &[Option<f64>]| values.first().copied().flatten();

        let temperature = first(&daily.apparent_temperature_mean)
            .ok_or_else(|| AppError::feed("forecast has no apparent temperature"))?;
        let code = daily
            .weather_code
            .first()
            .copied()
            .flatten()
            .ok_or_else(|| AppError::feed("forecast has no weather code"))?;
        let (description, kind) = describe_code(code);

        Ok(WeatherSnapshot::create(WeatherDraft {
            temperature: Some(temperature.round() as i64),
            description: Some(description.to_string()),
            icon: Some(kind),
            location: Some(self.config.location.clone()),
            max_temperature: first(&daily.temperature_2m_max).map(|t| t.round() as i64),
            min_temperature: first(&daily.temperature_2m_min).map(|t| t.round() as i64),
            ..Default::default()
        }))
    }

    /// Fixed snapshot used when the feed is unavailable.
    pub fn fallback(&self) -> WeatherSnapshot {
        WeatherSnapshot::create(WeatherDraft {
            temperature: Some(25),
            description: Some("Partly cloudy".to_string()),
            icon: Some(WeatherKind::Cloudy),
            location: Some(self.config.location.clone()),
            max_temperature: Some(28),
            min_temperature: Some(22),
            ..Default::default()
        })
    }
}
