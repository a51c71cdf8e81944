//! Service layer for the portal.
//!
//! This module contains:
//! - Weather feed (`WeatherService`)
//! - News feed (`NewsService`)
//! - The TTL snapshot cache both feeds share (`FeedCache`)
//! - The startup context (`Portal`)

mod cache;
mod news;
mod portal;
mod weather;

pub use cache::FeedCache;
pub use news::{FALLBACK_ARTICLE_ID, NewsService, article_id};
pub use portal::Portal;
pub use weather::{WeatherService, describe_code};
