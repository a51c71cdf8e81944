// src/models/mod.rs

//! Domain models for the LocalHub data layer.
//!
//! This module contains all data structures used throughout the crate,
//! organized by their primary purpose.

mod category;
mod config;
mod feeds;
pub mod items;
mod record;

// Re-export all public types
pub use category::Category;
pub use config::{
    Config, HttpConfig, NewsConfig, RemoteConfig, StorageConfig, WeatherConfig,
};
pub use feeds::{
    NewsArticle, NewsArticleDraft, NewsFeed, WeatherDraft, WeatherKind, WeatherSnapshot,
};
pub use items::{
    BusinessDraft, BusinessItem, CarpoolDraft, CarpoolItem, EducationDraft, EducationItem,
    FeatureData, FeatureDraft, LostAndFoundDraft, LostAndFoundItem, PhoneBookDraft,
    PhoneBookItem, SellDraft, SellItem, UpdateDraft, UpdateItem,
};
pub use record::{CREATED_AT, Document, Draft, Record, UPDATED_AT};
