//! Record shapes for the persisted content categories.
//!
//! Every record type has a matching draft whose fields are all optional.
//! `create` turns a draft into a complete record, filling each unset field
//! with its default. Defaulting is the whole contract: values outside the
//! known enumerations are kept as they are.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Known `status` values.
pub mod status {
    pub const ACTIVE: &str = "active";
    pub const RESOLVED: &str = "resolved";
    pub const EXPIRED: &str = "expired";
    pub const SOLD: &str = "sold";
}

/// Known lost-and-found `type` values.
pub mod listing {
    pub const LOST: &str = "lost";
    pub const FOUND: &str = "found";
}

/// Known marketplace `condition` values.
pub mod condition {
    pub const NEW: &str = "new";
    pub const LIKE_NEW: &str = "like-new";
    pub const GOOD: &str = "good";
    pub const FAIR: &str = "fair";
    pub const POOR: &str = "poor";
}

/// Known course `level` values.
pub mod level {
    pub const BEGINNER: &str = "beginner";
    pub const INTERMEDIATE: &str = "intermediate";
    pub const ADVANCED: &str = "advanced";
}

/// Known community update `priority` values.
pub mod priority {
    pub const LOW: &str = "low";
    pub const NORMAL: &str = "normal";
    pub const HIGH: &str = "high";
    pub const URGENT: &str = "urgent";
}

/// Unset string fields become empty.
pub(crate) fn text(value: Option<String>) -> String {
    value.unwrap_or_default()
}

/// Unset or empty string fields take `default`.
pub(crate) fn text_or(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Unset or empty date strings become the current time.
pub(crate) fn date_or_now(value: Option<String>, now: DateTime<Utc>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| now.to_rfc3339())
}

// --- Lost and found ---

/// A lost or found object report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LostAndFoundItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub date: String,
    pub contact: String,
    /// `lost` or `found`
    #[serde(rename = "type")]
    pub kind: String,
    pub image: String,
    /// `active`, `resolved` or `expired`
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LostAndFoundDraft {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    pub contact: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub image: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl LostAndFoundItem {
    pub fn create(draft: LostAndFoundDraft) -> Self {
        let now = Utc::now();
        Self {
            id: text(draft.id),
            title: text(draft.title),
            description: text(draft.description),
            location: text(draft.location),
            date: date_or_now(draft.date, now),
            contact: text(draft.contact),
            kind: text_or(draft.kind, listing::LOST),
            image: text(draft.image),
            status: text_or(draft.status, status::ACTIVE),
            created_at: draft.created_at.unwrap_or(now),
            updated_at: draft.updated_at,
        }
    }
}

// --- Carpool ---

/// A ride offer or request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarpoolItem {
    pub id: String,
    pub to: String,
    pub date: String,
    pub time: String,
    pub contact: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarpoolDraft {
    pub id: Option<String>,
    pub to: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub contact: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CarpoolItem {
    pub fn create(draft: CarpoolDraft) -> Self {
        Self {
            id: text(draft.id),
            to: text(draft.to),
            date: text(draft.date),
            time: text(draft.time),
            contact: text(draft.contact),
            description: text(draft.description),
            created_at: draft.created_at.unwrap_or_else(Utc::now),
            status: text_or(draft.status, status::ACTIVE),
            updated_at: draft.updated_at,
        }
    }
}

// --- Community updates ---

/// A community announcement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    /// `low`, `normal`, `high` or `urgent`
    pub priority: String,
    pub date: String,
    pub author: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDraft {
    pub id: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub date: Option<String>,
    pub author: Option<String>,
    pub tags: Option<Vec<String>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UpdateItem {
    pub fn create(draft: UpdateDraft) -> Self {
        let now = Utc::now();
        Self {
            id: text(draft.id),
            title: text(draft.title),
            content: text(draft.content),
            category: text(draft.category),
            priority: text_or(draft.priority, priority::NORMAL),
            date: date_or_now(draft.date, now),
            author: text(draft.author),
            tags: draft.tags.unwrap_or_default(),
            created_at: draft.created_at.unwrap_or(now),
            updated_at: draft.updated_at,
        }
    }
}

// --- Education ---

/// A class or course listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    /// `beginner`, `intermediate` or `advanced`; empty when not given
    pub level: String,
    pub duration: String,
    pub instructor: String,
    pub contact: String,
    pub price: f64,
    pub schedule: String,
    pub location: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationDraft {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub duration: Option<String>,
    pub instructor: Option<String>,
    pub contact: Option<String>,
    pub price: Option<f64>,
    pub schedule: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl EducationItem {
    pub fn create(draft: EducationDraft) -> Self {
        Self {
            id: text(draft.id),
            title: text(draft.title),
            description: text(draft.description),
            category: text(draft.category),
            level: text(draft.level),
            duration: text(draft.duration),
            instructor: text(draft.instructor),
            contact: text(draft.contact),
            price: draft.price.unwrap_or(0.0),
            schedule: text(draft.schedule),
            location: text(draft.location),
            status: text_or(draft.status, status::ACTIVE),
            created_at: draft.created_at.unwrap_or_else(Utc::now),
            updated_at: draft.updated_at,
        }
    }
}

// --- Business directory ---

/// A local business listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub hours: String,
    pub services: Vec<String>,
    pub rating: f64,
    pub reviews: u32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessDraft {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub hours: Option<String>,
    pub services: Option<Vec<String>>,
    pub rating: Option<f64>,
    pub reviews: Option<u32>,
    pub status: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl BusinessItem {
    pub fn create(draft: BusinessDraft) -> Self {
        Self {
            id: text(draft.id),
            name: text(draft.name),
            description: text(draft.description),
            category: text(draft.category),
            address: text(draft.address),
            phone: text(draft.phone),
            email: text(draft.email),
            website: text(draft.website),
            hours: text(draft.hours),
            services: draft.services.unwrap_or_default(),
            rating: draft.rating.unwrap_or(0.0),
            reviews: draft.reviews.unwrap_or(0),
            status: text_or(draft.status, status::ACTIVE),
            created_at: draft.created_at.unwrap_or_else(Utc::now),
            updated_at: draft.updated_at,
        }
    }
}

// --- Phone book ---

/// A phone book entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneBookItem {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub category: String,
    pub description: String,
    pub emergency: bool,
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneBookDraft {
    pub id: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub emergency: Option<bool>,
    pub status: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl PhoneBookItem {
    pub fn create(draft: PhoneBookDraft) -> Self {
        Self {
            id: text(draft.id),
            name: text(draft.name),
            phone: text(draft.phone),
            email: text(draft.email),
            address: text(draft.address),
            category: text(draft.category),
            description: text(draft.description),
            emergency: draft.emergency.unwrap_or(false),
            status: text_or(draft.status, status::ACTIVE),
            created_at: draft.created_at.unwrap_or_else(Utc::now),
            updated_at: draft.updated_at,
        }
    }
}

// --- Marketplace ---

/// Something offered for sale.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    /// `new`, `like-new`, `good`, `fair` or `poor`
    pub condition: String,
    pub images: Vec<String>,
    pub seller: String,
    pub contact: String,
    pub location: String,
    pub date: String,
    /// `active`, `sold` or `expired`
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellDraft {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub images: Option<Vec<String>>,
    pub seller: Option<String>,
    pub contact: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl SellItem {
    pub fn create(draft: SellDraft) -> Self {
        let now = Utc::now();
        Self {
            id: text(draft.id),
            title: text(draft.title),
            description: text(draft.description),
            price: draft.price.unwrap_or(0.0),
            category: text(draft.category),
            condition: text_or(draft.condition, condition::GOOD),
            images: draft.images.unwrap_or_default(),
            seller: text(draft.seller),
            contact: text(draft.contact),
            location: text(draft.location),
            date: date_or_now(draft.date, now),
            status: text_or(draft.status, status::ACTIVE),
            created_at: draft.created_at.unwrap_or(now),
            updated_at: draft.updated_at,
        }
    }
}

// --- Feature tiles ---

/// A generic portal feature entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureData {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub icon: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureDraft {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub icon: Option<String>,
    pub content: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl FeatureData {
    pub fn create(draft: FeatureDraft) -> Self {
        let now = Utc::now();
        Self {
            id: text(draft.id),
            title: text(draft.title),
            description: text(draft.description),
            kind: text(draft.kind),
            icon: text(draft.icon),
            content: text(draft.content),
            created_at: draft.created_at.unwrap_or(now),
            updated_at: draft.updated_at.unwrap_or(now),
        }
    }
}
