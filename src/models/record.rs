//! Category-tagged records and drafts.
//!
//! `Record` and `Draft` are the shapes that cross the storage interface. A
//! backend never sees loose JSON from callers: it receives a `Draft`, runs it
//! through the category's factory, and stores the resulting `Record`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use super::Category;
use super::items::{
    BusinessDraft, BusinessItem, CarpoolDraft, CarpoolItem, EducationDraft, EducationItem,
    LostAndFoundDraft, LostAndFoundItem, PhoneBookDraft, PhoneBookItem, SellDraft, SellItem,
    UpdateDraft, UpdateItem,
};
use crate::error::{AppError, Result};

/// A JSON object as stored at rest.
pub type Document = Map<String, Value>;

/// Wire name of the creation timestamp.
pub const CREATED_AT: &str = "createdAt";

/// Wire name of the last-update timestamp.
pub const UPDATED_AT: &str = "updatedAt";

/// A complete, defaulted record belonging to one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    LostAndFound(LostAndFoundItem),
    Carpool(CarpoolItem),
    Update(UpdateItem),
    Education(EducationItem),
    Business(BusinessItem),
    PhoneBook(PhoneBookItem),
    Sell(SellItem),
}

impl Record {
    pub fn category(&self) -> Category {
        match self {
            Record::LostAndFound(_) => Category::LostAndFound,
            Record::Carpool(_) => Category::Carpool,
            Record::Update(_) => Category::Updates,
            Record::Education(_) => Category::Education,
            Record::Business(_) => Category::Business,
            Record::PhoneBook(_) => Category::PhoneBook,
            Record::Sell(_) => Category::Sell,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Record::LostAndFound(item) => &item.id,
            Record::Carpool(item) => &item.id,
            Record::Update(item) => &item.id,
            Record::Education(item) => &item.id,
            Record::Business(item) => &item.id,
            Record::PhoneBook(item) => &item.id,
            Record::Sell(item) => &item.id,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Record::LostAndFound(item) => item.created_at,
            Record::Carpool(item) => item.created_at,
            Record::Update(item) => item.created_at,
            Record::Education(item) => item.created_at,
            Record::Business(item) => item.created_at,
            Record::PhoneBook(item) => item.created_at,
            Record::Sell(item) => item.created_at,
        }
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Record::LostAndFound(item) => item.updated_at,
            Record::Carpool(item) => item.updated_at,
            Record::Update(item) => item.updated_at,
            Record::Education(item) => item.updated_at,
            Record::Business(item) => item.updated_at,
            Record::PhoneBook(item) => item.updated_at,
            Record::Sell(item) => item.updated_at,
        }
    }

    /// The record's own `category` field, for the categories that have one.
    pub fn subcategory(&self) -> Option<&str> {
        match self {
            Record::Update(item) => Some(&item.category),
            Record::Education(item) => Some(&item.category),
            Record::Business(item) => Some(&item.category),
            Record::PhoneBook(item) => Some(&item.category),
            Record::Sell(item) => Some(&item.category),
            Record::LostAndFound(_) | Record::Carpool(_) => None,
        }
    }

    /// Serialize into the at-rest JSON object.
    pub fn to_document(&self) -> Result<Document> {
        match serde_json::to_value(self)? {
            Value::Object(doc) => Ok(doc),
            other => Err(AppError::validation(format!(
                "{} record serialized to a non-object: {other}",
                self.category()
            ))),
        }
    }

    /// Rebuild a record from a stored document.
    ///
    /// The document goes through the category's factory, so older documents
    /// with missing fields come back with defaults filled in.
    pub fn from_document(category: Category, doc: Document) -> Result<Self> {
        Ok(Draft::from_json(category, Value::Object(doc))?.into_record())
    }

    /// Case-insensitive substring match against every string field.
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        self.to_document()
            .map(|doc| {
                doc.values().any(|value| match value {
                    Value::String(s) => s.to_lowercase().contains(&needle),
                    _ => false,
                })
            })
            .unwrap_or(false)
    }

    /// Apply the set fields of `patch` and stamp `updatedAt`.
    ///
    /// The id and creation time are never taken from the patch.
    pub fn merged(&self, patch: &Draft, now: DateTime<Utc>) -> Result<Self> {
        let category = self.category();
        if patch.category() != category {
            return Err(AppError::CategoryMismatch {
                expected: category,
                found: patch.category(),
            });
        }

        let mut doc = self.to_document()?;
        for (key, value) in patch.to_patch()? {
            if key != "id" && key != CREATED_AT {
                doc.insert(key, value);
            }
        }
        doc.insert(UPDATED_AT.to_string(), Value::String(now.to_rfc3339()));

        Record::from_document(category, doc)
    }
}

/// Input for a record of one category, every field optional.
#[derive(Debug, Clone, PartialEq)]
pub enum Draft {
    LostAndFound(LostAndFoundDraft),
    Carpool(CarpoolDraft),
    Update(UpdateDraft),
    Education(EducationDraft),
    Business(BusinessDraft),
    PhoneBook(PhoneBookDraft),
    Sell(SellDraft),
}

impl Draft {
    /// An empty draft for the category.
    pub fn empty(category: Category) -> Self {
        match category {
            Category::LostAndFound => Draft::LostAndFound(Default::default()),
            Category::Carpool => Draft::Carpool(Default::default()),
            Category::Updates => Draft::Update(Default::default()),
            Category::Education => Draft::Education(Default::default()),
            Category::Business => Draft::Business(Default::default()),
            Category::PhoneBook => Draft::PhoneBook(Default::default()),
            Category::Sell => Draft::Sell(Default::default()),
        }
    }

    /// Parse a JSON object into the category's draft.
    ///
    /// Unknown keys are dropped and `null` counts as unset. A value of the
    /// wrong type for a known field is rejected.
    pub fn from_json(category: Category, value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(AppError::invalid_payload(category, "expected a JSON object"));
        }

        let invalid = |e: serde_json::Error| AppError::invalid_payload(category, e);
        let draft = match category {
            Category::LostAndFound => {
                Draft::LostAndFound(serde_json::from_value(value).map_err(invalid)?)
            }
            Category::Carpool => Draft::Carpool(serde_json::from_value(value).map_err(invalid)?),
            Category::Updates => Draft::Update(serde_json::from_value(value).map_err(invalid)?),
            Category::Education => {
                Draft::Education(serde_json::from_value(value).map_err(invalid)?)
            }
            Category::Business => Draft::Business(serde_json::from_value(value).map_err(invalid)?),
            Category::PhoneBook => {
                Draft::PhoneBook(serde_json::from_value(value).map_err(invalid)?)
            }
            Category::Sell => Draft::Sell(serde_json::from_value(value).map_err(invalid)?),
        };
        Ok(draft)
    }

    pub fn category(&self) -> Category {
        match self {
            Draft::LostAndFound(_) => Category::LostAndFound,
            Draft::Carpool(_) => Category::Carpool,
            Draft::Update(_) => Category::Updates,
            Draft::Education(_) => Category::Education,
            Draft::Business(_) => Category::Business,
            Draft::PhoneBook(_) => Category::PhoneBook,
            Draft::Sell(_) => Category::Sell,
        }
    }

    /// Caller-supplied id, if any.
    pub fn id(&self) -> Option<&str> {
        let id = match self {
            Draft::LostAndFound(d) => &d.id,
            Draft::Carpool(d) => &d.id,
            Draft::Update(d) => &d.id,
            Draft::Education(d) => &d.id,
            Draft::Business(d) => &d.id,
            Draft::PhoneBook(d) => &d.id,
            Draft::Sell(d) => &d.id,
        };
        id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        let id = Some(id.into());
        match self {
            Draft::LostAndFound(d) => d.id = id,
            Draft::Carpool(d) => d.id = id,
            Draft::Update(d) => d.id = id,
            Draft::Education(d) => d.id = id,
            Draft::Business(d) => d.id = id,
            Draft::PhoneBook(d) => d.id = id,
            Draft::Sell(d) => d.id = id,
        }
    }

    pub fn set_created_at(&mut self, at: DateTime<Utc>) {
        let at = Some(at);
        match self {
            Draft::LostAndFound(d) => d.created_at = at,
            Draft::Carpool(d) => d.created_at = at,
            Draft::Update(d) => d.created_at = at,
            Draft::Education(d) => d.created_at = at,
            Draft::Business(d) => d.created_at = at,
            Draft::PhoneBook(d) => d.created_at = at,
            Draft::Sell(d) => d.created_at = at,
        }
    }

    /// Run the category's factory.
    pub fn into_record(self) -> Record {
        match self {
            Draft::LostAndFound(d) => Record::LostAndFound(LostAndFoundItem::create(d)),
            Draft::Carpool(d) => Record::Carpool(CarpoolItem::create(d)),
            Draft::Update(d) => Record::Update(UpdateItem::create(d)),
            Draft::Education(d) => Record::Education(EducationItem::create(d)),
            Draft::Business(d) => Record::Business(BusinessItem::create(d)),
            Draft::PhoneBook(d) => Record::PhoneBook(PhoneBookItem::create(d)),
            Draft::Sell(d) => Record::Sell(SellItem::create(d)),
        }
    }

    /// Only the fields that are set, keyed by wire name.
    pub fn to_patch(&self) -> Result<Document> {
        let value = match self {
            Draft::LostAndFound(d) => serde_json::to_value(d)?,
            Draft::Carpool(d) => serde_json::to_value(d)?,
            Draft::Update(d) => serde_json::to_value(d)?,
            Draft::Education(d) => serde_json::to_value(d)?,
            Draft::Business(d) => serde_json::to_value(d)?,
            Draft::PhoneBook(d) => serde_json::to_value(d)?,
            Draft::Sell(d) => serde_json::to_value(d)?,
        };

        let mut patch = match value {
            Value::Object(map) => map,
            _ => Document::new(),
        };
        patch.retain(|_, v| !v.is_null());
        Ok(patch)
    }
}

impl From<LostAndFoundDraft> for Draft {
    fn from(draft: LostAndFoundDraft) -> Self {
        Draft::LostAndFound(draft)
    }
}

impl From<CarpoolDraft> for Draft {
    fn from(draft: CarpoolDraft) -> Self {
        Draft::Carpool(draft)
    }
}

impl From<UpdateDraft> for Draft {
    fn from(draft: UpdateDraft) -> Self {
        Draft::Update(draft)
    }
}

impl From<EducationDraft> for Draft {
    fn from(draft: EducationDraft) -> Self {
        Draft::Education(draft)
    }
}

impl From<BusinessDraft> for Draft {
    fn from(draft: BusinessDraft) -> Self {
        Draft::Business(draft)
    }
}

impl From<PhoneBookDraft> for Draft {
    fn from(draft: PhoneBookDraft) -> Self {
        Draft::PhoneBook(draft)
    }
}

impl From<SellDraft> for Draft {
    fn from(draft: SellDraft) -> Self {
        Draft::Sell(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_sell() -> Record {
        Draft::from(SellDraft {
            id: Some("abc".into()),
            title: Some("Lawn mower".into()),
            description: Some("Cash only, pickup Friday".into()),
            price: Some(80.0),
            category: Some("garden".into()),
            ..Default::default()
        })
        .into_record()
    }

    #[test]
    fn test_from_json_picks_category_shape() {
        let draft = Draft::from_json(
            Category::Carpool,
            json!({ "to": "Haifa", "time": "08:00", "seats": 3 }),
        )
        .unwrap();

        let record = draft.into_record();
        assert_eq!(record.category(), Category::Carpool);
        assert_eq!(record.subcategory(), None);

        let doc = record.to_document().unwrap();
        assert_eq!(doc["to"], "Haifa");
        assert!(doc.get("seats").is_none());
    }

    #[test]
    fn test_from_json_rejects_wrong_types() {
        let err = Draft::from_json(Category::Sell, json!({ "price": "cheap" })).unwrap_err();
        assert!(matches!(err, AppError::InvalidPayload { .. }));

        let err = Draft::from_json(Category::Sell, json!(["not", "an", "object"])).unwrap_err();
        assert!(matches!(err, AppError::InvalidPayload { .. }));
    }

    #[test]
    fn test_document_round_trip() {
        let record = sample_sell();
        let doc = record.to_document().unwrap();

        assert_eq!(doc["condition"], "good");
        assert!(doc.contains_key(CREATED_AT));
        assert!(!doc.contains_key(UPDATED_AT));

        let back = Record::from_document(Category::Sell, doc).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let record = sample_sell();

        assert!(record.matches("CASH"));
        assert!(record.matches("mower"));
        assert!(!record.matches("tractor"));
    }

    #[test]
    fn test_merged_changes_only_patched_fields() {
        let record = sample_sell();
        let now = Utc::now();
        let patch = Draft::from(SellDraft {
            id: Some("other".into()),
            price: Some(60.0),
            ..Default::default()
        });

        let merged = record.merged(&patch, now).unwrap();
        let Record::Sell(before) = &record else { panic!("expected sell") };
        let Record::Sell(after) = &merged else { panic!("expected sell") };

        assert_eq!(after.id, "abc");
        assert_eq!(after.price, 60.0);
        assert_eq!(after.updated_at, Some(now));
        assert_eq!(
            SellItem { price: before.price, updated_at: None, ..after.clone() },
            before.clone()
        );
    }

    #[test]
    fn test_merged_keeps_creation_time() {
        let record = sample_sell();
        let now = Utc::now();
        let patch = Draft::from(SellDraft {
            title: Some("Electric mower".into()),
            created_at: Some(now - chrono::Duration::days(30)),
            ..Default::default()
        });

        let merged = record.merged(&patch, now).unwrap();
        assert_eq!(merged.created_at(), record.created_at());
        assert_eq!(merged.updated_at(), Some(now));
        assert_eq!(record.updated_at(), None);
    }

    #[test]
    fn test_merged_rejects_other_category() {
        let record = sample_sell();
        let patch = Draft::empty(Category::Carpool);

        let err = record.merged(&patch, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::CategoryMismatch { .. }));
    }
}
