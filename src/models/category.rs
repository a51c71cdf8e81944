//! Content categories and their storage locations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// One of the fixed content domains of the portal.
///
/// Each category owns its own record shape and its own storage collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    LostAndFound,
    Carpool,
    Updates,
    Education,
    Business,
    PhoneBook,
    Sell,
}

impl Category {
    /// All categories, in the order they are seeded.
    pub const ALL: [Category; 7] = [
        Category::LostAndFound,
        Category::Carpool,
        Category::Updates,
        Category::Education,
        Category::Business,
        Category::PhoneBook,
        Category::Sell,
    ];

    /// Tag used by callers (`lost-and-found`, `phone-book`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::LostAndFound => "lost-and-found",
            Category::Carpool => "carpool",
            Category::Updates => "updates",
            Category::Education => "education",
            Category::Business => "business",
            Category::PhoneBook => "phone-book",
            Category::Sell => "sell",
        }
    }

    /// Key of the category's list in the local store.
    pub fn storage_key(&self) -> &'static str {
        match self {
            Category::LostAndFound => "localhub_lost_and_found",
            Category::Carpool => "localhub_carpool",
            Category::Updates => "localhub_updates",
            Category::Education => "localhub_education",
            Category::Business => "localhub_business",
            Category::PhoneBook => "localhub_phone_book",
            Category::Sell => "localhub_sell",
        }
    }

    /// Name of the category's collection in the remote document store.
    pub fn collection(&self) -> &'static str {
        match self {
            Category::LostAndFound => "lostAndfounds",
            Category::Carpool => "carpool",
            Category::Updates => "updates",
            Category::Education => "education",
            Category::Business => "business",
            Category::PhoneBook => "phone_book",
            Category::Sell => "sell",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == tag)
            .ok_or(AppError::UnknownCategory(s.to_string()))
    }
}
