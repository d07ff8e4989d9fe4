//! Category model.

use serde::{Deserialize, Serialize};

/// A category grouping topics on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub sort_order: i64,
}

impl Category {
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            slug: slug.into(),
            sort_order: 0,
        }
    }
}
