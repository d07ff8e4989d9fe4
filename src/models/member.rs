//! Forum member model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered forum member who can own topics and posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub user_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub create_date: DateTime<Utc>,
}

impl Member {
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            user_name: user_name.into(),
            email: None,
            create_date: Utc::now(),
        }
    }
}
