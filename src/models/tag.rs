//! Tag models for topic labelling and popularity ranking.

use serde::{Deserialize, Serialize};

/// A text label attached to any number of topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicTag {
    pub id: String,
    pub tag: String,
}

impl TopicTag {
    /// A tag that has not been stored yet. Its id is assigned when the owning topic is added.
    pub fn named(tag: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            tag: tag.into(),
        }
    }
}

/// A tag together with the number of topics carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularTag {
    pub tag: String,
    pub topic_count: i64,
}

/// View model of the popular tags partial.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularTagViewModel {
    pub popular_tags: Vec<PopularTag>,
}
