//! Topic and post models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TopicTag;

/// A discussion thread within a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    /// Assigned by `TopicRepository::add`; empty until then.
    pub id: String,
    pub name: String,
    pub slug: String,
    pub create_date: DateTime<Utc>,
    #[serde(default)]
    pub views: i64,
    #[serde(default)]
    pub is_sticky: bool,
    #[serde(default)]
    pub is_locked: bool,
    pub category_id: String,
    pub member_id: String,
    /// Ordered by creation date, oldest first.
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub tags: Vec<TopicTag>,
}

impl Topic {
    pub fn new(
        name: impl Into<String>,
        slug: impl Into<String>,
        category_id: impl Into<String>,
        member_id: impl Into<String>,
    ) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            slug: slug.into(),
            create_date: Utc::now(),
            views: 0,
            is_sticky: false,
            is_locked: false,
            category_id: category_id.into(),
            member_id: member_id.into(),
            posts: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// True when any post has been marked as the accepted answer.
    pub fn is_solved(&self) -> bool {
        self.posts.iter().any(|p| p.is_solution)
    }
}

/// A single message posted in a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub topic_id: String,
    pub post_content: String,
    pub date_created: DateTime<Utc>,
    #[serde(default)]
    pub is_solution: bool,
    #[serde(default)]
    pub is_topic_starter: bool,
    pub member_id: String,
}

impl Post {
    pub fn new(post_content: impl Into<String>, member_id: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            topic_id: String::new(),
            post_content: post_content.into(),
            date_created: Utc::now(),
            is_solution: false,
            is_topic_starter: false,
            member_id: member_id.into(),
        }
    }
}
