//! Row conversion helpers shared by the repositories.

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::errors::AppError;
use crate::models::{Category, Member, Post, Topic, TopicTag};

/// Fixed-width RFC 3339 with nanoseconds, so text order matches time order.
pub(crate) fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn decode_timestamp(value: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| AppError::Internal(format!("Invalid stored timestamp {:?}: {}", value, e)))
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Topic columns only; posts and tags are loaded separately.
pub(crate) fn topic_from_row(row: &SqliteRow) -> Result<Topic, AppError> {
    let create_date: String = row.try_get("create_date")?;
    Ok(Topic {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        create_date: decode_timestamp(&create_date)?,
        views: row.try_get("views")?,
        is_sticky: row.try_get("is_sticky")?,
        is_locked: row.try_get("is_locked")?,
        category_id: row.try_get("category_id")?,
        member_id: row.try_get("member_id")?,
        posts: Vec::new(),
        tags: Vec::new(),
    })
}

pub(crate) fn post_from_row(row: &SqliteRow) -> Result<Post, AppError> {
    let date_created: String = row.try_get("date_created")?;
    Ok(Post {
        id: row.try_get("id")?,
        topic_id: row.try_get("topic_id")?,
        post_content: row.try_get("post_content")?,
        date_created: decode_timestamp(&date_created)?,
        is_solution: row.try_get("is_solution")?,
        is_topic_starter: row.try_get("is_topic_starter")?,
        member_id: row.try_get("member_id")?,
    })
}

pub(crate) fn tag_from_row(row: &SqliteRow) -> Result<TopicTag, AppError> {
    Ok(TopicTag {
        id: row.try_get("id")?,
        tag: row.try_get("tag")?,
    })
}

pub(crate) fn member_from_row(row: &SqliteRow) -> Result<Member, AppError> {
    let create_date: String = row.try_get("create_date")?;
    Ok(Member {
        id: row.try_get("id")?,
        user_name: row.try_get("user_name")?,
        email: row.try_get("email")?,
        create_date: decode_timestamp(&create_date)?,
    })
}

pub(crate) fn category_from_row(row: &SqliteRow) -> Result<Category, AppError> {
    Ok(Category {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        sort_order: row.try_get("sort_order")?,
    })
}
