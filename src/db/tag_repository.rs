//! Tag persistence and popularity ranking.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{QueryBuilder, Row, Sqlite};

use crate::db::rows::{new_id, tag_from_row};
use crate::db::{UnitOfWork, ID_BATCH_SIZE};
use crate::errors::AppError;
use crate::models::{PopularTag, TopicTag};
use crate::services::TopicTagService;

#[derive(Debug, Clone, Copy, Default)]
pub struct TagRepository;

impl TagRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn get_by_name(
        &self,
        uow: &mut UnitOfWork,
        tag: &str,
    ) -> Result<Option<TopicTag>, AppError> {
        let row = sqlx::query("SELECT id, tag FROM topic_tags WHERE tag = ?")
            .bind(tag)
            .fetch_optional(uow.conn())
            .await?;

        row.as_ref().map(tag_from_row).transpose()
    }

    /// Return the stored tag with this label, creating it if needed.
    pub async fn get_or_create(
        &self,
        uow: &mut UnitOfWork,
        tag: &str,
    ) -> Result<TopicTag, AppError> {
        if let Some(existing) = self.get_by_name(uow, tag).await? {
            return Ok(existing);
        }

        let created = TopicTag {
            id: new_id(),
            tag: tag.to_string(),
        };
        sqlx::query("INSERT INTO topic_tags (id, tag) VALUES (?, ?)")
            .bind(&created.id)
            .bind(&created.tag)
            .execute(uow.conn())
            .await?;

        tracing::debug!("Created tag {:?}", created.tag);
        Ok(created)
    }

    pub async fn get_all(&self, uow: &mut UnitOfWork) -> Result<Vec<TopicTag>, AppError> {
        let rows = sqlx::query("SELECT id, tag FROM topic_tags ORDER BY tag")
            .fetch_all(uow.conn())
            .await?;

        rows.iter().map(tag_from_row).collect()
    }

    /// Tags by number of linked topics, most used first; ties by label.
    pub async fn get_popular_tags(
        &self,
        uow: &mut UnitOfWork,
        amount_to_take: i64,
    ) -> Result<Vec<PopularTag>, AppError> {
        if amount_to_take < 0 {
            return Err(AppError::Validation(
                "amountToTake must not be negative".to_string(),
            ));
        }

        let rows = sqlx::query(
            r#"SELECT g.tag AS tag, COUNT(l.topic_id) AS topic_count
               FROM topic_tags g
               JOIN topic_tag_links l ON l.tag_id = g.id
               GROUP BY g.id, g.tag
               ORDER BY topic_count DESC, g.tag
               LIMIT ?"#,
        )
        .bind(amount_to_take)
        .fetch_all(uow.conn())
        .await?;

        rows.iter()
            .map(|row| {
                Ok(PopularTag {
                    tag: row.try_get("tag")?,
                    topic_count: row.try_get("topic_count")?,
                })
            })
            .collect()
    }

    /// Replace the tag links of a topic, creating missing tags.
    ///
    /// Duplicate labels collapse to their first occurrence. Returns the stored tags
    /// in the order given.
    pub(crate) async fn link_topic(
        &self,
        uow: &mut UnitOfWork,
        topic_id: &str,
        tags: &[TopicTag],
    ) -> Result<Vec<TopicTag>, AppError> {
        sqlx::query("DELETE FROM topic_tag_links WHERE topic_id = ?")
            .bind(topic_id)
            .execute(uow.conn())
            .await?;

        let mut linked: Vec<TopicTag> = Vec::with_capacity(tags.len());
        for tag in tags {
            if linked.iter().any(|t| t.tag == tag.tag) {
                continue;
            }
            let stored = self.get_or_create(uow, &tag.tag).await?;
            sqlx::query("INSERT INTO topic_tag_links (topic_id, tag_id) VALUES (?, ?)")
                .bind(topic_id)
                .bind(&stored.id)
                .execute(uow.conn())
                .await?;
            linked.push(stored);
        }
        Ok(linked)
    }

    /// Tags for a set of topics, grouped by topic id, in link order.
    pub(crate) async fn get_by_topics(
        &self,
        uow: &mut UnitOfWork,
        topic_ids: &[String],
    ) -> Result<HashMap<String, Vec<TopicTag>>, AppError> {
        let mut grouped: HashMap<String, Vec<TopicTag>> = HashMap::new();
        if topic_ids.is_empty() {
            return Ok(grouped);
        }

        for batch in topic_ids.chunks(ID_BATCH_SIZE) {
            let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
                "SELECT l.topic_id AS topic_id, g.id AS id, g.tag AS tag \
                 FROM topic_tag_links l JOIN topic_tags g ON g.id = l.tag_id \
                 WHERE l.topic_id IN (",
            );
            let mut separated = qb.separated(", ");
            for id in batch {
                separated.push_bind(id);
            }
            separated.push_unseparated(") ORDER BY l.rowid");

            let rows = qb.build().fetch_all(uow.conn()).await?;
            for row in &rows {
                let topic_id: String = row.try_get("topic_id")?;
                grouped.entry(topic_id).or_default().push(tag_from_row(row)?);
            }
        }
        Ok(grouped)
    }
}

#[async_trait]
impl TopicTagService for TagRepository {
    async fn get_popular_tags(
        &self,
        uow: &mut UnitOfWork,
        max_count: i64,
    ) -> Result<Vec<PopularTag>, AppError> {
        TagRepository::get_popular_tags(self, uow, max_count).await
    }
}
