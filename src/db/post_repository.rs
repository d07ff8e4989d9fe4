//! Post persistence.

use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite};

use crate::db::rows::{encode_timestamp, new_id, post_from_row};
use crate::db::{UnitOfWork, ID_BATCH_SIZE};
use crate::errors::AppError;
use crate::models::Post;

const POST_COLUMNS: &str =
    "id, topic_id, post_content, date_created, is_solution, is_topic_starter, member_id";

#[derive(Debug, Clone, Copy, Default)]
pub struct PostRepository;

impl PostRepository {
    pub fn new() -> Self {
        Self
    }

    /// Store a post. An empty id is replaced with a generated one.
    pub async fn add(&self, uow: &mut UnitOfWork, mut post: Post) -> Result<Post, AppError> {
        if post.id.is_empty() {
            post.id = new_id();
        }

        sqlx::query(
            "INSERT INTO posts (id, topic_id, post_content, date_created, is_solution, is_topic_starter, member_id) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&post.id)
        .bind(&post.topic_id)
        .bind(&post.post_content)
        .bind(encode_timestamp(&post.date_created))
        .bind(post.is_solution)
        .bind(post.is_topic_starter)
        .bind(&post.member_id)
        .execute(uow.conn())
        .await?;

        Ok(post)
    }

    /// Posts of one topic, oldest first.
    pub async fn get_by_topic(
        &self,
        uow: &mut UnitOfWork,
        topic_id: &str,
    ) -> Result<Vec<Post>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM posts WHERE topic_id = ? ORDER BY date_created, rowid",
            POST_COLUMNS
        ))
        .bind(topic_id)
        .fetch_all(uow.conn())
        .await?;

        rows.iter().map(post_from_row).collect()
    }

    /// Flag or unflag a post as the accepted answer of its topic.
    pub async fn mark_solution(
        &self,
        uow: &mut UnitOfWork,
        post_id: &str,
        is_solution: bool,
    ) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE posts SET is_solution = ? WHERE id = ?")
            .bind(is_solution)
            .bind(post_id)
            .execute(uow.conn())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Post {} not found", post_id)));
        }
        Ok(())
    }

    /// Posts for a set of topics, grouped by topic id.
    pub(crate) async fn get_by_topics(
        &self,
        uow: &mut UnitOfWork,
        topic_ids: &[String],
    ) -> Result<HashMap<String, Vec<Post>>, AppError> {
        let mut grouped: HashMap<String, Vec<Post>> = HashMap::new();
        if topic_ids.is_empty() {
            return Ok(grouped);
        }

        for batch in topic_ids.chunks(ID_BATCH_SIZE) {
            let mut qb: QueryBuilder<'_, Sqlite> =
                QueryBuilder::new(format!("SELECT {} FROM posts WHERE topic_id IN (", POST_COLUMNS));
            let mut separated = qb.separated(", ");
            for id in batch {
                separated.push_bind(id);
            }
            separated.push_unseparated(") ORDER BY date_created, rowid");

            let rows = qb.build().fetch_all(uow.conn()).await?;
            for row in &rows {
                let post = post_from_row(row)?;
                grouped.entry(post.topic_id.clone()).or_default().push(post);
            }
        }
        Ok(grouped)
    }
}
