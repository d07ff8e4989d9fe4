//! Collaborator interfaces consumed by the web layer.

use async_trait::async_trait;

use crate::db::UnitOfWork;
use crate::errors::AppError;
use crate::models::PopularTag;

/// Ranks tags by how many topics use them.
#[async_trait]
pub trait TopicTagService: Send + Sync {
    /// At most `max_count` tags, most used first.
    async fn get_popular_tags(
        &self,
        uow: &mut UnitOfWork,
        max_count: i64,
    ) -> Result<Vec<PopularTag>, AppError>;
}
