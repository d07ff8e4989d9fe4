//! Tag partials.

use std::sync::Arc;

use axum::extract::State;
use serde::Serialize;

use super::{success, ApiResult};
use crate::db::UnitOfWorkManager;
use crate::errors::AppError;
use crate::models::PopularTagViewModel;
use crate::services::TopicTagService;
use crate::AppState;

/// A fragment meant to be embedded in a page rendered elsewhere.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialView<T: Serialize> {
    pub view_name: &'static str,
    pub model: T,
}

/// Builds tag-related partial views.
pub struct TagController {
    uow: Arc<UnitOfWorkManager>,
    tag_service: Arc<dyn TopicTagService>,
    popular_tag_count: i64,
}

impl TagController {
    pub fn new(
        uow: Arc<UnitOfWorkManager>,
        tag_service: Arc<dyn TopicTagService>,
        popular_tag_count: i64,
    ) -> Self {
        Self {
            uow,
            tag_service,
            popular_tag_count,
        }
    }

    /// The most used tags, ranked by the tag service.
    pub async fn popular_tags(&self) -> Result<PartialView<PopularTagViewModel>, AppError> {
        let mut uow = self.uow.new_unit_of_work().await?;
        let popular_tags = self
            .tag_service
            .get_popular_tags(&mut uow, self.popular_tag_count)
            .await?;
        uow.commit().await?;

        Ok(PartialView {
            view_name: "PopularTags",
            model: PopularTagViewModel { popular_tags },
        })
    }
}

/// GET /api/partials/popular-tags - Popular tags partial.
pub async fn popular_tags_partial(
    State(state): State<AppState>,
) -> ApiResult<PartialView<PopularTagViewModel>> {
    success(state.tag_controller.popular_tags().await?)
}
