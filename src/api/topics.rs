//! Topic API endpoints.

use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};

use super::{success, ApiResult, PageParams, MAX_PAGE_SIZE};
use crate::errors::AppError;
use crate::models::{PagedList, Topic};
use crate::AppState;

/// A page of topics with its navigation metadata.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicPage {
    pub items: Vec<Topic>,
    pub page_index: i64,
    pub page_size: i64,
    pub total_count: i64,
    pub total_pages: i64,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

impl From<PagedList<Topic>> for TopicPage {
    fn from(page: PagedList<Topic>) -> Self {
        Self {
            page_index: page.page_index(),
            page_size: page.page_size(),
            total_count: page.total_count(),
            total_pages: page.total_pages(),
            has_previous_page: page.has_previous_page(),
            has_next_page: page.has_next_page(),
            items: page.into_items(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AmountParams {
    #[serde(default)]
    pub amount: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct TopicCount {
    pub count: i64,
}

/// GET /api/topics - Paged topics, sticky first.
pub async fn list_topics(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> ApiResult<TopicPage> {
    let (page_index, page_size, amount_to_take) = params.resolve(&state.config);
    let mut uow = state.uow.new_unit_of_work().await?;

    let page = state
        .topics
        .get_paged_topics_all(&mut uow, page_index, page_size, amount_to_take)
        .await?;
    success(page.into())
}

/// GET /api/topics/recent - Paged topics, newest first.
pub async fn recent_topics(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> ApiResult<TopicPage> {
    let (page_index, page_size, amount_to_take) = params.resolve(&state.config);
    let mut uow = state.uow.new_unit_of_work().await?;

    let page = state
        .topics
        .get_recent_topics(&mut uow, page_index, page_size, amount_to_take)
        .await?;
    success(page.into())
}

/// GET /api/topics/popular - Most viewed topics.
pub async fn popular_topics(
    State(state): State<AppState>,
    Query(params): Query<AmountParams>,
) -> ApiResult<Vec<Topic>> {
    let amount = params
        .amount
        .unwrap_or(state.config.default_page_size)
        .min(MAX_PAGE_SIZE);
    let mut uow = state.uow.new_unit_of_work().await?;

    let topics = state
        .topics
        .get_highest_viewed_topics(&mut uow, amount)
        .await?;
    success(topics)
}

/// GET /api/topics/count - Total number of topics.
pub async fn topic_count(State(state): State<AppState>) -> ApiResult<TopicCount> {
    let mut uow = state.uow.new_unit_of_work().await?;
    let count = state.topics.topic_count(&mut uow).await?;
    success(TopicCount { count })
}

/// GET /api/topics/{id} - Get a single topic.
pub async fn get_topic(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Topic> {
    let mut uow = state.uow.new_unit_of_work().await?;

    match state.topics.get(&mut uow, &id).await? {
        Some(topic) => success(topic),
        None => Err(AppError::NotFound(format!("Topic {} not found", id))),
    }
}

/// GET /api/topics/slug/{slug} - Get a topic by its slug.
pub async fn get_topic_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Topic> {
    let mut uow = state.uow.new_unit_of_work().await?;

    match state.topics.get_topic_by_slug(&mut uow, &slug).await? {
        Some(topic) => success(topic),
        None => Err(AppError::NotFound(format!(
            "Topic with slug {:?} not found",
            slug
        ))),
    }
}

/// GET /api/categories/{id}/topics - Paged topics of a category.
pub async fn category_topics(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
    Query(params): Query<PageParams>,
) -> ApiResult<TopicPage> {
    let (page_index, page_size, amount_to_take) = params.resolve(&state.config);
    let mut uow = state.uow.new_unit_of_work().await?;

    let page = state
        .topics
        .get_paged_topics_by_category(
            &mut uow,
            page_index,
            page_size,
            amount_to_take,
            &category_id,
        )
        .await?;
    success(page.into())
}

/// GET /api/tags/{tag}/topics - Paged topics carrying a tag.
pub async fn tag_topics(
    State(state): State<AppState>,
    Path(tag): Path<String>,
    Query(params): Query<PageParams>,
) -> ApiResult<TopicPage> {
    let (page_index, page_size, amount_to_take) = params.resolve(&state.config);
    let mut uow = state.uow.new_unit_of_work().await?;

    let page = state
        .topics
        .get_paged_topics_by_tag(&mut uow, page_index, page_size, amount_to_take, &tag)
        .await?;
    success(page.into())
}

/// GET /api/members/{id}/topics - Topics started by a member.
pub async fn member_topics(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
) -> ApiResult<Vec<Topic>> {
    let mut uow = state.uow.new_unit_of_work().await?;
    let topics = state.topics.get_topics_by_user(&mut uow, &member_id).await?;
    success(topics)
}

/// GET /api/members/{id}/solved - A member's topics that have a solution.
pub async fn member_solved_topics(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
) -> ApiResult<Vec<Topic>> {
    let mut uow = state.uow.new_unit_of_work().await?;
    let topics = state
        .topics
        .get_solved_topics_by_member(&mut uow, &member_id)
        .await?;
    success(topics)
}
