//! HTTP API module.
//!
//! Read-only JSON endpoints over the topic repository and the popular tags partial.

mod tags;
mod topics;

pub use tags::*;
pub use topics::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// Maximum page size or amount a listing request may ask for.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Paging parameters accepted by listing endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub page_size: Option<i64>,
    #[serde(default)]
    pub amount_to_take: Option<i64>,
}

impl PageParams {
    /// `(page_index, page_size, amount_to_take)` with configured defaults filled in.
    pub fn resolve(&self, config: &crate::config::Config) -> (i64, i64, i64) {
        (
            self.page.unwrap_or(1),
            self.page_size
                .unwrap_or(config.default_page_size)
                .min(MAX_PAGE_SIZE),
            self.amount_to_take.unwrap_or(config.amount_to_take),
        )
    }
}
