//! Category persistence.

use crate::db::rows::{category_from_row, new_id};
use crate::db::UnitOfWork;
use crate::errors::AppError;
use crate::models::Category;

#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryRepository;

impl CategoryRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn add(
        &self,
        uow: &mut UnitOfWork,
        mut category: Category,
    ) -> Result<Category, AppError> {
        category.id = new_id();

        sqlx::query("INSERT INTO categories (id, name, slug, sort_order) VALUES (?, ?, ?, ?)")
            .bind(&category.id)
            .bind(&category.name)
            .bind(&category.slug)
            .bind(category.sort_order)
            .execute(uow.conn())
            .await?;

        Ok(category)
    }

    pub async fn get(&self, uow: &mut UnitOfWork, id: &str) -> Result<Option<Category>, AppError> {
        let row = sqlx::query("SELECT id, name, slug, sort_order FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(uow.conn())
            .await?;

        row.as_ref().map(category_from_row).transpose()
    }

    /// All categories by sort order, then name.
    pub async fn get_all(&self, uow: &mut UnitOfWork) -> Result<Vec<Category>, AppError> {
        let rows = sqlx::query(
            "SELECT id, name, slug, sort_order FROM categories ORDER BY sort_order, name",
        )
        .fetch_all(uow.conn())
        .await?;

        rows.iter().map(category_from_row).collect()
    }
}
