//! Member persistence.

use crate::db::rows::{encode_timestamp, member_from_row, new_id};
use crate::db::UnitOfWork;
use crate::errors::AppError;
use crate::models::Member;

#[derive(Debug, Clone, Copy, Default)]
pub struct MemberRepository;

impl MemberRepository {
    pub fn new() -> Self {
        Self
    }

    /// Store a new member under a freshly generated id.
    pub async fn add(&self, uow: &mut UnitOfWork, mut member: Member) -> Result<Member, AppError> {
        member.id = new_id();

        sqlx::query("INSERT INTO members (id, user_name, email, create_date) VALUES (?, ?, ?, ?)")
            .bind(&member.id)
            .bind(&member.user_name)
            .bind(&member.email)
            .bind(encode_timestamp(&member.create_date))
            .execute(uow.conn())
            .await?;

        Ok(member)
    }

    pub async fn get(&self, uow: &mut UnitOfWork, id: &str) -> Result<Option<Member>, AppError> {
        let row = sqlx::query("SELECT id, user_name, email, create_date FROM members WHERE id = ?")
            .bind(id)
            .fetch_optional(uow.conn())
            .await?;

        row.as_ref().map(member_from_row).transpose()
    }

    pub async fn get_all(&self, uow: &mut UnitOfWork) -> Result<Vec<Member>, AppError> {
        let rows = sqlx::query(
            "SELECT id, user_name, email, create_date FROM members ORDER BY user_name",
        )
        .fetch_all(uow.conn())
        .await?;

        rows.iter().map(member_from_row).collect()
    }
}
