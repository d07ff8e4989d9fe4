//! Request-scoped transaction with entity tracking.

use std::collections::HashSet;

use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};

use crate::errors::AppError;

/// Hands out one [`UnitOfWork`] per logical request.
#[derive(Clone)]
pub struct UnitOfWorkManager {
    pool: SqlitePool,
}

impl UnitOfWorkManager {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Begin a new unit of work on a pooled connection.
    pub async fn new_unit_of_work(&self) -> Result<UnitOfWork, AppError> {
        let tx = self.pool.begin().await?;
        Ok(UnitOfWork {
            tx,
            tracked: HashSet::new(),
        })
    }
}

/// A transaction bracketing one request's reads and writes.
///
/// Writes become durable only through [`UnitOfWork::commit`]. Dropping the
/// value without committing rolls the transaction back, so every exit path
/// releases the connection.
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
    /// Ids of topics added or updated in this unit of work.
    tracked: HashSet<String>,
}

impl UnitOfWork {
    pub(crate) fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }

    /// Whether an entity with this id was added or updated in this unit of work.
    pub fn is_tracked(&self, id: &str) -> bool {
        self.tracked.contains(id)
    }

    pub(crate) fn track(&mut self, id: &str) {
        self.tracked.insert(id.to_string());
    }

    pub(crate) fn forget(&mut self, id: &str) {
        self.tracked.remove(id);
    }

    pub async fn commit(self) -> Result<(), AppError> {
        let pending = self.tracked.len();
        self.tx.commit().await?;
        tracing::debug!("Committed unit of work ({} tracked entities)", pending);
        Ok(())
    }

    pub async fn rollback(self) -> Result<(), AppError> {
        self.tx.rollback().await?;
        tracing::debug!("Rolled back unit of work");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::db::test_support::{seed_owner, TestDb};
    use crate::db::MemberRepository;

    #[tokio::test]
    async fn test_dropped_unit_of_work_rolls_back() {
        let db = TestDb::new().await;
        let members = MemberRepository::new();

        {
            let mut uow = db.uow().await;
            seed_owner(&mut uow).await;
            assert_eq!(members.get_all(&mut uow).await.unwrap().len(), 1);
        }

        let mut uow = db.uow().await;
        assert!(members.get_all(&mut uow).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_commit_persists_writes() {
        let db = TestDb::new().await;
        let members = MemberRepository::new();

        let mut uow = db.uow().await;
        let (member_id, _) = seed_owner(&mut uow).await;
        uow.commit().await.unwrap();

        let mut uow = db.uow().await;
        let member = members.get(&mut uow, &member_id).await.unwrap();
        assert_eq!(member.map(|m| m.user_name), Some("alice".to_string()));
    }

    #[tokio::test]
    async fn test_explicit_rollback_discards_writes() {
        let db = TestDb::new().await;
        let members = MemberRepository::new();

        let mut uow = db.uow().await;
        seed_owner(&mut uow).await;
        uow.rollback().await.unwrap();

        let mut uow = db.uow().await;
        assert!(members.get_all(&mut uow).await.unwrap().is_empty());
    }
}
