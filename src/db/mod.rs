//! Database module for SQLite persistence.
//!
//! SQLite is the source of truth for all forum data. Every repository call runs
//! inside a [`UnitOfWork`] handed in by the caller.

mod category_repository;
mod member_repository;
mod post_repository;
mod query;
mod rows;
mod tag_repository;
mod topic_repository;
mod unit_of_work;

pub use category_repository::*;
pub use member_repository::*;
pub use post_repository::*;
pub use query::*;
pub use tag_repository::*;
pub use topic_repository::*;
pub use unit_of_work::*;

/// Most ids bound into one `IN (...)` list, well under SQLite's variable limit.
pub(crate) const ID_BATCH_SIZE: usize = 500;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    tracing::debug!("Database ready at {}", db_path.display());
    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS members (
            id TEXT PRIMARY KEY,
            user_name TEXT NOT NULL,
            email TEXT,
            create_date TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            slug TEXT NOT NULL,
            sort_order INTEGER NOT NULL DEFAULT 0
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Slug uniqueness is enforced by the write path, not by an index, so that
    // a violation stays visible to slug lookups.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS topics (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            slug TEXT NOT NULL,
            create_date TEXT NOT NULL,
            views INTEGER NOT NULL DEFAULT 0,
            is_sticky INTEGER NOT NULL DEFAULT 0,
            is_locked INTEGER NOT NULL DEFAULT 0,
            category_id TEXT NOT NULL REFERENCES categories(id),
            member_id TEXT NOT NULL REFERENCES members(id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            id TEXT PRIMARY KEY,
            topic_id TEXT NOT NULL REFERENCES topics(id) ON DELETE CASCADE,
            post_content TEXT NOT NULL,
            date_created TEXT NOT NULL,
            is_solution INTEGER NOT NULL DEFAULT 0,
            is_topic_starter INTEGER NOT NULL DEFAULT 0,
            member_id TEXT NOT NULL REFERENCES members(id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS topic_tags (
            id TEXT PRIMARY KEY,
            tag TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS topic_tag_links (
            topic_id TEXT NOT NULL REFERENCES topics(id) ON DELETE CASCADE,
            tag_id TEXT NOT NULL REFERENCES topic_tags(id) ON DELETE CASCADE,
            PRIMARY KEY (topic_id, tag_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for common queries
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_topics_slug ON topics(slug);
        CREATE INDEX IF NOT EXISTS idx_topics_create_date ON topics(create_date);
        CREATE INDEX IF NOT EXISTS idx_topics_category ON topics(category_id);
        CREATE INDEX IF NOT EXISTS idx_topics_member ON topics(member_id);
        CREATE INDEX IF NOT EXISTS idx_posts_topic ON posts(topic_id);
        CREATE INDEX IF NOT EXISTS idx_topic_tag_links_tag ON topic_tag_links(tag_id);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
