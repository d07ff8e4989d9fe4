//! Topic repository: CRUD and listing queries over topics.
//!
//! Each listing is one [`TopicQuery`]. Matching topics are loaded with their
//! posts and tags.

use sqlx::Row;

use crate::db::query::{TopicFilter, TopicOrder, TopicQuery};
use crate::db::rows::{encode_timestamp, new_id, topic_from_row};
use crate::db::{PostRepository, TagRepository, UnitOfWork};
use crate::errors::AppError;
use crate::models::{PagedList, Topic};

#[derive(Debug, Clone, Copy, Default)]
pub struct TopicRepository {
    posts: PostRepository,
    tags: TagRepository,
}

impl TopicRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a query and attach posts and tags to every topic it returns.
    pub async fn query(
        &self,
        uow: &mut UnitOfWork,
        query: &TopicQuery,
    ) -> Result<Vec<Topic>, AppError> {
        let mut qb = query.to_select();
        let rows = qb.build().fetch_all(uow.conn()).await?;
        let mut topics = rows
            .iter()
            .map(topic_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        if topics.is_empty() {
            return Ok(topics);
        }

        let ids: Vec<String> = topics.iter().map(|t| t.id.clone()).collect();
        let mut posts = self.posts.get_by_topics(uow, &ids).await?;
        let mut tags = self.tags.get_by_topics(uow, &ids).await?;
        for topic in &mut topics {
            topic.posts = posts.remove(&topic.id).unwrap_or_default();
            topic.tags = tags.remove(&topic.id).unwrap_or_default();
        }
        Ok(topics)
    }

    /// Number of topics a query matches, ignoring its order and paging.
    pub async fn count(&self, uow: &mut UnitOfWork, query: &TopicQuery) -> Result<i64, AppError> {
        let mut qb = query.to_count();
        let row = qb.build().fetch_one(uow.conn()).await?;
        Ok(row.try_get("topic_count")?)
    }

    async fn paged(
        &self,
        uow: &mut UnitOfWork,
        query: TopicQuery,
        page_index: i64,
        page_size: i64,
        amount_to_take: i64,
    ) -> Result<PagedList<Topic>, AppError> {
        check_page(page_index, page_size)?;
        check_amount(amount_to_take)?;

        let query = query.page(page_index, page_size).ok_or_else(|| {
            AppError::Validation(format!(
                "page {} of size {} is out of range",
                page_index, page_size
            ))
        })?;
        let results = self.query(uow, &query).await?;

        // Reported total is capped at amount_to_take
        Ok(PagedList::clamped(
            results,
            page_index,
            page_size,
            amount_to_take,
        ))
    }

    pub async fn get_all(&self, uow: &mut UnitOfWork) -> Result<Vec<Topic>, AppError> {
        self.query(uow, &TopicQuery::new()).await
    }

    pub async fn get_highest_viewed_topics(
        &self,
        uow: &mut UnitOfWork,
        amount_to_take: i64,
    ) -> Result<Vec<Topic>, AppError> {
        check_amount(amount_to_take)?;
        let query = TopicQuery::new()
            .order_by(TopicOrder::MostViewed)
            .take(amount_to_take);
        self.query(uow, &query).await
    }

    /// Insert a topic under a fresh id, together with its tags and posts.
    ///
    /// The insert is part of the unit of work and becomes durable on commit.
    pub async fn add(&self, uow: &mut UnitOfWork, mut topic: Topic) -> Result<Topic, AppError> {
        topic.id = new_id();

        sqlx::query(
            r#"INSERT INTO topics (
                id, name, slug, create_date, views, is_sticky, is_locked, category_id, member_id
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&topic.id)
        .bind(&topic.name)
        .bind(&topic.slug)
        .bind(encode_timestamp(&topic.create_date))
        .bind(topic.views)
        .bind(topic.is_sticky)
        .bind(topic.is_locked)
        .bind(&topic.category_id)
        .bind(&topic.member_id)
        .execute(uow.conn())
        .await?;

        topic.tags = self.tags.link_topic(uow, &topic.id, &topic.tags).await?;

        let pending = std::mem::take(&mut topic.posts);
        for mut post in pending {
            post.topic_id = topic.id.clone();
            topic.posts.push(self.posts.add(uow, post).await?);
        }
        // Same order as reads: creation date, then insertion order.
        topic.posts.sort_by_key(|p| p.date_created);

        uow.track(&topic.id);
        tracing::debug!("Added topic {} ({})", topic.id, topic.slug);
        Ok(topic)
    }

    pub async fn get(&self, uow: &mut UnitOfWork, id: &str) -> Result<Option<Topic>, AppError> {
        let query = TopicQuery::new()
            .filter(TopicFilter::Id(id.to_string()))
            .take(1);
        Ok(self.query(uow, &query).await?.into_iter().next())
    }

    /// Remove a topic with its posts and tag links. Removing an absent topic does nothing.
    pub async fn delete(&self, uow: &mut UnitOfWork, topic: &Topic) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM topics WHERE id = ?")
            .bind(&topic.id)
            .execute(uow.conn())
            .await?;

        if result.rows_affected() == 0 {
            tracing::debug!("Delete of topic {} matched no rows", topic.id);
        }
        uow.forget(&topic.id);
        Ok(())
    }

    /// Write a modified topic and replace its tag links.
    ///
    /// Fails with [`AppError::AlreadyTracked`] when this unit of work already added
    /// or updated a topic with the same id.
    pub async fn update(&self, uow: &mut UnitOfWork, topic: &Topic) -> Result<(), AppError> {
        if uow.is_tracked(&topic.id) {
            return Err(AppError::AlreadyTracked(format!(
                "Topic {} is already tracked by this unit of work; changes are saved on commit",
                topic.id
            )));
        }

        let result = sqlx::query(
            r#"UPDATE topics SET
                name = ?, slug = ?, create_date = ?, views = ?, is_sticky = ?, is_locked = ?,
                category_id = ?, member_id = ?
            WHERE id = ?"#,
        )
        .bind(&topic.name)
        .bind(&topic.slug)
        .bind(encode_timestamp(&topic.create_date))
        .bind(topic.views)
        .bind(topic.is_sticky)
        .bind(topic.is_locked)
        .bind(&topic.category_id)
        .bind(&topic.member_id)
        .bind(&topic.id)
        .execute(uow.conn())
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Topic {} not found", topic.id)));
        }

        self.tags.link_topic(uow, &topic.id, &topic.tags).await?;
        uow.track(&topic.id);
        Ok(())
    }

    pub async fn get_recent_topics(
        &self,
        uow: &mut UnitOfWork,
        page_index: i64,
        page_size: i64,
        amount_to_take: i64,
    ) -> Result<PagedList<Topic>, AppError> {
        let query = TopicQuery::new().order_by(TopicOrder::Newest);
        self.paged(uow, query, page_index, page_size, amount_to_take)
            .await
    }

    pub async fn get_recent_rss_topics(
        &self,
        uow: &mut UnitOfWork,
        amount_to_take: i64,
    ) -> Result<Vec<Topic>, AppError> {
        check_amount(amount_to_take)?;
        let query = TopicQuery::new()
            .order_by(TopicOrder::Newest)
            .take(amount_to_take);
        self.query(uow, &query).await
    }

    pub async fn get_topics_by_user(
        &self,
        uow: &mut UnitOfWork,
        member_id: &str,
    ) -> Result<Vec<Topic>, AppError> {
        let query = TopicQuery::new().filter(TopicFilter::Member(member_id.to_string()));
        self.query(uow, &query).await
    }

    pub async fn get_all_topics_by_category(
        &self,
        uow: &mut UnitOfWork,
        category_id: &str,
    ) -> Result<Vec<Topic>, AppError> {
        let query = TopicQuery::new().filter(TopicFilter::Category(category_id.to_string()));
        self.query(uow, &query).await
    }

    pub async fn get_paged_topics_by_category(
        &self,
        uow: &mut UnitOfWork,
        page_index: i64,
        page_size: i64,
        amount_to_take: i64,
        category_id: &str,
    ) -> Result<PagedList<Topic>, AppError> {
        let query = TopicQuery::new()
            .filter(TopicFilter::Category(category_id.to_string()))
            .order_by(TopicOrder::StickyThenNewest);
        self.paged(uow, query, page_index, page_size, amount_to_take)
            .await
    }

    pub async fn get_paged_topics_all(
        &self,
        uow: &mut UnitOfWork,
        page_index: i64,
        page_size: i64,
        amount_to_take: i64,
    ) -> Result<PagedList<Topic>, AppError> {
        let query = TopicQuery::new().order_by(TopicOrder::StickyThenNewest);
        self.paged(uow, query, page_index, page_size, amount_to_take)
            .await
    }

    pub async fn get_rss_topics_by_category(
        &self,
        uow: &mut UnitOfWork,
        amount_to_take: i64,
        category_id: &str,
    ) -> Result<Vec<Topic>, AppError> {
        check_amount(amount_to_take)?;
        let query = TopicQuery::new()
            .filter(TopicFilter::Category(category_id.to_string()))
            .order_by(TopicOrder::Newest)
            .take(amount_to_take);
        self.query(uow, &query).await
    }

    pub async fn get_paged_topics_by_tag(
        &self,
        uow: &mut UnitOfWork,
        page_index: i64,
        page_size: i64,
        amount_to_take: i64,
        tag: &str,
    ) -> Result<PagedList<Topic>, AppError> {
        let query = TopicQuery::new()
            .filter(TopicFilter::Tag(tag.to_string()))
            .order_by(TopicOrder::StickyThenNewest);
        self.paged(uow, query, page_index, page_size, amount_to_take)
            .await
    }

    /// The single topic with this exact slug.
    ///
    /// Slugs are unique; finding more than one match is reported as
    /// [`AppError::InvariantViolation`].
    pub async fn get_topic_by_slug(
        &self,
        uow: &mut UnitOfWork,
        slug: &str,
    ) -> Result<Option<Topic>, AppError> {
        let query = TopicQuery::new()
            .filter(TopicFilter::SlugEquals(slug.to_string()))
            .take(2);
        let mut matches = self.query(uow, &query).await?;

        if matches.len() > 1 {
            tracing::error!("Slug {:?} is shared by more than one topic", slug);
            return Err(AppError::InvariantViolation(format!(
                "More than one topic has the slug {:?}",
                slug
            )));
        }
        Ok(matches.pop())
    }

    pub async fn get_topic_by_slug_like(
        &self,
        uow: &mut UnitOfWork,
        slug: &str,
    ) -> Result<Vec<Topic>, AppError> {
        let query = TopicQuery::new().filter(TopicFilter::SlugContains(slug.to_string()));
        self.query(uow, &query).await
    }

    pub async fn topic_count(&self, uow: &mut UnitOfWork) -> Result<i64, AppError> {
        self.count(uow, &TopicQuery::new()).await
    }

    /// Topics owned by the member that have at least one solution post.
    pub async fn get_solved_topics_by_member(
        &self,
        uow: &mut UnitOfWork,
        member_id: &str,
    ) -> Result<Vec<Topic>, AppError> {
        let query = TopicQuery::new()
            .filter(TopicFilter::Member(member_id.to_string()))
            .filter(TopicFilter::HasSolution);
        self.query(uow, &query).await
    }
}

fn check_page(page_index: i64, page_size: i64) -> Result<(), AppError> {
    if page_index < 1 {
        return Err(AppError::Validation(
            "pageIndex must be at least 1".to_string(),
        ));
    }
    if page_size < 1 {
        return Err(AppError::Validation(
            "pageSize must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn check_amount(amount_to_take: i64) -> Result<(), AppError> {
    if amount_to_take < 0 {
        return Err(AppError::Validation(
            "amountToTake must not be negative".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::db::test_support::{seed_owner, TestDb};
    use crate::db::{CategoryRepository, PostRepository, ID_BATCH_SIZE};
    use crate::models::{Category, Post, TopicTag};

    fn topic_on_day(slug: &str, category_id: &str, member_id: &str, day: u32) -> Topic {
        let mut topic = Topic::new(slug, slug, category_id, member_id);
        topic.create_date = Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0).unwrap();
        topic
    }

    /// T1: day 1, 50 views. T2: day 2, 10 views, sticky.
    async fn seed_example(
        repo: &TopicRepository,
        uow: &mut UnitOfWork,
    ) -> (Topic, Topic, String, String) {
        let (member_id, category_id) = seed_owner(uow).await;

        let mut t1 = topic_on_day("t1", &category_id, &member_id, 1);
        t1.views = 50;
        let mut t2 = topic_on_day("t2", &category_id, &member_id, 2);
        t2.views = 10;
        t2.is_sticky = true;

        let t1 = repo.add(uow, t1).await.unwrap();
        let t2 = repo.add(uow, t2).await.unwrap();
        (t1, t2, member_id, category_id)
    }

    fn slugs(topics: &[Topic]) -> Vec<&str> {
        topics.iter().map(|t| t.slug.as_str()).collect()
    }

    fn assert_sticky_then_newest(topics: &[Topic]) {
        for pair in topics.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.is_sticky >= b.is_sticky, "sticky topics must come first");
            if a.is_sticky == b.is_sticky {
                assert!(a.create_date >= b.create_date, "newest first within a group");
            }
        }
    }

    #[tokio::test]
    async fn test_highest_viewed_and_sticky_example() {
        let db = TestDb::new().await;
        let repo = TopicRepository::new();
        let mut uow = db.uow().await;
        let (t1, t2, _, _) = seed_example(&repo, &mut uow).await;

        let top = repo.get_highest_viewed_topics(&mut uow, 1).await.unwrap();
        assert_eq!(top, vec![t1.clone()]);

        let page = repo.get_paged_topics_all(&mut uow, 1, 10, 100).await.unwrap();
        assert_eq!(page.items(), &[t2, t1][..]);
        assert_eq!(page.total_count(), 2);
    }

    #[tokio::test]
    async fn test_add_then_get_returns_equal_topic() {
        let db = TestDb::new().await;
        let repo = TopicRepository::new();
        let mut uow = db.uow().await;
        let (member_id, category_id) = seed_owner(&mut uow).await;

        let mut topic = Topic::new("Hello world", "hello-world", &category_id, &member_id);
        topic.views = 7;
        topic.is_locked = true;
        topic.tags = vec![TopicTag::named("intro"), TopicTag::named("meta")];
        let mut starter = Post::new("First!", &member_id);
        starter.is_topic_starter = true;
        topic.posts = vec![starter];

        let added = repo.add(&mut uow, topic).await.unwrap();
        assert!(!added.id.is_empty());
        assert!(added.tags.iter().all(|t| !t.id.is_empty()));
        assert!(added.posts.iter().all(|p| p.topic_id == added.id));

        let fetched = repo.get(&mut uow, &added.id).await.unwrap();
        assert_eq!(fetched, Some(added));
    }

    #[tokio::test]
    async fn test_add_orders_posts_like_get() {
        let db = TestDb::new().await;
        let repo = TopicRepository::new();
        let mut uow = db.uow().await;
        let (member_id, category_id) = seed_owner(&mut uow).await;

        let mut earlier = Post::new("earlier", &member_id);
        let mut later = Post::new("later", &member_id);
        let mut tied = Post::new("tied", &member_id);
        earlier.date_created = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        later.date_created = earlier.date_created + Duration::hours(1);
        tied.date_created = earlier.date_created;

        let mut topic = Topic::new("Out of order", "out-of-order", &category_id, &member_id);
        topic.posts = vec![later, earlier, tied];

        let added = repo.add(&mut uow, topic).await.unwrap();
        let contents: Vec<&str> = added.posts.iter().map(|p| p.post_content.as_str()).collect();
        assert_eq!(contents, vec!["earlier", "tied", "later"]);

        let fetched = repo.get(&mut uow, &added.id).await.unwrap();
        assert_eq!(fetched, Some(added));
    }

    #[tokio::test]
    async fn test_add_generates_distinct_ids() {
        let db = TestDb::new().await;
        let repo = TopicRepository::new();
        let mut uow = db.uow().await;
        let (member_id, category_id) = seed_owner(&mut uow).await;

        let mut seen = std::collections::HashSet::new();
        for i in 0..10 {
            let slug = format!("topic-{}", i);
            let added = repo
                .add(&mut uow, Topic::new(&slug, &slug, &category_id, &member_id))
                .await
                .unwrap();
            assert!(seen.insert(added.id));
        }
        assert_eq!(repo.topic_count(&mut uow).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_get_missing_topic_is_none() {
        let db = TestDb::new().await;
        let mut uow = db.uow().await;
        let topic = TopicRepository::new().get(&mut uow, "missing").await.unwrap();
        assert!(topic.is_none());
    }

    #[tokio::test]
    async fn test_update_of_tracked_topic_fails() {
        let db = TestDb::new().await;
        let repo = TopicRepository::new();
        let mut uow = db.uow().await;
        let (member_id, category_id) = seed_owner(&mut uow).await;

        let added = repo
            .add(&mut uow, Topic::new("New", "new", &category_id, &member_id))
            .await
            .unwrap();
        let err = repo.update(&mut uow, &added).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyTracked(_)));
    }

    #[tokio::test]
    async fn test_update_of_untracked_topic_succeeds_once() {
        let db = TestDb::new().await;
        let repo = TopicRepository::new();

        let mut uow = db.uow().await;
        let (member_id, category_id) = seed_owner(&mut uow).await;
        let added = repo
            .add(&mut uow, Topic::new("Old name", "old", &category_id, &member_id))
            .await
            .unwrap();
        uow.commit().await.unwrap();

        let mut uow = db.uow().await;
        let mut topic = repo.get(&mut uow, &added.id).await.unwrap().unwrap();
        topic.name = "New name".to_string();
        topic.views = 99;
        topic.tags = vec![TopicTag::named("edited")];
        repo.update(&mut uow, &topic).await.unwrap();
        assert!(uow.is_tracked(&topic.id));

        let err = repo.update(&mut uow, &topic).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyTracked(_)));
        uow.commit().await.unwrap();

        let mut uow = db.uow().await;
        let stored = repo.get(&mut uow, &added.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "New name");
        assert_eq!(stored.views, 99);
        assert_eq!(
            stored.tags.iter().map(|t| t.tag.as_str()).collect::<Vec<_>>(),
            vec!["edited"]
        );
    }

    #[tokio::test]
    async fn test_update_of_missing_topic_is_not_found() {
        let db = TestDb::new().await;
        let repo = TopicRepository::new();
        let mut uow = db.uow().await;
        let (member_id, category_id) = seed_owner(&mut uow).await;

        let mut ghost = Topic::new("Ghost", "ghost", &category_id, &member_id);
        ghost.id = "never-added".to_string();
        let err = repo.update(&mut uow, &ghost).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_removes_topic_and_posts() {
        let db = TestDb::new().await;
        let repo = TopicRepository::new();
        let mut uow = db.uow().await;
        let (member_id, category_id) = seed_owner(&mut uow).await;

        let mut topic = Topic::new("Doomed", "doomed", &category_id, &member_id);
        topic.posts = vec![Post::new("bye", &member_id)];
        topic.tags = vec![TopicTag::named("gone")];
        let added = repo.add(&mut uow, topic).await.unwrap();

        repo.delete(&mut uow, &added).await.unwrap();
        assert!(!uow.is_tracked(&added.id));
        assert!(repo.get(&mut uow, &added.id).await.unwrap().is_none());
        assert!(PostRepository::new()
            .get_by_topic(&mut uow, &added.id)
            .await
            .unwrap()
            .is_empty());

        // A second delete is a no-op.
        repo.delete(&mut uow, &added).await.unwrap();
        assert_eq!(repo.topic_count(&mut uow).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_recent_topics_paging_and_clamp() {
        let db = TestDb::new().await;
        let repo = TopicRepository::new();
        let mut uow = db.uow().await;
        let (member_id, category_id) = seed_owner(&mut uow).await;

        for day in 1..=7 {
            let slug = format!("day-{}", day);
            repo.add(&mut uow, topic_on_day(&slug, &category_id, &member_id, day))
                .await
                .unwrap();
        }

        let first = repo.get_recent_topics(&mut uow, 1, 3, 100).await.unwrap();
        assert_eq!(slugs(first.items()), vec!["day-7", "day-6", "day-5"]);
        assert_eq!(first.total_count(), 3);

        let third = repo.get_recent_topics(&mut uow, 3, 3, 100).await.unwrap();
        assert_eq!(slugs(third.items()), vec!["day-1"]);
        assert_eq!(third.total_count(), 1);
        assert_eq!(third.page_index(), 3);

        let clamped = repo.get_recent_topics(&mut uow, 1, 5, 2).await.unwrap();
        assert_eq!(clamped.len(), 5);
        assert_eq!(clamped.total_count(), 2);

        let beyond = repo.get_recent_topics(&mut uow, 9, 3, 100).await.unwrap();
        assert!(beyond.is_empty());
        assert_eq!(beyond.total_count(), 0);
    }

    #[tokio::test]
    async fn test_page_results_never_exceed_page_size() {
        let db = TestDb::new().await;
        let repo = TopicRepository::new();
        let mut uow = db.uow().await;
        let (member_id, category_id) = seed_owner(&mut uow).await;

        for day in 1..=11 {
            let slug = format!("p-{}", day);
            repo.add(&mut uow, topic_on_day(&slug, &category_id, &member_id, day))
                .await
                .unwrap();
        }

        for page_index in 1..=4 {
            for page_size in 1..=5 {
                for cap in [0, 1, 3, 100] {
                    let page = repo
                        .get_recent_topics(&mut uow, page_index, page_size, cap)
                        .await
                        .unwrap();
                    assert!(page.len() as i64 <= page_size);
                    assert_eq!(page.total_count(), (page.len() as i64).min(cap));
                }
            }
        }
    }

    #[tokio::test]
    async fn test_invalid_paging_arguments_are_rejected() {
        let db = TestDb::new().await;
        let repo = TopicRepository::new();
        let mut uow = db.uow().await;

        for (page_index, page_size, cap) in [(0, 10, 100), (1, 0, 100), (1, 10, -1)] {
            let err = repo
                .get_paged_topics_all(&mut uow, page_index, page_size, cap)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
        let err = repo
            .get_highest_viewed_topics(&mut uow, -5)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_page_offset_overflow_is_rejected() {
        let db = TestDb::new().await;
        let repo = TopicRepository::new();
        let mut uow = db.uow().await;
        seed_example(&repo, &mut uow).await;

        let err = repo
            .get_recent_topics(&mut uow, 3, i64::MAX, 100)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = repo
            .get_paged_topics_by_tag(&mut uow, i64::MAX, 2, 100, "rust")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        // A huge page size on the first page is still a valid request.
        let page = repo
            .get_paged_topics_all(&mut uow, 1, i64::MAX, 100)
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page.total_pages(), 1);
    }

    #[tokio::test]
    async fn test_get_all_loads_posts_and_tags_across_id_batches() {
        let db = TestDb::new().await;
        let repo = TopicRepository::new();
        let mut uow = db.uow().await;
        let (member_id, category_id) = seed_owner(&mut uow).await;

        let total = ID_BATCH_SIZE * 2 + 7;
        for i in 0..total {
            let slug = format!("bulk-{}", i);
            let mut topic = Topic::new(&slug, &slug, &category_id, &member_id);
            if i == 0 || i == total - 1 {
                topic.posts = vec![Post::new(format!("post {}", i), &member_id)];
                topic.tags = vec![TopicTag::named(format!("tag-{}", i))];
            }
            repo.add(&mut uow, topic).await.unwrap();
        }

        let all = repo.get_all(&mut uow).await.unwrap();
        assert_eq!(all.len(), total);
        assert_eq!(all[0].posts[0].post_content, "post 0");
        assert_eq!(all[0].tags[0].tag, "tag-0");
        let last = &all[total - 1];
        assert_eq!(last.posts[0].post_content, format!("post {}", total - 1));
        assert_eq!(last.tags[0].tag, format!("tag-{}", total - 1));
        assert!(all[1..total - 1]
            .iter()
            .all(|t| t.posts.is_empty() && t.tags.is_empty()));
    }

    #[tokio::test]
    async fn test_paged_all_second_page_continues_after_first() {
        let db = TestDb::new().await;
        let repo = TopicRepository::new();
        let mut uow = db.uow().await;
        let (member_id, category_id) = seed_owner(&mut uow).await;

        for day in 1..=4 {
            let slug = format!("all-{}", day);
            let mut topic = topic_on_day(&slug, &category_id, &member_id, day);
            topic.is_sticky = day == 1;
            repo.add(&mut uow, topic).await.unwrap();
        }

        let first = repo.get_paged_topics_all(&mut uow, 1, 2, 100).await.unwrap();
        let second = repo.get_paged_topics_all(&mut uow, 2, 2, 100).await.unwrap();
        assert_eq!(slugs(first.items()), vec!["all-1", "all-4"]);
        assert_eq!(slugs(second.items()), vec!["all-3", "all-2"]);
    }

    #[tokio::test]
    async fn test_category_listing_is_filtered_and_sticky_first() {
        let db = TestDb::new().await;
        let repo = TopicRepository::new();
        let mut uow = db.uow().await;
        let (member_id, general_id) = seed_owner(&mut uow).await;
        let other = CategoryRepository::new()
            .add(&mut uow, Category::new("Other", "other"))
            .await
            .unwrap();

        for (day, sticky) in [(1, false), (2, true), (3, false), (4, true), (5, false)] {
            let slug = format!("g-{}", day);
            let mut topic = topic_on_day(&slug, &general_id, &member_id, day);
            topic.is_sticky = sticky;
            repo.add(&mut uow, topic).await.unwrap();
        }
        repo.add(&mut uow, topic_on_day("o-9", &other.id, &member_id, 9))
            .await
            .unwrap();

        let page = repo
            .get_paged_topics_by_category(&mut uow, 1, 10, 100, &general_id)
            .await
            .unwrap();
        assert_eq!(slugs(page.items()), vec!["g-4", "g-2", "g-5", "g-3", "g-1"]);
        assert_sticky_then_newest(page.items());

        let all = repo
            .get_all_topics_by_category(&mut uow, &other.id)
            .await
            .unwrap();
        assert_eq!(slugs(&all), vec!["o-9"]);

        let rss = repo
            .get_rss_topics_by_category(&mut uow, 2, &general_id)
            .await
            .unwrap();
        assert_eq!(slugs(&rss), vec!["g-5", "g-4"]);
    }

    #[tokio::test]
    async fn test_tag_listing() {
        let db = TestDb::new().await;
        let repo = TopicRepository::new();
        let mut uow = db.uow().await;
        let (member_id, category_id) = seed_owner(&mut uow).await;

        for (day, sticky, tags) in [
            (1, false, vec!["rust"]),
            (2, false, vec!["go"]),
            (3, true, vec!["rust", "async"]),
            (4, false, vec!["rust"]),
        ] {
            let slug = format!("tag-{}", day);
            let mut topic = topic_on_day(&slug, &category_id, &member_id, day);
            topic.is_sticky = sticky;
            topic.tags = tags.into_iter().map(TopicTag::named).collect();
            repo.add(&mut uow, topic).await.unwrap();
        }

        let page = repo
            .get_paged_topics_by_tag(&mut uow, 1, 10, 100, "rust")
            .await
            .unwrap();
        assert_eq!(slugs(page.items()), vec!["tag-3", "tag-4", "tag-1"]);
        assert_sticky_then_newest(page.items());

        let second = repo
            .get_paged_topics_by_tag(&mut uow, 2, 2, 100, "rust")
            .await
            .unwrap();
        assert_eq!(slugs(second.items()), vec!["tag-1"]);

        let none = repo
            .get_paged_topics_by_tag(&mut uow, 1, 10, 100, "Rust")
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_rss_and_user_listings() {
        let db = TestDb::new().await;
        let repo = TopicRepository::new();
        let mut uow = db.uow().await;
        let (t1, t2, member_id, _) = seed_example(&repo, &mut uow).await;

        let rss = repo.get_recent_rss_topics(&mut uow, 1).await.unwrap();
        assert_eq!(rss, vec![t2.clone()]);

        let by_user = repo.get_topics_by_user(&mut uow, &member_id).await.unwrap();
        assert_eq!(by_user, vec![t1, t2]);
        assert!(repo
            .get_topics_by_user(&mut uow, "someone-else")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_equal_timestamps_keep_insertion_order() {
        let db = TestDb::new().await;
        let repo = TopicRepository::new();
        let mut uow = db.uow().await;
        let (member_id, category_id) = seed_owner(&mut uow).await;

        for slug in ["same-a", "same-b", "same-c"] {
            repo.add(&mut uow, topic_on_day(slug, &category_id, &member_id, 3))
                .await
                .unwrap();
        }
        let page = repo.get_recent_topics(&mut uow, 1, 10, 100).await.unwrap();
        assert_eq!(slugs(page.items()), vec!["same-a", "same-b", "same-c"]);
    }

    #[tokio::test]
    async fn test_get_topic_by_slug() {
        let db = TestDb::new().await;
        let repo = TopicRepository::new();
        let mut uow = db.uow().await;
        let (member_id, category_id) = seed_owner(&mut uow).await;

        let unique = repo
            .add(&mut uow, Topic::new("Unique", "unique", &category_id, &member_id))
            .await
            .unwrap();
        for _ in 0..2 {
            repo.add(&mut uow, Topic::new("Dup", "dup", &category_id, &member_id))
                .await
                .unwrap();
        }

        let found = repo.get_topic_by_slug(&mut uow, "unique").await.unwrap();
        assert_eq!(found, Some(unique));
        assert!(repo
            .get_topic_by_slug(&mut uow, "absent")
            .await
            .unwrap()
            .is_none());

        let err = repo.get_topic_by_slug(&mut uow, "dup").await.unwrap_err();
        assert!(matches!(err, AppError::InvariantViolation(_)));
    }

    #[tokio::test]
    async fn test_get_topic_by_slug_like() {
        let db = TestDb::new().await;
        let repo = TopicRepository::new();
        let mut uow = db.uow().await;
        let (member_id, category_id) = seed_owner(&mut uow).await;

        for slug in ["rust-intro", "intro-to-go", "advanced-rust", "Intro"] {
            repo.add(&mut uow, Topic::new(slug, slug, &category_id, &member_id))
                .await
                .unwrap();
        }

        let matches = repo.get_topic_by_slug_like(&mut uow, "intro").await.unwrap();
        assert_eq!(slugs(&matches), vec!["rust-intro", "intro-to-go"]);

        // LIKE wildcards are matched literally.
        let wildcard = repo.get_topic_by_slug_like(&mut uow, "%").await.unwrap();
        assert!(wildcard.is_empty());
    }

    #[tokio::test]
    async fn test_solved_topics_by_member() {
        let db = TestDb::new().await;
        let repo = TopicRepository::new();
        let posts = PostRepository::new();
        let mut uow = db.uow().await;
        let (member_id, category_id) = seed_owner(&mut uow).await;

        let mut solved = Topic::new("Solved", "solved", &category_id, &member_id);
        let question = Post::new("question", &member_id);
        let mut answer = Post::new("answer", &member_id);
        answer.date_created = question.date_created + Duration::seconds(1);
        answer.is_solution = true;
        solved.posts = vec![question, answer];
        let solved = repo.add(&mut uow, solved).await.unwrap();

        let mut open = Topic::new("Open", "open", &category_id, &member_id);
        open.posts = vec![Post::new("still waiting", &member_id)];
        let open = repo.add(&mut uow, open).await.unwrap();

        let result = repo
            .get_solved_topics_by_member(&mut uow, &member_id)
            .await
            .unwrap();
        assert_eq!(result, vec![solved.clone()]);
        assert!(result[0].is_solved());

        posts
            .mark_solution(&mut uow, &open.posts[0].id, true)
            .await
            .unwrap();
        let result = repo
            .get_solved_topics_by_member(&mut uow, &member_id)
            .await
            .unwrap();
        assert_eq!(slugs(&result), vec!["solved", "open"]);
    }

    #[tokio::test]
    async fn test_uncommitted_add_is_not_visible_elsewhere() {
        let db = TestDb::new().await;
        let repo = TopicRepository::new();

        let mut setup = db.uow().await;
        let (member_id, category_id) = seed_owner(&mut setup).await;
        setup.commit().await.unwrap();

        let mut writer = db.uow().await;
        let mut topic = Topic::new("Draft", "draft", &category_id, &member_id);
        topic.create_date = Utc::now() - Duration::minutes(1);
        let added = repo.add(&mut writer, topic).await.unwrap();
        writer.rollback().await.unwrap();

        let mut reader = db.uow().await;
        assert!(repo.get(&mut reader, &added.id).await.unwrap().is_none());
        assert_eq!(repo.get_all(&mut reader).await.unwrap().len(), 0);
    }
}
