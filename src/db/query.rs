//! Explicit topic query builder.
//!
//! Every topic listing is described as a [`TopicQuery`] value (filters, order,
//! skip and take) and rendered to SQL with `sqlx::QueryBuilder`.

use sqlx::{QueryBuilder, Sqlite};

/// Columns selected for a topic row, aliased on `t`.
pub(crate) const TOPIC_COLUMNS: &str = "t.id, t.name, t.slug, t.create_date, t.views, \
     t.is_sticky, t.is_locked, t.category_id, t.member_id";

/// A predicate restricting which topics match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicFilter {
    Id(String),
    Category(String),
    Member(String),
    /// Topics carrying a tag with exactly this label.
    Tag(String),
    SlugEquals(String),
    /// Case-sensitive substring match on the slug.
    SlugContains(String),
    /// Topics with at least one post marked as the solution.
    HasSolution,
}

/// Result ordering. Every variant ends on insertion order to break ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TopicOrder {
    #[default]
    StoreDefault,
    Newest,
    MostViewed,
    /// Sticky topics first, then newest first within each group.
    StickyThenNewest,
}

impl TopicOrder {
    fn as_sql(&self) -> &'static str {
        match self {
            TopicOrder::StoreDefault => " ORDER BY t.rowid",
            TopicOrder::Newest => " ORDER BY t.create_date DESC, t.rowid",
            TopicOrder::MostViewed => " ORDER BY t.views DESC, t.rowid",
            TopicOrder::StickyThenNewest => {
                " ORDER BY t.is_sticky DESC, t.create_date DESC, t.rowid"
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicQuery {
    filters: Vec<TopicFilter>,
    order: TopicOrder,
    skip: Option<i64>,
    take: Option<i64>,
}

impl TopicQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: TopicFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, order: TopicOrder) -> Self {
        self.order = order;
        self
    }

    pub fn skip(mut self, count: i64) -> Self {
        self.skip = Some(count);
        self
    }

    pub fn take(mut self, count: i64) -> Self {
        self.take = Some(count);
        self
    }

    /// `skip`/`take` for a 1-based page, or `None` when the offset does not fit in an `i64`.
    pub fn page(self, page_index: i64, page_size: i64) -> Option<Self> {
        let offset = page_index.checked_sub(1)?.checked_mul(page_size)?;
        Some(self.skip(offset).take(page_size))
    }

    /// Render a `SELECT` of topic rows.
    pub fn to_select(&self) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new(format!("SELECT {} FROM topics t WHERE 1 = 1", TOPIC_COLUMNS));
        self.push_filters(&mut qb);
        qb.push(self.order.as_sql());

        match (self.take, self.skip) {
            (None, None) => {}
            (take, skip) => {
                // SQLite only accepts OFFSET after a LIMIT; -1 means unbounded.
                qb.push(" LIMIT ");
                qb.push_bind(take.unwrap_or(-1));
                if let Some(skip) = skip {
                    qb.push(" OFFSET ");
                    qb.push_bind(skip);
                }
            }
        }
        qb
    }

    /// Render a `SELECT COUNT(*)` over the filtered topics, ignoring order and paging.
    pub fn to_count(&self) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) AS topic_count FROM topics t WHERE 1 = 1");
        self.push_filters(&mut qb);
        qb
    }

    fn push_filters(&self, qb: &mut QueryBuilder<'static, Sqlite>) {
        for filter in &self.filters {
            match filter {
                TopicFilter::Id(id) => {
                    qb.push(" AND t.id = ");
                    qb.push_bind(id.clone());
                }
                TopicFilter::Category(id) => {
                    qb.push(" AND t.category_id = ");
                    qb.push_bind(id.clone());
                }
                TopicFilter::Member(id) => {
                    qb.push(" AND t.member_id = ");
                    qb.push_bind(id.clone());
                }
                TopicFilter::Tag(tag) => {
                    qb.push(
                        " AND EXISTS (SELECT 1 FROM topic_tag_links l \
                         JOIN topic_tags g ON g.id = l.tag_id \
                         WHERE l.topic_id = t.id AND g.tag = ",
                    );
                    qb.push_bind(tag.clone());
                    qb.push(")");
                }
                TopicFilter::SlugEquals(slug) => {
                    qb.push(" AND t.slug = ");
                    qb.push_bind(slug.clone());
                }
                TopicFilter::SlugContains(fragment) => {
                    qb.push(" AND instr(t.slug, ");
                    qb.push_bind(fragment.clone());
                    qb.push(") > 0");
                }
                TopicFilter::HasSolution => {
                    qb.push(
                        " AND EXISTS (SELECT 1 FROM posts p \
                         WHERE p.topic_id = t.id AND p.is_solution = 1)",
                    );
                }
            }
        }
    }
}
