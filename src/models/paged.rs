//! Paged result wrapper.

use serde::Serialize;

/// One page of a listing plus the paging inputs that produced it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedList<T> {
    items: Vec<T>,
    page_index: i64,
    page_size: i64,
    total_count: i64,
}

impl<T> PagedList<T> {
    pub fn new(items: Vec<T>, page_index: i64, page_size: i64, total_count: i64) -> Self {
        Self {
            items,
            page_index,
            page_size,
            total_count,
        }
    }

    /// Build a page whose total is the page's own item count capped at `amount_to_take`.
    ///
    /// The total never reflects rows beyond this page, so it understates the
    /// real match count once more than one page exists.
    pub fn clamped(items: Vec<T>, page_index: i64, page_size: i64, amount_to_take: i64) -> Self {
        let total_count = (items.len() as i64).min(amount_to_take);
        Self::new(items, page_index, page_size, total_count)
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn page_index(&self) -> i64 {
        self.page_index
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub fn total_count(&self) -> i64 {
        self.total_count
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_pages(&self) -> i64 {
        if self.page_size <= 0 {
            return 0;
        }
        self.total_count / self.page_size + i64::from(self.total_count % self.page_size != 0)
    }

    pub fn has_previous_page(&self) -> bool {
        self.page_index > 1
    }

    pub fn has_next_page(&self) -> bool {
        self.page_index < self.total_pages()
    }
}
