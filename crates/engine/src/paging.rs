use std::ops::Range;

use crate::error::EngineError;

/// Page cursor over whatever rows are currently visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    page: usize,
    rows_per_page: usize,
    options: Vec<usize>,
}

impl Pagination {
    /// Rejects a zero size anywhere and a starting size that is not one
    /// of the options.
    pub fn new(rows_per_page: usize, options: Vec<usize>) -> Result<Self, EngineError> {
        if let Some(zero) = options.iter().copied().find(|&n| n == 0) {
            return Err(EngineError::InvalidPageSize(zero));
        }
        if rows_per_page == 0 || !options.contains(&rows_per_page) {
            return Err(EngineError::InvalidPageSize(rows_per_page));
        }
        Ok(Self {
            page: 0,
            rows_per_page,
            options,
        })
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    /// Changing the page size goes back to the first page.
    pub fn set_rows_per_page(&mut self, rows_per_page: usize) -> Result<(), EngineError> {
        if !self.options.contains(&rows_per_page) {
            return Err(EngineError::InvalidPageSize(rows_per_page));
        }
        self.rows_per_page = rows_per_page;
        self.page = 0;
        Ok(())
    }

    /// Moves to `page`, clamped to the last page for `total` rows.
    pub fn set_page(&mut self, page: usize, total: usize) {
        self.page = page.min(self.page_count(total).saturating_sub(1));
    }

    pub fn reset(&mut self) {
        self.page = 0;
    }

    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.rows_per_page)
    }

    pub fn range(&self, total: usize) -> Range<usize> {
        let start = (self.page * self.rows_per_page).min(total);
        let end = (start + self.rows_per_page).min(total);
        start..end
    }
}

/// One page of visible rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub page: usize,
    pub page_count: usize,
    pub rows_per_page: usize,
    /// Size of the visible set the page was cut from.
    pub total: usize,
}

impl<T: Clone> Page<T> {
    pub fn cut(paging: &Pagination, visible: &[T]) -> Self {
        let total = visible.len();
        Self {
            rows: visible[paging.range(total)].to_vec(),
            page: paging.page(),
            page_count: paging.page_count(total),
            rows_per_page: paging.rows_per_page(),
            total,
        }
    }
}
