//! Offset-based page windows over a result set whose size changes as filters change.
//!
//! # Usage
//!
//! ```rust,ignore
//! let total = store.count(&query).await?;
//! let window = compute_window(total, page_size, requested_page);
//! let articles = store.fetch_page(&query, sort, window.offset, window.limit).await?;
//! ```

use serde::Serialize;

// ============================================================================
// PageWindow
// ============================================================================

/// The slice of a sorted result set visible on one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    /// 1-indexed page, clamped into `1..=total_pages`.
    pub page: i64,
    pub offset: i64,
    pub limit: i64,
    /// Never less than 1, even for an empty result set.
    pub total_pages: i64,
}

impl PageWindow {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Page number to request for "previous"; stays on page 1 at the start.
    pub fn previous_page(&self) -> i64 {
        (self.page - 1).max(1)
    }

    /// Page number to request for "next"; stays on the last page at the end.
    pub fn next_page(&self) -> i64 {
        (self.page + 1).min(self.total_pages)
    }
}

/// Total number of pages for `total_count` items, at least 1.
pub fn total_pages(total_count: i64, page_size: i64) -> i64 {
    let total_count = total_count.max(0);
    let page_size = page_size.max(1);
    let pages = total_count / page_size + i64::from(total_count % page_size != 0);
    pages.max(1)
}

/// Compute the window for `requested_page`.
///
/// Total: out-of-range pages are clamped instead of rejected, and a
/// non-positive page size is treated as 1.
pub fn compute_window(total_count: i64, page_size: i64, requested_page: i64) -> PageWindow {
    let page_size = page_size.max(1);
    let total_pages = total_pages(total_count, page_size);
    let page = requested_page.clamp(1, total_pages);

    PageWindow {
        page,
        offset: (page - 1) * page_size,
        limit: page_size,
        total_pages,
    }
}

// ============================================================================
// PageState
// ============================================================================

/// Per-session paging state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageState {
    pub page: i64,
    pub page_size: i64,
    pub total_count: i64,
}

impl PageState {
    pub fn new(page_size: i64) -> Self {
        PageState {
            page: 1,
            page_size: page_size.max(1),
            total_count: 0,
        }
    }

    pub fn total_pages(&self) -> i64 {
        total_pages(self.total_count, self.page_size)
    }

    /// Window for the current page against the last known total.
    pub fn window(&self) -> PageWindow {
        compute_window(self.total_count, self.page_size, self.page)
    }

    /// Record a freshly computed window and the total it was computed from.
    pub fn apply(&mut self, total_count: i64, window: &PageWindow) {
        self.total_count = total_count.max(0);
        self.page = window.page;
    }
}
