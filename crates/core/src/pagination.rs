//! Per-view page cursor.
//!
//! Keeps `1 <= current_page <= total_pages` at all times. Out-of-range
//! requests are clamped rather than rejected. Resetting on filter or
//! refresh changes is driven from outside (see [`crate::filter`]), so this
//! type never observes those controllers itself.

/// Current page and page count of one paginated view. Pages are 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    current_page: u32,
    total_pages: u32,
}

/// Snapshot handed to renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub current_page: u32,
    pub total_pages: u32,
    pub has_previous: bool,
    pub has_next: bool,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new()
    }
}

impl Pagination {
    /// Page 1 of 1.
    pub fn new() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Move to page `n`, clamped into `1..=total_pages`. Returns the page
    /// actually selected.
    pub fn go_to(&mut self, n: u32) -> u32 {
        self.current_page = n.clamp(1, self.total_pages);
        self.current_page
    }

    pub fn next(&mut self) -> u32 {
        self.go_to(self.current_page.saturating_add(1))
    }

    pub fn previous(&mut self) -> u32 {
        self.go_to(self.current_page.saturating_sub(1))
    }

    /// Back to page 1. Called by whoever owns the reset signal.
    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    /// Record the page count reported by a fetch.
    ///
    /// An empty collection reports zero pages; it is still shown as one
    /// (empty) page. The current page is pulled down if it now lies past
    /// the end.
    pub fn on_fetch_result(&mut self, total_pages: u32) {
        self.total_pages = total_pages.max(1);
        if self.current_page > self.total_pages {
            self.current_page = self.total_pages;
        }
    }

    /// Record the page count of a fetch made for an explicitly requested
    /// page, then move there (clamped). The cursor only moves once the
    /// page count is known.
    pub fn on_fetch_result_for(&mut self, requested: u32, total_pages: u32) {
        self.on_fetch_result(total_pages);
        self.go_to(requested);
    }

    pub fn info(&self) -> PageInfo {
        PageInfo {
            current_page: self.current_page,
            total_pages: self.total_pages,
            has_previous: self.current_page > 1,
            has_next: self.current_page < self.total_pages,
        }
    }
}
