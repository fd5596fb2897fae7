use serde::Serialize;
use utoipa::ToSchema;

pub const HISTORY_PAGE_SIZE: i64 = 100;
pub const LOG_PAGE_SIZE: i64 = 20;

/// Which slice of a result set a page covers.
///
/// Requests for pages outside `1..=num_pages` are clamped rather than
/// rejected, and an empty result set still has one (empty) page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageWindow {
    /// 1-based page number actually served.
    pub number: i64,
    pub num_pages: i64,
    pub per_page: i64,
    /// Rows matching the filters across all pages.
    pub total: i64,
}

impl PageWindow {
    /// `requested` is the raw `page` query value; anything that is not an
    /// integer means page 1.
    pub fn resolve(total: i64, per_page: i64, requested: Option<&str>) -> Self {
        let per_page = per_page.max(1);
        let total = total.max(0);
        let num_pages = ((total + per_page - 1) / per_page).max(1);

        let number = requested
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .unwrap_or(1)
            .clamp(1, num_pages);

        Self {
            number,
            num_pages,
            per_page,
            total,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.per_page
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }
}

/// One page of rows plus where it sits in the full result set.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub window: PageWindow,
}
