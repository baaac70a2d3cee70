//! This module defines the common functionality for paging data.

/// The config for pagination.
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The number of rows to display per page.
    pub page_size: u64,
    /// The maximum number of numbered pages to show in the pagination
    /// indicator, not counting the back/next buttons and the first/last
    /// page shortcuts.
    pub max_indicators: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            max_indicators: 5,
        }
    }
}

/// A single element of the pagination control under a table.
#[derive(Debug, PartialEq, Eq)]
pub enum PageIndicator {
    /// A numbered link to another page.
    Page(u64),
    /// The page currently displayed.
    Current(u64),
    /// An ellipsis standing in for pages elided from the indicator.
    Gap,
    /// The link to the previous page.
    Previous(u64),
    /// The link to the next page.
    Next(u64),
}

/// The number of pages needed to display `total_rows` rows.
///
/// An empty collection still has one (empty) page.
pub fn page_count(total_rows: u64, page_size: u64) -> u64 {
    total_rows.div_ceil(page_size).max(1)
}

/// The index of the first row on `page` (pages are 1-based).
pub fn page_start_index(page: u64, page_size: u64) -> u64 {
    page.saturating_sub(1) * page_size
}

/// Build the list of indicators for the pagination control.
///
/// Shows a window of up to `max_indicators` numbered pages around
/// `current_page`, with shortcuts to the first and last page when the window
/// does not reach them, and back/next buttons when there is a previous/next
/// page to go to.
pub fn page_indicators(current_page: u64, page_count: u64, max_indicators: u64) -> Vec<PageIndicator> {
    let current_page = current_page.clamp(1, page_count);

    let half = max_indicators / 2;
    let mut start = if current_page > half {
        current_page - half
    } else {
        1
    };
    let mut end = start + max_indicators - 1;
    if end > page_count {
        end = page_count;
        start = if end >= max_indicators {
            end - max_indicators + 1
        } else {
            1
        };
    }

    let mut indicators = Vec::new();

    if current_page > 1 {
        indicators.push(PageIndicator::Previous(current_page - 1));
    }

    if start > 1 {
        indicators.push(PageIndicator::Page(1));

        if start > 2 {
            indicators.push(PageIndicator::Gap);
        }
    }

    for page in start..=end {
        if page == current_page {
            indicators.push(PageIndicator::Current(page));
        } else {
            indicators.push(PageIndicator::Page(page));
        }
    }

    if end < page_count {
        if end + 1 < page_count {
            indicators.push(PageIndicator::Gap);
        }

        indicators.push(PageIndicator::Page(page_count));
    }

    if current_page < page_count {
        indicators.push(PageIndicator::Next(current_page + 1));
    }

    indicators
}
