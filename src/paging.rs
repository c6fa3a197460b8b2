use std::fmt;
use std::str::FromStr;

/// Number of rows per page, or everything on one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    Rows(usize),
    All,
}

pub const PAGE_SIZES: [PageSize; 4] = [
    PageSize::Rows(15),
    PageSize::Rows(30),
    PageSize::Rows(60),
    PageSize::All,
];

impl Default for PageSize {
    fn default() -> Self {
        PageSize::Rows(15)
    }
}

impl PageSize {
    /// Next entry of the selector, wrapping around.
    pub fn next(self) -> PageSize {
        let pos = PAGE_SIZES.iter().position(|&p| p == self).unwrap_or(0);
        PAGE_SIZES[(pos + 1) % PAGE_SIZES.len()]
    }

    pub fn label(self) -> String {
        match self {
            PageSize::Rows(n) => format!("{n} 行/页"),
            PageSize::All => "全部".to_string(),
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSize::Rows(n) => write!(f, "{n}"),
            PageSize::All => write!(f, "all"),
        }
    }
}

impl FromStr for PageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(PageSize::All);
        }
        let size = PAGE_SIZES
            .iter()
            .copied()
            .find(|p| p.to_string() == s.trim());
        size.ok_or_else(|| format!("page size must be one of 15, 30, 60 or all, got \"{s}\""))
    }
}

#[derive(Debug, PartialEq)]
pub struct Page<'a, T> {
    pub rows: &'a [T],
    pub total_pages: usize,
}

pub fn total_pages(count: usize, page_size: PageSize) -> usize {
    match page_size {
        PageSize::All | PageSize::Rows(0) => 1,
        PageSize::Rows(n) => std::cmp::max(1, count.div_ceil(n)),
    }
}

/// Slice one 1-based page out of the ordered rows.
pub fn paginate<T>(ordered: &[T], page: usize, page_size: PageSize) -> Page<'_, T> {
    let total_pages = total_pages(ordered.len(), page_size);
    let rows = match page_size {
        PageSize::All | PageSize::Rows(0) => ordered,
        PageSize::Rows(n) => {
            let start = std::cmp::min(page.saturating_sub(1) * n, ordered.len());
            let end = std::cmp::min(start + n, ordered.len());
            &ordered[start..end]
        }
    };
    Page { rows, total_pages }
}
