//! Pagination - potong array in-memory per halaman
//!
//! Halaman k berisi index `[(k-1)*size, min(k*size, total))`. Navigasi
//! dinonaktifkan di batas: prev mati di halaman 1, next mati di halaman
//! terakhir (`ceil(total/size)`).

use serde::Serialize;
use std::collections::HashMap;

use crate::utils::constants::ITEMS_PER_PAGE;

/// Position within an in-memory table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pager {
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
}

impl Pager {
    /// Pager clamped into `1..=total_pages`
    pub fn new(page: usize, page_size: usize, total_items: usize) -> Self {
        let page_size = page_size.max(1);
        let mut pager = Self {
            page: 1,
            page_size,
            total_items,
        };
        pager.page = page.clamp(1, pager.total_pages().max(1));
        pager
    }

    /// Pager with the default page size
    pub fn with_default_size(page: usize, total_items: usize) -> Self {
        Self::new(page, ITEMS_PER_PAGE, total_items)
    }

    /// `ceil(total / size)`; 0 for an empty table
    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.page_size)
    }

    pub fn start_index(&self) -> usize {
        ((self.page - 1) * self.page_size).min(self.total_items)
    }

    pub fn end_index(&self) -> usize {
        (self.page * self.page_size).min(self.total_items)
    }

    /// Rows of the current page
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let end = self.end_index().min(items.len());
        let start = self.start_index().min(end);
        &items[start..end]
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Controls are only rendered when there is more than one page
    pub fn shows_controls(&self) -> bool {
        self.total_pages() > 1
    }

    pub fn next(self) -> Self {
        Self::new(self.page + 1, self.page_size, self.total_items)
    }

    pub fn prev(self) -> Self {
        Self::new(self.page.saturating_sub(1), self.page_size, self.total_items)
    }

    /// "Menampilkan 6 - 10 dari 12 data"
    pub fn range_label(&self) -> String {
        let first = if self.total_items == 0 {
            0
        } else {
            self.start_index() + 1
        };
        format!(
            "Menampilkan {} - {} dari {} data",
            first,
            self.end_index(),
            self.total_items
        )
    }

    /// "2 / 3"
    pub fn position_label(&self) -> String {
        format!("{} / {}", self.page, self.total_pages().max(1))
    }
}

/// Serializable pager summary for view responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PagerView {
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub has_prev: bool,
    pub has_next: bool,
    pub show_controls: bool,
    pub label: String,
}

impl From<Pager> for PagerView {
    fn from(p: Pager) -> Self {
        Self {
            page: p.page,
            total_pages: p.total_pages(),
            total_items: p.total_items,
            has_prev: p.has_prev(),
            has_next: p.has_next(),
            show_controls: p.shows_controls(),
            label: p.range_label(),
        }
    }
}

/// Independent current page per category table
#[derive(Debug, Clone, Default)]
pub struct CategoryPages {
    pages: HashMap<String, usize>,
}

impl CategoryPages {
    pub fn new<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pages: categories.into_iter().map(|c| (c.into(), 1)).collect(),
        }
    }

    pub fn current(&self, category: &str) -> usize {
        self.pages.get(category).copied().unwrap_or(1)
    }

    pub fn set(&mut self, category: &str, page: usize) {
        self.pages.insert(category.to_string(), page.max(1));
    }

    /// Back to page 1 everywhere (e.g. after changing the selected year)
    pub fn reset_all(&mut self) {
        for page in self.pages.values_mut() {
            *page = 1;
        }
    }

    /// Pager for `category` over `total_items` rows; stored page is clamped
    pub fn pager(&self, category: &str, page_size: usize, total_items: usize) -> Pager {
        Pager::new(self.current(category), page_size, total_items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_bounds_for_every_page() {
        let items: Vec<usize> = (0..12).collect();
        for k in 1..=3 {
            let pager = Pager::new(k, 5, items.len());
            let expected: Vec<usize> = (5 * (k - 1)..(5 * k).min(12)).collect();
            assert_eq!(pager.slice(&items), expected.as_slice());
        }
    }

    #[test]
    fn test_navigation_disabled_at_edges() {
        let first = Pager::new(1, 5, 12);
        assert!(!first.has_prev());
        assert!(first.has_next());

        let last = Pager::new(3, 5, 12);
        assert!(last.has_prev());
        assert!(!last.has_next());
        assert_eq!(last.total_pages(), 3);
    }

    #[test]
    fn test_clamping() {
        assert_eq!(Pager::new(0, 5, 12).page, 1);
        assert_eq!(Pager::new(9, 5, 12).page, 3);
        assert_eq!(Pager::new(4, 5, 0).page, 1);
        assert_eq!(Pager::new(3, 5, 12).next().page, 3);
        assert_eq!(Pager::new(1, 5, 12).prev().page, 1);
    }

    #[test]
    fn test_labels() {
        let pager = Pager::new(2, 5, 12);
        assert_eq!(pager.range_label(), "Menampilkan 6 - 10 dari 12 data");
        assert_eq!(pager.position_label(), "2 / 3");
        assert!(!Pager::new(1, 5, 5).shows_controls());
        assert_eq!(Pager::new(1, 5, 0).range_label(), "Menampilkan 0 - 0 dari 0 data");
    }

    #[test]
    fn test_category_pages_reset() {
        let mut pages = CategoryPages::new(["A", "B"]);
        pages.set("A", 3);
        assert_eq!(pages.current("A"), 3);
        pages.reset_all();
        assert_eq!(pages.current("A"), 1);
        assert_eq!(pages.pager("B", 5, 2).page, 1);
    }
}
