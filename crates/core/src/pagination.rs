//! Fixed-size pagination over the filtered jam list.

/// Default number of jams per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Tracks the current page over a sequence of known length.
///
/// Every mutation clamps rather than fails: out-of-range page requests land on
/// the nearest valid page and navigation past either end is a no-op. The
/// paginator never resets the page on its own; callers decide when a changed
/// item set warrants jumping back to the first page.
#[derive(Debug, Clone)]
pub struct Paginator {
    page_size: usize,
    current_page: usize,
    total_pages: usize,
    item_count: usize,
}

impl Paginator {
    /// Create a paginator with the given page size, clamped to at least 1.
    pub fn new(page_size: usize) -> Self {
        let mut paginator = Self {
            page_size: page_size.max(1),
            current_page: 0,
            total_pages: 1,
            item_count: 0,
        };
        paginator.recalculate();
        paginator
    }

    /// Number of items shown per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Change the page size, clamped to at least 1, and reclamp the page.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.recalculate();
    }

    /// Number of items being paged.
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Tell the paginator how many items there are now.
    pub fn set_item_count(&mut self, item_count: usize) {
        self.item_count = item_count;
        self.recalculate();
    }

    /// Current page, 0-based.
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Jump to `page`, clamped into the valid range.
    pub fn set_current_page(&mut self, page: usize) {
        self.current_page = page.min(self.total_pages - 1);
    }

    /// Total number of pages, always at least 1.
    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Index of the first item on the current page.
    pub fn start_index(&self) -> usize {
        self.current_page * self.page_size
    }

    /// Index one past the last item on the current page.
    pub fn end_index(&self) -> usize {
        (self.start_index() + self.page_size).min(self.item_count)
    }

    /// Half-open index range covering the current page.
    pub fn page_range(&self) -> std::ops::Range<usize> {
        self.start_index()..self.end_index()
    }

    /// Whether a next page exists.
    pub fn can_go_next(&self) -> bool {
        self.current_page + 1 < self.total_pages
    }

    /// Whether a previous page exists.
    pub fn can_go_previous(&self) -> bool {
        self.current_page > 0
    }

    /// Advance one page; no-op on the last page.
    pub fn next_page(&mut self) {
        if self.can_go_next() {
            self.current_page += 1;
        }
    }

    /// Go back one page; no-op on the first page.
    pub fn previous_page(&mut self) {
        if self.can_go_previous() {
            self.current_page -= 1;
        }
    }

    fn recalculate(&mut self) {
        self.total_pages = self.item_count.div_ceil(self.page_size).max(1);
        self.current_page = self.current_page.min(self.total_pages - 1);
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sequence_still_has_one_page() {
        let paginator = Paginator::default();
        assert_eq!(paginator.total_pages(), 1);
        assert_eq!(paginator.current_page(), 0);
        assert_eq!(paginator.page_range(), 0..0);
        assert!(!paginator.can_go_next());
        assert!(!paginator.can_go_previous());
    }

    #[test]
    fn twenty_three_items_make_three_pages() {
        let mut paginator = Paginator::new(10);
        paginator.set_item_count(23);
        assert_eq!(paginator.total_pages(), 3);
        paginator.set_current_page(2);
        assert_eq!(paginator.start_index(), 20);
        assert_eq!(paginator.end_index(), 23);
        assert_eq!(paginator.page_range(), 20..23);
    }

    #[test]
    fn navigation_stops_at_the_ends() {
        let mut paginator = Paginator::new(10);
        paginator.set_item_count(23);
        paginator.previous_page();
        assert_eq!(paginator.current_page(), 0);
        paginator.next_page();
        paginator.next_page();
        assert_eq!(paginator.current_page(), 2);
        paginator.next_page();
        assert_eq!(paginator.current_page(), 2);
    }

    #[test]
    fn out_of_range_pages_are_clamped() {
        let mut paginator = Paginator::new(10);
        paginator.set_item_count(23);
        paginator.set_current_page(99);
        assert_eq!(paginator.current_page(), 2);
    }

    #[test]
    fn page_size_is_at_least_one() {
        let mut paginator = Paginator::new(0);
        assert_eq!(paginator.page_size(), 1);
        paginator.set_page_size(0);
        assert_eq!(paginator.page_size(), 1);
    }

    #[test]
    fn shrinking_the_item_count_pulls_the_page_back() {
        let mut paginator = Paginator::new(10);
        paginator.set_item_count(23);
        paginator.set_current_page(2);
        paginator.set_item_count(5);
        assert_eq!(paginator.total_pages(), 1);
        assert_eq!(paginator.current_page(), 0);
        assert_eq!(paginator.page_range(), 0..5);
    }

    #[test]
    fn growing_the_page_size_pulls_the_page_back() {
        let mut paginator = Paginator::new(10);
        paginator.set_item_count(23);
        paginator.set_current_page(2);
        paginator.set_page_size(25);
        assert_eq!(paginator.total_pages(), 1);
        assert_eq!(paginator.current_page(), 0);
        assert_eq!(paginator.page_range(), 0..23);
    }
}
