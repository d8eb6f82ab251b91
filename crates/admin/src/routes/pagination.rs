//! Page-number pagination for admin listings.

/// A page window over `total` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page number, clamped to the last page.
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

impl Pagination {
    /// Build a window. A missing, zero or overshooting page is clamped.
    #[must_use]
    pub fn new(requested: Option<i64>, per_page: i64, total: i64) -> Self {
        let per_page = per_page.max(1);
        let total = total.max(0);
        let last = Self::last_page(per_page, total);
        let page = requested.unwrap_or(1).clamp(1, last);
        Self {
            page,
            per_page,
            total,
        }
    }

    const fn last_page(per_page: i64, total: i64) -> i64 {
        if total == 0 {
            1
        } else {
            (total + per_page - 1) / per_page
        }
    }

    /// Number of pages (at least 1).
    #[must_use]
    pub const fn total_pages(&self) -> i64 {
        Self::last_page(self.per_page, self.total)
    }

    /// Rows to skip.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    #[must_use]
    pub const fn prev_page(&self) -> i64 {
        self.page - 1
    }

    #[must_use]
    pub const fn next_page(&self) -> i64 {
        self.page + 1
    }

    /// Previous/next hrefs, built by `href` from a page number.
    #[must_use]
    pub fn links(&self, href: impl Fn(i64) -> String) -> PageLinks {
        PageLinks {
            prev: self.has_prev().then(|| href(self.prev_page())),
            next: self.has_next().then(|| href(self.next_page())),
        }
    }
}

/// Navigation hrefs for a listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLinks {
    pub prev: Option<String>,
    pub next: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page_defaults() {
        let p = Pagination::new(None, 25, 60);
        assert_eq!(p.page, 1);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.total_pages(), 3);
        assert!(!p.has_prev());
        assert!(p.has_next());
    }

    #[test]
    fn test_last_page_and_clamping() {
        let p = Pagination::new(Some(3), 25, 60);
        assert_eq!(p.offset(), 50);
        assert!(p.has_prev());
        assert!(!p.has_next());

        assert_eq!(Pagination::new(Some(99), 25, 60).page, 3);
        assert_eq!(Pagination::new(Some(0), 25, 60).page, 1);
        assert_eq!(Pagination::new(Some(-4), 25, 60).page, 1);
    }

    #[test]
    fn test_links() {
        let href = |page| format!("/admin/activity?page={page}");

        let middle = Pagination::new(Some(2), 10, 30).links(href);
        assert_eq!(middle.prev.as_deref(), Some("/admin/activity?page=1"));
        assert_eq!(middle.next.as_deref(), Some("/admin/activity?page=3"));

        assert_eq!(Pagination::new(None, 10, 5).links(href), PageLinks::default());
    }

    #[test]
    fn test_empty_listing_has_one_page() {
        let p = Pagination::new(Some(2), 50, 0);
        assert_eq!(p.page, 1);
        assert_eq!(p.total_pages(), 1);
        assert!(!p.has_next());
    }
}
