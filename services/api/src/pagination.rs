//! Page-number pagination for list endpoints
//!
//! `?page=` is 1-based; `?page_size=` defaults to 20 and is capped at 100.
//! Missing or unusable page sizes fall back to the default. A page past the
//! end is an empty page whose `previous` link points at the last real page.

use serde::{Deserialize, Serialize};

use crate::validation::FieldErrors;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Raw pagination query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// Rows to fetch from a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: i64,
    pub limit: i64,
}

/// A resolved page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: i64,
    pub size: i64,
    /// Whether the client chose the page size; links only echo it then
    size_requested: bool,
}

impl PageRequest {
    pub fn from_params(params: &PageParams) -> Result<Self, FieldErrors> {
        let number = match params.page.as_deref().map(str::trim) {
            None | Some("") => 1,
            Some(raw) => match raw.parse::<i64>() {
                Ok(n) if n >= 1 => n,
                _ => return Err(FieldErrors::single("page", "Invalid page.")),
            },
        };

        let requested = params
            .page_size
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|size| *size > 0);

        Ok(Self {
            number,
            size: requested.map_or(DEFAULT_PAGE_SIZE, |size| size.min(MAX_PAGE_SIZE)),
            size_requested: requested.is_some(),
        })
    }

    pub fn window(&self) -> PageWindow {
        PageWindow {
            offset: (self.number - 1).saturating_mul(self.size),
            limit: self.size,
        }
    }

    /// Number of the last page that can hold records (1 for an empty list)
    pub fn last_page(&self, count: i64) -> i64 {
        if count <= 0 {
            1
        } else {
            (count + self.size - 1) / self.size
        }
    }

    fn link(&self, path: &str, number: i64) -> String {
        let mut query = Vec::new();
        if number > 1 {
            query.push(format!("page={number}"));
        }
        if self.size_requested {
            query.push(format!("page_size={}", self.size));
        }

        if query.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, query.join("&"))
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            number: 1,
            size: DEFAULT_PAGE_SIZE,
            size_requested: false,
        }
    }
}

/// One page of a list response
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Build a page; `path` is the request path the links are relative to
    pub fn new(request: PageRequest, path: &str, results: Vec<T>, count: i64) -> Self {
        let last = request.last_page(count);

        let next = (request.number < last).then(|| request.link(path, request.number + 1));
        let previous = (request.number > 1)
            .then(|| request.link(path, (request.number - 1).min(last)));

        Self {
            count,
            next,
            previous,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<&str>, page_size: Option<&str>) -> PageParams {
        PageParams {
            page: page.map(str::to_string),
            page_size: page_size.map(str::to_string),
        }
    }

    #[test]
    fn defaults() {
        let request = PageRequest::from_params(&PageParams::default()).unwrap();
        assert_eq!(request, PageRequest::default());
        assert_eq!(request.window(), PageWindow { offset: 0, limit: 20 });
    }

    #[test]
    fn page_size_is_capped() {
        let request = PageRequest::from_params(&params(None, Some("150"))).unwrap();
        assert_eq!(request.size, MAX_PAGE_SIZE);
    }

    #[test]
    fn unusable_page_size_falls_back_to_default() {
        for raw in ["0", "-3", "lots", ""] {
            let request = PageRequest::from_params(&params(None, Some(raw))).unwrap();
            assert_eq!(request.size, DEFAULT_PAGE_SIZE, "page_size={raw}");
        }
    }

    #[test]
    fn invalid_page_is_a_field_error() {
        for raw in ["0", "-1", "two"] {
            let errors = PageRequest::from_params(&params(Some(raw), None)).unwrap_err();
            assert!(errors.contains("page"), "page={raw}");
        }
    }

    #[test]
    fn window_for_later_pages() {
        let request = PageRequest::from_params(&params(Some("3"), Some("25"))).unwrap();
        assert_eq!(request.window(), PageWindow { offset: 50, limit: 25 });
    }

    #[test]
    fn links_on_middle_page() {
        let request = PageRequest::from_params(&params(Some("2"), Some("10"))).unwrap();
        let page = Page::new(request, "/api/cars/", vec![(); 10], 35);
        assert_eq!(page.next.as_deref(), Some("/api/cars/?page=3&page_size=10"));
        assert_eq!(page.previous.as_deref(), Some("/api/cars/?page_size=10"));
    }

    #[test]
    fn links_with_default_size() {
        let request = PageRequest::from_params(&params(Some("2"), None)).unwrap();
        let page = Page::new(request, "/api/cars/", vec![(); 5], 25);
        assert_eq!(page.next, None);
        assert_eq!(page.previous.as_deref(), Some("/api/cars/"));
    }

    #[test]
    fn page_past_the_end_points_back_to_last_page() {
        let request = PageRequest::from_params(&params(Some("9"), None)).unwrap();
        let page: Page<()> = Page::new(request, "/api/owners/", Vec::new(), 45);
        assert_eq!(page.count, 45);
        assert!(page.results.is_empty());
        assert_eq!(page.next, None);
        assert_eq!(page.previous.as_deref(), Some("/api/owners/?page=3"));
    }

    #[test]
    fn empty_collection_has_no_links() {
        let page: Page<()> = Page::new(PageRequest::default(), "/api/sales/", Vec::new(), 0);
        assert_eq!(page.next, None);
        assert_eq!(page.previous, None);
    }
}
