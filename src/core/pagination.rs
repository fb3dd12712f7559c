use serde::Serialize;
use utoipa::ToSchema;

use crate::constants::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE};
use crate::core::errors::CareLinkError;

/// A validated 1-based page request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    page_number: i64,
    page_size: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page_number: DEFAULT_PAGE_NUMBER,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page_number: i64, page_size: i64) -> Result<Self, CareLinkError> {
        if page_number <= 0 {
            return Err(CareLinkError::invalid_argument(
                "Page number",
                "Page number must be greater than zero.",
            ));
        }
        if page_size <= 0 {
            return Err(CareLinkError::invalid_argument(
                "Page size",
                "Page size must be greater than zero.",
            ));
        }
        Ok(PageRequest { page_number, page_size })
    }

    pub fn page_number(&self) -> i64 {
        self.page_number
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub fn skip(&self) -> i64 {
        (self.page_number - 1).saturating_mul(self.page_size)
    }

    /// Slices an already ordered, fully materialized result set.
    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let skip = usize::try_from(self.skip()).unwrap_or(usize::MAX);
        let take = usize::try_from(self.page_size).unwrap_or(usize::MAX);
        items.into_iter().skip(skip).take(take).collect()
    }

    pub fn total_pages(&self, total_records: i64) -> i64 {
        if total_records <= 0 {
            0
        } else {
            (total_records - 1) / self.page_size + 1
        }
    }
}

#[derive(Clone, Debug, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult<T> {
    pub data: Vec<T>,
    pub total_records: i64,
    pub page_number: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T> PaginatedResult<T> {
    pub fn new(data: Vec<T>, total_records: i64, page: PageRequest) -> Self {
        PaginatedResult {
            data,
            total_records,
            page_number: page.page_number(),
            page_size: page.page_size(),
            total_pages: page.total_pages(total_records),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResult<U> {
        PaginatedResult {
            data: self.data.into_iter().map(f).collect(),
            total_records: self.total_records,
            page_number: self.page_number,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_values() {
        assert!(matches!(
            PageRequest::new(0, 10),
            Err(CareLinkError::InvalidArgument { ref field, .. }) if field == "Page number"
        ));
        assert!(matches!(
            PageRequest::new(1, -3),
            Err(CareLinkError::InvalidArgument { ref field, .. }) if field == "Page size"
        ));
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = PageRequest::new(1, 4).unwrap();
        assert_eq!(page.total_pages(0), 0);
        assert_eq!(page.total_pages(1), 1);
        assert_eq!(page.total_pages(4), 1);
        assert_eq!(page.total_pages(5), 2);
        assert_eq!(page.total_pages(12), 3);
    }

    #[test]
    fn apply_returns_the_requested_window() {
        let items: Vec<i32> = (0..11).collect();
        assert_eq!(PageRequest::new(1, 5).unwrap().apply(items.clone()), vec![0, 1, 2, 3, 4]);
        assert_eq!(PageRequest::new(3, 5).unwrap().apply(items.clone()), vec![10]);
        assert!(PageRequest::new(4, 5).unwrap().apply(items).is_empty());
    }

    #[test]
    fn defaults_to_first_page_of_ten() {
        let page = PageRequest::default();
        assert_eq!((page.page_number(), page.page_size(), page.skip()), (1, 10, 0));
    }
}
