//! Offset pagination and sort parameters.

use std::fmt;

use thiserror::Error;

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 1000;
/// Deepest `offset + limit` the search backend serves (its default `max_result_window`).
pub const MAX_RESULT_WINDOW: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    #[error("page number must be at least 1")]
    PageNumber,
    #[error("page size must be between 1 and {}", MAX_PAGE_SIZE)]
    PageSize,
    #[error("page {number} of size {size} reaches past result {}", MAX_RESULT_WINDOW)]
    Window { number: u32, size: u32 },
    #[error("sort field must not be empty")]
    EmptySort,
}

/// 1-based page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    number: u32,
    size: u32,
}

impl PageParams {
    pub fn new(number: u32, size: u32) -> Result<Self, PaginationError> {
        if number == 0 {
            return Err(PaginationError::PageNumber);
        }
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(PaginationError::PageSize);
        }
        if u64::from(number) * u64::from(size) > MAX_RESULT_WINDOW {
            return Err(PaginationError::Window { number, size });
        }
        Ok(Self { number, size })
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.number - 1) * u64::from(self.size)
    }

    pub fn limit(&self) -> u32 {
        self.size
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            number: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Parse the API form: `field` sorts ascending, `-field` descending.
    pub fn parse_prefixed(raw: &str) -> Result<Self, PaginationError> {
        let (field, direction) = match raw.strip_prefix('-') {
            Some(field) => (field, SortDirection::Desc),
            None => (raw, SortDirection::Asc),
        };
        let field = field.trim();
        if field.is_empty() {
            return Err(PaginationError::EmptySort);
        }
        Ok(Self::new(field, direction))
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.direction.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_zero_based_from_page_number() {
        let first = PageParams::new(1, 10).expect("valid page");
        assert_eq!(first.offset(), 0);
        assert_eq!(first.limit(), 10);

        let third = PageParams::new(3, 7).expect("valid page");
        assert_eq!(third.offset(), 14);
        assert_eq!(third.limit(), 7);
    }

    #[test]
    fn rejects_zero_page_and_oversized_page() {
        assert_eq!(PageParams::new(0, 10), Err(PaginationError::PageNumber));
        assert_eq!(PageParams::new(1, 0), Err(PaginationError::PageSize));
        assert_eq!(
            PageParams::new(1, MAX_PAGE_SIZE + 1),
            Err(PaginationError::PageSize)
        );
    }

    #[test]
    fn pages_must_end_inside_the_result_window() {
        assert!(PageParams::new(10, 1000).is_ok());
        assert!(PageParams::new(10_000, 1).is_ok());
        assert_eq!(
            PageParams::new(11, 1000),
            Err(PaginationError::Window {
                number: 11,
                size: 1000
            })
        );
        assert!(PageParams::new(1000, 1000).is_err());
    }

    #[test]
    fn dash_prefix_sorts_descending() {
        let sort = SortSpec::parse_prefixed("-imdb_rating").expect("valid sort");
        assert_eq!(sort.field, "imdb_rating");
        assert_eq!(sort.direction, SortDirection::Desc);
        assert_eq!(sort.to_string(), "imdb_rating:desc");

        let sort = SortSpec::parse_prefixed("name").expect("valid sort");
        assert_eq!(sort.to_string(), "name:asc");
    }

    #[test]
    fn bare_dash_is_not_a_sort() {
        assert_eq!(SortSpec::parse_prefixed("-"), Err(PaginationError::EmptySort));
        assert_eq!(SortSpec::parse_prefixed(""), Err(PaginationError::EmptySort));
    }
}
