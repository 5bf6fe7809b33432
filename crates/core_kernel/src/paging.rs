//! Paging information for list and search operations
//!
//! Pages are 1-based: `page == 1` is the first page.

use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Describes which page to load and, on return, how many records exist
///
/// When `load_record_count` is set the data service counts the matching
/// records, stores the total in `total_record_count` and clears the flag, so a
/// caller that reuses this value for later pages does not pay for the count
/// again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingInfo {
    /// 1-based page index
    pub page: u32,
    /// Records per page
    pub page_size: u32,
    /// Whether the total record count should be (re)loaded
    pub load_record_count: bool,
    /// Total matching records, populated by the data service
    pub total_record_count: Option<u64>,
}

impl PagingInfo {
    /// Creates paging for the given 1-based page
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            load_record_count: true,
            total_record_count: None,
        }
    }

    /// Checks the paging bounds
    ///
    /// # Errors
    ///
    /// Returns `DataError::InvalidArgument` if the page index or page size is zero
    pub fn validate(&self) -> Result<(), DataError> {
        if self.page == 0 {
            return Err(DataError::invalid_argument(
                "paging.page",
                "the page index is 1-based and must be at least 1",
            ));
        }
        if self.page_size == 0 {
            return Err(DataError::invalid_argument(
                "paging.page_size",
                "the page size must be at least 1",
            ));
        }
        Ok(())
    }

    /// Number of records preceding this page
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// Number of pages, once the total is known
    pub fn page_count(&self) -> Option<u64> {
        if self.page_size == 0 {
            return None;
        }
        self.total_record_count
            .map(|total| total.div_ceil(u64::from(self.page_size)))
    }

    /// Whether pages follow this one, once the total is known
    pub fn has_more_results(&self) -> Option<bool> {
        self.page_count().map(|count| u64::from(self.page) < count)
    }

    /// Advances to the next page, keeping the loaded total
    pub fn next_page(&mut self) {
        self.page += 1;
    }
}

impl Default for PagingInfo {
    fn default() -> Self {
        Self::new(1, 25)
    }
}
