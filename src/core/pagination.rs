//! Pagination parameters and listing metadata shared by the query paths.

use crate::{
    errors::{Error, Result},
    repository::PageRequest,
};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Largest page size a caller may request.
pub const MAX_PER_PAGE: u64 = 100;

/// Pagination as requested by a caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Pagination {
    /// When false, everything is returned as one implicit page
    pub is_paginate: bool,
    /// 1-based page number
    pub page: u64,
    /// Rows per page
    pub per_page: u64,
}

impl Pagination {
    /// A paginated request.
    #[must_use]
    pub const fn page(page: u64, per_page: u64) -> Self {
        Self {
            is_paginate: true,
            page,
            per_page,
        }
    }

    /// Checks the bounds and converts to a store-level page request.
    ///
    /// Returns `Ok(None)` when pagination is off.
    pub fn to_page_request(self) -> Result<Option<PageRequest>> {
        if !self.is_paginate {
            return Ok(None);
        }
        if self.page < 1 {
            error!("page must be greater than 0, got {}", self.page);
            return Err(Error::validation("page must be greater than 0"));
        }
        if self.per_page < 1 || self.per_page > MAX_PER_PAGE {
            error!("perPage out of range: {}", self.per_page);
            return Err(Error::validation(format!(
                "perPage must be between 1 and {MAX_PER_PAGE}"
            )));
        }
        Ok(Some(PageRequest {
            page: self.page,
            per_page: self.per_page,
        }))
    }

    /// Builds listing metadata for `total_data` matching rows.
    #[must_use]
    pub const fn metadata(self, total_data: u64) -> Metadata {
        if self.is_paginate && self.per_page > 0 {
            Metadata {
                page: self.page,
                per_page: self.per_page,
                total_data,
                total_page: total_data.div_ceil(self.per_page),
            }
        } else {
            Metadata {
                page: 1,
                per_page: total_data,
                total_data,
                total_page: 1,
            }
        }
    }
}

/// Listing metadata returned next to the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Page returned
    pub page: u64,
    /// Page size used
    pub per_page: u64,
    /// Rows matching the filter across all pages
    pub total_data: u64,
    /// `ceil(total_data / per_page)`
    pub total_page: u64,
}
