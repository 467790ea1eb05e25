use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::{IntoParams, ToSchema};

/// Fixed-page window over an ordered result set. `page` is zero-based.
///
/// Negative values are accepted and clamped to zero when the window is computed.
/// Both bounds are capped at `i64::MAX`, the largest value SQL drivers bind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: i64,
    pub size: i64,
}

const MAX_BOUND: u64 = i64::MAX as u64;

impl Pagination {
    pub fn new(page: i64, size: i64) -> Self {
        Self { page, size }
    }

    /// Rows to skip: `page * size`, both clamped at zero first.
    pub fn offset(&self) -> u64 {
        let page = self.page.max(0) as u64;
        page.saturating_mul(self.limit()).min(MAX_BOUND)
    }

    /// Rows to take, clamped at zero.
    pub fn limit(&self) -> u64 {
        self.size.max(0) as u64
    }
}

impl fmt::Display for Pagination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Page: {} Size: {}", self.page, self.size)
    }
}

/// `?page=&size=` query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Zero-based page number.
    pub page: Option<i64>,
    /// Page size.
    pub size: Option<i64>,
}

impl PageQuery {
    /// Fill in the default size and cap it at `max_size`. Negative input is passed
    /// through so the repository clamps it.
    pub fn resolve(self, default_size: u32, max_size: u32) -> Pagination {
        let size = self.size.unwrap_or(i64::from(default_size));
        Pagination {
            page: self.page.unwrap_or(0),
            size: size.min(i64::from(max_size)),
        }
    }
}
