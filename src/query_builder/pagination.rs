use crate::error::{QueryError, Result};
use serde::Serialize;
use std::fmt;
use std::ops::Range;

/// Represents an offset/limit window over an ordered result.
///
/// Values are signed so that malformed external input (negative offsets) can
/// be reported as [`QueryError::InvalidArgument`] instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Pagination {
    /// Create pagination with page number (1-indexed) and per-page count
    pub fn new(page: i64, per_page: i64) -> Self {
        let offset = if page > 0 {
            Some((page - 1).saturating_mul(per_page))
        } else {
            None
        };
        Self {
            limit: Some(per_page),
            offset,
        }
    }

    /// Create pagination with only limit
    pub fn limit_only(limit: i64) -> Self {
        Self {
            limit: Some(limit),
            offset: None,
        }
    }

    /// Create pagination with only offset
    pub fn offset_only(offset: i64) -> Self {
        Self {
            limit: None,
            offset: Some(offset),
        }
    }

    /// Create pagination with both limit and offset
    pub fn limit_offset(limit: i64, offset: i64) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
        }
    }

    /// Reject negative values and limits above `max_page_size`
    pub fn validate(&self, max_page_size: u32) -> Result<()> {
        if let Some(offset) = self.offset {
            if offset < 0 {
                return Err(QueryError::invalid_argument(format!(
                    "offset must not be negative, got {offset}"
                )));
            }
        }

        if let Some(limit) = self.limit {
            if limit < 0 {
                return Err(QueryError::invalid_argument(format!(
                    "limit must not be negative, got {limit}"
                )));
            }
            if limit > i64::from(max_page_size) {
                return Err(QueryError::invalid_argument(format!(
                    "limit {limit} exceeds max page size {max_page_size}"
                )));
            }
        }

        Ok(())
    }

    pub fn offset_or_zero(&self) -> u64 {
        self.offset.map_or(0, |offset| offset.max(0) as u64)
    }

    /// Index range of a `len`-row result selected by this window
    pub fn window(&self, len: usize) -> Range<usize> {
        let start = usize::try_from(self.offset_or_zero()).unwrap_or(usize::MAX).min(len);
        let end = match self.limit {
            Some(limit) => start.saturating_add(limit.max(0) as usize).min(len),
            None => len,
        };
        start..end
    }
}

impl fmt::Display for Pagination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(limit) = self.limit {
            write!(f, " LIMIT {limit}")?;
        }
        if let Some(offset) = self.offset {
            write!(f, " OFFSET {offset}")?;
        }
        Ok(())
    }
}

/// One page of results together with the total number of matching rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(self.limit)
    }

    pub fn has_next_page(&self) -> bool {
        self.offset.saturating_add(self.results.len() as u64) < self.total
    }

    /// Convert every result, failing the whole page on the first error
    pub fn try_map<U, E, F>(self, f: F) -> std::result::Result<Page<U>, E>
    where
        F: FnMut(T) -> std::result::Result<U, E>,
    {
        Ok(Page {
            results: self.results.into_iter().map(f).collect::<std::result::Result<_, E>>()?,
            total: self.total,
            limit: self.limit,
            offset: self.offset,
        })
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            results: self.results.into_iter().map(f).collect(),
            total: self.total,
            limit: self.limit,
            offset: self.offset,
        }
    }
}
