//! Paging window

use std::fmt;

use super::error::{PlannerError, PlannerResult};

/// Offset/limit window over the ordered, deduplicated result stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Window {
    /// Rows to skip
    pub offset: u64,
    /// Maximum rows to return after the offset (None = unbounded)
    pub limit: Option<u64>,
}

impl Window {
    /// Create a window skipping `offset` rows and returning at most `limit`
    pub fn new(offset: u64, limit: Option<u64>) -> Self {
        Self { offset, limit }
    }

    /// Unbounded window starting at the first row
    pub fn all() -> Self {
        Self::default()
    }

    /// Window for a 0-based page of `size` rows
    pub fn page(index: u64, size: u64) -> Self {
        Self::new(index.saturating_mul(size), Some(size))
    }

    /// Exclusive end rank, `None` when unbounded
    pub fn end(&self) -> Option<u64> {
        self.limit.map(|l| self.offset.saturating_add(l))
    }

    /// True when the window neither skips nor caps rows
    pub fn is_unbounded(&self) -> bool {
        self.offset == 0 && self.limit.is_none()
    }

    /// Reject zero-row limits
    pub fn validate(&self) -> PlannerResult<()> {
        if self.limit == Some(0) {
            return Err(PlannerError::InvalidWindow(
                "limit must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.limit {
            Some(limit) => write!(f, "offset={}, limit={}", self.offset, limit),
            None => write!(f, "offset={}", self.offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end() {
        assert_eq!(Window::new(10, Some(20)).end(), Some(30));
        assert_eq!(Window::new(10, None).end(), None);
        assert_eq!(Window::new(u64::MAX, Some(5)).end(), Some(u64::MAX));
    }

    #[test]
    fn test_page() {
        assert_eq!(Window::page(2, 20), Window::new(40, Some(20)));
        assert!(Window::all().is_unbounded());
        assert!(!Window::page(0, 20).is_unbounded());
    }

    #[test]
    fn test_validate() {
        assert!(Window::new(0, Some(0)).validate().is_err());
        assert!(Window::new(5, None).validate().is_ok());
    }
}
