//! Offset/limit pagination
//!
//! Pagination is passed explicitly from the HTTP layer into the query
//! layer as plain integers. Nothing here holds state between requests.

use serde::Serialize;

use super::errors::{DomainError, DomainResult};

/// Bounds applied when parsing pagination input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationLimits {
    pub default_limit: u64,
    pub max_limit: u64,
}

impl Default for PaginationLimits {
    fn default() -> Self {
        Self {
            default_limit: 25,
            max_limit: 100,
        }
    }
}

/// A validated `[offset, offset + limit)` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Pagination {
    pub fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }

    /// Parse raw `offset` / `limit` values (as received in a query string).
    ///
    /// Missing values fall back to `0` and `limits.default_limit`.
    pub fn parse(
        offset: Option<&str>,
        limit: Option<&str>,
        limits: &PaginationLimits,
    ) -> DomainResult<Self> {
        let offset = match offset.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                DomainError::Validation("Pagination offset must be a non-negative number".into())
            })?,
            None => 0,
        };

        let limit = match limit.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                DomainError::Validation("Pagination limit must be a valid number".into())
            })?,
            None => limits.default_limit,
        };

        if limit == 0 {
            return Err(DomainError::Validation(
                "Pagination limit must be greater than zero".into(),
            ));
        }
        if limit > limits.max_limit {
            return Err(DomainError::Validation(format!(
                "Pagination limit is too large (max {})",
                limits.max_limit
            )));
        }

        Ok(Self { offset, limit })
    }

    /// The window following this one.
    pub fn next(&self) -> Self {
        Self {
            offset: self.offset.saturating_add(self.limit),
            limit: self.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_values_use_defaults() {
        let p = Pagination::parse(None, None, &PaginationLimits::default()).unwrap();
        assert_eq!(p, Pagination::new(0, 25));
    }

    #[test]
    fn explicit_values_are_kept() {
        let p = Pagination::parse(Some("4"), Some("2"), &PaginationLimits::default()).unwrap();
        assert_eq!(p, Pagination::new(4, 2));
        assert_eq!(p.next(), Pagination::new(6, 2));
    }

    #[test]
    fn rejects_limit_over_max() {
        let limits = PaginationLimits {
            default_limit: 10,
            max_limit: 50,
        };
        let err = Pagination::parse(None, Some("51"), &limits).unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref m) if m.contains("max 50")));
    }

    #[test]
    fn rejects_garbage_and_negative_values() {
        let limits = PaginationLimits::default();
        assert!(Pagination::parse(Some("-1"), None, &limits).is_err());
        assert!(Pagination::parse(None, Some("ten"), &limits).is_err());
        assert!(Pagination::parse(None, Some("0"), &limits).is_err());
    }
}
