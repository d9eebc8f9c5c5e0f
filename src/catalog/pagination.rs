use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Page size when the caller gives none.
pub const DEFAULT_LIMIT: u64 = 12;
/// Largest page size any listing returns.
pub const MAX_LIMIT: u64 = 100;
/// Largest offset passed to storage (`i64::MAX`).
const MAX_OFFSET: u64 = i64::MAX.unsigned_abs();

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u64,
    pub limit: u64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Page {
    /// Coerce raw query values: anything unparsable or below 1 falls back to the
    /// default, and the limit is capped at [`MAX_LIMIT`].
    #[must_use]
    pub fn lenient(page: Option<&str>, limit: Option<&str>) -> Self {
        let parse = |raw: Option<&str>| {
            raw.and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|v| *v >= 1)
        };
        Self {
            page: parse(page).unwrap_or(1),
            limit: parse(limit).unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT),
        }
    }

    /// Coerce numbers supplied in a JSON body the same way as [`Page::lenient`].
    #[must_use]
    pub fn from_numbers(page: Option<i64>, limit: Option<i64>) -> Self {
        let positive = |v: Option<i64>| v.and_then(|v| u64::try_from(v).ok()).filter(|v| *v >= 1);
        Self {
            page: positive(page).unwrap_or(1),
            limit: positive(limit).unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT),
        }
    }

    /// Validate raw query values, rejecting a page below 1 or a limit outside
    /// `1..=MAX_LIMIT`. Absent values take the defaults.
    ///
    /// # Errors
    ///
    /// Returns `VALIDATION_ERROR` when either value is present but invalid.
    pub fn validated(page: Option<&str>, limit: Option<&str>) -> Result<Self, AppError> {
        let page = match page {
            None => 1,
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|v| *v >= 1)
                .ok_or_else(|| AppError::validation("Page must be a positive integer"))?,
        };
        let limit = match limit {
            None => DEFAULT_LIMIT,
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|v| (1..=MAX_LIMIT).contains(v))
                .ok_or_else(|| {
                    AppError::validation(format!("Limit must be between 1 and {MAX_LIMIT}"))
                })?,
        };
        Ok(Self { page, limit })
    }

    /// Rows to skip before this page. Saturates at `i64::MAX`, the largest
    /// offset storage accepts, so a far-off page is simply empty.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        let offset = self.page.saturating_sub(1).saturating_mul(self.limit);
        if offset > MAX_OFFSET { MAX_OFFSET } else { offset }
    }

    /// Pagination block for a response, given the total number of matching rows.
    #[must_use]
    pub const fn meta(&self, total: u64) -> PageMeta {
        let total_pages = total.div_ceil(self.limit);
        PageMeta {
            page: self.page,
            limit: self.limit,
            total,
            total_pages,
            has_next: self.page < total_pages,
            has_prev: self.page > 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        assert_eq!(Page { page: 1, limit: 12 }.offset(), 0);
        assert_eq!(Page { page: 3, limit: 12 }.offset(), 24);
    }

    #[test]
    fn test_offset_saturates_on_huge_pages() {
        let far = Page {
            page: 1_000_000_000_000_000_000,
            limit: 100,
        };
        assert_eq!(far.offset(), MAX_OFFSET);

        let wrapping = Page {
            page: 288_230_376_151_711_745,
            limit: 64,
        };
        assert_eq!(wrapping.offset(), MAX_OFFSET);
        assert_eq!(Page { page: u64::MAX, limit: MAX_LIMIT }.offset(), MAX_OFFSET);
    }

    #[test]
    fn test_lenient_defaults_and_cap() {
        assert_eq!(Page::lenient(None, None), Page::default());
        assert_eq!(
            Page::lenient(Some("abc"), Some("-4")),
            Page { page: 1, limit: 12 }
        );
        assert_eq!(Page::lenient(Some("0"), Some("500")).limit, MAX_LIMIT);
        assert_eq!(Page::lenient(Some("2"), Some("5")), Page { page: 2, limit: 5 });
    }

    #[test]
    fn test_from_numbers() {
        assert_eq!(Page::from_numbers(Some(-1), Some(0)), Page::default());
        assert_eq!(Page::from_numbers(Some(4), Some(1000)).limit, MAX_LIMIT);
    }

    #[test]
    fn test_validated_rejects_out_of_range() {
        assert!(Page::validated(Some("0"), None).is_err());
        assert!(Page::validated(None, Some("101")).is_err());
        assert!(Page::validated(None, Some("0")).is_err());
        assert!(Page::validated(Some("x"), None).is_err());
        assert_eq!(
            Page::validated(Some("2"), Some("100")).ok(),
            Some(Page { page: 2, limit: 100 })
        );
    }

    #[test]
    fn test_meta() {
        let meta = Page { page: 2, limit: 10 }.meta(25);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next);
        assert!(meta.has_prev);

        let empty = Page::default().meta(0);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next);
        assert!(!empty.has_prev);
    }
}
