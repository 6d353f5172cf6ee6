//! List query parameters.

use serde::{Deserialize, Serialize};
use solon_config::DispatchConfig;

/// Page-size bounds applied to every list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListLimits {
    /// Page size used when `len` is missing or zero.
    pub default_len: u32,
    /// Largest page size; larger requests are clamped to it.
    pub max_len: u32,
}

impl Default for ListLimits {
    fn default() -> Self {
        Self::from(&DispatchConfig::default())
    }
}

impl From<&DispatchConfig> for ListLimits {
    fn from(config: &DispatchConfig) -> Self {
        Self {
            default_len: config.default_list_len,
            max_len: config.max_list_len,
        }
    }
}

impl ListLimits {
    /// Resolves a requested page size against these limits.
    ///
    /// The result is always in `1..=max_len` (or exactly 1 when `max_len` is
    /// 0), even for limits that never went through config validation.
    #[must_use]
    pub fn resolve(&self, requested: Option<u32>) -> u32 {
        let max = self.max_len.max(1);
        match requested {
            None | Some(0) => self.default_len.clamp(1, max),
            Some(len) => len.clamp(1, max),
        }
    }
}

/// Query types the dispatcher can normalize after binding.
pub trait QueryParameters {
    /// Applies server-side limits to the bound parameters.
    fn normalize(&mut self, limits: &ListLimits);
}

/// The standard list query: `?q=<text>&pos=<offset>&len=<count>`.
///
/// # Example
///
/// ```
/// use solon_crud::{ListLimits, ListQuery, QueryParameters};
///
/// let mut query: ListQuery = serde_urlencoded::from_str("len=500").unwrap();
/// query.normalize(&ListLimits { default_len: 20, max_len: 400 });
/// assert_eq!(query.limit(), 400);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListQuery {
    /// Free-text search term.
    #[serde(default)]
    pub q: Option<String>,
    /// Rows to skip.
    #[serde(default)]
    pub pos: u64,
    /// Rows to return.
    #[serde(default)]
    pub len: Option<u32>,
}

impl ListQuery {
    /// Returns the search term, treating an empty one as absent.
    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.q.as_deref().filter(|q| !q.is_empty())
    }

    /// Returns the offset.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.pos
    }

    /// Returns the page size, falling back to the default when not normalized.
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.len.unwrap_or_else(|| ListLimits::default().default_len)
    }
}

impl QueryParameters for ListQuery {
    fn normalize(&mut self, limits: &ListLimits) {
        self.len = Some(limits.resolve(self.len));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITS: ListLimits = ListLimits {
        default_len: 20,
        max_len: 400,
    };

    fn normalized(query: &str) -> ListQuery {
        let mut query: ListQuery = serde_urlencoded::from_str(query).unwrap();
        query.normalize(&LIMITS);
        query
    }

    #[test]
    fn test_defaults() {
        let query = normalized("");
        assert_eq!(query.offset(), 0);
        assert_eq!(query.limit(), 20);
        assert_eq!(query.search(), None);
    }

    #[test]
    fn test_zero_len_uses_default() {
        assert_eq!(normalized("len=0").limit(), 20);
    }

    #[test]
    fn test_len_clamped_to_max() {
        assert_eq!(normalized("len=500").limit(), 400);
        assert_eq!(normalized("len=400").limit(), 400);
        assert_eq!(normalized("len=1").limit(), 1);
    }

    #[test]
    fn test_search_and_offset() {
        let query = normalized("q=latte&pos=40&len=10");
        assert_eq!(query.search(), Some("latte"));
        assert_eq!(query.offset(), 40);
        assert_eq!(query.limit(), 10);

        assert_eq!(normalized("q=").search(), None);
    }

    #[test]
    fn test_limits_from_config() {
        let config = DispatchConfig {
            default_list_len: 5,
            max_list_len: 50,
            ..DispatchConfig::default()
        };
        let limits = ListLimits::from(&config);
        assert_eq!(limits.resolve(None), 5);
        assert_eq!(limits.resolve(Some(60)), 50);
    }

    #[test]
    fn test_default_above_max_is_capped() {
        let config = DispatchConfig {
            default_list_len: 1000,
            max_list_len: 400,
            ..DispatchConfig::default()
        };
        let limits = ListLimits::from(&config);
        assert_eq!(limits.resolve(None), 400);
        assert_eq!(limits.resolve(Some(0)), 400);
    }

    #[test]
    fn test_zero_limits_still_return_rows() {
        let limits = ListLimits {
            default_len: 0,
            max_len: 0,
        };
        assert_eq!(limits.resolve(Some(5)), 1);
        assert_eq!(limits.resolve(None), 1);
    }
}
