//! Engine configuration
//!
//! Settings can be built in code or read from the environment:
//!
//! - `QUARRY_MAX_PAGE_SIZE`: largest page a query may request
//! - `QUARRY_NULLS`: `first` or `last`, where NULL sort keys land
//! - `QUARRY_FAIL_FAST`: `1`/`true` aborts a listing on the first bad row

use std::env;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: '{value}'")]
    InvalidValue { var: &'static str, value: String },
}

/// Where NULL sort keys are placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NullOrdering {
    /// NULL is the smallest value: first when ascending, last when descending
    #[default]
    First,
    /// NULL is the largest value
    Last,
}

impl FromStr for NullOrdering {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(NullOrdering::First),
            "last" => Ok(NullOrdering::Last),
            _ => Err(()),
        }
    }
}

impl fmt::Display for NullOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NullOrdering::First => f.write_str("first"),
            NullOrdering::Last => f.write_str("last"),
        }
    }
}

/// What a listing does when one row fails to transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Skip the row, log it and keep going
    #[default]
    Collect,
    /// Abort the listing with the first error
    FailFast,
}

/// Engine configuration
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Largest `take(n)` honoured; bigger requests are clamped
    pub max_page_size: Option<u64>,
    pub null_ordering: NullOrdering,
    pub transform_failure: FailureMode,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn max_page_size(mut self, size: u64) -> Self {
        self.max_page_size = Some(size);
        self
    }

    #[must_use]
    pub fn null_ordering(mut self, ordering: NullOrdering) -> Self {
        self.null_ordering = ordering;
        self
    }

    #[must_use]
    pub fn transform_failure(mut self, mode: FailureMode) -> Self {
        self.transform_failure = mode;
        self
    }

    /// Read configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = EngineConfig::default();

        if let Some(value) = lookup("QUARRY_MAX_PAGE_SIZE") {
            let size = value.trim().parse::<u64>().ok().filter(|s| *s > 0);
            config.max_page_size = Some(size.ok_or(ConfigError::InvalidValue {
                var: "QUARRY_MAX_PAGE_SIZE",
                value,
            })?);
        }

        if let Some(value) = lookup("QUARRY_NULLS") {
            config.null_ordering = value.parse().map_err(|_| ConfigError::InvalidValue {
                var: "QUARRY_NULLS",
                value,
            })?;
        }

        if let Some(value) = lookup("QUARRY_FAIL_FAST") {
            config.transform_failure = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => FailureMode::FailFast,
                "0" | "false" | "no" | "" => FailureMode::Collect,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: "QUARRY_FAIL_FAST",
                        value,
                    })
                }
            };
        }

        Ok(config)
    }

    /// Apply `max_page_size` to a requested limit
    ///
    /// Returns the effective limit and whether it was clamped. Unbounded
    /// listings are left alone.
    pub fn clamp_limit(&self, limit: Option<u64>) -> (Option<u64>, bool) {
        match (limit, self.max_page_size) {
            (Some(l), Some(max)) if l > max => (Some(max), true),
            (l, _) => (l, false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.max_page_size, None);
        assert_eq!(config.null_ordering, NullOrdering::First);
        assert_eq!(config.transform_failure, FailureMode::Collect);
    }

    #[test]
    fn test_from_vars() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("QUARRY_MAX_PAGE_SIZE", "50"),
            ("QUARRY_NULLS", "LAST"),
            ("QUARRY_FAIL_FAST", "true"),
        ]))
        .unwrap();
        assert_eq!(config.max_page_size, Some(50));
        assert_eq!(config.null_ordering, NullOrdering::Last);
        assert_eq!(config.transform_failure, FailureMode::FailFast);
    }

    #[test]
    fn test_invalid_vars() {
        let err = EngineConfig::from_lookup(lookup(&[("QUARRY_MAX_PAGE_SIZE", "0")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { var: "QUARRY_MAX_PAGE_SIZE", .. }
        ));
        assert!(EngineConfig::from_lookup(lookup(&[("QUARRY_NULLS", "middle")])).is_err());
    }

    #[test]
    fn test_clamp_limit() {
        let config = EngineConfig::new().max_page_size(100);
        assert_eq!(config.clamp_limit(Some(20)), (Some(20), false));
        assert_eq!(config.clamp_limit(Some(500)), (Some(100), true));
        assert_eq!(config.clamp_limit(None), (None, false));
    }
}
