//! strftime-style labels for sample timestamps.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{Local, TimeZone};

use crate::error::ConfigError;

/// A validated strftime pattern.
///
/// Validation happens once at startup so formatting a point label can never
/// fail mid-run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeFormat {
    pattern: String,
}

impl TimeFormat {
    /// Parse and validate a strftime pattern such as `%H:%M:%S`.
    pub fn parse(pattern: &str) -> Result<Self, ConfigError> {
        if pattern.is_empty() {
            return Err(ConfigError::TimeFormat(pattern.to_string()));
        }
        if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::TimeFormat(pattern.to_string()));
        }
        Ok(Self {
            pattern: pattern.to_string(),
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Format Unix seconds in the local time zone.
    pub fn format_unix(&self, secs: i64) -> String {
        let Some(dt) = Local.timestamp_opt(secs, 0).single() else {
            return String::new();
        };
        let mut out = String::new();
        if write!(out, "{}", dt.format(&self.pattern)).is_err() {
            out.clear();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2023-11-14T22:13:20Z
    const KNOWN_UNIX: i64 = 1_700_000_000;

    #[test]
    fn test_parse_default_pattern() {
        let f = TimeFormat::parse("%H:%M:%S").unwrap();
        assert_eq!(f.pattern(), "%H:%M:%S");
    }

    #[test]
    fn test_parse_rejects_dangling_percent() {
        assert_eq!(
            TimeFormat::parse("%H:%"),
            Err(ConfigError::TimeFormat("%H:%".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_unknown_specifier() {
        assert!(TimeFormat::parse("%Q").is_err());
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(TimeFormat::parse("").is_err());
    }

    #[test]
    fn test_literal_only_pattern_is_valid() {
        let f = TimeFormat::parse("tick").unwrap();
        assert_eq!(f.format_unix(KNOWN_UNIX), "tick");
    }

    #[test]
    fn test_format_is_zone_independent_for_seconds() {
        let f = TimeFormat::parse("%S").unwrap();
        assert_eq!(f.format_unix(KNOWN_UNIX), "20");
    }

    #[test]
    fn test_format_year_month() {
        let f = TimeFormat::parse("%Y-%m").unwrap();
        assert_eq!(f.format_unix(KNOWN_UNIX), "2023-11");
    }

    #[test]
    fn test_same_second_same_label() {
        let f = TimeFormat::parse("%H:%M:%S").unwrap();
        assert_eq!(f.format_unix(KNOWN_UNIX), f.format_unix(KNOWN_UNIX));
        assert_ne!(f.format_unix(KNOWN_UNIX), f.format_unix(KNOWN_UNIX + 1));
    }
}
