//! Compiler settings

use std::env;
use std::path::Path;
use chrono_tz::Tz;
use serde::Deserialize;
use crate::error::ParseError;
use crate::request::{AsyncAfter, SortDirection};

/// Environment variable overriding [`CompilerConfig::timezone`]
pub const TIMEZONE_ENV: &str = "SEMREQ_TIMEZONE";
/// Environment variable overriding [`CompilerConfig::default_async_after`]
pub const ASYNC_AFTER_ENV: &str = "SEMREQ_DEFAULT_ASYNC_AFTER";

/// Settings shared by every compilation
///
/// Values are kept as written and checked when the config is loaded or
/// handed to a compiler.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CompilerConfig {
    /// IANA zone used when a request names none
    pub timezone: String,
    /// asyncAfter used when a request sends none
    pub default_async_after: String,
    /// Direction of a sort column sent without one
    pub default_sort_direction: String,
    /// Reserved sort column that orders the time axis
    pub date_time_column: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            timezone: env::var(TIMEZONE_ENV).unwrap_or_else(|_| "UTC".to_string()),
            default_async_after: env::var(ASYNC_AFTER_ENV).unwrap_or_else(|_| "never".to_string()),
            default_sort_direction: "desc".to_string(),
            date_time_column: "dateTime".to_string(),
        }
    }
}

impl CompilerConfig {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load settings from a YAML string; missing keys take their defaults
    pub fn from_yaml_str(content: &str) -> Result<Self, ParseError> {
        let config: CompilerConfig = serde_yaml::from_str(content)?;
        config.check()?;
        Ok(config)
    }

    /// Check that every value can be interpreted
    pub fn check(&self) -> Result<(), ParseError> {
        self.system_time_zone()?;
        self.async_after_default()?;
        self.sort_direction_default()?;
        if self.date_time_column.trim().is_empty() {
            return Err(invalid("date_time_column", &self.date_time_column));
        }
        Ok(())
    }

    pub fn system_time_zone(&self) -> Result<Tz, ParseError> {
        self.timezone
            .trim()
            .parse()
            .map_err(|_| invalid("timezone", &self.timezone))
    }

    pub fn async_after_default(&self) -> Result<AsyncAfter, ParseError> {
        AsyncAfter::parse(&self.default_async_after)
            .ok_or_else(|| invalid("default_async_after", &self.default_async_after))
    }

    pub fn sort_direction_default(&self) -> Result<SortDirection, ParseError> {
        SortDirection::parse(self.default_sort_direction.trim())
            .ok_or_else(|| invalid("default_sort_direction", &self.default_sort_direction))
    }
}

fn invalid(key: &str, value: &str) -> ParseError {
    ParseError::InvalidConfig {
        key: key.to_string(),
        value: value.to_string(),
    }
}
