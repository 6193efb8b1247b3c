//! Runtime configuration loaded from the process environment.

use std::env;

use log::LevelFilter;

/// Snapshot of configuration values consumed by the core.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppCfg {
    /// Root that relative data-body paths are resolved against.
    pub data_root: String,
    /// Write inherited column types as `""` when encoding.
    pub compact_schema: bool,
    pub log_level: u8,
}

impl Default for AppCfg {
    fn default() -> Self {
        Self {
            data_root: ".".to_string(),
            compact_schema: false,
            log_level: 1,
        }
    }
}

impl AppCfg {
    /// Create a configuration snapshot from the process environment.
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a snapshot from an arbitrary key lookup. Unparsable values keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            data_root: lookup("SIDECAR_DATA_ROOT").unwrap_or(defaults.data_root),
            compact_schema: lookup("SIDECAR_COMPACT_SCHEMA")
                .and_then(|raw| parse_flag(&raw))
                .unwrap_or(defaults.compact_schema),
            log_level: lookup("SIDECAR_LOG_LEVEL")
                .and_then(|raw| raw.trim().parse().ok())
                .unwrap_or(defaults.log_level),
        }
    }

    /// Map the numeric level onto the `log` facade.
    pub fn log_filter(&self) -> LevelFilter {
        match self.log_level {
            0 => LevelFilter::Off,
            1 => LevelFilter::Warn,
            2 => LevelFilter::Info,
            3 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
