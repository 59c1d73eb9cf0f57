use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use chrono::{FixedOffset, Offset, Utc};
use log::{info, warn};

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3000";
pub const DEFAULT_EXPORT_PREFIX: &str = "registrations";
pub const DEFAULT_STATIC_DIR: &str = "static";
// Tamil Nadu
pub const DEFAULT_UTC_OFFSET: &str = "+05:30";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    /// Apps Script web app URL. Writes fail without it, reads come back empty.
    pub sheet_url: Option<String>,
    pub display_offset: FixedOffset,
    pub export_prefix: String,
    pub static_dir: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        Self {
            bind_address: try_load("BIND_ADDRESS", DEFAULT_BIND_ADDRESS.to_string()),
            sheet_url: var("GOOGLE_SHEET_WEB_APP_URL")
                .ok()
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty()),
            display_offset: load_offset("DISPLAY_UTC_OFFSET"),
            export_prefix: try_load("EXPORT_FILE_PREFIX", DEFAULT_EXPORT_PREFIX.to_string()),
            static_dir: PathBuf::from(try_load("STATIC_DIR", DEFAULT_STATIC_DIR.to_string())),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            sheet_url: None,
            display_offset: default_offset(),
            export_prefix: DEFAULT_EXPORT_PREFIX.to_string(),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

/// Parse `+HH:MM`, `-HH:MM`, `Z` or `UTC`.
pub fn parse_utc_offset(raw: &str) -> Option<FixedOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return Some(Utc.fix());
    }

    raw.parse::<FixedOffset>().ok()
}

fn default_offset() -> FixedOffset {
    parse_utc_offset(DEFAULT_UTC_OFFSET).unwrap_or_else(|| Utc.fix())
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found");
    })
}

fn try_load<T: FromStr + Display>(key: &str, default: T) -> T
where
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
            default
        }),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}

fn load_offset(key: &str) -> FixedOffset {
    match env::var(key) {
        Ok(raw) => parse_utc_offset(&raw).unwrap_or_else(|| {
            warn!("Invalid {key} value {raw:?}, using default: {DEFAULT_UTC_OFFSET}");
            default_offset()
        }),
        Err(_) => {
            info!("{key} not set, using default: {DEFAULT_UTC_OFFSET}");
            default_offset()
        }
    }
}
