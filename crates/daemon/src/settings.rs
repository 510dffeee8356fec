// Environment configuration for the driver

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use swipedeck_core::application::DeckConfig;
use tracing::warn;

pub const DEFAULT_DB_PATH: &str = "~/.swipedeck/deck.db";

/// Resolved runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub db_path: String,
    pub user_id: Option<String>,
    pub jobs_file: Option<PathBuf>,
    pub deck: DeckConfig,
}

impl Settings {
    /// Read `SWIPEDECK_*` variables; unset or unparsable values fall back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let db_path = lookup("SWIPEDECK_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let db_path = shellexpand::tilde(&db_path).into_owned();
        let user_id = lookup("SWIPEDECK_USER_ID").filter(|s| !s.trim().is_empty());
        let jobs_file = lookup("SWIPEDECK_JOBS_FILE")
            .map(|p| PathBuf::from(shellexpand::tilde(&p).into_owned()));

        let defaults = DeckConfig::default();
        let deck = DeckConfig {
            low_watermark: parse_or(&lookup, "SWIPEDECK_LOW_WATERMARK", defaults.low_watermark),
            page_size: parse_or(&lookup, "SWIPEDECK_PAGE_SIZE", defaults.page_size),
            fetch_timeout: Duration::from_secs(parse_or(
                &lookup,
                "SWIPEDECK_FETCH_TIMEOUT_SECS",
                defaults.fetch_timeout.as_secs(),
            )),
            ..defaults
        };

        Self {
            db_path,
            user_id,
            jobs_file,
            deck,
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> T {
    match lookup(name) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(var = name, value = %raw, "Invalid value, using default");
            default
        }),
        None => default,
    }
}
