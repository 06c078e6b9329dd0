use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use crate::error::Result;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_ADVANCE_DELAY_MS: u64 = 2500;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ClientSettings {
    pub base_url: String,
    pub advance_delay_ms: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            advance_delay_ms: DEFAULT_ADVANCE_DELAY_MS,
        }
    }
}

impl ClientSettings {
    pub fn advance_delay(&self) -> Duration {
        Duration::from_millis(self.advance_delay_ms)
    }
}

/// Reads an optional `client` file, then `TRIVIA_CLIENT__*` variables (e.g. `TRIVIA_CLIENT__BASE_URL`).
pub fn load_settings() -> Result<ClientSettings> {
    let settings = Config::builder()
        .set_default("base_url", DEFAULT_BASE_URL)?
        .set_default("advance_delay_ms", DEFAULT_ADVANCE_DELAY_MS as i64)?
        .add_source(File::with_name("client").required(false))
        .add_source(
            Environment::with_prefix("TRIVIA_CLIENT")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_local_server() {
        let settings = ClientSettings::default();
        assert_eq!(settings.base_url, "http://127.0.0.1:5000");
        assert_eq!(settings.advance_delay(), Duration::from_millis(2500));
    }

    #[test]
    fn test_deserializes_from_json() {
        let settings: ClientSettings =
            serde_json::from_str(r#"{"base_url": "http://quiz.test", "advance_delay_ms": 100}"#)
                .unwrap();
        assert_eq!(settings.base_url, "http://quiz.test");
        assert_eq!(settings.advance_delay(), Duration::from_millis(100));
    }
}
