use crate::error::{ConfigError, Result as AppResult};
use config::{Config, Environment, File};
use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub per_millisecond: u64,
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            per_millisecond: 500,
            burst_size: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    #[serde(deserialize_with = "deserialize_string_or_list")]
    pub cors_origins: Vec<String>,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSourceType {
    #[default]
    Builtin,
    File,
    Http,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CatalogConfig {
    pub source_type: CatalogSourceType,
    pub file_path: Option<String>,
    pub http_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizConfig {
    pub quick_question_count: usize,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            quick_question_count: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub quiz: QuizConfig,
}

pub fn load_settings() -> AppResult<AppSettings> {
    let defaults = RateLimitConfig::default();
    let builder = Config::builder()
        .set_default("server.port", 5000)?
        .set_default("server.cors_origins", Vec::<String>::new())?
        .set_default("server.rate_limit.enabled", defaults.enabled)?
        .set_default(
            "server.rate_limit.per_millisecond",
            defaults.per_millisecond as i64,
        )?
        .set_default("server.rate_limit.burst_size", i64::from(defaults.burst_size))?
        .set_default("catalog.source_type", "builtin")?
        .set_default(
            "quiz.quick_question_count",
            QuizConfig::default().quick_question_count as i64,
        )?
        .add_source(File::with_name("config").required(false))
        .add_source(
            Environment::with_prefix("TRIVIA")
                .separator("__")
                .try_parsing(true),
        );

    let settings = builder
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_settings: AppSettings = settings
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_settings(&app_settings)?;
    Ok(app_settings)
}

fn validate_settings(settings: &AppSettings) -> Result<(), ConfigError> {
    if settings.quiz.quick_question_count == 0 {
        return Err(ConfigError::InvalidValue(
            "quiz.quick_question_count must be at least 1".to_string(),
        ));
    }
    if settings.server.rate_limit.enabled
        && (settings.server.rate_limit.per_millisecond == 0
            || settings.server.rate_limit.burst_size == 0)
    {
        return Err(ConfigError::InvalidValue(
            "server.rate_limit needs a non-zero period and burst size".to_string(),
        ));
    }
    match settings.catalog.source_type {
        CatalogSourceType::File if settings.catalog.file_path.is_none() => Err(
            ConfigError::Missing("catalog.file_path (required for file source)".to_string()),
        ),
        CatalogSourceType::Http if settings.catalog.http_url.is_none() => Err(
            ConfigError::Missing("catalog.http_url (required for http source)".to_string()),
        ),
        _ => Ok(()),
    }
}

/// Accepts either a comma separated string (as set from the environment) or a list.
fn deserialize_string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_json::Value;

    let value = Value::deserialize(deserializer)?;

    match value {
        Value::String(s) => Ok(s
            .split(',')
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()),
        Value::Array(arr) => arr
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.trim().to_string()),
                _ => Err(D::Error::custom("Array must contain only strings")),
            })
            .collect(),
        Value::Null => Ok(Vec::new()),
        _ => Err(D::Error::custom("Expected string or array of strings")),
    }
}
