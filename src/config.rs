use chrono::Datelike;
use std::env;
use std::str::FromStr;
use thiserror::Error;

use crate::cache::CacheConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Knobs of the review workflow itself.
#[derive(Debug, Clone)]
pub struct ReviewSettings {
    /// Whether super-admins may send an in-process portfolio back as failed.
    pub allow_super_reject: bool,
    pub max_files: usize,
    pub max_comment_len: usize,
    pub min_year: i32,
    pub max_year: i32,
}

impl Default for ReviewSettings {
    fn default() -> Self {
        Self {
            allow_super_reject: true,
            max_files: 10,
            max_comment_len: 300,
            min_year: 2020,
            max_year: chrono::Utc::now().year(),
        }
    }
}

impl ReviewSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let settings = Self {
            allow_super_reject: env_or("REVIEW_ALLOW_SUPER_REJECT", defaults.allow_super_reject)?,
            max_files: env_or("REVIEW_MAX_FILES", defaults.max_files)?,
            max_comment_len: env_or("REVIEW_MAX_COMMENT_LEN", defaults.max_comment_len)?,
            min_year: env_or("REVIEW_MIN_YEAR", defaults.min_year)?,
            max_year: env_or("REVIEW_MAX_YEAR", defaults.max_year)?,
        };

        if settings.max_files == 0 {
            return Err(ConfigError::Invalid {
                name: "REVIEW_MAX_FILES",
                value: "0".to_string(),
            });
        }
        if settings.min_year > settings.max_year {
            return Err(ConfigError::Invalid {
                name: "REVIEW_MIN_YEAR",
                value: settings.min_year.to_string(),
            });
        }

        Ok(settings)
    }
}

/// Process-wide configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub redis_url: String,
    pub jwt_secret: String,
    pub port: u16,
    pub run_migrations: bool,
    pub review: ReviewSettings,
    pub cache: CacheConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            redis_url: required("REDIS_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            port: env_or("PORT", 8080)?,
            run_migrations: env_or("RUN_MIGRATIONS", false)?,
            review: ReviewSettings::from_env()?,
            cache: CacheConfig::from_env()?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

/// Parse `name` from the environment, falling back to `default` when unset.
pub(crate) fn env_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => parse_value(name, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T: FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: raw.to_string(),
    })
}
