//! Startup configuration, read once from the environment (and `.env`).

use std::env;
use std::str::FromStr;

use chrono_tz::Tz;

use crate::error::ConfigError;
use crate::jobs::scheduler::{
    owned_crons, ScheduleConfig, DEFAULT_CHART_CRONS, DEFAULT_NEWS_CRONS, DEFAULT_PRICE_CRONS,
    DEFAULT_TIMEZONE,
};
use crate::scrapers::{NewsSourceConfig, ScraperConfig};

/// Address the HTTP server binds to
const ENV_BIND_ADDR: &str = "BIND_ADDR";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

const ENV_DATABASE_URL: &str = "DATABASE_URL";

/// "database" or "memory"; unset picks database when DATABASE_URL exists
const ENV_STORAGE_BACKEND: &str = "STORAGE_BACKEND";

/// Seed the in-memory backend with one sample price and news item
const ENV_MEMORY_STORAGE_SEED: &str = "MEMORY_STORAGE_SEED";

const ENV_SILVER_PRICE_URL: &str = "SILVER_PRICE_URL";
const ENV_SILVER_CHART_URL: &str = "SILVER_CHART_URL";

/// JSON array of news source descriptions, replaces the built-in source
const ENV_NEWS_SOURCES_JSON: &str = "NEWS_SOURCES_JSON";
const ENV_NEWS_MAX_ITEMS: &str = "NEWS_MAX_ITEMS";
const ENV_NEWS_DEDUP_BY_URL: &str = "NEWS_DEDUP_BY_URL";

/// Number of stories served by GET /api/news
const ENV_NEWS_DISPLAY_LIMIT: &str = "NEWS_DISPLAY_LIMIT";
const DEFAULT_NEWS_DISPLAY_LIMIT: u64 = 4;

const ENV_HTTP_TIMEOUT_SECS: &str = "HTTP_TIMEOUT_SECS";
const ENV_HTTP_USER_AGENT: &str = "HTTP_USER_AGENT";

const ENV_SCRAPER_TIMEZONE: &str = "SCRAPER_TIMEZONE";

/// `;`-separated 6-field cron expressions
const ENV_PRICE_SCRAPE_CRONS: &str = "PRICE_SCRAPE_CRONS";
const ENV_NEWS_SCRAPE_CRONS: &str = "NEWS_SCRAPE_CRONS";
const ENV_CHART_SCRAPE_CRONS: &str = "CHART_SCRAPE_CRONS";

const ENV_SCRAPE_ON_STARTUP: &str = "SCRAPE_ON_STARTUP";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Database { url: String },
    Memory { seed_sample_data: bool },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub storage: StorageBackend,
    pub scraper: ScraperConfig,
    pub schedule: ScheduleConfig,
    pub news_display_limit: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; missing or blank keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let storage = resolve_storage_backend(
            get(ENV_STORAGE_BACKEND),
            get(ENV_DATABASE_URL),
            parse_bool(ENV_MEMORY_STORAGE_SEED, get(ENV_MEMORY_STORAGE_SEED), false)?,
        )?;

        let defaults = ScraperConfig::default();
        let news_sources = match get(ENV_NEWS_SOURCES_JSON) {
            Some(json) => serde_json::from_str::<Vec<NewsSourceConfig>>(&json)?,
            None => defaults.news_sources,
        };

        let scraper = ScraperConfig {
            price_url: get(ENV_SILVER_PRICE_URL).unwrap_or(defaults.price_url),
            chart_url: get(ENV_SILVER_CHART_URL).unwrap_or(defaults.chart_url),
            news_sources,
            news_max_items: parse_number(
                ENV_NEWS_MAX_ITEMS,
                get(ENV_NEWS_MAX_ITEMS),
                defaults.news_max_items,
            )?,
            news_dedup_by_url: parse_bool(
                ENV_NEWS_DEDUP_BY_URL,
                get(ENV_NEWS_DEDUP_BY_URL),
                defaults.news_dedup_by_url,
            )?,
            http_timeout_secs: parse_number(
                ENV_HTTP_TIMEOUT_SECS,
                get(ENV_HTTP_TIMEOUT_SECS),
                defaults.http_timeout_secs,
            )?,
            user_agent: get(ENV_HTTP_USER_AGENT).unwrap_or(defaults.user_agent),
        };

        let schedule = ScheduleConfig {
            timezone: parse_timezone(get(ENV_SCRAPER_TIMEZONE))?,
            price_crons: parse_cron_list(
                ENV_PRICE_SCRAPE_CRONS,
                get(ENV_PRICE_SCRAPE_CRONS),
                DEFAULT_PRICE_CRONS,
            )?,
            news_crons: parse_cron_list(
                ENV_NEWS_SCRAPE_CRONS,
                get(ENV_NEWS_SCRAPE_CRONS),
                DEFAULT_NEWS_CRONS,
            )?,
            chart_crons: parse_cron_list(
                ENV_CHART_SCRAPE_CRONS,
                get(ENV_CHART_SCRAPE_CRONS),
                DEFAULT_CHART_CRONS,
            )?,
            run_on_startup: parse_bool(ENV_SCRAPE_ON_STARTUP, get(ENV_SCRAPE_ON_STARTUP), true)?,
        };

        Ok(Self {
            bind_addr: get(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            storage,
            scraper,
            schedule,
            news_display_limit: parse_number(
                ENV_NEWS_DISPLAY_LIMIT,
                get(ENV_NEWS_DISPLAY_LIMIT),
                DEFAULT_NEWS_DISPLAY_LIMIT,
            )?,
        })
    }
}

fn resolve_storage_backend(
    backend: Option<String>,
    database_url: Option<String>,
    seed_sample_data: bool,
) -> Result<StorageBackend, ConfigError> {
    let backend = backend.map(|b| b.to_lowercase());
    match backend.as_deref() {
        Some("database") => database_url
            .map(|url| StorageBackend::Database { url })
            .ok_or(ConfigError::MissingDatabaseUrl),
        Some("memory") => Ok(StorageBackend::Memory { seed_sample_data }),
        Some(other) => Err(ConfigError::InvalidValue {
            key: ENV_STORAGE_BACKEND,
            value: other.to_string(),
        }),
        None => Ok(match database_url {
            Some(url) => StorageBackend::Database { url },
            None => StorageBackend::Memory { seed_sample_data },
        }),
    }
}

fn parse_bool(key: &'static str, value: Option<String>, default: bool) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };

    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue { key, value }),
    }
}

fn parse_number<T: FromStr>(
    key: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(default),
    }
}

fn parse_timezone(value: Option<String>) -> Result<Tz, ConfigError> {
    match value {
        Some(name) => name.parse::<Tz>().map_err(|_| ConfigError::Timezone(name)),
        None => Ok(DEFAULT_TIMEZONE),
    }
}

/// Split on `;` and check each expression has the six fields
/// (sec min hour dom mon dow) the scheduler expects.
fn parse_cron_list(
    key: &'static str,
    value: Option<String>,
    default: &[&str],
) -> Result<Vec<String>, ConfigError> {
    let Some(value) = value else {
        return Ok(owned_crons(default));
    };

    let crons: Vec<String> = value
        .split(';')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();

    if crons.is_empty() {
        return Err(ConfigError::InvalidValue { key, value });
    }

    if let Some(bad) = crons.iter().find(|c| c.split_whitespace().count() != 6) {
        return Err(ConfigError::Cron {
            key,
            expr: bad.clone(),
        });
    }

    Ok(crons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:5000");
        assert_eq!(
            config.storage,
            StorageBackend::Memory {
                seed_sample_data: false
            }
        );
        assert_eq!(config.scraper.price_url, "http://www.ycmetal.co.kr/price/price02.php");
        assert_eq!(config.scraper.news_sources.len(), 1);
        assert!(config.scraper.news_dedup_by_url);
        assert_eq!(config.schedule.timezone, chrono_tz::Asia::Seoul);
        assert_eq!(config.schedule.price_crons[1], "0 20 10 * * *");
        assert_eq!(config.news_display_limit, 4);
    }

    #[test]
    fn test_database_url_selects_database_backend() {
        let config = config_from(&[("DATABASE_URL", "postgres://localhost/silver")]).unwrap();
        assert_eq!(
            config.storage,
            StorageBackend::Database {
                url: "postgres://localhost/silver".to_string()
            }
        );

        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/silver"),
            ("STORAGE_BACKEND", "memory"),
            ("MEMORY_STORAGE_SEED", "true"),
        ])
        .unwrap();
        assert_eq!(
            config.storage,
            StorageBackend::Memory {
                seed_sample_data: true
            }
        );
    }

    #[test]
    fn test_database_backend_requires_url() {
        assert!(matches!(
            config_from(&[("STORAGE_BACKEND", "database")]),
            Err(ConfigError::MissingDatabaseUrl)
        ));
        assert!(matches!(
            config_from(&[("STORAGE_BACKEND", "redis")]),
            Err(ConfigError::InvalidValue { key: "STORAGE_BACKEND", .. })
        ));
    }

    #[test]
    fn test_cron_overrides() {
        let config = config_from(&[
            ("PRICE_SCRAPE_CRONS", "0 5 9 * * * ; 0 35 9 * * *"),
            ("SCRAPER_TIMEZONE", "UTC"),
        ])
        .unwrap();
        assert_eq!(config.schedule.price_crons, vec!["0 5 9 * * *", "0 35 9 * * *"]);
        assert_eq!(config.schedule.timezone, chrono_tz::UTC);

        assert!(matches!(
            config_from(&[("NEWS_SCRAPE_CRONS", "*/5 * * * *")]),
            Err(ConfigError::Cron { key: "NEWS_SCRAPE_CRONS", .. })
        ));
        assert!(matches!(
            config_from(&[("SCRAPER_TIMEZONE", "Mars/Olympus")]),
            Err(ConfigError::Timezone(_))
        ));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            config_from(&[("NEWS_MAX_ITEMS", "lots")]),
            Err(ConfigError::InvalidValue { key: "NEWS_MAX_ITEMS", .. })
        ));
        assert!(matches!(
            config_from(&[("NEWS_DEDUP_BY_URL", "maybe")]),
            Err(ConfigError::InvalidValue { key: "NEWS_DEDUP_BY_URL", .. })
        ));

        let config = config_from(&[("NEWS_DEDUP_BY_URL", "off"), ("SCRAPE_ON_STARTUP", "0")]).unwrap();
        assert!(!config.scraper.news_dedup_by_url);
        assert!(!config.schedule.run_on_startup);
    }

    #[test]
    fn test_news_sources_json() {
        let json = r#"[{"name":"Daily","url":"https://d.test/","item_selector":"li","title_selector":"a"}]"#;
        let config = config_from(&[("NEWS_SOURCES_JSON", json)]).unwrap();

        let source = &config.scraper.news_sources[0];
        assert_eq!(source.name, "Daily");
        assert_eq!(source.link_selector, None);
        assert_eq!(source.category, "precious-metals");

        assert!(matches!(
            config_from(&[("NEWS_SOURCES_JSON", "{not json")]),
            Err(ConfigError::NewsSources(_))
        ));
    }
}
