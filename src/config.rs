//! Process configuration from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `PLEX_USER_LIST` | required |
//! | `PLEX_SHOWS_EXCLUDE` | empty |
//! | `PLEX_SHOWS_INCLUDE` | empty |
//! | `TVTIME_USER` | required |
//! | `TVTIME_PASSWORD` | required |
//! | `TVTIME_BASE_URL` | `https://www.tvtime.com` |
//! | `BIND_ADDR` | `0.0.0.0:8080` |
//! | `DELIVERY_MAX_ATTEMPTS` | `5` |

use std::net::SocketAddr;

use thiserror::Error;

use crate::filter::FilterConfig;
use crate::tracking::{Credentials, DEFAULT_MAX_ATTEMPTS, DeliveryPolicy};

const DEFAULT_TVTIME_BASE_URL: &str = "https://www.tvtime.com";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{name} is not a valid {expected}: '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub user_list: String,
    pub shows_exclude: String,
    pub shows_include: String,
    pub credentials: Credentials,
    pub tvtime_base_url: String,
    pub bind_addr: SocketAddr,
    pub max_attempts: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through `lookup`, which returns a variable's value
    /// or `None` when unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr.parse().map_err(|_| ConfigError::Invalid {
            name: "BIND_ADDR",
            expected: "socket address",
            value: bind_addr.clone(),
        })?;

        let max_attempts = match lookup("DELIVERY_MAX_ATTEMPTS") {
            None => DEFAULT_MAX_ATTEMPTS,
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid {
                    name: "DELIVERY_MAX_ATTEMPTS",
                    expected: "positive integer",
                    value: raw,
                })?,
        };

        Ok(AppConfig {
            user_list: required("PLEX_USER_LIST")?,
            shows_exclude: lookup("PLEX_SHOWS_EXCLUDE").unwrap_or_default(),
            shows_include: lookup("PLEX_SHOWS_INCLUDE").unwrap_or_default(),
            credentials: Credentials {
                username: required("TVTIME_USER")?,
                password: required("TVTIME_PASSWORD")?,
            },
            tvtime_base_url: lookup("TVTIME_BASE_URL")
                .unwrap_or_else(|| DEFAULT_TVTIME_BASE_URL.to_string()),
            bind_addr,
            max_attempts,
        })
    }

    pub fn filter(&self) -> FilterConfig {
        FilterConfig::initialize(&self.user_list, &self.shows_exclude, &self.shows_include)
    }

    pub fn delivery_policy(&self) -> DeliveryPolicy {
        DeliveryPolicy::default().with_max_attempts(self.max_attempts)
    }
}
