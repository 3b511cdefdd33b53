// Runtime configuration read from the environment.
//
// Variables
// - ICE_SOS_BACKEND_URL / ICE_SOS_API_KEY: hosted backend; both or neither.
// - ICE_SOS_HTTP_ADDR: listen address of the admin surface.
// - ICE_SOS_CALL_TIMEOUT_MS: timeout applied to every remote call.
// - ICE_SOS_QUERY_RETRIES: retries for transient query failures. Mutations never retry.
// - ICE_SOS_PAGE_LIMIT: row limit of a view's query.

use crate::shared::infrastructure::gateway::policy::CallPolicy;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const BACKEND_URL: &str = "ICE_SOS_BACKEND_URL";
pub const API_KEY: &str = "ICE_SOS_API_KEY";
pub const HTTP_ADDR: &str = "ICE_SOS_HTTP_ADDR";
pub const CALL_TIMEOUT_MS: &str = "ICE_SOS_CALL_TIMEOUT_MS";
pub const QUERY_RETRIES: &str = "ICE_SOS_QUERY_RETRIES";
pub const PAGE_LIMIT: &str = "ICE_SOS_PAGE_LIMIT";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub url: String,
    pub api_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub backend: Option<BackendConfig>,
    pub http_addr: SocketAddr,
    pub call_timeout: Duration,
    pub query_retries: u32,
    pub page_limit: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            backend: None,
            http_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            call_timeout: Duration::from_millis(15_000),
            query_retries: 0,
            page_limit: 500,
        }
    }
}

impl SyncConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let backend = match (read(BACKEND_URL), read(API_KEY)) {
            (Some(url), Some(api_key)) => Some(BackendConfig { url, api_key }),
            (Some(_), None) => return Err(ConfigError::Missing(API_KEY)),
            (None, Some(_)) => return Err(ConfigError::Missing(BACKEND_URL)),
            (None, None) => None,
        };

        Ok(Self {
            backend,
            http_addr: parse(HTTP_ADDR, read(HTTP_ADDR))?.unwrap_or(defaults.http_addr),
            call_timeout: parse::<u64>(CALL_TIMEOUT_MS, read(CALL_TIMEOUT_MS))?
                .map(Duration::from_millis)
                .unwrap_or(defaults.call_timeout),
            query_retries: parse(QUERY_RETRIES, read(QUERY_RETRIES))?
                .unwrap_or(defaults.query_retries),
            page_limit: parse(PAGE_LIMIT, read(PAGE_LIMIT))?.unwrap_or(defaults.page_limit),
        })
    }

    pub fn query_policy(&self) -> CallPolicy {
        CallPolicy::no_retry(Some(self.call_timeout))
            .with_retries(self.query_retries, Duration::from_millis(250))
    }

    pub fn mutation_policy(&self) -> CallPolicy {
        CallPolicy::no_retry(Some(self.call_timeout))
    }
}

fn parse<T: FromStr>(key: &'static str, raw: Option<String>) -> Result<Option<T>, ConfigError> {
    raw.map(|value| {
        value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value })
    })
    .transpose()
}
