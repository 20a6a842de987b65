use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use crate::error::{AppError, Result};

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// How stories are linked to search-grounding sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceAttribution {
    /// Leave `sourceUrl` unset and return no sources.
    #[default]
    None,
    /// Match sources to stories by position, falling back to the first.
    Index,
}

impl FromStr for SourceAttribution {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(SourceAttribution::None),
            "index" => Ok(SourceAttribution::Index),
            other => Err(AppError::ConfigError(format!("Invalid source attribution: {}", other))),
        }
    }
}

/// Where the provider credential comes from.
///
/// `Env` is read on every call so that a missing key fails the request
/// rather than startup.
#[derive(Debug, Clone)]
pub enum ApiKeySource {
    Env(String),
    Static(Option<String>),
}

impl ApiKeySource {
    pub fn resolve(&self) -> Option<String> {
        match self {
            ApiKeySource::Env(var) => env::var(var).ok().filter(|key| !key.is_empty()),
            ApiKeySource::Static(key) => key.clone(),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub api_key: ApiKeySource,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub allowed_origin: String,
    pub cache_ttl_secs: i64,
    pub stale_while_revalidate_secs: i64,
    pub source_attribution: SourceAttribution,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            api_key: ApiKeySource::Env(API_KEY_VAR.to_string()),
            gemini_model: "gemini-3-flash-preview".to_string(),
            gemini_base_url: "https://generativelanguage.googleapis.com".to_string(),
            allowed_origin: "https://salathieljones-ux.github.io".to_string(),
            cache_ttl_secs: crate::cache::DEFAULT_TTL_SECS,
            stale_while_revalidate_secs: 3600,
            source_attribution: SourceAttribution::None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        let defaults = Config::default();

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
        let port = port.parse::<u16>().map_err(|e| AppError::ConfigError(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        let server_addr = SocketAddr::new(ip, port);

        let cache_ttl_secs = seconds_var("NEWS_CACHE_TTL_SECS", defaults.cache_ttl_secs)?;
        let stale_while_revalidate_secs =
            seconds_var("STALE_WHILE_REVALIDATE_SECS", defaults.stale_while_revalidate_secs)?;

        let source_attribution = match env::var("SOURCE_ATTRIBUTION") {
            Ok(value) => value.parse()?,
            Err(_) => defaults.source_attribution,
        };

        Ok(Config {
            server_addr,
            api_key: defaults.api_key,
            gemini_model: env::var("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            gemini_base_url: env::var("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),
            allowed_origin: env::var("ALLOWED_ORIGIN").unwrap_or(defaults.allowed_origin),
            cache_ttl_secs,
            stale_while_revalidate_secs,
            source_attribution,
        })
    }

    /// `Cache-Control` value advising a shared cache to hold a response for the TTL.
    pub fn cache_control(&self) -> String {
        format!(
            "public, s-maxage={}, stale-while-revalidate={}",
            self.cache_ttl_secs, self.stale_while_revalidate_secs
        )
    }
}

fn seconds_var(name: &str, default: i64) -> Result<i64> {
    match env::var(name) {
        Ok(value) => value
            .parse::<u32>()
            .map(i64::from)
            .map_err(|e| AppError::ConfigError(format!("Invalid {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cache_control_matches_four_hour_ttl() {
        assert_eq!(
            Config::default().cache_control(),
            "public, s-maxage=14400, stale-while-revalidate=3600"
        );
    }

    #[test]
    fn parses_source_attribution() {
        assert_eq!("index".parse::<SourceAttribution>().unwrap(), SourceAttribution::Index);
        assert_eq!(" None ".parse::<SourceAttribution>().unwrap(), SourceAttribution::None);
        assert!("sometimes".parse::<SourceAttribution>().is_err());
    }

    #[test]
    fn static_key_source_resolves_without_env() {
        assert_eq!(ApiKeySource::Static(None).resolve(), None);
        assert_eq!(
            ApiKeySource::Static(Some("abc".into())).resolve().as_deref(),
            Some("abc")
        );
    }
}
