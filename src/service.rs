use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::cache::TtlCache;
use crate::config::{ApiKeySource, SourceAttribution};
use crate::error::{AppError, Result};
use crate::llm::NewsProvider;
use crate::models::{Continent, NewsPayload};
use crate::parser::{build_prompt, parse_stories, shape_stories};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct NewsService {
    provider: Arc<dyn NewsProvider>,
    cache: Arc<TtlCache>,
    api_key: ApiKeySource,
    attribution: SourceAttribution,
}

impl NewsService {
    pub fn new(
        provider: Arc<dyn NewsProvider>,
        cache: Arc<TtlCache>,
        api_key: ApiKeySource,
        attribution: SourceAttribution,
    ) -> Self {
        Self {
            provider,
            cache,
            api_key,
            attribution,
        }
    }

    pub fn cache(&self) -> &TtlCache {
        &self.cache
    }

    /// Failures never touch the cache.
    pub async fn get_news(
        &self,
        continent: Continent,
        force_refresh: bool,
    ) -> Result<(NewsPayload, CacheStatus)> {
        let key = continent.cache_key();

        if !force_refresh {
            if let Some(entry) = self.cache.get_fresh(&key) {
                info!(%continent, cached_at = %entry.timestamp, "cache hit");
                return Ok((entry.payload, CacheStatus::Hit));
            }
        }

        let api_key = self.api_key.resolve().ok_or_else(|| {
            warn!("provider credential is not configured");
            AppError::MissingApiKey
        })?;

        let prompt = build_prompt(continent);
        info!(%continent, force_refresh, "cache miss, calling provider");
        let started = Instant::now();

        let reply = self.provider.generate(&api_key, &prompt).await.map_err(|err| {
            warn!(%continent, error = %err, "provider call failed");
            err
        })?;
        info!(%continent, elapsed = ?started.elapsed(), "provider call succeeded");

        let raw = parse_stories(&reply.text).map_err(|source| {
            warn!(%continent, raw_len = reply.text.len(), error = %source, "could not parse model output");
            AppError::ParseError {
                source,
                raw: reply.text.clone(),
            }
        })?;

        let payload = match self.attribution {
            SourceAttribution::None => NewsPayload {
                stories: shape_stories(continent, raw, &[]),
                sources: Vec::new(),
            },
            SourceAttribution::Index => NewsPayload {
                stories: shape_stories(continent, raw, &reply.sources),
                sources: reply.sources,
            },
        };

        info!(%continent, stories = payload.stories.len(), "storing payload");
        self.cache.put(key, payload.clone());

        Ok((payload, CacheStatus::Miss))
    }
}
