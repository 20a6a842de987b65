use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::cache::Clock;
use crate::models::{Continent, NewsPayload, Story};

pub mod card;
pub mod client;

pub use client::{ClientError, HttpNewsFetcher, NewsFetcher};

pub const INITIAL_CONTINENT: Continent = Continent::Africa;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedNews {
    pub stories: Vec<Story>,
    pub last_updated: DateTime<Utc>,
}

/// What the view should draw right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen<'a> {
    Idle { continent: Continent },
    Loading { continent: Continent },
    Error { continent: Continent, message: &'a str },
    /// The last fetch succeeded with zero stories.
    Empty {
        continent: Continent,
        last_updated: DateTime<Utc>,
    },
    Feed {
        continent: Continent,
        last_updated: DateTime<Utc>,
        updating: bool,
        stories: &'a [Story],
    },
}

pub struct NewsView<F> {
    fetcher: F,
    clock: Arc<dyn Clock>,
    active: Continent,
    news: HashMap<Continent, CachedNews>,
    loading: bool,
    error: Option<String>,
}

impl<F: NewsFetcher> NewsView<F> {
    pub fn new(fetcher: F, clock: Arc<dyn Clock>) -> Self {
        Self {
            fetcher,
            clock,
            active: INITIAL_CONTINENT,
            news: HashMap::new(),
            loading: false,
            error: None,
        }
    }

    pub fn active_continent(&self) -> Continent {
        self.active
    }

    pub fn news_for(&self, continent: Continent) -> Option<&CachedNews> {
        self.news.get(&continent)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn select_continent(&mut self, continent: Continent) {
        self.active = continent;
        if !self.news.contains_key(&continent) {
            self.load_news(continent, false).await;
        }
    }

    pub async fn load_news(&mut self, continent: Continent, force_refresh: bool) {
        if !self.begin_load(continent, force_refresh) {
            return;
        }
        let result = self.fetcher.fetch(continent, force_refresh).await;
        self.finish_load(continent, result);
    }

    pub async fn refresh(&mut self) {
        self.load_news(self.active, true).await;
    }

    pub async fn retry(&mut self) {
        self.refresh().await;
    }

    /// Marks a fetch as started. Returns `false` when the cached entry makes
    /// the fetch unnecessary.
    pub fn begin_load(&mut self, continent: Continent, force_refresh: bool) -> bool {
        if !force_refresh && self.news.contains_key(&continent) {
            return false;
        }
        debug!(%continent, force_refresh, "loading news");
        self.loading = true;
        self.error = None;
        true
    }

    // A failure leaves every cached entry as it was
    pub fn finish_load(&mut self, continent: Continent, result: Result<NewsPayload, ClientError>) {
        match result {
            Ok(payload) => {
                self.news.insert(
                    continent,
                    CachedNews {
                        stories: payload.stories,
                        last_updated: self.clock.now(),
                    },
                );
            }
            Err(err) => {
                warn!(%continent, error = %err, "failed to load news");
                self.error = Some(format!(
                    "Failed to load news for {}. Please try again.",
                    continent
                ));
            }
        }
        self.loading = false;
    }

    pub fn screen(&self) -> Screen<'_> {
        let continent = self.active;
        let entry = self.news.get(&continent);

        if self.loading && entry.is_none() {
            return Screen::Loading { continent };
        }
        if let Some(message) = self.error.as_deref() {
            return Screen::Error { continent, message };
        }

        match entry {
            None => Screen::Idle { continent },
            Some(entry) if entry.stories.is_empty() && !self.loading => Screen::Empty {
                continent,
                last_updated: entry.last_updated,
            },
            Some(entry) => Screen::Feed {
                continent,
                last_updated: entry.last_updated,
                updating: self.loading,
                stories: &entry.stories,
            },
        }
    }
}
