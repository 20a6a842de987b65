pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod parser;
pub mod service;
pub mod view;

use std::sync::Arc;
use config::Config;
use service::NewsService;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub news: Arc<NewsService>,
}
