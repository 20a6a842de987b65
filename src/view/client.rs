use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::models::{Continent, NewsPayload};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
}

/// Anything that can hand the view a continent's stories.
#[async_trait]
pub trait NewsFetcher: Send + Sync {
    async fn fetch(&self, continent: Continent, force_refresh: bool) -> Result<NewsPayload, ClientError>;
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct HttpNewsFetcher {
    client: Client,
    endpoint: String,
}

impl HttpNewsFetcher {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl NewsFetcher for HttpNewsFetcher {
    async fn fetch(&self, continent: Continent, force_refresh: bool) -> Result<NewsPayload, ClientError> {
        let mut request = self
            .client
            .get(&self.endpoint)
            .query(&[("continent", continent.name())]);

        if force_refresh {
            request = request.query(&[("refresh", "true")]);
        }

        let res = request.send().await?;
        let status = res.status();

        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.error)
                .unwrap_or(text);
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(res.json::<NewsPayload>().await?)
    }
}
