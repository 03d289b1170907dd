use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::types::{DiscoverPage, MovieDetails};
use crate::config::TmdbConfig;

#[derive(Debug, thiserror::Error)]
pub enum TmdbError {
    #[error("movie not found")]
    NotFound,
    #[error("upstream returned status {0}")]
    Status(u16),
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),
    #[error("failed to decode response: {0}")]
    Decode(String),
}

// Request URLs carry the api_key query parameter, so they never reach Display.
impl From<reqwest::Error> for TmdbError {
    fn from(e: reqwest::Error) -> Self {
        TmdbError::Http(e.without_url())
    }
}

impl TmdbError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, TmdbError::NotFound)
    }
}

/// The two read operations the picker needs from the upstream catalog.
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    async fn discover(&self, page: u32) -> Result<DiscoverPage, TmdbError>;
    async fn movie_details(&self, id: u64) -> Result<MovieDetails, TmdbError>;
}

pub struct TmdbClient {
    client: reqwest::Client,
    config: TmdbConfig,
    api_key: String,
}

impl TmdbClient {
    pub fn new(config: &TmdbConfig) -> Result<Self, TmdbError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key().unwrap_or_default().to_string(),
            config: config.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, TmdbError> {
        let response = self
            .client
            .get(self.url(path))
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", self.config.language.as_str()),
            ])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(TmdbError::NotFound);
        }
        if !status.is_success() {
            return Err(TmdbError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| TmdbError::Decode(e.to_string()))
    }
}

#[async_trait]
impl MovieCatalog for TmdbClient {
    async fn discover(&self, page: u32) -> Result<DiscoverPage, TmdbError> {
        debug!(page, "Fetching TMDB discover page");

        let mut params = vec![
            ("page", page.to_string()),
            ("sort_by", "popularity.desc".to_string()),
            ("vote_count.gte", self.config.min_vote_count.to_string()),
        ];
        if let Some(runtime) = self.config.min_runtime {
            params.push(("with_runtime.gte", runtime.to_string()));
        }

        self.get_json("/discover/movie", &params).await
    }

    async fn movie_details(&self, id: u64) -> Result<MovieDetails, TmdbError> {
        debug!(movie_id = id, "Fetching TMDB movie details");
        self.get_json(&format!("/movie/{}", id), &[]).await
    }
}

/// Absolute poster URL for an upstream relative poster path.
pub fn poster_url(image_base_url: &str, path: &str) -> String {
    let base = image_base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}
