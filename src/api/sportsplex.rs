use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};

use crate::api::envelope::MatchListResponse;
use crate::models::MatchRecord;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("SportsPlex API error: {status} - {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Client for the SportsPlex REST backend
#[derive(Debug, Clone)]
pub struct SportsPlexClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl SportsPlexClient {
    /// Create a new client; `token` is sent as a bearer token on every request
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sportsplex-matches/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ApiError::Request {
                url: base_url.to_string(),
                source,
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch every match known to the backend
    pub async fn fetch_matches(&self) -> ApiResult<Vec<MatchRecord>> {
        let url = format!("{}/matches", self.base_url);
        self.fetch_match_list(&url).await
    }

    /// Fetch matches for one sport
    pub async fn fetch_matches_for_sport(&self, sport: &str) -> ApiResult<Vec<MatchRecord>> {
        let url = format!(
            "{}/matches?sport={}",
            self.base_url,
            urlencoding::encode(sport)
        );
        self.fetch_match_list(&url).await
    }

    async fn fetch_match_list(&self, url: &str) -> ApiResult<Vec<MatchRecord>> {
        let response: MatchListResponse = self.get_json(url).await?;
        let matches = response.into_matches();

        info!("SportsPlex returned {} matches", matches.len());
        Ok(matches)
    }

    /// GET a JSON document with auth applied
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        debug!("Fetching {}", url);

        let response = self
            .authorize(self.client.get(url))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|source| ApiError::Request {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        response.json().await.map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}
