//! Outbound access to the election REST API.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use mapvote_common::{
    CaptchaConfig, ClientConfig, ConstituencyDetail, ConstituencyNo, ConstituencySummary,
    NewsFeed, StatsSnapshot, VoteReceipt, VoteRequest,
};

use crate::error::ApiError;

/// The endpoints the client consumes. `ApiClient` talks HTTP; tests swap in
/// in-memory fakes.
#[async_trait]
pub trait ElectionApi: Send + Sync + 'static {
    /// `GET /api/constituencies`
    async fn constituencies(&self) -> Result<Vec<ConstituencySummary>, ApiError>;

    /// `GET /api/constituencies/{id}`
    async fn constituency(&self, no: ConstituencyNo) -> Result<ConstituencyDetail, ApiError>;

    /// `GET /api/config`
    async fn captcha_config(&self) -> Result<CaptchaConfig, ApiError>;

    /// `POST /api/vote`
    async fn submit_vote(&self, request: &VoteRequest) -> Result<VoteReceipt, ApiError>;

    /// `GET /api/news`
    async fn news(&self) -> Result<NewsFeed, ApiError>;

    /// `GET /api/results/overall`
    async fn overall_results(&self) -> Result<StatsSnapshot, ApiError>;

    /// `GET /api/results/constituency/{id}`
    async fn constituency_results(
        &self,
        no: ConstituencyNo,
    ) -> Result<ConstituencyDetail, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    /// Root URL, without trailing slash
    base_url: String,
    /// HTTP client; keeps the device cookie between calls
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self::with_client(&config.base_url, client))
    }

    pub fn with_client(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        Self::read_json(response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: serde::Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        tracing::debug!("POST {}", url);

        let response = self.client.post(&url).json(body).send().await?;
        Self::read_json(response).await
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = normalize_failure(status, &body);
            tracing::debug!("Request failed: {}", err);
            return Err(err);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Turn a non-2xx response into an `ApiError`, taking the body's `error`
/// field, then `message`, then the raw text.
pub fn normalize_failure(status: StatusCode, body: &str) -> ApiError {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            ["error", "message"].iter().find_map(|field| {
                json.get(*field)
                    .and_then(|v| v.as_str())
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })
        });

    let message = from_json.or_else(|| {
        let text = body.trim();
        (!text.is_empty()).then(|| text.to_string())
    });

    ApiError::Status {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl ElectionApi for ApiClient {
    async fn constituencies(&self) -> Result<Vec<ConstituencySummary>, ApiError> {
        self.get_json("/api/constituencies").await
    }

    async fn constituency(&self, no: ConstituencyNo) -> Result<ConstituencyDetail, ApiError> {
        self.get_json(&format!("/api/constituencies/{}", no)).await
    }

    async fn captcha_config(&self) -> Result<CaptchaConfig, ApiError> {
        self.get_json("/api/config").await
    }

    async fn submit_vote(&self, request: &VoteRequest) -> Result<VoteReceipt, ApiError> {
        self.post_json("/api/vote", request).await
    }

    async fn news(&self) -> Result<NewsFeed, ApiError> {
        self.get_json("/api/news").await
    }

    async fn overall_results(&self) -> Result<StatsSnapshot, ApiError> {
        self.get_json("/api/results/overall").await
    }

    async fn constituency_results(
        &self,
        no: ConstituencyNo,
    ) -> Result<ConstituencyDetail, ApiError> {
        self.get_json(&format!("/api/results/constituency/{}", no)).await
    }
}
