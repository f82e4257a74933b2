//! reqwest-backed [`Backend`].

use crate::backend::Backend;
use crate::error::{ClientError, ClientResult};
use crate::wire::{filter_query, LoginRequest, MatchResponse, SearchResponse};
use async_trait::async_trait;
use kennel_core::{BackendSettings, Dog, DogId, ResultPage, SearchCursor, SearchFilter};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP transport for the catalog service.
///
/// The session cookie set by `/auth/login` lives in the client's cookie
/// store and is attached to every later request.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a backend from transport settings.
    pub fn new(settings: &BackendSettings) -> ClientResult<Self> {
        let base_url = settings.base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidBaseUrl(settings.base_url.clone()));
        }

        let client = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a backend path. Absolute URLs pass through unchanged.
    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    async fn send(&self, req: RequestBuilder, path: &str) -> ClientResult<Response> {
        let resp = req.send().await?;
        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED {
            tracing::debug!("{} returned 401", path);
            return Err(ClientError::Unauthorized {
                path: path.to_string(),
            });
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                path: path.to_string(),
                body,
            });
        }

        Ok(resp)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        path: &str,
    ) -> ClientResult<T> {
        let resp = self.send(req, path).await?;
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn breeds(&self) -> ClientResult<Vec<String>> {
        let path = "/dogs/breeds";
        self.send_json(self.client.get(self.url(path)), path).await
    }

    async fn search(&self, filter: &SearchFilter) -> ClientResult<ResultPage> {
        let path = "/dogs/search";
        let req = self.client.get(self.url(path)).query(&filter_query(filter));
        let resp: SearchResponse = self.send_json(req, path).await?;
        Ok(resp.into())
    }

    async fn search_next(&self, cursor: &SearchCursor) -> ClientResult<ResultPage> {
        let path = cursor.as_str();
        let resp: SearchResponse = self.send_json(self.client.get(self.url(path)), path).await?;
        Ok(resp.into())
    }

    async fn dogs(&self, ids: &[DogId]) -> ClientResult<Vec<Dog>> {
        let path = "/dogs";
        self.send_json(self.client.post(self.url(path)).json(ids), path)
            .await
    }

    async fn match_dog(&self, ids: &[DogId]) -> ClientResult<Option<DogId>> {
        let path = "/dogs/match";
        let resp: MatchResponse = self
            .send_json(self.client.post(self.url(path)).json(ids), path)
            .await?;
        Ok(resp.matched)
    }

    async fn login(&self, name: &str, email: &str) -> ClientResult<()> {
        let path = "/auth/login";
        let body = LoginRequest {
            name: name.to_string(),
            email: email.to_string(),
        };
        self.send(self.client.post(self.url(path)).json(&body), path)
            .await?;
        Ok(())
    }

    async fn logout(&self) -> ClientResult<()> {
        let path = "/auth/logout";
        self.send(self.client.post(self.url(path)), path).await?;
        Ok(())
    }
}
