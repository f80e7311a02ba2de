//! Shared request plumbing for the resource sub-clients.
//!
//! Every call goes through [`Transport`] so that status handling, the actor
//! header, retry, and error mapping are identical across resources.

use attest_core::ActorId;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::retry::RetryPolicy;

/// Header carrying the acting user's id.
pub const ACTOR_HEADER: &str = "X-User-ID";

#[derive(Debug, Clone)]
pub(crate) struct Transport {
    http: reqwest::Client,
    base: String,
    retry: RetryPolicy,
}

impl Transport {
    pub(crate) fn new(http: reqwest::Client, base: String, retry: RetryPolicy) -> Self {
        Self { http, base, retry }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn with_actor(
        request: reqwest::RequestBuilder,
        actor: Option<&ActorId>,
    ) -> reqwest::RequestBuilder {
        match actor {
            Some(actor) => request.header(ACTOR_HEADER, actor.to_string()),
            None => request,
        }
    }

    /// `GET {base}{path}` and decode the JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        actor: Option<&ActorId>,
    ) -> Result<T, ApiError> {
        let endpoint = format!("GET {path}");
        let url = self.url(path);

        let resp = self
            .retry
            .send(&endpoint, || Self::with_actor(self.http.get(&url), actor).send())
            .await
            .map_err(|e| ApiError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        Self::decode(endpoint, resp).await
    }

    /// `POST {base}{path}` with a JSON body and decode the JSON response.
    pub(crate) async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        actor: Option<&ActorId>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let endpoint = format!("POST {path}");
        let url = self.url(path);

        let resp = self
            .retry
            .send(&endpoint, || {
                Self::with_actor(self.http.post(&url).json(body), actor).send()
            })
            .await
            .map_err(|e| ApiError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        Self::decode(endpoint, resp).await
    }

    /// `DELETE {base}{path}`, ignoring any response body.
    pub(crate) async fn delete(&self, path: &str, actor: Option<&ActorId>) -> Result<(), ApiError> {
        let endpoint = format!("DELETE {path}");
        let url = self.url(path);

        let resp = self
            .retry
            .send(&endpoint, || Self::with_actor(self.http.delete(&url), actor).send())
            .await
            .map_err(|e| ApiError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        Self::check(&endpoint, resp).await.map(|_| ())
    }

    async fn check(endpoint: &str, resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        tracing::debug!(endpoint, status, "collaborator returned non-success status");
        Err(ApiError::Status {
            endpoint: endpoint.to_string(),
            status,
            body,
        })
    }

    async fn decode<T: DeserializeOwned>(
        endpoint: String,
        resp: reqwest::Response,
    ) -> Result<T, ApiError> {
        let resp = Self::check(&endpoint, resp).await?;
        resp.json().await.map_err(|e| ApiError::Deserialization {
            endpoint,
            source: e,
        })
    }
}
