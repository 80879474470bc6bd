//! The HTTP routing client.
//!
//! [`RouterClient`] is the only implementation of [`routing::ModelRouter`]
//! in this workspace. One instance owns a pooled [`reqwest::Client`] and is
//! cheap to share; every call is an independent, stateless round-trip.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode, Url};
use tracing::{debug, warn};

use routing::{
    InvocationId, Latency, ModelRouter, RoutingDecision, RoutingError, RoutingRequest,
};

use crate::config::RouterConfig;
use crate::wire;

/// Path of the model-select operation under the configured base URL.
const MODEL_SELECT_PATH: &str = "/v1/modelSelect";

/// HTTP adapter for the external prompt-routing service.
#[derive(Debug, Clone)]
pub struct RouterClient {
    http: Client,
    config: RouterConfig,
    endpoint: String,
}

impl RouterClient {
    /// Builds a client from `config`.
    ///
    /// Fails with [`RoutingError::Configuration`] when the base URL does not
    /// parse or the underlying HTTP client cannot be constructed. A missing
    /// API key is *not* a construction error; it surfaces as
    /// [`RoutingError::Authentication`] on the first call, so a resource can
    /// be declared before its credentials exist.
    pub fn new(config: RouterConfig) -> Result<Self, RoutingError> {
        Url::parse(&config.base_url).map_err(|e| RoutingError::Configuration {
            message: format!("invalid base URL '{}': {e}", config.base_url),
        })?;
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| RoutingError::Configuration {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        let endpoint = format!(
            "{}{MODEL_SELECT_PATH}",
            config.base_url.trim_end_matches('/')
        );
        Ok(Self {
            http,
            config,
            endpoint,
        })
    }

    /// Builds a client from the `MODELROUTE_*` environment variables.
    pub fn from_env() -> Result<Self, RoutingError> {
        Self::new(RouterConfig::from_env())
    }

    /// The resolved model-select URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ModelRouter for RouterClient {
    async fn route(
        &self,
        invocation: InvocationId,
        request: &RoutingRequest,
    ) -> Result<RoutingDecision, RoutingError> {
        // Credentials are checked before anything touches the network.
        let api_key = self
            .config
            .api_key
            .as_ref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| RoutingError::Authentication {
                reason: "no API key configured".to_string(),
            })?;

        debug!(
            target: "router_client",
            %invocation,
            url = %self.endpoint,
            candidates = request.candidates().len(),
            goals = request.goals().len(),
            "dispatching model select"
        );

        let started = Instant::now();
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key.expose())
            .json(&wire::ModelSelectRequest::from(request))
            .send()
            .await
            .map_err(|e| {
                let err = RoutingError::Communication {
                    reason: e.to_string(),
                    timed_out: e.is_timeout(),
                };
                warn!(target: "router_client", %invocation, error = %err, "model select failed");
                err
            })?;
        let latency = Latency::new(started.elapsed());

        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers());
            let body = response.text().await.unwrap_or_default();
            let message = wire::error_message(&body);
            warn!(
                target: "router_client",
                %invocation,
                status = status.as_u16(),
                message = %message,
                "model select rejected"
            );
            return Err(map_status(status, message, retry_after));
        }

        let body: wire::ModelSelectResponse =
            response
                .json()
                .await
                .map_err(|e| RoutingError::InvalidResponse {
                    reason: format!("failed to parse model-select response: {e}"),
                })?;
        let decision = body.into_decision(request, latency)?;
        debug!(
            target: "router_client",
            %invocation,
            selected = %decision.selected,
            latency = %decision.usage.latency,
            "model selected"
        );
        Ok(decision)
    }
}

/// Maps a non-success status onto the domain error taxonomy.
fn map_status(status: StatusCode, message: String, retry_after: Option<Duration>) -> RoutingError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RoutingError::Authentication {
            reason: message,
        },
        _ => RoutingError::Service {
            status: status.as_u16(),
            message,
            retry_after,
        },
    }
}

/// Reads a delay-seconds `Retry-After` header. HTTP-date forms are ignored;
/// the routing service only emits the integer form.
fn parse_retry_after(headers: &header::HeaderMap) -> Option<Duration> {
    headers
        .get(header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
