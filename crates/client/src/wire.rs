//! Wire schema for the model-select endpoint.
//!
//! These types mirror the JSON the routing service speaks; nothing outside
//! this crate sees them. Conversion into domain types happens here so the
//! membership invariant (selected model ∈ candidate set) is enforced at the
//! boundary, before a decision reaches the caller.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use routing::{
    Latency, ModelId, RoutingDecision, RoutingError, RoutingRequest, SessionId, TokenCount,
    UsageMetrics,
};

// ---------------------------------------------------------------------------
// Request body
// ---------------------------------------------------------------------------

/// `POST /v1/modelSelect` request body.
#[derive(Debug, Serialize)]
pub(crate) struct ModelSelectRequest<'a> {
    pub prompt: &'a str,
    pub candidates: Vec<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub goals: Vec<&'a str>,
}

impl<'a> From<&'a RoutingRequest> for ModelSelectRequest<'a> {
    fn from(request: &'a RoutingRequest) -> Self {
        Self {
            prompt: request.prompt(),
            candidates: request.candidates().iter().map(ModelId::as_str).collect(),
            goals: request.goals().iter().map(|g| g.as_str()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

/// Usage block on a successful model-select response. Every field is
/// optional; the service omits counters it did not measure.
#[derive(Debug, Deserialize)]
pub(crate) struct WireUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    pub total_tokens: Option<u64>,
}

/// Successful model-select response body.
#[derive(Debug, Deserialize)]
pub(crate) struct ModelSelectResponse {
    pub selected_model: String,
    pub session_id: Option<String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, serde_json::Value>,
    pub usage: Option<WireUsage>,
}

impl ModelSelectResponse {
    /// Converts the wire response into a domain decision.
    ///
    /// Fails with [`RoutingError::InvalidResponse`] when the selected model
    /// is empty or not a member of the originating request's candidate set.
    pub fn into_decision(
        self,
        request: &RoutingRequest,
        latency: Latency,
    ) -> Result<RoutingDecision, RoutingError> {
        let selected =
            ModelId::new(self.selected_model).ok_or_else(|| RoutingError::InvalidResponse {
                reason: "response named an empty selected model".to_string(),
            })?;
        if !request.contains_candidate(&selected) {
            return Err(RoutingError::InvalidResponse {
                reason: format!("selected model '{selected}' is not among the request candidates"),
            });
        }
        let usage = match self.usage {
            Some(u) => UsageMetrics::new(
                TokenCount::new(u.prompt_tokens),
                TokenCount::new(u.completion_tokens),
                u.total_tokens.map(TokenCount::new),
                latency,
            ),
            None => UsageMetrics::latency_only(latency),
        };
        Ok(RoutingDecision {
            selected,
            session: self.session_id.and_then(SessionId::new),
            annotations: self.annotations,
            usage,
        })
    }
}

/// Error response body. The service uses `message`; some proxies in front of
/// it use `detail`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
    pub detail: Option<String>,
}

/// Extracts a human-readable message from an error response body, falling
/// back to the raw (truncated) body text when it is not structured.
pub(crate) fn error_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(message) = parsed.message.or(parsed.detail) {
            return message;
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "(empty response body)".to_string();
    }
    const MAX: usize = 256;
    if trimmed.len() > MAX {
        let mut end = MAX;
        while !trimmed.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &trimmed[..end])
    } else {
        trimmed.to_string()
    }
}
