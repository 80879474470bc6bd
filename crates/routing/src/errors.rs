//! Error and retry-policy types for the routing domain.
//!
//! [`RoutingError`] covers every way a routing invocation can fail. The
//! variants deliberately mirror the three failure kinds a caller must react
//! to differently: the network (communication), the credentials
//! (authentication), and the service itself (service / invalid response).
//!
//! [`RetryPolicy`] is a cross-cutting concern: any error type that
//! participates in retry decisions must be able to produce a [`RetryPolicy`].
//! This crate classifies only; no retry loop is implemented here or in the
//! infrastructure crates — whether and how to retry is the host's call.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// Returned by [`RoutingError::retry_policy`] to let the host decide whether
/// to re-invoke the routing call without escalating.
///
/// ## Rules
///
/// - `Retryable`: timeouts, connection failures, rate-limit responses (429,
///   honouring `Retry-After`), upstream 5xx.
/// - `NonRetryable`: missing or rejected credentials, invalid configuration,
///   malformed upstream payloads, upstream 4xx other than 429.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    ///
    /// `after` optionally specifies the minimum delay before retrying (e.g.
    /// derived from a `Retry-After` response header).
    Retryable {
        /// Minimum back-off before the next attempt. `None` means retry
        /// immediately or apply the caller's own back-off schedule.
        after: Option<Duration>,
    },
    /// The operation must not be retried; the failure is surfaced as-is.
    NonRetryable,
}

// ---------------------------------------------------------------------------
// Routing errors
// ---------------------------------------------------------------------------

/// Errors produced by a routing invocation.
///
/// Infrastructure adapters map their transport-specific failures onto these
/// variants; callers never see `reqwest` (or any other transport) error types.
/// Payloads are plain strings so the error remains serialisable into host
/// audit records.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum RoutingError {
    /// The routing endpoint could not be reached or the call timed out.
    ///
    /// Produced by: connection failures, DNS failures, request timeouts.
    #[error("Routing endpoint unreachable: {reason}")]
    Communication {
        /// Transport-level description of the failure.
        reason: String,
        /// `true` when the failure was a timeout rather than a refused or
        /// dropped connection.
        timed_out: bool,
    },

    /// Credentials were missing, empty, or rejected by the service.
    ///
    /// When credentials are missing locally this error is produced before
    /// any network traffic is issued.
    #[error("Routing authentication failed: {reason}")]
    Authentication {
        /// Why authentication failed.
        reason: String,
    },

    /// The service answered with a non-success status.
    ///
    /// Carries the upstream status and message so the caller can log or
    /// escalate with full context.
    #[error("Routing service error (status {status}): {message}")]
    Service {
        /// Upstream HTTP status code.
        status: u16,
        /// Upstream error message, or the raw body when no structured
        /// message was present.
        message: String,
        /// Minimum back-off requested by the service (`Retry-After`), when
        /// present on a rate-limit response.
        retry_after: Option<Duration>,
    },

    /// The service answered successfully but the payload was unusable:
    /// unparseable, or naming a selected model outside the candidate set.
    #[error("Invalid routing response: {reason}")]
    InvalidResponse {
        /// What made the payload unusable.
        reason: String,
    },

    /// The adapter configuration is invalid (e.g. unparseable base URL).
    ///
    /// Produced at construction time; an invocation never starts with an
    /// invalid configuration.
    #[error("Routing configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },
}

impl RoutingError {
    /// Classifies this error for retry purposes. See [`RetryPolicy`].
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::Communication { .. } => RetryPolicy::Retryable { after: None },
            Self::Service {
                status,
                retry_after,
                ..
            } => {
                if *status == 429 {
                    RetryPolicy::Retryable {
                        after: *retry_after,
                    }
                } else if *status >= 500 {
                    RetryPolicy::Retryable { after: None }
                } else {
                    RetryPolicy::NonRetryable
                }
            }
            Self::Authentication { .. }
            | Self::InvalidResponse { .. }
            | Self::Configuration { .. } => RetryPolicy::NonRetryable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_are_retryable() {
        let err = RoutingError::Communication {
            reason: "request timed out".to_string(),
            timed_out: true,
        };
        assert_eq!(err.retry_policy(), RetryPolicy::Retryable { after: None });
    }

    #[test]
    fn rate_limits_honour_retry_after() {
        let err = RoutingError::Service {
            status: 429,
            message: "rate limited".to_string(),
            retry_after: Some(Duration::from_secs(30)),
        };
        assert_eq!(
            err.retry_policy(),
            RetryPolicy::Retryable {
                after: Some(Duration::from_secs(30))
            }
        );
    }

    #[test]
    fn upstream_5xx_is_retryable_without_delay() {
        let err = RoutingError::Service {
            status: 503,
            message: "unavailable".to_string(),
            retry_after: None,
        };
        assert_eq!(err.retry_policy(), RetryPolicy::Retryable { after: None });
    }

    #[test]
    fn client_faults_are_non_retryable() {
        let bad_request = RoutingError::Service {
            status: 400,
            message: "unknown candidate".to_string(),
            retry_after: None,
        };
        let auth = RoutingError::Authentication {
            reason: "API key rejected".to_string(),
        };
        let config = RoutingError::Configuration {
            message: "invalid base URL".to_string(),
        };
        assert_eq!(bad_request.retry_policy(), RetryPolicy::NonRetryable);
        assert_eq!(auth.retry_policy(), RetryPolicy::NonRetryable);
        assert_eq!(config.retry_policy(), RetryPolicy::NonRetryable);
    }
}
