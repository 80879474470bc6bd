//! Port trait definitions.
//!
//! The routing domain talks to two external collaborators, both represented
//! here as traits so infrastructure can be swapped (and stubbed in tests)
//! without touching domain rules:
//!
//! - [`ModelRouter`] — the external prompt-routing service. Implemented by
//!   the `client` crate over HTTPS.
//! - [`AssetContext`] — the host orchestration platform's asset-execution
//!   context, including its metadata sink. Implemented by whatever embeds
//!   this integration; the `resource` crate ships an in-memory version for
//!   tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    InvocationId, MetadataRecord, OutputName, RoutingDecision, RoutingError, RoutingRequest,
};

// ---------------------------------------------------------------------------

/// The external prompt-routing service.
///
/// ## Contract
///
/// - Stateless per call: one request yields at most one decision, and
///   sequential calls share no state.
/// - A returned decision's selected model is always a member of the
///   request's candidate set; implementations reject anything else as
///   [`RoutingError::InvalidResponse`] rather than hand it to the caller.
/// - No retry is performed inside an implementation; failures surface to
///   the caller carrying their [`crate::RetryPolicy`] classification.
/// - The caller mints the [`InvocationId`] and implementations tag every
///   span and event they emit with it, so transport logs join against
///   whatever else the caller records under the same id.
#[async_trait]
pub trait ModelRouter: Send + Sync {
    /// Asks the service to select a model for `request`, correlating all
    /// emitted telemetry under `invocation`.
    async fn route(
        &self,
        invocation: InvocationId,
        request: &RoutingRequest,
    ) -> Result<RoutingDecision, RoutingError>;
}

// ---------------------------------------------------------------------------

/// A metadata write against the host execution context failed.
///
/// Consumers treat this as best-effort: the `resource` crate logs the
/// failure and never lets it fail the routing call that produced the record.
#[derive(Debug, Error, Serialize, Deserialize)]
#[error("Metadata write failed: {reason}")]
pub struct MetadataError {
    /// Host-side description of the failure.
    pub reason: String,
}

/// The host platform's asset-execution context.
///
/// Owned and implemented by the host. This crate only needs two things from
/// it: which outputs the current execution declares, and a sink to record a
/// write-once [`MetadataRecord`] against one of them (or against the
/// execution itself for op-style invocations with no declared outputs).
pub trait AssetContext: Send + Sync {
    /// The output names declared by the current execution, in declaration
    /// order. Empty for op-style executions that materialize nothing.
    fn output_names(&self) -> Vec<OutputName>;

    /// Records `record` against `output`, or against the bare execution
    /// when `output` is `None`.
    fn record_metadata(
        &self,
        output: Option<&OutputName>,
        record: MetadataRecord,
    ) -> Result<(), MetadataError>;
}
