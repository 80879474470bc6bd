//! ModelRoute pipeline-step resource.
//!
//! [`RouterResource`] is the surface a host pipeline step talks to: it holds
//! a shared [`routing::ModelRouter`] and, per execution, binds it to the
//! host's [`routing::AssetContext`]. Every routed call through a
//! [`BoundRouter`] emits exactly one write-once usage-metadata record
//! against the resolved output, whether the call succeeded or the service
//! rejected it.
//!
//! ## Architectural Layer
//!
//! **Orchestration surface.** This crate sequences one routing call and one
//! metadata write; it contains no transport details and no routing rules.
//!
//! ## Output resolution
//!
//! Metadata must land on a single output, so binding resolves one up front:
//!
//! - no declared outputs — op-style execution, metadata is recorded against
//!   the bare execution;
//! - exactly one output — that output;
//! - several outputs — [`RouterResource::bind`] refuses with
//!   [`ResourceError::AmbiguousOutput`]; use
//!   [`RouterResource::bind_for_asset`] to name the asset explicitly.
//!
//! ## Metadata keys
//!
//! `modelroute.calls`, `modelroute.prompt_tokens`,
//! `modelroute.completion_tokens`, `modelroute.total_tokens`,
//! `modelroute.latency_ms`, `modelroute.invocation_id`, and — on success —
//! `modelroute.selected_model`.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use routing::{
    AssetContext, AssetKey, InvocationId, MetadataRecord, MetadataValue, ModelRouter, OutputName,
    RoutingDecision, RoutingError, RoutingRequest,
};

pub mod mocks;

/// Prefix of every metadata key this crate emits.
pub const METADATA_KEY_PREFIX: &str = "modelroute";

/// Metadata key for the number of routing calls in the record (always 1;
/// hosts that aggregate records sum this field).
pub const KEY_CALLS: &str = "modelroute.calls";
/// Metadata key for prompt tokens.
pub const KEY_PROMPT_TOKENS: &str = "modelroute.prompt_tokens";
/// Metadata key for completion tokens.
pub const KEY_COMPLETION_TOKENS: &str = "modelroute.completion_tokens";
/// Metadata key for total tokens.
pub const KEY_TOTAL_TOKENS: &str = "modelroute.total_tokens";
/// Metadata key for the routing call's round-trip latency in milliseconds.
pub const KEY_LATENCY_MS: &str = "modelroute.latency_ms";
/// Metadata key for the selected model (present on success only).
pub const KEY_SELECTED_MODEL: &str = "modelroute.selected_model";
/// Metadata key for the correlation id of the invocation.
pub const KEY_INVOCATION_ID: &str = "modelroute.invocation_id";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors produced while binding a router to an execution context.
///
/// Routing failures are not represented here; [`BoundRouter::route`] surfaces
/// them as [`routing::RoutingError`] unchanged.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The execution declares several outputs and the caller did not name
    /// the asset metadata should be attached to.
    #[error(
        "Execution declares {count} outputs; name the target asset with bind_for_asset"
    )]
    AmbiguousOutput {
        /// How many outputs the execution declares.
        count: usize,
    },

    /// The named asset is not among the execution's declared outputs.
    #[error("Asset '{asset}' is not among this execution's outputs")]
    UnknownAsset {
        /// The asset key that failed to match.
        asset: AssetKey,
    },
}

// ---------------------------------------------------------------------------
// Resource
// ---------------------------------------------------------------------------

/// Credential-holding routing resource, constructed once and shared across
/// pipeline steps.
///
/// Stateless apart from the inner router handle; cloning is cheap.
#[derive(Clone)]
pub struct RouterResource {
    router: Arc<dyn ModelRouter>,
}

impl RouterResource {
    /// Wraps a router implementation (normally a `client::RouterClient`).
    pub fn new(router: Arc<dyn ModelRouter>) -> Self {
        Self { router }
    }

    /// Binds the router to one execution context, resolving the metadata
    /// output automatically. Fails with [`ResourceError::AmbiguousOutput`]
    /// when the execution declares more than one output.
    pub fn bind<'ctx>(
        &self,
        context: &'ctx dyn AssetContext,
    ) -> Result<BoundRouter<'ctx>, ResourceError> {
        let mut outputs = context.output_names();
        let output = match outputs.len() {
            0 => None,
            1 => Some(outputs.remove(0)),
            count => return Err(ResourceError::AmbiguousOutput { count }),
        };
        Ok(BoundRouter {
            router: Arc::clone(&self.router),
            context,
            output,
        })
    }

    /// Binds the router to one execution context, attaching metadata to the
    /// output matching `asset`. Required for multi-output executions.
    pub fn bind_for_asset<'ctx>(
        &self,
        context: &'ctx dyn AssetContext,
        asset: &AssetKey,
    ) -> Result<BoundRouter<'ctx>, ResourceError> {
        let output = context
            .output_names()
            .into_iter()
            .find(|output| output.as_str() == asset.as_str())
            .ok_or_else(|| ResourceError::UnknownAsset {
                asset: asset.clone(),
            })?;
        Ok(BoundRouter {
            router: Arc::clone(&self.router),
            context,
            output: Some(output),
        })
    }
}

// ---------------------------------------------------------------------------

/// A router scoped to one asset-execution context.
///
/// Produced by [`RouterResource::bind`] / [`RouterResource::bind_for_asset`]
/// and used for the duration of one pipeline step.
pub struct BoundRouter<'ctx> {
    router: Arc<dyn ModelRouter>,
    context: &'ctx dyn AssetContext,
    output: Option<OutputName>,
}

impl BoundRouter<'_> {
    /// The output usage metadata is recorded against, when one was resolved.
    pub fn output(&self) -> Option<&OutputName> {
        self.output.as_ref()
    }

    /// Routes `request` and records one usage-metadata record against the
    /// bound output.
    ///
    /// The record is written whether routing succeeded or failed; a failing
    /// metadata write is logged and never fails the routing call. One
    /// [`InvocationId`] is minted here and handed to the router, so the
    /// transport's spans and the `modelroute.invocation_id` metadata entry
    /// join on the same key.
    pub async fn route(&self, request: &RoutingRequest) -> Result<RoutingDecision, RoutingError> {
        let invocation = InvocationId::new_random();
        let result = self.router.route(invocation, request).await;
        let record = usage_record(invocation, &result);
        if let Err(err) = self.context.record_metadata(self.output.as_ref(), record) {
            warn!(
                target: "router_resource",
                %invocation,
                error = %err,
                "usage metadata write failed; routing result unaffected"
            );
        }
        result
    }
}

/// Builds the per-invocation usage record.
///
/// Failed calls still produce a record (the call happened and counts); token
/// counters and the selected model are only known on success.
fn usage_record(
    invocation: InvocationId,
    result: &Result<RoutingDecision, RoutingError>,
) -> MetadataRecord {
    let mut entries = BTreeMap::new();
    entries.insert(KEY_CALLS.to_string(), MetadataValue::Integer(1));
    entries.insert(
        KEY_INVOCATION_ID.to_string(),
        MetadataValue::Text(invocation.to_string()),
    );
    if let Ok(decision) = result {
        entries.insert(
            KEY_PROMPT_TOKENS.to_string(),
            MetadataValue::Integer(decision.usage.prompt_tokens.as_u64() as i64),
        );
        entries.insert(
            KEY_COMPLETION_TOKENS.to_string(),
            MetadataValue::Integer(decision.usage.completion_tokens.as_u64() as i64),
        );
        entries.insert(
            KEY_TOTAL_TOKENS.to_string(),
            MetadataValue::Integer(decision.usage.total_tokens.as_u64() as i64),
        );
        entries.insert(
            KEY_LATENCY_MS.to_string(),
            MetadataValue::Integer(decision.usage.latency.as_millis() as i64),
        );
        entries.insert(
            KEY_SELECTED_MODEL.to_string(),
            MetadataValue::Text(decision.selected.to_string()),
        );
    }
    MetadataRecord::new(entries)
}
