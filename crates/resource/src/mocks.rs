//! In-memory test doubles for the host context and the routing service.
//!
//! Public (not `cfg(test)`) so downstream crates and integration tests can
//! exercise resource behaviour without a host platform or network.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use routing::{
    AssetContext, InvocationId, Latency, MetadataError, MetadataRecord, ModelRouter, OutputName,
    RoutingDecision, RoutingError, RoutingRequest, TokenCount, UsageMetrics,
};

// ---------------------------------------------------------------------------

/// An [`AssetContext`] that stores records in memory.
pub struct InMemoryAssetContext {
    outputs: Vec<OutputName>,
    records: Mutex<Vec<(Option<OutputName>, MetadataRecord)>>,
    fail_writes: bool,
}

impl InMemoryAssetContext {
    /// A context declaring the given outputs.
    pub fn with_outputs(names: &[&str]) -> Self {
        Self {
            outputs: names
                .iter()
                .map(|n| OutputName::new(*n).expect("output names in tests are non-empty"))
                .collect(),
            records: Mutex::new(Vec::new()),
            fail_writes: false,
        }
    }

    /// An op-style context declaring no outputs.
    pub fn op_style() -> Self {
        Self::with_outputs(&[])
    }

    /// Makes every metadata write fail, for best-effort-emission tests.
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Snapshot of everything recorded so far.
    pub fn records(&self) -> Vec<(Option<OutputName>, MetadataRecord)> {
        self.records.lock().expect("records lock poisoned").clone()
    }
}

impl AssetContext for InMemoryAssetContext {
    fn output_names(&self) -> Vec<OutputName> {
        self.outputs.clone()
    }

    fn record_metadata(
        &self,
        output: Option<&OutputName>,
        record: MetadataRecord,
    ) -> Result<(), MetadataError> {
        if self.fail_writes {
            return Err(MetadataError {
                reason: "metadata sink unavailable".to_string(),
            });
        }
        self.records
            .lock()
            .expect("records lock poisoned")
            .push((output.cloned(), record));
        Ok(())
    }
}

// ---------------------------------------------------------------------------

/// A [`ModelRouter`] that always selects the request's first candidate with
/// fixed usage counters, remembering the invocation ids it was handed.
pub struct StaticRouter {
    /// Prompt tokens reported on every decision.
    pub prompt_tokens: u64,
    /// Completion tokens reported on every decision.
    pub completion_tokens: u64,
    /// Latency reported on every decision, in milliseconds.
    pub latency_ms: u64,
    seen_invocations: Mutex<Vec<InvocationId>>,
}

impl Default for StaticRouter {
    fn default() -> Self {
        Self {
            prompt_tokens: 12,
            completion_tokens: 30,
            latency_ms: 85,
            seen_invocations: Mutex::new(Vec::new()),
        }
    }
}

impl StaticRouter {
    /// The invocation ids received so far, in call order.
    pub fn seen_invocations(&self) -> Vec<InvocationId> {
        self.seen_invocations
            .lock()
            .expect("invocation lock poisoned")
            .clone()
    }
}

#[async_trait]
impl ModelRouter for StaticRouter {
    async fn route(
        &self,
        invocation: InvocationId,
        request: &RoutingRequest,
    ) -> Result<RoutingDecision, RoutingError> {
        self.seen_invocations
            .lock()
            .expect("invocation lock poisoned")
            .push(invocation);
        let selected = request.candidates()[0].clone();
        Ok(RoutingDecision {
            selected,
            session: None,
            annotations: BTreeMap::new(),
            usage: UsageMetrics::new(
                TokenCount::new(self.prompt_tokens),
                TokenCount::new(self.completion_tokens),
                None,
                Latency::from_millis(self.latency_ms),
            ),
        })
    }
}

// ---------------------------------------------------------------------------

/// The failure a [`FailingRouter`] produces on every call.
#[derive(Debug, Clone)]
pub enum Failure {
    /// Upstream non-success response.
    Service {
        /// Upstream HTTP status code.
        status: u16,
    },
    /// Endpoint unreachable.
    Communication,
    /// Credentials missing or rejected.
    Authentication,
}

/// A [`ModelRouter`] that fails every call the same way.
pub struct FailingRouter {
    /// The failure to produce.
    pub failure: Failure,
}

impl FailingRouter {
    /// A router failing with an upstream service error.
    pub fn service(status: u16) -> Self {
        Self {
            failure: Failure::Service { status },
        }
    }

    /// A router failing as if the endpoint were unreachable.
    pub fn communication() -> Self {
        Self {
            failure: Failure::Communication,
        }
    }

    /// A router failing as if credentials were rejected.
    pub fn authentication() -> Self {
        Self {
            failure: Failure::Authentication,
        }
    }
}

#[async_trait]
impl ModelRouter for FailingRouter {
    async fn route(
        &self,
        _invocation: InvocationId,
        _request: &RoutingRequest,
    ) -> Result<RoutingDecision, RoutingError> {
        Err(match &self.failure {
            Failure::Service { status } => RoutingError::Service {
                status: *status,
                message: "scripted failure".to_string(),
                retry_after: None,
            },
            Failure::Communication => RoutingError::Communication {
                reason: "scripted connection failure".to_string(),
                timed_out: false,
            },
            Failure::Authentication => RoutingError::Authentication {
                reason: "scripted credential rejection".to_string(),
            },
        })
    }
}
