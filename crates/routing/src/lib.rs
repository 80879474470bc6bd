//! Core routing domain for the ModelRoute integration.
//!
//! This crate contains every domain concept, newtype identifier, shared value
//! type, cross-cutting error type, and port trait used by the integration.
//! Infrastructure crates implement the traits defined here; they never add
//! domain rules.
//!
//! ## Architectural Layer
//!
//! **Domain + port definitions.** This crate has no I/O dependencies. It
//! defines *what* a routing invocation needs; the `client` and `resource`
//! crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype domain identifiers (`ModelId`, `AssetKey`, etc.) |
//! | [`types`] | Shared value types (`RoutingRequest`, `UsageMetrics`, `MetadataRecord`, etc.) |
//! | [`errors`] | Error and retry-policy types |
//! | [`ports`] | Traits for the routing service and the host execution context |

pub mod errors;
pub mod identifiers;
pub mod ports;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{RetryPolicy, RoutingError};
pub use identifiers::{AssetKey, InvocationId, ModelId, OutputName, RoutingGoal, SessionId};
pub use ports::{AssetContext, MetadataError, ModelRouter};
pub use types::{
    Latency, MetadataRecord, MetadataValue, RoutingDecision, RoutingRequest, Timestamp,
    TokenCount, UsageMetrics,
};
