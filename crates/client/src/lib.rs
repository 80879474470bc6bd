//! ModelRoute HTTP infrastructure adapter.
//!
//! Implements the [`routing::ModelRouter`] trait against the routing
//! service's model-select endpoint. Additional transports would be added as
//! new implementations in this crate without any changes to the `routing`
//! crate.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** All HTTP transport, request formatting, response
//! parsing, credential handling, and status-code mapping live here. The
//! `routing` crate sees only [`routing::ModelRouter`]; callers never see a
//! `reqwest` type.
//!
//! ## Behaviour
//!
//! - Missing credentials fail with [`routing::RoutingError::Authentication`]
//!   before any traffic is issued.
//! - Each call is one synchronous round-trip: no retries, no backoff, no
//!   shared state between calls. Errors carry a
//!   [`routing::RetryPolicy`] classification for the host to act on.
//! - A decision naming a model outside the request's candidate set is
//!   rejected at the wire boundary as
//!   [`routing::RoutingError::InvalidResponse`].

pub mod config;
mod router;
mod wire;

pub use config::{ApiKey, RouterConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use router::RouterClient;
