//! Shared value types for the routing domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! meaningful values with invariants (e.g. prompts and candidate sets are
//! non-empty, token counts are non-negative integers) and participate in
//! domain computations.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ModelId, RoutingGoal, SessionId};

// ---------------------------------------------------------------------------
// Token and latency types
// ---------------------------------------------------------------------------

/// Number of tokens consumed in an LLM routing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenCount(u64);

impl TokenCount {
    /// Creates a [`TokenCount`] from a raw integer.
    pub fn new(count: u64) -> Self {
        Self(count)
    }

    /// Creates a [`TokenCount`] of exactly zero.
    pub fn zero() -> Self {
        Self(0)
    }

    /// Returns the underlying integer value.
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns `true` if this count is zero.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for TokenCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Add for TokenCount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for TokenCount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

// ---------------------------------------------------------------------------

/// Wall-clock duration of one routing call, measured caller-side around the
/// network round-trip.
///
/// Millisecond granularity is sufficient for usage metadata; sub-millisecond
/// precision is preserved internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Latency(Duration);

impl Latency {
    /// Creates a [`Latency`] from a [`Duration`].
    pub fn new(elapsed: Duration) -> Self {
        Self(elapsed)
    }

    /// Creates a [`Latency`] from whole milliseconds.
    pub fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    /// Returns the latency in whole milliseconds (truncating).
    pub fn as_millis(self) -> u64 {
        self.0.as_millis() as u64
    }

    /// Returns the underlying [`Duration`].
    pub fn as_duration(self) -> Duration {
        self.0
    }
}

impl std::fmt::Display for Latency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ms", self.as_millis())
    }
}

// ---------------------------------------------------------------------------

/// Token and latency counters for one routing call.
///
/// Token counts come from the routing service; latency is measured by the
/// adapter around the round-trip. All fields are recorded into the usage
/// metadata emitted against the host execution context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageMetrics {
    /// Tokens in the routed prompt.
    pub prompt_tokens: TokenCount,
    /// Tokens in the completion, when the service reports one.
    pub completion_tokens: TokenCount,
    /// Total tokens for the call.
    pub total_tokens: TokenCount,
    /// Round-trip duration of the routing call.
    pub latency: Latency,
}

impl UsageMetrics {
    /// Creates [`UsageMetrics`] from service-reported counters.
    ///
    /// `total_tokens` is derived as `prompt + completion` when the service
    /// omits it.
    pub fn new(
        prompt_tokens: TokenCount,
        completion_tokens: TokenCount,
        total_tokens: Option<TokenCount>,
        latency: Latency,
    ) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: total_tokens.unwrap_or(prompt_tokens + completion_tokens),
            latency,
        }
    }

    /// Zeroed counters with only the measured latency, used when the service
    /// reports no usage block.
    pub fn latency_only(latency: Latency) -> Self {
        Self {
            prompt_tokens: TokenCount::zero(),
            completion_tokens: TokenCount::zero(),
            total_tokens: TokenCount::zero(),
            latency,
        }
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly; the underlying representation can change without affecting the
/// domain API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

// ---------------------------------------------------------------------------
// Routing request / decision
// ---------------------------------------------------------------------------

/// One routing invocation: a prompt, the candidate models the caller is
/// willing to use, and optional preference tags.
///
/// Immutable once constructed. The candidate set preserves caller order and
/// collapses duplicates on first occurrence, so "first candidate" remains a
/// meaningful fallback notion for the service.
///
/// Deserialization funnels through [`RoutingRequest::new`], so a request
/// read from stored data carries the same invariants as one built in code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RoutingRequestRepr")]
pub struct RoutingRequest {
    prompt: String,
    candidates: Vec<ModelId>,
    goals: Vec<RoutingGoal>,
}

/// Unvalidated mirror of [`RoutingRequest`] used as the deserialization
/// entry point.
#[derive(Deserialize)]
struct RoutingRequestRepr {
    prompt: String,
    candidates: Vec<ModelId>,
    #[serde(default)]
    goals: Vec<RoutingGoal>,
}

impl TryFrom<RoutingRequestRepr> for RoutingRequest {
    type Error = String;

    fn try_from(repr: RoutingRequestRepr) -> Result<Self, Self::Error> {
        RoutingRequest::new(repr.prompt, repr.candidates)
            .map(|request| request.with_goals(repr.goals))
            .ok_or_else(|| {
                "routing request needs a non-empty prompt and at least one candidate".to_string()
            })
    }
}

impl RoutingRequest {
    /// Creates a [`RoutingRequest`], returning `None` if the prompt is empty
    /// or no candidates remain after deduplication.
    #[must_use]
    pub fn new(prompt: impl Into<String>, candidates: Vec<ModelId>) -> Option<Self> {
        let prompt = prompt.into();
        if prompt.is_empty() {
            return None;
        }
        let mut deduped: Vec<ModelId> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !deduped.contains(&candidate) {
                deduped.push(candidate);
            }
        }
        if deduped.is_empty() {
            return None;
        }
        Some(Self {
            prompt,
            candidates: deduped,
            goals: Vec::new(),
        })
    }

    /// Attaches routing preference tags, replacing any previously set.
    pub fn with_goals(mut self, goals: Vec<RoutingGoal>) -> Self {
        self.goals = goals;
        self
    }

    /// Returns the prompt text.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Returns the candidate models, in caller order, without duplicates.
    pub fn candidates(&self) -> &[ModelId] {
        &self.candidates
    }

    /// Returns the routing preference tags (possibly empty).
    pub fn goals(&self) -> &[RoutingGoal] {
        &self.goals
    }

    /// Returns `true` if `model` is a member of the candidate set.
    pub fn contains_candidate(&self, model: &ModelId) -> bool {
        self.candidates.contains(model)
    }
}

// ---------------------------------------------------------------------------

/// The routing service's answer to one [`RoutingRequest`].
///
/// Created by the service, consumed once by the caller. The adapter enforces
/// that `selected` is a member of the originating request's candidate set
/// before handing the decision back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    /// The model the service selected for this prompt.
    pub selected: ModelId,

    /// Service-assigned identifier for this decision, when provided.
    pub session: Option<SessionId>,

    /// Opaque explanation/score fields attached by the service.
    ///
    /// Keys and value shapes are service-defined; this crate carries them
    /// through untouched.
    pub annotations: BTreeMap<String, serde_json::Value>,

    /// Token and latency counters for the call.
    pub usage: UsageMetrics,
}

// ---------------------------------------------------------------------------
// Metadata record
// ---------------------------------------------------------------------------

/// A single value in a [`MetadataRecord`].
///
/// The host metadata systems this integration targets accept scalar entries;
/// structured values are flattened to text by the producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataValue {
    /// A signed integer counter (token counts, call counts).
    Integer(i64),
    /// A floating-point measurement.
    Float(f64),
    /// Free-form text (model names, identifiers).
    Text(String),
}

impl From<i64> for MetadataValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for MetadataValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for MetadataValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for MetadataValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

// ---------------------------------------------------------------------------

/// Key/value usage metadata attached to one host asset execution.
///
/// Write-once: entries are fixed at construction and the record is handed to
/// the host's execution context as a unit. The host owns the record after it
/// is written; this crate never reads it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    entries: BTreeMap<String, MetadataValue>,
    recorded_at: Timestamp,
}

impl MetadataRecord {
    /// Creates a record from a set of entries, stamped with the current time.
    pub fn new(entries: BTreeMap<String, MetadataValue>) -> Self {
        Self {
            entries,
            recorded_at: Timestamp::now(),
        }
    }

    /// Returns the entry for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.entries.get(key)
    }

    /// Returns all entries in key order.
    pub fn entries(&self) -> &BTreeMap<String, MetadataValue> {
        &self.entries
    }

    /// Returns when the record was produced.
    pub fn recorded_at(&self) -> Timestamp {
        self.recorded_at
    }
}
