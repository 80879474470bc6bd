//! Newtype domain identifiers.
//!
//! Every routing concept that has an identity is represented as a distinct
//! newtype wrapping a primitive. This prevents accidentally interchanging —
//! for example — a [`ModelId`] with an [`AssetKey`] even though both are
//! `String` under the hood.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers — String-backed
// ---------------------------------------------------------------------------

string_id! {
    /// Identifies an LLM by its provider-qualified model name
    /// (e.g. `"gpt-4o"`, `"claude-sonnet-4"`).
    ///
    /// Appears both as a routing candidate and as the selected model in a
    /// routing decision. The routing service defines the namespace; this
    /// crate treats the value as opaque.
    ModelId
}

string_id! {
    /// A routing preference tag passed alongside the candidate set
    /// (e.g. `"cost"`, `"latency"`, `"quality"`).
    ///
    /// Interpreted by the routing service; opaque to this crate.
    RoutingGoal
}

string_id! {
    /// Identifies one routing decision on the service side.
    ///
    /// Assigned by the routing service and echoed back so a decision can be
    /// referenced in later feedback calls or support requests.
    SessionId
}

string_id! {
    /// Identifies a host pipeline asset whose materialization carries
    /// attached metadata.
    ///
    /// Owned by the host orchestration platform; this crate only matches it
    /// against the outputs declared on an execution context.
    AssetKey
}

string_id! {
    /// The host-side output name metadata is recorded against.
    ///
    /// Resolved from the execution context when a router is bound to it.
    OutputName
}

// ---------------------------------------------------------------------------
// Identifiers — UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single adapter invocation (one routing call).
///
/// Minted once by whoever initiates the call and passed down the route path;
/// transport events and the emitted metadata record all carry the same id,
/// so every trace of one invocation can be joined on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvocationId(Uuid);

impl InvocationId {
    /// Generates a new random invocation identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an [`InvocationId`] from an existing UUID (e.g. deserialised
    /// from a recorded metadata entry).
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for InvocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_identifiers_reject_empty_values() {
        assert!(ModelId::new("").is_none());
        assert!(RoutingGoal::new(String::new()).is_none());
        assert!(AssetKey::new("").is_none());
    }

    #[test]
    fn model_ids_are_distinct_by_value() {
        let a = ModelId::new("gpt-4o").unwrap();
        let b = ModelId::new("gpt-4o-mini").unwrap();
        assert_ne!(a, b);
        assert_eq!(a.as_str(), "gpt-4o");
    }

    #[test]
    fn invocation_ids_are_unique() {
        assert_ne!(InvocationId::new_random(), InvocationId::new_random());
    }
}
