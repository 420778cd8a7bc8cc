//! Opaque identifier newtypes for events and their correlations.
//!
//! All three ids are value types: compared for equality, ordered, hashed,
//! and displayed — never parsed. The engine makes no assumption about what
//! a producer puts inside them (UUIDs, counters, composite keys all work).

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! opaque_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

opaque_id! {
    /// Unique id of a single event record.
    EventId
}

opaque_id! {
    /// Id stamped on every action produced by one LLM response. All actions
    /// sharing an `LlmResponseId` form an atomic batch.
    LlmResponseId
}

opaque_id! {
    /// Id correlating one action to the observation carrying its result.
    ToolCallId
}

impl EventId {
    /// Derive a new id from this one with a suffix.
    ///
    /// Used for synthetic events (the condensation summary message) so that
    /// replaying the same log always produces the same id.
    pub fn derived(&self, suffix: &str) -> EventId {
        EventId(format!("{}/{suffix}", self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_compare_by_value() {
        assert_eq!(EventId::new("e1"), EventId::from("e1"));
        assert_ne!(ToolCallId::new("t1"), ToolCallId::new("t2"));
    }

    #[test]
    fn ids_hash_as_values() {
        let mut set = HashSet::new();
        set.insert(LlmResponseId::new("r1"));
        set.insert(LlmResponseId::new("r1"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn derived_ids_are_stable() {
        let base = EventId::new("cond-3");
        assert_eq!(base.derived("summary"), base.derived("summary"));
        assert_ne!(base.derived("summary"), base);
    }

    #[test]
    fn serde_is_transparent() {
        let id = EventId::new("e42");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"e42\"");
        let back: EventId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
