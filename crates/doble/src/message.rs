//! Message records for the double call log.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message name of the integer-coercion protocol.
///
/// String-formatting code obtains an integer form of an arbitrary object by
/// sending this message. A null-object double answers it with the fixed
/// value `0` instead of returning itself, so a coercion protocol that
/// re-applies itself to the result terminates after one step.
pub const TO_INT: &str = "to_int";

/// A record of a single message received by a double.
///
/// Appended to the call log on every dispatch, including dispatches that
/// end in an unknown-message failure. Immutable once logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// The message name
    pub name: String,
    /// The arguments, in call order
    pub args: Vec<Value>,
}

impl MessageRecord {
    /// Create a record for a message with arguments
    #[must_use]
    pub fn new(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Create a record for a message sent without arguments
    #[must_use]
    pub fn no_args(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }
}
