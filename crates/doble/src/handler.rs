//! Registered message handlers: stubs and expectations.

use crate::matcher::ArgMatcher;
use serde_json::Value;
use std::fmt;
use std::rc::Rc;

/// A canned response: either a fixed value or a callable producing a value
/// from the call arguments.
#[derive(Clone)]
pub(crate) enum Response {
    /// Return this value on every matched call
    Fixed(Value),
    /// Compute the value from the arguments on every matched call
    Answer(Rc<dyn Fn(&[Value]) -> Value>),
}

impl Response {
    /// Evaluate the response for the given arguments
    pub(crate) fn evaluate(&self, args: &[Value]) -> Value {
        match self {
            Self::Fixed(value) => value.clone(),
            Self::Answer(answer) => answer(args),
        }
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            Self::Answer(_) => f.write_str("Answer(..)"),
        }
    }
}

/// What kind of handler an entry is, and for expectations, its call-count
/// contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HandlerKind {
    /// Canned response with no call-count obligation
    Stub,
    /// Required call with verification. Satisfied once `observed >= required`;
    /// there is no transition back out of satisfied.
    Expectation {
        /// Minimum number of matched calls required (defaults to 1)
        required: usize,
        /// Matched calls observed so far
        observed: usize,
    },
}

impl HandlerKind {
    /// Whether this entry passes verification
    pub(crate) fn is_satisfied(&self) -> bool {
        match self {
            Self::Stub => true,
            Self::Expectation { required, observed } => observed >= required,
        }
    }
}

/// One registered handler for a message name.
///
/// Entries live in a single list on the double, in registration order;
/// that order is the matching order within a message name and the walk
/// order for verification across message names.
#[derive(Debug)]
pub(crate) struct HandlerEntry {
    /// The message name this entry answers
    pub(crate) message: String,
    /// Argument constraint; `Any` when none was given
    pub(crate) matcher: ArgMatcher,
    /// Configured response; `None` until `returns`/`answers` is called
    pub(crate) response: Option<Response>,
    pub(crate) kind: HandlerKind,
}

impl HandlerEntry {
    pub(crate) fn stub(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            matcher: ArgMatcher::Any,
            response: None,
            kind: HandlerKind::Stub,
        }
    }

    pub(crate) fn expectation(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            matcher: ArgMatcher::Any,
            response: None,
            kind: HandlerKind::Expectation {
                required: 1,
                observed: 0,
            },
        }
    }

    /// Whether this entry applies to an incoming call
    pub(crate) fn matches(&self, message: &str, args: &[Value]) -> bool {
        self.message == message && self.matcher.matches(args)
    }
}
