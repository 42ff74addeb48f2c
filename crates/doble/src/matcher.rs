//! Argument matchers for stubs and expectations.

use serde_json::Value;
use std::fmt;
use std::rc::Rc;

/// Predicate over an argument list, deciding whether a registered handler
/// applies to an incoming call.
#[derive(Clone, Default)]
pub enum ArgMatcher {
    /// Matches any arguments (the default when no matcher is given)
    #[default]
    Any,
    /// Matches exactly these arguments, compared by value
    Eq(Vec<Value>),
    /// Matches when the predicate returns true
    Where(Rc<dyn Fn(&[Value]) -> bool>),
}

impl ArgMatcher {
    /// Matcher for an exact argument list
    #[must_use]
    pub fn eq(args: impl IntoIterator<Item = Value>) -> Self {
        Self::Eq(args.into_iter().collect())
    }

    /// Matcher backed by an arbitrary predicate
    #[must_use]
    pub fn matching(predicate: impl Fn(&[Value]) -> bool + 'static) -> Self {
        Self::Where(Rc::new(predicate))
    }

    /// Check whether the matcher accepts the given arguments
    #[must_use]
    pub fn matches(&self, args: &[Value]) -> bool {
        match self {
            Self::Any => true,
            Self::Eq(expected) => expected.as_slice() == args,
            Self::Where(predicate) => predicate(args),
        }
    }

    /// Get a human-readable description of the matcher
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Any => "any arguments".to_string(),
            Self::Eq(expected) => format!("args == {expected:?}"),
            Self::Where(_) => "args matching predicate".to_string(),
        }
    }
}

impl fmt::Debug for ArgMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}
