//! The double object: dynamic dispatch, null-object fallback, and the
//! call log.

use crate::error::{DoubleError, DoubleResult};
use crate::handler::{HandlerEntry, HandlerKind, Response};
use crate::matcher::ArgMatcher;
use crate::message::{MessageRecord, TO_INT};
use serde_json::Value;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace, warn};

struct Inner {
    label: String,
    null_object: bool,
    /// All registered handlers, in registration order. Entries carry their
    /// message name; the single list preserves both per-message matching
    /// order and the cross-message order verification walks.
    handlers: Vec<HandlerEntry>,
    /// Every received message, append-only.
    calls: Vec<MessageRecord>,
}

/// A test double standing in for a real collaborator.
///
/// A double accepts arbitrary message names at runtime. Messages resolve
/// against registered [stubs](Double::stub) and
/// [expectations](Double::expect_message) in registration order; unmatched
/// messages fail with [`DoubleError::UnknownMessage`] unless the double was
/// configured [as a null object](Double::as_null_object), in which case it
/// answers with itself.
///
/// The handle is cheap to clone and every clone refers to the same
/// underlying double (single-threaded by design; handles are not `Send`).
///
/// # Example
///
/// ```rust
/// use doble::Double;
/// use serde_json::json;
///
/// let d = Double::new("mailer");
/// d.stub("deliver").returns(json!(true));
///
/// let reply = d.send("deliver", vec![json!("hi")]).unwrap();
/// assert_eq!(reply.into_value(), Some(json!(true)));
/// ```
#[derive(Clone)]
pub struct Double {
    inner: Rc<RefCell<Inner>>,
}

impl Double {
    /// Create a double with a debug label (display-only, non-unique)
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                label: label.into(),
                null_object: false,
                handlers: Vec::new(),
                calls: Vec::new(),
            })),
        }
    }

    /// Get the double's debug label
    #[must_use]
    pub fn label(&self) -> String {
        self.inner.borrow().label.clone()
    }

    /// Configure the double to answer every unrecognized message with
    /// itself instead of failing. Set once; never reset. Returns a handle
    /// to the same double for fluent construction.
    #[must_use]
    pub fn as_null_object(&self) -> Self {
        self.inner.borrow_mut().null_object = true;
        self.clone()
    }

    /// Whether this double is a null object (defaults to false)
    #[must_use]
    pub fn is_null_object(&self) -> bool {
        self.inner.borrow().null_object
    }

    /// Whether two handles refer to the same underlying double
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Register a stub: a canned response for `message` with no call-count
    /// obligation. Returns a handle for fluent configuration
    /// (`.with(..)`, `.returns(..)`, `.answers(..)`).
    ///
    /// Duplicate registrations for the same message are legal and form an
    /// ordered candidate list; the first match in registration order wins.
    pub fn stub(&self, message: &str) -> HandlerRef {
        self.register(HandlerEntry::stub(message))
    }

    /// Register an expectation: a required call for `message`, checked by
    /// [`verify`](Double::verify). Required count defaults to one; adjust
    /// with [`HandlerRef::times`].
    pub fn expect_message(&self, message: &str) -> HandlerRef {
        self.register(HandlerEntry::expectation(message))
    }

    fn register(&self, entry: HandlerEntry) -> HandlerRef {
        let index = {
            let mut inner = self.inner.borrow_mut();
            debug!(
                double = %inner.label,
                msg = %entry.message,
                kind = ?entry.kind,
                "registering handler"
            );
            inner.handlers.push(entry);
            inner.handlers.len() - 1
        };
        HandlerRef {
            double: self.clone(),
            index,
        }
    }

    /// Whether the double answers `message`.
    ///
    /// Always true for null objects. Otherwise true iff at least one stub
    /// or expectation is registered for `message`, regardless of argument
    /// matching, and true immediately after registration.
    #[must_use]
    pub fn responds_to(&self, message: &str) -> bool {
        let inner = self.inner.borrow();
        inner.null_object || inner.handlers.iter().any(|entry| entry.message == message)
    }

    /// Dispatch a message to the double.
    ///
    /// The call is logged unconditionally, then resolved against the
    /// registered handlers in registration order. An unmatched message
    /// falls back to the null-object behavior when configured, or fails
    /// with [`DoubleError::UnknownMessage`].
    pub fn send(&self, message: &str, args: Vec<Value>) -> DoubleResult<Reply> {
        let resolved = self.resolve(message, &args);
        match resolved {
            Some((Some(response), _)) => Ok(Reply::value(self, response.evaluate(&args))),
            Some((None, matched_expectation)) => {
                // A declared-but-unconfigured expectation on a null object
                // answers with the double itself, keeping chains alive.
                if matched_expectation && self.is_null_object() {
                    Ok(Reply::itself(self))
                } else {
                    Ok(Reply::value(self, Value::Null))
                }
            }
            None => self.unmatched(message),
        }
    }

    /// Dispatch a message with no arguments
    pub fn send_no_args(&self, message: &str) -> DoubleResult<Reply> {
        self.send(message, Vec::new())
    }

    /// Log the call and find the first matching handler, bumping the
    /// observed count when it is an expectation. Returns the handler's
    /// response (cloned out so it can be evaluated without holding the
    /// borrow) and whether an expectation matched.
    fn resolve(&self, message: &str, args: &[Value]) -> Option<(Option<Response>, bool)> {
        let mut inner = self.inner.borrow_mut();
        inner
            .calls
            .push(MessageRecord::new(message, args.to_vec()));

        for entry in &mut inner.handlers {
            if !entry.matches(message, args) {
                continue;
            }
            match &mut entry.kind {
                HandlerKind::Expectation { required, observed } => {
                    *observed += 1;
                    trace!(
                        msg = message,
                        observed = *observed,
                        required = *required,
                        "expectation matched"
                    );
                    return Some((entry.response.clone(), true));
                }
                HandlerKind::Stub => {
                    trace!(msg = message, "stub matched");
                    return Some((entry.response.clone(), false));
                }
            }
        }
        None
    }

    fn unmatched(&self, message: &str) -> DoubleResult<Reply> {
        if self.is_null_object() {
            if message == TO_INT {
                // Terminal: the coercion protocol re-applies itself to the
                // result, so answering with the double would never converge.
                trace!(msg = message, "null object answering integer coercion");
                Ok(Reply::value(self, Value::from(0)))
            } else {
                trace!(msg = message, "null object answering with itself");
                Ok(Reply::itself(self))
            }
        } else {
            let label = self.label();
            warn!(double = %label, msg = message, "unknown message");
            Err(DoubleError::UnknownMessage {
                double: label,
                message: message.to_string(),
            })
        }
    }

    /// Verify that every expectation on this double was satisfied.
    ///
    /// Walks expectations in registration order and fails fast on the
    /// first unmet one. Reads counters only; idempotent.
    pub fn verify(&self) -> DoubleResult<()> {
        let inner = self.inner.borrow();
        for entry in &inner.handlers {
            if let HandlerKind::Expectation { required, observed } = entry.kind {
                if observed < required {
                    debug!(
                        double = %inner.label,
                        msg = %entry.message,
                        required,
                        observed,
                        "verification failed"
                    );
                    return Err(DoubleError::VerificationFailed {
                        double: inner.label.clone(),
                        message: entry.message.clone(),
                        required,
                        observed,
                    });
                }
            }
        }
        debug!(double = %inner.label, "verification passed");
        Ok(())
    }

    /// Snapshot of the call log, in receive order
    #[must_use]
    pub fn calls(&self) -> Vec<MessageRecord> {
        self.inner.borrow().calls.clone()
    }

    /// How many times `message` was received (matched or not)
    #[must_use]
    pub fn call_count(&self, message: &str) -> usize {
        self.inner
            .borrow()
            .calls
            .iter()
            .filter(|record| record.name == message)
            .count()
    }

    /// Whether `message` was received at least once
    #[must_use]
    pub fn was_called(&self, message: &str) -> bool {
        self.call_count(message) > 0
    }

    /// Whether `message` was received with exactly these arguments
    #[must_use]
    pub fn was_called_with(&self, message: &str, args: &[Value]) -> bool {
        self.inner
            .borrow()
            .calls
            .iter()
            .any(|record| record.name == message && record.args == args)
    }

    /// The most recent received message, if any
    #[must_use]
    pub fn last_call(&self) -> Option<MessageRecord> {
        self.inner.borrow().calls.last().cloned()
    }
}

impl fmt::Debug for Double {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Double")
            .field("label", &inner.label)
            .field("null_object", &inner.null_object)
            .field("handlers", &inner.handlers.len())
            .field("calls", &inner.calls.len())
            .finish()
    }
}

/// Fluent configuration handle for a just-registered stub or expectation.
///
/// Registration happens immediately on [`Double::stub`] /
/// [`Double::expect_message`]; this handle mutates the registered entry in
/// place, so it can simply be dropped once configured.
#[derive(Debug)]
pub struct HandlerRef {
    double: Double,
    index: usize,
}

impl HandlerRef {
    /// Constrain the handler to calls whose arguments satisfy `matcher`
    pub fn with(self, matcher: ArgMatcher) -> Self {
        self.double.inner.borrow_mut().handlers[self.index].matcher = matcher;
        self
    }

    /// Constrain the handler to exactly these arguments
    pub fn with_args(self, args: impl IntoIterator<Item = Value>) -> Self {
        self.with(ArgMatcher::eq(args))
    }

    /// Respond with a fixed value on every matched call
    pub fn returns(self, value: impl Into<Value>) -> Self {
        self.double.inner.borrow_mut().handlers[self.index].response =
            Some(Response::Fixed(value.into()));
        self
    }

    /// Respond with a value computed from the call arguments
    pub fn answers(self, answer: impl Fn(&[Value]) -> Value + 'static) -> Self {
        self.double.inner.borrow_mut().handlers[self.index].response =
            Some(Response::Answer(Rc::new(answer)));
        self
    }

    /// Require the expectation to be matched at least `required` times.
    /// Has no effect on stubs.
    pub fn times(self, required: usize) -> Self {
        if let HandlerKind::Expectation {
            required: entry_required,
            ..
        } = &mut self.double.inner.borrow_mut().handlers[self.index].kind
        {
            *entry_required = required;
        }
        self
    }
}

/// The dynamically typed result of a dispatch: either a concrete value or
/// the double itself (the null-object fallback).
#[derive(Debug, Clone)]
pub struct Reply {
    origin: Double,
    kind: ReplyKind,
}

#[derive(Debug, Clone)]
enum ReplyKind {
    Value(Value),
    Itself,
}

impl Reply {
    fn value(origin: &Double, value: Value) -> Self {
        Self {
            origin: origin.clone(),
            kind: ReplyKind::Value(value),
        }
    }

    fn itself(origin: &Double) -> Self {
        Self {
            origin: origin.clone(),
            kind: ReplyKind::Itself,
        }
    }

    /// The concrete value, if the reply is one
    #[must_use]
    pub fn as_value(&self) -> Option<&Value> {
        match &self.kind {
            ReplyKind::Value(value) => Some(value),
            ReplyKind::Itself => None,
        }
    }

    /// Consume the reply into its concrete value, if it is one
    #[must_use]
    pub fn into_value(self) -> Option<Value> {
        match self.kind {
            ReplyKind::Value(value) => Some(value),
            ReplyKind::Itself => None,
        }
    }

    /// The replying double, when the reply is the double itself
    #[must_use]
    pub fn as_double(&self) -> Option<Double> {
        match self.kind {
            ReplyKind::Itself => Some(self.origin.clone()),
            ReplyKind::Value(_) => None,
        }
    }

    /// Whether the reply is this exact double (pointer identity)
    #[must_use]
    pub fn is_double(&self, double: &Double) -> bool {
        matches!(self.kind, ReplyKind::Itself) && self.origin.ptr_eq(double)
    }

    /// Chain a dispatch through the reply: `d.send("foo")?.send("bar")?`.
    ///
    /// Works when the reply is a double (the null-object fallback or a
    /// self-answering expectation); a plain value does not understand the
    /// double protocol and fails with
    /// [`DoubleError::UnknownMessage`] against the originating double's
    /// label.
    pub fn send(&self, message: &str, args: Vec<Value>) -> DoubleResult<Reply> {
        match self.kind {
            ReplyKind::Itself => self.origin.send(message, args),
            ReplyKind::Value(_) => Err(DoubleError::UnknownMessage {
                double: self.origin.label(),
                message: message.to_string(),
            }),
        }
    }

    /// Chain a dispatch with no arguments
    pub fn send_no_args(&self, message: &str) -> DoubleResult<Reply> {
        self.send(message, Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let d = Double::new("anything");
        assert_eq!(d.label(), "anything");
        assert!(!d.is_null_object());
        assert!(d.calls().is_empty());
    }

    #[test]
    fn test_as_null_object_is_fluent_and_shares_identity() {
        let d = Double::new("anything");
        let same = d.as_null_object();
        assert!(d.is_null_object());
        assert!(same.ptr_eq(&d));
    }

    #[test]
    fn test_responds_to_after_registration_without_dispatch() {
        let d = Double::new("repo");
        assert!(!d.responds_to("find"));

        d.stub("find");
        assert!(d.responds_to("find"));

        d.expect_message("delete");
        assert!(d.responds_to("delete"));
    }

    #[test]
    fn test_responds_to_ignores_argument_matchers() {
        let d = Double::new("repo");
        d.stub("find").with_args([json!(1)]);
        assert!(d.responds_to("find"));
    }

    #[test]
    fn test_stub_answers_compute_from_arguments() {
        let d = Double::new("adder");
        d.stub("add").answers(|args| {
            let sum: i64 = args.iter().filter_map(Value::as_i64).sum();
            json!(sum)
        });

        let reply = d.send("add", vec![json!(2), json!(3)]).unwrap();
        assert_eq!(reply.into_value(), Some(json!(5)));
    }

    #[test]
    fn test_stub_without_response_returns_null() {
        let d = Double::new("quiet");
        d.stub("noop");
        let reply = d.send_no_args("noop").unwrap();
        assert_eq!(reply.into_value(), Some(Value::Null));
    }

    #[test]
    fn test_first_matching_entry_wins() {
        let d = Double::new("ordered");
        d.stub("get").returns(json!("generic"));
        d.stub("get").with_args([json!(1)]).returns(json!("specific"));

        // The generic entry registered first shadows the specific one.
        let reply = d.send("get", vec![json!(1)]).unwrap();
        assert_eq!(reply.into_value(), Some(json!("generic")));
    }

    #[test]
    fn test_later_entry_consulted_when_earlier_does_not_match() {
        let d = Double::new("ordered");
        d.stub("get").with_args([json!(1)]).returns(json!("one"));
        d.stub("get").returns(json!("fallback"));

        assert_eq!(
            d.send("get", vec![json!(1)]).unwrap().into_value(),
            Some(json!("one"))
        );
        assert_eq!(
            d.send("get", vec![json!(2)]).unwrap().into_value(),
            Some(json!("fallback"))
        );
    }

    #[test]
    fn test_unknown_message_still_logged() {
        let d = Double::new("strict");
        assert!(d.send("missing", vec![json!(1)]).is_err());
        assert!(d.was_called_with("missing", &[json!(1)]));
        assert_eq!(d.last_call().unwrap().name, "missing");
    }

    #[test]
    fn test_call_log_queries() {
        let d = Double::new("log").as_null_object();
        d.send("ping", vec![]).unwrap();
        d.send("ping", vec![json!(1)]).unwrap();
        d.send("pong", vec![]).unwrap();

        assert_eq!(d.call_count("ping"), 2);
        assert!(d.was_called("pong"));
        assert!(!d.was_called("quit"));
        assert!(d.was_called_with("ping", &[json!(1)]));
        assert!(!d.was_called_with("ping", &[json!(2)]));

        let calls = d.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].name, "ping");
        assert_eq!(calls[2].name, "pong");
    }

    #[test]
    fn test_reply_value_accessors() {
        let d = Double::new("values");
        d.stub("answer").returns(json!(42));

        let reply = d.send_no_args("answer").unwrap();
        assert_eq!(reply.as_value(), Some(&json!(42)));
        assert!(reply.as_double().is_none());
        assert!(!reply.is_double(&d));
    }

    #[test]
    fn test_chaining_through_value_reply_fails() {
        let d = Double::new("values");
        d.stub("answer").returns(json!(42));

        let reply = d.send_no_args("answer").unwrap();
        let err = reply.send_no_args("more").unwrap_err();
        assert!(matches!(
            err,
            DoubleError::UnknownMessage { double, message }
                if double == "values" && message == "more"
        ));
    }

    #[test]
    fn test_debug_output_names_label() {
        let d = Double::new("printable");
        let text = format!("{d:?}");
        assert!(text.contains("Double"));
        assert!(text.contains("printable"));
    }
}
