//! Doble: Test-Double Engine
//!
//! Doble (Spanish: "double", as in a stunt double) is the core object
//! model of a test-double engine: doubles that accept arbitrary message
//! names at runtime, canned responses (stubs), required calls with
//! teardown verification (expectations), and null objects that answer
//! every message with themselves.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      DOBLE Architecture                       │
//! ├──────────────────────────────────────────────────────────────┤
//! │   ┌───────────┐     ┌────────────┐     ┌─────────────────┐   │
//! │   │ Test code │     │   Double   │     │  Verification   │   │
//! │   │ stub /    │────►│  dispatch  │────►│  (teardown:     │   │
//! │   │ expect    │     │ + call log │     │  verify_all)    │   │
//! │   └───────────┘     └────────────┘     └─────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Messages resolve against registered handlers in strict registration
//! order; the first matching entry wins. An unmatched message fails with
//! [`DoubleError::UnknownMessage`] on a plain double, while a null object
//! answers with itself — except the integer-coercion query [`TO_INT`],
//! which answers `0` so formatting code terminates.
//!
//! # Example
//!
//! ```rust
//! use doble::Double;
//! use serde_json::json;
//!
//! let d = Double::new("order-repo").as_null_object();
//! d.stub("find").with_args([json!(7)]).returns(json!({"id": 7}));
//! d.expect_message("save");
//!
//! assert_eq!(
//!     d.send("find", vec![json!(7)]).unwrap().into_value(),
//!     Some(json!({"id": 7})),
//! );
//! // Unmatched messages chain through the null object.
//! d.send_no_args("audit").unwrap().send_no_args("save").unwrap();
//!
//! d.verify().unwrap();
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod double;
mod error;
mod handler;
mod matcher;
mod message;
mod registry;

pub use double::{Double, HandlerRef, Reply};
pub use error::{DoubleError, DoubleResult};
pub use matcher::ArgMatcher;
pub use message::{MessageRecord, TO_INT};
pub use registry::DoubleRegistry;
