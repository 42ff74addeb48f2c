//! Result and error types for Doble.

use thiserror::Error;

/// Result type for Doble operations
pub type DoubleResult<T> = Result<T, DoubleError>;

/// Errors that can occur when dispatching to or verifying a double
#[derive(Debug, Error)]
pub enum DoubleError {
    /// A plain (non-null-object) double received a message with no
    /// matching handler. Fatal to the current test step.
    #[error("Double '{double}' received unknown message '{message}'")]
    UnknownMessage {
        /// Label of the double that rejected the message
        double: String,
        /// The message name that had no matching handler
        message: String,
    },

    /// Verification found an expectation that was never satisfied.
    #[error(
        "Double '{double}' expected '{message}' to be received at least \
         {required} time(s) but it was received {observed} time(s)"
    )]
    VerificationFailed {
        /// Label of the double carrying the expectation
        double: String,
        /// The expected message name
        message: String,
        /// Required call count
        required: usize,
        /// Observed call count at verification time
        observed: usize,
    },
}
