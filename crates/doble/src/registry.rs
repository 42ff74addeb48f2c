//! Per-test registry of doubles for teardown verification.

use crate::double::Double;
use crate::error::DoubleResult;
use tracing::debug;

/// Tracks every double created during a test so the runner can verify
/// them all at teardown.
///
/// The runner is expected to call [`verify_all`](DoubleRegistry::verify_all)
/// at the end of each test and surface the error as a test failure, then
/// [`reset`](DoubleRegistry::reset) before the next test.
///
/// # Example
///
/// ```rust
/// use doble::DoubleRegistry;
///
/// let mut registry = DoubleRegistry::new();
/// let d = registry.double("mailer");
/// d.expect_message("deliver");
///
/// d.send_no_args("deliver").unwrap();
/// registry.verify_all().unwrap();
/// registry.reset();
/// ```
#[derive(Debug, Default)]
pub struct DoubleRegistry {
    doubles: Vec<Double>,
}

impl DoubleRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a double and track it
    pub fn double(&mut self, label: impl Into<String>) -> Double {
        let double = Double::new(label);
        self.track(double.clone());
        double
    }

    /// Adopt an externally created double
    pub fn track(&mut self, double: Double) {
        debug!(double = %double.label(), "tracking double");
        self.doubles.push(double);
    }

    /// Verify every tracked double, in creation order, failing fast on the
    /// first unmet expectation. Idempotent; mutates nothing.
    pub fn verify_all(&self) -> DoubleResult<()> {
        for double in &self.doubles {
            double.verify()?;
        }
        Ok(())
    }

    /// Drop all tracked doubles (fresh state for the next test)
    pub fn reset(&mut self) {
        self.doubles.clear();
    }

    /// Number of tracked doubles
    #[must_use]
    pub fn len(&self) -> usize {
        self.doubles.len()
    }

    /// Whether the registry tracks no doubles
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.doubles.is_empty()
    }
}
