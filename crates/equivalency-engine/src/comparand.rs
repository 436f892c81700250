//! The subject/expectation pair compared at one recursion step

use equivalency_core::Value;

/// Subject and expectation at one position, plus the statically known type
#[derive(Debug, Clone, Copy)]
pub struct Comparand<'v> {
    /// Value under test
    pub subject: &'v Value,

    /// Reference value
    pub expectation: &'v Value,

    /// Type used to select per-type options (the expectation's type, or the
    /// subject's when the expectation is null)
    pub compile_time_type: &'v str,
}

impl<'v> Comparand<'v> {
    /// Create a comparand
    pub fn new(subject: &'v Value, expectation: &'v Value, compile_time_type: &'v str) -> Self {
        Self {
            subject,
            expectation,
            compile_time_type,
        }
    }
}
