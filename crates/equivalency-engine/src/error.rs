//! Engine error types

use equivalency_core::{Mismatch, OptionsError};
use thiserror::Error;

/// Errors returned by the assertion entry points
#[derive(Debug, Error)]
pub enum EquivalencyError {
    /// The comparison found mismatches
    #[error("{} mismatch(es) found:\n{}", .mismatches.len(), render(.mismatches))]
    NotEquivalent { mismatches: Vec<Mismatch> },

    /// The options could not be configured
    #[error(transparent)]
    Options(#[from] OptionsError),
}

impl EquivalencyError {
    /// Mismatches carried by a failed assertion
    pub fn mismatches(&self) -> &[Mismatch] {
        match self {
            Self::NotEquivalent { mismatches } => mismatches,
            Self::Options(_) => &[],
        }
    }
}

fn render(mismatches: &[Mismatch]) -> String {
    mismatches
        .iter()
        .map(|m| format!("  - {}", m))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use equivalency_core::MismatchCode;

    #[test]
    fn not_equivalent_lists_every_mismatch() {
        let err = EquivalencyError::NotEquivalent {
            mismatches: vec![
                Mismatch::new(MismatchCode::ValueMismatch, "Rows[1].Total").with_comparison(250, 200),
                Mismatch::new(MismatchCode::MissingElement, "Tables[C]"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "2 mismatch(es) found:\n  - Rows[1].Total: VALUE_MISMATCH (expected 250, found 200)\n  - Tables[C]: MISSING_ELEMENT"
        );
        assert_eq!(err.mismatches().len(), 2);
    }
}
