//! Mismatch facts produced by a comparison
//!
//! IMPORTANT: Mismatch codes are versioned and stable. They double as
//! message-template keys for whatever formats the final failure text.
//! NEVER rename or remove codes - add new ones only.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Mismatch code registry (v1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MismatchCode {
    /// Leaf values differ
    ValueMismatch,

    /// Subject is null where the expectation is not
    UnexpectedNull,

    /// Expectation is null where the subject is not
    ExpectedNull,

    /// Runtime types differ
    TypeMismatch,

    /// Collections differ in length
    CountMismatch,

    /// Element present in the expectation only
    MissingElement,

    /// Element present in the subject only
    UnexpectedElement,

    /// Member present in the expectation only
    MissingMember,

    /// Object reference does not resolve inside its graph
    DanglingReference,

    /// Primary-key configuration does not allow key-based row matching
    PrimaryKeyMismatch,

    /// Row with no partner on the other side
    UnmatchedRow,
}

impl MismatchCode {
    /// Get the mismatch code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValueMismatch => "VALUE_MISMATCH",
            Self::UnexpectedNull => "UNEXPECTED_NULL",
            Self::ExpectedNull => "EXPECTED_NULL",
            Self::TypeMismatch => "TYPE_MISMATCH",
            Self::CountMismatch => "COUNT_MISMATCH",
            Self::MissingElement => "MISSING_ELEMENT",
            Self::UnexpectedElement => "UNEXPECTED_ELEMENT",
            Self::MissingMember => "MISSING_MEMBER",
            Self::DanglingReference => "DANGLING_REFERENCE",
            Self::PrimaryKeyMismatch => "PRIMARY_KEY_MISMATCH",
            Self::UnmatchedRow => "UNMATCHED_ROW",
        }
    }
}

impl fmt::Display for MismatchCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One structural difference, addressed by its path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mismatch {
    /// Stable mismatch code
    pub code: MismatchCode,

    /// Path from the root (e.g. `Tables[Orders].Rows[1].Total`), or the
    /// root description when the root itself differs
    pub path: String,

    /// Expected value, rendered
    pub expected: Option<String>,

    /// Actual value, rendered
    pub actual: Option<String>,
}

impl Mismatch {
    /// Create a mismatch with no values attached
    pub fn new(code: MismatchCode, path: impl Into<String>) -> Self {
        Self {
            code,
            path: path.into(),
            expected: None,
            actual: None,
        }
    }

    /// Set expected/actual values
    pub fn with_comparison(mut self, expected: impl fmt::Display, actual: impl fmt::Display) -> Self {
        self.expected = Some(expected.to_string());
        self.actual = Some(actual.to_string());
        self
    }

    /// Set only the expected value
    pub fn with_expected(mut self, expected: impl fmt::Display) -> Self {
        self.expected = Some(expected.to_string());
        self
    }

    /// Set only the actual value
    pub fn with_actual(mut self, actual: impl fmt::Display) -> Self {
        self.actual = Some(actual.to_string());
        self
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.code)?;
        match (&self.expected, &self.actual) {
            (Some(expected), Some(actual)) => write!(f, " (expected {}, found {})", expected, actual),
            (Some(expected), None) => write!(f, " (expected {})", expected),
            (None, Some(actual)) => write!(f, " (found {})", actual),
            (None, None) => Ok(()),
        }
    }
}

/// Receiver of mismatches as a comparison discovers them
pub trait MismatchSink {
    /// Record one mismatch
    fn report(&mut self, mismatch: Mismatch);
}

impl MismatchSink for Vec<Mismatch> {
    fn report(&mut self, mismatch: Mismatch) {
        self.push(mismatch);
    }
}
