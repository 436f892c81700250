//! Entry point: configure options, then compare or assert
//!
//! ```
//! use equivalency_core::{ColumnType, DataColumn, DataTable, EquivalencyOptions, ObjectGraph};
//! use equivalency_engine::Equivalency;
//!
//! let table = |total: i64| {
//!     DataTable::new("Orders")
//!         .with_column(DataColumn::new("Total", ColumnType::Int))
//!         .with_row(vec![total])
//! };
//!
//! let comparison = Equivalency::new(&EquivalencyOptions::default())
//!     .configure(|options| {
//!         options.excluding_column_in_all_tables("Total");
//!     })
//!     .compare(&ObjectGraph::from(table(200)), &ObjectGraph::from(table(250)));
//! assert!(comparison.is_equivalent());
//! ```

use crate::error::EquivalencyError;
use crate::validator::EquivalencyValidator;
use equivalency_core::{
    EquivalencyOptions, EquivalencyReport, Mismatch, MismatchSink, ObjectGraph, OptionsError, Value,
};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

type Describe = Arc<dyn Fn() -> String + Send + Sync>;

/// A configured comparison
///
/// Each instance owns a copy of the defaults it was created from, so
/// per-call configuration never leaks into other comparisons.
#[derive(Clone)]
pub struct Equivalency {
    options: EquivalencyOptions,
    describe_subject: Option<Describe>,
}

/// Outcome of one comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    /// Every mismatch, in discovery order
    pub mismatches: Vec<Mismatch>,

    /// Number of positions compared
    pub nodes_visited: usize,
}

impl Comparison {
    /// Whether no mismatch was found
    pub fn is_equivalent(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// Turn into an error when any mismatch was found
    pub fn into_result(self) -> Result<(), EquivalencyError> {
        if self.is_equivalent() {
            Ok(())
        } else {
            Err(EquivalencyError::NotEquivalent {
                mismatches: self.mismatches,
            })
        }
    }

    /// Turn into a serializable report
    pub fn into_report(self) -> EquivalencyReport {
        EquivalencyReport::from_mismatches(self.mismatches, self.nodes_visited)
    }
}

impl Equivalency {
    /// Start from a copy of the given defaults
    pub fn new(defaults: &EquivalencyOptions) -> Self {
        Self {
            options: defaults.clone(),
            describe_subject: None,
        }
    }

    /// Adjust the options for this comparison
    pub fn configure<F>(mut self, configure: F) -> Self
    where
        F: FnOnce(&mut EquivalencyOptions),
    {
        configure(&mut self.options);
        self
    }

    /// Adjust the options with steps that can fail, such as member expressions
    pub fn try_configure<F>(mut self, configure: F) -> Result<Self, OptionsError>
    where
        F: FnOnce(&mut EquivalencyOptions) -> Result<(), OptionsError>,
    {
        configure(&mut self.options)?;
        Ok(self)
    }

    /// Name the subject in mismatches found at the root
    ///
    /// Evaluated only if such a mismatch is reported. Defaults to `subject`.
    pub fn with_subject_description<F>(mut self, describe: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.describe_subject = Some(Arc::new(describe));
        self
    }

    /// Options in effect
    pub fn options(&self) -> &EquivalencyOptions {
        &self.options
    }

    /// Compare two graphs and collect every mismatch
    pub fn compare(&self, subject: &ObjectGraph, expectation: &ObjectGraph) -> Comparison {
        let mut mismatches = Vec::new();
        let nodes_visited = self.compare_into(subject, expectation, &mut mismatches);
        Comparison {
            mismatches,
            nodes_visited,
        }
    }

    /// Compare two standalone values that reference no objects
    pub fn compare_values(&self, subject: &Value, expectation: &Value) -> Comparison {
        let (subject_graph, expectation_graph) = (ObjectGraph::default(), ObjectGraph::default());
        let mut mismatches = Vec::new();
        let nodes_visited = {
            let mut validator =
                EquivalencyValidator::new(&self.options, &subject_graph, &expectation_graph, &mut mismatches);
            validator.validate(subject, expectation, &|| self.describe());
            validator.nodes_visited()
        };
        Comparison {
            mismatches,
            nodes_visited,
        }
    }

    /// Compare two graphs, streaming mismatches into a sink
    ///
    /// Returns the number of positions compared.
    pub fn compare_into(&self, subject: &ObjectGraph, expectation: &ObjectGraph, sink: &mut dyn MismatchSink) -> usize {
        tracing::debug!(
            row_match_mode = %self.options.row_match_mode(),
            allow_mismatched_types = self.options.allow_mismatched_types(),
            "starting equivalency comparison"
        );

        let mut validator = EquivalencyValidator::new(&self.options, subject, expectation, sink);
        validator.validate_graphs(&|| self.describe());
        let nodes_visited = validator.nodes_visited();

        tracing::debug!(nodes_visited, "equivalency comparison finished");
        nodes_visited
    }

    /// Compare two graphs and fail with every mismatch if they differ
    pub fn assert_equivalent(&self, subject: &ObjectGraph, expectation: &ObjectGraph) -> Result<(), EquivalencyError> {
        let comparison = self.compare(subject, expectation);
        if !comparison.is_equivalent() {
            tracing::debug!(mismatches = comparison.mismatches.len(), "subject is not equivalent");
        }
        comparison.into_result()
    }

    fn describe(&self) -> String {
        self.describe_subject
            .as_ref()
            .map_or_else(|| "subject".to_string(), |describe| describe())
    }
}

impl fmt::Debug for Equivalency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Equivalency")
            .field("options", &self.options)
            .field("describe_subject", &self.describe_subject.is_some())
            .finish()
    }
}
