//! Configuration schema (equivalency.toml)
//!
//! The `[defaults]` table describes the options every comparison starts
//! from. It is loaded once and passed down; each comparison clones it before
//! applying its own overrides.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::member::MemberSelector;
use crate::options::{EquivalencyOptions, OptionsError, RowMatchMode};

/// Default comparison options
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DefaultOptions {
    /// Tolerate differing runtime types
    #[serde(default)]
    pub allow_mismatched_types: bool,

    /// Skip columns present on only one side
    #[serde(default)]
    pub ignore_unmatched_columns: bool,

    /// Row pairing mode
    #[serde(default)]
    pub row_match_mode: RowMatchMode,

    /// Skip original values of rows modified on both sides
    #[serde(default)]
    pub exclude_original_data: bool,

    /// Tables excluded by name
    #[serde(default)]
    pub exclude_tables: Vec<String>,

    /// Columns excluded by name in every table
    #[serde(default)]
    pub exclude_columns: Vec<String>,

    /// Root-relative member paths to exclude (e.g. `Customer.Name`)
    #[serde(default)]
    pub exclude_members: Vec<String>,

    /// Columns excluded per table
    #[serde(default)]
    pub exclude_columns_by_table: BTreeMap<String, Vec<String>>,
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    /// Options every comparison starts from
    #[serde(default)]
    pub defaults: DefaultOptions,
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        // Reject bad selectors at load time rather than at comparison time
        for expression in &config.defaults.exclude_members {
            MemberSelector::parse(expression)?;
        }

        Ok(config)
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Build the default options described by this config
    pub fn options(&self) -> Result<EquivalencyOptions, ConfigError> {
        let defaults = &self.defaults;
        let mut options = EquivalencyOptions::new();

        if defaults.allow_mismatched_types {
            options.allowing_mismatched_types();
        }
        if defaults.ignore_unmatched_columns {
            options.ignoring_unmatched_columns();
        }
        if defaults.exclude_original_data {
            options.excluding_original_data();
        }

        options
            .using_row_match_mode(defaults.row_match_mode)
            .excluding_tables(defaults.exclude_tables.iter().cloned())
            .excluding_columns_in_all_tables(defaults.exclude_columns.iter().cloned());

        for (table, columns) in &defaults.exclude_columns_by_table {
            options.excluding_columns(table.clone(), columns.iter().cloned());
        }

        for expression in &defaults.exclude_members {
            options.excluding(expression)?;
        }

        Ok(options)
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid option: {0}")]
    InvalidOption(#[from] OptionsError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.defaults.row_match_mode, RowMatchMode::Index);

        let options = config.options().unwrap();
        assert!(!options.allow_mismatched_types());
        assert!(options.excluded_tables().is_empty());
    }

    #[test]
    fn parse_full_defaults() {
        let config = Config::from_toml(
            r#"
            [defaults]
            allow_mismatched_types = true
            ignore_unmatched_columns = true
            row_match_mode = "primary_key"
            exclude_original_data = true
            exclude_tables = ["Audit"]
            exclude_columns = ["ModifiedAt"]
            exclude_members = ["Customer.Name"]

            [defaults.exclude_columns_by_table]
            Orders = ["Total"]
            "#,
        )
        .unwrap();

        let options = config.options().unwrap();
        assert!(options.allow_mismatched_types());
        assert!(options.ignore_unmatched_columns());
        assert!(options.exclude_original_data());
        assert_eq!(options.row_match_mode(), RowMatchMode::PrimaryKey);
        assert!(options.is_table_excluded("Audit"));
        assert!(options.is_column_excluded("Invoices", "ModifiedAt"));
        assert!(options.is_column_excluded("Orders", "Total"));
        assert!(!options.is_column_excluded("Invoices", "Total"));
    }

    #[test]
    fn invalid_member_selector_is_rejected_on_load() {
        let result = Config::from_toml(
            r#"
            [defaults]
            exclude_members = ["Items[0]"]
            "#,
        );
        assert!(matches!(result, Err(ConfigError::InvalidOption(_))));
    }

    #[test]
    fn unknown_row_match_mode_is_a_parse_error() {
        let result = Config::from_toml("[defaults]\nrow_match_mode = \"by_name\"\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn config_toml_roundtrip() {
        let mut config = Config::default();
        config.defaults.exclude_tables.push("C".to_string());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("equivalency.toml");

        config.save_to_file(&path).unwrap();
        let parsed = Config::from_file(&path).unwrap();
        assert_eq!(config, parsed);
    }
}
