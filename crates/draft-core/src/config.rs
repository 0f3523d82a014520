//! Engine configuration

use serde::{Deserialize, Serialize};

/// Settings that influence feature creation and derivation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Unit appended to dimension text when ShowUnits is set
    pub unit_suffix: String,
    /// Initial FormatSpec of new dimensions
    pub default_format_spec: String,
    /// Absolute tolerance (degrees) for the full-circle test
    pub full_circle_tolerance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            unit_suffix: String::from("mm"),
            default_format_spec: String::from("%.2f"),
            full_circle_tolerance: 1e-6,
        }
    }
}

impl EngineConfig {
    /// Set the unit suffix
    pub fn with_unit_suffix(mut self, unit: impl Into<String>) -> Self {
        self.unit_suffix = unit.into();
        self
    }

    /// Set the default dimension format
    pub fn with_format_spec(mut self, spec: impl Into<String>) -> Self {
        self.default_format_spec = spec.into();
        self
    }
}
