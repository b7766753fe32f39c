//! Dashboard configuration.
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration:
//!
//! ```toml
//! data_file = "data/hr_data.csv"
//! join_mode = "left"
//!
//! [fill]
//! numeric = 0.0
//! categorical = "Unknown"
//!
//! [targets]
//! min_promotion_pct = 10.0
//! max_retrenchment_pct = 5.0
//!
//! [logging]
//! level = "info"
//! json = false
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::logging::LogConfig;
use crate::processor::{ProcessorError, column::integral_to_i64};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Dataset the summary runner loads
    pub data_file: PathBuf,
    pub fill: FillDefaults,
    pub join_mode: JoinMode,
    pub targets: KpiTargets,
    pub logging: LogConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("data/hr_data.csv"),
            fill: FillDefaults::default(),
            join_mode: JoinMode::default(),
            targets: KpiTargets::default(),
            logging: LogConfig::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ProcessorError> {
        let config: Self =
            toml::from_str(text).map_err(|e| ProcessorError::Config(e.to_string()))?;
        config.fill.integer()?;
        Ok(config)
    }

    /// Reads a TOML file. A relative `data_file` is resolved against the
    /// directory holding the config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ProcessorError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ProcessorError::Config(format!("{}: {}", path.display(), e)))?;
        let mut config = Self::from_toml_str(&text)?;
        if config.data_file.is_relative() {
            if let Some(dir) = path.parent() {
                config.data_file = dir.join(&config.data_file);
            }
        }
        Ok(config)
    }
}

/// Values that replace missing source cells, by column type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FillDefaults {
    pub numeric: f64,
    pub categorical: String,
}

impl Default for FillDefaults {
    fn default() -> Self {
        Self {
            numeric: 0.0,
            categorical: "Unknown".to_string(),
        }
    }
}

impl FillDefaults {
    /// The numeric default as used in integer columns.
    ///
    /// Every table has integer columns, so the numeric default must be a
    /// whole number in the `i64` range.
    pub fn integer(&self) -> Result<i64, ProcessorError> {
        integral_to_i64(self.numeric).ok_or_else(|| {
            ProcessorError::Config(format!(
                "fill.numeric must be a whole number, got {}",
                self.numeric
            ))
        })
    }
}

/// How per-department means are combined with overtime counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinMode {
    /// Every department is kept; no overtime rows means a count of 0
    #[default]
    Left,
    /// Departments without overtime rows are dropped
    Inner,
}

/// Dashboard targets the overall rates are checked against
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KpiTargets {
    pub min_promotion_pct: f64,
    pub max_retrenchment_pct: f64,
}

impl Default for KpiTargets {
    fn default() -> Self {
        Self {
            min_promotion_pct: 10.0,
            max_retrenchment_pct: 5.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = DashboardConfig::from_toml_str("").unwrap();
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = DashboardConfig::from_toml_str(
            r#"
            join_mode = "inner"

            [fill]
            categorical = "0"

            [targets]
            min_promotion_pct = 12.5
            "#,
        )
        .unwrap();
        assert_eq!(config.join_mode, JoinMode::Inner);
        assert_eq!(config.fill.categorical, "0");
        assert_eq!(config.fill.numeric, 0.0);
        assert_eq!(config.targets.min_promotion_pct, 12.5);
        assert_eq!(config.targets.max_retrenchment_pct, 5.0);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = DashboardConfig::from_toml_str("colour = \"red\"").unwrap_err();
        assert!(matches!(err, ProcessorError::Config(_)));
    }

    #[test]
    fn test_numeric_fill_must_be_whole() {
        for bad in ["nan", "inf", "1.5", "1e30"] {
            let err = DashboardConfig::from_toml_str(&format!("[fill]\nnumeric = {bad}\n"))
                .unwrap_err();
            assert!(matches!(err, ProcessorError::Config(_)), "{bad}");
        }
        let config = DashboardConfig::from_toml_str("[fill]\nnumeric = -1.0\n").unwrap();
        assert_eq!(config.fill.integer().unwrap(), -1);
    }

    #[test]
    fn test_relative_data_file_resolves_next_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.toml");
        std::fs::write(&path, "data_file = \"hr.csv\"\n").unwrap();

        let config = DashboardConfig::from_file(&path).unwrap();
        assert_eq!(config.data_file, dir.path().join("hr.csv"));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = DashboardConfig::from_file("/nonexistent/dashboard.toml").unwrap_err();
        assert!(matches!(err, ProcessorError::Config(_)));
    }
}
