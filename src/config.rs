//! Pipeline configuration
//!
//! Defaults match the dashboard: first sheet, 5..=50 results (10 shown by
//! default), 20% held-out test rows with seed 42 for regression.
//!
//! ```rust
//! use statboard::config::PipelineConfig;
//!
//! # fn main() -> statboard::Result<()> {
//! let config = PipelineConfig::builder()
//!     .sheet("players")
//!     .limits(5, 20, 10)
//!     .build()?;
//! assert_eq!(config.limits.max, 20);
//! # Ok(())
//! # }
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Inclusive bounds for the result-count selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitBounds {
    /// Smallest allowed limit
    pub min: usize,
    /// Largest allowed limit
    pub max: usize,
    /// Limit used when the request does not name one
    pub default: usize,
}

impl Default for LimitBounds {
    fn default() -> Self {
        Self {
            min: 5,
            max: 50,
            default: 10,
        }
    }
}

impl LimitBounds {
    /// Whether `limit` lies within the bounds
    #[must_use]
    pub const fn contains(&self, limit: usize) -> bool {
        limit >= self.min && limit <= self.max
    }

    /// Reject a result count outside the bounds
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRequest` naming the allowed range
    pub fn check(&self, limit: usize) -> Result<()> {
        if self.contains(limit) {
            Ok(())
        } else {
            Err(Error::InvalidRequest(format!(
                "limit {limit} outside allowed range {}..={}",
                self.min, self.max
            )))
        }
    }

    fn validate(&self) -> Result<()> {
        if self.min == 0 {
            return Err(Error::Config("limit minimum must be at least 1".to_string()));
        }
        if !(self.min <= self.default && self.default <= self.max) {
            return Err(Error::Config(format!(
                "limit bounds must satisfy min <= default <= max (got {} <= {} <= {})",
                self.min, self.default, self.max
            )));
        }
        Ok(())
    }
}

/// Train/test split settings for the regression sub-operation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionConfig {
    /// Share of rows held out for scoring
    pub test_fraction: f64,
    /// Shuffle seed
    pub seed: u64,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

/// Full pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Worksheet holding player rows (`None` reads the first sheet)
    pub sheet: Option<String>,
    /// Result-count bounds
    pub limits: LimitBounds,
    /// Regression split settings
    pub regression: RegressionConfig,
}

impl PipelineConfig {
    /// Create a new configuration builder
    #[must_use]
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Read a JSON configuration file
    ///
    /// Missing keys fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, is not valid JSON, or
    /// holds inconsistent values
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| Error::Config(format!("invalid JSON in {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency
    ///
    /// # Errors
    ///
    /// Returns error if limit bounds are inverted or the test fraction is
    /// outside (0, 1)
    pub fn validate(&self) -> Result<()> {
        self.limits.validate()?;
        let fraction = self.regression.test_fraction;
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(Error::Config(format!(
                "regression test_fraction must be in (0, 1), got {fraction}"
            )));
        }
        Ok(())
    }
}

/// Configuration builder
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Read rows from a named worksheet
    #[must_use]
    pub fn sheet(mut self, sheet: impl Into<String>) -> Self {
        self.config.sheet = Some(sheet.into());
        self
    }

    /// Set result-count bounds
    #[must_use]
    pub const fn limits(mut self, min: usize, max: usize, default: usize) -> Self {
        self.config.limits = LimitBounds { min, max, default };
        self
    }

    /// Set regression split settings
    #[must_use]
    pub const fn regression(mut self, test_fraction: f64, seed: u64) -> Self {
        self.config.regression = RegressionConfig {
            test_fraction,
            seed,
        };
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns error if the values are inconsistent
    pub fn build(self) -> Result<PipelineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
