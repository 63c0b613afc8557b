// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Gradient-check configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! step = 1e-4
//! tolerance = 1e-4
//! relative = false
//! ```

use std::path::Path;

use crate::GradCheckError;

/// Tolerances and step size for comparing analytic and numerical gradients.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GradCheckConfig {
    /// Central-difference perturbation `h`.
    #[serde(default = "default_step")]
    pub step: f64,
    /// Largest allowed per-element difference.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Compare `|a - n| / max(1, |a|, |n|)` instead of `|a - n|`.
    #[serde(default)]
    pub relative: bool,
}

fn default_step() -> f64 {
    tensor_core::NUMERICAL_STEP
}

fn default_tolerance() -> f64 {
    1e-4
}

impl GradCheckConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, GradCheckError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GradCheckError::ConfigError(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, GradCheckError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| GradCheckError::ConfigError(format!("TOML parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, GradCheckError> {
        toml::to_string_pretty(self)
            .map_err(|e| GradCheckError::ConfigError(format!("TOML serialise error: {e}")))
    }

    /// Rejects non-finite or non-positive `step` and `tolerance`.
    pub fn validate(&self) -> Result<(), GradCheckError> {
        for (name, value) in [("step", self.step), ("tolerance", self.tolerance)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(GradCheckError::ConfigError(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for GradCheckConfig {
    fn default() -> Self {
        Self {
            step: default_step(),
            tolerance: default_tolerance(),
            relative: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let c = GradCheckConfig::default();
        assert_eq!(c.step, 1e-4);
        assert_eq!(c.tolerance, 1e-4);
        assert!(!c.relative);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
step = 1e-5
tolerance = 1e-3
relative = true
"#;
        let c = GradCheckConfig::from_toml(toml).unwrap();
        assert_eq!(c.step, 1e-5);
        assert_eq!(c.tolerance, 1e-3);
        assert!(c.relative);
    }

    #[test]
    fn test_from_toml_fills_defaults() {
        let c = GradCheckConfig::from_toml("relative = true").unwrap();
        assert_eq!(c.step, tensor_core::NUMERICAL_STEP);
        assert_eq!(c.tolerance, 1e-4);
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let c = GradCheckConfig {
            tolerance: 5e-3,
            ..Default::default()
        };
        let back = GradCheckConfig::from_toml(&c.to_toml().unwrap()).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            GradCheckConfig::from_toml("step = 0.0"),
            Err(GradCheckError::ConfigError(_))
        ));
        assert!(GradCheckConfig::from_toml("tolerance = -1.0").is_err());
        assert!(GradCheckConfig::from_toml("step = \"big\"").is_err());
    }

    #[test]
    fn test_from_missing_file() {
        let err =
            GradCheckConfig::from_file(Path::new("/nonexistent/grad-check.toml")).unwrap_err();
        assert!(err.to_string().contains("cannot read config"));
    }
}
