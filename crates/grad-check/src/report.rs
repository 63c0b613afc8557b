// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Gradient-check results.
//!
//! [`GradientReport`] collects one [`ParamCheck`] per parameter tensor and
//! renders them as a one-line summary or as JSON.

use tensor_core::Shape;

use crate::GradCheckError;

/// Comparison of one parameter's analytic and numerical gradients.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ParamCheck {
    /// Parameter name, e.g. `"W1"`.
    pub name: String,
    /// Shape of the parameter tensor.
    pub shape: Shape,
    /// Largest per-element difference (relative if so configured).
    pub max_abs_diff: f64,
    /// Mean per-element difference.
    pub mean_abs_diff: f64,
    /// Whether `max_abs_diff` is within tolerance.
    pub passed: bool,
}

/// Aggregate result over every checked parameter.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct GradientReport {
    /// Per-parameter results in check order.
    pub checks: Vec<ParamCheck>,
}

impl GradientReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one parameter result.
    pub fn record(&mut self, check: ParamCheck) {
        self.checks.push(check);
    }

    /// `true` when every recorded parameter passed (vacuously for none).
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// The parameter with the largest difference.
    pub fn worst(&self) -> Option<&ParamCheck> {
        self.checks
            .iter()
            .max_by(|a, b| a.max_abs_diff.total_cmp(&b.max_abs_diff))
    }

    /// Returns a human-readable summary.
    pub fn summary(&self) -> String {
        let passed = self.checks.iter().filter(|c| c.passed).count();
        let mut s = format!("Gradient check: {passed}/{} parameters passed", self.checks.len());
        if let Some(w) = self.worst() {
            s.push_str(&format!(
                ", worst '{}' {} max diff {:.3e}",
                w.name, w.shape, w.max_abs_diff
            ));
        }
        s
    }

    /// Serialises the report to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, GradCheckError> {
        serde_json::to_string_pretty(self).map_err(|e| GradCheckError::Serialization(e.to_string()))
    }
}
