// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Compares analytic gradients against the central-difference oracle.

use tensor_core::{numerical_gradient_with_step, Tensor};

use crate::{GradCheckConfig, GradCheckError, GradientReport, ParamCheck};

/// Runs per-parameter gradient comparisons under one configuration.
#[derive(Debug, Clone)]
pub struct GradientChecker {
    config: GradCheckConfig,
}

impl GradientChecker {
    /// Creates a checker after validating `config`.
    pub fn new(config: GradCheckConfig) -> Result<Self, GradCheckError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GradCheckConfig {
        &self.config
    }

    /// Checks the analytic gradient of the parameter `name` with value `x`.
    ///
    /// `loss` receives the flattened parameter values and returns the scalar
    /// loss; it is evaluated twice per element of `x`. A NaN or infinite
    /// difference on any element fails the check and is carried into
    /// `max_abs_diff`.
    ///
    /// # Errors
    /// Returns [`GradCheckError::ShapeMismatch`] if `analytic` does not have
    /// the shape of `x`.
    pub fn check<F>(
        &self,
        name: &str,
        loss: F,
        x: &Tensor,
        analytic: &Tensor,
    ) -> Result<ParamCheck, GradCheckError>
    where
        F: FnMut(&[f64]) -> f64,
    {
        if analytic.shape() != x.shape() {
            return Err(GradCheckError::ShapeMismatch {
                param: name.to_string(),
                analytic: analytic.shape().clone(),
                numeric: x.shape().clone(),
            });
        }
        let numeric = numerical_gradient_with_step(loss, x, self.config.step);

        let diffs: Vec<f64> = analytic
            .as_slice()
            .iter()
            .zip(numeric.as_slice())
            .map(|(&a, &n)| self.difference(a, n))
            .collect();
        let max_abs_diff = worst_difference(&diffs);
        let mean_abs_diff = tensor_core::vector::mean(&diffs);
        let passed = max_abs_diff.is_finite() && max_abs_diff <= self.config.tolerance;

        tracing::debug!(
            param = name,
            shape = %x.shape(),
            max_abs_diff,
            mean_abs_diff,
            "gradient check"
        );
        if !passed {
            tracing::warn!(
                param = name,
                max_abs_diff,
                tolerance = self.config.tolerance,
                "gradient check failed"
            );
        }

        Ok(ParamCheck {
            name: name.to_string(),
            shape: x.shape().clone(),
            max_abs_diff,
            mean_abs_diff,
            passed,
        })
    }

    /// Runs [`GradientChecker::check`] and records the result in `report`.
    pub fn check_into<F>(
        &self,
        report: &mut GradientReport,
        name: &str,
        loss: F,
        x: &Tensor,
        analytic: &Tensor,
    ) -> Result<bool, GradCheckError>
    where
        F: FnMut(&[f64]) -> f64,
    {
        let check = self.check(name, loss, x, analytic)?;
        let passed = check.passed;
        report.record(check);
        Ok(passed)
    }

    fn difference(&self, a: f64, n: f64) -> f64 {
        let diff = (a - n).abs();
        if self.config.relative {
            diff / 1.0f64.max(a.abs()).max(n.abs())
        } else {
            diff
        }
    }
}

/// Largest difference, or NaN as soon as one element is NaN.
fn worst_difference(diffs: &[f64]) -> f64 {
    diffs
        .iter()
        .fold(0.0, |worst: f64, &d| if d.is_nan() || d > worst { d } else { worst })
}

impl Default for GradientChecker {
    fn default() -> Self {
        Self {
            config: GradCheckConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn square_sum(v: &[f64]) -> f64 {
        v.iter().map(|x| x * x).sum()
    }

    #[test]
    fn test_correct_gradient_passes() {
        let x = Tensor::matrix(2, 2, vec![0.5, -1.0, 2.0, 0.25]).unwrap();
        let analytic = &x * 2.0;
        let c = GradientChecker::default().check("x", square_sum, &x, &analytic).unwrap();
        assert!(c.passed);
        assert!(c.max_abs_diff < 1e-8);
        assert_eq!(c.shape, *x.shape());
    }

    #[test]
    fn test_wrong_gradient_fails() {
        let x = Tensor::vector(vec![1.0, 2.0]).unwrap();
        let analytic = Tensor::vector(vec![2.0, 3.0]).unwrap();
        let c = GradientChecker::default().check("x", square_sum, &x, &analytic).unwrap();
        assert!(!c.passed);
        assert_abs_diff_eq!(c.max_abs_diff, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(c.mean_abs_diff, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_nan_gradient_fails() {
        let x = Tensor::vector(vec![1.0, 2.0]).unwrap();
        let checker = GradientChecker::default();

        let partial = Tensor::vector(vec![f64::NAN, 4.0]).unwrap();
        let c = checker.check("x", square_sum, &x, &partial).unwrap();
        assert!(!c.passed);
        assert!(c.max_abs_diff.is_nan());

        let all_nan = Tensor::vector(vec![f64::NAN, f64::NAN]).unwrap();
        let c = checker.check("x", square_sum, &x, &all_nan).unwrap();
        assert!(!c.passed);
        assert!(c.max_abs_diff.is_nan());
    }

    #[test]
    fn test_infinite_gradient_fails() {
        let x = Tensor::vector(vec![1.0, 2.0]).unwrap();
        let analytic = Tensor::vector(vec![2.0, f64::INFINITY]).unwrap();
        let c = GradientChecker::default().check("x", square_sum, &x, &analytic).unwrap();
        assert!(!c.passed);
        assert_eq!(c.max_abs_diff, f64::INFINITY);
    }

    #[test]
    fn test_nan_check_is_reported_as_worst() {
        let x = Tensor::vector(vec![1.0, 2.0]).unwrap();
        let checker = GradientChecker::default();
        let mut report = GradientReport::new();
        let wrong = Tensor::vector(vec![2.0, 5.0]).unwrap();
        let nan = Tensor::vector(vec![f64::NAN, 4.0]).unwrap();
        assert!(!checker.check_into(&mut report, "w", square_sum, &x, &wrong).unwrap());
        assert!(!checker.check_into(&mut report, "b", square_sum, &x, &nan).unwrap());
        assert!(!report.all_passed());
        assert_eq!(report.worst().map(|c| c.name.as_str()), Some("b"));
    }

    #[test]
    fn test_relative_mode_scales_large_gradients() {
        let x = Tensor::vector(vec![1000.0]).unwrap();
        // True gradient 2000; an error of 0.1 is 5e-5 relative.
        let analytic = Tensor::vector(vec![2000.1]).unwrap();
        let strict = GradientChecker::default();
        let relative = GradientChecker::new(GradCheckConfig {
            relative: true,
            ..Default::default()
        })
        .unwrap();
        assert!(!strict.check("x", square_sum, &x, &analytic).unwrap().passed);
        assert!(relative.check("x", square_sum, &x, &analytic).unwrap().passed);
    }

    #[test]
    fn test_shape_mismatch() {
        let x = Tensor::vector(vec![1.0, 2.0]).unwrap();
        let analytic = Tensor::matrix(1, 2, vec![2.0, 4.0]).unwrap();
        let err = GradientChecker::default()
            .check("b1", square_sum, &x, &analytic)
            .unwrap_err();
        assert!(matches!(err, GradCheckError::ShapeMismatch { ref param, .. } if param == "b1"));
    }

    #[test]
    fn test_new_validates_config() {
        let bad = GradCheckConfig {
            step: 0.0,
            ..Default::default()
        };
        assert!(GradientChecker::new(bad).is_err());
    }

    #[test]
    fn test_check_into_records() {
        let x = Tensor::vector(vec![3.0]).unwrap();
        let mut report = GradientReport::new();
        let checker = GradientChecker::default();
        assert!(checker
            .check_into(&mut report, "x", square_sum, &x, &Tensor::vector(vec![6.0]).unwrap())
            .unwrap());
        assert_eq!(report.checks.len(), 1);
        assert!(report.all_passed());
    }
}
