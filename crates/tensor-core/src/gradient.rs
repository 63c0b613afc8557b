// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Central-difference gradient oracle.

use crate::Tensor;

/// Default perturbation `h` for [`numerical_gradient`].
pub const NUMERICAL_STEP: f64 = 1e-4;

/// Estimates `∂f/∂x` for every element of `x` by central differences.
///
/// `f` receives the flattened, perturbed values of `x` and must be a pure
/// function of them. The result has the shape of `x`. The cost is
/// `2 * x.size()` evaluations of `f`.
///
/// # Examples
/// ```
/// use tensor_core::{numerical_gradient, Tensor};
/// let x = Tensor::vector(vec![3.0, -1.0]).unwrap();
/// let g = numerical_gradient(|v| v.iter().map(|a| a * a).sum(), &x);
/// assert!((g.as_slice()[0] - 6.0).abs() < 1e-6);
/// ```
pub fn numerical_gradient<F>(f: F, x: &Tensor) -> Tensor
where
    F: FnMut(&[f64]) -> f64,
{
    numerical_gradient_with_step(f, x, NUMERICAL_STEP)
}

/// [`numerical_gradient`] with an explicit step `h`.
pub fn numerical_gradient_with_step<F>(mut f: F, x: &Tensor, h: f64) -> Tensor
where
    F: FnMut(&[f64]) -> f64,
{
    let mut point = x.flatten();
    let mut grad = Vec::with_capacity(point.len());
    for i in 0..point.len() {
        let original = point[i];

        point[i] = original + h;
        let fxh1 = f(&point);
        point[i] = original - h;
        let fxh2 = f(&point);
        point[i] = original;

        grad.push((fxh1 - fxh2) / (2.0 * h));
    }
    tracing::debug!(
        elements = point.len(),
        evaluations = 2 * point.len(),
        step = h,
        "numerical gradient"
    );
    x.with_data(grad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_gradient_of_square_sum() {
        let x = Tensor::random_normal([2, 3], Some(5)).unwrap();
        let g = numerical_gradient(|v| v.iter().map(|a| a * a).sum(), &x);
        assert_eq!(g.shape(), x.shape());
        for (gi, xi) in g.as_slice().iter().zip(x.as_slice()) {
            assert_abs_diff_eq!(*gi, 2.0 * xi, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_evaluation_count_and_restore() {
        let x = Tensor::vector(vec![1.0, 2.0, 3.0]).unwrap();
        let mut calls = 0;
        let mut seen_original = false;
        let g = numerical_gradient(
            |v| {
                calls += 1;
                seen_original |= v == [1.0, 2.0, 3.0];
                v[0] * v[1] + v[2]
            },
            &x,
        );
        assert_eq!(calls, 6);
        // Every call perturbs exactly one element.
        assert!(!seen_original);
        assert_abs_diff_eq!(g.as_slice()[0], 2.0, epsilon = 1e-8);
        assert_abs_diff_eq!(g.as_slice()[1], 1.0, epsilon = 1e-8);
        assert_abs_diff_eq!(g.as_slice()[2], 1.0, epsilon = 1e-8);
    }

    #[test]
    fn test_scalar_input() {
        let g = numerical_gradient_with_step(|v| v[0].sin(), &Tensor::scalar(0.0), 1e-5);
        assert_abs_diff_eq!(g.as_scalar().unwrap(), 1.0, epsilon = 1e-8);
    }
}
