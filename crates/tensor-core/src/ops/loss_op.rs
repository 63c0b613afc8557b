// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Cross-entropy loss.

use crate::{Payload, Tensor, TensorError};

/// Added inside the logarithm so that `ln(0)` never occurs.
const LOG_EPSILON: f64 = 1e-7;

/// Cross-entropy between predictions `y` and targets `t`.
///
/// For a vector this is `-Σ t·ln(y + 1e-7)`. A matrix is treated as a batch
/// of row vectors and the summed loss is divided by the row count. Higher
/// ranks return the mean loss of their children.
///
/// # Errors
/// Returns [`TensorError::ShapeMismatch`] if the shapes differ and
/// [`TensorError::UnsupportedRank`] for scalars.
pub fn cross_entropy_error(y: &Tensor, t: &Tensor) -> Result<f64, TensorError> {
    if !y.is_same_shape(t) {
        return Err(TensorError::ShapeMismatch {
            op: "cross_entropy_error",
            lhs: y.shape().clone(),
            rhs: t.shape().clone(),
        });
    }
    match y.payload() {
        Payload::Scalar(_) => Err(TensorError::UnsupportedRank {
            op: "cross_entropy_error",
            rank: 0,
        }),
        Payload::Vector(_) => Ok(entropy(y.as_slice(), t.as_slice())),
        _ => Ok(batch_loss(y.shape().dims(), y.as_slice(), t.as_slice())),
    }
}

/// Matrix: summed loss over the row count. Rank 3 and up: mean over children.
fn batch_loss(dims: &[usize], y: &[f64], t: &[f64]) -> f64 {
    if dims.len() == 2 {
        return entropy(y, t) / dims[0] as f64;
    }
    let child = dims[1..].iter().product::<usize>();
    let sum: f64 = y
        .chunks(child)
        .zip(t.chunks(child))
        .map(|(yc, tc)| batch_loss(&dims[1..], yc, tc))
        .sum();
    sum / dims[0] as f64
}

fn entropy(y: &[f64], t: &[f64]) -> f64 {
    -y.iter()
        .zip(t)
        .map(|(&yi, &ti)| ti * (yi + LOG_EPSILON).ln())
        .sum::<f64>()
}
