// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Softmax activation operation.

use crate::Tensor;

/// Computes softmax along the last dimension: `output[i] = exp(x[i] - max) / sum(exp(x - max))`.
///
/// Uses the numerically stable variant that subtracts the maximum value
/// before exponentiation to prevent overflow. Every rank is accepted; a
/// scalar maps to `1.0`.
pub fn softmax(input: &Tensor) -> Tensor {
    let mut output = input.zeros_like();
    let last_dim = match input.shape().dims().last() {
        Some(&d) => d,
        None => {
            output.as_mut_slice()[0] = 1.0;
            return output;
        }
    };

    let src = input.as_slice();
    let dst = output.as_mut_slice();
    for (row_src, row_dst) in src.chunks(last_dim).zip(dst.chunks_mut(last_dim)) {
        let max_val = row_src.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let mut sum = 0.0;
        for (d, &s) in row_dst.iter_mut().zip(row_src) {
            let e = (s - max_val).exp();
            *d = e;
            sum += e;
        }

        if sum > 0.0 {
            let inv_sum = 1.0 / sum;
            for d in row_dst.iter_mut() {
                *d *= inv_sum;
            }
        }
    }
    output
}

impl Tensor {
    /// Method form of [`softmax`].
    pub fn softmax(&self) -> Tensor {
        softmax(self)
    }
}
