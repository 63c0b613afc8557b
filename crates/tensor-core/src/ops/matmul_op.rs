// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Matrix multiplication operation.

use crate::{Payload, Shape, Tensor, TensorError};

/// Matrix product `lhs · rhs`.
///
/// `rhs` must be a `[K, N]` matrix. `lhs` is either a `[M, K]` matrix or a
/// rank-3..6 tensor whose trailing planes are `[M, K]`; in the latter case
/// every plane is multiplied by `rhs` and the result has shape
/// `lhs[..-1] ++ [N]`.
///
/// # Errors
/// Returns [`TensorError::ShapeMismatch`] if the inner dimensions differ or
/// `rhs` is not a matrix, and [`TensorError::UnsupportedRank`] for a rank-0
/// or rank-1 `lhs`.
///
/// # Examples
/// ```
/// use tensor_core::{dot, Tensor};
/// let a = Tensor::matrix(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
/// let b = Tensor::matrix(2, 2, vec![5.0, 6.0, 7.0, 8.0]).unwrap();
/// assert_eq!(dot(&a, &b).unwrap().flatten(), vec![19.0, 22.0, 43.0, 50.0]);
/// ```
pub fn dot(lhs: &Tensor, rhs: &Tensor) -> Result<Tensor, TensorError> {
    if lhs.rank() < 2 {
        return Err(TensorError::UnsupportedRank {
            op: "dot",
            rank: lhs.rank(),
        });
    }
    if !lhs.shape().is_matmul_compatible(rhs.shape()) {
        return Err(TensorError::ShapeMismatch {
            op: "dot",
            lhs: lhs.shape().clone(),
            rhs: rhs.shape().clone(),
        });
    }

    if let (Payload::Matrix(a), Payload::Matrix(b)) = (lhs.payload(), rhs.payload()) {
        return Ok(a.dot(b)?.into());
    }

    let lhs_dims = lhs.shape().dims();
    let m = lhs_dims[lhs_dims.len() - 2];
    let k = lhs_dims[lhs_dims.len() - 1];
    let n = rhs.shape().dims()[1];

    let mut out_dims = lhs_dims.to_vec();
    if let Some(last) = out_dims.last_mut() {
        *last = n;
    }
    let planes = lhs.size() / (m * k);
    let mut out = vec![0.0; planes * m * n];
    let b = rhs.as_slice();
    for (a, c) in lhs.as_slice().chunks(m * k).zip(out.chunks_mut(m * n)) {
        matmul_f64_generic(a, b, c, m, k, n);
    }
    Tensor::from_parts(Shape::new(out_dims), out)
}

impl Tensor {
    /// Method form of [`dot`].
    pub fn dot(&self, rhs: &Tensor) -> Result<Tensor, TensorError> {
        dot(self, rhs)
    }
}

/// Portable f64 matrix multiplication.
///
/// Uses a simple ikj loop order for better cache locality on the `b` matrix.
pub(crate) fn matmul_f64_generic(
    a: &[f64],
    b: &[f64],
    c: &mut [f64],
    m: usize,
    k: usize,
    n: usize,
) {
    c.iter_mut().for_each(|x| *x = 0.0);

    // ikj: the inner loop is an axpy on a row of C, sequential in memory.
    for i in 0..m {
        let c_row = &mut c[i * n..(i + 1) * n];
        for p in 0..k {
            let a_ip = a[i * k + p];
            let b_row = &b[p * n..(p + 1) * n];
            for (c_ij, &b_pj) in c_row.iter_mut().zip(b_row) {
                *c_ij += a_ip * b_pj;
            }
        }
    }
}
