// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Whole-tensor and per-axis reductions.

use crate::{vector, Matrix, Tensor, TensorError};

impl Tensor {
    /// Sum of every element.
    pub fn sum_all(&self) -> f64 {
        vector::sum(self.as_slice())
    }

    /// Mean of every element.
    pub fn mean_all(&self) -> f64 {
        vector::mean(self.as_slice())
    }

    /// Largest element.
    pub fn max_all(&self) -> f64 {
        vector::max(self.as_slice())
    }

    /// Flat row-major index of the first largest element.
    pub fn argmax_all(&self) -> usize {
        vector::argmax(self.as_slice())
    }

    /// Matrix sum along `axis`: 0 yields `[1, C]`, 1 yields `[R, 1]`.
    ///
    /// # Errors
    /// Returns [`TensorError::UnsupportedRank`] unless `self` is rank 2 and
    /// [`TensorError::AxisOutOfRange`] for `axis > 1`.
    pub fn sum(&self, axis: usize) -> Result<Tensor, TensorError> {
        Ok(self.axis_matrix("sum")?.sum_axis(axis)?.into())
    }

    /// Matrix mean along `axis`; same extents as [`Tensor::sum`].
    pub fn mean(&self, axis: usize) -> Result<Tensor, TensorError> {
        Ok(self.axis_matrix("mean")?.mean_axis(axis)?.into())
    }

    /// Matrix maximum along `axis`; same extents as [`Tensor::sum`].
    pub fn max(&self, axis: usize) -> Result<Tensor, TensorError> {
        Ok(self.axis_matrix("max")?.max_axis(axis)?.into())
    }

    /// Index of the maximum along `axis`: per column for 0, per row for 1.
    pub fn argmax(&self, axis: usize) -> Result<Vec<usize>, TensorError> {
        self.axis_matrix("argmax")?.argmax_axis(axis)
    }

    fn axis_matrix(&self, op: &'static str) -> Result<&Matrix, TensorError> {
        self.as_matrix().ok_or(TensorError::UnsupportedRank {
            op,
            rank: self.rank(),
        })
    }
}
