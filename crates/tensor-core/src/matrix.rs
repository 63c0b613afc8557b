// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The rank-2 container.

use crate::ops::matmul_f64_generic;
use crate::{vector, window, Shape, TensorError};

/// A dense row-major matrix: element `(r, c)` lives at `r * columns + c`.
///
/// A `Matrix` owns its buffer exclusively. Every transform returns a fresh
/// matrix; the only in-place mutators are [`Matrix::assign`] and
/// [`Matrix::assign_window`].
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    columns: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Creates a matrix from a row-major buffer.
    ///
    /// # Errors
    /// Returns [`TensorError::ZeroDimension`] if either extent is zero,
    /// [`TensorError::BufferSizeMismatch`] if `data.len() != rows * columns`.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::Matrix;
    /// let m = Matrix::new(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
    /// assert_eq!(m.element(1, 0), Some(3.0));
    /// ```
    pub fn new(rows: usize, columns: usize, data: Vec<f64>) -> Result<Self, TensorError> {
        Shape::matrix(rows, columns).validate()?;
        if data.len() != rows * columns {
            return Err(TensorError::BufferSizeMismatch {
                expected: rows * columns,
                actual: data.len(),
            });
        }
        Ok(Self {
            rows,
            columns,
            data,
        })
    }

    /// Creates a zero-filled matrix. Both extents must be non-zero.
    pub(crate) fn zeros(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            data: vec![0.0; rows * columns],
        }
    }

    /// Builds a matrix whose buffer length the caller has already checked.
    pub(crate) fn from_vec(rows: usize, columns: usize, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), rows * columns);
        Self {
            rows,
            columns,
            data,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Returns `(rows, columns)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.columns)
    }

    pub fn shape(&self) -> Shape {
        Shape::matrix(self.rows, self.columns)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Returns the element at `(r, c)`, or `None` when out of bounds.
    pub fn element(&self, r: usize, c: usize) -> Option<f64> {
        if r < self.rows && c < self.columns {
            Some(self.data[r * self.columns + c])
        } else {
            None
        }
    }

    /// Overwrites the element at `(r, c)`.
    pub fn assign(&mut self, value: f64, r: usize, c: usize) -> Result<(), TensorError> {
        if r >= self.rows || c >= self.columns {
            return Err(TensorError::IndexOutOfBounds {
                index: vec![r, c],
                shape: self.shape(),
            });
        }
        self.data[r * self.columns + c] = value;
        Ok(())
    }

    /// Borrows row `r`.
    pub fn row(&self, r: usize) -> Option<&[f64]> {
        (r < self.rows).then(|| &self.data[r * self.columns..(r + 1) * self.columns])
    }

    /// Copies column `c` out of the matrix.
    pub fn column(&self, c: usize) -> Option<Vec<f64>> {
        (c < self.columns).then(|| {
            (0..self.rows)
                .map(|r| self.data[r * self.columns + c])
                .collect()
        })
    }

    /// Matrix product `self @ rhs`.
    ///
    /// # Errors
    /// Returns [`TensorError::ShapeMismatch`] when `self.columns() != rhs.rows()`.
    pub fn dot(&self, rhs: &Matrix) -> Result<Matrix, TensorError> {
        if self.columns != rhs.rows {
            return Err(TensorError::ShapeMismatch {
                op: "dot",
                lhs: self.shape(),
                rhs: rhs.shape(),
            });
        }
        let mut out = vec![0.0; self.rows * rhs.columns];
        matmul_f64_generic(
            &self.data,
            &rhs.data,
            &mut out,
            self.rows,
            self.columns,
            rhs.columns,
        );
        Ok(Matrix::from_vec(self.rows, rhs.columns, out))
    }

    /// Returns the transpose.
    pub fn t(&self) -> Matrix {
        let mut out = Vec::with_capacity(self.data.len());
        for c in 0..self.columns {
            for r in 0..self.rows {
                out.push(self.data[r * self.columns + c]);
            }
        }
        Matrix::from_vec(self.columns, self.rows, out)
    }

    /// Copies the `h × w` block whose top-left corner is row `x`, column `y`.
    ///
    /// # Errors
    /// Returns [`TensorError::InvalidWindow`] if the block leaves the matrix.
    pub fn window(&self, x: usize, y: usize, h: usize, w: usize) -> Result<Matrix, TensorError> {
        window::check_window("window", self.rows, self.columns, x, y, h, w)?;
        let mut out = Vec::with_capacity(h * w);
        window::window_plane(&self.data, self.columns, x, y, h, w, &mut out);
        Ok(Matrix::from_vec(h, w, out))
    }

    /// Writes `block` into `self` with its top-left corner at row `x`, column `y`.
    pub fn assign_window(&mut self, block: &Matrix, x: usize, y: usize) -> Result<(), TensorError> {
        window::check_window(
            "assign_window",
            self.rows,
            self.columns,
            x,
            y,
            block.rows,
            block.columns,
        )?;
        for r in 0..block.rows {
            let dst = (x + r) * self.columns + y;
            self.data[dst..dst + block.columns].copy_from_slice(
                &block.data[r * block.columns..(r + 1) * block.columns],
            );
        }
        Ok(())
    }

    /// Surrounds the matrix with a `size`-wide border of zeros.
    pub fn pad(&self, size: usize) -> Matrix {
        let mut out = Vec::new();
        window::pad_plane(&self.data, self.rows, self.columns, size, &mut out);
        Matrix::from_vec(self.rows + 2 * size, self.columns + 2 * size, out)
    }

    /// Reinterprets the buffer with new extents.
    pub fn reshape(&self, rows: usize, columns: usize) -> Result<Matrix, TensorError> {
        Matrix::new(rows, columns, self.data.clone())
    }

    /// Sum along `axis`: 0 collapses rows into a `1 × C` matrix, 1 collapses
    /// columns into an `R × 1` matrix.
    pub fn sum_axis(&self, axis: usize) -> Result<Matrix, TensorError> {
        self.reduce_axis("sum", axis, vector::sum)
    }

    /// Mean along `axis`; see [`Matrix::sum_axis`] for the output extents.
    pub fn mean_axis(&self, axis: usize) -> Result<Matrix, TensorError> {
        self.reduce_axis("mean", axis, vector::mean)
    }

    /// Maximum along `axis`; see [`Matrix::sum_axis`] for the output extents.
    pub fn max_axis(&self, axis: usize) -> Result<Matrix, TensorError> {
        self.reduce_axis("max", axis, vector::max)
    }

    /// Index of the maximum along `axis`: one entry per column for axis 0,
    /// one per row for axis 1.
    pub fn argmax_axis(&self, axis: usize) -> Result<Vec<usize>, TensorError> {
        match axis {
            0 => Ok((0..self.columns)
                .filter_map(|c| self.column(c))
                .map(|col| vector::argmax(&col))
                .collect()),
            1 => Ok(self.data.chunks(self.columns).map(vector::argmax).collect()),
            _ => Err(TensorError::AxisOutOfRange {
                op: "argmax",
                axis,
                rank: 2,
            }),
        }
    }

    fn reduce_axis(
        &self,
        op: &'static str,
        axis: usize,
        f: impl Fn(&[f64]) -> f64,
    ) -> Result<Matrix, TensorError> {
        match axis {
            0 => {
                let out = (0..self.columns)
                    .filter_map(|c| self.column(c))
                    .map(|col| f(&col))
                    .collect();
                Ok(Matrix::from_vec(1, self.columns, out))
            }
            1 => {
                let out = self.data.chunks(self.columns).map(&f).collect();
                Ok(Matrix::from_vec(self.rows, 1, out))
            }
            _ => Err(TensorError::AxisOutOfRange { op, axis, rank: 2 }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(rows: usize, columns: usize, data: &[f64]) -> Matrix {
        Matrix::new(rows, columns, data.to_vec()).unwrap()
    }

    #[test]
    fn test_new_rejects_degenerate() {
        assert!(matches!(
            Matrix::new(0, 3, vec![]),
            Err(TensorError::ZeroDimension { .. })
        ));
        assert!(matches!(
            Matrix::new(2, 2, vec![1.0; 3]),
            Err(TensorError::BufferSizeMismatch {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_dot_2x2() {
        let a = m(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let b = m(2, 2, &[5.0, 6.0, 7.0, 8.0]);
        assert_eq!(a.dot(&b).unwrap().as_slice(), &[19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn test_dot_shape_mismatch() {
        let a = Matrix::zeros(2, 3);
        let b = Matrix::zeros(2, 3);
        assert!(matches!(
            a.dot(&b),
            Err(TensorError::ShapeMismatch { op: "dot", .. })
        ));
    }

    #[test]
    fn test_transpose() {
        let a = m(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let t = a.t();
        assert_eq!(t.dims(), (3, 2));
        assert_eq!(t.as_slice(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        assert_eq!(t.t(), a);
    }

    #[test]
    fn test_row_and_column() {
        let a = m(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(a.row(1), Some(&[4.0, 5.0, 6.0][..]));
        assert_eq!(a.column(2), Some(vec![3.0, 6.0]));
        assert_eq!(a.row(2), None);
        assert_eq!(a.column(3), None);
    }

    #[test]
    fn test_pad_then_window() {
        let a = m(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let padded = a.pad(1);
        assert_eq!(padded.dims(), (4, 4));
        #[rustfmt::skip]
        let expected = [
            0.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 2.0, 0.0,
            0.0, 3.0, 4.0, 0.0,
            0.0, 0.0, 0.0, 0.0,
        ];
        assert_eq!(padded.as_slice(), &expected);
        assert_eq!(padded.window(1, 1, 2, 2).unwrap(), a);
    }

    #[test]
    fn test_window_offsets_are_row_then_column() {
        let a = m(3, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        let w = a.window(0, 1, 2, 2).unwrap();
        assert_eq!(w.as_slice(), &[2.0, 3.0, 5.0, 6.0]);
        assert!(a.window(2, 2, 2, 2).is_err());
    }

    #[test]
    fn test_assign_window() {
        let mut a = Matrix::zeros(3, 3);
        a.assign_window(&m(2, 2, &[1.0, 2.0, 3.0, 4.0]), 1, 0).unwrap();
        assert_eq!(
            a.as_slice(),
            &[0.0, 0.0, 0.0, 1.0, 2.0, 0.0, 3.0, 4.0, 0.0]
        );
        assert!(a.assign_window(&Matrix::zeros(2, 2), 2, 2).is_err());
    }

    #[test]
    fn test_axis_reductions() {
        let a = m(2, 3, &[1.0, 5.0, 3.0, 4.0, 2.0, 6.0]);
        assert_eq!(a.sum_axis(0).unwrap().as_slice(), &[5.0, 7.0, 9.0]);
        assert_eq!(a.sum_axis(1).unwrap().dims(), (2, 1));
        assert_eq!(a.sum_axis(1).unwrap().as_slice(), &[9.0, 12.0]);
        assert_eq!(a.mean_axis(1).unwrap().as_slice(), &[3.0, 4.0]);
        assert_eq!(a.max_axis(0).unwrap().as_slice(), &[4.0, 5.0, 6.0]);
        assert_eq!(a.argmax_axis(1).unwrap(), vec![1, 2]);
        assert_eq!(a.argmax_axis(0).unwrap(), vec![1, 0, 1]);
        assert!(matches!(
            a.sum_axis(2),
            Err(TensorError::AxisOutOfRange { axis: 2, .. })
        ));
    }

    #[test]
    fn test_assign_out_of_bounds() {
        let mut a = Matrix::zeros(2, 2);
        a.assign(7.0, 1, 1).unwrap();
        assert_eq!(a.element(1, 1), Some(7.0));
        assert!(a.assign(1.0, 2, 0).is_err());
    }
}
