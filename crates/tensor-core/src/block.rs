// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Rank-3 to rank-6 containers.
//!
//! A `Block<R>` is a sequence of `dims[0]` identically shaped rank-`R-1`
//! children. Children are not separate allocations: they are consecutive
//! chunks of one flat row-major buffer, so every child has the same sub-shape
//! by construction.

use crate::{window, Shape, TensorError};

/// A dense rank-`R` array (`R` in `3..=6`) stored in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Block<const R: usize> {
    dims: [usize; R],
    data: Vec<f64>,
}

impl<const R: usize> Block<R> {
    /// Creates a block from a flat buffer.
    ///
    /// # Errors
    /// Returns [`TensorError::ZeroDimension`] for a zero extent and
    /// [`TensorError::BufferSizeMismatch`] if the buffer length is wrong.
    pub fn new(dims: [usize; R], data: Vec<f64>) -> Result<Self, TensorError> {
        Shape::from(dims).validate()?;
        let expected: usize = dims.iter().product();
        if data.len() != expected {
            return Err(TensorError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { dims, data })
    }

    /// Zero-filled block. `dims` must already be validated.
    pub(crate) fn zeros(dims: [usize; R]) -> Self {
        Self {
            dims,
            data: vec![0.0; dims.iter().product()],
        }
    }

    pub(crate) fn from_vec(dims: [usize; R], data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), dims.iter().product::<usize>());
        Self { dims, data }
    }

    pub fn dims(&self) -> [usize; R] {
        self.dims
    }

    pub fn shape(&self) -> Shape {
        Shape::from(self.dims)
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

    /// Extents of the trailing `(rows, columns)` plane.
    pub fn plane(&self) -> (usize, usize) {
        (self.dims[R - 2], self.dims[R - 1])
    }

    /// Returns the element at `index`, or `None` when out of bounds.
    pub fn element(&self, index: [usize; R]) -> Option<f64> {
        self.offset(index).map(|i| self.data[i])
    }

    /// Overwrites the element at `index`.
    pub fn assign(&mut self, value: f64, index: [usize; R]) -> Result<(), TensorError> {
        let i = self.offset(index).ok_or_else(|| TensorError::IndexOutOfBounds {
            index: index.to_vec(),
            shape: self.shape(),
        })?;
        self.data[i] = value;
        Ok(())
    }

    fn offset(&self, index: [usize; R]) -> Option<usize> {
        let mut offset = 0;
        for (&i, &d) in index.iter().zip(&self.dims) {
            if i >= d {
                return None;
            }
            offset = offset * d + i;
        }
        Some(offset)
    }

    /// Applies the same `h × w` window at `(x, y)` to every trailing plane.
    pub fn window(&self, x: usize, y: usize, h: usize, w: usize) -> Result<Self, TensorError> {
        let (rows, cols) = self.plane();
        window::check_window("window", rows, cols, x, y, h, w)?;
        let mut dims = self.dims;
        dims[R - 2] = h;
        dims[R - 1] = w;
        let mut out = Vec::with_capacity(dims.iter().product());
        for plane in self.data.chunks(rows * cols) {
            window::window_plane(plane, cols, x, y, h, w, &mut out);
        }
        Ok(Self::from_vec(dims, out))
    }

    /// Zero-pads every trailing plane by `size` on each edge.
    pub fn pad(&self, size: usize) -> Self {
        let (rows, cols) = self.plane();
        let mut dims = self.dims;
        dims[R - 2] += 2 * size;
        dims[R - 1] += 2 * size;
        let mut out = Vec::with_capacity(dims.iter().product());
        for plane in self.data.chunks(rows * cols) {
            window::pad_plane(plane, rows, cols, size, &mut out);
        }
        Self::from_vec(dims, out)
    }
}

impl Block<6> {
    /// Selects index `x` on axis 2 and `y` on axis 3, yielding the
    /// `(d0, d1, d4, d5)` block.
    ///
    /// This is the gather step of a 6-D `(N, C, fh, fw, OH, OW)` column layout.
    pub fn slice_to_4d(&self, x: usize, y: usize) -> Result<Block<4>, TensorError> {
        let [d0, d1, d2, d3, d4, d5] = self.dims;
        if x >= d2 || y >= d3 {
            return Err(TensorError::IndexOutOfBounds {
                index: vec![x, y],
                shape: Shape::matrix(d2, d3),
            });
        }
        let tail = d4 * d5;
        let mut out = Vec::with_capacity(d0 * d1 * tail);
        for a in 0..d0 {
            for b in 0..d1 {
                let start = (((a * d1 + b) * d2 + x) * d3 + y) * tail;
                out.extend_from_slice(&self.data[start..start + tail]);
            }
        }
        Ok(Block::from_vec([d0, d1, d4, d5], out))
    }
}
