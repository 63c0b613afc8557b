// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Strided rectangular views into rank-4 tensors.
//!
//! A [`Tensor4DSlice`] records explicit `[n, c, h, w]` indices into its
//! source and holds the only mutable borrow of it, so scatter-writes through
//! the view are visible in the source once the view is dropped.

use crate::{Block, Shape, Tensor, TensorError};

/// Index list plus target shape over a mutably borrowed rank-4 tensor.
#[derive(Debug)]
pub struct Tensor4DSlice<'a> {
    source: &'a mut Tensor,
    indices: Vec<[usize; 4]>,
    dims: [usize; 4],
}

impl<'a> Tensor4DSlice<'a> {
    /// Shape of the region: `[N, C, (y_end - y) / stride, (x_end - x) / stride]`.
    pub fn shape(&self) -> Shape {
        Shape::from(self.dims)
    }

    /// Source indices in row-major order of [`Tensor4DSlice::shape`].
    pub fn indices(&self) -> &[[usize; 4]] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Gathers the referenced cells into a new tensor.
    pub fn to_tensor(&self) -> Tensor {
        let src = self.source.as_slice();
        let strides = self.source.shape().strides();
        let data = self
            .indices
            .iter()
            .map(|idx| src[flat_offset(&strides, idx)])
            .collect();
        Block::from_vec(self.dims, data).into()
    }

    /// Adds `values` element-wise into the referenced source cells.
    ///
    /// # Errors
    /// Returns [`TensorError::ShapeMismatch`] unless `values` has exactly the
    /// slice's shape. Nothing is written in that case.
    pub fn add_assign(&mut self, values: &Tensor) -> Result<(), TensorError> {
        if values.shape().dims() != self.dims {
            return Err(TensorError::ShapeMismatch {
                op: "add_assign",
                lhs: self.shape(),
                rhs: values.shape().clone(),
            });
        }
        let strides = self.source.shape().strides();
        let dst = self.source.as_mut_slice();
        for (idx, &v) in self.indices.iter().zip(values.as_slice()) {
            dst[flat_offset(&strides, idx)] += v;
        }
        Ok(())
    }
}

/// Free-function form of [`Tensor4DSlice::add_assign`].
pub fn add_assign(slice: &mut Tensor4DSlice<'_>, values: &Tensor) -> Result<(), TensorError> {
    slice.add_assign(values)
}

fn flat_offset(strides: &[usize], idx: &[usize; 4]) -> usize {
    idx.iter().zip(strides).map(|(i, s)| i * s).sum()
}

/// Validates one spatial range and returns its stepped length.
fn stepped_len(
    axis: &'static str,
    start: usize,
    end: usize,
    extent: usize,
    stride: usize,
) -> Result<usize, TensorError> {
    let invalid = |detail: String| TensorError::InvalidWindow {
        op: "stride_slice",
        detail,
    };
    if stride == 0 {
        return Err(invalid("stride must be positive".into()));
    }
    if start >= end || end > extent {
        return Err(invalid(format!(
            "{axis} range {start}..{end} outside 0..{extent}"
        )));
    }
    if (end - start) % stride != 0 {
        return Err(invalid(format!(
            "{axis} range {start}..{end} is not a multiple of stride {stride}"
        )));
    }
    Ok((end - start) / stride)
}

/// Builds the index list for rows `y..y_end` and columns `x..x_end` of every
/// `(n, c)` plane, stepping by `stride`.
fn region(
    t: &Tensor,
    y: usize,
    y_end: usize,
    x: usize,
    x_end: usize,
    stride: usize,
) -> Result<(Vec<[usize; 4]>, [usize; 4]), TensorError> {
    let dims = match *t.shape().dims() {
        [n, c, h, w] => [n, c, h, w],
        _ => {
            return Err(TensorError::UnsupportedRank {
                op: "stride_slice",
                rank: t.rank(),
            })
        }
    };
    let [n, c, h, w] = dims;
    let oh = stepped_len("row", y, y_end, h, stride)?;
    let ow = stepped_len("column", x, x_end, w, stride)?;

    let mut indices = Vec::with_capacity(n * c * oh * ow);
    for ni in 0..n {
        for ci in 0..c {
            for i in 0..oh {
                for j in 0..ow {
                    indices.push([ni, ci, y + i * stride, x + j * stride]);
                }
            }
        }
    }
    tracing::trace!(n, c, oh, ow, stride, "stride slice");
    Ok((indices, [n, c, oh, ow]))
}

impl Tensor {
    /// Borrows a strided rectangular region of a rank-4 tensor for
    /// gather and scatter-add.
    ///
    /// # Errors
    /// Returns [`TensorError::UnsupportedRank`] unless `self` is rank 4 and
    /// [`TensorError::InvalidWindow`] unless `start < end <= extent` on both
    /// axes and each range length is a multiple of a non-zero `stride`.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::Tensor;
    /// let mut x = Tensor::zeros([1, 1, 4, 4]).unwrap();
    /// let ones = Tensor::from_flat([1, 1, 2, 2], vec![1.0; 4]).unwrap();
    /// x.stride_slice(0, 4, 0, 4, 2).unwrap().add_assign(&ones).unwrap();
    /// assert_eq!(x.element_at(&[0, 0, 2, 2]).unwrap(), 1.0);
    /// assert_eq!(x.element_at(&[0, 0, 1, 1]).unwrap(), 0.0);
    /// ```
    pub fn stride_slice(
        &mut self,
        y: usize,
        y_end: usize,
        x: usize,
        x_end: usize,
        stride: usize,
    ) -> Result<Tensor4DSlice<'_>, TensorError> {
        let (indices, dims) = region(self, y, y_end, x, x_end, stride)?;
        Ok(Tensor4DSlice {
            source: self,
            indices,
            dims,
        })
    }

    /// Copies rows `y..y_end` and columns `x..x_end` of every plane of a
    /// rank-4 tensor.
    pub fn slice_t4d(
        &self,
        y: usize,
        y_end: usize,
        x: usize,
        x_end: usize,
    ) -> Result<Tensor, TensorError> {
        let (indices, dims) = region(self, y, y_end, x, x_end, 1)?;
        let strides = self.shape().strides();
        let src = self.as_slice();
        let data = indices.iter().map(|idx| src[flat_offset(&strides, idx)]).collect();
        Ok(Block::from_vec(dims, data).into())
    }
}
