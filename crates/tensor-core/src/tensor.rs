// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The rank-polymorphic tensor façade.
//!
//! A [`Tensor`] pairs an immutable [`Shape`] with exactly one [`Payload`]
//! variant whose rank equals `shape.rank()`. Public operations dispatch on
//! the payload variant; the constructors are the only place where the
//! shape/payload agreement is established.

use crate::{vector, window, Block, Matrix, Shape, TensorError, MAX_RANK};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Rank-specific storage behind a [`Tensor`].
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Scalar(f64),
    Vector(Vec<f64>),
    Matrix(Matrix),
    Rank3(Block<3>),
    Rank4(Block<4>),
    Rank5(Block<5>),
    Rank6(Block<6>),
}

/// Expands `$body` once for each rank-3..6 variant with `$b` bound to the block.
macro_rules! for_blocks {
    ($payload:expr, $b:ident => $body:expr, $rest:pat => $fallback:expr) => {
        match $payload {
            Payload::Rank3($b) => $body,
            Payload::Rank4($b) => $body,
            Payload::Rank5($b) => $body,
            Payload::Rank6($b) => $body,
            $rest => $fallback,
        }
    };
}

impl Payload {
    /// Builds the variant matching `dims.len()`.
    ///
    /// `data.len()` must already equal the product of `dims`.
    fn from_dims(dims: &[usize], data: Vec<f64>) -> Result<Self, TensorError> {
        debug_assert_eq!(data.len(), dims.iter().product::<usize>());
        Ok(match *dims {
            [] => Payload::Scalar(data[0]),
            [_] => Payload::Vector(data),
            [r, c] => Payload::Matrix(Matrix::from_vec(r, c, data)),
            [a, b, c] => Payload::Rank3(Block::from_vec([a, b, c], data)),
            [a, b, c, d] => Payload::Rank4(Block::from_vec([a, b, c, d], data)),
            [a, b, c, d, e] => Payload::Rank5(Block::from_vec([a, b, c, d, e], data)),
            [a, b, c, d, e, f] => Payload::Rank6(Block::from_vec([a, b, c, d, e, f], data)),
            _ => {
                return Err(TensorError::UnsupportedRank {
                    op: "construct",
                    rank: dims.len(),
                })
            }
        })
    }

    /// Same variant and extents, new contents.
    fn with_data(&self, data: Vec<f64>) -> Self {
        match self {
            Payload::Scalar(_) => Payload::Scalar(data[0]),
            Payload::Vector(_) => Payload::Vector(data),
            Payload::Matrix(m) => Payload::Matrix(Matrix::from_vec(m.rows(), m.columns(), data)),
            Payload::Rank3(b) => Payload::Rank3(Block::from_vec(b.dims(), data)),
            Payload::Rank4(b) => Payload::Rank4(Block::from_vec(b.dims(), data)),
            Payload::Rank5(b) => Payload::Rank5(Block::from_vec(b.dims(), data)),
            Payload::Rank6(b) => Payload::Rank6(Block::from_vec(b.dims(), data)),
        }
    }

    /// The flat row-major contents, whatever the rank.
    pub fn as_slice(&self) -> &[f64] {
        match self {
            Payload::Scalar(v) => std::slice::from_ref(v),
            Payload::Vector(v) => v,
            Payload::Matrix(m) => m.as_slice(),
            Payload::Rank3(b) => b.as_slice(),
            Payload::Rank4(b) => b.as_slice(),
            Payload::Rank5(b) => b.as_slice(),
            Payload::Rank6(b) => b.as_slice(),
        }
    }

    fn as_mut_slice(&mut self) -> &mut [f64] {
        match self {
            Payload::Scalar(v) => std::slice::from_mut(v),
            Payload::Vector(v) => v,
            Payload::Matrix(m) => m.as_mut_slice(),
            Payload::Rank3(b) => b.as_mut_slice(),
            Payload::Rank4(b) => b.as_mut_slice(),
            Payload::Rank5(b) => b.as_mut_slice(),
            Payload::Rank6(b) => b.as_mut_slice(),
        }
    }
}

/// An owned tensor of rank 0 through 6 with `f64` elements.
///
/// Tensors are value types: every transform allocates and returns a new
/// tensor and the shape never changes in place.
///
/// # Examples
/// ```
/// use tensor_core::Tensor;
/// let t = Tensor::zeros([2, 3, 4]).unwrap();
/// assert_eq!(t.rank(), 3);
/// assert_eq!(t.size(), 24);
/// assert_eq!(t.flatten().len(), t.shape().num_elements());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Shape,
    payload: Payload,
}

impl Tensor {
    // ── Construction ───────────────────────────────────────────

    /// Creates a zero-filled tensor.
    ///
    /// # Errors
    /// Returns [`TensorError::ZeroDimension`] for a zero extent and
    /// [`TensorError::UnsupportedRank`] above rank 6.
    pub fn zeros(shape: impl Into<Shape>) -> Result<Self, TensorError> {
        let shape = shape.into();
        shape.validate()?;
        let data = vec![0.0; shape.num_elements()];
        Self::from_parts(shape, data)
    }

    /// Creates a zero-filled tensor with the shape of `self`.
    pub fn zeros_like(&self) -> Self {
        self.with_data(vec![0.0; self.size()])
    }

    /// Creates a tensor from a row-major buffer.
    ///
    /// # Errors
    /// Same as [`Tensor::zeros`], plus [`TensorError::BufferSizeMismatch`] if
    /// `values.len()` differs from the element count of `shape`.
    pub fn from_flat(shape: impl Into<Shape>, values: Vec<f64>) -> Result<Self, TensorError> {
        let shape = shape.into();
        shape.validate()?;
        Self::from_parts(shape, values)
    }

    /// Creates a tensor filled with standard-normal samples.
    ///
    /// With `Some(seed)` the samples are reproducible; `None` seeds from the
    /// operating system.
    pub fn random_normal(shape: impl Into<Shape>, seed: Option<u64>) -> Result<Self, TensorError> {
        let shape = shape.into();
        shape.validate()?;
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let data = vector::randn(shape.num_elements(), &mut rng);
        Self::from_parts(shape, data)
    }

    /// A rank-0 tensor.
    pub fn scalar(value: f64) -> Self {
        Self {
            shape: Shape::scalar(),
            payload: Payload::Scalar(value),
        }
    }

    /// A rank-1 tensor.
    pub fn vector(values: Vec<f64>) -> Result<Self, TensorError> {
        Self::from_flat(Shape::vector(values.len()), values)
    }

    /// A rank-2 tensor from a row-major buffer.
    pub fn matrix(rows: usize, columns: usize, values: Vec<f64>) -> Result<Self, TensorError> {
        Self::from_flat(Shape::matrix(rows, columns), values)
    }

    /// Pairs a shape with a buffer. Zero extents are not rejected here so that
    /// internal transforms can share the path; public constructors validate.
    pub(crate) fn from_parts(shape: Shape, data: Vec<f64>) -> Result<Self, TensorError> {
        if shape.rank() > MAX_RANK {
            return Err(TensorError::UnsupportedRank {
                op: "construct",
                rank: shape.rank(),
            });
        }
        if data.len() != shape.num_elements() {
            return Err(TensorError::BufferSizeMismatch {
                expected: shape.num_elements(),
                actual: data.len(),
            });
        }
        let payload = Payload::from_dims(shape.dims(), data)?;
        Ok(Self { shape, payload })
    }

    /// Same shape, new contents. `data.len()` must equal `self.size()`.
    pub(crate) fn with_data(&self, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), self.size());
        Self {
            shape: self.shape.clone(),
            payload: self.payload.with_data(data),
        }
    }

    /// Applies `f` to every element.
    pub(crate) fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        self.with_data(vector::map(self.as_slice(), f))
    }

    // ── Accessors ──────────────────────────────────────────────

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    /// Total number of elements.
    pub fn size(&self) -> usize {
        self.shape.num_elements()
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Borrows the flat row-major contents.
    pub fn as_slice(&self) -> &[f64] {
        self.payload.as_slice()
    }

    /// Mutably borrows the flat row-major contents. The shape is unaffected.
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        self.payload.as_mut_slice()
    }

    /// Copies the contents into a flat vector.
    pub fn flatten(&self) -> Vec<f64> {
        self.as_slice().to_vec()
    }

    pub fn into_vec(self) -> Vec<f64> {
        match self.payload {
            Payload::Scalar(v) => vec![v],
            Payload::Vector(v) => v,
            Payload::Matrix(m) => m.into_vec(),
            Payload::Rank3(b) => b.into_vec(),
            Payload::Rank4(b) => b.into_vec(),
            Payload::Rank5(b) => b.into_vec(),
            Payload::Rank6(b) => b.into_vec(),
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self.payload {
            Payload::Scalar(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_matrix(&self) -> Option<&Matrix> {
        match &self.payload {
            Payload::Matrix(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_rank4(&self) -> Option<&Block<4>> {
        match &self.payload {
            Payload::Rank4(b) => Some(b),
            _ => None,
        }
    }

    /// Reads one element.
    ///
    /// # Errors
    /// Returns [`TensorError::IndexOutOfBounds`] if `index` has the wrong
    /// length or lies outside the shape.
    pub fn element_at(&self, index: &[usize]) -> Result<f64, TensorError> {
        let offset = self.checked_offset(index)?;
        Ok(self.as_slice()[offset])
    }

    /// Writes one element in place.
    pub fn assign(&mut self, value: f64, index: &[usize]) -> Result<(), TensorError> {
        let offset = self.checked_offset(index)?;
        self.as_mut_slice()[offset] = value;
        Ok(())
    }

    fn checked_offset(&self, index: &[usize]) -> Result<usize, TensorError> {
        self.shape
            .offset(index)
            .ok_or_else(|| TensorError::IndexOutOfBounds {
                index: index.to_vec(),
                shape: self.shape.clone(),
            })
    }

    /// `true` when both tensors have the same shape and identical elements.
    pub fn equal(&self, other: &Tensor) -> bool {
        self == other
    }

    pub fn not_equal(&self, other: &Tensor) -> bool {
        !self.equal(other)
    }

    pub fn is_same_shape(&self, other: &Tensor) -> bool {
        self.shape == other.shape
    }

    fn unsupported(&self, op: &'static str) -> TensorError {
        TensorError::UnsupportedRank {
            op,
            rank: self.rank(),
        }
    }

    // ── Reshaping ──────────────────────────────────────────────

    /// Reinterprets the elements with a new shape of equal element count.
    ///
    /// # Errors
    /// Returns [`TensorError::ShapeMismatch`] if the element counts differ.
    pub fn reshape(&self, shape: impl Into<Shape>) -> Result<Self, TensorError> {
        let shape = shape.into();
        shape.validate()?;
        if shape.num_elements() != self.size() {
            return Err(TensorError::ShapeMismatch {
                op: "reshape",
                lhs: self.shape.clone(),
                rhs: shape,
            });
        }
        Self::from_parts(shape, self.flatten())
    }

    /// Reshapes into a matrix; pass `None` for one side to infer it.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::Tensor;
    /// let t = Tensor::zeros([2, 2, 2, 2]).unwrap();
    /// let m = t.reshape_to_matrix(Some(2), None).unwrap();
    /// assert_eq!(m.shape().dims(), &[2, 8]);
    /// ```
    pub fn reshape_to_matrix(
        &self,
        rows: Option<usize>,
        columns: Option<usize>,
    ) -> Result<Self, TensorError> {
        let size = self.size();
        let infer = |known: usize| {
            if known == 0 || size % known != 0 {
                Err(TensorError::ShapeMismatch {
                    op: "reshape_to_matrix",
                    lhs: self.shape.clone(),
                    rhs: Shape::vector(known),
                })
            } else {
                Ok(size / known)
            }
        };
        let (rows, columns) = match (rows, columns) {
            (Some(r), Some(c)) => (r, c),
            (Some(r), None) => (r, infer(r)?),
            (None, Some(c)) => (infer(c)?, c),
            (None, None) => (1, size),
        };
        self.reshape(Shape::matrix(rows, columns))
    }

    pub fn reshape_to_rank4(
        &self,
        a: usize,
        b: usize,
        c: usize,
        d: usize,
    ) -> Result<Self, TensorError> {
        self.reshape([a, b, c, d])
    }

    pub fn reshape_to_rank5(
        &self,
        a: usize,
        b: usize,
        c: usize,
        d: usize,
        e: usize,
    ) -> Result<Self, TensorError> {
        self.reshape([a, b, c, d, e])
    }

    pub fn reshape_to_rank6(
        &self,
        a: usize,
        b: usize,
        c: usize,
        d: usize,
        e: usize,
        f: usize,
    ) -> Result<Self, TensorError> {
        self.reshape([a, b, c, d, e, f])
    }

    // ── Axis permutation ───────────────────────────────────────

    /// Permutes the axes: output axis `i` is input axis `perm[i]`.
    ///
    /// # Errors
    /// Returns [`TensorError::InvalidPermutation`] unless `perm` is a
    /// permutation of `0..rank`.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::Tensor;
    /// let t = Tensor::zeros([2, 3, 4]).unwrap();
    /// assert_eq!(t.transpose(&[2, 0, 1]).unwrap().shape().dims(), &[4, 2, 3]);
    /// ```
    pub fn transpose(&self, perm: &[usize]) -> Result<Self, TensorError> {
        let rank = self.rank();
        let mut seen = [false; MAX_RANK];
        let valid = perm.len() == rank
            && perm.iter().all(|&p| p < rank && !std::mem::replace(&mut seen[p], true));
        if !valid {
            return Err(TensorError::InvalidPermutation {
                perm: perm.to_vec(),
                rank,
            });
        }
        let (dims, data) = permute(self.shape.dims(), self.as_slice(), perm);
        Self::from_parts(Shape::new(dims), data)
    }

    /// Matrix transpose.
    pub fn t(&self) -> Result<Self, TensorError> {
        match &self.payload {
            Payload::Matrix(m) => Ok(m.t().into()),
            _ => Err(self.unsupported("t")),
        }
    }

    // ── Spatial windowing ──────────────────────────────────────

    /// Copies the `h × w` window at row `x`, column `y` out of every trailing
    /// plane (rank 2 and above).
    pub fn window(&self, x: usize, y: usize, h: usize, w: usize) -> Result<Self, TensorError> {
        if let Payload::Matrix(m) = &self.payload {
            return Ok(m.window(x, y, h, w)?.into());
        }
        for_blocks!(
            &self.payload,
            b => Ok(b.window(x, y, h, w)?.into()),
            _ => Err(self.unsupported("window"))
        )
    }

    /// Adds a `size`-wide zero border to every trailing plane (rank 2 and above).
    pub fn pad(&self, size: usize) -> Result<Self, TensorError> {
        if let Payload::Matrix(m) = &self.payload {
            return Ok(m.pad(size).into());
        }
        for_blocks!(&self.payload, b => Ok(b.pad(size).into()), _ => Err(self.unsupported("pad")))
    }

    /// Writes the rank-2 `block` into this rank-2 tensor at row `x`, column `y`.
    pub fn assign_window(&mut self, block: &Tensor, x: usize, y: usize) -> Result<(), TensorError> {
        let rank = self.rank();
        match (&mut self.payload, &block.payload) {
            (Payload::Matrix(dst), Payload::Matrix(src)) => dst.assign_window(src, x, y),
            (Payload::Matrix(_), _) => Err(block.unsupported("assign_window")),
            _ => Err(TensorError::UnsupportedRank {
                op: "assign_window",
                rank,
            }),
        }
    }

    // ── Slicing ────────────────────────────────────────────────

    /// Row `r` of a matrix as a vector.
    pub fn slice_row(&self, r: usize) -> Result<Self, TensorError> {
        let m = self.as_matrix().ok_or_else(|| self.unsupported("slice_row"))?;
        let row = m.row(r).ok_or_else(|| TensorError::IndexOutOfBounds {
            index: vec![r],
            shape: self.shape.clone(),
        })?;
        Self::vector(row.to_vec())
    }

    /// Column `c` of a matrix as a vector.
    pub fn slice_column(&self, c: usize) -> Result<Self, TensorError> {
        let m = self.as_matrix().ok_or_else(|| self.unsupported("slice_column"))?;
        let column = m.column(c).ok_or_else(|| TensorError::IndexOutOfBounds {
            index: vec![c],
            shape: self.shape.clone(),
        })?;
        Self::vector(column)
    }

    /// Fixes axes 2 and 3 of a rank-6 tensor at `(x, y)`.
    pub fn slice_6d_to_4d(&self, x: usize, y: usize) -> Result<Self, TensorError> {
        match &self.payload {
            Payload::Rank6(b) => Ok(b.slice_to_4d(x, y)?.into()),
            _ => Err(self.unsupported("slice_6d_to_4d")),
        }
    }

    // ── Convolution support ────────────────────────────────────

    /// Unrolls the filter patches of a rank-4 `(N, C, H, W)` tensor into the
    /// rows of a matrix. See [`crate::im2col`] for the layout.
    pub fn im2col(
        &self,
        fw: usize,
        fh: usize,
        stride: usize,
        pad: usize,
    ) -> Result<Self, TensorError> {
        let x = self.as_rank4().ok_or_else(|| self.unsupported("im2col"))?;
        Ok(window::im2col(x, fw, fh, stride, pad)?.into())
    }

    /// Scatters an im2col matrix back into a rank-4 tensor of `shape`.
    pub fn col2img(
        &self,
        shape: [usize; 4],
        fw: usize,
        fh: usize,
        stride: usize,
        pad: usize,
    ) -> Result<Self, TensorError> {
        let col = self.as_matrix().ok_or_else(|| self.unsupported("col2img"))?;
        Ok(window::col2img(col, shape, fw, fh, stride, pad)?.into())
    }
}

impl From<Matrix> for Tensor {
    fn from(m: Matrix) -> Self {
        Self {
            shape: m.shape(),
            payload: Payload::Matrix(m),
        }
    }
}

macro_rules! impl_from_block {
    ($($rank:literal => $variant:ident),* $(,)?) => {
        $(
            impl From<Block<$rank>> for Tensor {
                fn from(b: Block<$rank>) -> Self {
                    Self {
                        shape: b.shape(),
                        payload: Payload::$variant(b),
                    }
                }
            }
        )*
    };
}

impl_from_block!(3 => Rank3, 4 => Rank4, 5 => Rank5, 6 => Rank6);

/// Gathers `data` (with extents `dims`) into the axis order `perm`.
fn permute(dims: &[usize], data: &[f64], perm: &[usize]) -> (Vec<usize>, Vec<f64>) {
    let src_strides = Shape::from(dims).strides();
    let out_dims: Vec<usize> = perm.iter().map(|&p| dims[p]).collect();
    let strides: Vec<usize> = perm.iter().map(|&p| src_strides[p]).collect();

    let mut out = Vec::with_capacity(data.len());
    let mut index = vec![0usize; out_dims.len()];
    let mut offset = 0;
    for _ in 0..data.len() {
        out.push(data[offset]);
        for axis in (0..index.len()).rev() {
            index[axis] += 1;
            offset += strides[axis];
            if index[axis] < out_dims[axis] {
                break;
            }
            offset -= strides[axis] * out_dims[axis];
            index[axis] = 0;
        }
    }
    (out_dims, out)
}
