// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Broadcast element-wise arithmetic.
//!
//! A binary operation between tensors of different rank is reduced to a small
//! set of base cases by splitting the higher-rank operand into its children
//! until both sides are matrices or one side is a scalar or vector:
//!
//! | lhs × rhs          | rule                                              |
//! |--------------------|---------------------------------------------------|
//! | scalar × any       | replicate the scalar                              |
//! | vector × vector    | equal length                                      |
//! | vector × matrix    | `len == cols` per row, else `len == rows` per column |
//! | matrix × matrix    | each extent equal or 1; result is one operand's shape |
//! | rank ≥ 3 × lower   | broadcast the lower operand across every child, whose shape is kept |
//! | rank k × rank k    | leading extents equal; children are paired        |
//!
//! Operand order is preserved, so `Sub` and `Div` are not commuted.

use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::{Shape, Tensor, TensorError};

/// The four broadcastable binary operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arithmetic {
    Add,
    Sub,
    Mul,
    Div,
}

impl Arithmetic {
    #[inline]
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            Arithmetic::Add => a + b,
            Arithmetic::Sub => a - b,
            Arithmetic::Mul => a * b,
            Arithmetic::Div => a / b,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Arithmetic::Add => "add",
            Arithmetic::Sub => "sub",
            Arithmetic::Mul => "mul",
            Arithmetic::Div => "div",
        }
    }
}

/// A borrowed flat buffer with its extents.
#[derive(Clone, Copy)]
struct Operand<'a> {
    dims: &'a [usize],
    data: &'a [f64],
}

impl<'a> Operand<'a> {
    fn of(t: &'a Tensor) -> Self {
        Self {
            dims: t.shape().dims(),
            data: t.as_slice(),
        }
    }

    fn rank(&self) -> usize {
        self.dims.len()
    }

    fn children(self) -> impl Iterator<Item = Operand<'a>> {
        let dims = &self.dims[1..];
        let len = dims.iter().product::<usize>();
        self.data.chunks(len).map(move |data| Operand { dims, data })
    }

    /// Element `(r, c)` of a matrix operand, replicating unit extents.
    #[inline]
    fn at(&self, r: usize, c: usize) -> f64 {
        let (rows, cols) = (self.dims[0], self.dims[1]);
        let r = if rows == 1 { 0 } else { r };
        let c = if cols == 1 { 0 } else { c };
        self.data[r * cols + c]
    }
}

/// Shape of `a ∘ b`, or `None` if no broadcast rule covers the pair.
fn result_dims(a: &[usize], b: &[usize]) -> Option<Vec<usize>> {
    match (a.len(), b.len()) {
        (0, _) => Some(b.to_vec()),
        (_, 0) => Some(a.to_vec()),
        (1, 1) => (a == b).then(|| a.to_vec()),
        (1, 2) => vector_fits(a[0], b).then(|| b.to_vec()),
        (2, 1) => vector_fits(b[0], a).then(|| a.to_vec()),
        (2, 2) => {
            let mut out = Vec::with_capacity(2);
            for (&x, &y) in a.iter().zip(b) {
                if x != y && x != 1 && y != 1 {
                    return None;
                }
                out.push(x.max(y));
            }
            (out == a || out == b).then_some(out)
        }
        (ra, rb) if ra == rb => {
            if a[0] != b[0] {
                return None;
            }
            let child = result_dims(&a[1..], &b[1..])?;
            Some(prepend(a[0], child))
        }
        // The lower operand may not grow the children it is spread across.
        (ra, rb) if ra > rb => {
            let child = result_dims(&a[1..], b)?;
            (child == a[1..]).then(|| prepend(a[0], child))
        }
        _ => {
            let child = result_dims(a, &b[1..])?;
            (child == b[1..]).then(|| prepend(b[0], child))
        }
    }
}

fn vector_fits(len: usize, matrix: &[usize]) -> bool {
    len == matrix[1] || len == matrix[0]
}

fn prepend(head: usize, mut tail: Vec<usize>) -> Vec<usize> {
    tail.insert(0, head);
    tail
}

/// Appends `a ∘ b` to `out` in row-major order. The pair must already have
/// been accepted by [`result_dims`].
fn fill(op: Arithmetic, a: Operand<'_>, b: Operand<'_>, out: &mut Vec<f64>) {
    match (a.rank(), b.rank()) {
        (0, _) => {
            let x = a.data[0];
            out.extend(b.data.iter().map(|&y| op.apply(x, y)));
        }
        (_, 0) => {
            let y = b.data[0];
            out.extend(a.data.iter().map(|&x| op.apply(x, y)));
        }
        (1, 1) => out.extend(a.data.iter().zip(b.data).map(|(&x, &y)| op.apply(x, y))),
        (1, 2) => vector_matrix(b, a.data, |v, m| op.apply(v, m), out),
        (2, 1) => vector_matrix(a, b.data, |v, m| op.apply(m, v), out),
        (2, 2) => {
            let rows = a.dims[0].max(b.dims[0]);
            let cols = a.dims[1].max(b.dims[1]);
            for r in 0..rows {
                for c in 0..cols {
                    out.push(op.apply(a.at(r, c), b.at(r, c)));
                }
            }
        }
        (ra, rb) if ra == rb => {
            for (ca, cb) in a.children().zip(b.children()) {
                fill(op, ca, cb, out);
            }
        }
        (ra, rb) if ra > rb => {
            for ca in a.children() {
                fill(op, ca, b, out);
            }
        }
        _ => {
            for cb in b.children() {
                fill(op, a, cb, out);
            }
        }
    }
}

/// Replicates `v` per row when it spans the columns, otherwise per column.
/// `f` receives `(vector element, matrix element)`.
fn vector_matrix(m: Operand<'_>, v: &[f64], f: impl Fn(f64, f64) -> f64, out: &mut Vec<f64>) {
    let (rows, cols) = (m.dims[0], m.dims[1]);
    let per_row = v.len() == cols;
    for r in 0..rows {
        for c in 0..cols {
            let x = if per_row { v[c] } else { v[r] };
            out.push(f(x, m.data[r * cols + c]));
        }
    }
}

/// Applies `op` to `lhs` and `rhs` under the broadcast rules of this module.
///
/// # Errors
/// Returns [`TensorError::ShapeMismatch`] carrying both top-level shapes when
/// the pair is not covered by a broadcast rule.
pub fn broadcast(op: Arithmetic, lhs: &Tensor, rhs: &Tensor) -> Result<Tensor, TensorError> {
    let (a, b) = (Operand::of(lhs), Operand::of(rhs));
    let dims = result_dims(a.dims, b.dims).ok_or_else(|| TensorError::ShapeMismatch {
        op: op.name(),
        lhs: lhs.shape().clone(),
        rhs: rhs.shape().clone(),
    })?;
    let mut out = Vec::with_capacity(dims.iter().product());
    fill(op, a, b, &mut out);
    Tensor::from_parts(Shape::new(dims), out)
}

/// Broadcast `lhs + rhs`.
pub fn add(lhs: &Tensor, rhs: &Tensor) -> Result<Tensor, TensorError> {
    broadcast(Arithmetic::Add, lhs, rhs)
}

/// Broadcast `lhs - rhs`.
pub fn sub(lhs: &Tensor, rhs: &Tensor) -> Result<Tensor, TensorError> {
    broadcast(Arithmetic::Sub, lhs, rhs)
}

/// Broadcast `lhs * rhs` (element-wise, not the matrix product).
pub fn mul(lhs: &Tensor, rhs: &Tensor) -> Result<Tensor, TensorError> {
    broadcast(Arithmetic::Mul, lhs, rhs)
}

/// Broadcast `lhs / rhs`.
pub fn div(lhs: &Tensor, rhs: &Tensor) -> Result<Tensor, TensorError> {
    broadcast(Arithmetic::Div, lhs, rhs)
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $op:expr) => {
        /// # Panics
        /// Panics with the [`TensorError`] message if the shapes cannot be
        /// broadcast together. Use [`broadcast`] to handle the error instead.
        impl $trait<&Tensor> for &Tensor {
            type Output = Tensor;

            fn $method(self, rhs: &Tensor) -> Tensor {
                broadcast($op, self, rhs).unwrap_or_else(|e| panic!("{e}"))
            }
        }

        impl $trait<f64> for &Tensor {
            type Output = Tensor;

            fn $method(self, rhs: f64) -> Tensor {
                self.map(|x| $op.apply(x, rhs))
            }
        }
    };
}

impl_binary_op!(Add, add, Arithmetic::Add);
impl_binary_op!(Sub, sub, Arithmetic::Sub);
impl_binary_op!(Mul, mul, Arithmetic::Mul);
impl_binary_op!(Div, div, Arithmetic::Div);

impl Neg for &Tensor {
    type Output = Tensor;

    fn neg(self) -> Tensor {
        self.map(|x| -x)
    }
}
