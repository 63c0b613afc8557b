// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for tensor operations.

use crate::Shape;

/// Errors that can occur during tensor construction and tensor operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TensorError {
    /// The provided buffer length does not match the element count of the shape.
    #[error("buffer size mismatch: expected {expected} elements, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// A zero-sized dimension was requested at construction time.
    #[error("degenerate shape {shape}: every dimension must be non-zero")]
    ZeroDimension { shape: Shape },

    /// The operation is not implemented for a tensor of this rank.
    #[error("{op} is not supported for rank {rank}")]
    UnsupportedRank { op: &'static str, rank: usize },

    /// Two tensors have incompatible shapes for the requested operation.
    #[error("incompatible shapes for {op}: {lhs} vs {rhs}")]
    ShapeMismatch {
        op: &'static str,
        lhs: Shape,
        rhs: Shape,
    },

    /// The requested axis does not exist for this rank.
    #[error("axis {axis} out of range for {op} on rank {rank}")]
    AxisOutOfRange {
        op: &'static str,
        axis: usize,
        rank: usize,
    },

    /// The axis permutation is not a permutation of `0..rank`.
    #[error("invalid permutation {perm:?} for rank {rank}")]
    InvalidPermutation { perm: Vec<usize>, rank: usize },

    /// A multi-index has the wrong length or lies outside the shape.
    #[error("index {index:?} out of bounds for shape {shape}")]
    IndexOutOfBounds { index: Vec<usize>, shape: Shape },

    /// Window, padding or stride geometry does not fit the tensor.
    #[error("invalid window for {op}: {detail}")]
    InvalidWindow { op: &'static str, detail: String },
}
