// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Rank-0 through rank-6 `f64` tensors for a from-scratch neural-network
//! trainer.
//!
//! This crate provides:
//! - [`Tensor`]: the rank-polymorphic value type, dispatching on its
//!   [`Payload`] variant.
//! - [`Shape`]: runtime shape descriptors.
//! - [`Matrix`] and [`Block`]: the flat row-major rank-2 and rank-3..6
//!   containers.
//! - Broadcast arithmetic ([`add`], [`sub`], [`mul`], [`div`] and the
//!   `std::ops` operators), reductions, unary maps, [`softmax`],
//!   [`cross_entropy_error`] and [`dot`].
//! - Spatial windowing, padding, [`im2col`] and [`col2img`].
//! - [`Tensor4DSlice`], a strided scatter view used by backward passes.
//! - [`numerical_gradient`], a central-difference gradient oracle.
//!
//! # Design Goals
//! - One contiguous buffer per tensor; nested indices are computed, not chased.
//! - Shape errors are values ([`TensorError`]); the operators are the
//!   fail-fast alternative.
//! - Clean error types via `thiserror`.

mod block;
mod error;
mod gradient;
mod matrix;
pub mod ops;
mod shape;
mod slice;
mod tensor;
pub mod vector;
mod window;

pub use block::Block;
pub use error::TensorError;
pub use gradient::{numerical_gradient, numerical_gradient_with_step, NUMERICAL_STEP};
pub use matrix::Matrix;
pub use ops::{add, broadcast, cross_entropy_error, div, dot, mul, softmax, sub, Arithmetic};
pub use shape::{Shape, MAX_RANK};
pub use slice::{add_assign, Tensor4DSlice};
pub use tensor::{Payload, Tensor};
pub use window::{col2img, conv_output_size, im2col};
