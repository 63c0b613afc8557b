// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor arithmetic operations.
//!
//! Every operation allocates and returns a fresh tensor. Binary operations
//! follow the broadcast rules documented in [`arith`]; reductions and unary
//! maps are provided as inherent methods on [`crate::Tensor`].

pub mod arith;
mod loss_op;
mod matmul_op;
mod reduce_op;
mod softmax_op;
mod unary_op;

pub use arith::{add, broadcast, div, mul, sub, Arithmetic};
pub use loss_op::cross_entropy_error;
pub use matmul_op::dot;
pub(crate) use matmul_op::matmul_f64_generic;
pub use softmax_op::softmax;
