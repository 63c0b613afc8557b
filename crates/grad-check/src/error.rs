// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for gradient checking.

use tensor_core::Shape;

/// Errors that can occur while checking or reporting gradients.
#[derive(Debug, thiserror::Error)]
pub enum GradCheckError {
    /// A tensor operation failed while evaluating the loss.
    #[error("tensor error: {0}")]
    Tensor(#[from] tensor_core::TensorError),

    /// The analytic gradient does not have the parameter's shape.
    #[error("gradient for '{param}' has shape {analytic}, expected {numeric}")]
    ShapeMismatch {
        param: String,
        analytic: Shape,
        numeric: Shape,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// The report could not be serialised.
    #[error("serialisation error: {0}")]
    Serialization(String),
}
