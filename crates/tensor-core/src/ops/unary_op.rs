// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Element-wise unary maps. Every rank is supported and the shape is kept.

use crate::{vector, Tensor};

impl Tensor {
    pub fn exp(&self) -> Tensor {
        self.map(f64::exp)
    }

    /// Natural logarithm.
    pub fn log(&self) -> Tensor {
        self.map(f64::ln)
    }

    pub fn sqrt(&self) -> Tensor {
        self.map(f64::sqrt)
    }

    /// Raises every element to the power `p`.
    pub fn pow(&self, p: f64) -> Tensor {
        self.map(|x| x.powf(p))
    }

    pub fn abs(&self) -> Tensor {
        self.map(f64::abs)
    }

    /// Logistic sigmoid `1 / (1 + e^-x)`.
    pub fn sigmoid(&self) -> Tensor {
        self.map(vector::sigmoid)
    }

    /// `max(x, 0)`.
    pub fn relu(&self) -> Tensor {
        self.map(vector::relu)
    }
}
