// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # grad-check
//!
//! Validates hand-written backward passes against the central-difference
//! oracle in `tensor-core`.
//!
//! A [`GradientChecker`] is built from a [`GradCheckConfig`] (step size and
//! tolerance, loadable from TOML), compares each parameter's analytic
//! gradient with [`tensor_core::numerical_gradient_with_step`], and yields a
//! [`ParamCheck`]. A [`GradientReport`] collects the checks and renders them
//! as a summary line or JSON.

pub mod checker;
pub mod config;
pub mod error;
pub mod report;

pub use checker::GradientChecker;
pub use config::GradCheckConfig;
pub use error::GradCheckError;
pub use report::{GradientReport, ParamCheck};
