// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: analytic backward passes built from tensor-core
//! operations, cross-checked against the numerical oracle.
//!
//! The two-layer network is the classic affine → sigmoid → affine →
//! softmax-with-loss stack; the convolution test confirms that im2col plus a
//! single matrix multiply reproduces a direct convolution.

use approx::assert_abs_diff_eq;
use grad_check::{GradCheckConfig, GradientChecker, GradientReport};
use tensor_core::{add, cross_entropy_error, dot, mul, sub, Tensor};

// ── Helpers ────────────────────────────────────────────────────

#[derive(Clone)]
struct TwoLayerNet {
    w1: Tensor,
    b1: Tensor,
    w2: Tensor,
    b2: Tensor,
}

struct Gradients {
    w1: Tensor,
    b1: Tensor,
    w2: Tensor,
    b2: Tensor,
}

impl TwoLayerNet {
    fn new(input: usize, hidden: usize, output: usize, seed: u64) -> Self {
        let scale = 0.5;
        Self {
            w1: &Tensor::random_normal([input, hidden], Some(seed)).unwrap() * scale,
            b1: &Tensor::random_normal([hidden], Some(seed + 1)).unwrap() * scale,
            w2: &Tensor::random_normal([hidden, output], Some(seed + 2)).unwrap() * scale,
            b2: &Tensor::random_normal([output], Some(seed + 3)).unwrap() * scale,
        }
    }

    /// Returns `(hidden activations, softmax output)`.
    fn forward(&self, x: &Tensor) -> (Tensor, Tensor) {
        let z1 = add(&dot(x, &self.w1).unwrap(), &self.b1).unwrap().sigmoid();
        let y = add(&dot(&z1, &self.w2).unwrap(), &self.b2).unwrap().softmax();
        (z1, y)
    }

    fn loss(&self, x: &Tensor, t: &Tensor) -> f64 {
        let (_, y) = self.forward(x);
        cross_entropy_error(&y, t).unwrap()
    }

    fn gradient(&self, x: &Tensor, t: &Tensor) -> Gradients {
        let batch = x.shape().dims()[0] as f64;
        let (z1, y) = self.forward(x);

        let dy = &sub(&y, t).unwrap() / batch;
        let w2 = dot(&z1.t().unwrap(), &dy).unwrap();
        let b2 = column_sums(&dy);

        let dz1 = dot(&dy, &self.w2.t().unwrap()).unwrap();
        let sigmoid_grad = mul(&(&-&z1 + 1.0), &z1).unwrap();
        let da1 = mul(&dz1, &sigmoid_grad).unwrap();
        let w1 = dot(&x.t().unwrap(), &da1).unwrap();
        let b1 = column_sums(&da1);

        Gradients { w1, b1, w2, b2 }
    }
}

/// Sums a matrix over its rows into a vector.
fn column_sums(m: &Tensor) -> Tensor {
    let s = m.sum(0).unwrap();
    s.reshape([s.size()]).unwrap()
}

fn one_hot(labels: &[usize], classes: usize) -> Tensor {
    let mut t = Tensor::zeros([labels.len(), classes]).unwrap();
    for (row, &label) in labels.iter().enumerate() {
        t.assign(1.0, &[row, label]).unwrap();
    }
    t
}

fn with_values(like: &Tensor, values: &[f64]) -> Tensor {
    Tensor::from_flat(like.shape().clone(), values.to_vec()).unwrap()
}

// ── Two-layer network ──────────────────────────────────────────

#[test]
fn two_layer_net_backprop_matches_oracle() {
    let net = TwoLayerNet::new(4, 5, 3, 42);
    let x = Tensor::random_normal([6, 4], Some(7)).unwrap();
    let t = one_hot(&[0, 2, 1, 1, 0, 2], 3);
    let grads = net.gradient(&x, &t);

    let checker = GradientChecker::new(GradCheckConfig::default()).unwrap();
    let mut report = GradientReport::new();

    checker
        .check_into(
            &mut report,
            "W1",
            |v| TwoLayerNet { w1: with_values(&net.w1, v), ..net.clone() }.loss(&x, &t),
            &net.w1,
            &grads.w1,
        )
        .unwrap();
    checker
        .check_into(
            &mut report,
            "b1",
            |v| TwoLayerNet { b1: with_values(&net.b1, v), ..net.clone() }.loss(&x, &t),
            &net.b1,
            &grads.b1,
        )
        .unwrap();
    checker
        .check_into(
            &mut report,
            "W2",
            |v| TwoLayerNet { w2: with_values(&net.w2, v), ..net.clone() }.loss(&x, &t),
            &net.w2,
            &grads.w2,
        )
        .unwrap();
    checker
        .check_into(
            &mut report,
            "b2",
            |v| TwoLayerNet { b2: with_values(&net.b2, v), ..net.clone() }.loss(&x, &t),
            &net.b2,
            &grads.b2,
        )
        .unwrap();

    assert_eq!(report.checks.len(), 4);
    assert!(report.all_passed(), "{}", report.summary());
    assert!(report.worst().unwrap().max_abs_diff < 1e-5);

    let json = report.to_json().unwrap();
    assert!(json.contains("\"W1\""));
}

#[test]
fn broken_backprop_is_reported() {
    let net = TwoLayerNet::new(3, 4, 2, 9);
    let x = Tensor::random_normal([5, 3], Some(8)).unwrap();
    let t = one_hot(&[0, 1, 1, 0, 1], 2);
    let grads = net.gradient(&x, &t);
    // Forgetting to divide by the batch size scales the gradient by it.
    let wrong = &grads.w2 * 5.0;

    let check = GradientChecker::default()
        .check(
            "W2",
            |v| TwoLayerNet { w2: with_values(&net.w2, v), ..net.clone() }.loss(&x, &t),
            &net.w2,
            &wrong,
        )
        .unwrap();
    assert!(!check.passed);
}

// ── Convolution via im2col ─────────────────────────────────────

/// Direct `(N, C, H, W) ⊛ (FN, C, FH, FW)` convolution.
fn naive_conv(x: &Tensor, w: &Tensor, stride: usize, pad: usize) -> Tensor {
    let [n, c, h, wd] = [0, 1, 2, 3].map(|i| x.shape().dims()[i]);
    let [filters, _, fh, fw] = [0, 1, 2, 3].map(|i| w.shape().dims()[i]);
    let oh = (h + 2 * pad - fh) / stride + 1;
    let ow = (wd + 2 * pad - fw) / stride + 1;
    let padded = x.pad(pad).unwrap();

    let mut out = Tensor::zeros([n, filters, oh, ow]).unwrap();
    for ni in 0..n {
        for f in 0..filters {
            for oy in 0..oh {
                for ox in 0..ow {
                    let mut acc = 0.0;
                    for ci in 0..c {
                        for ky in 0..fh {
                            for kx in 0..fw {
                                let xv = padded
                                    .element_at(&[ni, ci, oy * stride + ky, ox * stride + kx])
                                    .unwrap();
                                acc += xv * w.element_at(&[f, ci, ky, kx]).unwrap();
                            }
                        }
                    }
                    out.assign(acc, &[ni, f, oy, ox]).unwrap();
                }
            }
        }
    }
    out
}

#[test]
fn convolution_by_im2col_matches_direct_convolution() {
    let (n, c, h, w) = (2, 3, 5, 5);
    let (fn_, fh, fw, stride, pad) = (4, 3, 3, 2, 1);
    let x = Tensor::random_normal([n, c, h, w], Some(21)).unwrap();
    let filters = Tensor::random_normal([fn_, c, fh, fw], Some(22)).unwrap();

    let oh = tensor_core::conv_output_size(h, fh, stride, pad).unwrap();
    let ow = tensor_core::conv_output_size(w, fw, stride, pad).unwrap();

    // im2col rows are (n, oy, ox, c); consecutive channel rows form one
    // receptive field of C·FH·FW values.
    let col = x
        .im2col(fw, fh, stride, pad)
        .unwrap()
        .reshape_to_matrix(Some(n * oh * ow), None)
        .unwrap();
    let bank = filters.reshape_to_matrix(Some(fn_), None).unwrap().t().unwrap();
    let out = dot(&col, &bank)
        .unwrap()
        .reshape([n, oh, ow, fn_])
        .unwrap()
        .transpose(&[0, 3, 1, 2])
        .unwrap();

    let expected = naive_conv(&x, &filters, stride, pad);
    assert_eq!(out.shape(), expected.shape());
    for (a, b) in out.as_slice().iter().zip(expected.as_slice()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-10);
    }
}

// ── Slice scatter ──────────────────────────────────────────────

#[test]
fn stride_slice_scatter_builds_region_gradient() {
    // loss = Σ region(x)²; its gradient is 2x on the region and 0 elsewhere.
    let x = Tensor::random_normal([2, 2, 4, 4], Some(31)).unwrap();

    let region = x.slice_t4d(1, 3, 0, 2).unwrap();
    let mut analytic = x.zeros_like();
    analytic
        .stride_slice(1, 3, 0, 2, 1)
        .unwrap()
        .add_assign(&(&region * 2.0))
        .unwrap();

    let shape = x.shape().clone();
    let check = GradientChecker::default()
        .check(
            "x",
            |v| {
                Tensor::from_flat(shape.clone(), v.to_vec())
                    .unwrap()
                    .slice_t4d(1, 3, 0, 2)
                    .unwrap()
                    .pow(2.0)
                    .sum_all()
            },
            &x,
            &analytic,
        )
        .unwrap();
    assert!(check.passed, "max diff {}", check.max_abs_diff);
    assert_eq!(analytic.element_at(&[1, 1, 0, 0]).unwrap(), 0.0);
}
