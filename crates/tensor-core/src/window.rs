// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Spatial windowing, zero padding and the im2col/col2img transforms.
//!
//! Every routine here works on the trailing `(rows, columns)` plane of a
//! row-major buffer. Window offsets are `(x, y)` = (row, column) of the
//! top-left corner.
//!
//! # Im2Col layout
//! For an `(N, C, H, W)` input and an `fh × fw` filter, the column matrix has
//! one row per `(n, oy, ox, c)` in that nesting order, each row holding the
//! row-major patch of the zero-padded plane:
//!
//! ```text
//! rows    = N · OH · OW · C        OH = (H + 2·pad − fh) / stride + 1
//! columns = fh · fw                OW = (W + 2·pad − fw) / stride + 1
//! ```

use crate::{Block, Matrix, Shape, TensorError};

/// Checks that an `h × w` window at `(x, y)` lies inside a `rows × cols` plane.
pub(crate) fn check_window(
    op: &'static str,
    rows: usize,
    cols: usize,
    x: usize,
    y: usize,
    h: usize,
    w: usize,
) -> Result<(), TensorError> {
    if h == 0 || w == 0 {
        return Err(TensorError::InvalidWindow {
            op,
            detail: format!("empty {h}x{w} window"),
        });
    }
    if x + h > rows || y + w > cols {
        return Err(TensorError::InvalidWindow {
            op,
            detail: format!("{h}x{w} window at ({x}, {y}) exceeds {rows}x{cols} plane"),
        });
    }
    Ok(())
}

/// Appends the `h × w` block at `(x, y)` of a plane with `cols` columns.
pub(crate) fn window_plane(
    src: &[f64],
    cols: usize,
    x: usize,
    y: usize,
    h: usize,
    w: usize,
    out: &mut Vec<f64>,
) {
    for r in x..x + h {
        out.extend_from_slice(&src[r * cols + y..r * cols + y + w]);
    }
}

/// Appends a copy of a `rows × cols` plane with a `size`-wide zero border.
pub(crate) fn pad_plane(src: &[f64], rows: usize, cols: usize, size: usize, out: &mut Vec<f64>) {
    let padded_cols = cols + 2 * size;
    out.reserve((rows + 2 * size) * padded_cols);
    out.extend(std::iter::repeat(0.0).take(size * padded_cols));
    for r in 0..rows {
        out.extend(std::iter::repeat(0.0).take(size));
        out.extend_from_slice(&src[r * cols..(r + 1) * cols]);
        out.extend(std::iter::repeat(0.0).take(size));
    }
    out.extend(std::iter::repeat(0.0).take(size * padded_cols));
}

/// Number of filter positions along one axis.
///
/// # Errors
/// Returns [`TensorError::InvalidWindow`] if `stride` is zero, the filter is
/// empty or larger than the padded extent, or the stride does not divide
/// `extent + 2·pad − filter`.
///
/// # Examples
/// ```
/// use tensor_core::conv_output_size;
/// assert_eq!(conv_output_size(28, 5, 1, 2).unwrap(), 28);
/// assert_eq!(conv_output_size(4, 2, 2, 0).unwrap(), 2);
/// assert!(conv_output_size(5, 2, 2, 0).is_err());
/// ```
pub fn conv_output_size(
    extent: usize,
    filter: usize,
    stride: usize,
    pad: usize,
) -> Result<usize, TensorError> {
    let padded = extent + 2 * pad;
    if stride == 0 || filter == 0 || filter > padded {
        return Err(TensorError::InvalidWindow {
            op: "conv_output_size",
            detail: format!(
                "filter {filter} with stride {stride} does not fit padded extent {padded}"
            ),
        });
    }
    if (padded - filter) % stride != 0 {
        return Err(TensorError::InvalidWindow {
            op: "conv_output_size",
            detail: format!(
                "stride {stride} does not divide padded extent {padded} minus filter {filter}"
            ),
        });
    }
    Ok((padded - filter) / stride + 1)
}

/// Resolved geometry of one im2col/col2img sweep.
#[derive(Debug, Clone, Copy)]
struct Sweep {
    n: usize,
    c: usize,
    h: usize,
    w: usize,
    fh: usize,
    fw: usize,
    stride: usize,
    pad: usize,
    oh: usize,
    ow: usize,
}

impl Sweep {
    fn new(
        dims: [usize; 4],
        fw: usize,
        fh: usize,
        stride: usize,
        pad: usize,
    ) -> Result<Self, TensorError> {
        Shape::from(dims).validate()?;
        let [n, c, h, w] = dims;
        Ok(Self {
            n,
            c,
            h,
            w,
            fh,
            fw,
            stride,
            pad,
            oh: conv_output_size(h, fh, stride, pad)?,
            ow: conv_output_size(w, fw, stride, pad)?,
        })
    }

    fn col_rows(&self) -> usize {
        self.n * self.oh * self.ow * self.c
    }

    fn col_columns(&self) -> usize {
        self.fh * self.fw
    }

    /// Maps a padded-plane coordinate back to the unpadded plane.
    #[inline]
    fn source(&self, r: usize, col: usize) -> Option<usize> {
        let inside =
            r >= self.pad && r < self.h + self.pad && col >= self.pad && col < self.w + self.pad;
        inside.then(|| (r - self.pad) * self.w + (col - self.pad))
    }

    /// Calls `visit(row, plane_offset, oy * ow + ox)` in column-matrix row order.
    fn for_each_patch(&self, mut visit: impl FnMut(usize, usize, usize)) {
        let plane = self.h * self.w;
        let mut row = 0;
        for n in 0..self.n {
            for oy in 0..self.oh {
                for ox in 0..self.ow {
                    for c in 0..self.c {
                        visit(row, (n * self.c + c) * plane, oy * self.ow + ox);
                        row += 1;
                    }
                }
            }
        }
    }
}

/// Unrolls every filter patch of a rank-4 `(N, C, H, W)` block into matrix rows.
///
/// See the module documentation for the row ordering.
pub fn im2col(
    input: &Block<4>,
    fw: usize,
    fh: usize,
    stride: usize,
    pad: usize,
) -> Result<Matrix, TensorError> {
    let sweep = Sweep::new(input.dims(), fw, fh, stride, pad)?;
    tracing::trace!(
        dims = ?input.dims(),
        fw,
        fh,
        stride,
        pad,
        rows = sweep.col_rows(),
        "im2col"
    );

    let src = input.as_slice();
    let mut out = Vec::with_capacity(sweep.col_rows() * sweep.col_columns());
    sweep.for_each_patch(|_, plane_offset, position| {
        let oy = position / sweep.ow;
        let ox = position % sweep.ow;
        for ky in 0..sweep.fh {
            for kx in 0..sweep.fw {
                let value = sweep
                    .source(oy * sweep.stride + ky, ox * sweep.stride + kx)
                    .map_or(0.0, |i| src[plane_offset + i]);
                out.push(value);
            }
        }
    });
    Ok(Matrix::from_vec(sweep.col_rows(), sweep.col_columns(), out))
}

/// Scatters a column matrix produced by [`im2col`] back into an
/// `(N, C, H, W)` block, summing overlapping patches and dropping the
/// padding border.
///
/// # Errors
/// Returns [`TensorError::ShapeMismatch`] if `col` does not have the extents
/// [`im2col`] would produce for `dims`, [`TensorError::ZeroDimension`] for a
/// zero extent in `dims`, or [`TensorError::InvalidWindow`] for invalid
/// filter geometry.
pub fn col2img(
    col: &Matrix,
    dims: [usize; 4],
    fw: usize,
    fh: usize,
    stride: usize,
    pad: usize,
) -> Result<Block<4>, TensorError> {
    let sweep = Sweep::new(dims, fw, fh, stride, pad)?;
    if col.dims() != (sweep.col_rows(), sweep.col_columns()) {
        return Err(TensorError::ShapeMismatch {
            op: "col2img",
            lhs: col.shape(),
            rhs: Shape::matrix(sweep.col_rows(), sweep.col_columns()),
        });
    }
    tracing::trace!(?dims, fw, fh, stride, pad, "col2img");

    let mut img = Block::<4>::zeros(dims);
    let cols = col.columns();
    let src = col.as_slice();
    let dst = img.as_mut_slice();
    sweep.for_each_patch(|row, plane_offset, position| {
        let oy = position / sweep.ow;
        let ox = position % sweep.ow;
        let patch = &src[row * cols..(row + 1) * cols];
        for ky in 0..sweep.fh {
            for kx in 0..sweep.fw {
                if let Some(i) = sweep.source(oy * sweep.stride + ky, ox * sweep.stride + kx) {
                    dst[plane_offset + i] += patch[ky * sweep.fw + kx];
                }
            }
        }
    });
    Ok(img)
}
