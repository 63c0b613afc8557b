// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runtime shapes for ranks 0 through 6.

use crate::TensorError;
use std::fmt;

/// Highest rank a [`crate::Tensor`] can carry.
pub const MAX_RANK: usize = 6;

/// The extents of a [`crate::Tensor`], outermost axis first.
///
/// `dims().len()` is the rank and decides which payload variant a tensor
/// holds. A shape is never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Wraps `dims` without checking them; the tensor constructors call
    /// [`Shape::validate`].
    ///
    /// # Examples
    /// ```
    /// use tensor_core::Shape;
    /// let s = Shape::new(vec![4, 1, 3]);
    /// assert_eq!(s.rank(), 3);
    /// assert_eq!(s.num_elements(), 12);
    /// ```
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    /// The rank-0 shape `[]`.
    pub fn scalar() -> Self {
        Self::new(Vec::new())
    }

    /// `[len]`.
    pub fn vector(len: usize) -> Self {
        Self::new(vec![len])
    }

    /// `[rows, columns]`.
    pub fn matrix(rows: usize, columns: usize) -> Self {
        Self::new(vec![rows, columns])
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Product of the extents; 1 for the scalar shape.
    pub fn num_elements(&self) -> usize {
        self.dims.iter().product()
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Checks the construction-time invariants: rank ≤ [`MAX_RANK`] and no
    /// zero-sized dimension.
    pub fn validate(&self) -> Result<(), TensorError> {
        if self.rank() > MAX_RANK {
            return Err(TensorError::UnsupportedRank {
                op: "construct",
                rank: self.rank(),
            });
        }
        if self.dims.contains(&0) {
            return Err(TensorError::ZeroDimension {
                shape: self.clone(),
            });
        }
        Ok(())
    }

    /// Row-major element strides, one per axis.
    ///
    /// The last axis has stride 1; each earlier axis steps over one full
    /// sub-block of the axes after it.
    pub fn strides(&self) -> Vec<usize> {
        let mut strides = vec![1usize; self.dims.len()];
        let mut step = 1;
        for (stride, &extent) in strides.iter_mut().zip(&self.dims).rev() {
            *stride = step;
            step *= extent;
        }
        strides
    }

    /// Maps a multi-index to its flat row-major offset.
    ///
    /// Returns `None` when the index has the wrong length or any coordinate
    /// lies outside its dimension.
    pub fn offset(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.dims.len() {
            return None;
        }
        let mut offset = 0;
        for (&i, &d) in index.iter().zip(&self.dims) {
            if i >= d {
                return None;
            }
            offset = offset * d + i;
        }
        Some(offset)
    }

    /// `true` when `self` is `[..., M, K]` (rank ≥ 2) and `rhs` is the
    /// matrix `[K, N]`.
    pub fn is_matmul_compatible(&self, rhs: &Shape) -> bool {
        match (self.dims.as_slice(), rhs.dims.as_slice()) {
            ([.., _, k], [k_rhs, _]) => k == k_rhs,
            _ => false,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        let mut axes = self.dims.iter();
        if let Some(first) = axes.next() {
            write!(f, "{first}")?;
            for d in axes {
                write!(f, ", {d}")?;
            }
        }
        f.write_str("]")
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self::new(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self::new(dims.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Self::new(dims.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_has_one_element() {
        let s = Shape::scalar();
        assert_eq!(s.rank(), 0);
        assert_eq!(s.num_elements(), 1);
        assert_eq!(s.strides(), Vec::<usize>::new());
        assert_eq!(s.to_string(), "[]");
    }

    #[test]
    fn test_strides_and_offset_agree() {
        let s = Shape::new(vec![2, 3, 4, 5]);
        assert_eq!(s.strides(), vec![60, 20, 5, 1]);
        let index = [1, 2, 3, 4];
        let by_strides: usize = index.iter().zip(s.strides()).map(|(i, st)| i * st).sum();
        assert_eq!(s.offset(&index), Some(by_strides));
        assert_eq!(s.offset(&[0, 0, 0, 0]), Some(0));
        assert_eq!(Shape::matrix(7, 2).strides(), vec![2, 1]);
    }

    #[test]
    fn test_offset_rejects_bad_indices() {
        let s = Shape::matrix(2, 2);
        assert_eq!(s.offset(&[2, 0]), None);
        assert_eq!(s.offset(&[0]), None);
        assert_eq!(s.offset(&[0, 0, 0]), None);
    }

    #[test]
    fn test_validate() {
        assert!(Shape::new(vec![2, 3, 4, 5, 6, 7]).validate().is_ok());
        assert!(matches!(
            Shape::new(vec![1; 7]).validate(),
            Err(TensorError::UnsupportedRank { rank: 7, .. })
        ));
        assert!(matches!(
            Shape::matrix(3, 0).validate(),
            Err(TensorError::ZeroDimension { .. })
        ));
    }

    #[test]
    fn test_matmul_compatibility() {
        let rhs = Shape::matrix(4, 5);
        assert!(Shape::matrix(3, 4).is_matmul_compatible(&rhs));
        assert!(Shape::new(vec![2, 2, 3, 4]).is_matmul_compatible(&rhs));
        assert!(!Shape::vector(4).is_matmul_compatible(&rhs));
        assert!(!Shape::matrix(3, 5).is_matmul_compatible(&rhs));
        assert!(!Shape::matrix(3, 4).is_matmul_compatible(&Shape::new(vec![1, 4, 5])));
    }

    #[test]
    fn test_display_and_conversions() {
        let from_array: Shape = [6, 1, 2].into();
        let from_vec: Shape = vec![6, 1, 2].into();
        let from_slice: Shape = (&[6, 1, 2][..]).into();
        assert_eq!(from_array, from_vec);
        assert_eq!(from_vec, from_slice);
        assert_eq!(format!("{from_array}"), "[6, 1, 2]");
    }
}
