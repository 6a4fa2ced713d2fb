//! This package provides `unfold` and `fold`, the sliding-window extraction
//! (`im2col`) and scatter-accumulation (`col2im`) primitives behind
//! convolution-like layers, together with their gradient rules.
//! Input and output are in the form of ndarrays.
//!
//! Tensors are laid out as `(batch, channels, s1[, s2[, s3]])`, so 1D, 2D and
//! 3D spatial data are all supported through one implementation. Windows are
//! returned as a `(batch, num_windows, window_size)` array, where
//! `window_size = channels * prod(kernel_size)`. The batch elements are
//! processed in parallel.
//!
//! `fold` is the adjoint of `unfold`: overlapping windows are summed, so
//! `fold(unfold(x))` multiplies every position of `x` by the number of
//! windows covering it. Dividing by [`divisor`] recovers `x` wherever that
//! number is not zero.
//!
//! Example:
//! ```
//! use approx::assert_abs_diff_eq;
//! use ndarray::*;
//! use unfold_rs::{divisor, fold_with, unfold_with, DenseConvDims, WindowOptions};
//!
//! // Input has shape (batch, channels, height, width)
//! let input = Array::from_shape_vec(
//!     (1, 1, 4, 4),
//!     vec![1.,2.,3.,4.,5.,6.,7.,8.,9.,10.,11.,12.,13.,14.,15.,16.]
//! )
//! .unwrap();
//!
//! let dims = DenseConvDims::new(input.shape(), &[2, 2], &WindowOptions::default()).unwrap();
//! let windows = unfold_with(&input, &dims).unwrap();
//! assert_eq!(windows.shape(), &[1, 9, 4]);
//!
//! let summed = fold_with(&windows, &dims).unwrap();
//! let recovered = summed / divisor::<f64>(input.shape(), &dims).unwrap();
//! assert_abs_diff_eq!(recovered, input.into_dyn(), epsilon = 1e-12);
//! ```

use std::ops::AddAssign;

use num_traits::Zero;

mod dims;
mod error;
mod fold;
mod grad;
mod kernels;
mod options;
mod rank;
mod unfold;

pub use crate::dims::DenseConvDims;
pub use crate::error::{Result, UnfoldError};
pub use crate::fold::{divisor, fold, fold_into, fold_with};
pub use crate::grad::{
    fold_backward, fold_with_pullback, unfold_backward, unfold_with_pullback, FoldPullback,
    UnfoldPullback,
};
pub use crate::options::{Padding, Spatial, WindowOptions};
pub use crate::unfold::{unfold, unfold_into, unfold_with};

/// Number of spatial axes every tensor is lifted to internally.
pub(crate) const SPATIAL_AXES: usize = 3;

/// Element types unfold and fold can move around. Only zero and addition are
/// needed, so integer tensors work as well as floating point ones.
pub trait Element: Copy + Zero + AddAssign + Send + Sync + 'static {}

impl<T> Element for T where T: Copy + Zero + AddAssign + Send + Sync + 'static {}
