//! Stride, padding and dilation arguments.
//!
//! Each argument is given either as one value broadcast to every spatial
//! dimension or as one value per dimension. Both forms normalize to the same
//! fixed-size array at the canonical rank, with neutral values (stride and
//! dilation 1, padding 0) on the singleton axes added by the rank adapter.

use crate::error::{invalid_argument, Result};
use crate::SPATIAL_AXES;

/// A per-dimension window argument such as stride or dilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Spatial {
    /// Same value along every spatial dimension.
    Scalar(usize),
    /// One value per spatial dimension, outermost first.
    PerDim(Vec<usize>),
}

impl Spatial {
    pub(crate) fn normalize(&self, name: &'static str, rank: usize) -> Result<[usize; SPATIAL_AXES]> {
        let values = match self {
            Spatial::Scalar(v) => vec![*v; rank],
            Spatial::PerDim(v) => {
                if v.len() != rank {
                    return Err(invalid_argument(
                        name,
                        format!("expected {} values for {}D input, got {}", rank, rank, v.len()),
                    ));
                }
                v.clone()
            }
        };
        if values.contains(&0) {
            return Err(invalid_argument(name, format!("must be positive, got {:?}", values)));
        }
        let mut lifted = [1; SPATIAL_AXES];
        lifted[..rank].copy_from_slice(&values);
        Ok(lifted)
    }
}

impl From<usize> for Spatial {
    fn from(v: usize) -> Self {
        Spatial::Scalar(v)
    }
}

impl From<Vec<usize>> for Spatial {
    fn from(v: Vec<usize>) -> Self {
        Spatial::PerDim(v)
    }
}

impl From<&[usize]> for Spatial {
    fn from(v: &[usize]) -> Self {
        Spatial::PerDim(v.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Spatial {
    fn from(v: [usize; N]) -> Self {
        Spatial::PerDim(v.to_vec())
    }
}

/// Zero padding applied around the spatial dimensions of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Padding {
    /// Pads so that a stride-1 window sweep keeps the input size. An odd
    /// total puts the extra element on the low side.
    Same,
    /// Same amount on both sides of every dimension.
    Uniform(usize),
    /// One symmetric amount per dimension.
    PerDim(Vec<usize>),
    /// `(low, high)` pairs per dimension, flattened as
    /// `[low_1, high_1, low_2, high_2, ...]`.
    Asymmetric(Vec<usize>),
}

impl Padding {
    pub(crate) fn normalize(
        &self,
        rank: usize,
        kernel: &[usize; SPATIAL_AXES],
        dilation: &[usize; SPATIAL_AXES],
    ) -> Result<[(usize, usize); SPATIAL_AXES]> {
        let mut lifted = [(0, 0); SPATIAL_AXES];
        match self {
            Padding::Same => {
                for i in 0..rank {
                    let total = dilation[i] * (kernel[i] - 1);
                    lifted[i] = ((total + 1) / 2, total / 2);
                }
            }
            Padding::Uniform(p) => {
                for pad in lifted.iter_mut().take(rank) {
                    *pad = (*p, *p);
                }
            }
            Padding::PerDim(v) => {
                if v.len() != rank {
                    return Err(invalid_argument(
                        "padding",
                        format!("expected {} values for {}D input, got {}", rank, rank, v.len()),
                    ));
                }
                for (pad, &p) in lifted.iter_mut().zip(v) {
                    *pad = (p, p);
                }
            }
            Padding::Asymmetric(v) => {
                if v.len() != 2 * rank {
                    return Err(invalid_argument(
                        "padding",
                        format!(
                            "expected {} low/high values for {}D input, got {}",
                            2 * rank,
                            rank,
                            v.len()
                        ),
                    ));
                }
                for (pad, pair) in lifted.iter_mut().zip(v.chunks(2)) {
                    *pad = (pair[0], pair[1]);
                }
            }
        }
        Ok(lifted)
    }
}

impl Default for Padding {
    fn default() -> Self {
        Padding::Uniform(0)
    }
}

impl From<usize> for Padding {
    fn from(p: usize) -> Self {
        Padding::Uniform(p)
    }
}

impl From<Vec<usize>> for Padding {
    fn from(v: Vec<usize>) -> Self {
        Padding::PerDim(v)
    }
}

impl<const N: usize> From<[usize; N]> for Padding {
    fn from(v: [usize; N]) -> Self {
        Padding::PerDim(v.to_vec())
    }
}

/// Window parameters shared by [`unfold`](crate::unfold()) and
/// [`fold`](crate::fold()).
///
/// ```
/// use unfold_rs::{Padding, WindowOptions};
///
/// let options = WindowOptions::new()
///     .stride([2, 1])
///     .padding(Padding::Same)
///     .dilation(2);
/// assert!(!options.flipped);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowOptions {
    pub stride: Spatial,
    pub padding: Padding,
    pub dilation: Spatial,
    /// Reverse the kernel-spatial order inside every window (convolution
    /// instead of cross-correlation).
    pub flipped: bool,
}

impl Default for WindowOptions {
    fn default() -> Self {
        WindowOptions {
            stride: Spatial::Scalar(1),
            padding: Padding::Uniform(0),
            dilation: Spatial::Scalar(1),
            flipped: false,
        }
    }
}

impl WindowOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stride(mut self, stride: impl Into<Spatial>) -> Self {
        self.stride = stride.into();
        self
    }

    pub fn padding(mut self, padding: impl Into<Padding>) -> Self {
        self.padding = padding.into();
        self
    }

    pub fn dilation(mut self, dilation: impl Into<Spatial>) -> Self {
        self.dilation = dilation.into();
        self
    }

    pub fn flipped(mut self, flipped: bool) -> Self {
        self.flipped = flipped;
        self
    }
}
