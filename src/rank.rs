//! Rank adapter between user tensors and the canonical rank.
//!
//! The windowing kernels only know `(batch, channels, s1, s2, s3)`. Lower
//! rank tensors get singleton spatial axes appended, which turns them into
//! the equivalent 3D problem without copying; results are squeezed back.

use ndarray::{ArrayBase, Axis, Dimension, Ix5, IxDyn, RawData};

use crate::error::{invalid_argument, Result};
use crate::SPATIAL_AXES;

const CANONICAL_NDIM: usize = SPATIAL_AXES + 2;

/// Appends singleton spatial axes until `x` has the canonical rank. Works for
/// owned arrays as well as shared and mutable views.
pub(crate) fn lift<S, D>(x: ArrayBase<S, D>) -> Result<ArrayBase<S, Ix5>>
where
    S: RawData,
    D: Dimension,
{
    if !(3..=CANONICAL_NDIM).contains(&x.ndim()) {
        return Err(invalid_argument(
            "input",
            format!(
                "expected (batch, channels, spatial..) with 1 to {} spatial dimensions, got shape {:?}",
                SPATIAL_AXES,
                x.shape()
            ),
        ));
    }
    let mut x = x.into_dyn();
    while x.ndim() < CANONICAL_NDIM {
        let last = x.ndim();
        x = x.insert_axis(Axis(last));
    }
    x.into_dimensionality::<Ix5>()
        .map_err(|e| invalid_argument("input", e.to_string()))
}

/// Drops the trailing singleton axes added by [`lift`], leaving `spatial_rank`
/// spatial axes.
pub(crate) fn restore<S>(x: ArrayBase<S, Ix5>, spatial_rank: usize) -> ArrayBase<S, IxDyn>
where
    S: RawData,
{
    let mut x = x.into_dyn();
    while x.ndim() > spatial_rank + 2 {
        let last = x.ndim() - 1;
        debug_assert_eq!(x.len_of(Axis(last)), 1);
        x = x.index_axis_move(Axis(last), 0);
    }
    x
}
