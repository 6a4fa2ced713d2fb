//! Sliding-window extraction (`im2col` over a whole batch).

use log::{debug, trace};
use ndarray::{Array3, ArrayView, ArrayView5, ArrayViewMut3, AsArray, Dimension, Zip};

use crate::dims::DenseConvDims;
use crate::error::{check_shape, Result};
use crate::kernels::im2col;
use crate::options::WindowOptions;
use crate::rank::lift;
use crate::Element;

/// Extracts every sliding window of `x` into a `(batch, num_windows, window_size)`
/// container, where `window_size = channels * prod(kernel_size)`.
///
/// `x` has shape `(batch, channels, s1[, s2[, s3]])` and `kernel_size` one
/// extent per spatial dimension. Padding positions read as zero.
///
/// Example, a 1D sequence with stride 2 and padding 1:
/// ```
/// use ndarray::{arr3, Array};
/// use unfold_rs::{unfold, WindowOptions};
///
/// let x = Array::from_shape_vec((1, 1, 7), vec![100, 2, 3, 40, 5, 6, 700]).unwrap();
/// let windows = unfold(&x, &[3], &WindowOptions::new().stride(2).padding(1)).unwrap();
/// assert_eq!(
///     windows,
///     arr3(&[[[0, 100, 2], [2, 3, 40], [40, 5, 6], [6, 700, 0]]])
/// );
/// ```
pub fn unfold<'a, F, V, D>(
    x: V,
    kernel_size: &[usize],
    options: &WindowOptions,
) -> Result<Array3<F>>
where
    // AsArray lets x be passed as an owned array or as a view.
    V: AsArray<'a, F, D>,
    F: Element,
    D: Dimension,
{
    let x: ArrayView<F, D> = x.into();
    let dims = DenseConvDims::new(x.shape(), kernel_size, options)?;
    unfold_with(x, &dims)
}

/// Like [`unfold`], with the geometry given by a prebuilt descriptor. The
/// result is allocated once.
pub fn unfold_with<'a, F, V, D>(x: V, dims: &DenseConvDims) -> Result<Array3<F>>
where
    V: AsArray<'a, F, D>,
    F: Element,
    D: Dimension,
{
    let x: ArrayView<F, D> = x.into();
    let batch = batch_of(x.shape());
    check_shape("input", &dims.input_shape(batch), x.shape())?;
    let mut windows = Array3::zeros(dims.windows_shape(batch));
    gather(lift(x)?, windows.view_mut(), dims);
    Ok(windows)
}

/// Like [`unfold_with`], writing into a caller-provided `windows` buffer of
/// shape `(batch, num_windows, window_size)`. Every element of the buffer is
/// overwritten.
pub fn unfold_into<'a, F, V, D>(
    windows: ArrayViewMut3<F>,
    x: V,
    dims: &DenseConvDims,
) -> Result<()>
where
    V: AsArray<'a, F, D>,
    F: Element,
    D: Dimension,
{
    let x: ArrayView<F, D> = x.into();
    let batch = batch_of(x.shape());
    check_shape("input", &dims.input_shape(batch), x.shape())?;
    check_shape("windows", &dims.windows_shape(batch), windows.shape())?;
    gather(lift(x)?, windows, dims);
    Ok(())
}

pub(crate) fn batch_of(shape: &[usize]) -> usize {
    shape.first().copied().unwrap_or(0)
}

fn gather<F: Element>(x: ArrayView5<F>, mut windows: ArrayViewMut3<F>, dims: &DenseConvDims) {
    debug!(
        "unfold: {} x {:?} into {:?}",
        x.len_of(ndarray::Axis(0)),
        dims.input_size(),
        windows.shape()
    );
    // batch elements write disjoint slices of the output
    Zip::indexed(windows.outer_iter_mut())
        .and(x.outer_iter())
        .par_for_each(|b, col, slice| {
            trace!("im2col batch element {}", b);
            im2col(slice, col, dims);
        });
}
