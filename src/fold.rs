//! Scatter-accumulation of windows back onto a tensor (`col2im` over a whole
//! batch), the adjoint of [`unfold`](crate::unfold()).
//!
//! Fold is the transpose of unfold, not its inverse: an input position
//! covered by `n` windows receives the sum of `n` contributions. Dividing by
//! [`divisor`] undoes that where `n > 0`. Positions no window touches have a
//! divisor of zero and dividing there yields `NaN` or infinity; guarding
//! against that is left to the caller.

use log::{debug, trace};
use ndarray::{
    Array5, ArrayD, ArrayView3, ArrayViewMut, ArrayViewMut5, AsArray, Dimension, IxDyn, Ix3, Zip,
};
use num_traits::One;

use crate::dims::DenseConvDims;
use crate::error::{check_shape, Result};
use crate::kernels::col2im;
use crate::options::WindowOptions;
use crate::rank::{lift, restore};
use crate::unfold::{batch_of, unfold_with};
use crate::Element;

/// Sums the windows of a `(batch, num_windows, window_size)` container back
/// into a tensor of shape `output_shape`, given as `(batch, channels, s1..)`.
///
/// ```
/// use ndarray::{arr3, Array};
/// use unfold_rs::{fold, WindowOptions};
///
/// let windows = Array::from_elem((1, 5, 3), 1.0);
/// let counts = fold(&windows, &[1, 1, 7], &[3], &WindowOptions::default()).unwrap();
/// assert_eq!(
///     counts.into_dimensionality::<ndarray::Ix3>().unwrap(),
///     arr3(&[[[1.0, 2.0, 3.0, 3.0, 3.0, 2.0, 1.0]]])
/// );
/// ```
pub fn fold<'a, F, V>(
    windows: V,
    output_shape: &[usize],
    kernel_size: &[usize],
    options: &WindowOptions,
) -> Result<ArrayD<F>>
where
    V: AsArray<'a, F, Ix3>,
    F: Element,
{
    let windows: ArrayView3<F> = windows.into();
    let dims = DenseConvDims::new(output_shape, kernel_size, options)?;
    check_shape(
        "windows",
        &dims.windows_shape(batch_of(output_shape)),
        windows.shape(),
    )?;
    fold_with(windows, &dims)
}

/// Like [`fold`], with the geometry given by a prebuilt descriptor. The
/// batch extent is taken from `windows` and the result has the rank the
/// descriptor was built for.
pub fn fold_with<'a, F, V>(windows: V, dims: &DenseConvDims) -> Result<ArrayD<F>>
where
    V: AsArray<'a, F, Ix3>,
    F: Element,
{
    let windows: ArrayView3<F> = windows.into();
    let batch = batch_of(windows.shape());
    check_shape("windows", &dims.windows_shape(batch), windows.shape())?;
    let mut x = Array5::zeros(dims.lifted_input_shape(batch));
    scatter(windows, x.view_mut(), dims);
    Ok(restore(x, dims.spatial_rank()))
}

/// Like [`fold_with`], writing into a caller-provided tensor of shape
/// `(batch, channels, s1..)`. Previous contents of `x` are discarded.
pub fn fold_into<'a, F, V, D>(
    x: ArrayViewMut<F, D>,
    windows: V,
    dims: &DenseConvDims,
) -> Result<()>
where
    V: AsArray<'a, F, Ix3>,
    F: Element,
    D: Dimension,
{
    let windows: ArrayView3<F> = windows.into();
    let batch = batch_of(x.shape());
    check_shape("output", &dims.input_shape(batch), x.shape())?;
    check_shape("windows", &dims.windows_shape(batch), windows.shape())?;
    scatter(windows, lift(x)?, dims);
    Ok(())
}

/// Number of windows covering each position of a tensor of shape
/// `output_shape`, computed as `fold(unfold(ones))`.
///
/// Entries are zero where no window reaches, for example with a stride
/// larger than the kernel extent.
pub fn divisor<F>(output_shape: &[usize], dims: &DenseConvDims) -> Result<ArrayD<F>>
where
    F: Element + One,
{
    check_shape(
        "output",
        &dims.input_shape(batch_of(output_shape)),
        output_shape,
    )?;
    let ones = ArrayD::from_elem(IxDyn(output_shape), F::one());
    fold_with(&unfold_with(&ones, dims)?, dims)
}

fn scatter<F: Element>(windows: ArrayView3<F>, mut x: ArrayViewMut5<F>, dims: &DenseConvDims) {
    debug!(
        "fold: {:?} into {} x {:?}",
        windows.shape(),
        x.len_of(ndarray::Axis(0)),
        dims.input_size()
    );
    Zip::indexed(x.outer_iter_mut())
        .and(windows.outer_iter())
        .par_for_each(|b, slice, col| {
            trace!("col2im batch element {}", b);
            col2im(col, slice, dims);
        });
}
