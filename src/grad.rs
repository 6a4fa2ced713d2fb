//! Reverse-mode differentiation rules.
//!
//! Unfold and fold are linear and each is the adjoint of the other, so the
//! pullback of one is the other applied to the upstream gradient with the
//! same descriptor. Shapes and descriptors receive no gradient.
//!
//! The rules are plain functions, plus pullback values for engines that want
//! the primal result and its pullback together:
//!
//! ```
//! use ndarray::Array;
//! use unfold_rs::{unfold_with_pullback, DenseConvDims, WindowOptions};
//!
//! let x = Array::from_shape_fn((2, 3, 8), |(b, c, l)| (b + c + l) as f64);
//! let dims = DenseConvDims::new(x.shape(), &[3], &WindowOptions::new().stride(2)).unwrap();
//! let (windows, pullback) = unfold_with_pullback(&x, &dims).unwrap();
//!
//! let dx = pullback.apply(&Array::<f64, _>::ones(windows.raw_dim())).unwrap();
//! assert_eq!(dx.shape(), x.shape());
//! ```

use log::debug;
use ndarray::{Array3, ArrayD, ArrayView, AsArray, Dimension, Ix3};

use crate::dims::DenseConvDims;
use crate::error::{check_shape, Result};
use crate::fold::fold_with;
use crate::unfold::{batch_of, unfold_with};
use crate::Element;

/// Gradient of `unfold(x)` with respect to `x`, given the upstream gradient
/// of the windows. `input_shape` is the shape of the original `x`.
pub fn unfold_backward<'a, F, V>(
    upstream: V,
    input_shape: &[usize],
    dims: &DenseConvDims,
) -> Result<ArrayD<F>>
where
    V: AsArray<'a, F, Ix3>,
    F: Element,
{
    let upstream: ArrayView<F, Ix3> = upstream.into();
    check_shape(
        "input",
        &dims.input_shape(batch_of(input_shape)),
        input_shape,
    )?;
    check_shape(
        "upstream gradient",
        &dims.windows_shape(batch_of(input_shape)),
        upstream.shape(),
    )?;
    debug!("unfold pullback for input {:?}", input_shape);
    fold_with(upstream, dims)
}

/// Gradient of `fold(windows)` with respect to `windows`, given the upstream
/// gradient of the folded tensor.
pub fn fold_backward<'a, F, V, D>(upstream: V, dims: &DenseConvDims) -> Result<Array3<F>>
where
    V: AsArray<'a, F, D>,
    F: Element,
    D: Dimension,
{
    let upstream: ArrayView<F, D> = upstream.into();
    debug!("fold pullback for output {:?}", upstream.shape());
    unfold_with(upstream, dims)
}

/// Pullback of an unfold call, mapping window gradients to input gradients.
#[derive(Debug, Clone)]
pub struct UnfoldPullback {
    dims: DenseConvDims,
    input_shape: Vec<usize>,
}

impl UnfoldPullback {
    pub fn apply<'a, F, V>(&self, upstream: V) -> Result<ArrayD<F>>
    where
        V: AsArray<'a, F, Ix3>,
        F: Element,
    {
        unfold_backward(upstream, &self.input_shape, &self.dims)
    }
}

/// Pullback of a fold call, mapping output gradients to window gradients.
#[derive(Debug, Clone)]
pub struct FoldPullback {
    dims: DenseConvDims,
}

impl FoldPullback {
    pub fn apply<'a, F, V, D>(&self, upstream: V) -> Result<Array3<F>>
    where
        V: AsArray<'a, F, D>,
        F: Element,
        D: Dimension,
    {
        fold_backward(upstream, &self.dims)
    }
}

/// Runs [`unfold_with`] and returns its result together with its pullback.
pub fn unfold_with_pullback<'a, F, V, D>(
    x: V,
    dims: &DenseConvDims,
) -> Result<(Array3<F>, UnfoldPullback)>
where
    V: AsArray<'a, F, D>,
    F: Element,
    D: Dimension,
{
    let x: ArrayView<F, D> = x.into();
    let input_shape = x.shape().to_vec();
    let windows = unfold_with(x, dims)?;
    let pullback = UnfoldPullback {
        dims: dims.clone(),
        input_shape,
    };
    Ok((windows, pullback))
}

/// Runs [`fold_with`] and returns its result together with its pullback.
pub fn fold_with_pullback<'a, F, V>(
    windows: V,
    dims: &DenseConvDims,
) -> Result<(ArrayD<F>, FoldPullback)>
where
    V: AsArray<'a, F, Ix3>,
    F: Element,
{
    let x = fold_with(windows, dims)?;
    let pullback = FoldPullback { dims: dims.clone() };
    Ok((x, pullback))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fold_with, UnfoldError, WindowOptions};
    use ndarray::{Array, Array3, ArrayD, IxDyn};

    fn dims() -> DenseConvDims {
        let options = WindowOptions::new().stride(2).padding(1);
        DenseConvDims::new(&[2, 2, 5, 4], &[3, 2], &options).unwrap()
    }

    #[test]
    fn unfold_backward_is_fold() {
        let d = dims();
        let dy = Array::from_shape_fn(d.windows_shape(2), |(b, w, e)| (b + 2 * w + 3 * e) as f64);
        let dx = unfold_backward(&dy, &[2, 2, 5, 4], &d).unwrap();
        assert_eq!(dx, fold_with(&dy, &d).unwrap());
    }

    #[test]
    fn fold_backward_is_unfold() {
        let d = dims();
        let dy = ArrayD::from_shape_fn(IxDyn(&[2, 2, 5, 4]), |i| i.slice().iter().sum::<usize>() as f64);
        let dw = fold_backward(&dy, &d).unwrap();
        assert_eq!(dw, unfold_with(&dy, &d).unwrap());
    }

    #[test]
    fn pullbacks_carry_the_geometry() {
        let d = dims();
        let x = Array::from_elem((2, 2, 5, 4), 1.0f32);
        let (windows, unfold_pb) = unfold_with_pullback(&x, &d).unwrap();
        let (folded, fold_pb) = fold_with_pullback(&windows, &d).unwrap();
        assert_eq!(folded.shape(), x.shape());

        let dx = unfold_pb.apply(&windows).unwrap();
        assert_eq!(dx, folded);
        let dw = fold_pb.apply(&folded).unwrap();
        assert_eq!(dw.shape(), windows.shape());
    }

    #[test]
    fn unfold_backward_checks_upstream_shape() {
        let d = dims();
        let dy = Array3::<f64>::zeros((1, d.num_windows(), d.window_size()));
        assert!(matches!(
            unfold_backward(&dy, &[2, 2, 5, 4], &d),
            Err(UnfoldError::DimensionMismatch {
                what: "upstream gradient",
                ..
            })
        ));
    }
}
