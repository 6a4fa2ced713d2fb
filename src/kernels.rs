//! Per batch-slice `im2col` gather and `col2im` scatter-accumulate.
//!
//! Both kernels walk the same sequence of (window, element, source) taps, so
//! the scatter is the exact transpose of the gather by construction.
//!
//! Read more here:
//! - <https://leonardoaraujosantos.gitbook.io/artificial-inteligence/machine_learning/deep_learning/convolution_layer/making_faster>

use ndarray::{ArrayView2, ArrayView4, ArrayViewMut2, ArrayViewMut4};

use crate::dims::DenseConvDims;
use crate::Element;

/// Calls `tap(window, element, source)` for every element of every window.
/// `source` is the `(channel, s1, s2, s3)` index read by that element, or
/// `None` if it lies in the zero padding.
///
/// Windows are visited in row-major order of their output position and the
/// elements of a window in row-major `(channel, k1, k2, k3)` order.
fn for_each_tap<T>(dims: &DenseConvDims, mut tap: T)
where
    T: FnMut(usize, usize, Option<[usize; 4]>),
{
    let out = dims.lifted_output_size();
    let kernel = dims.lifted_kernel_size();

    // source positions per axis, indexed [output position][kernel offset]
    let sources: Vec<Vec<Vec<Option<usize>>>> = (0..3)
        .map(|axis| {
            (0..out[axis])
                .map(|o| {
                    (0..kernel[axis])
                        .map(|k| dims.source_index(axis, o, k))
                        .collect()
                })
                .collect()
        })
        .collect();

    let mut window = 0;
    for o1 in 0..out[0] {
        for o2 in 0..out[1] {
            for o3 in 0..out[2] {
                let mut element = 0;
                for c in 0..dims.channels() {
                    for &i1 in &sources[0][o1] {
                        for &i2 in &sources[1][o2] {
                            for &i3 in &sources[2][o3] {
                                let source = match (i1, i2, i3) {
                                    (Some(p), Some(q), Some(r)) => Some([c, p, q, r]),
                                    _ => None,
                                };
                                tap(window, element, source);
                                element += 1;
                            }
                        }
                    }
                }
                window += 1;
            }
        }
    }
}

/// Gathers all windows of one `(channels, s1, s2, s3)` slice into the rows of
/// `col`, shaped `(num_windows, window_size)`.
pub(crate) fn im2col<F: Element>(
    x: ArrayView4<F>,
    mut col: ArrayViewMut2<F>,
    dims: &DenseConvDims,
) {
    for_each_tap(dims, |window, element, source| {
        col[[window, element]] = match source {
            Some(index) => x[index],
            None => F::zero(),
        };
    });
}

/// Overwrites `x` with the sum of every window element of `col` scattered
/// back onto the position it was gathered from.
pub(crate) fn col2im<F: Element>(
    col: ArrayView2<F>,
    mut x: ArrayViewMut4<F>,
    dims: &DenseConvDims,
) {
    x.fill(F::zero());
    for_each_tap(dims, |window, element, source| {
        if let Some(index) = source {
            x[index] += col[[window, element]];
        }
    });
}
