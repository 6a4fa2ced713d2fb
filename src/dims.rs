//! Convolution dimensions descriptor.
//!
//! A [`DenseConvDims`] is computed once from the input shape, the kernel
//! shape and the [`WindowOptions`], and then answers every geometric question
//! unfold and fold ask: how many windows there are, how large each window is
//! and where each window element comes from.
//!
//! Internally every field is stored at the canonical rank of three spatial
//! axes. A 1D or 2D descriptor simply carries singleton axes (extent 1,
//! kernel 1, stride 1, dilation 1, no padding) after its real ones.

use log::debug;

use crate::error::{invalid_argument, Result};
use crate::options::WindowOptions;
use crate::SPATIAL_AXES;

/// Geometry of a dense sliding-window sweep over `(batch, channels, spatial..)`
/// tensors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseConvDims {
    spatial_rank: usize,
    channels: usize,
    input_size: [usize; SPATIAL_AXES],
    kernel_size: [usize; SPATIAL_AXES],
    stride: [usize; SPATIAL_AXES],
    padding: [(usize, usize); SPATIAL_AXES],
    dilation: [usize; SPATIAL_AXES],
    flipped: bool,
}

impl DenseConvDims {
    /// Creates the descriptor for an input of shape `input_shape`, given as
    /// `(batch, channels, s1[, s2[, s3]])`. The batch extent is not part of
    /// the descriptor. `kernel_size` holds one extent per spatial dimension.
    pub fn new(
        input_shape: &[usize],
        kernel_size: &[usize],
        options: &WindowOptions,
    ) -> Result<Self> {
        let ndim = input_shape.len();
        if !(3..=SPATIAL_AXES + 2).contains(&ndim) {
            return Err(invalid_argument(
                "input",
                format!(
                    "expected (batch, channels, spatial..) with 1 to {} spatial dimensions, got shape {:?}",
                    SPATIAL_AXES, input_shape
                ),
            ));
        }
        let rank = ndim - 2;
        if kernel_size.len() != rank {
            return Err(invalid_argument(
                "kernel_size",
                format!(
                    "expected {} values for {}D input, got {}",
                    rank,
                    rank,
                    kernel_size.len()
                ),
            ));
        }
        if kernel_size.contains(&0) {
            return Err(invalid_argument(
                "kernel_size",
                format!("must be positive, got {:?}", kernel_size),
            ));
        }

        let mut input_size = [1; SPATIAL_AXES];
        input_size[..rank].copy_from_slice(&input_shape[2..]);
        let mut kernel = [1; SPATIAL_AXES];
        kernel[..rank].copy_from_slice(kernel_size);

        let stride = options.stride.normalize("stride", rank)?;
        let dilation = options.dilation.normalize("dilation", rank)?;
        let padding = options.padding.normalize(rank, &kernel, &dilation)?;

        for i in 0..rank {
            let padded = input_size[i] + padding[i].0 + padding[i].1;
            let extent = dilation[i] * (kernel[i] - 1) + 1;
            if padded < extent {
                return Err(invalid_argument(
                    "kernel_size",
                    format!(
                        "dilated kernel extent {} exceeds padded input extent {} along spatial dimension {}",
                        extent, padded, i
                    ),
                ));
            }
        }

        let dims = DenseConvDims {
            spatial_rank: rank,
            channels: input_shape[1],
            input_size,
            kernel_size: kernel,
            stride,
            padding,
            dilation,
            flipped: options.flipped,
        };
        debug!(
            "{}D conv dims: channels {}, input {:?}, kernel {:?}, output {:?}",
            rank,
            dims.channels,
            dims.input_size(),
            dims.kernel_size(),
            dims.output_size()
        );
        Ok(dims)
    }

    /// Number of spatial dimensions of the tensors this descriptor was built
    /// for (1, 2 or 3).
    pub fn spatial_rank(&self) -> usize {
        self.spatial_rank
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn input_size(&self) -> &[usize] {
        &self.input_size[..self.spatial_rank]
    }

    pub fn kernel_size(&self) -> &[usize] {
        &self.kernel_size[..self.spatial_rank]
    }

    pub fn stride(&self) -> &[usize] {
        &self.stride[..self.spatial_rank]
    }

    /// `(low, high)` padding per spatial dimension.
    pub fn padding(&self) -> &[(usize, usize)] {
        &self.padding[..self.spatial_rank]
    }

    pub fn dilation(&self) -> &[usize] {
        &self.dilation[..self.spatial_rank]
    }

    pub fn flipped(&self) -> bool {
        self.flipped
    }

    /// Number of window positions along each spatial dimension:
    /// `(in + low + high - (dilation * (kernel - 1) + 1)) / stride + 1`.
    pub fn output_size(&self) -> Vec<usize> {
        self.lifted_output_size()[..self.spatial_rank].to_vec()
    }

    /// Total number of windows per batch element.
    pub fn num_windows(&self) -> usize {
        self.lifted_output_size().iter().product()
    }

    /// Number of elements in one flattened window, `channels * prod(kernel)`.
    pub fn window_size(&self) -> usize {
        self.channels * self.kernel_size.iter().product::<usize>()
    }

    /// Full shape of an input (or fold output) tensor with `batch` elements.
    pub fn input_shape(&self, batch: usize) -> Vec<usize> {
        let mut shape = vec![batch, self.channels];
        shape.extend_from_slice(self.input_size());
        shape
    }

    /// Shape of the window container for `batch` elements.
    pub fn windows_shape(&self, batch: usize) -> [usize; 3] {
        [batch, self.num_windows(), self.window_size()]
    }

    pub(crate) fn lifted_input_shape(&self, batch: usize) -> [usize; SPATIAL_AXES + 2] {
        let [s1, s2, s3] = self.input_size;
        [batch, self.channels, s1, s2, s3]
    }

    pub(crate) fn lifted_kernel_size(&self) -> [usize; SPATIAL_AXES] {
        self.kernel_size
    }

    pub(crate) fn lifted_output_size(&self) -> [usize; SPATIAL_AXES] {
        let mut out = [1; SPATIAL_AXES];
        for (i, o) in out.iter_mut().enumerate() {
            let padded = self.input_size[i] + self.padding[i].0 + self.padding[i].1;
            let extent = self.dilation[i] * (self.kernel_size[i] - 1) + 1;
            *o = (padded - extent) / self.stride[i] + 1;
        }
        out
    }

    /// Position in the (unpadded) input read by kernel offset `k` of the
    /// window at output position `o` along spatial axis `axis`, or `None`
    /// when it falls into the padding.
    #[inline]
    pub(crate) fn source_index(&self, axis: usize, o: usize, k: usize) -> Option<usize> {
        let k = if self.flipped {
            self.kernel_size[axis] - 1 - k
        } else {
            k
        };
        let pos = o * self.stride[axis] + k * self.dilation[axis];
        let low = self.padding[axis].0;
        if pos < low || pos - low >= self.input_size[axis] {
            None
        } else {
            Some(pos - low)
        }
    }
}
