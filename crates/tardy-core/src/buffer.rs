//! Per-call view of the host's audio buffers.
//!
//! The host hands a [`Block`] to every `process` call. Slot `i` of the inputs
//! belongs to the i-th audio input port, slot `i` of the outputs to the i-th
//! audio output port. A slot may be empty when the host has no buffer
//! connected to that port for this call; modules must skip such channels.
//!
//! # Real-Time Safety
//!
//! `Block` uses fixed-size stack storage. No heap allocations occur during
//! construction or use.
//!
//! # Example
//!
//! ```ignore
//! let input = [0.0f32; 256];
//! let mut output = [0.0f32; 256];
//! let mut block = Block::new([Some(&input[..])], [Some(&mut output[..])], 256);
//! module.process(&mut block);
//! ```

use crate::types::MAX_CHANNELS;

/// Audio buffers for one processing call.
///
/// The `'a` lifetime ties the block to the host's audio data. Modules must
/// not keep any slice beyond the `process` call it was handed to.
pub struct Block<'a> {
    inputs: [Option<&'a [f32]>; MAX_CHANNELS],
    outputs: [Option<&'a mut [f32]>; MAX_CHANNELS],
    num_samples: usize,
}

impl<'a> Block<'a> {
    /// Create a block from channel slots.
    ///
    /// Slots beyond [`MAX_CHANNELS`] are silently ignored. Slices shorter than
    /// `num_samples` are treated as disconnected.
    pub fn new(
        inputs: impl IntoIterator<Item = Option<&'a [f32]>>,
        outputs: impl IntoIterator<Item = Option<&'a mut [f32]>>,
        num_samples: usize,
    ) -> Self {
        let mut input_arr: [Option<&'a [f32]>; MAX_CHANNELS] = [None; MAX_CHANNELS];
        for (slot, slice) in input_arr.iter_mut().zip(inputs) {
            *slot = slice.filter(|s| s.len() >= num_samples);
        }

        // Can't use [None; N] for &mut because it's not Copy
        let mut output_arr: [Option<&'a mut [f32]>; MAX_CHANNELS] = std::array::from_fn(|_| None);
        for (slot, slice) in output_arr.iter_mut().zip(outputs) {
            *slot = slice.filter(|s| s.len() >= num_samples);
        }

        Self {
            inputs: input_arr,
            outputs: output_arr,
            num_samples,
        }
    }

    /// Create a block where every slot is connected.
    pub fn from_slices(
        inputs: impl IntoIterator<Item = &'a [f32]>,
        outputs: impl IntoIterator<Item = &'a mut [f32]>,
        num_samples: usize,
    ) -> Self {
        Self::new(
            inputs.into_iter().map(Some),
            outputs.into_iter().map(Some),
            num_samples,
        )
    }

    /// Number of samples in this processing call.
    #[inline]
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Input samples of a channel slot, or `None` if not connected.
    #[inline]
    pub fn input(&self, channel: usize) -> Option<&'a [f32]> {
        let n = self.num_samples;
        self.inputs
            .get(channel)
            .copied()
            .flatten()
            .map(|ch| &ch[..n])
    }

    /// Output samples of a channel slot, or `None` if not connected.
    #[inline]
    pub fn output(&mut self, channel: usize) -> Option<&mut [f32]> {
        let n = self.num_samples;
        self.outputs
            .get_mut(channel)
            .and_then(|opt| opt.as_mut())
            .map(|ch| &mut ch[..n])
    }

    /// Input and output of a channel pair, only if both are connected.
    #[inline]
    pub fn channel(&mut self, input: usize, output: usize) -> Option<(&'a [f32], &mut [f32])> {
        let src = self.input(input)?;
        let dst = self.output(output)?;
        Some((src, dst))
    }
}
