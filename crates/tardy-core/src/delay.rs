//! Circular delay line with ramped delay changes.
//!
//! [`Delay`] stores the most recent input samples and reproduces them a given
//! number of samples later. When the requested delay changes between calls,
//! the read position glides linearly from the old delay to the new one across
//! the next processing call instead of jumping, so dragging a delay control
//! during playback does not produce a discontinuity.
//!
//! # Usage
//!
//! ```ignore
//! let mut line = Delay::new();
//! line.init(millis_to_samples(sample_rate, 10_000.0))?;
//! line.set_delay(100);
//!
//! // Audio thread
//! line.process_ramping(&mut out, &input, wet_gain, line.target(), input.len());
//! ```
//!
//! # Real-Time Safety
//!
//! Only [`init`](Delay::init) allocates. Processing never allocates, and
//! requests beyond the reserved capacity are clamped, never read out of
//! bounds.

use serde_json::json;

use crate::dump::{Dumpable, StateDumper};
use crate::error::{PluginError, PluginResult};

/// Delay line over a circular sample buffer.
#[derive(Debug, Clone, Default)]
pub struct Delay {
    /// History, `capacity + 1` samples long (empty until initialized).
    buffer: Vec<f32>,
    /// Write cursor.
    head: usize,
    /// Delay applied at the end of the last processing call.
    delay: usize,
    /// Delay requested through `set_delay`.
    target: usize,
}

impl Delay {
    /// Create an uninitialized delay line. It outputs silence until
    /// [`init`](Self::init) succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve room for delays of up to `max_samples` samples.
    ///
    /// Clears the history and resets the active delay to zero. The requested
    /// delay is kept and will be ramped to on the next processing call.
    ///
    /// The existing allocation is reused when the size does not change. On
    /// allocation failure the line is left uninitialized and outputs silence.
    pub fn init(&mut self, max_samples: usize) -> PluginResult<()> {
        let len = max_samples.saturating_add(1);
        self.head = 0;
        self.delay = 0;

        if self.buffer.len() == len {
            self.clear();
            return Ok(());
        }
        self.buffer = Vec::new();

        let mut buffer = Vec::new();
        buffer.try_reserve_exact(len).map_err(|e| {
            PluginError::AllocationFailed(format!("delay line of {} samples: {}", len, e))
        })?;
        buffer.resize(len, 0.0);
        self.buffer = buffer;
        Ok(())
    }

    /// Release the history buffer. The line outputs silence afterwards.
    pub fn destroy(&mut self) {
        self.buffer = Vec::new();
        self.head = 0;
        self.delay = 0;
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Largest delay the line can reproduce, in samples.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.len().saturating_sub(1)
    }

    /// Request a new delay. Takes effect through a ramp during the next
    /// processing call.
    #[inline]
    pub fn set_delay(&mut self, samples: usize) {
        self.target = samples;
    }

    /// Requested delay, as last passed to [`set_delay`](Self::set_delay).
    #[inline]
    pub fn target(&self) -> usize {
        self.target
    }

    /// Delay in effect after the last processing call.
    #[inline]
    pub fn delay(&self) -> usize {
        self.delay
    }

    /// Zero the history without touching the delay settings.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
    }

    /// Process `src` into `dst` with the requested delay, ramping to it if it
    /// changed since the last call.
    pub fn process(&mut self, dst: &mut [f32], src: &[f32], gain: f32) {
        let count = dst.len().min(src.len());
        self.process_ramping(dst, src, gain, self.target, count);
    }

    /// Delay `count` samples of `src` into `dst`, scaled by `gain`.
    ///
    /// The delay glides linearly from the currently active delay to
    /// `delay` (clamped to [`capacity`](Self::capacity)) so that the last
    /// sample of the call is read at exactly `delay`. The next call starts
    /// where this one ended, so the ramp has no steps across call boundaries.
    ///
    /// `count` is bounded by the lengths of both slices. An uninitialized
    /// line writes silence.
    pub fn process_ramping(
        &mut self,
        dst: &mut [f32],
        src: &[f32],
        gain: f32,
        delay: usize,
        count: usize,
    ) {
        let count = count.min(dst.len()).min(src.len());
        let len = self.buffer.len();
        if len == 0 {
            dst[..count].fill(0.0);
            return;
        }

        let to = delay.min(len - 1);
        let from = self.delay.min(len - 1);

        if from == to {
            self.run(&mut dst[..count], &src[..count], gain, |_| to);
        } else {
            let span = to as i64 - from as i64;
            let steps = count as i64;
            self.run(&mut dst[..count], &src[..count], gain, |i| {
                (from as i64 + span * (i as i64 + 1) / steps) as usize
            });
        }

        if count > 0 {
            self.delay = to;
        }
    }

    /// Write each input sample, then read it back `delay_at(i)` samples late.
    #[inline]
    fn run(&mut self, dst: &mut [f32], src: &[f32], gain: f32, delay_at: impl Fn(usize) -> usize) {
        let len = self.buffer.len();
        let mut head = self.head;

        for (i, (out, input)) in dst.iter_mut().zip(src).enumerate() {
            self.buffer[head] = *input;
            let tail = (head + len - delay_at(i)) % len;
            *out = self.buffer[tail] * gain;

            head += 1;
            if head >= len {
                head = 0;
            }
        }

        self.head = head;
    }
}

impl Dumpable for Delay {
    fn dump(&self, v: &mut dyn StateDumper) {
        v.write("size", json!(self.buffer.len()));
        v.write("capacity", json!(self.capacity()));
        v.write("head", json!(self.head));
        v.write("delay", json!(self.delay));
        v.write("target", json!(self.target));
    }
}
