//! Bypass switching with smooth crossfading.
//!
//! Toggling bypass must not cut straight from the processed (wet) signal to
//! the unprocessed (dry) one, since any difference between the two would be
//! heard as a click. [`Bypass`] instead crossfades over a short, fixed time.
//!
//! # Overview
//!
//! - [`BypassState`] - Current state (Active, Bypassed, or transitioning)
//! - [`CrossfadeCurve`] - Crossfade curve shape (Linear, SCurve)
//! - [`Bypass`] - The crossfader itself
//!
//! # Example
//!
//! ```ignore
//! let mut bypass = Bypass::new(false);
//! bypass.init(sample_rate);
//!
//! // Settings update
//! bypass.set_bypass(port.value() >= 0.5);
//!
//! // Audio thread: dry is the untouched input, wet the processed signal
//! bypass.process(&mut out, &input, &processed, input.len());
//! ```
//!
//! # Redundant requests
//!
//! Requesting the state that is already the target (or is already being
//! ramped to) does nothing: an in-flight ramp is never restarted. Requesting
//! the opposite state mid-ramp reverses the ramp from its current position,
//! so the mix never jumps.

use serde::Serialize;
use serde_json::json;

use crate::dump::{Dumpable, StateDumper};
use crate::units::seconds_to_samples;

/// Default crossfade time in seconds.
pub const BYPASS_TIME: f32 = 0.005;

// =============================================================================
// BypassState
// =============================================================================

/// Current state of the crossfader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BypassState {
    /// Fully processed: output is the wet signal.
    Active,
    /// Crossfading from wet to dry.
    RampingToBypassed,
    /// Fully bypassed: output is the dry signal.
    Bypassed,
    /// Crossfading from dry to wet.
    RampingToActive,
}

// =============================================================================
// CrossfadeCurve
// =============================================================================

/// Crossfade curve shape for bypass transitions.
///
/// Both curves keep the wet and dry gains summing to one, so the output
/// always lies between the dry and the wet sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum CrossfadeCurve {
    /// gain = position (0.0 to 1.0)
    #[default]
    Linear,

    /// Smoothstep, gain = 3x^2 - 2x^3. Gentler at both ends.
    SCurve,
}

impl CrossfadeCurve {
    /// Wet and dry gains for a normalized position.
    ///
    /// `t` is 0.0 for fully wet and 1.0 for fully dry.
    #[inline]
    pub fn gains(&self, t: f32) -> (f32, f32) {
        let dry = match self {
            CrossfadeCurve::Linear => t,
            CrossfadeCurve::SCurve => t * t * (3.0 - 2.0 * t),
        };
        (1.0 - dry, dry)
    }
}

// =============================================================================
// Bypass
// =============================================================================

/// Click-free bypass crossfader for one channel.
///
/// # Real-Time Safety
///
/// This struct performs no heap allocations.
#[derive(Debug, Clone)]
pub struct Bypass {
    state: BypassState,
    /// Position in the ramp: 0 = fully wet, `ramp_samples` = fully dry.
    ramp_position: u32,
    /// Ramp length in samples. 0 until initialized, which switches instantly.
    ramp_samples: u32,
    curve: CrossfadeCurve,
}

impl Bypass {
    /// Create a crossfader resting in the given state.
    pub fn new(bypassed: bool) -> Self {
        Self {
            state: if bypassed {
                BypassState::Bypassed
            } else {
                BypassState::Active
            },
            ramp_position: 0,
            ramp_samples: 0,
            curve: CrossfadeCurve::Linear,
        }
    }

    /// Configure the ramp for a sample rate, using [`BYPASS_TIME`].
    pub fn init(&mut self, sample_rate: u32) {
        self.init_with_time(sample_rate, BYPASS_TIME);
    }

    /// Configure the ramp for a sample rate and crossfade time.
    ///
    /// A ramp in flight keeps its relative position.
    pub fn init_with_time(&mut self, sample_rate: u32, seconds: f32) {
        let samples = seconds_to_samples(sample_rate, seconds).min(u32::MAX as usize) as u32;
        self.set_ramp_samples(samples);
    }

    /// Set the ramp length in samples directly.
    pub fn set_ramp_samples(&mut self, samples: u32) {
        let old = self.ramp_samples;
        self.ramp_samples = samples;

        match self.state {
            BypassState::Active => self.ramp_position = 0,
            BypassState::Bypassed => self.ramp_position = samples,
            _ if samples == 0 || old == 0 => self.finish_ramp(),
            _ => {
                let scaled = u64::from(self.ramp_position) * u64::from(samples) / u64::from(old);
                self.ramp_position = scaled as u32;
            }
        }
    }

    #[inline]
    pub fn set_curve(&mut self, curve: CrossfadeCurve) {
        self.curve = curve;
    }

    #[inline]
    pub fn curve(&self) -> CrossfadeCurve {
        self.curve
    }

    #[inline]
    pub fn state(&self) -> BypassState {
        self.state
    }

    #[inline]
    pub fn ramp_samples(&self) -> u32 {
        self.ramp_samples
    }

    /// Returns true while crossfading.
    #[inline]
    pub fn is_ramping(&self) -> bool {
        matches!(
            self.state,
            BypassState::RampingToBypassed | BypassState::RampingToActive
        )
    }

    /// Returns true if fully bypassed (not ramping).
    #[inline]
    pub fn is_bypassed(&self) -> bool {
        self.state == BypassState::Bypassed
    }

    /// Returns true if fully active (not ramping, not bypassed).
    #[inline]
    pub fn is_active(&self) -> bool {
        self.state == BypassState::Active
    }

    /// Request bypass on or off.
    ///
    /// Returns true if the request changed the direction of travel.
    pub fn set_bypass(&mut self, bypassed: bool) -> bool {
        // Instant switching until a ramp length is known
        if self.ramp_samples == 0 {
            let target = if bypassed {
                BypassState::Bypassed
            } else {
                BypassState::Active
            };
            let changed = self.state != target;
            self.state = target;
            self.ramp_position = 0;
            return changed;
        }

        match (self.state, bypassed) {
            (BypassState::Active, true) => {
                self.state = BypassState::RampingToBypassed;
                self.ramp_position = 0;
            }
            (BypassState::Bypassed, false) => {
                self.state = BypassState::RampingToActive;
                self.ramp_position = self.ramp_samples;
            }
            // Reverse mid-ramp, keeping the current position
            (BypassState::RampingToBypassed, false) => {
                self.state = BypassState::RampingToActive;
            }
            (BypassState::RampingToActive, true) => {
                self.state = BypassState::RampingToBypassed;
            }
            // Already there, or already on the way
            _ => return false,
        }
        true
    }

    /// Blend `dry` and `wet` into `dst` for `count` samples.
    ///
    /// `count` is bounded by the lengths of all three slices.
    pub fn process(&mut self, dst: &mut [f32], dry: &[f32], wet: &[f32], count: usize) {
        let count = count.min(dst.len()).min(dry.len()).min(wet.len());
        let ramp = self.ramp_samples as f32;
        let mut i = 0;

        while i < count {
            match self.state {
                BypassState::Active => {
                    dst[i..count].copy_from_slice(&wet[i..count]);
                    return;
                }
                BypassState::Bypassed => {
                    dst[i..count].copy_from_slice(&dry[i..count]);
                    return;
                }
                BypassState::RampingToBypassed => {
                    while i < count && self.ramp_position < self.ramp_samples {
                        dst[i] = self.blend(dry[i], wet[i], ramp);
                        self.ramp_position += 1;
                        i += 1;
                    }
                    if self.ramp_position >= self.ramp_samples {
                        self.finish_ramp();
                    }
                }
                BypassState::RampingToActive => {
                    while i < count && self.ramp_position > 0 {
                        dst[i] = self.blend(dry[i], wet[i], ramp);
                        self.ramp_position -= 1;
                        i += 1;
                    }
                    if self.ramp_position == 0 {
                        self.finish_ramp();
                    }
                }
            }
        }
    }

    #[inline]
    fn blend(&self, dry: f32, wet: f32, ramp: f32) -> f32 {
        let t = self.ramp_position as f32 / ramp;
        let (wet_gain, dry_gain) = self.curve.gains(t);
        wet * wet_gain + dry * dry_gain
    }

    fn finish_ramp(&mut self) {
        match self.state {
            BypassState::RampingToBypassed => {
                self.state = BypassState::Bypassed;
                self.ramp_position = self.ramp_samples;
            }
            BypassState::RampingToActive => {
                self.state = BypassState::Active;
                self.ramp_position = 0;
            }
            _ => {}
        }
    }
}

impl Default for Bypass {
    /// An active (not bypassed) crossfader with an instant ramp.
    fn default() -> Self {
        Self::new(false)
    }
}

impl Dumpable for Bypass {
    fn dump(&self, v: &mut dyn StateDumper) {
        v.write("state", json!(self.state));
        v.write("ramp_position", json!(self.ramp_position));
        v.write("ramp_samples", json!(self.ramp_samples));
        v.write("curve", json!(self.curve));
    }
}
