//! Unit conversions and small vector kernels shared by the DSP units.
//!
//! The kernels are plain loops over slices; LLVM vectorizes them well enough
//! that no explicit SIMD is needed for the block sizes hosts hand us.

/// Convert a time in milliseconds to a (truncated) number of samples.
#[inline]
pub fn millis_to_samples(sample_rate: u32, millis: f32) -> usize {
    if millis <= 0.0 {
        return 0;
    }
    (f64::from(sample_rate) * f64::from(millis) / 1000.0) as usize
}

/// Convert a time in seconds to a (truncated) number of samples.
#[inline]
pub fn seconds_to_samples(sample_rate: u32, seconds: f32) -> usize {
    millis_to_samples(sample_rate, seconds * 1000.0)
}

/// Convert a number of samples to milliseconds.
///
/// Returns 0.0 for an unset (zero) sample rate.
#[inline]
pub fn samples_to_millis(sample_rate: u32, samples: usize) -> f32 {
    if sample_rate == 0 {
        return 0.0;
    }
    (samples as f64 * 1000.0 / f64::from(sample_rate)) as f32
}

/// Peak absolute value of a slice (0.0 for an empty slice).
#[inline]
pub fn abs_max(src: &[f32]) -> f32 {
    src.iter().fold(0.0f32, |peak, s| peak.max(s.abs()))
}

/// Fused multiply-add into `dst`: `dst[i] += src[i] * k`.
///
/// Processes `min(dst.len(), src.len())` samples.
#[inline]
pub fn fmadd_k3(dst: &mut [f32], src: &[f32], k: f32) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d += *s * k;
    }
}
