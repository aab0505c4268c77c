//! Scalar helpers shared by the physics, scheduler and oscillator code.
//!
//! All functions are allocation-free and suitable for `no_std`.
//!
//! - [`db_to_linear`] / [`linear_to_db`] - Convert between dB and linear gain
//! - [`equal_power_pan`] - Constant-loudness stereo gains for a pan position
//! - [`half_life_decay_factor`] - Per-sample multiplier for an exponential decay
//! - [`clamp_unit`] - Clamp into `[0, 1]`

use libm::{cosf, expf, logf, powf, sinf};

/// Convert decibels to linear gain.
///
/// # Example
/// ```rust
/// use particula_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels.
///
/// Inputs at or below zero are floored at -200 dB.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(1e-10)) * FACTOR
}

/// Clamp a value into `[0, 1]`. NaN maps to 0.
#[inline]
pub fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Equal-power pan law.
///
/// Maps `pan` in `[-1, 1]` (left to right) to `(left, right)` gains with
/// `left² + right² = 1` across the whole range:
///
/// ```text
/// angle = pan * π/4
/// left  = √2/2 * (cos(angle) - sin(angle))
/// right = √2/2 * (cos(angle) + sin(angle))
/// ```
///
/// # Example
/// ```rust
/// use particula_core::equal_power_pan;
///
/// let (l, r) = equal_power_pan(0.0);
/// assert!((l - r).abs() < 1e-6);
/// assert!((l * l + r * r - 1.0).abs() < 1e-6);
/// ```
#[inline]
pub fn equal_power_pan(pan: f32) -> (f32, f32) {
    const K: f32 = core::f32::consts::FRAC_1_SQRT_2;
    let angle = pan.clamp(-1.0, 1.0) * core::f32::consts::FRAC_PI_4;
    let (s, c) = (sinf(angle), cosf(angle));
    (K * (c - s), K * (c + s))
}

/// Per-sample multiplier that halves a level every `half_life_secs`.
///
/// `factor = 0.5 ^ (1 / (sample_rate * half_life_secs))`.
///
/// Returns `0.0` (immediate silence) for a non-positive half-life or
/// sample rate.
#[inline]
pub fn half_life_decay_factor(sample_rate: f32, half_life_secs: f32) -> f32 {
    let samples = sample_rate * half_life_secs;
    if samples > 0.0 && samples.is_finite() {
        powf(0.5, 1.0 / samples)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_roundtrip() {
        for db in [-60.0, -12.0, -6.0, 0.0, 6.0] {
            let back = linear_to_db(db_to_linear(db));
            assert!((back - db).abs() < 1e-3, "{db} -> {back}");
        }
    }

    #[test]
    fn pan_extremes() {
        let (l, r) = equal_power_pan(-1.0);
        assert!((l - 1.0).abs() < 1e-6 && r.abs() < 1e-6);
        let (l, r) = equal_power_pan(1.0);
        assert!(l.abs() < 1e-6 && (r - 1.0).abs() < 1e-6);
    }

    #[test]
    fn pan_is_constant_power() {
        for i in 0..=20 {
            let pan = -1.0 + i as f32 * 0.1;
            let (l, r) = equal_power_pan(pan);
            assert!((l * l + r * r - 1.0).abs() < 1e-5, "pan {pan}");
        }
    }

    #[test]
    fn half_life_halves_after_its_duration() {
        let sr = 48000.0;
        let factor = half_life_decay_factor(sr, 0.05);
        let mut level = 1.0_f32;
        for _ in 0..2400 {
            level *= factor;
        }
        assert!((level - 0.5).abs() < 1e-3, "got {level}");
    }

    #[test]
    fn non_positive_half_life_is_silence() {
        assert_eq!(half_life_decay_factor(48000.0, 0.0), 0.0);
        assert_eq!(half_life_decay_factor(48000.0, -1.0), 0.0);
        assert_eq!(half_life_decay_factor(0.0, 0.05), 0.0);
    }

    #[test]
    fn clamp_unit_handles_nan() {
        assert_eq!(clamp_unit(f32::NAN), 0.0);
        assert_eq!(clamp_unit(1.5), 1.0);
        assert_eq!(clamp_unit(-0.5), 0.0);
        assert_eq!(clamp_unit(0.25), 0.25);
    }
}
