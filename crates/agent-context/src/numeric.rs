//! Defensive numeric helpers.
//!
//! Everything the arbitration core compares or multiplies passes through
//! these first, so a NaN or infinity coming from a host snapshot can
//! never leak into a score.

/// Replaces non-finite values with a fallback.
pub fn sanitize(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Clamps a value into `[0, 1]`, treating non-finite input as 0.
pub fn clamp01(value: f64) -> f64 {
    sanitize(value, 0.0).clamp(0.0, 1.0)
}

/// Computes `numerator / denominator` clamped to `[0, 1]`.
///
/// A zero, negative, or non-finite denominator yields 0 rather than a
/// division artifact.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    let den = sanitize(denominator, 0.0);
    if den <= 0.0 {
        return 0.0;
    }
    clamp01(sanitize(numerator, 0.0) / den)
}
