//! Deterministic numeric helpers.

/// Rounds to the nearest integer with ties toward positive infinity.
///
/// `f64::round` sends ties away from zero, which buckets `-2.5` and `2.5`
/// asymmetrically around the origin. Quantized keys must not depend on which
/// hemisphere a point lies in, so ties always go up.
pub fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// Quantizes `v` onto a grid of `step`-sized cells and returns the cell index.
///
/// Non-finite inputs and non-positive steps map to cell `0`.
pub fn quantize(v: f64, step: f64) -> i64 {
    if !v.is_finite() || !(step > 0.0) {
        return 0;
    }
    round_half_up(v / step) as i64
}
