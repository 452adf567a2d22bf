//! Small numeric helpers shared by the analyzers.

/// Rounds `value` to `places` decimals, half away from zero.
///
/// Non-finite inputs and values whose scaled form overflows are returned
/// unchanged.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

/// Position of the `p` quantile in a sorted slice of length `n`.
///
/// Uses `floor(n * p)` without interpolation, clamped to the last index.
/// `None` for an empty slice.
pub fn quantile_index(n: usize, p: f64) -> Option<usize> {
    let last = n.checked_sub(1)?;
    Some(((n as f64 * p).floor() as usize).min(last))
}

/// Reads the `p` quantile off an ascending slice.
pub fn floor_quantile(sorted: &[f64], p: f64) -> Option<f64> {
    quantile_index(sorted.len(), p).map(|index| sorted[index])
}

/// Returns a sorted copy of `values`. Callers pass finite values only.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(f64::total_cmp);
    out
}

/// First, second and third quartiles of an ascending slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quartiles {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
}

impl Quartiles {
    /// `None` for an empty slice.
    pub fn from_sorted(sorted: &[f64]) -> Option<Self> {
        Some(Self {
            q1: floor_quantile(sorted, 0.25)?,
            median: floor_quantile(sorted, 0.5)?,
            q3: floor_quantile(sorted, 0.75)?,
        })
    }

    /// Spread between the outer quartiles, saturated at `f64::MAX`.
    pub fn iqr(&self) -> f64 {
        saturate(self.q3 - self.q1)
    }
}

/// Replaces NaN and infinities with zero.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Clamps infinities to the largest finite value of the same sign and maps
/// NaN to zero.
pub fn saturate(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-f64::MAX, f64::MAX)
    }
}

/// Power of two that brings the largest magnitude in `values` below 2.
///
/// Sums of squares and products over values near `f64::MAX` overflow, so
/// accumulators divide by this first. Division by a power of two is exact,
/// which leaves results over ordinary magnitudes bit-for-bit unchanged.
/// Returns 1 when no magnitude exceeds 1.
pub fn overflow_scale(values: impl IntoIterator<Item = f64>) -> f64 {
    let max = values
        .into_iter()
        .map(f64::abs)
        .filter(|v| v.is_finite())
        .fold(0.0, f64::max);
    if max <= 1.0 {
        return 1.0;
    }
    2f64.powi(max.log2().floor().min(f64::MAX_EXP as f64 - 1.0) as i32)
}
