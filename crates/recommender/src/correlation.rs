//! Pearson product-moment correlation over paired observations.
//!
//! This is the leaf of the recommendation core: no dependencies, no side
//! effects, and no way to make it divide by zero. The two degenerate inputs
//! (no pairs, no variance in a series) both come back as `None` so callers
//! have to branch on them explicitly.

/// Compute the Pearson correlation coefficient for a sequence of paired
/// observations.
///
/// Returns `Some(r)` with `r` in [-1, 1], or `None` when the correlation is
/// undefined:
/// - the input is empty, or
/// - one of the two series has no variance (e.g. all x values identical).
///
/// ## Algorithm
/// Single pass accumulating Σx, Σy, Σxy, Σx², Σy², then
///
/// ```text
/// r = (n·Σxy - Σx·Σy) / sqrt((n·Σx² - (Σx)²) · (n·Σy² - (Σy)²))
/// ```
///
/// The two variance terms are checked before taking the square root; a term
/// can come out as a tiny negative from floating rounding, which would
/// otherwise surface as NaN.
pub fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.is_empty() {
        return None;
    }

    let n = pairs.len() as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;
    let mut sum_y2 = 0.0;

    for &(x, y) in pairs {
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
        sum_y2 += y * y;
    }

    let numerator = n * sum_xy - sum_x * sum_y;
    let var_x = n * sum_x2 - sum_x * sum_x;
    let var_y = n * sum_y2 - sum_y * sum_y;

    if var_x <= 0.0 || var_y <= 0.0 {
        return None;
    }

    Some(numerator / (var_x * var_y).sqrt())
}
