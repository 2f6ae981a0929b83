// Log-space conversion that tolerates zero probabilities.
//
// The no-modulation transition table is mostly zeros, and several key
// profiles (Sapp's, notably) assign zero weight to out-of-scale pitch
// classes. Converting those to log space must yield negative infinity so the
// corresponding path is pruned, not a panic or a NaN.

/// Probabilities below this threshold are treated as exactly zero.
pub const SAFELOG_EPSILON: f64 = 8.7565e-27;

/// Natural log, with anything below `SAFELOG_EPSILON` (and NaN) mapped to
/// negative infinity.
pub fn safelog(x: f64) -> f64 {
    if x.is_nan() || x < SAFELOG_EPSILON {
        f64::NEG_INFINITY
    } else {
        x.ln()
    }
}
