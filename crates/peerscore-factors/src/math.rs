//! Small numeric helpers shared across the pipeline.

/// Round to a fixed number of decimal places, half away from zero.
pub fn round_decimals(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
