//! Statistical utility functions.

use crate::error::{EventError, Result};
use statrs::distribution::{ContinuousCDF, Normal};

/// Two-sided z multiplier for a central prediction interval.
///
/// # Example
/// ```
/// use eventcast::utils::interval_z;
///
/// // 95% interval -> z ≈ 1.96
/// let z = interval_z(0.95).unwrap();
/// assert!((z - 1.96).abs() < 0.01);
/// ```
pub fn interval_z(level: f64) -> Result<f64> {
    if !(level > 0.0 && level < 1.0) {
        return Err(EventError::InvalidParameter(format!(
            "interval level must lie in (0, 1), got {}",
            level
        )));
    }
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| EventError::ComputationError(e.to_string()))?;
    Ok(normal.inverse_cdf((1.0 + level) / 2.0))
}
