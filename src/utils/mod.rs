//! Utility functions for forecasting models.

pub mod ols;
pub mod stats;

pub use ols::{ols_fit, DesignMatrix, OLSResult};
pub use stats::interval_z;
