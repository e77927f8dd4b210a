//! Window transformations for daily series.
//!
//! # Example
//!
//! ```
//! use eventcast::transform::rolling_mean;
//!
//! let series = vec![10.0, 10.0, 10.0, 50.0, 10.0];
//!
//! // Centered 7-day mean, shrinking at both ends
//! let rm = rolling_mean(&series, 7, true, 1);
//! assert_eq!(rm.len(), series.len());
//! ```

pub mod window;

pub use window::{rolling_mean, window_bounds};
