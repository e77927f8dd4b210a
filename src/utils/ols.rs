//! Ordinary Least Squares (OLS) regression over named design columns.
//!
//! Used by the additive forecaster to fit trend, weekday and holiday effects
//! in one pass.

use crate::error::{EventError, Result};

/// Ordered, named regressor columns of equal length.
#[derive(Debug, Clone, Default)]
pub struct DesignMatrix {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl DesignMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column; all columns must share the length of the first.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        if let Some(first) = self.columns.first() {
            if first.len() != values.len() {
                return Err(EventError::InvalidParameter(format!(
                    "column length {} does not match {}",
                    values.len(),
                    first.len()
                )));
            }
        }
        self.names.push(name.into());
        self.columns.push(values);
        Ok(())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows, 0 when no columns are present.
    pub fn num_rows(&self) -> usize {
        self.columns.first().map(|c| c.len()).unwrap_or(0)
    }
}

/// OLS regression coefficients and intercept.
#[derive(Debug, Clone)]
pub struct OLSResult {
    /// Regression coefficients, in design column order.
    pub coefficients: Vec<f64>,
    /// Intercept term.
    pub intercept: f64,
    /// Names of regressors in order.
    pub regressor_names: Vec<String>,
}

impl OLSResult {
    /// Predict values for a design with the same columns as the fit.
    pub fn predict(&self, design: &DesignMatrix) -> Result<Vec<f64>> {
        if design.names() != self.regressor_names.as_slice() {
            return Err(EventError::InvalidParameter(format!(
                "prediction columns {:?} do not match fitted columns {:?}",
                design.names(),
                self.regressor_names
            )));
        }

        let mut predictions = vec![self.intercept; design.num_rows()];
        for (coef, column) in self.coefficients.iter().zip(&design.columns) {
            for (pred, x) in predictions.iter_mut().zip(column) {
                *pred += coef * x;
            }
        }

        Ok(predictions)
    }

    /// Coefficient for a named regressor.
    pub fn coefficient(&self, name: &str) -> Option<f64> {
        self.regressor_names
            .iter()
            .position(|n| n == name)
            .map(|idx| self.coefficients[idx])
    }
}

/// Fit OLS regression: y = intercept + X @ coefficients
///
/// Uses Cholesky decomposition to solve the normal equations.
pub fn ols_fit(y: &[f64], design: &DesignMatrix) -> Result<OLSResult> {
    let n = y.len();

    if n == 0 {
        return Err(EventError::InsufficientHistory { needed: 1, got: 0 });
    }

    if design.num_columns() == 0 {
        let intercept = y.iter().sum::<f64>() / n as f64;
        return Ok(OLSResult {
            coefficients: vec![],
            intercept,
            regressor_names: vec![],
        });
    }

    if design.num_rows() != n {
        return Err(EventError::InvalidParameter(format!(
            "design has {} rows for {} observations",
            design.num_rows(),
            n
        )));
    }

    let k = design.num_columns();
    let num_params = k + 1;
    let x_cols = &design.columns;

    // Normal equations with an implicit leading column of ones
    let mut xtx = vec![vec![0.0; num_params]; num_params];
    let mut xty = vec![0.0; num_params];

    for obs in 0..n {
        let y_obs = y[obs];
        xtx[0][0] += 1.0;
        xty[0] += y_obs;
        for i in 0..k {
            let xi = x_cols[i][obs];
            xtx[0][i + 1] += xi;
            xtx[i + 1][0] += xi;
            xty[i + 1] += xi * y_obs;
            for j in 0..k {
                xtx[i + 1][j + 1] += xi * x_cols[j][obs];
            }
        }
    }

    // Small ridge keeps rank-deficient designs solvable
    for i in 0..num_params {
        xtx[i][i] += 1e-8;
    }

    let beta = solve_symmetric(&xtx, &xty).ok_or_else(|| {
        EventError::ComputationError("OLS regression failed: matrix not positive definite".into())
    })?;

    Ok(OLSResult {
        intercept: beta[0],
        coefficients: beta[1..].to_vec(),
        regressor_names: design.names().to_vec(),
    })
}

/// Solve symmetric positive definite system using Cholesky decomposition.
fn solve_symmetric(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    // A = L @ L'
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                if sum <= 0.0 {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // L @ y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    // L' @ x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    Some(x)
}
