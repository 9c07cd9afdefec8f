//! Polynomial trend projection over close prices.
//!
//! Closes are regressed on the bar index (scaled to `[0, 1]` so high powers
//! stay well conditioned) and the fitted curve is extended `horizon` steps
//! past the last bar.

use linfa::{traits::Fit, Dataset};
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2};
use serde::Serialize;

use crate::error::AppError;

pub const MIN_DEGREE: usize = 1;
pub const MAX_DEGREE: usize = 5;
pub const DEFAULT_DEGREE: usize = 2;
pub const MIN_HORIZON: usize = 1;
pub const MAX_HORIZON: usize = 90;
pub const DEFAULT_HORIZON: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub degree: usize,
    pub horizon: usize,
    /// Lowest power first, in scaled-index space.
    pub coefficients: Vec<f64>,
    pub fitted: Vec<f64>,
    pub forecast: Vec<f64>,
    pub r_squared: f64,
}

impl Projection {
    pub fn last_forecast(&self) -> Option<f64> {
        self.forecast.last().copied()
    }
}

pub fn fit(closes: &[f64], degree: usize, horizon: usize) -> Result<Projection, AppError> {
    if !(MIN_DEGREE..=MAX_DEGREE).contains(&degree) {
        return Err(AppError::InvalidInput(format!(
            "Degree must be between {MIN_DEGREE} and {MAX_DEGREE}."
        )));
    }
    if !(MIN_HORIZON..=MAX_HORIZON).contains(&horizon) {
        return Err(AppError::InvalidInput(format!(
            "Horizon must be between {MIN_HORIZON} and {MAX_HORIZON}."
        )));
    }
    if closes.len() <= degree {
        return Err(AppError::InvalidInput(format!(
            "Not enough data: {} points for a degree {} fit.",
            closes.len(),
            degree
        )));
    }

    let n = closes.len();
    let scale = (n - 1).max(1) as f64;
    let xs: Vec<f64> = (0..n).map(|i| i as f64 / scale).collect();

    let dataset = Dataset::new(poly_features(&xs, degree), Array1::from(closes.to_vec()));
    let model = LinearRegression::new()
        .fit(&dataset)
        .map_err(|e| AppError::InvalidInput(format!("Cannot fit a trend: {e}")))?;

    let coefficients: Vec<f64> = std::iter::once(model.intercept())
        .chain(model.params().iter().copied())
        .collect();
    if coefficients.iter().any(|c| !c.is_finite()) {
        return Err(AppError::InvalidInput(
            "Series is degenerate, cannot fit a trend.".to_string(),
        ));
    }

    let fitted: Vec<f64> = xs.iter().map(|x| eval(&coefficients, *x)).collect();
    let forecast: Vec<f64> = (n..n + horizon)
        .map(|i| eval(&coefficients, i as f64 / scale))
        .collect();

    Ok(Projection {
        degree,
        horizon,
        r_squared: r_squared(closes, &fitted),
        coefficients,
        fitted,
        forecast,
    })
}

/// Powers `x^1..=x^degree`; the constant term is the regression intercept.
fn poly_features(xs: &[f64], degree: usize) -> Array2<f64> {
    Array2::from_shape_fn((xs.len(), degree), |(i, j)| xs[i].powi(j as i32 + 1))
}

fn eval(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

fn r_squared(actual: &[f64], fitted: &[f64]) -> f64 {
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(fitted)
        .map(|(y, f)| (y - f).powi(2))
        .sum();
    if ss_tot == 0.0 {
        return 1.0;
    }
    1.0 - ss_res / ss_tot
}
