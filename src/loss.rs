//! Loss functions.
//!
//! Pure functions of `(labels, predictions)` that a training loop calls
//! between [`Network::forward`](crate::Network::forward) and
//! [`Network::backward`](crate::Network::backward). The `*_gradient`
//! functions return the error signal with respect to the predictions, shaped
//! like the last layer's output.

use crate::error::{Error, Result};
use crate::matrix::{Matrix, Vector};

/// Probabilities are clamped into `[EPS, 1 - EPS]` before taking logarithms.
const EPS: f64 = 1e-12;

fn check(labels: &Matrix, predictions: &Matrix) -> Result<()> {
    if labels.shape() == predictions.shape() {
        Ok(())
    } else {
        Err(Error::incompatible(
            "loss evaluation",
            labels.shape(),
            predictions.shape(),
        ))
    }
}

/// Per-element half squared error, `0.5 * (l - p)^2`.
///
/// # Errors
/// [`ShapeError::Incompatible`](crate::ShapeError::Incompatible) on mismatched shapes.
pub fn squared_error(labels: &Vector, predictions: &Vector) -> Result<Vector> {
    Ok(labels.subtract(predictions)?.map(|d| 0.5 * d * d))
}

/// Gradient of [`squared_error`] with respect to the predictions, `p - l`.
///
/// # Errors
/// [`ShapeError::Incompatible`](crate::ShapeError::Incompatible) on mismatched shapes.
pub fn squared_error_gradient(labels: &Vector, predictions: &Vector) -> Result<Vector> {
    predictions.subtract(labels)
}

/// Mean squared error, `mean((p - l)^2)`.
///
/// # Errors
/// [`ShapeError::Incompatible`](crate::ShapeError::Incompatible) on mismatched shapes.
pub fn mse(labels: &Vector, predictions: &Vector) -> Result<f64> {
    let diff = predictions.subtract(labels)?;
    Ok(diff.map(|d| d * d).sum() / diff.len() as f64)
}

/// Gradient of [`mse`] with respect to the predictions, `2 (p - l) / n`.
///
/// # Errors
/// [`ShapeError::Incompatible`](crate::ShapeError::Incompatible) on mismatched shapes.
pub fn mse_gradient(labels: &Vector, predictions: &Vector) -> Result<Vector> {
    let diff = predictions.subtract(labels)?;
    let n = diff.len() as f64;
    Ok(diff.scale(2.0 / n))
}

/// Binary cross-entropy, `-1/n * Σ (y ln p + (1 - y) ln(1 - p))`.
///
/// # Errors
/// [`ShapeError::Incompatible`](crate::ShapeError::Incompatible) on mismatched shapes.
pub fn binary_cross_entropy(labels: &Vector, predictions: &Vector) -> Result<f64> {
    check(labels, predictions)?;
    let n = predictions.len() as f64;
    let total: f64 = labels
        .iter()
        .zip(predictions.iter())
        .map(|(y, p)| {
            let p = p.clamp(EPS, 1.0 - EPS);
            y * p.ln() + (1.0 - y) * (1.0 - p).ln()
        })
        .sum();
    Ok(-total / n)
}

/// Gradient of [`binary_cross_entropy`] with respect to the predictions,
/// `(p - y) / (p (1 - p) n)`.
///
/// # Errors
/// [`ShapeError::Incompatible`](crate::ShapeError::Incompatible) on mismatched shapes.
pub fn binary_cross_entropy_gradient(labels: &Vector, predictions: &Vector) -> Result<Vector> {
    check(labels, predictions)?;
    let n = predictions.len() as f64;
    let data = labels
        .iter()
        .zip(predictions.iter())
        .map(|(y, p)| {
            let p = p.clamp(EPS, 1.0 - EPS);
            (p - y) / (p * (1.0 - p) * n)
        })
        .collect();
    Matrix::new(predictions.rows(), predictions.cols(), data)
}
