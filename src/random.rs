//! Random matrix construction.
//!
//! Matrices drawn from uniform and Gaussian distributions, used for weight
//! initialisation and noise inputs.
//!
//! Every draw comes from a [`MatrixRng`]. Seeded generators are a pure
//! function of the seed and the sequence of calls made on them, so two
//! generators built from the same seed and driven the same way produce
//! identical matrices. When work is spread over threads, give each thread
//! its own generator via [`MatrixRng::split`] rather than sharing one.
//!
//! # Example
//!
//! ```rust
//! use quantum_nn::random::MatrixRng;
//!
//! let a = MatrixRng::seeded(7).gauss(3, 2, 0.0, 0.2)?;
//! let b = MatrixRng::seeded(7).gauss(3, 2, 0.0, 0.2)?;
//! assert_eq!(a, b);
//! # Ok::<(), quantum_nn::Error>(())
//! ```

use rand::distr::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;

use crate::error::{Error, Result, ShapeError};
use crate::matrix::{Matrix, Vector};

/// Mean of the default weight initialisation distribution.
pub const DEFAULT_MU: f64 = 0.0;
/// Standard deviation of the default weight initialisation distribution.
pub const DEFAULT_SIGMA: f64 = 0.2;

/// A random stream that produces matrices.
#[derive(Debug, Clone)]
pub struct MatrixRng {
    rng: StdRng,
}

impl MatrixRng {
    /// Deterministic generator.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generator seeded from operating-system entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Seeded when `seed` is given, entropy-backed otherwise.
    #[must_use]
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }

    /// Derives an independent child generator.
    ///
    /// The child's seed is drawn from this stream, so a seeded parent yields
    /// the same children in the same order on every run.
    #[must_use]
    pub fn split(&mut self) -> Self {
        Self::seeded(self.rng.random())
    }

    /// Elements drawn independently from the uniform distribution on
    /// `[lower, upper)`.
    ///
    /// # Errors
    /// - [`ShapeError::Empty`] if either dimension is zero
    /// - [`Error::Distribution`] if `lower > upper` or either bound is not finite
    pub fn uniform(&mut self, rows: usize, cols: usize, lower: f64, upper: f64) -> Result<Matrix> {
        check_dims(rows, cols)?;
        if lower > upper {
            return Err(Error::Distribution(format!(
                "lower bound cannot be greater than upper bound: ({lower:.3}, {upper:.3})"
            )));
        }
        if lower == upper && lower.is_finite() {
            return Matrix::constant(rows, cols, lower);
        }
        let dist = Uniform::new(lower, upper).map_err(|e| Error::Distribution(e.to_string()))?;
        Matrix::generate(rows, cols, || dist.sample(&mut self.rng))
    }

    /// Elements drawn independently from `N(mu, sigma²)`.
    ///
    /// # Errors
    /// - [`ShapeError::Empty`] if either dimension is zero
    /// - [`Error::Distribution`] if `sigma` is negative or not finite
    pub fn gauss(&mut self, rows: usize, cols: usize, mu: f64, sigma: f64) -> Result<Matrix> {
        check_dims(rows, cols)?;
        if !(sigma.is_finite() && sigma >= 0.0) {
            return Err(Error::Distribution(format!(
                "standard deviation must be finite and non-negative, got {sigma}"
            )));
        }
        let dist = Normal::new(mu, sigma).map_err(|e| Error::Distribution(e.to_string()))?;
        Matrix::generate(rows, cols, || dist.sample(&mut self.rng))
    }

    /// Column vector of Gaussian noise, the usual generator input.
    ///
    /// # Errors
    /// Same as [`MatrixRng::gauss`].
    pub fn noise_vector(&mut self, len: usize, mu: f64, sigma: f64) -> Result<Vector> {
        self.gauss(len, 1, mu, sigma)
    }

    /// Picks `n` distinct elements of `source` (in row-major order) and
    /// returns them as a column vector.
    ///
    /// # Errors
    /// - [`Error::Distribution`] if `n` exceeds the number of elements
    /// - [`ShapeError::Empty`] if `n` is zero
    pub fn sample(&mut self, source: &Matrix, n: usize) -> Result<Vector> {
        let available = source.len();
        if n > available {
            return Err(Error::Distribution(format!(
                "requested {n} samples, only {available} available"
            )));
        }
        check_dims(n, 1)?;
        let elements = source.to_vec();
        let picked = rand::seq::index::sample(&mut self.rng, available, n)
            .into_iter()
            .map(|i| elements[i])
            .collect();
        Matrix::column(picked)
    }
}

impl Default for MatrixRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

fn check_dims(rows: usize, cols: usize) -> Result<()> {
    if rows == 0 || cols == 0 {
        return Err(ShapeError::Empty { rows, cols }.into());
    }
    Ok(())
}

/// Uniform matrix on `[lower, upper)`, optionally seeded.
///
/// # Errors
/// See [`MatrixRng::uniform`].
pub fn uniform(rows: usize, cols: usize, lower: f64, upper: f64, seed: Option<u64>) -> Result<Matrix> {
    MatrixRng::from_seed(seed).uniform(rows, cols, lower, upper)
}

/// Gaussian matrix `N(mu, sigma²)`, optionally seeded.
///
/// Use [`DEFAULT_MU`] and [`DEFAULT_SIGMA`] for weight initialisation.
///
/// # Errors
/// See [`MatrixRng::gauss`].
pub fn gauss(rows: usize, cols: usize, mu: f64, sigma: f64, seed: Option<u64>) -> Result<Matrix> {
    MatrixRng::from_seed(seed).gauss(rows, cols, mu, sigma)
}
