//! Error types shared by every module of the crate.
//!
//! All violations are raised synchronously at the call that breaks an
//! invariant. Nothing is coerced or broadcast implicitly, and no operation
//! mutates state before it has validated its operands.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, Error>;

/// Dimension mismatches.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// A matrix was declared with a zero row or column count.
    #[error("matrix dims must be positive, non-zero values: ({rows}, {cols})")]
    Empty {
        /// Declared row count.
        rows: usize,
        /// Declared column count.
        cols: usize,
    },

    /// Two operands of a binary operation do not line up.
    #[error(
        "Matrix A has dims ({}, {}) while Matrix B has dims ({}, {}); incompatible for {op}",
        left.0, left.1, right.0, right.1
    )]
    Incompatible {
        /// Operation name, e.g. `"addition"` or `"multiplication"`.
        op: &'static str,
        /// `(rows, cols)` of the left operand.
        left: (usize, usize),
        /// `(rows, cols)` of the right operand.
        right: (usize, usize),
    },

    /// A vector or parameter handed to a layer has the wrong dims.
    #[error("layer expected dims ({}, {}), got ({}, {})", expected.0, expected.1, actual.0, actual.1)]
    LayerInput {
        /// Dims the layer expects.
        expected: (usize, usize),
        /// Dims it received.
        actual: (usize, usize),
    },

    /// A layer appended to a network does not accept the previous layer's output.
    #[error("trying to add a layer with {actual} inputs, but the last layer currently has {expected} outputs")]
    Chain {
        /// Output count of the current last layer.
        expected: usize,
        /// Input count of the rejected layer.
        actual: usize,
    },
}

/// Every error the crate can produce.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Dimension mismatch.
    #[error(transparent)]
    Shape(#[from] ShapeError),

    /// Element count does not match `rows * cols`.
    #[error("expected {expected} elements for the declared dims, found {actual}")]
    SizeMismatch {
        /// `rows * cols`.
        expected: usize,
        /// Number of elements supplied.
        actual: usize,
    },

    /// Row or column index out of range.
    #[error("{axis} index {index} out of range for length {len}")]
    Index {
        /// `"row"` or `"column"`.
        axis: &'static str,
        /// Requested index.
        index: usize,
        /// Number of rows or columns available.
        len: usize,
    },

    /// Invalid construction parameter (activation name, hyperparameter, ...).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Division by an exact zero.
    #[error("divisor cannot contain 0")]
    DivisionByZero,

    /// Invalid parameters for a random distribution or sampler.
    #[error("distribution error: {0}")]
    Distribution(String),
}

impl Error {
    /// Shorthand for [`ShapeError::Incompatible`].
    pub(crate) const fn incompatible(
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    ) -> Self {
        Self::Shape(ShapeError::Incompatible { op, left, right })
    }
}
