//! Core matrix data structure and algebra.
//!
//! # Dense Matrices
//!
//! [`Matrix`] is a dense two-dimensional `f64` container. It exclusively owns
//! its buffer and every operation other than the optimizer's in-place update
//! allocates a fresh result, so gradients and parameters can be reasoned
//! about as plain values.
//!
//! It supports:
//! - Construction from flat data, nested rows, constants or a generator closure
//! - Element-wise addition, subtraction, multiplication and division
//! - Matrix multiplication built on row/column [`View`]s
//! - Transposition by flipping the storage order instead of reshuffling data
//! - Scalar helpers (`scale`, `negate`, `add_scalar`, `divide_scalar`) and `map`
//!
//! ## Design Highlights
//! - Shape is `(rows, cols)`, both at least 1, checked at construction
//! - The buffer is either row-major or column-major; every accessor goes
//!   through row/column views, so callers never see the difference
//! - Equality is structural and exact: same dims, same elements in logical
//!   row-major order (no floating-point tolerance)
//! - Binary operations validate shapes before allocating any output
//!
//! ## Limitations
//! - No broadcasting
//! - `f64` elements only
//!
//! ## Example
//!
//! ```rust
//! use quantum_nn::Matrix;
//!
//! let m = Matrix::new(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])?;
//! assert_eq!(m.shape(), (2, 3));
//! assert_eq!(m.transpose().transpose(), m);
//! # Ok::<(), quantum_nn::Error>(())
//! ```

mod view;

use core::fmt;
use core::ops::Neg;

use briny::prelude::*;

pub use view::{View, ViewIter};

use crate::error::{Error, Result, ShapeError};
use crate::ops::cpu;

/// A column vector is just a matrix with one column.
pub type Vector = Matrix;

/// Physical layout of the element buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Order {
    /// `data[i * cols + j]`
    RowMajor,
    /// `data[j * rows + i]`
    ColMajor,
}

/// Unchecked construction parameters, run through `briny`'s validation gate.
struct RawMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Validate for RawMatrix {
    fn validate(&self) -> core::result::Result<(), ValidationError> {
        match self.rows.checked_mul(self.cols) {
            Some(n) if n == self.data.len() => Ok(()),
            _ => Err(ValidationError),
        }
    }
}

/// A dense `rows × cols` matrix of `f64`.
#[derive(Debug, Clone)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
    order: Order,
}

impl Matrix {
    /// Creates a matrix from row-major `data`.
    ///
    /// # Errors
    /// - [`ShapeError::Empty`] if `rows` or `cols` is zero
    /// - [`Error::SizeMismatch`] if `data.len() != rows * cols`
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(ShapeError::Empty { rows, cols }.into());
        }
        let expected = rows.checked_mul(cols).unwrap_or(usize::MAX);
        let actual = data.len();

        let trusted = TrustedData::new(RawMatrix { rows, cols, data })
            .map_err(|_| Error::SizeMismatch { expected, actual })?;
        let RawMatrix { rows, cols, data } = trusted.into_inner();

        Ok(Self::from_parts(rows, cols, data))
    }

    /// Builds a matrix from a slice of equally long rows.
    ///
    /// # Errors
    /// - [`ShapeError::Empty`] if there are no rows or the first row is empty
    /// - [`Error::SizeMismatch`] if the rows are ragged
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        let data: Vec<f64> = rows
            .iter()
            .flat_map(|r| r.as_ref().iter().copied())
            .collect();
        Self::new(rows.len(), cols, data)
    }

    /// Builds a column vector (`len × 1`).
    ///
    /// # Errors
    /// [`ShapeError::Empty`] if `values` is empty.
    pub fn column(values: Vec<f64>) -> Result<Vector> {
        Self::new(values.len(), 1, values)
    }

    /// A matrix of zeros.
    ///
    /// # Errors
    /// [`ShapeError::Empty`] if either dimension is zero.
    pub fn zeros(rows: usize, cols: usize) -> Result<Self> {
        Self::constant(rows, cols, 0.0)
    }

    /// A matrix with every element set to `val`.
    ///
    /// # Errors
    /// [`ShapeError::Empty`] if either dimension is zero.
    pub fn constant(rows: usize, cols: usize, val: f64) -> Result<Self> {
        Self::generate(rows, cols, || val)
    }

    /// Fills a matrix by calling `factory` exactly `rows * cols` times in
    /// row-major order.
    ///
    /// # Errors
    /// - [`ShapeError::Empty`] if either dimension is zero
    /// - [`Error::SizeMismatch`] if `rows * cols` overflows `usize`
    ///
    /// `factory` is not called in either case.
    pub fn generate(rows: usize, cols: usize, mut factory: impl FnMut() -> f64) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(ShapeError::Empty { rows, cols }.into());
        }
        let len = rows.checked_mul(cols).ok_or(Error::SizeMismatch {
            expected: usize::MAX,
            actual: 0,
        })?;
        let data = (0..len).map(|_| factory()).collect();
        Self::new(rows, cols, data)
    }

    const fn from_parts(rows: usize, cols: usize, data: Vec<f64>) -> Self {
        Self {
            rows,
            cols,
            data,
            order: Order::RowMajor,
        }
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    #[must_use]
    pub const fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Total number of elements.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// Always `false`: a matrix has at least one element.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// `true` for column vectors (`cols == 1`) and row vectors (`rows == 1`).
    #[must_use]
    pub const fn is_vector(&self) -> bool {
        self.cols == 1 || self.rows == 1
    }

    /// Element at `(row, col)`.
    ///
    /// # Errors
    /// [`Error::Index`] if either index is out of range.
    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        self.check_row(row)?;
        self.check_col(col)?;
        Ok(self.data[self.offset(row, col)])
    }

    const fn offset(&self, row: usize, col: usize) -> usize {
        match self.order {
            Order::RowMajor => row * self.cols + col,
            Order::ColMajor => col * self.rows + row,
        }
    }

    fn check_row(&self, i: usize) -> Result<()> {
        if i < self.rows {
            Ok(())
        } else {
            Err(Error::Index {
                axis: "row",
                index: i,
                len: self.rows,
            })
        }
    }

    fn check_col(&self, j: usize) -> Result<()> {
        if j < self.cols {
            Ok(())
        } else {
            Err(Error::Index {
                axis: "column",
                index: j,
                len: self.cols,
            })
        }
    }

    /// Lazy view over row `i`.
    ///
    /// # Errors
    /// [`Error::Index`] if `i >= rows`.
    pub fn row_view(&self, i: usize) -> Result<View<'_>> {
        self.check_row(i)?;
        Ok(self.row_view_unchecked(i))
    }

    /// Lazy view over column `j`.
    ///
    /// # Errors
    /// [`Error::Index`] if `j >= cols`.
    pub fn col_view(&self, j: usize) -> Result<View<'_>> {
        self.check_col(j)?;
        Ok(self.col_view_unchecked(j))
    }

    pub(crate) fn row_view_unchecked(&self, i: usize) -> View<'_> {
        match self.order {
            Order::RowMajor => View::new(&self.data, i * self.cols, 1, self.cols),
            Order::ColMajor => View::new(&self.data, i, self.rows, self.cols),
        }
    }

    pub(crate) fn col_view_unchecked(&self, j: usize) -> View<'_> {
        match self.order {
            Order::RowMajor => View::new(&self.data, j, self.cols, self.rows),
            Order::ColMajor => View::new(&self.data, j * self.rows, 1, self.rows),
        }
    }

    /// All row views, top to bottom.
    pub fn row_views(&self) -> impl Iterator<Item = View<'_>> + '_ {
        (0..self.rows).map(|i| self.row_view_unchecked(i))
    }

    /// All column views, left to right.
    pub fn col_views(&self) -> impl Iterator<Item = View<'_>> + '_ {
        (0..self.cols).map(|j| self.col_view_unchecked(j))
    }

    /// Elements in logical row-major order.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.row_views().flat_map(View::into_iter)
    }

    /// Copies the elements out in row-major order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        match self.order {
            Order::RowMajor => self.data.clone(),
            Order::ColMajor => self.iter().collect(),
        }
    }

    /// Sum of all elements.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Transposed copy.
    ///
    /// The buffer is copied as-is and only the storage order flips, so the
    /// former columns are served as rows by the views. The result is an
    /// independent value; mutating one never affects the other.
    #[must_use]
    pub fn transpose(&self) -> Self {
        self.clone().into_transpose()
    }

    /// Transposes in place of `self`, reusing the buffer.
    #[must_use]
    pub fn into_transpose(self) -> Self {
        Self {
            rows: self.cols,
            cols: self.rows,
            data: self.data,
            order: match self.order {
                Order::RowMajor => Order::ColMajor,
                Order::ColMajor => Order::RowMajor,
            },
        }
    }

    fn check_same_shape(&self, other: &Self, op: &'static str) -> Result<()> {
        if self.shape() == other.shape() {
            Ok(())
        } else {
            Err(Error::incompatible(op, self.shape(), other.shape()))
        }
    }

    /// Element-wise combination of two equally shaped matrices.
    fn combine(&self, other: &Self, op: &'static str, f: impl Fn(f64, f64) -> f64) -> Result<Self> {
        self.check_same_shape(other, op)?;

        if self.order == other.order {
            return Ok(Self {
                data: cpu::zip_with(&self.data, &other.data, f),
                ..*self
            });
        }

        let data = self.iter().zip(other.iter()).map(|(a, b)| f(a, b)).collect();
        Ok(Self::from_parts(self.rows, self.cols, data))
    }

    /// `self + other`.
    ///
    /// # Errors
    /// [`ShapeError::Incompatible`] unless both dims match.
    pub fn add(&self, other: &Self) -> Result<Self> {
        self.combine(other, "addition", |a, b| a + b)
    }

    /// `self - other`.
    ///
    /// # Errors
    /// [`ShapeError::Incompatible`] unless both dims match.
    pub fn subtract(&self, other: &Self) -> Result<Self> {
        self.combine(other, "subtraction", |a, b| a - b)
    }

    /// Element-wise (Hadamard) product.
    ///
    /// # Errors
    /// [`ShapeError::Incompatible`] unless both dims match.
    pub fn elementwise_multiply(&self, other: &Self) -> Result<Self> {
        self.combine(other, "element-wise multiplication", |a, b| a * b)
    }

    /// Element-wise quotient.
    ///
    /// # Errors
    /// - [`ShapeError::Incompatible`] unless both dims match
    /// - [`Error::DivisionByZero`] if `other` contains an exact zero
    pub fn elementwise_divide(&self, other: &Self) -> Result<Self> {
        self.check_same_shape(other, "element-wise division")?;
        if other.data.contains(&0.0) {
            return Err(Error::DivisionByZero);
        }
        self.combine(other, "element-wise division", |a, b| a / b)
    }

    /// Matrix product `self @ other`.
    ///
    /// Element `(i, j)` is the dot product of row view `i` of `self` and
    /// column view `j` of `other`. Output rows are computed in parallel.
    ///
    /// # Errors
    /// [`ShapeError::Incompatible`] unless `self.cols() == other.rows()`.
    /// The check happens before the output is allocated.
    ///
    /// # Example
    /// ```rust
    /// use quantum_nn::Matrix;
    ///
    /// let a = Matrix::constant(4, 6, 3.0)?;
    /// let b = Matrix::constant(6, 5, 4.0)?;
    /// assert_eq!(a.matmul(&b)?, Matrix::constant(4, 5, 72.0)?);
    /// # Ok::<(), quantum_nn::Error>(())
    /// ```
    pub fn matmul(&self, other: &Self) -> Result<Self> {
        if self.cols != other.rows {
            return Err(Error::incompatible(
                "multiplication",
                self.shape(),
                other.shape(),
            ));
        }
        Ok(Self::from_parts(
            self.rows,
            other.cols,
            cpu::matmul(self, other),
        ))
    }

    /// Applies `f` to every element, keeping the shape.
    #[must_use]
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            data: cpu::map(&self.data, f),
            ..*self
        }
    }

    /// `k * self`.
    #[must_use]
    pub fn scale(&self, k: f64) -> Self {
        self.map(|x| k * x)
    }

    /// `-self`.
    #[must_use]
    pub fn negate(&self) -> Self {
        self.map(|x| -x)
    }

    /// `self + k` element-wise.
    #[must_use]
    pub fn add_scalar(&self, k: f64) -> Self {
        self.map(|x| x + k)
    }

    /// `self / k` element-wise.
    ///
    /// # Errors
    /// [`Error::DivisionByZero`] if `k == 0`.
    pub fn divide_scalar(&self, k: f64) -> Result<Self> {
        if k == 0.0 {
            return Err(Error::DivisionByZero);
        }
        Ok(self.map(|x| x / k))
    }

    /// In-place `self -= other`.
    ///
    /// This is the only mutating operation on a matrix and is reserved for
    /// parameter updates driven by an optimizer.
    pub(crate) fn sub_assign(&mut self, other: &Self) -> Result<()> {
        self.check_same_shape(other, "subtraction")?;
        if self.order == other.order {
            cpu::sub_assign(&mut self.data, other.data.iter().copied());
        } else {
            let rows = self.rows;
            let cols = self.cols;
            for i in 0..rows {
                for j in 0..cols {
                    let k = self.offset(i, j);
                    self.data[k] -= other.data[other.offset(i, j)];
                }
            }
        }
        Ok(())
    }
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        if self.shape() != other.shape() {
            return false;
        }
        if self.order == other.order {
            return self.data == other.data;
        }
        self.iter().eq(other.iter())
    }
}

impl Neg for &Matrix {
    type Output = Matrix;

    fn neg(self) -> Matrix {
        self.negate()
    }
}

impl Neg for Matrix {
    type Output = Self;

    fn neg(self) -> Self {
        self.negate()
    }
}

impl fmt::Display for Matrix {
    /// One bracketed line per row, values right-aligned in 7 columns.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.row_views().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            f.write_str("[ ")?;
            for (j, val) in row.iter().enumerate() {
                if j > 0 {
                    f.write_str(" ")?;
                }
                if val.abs() >= 1000.0 {
                    write!(f, "{val:7.1e}")?;
                } else {
                    write!(f, "{val:7.3}")?;
                }
            }
            f.write_str(" ]")?;
        }
        Ok(())
    }
}

/// Defines a matrix from nested literal rows.
///
/// # Panics
/// Panics on ragged rows, like any malformed literal.
///
/// # Example
/// ```
/// use quantum_nn::matrix;
/// let m = matrix!([1.0, 2.0], [3.0, 4.0]);
/// assert_eq!(m.shape(), (2, 2));
/// ```
#[macro_export]
macro_rules! matrix {
    ($([$($x:expr),+ $(,)?]),+ $(,)?) => {
        $crate::Matrix::from_rows(&[$(&[$(f64::from($x)),+][..]),+])
            .expect("ragged matrix literal (rows have mismatched lengths)")
    };
}
