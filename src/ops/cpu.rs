//! Parallel CPU kernels
//!
//! These are the raw loops behind [`Matrix`]'s algebra. They assume their
//! operands were already validated by the caller; shape checks live in
//! `matrix`, so by the time a kernel runs the output can be allocated and
//! filled unconditionally.
//!
//! ## Parallelism
//!
//! - `matmul` splits output rows across [`rayon`](https://docs.rs/rayon) workers.
//!   Every worker reads both operands and writes only its own output row, so
//!   no locking is involved.
//! - Element-wise kernels stay sequential; they are memory bound and cheap
//!   next to a matrix product.

use rayon::prelude::*;

use crate::matrix::Matrix;

/// Computes `C = A × B` for `A: m×k`, `B: k×n`, returning `C` in row-major order.
///
/// Each output element is the dot product of a row view of `A` and a column
/// view of `B`, so transposed operands need no special casing here.
///
/// # Requirements
/// - `a.cols() == b.rows()` (checked by the caller)
pub fn matmul(a: &Matrix, b: &Matrix) -> Vec<f64> {
    let n = b.cols();
    debug_assert_eq!(a.cols(), b.rows(), "matmul shape mismatch");

    let mut out_data = vec![0.0; a.rows() * n];

    out_data
        .par_chunks_mut(n)
        .enumerate()
        .for_each(|(i, row)| {
            let lhs = a.row_view_unchecked(i);
            for (j, out) in row.iter_mut().enumerate() {
                *out = lhs.dot(&b.col_view_unchecked(j));
            }
        });

    out_data
}

/// Combines two equally long buffers element by element.
pub fn zip_with(a: &[f64], b: &[f64], f: impl Fn(f64, f64) -> f64) -> Vec<f64> {
    debug_assert_eq!(a.len(), b.len(), "zip_with length mismatch");
    a.iter().zip(b).map(|(&x, &y)| f(x, y)).collect()
}

/// Applies `f` to every element.
pub fn map(a: &[f64], f: impl Fn(f64) -> f64) -> Vec<f64> {
    a.iter().map(|&x| f(x)).collect()
}

/// In-place `a[i] -= b[i]`.
pub fn sub_assign(a: &mut [f64], b: impl IntoIterator<Item = f64>) {
    for (x, y) in a.iter_mut().zip(b) {
        *x -= y;
    }
}
