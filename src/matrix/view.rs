//! Lazy row and column views.
//!
//! A [`View`] is a strided window over a matrix's buffer: a start offset,
//! a stride and a length. It holds no iteration state of its own, so a view
//! can be iterated any number of times and copied freely. Whether a view
//! walks a row or a column is decided by the matrix when the view is made,
//! which is what lets a transposed matrix hand out its former columns as
//! rows without touching the data.

use core::iter::FusedIterator;

/// A lazy, restartable sequence over one row or one column of a matrix.
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    data: &'a [f64],
    start: usize,
    stride: usize,
    len: usize,
}

impl<'a> View<'a> {
    pub(crate) const fn new(data: &'a [f64], start: usize, stride: usize, len: usize) -> Self {
        Self {
            data,
            start,
            stride,
            len,
        }
    }

    /// Number of elements in the view.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Always `false` for views produced by a [`Matrix`](crate::Matrix).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Element at position `i`, or `None` past the end.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<f64> {
        (i < self.len).then(|| self.data[self.start + i * self.stride])
    }

    /// A fresh iterator starting at the first element.
    #[must_use]
    pub const fn iter(&self) -> ViewIter<'a> {
        ViewIter {
            view: *self,
            front: 0,
            back: self.len,
        }
    }

    /// Dot product of two views of equal length.
    ///
    /// This is the inner loop of matrix multiplication; it is agnostic of
    /// whether either side came from a row or a column.
    #[must_use]
    pub fn dot(&self, other: &View<'_>) -> f64 {
        debug_assert_eq!(self.len, other.len, "dot product of unequal views");
        self.iter().zip(other.iter()).map(|(a, b)| a * b).sum()
    }

    /// Copies the viewed elements out.
    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().collect()
    }
}

impl<'a> IntoIterator for View<'a> {
    type Item = f64;
    type IntoIter = ViewIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for &View<'a> {
    type Item = f64;
    type IntoIter = ViewIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`View`].
#[derive(Debug, Clone)]
pub struct ViewIter<'a> {
    view: View<'a>,
    front: usize,
    back: usize,
}

impl Iterator for ViewIter<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.front == self.back {
            return None;
        }
        let x = self.view.data[self.view.start + self.front * self.view.stride];
        self.front += 1;
        Some(x)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n, Some(n))
    }
}

impl DoubleEndedIterator for ViewIter<'_> {
    fn next_back(&mut self) -> Option<f64> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(self.view.data[self.view.start + self.back * self.view.stride])
    }
}

impl ExactSizeIterator for ViewIter<'_> {}
impl FusedIterator for ViewIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strided_view_walks_a_column() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let col = View::new(&data, 1, 3, 2);
        assert_eq!(col.to_vec(), vec![2.0, 5.0]);
        assert_eq!(col.get(1), Some(5.0));
        assert_eq!(col.get(2), None);
    }

    #[test]
    fn view_is_restartable() {
        let data = [1.0, 2.0, 3.0];
        let row = View::new(&data, 0, 1, 3);
        let first: Vec<f64> = row.iter().collect();
        let second: Vec<f64> = row.into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(row.iter().rev().collect::<Vec<_>>(), vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn dot_of_row_and_column() {
        let data = [1.0, 2.0, 3.0, 4.0];
        let row = View::new(&data, 0, 1, 2);
        let col = View::new(&data, 0, 2, 2);
        // [1, 2] . [1, 3]
        assert_eq!(row.dot(&col), 7.0);
    }
}
