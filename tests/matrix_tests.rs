use approx::assert_relative_eq;
use quantum_nn::{matrix, Error, Matrix, ShapeError};

fn assert_matrix_eq(a: &Matrix, b: &Matrix) {
    assert_eq!(a.shape(), b.shape());
    for (x, y) in a.iter().zip(b.iter()) {
        assert_relative_eq!(x, y, epsilon = 1e-9, max_relative = 1e-9);
    }
}

#[test]
fn test_matrix_creation() {
    let m = Matrix::new(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
    assert_eq!(m.shape(), (2, 2));
    assert_eq!(m.to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
    assert_eq!(m.get(1, 0).unwrap(), 3.0);
}

#[test]
fn test_matrix_macro() {
    let m = matrix!([1, 2, 3], [4, 5, 6]);
    assert_eq!(m.shape(), (2, 3));
    assert_eq!(m.to_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
}

#[test]
fn test_size_mismatch() {
    let err = Matrix::new(2, 2, vec![1.0, 2.0, 3.0]).unwrap_err();
    assert_eq!(
        err,
        Error::SizeMismatch {
            expected: 4,
            actual: 3
        }
    );
}

#[test]
fn test_empty_dims_rejected() {
    assert!(matches!(
        Matrix::zeros(0, 3),
        Err(Error::Shape(ShapeError::Empty { rows: 0, cols: 3 }))
    ));
    assert!(Matrix::new(3, 0, vec![]).is_err());
}

#[test]
fn test_overflowing_dims_rejected() {
    assert!(matches!(
        Matrix::zeros(usize::MAX, 2),
        Err(Error::SizeMismatch { .. })
    ));
    assert!(matches!(
        Matrix::generate(2, usize::MAX, || unreachable!()),
        Err(Error::SizeMismatch { .. })
    ));
    assert!(Matrix::new(usize::MAX, 2, vec![0.0]).is_err());
}

#[test]
fn test_ragged_rows_rejected() {
    let rows: [&[f64]; 2] = [&[1.0, 2.0], &[3.0]];
    assert!(Matrix::from_rows(&rows).is_err());
}

#[test]
fn test_zeros_and_constant() {
    for (rows, cols) in [(1, 1), (3, 7), (8, 2)] {
        assert!(Matrix::zeros(rows, cols).unwrap().iter().all(|x| x == 0.0));
        assert!(
            Matrix::constant(rows, cols, -2.5)
                .unwrap()
                .iter()
                .all(|x| x == -2.5)
        );
    }
}

#[test]
fn test_generate_is_row_major() {
    let mut next = 0.0;
    let m = Matrix::generate(2, 3, || {
        next += 1.0;
        next
    })
    .unwrap();
    assert_eq!(m, matrix!([1, 2, 3], [4, 5, 6]));
}

#[test]
fn test_transpose_involution() {
    let m = matrix!([1, 2, 3], [4, 5, 6]);
    let t = m.transpose();
    assert_eq!(t.shape(), (3, 2));
    assert_eq!(t.to_vec(), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    assert_eq!(t.transpose(), m);
    assert_eq!(m.clone().into_transpose(), t);
}

#[test]
fn test_equality_is_structural() {
    let a = Matrix::new(2, 3, vec![0.0; 6]).unwrap();
    let b = Matrix::new(3, 2, vec![0.0; 6]).unwrap();
    assert_ne!(a, b);
    assert_eq!(a, Matrix::zeros(2, 3).unwrap());
}

#[test]
fn test_matmul_square() {
    let a = Matrix::new(3, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]).unwrap();
    let expected =
        Matrix::new(3, 3, vec![30.0, 36.0, 42.0, 66.0, 81.0, 96.0, 102.0, 126.0, 150.0]).unwrap();
    assert_eq!(a.matmul(&a).unwrap(), expected);
}

#[test]
fn test_matmul_constants() {
    let a = Matrix::constant(4, 6, 3.0).unwrap();
    let b = Matrix::constant(6, 5, 4.0).unwrap();
    assert_eq!(a.matmul(&b).unwrap(), Matrix::constant(4, 5, 72.0).unwrap());
}

#[test]
fn test_matmul_with_transposed_operands() {
    let a = matrix!([1, 2], [3, 4], [5, 6]);
    // aᵀ @ a through a column-major operand on the left
    let ata = a.transpose().matmul(&a).unwrap();
    assert_eq!(ata, matrix!([35, 44], [44, 56]));
    // a @ aᵀ through a column-major operand on the right
    let aat = a.matmul(&a.transpose()).unwrap();
    assert_eq!(aat, matrix!([5, 11, 17], [11, 25, 39], [17, 39, 61]));
}

#[test]
fn test_matmul_associative() {
    let a = matrix!([0.5, -1.25, 2.0], [3.0, 0.1, -0.7]);
    let b = matrix!([1.5, 2.0], [-0.3, 0.9], [4.0, -2.2]);
    let c = matrix!([0.25, -1.0, 3.3], [1.1, 0.6, -0.4]);
    let left = a.matmul(&b).unwrap().matmul(&c).unwrap();
    let right = a.matmul(&b.matmul(&c).unwrap()).unwrap();
    assert_matrix_eq(&left, &right);
}

#[test]
fn test_matmul_shape_error() {
    let a = Matrix::zeros(2, 3).unwrap();
    let b = Matrix::zeros(2, 3).unwrap();
    let err = a.matmul(&b).unwrap_err();
    assert_eq!(
        err,
        Error::Shape(ShapeError::Incompatible {
            op: "multiplication",
            left: (2, 3),
            right: (2, 3),
        })
    );
    assert!(err.to_string().starts_with("Matrix A has dims (2, 3) while Matrix B has dims (2, 3)"));
}

#[test]
fn test_add_mismatch_leaves_operands_unchanged() {
    let a = matrix!([1, 2], [3, 4]);
    let b = matrix!([1, 2, 3]);
    let (a0, b0) = (a.clone(), b.clone());
    assert!(matches!(
        a.add(&b),
        Err(Error::Shape(ShapeError::Incompatible { .. }))
    ));
    assert!(a.subtract(&b).is_err());
    assert!(a.elementwise_multiply(&b).is_err());
    assert_eq!(a, a0);
    assert_eq!(b, b0);
}

#[test]
fn test_elementwise_ops() {
    let a = matrix!([1, 2], [3, 4]);
    let b = matrix!([4, 3], [2, 1]);
    assert_eq!(a.add(&b).unwrap(), Matrix::constant(2, 2, 5.0).unwrap());
    assert_eq!(a.subtract(&b).unwrap(), matrix!([-3, -1], [1, 3]));
    assert_eq!(a.elementwise_multiply(&b).unwrap(), matrix!([4, 6], [6, 4]));
    assert_eq!(a.elementwise_divide(&b).unwrap(), matrix!([0.25, 2.0 / 3.0], [1.5, 4]));
}

#[test]
fn test_division_by_zero() {
    let a = matrix!([1, 2]);
    assert_eq!(
        a.elementwise_divide(&matrix!([1, 0])).unwrap_err(),
        Error::DivisionByZero
    );
    assert_eq!(a.divide_scalar(0.0).unwrap_err(), Error::DivisionByZero);
    assert_eq!(a.divide_scalar(2.0).unwrap(), matrix!([0.5, 1]));
}

#[test]
fn test_scalar_helpers() {
    let a = matrix!([1, -2], [0, 4]);
    assert_eq!(a.map(|x| x * x), matrix!([1, 4], [0, 16]));
    assert_eq!(a.scale(3.0), matrix!([3, -6], [0, 12]));
    assert_eq!(a.negate(), -&a);
    assert_eq!(-a.clone(), matrix!([-1, 2], [0, -4]));
    assert_eq!(a.add_scalar(1.0), matrix!([2, -1], [1, 5]));
    assert_eq!(a.sum(), 3.0);
}

#[test]
fn test_views() {
    let m = matrix!([1, 2, 3], [4, 5, 6]);
    assert_eq!(m.row_view(1).unwrap().to_vec(), vec![4.0, 5.0, 6.0]);
    assert_eq!(m.col_view(2).unwrap().to_vec(), vec![3.0, 6.0]);
    assert_eq!(m.row_view(0).unwrap().len(), 3);

    let t = m.transpose();
    assert_eq!(t.row_view(2).unwrap().to_vec(), vec![3.0, 6.0]);
    assert_eq!(t.col_view(1).unwrap().to_vec(), vec![4.0, 5.0, 6.0]);

    let rows: Vec<Vec<f64>> = m.row_views().map(|v| v.to_vec()).collect();
    assert_eq!(rows, vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
    assert_eq!(m.col_views().count(), 3);
}

#[test]
fn test_view_index_errors() {
    let m = Matrix::zeros(2, 3).unwrap();
    assert_eq!(
        m.row_view(2).unwrap_err(),
        Error::Index {
            axis: "row",
            index: 2,
            len: 2
        }
    );
    assert!(matches!(m.col_view(3), Err(Error::Index { index: 3, .. })));
    assert!(m.get(0, 3).is_err());
}

#[test]
fn test_vector_helpers() {
    let v = Matrix::column(vec![1.0, 2.0, 3.0]).unwrap();
    assert_eq!(v.shape(), (3, 1));
    assert!(v.is_vector());
    assert!(v.transpose().is_vector());
    assert!(!Matrix::zeros(2, 2).unwrap().is_vector());
    assert_eq!(v.len(), 3);
}
