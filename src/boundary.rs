use std::fmt;

use fp::matrix::SparseMatrix;
use fp::sparse::SparseVector;

use crate::filtration::Filtration;

/// The boundary matrix of a filtration over $\mathbb{F}_2$. Column `j` holds the filtration indices
/// of the codimension one faces of simplex `j`, so the matrix is square and strictly upper
/// triangular.
#[derive(Clone, PartialEq, Eq)]
pub struct BoundaryMatrix {
    matrix: SparseMatrix,
}

impl BoundaryMatrix {
    pub fn new(filtration: &Filtration) -> Self {
        let n = filtration.len();
        let columns = filtration
            .simplices()
            .iter()
            .map(|s| {
                SparseVector::from_indices(s.faces().filter_map(|face| {
                    let index = filtration.index_of(face.vertices());
                    debug_assert!(index.is_some(), "face {face} missing from filtration");
                    index
                }))
            })
            .collect();
        Self {
            matrix: SparseMatrix::from_columns(n, columns),
        }
    }

    pub fn len(&self) -> usize {
        self.matrix.columns()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column(&self, j: usize) -> &SparseVector {
        self.matrix.column(j)
    }

    pub fn matrix(&self) -> &SparseMatrix {
        &self.matrix
    }

    pub fn into_matrix(self) -> SparseMatrix {
        self.matrix
    }

    /// The coboundary matrix, expressed in reversed filtration order.
    ///
    /// Entry $(i, j)$ of the result is entry $(n - 1 - j, n - 1 - i)$ of the boundary matrix. Column
    /// `j` is thus the coboundary of simplex $n - 1 - j$ and the row indices of its entries are the
    /// reversed indices of the cofaces. The result is again strictly upper triangular, so the
    /// standard column reduction applies to it unchanged.
    pub fn coboundary(&self) -> SparseMatrix {
        self.matrix.anti_transpose()
    }
}

impl fmt::Display for BoundaryMatrix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.matrix, f)
    }
}

impl fmt::Debug for BoundaryMatrix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&self.matrix, f)
    }
}

/// The boundary matrix of `filtration`.
pub fn get_boundary(filtration: &Filtration) -> BoundaryMatrix {
    BoundaryMatrix::new(filtration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;

    #[test]
    fn test_triangle() {
        let f = Filtration::new(vec![
            vec![0],
            vec![1],
            vec![2],
            vec![0, 1],
            vec![0, 2],
            vec![1, 2],
            vec![0, 1, 2],
        ])
        .unwrap();
        let b = get_boundary(&f);
        assert_eq!(b.len(), 7);
        assert_eq!(b.column(6).as_slice(), &[3, 4, 5]);
        assert!(b.column(0).is_zero());
        expect![[r#"
            [
                [0, 0, 0, 1, 1, 0, 0],
                [0, 0, 0, 1, 0, 1, 0],
                [0, 0, 0, 0, 1, 1, 0],
                [0, 0, 0, 0, 0, 0, 1],
                [0, 0, 0, 0, 0, 0, 1],
                [0, 0, 0, 0, 0, 0, 1],
                [0, 0, 0, 0, 0, 0, 0]
            ]"#]]
        .assert_eq(&b.to_string());
    }

    #[test]
    fn test_coboundary() {
        let f = Filtration::new(vec![vec![0], vec![1], vec![0, 1]]).unwrap();
        let b = get_boundary(&f);
        let c = b.coboundary();
        // The edge is first in reversed order and is the coface of both vertices.
        assert!(c.column(0).is_zero());
        assert_eq!(c.column(1).as_slice(), &[0]);
        assert_eq!(c.column(2).as_slice(), &[0]);
        assert_eq!(c.anti_transpose(), *b.matrix());
    }

    #[test]
    fn test_boundary_squared_is_zero() {
        let f = Filtration::new(crate::filtration::tests::closure(&[&[0, 1, 2, 3]])).unwrap();
        let b = get_boundary(&f);
        for j in 0..b.len() {
            let mut acc = SparseVector::new();
            for i in b.column(j).iter() {
                acc += b.column(i);
            }
            assert!(acc.is_zero(), "d^2 != 0 on column {j}");
        }
    }
}
