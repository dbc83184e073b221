//! Column reduction of (co)boundary matrices.
//!
//! The reduction brings a square, strictly upper triangular matrix $M$ into a form $R = M V$ in
//! which no two non-zero columns share their lowest non-zero row (their *pivot*), where $V$ is
//! upper triangular with ones on the diagonal. Columns are processed left to right; a column whose
//! pivot is already owned by an earlier column has that column added to it until it is either zero
//! or has an unclaimed pivot.
//!
//! For cohomology the matrix is the coboundary matrix in reverse filtration order (see
//! [`BoundaryMatrix::coboundary`]), so all indices of a cohomological [`Reduction`] are positions
//! in that reversed order.

use fp::matrix::SparseMatrix;
use fp::sparse::SparseVector;

use crate::boundary::BoundaryMatrix;
use crate::cancel::CancellationToken;
use crate::error::Result;

/// Which matrix is reduced, and hence in which order the simplices are indexed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// The boundary matrix, indexed by filtration index.
    Homology,
    /// The anti-transposed boundary matrix, indexed by reversed filtration index.
    Cohomology,
}

impl Direction {
    /// Convert an index of a reduction in this direction to a filtration index, for a filtration
    /// with `len` simplices.
    pub fn to_filtration_index(self, index: usize, len: usize) -> usize {
        match self {
            Self::Homology => index,
            Self::Cohomology => len - 1 - index,
        }
    }

    pub fn matrix(self, boundary: &BoundaryMatrix) -> SparseMatrix {
        match self {
            Self::Homology => boundary.matrix().clone(),
            Self::Cohomology => boundary.coboundary(),
        }
    }
}

/// Runs the standard persistence reduction with a pivot table indexed by row.
pub struct ReductionEngine<'a> {
    cancel: &'a CancellationToken,
}

impl<'a> ReductionEngine<'a> {
    pub fn new(cancel: &'a CancellationToken) -> Self {
        Self { cancel }
    }

    /// Reduce the (co)boundary matrix of `boundary` in the given direction.
    pub fn run(&self, boundary: &BoundaryMatrix, direction: Direction) -> Result<Reduction> {
        self.reduce(direction.matrix(boundary), direction)
    }

    #[tracing::instrument(skip_all, fields(direction = ?direction, columns = matrix.columns(), pairs, essential))]
    pub fn reduce(&self, matrix: SparseMatrix, direction: Direction) -> Result<Reduction> {
        let n = matrix.columns();
        assert_eq!(matrix.rows(), n, "reduction of a non-square matrix");

        let mut reduced = matrix.into_columns();
        let mut triangular: Vec<SparseVector> =
            (0..n).map(|j| SparseVector::from_sorted(vec![j])).collect();
        let mut pivot_owner: Vec<Option<usize>> = vec![None; n];

        for j in 0..n {
            self.cancel.check(j)?;

            // Columns before j are final, so we split the column storage to add them to column j
            // without cloning.
            let (done, rest) = reduced.split_at_mut(j);
            let column = &mut rest[0];
            let (done_v, rest_v) = triangular.split_at_mut(j);
            let column_v = &mut rest_v[0];

            while let Some(pivot) = column.pivot() {
                match pivot_owner[pivot] {
                    Some(owner) => {
                        *column += &done[owner];
                        *column_v += &done_v[owner];
                    }
                    None => {
                        pivot_owner[pivot] = Some(j);
                        break;
                    }
                }
            }
        }

        let result = Reduction {
            direction,
            reduced: SparseMatrix::from_columns(n, reduced),
            triangular: SparseMatrix::from_columns(n, triangular),
            pivot_owner,
        };

        let span = tracing::Span::current();
        span.record("pairs", result.pairs().count());
        span.record("essential", result.essential().count());
        Ok(result)
    }
}

/// The result of a reduction: the reduced matrix $R$, the triangular matrix $V$ with $R = M V$,
/// and the pivot table.
#[derive(Clone, Debug)]
pub struct Reduction {
    direction: Direction,
    reduced: SparseMatrix,
    triangular: SparseMatrix,
    /// `pivot_owner[i]` is the column of `reduced` whose pivot is `i`, if any.
    pivot_owner: Vec<Option<usize>>,
}

impl Reduction {
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn len(&self) -> usize {
        self.pivot_owner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pivot_owner.is_empty()
    }

    pub fn reduced(&self) -> &SparseMatrix {
        &self.reduced
    }

    pub fn triangular(&self) -> &SparseMatrix {
        &self.triangular
    }

    pub fn pivot_owner(&self, row: usize) -> Option<usize> {
        self.pivot_owner[row]
    }

    /// Whether `row` is the pivot of some reduced column.
    pub fn is_pivot(&self, row: usize) -> bool {
        self.pivot_owner[row].is_some()
    }

    /// The persistence pairs `(pivot, column)`, ordered by column. The pivot is the index at which
    /// the class is born and the column the index at which it dies.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let mut pairs: Vec<(usize, usize)> = self
            .pivot_owner
            .iter()
            .enumerate()
            .filter_map(|(row, owner)| owner.map(|col| (row, col)))
            .collect();
        pairs.sort_unstable_by_key(|&(_, col)| col);
        pairs.into_iter()
    }

    /// A column that reduces to zero and is not the pivot of any other column generates a class
    /// that never dies.
    pub fn is_essential(&self, i: usize) -> bool {
        self.reduced.column(i).is_zero() && !self.is_pivot(i)
    }

    pub fn essential(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).filter(|&i| self.is_essential(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filtration::tests::closure;
    use crate::filtration::Filtration;
    use rstest::rstest;

    fn reduce(simplices: Vec<Vec<usize>>, direction: Direction) -> (BoundaryMatrix, Reduction) {
        let f = Filtration::new(simplices).unwrap();
        let b = BoundaryMatrix::new(&f);
        let cancel = CancellationToken::new();
        let r = ReductionEngine::new(&cancel).run(&b, direction).unwrap();
        (b, r)
    }

    #[test]
    fn test_edge_cohomology() {
        let (_, r) = reduce(vec![vec![0], vec![1], vec![0, 1]], Direction::Cohomology);
        assert_eq!(r.pairs().collect::<Vec<_>>(), vec![(0, 1)]);
        assert_eq!(r.essential().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_circle_homology() {
        let (_, r) = reduce(closure(&[&[0, 1], &[1, 2], &[0, 2]]), Direction::Homology);
        assert_eq!(r.pairs().collect::<Vec<_>>(), vec![(1, 3), (2, 4)]);
        assert_eq!(r.essential().collect::<Vec<_>>(), vec![0, 5]);
    }

    #[rstest]
    #[case(Direction::Homology)]
    #[case(Direction::Cohomology)]
    fn test_factorisation(#[case] direction: Direction) {
        let (b, r) = reduce(closure(&[&[0, 1, 2], &[1, 2, 3], &[0, 3]]), direction);
        let m = direction.matrix(&b);
        let n = m.columns();
        // Check R = M V column by column, and that V is unitriangular.
        for j in 0..n {
            let v = r.triangular().column(j);
            assert_eq!(v.pivot(), Some(j));
            let mut product = SparseVector::new();
            for i in v.iter() {
                product += m.column(i);
            }
            assert_eq!(&product, r.reduced().column(j));
        }
        // Pivots are distinct.
        let mut pivots: Vec<usize> = r.reduced().iter().filter_map(SparseVector::pivot).collect();
        let count = pivots.len();
        pivots.sort_unstable();
        pivots.dedup();
        assert_eq!(pivots.len(), count);
    }

    #[test]
    fn test_duality() {
        // Homology pairs (b, d) correspond to cohomology pairs (n - 1 - d, n - 1 - b).
        let simplices = closure(&[&[0, 1, 2], &[2, 3], &[3, 4], &[2, 4]]);
        let n = simplices.len();
        let (_, h) = reduce(simplices.clone(), Direction::Homology);
        let (_, c) = reduce(simplices, Direction::Cohomology);
        let mut dual: Vec<(usize, usize)> =
            h.pairs().map(|(b, d)| (n - 1 - d, n - 1 - b)).collect();
        dual.sort_unstable_by_key(|&(_, d)| d);
        assert_eq!(c.pairs().collect::<Vec<_>>(), dual);
        assert_eq!(h.essential().count(), c.essential().count());
    }

    #[test]
    fn test_cancelled() {
        let f = Filtration::new(closure(&[&[0, 1, 2]])).unwrap();
        let b = BoundaryMatrix::new(&f);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = ReductionEngine::new(&cancel)
            .run(&b, Direction::Cohomology)
            .unwrap_err();
        assert!(matches!(err, crate::error::SteenroderError::Cancelled { columns: 0 }));
    }
}
