use std::fmt;

use serde::Serialize;

use crate::sparse::SparseVector;
use crate::vector::FpVector;

/// A column-major matrix over $\mathbb{F}_2$ whose columns are [`SparseVector`]s.
///
/// Row indices of every column are strictly less than `rows`.
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct SparseMatrix {
    rows: usize,
    columns: Vec<SparseVector>,
}

impl SparseMatrix {
    /// The zero matrix with the given shape.
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns: vec![SparseVector::new(); columns],
        }
    }

    pub fn from_columns(rows: usize, columns: Vec<SparseVector>) -> Self {
        debug_assert!(columns.iter().all(|c| c.pivot().map_or(true, |p| p < rows)));
        Self { rows, columns }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, j: usize) -> &SparseVector {
        &self.columns[j]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SparseVector> {
        self.columns.iter()
    }

    pub fn into_columns(self) -> Vec<SparseVector> {
        self.columns
    }

    pub fn entry(&self, row: usize, column: usize) -> u32 {
        self.columns[column].entry(row)
    }

    pub fn num_nonzero(&self) -> usize {
        self.columns.iter().map(SparseVector::num_nonzero).sum()
    }

    pub fn transpose(&self) -> Self {
        let mut columns = vec![Vec::new(); self.rows];
        for (j, col) in self.columns.iter().enumerate() {
            for i in col.iter() {
                columns[i].push(j);
            }
        }
        Self {
            rows: self.columns.len(),
            columns: columns.into_iter().map(SparseVector::from_sorted).collect(),
        }
    }

    /// The transpose along the anti-diagonal: the entry at `(i, j)` moves to
    /// `(n - 1 - j, n - 1 - i)`. For a boundary matrix this is the coboundary matrix written in
    /// the reverse order of the basis.
    pub fn anti_transpose(&self) -> Self {
        assert_eq!(self.rows, self.columns.len(), "anti-transpose of a non-square matrix");
        let n = self.rows;
        let mut columns = vec![Vec::new(); n];
        // Walking the original columns from the right keeps every new column sorted.
        for (j, col) in self.columns.iter().enumerate().rev() {
            for i in col.iter() {
                columns[n - 1 - i].push(n - 1 - j);
            }
        }
        Self {
            rows: n,
            columns: columns.into_iter().map(SparseVector::from_sorted).collect(),
        }
    }

    /// The rows of the matrix as dense vectors.
    pub fn to_dense_rows(&self) -> Vec<FpVector> {
        let mut rows = vec![FpVector::new(self.columns.len()); self.rows];
        for (j, col) in self.columns.iter().enumerate() {
            for i in col.iter() {
                rows[i].set_entry(j, 1);
            }
        }
        rows
    }
}

impl std::ops::Index<usize> for SparseMatrix {
    type Output = SparseVector;

    fn index(&self, j: usize) -> &SparseVector {
        &self.columns[j]
    }
}

impl fmt::Display for SparseMatrix {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        let rows = self.to_dense_rows();
        let mut it = rows.iter();
        if let Some(x) = it.next() {
            write!(f, "[\n    {}", x)?;
        } else {
            write!(f, "[]")?;
            return Ok(());
        }
        for x in it {
            write!(f, ",\n    {}", x)?;
        }
        write!(f, "\n]")?;
        Ok(())
    }
}

impl fmt::Debug for SparseMatrix {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        f.debug_list().entries(self.columns.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;

    /// Boundary matrix of the filtration `[0], [1], [0, 1]`.
    fn edge() -> SparseMatrix {
        SparseMatrix::from_columns(
            3,
            vec![
                SparseVector::new(),
                SparseVector::new(),
                SparseVector::from_sorted(vec![0, 1]),
            ],
        )
    }

    #[test]
    fn test_display() {
        expect![[r#"
            [
                [0, 0, 1],
                [0, 0, 1],
                [0, 0, 0]
            ]"#]]
        .assert_eq(&edge().to_string());
        expect![["[]"]].assert_eq(&SparseMatrix::new(0, 0).to_string());
    }

    #[test]
    fn test_anti_transpose() {
        let m = edge();
        let a = m.anti_transpose();
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(a.entry(2 - j, 2 - i), m.entry(i, j));
            }
        }
        assert_eq!(a.anti_transpose(), m);
        assert_eq!(a.column(0).as_slice(), &[] as &[usize]);
        assert_eq!(a.column(1).as_slice(), &[0]);
        assert_eq!(a.column(2).as_slice(), &[0]);
    }

    #[test]
    fn test_transpose() {
        let m = edge();
        let t = m.transpose();
        assert_eq!(t.column(0).as_slice(), &[2]);
        assert_eq!(t.column(1).as_slice(), &[2]);
        assert_eq!(t.transpose(), m);
        assert_eq!(m.num_nonzero(), 2);
    }
}
