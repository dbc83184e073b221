//! Cochains on a filtered complex.
//!
//! A cochain of degree `q` is a function from the `q`-simplices to $\mathbb{F}_2$. It is stored as
//! an [`FpVector`] whose `i`th entry is the value on the `i`th `q`-simplex in filtration order (see
//! [`Filtration::rank_in_dimension`]). The reductions, on the other hand, work with sparse columns
//! over all simplices in reversed filtration order; [`Cochain::from_column`] and
//! [`Cochain::to_column`] convert between the two.

use std::fmt;

use fp::sparse::SparseVector;
use fp::vector::FpVector;
use itertools::Itertools;
use serde::Serialize;

use crate::error::{Result, SteenroderError};
use crate::filtration::{Filtration, Simplex, Vertex};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Cochain {
    degree: usize,
    vector: FpVector,
}

impl Cochain {
    /// Wrap `vector` as a cochain of degree `degree`. The length of `vector` must be the number of
    /// simplices of that dimension.
    pub fn new(filtration: &Filtration, degree: usize, vector: FpVector) -> Result<Self> {
        let expected = filtration.num_simplices_of_dimension(degree);
        if vector.len() != expected {
            return Err(SteenroderError::DimensionMismatch {
                expected,
                found: vector.len(),
                context: "length of cochain vector",
            });
        }
        Ok(Self { degree, vector })
    }

    pub fn zero(filtration: &Filtration, degree: usize) -> Self {
        Self {
            degree,
            vector: FpVector::new(filtration.num_simplices_of_dimension(degree)),
        }
    }

    /// The cochain taking the value 1 exactly on the given simplices. A simplex listed twice
    /// cancels. All simplices must have dimension `degree`.
    pub fn from_simplices<S: AsRef<[Vertex]>>(
        filtration: &Filtration,
        degree: usize,
        simplices: impl IntoIterator<Item = S>,
    ) -> Result<Self> {
        let mut result = Self::zero(filtration, degree);
        for s in simplices {
            let s = s.as_ref();
            let i = filtration
                .index_of(s)
                .ok_or_else(|| SteenroderError::UnknownSimplex(s.to_vec()))?;
            result.add_simplex(filtration, i)?;
        }
        Ok(result)
    }

    /// Convert a column in reversed filtration order into a cochain of degree `degree`. Every
    /// non-zero entry of the column must be a simplex of that dimension.
    pub fn from_column(
        filtration: &Filtration,
        degree: usize,
        column: &SparseVector,
    ) -> Result<Self> {
        let mut result = Self::zero(filtration, degree);
        for r in column.iter() {
            result.add_simplex(filtration, filtration.reverse_index(r))?;
        }
        Ok(result)
    }

    /// The cochain as a column over all simplices in reversed filtration order.
    pub fn to_column(&self, filtration: &Filtration) -> SparseVector {
        SparseVector::from_indices(self.support(filtration).map(|i| filtration.reverse_index(i)))
    }

    /// Flip the value on the simplex with filtration index `i`.
    fn add_simplex(&mut self, filtration: &Filtration, i: usize) -> Result<()> {
        let dim = filtration.dimension(i);
        if dim != self.degree {
            return Err(SteenroderError::DimensionMismatch {
                expected: self.degree,
                found: dim,
                context: "dimension of a simplex in a homogeneous cochain",
            });
        }
        self.vector.add_basis_element(filtration.rank_in_dimension(i));
        Ok(())
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn vector(&self) -> &FpVector {
        &self.vector
    }

    pub fn is_zero(&self) -> bool {
        self.vector.is_zero()
    }

    /// The value on the simplex with filtration index `i`, which must have dimension `degree`.
    pub fn evaluate_index(&self, filtration: &Filtration, i: usize) -> u32 {
        debug_assert_eq!(filtration.dimension(i), self.degree);
        self.vector.entry(filtration.rank_in_dimension(i))
    }

    /// The value on the simplex with the given vertices. Simplices of the wrong dimension, or not
    /// in the filtration, evaluate to zero.
    pub fn evaluate(&self, filtration: &Filtration, vertices: &[Vertex]) -> u32 {
        if vertices.len() != self.degree + 1 {
            return 0;
        }
        filtration
            .index_of(vertices)
            .map_or(0, |i| self.evaluate_index(filtration, i))
    }

    /// The filtration indices of the simplices on which the cochain is non-zero, in increasing
    /// order.
    pub fn support<'a>(&'a self, filtration: &'a Filtration) -> impl Iterator<Item = usize> + 'a {
        let simplices = filtration.simplices_of_dimension(self.degree);
        self.vector.iter_nonzero().map(move |r| simplices[r])
    }

    /// The coboundary $\delta\alpha$, with $\delta\alpha(\sigma) = \sum_i \alpha(d_i \sigma)$.
    pub fn coboundary(&self, filtration: &Filtration) -> Cochain {
        let targets = filtration.simplices_of_dimension(self.degree + 1);
        let mut result = FpVector::new(targets.len());
        for (rank, &i) in targets.iter().enumerate() {
            let value: u32 = filtration
                .simplex(i)
                .faces()
                .map(|face| self.evaluate(filtration, face.vertices()))
                .sum();
            result.set_entry(rank, value);
        }
        Cochain {
            degree: self.degree + 1,
            vector: result,
        }
    }

    pub fn is_cocycle(&self, filtration: &Filtration) -> bool {
        self.coboundary(filtration).is_zero()
    }

    /// Format the cochain as a sum of simplices.
    pub fn display<'a>(&'a self, filtration: &'a Filtration) -> CochainDisplay<'a> {
        CochainDisplay {
            cochain: self,
            filtration,
        }
    }
}

impl std::ops::AddAssign<&Cochain> for Cochain {
    fn add_assign(&mut self, other: &Cochain) {
        assert_eq!(self.degree, other.degree);
        self.vector += &other.vector;
    }
}

pub struct CochainDisplay<'a> {
    cochain: &'a Cochain,
    filtration: &'a Filtration,
}

impl fmt::Display for CochainDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.cochain.is_zero() {
            return write!(f, "0");
        }
        write!(
            f,
            "{}",
            self.cochain
                .support(self.filtration)
                .map(|i| self.filtration.simplex(i))
                .format(" + ")
        )
    }
}

/// The simplices on which `cochain` is non-zero, in filtration order.
pub fn vector_to_cochain(filtration: &Filtration, cochain: &Cochain) -> Vec<Simplex> {
    cochain
        .support(filtration)
        .map(|i| filtration.simplex(i).clone())
        .collect()
}

/// The cochain of degree `degree` which is the sum of the given simplices.
pub fn cochain_to_vector<S: AsRef<[Vertex]>>(
    filtration: &Filtration,
    degree: usize,
    simplices: impl IntoIterator<Item = S>,
) -> Result<Cochain> {
    Cochain::from_simplices(filtration, degree, simplices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filtration::tests::closure;
    use expect_test::expect;

    fn triangle() -> Filtration {
        Filtration::new(closure(&[&[0, 1, 2]])).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let f = triangle();
        let c = cochain_to_vector(&f, 1, [[0, 1], [1, 2]]).unwrap();
        assert_eq!(c.vector(), &FpVector::from_slice(&[1, 0, 1]));
        expect![["[0, 1] + [1, 2]"]].assert_eq(&c.display(&f).to_string());
        assert_eq!(
            vector_to_cochain(&f, &c),
            vec![Simplex::new(vec![0, 1]).unwrap(), Simplex::new(vec![1, 2]).unwrap()]
        );
        // [0, 1] and [1, 2] are at filtration indices 3 and 5 of 7.
        assert_eq!(c.to_column(&f).as_slice(), &[1, 3]);
        assert_eq!(Cochain::from_column(&f, 1, &c.to_column(&f)).unwrap(), c);
        expect![["0"]].assert_eq(&Cochain::zero(&f, 2).display(&f).to_string());
    }

    #[test]
    fn test_errors() {
        let f = triangle();
        assert!(matches!(
            cochain_to_vector(&f, 1, [vec![0, 1], vec![0]]),
            Err(SteenroderError::DimensionMismatch { expected: 1, found: 0, .. })
        ));
        assert!(matches!(
            cochain_to_vector(&f, 1, [[0, 3]]),
            Err(SteenroderError::UnknownSimplex(_))
        ));
        assert!(matches!(
            Cochain::new(&f, 1, FpVector::new(2)),
            Err(SteenroderError::DimensionMismatch { expected: 3, found: 2, .. })
        ));
    }

    #[test]
    fn test_coboundary() {
        let f = triangle();
        let v = cochain_to_vector(&f, 0, [[0]]).unwrap();
        let dv = v.coboundary(&f);
        expect![["[0, 1] + [0, 2]"]].assert_eq(&dv.display(&f).to_string());
        assert!(dv.is_cocycle(&f));
        assert!(!v.is_cocycle(&f));
        let all_vertices = cochain_to_vector(&f, 0, [[0], [1], [2]]).unwrap();
        assert!(all_vertices.is_cocycle(&f));
    }
}
