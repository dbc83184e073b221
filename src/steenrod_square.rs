//! Steenrod squares of cochains.
//!
//! For a cochain $\alpha$ of degree $q$ and a $(q + k)$-simplex $\sigma$ with vertices
//! $v_0 < \cdots < v_{q + k}$,
//! $$ Sq^k(\alpha)(\sigma) = \sum_{(A, B)} \alpha(\sigma_A) \alpha(\sigma_B), $$
//! where $\sigma_A$ is the face of $\sigma$ spanned by the vertices at positions $A$ and the sum runs
//! over the [`FacePair`]s returned by [`decompositions`].
//!
//! A face pair is determined by two $q$-faces whose union is $\sigma$. Their intersection $I$ has
//! $q + 1 - k$ vertices, and the remaining $2k$ positions $U = \{u_0 < \cdots < u_{2k - 1}\}$ are
//! split between the two faces. The position $u_t$ goes to the first face if $u_t + t$ is even
//! and to the second face otherwise, and the pair occurs exactly when both faces receive $k$
//! positions. When $k = 0$ the only pair is $(\sigma, \sigma)$, so $Sq^0$ is the identity, and when
//! $k > q$ there are no pairs at all, so $Sq^k$ vanishes.

use std::sync::Arc;

use dashmap::DashMap;
use fp::vector::FpVector;
use itertools::{Either, Itertools};

#[cfg(feature = "concurrent")]
use rayon::prelude::*;

use crate::cancel::CancellationToken;
use crate::cochain::Cochain;
use crate::error::Result;
use crate::filtration::{Filtration, Vertex};

/// A pair of faces of a simplex, given by the positions of their vertices within the simplex.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FacePair {
    pub left: Vec<usize>,
    pub right: Vec<usize>,
}

impl FacePair {
    fn faces(&self, simplex: &[Vertex]) -> (Vec<Vertex>, Vec<Vertex>) {
        (
            self.left.iter().map(|&p| simplex[p]).collect(),
            self.right.iter().map(|&p| simplex[p]).collect(),
        )
    }
}

/// The face pairs contributing to $Sq^k$ on a simplex with `arity` vertices.
pub fn decompositions(arity: usize, k: usize) -> Vec<FacePair> {
    // The source degree is q = arity - 1 - k, and we need q >= k.
    if arity == 0 || arity < 2 * k + 1 {
        return Vec::new();
    }

    let mut result = Vec::new();
    for intersection in (0..arity).combinations(arity - 2 * k) {
        let rest = (0..arity).filter(|p| !intersection.contains(p));
        let (x0, x1): (Vec<usize>, Vec<usize>) =
            rest.enumerate().partition_map(|(t, u)| {
                if (u + t) % 2 == 0 {
                    Either::Left(u)
                } else {
                    Either::Right(u)
                }
            });
        if x0.len() != k || x1.len() != k {
            continue;
        }
        let left = intersection.iter().copied().merge(x0).collect();
        let right = intersection.iter().copied().merge(x1).collect();
        result.push(FacePair { left, right });
    }
    result
}

/// Evaluates Steenrod squares, memoizing the face pairs by arity and exponent.
#[derive(Default)]
pub struct SteenrodSquare {
    memo: DashMap<(usize, usize), Arc<Vec<FacePair>>>,
}

impl SteenrodSquare {
    pub fn new() -> Self {
        Self::default()
    }

    /// The face pairs for simplices with `arity` vertices, computing them if necessary.
    pub fn decompositions(&self, arity: usize, k: usize) -> Arc<Vec<FacePair>> {
        Arc::clone(
            &self
                .memo
                .entry((arity, k))
                .or_insert_with(|| Arc::new(decompositions(arity, k))),
        )
    }

    /// Compute $Sq^k(\alpha)$, a cochain of degree `alpha.degree() + k` on the simplices of
    /// `filtration`.
    ///
    /// The cancellation token is polled once per target simplex.
    pub fn apply(
        &self,
        k: usize,
        alpha: &Cochain,
        filtration: &Filtration,
        cancel: &CancellationToken,
    ) -> Result<Cochain> {
        let degree = alpha.degree() + k;
        if alpha.is_zero() {
            return Ok(Cochain::zero(filtration, degree));
        }

        let pairs = self.decompositions(degree + 1, k);
        let targets = filtration.simplices_of_dimension(degree);

        let evaluate = |(rank, &i): (usize, &usize)| -> Result<Option<usize>> {
            cancel.check(rank)?;
            let simplex = filtration.simplex(i).vertices();
            let value = pairs
                .iter()
                .filter(|pair| {
                    let (a, b) = pair.faces(simplex);
                    alpha.evaluate(filtration, &a) == 1 && alpha.evaluate(filtration, &b) == 1
                })
                .count();
            Ok((value % 2 == 1).then_some(rank))
        };

        #[cfg(feature = "concurrent")]
        let nonzero: Vec<Option<usize>> = targets
            .par_iter()
            .enumerate()
            .map(evaluate)
            .collect::<Result<_>>()?;

        #[cfg(not(feature = "concurrent"))]
        let nonzero: Vec<Option<usize>> = targets
            .iter()
            .enumerate()
            .map(evaluate)
            .collect::<Result<_>>()?;

        let vector = FpVector::from_indices(targets.len(), nonzero.into_iter().flatten());
        Cochain::new(filtration, degree, vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cochain::cochain_to_vector;
    use crate::filtration::tests::closure;
    use expect_test::expect;
    use rstest::rstest;

    fn format(pairs: &[FacePair]) -> String {
        pairs
            .iter()
            .map(|p| format!("{:?}|{:?}", p.left, p.right))
            .join(" ")
    }

    #[test]
    fn test_decompositions() {
        expect![["[0, 1, 2]|[0, 1, 2]"]].assert_eq(&format(&decompositions(3, 0)));
        expect![["[0, 1]|[1, 2]"]].assert_eq(&format(&decompositions(3, 1)));
        expect![["[0, 2, 3]|[0, 1, 2] [0, 1, 3]|[1, 2, 3]"]]
            .assert_eq(&format(&decompositions(4, 1)));
        expect![["[0, 1, 2]|[2, 3, 4]"]].assert_eq(&format(&decompositions(5, 2)));
    }

    #[rstest]
    #[case(2, 1)]
    #[case(4, 2)]
    #[case(6, 3)]
    #[case(3, 2)]
    fn test_vanishing(#[case] arity: usize, #[case] k: usize) {
        assert!(decompositions(arity, k).is_empty());
    }

    #[test]
    fn test_faces_have_source_degree() {
        for arity in 1..8 {
            for k in 1..4 {
                for pair in decompositions(arity, k) {
                    assert_eq!(pair.left.len() + k, arity);
                    assert_eq!(pair.right.len() + k, arity);
                    assert_ne!(pair.left, pair.right, "arity {arity}, k {k}");
                }
            }
        }
    }

    #[test]
    fn test_memo() {
        let sq = SteenrodSquare::new();
        let a = sq.decompositions(5, 1);
        let b = sq.decompositions(5, 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.len(), 4);
    }

    #[test]
    fn test_cup_square() {
        // On a 1-cochain, Sq^1 is the cup square: [a, b, c] -> alpha([a, b]) alpha([b, c]).
        let f = Filtration::new(closure(&[&[0, 1, 2], &[1, 2, 3]])).unwrap();
        let alpha = cochain_to_vector(&f, 1, [[0, 1], [1, 2]]).unwrap();
        let cancel = CancellationToken::new();
        let sq = SteenrodSquare::new();
        let beta = sq.apply(1, &alpha, &f, &cancel).unwrap();
        assert_eq!(beta.degree(), 2);
        expect![["[0, 1, 2]"]].assert_eq(&beta.display(&f).to_string());

        assert_eq!(sq.apply(0, &alpha, &f, &cancel).unwrap(), alpha);
        assert!(sq.apply(2, &alpha, &f, &cancel).unwrap().is_zero());
    }

    #[rstest]
    #[case(0b1011_0110_1101_0011)]
    #[case(0b0111_1111_1111_1111)]
    #[case(0b1010_1010_1010_1010)]
    fn test_top_square_is_cup_square(#[case] mask: u32) {
        // Sq^q on a degree q cochain is the cup square, evaluated on [v_0, ..., v_2q] as
        // alpha([v_0, ..., v_q]) alpha([v_q, ..., v_2q]). Under the `concurrent` feature this
        // checks the parallel evaluation against the pointwise formula.
        let f = Filtration::new(closure(&[&[0, 1, 2, 3, 4], &[2, 3, 4, 5]])).unwrap();
        let cancel = CancellationToken::new();
        let sq = SteenrodSquare::new();
        for q in 1..=2 {
            let len = f.num_simplices_of_dimension(q);
            let support = (0..len).filter(|i| (mask >> (i % 32)) & 1 == 1);
            let alpha = Cochain::new(&f, q, FpVector::from_indices(len, support)).unwrap();
            let beta = sq.apply(q, &alpha, &f, &cancel).unwrap();
            assert_eq!(beta.degree(), 2 * q);
            for &i in f.simplices_of_dimension(2 * q) {
                let v = f.simplex(i).vertices();
                let expected = alpha.evaluate(&f, &v[..=q]) * alpha.evaluate(&f, &v[q..]);
                assert_eq!(beta.evaluate(&f, v), expected, "q = {q}, simplex {v:?}");
            }
        }
    }

    #[test]
    fn test_apply_cancelled() {
        let f = Filtration::new(closure(&[&[0, 1, 2], &[1, 2, 3]])).unwrap();
        let alpha = cochain_to_vector(&f, 1, [[0, 1], [1, 2]]).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(matches!(
            SteenrodSquare::new().apply(1, &alpha, &f, &cancel),
            Err(crate::error::SteenroderError::Cancelled { .. })
        ));
    }
}
