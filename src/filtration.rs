//! Filtered simplicial complexes.
//!
//! A [`Filtration`] is a sequence of simplices in which every face of a simplex occurs strictly
//! before the simplex itself. The position of a simplex in the sequence is its *filtration index*.
//! Everything downstream (boundary matrices, barcodes, cochains) refers to simplices by these dense
//! indices, so the filtration also records, once and for all, the dimension of every simplex and its
//! rank among the simplices of the same dimension.

use std::borrow::Borrow;
use std::fmt;

use itertools::Itertools;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{FiltrationDefect, Result, SteenroderError};

pub type Vertex = usize;

/// A simplex, given by its strictly increasing list of vertices.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vertex>", into = "Vec<Vertex>")]
pub struct Simplex(Vec<Vertex>);

impl Simplex {
    pub fn new(vertices: Vec<Vertex>) -> std::result::Result<Self, FiltrationDefect> {
        if vertices.is_empty() {
            return Err(FiltrationDefect::EmptySimplex);
        }
        if vertices.windows(2).any(|w| w[0] >= w[1]) {
            return Err(FiltrationDefect::UnsortedVertices);
        }
        Ok(Self(vertices))
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.0
    }

    /// The number of vertices.
    pub fn arity(&self) -> usize {
        self.0.len()
    }

    pub fn dimension(&self) -> usize {
        self.0.len() - 1
    }

    /// The codimension one faces, in the order of the removed vertex. A vertex has no faces.
    pub fn faces(&self) -> impl Iterator<Item = Simplex> + '_ {
        let n = if self.0.len() > 1 { self.0.len() } else { 0 };
        (0..n).map(move |i| {
            let mut v = self.0.clone();
            v.remove(i);
            Simplex(v)
        })
    }

    /// The cone on this simplex with apex `apex`, which must be larger than every vertex.
    pub fn cone(&self, apex: Vertex) -> Simplex {
        debug_assert!(self.0.last().map_or(true, |&v| v < apex));
        let mut v = self.0.clone();
        v.push(apex);
        Simplex(v)
    }
}

impl TryFrom<Vec<Vertex>> for Simplex {
    type Error = FiltrationDefect;

    fn try_from(vertices: Vec<Vertex>) -> std::result::Result<Self, Self::Error> {
        Self::new(vertices)
    }
}

impl From<Simplex> for Vec<Vertex> {
    fn from(s: Simplex) -> Vec<Vertex> {
        s.0
    }
}

impl Borrow<[Vertex]> for Simplex {
    fn borrow(&self) -> &[Vertex] {
        &self.0
    }
}

impl fmt::Display for Simplex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}]", self.0.iter().format(", "))
    }
}

impl fmt::Debug for Simplex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self}")
    }
}

/// A validated filtration together with the indexing data computed from it.
#[derive(Clone, Debug)]
pub struct Filtration {
    simplices: Vec<Simplex>,
    values: Option<Vec<f64>>,
    index: FxHashMap<Simplex, usize>,
    dimensions: Vec<usize>,
    /// `rank_in_dimension[i]` is the number of simplices of the same dimension as simplex `i`
    /// occurring before it.
    rank_in_dimension: Vec<usize>,
    /// The filtration indices of the simplices of each dimension, in increasing order.
    by_dimension: Vec<Vec<usize>>,
}

impl PartialEq for Filtration {
    fn eq(&self, other: &Self) -> bool {
        self.simplices == other.simplices && self.values == other.values
    }
}

impl Filtration {
    /// Validate and index a sequence of simplices.
    pub fn new(simplices: Vec<Vec<Vertex>>) -> Result<Self> {
        Self::from_parts(simplices, None)
    }

    /// Validate and index a sequence of simplices with one filtration value per simplex. Values
    /// must be finite and non-decreasing; ties are broken by the order of the sequence.
    pub fn with_values(simplices: Vec<Vec<Vertex>>, values: Vec<f64>) -> Result<Self> {
        Self::from_parts(simplices, Some(values))
    }

    #[tracing::instrument(skip_all, fields(num_simplices = simplices.len()))]
    pub fn from_parts(simplices: Vec<Vec<Vertex>>, values: Option<Vec<f64>>) -> Result<Self> {
        let simplices = simplices
            .into_iter()
            .enumerate()
            .map(|(i, v)| Simplex::new(v).map_err(|e| SteenroderError::invalid(i, e)))
            .collect::<Result<Vec<_>>>()?;

        if let Some(values) = &values {
            check_values(values, simplices.len())?;
        }

        let result = Self::index_unchecked(simplices, values)?;
        result.check_faces()?;
        tracing::debug!(max_dimension = result.max_dimension(), "validated filtration");
        Ok(result)
    }

    /// Build the index. The only check performed is for duplicates, since the index could not be
    /// built otherwise.
    fn index_unchecked(simplices: Vec<Simplex>, values: Option<Vec<f64>>) -> Result<Self> {
        let mut index = FxHashMap::default();
        index.reserve(simplices.len());
        let mut dimensions = Vec::with_capacity(simplices.len());
        let mut rank_in_dimension = Vec::with_capacity(simplices.len());
        let mut by_dimension: Vec<Vec<usize>> = Vec::new();

        for (i, s) in simplices.iter().enumerate() {
            if let Some(&first) = index.get(s) {
                return Err(SteenroderError::invalid(i, FiltrationDefect::Duplicate { first }));
            }
            index.insert(s.clone(), i);

            let d = s.dimension();
            if by_dimension.len() <= d {
                by_dimension.resize_with(d + 1, Vec::new);
            }
            dimensions.push(d);
            rank_in_dimension.push(by_dimension[d].len());
            by_dimension[d].push(i);
        }

        Ok(Self {
            simplices,
            values,
            index,
            dimensions,
            rank_in_dimension,
            by_dimension,
        })
    }

    fn check_faces(&self) -> Result<()> {
        for (i, s) in self.simplices.iter().enumerate() {
            for face in s.faces() {
                match self.index.get(&face) {
                    None => {
                        return Err(SteenroderError::invalid(
                            i,
                            FiltrationDefect::MissingFace { face: face.into() },
                        ))
                    }
                    Some(&j) if j > i => {
                        return Err(SteenroderError::invalid(
                            i,
                            FiltrationDefect::FaceAfterCoface {
                                face: face.into(),
                                face_index: j,
                            },
                        ))
                    }
                    Some(_) => (),
                }
            }
        }
        Ok(())
    }

    /// The cone on this filtration. The apex is a new vertex, larger than every existing vertex,
    /// placed at index 0. It is followed by the simplices of `self` in order (so each of them moves
    /// up by one index) and then by the cone on each simplex of `self`, again in order. Cone
    /// simplices inherit the filtration value of their base and the apex takes the smallest value.
    ///
    /// With values, the cone is the one filtration that is not monotone in its values: each half
    /// is non-decreasing, but the values restart at the first cone simplex. Passing the result to
    /// [`Filtration::with_values`] is therefore rejected with
    /// [`FiltrationDefect::DecreasingValue`]. The order of the simplices, not their values, is what
    /// the reduction uses.
    pub fn cone(&self) -> Filtration {
        let apex = self
            .simplices
            .iter()
            .filter_map(|s| s.vertices().last())
            .max()
            .map_or(0, |&v| v + 1);

        let n = self.simplices.len();
        let mut simplices = Vec::with_capacity(2 * n + 1);
        simplices.push(Simplex(vec![apex]));
        simplices.extend(self.simplices.iter().cloned());
        simplices.extend(self.simplices.iter().map(|s| s.cone(apex)));

        let values = self.values.as_ref().map(|values| {
            let mut result = Vec::with_capacity(2 * n + 1);
            result.push(values.first().copied().unwrap_or(0.0));
            result.extend_from_slice(values);
            result.extend_from_slice(values);
            result
        });

        // The cone of a valid filtration is valid and has no repeated simplices.
        match Self::index_unchecked(simplices, values) {
            Ok(f) => f,
            Err(e) => unreachable!("cone of a valid filtration is invalid: {e}"),
        }
    }

    pub fn len(&self) -> usize {
        self.simplices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.simplices.is_empty()
    }

    pub fn simplex(&self, i: usize) -> &Simplex {
        &self.simplices[i]
    }

    pub fn simplices(&self) -> &[Simplex] {
        &self.simplices
    }

    /// The filtration index of the simplex with the given vertices.
    pub fn index_of(&self, vertices: &[Vertex]) -> Option<usize> {
        self.index.get(vertices).copied()
    }

    pub fn dimension(&self, i: usize) -> usize {
        self.dimensions[i]
    }

    /// The largest dimension of a simplex, or 0 for the empty filtration.
    pub fn max_dimension(&self) -> usize {
        self.by_dimension.len().saturating_sub(1)
    }

    /// The filtration indices of the simplices of dimension `d`, in increasing order.
    pub fn simplices_of_dimension(&self, d: usize) -> &[usize] {
        self.by_dimension.get(d).map_or(&[], Vec::as_slice)
    }

    pub fn num_simplices_of_dimension(&self, d: usize) -> usize {
        self.simplices_of_dimension(d).len()
    }

    /// The position of simplex `i` among the simplices of its dimension. This is the coordinate
    /// of the simplex in a cochain vector.
    pub fn rank_in_dimension(&self, i: usize) -> usize {
        self.rank_in_dimension[i]
    }

    pub fn values(&self) -> Option<&[f64]> {
        self.values.as_deref()
    }

    pub fn value(&self, i: usize) -> Option<f64> {
        self.values.as_ref().map(|v| v[i])
    }

    /// Convert between filtration indices and positions in the reverse order, in which the
    /// cohomological reduction processes columns. The map is an involution.
    pub fn reverse_index(&self, i: usize) -> usize {
        self.simplices.len() - 1 - i
    }

    /// The alternating count of simplices.
    pub fn euler_characteristic(&self) -> i64 {
        self.by_dimension
            .iter()
            .enumerate()
            .map(|(d, s)| if d % 2 == 0 { s.len() as i64 } else { -(s.len() as i64) })
            .sum()
    }
}

fn check_values(values: &[f64], num_simplices: usize) -> Result<()> {
    if values.len() != num_simplices {
        return Err(SteenroderError::invalid(
            values.len().min(num_simplices),
            FiltrationDefect::ValueCountMismatch {
                values: values.len(),
                simplices: num_simplices,
            },
        ));
    }
    for (i, &value) in values.iter().enumerate() {
        if !value.is_finite() {
            return Err(SteenroderError::invalid(i, FiltrationDefect::NonFiniteValue));
        }
        if i > 0 && value < values[i - 1] {
            return Err(SteenroderError::invalid(
                i,
                FiltrationDefect::DecreasingValue {
                    previous: values[i - 1],
                    value,
                },
            ));
        }
    }
    Ok(())
}

impl fmt::Display for Filtration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.values {
            Some(values) => write!(
                f,
                "[{}]",
                self.simplices
                    .iter()
                    .zip(values)
                    .map(|(s, v)| format!("{s}@{v}"))
                    .format(", ")
            ),
            None => write!(f, "[{}]", self.simplices.iter().format(", ")),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use expect_test::expect;

    /// The closure of a list of simplices, ordered by dimension and then lexicographically.
    pub(crate) fn closure(tops: &[&[Vertex]]) -> Vec<Vec<Vertex>> {
        let mut all: Vec<Vec<Vertex>> = Vec::new();
        for t in tops {
            for r in 1..=t.len() {
                all.extend(t.iter().copied().combinations(r));
            }
        }
        all.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        all.dedup();
        all
    }

    #[test]
    fn test_index() {
        let f = Filtration::new(closure(&[&[0, 1, 2]])).unwrap();
        assert_eq!(f.len(), 7);
        assert_eq!(f.max_dimension(), 2);
        assert_eq!(f.index_of(&[1, 2]), Some(5));
        assert_eq!(f.index_of(&[0, 3]), None);
        assert_eq!(f.simplices_of_dimension(1), &[3, 4, 5]);
        assert_eq!(f.rank_in_dimension(5), 2);
        assert_eq!(f.dimension(6), 2);
        assert_eq!(f.reverse_index(0), 6);
        assert_eq!(f.euler_characteristic(), 1);
        expect![["[[0], [1], [2], [0, 1], [0, 2], [1, 2], [0, 1, 2]]"]].assert_eq(&f.to_string());
    }

    #[test]
    fn test_face_after_coface() {
        let err = Filtration::new(vec![vec![0], vec![0, 1], vec![1]]).unwrap_err();
        match err {
            SteenroderError::InvalidFiltration { index, defect } => {
                assert_eq!(index, 1);
                assert_eq!(
                    defect,
                    FiltrationDefect::FaceAfterCoface { face: vec![1], face_index: 2 }
                );
            }
            e => panic!("unexpected error {e}"),
        }
    }

    #[test]
    fn test_invalid_simplices() {
        let check = |simplices: Vec<Vec<Vertex>>, expected: FiltrationDefect| {
            match Filtration::new(simplices) {
                Err(SteenroderError::InvalidFiltration { defect, .. }) => {
                    assert_eq!(defect, expected)
                }
                other => panic!("expected invalid filtration, got {other:?}"),
            }
        };
        check(vec![vec![0], vec![]], FiltrationDefect::EmptySimplex);
        check(vec![vec![1], vec![0], vec![1, 0]], FiltrationDefect::UnsortedVertices);
        check(vec![vec![0], vec![0]], FiltrationDefect::Duplicate { first: 0 });
        check(vec![vec![0], vec![0, 1]], FiltrationDefect::MissingFace { face: vec![1] });
    }

    #[test]
    fn test_values() {
        let simplices = vec![vec![0], vec![1], vec![0, 1]];
        assert!(Filtration::with_values(simplices.clone(), vec![0.0, 0.0, 1.5]).is_ok());

        let err = Filtration::with_values(simplices.clone(), vec![0.0, 2.0, 1.0]).unwrap_err();
        assert!(matches!(
            err,
            SteenroderError::InvalidFiltration {
                index: 2,
                defect: FiltrationDefect::DecreasingValue { .. }
            }
        ));

        let err = Filtration::with_values(simplices.clone(), vec![0.0, f64::NAN, 1.0]).unwrap_err();
        assert!(matches!(
            err,
            SteenroderError::InvalidFiltration { index: 1, defect: FiltrationDefect::NonFiniteValue }
        ));

        let err = Filtration::with_values(simplices, vec![0.0]).unwrap_err();
        assert!(matches!(
            err,
            SteenroderError::InvalidFiltration {
                defect: FiltrationDefect::ValueCountMismatch { values: 1, simplices: 3 },
                ..
            }
        ));
    }

    #[test]
    fn test_cone() {
        let f = Filtration::with_values(vec![vec![0], vec![1], vec![0, 1]], vec![0.0, 1.0, 2.0])
            .unwrap();
        let c = f.cone();
        expect![["[[2]@0, [0]@0, [1]@1, [0, 1]@2, [0, 2]@0, [1, 2]@1, [0, 1, 2]@2]"]]
            .assert_eq(&c.to_string());
        assert_eq!(c.euler_characteristic(), 1);
        assert_eq!(c.max_dimension(), 2);

        let values = c.values().unwrap();
        assert!(values[1..4].windows(2).all(|w| w[0] <= w[1]));
        assert!(values[4..].windows(2).all(|w| w[0] <= w[1]));
        let simplices = c.simplices().iter().map(|s| s.vertices().to_vec()).collect();
        assert!(matches!(
            Filtration::with_values(simplices, values.to_vec()),
            Err(SteenroderError::InvalidFiltration {
                index: 4,
                defect: FiltrationDefect::DecreasingValue { .. },
            })
        ));
    }

    #[test]
    fn test_serde() {
        let s: Simplex = serde_json::from_str("[0, 2, 5]").unwrap();
        assert_eq!(s.dimension(), 2);
        assert!(serde_json::from_str::<Simplex>("[2, 0]").is_err());
        assert_eq!(serde_json::to_string(&s).unwrap(), "[0,2,5]");
    }
}
