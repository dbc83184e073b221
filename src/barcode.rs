use std::cmp::Ordering;
use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SteenroderError};
use crate::filtration::Filtration;
use crate::reduction::Reduction;

/// A persistence interval.
///
/// Both endpoints are indices in the order in which the cohomological reduction processes
/// simplices, i.e. reversed filtration order: index `r` refers to the simplex at filtration index
/// `n - 1 - r`. In this order a class is born before it dies, so `birth < death`. A `death` of
/// `None` marks an essential class.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bar {
    pub birth: usize,
    pub death: Option<usize>,
}

impl Bar {
    pub fn new(birth: usize, death: Option<usize>) -> Self {
        debug_assert!(death.map_or(true, |d| d > birth));
        Self { birth, death }
    }

    pub fn finite(birth: usize, death: usize) -> Self {
        Self::new(birth, Some(death))
    }

    pub fn essential(birth: usize) -> Self {
        Self::new(birth, None)
    }

    pub fn is_essential(&self) -> bool {
        self.death.is_none()
    }

    /// The length of the bar in indices, or `None` if it is essential.
    pub fn persistence(&self) -> Option<usize> {
        self.death.map(|d| d - self.birth)
    }

    /// Whether the class is alive at index `i`.
    pub fn contains(&self, i: usize) -> bool {
        self.birth <= i && self.death.map_or(true, |d| i < d)
    }

    /// The endpoints as filtration indices of a filtration with `len` simplices.
    ///
    /// Since reversing the order swaps the roles of the endpoints, the result is the pair
    /// `(death_filtration_index, birth_filtration_index)`: the first entry is the filtration index
    /// of the birth simplex and is larger than the second. In the homological reading of the bar,
    /// the class appears at the second entry and disappears at the first.
    pub fn filtration_indices(&self, len: usize) -> (usize, Option<usize>) {
        (len - 1 - self.birth, self.death.map(|d| len - 1 - d))
    }

    /// Replace the endpoints by the filtration values of the corresponding simplices.
    pub fn to_values(&self, filtration: &Filtration) -> Result<ValuedBar> {
        let (birth, death) = self.filtration_indices(filtration.len());
        let value = |i| filtration.value(i).ok_or(SteenroderError::MissingFiltrationValues);
        Ok(ValuedBar {
            birth: value(birth)?,
            death: death.map(value).transpose()?,
        })
    }
}

impl PartialOrd for Bar {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Bars are ordered by birth and then death, with essential bars last.
impl Ord for Bar {
    fn cmp(&self, other: &Self) -> Ordering {
        self.birth
            .cmp(&other.birth)
            .then_with(|| self.death.unwrap_or(usize::MAX).cmp(&other.death.unwrap_or(usize::MAX)))
    }
}

impl fmt::Display for Bar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.death {
            Some(d) => write!(f, "({}, {d})", self.birth),
            None => write!(f, "({}, ∞)", self.birth),
        }
    }
}

/// A bar whose endpoints are filtration values. The endpoints are looked up at
/// [`Bar::filtration_indices`], so `birth >= death` whenever `death` is present.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValuedBar {
    pub birth: f64,
    pub death: Option<f64>,
}

impl fmt::Display for ValuedBar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.death {
            Some(d) => write!(f, "({}, {d})", self.birth),
            None => write!(f, "({}, ∞)", self.birth),
        }
    }
}

/// Bars grouped by dimension. Within a dimension the bars are sorted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Barcode {
    dimensions: Vec<Vec<Bar>>,
}

impl Barcode {
    /// The barcode of a reduction. Bars are filed under the dimension of their birth simplex.
    pub fn from_reduction(filtration: &Filtration, reduction: &Reduction) -> Self {
        let n = filtration.len();
        let direction = reduction.direction();
        let dimension = |i| filtration.dimension(direction.to_filtration_index(i, n));

        let mut result = Self::new(filtration.max_dimension());
        for (birth, death) in reduction.pairs() {
            result.push(dimension(birth), Bar::finite(birth, death));
        }
        for birth in reduction.essential() {
            result.push(dimension(birth), Bar::essential(birth));
        }
        result.sort();
        result
    }

    /// An empty barcode with room for dimensions `0..=max_dimension`.
    pub fn new(max_dimension: usize) -> Self {
        Self {
            dimensions: vec![Vec::new(); max_dimension + 1],
        }
    }

    /// Add a bar in dimension `dim`, growing the barcode if needed.
    pub fn push(&mut self, dim: usize, bar: Bar) {
        if self.dimensions.len() <= dim {
            self.dimensions.resize_with(dim + 1, Vec::new);
        }
        self.dimensions[dim].push(bar);
    }

    pub(crate) fn sort(&mut self) {
        for bars in &mut self.dimensions {
            bars.sort_unstable();
        }
    }

    /// The dimension of the bar born at `birth` and its position among the bars of that dimension.
    /// This scans the bars, so walk [`Barcode::iter`] instead of calling it once per bar.
    pub fn position(&self, birth: usize) -> Option<(usize, usize)> {
        self.dimensions.iter().enumerate().find_map(|(dim, bars)| {
            bars.iter()
                .position(|b| b.birth == birth)
                .map(|pos| (dim, pos))
        })
    }

    pub(crate) fn remove(&mut self, dim: usize, pos: usize) -> Bar {
        self.dimensions[dim].remove(pos)
    }

    /// Remove the bar born at `birth`, returning its dimension and the bar.
    pub(crate) fn remove_born_at(&mut self, birth: usize) -> Option<(usize, Bar)> {
        let (dim, pos) = self.position(birth)?;
        Some((dim, self.remove(dim, pos)))
    }

    /// The bars of dimension `dim`. This is empty if `dim` is out of range.
    pub fn dimension(&self, dim: usize) -> &[Bar] {
        self.dimensions.get(dim).map_or(&[], Vec::as_slice)
    }

    pub fn by_dimension(&self) -> &[Vec<Bar>] {
        &self.dimensions
    }

    /// Iterate over `(dimension, bar)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Bar)> + '_ {
        self.dimensions
            .iter()
            .enumerate()
            .flat_map(|(dim, bars)| bars.iter().map(move |&b| (dim, b)))
    }

    pub fn essential(&self) -> impl Iterator<Item = (usize, Bar)> + '_ {
        self.iter().filter(|(_, b)| b.is_essential())
    }

    pub fn len(&self) -> usize {
        self.dimensions.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The bar born at `birth`, with its dimension.
    pub fn find(&self, birth: usize) -> Option<(usize, Bar)> {
        self.iter().find(|(_, b)| b.birth == birth)
    }

    /// The number of essential bars in each dimension, i.e. the Betti numbers of the complex.
    pub fn betti_numbers(&self) -> Vec<usize> {
        self.dimensions
            .iter()
            .map(|bars| bars.iter().filter(|b| b.is_essential()).count())
            .collect()
    }

    /// The same bars with endpoints replaced by filtration values.
    pub fn to_values(&self, filtration: &Filtration) -> Result<Vec<Vec<ValuedBar>>> {
        self.dimensions
            .iter()
            .map(|bars| {
                bars.iter()
                    .map(|b| b.to_values(filtration))
                    .collect::<Result<Vec<_>>>()
            })
            .collect()
    }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for (dim, bars) in self.dimensions.iter().enumerate() {
            if bars.is_empty() {
                continue;
            }
            if !first {
                writeln!(f)?;
            }
            first = false;
            write!(f, "dim {dim}: [{}]", bars.iter().format(", "))?;
        }
        if first {
            write!(f, "empty")?;
        }
        Ok(())
    }
}
