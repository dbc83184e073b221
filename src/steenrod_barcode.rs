//! Persistence of Steenrod squares.
//!
//! Let $\alpha_b$ be the representative of the bar born at index `b`, of degree $q$, and
//! $Q_b = Sq^k(\alpha_b)$. At index `j` the cohomology of the filtration is spanned by the reduced
//! columns with index at most `j`. The image $Q_b$ is considered alive at `j` as long as it is not
//! in the span of those columns together with the images $Q_{b'}$, $b' < b$. Since both spans only
//! grow with `j`, each image dies at most once and we record the interval $[b, j)$ on which it is
//! alive. Images that are zero, or that are already dependent at their birth, contribute nothing.

use std::collections::BTreeMap;

use fp::sparse::SparseVector;
use rustc_hash::FxHashMap;

use crate::barcode::{Bar, Barcode};
use crate::boundary::BoundaryMatrix;
use crate::cancel::CancellationToken;
use crate::cochain::Cochain;
use crate::error::Result;
use crate::filtration::Filtration;
use crate::reduction::{Direction, Reduction, ReductionEngine};
use crate::representatives::{RepresentativeExtractor, Representatives};
use crate::steenrod_square::SteenrodSquare;

/// The non-zero Steenrod images of the representatives of a barcode, keyed by the birth index of
/// their bar. The value records the degree of the source class and the image itself.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SteenrodImages {
    k: usize,
    images: BTreeMap<usize, (usize, Cochain)>,
}

impl SteenrodImages {
    pub fn k(&self) -> usize {
        self.k
    }

    /// The image of the representative of the bar born at `birth`, if it is non-zero.
    pub fn get(&self, birth: usize) -> Option<&Cochain> {
        self.images.get(&birth).map(|(_, c)| c)
    }

    pub(crate) fn remove(&mut self, birth: usize) -> Option<Cochain> {
        self.images.remove(&birth).map(|(_, c)| c)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Iterate over `(birth, source_degree, image)` in increasing order of birth.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &Cochain)> + '_ {
        self.images.iter().map(|(&b, (q, c))| (b, *q, c))
    }
}

pub struct SteenrodBarcodeComputer<'a> {
    filtration: &'a Filtration,
    reduction: &'a Reduction,
    square: &'a SteenrodSquare,
    cancel: &'a CancellationToken,
}

impl<'a> SteenrodBarcodeComputer<'a> {
    pub fn new(
        filtration: &'a Filtration,
        reduction: &'a Reduction,
        square: &'a SteenrodSquare,
        cancel: &'a CancellationToken,
    ) -> Self {
        assert_eq!(reduction.direction(), Direction::Cohomology);
        Self {
            filtration,
            reduction,
            square,
            cancel,
        }
    }

    /// Apply $Sq^k$ to every representative. `reps` must be aligned with `barcode`. The result is
    /// aligned with `barcode` as well.
    #[tracing::instrument(skip_all, fields(k = k, bars = barcode.len()))]
    pub fn steenrod_representatives(
        &self,
        k: usize,
        barcode: &Barcode,
        reps: &Representatives,
    ) -> Result<Representatives> {
        barcode
            .by_dimension()
            .iter()
            .zip(reps)
            .map(|(bars, reps)| {
                debug_assert_eq!(bars.len(), reps.len());
                reps.iter()
                    .map(|rep| self.square.apply(k, rep, self.filtration, self.cancel))
                    .collect::<Result<Vec<_>>>()
            })
            .collect()
    }

    /// Collect the non-zero entries of `st_reps`, as computed by
    /// [`SteenrodBarcodeComputer::steenrod_representatives`].
    pub fn images(&self, k: usize, barcode: &Barcode, st_reps: &Representatives) -> SteenrodImages {
        let images = barcode
            .by_dimension()
            .iter()
            .zip(st_reps)
            .enumerate()
            .flat_map(|(dim, (bars, reps))| {
                bars.iter()
                    .zip(reps)
                    .filter(|(_, image)| !image.is_zero())
                    .map(move |(bar, image)| (bar.birth, (dim, image.clone())))
            })
            .collect();
        SteenrodImages { k, images }
    }

    /// The Steenrod barcode. Each bar is filed under the degree of its source class and is born at
    /// the birth of that class.
    #[tracing::instrument(skip_all, fields(k = images.k(), nonzero_images = images.len(), bars))]
    pub fn barcode(&self, images: &SteenrodImages) -> Result<Barcode> {
        let n = self.filtration.len();
        let reduced = self.reduction.reduced();

        let births: Vec<usize> = images.images.keys().copied().collect();
        let degrees: Vec<usize> = images.images.values().map(|(q, _)| *q).collect();
        let mut columns: Vec<SparseVector> = images
            .images
            .values()
            .map(|(_, image)| image.to_column(self.filtration))
            .collect();
        let mut alive = vec![true; births.len()];

        let mut result = Barcode::new(self.filtration.max_dimension());
        // Pivots of the images processed so far at the current index.
        let mut image_owner: FxHashMap<usize, usize> = FxHashMap::default();

        for j in 0..n {
            self.cancel.check(j)?;
            image_owner.clear();

            for (pos, &birth) in births.iter().enumerate() {
                if birth > j {
                    break;
                }
                if !alive[pos] {
                    continue;
                }

                let (earlier, rest) = columns.split_at_mut(pos);
                let column = &mut rest[0];
                while let Some(pivot) = column.pivot() {
                    if let Some(owner) = self.reduction.pivot_owner(pivot).filter(|&c| c <= j) {
                        *column += reduced.column(owner);
                    } else if let Some(&owner) = image_owner.get(&pivot) {
                        *column += &earlier[owner];
                    } else {
                        break;
                    }
                }

                match column.pivot() {
                    Some(pivot) => {
                        image_owner.insert(pivot, pos);
                    }
                    None => {
                        alive[pos] = false;
                        if j > birth {
                            result.push(degrees[pos], Bar::finite(birth, j));
                        }
                    }
                }
            }
        }

        for (pos, &birth) in births.iter().enumerate() {
            if alive[pos] {
                result.push(degrees[pos], Bar::essential(birth));
            }
        }
        result.sort();

        tracing::Span::current().record("bars", result.len());
        Ok(result)
    }
}

/// The $Sq^k$ images of the cocycle representatives of the cohomology barcode of `filtration`,
/// aligned with that barcode.
pub fn get_st_reps(filtration: &Filtration, k: usize) -> Result<Representatives> {
    let boundary = BoundaryMatrix::new(filtration);
    let cancel = CancellationToken::new();
    let reduction = ReductionEngine::new(&cancel).run(&boundary, Direction::Cohomology)?;
    let barcode = Barcode::from_reduction(filtration, &reduction);
    let reps = RepresentativeExtractor::new(filtration, &reduction).representatives(&barcode)?;
    let square = SteenrodSquare::new();
    SteenrodBarcodeComputer::new(filtration, &reduction, &square, &cancel)
        .steenrod_representatives(k, &barcode, &reps)
}
