use crate::barcode::{Bar, Barcode};
use crate::boundary::BoundaryMatrix;
use crate::cancel::CancellationToken;
use crate::cochain::Cochain;
use crate::error::{Result, SteenroderError};
use crate::filtration::Filtration;
use crate::reduction::{Direction, Reduction, ReductionEngine};

/// Cocycle representatives, grouped by dimension in the same order as the bars of a [`Barcode`].
pub type Representatives = Vec<Vec<Cochain>>;

/// Reads off cocycle representatives of the bars of a cohomological reduction.
///
/// A finite bar `(b, d)` is represented by the reduced column `d`, whose pivot is `b`. An essential
/// bar born at `b` is represented by column `b` of the triangular matrix $V$, i.e. the combination
/// of coboundary columns that reduces to zero.
pub struct RepresentativeExtractor<'a> {
    filtration: &'a Filtration,
    reduction: &'a Reduction,
}

impl<'a> RepresentativeExtractor<'a> {
    pub fn new(filtration: &'a Filtration, reduction: &'a Reduction) -> Self {
        assert_eq!(reduction.direction(), Direction::Cohomology);
        assert_eq!(reduction.len(), filtration.len());
        Self {
            filtration,
            reduction,
        }
    }

    /// The dimension of the class of `bar`, which is the dimension of its birth simplex.
    pub fn dimension(&self, bar: &Bar) -> usize {
        self.filtration
            .dimension(self.filtration.reverse_index(bar.birth))
    }

    pub fn representative(&self, bar: &Bar) -> Result<Cochain> {
        let unknown = || SteenroderError::UnknownBar {
            birth: bar.birth,
            death: bar.death,
        };
        if bar.birth >= self.reduction.len() {
            return Err(unknown());
        }
        let column = match bar.death {
            Some(death) if self.reduction.pivot_owner(bar.birth) == Some(death) => {
                self.reduction.reduced().column(death)
            }
            None if self.reduction.is_essential(bar.birth) => {
                self.reduction.triangular().column(bar.birth)
            }
            _ => return Err(unknown()),
        };
        Cochain::from_column(self.filtration, self.dimension(bar), column)
    }

    #[tracing::instrument(skip_all, fields(bars = barcode.len()))]
    pub fn representatives(&self, barcode: &Barcode) -> Result<Representatives> {
        barcode
            .by_dimension()
            .iter()
            .map(|bars| {
                bars.iter()
                    .map(|bar| self.representative(bar))
                    .collect::<Result<Vec<_>>>()
            })
            .collect()
    }
}

/// Cocycle representatives of the bars of `barcode`, which must be the cohomology barcode of
/// `filtration`. The result is aligned with `barcode` dimension by dimension.
pub fn get_coho_reps(filtration: &Filtration, barcode: &Barcode) -> Result<Representatives> {
    let boundary = BoundaryMatrix::new(filtration);
    let cancel = CancellationToken::new();
    let reduction = ReductionEngine::new(&cancel).run(&boundary, Direction::Cohomology)?;
    RepresentativeExtractor::new(filtration, &reduction).representatives(barcode)
}
