//! The barcode pipeline.
//!
//! [`compute_barcodes`] takes a validated [`Filtration`] and reduces its coboundary matrix. It then
//! reads off cocycle representatives, applies $Sq^k$ to them and computes the persistence of the
//! images. In relative mode the pipeline runs on [`Filtration::cone`] instead
//! and the class of the cone point is dropped from the result.

use std::time::Duration;

use crate::barcode::{Bar, Barcode, ValuedBar};
use crate::boundary::BoundaryMatrix;
use crate::cancel::CancellationToken;
use crate::cochain::Cochain;
use crate::error::{Result, SteenroderError};
use crate::filtration::{Filtration, Vertex};
use crate::reduction::{Direction, ReductionEngine};
use crate::representatives::{RepresentativeExtractor, Representatives};
use crate::steenrod_barcode::{SteenrodBarcodeComputer, SteenrodImages};
use crate::steenrod_square::SteenrodSquare;
use crate::utils::{Config, Mode};

/// Emit a per stage summary, at `info` level if the computation is verbose and `debug` otherwise.
macro_rules! stage {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            tracing::info!($($arg)+);
        } else {
            tracing::debug!($($arg)+);
        }
    };
}

/// Everything computed by [`compute_barcodes`].
///
/// All indices refer to [`Barcodes::filtration`], which in relative mode is the cone on the input
/// filtration. `reps` and `steenrod_reps` are aligned with `barcode`, and `steenrod_barcode` is
/// correlated with `barcode` by birth index.
#[derive(Clone, Debug)]
pub struct Barcodes {
    pub k: usize,
    pub mode: Mode,
    /// The filtration that was reduced. In relative mode its values, if any, are not monotone, see
    /// [`Filtration::cone`].
    pub filtration: Filtration,
    pub barcode: Barcode,
    pub steenrod_barcode: Barcode,
    pub reps: Representatives,
    pub steenrod_reps: Representatives,
    pub images: SteenrodImages,
    /// The barcodes in units of filtration values, if requested.
    pub values: Option<ValuedBarcodes>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ValuedBarcodes {
    pub barcode: Vec<Vec<ValuedBar>>,
    pub steenrod_barcode: Vec<Vec<ValuedBar>>,
}

impl Barcodes {
    /// The representative of the bar born at `birth`, with the $Sq^k$ image of that
    /// representative.
    pub fn representative(&self, birth: usize) -> Option<(&Cochain, &Cochain)> {
        let (dim, pos) = self.barcode.position(birth)?;
        Some((&self.reps[dim][pos], &self.steenrod_reps[dim][pos]))
    }

    /// Every bar with its representative and the $Sq^k$ image of that representative, in the
    /// order of [`Barcode::iter`].
    pub fn representatives(&self) -> impl Iterator<Item = (usize, &Bar, &Cochain, &Cochain)> + '_ {
        self.barcode
            .by_dimension()
            .iter()
            .zip(self.reps.iter().zip(&self.steenrod_reps))
            .enumerate()
            .flat_map(|(dim, (bars, (reps, squares)))| {
                bars.iter()
                    .zip(reps.iter().zip(squares))
                    .map(move |(bar, (rep, square))| (dim, bar, rep, square))
            })
    }

    /// The Steenrod bar of the class born at `birth`, if there is one.
    pub fn steenrod_bar(&self, birth: usize) -> Option<Bar> {
        self.steenrod_barcode.find(birth).map(|(_, bar)| bar)
    }
}

/// Compute the cohomology barcode and the $Sq^k$ barcode of `filtration`.
pub fn compute_barcodes(filtration: &Filtration, config: &Config) -> Result<Barcodes> {
    let cancel = match config.timeout_ms {
        Some(ms) => CancellationToken::with_timeout(Duration::from_millis(ms)),
        None => CancellationToken::new(),
    };
    compute_barcodes_with_cancel(filtration, config, &cancel)
}

/// As [`compute_barcodes`], polling `cancel` throughout. A cancelled computation returns
/// [`SteenroderError::Cancelled`] and no partial result.
#[tracing::instrument(skip_all, fields(k = config.k, mode = %config.mode, num_simplices = filtration.len()))]
pub fn compute_barcodes_with_cancel(
    filtration: &Filtration,
    config: &Config,
    cancel: &CancellationToken,
) -> Result<Barcodes> {
    if config.return_filtration_values && filtration.values().is_none() {
        return Err(SteenroderError::MissingFiltrationValues);
    }

    let complex = match config.mode {
        Mode::Absolute => filtration.clone(),
        Mode::Relative => filtration.cone(),
    };
    let verbose = config.verbose;
    let k = config.k;

    let boundary = BoundaryMatrix::new(&complex);
    let reduction = ReductionEngine::new(cancel).run(&boundary, Direction::Cohomology)?;
    let mut barcode = Barcode::from_reduction(&complex, &reduction);
    stage!(verbose, bars = barcode.len(), "reduced coboundary matrix");

    let mut reps = RepresentativeExtractor::new(&complex, &reduction).representatives(&barcode)?;
    stage!(verbose, "extracted cocycle representatives");

    let square = SteenrodSquare::new();
    let computer = SteenrodBarcodeComputer::new(&complex, &reduction, &square, cancel);
    let mut steenrod_reps = computer.steenrod_representatives(k, &barcode, &reps)?;
    let mut images = computer.images(k, &barcode, &steenrod_reps);
    stage!(verbose, nonzero_images = images.len(), "applied Sq^{k}");

    let mut steenrod_barcode = computer.barcode(&images)?;
    stage!(verbose, bars = steenrod_barcode.len(), "reduced Steenrod images");

    if config.mode == Mode::Relative {
        // The cone point is the first simplex, hence the last in the order of the reduction.
        let apex = complex.reverse_index(0);
        if let Some((dim, pos)) = barcode.position(apex) {
            barcode.remove(dim, pos);
            reps[dim].remove(pos);
            steenrod_reps[dim].remove(pos);
        }
        steenrod_barcode.remove_born_at(apex);
        images.remove(apex);
    }

    let values = if config.return_filtration_values {
        Some(ValuedBarcodes {
            barcode: barcode.to_values(&complex)?,
            steenrod_barcode: steenrod_barcode.to_values(&complex)?,
        })
    } else {
        None
    };

    Ok(Barcodes {
        k,
        mode: config.mode,
        filtration: complex,
        barcode,
        steenrod_barcode,
        reps,
        steenrod_reps,
        images,
        values,
    })
}

/// The cohomology barcode of `filtration` alone.
pub fn cohomology_barcode(filtration: &Filtration) -> Result<Barcode> {
    let boundary = BoundaryMatrix::new(filtration);
    let cancel = CancellationToken::new();
    let reduction = ReductionEngine::new(&cancel).run(&boundary, Direction::Cohomology)?;
    Ok(Barcode::from_reduction(filtration, &reduction))
}

/// Validate `simplices` (and `values`, if given) as a filtration and return its cohomology barcode
/// and its $Sq^k$ barcode. In relative mode (`absolute == false`) indices refer to the cone on the
/// filtration, see [`Filtration::cone`].
///
/// This is the short form of [`compute_barcodes`], which is the full entry point: it takes a
/// [`Config`] with the `return_filtration_values`, `verbose` and `timeout_ms` options and
/// returns the valued bars and the representatives as well.
pub fn barcodes(
    k: usize,
    simplices: Vec<Vec<Vertex>>,
    values: Option<Vec<f64>>,
    absolute: bool,
) -> Result<(Barcode, Barcode)> {
    let filtration = Filtration::from_parts(simplices, values)?;
    let config = Config {
        k,
        mode: if absolute { Mode::Absolute } else { Mode::Relative },
        ..Config::default()
    };
    let result = compute_barcodes(&filtration, &config)?;
    Ok((result.barcode, result.steenrod_barcode))
}
