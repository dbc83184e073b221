#![allow(clippy::many_single_char_names)]
#![allow(clippy::type_complexity)]
#![warn(clippy::default_trait_access)]
#![warn(clippy::if_not_else)]
#![warn(clippy::needless_continue)]
#![warn(clippy::redundant_closure_for_method_calls)]
#![warn(clippy::explicit_iter_loop)]
#![warn(clippy::explicit_into_iter_loop)]

//! Persistent cohomology of simplicial filtrations over $\mathbb{F}_2$, together with the
//! persistence of the Steenrod squares $Sq^k$ of the persistent classes.
//!
//! The input is a [`Filtration`]: a list of simplices in which every face occurs before its
//! cofaces. [`compute_barcodes`] computes
//!  - the cohomology barcode, by reducing the coboundary matrix in reverse filtration order;
//!  - a cocycle representative for every bar;
//!  - the image of every representative under $Sq^k$;
//!  - the Steenrod barcode, which records on which part of its bar each image is a non-trivial
//!    class, independent of the images of earlier classes.
//!
//! All bars are reported as indices in reverse filtration order, see [`Bar`].
//!
//! ```
//! use steenroder::barcodes;
//!
//! let simplices = vec![vec![0], vec![1], vec![0, 1]];
//! let (barcode, steenrod_barcode) = barcodes(1, simplices, None, true).unwrap();
//! assert_eq!(barcode.betti_numbers(), vec![1, 0]);
//! assert!(steenrod_barcode.is_empty());
//! ```

pub mod barcode;
pub mod boundary;
pub mod cancel;
pub mod cochain;
pub mod error;
pub mod filtration;
pub mod persistence;
pub mod reduction;
pub mod representatives;
pub mod steenrod_barcode;
pub mod steenrod_square;
pub mod utils;

pub use barcode::{Bar, Barcode, ValuedBar};
pub use boundary::{get_boundary, BoundaryMatrix};
pub use cancel::CancellationToken;
pub use cochain::{cochain_to_vector, vector_to_cochain, Cochain};
pub use error::{FiltrationDefect, Result, SteenroderError};
pub use filtration::{Filtration, Simplex};
pub use persistence::{barcodes, compute_barcodes, compute_barcodes_with_cancel, Barcodes};
pub use representatives::get_coho_reps;
pub use steenrod_barcode::get_st_reps;
pub use steenrod_square::SteenrodSquare;
pub use utils::{Config, Mode};
