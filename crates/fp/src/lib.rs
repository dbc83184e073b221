#![cfg_attr(rustfmt, rustfmt_skip)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::unreadable_literal)]

//! Linear algebra over $\mathbb{F}_2$.
//!
//! Two vector representations are provided. [`vector::FpVector`] packs entries into limbs and is
//! used for cochains, whose length is the number of simplices of a fixed dimension.
//! [`sparse::SparseVector`] stores the sorted indices of its non-zero entries and is used for the
//! columns of (co)boundary matrices, which have very few non-zero entries each.

pub mod limb;
pub mod matrix;
pub mod sparse;
pub mod vector;
