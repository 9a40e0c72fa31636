//! Canonical data model shared by every Nouns governance data source, plus the
//! primitive formatting rules that turn raw chain values into display values.

pub mod constants;
mod format;
mod proposal;
mod status;
mod vote;

pub use {format::*, proposal::*, status::*, vote::*};
