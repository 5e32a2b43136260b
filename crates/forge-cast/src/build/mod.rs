//! Package output
//!
//! - `package`: [`PackageBuilder`] renders a whole python package in memory
//!   and writes it to an output directory

pub mod package;

pub use package::{BuildOutput, PackageBuilder};
