//! Benchmark support crate for streetprint.
//!
//! Provides seeded synthetic street grids and parameter types used by the
//! Criterion benchmarks for orbit counting, linkage construction and region
//! clustering.

pub mod error;
pub mod params;
pub mod street;
