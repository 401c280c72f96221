//! Benchmark parameter types.
//!
//! Each implements `Display` so it can label a Criterion `BenchmarkId`.

use std::fmt;

use streetprint_core::{GraphletSize, LinkageMethod};

/// Parameters for an orbit counting run.
#[derive(Clone, Copy, Debug)]
pub struct CountBenchParams {
    /// Grid width in intersections.
    pub width: usize,
    /// Grid height in intersections.
    pub height: usize,
    /// Largest graphlet counted.
    pub size: GraphletSize,
}

impl fmt::Display for CountBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{},k={}", self.width, self.height, self.size)
    }
}

/// Parameters for a linkage run.
#[derive(Clone, Copy, Debug)]
pub struct LinkageBenchParams {
    /// Number of clustered entities.
    pub entities: usize,
    /// Agglomeration rule.
    pub method: LinkageMethod,
}

impl fmt::Display for LinkageBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},{}", self.entities, self.method)
    }
}
