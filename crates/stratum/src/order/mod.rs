//! Crossing reduction.
//!
//! Alternating weighted-median sweeps, each followed by adjacent-pair transposition. The best
//! ordering seen is kept, starting with the ordering the model arrives with, so the result is
//! never worse than the input.

mod cross_count;
mod median;
mod transpose;

pub use cross_count::cross_count;
pub use median::{sweep, weighted_median};
pub use transpose::transpose;

use crate::error::Result;
use crate::model::{HierarchyModel, RankEntry};
use crate::stage::LayoutStage;

#[derive(Debug, Clone, Copy)]
pub struct CrossingReducer {
    pub max_iterations: usize,
    pub max_transpose_passes: usize,
}

impl Default for CrossingReducer {
    fn default() -> Self {
        Self {
            max_iterations: 24,
            max_transpose_passes: 10,
        }
    }
}

impl LayoutStage for CrossingReducer {
    fn name(&self) -> &'static str {
        "crossing-reduction"
    }

    fn execute(&self, model: &mut HierarchyModel) -> Result<()> {
        let crossings = reduce(model, self.max_iterations, self.max_transpose_passes);
        tracing::debug!(crossings, "crossing reduction finished");
        Ok(())
    }
}

/// Reorders every rank in place and returns the crossing count of the kept ordering.
pub fn reduce(model: &mut HierarchyModel, max_iterations: usize, max_transpose_passes: usize) -> usize {
    model.sync_orders();
    let mut best_cc = cross_count(model);
    let mut best: Vec<Vec<RankEntry>> = model.ranks.clone();

    let mut i: usize = 0;
    let mut last_best: usize = 0;
    while best_cc > 0 && i < max_iterations && last_best < 4 {
        sweep(model, i % 2 == 0);
        transpose(model, max_transpose_passes);

        let cc = cross_count(model);
        if cc < best_cc {
            last_best = 0;
            best_cc = cc;
            best = model.ranks.clone();
        }
        i += 1;
        last_best += 1;
    }

    model.ranks = best;
    model.sync_orders();
    best_cc
}
