//! The fixed sequence of passes run over every hierarchy.

use crate::cycle::CycleRemover;
use crate::error::Result;
use crate::model::HierarchyModel;
use crate::order::CrossingReducer;
use crate::position::CoordinateAssigner;
use crate::rank::RankAssigner;
use crate::types::LayoutOptions;

pub trait LayoutStage {
    fn name(&self) -> &'static str;

    fn execute(&self, model: &mut HierarchyModel) -> Result<()>;
}

/// Cycle removal, layering, crossing reduction and coordinate assignment, in that order.
///
/// `initial_x` is the order-axis offset the hierarchy is placed at.
pub fn stages(options: &LayoutOptions, initial_x: f64) -> Vec<Box<dyn LayoutStage>> {
    let mut stages: Vec<Box<dyn LayoutStage>> = Vec::with_capacity(4);
    stages.push(Box::new(CycleRemover));
    stages.push(Box::new(RankAssigner {
        layout_from_sinks: options.layout_from_sinks,
        tighten_to_source: options.tighten_to_source,
    }));
    stages.push(Box::new(CrossingReducer {
        max_iterations: options.max_crossing_iterations,
        max_transpose_passes: options.max_transpose_passes,
    }));
    stages.push(Box::new(CoordinateAssigner::new(options.clone(), initial_x)));
    stages
}

/// Runs every stage on `model`, logging each one.
pub fn run_all(stages: &[Box<dyn LayoutStage>], model: &mut HierarchyModel) -> Result<()> {
    for stage in stages {
        tracing::debug!(stage = stage.name(), "running layout stage");
        stage.execute(model)?;
    }
    Ok(())
}
