//! Break cycles by inverting DFS back edges.
//!
//! A first walk starts at the model roots; a second walk picks up whatever the first one
//! could not reach (isolated cycles, fragments only reachable against edge direction). Any
//! edge that leads back onto the active search path is inverted, so afterwards the
//! `connects_as_source` lists describe a DAG.

use crate::error::Result;
use crate::model::{HierarchyModel, NodeIx, Step};
use crate::stage::LayoutStage;
use rustc_hash::FxHashSet as HashSet;

#[derive(Debug, Clone, Copy, Default)]
pub struct CycleRemover;

impl LayoutStage for CycleRemover {
    fn name(&self) -> &'static str {
        "cycle-removal"
    }

    fn execute(&self, model: &mut HierarchyModel) -> Result<()> {
        let inverted = run(model);
        tracing::debug!(inverted, "cycle removal finished");
        Ok(())
    }
}

/// Returns the number of edges inverted.
pub fn run(model: &mut HierarchyModel) -> usize {
    let mut inverted = 0usize;
    let mut seen: HashSet<NodeIx> = HashSet::default();

    let starts = start_nodes(model);
    model.visit(&starts, &mut seen, |m, step| {
        if break_back_edge(m, step) {
            inverted += 1;
        }
    });

    let unseen: Vec<NodeIx> = model.node_ixs().filter(|ix| !seen.contains(ix)).collect();
    if unseen.is_empty() {
        return inverted;
    }

    model.visit(&unseen, &mut seen, |m, step| {
        if break_back_edge(m, step) {
            inverted += 1;
        }
    });

    // Fragments the roots could not reach may start at a pure source of their own.
    for ix in unseen {
        if model.node(ix).connects_as_target.is_empty() {
            let cell = model.node(ix).cell.clone();
            if !model.roots.contains(&cell) {
                model.roots.push(cell);
            }
        }
    }
    inverted
}

fn start_nodes(model: &HierarchyModel) -> Vec<NodeIx> {
    let roots = model.root_nodes();
    if !roots.is_empty() {
        return roots;
    }
    let sources: Vec<NodeIx> = model
        .node_ixs()
        .filter(|&ix| model.node(ix).connects_as_target.is_empty())
        .collect();
    if !sources.is_empty() {
        return sources;
    }
    model.node_ixs().take(1).collect()
}

fn break_back_edge(model: &mut HierarchyModel, step: Step) -> bool {
    let (true, Some(edge)) = (step.on_path, step.edge) else {
        return false;
    };
    model.invert_edge(edge);
    true
}
