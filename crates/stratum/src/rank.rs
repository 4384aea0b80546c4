//! Rank assignment (layering).
//!
//! `initial_rank` is a work-list longest-path layering. In the default mode it scans from
//! the sinks: a node is ranked once every outgoing edge leads to a ranked node, one layer
//! above the highest of them. Scanning from the sources is the mirror image. Either way the
//! result is renumbered so rank 0 holds the sources and every edge points to a strictly
//! larger rank.
//!
//! `fix_ranks` then materialises the per-rank entry lists with one DFS, inserting a segment
//! entry on every rank a long edge passes through.

use crate::error::Result;
use crate::model::{DummySegment, EdgeIx, HierarchyModel, NodeIx, RankEntry};
use crate::report::Diagnostic;
use crate::stage::LayoutStage;
use rustc_hash::FxHashSet as HashSet;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy)]
pub struct RankAssigner {
    pub layout_from_sinks: bool,
    pub tighten_to_source: bool,
}

impl Default for RankAssigner {
    fn default() -> Self {
        Self {
            layout_from_sinks: true,
            tighten_to_source: true,
        }
    }
}

impl LayoutStage for RankAssigner {
    fn name(&self) -> &'static str {
        "layering"
    }

    fn execute(&self, model: &mut HierarchyModel) -> Result<()> {
        initial_rank(model, self.layout_from_sinks, self.tighten_to_source);
        fix_ranks(model);
        Ok(())
    }
}

/// Assigns `rank` to every node and sets `max_rank`.
///
/// Nodes the work-list cannot resolve are pinned to rank 0 and reported as a
/// [`Diagnostic::RankingStalled`]; with an acyclic model this does not happen.
pub fn initial_rank(model: &mut HierarchyModel, from_sinks: bool, tighten_to_source: bool) {
    let node_count = model.node_count();
    let mut layer: Vec<Option<i32>> = vec![None; node_count];
    let mut queued: Vec<bool> = vec![false; node_count];
    let mut scanned: Vec<bool> = vec![false; model.edge_count()];

    let mut from_sinks = from_sinks;
    let mut starts: Vec<NodeIx> = if from_sinks {
        model
            .node_ixs()
            .filter(|&ix| model.node(ix).connects_as_source.is_empty())
            .collect()
    } else {
        Vec::new()
    };
    if starts.is_empty() {
        from_sinks = false;
        starts = sources_roots_first(model);
    }

    let mut queue: VecDeque<NodeIx> = VecDeque::new();
    for &ix in &starts {
        queued[ix.0] = true;
        queue.push_back(ix);
    }

    let mut failed_in_a_row = 0usize;
    while let Some(v) = queue.pop_front() {
        let node = model.node(v);
        let (determining, to_mark) = if from_sinks {
            (&node.connects_as_source, &node.connects_as_target)
        } else {
            (&node.connects_as_target, &node.connects_as_source)
        };

        let mut value: i32 = 0;
        let mut ready = true;
        for &e in determining {
            if !scanned[e.0] {
                ready = false;
                break;
            }
            let edge = model.edge(e);
            let other = if from_sinks { edge.target } else { edge.source };
            if let Some(l) = layer[other.0] {
                value = value.max(l + 1);
            }
        }

        if !ready {
            queue.push_back(v);
            failed_in_a_row += 1;
            if failed_in_a_row >= queue.len() {
                break;
            }
            continue;
        }

        failed_in_a_row = 0;
        layer[v.0] = Some(value);
        for &e in to_mark {
            scanned[e.0] = true;
            let edge = model.edge(e);
            let other = if from_sinks { edge.source } else { edge.target };
            if layer[other.0].is_none() && !queued[other.0] {
                queued[other.0] = true;
                queue.push_back(other);
            }
        }
    }

    if from_sinks && tighten_to_source {
        // Pull each sink up to just below its lowest-ranked predecessor.
        for &ix in &starts {
            let mut tightest: Option<i32> = None;
            for &e in &model.node(ix).connects_as_target {
                let Some(l) = layer[model.edge(e).source.0] else {
                    continue;
                };
                tightest = Some(tightest.map_or(l - 1, |t: i32| t.min(l - 1)));
            }
            if let (Some(t), Some(_)) = (tightest, layer[ix.0]) {
                layer[ix.0] = Some(t);
            }
        }
    }

    let resolved = layer.iter().flatten();
    let (lo, hi) = resolved.fold((i32::MAX, i32::MIN), |(lo, hi), &l| (lo.min(l), hi.max(l)));

    let mut unresolved: Vec<String> = Vec::new();
    let mut max_rank: i32 = 0;
    for ix in model.node_ixs() {
        let rank = match layer[ix.0] {
            Some(l) if from_sinks => hi - l,
            Some(l) => l - lo,
            None => {
                unresolved.push(model.node(ix).cell.clone());
                0
            }
        };
        max_rank = max_rank.max(rank);
        model.node_mut(ix).rank = Some(rank);
    }
    model.max_rank = max_rank;

    if !unresolved.is_empty() {
        tracing::warn!(
            count = unresolved.len(),
            "rank assignment made no progress; pinning unresolved vertices to rank 0"
        );
        model
            .diagnostics
            .push(Diagnostic::RankingStalled { unresolved });
    }
}

/// Nodes without incoming edges, model roots first.
fn sources_roots_first(model: &HierarchyModel) -> Vec<NodeIx> {
    let mut out: Vec<NodeIx> = model
        .root_nodes()
        .into_iter()
        .filter(|&ix| model.node(ix).connects_as_target.is_empty())
        .collect();
    for ix in model.node_ixs() {
        if model.node(ix).connects_as_target.is_empty() && !out.contains(&ix) {
            out.push(ix);
        }
    }
    out
}

/// Builds `model.ranks` from the assigned ranks.
///
/// Each node takes the next free slot of its rank when a DFS first reaches it, which already
/// gives trees a crossing-free initial order. Every edge spanning more than one rank gets one
/// [`DummySegment`] per intermediate rank, i.e. `target.rank - source.rank - 1` of them.
pub fn fix_ranks(model: &mut HierarchyModel) {
    let rank_count = usize::try_from(model.max_rank).unwrap_or(0) + 1;
    model.ranks = vec![Vec::new(); rank_count];
    for ix in model.node_ixs() {
        model.node_mut(ix).order = None;
    }
    for e in model.edge_ixs() {
        let edge = model.edge_mut(e);
        edge.segments.clear();
        edge.min_rank = None;
        edge.max_rank = None;
    }

    let mut starts: Vec<NodeIx> = model.root_nodes();
    starts.extend(sources_roots_first(model));
    starts.extend(model.node_ixs());

    let mut seen: HashSet<NodeIx> = HashSet::default();
    model.visit(&starts, &mut seen, |m, step| {
        if step.first_visit {
            let rank = rank_slot(m, step.node);
            m.ranks[rank].push(RankEntry::Node(step.node));
            let order = m.ranks[rank].len() - 1;
            m.node_mut(step.node).order = Some(order);
        }
        if let (Some(parent), Some(edge)) = (step.parent, step.edge) {
            add_segments(m, parent, step.node, edge);
        }
    });
}

fn rank_slot(model: &HierarchyModel, ix: NodeIx) -> usize {
    let rank = model.node(ix).rank.unwrap_or(0).clamp(0, model.max_rank);
    usize::try_from(rank).unwrap_or(0)
}

fn add_segments(model: &mut HierarchyModel, source: NodeIx, target: NodeIx, e: EdgeIx) {
    let top = model.node(source).rank.unwrap_or(0);
    let bottom = model.node(target).rank.unwrap_or(0);
    {
        let edge = model.edge_mut(e);
        edge.min_rank = Some(top);
        edge.max_rank = Some(bottom);
    }
    for rank in (top + 1)..bottom {
        let Ok(slot) = usize::try_from(rank) else {
            continue;
        };
        model.ranks[slot].push(RankEntry::Segment { edge: e, rank });
        let order = model.ranks[slot].len() - 1;
        model.edge_mut(e).segments.push(DummySegment {
            rank,
            order,
            x: 0.0,
            y: 0.0,
        });
    }
}
