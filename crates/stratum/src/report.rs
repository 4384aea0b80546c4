//! What a layout call computed and what went wrong along the way.

use crate::graphlib::{Point, Rect};
use serde::Serialize;

/// A per-hierarchy condition the layout recovered from. None of these abort the call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Diagnostic {
    /// No vertex had zero fan-in and positive fan-out; `root` was chosen by the largest
    /// fan-out minus fan-in.
    FallbackRoot { root: String },
    /// Rank assignment stopped making progress. The listed vertices were pinned to rank 0.
    RankingStalled { unresolved: Vec<String> },
    /// The hierarchy could not be laid out and none of its cells were written.
    HierarchySkipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchySummary {
    pub vertices: Vec<String>,
    pub roots: Vec<String>,
    /// Order-axis offset the hierarchy was placed at.
    pub offset: f64,
    pub limit_x: f64,
    pub max_rank: i32,
    pub inverted_edges: usize,
    pub crossings: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl HierarchySummary {
    pub fn is_skipped(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::HierarchySkipped { .. }))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LayoutReport {
    pub hierarchies: Vec<HierarchySummary>,
}

impl LayoutReport {
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.hierarchies.iter().flat_map(|h| h.diagnostics.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VertexPlacement {
    pub cell: String,
    pub bounds: Rect,
    pub rank: i32,
    pub order: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeRoute {
    pub edge: String,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParentResize {
    pub cell: String,
    pub bounds: Rect,
}

/// The full outcome of a layout, computed before anything is written back.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult {
    pub vertices: Vec<VertexPlacement>,
    pub edges: Vec<EdgeRoute>,
    pub parent: Option<ParentResize>,
    pub report: LayoutReport,
}

impl LayoutResult {
    pub fn vertex(&self, cell: &str) -> Option<&VertexPlacement> {
        self.vertices.iter().find(|v| v.cell == cell)
    }

    pub fn edge(&self, edge: &str) -> Option<&EdgeRoute> {
        self.edges.iter().find(|e| e.edge == edge)
    }
}
