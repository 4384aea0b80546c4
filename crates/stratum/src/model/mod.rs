//! Internal model of one hierarchy.
//!
//! The model mirrors the vertices and edges of one weakly-connected hierarchy. It ignores
//! self-loops, bundles parallel edges between the same pair of vertices into a single
//! [`HierarchyEdge`], and records the rank, order and position the layout stages compute for
//! every vertex and for every rank an edge passes through.
//!
//! Nodes and edges live in arenas and refer to each other by index, so stages can mutate the
//! adjacency lists (e.g. invert an edge) while holding plain `Copy` handles.

mod build;
mod visit;

pub use visit::Step;

use crate::graphlib::{Point, Rect};
use crate::report::Diagnostic;
use rustc_hash::FxHashMap as HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIx(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeIx(pub usize);

/// One slot of a rank: a real vertex, or the passage of a long edge through the rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankEntry {
    Node(NodeIx),
    Segment { edge: EdgeIx, rank: i32 },
}

/// Direction of the adjacent rank a neighbour query looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Towards rank 0.
    Up,
    /// Towards `max_rank`.
    Down,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyNode {
    pub cell: String,
    pub rank: Option<i32>,
    pub order: Option<usize>,
    pub connects_as_source: Vec<EdgeIx>,
    pub connects_as_target: Vec<EdgeIx>,
    pub width: f64,
    pub height: f64,
    /// Centre along the order axis, in layout space.
    pub x: f64,
    /// Centre along the rank axis, in layout space.
    pub y: f64,
    /// Final bounds in graph coordinates, set by coordinate assignment.
    pub bounds: Option<Rect>,
}

impl HierarchyNode {
    fn new(cell: String, width: f64, height: f64) -> Self {
        Self {
            cell,
            rank: None,
            order: None,
            connects_as_source: Vec::new(),
            connects_as_target: Vec::new(),
            width,
            height,
            x: 0.0,
            y: 0.0,
            bounds: None,
        }
    }
}

/// A real edge folded into a [`HierarchyEdge`].
#[derive(Debug, Clone, PartialEq)]
pub struct RealEdge {
    pub id: String,
    /// The real edge points from the hierarchy edge's original target to its original source.
    pub reversed: bool,
    /// Waypoints in graph coordinates, from the real source to the real target.
    pub points: Vec<Point>,
}

impl RealEdge {
    pub fn new(id: impl Into<String>, reversed: bool) -> Self {
        Self {
            id: id.into(),
            reversed,
            points: Vec::new(),
        }
    }
}

/// The passage of a long edge through one intermediate rank.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DummySegment {
    pub rank: i32,
    pub order: usize,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyEdge {
    pub source: NodeIx,
    pub target: NodeIx,
    pub edges: Vec<RealEdge>,
    pub inverted: bool,
    pub min_rank: Option<i32>,
    pub max_rank: Option<i32>,
    /// One slot per rank strictly between `min_rank` and `max_rank`, in rank order.
    pub segments: Vec<DummySegment>,
}

impl HierarchyEdge {
    fn invert(&mut self) {
        std::mem::swap(&mut self.source, &mut self.target);
        self.inverted = !self.inverted;
    }

    pub fn segment(&self, rank: i32) -> Option<&DummySegment> {
        let min = self.min_rank?;
        let idx = usize::try_from(rank - min - 1).ok()?;
        self.segments.get(idx)
    }

    pub fn segment_mut(&mut self, rank: i32) -> Option<&mut DummySegment> {
        let min = self.min_rank?;
        let idx = usize::try_from(rank - min - 1).ok()?;
        self.segments.get_mut(idx)
    }
}

#[derive(Debug, Clone, Default)]
pub struct HierarchyModel {
    nodes: Vec<HierarchyNode>,
    edges: Vec<HierarchyEdge>,
    vertex_index: HashMap<String, NodeIx>,
    edge_index: HashMap<String, EdgeIx>,

    /// Cells the traversals start from. Cycle removal may append to it.
    pub roots: Vec<String>,
    /// `ranks[r]` lists the entries of rank `r` in their current order.
    pub ranks: Vec<Vec<RankEntry>>,
    pub max_rank: i32,
    /// Largest order-axis coordinate covered by the placed hierarchy.
    pub limit_x: f64,
    pub diagnostics: Vec<Diagnostic>,
}

impl HierarchyModel {
    pub fn node(&self, ix: NodeIx) -> &HierarchyNode {
        &self.nodes[ix.0]
    }

    pub fn node_mut(&mut self, ix: NodeIx) -> &mut HierarchyNode {
        &mut self.nodes[ix.0]
    }

    pub fn edge(&self, ix: EdgeIx) -> &HierarchyEdge {
        &self.edges[ix.0]
    }

    pub fn edge_mut(&mut self, ix: EdgeIx) -> &mut HierarchyEdge {
        &mut self.edges[ix.0]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node_ixs(&self) -> impl Iterator<Item = NodeIx> + use<> {
        (0..self.nodes.len()).map(NodeIx)
    }

    pub fn edge_ixs(&self) -> impl Iterator<Item = EdgeIx> + use<> {
        (0..self.edges.len()).map(EdgeIx)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &HierarchyNode> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = &HierarchyEdge> {
        self.edges.iter()
    }

    pub fn node_ix(&self, cell: &str) -> Option<NodeIx> {
        self.vertex_index.get(cell).copied()
    }

    pub fn node_by_cell(&self, cell: &str) -> Option<&HierarchyNode> {
        self.node_ix(cell).map(|ix| self.node(ix))
    }

    /// The hierarchy edge a real edge was folded into.
    pub fn edge_for(&self, real_edge: &str) -> Option<EdgeIx> {
        self.edge_index.get(real_edge).copied()
    }

    /// Root cells that belong to this model, as node handles.
    pub fn root_nodes(&self) -> Vec<NodeIx> {
        let mut out: Vec<NodeIx> = Vec::new();
        for cell in &self.roots {
            if let Some(ix) = self.node_ix(cell) {
                if !out.contains(&ix) {
                    out.push(ix);
                }
            }
        }
        out
    }

    /// Reverses `edge` in place, moving it between the adjacency lists of its endpoints.
    pub fn invert_edge(&mut self, edge: EdgeIx) {
        let (source, target) = {
            let e = self.edge(edge);
            (e.source, e.target)
        };
        self.node_mut(source).connects_as_source.retain(|&e| e != edge);
        self.node_mut(target).connects_as_target.retain(|&e| e != edge);
        self.edge_mut(edge).invert();
        self.node_mut(target).connects_as_source.push(edge);
        self.node_mut(source).connects_as_target.push(edge);
    }

    /// Kahn's check over `connects_as_source`.
    pub fn is_acyclic(&self) -> bool {
        let mut indegree: Vec<usize> = self
            .nodes
            .iter()
            .map(|n| n.connects_as_target.len())
            .collect();
        let mut queue: Vec<NodeIx> = self
            .node_ixs()
            .filter(|ix| indegree[ix.0] == 0)
            .collect();
        let mut visited = 0usize;
        while let Some(v) = queue.pop() {
            visited += 1;
            for &e in &self.node(v).connects_as_source {
                let w = self.edge(e).target;
                indegree[w.0] -= 1;
                if indegree[w.0] == 0 {
                    queue.push(w);
                }
            }
        }
        visited == self.nodes.len()
    }

    pub fn entry_rank(&self, entry: RankEntry) -> Option<i32> {
        match entry {
            RankEntry::Node(n) => self.node(n).rank,
            RankEntry::Segment { rank, .. } => Some(rank),
        }
    }

    pub fn entry_order(&self, entry: RankEntry) -> usize {
        match entry {
            RankEntry::Node(n) => self.node(n).order.unwrap_or(0),
            RankEntry::Segment { edge, rank } => {
                self.edge(edge).segment(rank).map(|s| s.order).unwrap_or(0)
            }
        }
    }

    pub fn set_entry_order(&mut self, entry: RankEntry, order: usize) {
        match entry {
            RankEntry::Node(n) => self.node_mut(n).order = Some(order),
            RankEntry::Segment { edge, rank } => {
                if let Some(s) = self.edge_mut(edge).segment_mut(rank) {
                    s.order = order;
                }
            }
        }
    }

    /// Writes each entry's index in its rank list into its order slot.
    pub fn sync_orders(&mut self) {
        let ranks = std::mem::take(&mut self.ranks);
        for rank in &ranks {
            for (i, &entry) in rank.iter().enumerate() {
                self.set_entry_order(entry, i);
            }
        }
        self.ranks = ranks;
    }

    /// Entries adjacent to `entry` in the neighbouring rank on `side`, paired with the number
    /// of real edges each connection stands for.
    pub fn neighbors(&self, entry: RankEntry, side: Side) -> Vec<(RankEntry, usize)> {
        let Some(rank) = self.entry_rank(entry) else {
            return Vec::new();
        };
        let want = match side {
            Side::Up => rank - 1,
            Side::Down => rank + 1,
        };
        let mut out: Vec<(RankEntry, usize)> = Vec::new();
        match entry {
            RankEntry::Node(n) => {
                let node = self.node(n);
                let edges = match side {
                    Side::Up => &node.connects_as_target,
                    Side::Down => &node.connects_as_source,
                };
                for &e in edges {
                    let edge = self.edge(e);
                    let other = match side {
                        Side::Up => edge.source,
                        Side::Down => edge.target,
                    };
                    if let Some(next) = self.step_along(e, other, want) {
                        out.push((next, edge.edges.len().max(1)));
                    }
                }
            }
            RankEntry::Segment { edge: e, .. } => {
                let edge = self.edge(e);
                let other = match side {
                    Side::Up => edge.source,
                    Side::Down => edge.target,
                };
                if let Some(next) = self.step_along(e, other, want) {
                    out.push((next, edge.edges.len().max(1)));
                }
            }
        }
        out
    }

    // The entry of edge `e` at rank `want`: the far endpoint if it sits there, otherwise the
    // edge's own segment if the edge passes through that rank.
    fn step_along(&self, e: EdgeIx, endpoint: NodeIx, want: i32) -> Option<RankEntry> {
        if self.node(endpoint).rank == Some(want) {
            return Some(RankEntry::Node(endpoint));
        }
        self.edge(e)
            .segment(want)
            .map(|_| RankEntry::Segment { edge: e, rank: want })
    }
}
