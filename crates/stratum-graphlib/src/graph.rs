//! Compound diagram graph.
//!
//! Vertices carry a geometry and live under exactly one parent cell (the graph root by
//! default). Edges connect two vertices and may be routed through waypoints. Vertices can be
//! collapsed or hidden, in which case edges attached to their descendants are reported as if
//! they attached to the outermost collapsed ancestor.
//!
//! Every write is recorded as a [`Change`]. Writes issued between [`Graph::begin_update`] and
//! the matching [`Graph::end_update`] are committed as one batch, so observers of
//! [`Graph::history`] never see a half-applied update.

use crate::geometry::{Point, Rect};
use rustc_hash::FxBuildHasher;

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;
type HashSet<T> = hashbrown::HashSet<T, FxBuildHasher>;

pub const DEFAULT_ROOT: &str = "root";

#[derive(Debug, Clone)]
struct VertexEntry {
    id: String,
    geometry: Rect,
    collapsed: bool,
    visible: bool,
}

#[derive(Debug, Clone)]
struct EdgeEntry {
    id: String,
    source: String,
    target: String,
    visible: bool,
    points: Vec<Point>,
}

/// An edge as seen from one of its (visible) endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub edge: String,
    pub source: String,
    pub target: String,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Geometry {
        cell: String,
        previous: Rect,
        current: Rect,
    },
    Points {
        edge: String,
        previous: Vec<Point>,
        current: Vec<Point>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphError {
    DuplicateCell,
    UnknownParent,
    UnknownTerminal,
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::DuplicateCell => f.write_str("a cell with this id already exists"),
            GraphError::UnknownParent => f.write_str("parent cell does not exist"),
            GraphError::UnknownTerminal => f.write_str("edge terminal is not a vertex"),
        }
    }
}

impl std::error::Error for GraphError {}

#[derive(Debug, Clone)]
pub struct Graph {
    root: String,

    vertices: Vec<VertexEntry>,
    vertex_index: HashMap<String, usize>,

    edges: Vec<EdgeEntry>,
    edge_index: HashMap<String, usize>,

    parent: HashMap<String, String>,
    children: HashMap<String, Vec<String>>,
    // Edge indices keyed by the vertex they are attached to (not the visible terminal).
    incident: HashMap<String, Vec<usize>>,

    update_level: usize,
    pending: Vec<Change>,
    history: Vec<Vec<Change>>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::with_root(DEFAULT_ROOT)
    }

    pub fn with_root(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            vertices: Vec::new(),
            vertex_index: HashMap::default(),
            edges: Vec::new(),
            edge_index: HashMap::default(),
            parent: HashMap::default(),
            children: HashMap::default(),
            incident: HashMap::default(),
            update_level: 0,
            pending: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    fn has_cell(&self, id: &str) -> bool {
        id == self.root || self.vertex_index.contains_key(id) || self.edge_index.contains_key(id)
    }

    /// Adds a vertex directly under the graph root.
    pub fn add_vertex(&mut self, id: impl Into<String>, geometry: Rect) -> Result<(), GraphError> {
        let root = self.root.clone();
        self.add_child_vertex(&root, id, geometry)
    }

    pub fn add_child_vertex(
        &mut self,
        parent: &str,
        id: impl Into<String>,
        geometry: Rect,
    ) -> Result<(), GraphError> {
        let id = id.into();
        if self.has_cell(&id) {
            return Err(GraphError::DuplicateCell);
        }
        if parent != self.root && !self.vertex_index.contains_key(parent) {
            return Err(GraphError::UnknownParent);
        }
        let idx = self.vertices.len();
        self.vertices.push(VertexEntry {
            id: id.clone(),
            geometry,
            collapsed: false,
            visible: true,
        });
        self.vertex_index.insert(id.clone(), idx);
        self.parent.insert(id.clone(), parent.to_string());
        self.children.entry(parent.to_string()).or_default().push(id);
        Ok(())
    }

    pub fn add_edge(
        &mut self,
        id: impl Into<String>,
        source: &str,
        target: &str,
    ) -> Result<(), GraphError> {
        let id = id.into();
        if self.has_cell(&id) {
            return Err(GraphError::DuplicateCell);
        }
        if !self.vertex_index.contains_key(source) || !self.vertex_index.contains_key(target) {
            return Err(GraphError::UnknownTerminal);
        }
        let idx = self.edges.len();
        self.edges.push(EdgeEntry {
            id: id.clone(),
            source: source.to_string(),
            target: target.to_string(),
            visible: true,
            points: Vec::new(),
        });
        self.edge_index.insert(id, idx);
        self.incident.entry(source.to_string()).or_default().push(idx);
        if source != target {
            self.incident.entry(target.to_string()).or_default().push(idx);
        }
        Ok(())
    }

    /// Adds an edge with a generated id (`e0`, `e1`, ...) and returns the id.
    pub fn connect(&mut self, source: &str, target: &str) -> Result<String, GraphError> {
        let mut n = self.edges.len();
        let mut id = format!("e{n}");
        while self.has_cell(&id) {
            n += 1;
            id = format!("e{n}");
        }
        self.add_edge(id.clone(), source, target)?;
        Ok(id)
    }

    pub fn is_vertex(&self, id: &str) -> bool {
        self.vertex_index.contains_key(id)
    }

    pub fn is_edge(&self, id: &str) -> bool {
        self.edge_index.contains_key(id)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = &str> {
        self.vertices.iter().map(|v| v.id.as_str())
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = &str> {
        self.edges.iter().map(|e| e.id.as_str())
    }

    pub fn parent(&self, id: &str) -> Option<&str> {
        self.parent.get(id).map(|s| s.as_str())
    }

    /// Child vertices of `parent` in insertion order.
    pub fn children(&self, parent: &str) -> Vec<&str> {
        self.children
            .get(parent)
            .map(|v| v.iter().map(|s| s.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn descendants(&self, id: &str) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        let mut stack: Vec<&str> = self.children(id);
        stack.reverse();
        while let Some(v) = stack.pop() {
            out.push(v);
            let mut ch = self.children(v);
            ch.reverse();
            stack.extend(ch);
        }
        out
    }

    pub fn edge_terminals(&self, edge: &str) -> Option<(&str, &str)> {
        let e = &self.edges[*self.edge_index.get(edge)?];
        Some((e.source.as_str(), e.target.as_str()))
    }

    pub fn set_collapsed(&mut self, id: &str, collapsed: bool) {
        if let Some(&idx) = self.vertex_index.get(id) {
            self.vertices[idx].collapsed = collapsed;
        }
    }

    pub fn is_collapsed(&self, id: &str) -> bool {
        self.vertex_index
            .get(id)
            .is_some_and(|&idx| self.vertices[idx].collapsed)
    }

    pub fn set_visible(&mut self, id: &str, visible: bool) {
        if let Some(&idx) = self.vertex_index.get(id) {
            self.vertices[idx].visible = visible;
        } else if let Some(&idx) = self.edge_index.get(id) {
            self.edges[idx].visible = visible;
        }
    }

    /// A cell is visible when it and every ancestor below the root are visible and no
    /// ancestor is collapsed.
    pub fn is_visible(&self, id: &str) -> bool {
        if let Some(&idx) = self.edge_index.get(id) {
            return self.edges[idx].visible;
        }
        let Some(&idx) = self.vertex_index.get(id) else {
            return id == self.root;
        };
        if !self.vertices[idx].visible {
            return false;
        }
        let mut cur = self.parent(id);
        while let Some(p) = cur {
            if p == self.root {
                break;
            }
            let Some(&pidx) = self.vertex_index.get(p) else {
                break;
            };
            if !self.vertices[pidx].visible || self.vertices[pidx].collapsed {
                return false;
            }
            cur = self.parent(p);
        }
        true
    }

    /// Resolves the endpoint an edge appears to attach to: the terminal itself, or the
    /// outermost ancestor that is collapsed or hides it.
    pub fn visible_terminal(&self, edge: &str, source: bool) -> Option<&str> {
        let e = &self.edges[*self.edge_index.get(edge)?];
        let terminal = if source { &e.source } else { &e.target };
        let mut best: &str = terminal.as_str();
        let mut cur: Option<&str> = Some(terminal.as_str());
        while let Some(c) = cur {
            if c == self.root {
                break;
            }
            let Some(&idx) = self.vertex_index.get(c) else {
                break;
            };
            let best_hidden = self
                .vertex_index
                .get(best)
                .is_some_and(|&b| !self.vertices[b].visible);
            if best_hidden || self.vertices[idx].collapsed {
                best = c;
            }
            cur = self.parent(c);
        }
        let hidden = self
            .vertex_index
            .get(best)
            .is_none_or(|&b| !self.vertices[b].visible);
        if hidden { None } else { Some(best) }
    }

    /// Edges whose visible source or target is `vertex`, including edges attached to hidden
    /// descendants of a collapsed `vertex`. Terminals are reported as visible terminals.
    pub fn connections(&self, vertex: &str) -> Vec<Connection> {
        if !self.vertex_index.contains_key(vertex) {
            return Vec::new();
        }
        let mut cells: Vec<&str> = vec![vertex];
        cells.extend(self.descendants(vertex));

        let mut seen: HashSet<usize> = HashSet::default();
        let mut out: Vec<Connection> = Vec::new();
        for cell in cells {
            let Some(edge_ixs) = self.incident.get(cell) else {
                continue;
            };
            for &ix in edge_ixs {
                if !seen.insert(ix) {
                    continue;
                }
                let e = &self.edges[ix];
                let (Some(source), Some(target)) = (
                    self.visible_terminal(&e.id, true),
                    self.visible_terminal(&e.id, false),
                ) else {
                    continue;
                };
                if source != vertex && target != vertex {
                    continue;
                }
                out.push(Connection {
                    edge: e.id.clone(),
                    source: source.to_string(),
                    target: target.to_string(),
                    visible: e.visible,
                });
            }
        }
        out.sort_by_key(|c| self.edge_index.get(&c.edge).copied().unwrap_or(usize::MAX));
        out
    }

    pub fn geometry(&self, id: &str) -> Option<Rect> {
        self.vertex_index
            .get(id)
            .map(|&idx| self.vertices[idx].geometry)
    }

    pub fn set_geometry(&mut self, id: &str, geometry: Rect) {
        let Some(&idx) = self.vertex_index.get(id) else {
            return;
        };
        let previous = self.vertices[idx].geometry;
        if previous == geometry {
            return;
        }
        self.vertices[idx].geometry = geometry;
        self.record(Change::Geometry {
            cell: id.to_string(),
            previous,
            current: geometry,
        });
    }

    pub fn move_vertex(&mut self, id: &str, x: f64, y: f64) {
        if let Some(geo) = self.geometry(id) {
            self.set_geometry(id, Rect::new(x, y, geo.width, geo.height));
        }
    }

    pub fn resize_vertex(&mut self, id: &str, width: f64, height: f64) {
        if let Some(geo) = self.geometry(id) {
            self.set_geometry(id, Rect::new(geo.x, geo.y, width, height));
        }
    }

    pub fn edge_points(&self, edge: &str) -> Option<&[Point]> {
        self.edge_index
            .get(edge)
            .map(|&idx| self.edges[idx].points.as_slice())
    }

    pub fn set_edge_points(&mut self, edge: &str, points: Vec<Point>) {
        let Some(&idx) = self.edge_index.get(edge) else {
            return;
        };
        if self.edges[idx].points == points {
            return;
        }
        let previous = std::mem::replace(&mut self.edges[idx].points, points.clone());
        self.record(Change::Points {
            edge: edge.to_string(),
            previous,
            current: points,
        });
    }

    pub fn begin_update(&mut self) {
        self.update_level += 1;
    }

    pub fn end_update(&mut self) {
        if self.update_level == 0 {
            return;
        }
        self.update_level -= 1;
        if self.update_level == 0 && !self.pending.is_empty() {
            let batch = std::mem::take(&mut self.pending);
            self.history.push(batch);
        }
    }

    pub fn is_updating(&self) -> bool {
        self.update_level > 0
    }

    /// Committed change batches, oldest first.
    pub fn history(&self) -> &[Vec<Change>] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    fn record(&mut self, change: Change) {
        if self.update_level == 0 {
            self.history.push(vec![change]);
        } else {
            self.pending.push(change);
        }
    }
}
