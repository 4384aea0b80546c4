//! The boundary between the layout engine and the graph it lays out.
//!
//! The engine only reads vertices, connections and sizes through [`GraphAdapter`] and only
//! writes positions and waypoints back through it, always inside one
//! `begin_update`/`end_update` pair.

use crate::graphlib::{Graph, Point, Rect};

/// An edge attached to a vertex, with terminals already resolved to the cells they are
/// visibly attached to (e.g. a collapsed ancestor of the real endpoint).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub visible: bool,
}

impl ConnectedEdge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            visible: true,
        }
    }

    /// The terminal on the other side of `vertex`, if `vertex` is one of the terminals.
    pub fn opposite(&self, vertex: &str) -> Option<&str> {
        if self.source == vertex {
            Some(self.target.as_str())
        } else if self.target == vertex {
            Some(self.source.as_str())
        } else {
            None
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

pub trait GraphAdapter {
    /// Vertices directly contained in `scope`, in model order.
    fn vertices(&self, scope: &str) -> Vec<String>;

    fn connected_edges(&self, vertex: &str) -> Vec<ConnectedEdge>;

    /// Current bounds of `vertex`, relative to its parent.
    fn geometry(&self, vertex: &str) -> Option<Rect>;

    /// Moves the top-left corner of `vertex`; the size is unchanged.
    fn set_geometry(&mut self, vertex: &str, x: f64, y: f64);

    fn set_edge_waypoints(&mut self, edge: &str, points: Vec<Point>);

    fn begin_update(&mut self);

    fn end_update(&mut self);

    fn is_collapsed(&self, _cell: &str) -> bool {
        false
    }

    fn set_size(&mut self, _cell: &str, _width: f64, _height: f64) {}
}

impl GraphAdapter for Graph {
    fn vertices(&self, scope: &str) -> Vec<String> {
        self.children(scope)
            .into_iter()
            .filter(|v| self.is_visible(v))
            .map(str::to_string)
            .collect()
    }

    fn connected_edges(&self, vertex: &str) -> Vec<ConnectedEdge> {
        self.connections(vertex)
            .into_iter()
            .map(|c| ConnectedEdge {
                id: c.edge,
                source: c.source,
                target: c.target,
                visible: c.visible,
            })
            .collect()
    }

    fn geometry(&self, vertex: &str) -> Option<Rect> {
        Graph::geometry(self, vertex)
    }

    fn set_geometry(&mut self, vertex: &str, x: f64, y: f64) {
        self.move_vertex(vertex, x, y);
    }

    fn set_edge_waypoints(&mut self, edge: &str, points: Vec<Point>) {
        self.set_edge_points(edge, points);
    }

    fn begin_update(&mut self) {
        Graph::begin_update(self);
    }

    fn end_update(&mut self) {
        Graph::end_update(self);
    }

    fn is_collapsed(&self, cell: &str) -> bool {
        Graph::is_collapsed(self, cell)
    }

    fn set_size(&mut self, cell: &str, width: f64, height: f64) {
        self.resize_vertex(cell, width, height);
    }
}
