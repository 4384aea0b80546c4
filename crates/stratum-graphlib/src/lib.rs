#![forbid(unsafe_code)]

//! Graph container APIs used by `stratum`.
//!
//! A small compound diagram model: vertices with geometry nested under parent cells, edges
//! with waypoints, collapse/visibility flags, and nested update transactions.

pub mod geometry;
mod graph;

pub use geometry::{Point, Rect};
pub use graph::{Change, Connection, DEFAULT_ROOT, Graph, GraphError};
