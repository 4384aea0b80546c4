#![forbid(unsafe_code)]

//! Layered (Sugiyama-style) hierarchical graph layout.
//!
//! The scope is split into weakly-connected hierarchies. Each one goes through cycle removal,
//! rank assignment, crossing reduction and coordinate assignment, and the hierarchies are
//! placed side by side. The graph is only read and written through [`GraphAdapter`], and all
//! writes of one layout happen inside a single update transaction.
//!
//! ```no_run
//! use stratum::graphlib::{Graph, Rect};
//! use stratum::{HierarchicalLayout, LayoutOptions};
//!
//! let mut g = Graph::new();
//! g.add_vertex("a", Rect::sized(80.0, 30.0)).unwrap();
//! g.add_vertex("b", Rect::sized(80.0, 30.0)).unwrap();
//! g.connect("a", "b").unwrap();
//!
//! let root = g.root().to_string();
//! let report = HierarchicalLayout::new(LayoutOptions::default())
//!     .execute(&mut g, Some(&root), None)
//!     .unwrap();
//! assert_eq!(report.hierarchies.len(), 1);
//! ```

pub use stratum_graphlib as graphlib;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod adapter;
pub mod cycle;
pub mod error;
pub mod model;
pub mod order;
pub mod pipeline;
pub mod position;
pub mod rank;
pub mod report;
pub mod stage;
pub mod types;

pub use adapter::{ConnectedEdge, GraphAdapter};
pub use error::{Error, Result};
pub use model::HierarchyModel;
pub use pipeline::HierarchicalLayout;
pub use report::{
    Diagnostic, EdgeRoute, HierarchySummary, LayoutReport, LayoutResult, ParentResize,
    VertexPlacement,
};
pub use stage::LayoutStage;
pub use types::{LayoutOptions, Orientation};
