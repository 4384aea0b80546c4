//! Construction of a [`HierarchyModel`] from the adapter.

use super::{EdgeIx, HierarchyEdge, HierarchyModel, HierarchyNode, NodeIx, RealEdge};
use crate::adapter::{ConnectedEdge, GraphAdapter};
use crate::error::{Error, Result};
use rustc_hash::FxHashMap as HashMap;

impl HierarchyModel {
    /// Builds the model for `vertices`.
    ///
    /// Edges leaving the vertex set, invisible edges and self-loops are dropped. All edges
    /// between the same unordered pair of vertices become one hierarchy edge pointing in the
    /// majority direction: `a -> b` is kept when at least half of the edges between `a` and
    /// `b` run from `a` to `b`. Minority edges are folded into it and only remembered as
    /// `reversed`; their own direction no longer influences ranking.
    pub fn build<A: GraphAdapter + ?Sized>(
        adapter: &A,
        vertices: &[String],
        roots: &[String],
    ) -> Result<Self> {
        let mut model = HierarchyModel {
            roots: roots.to_vec(),
            ..Default::default()
        };

        for cell in vertices {
            if model.vertex_index.contains_key(cell) {
                continue;
            }
            let geo = adapter
                .geometry(cell)
                .ok_or_else(|| Error::MissingGeometry {
                    vertex: cell.clone(),
                })?;
            let ix = NodeIx(model.nodes.len());
            model
                .nodes
                .push(HierarchyNode::new(cell.clone(), geo.width, geo.height));
            model.vertex_index.insert(cell.clone(), ix);
        }

        for v_ix in model.node_ixs() {
            let cell = model.node(v_ix).cell.clone();
            let conns = adapter.connected_edges(&cell);

            // Opposite vertices in first-seen order, each with the edges shared with `cell`.
            let mut opposites: Vec<(NodeIx, Vec<&ConnectedEdge>)> = Vec::new();
            let mut slot: HashMap<NodeIx, usize> = HashMap::default();
            for conn in &conns {
                if !conn.visible || conn.is_self_loop() {
                    continue;
                }
                let Some(other) = conn.opposite(&cell) else {
                    continue;
                };
                let Some(w_ix) = model.node_ix(other) else {
                    continue;
                };
                match slot.get(&w_ix) {
                    Some(&i) => opposites[i].1.push(conn),
                    None => {
                        slot.insert(w_ix, opposites.len());
                        opposites.push((w_ix, vec![conn]));
                    }
                }
            }

            for (w_ix, between) in opposites {
                if model.edge_index.contains_key(&between[0].id) {
                    // Already bundled from the other end.
                    continue;
                }
                let directed = between.iter().filter(|c| c.source == cell).count();
                if directed * 2 < between.len() {
                    continue;
                }
                if directed < between.len() {
                    tracing::debug!(
                        source = %cell,
                        target = %model.node(w_ix).cell,
                        folded = between.len() - directed,
                        "folding minority-direction edges into majority edge"
                    );
                }

                let e_ix = EdgeIx(model.edges.len());
                let edges: Vec<RealEdge> = between
                    .iter()
                    .map(|c| RealEdge::new(c.id.clone(), c.source != cell))
                    .collect();
                for real in &edges {
                    model.edge_index.insert(real.id.clone(), e_ix);
                }
                model.edges.push(HierarchyEdge {
                    source: v_ix,
                    target: w_ix,
                    edges,
                    inverted: false,
                    min_rank: None,
                    max_rank: None,
                    segments: Vec::new(),
                });
                model.node_mut(v_ix).connects_as_source.push(e_ix);
                model.node_mut(w_ix).connects_as_target.push(e_ix);
            }
        }

        tracing::debug!(
            nodes = model.nodes.len(),
            edges = model.edges.len(),
            "built hierarchy model"
        );
        Ok(model)
    }
}
