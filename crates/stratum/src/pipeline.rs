//! Layout driver: splits the scope into hierarchies, runs the stages on each one and writes
//! the result back.

use crate::adapter::GraphAdapter;
use crate::error::{Error, Result};
use crate::graphlib::Rect;
use crate::model::HierarchyModel;
use crate::order::cross_count;
use crate::report::{
    Diagnostic, EdgeRoute, HierarchySummary, LayoutReport, LayoutResult, ParentResize,
    VertexPlacement,
};
use crate::stage;
use crate::types::LayoutOptions;
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

#[derive(Debug, Clone, Default)]
pub struct HierarchicalLayout {
    options: LayoutOptions,
}

impl HierarchicalLayout {
    pub fn new(options: LayoutOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Computes the layout of `scope` (the vertices directly inside it) or, with explicit
    /// `roots`, of every hierarchy containing one of those roots, without touching the graph.
    ///
    /// Fails with [`Error::MissingInput`] if neither is given. Problems confined to one
    /// hierarchy are reported in [`LayoutResult::report`] and do not fail the call.
    pub fn compute<A: GraphAdapter + ?Sized>(
        &self,
        adapter: &A,
        scope: Option<&str>,
        roots: Option<&[String]>,
    ) -> Result<LayoutResult> {
        let explicit_roots: Option<&[String]> = roots.filter(|r| !r.is_empty());
        if scope.is_none() && explicit_roots.is_none() {
            return Err(Error::MissingInput);
        }

        let candidates: Option<HashSet<String>> =
            scope.map(|s| adapter.vertices(s).into_iter().collect());
        let seeds: Vec<String> = match (explicit_roots, scope) {
            (Some(r), _) => r.to_vec(),
            (None, Some(s)) => {
                let vertices = adapter.vertices(s);
                let mut seeds = find_roots(adapter, &vertices);
                seeds.extend(vertices);
                seeds
            }
            (None, None) => Vec::new(),
        };

        let hierarchies = partition(adapter, &seeds, candidates.as_ref());
        tracing::debug!(count = hierarchies.len(), "partitioned layout scope into hierarchies");

        let mut result = LayoutResult::default();
        let mut offset: f64 = 0.0;
        for members in hierarchies {
            let mut diagnostics: Vec<Diagnostic> = Vec::new();
            let roots: Vec<String> = match explicit_roots {
                Some(r) => r.iter().filter(|c| members.contains(c)).cloned().collect(),
                None => hierarchy_roots(adapter, &members, &mut diagnostics),
            };

            let model = match self.layout_hierarchy(adapter, &members, &roots, offset) {
                Ok(model) => model,
                Err(err) => {
                    tracing::warn!(error = %err, vertices = members.len(), "skipping hierarchy");
                    diagnostics.push(Diagnostic::HierarchySkipped {
                        reason: err.to_string(),
                    });
                    result.report.hierarchies.push(HierarchySummary {
                        vertices: members,
                        roots,
                        offset,
                        limit_x: offset,
                        max_rank: 0,
                        inverted_edges: 0,
                        crossings: 0,
                        diagnostics,
                    });
                    continue;
                }
            };

            diagnostics.extend(model.diagnostics.iter().cloned());
            let placements_from = result.vertices.len();
            let routes_from = result.edges.len();
            collect(&model, &mut result);

            if self.options.fix_roots {
                let anchor = model.roots.first().and_then(|r| {
                    let before = adapter.geometry(r)?;
                    let after = model.node_by_cell(r)?.bounds?;
                    Some((before.x - after.x, before.y - after.y))
                });
                if let Some((dx, dy)) = anchor {
                    translate(&mut result, placements_from, routes_from, dx, dy);
                }
            }

            result.report.hierarchies.push(HierarchySummary {
                vertices: members,
                roots: model.roots.clone(),
                offset,
                limit_x: model.limit_x,
                max_rank: model.max_rank,
                inverted_edges: model.edges().filter(|e| e.inverted).count(),
                crossings: cross_count(&model),
                diagnostics,
            });
            offset = model.limit_x + self.options.inter_hierarchy_spacing;
        }

        if self.options.resize_parent {
            if let Some(parent) = scope {
                result.parent = self.resize_parent(adapter, parent, &mut result);
            }
        }
        Ok(result)
    }

    /// Computes the layout and applies it inside a single `begin_update`/`end_update` pair.
    pub fn execute<A: GraphAdapter + ?Sized>(
        &self,
        adapter: &mut A,
        scope: Option<&str>,
        roots: Option<&[String]>,
    ) -> Result<LayoutReport> {
        let result = self.compute(adapter, scope, roots)?;

        adapter.begin_update();
        for placement in &result.vertices {
            adapter.set_geometry(&placement.cell, placement.bounds.x, placement.bounds.y);
        }
        for route in &result.edges {
            adapter.set_edge_waypoints(&route.edge, route.points.clone());
        }
        if let Some(parent) = &result.parent {
            adapter.set_geometry(&parent.cell, parent.bounds.x, parent.bounds.y);
            adapter.set_size(&parent.cell, parent.bounds.width, parent.bounds.height);
        }
        adapter.end_update();

        Ok(result.report)
    }

    fn layout_hierarchy<A: GraphAdapter + ?Sized>(
        &self,
        adapter: &A,
        members: &[String],
        roots: &[String],
        offset: f64,
    ) -> Result<HierarchyModel> {
        let mut model = HierarchyModel::build(adapter, members, roots)?;
        let stages = stage::stages(&self.options, offset);
        stage::run_all(&stages, &mut model)?;
        Ok(model)
    }

    /// Grows `parent` around the laid-out children plus `parent_border` and shifts the
    /// children so their box starts at the border. With `move_parent` the parent moves the
    /// other way, so the children keep their place on screen.
    fn resize_parent<A: GraphAdapter + ?Sized>(
        &self,
        adapter: &A,
        parent: &str,
        result: &mut LayoutResult,
    ) -> Option<ParentResize> {
        if adapter.is_collapsed(parent) {
            return None;
        }
        let current = adapter.geometry(parent)?;
        let bbox = result
            .vertices
            .iter()
            .map(|v| v.bounds)
            .reduce(|a, b| a.union(&b))?;

        let border = self.options.parent_border;
        let dx = border - bbox.x;
        let dy = border - bbox.y;
        translate(result, 0, 0, dx, dy);

        let (x, y) = if self.options.move_parent {
            (current.x - dx, current.y - dy)
        } else {
            (current.x, current.y)
        };
        Some(ParentResize {
            cell: parent.to_string(),
            bounds: Rect::new(x, y, bbox.width + 2.0 * border, bbox.height + 2.0 * border),
        })
    }
}

/// Vertices with no incoming and at least one outgoing edge, among `vertices`.
pub fn find_roots<A: GraphAdapter + ?Sized>(adapter: &A, vertices: &[String]) -> Vec<String> {
    let fans = fan_counts(adapter, vertices);
    vertices
        .iter()
        .filter(|v| matches!(fans.get(v.as_str()), Some(&(0, out)) if out > 0))
        .cloned()
        .collect()
}

fn hierarchy_roots<A: GraphAdapter + ?Sized>(
    adapter: &A,
    members: &[String],
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<String> {
    let roots = find_roots(adapter, members);
    if !roots.is_empty() {
        return roots;
    }

    let fans = fan_counts(adapter, members);
    let mut best: Option<(&String, i64)> = None;
    for v in members {
        let (fan_in, fan_out) = fans.get(v.as_str()).copied().unwrap_or((0, 0));
        let score = fan_out as i64 - fan_in as i64;
        if best.is_none_or(|(_, s)| score > s) {
            best = Some((v, score));
        }
    }
    let Some((root, _)) = best else {
        return Vec::new();
    };
    if members.len() > 1 {
        tracing::debug!(root = %root, "no source vertex; picked root by fan-out minus fan-in");
        diagnostics.push(Diagnostic::FallbackRoot { root: root.clone() });
    }
    vec![root.clone()]
}

/// `(fan_in, fan_out)` per vertex, over visible edges between two distinct members.
fn fan_counts<'a, A: GraphAdapter + ?Sized>(
    adapter: &A,
    vertices: &'a [String],
) -> HashMap<&'a str, (usize, usize)> {
    let members: HashSet<&str> = vertices.iter().map(String::as_str).collect();
    let mut fans: HashMap<&'a str, (usize, usize)> = HashMap::default();
    for v in vertices {
        let entry = fans.entry(v.as_str()).or_insert((0, 0));
        for conn in adapter.connected_edges(v) {
            if !conn.visible || conn.is_self_loop() {
                continue;
            }
            let Some(other) = conn.opposite(v) else {
                continue;
            };
            if !members.contains(other) {
                continue;
            }
            if conn.source == *v {
                entry.1 += 1;
            } else {
                entry.0 += 1;
            }
        }
    }
    fans
}

/// Splits the vertices connected to `seeds` into weakly-connected hierarchies, walking edges
/// in both directions. A walk that runs into a vertex claimed by another walk absorbs that
/// walk's hierarchy.
fn partition<A: GraphAdapter + ?Sized>(
    adapter: &A,
    seeds: &[String],
    candidates: Option<&HashSet<String>>,
) -> Vec<Vec<String>> {
    let allowed = |v: &str| candidates.is_none_or(|c| c.contains(v));

    let mut owner: HashMap<String, usize> = HashMap::default();
    let mut groups: Vec<Option<Vec<String>>> = Vec::new();

    for seed in seeds {
        if owner.contains_key(seed) || !allowed(seed.as_str()) {
            continue;
        }
        let id = groups.len();
        groups.push(Some(Vec::new()));

        let mut stack: Vec<String> = vec![seed.clone()];
        while let Some(v) = stack.pop() {
            match owner.get(&v).copied() {
                Some(o) if o == id => continue,
                Some(o) => {
                    let absorbed = groups[o].take().unwrap_or_default();
                    for cell in &absorbed {
                        owner.insert(cell.clone(), id);
                    }
                    if let Some(group) = groups[id].as_mut() {
                        group.extend(absorbed);
                    }
                    continue;
                }
                None => {}
            }
            owner.insert(v.clone(), id);
            if let Some(group) = groups[id].as_mut() {
                group.push(v.clone());
            }

            let mut next: Vec<String> = Vec::new();
            for conn in adapter.connected_edges(&v) {
                if !conn.visible || conn.is_self_loop() {
                    continue;
                }
                let Some(other) = conn.opposite(&v) else {
                    continue;
                };
                if allowed(other) && owner.get(other) != Some(&id) {
                    next.push(other.to_string());
                }
            }
            // Reversed so the first connection is walked first.
            stack.extend(next.into_iter().rev());
        }
    }

    groups.into_iter().flatten().collect()
}

fn collect(model: &HierarchyModel, result: &mut LayoutResult) {
    for node in model.nodes() {
        let Some(bounds) = node.bounds else {
            continue;
        };
        result.vertices.push(VertexPlacement {
            cell: node.cell.clone(),
            bounds,
            rank: node.rank.unwrap_or(0),
            order: node.order.unwrap_or(0),
        });
    }
    for edge in model.edges() {
        for real in &edge.edges {
            result.edges.push(EdgeRoute {
                edge: real.id.clone(),
                points: real.points.clone(),
            });
        }
    }
}

fn translate(result: &mut LayoutResult, vertices_from: usize, edges_from: usize, dx: f64, dy: f64) {
    for placement in &mut result.vertices[vertices_from..] {
        placement.bounds = placement.bounds.translate(dx, dy);
    }
    for route in &mut result.edges[edges_from..] {
        for p in &mut route.points {
            *p = p.translate(dx, dy);
        }
    }
}
