//! Coordinate assignment.
//!
//! Works in a layout space where `x` runs along the order axis and `y` along the rank axis,
//! with rank 0 at `y = 0`. Ranks become bands as tall as their tallest vertex, entries are
//! packed left to right and then pulled towards the median of their neighbours. At the end the
//! layout space is mapped onto graph coordinates for the configured orientation: East and West
//! swap the axes, South and East mirror the rank axis.

mod align;

pub use align::align;

use crate::error::Result;
use crate::graphlib::{Point, Rect};
use crate::model::{HierarchyModel, NodeIx, RankEntry};
use crate::stage::LayoutStage;
use crate::types::{LayoutOptions, Orientation};

#[derive(Debug, Clone)]
pub struct CoordinateAssigner {
    options: LayoutOptions,
    initial_x: f64,
}

impl CoordinateAssigner {
    pub fn new(options: LayoutOptions, initial_x: f64) -> Self {
        Self { options, initial_x }
    }
}

impl LayoutStage for CoordinateAssigner {
    fn name(&self) -> &'static str {
        "coordinate-assignment"
    }

    fn execute(&self, model: &mut HierarchyModel) -> Result<()> {
        assign(model, &self.options, self.initial_x);
        tracing::debug!(limit_x = model.limit_x, "coordinate assignment finished");
        Ok(())
    }
}

/// Extent of `entry` along the order axis.
pub(crate) fn entry_width(model: &HierarchyModel, entry: RankEntry, options: &LayoutOptions) -> f64 {
    match entry {
        RankEntry::Node(n) => {
            let node = model.node(n);
            if options.orientation.is_horizontal() {
                node.height
            } else {
                node.width
            }
        }
        RankEntry::Segment { edge, .. } => {
            let bundle = model.edge(edge).edges.len().max(1);
            (bundle - 1) as f64 * options.parallel_edge_spacing
        }
    }
}

fn entry_depth(model: &HierarchyModel, entry: RankEntry, orientation: Orientation) -> f64 {
    match entry {
        RankEntry::Node(n) => {
            let node = model.node(n);
            if orientation.is_horizontal() {
                node.width
            } else {
                node.height
            }
        }
        RankEntry::Segment { .. } => 0.0,
    }
}

pub(crate) fn entry_x(model: &HierarchyModel, entry: RankEntry) -> f64 {
    match entry {
        RankEntry::Node(n) => model.node(n).x,
        RankEntry::Segment { edge, rank } => model.edge(edge).segment(rank).map_or(0.0, |s| s.x),
    }
}

pub(crate) fn set_entry_x(model: &mut HierarchyModel, entry: RankEntry, x: f64) {
    match entry {
        RankEntry::Node(n) => model.node_mut(n).x = x,
        RankEntry::Segment { edge, rank } => {
            if let Some(s) = model.edge_mut(edge).segment_mut(rank) {
                s.x = x;
            }
        }
    }
}

fn set_entry_y(model: &mut HierarchyModel, entry: RankEntry, y: f64) {
    match entry {
        RankEntry::Node(n) => model.node_mut(n).y = y,
        RankEntry::Segment { edge, rank } => {
            if let Some(s) = model.edge_mut(edge).segment_mut(rank) {
                s.y = y;
            }
        }
    }
}

/// Places every entry, sets `limit_x`, and writes vertex bounds and edge waypoints in graph
/// coordinates. The hierarchy's left edge along the order axis lands on `initial_x`.
pub fn assign(model: &mut HierarchyModel, options: &LayoutOptions, initial_x: f64) {
    let rank_extent = place_ranks(model, options.orientation, options.inter_rank_cell_spacing);
    initial_coords(model, options);
    align(model, options);

    let mut min_left = f64::INFINITY;
    for rank in &model.ranks {
        for &entry in rank {
            min_left = min_left.min(entry_x(model, entry) - entry_width(model, entry, options) / 2.0);
        }
    }
    if !min_left.is_finite() {
        model.limit_x = initial_x;
        return;
    }

    let dx = initial_x - min_left;
    let mut limit_x = initial_x;
    let ranks = std::mem::take(&mut model.ranks);
    for rank in &ranks {
        for &entry in rank {
            let x = entry_x(model, entry) + dx;
            set_entry_x(model, entry, x);
            limit_x = limit_x.max(x + entry_width(model, entry, options) / 2.0);
        }
    }
    model.ranks = ranks;
    model.limit_x = limit_x;

    write_bounds(model, options.orientation, rank_extent);
    write_waypoints(model, options, rank_extent);
}

/// Sets `y` of every entry to the centre of its rank band; returns the total extent of the
/// rank axis.
fn place_ranks(model: &mut HierarchyModel, orientation: Orientation, gap: f64) -> f64 {
    let mut top: f64 = 0.0;
    let ranks = std::mem::take(&mut model.ranks);
    for (r, rank) in ranks.iter().enumerate() {
        let depth = rank
            .iter()
            .map(|&e| entry_depth(model, e, orientation))
            .fold(0.0, f64::max);
        let centre = top + depth / 2.0;
        for &entry in rank {
            set_entry_y(model, entry, centre);
        }
        top += depth;
        if r + 1 < ranks.len() {
            top += gap;
        }
    }
    model.ranks = ranks;
    top
}

/// Packs each rank left to right with `intra_cell_spacing` gaps, centred on the widest rank.
fn initial_coords(model: &mut HierarchyModel, options: &LayoutOptions) {
    let spacing = options.intra_cell_spacing;
    let ranks = std::mem::take(&mut model.ranks);
    let widths: Vec<f64> = ranks
        .iter()
        .map(|rank| {
            let sum: f64 = rank.iter().map(|&e| entry_width(model, e, options)).sum();
            sum + spacing * rank.len().saturating_sub(1) as f64
        })
        .collect();
    let widest = widths.iter().copied().fold(0.0, f64::max);

    for (rank, width) in ranks.iter().zip(&widths) {
        let mut cursor = (widest - width) / 2.0;
        for &entry in rank {
            let w = entry_width(model, entry, options);
            set_entry_x(model, entry, cursor + w / 2.0);
            cursor += w + spacing;
        }
    }
    model.ranks = ranks;
}

// Layout space to graph coordinates.
fn to_graph(orientation: Orientation, rank_extent: f64, x: f64, y: f64) -> Point {
    let y = if orientation.is_mirrored() {
        rank_extent - y
    } else {
        y
    };
    if orientation.is_horizontal() {
        Point::new(y, x)
    } else {
        Point::new(x, y)
    }
}

fn write_bounds(model: &mut HierarchyModel, orientation: Orientation, rank_extent: f64) {
    for ix in model.node_ixs() {
        let node = model.node(ix);
        let centre = to_graph(orientation, rank_extent, node.x, node.y);
        let bounds = Rect::new(
            centre.x - node.width / 2.0,
            centre.y - node.height / 2.0,
            node.width,
            node.height,
        );
        model.node_mut(ix).bounds = Some(bounds);
    }
}

/// One waypoint per intermediate rank. Real edges of a bundle are spread
/// `parallel_edge_spacing` apart around the segment centre, and listed from their real
/// source to their real target. A bundle spanning a single rank has no segments, so each of
/// its edges gets two points instead: one just below the source and one just above the
/// target, both at the edge's offset.
fn write_waypoints(model: &mut HierarchyModel, options: &LayoutOptions, rank_extent: f64) {
    let spacing = options.parallel_edge_spacing;
    let orientation = options.orientation;
    for e in model.edge_ixs() {
        let edge = model.edge(e);
        let bundle = edge.edges.len();
        let short_ends = if bundle > 1 && edge.segments.is_empty() {
            bundle_ends(model, edge.source, edge.target, orientation)
        } else {
            None
        };

        let edge = model.edge_mut(e);
        let inverted = edge.inverted;
        let segments = edge.segments.clone();
        for (i, real) in edge.edges.iter_mut().enumerate() {
            let offset = (i as f64 - (bundle as f64 - 1.0) / 2.0) * spacing;
            let mut points: Vec<Point> = match short_ends {
                Some(((sx, sy), (tx, ty))) => vec![
                    to_graph(orientation, rank_extent, sx + offset, sy),
                    to_graph(orientation, rank_extent, tx + offset, ty),
                ],
                None => segments
                    .iter()
                    .map(|s| to_graph(orientation, rank_extent, s.x + offset, s.y))
                    .collect(),
            };
            if real.reversed != inverted {
                points.reverse();
            }
            real.points = points;
        }
    }
}

/// Layout-space anchors for a segmentless bundle: a quarter of the way into the gap below
/// `source` and a quarter of the way up from `target`. `None` unless `target` sits on a
/// later rank.
fn bundle_ends(
    model: &HierarchyModel,
    source: NodeIx,
    target: NodeIx,
    orientation: Orientation,
) -> Option<((f64, f64), (f64, f64))> {
    let (s, t) = (model.node(source), model.node(target));
    if s.rank? >= t.rank? {
        return None;
    }
    let below = s.y + entry_depth(model, RankEntry::Node(source), orientation) / 2.0;
    let above = t.y - entry_depth(model, RankEntry::Node(target), orientation) / 2.0;
    let quarter = (above - below) / 4.0;
    Some(((s.x, below + quarter), (t.x, above - quarter)))
}
