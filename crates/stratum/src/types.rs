//! Layout configuration.
//!
//! Defaults follow the classic hierarchical layout: north orientation, 30/50/60/10 spacing,
//! ranks scanned from the sinks and tightened towards the sources.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Side of the drawing the roots are placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    North,
    South,
    East,
    West,
}

impl Orientation {
    /// Ranks advance horizontally.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Orientation::East | Orientation::West)
    }

    /// Rank 0 sits at the far end of the rank axis.
    pub fn is_mirrored(self) -> bool {
        matches!(self, Orientation::South | Orientation::East)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutOptions {
    pub orientation: Orientation,
    /// Gap between neighbouring entries of one rank.
    pub intra_cell_spacing: f64,
    /// Gap between two adjacent ranks.
    pub inter_rank_cell_spacing: f64,
    /// Gap between independent hierarchies laid out side by side.
    pub inter_hierarchy_spacing: f64,
    /// Distance between parallel edges routed through the same rank.
    pub parallel_edge_spacing: f64,
    pub layout_from_sinks: bool,
    pub tighten_to_source: bool,
    pub fine_tuning: bool,
    /// Keep the first root of each hierarchy where it was before the layout.
    pub fix_roots: bool,
    pub resize_parent: bool,
    pub move_parent: bool,
    pub parent_border: f64,
    pub max_crossing_iterations: usize,
    pub max_transpose_passes: usize,
    pub max_alignment_iterations: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            orientation: Orientation::North,
            intra_cell_spacing: 30.0,
            inter_rank_cell_spacing: 50.0,
            inter_hierarchy_spacing: 60.0,
            parallel_edge_spacing: 10.0,
            layout_from_sinks: true,
            tighten_to_source: true,
            fine_tuning: true,
            fix_roots: false,
            resize_parent: false,
            move_parent: false,
            parent_border: 0.0,
            max_crossing_iterations: 24,
            max_transpose_passes: 10,
            max_alignment_iterations: 8,
        }
    }
}

impl LayoutOptions {
    pub fn from_json(src: &str) -> Result<Self> {
        Ok(serde_json::from_str(src)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
