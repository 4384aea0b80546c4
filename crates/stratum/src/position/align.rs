use super::{entry_width, entry_x, set_entry_x};
use crate::model::{HierarchyModel, RankEntry, Side};
use crate::types::LayoutOptions;

const EPSILON: f64 = 1e-6;

/// Median alignment passes, alternating against the rank above and the rank below.
///
/// Segments move first so long edges straighten before the vertices around them settle. Every
/// move is clamped against the current position of the entry's left and right neighbours, so
/// the rank order and the `intra_cell_spacing` gaps are preserved. With `fine_tuning` a few
/// more passes look at both adjacent ranks at once. Finally, long edges whose segments can all
/// share one coordinate are straightened.
pub fn align(model: &mut HierarchyModel, options: &LayoutOptions) {
    let mut quiet = 0usize;
    for i in 0..options.max_alignment_iterations {
        let sides: &[Side] = if i % 2 == 0 { &[Side::Up] } else { &[Side::Down] };
        if align_pass(model, options, sides) {
            quiet = 0;
        } else {
            quiet += 1;
            if quiet >= 2 {
                break;
            }
        }
    }

    if options.fine_tuning {
        let extra = (options.max_alignment_iterations / 2).max(1);
        for _ in 0..extra {
            if !align_pass(model, options, &[Side::Up, Side::Down]) {
                break;
            }
        }
    }
    straighten(model, options);
}

/// Moves every segment of a long edge onto one shared coordinate when each of them can reach
/// it without crossing its rank neighbours. Chains that cannot all meet are left alone.
fn straighten(model: &mut HierarchyModel, options: &LayoutOptions) {
    for e in model.edge_ixs() {
        let chain: Vec<RankEntry> = model
            .edge(e)
            .segments
            .iter()
            .map(|s| RankEntry::Segment { edge: e, rank: s.rank })
            .collect();
        if chain.len() < 2 {
            continue;
        }

        let mut lo = f64::NEG_INFINITY;
        let mut hi = f64::INFINITY;
        let mut xs: Vec<f64> = Vec::with_capacity(chain.len());
        for &entry in &chain {
            let Some((l, h)) = slack(model, entry, options) else {
                break;
            };
            lo = lo.max(l);
            hi = hi.min(h);
            xs.push(entry_x(model, entry));
        }
        if xs.len() < chain.len() || lo > hi + EPSILON {
            continue;
        }

        xs.sort_by(f64::total_cmp);
        let x = xs[xs.len() / 2].max(lo).min(hi);
        for &entry in &chain {
            set_entry_x(model, entry, x);
        }
    }
}

/// Range `entry` may move in without breaking the gaps to its rank neighbours.
fn slack(model: &HierarchyModel, entry: RankEntry, options: &LayoutOptions) -> Option<(f64, f64)> {
    let r = usize::try_from(model.entry_rank(entry)?).ok()?;
    let row = model.ranks.get(r)?;
    let i = row.iter().position(|&other| other == entry)?;
    let w = entry_width(model, entry, options);
    let gap = options.intra_cell_spacing;

    let lo = match i.checked_sub(1) {
        Some(l) => {
            let left = row[l];
            entry_x(model, left) + (entry_width(model, left, options) + w) / 2.0 + gap
        }
        None => f64::NEG_INFINITY,
    };
    let hi = match row.get(i + 1) {
        Some(&right) => entry_x(model, right) - (entry_width(model, right, options) + w) / 2.0 - gap,
        None => f64::INFINITY,
    };
    Some((lo, hi))
}

fn align_pass(model: &mut HierarchyModel, options: &LayoutOptions, sides: &[Side]) -> bool {
    let rank_count = model.ranks.len();
    let rank_seq: Vec<usize> = if matches!(sides, [Side::Down]) {
        (0..rank_count).rev().collect()
    } else {
        (0..rank_count).collect()
    };

    let mut moved = false;
    for r in rank_seq {
        let entries = model.ranks[r].clone();
        let widths: Vec<f64> = entries
            .iter()
            .map(|&e| entry_width(model, e, options))
            .collect();

        let mut by_priority: Vec<usize> = (0..entries.len()).collect();
        by_priority.sort_by_key(|&i| std::cmp::Reverse(priority(model, entries[i])));

        for i in by_priority {
            let Some(target) = neighbour_median(model, entries[i], sides) else {
                continue;
            };
            let lo = match i.checked_sub(1) {
                Some(l) => {
                    entry_x(model, entries[l]) + (widths[l] + widths[i]) / 2.0 + options.intra_cell_spacing
                }
                None => f64::NEG_INFINITY,
            };
            let hi = match entries.get(i + 1) {
                Some(&right) => {
                    entry_x(model, right) - (widths[i + 1] + widths[i]) / 2.0 - options.intra_cell_spacing
                }
                None => f64::INFINITY,
            };
            let current = entry_x(model, entries[i]);
            let next = target.max(lo).min(hi);
            if (next - current).abs() > EPSILON {
                set_entry_x(model, entries[i], next);
                moved = true;
            }
        }
    }
    moved
}

fn priority(model: &HierarchyModel, entry: RankEntry) -> usize {
    match entry {
        RankEntry::Segment { .. } => usize::MAX,
        RankEntry::Node(_) => {
            model.neighbors(entry, Side::Up).len() + model.neighbors(entry, Side::Down).len()
        }
    }
}

fn neighbour_median(model: &HierarchyModel, entry: RankEntry, sides: &[Side]) -> Option<f64> {
    let mut xs: Vec<f64> = Vec::new();
    for &side in sides {
        for (other, weight) in model.neighbors(entry, side) {
            xs.extend(std::iter::repeat_n(entry_x(model, other), weight));
        }
    }
    if xs.is_empty() {
        return None;
    }
    xs.sort_by(f64::total_cmp);
    let m = xs.len() / 2;
    if xs.len() % 2 == 1 {
        Some(xs[m])
    } else {
        Some((xs[m - 1] + xs[m]) / 2.0)
    }
}
