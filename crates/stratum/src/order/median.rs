use crate::model::{HierarchyModel, RankEntry, Side};

/// One pass over the ranks: top-down (each rank sorted against the rank above it) when
/// `down`, bottom-up otherwise.
pub fn sweep(model: &mut HierarchyModel, down: bool) {
    let rank_count = model.ranks.len();
    if rank_count < 2 {
        return;
    }
    if down {
        for r in 1..rank_count {
            reorder_rank(model, r, Side::Up);
        }
    } else {
        for r in (0..rank_count - 1).rev() {
            reorder_rank(model, r, Side::Down);
        }
    }
}

fn reorder_rank(model: &mut HierarchyModel, r: usize, side: Side) {
    let keyed: Vec<(RankEntry, Option<f64>)> = model.ranks[r]
        .iter()
        .map(|&entry| (entry, weighted_median(model, entry, side)))
        .collect();

    // `sort_by` is stable, so equal medians keep their previous relative order.
    let mut movable: Vec<(f64, RankEntry)> = keyed
        .iter()
        .filter_map(|&(entry, median)| median.map(|m| (m, entry)))
        .collect();
    movable.sort_by(|a, b| a.0.total_cmp(&b.0));

    // Entries without a neighbour on `side` stay in their slot; the rest fill the remaining
    // slots in median order.
    let mut movable = movable.into_iter().map(|(_, entry)| entry);
    let reordered: Vec<RankEntry> = keyed
        .iter()
        .map(|&(entry, median)| match median {
            None => entry,
            Some(_) => movable.next().unwrap_or(entry),
        })
        .collect();

    for (i, &entry) in reordered.iter().enumerate() {
        model.set_entry_order(entry, i);
    }
    model.ranks[r] = reordered;
}

/// Weighted median of the orders of `entry`'s neighbours on `side`, or `None` if it has none.
///
/// With an even number of neighbours the two middle positions are interpolated, biased
/// towards the side where the neighbours are packed more tightly.
pub fn weighted_median(model: &HierarchyModel, entry: RankEntry, side: Side) -> Option<f64> {
    let mut positions: Vec<f64> = Vec::new();
    for (other, weight) in model.neighbors(entry, side) {
        let pos = model.entry_order(other) as f64;
        positions.extend(std::iter::repeat_n(pos, weight));
    }
    if positions.is_empty() {
        return None;
    }
    positions.sort_by(f64::total_cmp);

    let len = positions.len();
    let m = len / 2;
    if len % 2 == 1 {
        return Some(positions[m]);
    }
    if len == 2 {
        return Some((positions[0] + positions[1]) / 2.0);
    }
    let left = positions[m - 1] - positions[0];
    let right = positions[len - 1] - positions[m];
    if left + right == 0.0 {
        return Some((positions[m - 1] + positions[m]) / 2.0);
    }
    Some((positions[m - 1] * right + positions[m] * left) / (left + right))
}
