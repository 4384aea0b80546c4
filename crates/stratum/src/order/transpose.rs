use crate::model::{HierarchyModel, RankEntry, Side};

/// Swaps neighbouring entries while a swap strictly lowers the crossings against both
/// adjacent ranks. Stops after a pass without swaps or after `max_passes` passes.
pub fn transpose(model: &mut HierarchyModel, max_passes: usize) {
    for _ in 0..max_passes {
        let mut improved = false;
        for r in 0..model.ranks.len() {
            for i in 1..model.ranks[r].len() {
                let left = model.ranks[r][i - 1];
                let right = model.ranks[r][i];
                let (kept, swapped) = pair_crossings(model, left, right);
                if swapped < kept {
                    model.ranks[r].swap(i - 1, i);
                    model.set_entry_order(right, i - 1);
                    model.set_entry_order(left, i);
                    improved = true;
                }
            }
        }
        if !improved {
            break;
        }
    }
}

/// Crossings among the edges of `left` and `right` with `left` placed first, and with the
/// two swapped.
fn pair_crossings(model: &HierarchyModel, left: RankEntry, right: RankEntry) -> (usize, usize) {
    let mut kept = 0usize;
    let mut swapped = 0usize;
    for side in [Side::Up, Side::Down] {
        let ln = model.neighbors(left, side);
        let rn = model.neighbors(right, side);
        for &(a, wa) in &ln {
            let pa = model.entry_order(a);
            for &(b, wb) in &rn {
                let pb = model.entry_order(b);
                if pa > pb {
                    kept += wa * wb;
                } else if pb > pa {
                    swapped += wa * wb;
                }
            }
        }
    }
    (kept, swapped)
}
