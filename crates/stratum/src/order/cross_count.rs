use crate::model::{HierarchyModel, RankEntry, Side};

/// Weighted crossings between all adjacent rank pairs, where a bundle of `n` real edges
/// counts `n` times.
pub fn cross_count(model: &HierarchyModel) -> usize {
    model
        .ranks
        .windows(2)
        .map(|pair| two_rank_cross_count(model, &pair[0], pair[1].len()))
        .sum()
}

// Accumulator tree over the southern positions (Barth, Jünger and Mutzel).
fn two_rank_cross_count(model: &HierarchyModel, north: &[RankEntry], south_len: usize) -> usize {
    if south_len == 0 {
        return 0;
    }

    let mut south_entries: Vec<(usize, usize)> = Vec::new();
    for &entry in north {
        let mut entries: Vec<(usize, usize)> = model
            .neighbors(entry, Side::Down)
            .into_iter()
            .map(|(other, weight)| (model.entry_order(other), weight))
            .filter(|&(pos, _)| pos < south_len)
            .collect();
        entries.sort_by_key(|&(pos, _)| pos);
        south_entries.extend(entries);
    }

    let mut first_index: usize = 1;
    while first_index < south_len {
        first_index <<= 1;
    }
    let tree_size = 2 * first_index - 1;
    first_index -= 1;
    let mut tree: Vec<usize> = vec![0; tree_size];

    let mut cc: usize = 0;
    for (pos, weight) in south_entries {
        let mut index = pos + first_index;
        tree[index] += weight;
        let mut weight_sum: usize = 0;
        while index > 0 {
            if index % 2 == 1 {
                weight_sum += tree[index + 1];
            }
            index = (index - 1) >> 1;
            tree[index] += weight;
        }
        cc += weight * weight_sum;
    }
    cc
}
