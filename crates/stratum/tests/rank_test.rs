use stratum::graphlib::{Graph, Rect};
use stratum::model::RankEntry;
use stratum::{Diagnostic, HierarchyModel, cycle, rank};

fn model(edges: &[(&str, &str)], roots: &[&str]) -> HierarchyModel {
    let mut g = Graph::new();
    let mut vertices: Vec<String> = Vec::new();
    for (s, t) in edges {
        for v in [s, t] {
            if !g.is_vertex(v) {
                g.add_vertex(*v, Rect::sized(40.0, 20.0)).unwrap();
                vertices.push(v.to_string());
            }
        }
        g.connect(s, t).unwrap();
    }
    let roots: Vec<String> = roots.iter().map(|r| r.to_string()).collect();
    HierarchyModel::build(&g, &vertices, &roots).unwrap()
}

fn ranked(edges: &[(&str, &str)], roots: &[&str]) -> HierarchyModel {
    let mut m = model(edges, roots);
    cycle::run(&mut m);
    rank::initial_rank(&mut m, true, true);
    rank::fix_ranks(&mut m);
    m
}

fn rank_of(m: &HierarchyModel, cell: &str) -> i32 {
    m.node_by_cell(cell).and_then(|n| n.rank).unwrap()
}

fn tangled(seed: u64, nodes: usize, edges: usize) -> HierarchyModel {
    let mut g = Graph::new();
    let names: Vec<String> = (0..nodes).map(|i| format!("n{i}")).collect();
    for n in &names {
        g.add_vertex(n.clone(), Rect::sized(30.0, 30.0)).unwrap();
    }
    let mut state = seed;
    let mut next = || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 33) as usize
    };
    for _ in 0..edges {
        let s = next() % nodes;
        let t = next() % nodes;
        g.connect(&names[s], &names[t]).unwrap();
    }
    HierarchyModel::build(&g, &names, &[]).unwrap()
}

#[test]
fn rank_single_edge_puts_source_on_rank_zero() {
    let m = ranked(&[("v1", "v2")], &["v1"]);
    assert_eq!(rank_of(&m, "v1"), 0);
    assert_eq!(rank_of(&m, "v2"), 1);
    assert_eq!(m.max_rank, 1);
    assert!(m.diagnostics.is_empty());
}

#[test]
fn rank_long_edge_gets_one_segment_per_skipped_rank() {
    let m = ranked(&[("v1", "v3"), ("v1", "v2"), ("v2", "v3")], &["v1"]);
    assert_eq!(rank_of(&m, "v1"), 0);
    assert_eq!(rank_of(&m, "v2"), 1);
    assert_eq!(rank_of(&m, "v3"), 2);

    let direct = m.edge_for("e0").unwrap();
    let edge = m.edge(direct);
    assert_eq!((edge.min_rank, edge.max_rank), (Some(0), Some(2)));
    assert_eq!(edge.segments.len(), 1);
    assert_eq!(edge.segments[0].rank, 1);
    assert!(m.ranks[1].contains(&RankEntry::Segment {
        edge: direct,
        rank: 1
    }));
    assert_eq!(m.ranks[1].len(), 2);
}

#[test]
fn rank_three_cycle_has_a_single_top_vertex() {
    let m = ranked(&[("v1", "v2"), ("v2", "v3"), ("v3", "v1")], &["v1"]);
    let on_top = ["v1", "v2", "v3"]
        .iter()
        .filter(|v| rank_of(&m, v) == 0)
        .count();
    assert_eq!(on_top, 1);
}

#[test]
fn rank_tightening_pulls_sinks_towards_their_sources() {
    let edges = [("a", "b"), ("b", "c"), ("a", "d")];

    let mut loose = model(&edges, &["a"]);
    rank::initial_rank(&mut loose, true, false);
    assert_eq!(rank_of(&loose, "d"), 2);

    let tight = ranked(&edges, &["a"]);
    assert_eq!(rank_of(&tight, "d"), 1);
    assert_eq!(rank_of(&tight, "c"), 2);
}

#[test]
fn rank_from_sources_uses_longest_path_from_the_top() {
    let mut m = model(&[("a", "b"), ("b", "c"), ("a", "d")], &["a"]);
    cycle::run(&mut m);
    rank::initial_rank(&mut m, false, true);
    assert_eq!(rank_of(&m, "a"), 0);
    assert_eq!(rank_of(&m, "b"), 1);
    assert_eq!(rank_of(&m, "c"), 2);
    assert_eq!(rank_of(&m, "d"), 1);
}

#[test]
fn rank_edges_always_point_down_and_segments_fill_the_gap() {
    for seed in 1..=20u64 {
        for from_sinks in [true, false] {
            let mut m = tangled(seed, 25, 60);
            cycle::run(&mut m);
            rank::initial_rank(&mut m, from_sinks, true);
            rank::fix_ranks(&mut m);
            assert!(m.diagnostics.is_empty());

            for e in m.edges() {
                let s = m.node(e.source).rank.unwrap();
                let t = m.node(e.target).rank.unwrap();
                assert!(s < t, "seed {seed}: edge {s} -> {t}");
                assert_eq!(e.segments.len(), (t - s - 1) as usize);
            }
            assert_eq!(m.ranks.len(), m.max_rank as usize + 1);
            assert!(m.ranks.iter().all(|r| !r.is_empty()));
            let placed: usize = m
                .ranks
                .iter()
                .flatten()
                .filter(|e| matches!(e, RankEntry::Node(_)))
                .count();
            assert_eq!(placed, m.node_count());
        }
    }
}

#[test]
fn rank_orders_match_positions_in_rank_lists() {
    let m = ranked(&[("a", "b"), ("a", "c"), ("b", "d"), ("a", "d")], &["a"]);
    for rank in &m.ranks {
        for (i, &entry) in rank.iter().enumerate() {
            assert_eq!(m.entry_order(entry), i);
        }
    }
}

#[test]
fn rank_reports_vertices_it_cannot_resolve() {
    // b -> c -> d -> b is never broken, so b waits forever on d.
    let mut m = model(&[("a", "b"), ("b", "c"), ("c", "d"), ("d", "b")], &["a"]);
    rank::initial_rank(&mut m, true, true);
    rank::fix_ranks(&mut m);

    assert_eq!(
        m.diagnostics,
        vec![Diagnostic::RankingStalled {
            unresolved: vec!["b".to_string(), "c".to_string(), "d".to_string()],
        }]
    );
    for v in ["a", "b", "c", "d"] {
        assert_eq!(rank_of(&m, v), 0);
    }
    assert_eq!(m.ranks[0].len(), 4);
}
