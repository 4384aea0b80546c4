use stratum::graphlib::{Graph, Rect};
use stratum::{Error, HierarchyModel};

fn graph(vertices: &[&str], edges: &[(&str, &str, &str)]) -> Graph {
    let mut g = Graph::new();
    for v in vertices {
        g.add_vertex(*v, Rect::sized(40.0, 20.0)).unwrap();
    }
    for (id, s, t) in edges {
        g.add_edge(*id, s, t).unwrap();
    }
    g
}

fn ids(vs: &[&str]) -> Vec<String> {
    vs.iter().map(|v| v.to_string()).collect()
}

#[test]
fn model_build_bundles_parallel_edges_in_majority_direction() {
    let g = graph(
        &["a", "b"],
        &[("e0", "a", "b"), ("e1", "a", "b"), ("e2", "b", "a")],
    );
    let m = HierarchyModel::build(&g, &ids(&["a", "b"]), &[]).unwrap();

    assert_eq!(m.edge_count(), 1);
    let e = m.edges().next().unwrap();
    assert_eq!(m.node(e.source).cell, "a");
    assert_eq!(m.node(e.target).cell, "b");
    let reversed: Vec<(&str, bool)> = e
        .edges
        .iter()
        .map(|r| (r.id.as_str(), r.reversed))
        .collect();
    assert_eq!(reversed, vec![("e0", false), ("e1", false), ("e2", true)]);
    assert_eq!(m.edge_for("e2"), m.edge_for("e0"));
}

#[test]
fn model_build_lets_the_majority_end_own_the_bundle() {
    let g = graph(
        &["a", "b"],
        &[("e0", "b", "a"), ("e1", "a", "b"), ("e2", "b", "a")],
    );
    let m = HierarchyModel::build(&g, &ids(&["a", "b"]), &[]).unwrap();

    assert_eq!(m.edge_count(), 1);
    let e = m.edges().next().unwrap();
    assert_eq!(m.node(e.source).cell, "b");
    assert_eq!(m.node(e.target).cell, "a");
    assert_eq!(e.edges.iter().filter(|r| r.reversed).count(), 1);
}

#[test]
fn model_build_drops_self_loops_and_edges_leaving_the_vertex_set() {
    let g = graph(
        &["a", "b", "c"],
        &[("loop", "a", "a"), ("ab", "a", "b"), ("bc", "b", "c")],
    );
    let m = HierarchyModel::build(&g, &ids(&["a", "b"]), &[]).unwrap();

    assert_eq!(m.node_count(), 2);
    assert_eq!(m.edge_count(), 1);
    assert!(m.edge_for("loop").is_none());
    assert!(m.edge_for("bc").is_none());
    let a = m.node_by_cell("a").unwrap();
    assert_eq!(a.connects_as_source.len(), 1);
    assert!(a.connects_as_target.is_empty());
}

#[test]
fn model_build_skips_hidden_edges() {
    let mut g = graph(&["a", "b"], &[("ab", "a", "b")]);
    g.set_visible("ab", false);
    let m = HierarchyModel::build(&g, &ids(&["a", "b"]), &[]).unwrap();
    assert_eq!(m.edge_count(), 0);
}

#[test]
fn model_build_routes_edges_of_collapsed_children_to_the_group() {
    let mut g = graph(&["group", "x"], &[]);
    g.add_child_vertex("group", "inner", Rect::sized(10.0, 10.0))
        .unwrap();
    g.add_edge("e", "inner", "x").unwrap();
    g.set_collapsed("group", true);

    let m = HierarchyModel::build(&g, &ids(&["group", "x"]), &[]).unwrap();
    assert_eq!(m.edge_count(), 1);
    let e = m.edges().next().unwrap();
    assert_eq!(m.node(e.source).cell, "group");
    assert_eq!(m.node(e.target).cell, "x");
}

#[test]
fn model_build_copies_vertex_sizes() {
    let mut g = Graph::new();
    g.add_vertex("wide", Rect::new(5.0, 5.0, 120.0, 16.0)).unwrap();
    let m = HierarchyModel::build(&g, &ids(&["wide"]), &ids(&["wide"])).unwrap();
    let n = m.node_by_cell("wide").unwrap();
    assert_eq!((n.width, n.height), (120.0, 16.0));
    assert_eq!(n.rank, None);
    assert_eq!(m.roots, ids(&["wide"]));
}

#[test]
fn model_build_fails_for_a_vertex_without_geometry() {
    let g = graph(&["a"], &[]);
    let err = HierarchyModel::build(&g, &ids(&["a", "ghost"]), &[]).unwrap_err();
    assert!(matches!(err, Error::MissingGeometry { vertex } if vertex == "ghost"));
}
