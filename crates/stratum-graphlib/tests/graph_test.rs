use stratum_graphlib::{Change, Graph, GraphError, Point, Rect};

fn square() -> Rect {
    Rect::sized(40.0, 20.0)
}

#[test]
fn graph_children_are_listed_in_insertion_order() {
    let mut g = Graph::new();
    g.add_vertex("b", square()).unwrap();
    g.add_vertex("a", square()).unwrap();
    g.add_child_vertex("a", "a1", square()).unwrap();

    assert_eq!(g.children(g.root()), vec!["b", "a"]);
    assert_eq!(g.children("a"), vec!["a1"]);
    assert_eq!(g.parent("a1"), Some("a"));
    assert_eq!(g.descendants(g.root()), vec!["b", "a", "a1"]);
}

#[test]
fn graph_rejects_duplicate_ids_and_dangling_edges() {
    let mut g = Graph::new();
    g.add_vertex("a", square()).unwrap();
    assert_eq!(g.add_vertex("a", square()), Err(GraphError::DuplicateCell));
    assert_eq!(g.add_edge("e", "a", "zz"), Err(GraphError::UnknownTerminal));
    assert_eq!(
        g.add_child_vertex("nope", "c", square()),
        Err(GraphError::UnknownParent)
    );
}

#[test]
fn graph_connect_generates_unique_edge_ids() {
    let mut g = Graph::new();
    g.add_vertex("a", square()).unwrap();
    g.add_vertex("b", square()).unwrap();
    g.add_edge("e1", "a", "b").unwrap();
    let id = g.connect("b", "a").unwrap();
    assert_ne!(id, "e1");
    assert_eq!(g.edge_terminals(&id), Some(("b", "a")));
}

#[test]
fn graph_visible_terminal_resolves_to_collapsed_ancestor() {
    let mut g = Graph::new();
    g.add_vertex("group", square()).unwrap();
    g.add_child_vertex("group", "inner", square()).unwrap();
    g.add_vertex("other", square()).unwrap();
    g.add_edge("e", "inner", "other").unwrap();

    assert_eq!(g.visible_terminal("e", true), Some("inner"));
    g.set_collapsed("group", true);
    assert_eq!(g.visible_terminal("e", true), Some("group"));
    assert!(!g.is_visible("inner"));

    let conns = g.connections("group");
    assert_eq!(conns.len(), 1);
    assert_eq!(conns[0].source, "group");
    assert_eq!(conns[0].target, "other");
    assert!(g.connections("inner").is_empty());
}

#[test]
fn graph_connections_report_both_directions() {
    let mut g = Graph::new();
    for v in ["a", "b", "c"] {
        g.add_vertex(v, square()).unwrap();
    }
    g.add_edge("ab", "a", "b").unwrap();
    g.add_edge("ca", "c", "a").unwrap();
    g.add_edge("bc", "b", "c").unwrap();

    let ids: Vec<String> = g.connections("a").into_iter().map(|c| c.edge).collect();
    assert_eq!(ids, vec!["ab".to_string(), "ca".to_string()]);
}

#[test]
fn graph_hidden_edges_are_flagged() {
    let mut g = Graph::new();
    g.add_vertex("a", square()).unwrap();
    g.add_vertex("b", square()).unwrap();
    g.add_edge("ab", "a", "b").unwrap();
    g.set_visible("ab", false);
    let conns = g.connections("a");
    assert_eq!(conns.len(), 1);
    assert!(!conns[0].visible);
}

#[test]
fn graph_writes_inside_an_update_commit_as_one_batch() {
    let mut g = Graph::new();
    g.add_vertex("a", square()).unwrap();
    g.add_vertex("b", square()).unwrap();
    g.add_edge("ab", "a", "b").unwrap();

    g.begin_update();
    g.move_vertex("a", 10.0, 10.0);
    g.begin_update();
    g.move_vertex("b", 10.0, 100.0);
    g.end_update();
    assert!(g.history().is_empty());
    g.set_edge_points("ab", vec![Point::new(30.0, 50.0)]);
    g.end_update();

    assert_eq!(g.history().len(), 1);
    assert_eq!(g.history()[0].len(), 3);
    assert!(matches!(&g.history()[0][2], Change::Points { edge, .. } if edge == "ab"));
}

#[test]
fn graph_writes_outside_an_update_commit_individually() {
    let mut g = Graph::new();
    g.add_vertex("a", square()).unwrap();
    g.move_vertex("a", 5.0, 5.0);
    g.resize_vertex("a", 80.0, 20.0);
    // No-op writes are not recorded.
    g.resize_vertex("a", 80.0, 20.0);
    assert_eq!(g.history().len(), 2);
    assert_eq!(g.geometry("a"), Some(Rect::new(5.0, 5.0, 80.0, 20.0)));
}

#[test]
fn rect_union_covers_both_boxes() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let b = Rect::new(20.0, -5.0, 5.0, 5.0);
    assert_eq!(a.union(&b), Rect::new(0.0, -5.0, 25.0, 15.0));
    assert_eq!(a.include(Point::new(-3.0, 4.0)), Rect::new(-3.0, 0.0, 13.0, 10.0));
}
