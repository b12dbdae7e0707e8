use super::*;

fn genes(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

#[test]
fn induced_graph_keeps_isolated_vertices() {
    let edges = vec![
        InteractionEdge::new("G1", "G2"),
        InteractionEdge::new("G2", "G9"),
    ];
    let (graph, stats) = build_induced(&genes(&["G1", "G2", "G3"]), &edges, 0.4);
    assert_eq!(graph.n_vertices(), 3);
    assert_eq!(graph.n_edges(), 1);
    assert_eq!(graph.degree("G3"), Some(0));
    assert_eq!(graph.degree("G9"), None);
    assert_eq!(stats.outside_vertex_set, 1);
}

#[test]
fn self_loops_duplicates_and_low_scores_are_dropped() {
    let edges = vec![
        InteractionEdge::new("A", "A"),
        InteractionEdge::new("A", "B").with_score(0.9),
        InteractionEdge::new("B", "A"),
        InteractionEdge::new("B", "C").with_score(0.2),
        InteractionEdge::new("A", "C").with_score(0.4),
    ];
    let (graph, stats) = build_induced(&genes(&["A", "B", "C"]), &edges, 0.4);
    assert_eq!(
        stats,
        BuildStats {
            input_edges: 5,
            self_loops: 1,
            outside_vertex_set: 0,
            below_min_score: 1,
            duplicates: 1,
        }
    );
    assert_eq!(graph.edges(), vec![("A", "B"), ("A", "C")]);
    assert_eq!(graph.degree("A"), Some(2));
}

#[test]
fn adjacency_is_symmetric() {
    let mut graph = InteractionGraph::with_vertices(["x", "y", "z"]);
    assert!(graph.add_edge("z", "x"));
    assert!(!graph.add_edge("x", "z"));
    assert!(!graph.add_edge("x", "missing"));
    assert_eq!(graph.neighbors("x").collect::<Vec<_>>(), vec!["z"]);
    assert_eq!(graph.neighbors("z").collect::<Vec<_>>(), vec!["x"]);
    assert!(graph.contains("y"));
    assert_eq!(graph.vertices().collect::<Vec<_>>(), vec!["x", "y", "z"]);
}

#[test]
fn empty_gene_set_gives_empty_graph() {
    let (graph, stats) = build_induced(&[], &[InteractionEdge::new("A", "B")], 0.0);
    assert_eq!(graph.n_vertices(), 0);
    assert_eq!(graph.n_edges(), 0);
    assert_eq!(stats.outside_vertex_set, 1);
}
