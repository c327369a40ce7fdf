//! Integration tests for the complete cooccur pipeline
//!
//! MEDLINE text -> extraction -> co-occurrence graph -> metrics.
//!
//! Run with: cargo test --test integration_tests

use approx::assert_abs_diff_eq;
use cooccur_graph::{
    average_clustering, build_cooccurrence_graph, connected_components, diameter, BuildOptions,
    CategorySelection, CooccurrenceGraph, GraphError, GraphMetrics,
};
use cooccur_ingest_medline::{parse_medline, read_medline_file, MedlineExtraction};

fn medline(records: &[(&str, &[&str])]) -> String {
    records
        .iter()
        .map(|(pmid, mesh)| {
            let mut block = format!("PMID- {pmid}\nTI  - Title {pmid}\nAB  - Abstract {pmid}\n");
            for term in mesh.iter() {
                block.push_str(&format!("MH  - {term}\n"));
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn extract(records: &[(&str, &[&str])]) -> MedlineExtraction {
    parse_medline(&medline(records)).expect("parse")
}

fn graph_for(records: &[(&str, &[&str])], options: &BuildOptions) -> CooccurrenceGraph {
    build_cooccurrence_graph(&extract(records).corpus, options)
}

// ============================================================================
// Builder scenarios
// ============================================================================

#[test]
fn repeated_pairs_accumulate_weight() {
    let graph = graph_for(
        &[("1", &["X", "Y"]), ("2", &["X", "Y"]), ("3", &["X", "Z"])],
        &BuildOptions::new(),
    );

    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 2);
    assert_eq!(graph.weight("X", "Y"), Some(2));
    assert_eq!(graph.weight("Y", "X"), Some(2));
    assert_eq!(graph.weight("X", "Z"), Some(1));
    assert_eq!(connected_components(&graph).count(), 1);
}

#[test]
fn organism_tags_are_filtered_out() {
    let options = BuildOptions::new().exclude(["Humans", "Animals"]);
    let graph = graph_for(
        &[("1", &["Humans", "X", "Y"]), ("2", &["Animals", "X", "Z"])],
        &options,
    );

    assert!(!graph.contains_term("Humans"));
    assert!(!graph.contains_term("Animals"));
    assert_eq!(graph.weight("X", "Y"), Some(1));
    assert_eq!(graph.weight("X", "Z"), Some(1));
    assert_eq!(graph.edge_count(), 2);
}

#[test]
fn record_emptied_by_filtering_adds_nothing() {
    let options = BuildOptions::new().exclude(["Humans"]);
    let with = graph_for(&[("1", &["X", "Y"]), ("2", &["Humans"])], &options);
    let without = graph_for(&[("1", &["X", "Y"])], &options);

    assert_eq!(with.node_count(), without.node_count());
    assert_eq!(with.edge_count(), without.edge_count());
}

#[test]
fn disabled_categories_are_ignored() {
    let text = "PMID- 1\nTI  - t\nAB  - a\nMH  - X\nRN  - R\nOT  - k\n";
    let extraction = parse_medline(text).expect("parse");
    let only_mesh = BuildOptions::new().with_categories(CategorySelection {
        controlled_vocabulary: true,
        registry_numbers: false,
        other_terms: false,
    });

    let graph = build_cooccurrence_graph(&extraction.corpus, &only_mesh);
    assert!(graph.is_empty());

    let graph = build_cooccurrence_graph(&extraction.corpus, &BuildOptions::new());
    assert_eq!(graph.edge_count(), 3);
}

// ============================================================================
// Metrics scenarios
// ============================================================================

#[test]
fn disjoint_triangles_have_no_diameter() {
    let graph = graph_for(
        &[("1", &["A", "B", "C"]), ("2", &["D", "E", "F"])],
        &BuildOptions::new(),
    );

    assert_eq!(graph.node_count(), 6);
    assert_eq!(connected_components(&graph).count(), 2);
    assert_eq!(
        diameter(&graph),
        Err(GraphError::Disconnected { components: 2 })
    );
}

#[test]
fn four_cycle() {
    let graph = graph_for(
        &[
            ("1", &["A", "B"]),
            ("2", &["B", "C"]),
            ("3", &["C", "D"]),
            ("4", &["D", "A"]),
        ],
        &BuildOptions::new(),
    );

    let metrics = GraphMetrics::compute(&graph);
    assert_eq!(metrics.components.count(), 1);
    assert_eq!(metrics.diameter, Ok(2));
    assert_abs_diff_eq!(metrics.average_clustering, 0.0);
    assert_abs_diff_eq!(average_clustering(&graph), 0.0);
}

#[test]
fn pipeline_from_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("pubmed.txt");
    std::fs::write(
        &path,
        medline(&[
            ("1", &["Humans", "SON", "RNA Splicing"]),
            ("2", &["SON", "Cell Cycle"]),
            ("3", &["Cell Cycle", "Mitosis", "SON"]),
        ]),
    )
    .expect("write export");

    let extraction = read_medline_file(&path).expect("read export");
    let options = BuildOptions::new().exclude(["Humans"]);
    let graph = build_cooccurrence_graph(&extraction.corpus, &options);
    let metrics = GraphMetrics::compute(&graph);

    assert_eq!(extraction.corpus.len(), 3);
    assert_eq!(graph.weight("SON", "Cell Cycle"), Some(2));
    assert_eq!(metrics.node_count, 4);
    assert_eq!(metrics.edge_count, 4);
    assert_eq!(metrics.diameter, Ok(2));

    // SON: 3 neighbors, one linked pair -> 1/3; Cell Cycle and Mitosis: 1;
    // RNA Splicing: degree 1 -> 0.
    assert_abs_diff_eq!(
        metrics.average_clustering,
        (1.0 / 3.0 + 1.0 + 1.0 + 0.0) / 4.0,
        epsilon = 1e-12
    );

    let heaviest = graph.labeled_edges_by_weight()[0];
    assert_eq!((heaviest.a, heaviest.b, heaviest.weight), ("SON", "Cell Cycle", 2));
}
