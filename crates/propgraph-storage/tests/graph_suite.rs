//! End-to-end suite: ingest through the public API and the `.pgdf`
//! loader, then verify lookups, scans, traversal, metadata, and cursor
//! lifecycle against a real on-disk store.

use std::collections::BTreeSet;
use std::fs;

use tempfile::TempDir;

use propgraph_core::{Edge, Node};
use propgraph_storage::{GraphStore, IngestOptions, StoreError};

fn open_temp() -> (TempDir, GraphStore) {
    let tmp = TempDir::new().expect("create temp dir");
    let store = GraphStore::open(tmp.path().join("db")).expect("open store");
    (tmp, store)
}

/// Three `User` nodes and three labeled edges used by several tests.
fn seed_social_graph(store: &GraphStore) {
    for (id, name, country) in [
        ("user_101", "Ana", "Mexico"),
        ("user_102", "Bo", "USA"),
        ("user_103", "Ces", "Chile"),
    ] {
        store
            .insert_node(
                &Node::new(id, "User")
                    .with_prop("name", name)
                    .with_prop("country", country),
            )
            .expect("insert node");
    }

    store
        .insert_edge(&Edge::new("edge_50", "KNOWS", "user_101", "user_102", true))
        .expect("insert edge_50");
    store
        .insert_edge(&Edge::new(
            "edge_51",
            "WORKS_WITH",
            "user_103",
            "user_101",
            true,
        ))
        .expect("insert edge_51");
    store
        .insert_edge(&Edge::new("edge_52", "KNOWS", "user_102", "user_103", true))
        .expect("insert edge_52");
}

#[test]
fn point_lookup_roundtrip() {
    let (_tmp, store) = open_temp();
    seed_social_graph(&store);

    let node = store.get_node("user_101").unwrap().expect("node present");
    assert_eq!(node.label, "User");
    assert_eq!(node.props.get("name").map(String::as_str), Some("Ana"));
    assert_eq!(node.props.get("country").map(String::as_str), Some("Mexico"));

    assert!(store.get_node("missing").unwrap().is_none());
}

#[test]
fn property_scan_yields_exact_matches() {
    let (_tmp, store) = open_temp();
    seed_social_graph(&store);

    let ids: Vec<String> = store
        .iter_nodes_by_property("country", "Chile")
        .unwrap()
        .map(|r| r.unwrap().id)
        .collect();
    assert_eq!(ids, vec!["user_103"]);
}

#[test]
fn index_completeness_every_node_once() {
    let (_tmp, store) = open_temp();
    seed_social_graph(&store);

    for (id, country) in [
        ("user_101", "Mexico"),
        ("user_102", "USA"),
        ("user_103", "Chile"),
    ] {
        let hits: Vec<String> = store
            .iter_nodes_by_property("country", country)
            .unwrap()
            .map(|r| r.unwrap().id)
            .collect();
        assert_eq!(hits, vec![id.to_string()], "country={country}");
    }
}

#[test]
fn neighbours_directed_returns_outgoing_only() {
    let (_tmp, store) = open_temp();
    seed_social_graph(&store);

    let ids: Vec<String> = store
        .iter_neighbours("user_101")
        .unwrap()
        .map(|r| r.unwrap().id)
        .collect();
    // edge_51 points *at* user_101 and is directed, so it is not
    // indexed under user_101.
    assert_eq!(ids, vec!["edge_50"]);
}

#[test]
fn neighbours_undirected_visible_from_both_endpoints() {
    let (_tmp, store) = open_temp();
    store
        .insert_edge(&Edge::new("e_near", "NEAR", "a", "b", false))
        .unwrap();

    for endpoint in ["a", "b"] {
        let ids: Vec<String> = store
            .iter_neighbours(endpoint)
            .unwrap()
            .map(|r| r.unwrap().id)
            .collect();
        assert_eq!(ids, vec!["e_near"], "endpoint={endpoint}");
    }
}

#[test]
fn self_loop_yield_counts() {
    let (_tmp, store) = open_temp();
    store
        .insert_edge(&Edge::new("loop_d", "SELF", "n", "n", true))
        .unwrap();
    store
        .insert_edge(&Edge::new("loop_u", "SELF", "m", "m", false))
        .unwrap();

    // Directed self-loop: one adjacency row.
    let directed: Vec<String> = store
        .iter_neighbours("n")
        .unwrap()
        .map(|r| r.unwrap().id)
        .collect();
    assert_eq!(directed, vec!["loop_d"]);

    // Undirected self-loop: two adjacency rows, two yields.
    let undirected: Vec<String> = store
        .iter_neighbours("m")
        .unwrap()
        .map(|r| r.unwrap().id)
        .collect();
    assert_eq!(undirected, vec!["loop_u", "loop_u"]);
}

#[test]
fn label_scan_in_edge_id_order() {
    let (_tmp, store) = open_temp();
    seed_social_graph(&store);

    let ids: Vec<String> = store
        .iter_edges_by_label("KNOWS")
        .unwrap()
        .map(|r| r.unwrap().id)
        .collect();
    assert_eq!(ids, vec!["edge_50", "edge_52"]);
}

#[test]
fn metadata_counts_and_schema() {
    let (_tmp, store) = open_temp();
    seed_social_graph(&store);

    assert_eq!(store.count_nodes().unwrap(), 3);
    assert_eq!(store.count_edges().unwrap(), 3);

    let by_label = store.edge_count_by_label().unwrap();
    assert_eq!(by_label.get("KNOWS"), Some(&2));
    assert_eq!(by_label.get("WORKS_WITH"), Some(&1));
    assert_eq!(by_label.len(), 2);

    let schema = store.node_schema().unwrap();
    let expected: BTreeSet<String> = ["name", "country"].iter().map(|s| s.to_string()).collect();
    assert_eq!(schema.get("User"), Some(&expected));
}

#[test]
fn schema_is_union_across_entities_of_a_label() {
    let (_tmp, store) = open_temp();
    store
        .insert_node(&Node::new("p1", "Person").with_prop("name", "Ana"))
        .unwrap();
    store
        .insert_node(&Node::new("p2", "Person").with_prop("age", "30"))
        .unwrap();
    store.insert_node(&Node::new("p3", "Person")).unwrap();

    let schema = store.node_schema().unwrap();
    let expected: BTreeSet<String> = ["name", "age"].iter().map(|s| s.to_string()).collect();
    assert_eq!(schema.get("Person"), Some(&expected));
}

#[test]
fn counts_match_full_scans() {
    let (_tmp, store) = open_temp();
    seed_social_graph(&store);

    let scanned_nodes = store.iter_all_nodes().unwrap().count() as u64;
    let scanned_edges = store.iter_all_edges().unwrap().count() as u64;
    assert_eq!(store.count_nodes().unwrap(), scanned_nodes);
    assert_eq!(store.count_edges().unwrap(), scanned_edges);
}

#[test]
fn duplicate_id_rejected_atomically() {
    let (_tmp, store) = open_temp();
    seed_social_graph(&store);

    let dup = Node::new("user_101", "Admin").with_prop("role", "root");
    let err = store.insert_node(&dup).unwrap_err();
    assert!(matches!(err, StoreError::BadRecord(_)));

    // Nothing from the rejected batch is visible.
    assert_eq!(store.count_nodes().unwrap(), 3);
    let node = store.get_node("user_101").unwrap().unwrap();
    assert_eq!(node.label, "User");
    assert_eq!(
        store
            .iter_nodes_by_property("role", "root")
            .unwrap()
            .count(),
        0
    );
    let schema = store.node_schema().unwrap();
    assert!(!schema.contains_key("Admin"));
}

#[test]
fn cursor_release_on_drain_and_on_early_drop() {
    let (_tmp, store) = open_temp();
    seed_social_graph(&store);
    assert_eq!(store.open_cursor_count(), 0);

    // Full drain.
    {
        let cursor = store.iter_all_nodes().unwrap();
        assert_eq!(store.open_cursor_count(), 1);
        assert_eq!(cursor.count(), 3);
    }
    assert_eq!(store.open_cursor_count(), 0);

    // Early drop after one element.
    {
        let mut cursor = store.iter_all_edges().unwrap();
        assert_eq!(store.open_cursor_count(), 1);
        let first = cursor.next().unwrap().unwrap();
        assert_eq!(first.id, "edge_50");
    }
    assert_eq!(store.open_cursor_count(), 0);

    // Several cursors at once.
    {
        let a = store.iter_all_nodes().unwrap();
        let b = store.iter_neighbours("user_101").unwrap();
        assert_eq!(store.open_cursor_count(), 2);
        drop(a);
        assert_eq!(store.open_cursor_count(), 1);
        drop(b);
    }
    assert_eq!(store.open_cursor_count(), 0);
}

#[test]
fn data_survives_reopen() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("db");

    {
        let store = GraphStore::open(&path).unwrap();
        seed_social_graph(&store);
        store.flush().unwrap();
    }

    let store = GraphStore::open(&path).unwrap();
    assert_eq!(store.count_nodes().unwrap(), 3);
    assert_eq!(store.count_edges().unwrap(), 3);
    let node = store.get_node("user_103").unwrap().unwrap();
    assert_eq!(node.props.get("country").map(String::as_str), Some("Chile"));
}

// ---------------------------------------------------------------------
// .pgdf loading
// ---------------------------------------------------------------------

const NODES_PGDF: &str = "\
# users export
@id|@label|name|country
user_101|User|Ana|Mexico
user_102|User|Bo|USA
user_103|User|Ces|Chile
";

const EDGES_PGDF: &str = "\
@id|@label|@dir|@out|@in|since
edge_50|KNOWS|T|user_101|user_102|2019
edge_51|WORKS_WITH|T|user_103|user_101|
edge_52|KNOWS|T|user_102|user_103|2021
";

#[test]
fn load_pgdf_end_to_end() {
    let (tmp, store) = open_temp();

    let nodes_file = tmp.path().join("users.pgdf");
    let edges_file = tmp.path().join("edges.pgdf");
    fs::write(&nodes_file, NODES_PGDF).unwrap();
    fs::write(&edges_file, EDGES_PGDF).unwrap();

    let report = store
        .load_pgdf(&nodes_file, IngestOptions::default())
        .unwrap();
    assert_eq!((report.nodes, report.edges, report.skipped), (3, 0, 0));

    let report = store
        .load_pgdf(&edges_file, IngestOptions::default())
        .unwrap();
    assert_eq!((report.nodes, report.edges, report.skipped), (0, 3, 0));

    assert_eq!(store.count_nodes().unwrap(), 3);
    assert_eq!(store.count_edges().unwrap(), 3);

    // edge_51's empty `since` field is an empty-string property.
    let edge = store.get_edge("edge_51").unwrap().unwrap();
    assert_eq!(edge.props.get("since").map(String::as_str), Some(""));

    let neighbours: Vec<String> = store
        .iter_neighbours("user_101")
        .unwrap()
        .map(|r| r.unwrap().id)
        .collect();
    assert_eq!(neighbours, vec!["edge_50"]);
}

#[test]
fn lenient_load_skips_bad_records_and_continues() {
    let (tmp, store) = open_temp();

    let file = tmp.path().join("mixed.pgdf");
    fs::write(
        &file,
        "@id|@label|name\n\
         n1|Person|Ana\n\
         |Person|NoId\n\
         n1|Person|Duplicate\n\
         n2|Person|Bo\n",
    )
    .unwrap();

    let report = store.load_pgdf(&file, IngestOptions::default()).unwrap();
    assert_eq!((report.nodes, report.skipped), (2, 2));
    assert_eq!(store.count_nodes().unwrap(), 2);
    // The first n1 record won, the duplicate was skipped.
    let n1 = store.get_node("n1").unwrap().unwrap();
    assert_eq!(n1.props.get("name").map(String::as_str), Some("Ana"));
}

#[test]
fn strict_load_aborts_on_first_bad_record() {
    let (tmp, store) = open_temp();

    let file = tmp.path().join("strict.pgdf");
    fs::write(
        &file,
        "@id|@label|name\n\
         n1|Person|Ana\n\
         |Person|NoId\n\
         n2|Person|Bo\n",
    )
    .unwrap();

    let err = store
        .load_pgdf(&file, IngestOptions { strict: true })
        .unwrap_err();
    assert!(matches!(err, StoreError::BadRecord(_)));

    // Records committed before the failure remain.
    assert_eq!(store.count_nodes().unwrap(), 1);
    assert!(store.get_node("n2").unwrap().is_none());
}

#[test]
fn missing_pgdf_file_is_file_io() {
    let (tmp, store) = open_temp();
    let err = store
        .load_pgdf(tmp.path().join("absent.pgdf"), IngestOptions::default())
        .unwrap_err();
    assert!(matches!(err, StoreError::FileIo(_)));
}

#[test]
fn edge_property_scan() {
    let (_tmp, store) = open_temp();
    store
        .insert_edge(&Edge::new("e1", "KNOWS", "a", "b", true).with_prop("since", "2019"))
        .unwrap();
    store
        .insert_edge(&Edge::new("e2", "KNOWS", "b", "c", true).with_prop("since", "2021"))
        .unwrap();

    let ids: Vec<String> = store
        .iter_edges_by_property("since", "2019")
        .unwrap()
        .map(|r| r.unwrap().id)
        .collect();
    assert_eq!(ids, vec!["e1"]);

    let schema = store.edge_schema().unwrap();
    let expected: BTreeSet<String> = ["since"].iter().map(|s| s.to_string()).collect();
    assert_eq!(schema.get("KNOWS"), Some(&expected));
}

#[test]
fn endpoints_need_not_reference_existing_nodes() {
    let (_tmp, store) = open_temp();
    store
        .insert_edge(&Edge::new("e1", "KNOWS", "ghost_a", "ghost_b", true))
        .unwrap();
    assert_eq!(store.count_edges().unwrap(), 1);
    assert!(store.get_node("ghost_a").unwrap().is_none());

    let ids: Vec<String> = store
        .iter_neighbours("ghost_a")
        .unwrap()
        .map(|r| r.unwrap().id)
        .collect();
    assert_eq!(ids, vec!["e1"]);
}
