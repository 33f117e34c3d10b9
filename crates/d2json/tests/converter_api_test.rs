//! Integration tests for the Converter API

use d2json::{
    Converter, D2JsonError,
    config::{AppConfig, LayoutConfig, LayoutEngine, OutputConfig},
    output::{OutputDiagram, OutputNode},
};

const STACK: &str = r#"
client_browser: Browser
network_cdn: CDN
api_server: "API Server"
db_primary: Primary DB
db_replica

client_browser -> network_cdn -> api_server: HTTPS
api_server -> db_primary: SQL
db_primary -> db_replica: replication
"#;

fn fallback_only() -> Converter {
    let config = AppConfig::new(
        LayoutConfig::new(LayoutEngine::None, 50.0, 80.0),
        OutputConfig::new(false),
    );
    Converter::new(config)
}

fn node<'a>(diagram: &'a OutputDiagram, id: &str) -> &'a OutputNode {
    diagram
        .nodes
        .iter()
        .find(|n| n.id == id)
        .unwrap_or_else(|| panic!("node {id} should be present"))
}

#[test]
fn test_fallback_places_nodes_in_tiers() {
    let diagram = fallback_only()
        .convert_source(STACK)
        .expect("source should convert");

    let ids: Vec<&str> = diagram.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(
        ids,
        [
            "client_browser",
            "network_cdn",
            "api_server",
            "db_primary",
            "db_replica"
        ]
    );

    let browser = node(&diagram, "client_browser");
    assert_eq!((browser.x, browser.y), (50.0, 150.0));
    assert_eq!(browser.label, "Browser");
    assert_eq!((browser.width, browser.height), (120.0, 50.0));

    let cdn = node(&diagram, "network_cdn");
    assert_eq!((cdn.x, cdn.y), (300.0, 250.0));

    let api = node(&diagram, "api_server");
    assert_eq!((api.x, api.y), (550.0, 350.0));

    let primary = node(&diagram, "db_primary");
    let replica = node(&diagram, "db_replica");
    assert_eq!((primary.x, primary.y), (950.0, 450.0));
    assert_eq!((replica.x, replica.y), (1090.0, 450.0));
    assert_eq!(replica.label, "db_replica");
}

#[test]
fn test_edges_follow_declaration_order() {
    let diagram = fallback_only()
        .convert_source(STACK)
        .expect("source should convert");

    let edges: Vec<(&str, &str, &str)> = diagram
        .edges
        .iter()
        .map(|e| (e.source.as_str(), e.target.as_str(), e.label.as_str()))
        .collect();
    assert_eq!(
        edges,
        [
            ("client_browser", "network_cdn", "HTTPS"),
            ("network_cdn", "api_server", "HTTPS"),
            ("api_server", "db_primary", "SQL"),
            ("db_primary", "db_replica", "replication"),
        ]
    );
}

#[test]
fn test_declared_geometry_wins_over_fallback() {
    let source = r#"
db_main: Main {
  width: 80
  top: 40
  left: 10
}
"#;
    let diagram = fallback_only()
        .convert_source(source)
        .expect("source should convert");

    let db = node(&diagram, "db_main");
    assert_eq!((db.x, db.y), (10.0, 40.0));
    assert_eq!((db.width, db.height), (80.0, 50.0));
}

#[test]
fn test_explicit_origin_is_replaced_by_fallback() {
    // A declared (0, 0) is indistinguishable from no position at all.
    let diagram = fallback_only()
        .convert_source("db_main.top: 0\ndb_main.left: 0")
        .expect("source should convert");

    let db = node(&diagram, "db_main");
    assert_eq!((db.x, db.y), (950.0, 450.0));
}

#[test]
fn test_nested_object_is_labelled_with_its_key() {
    let diagram = fallback_only()
        .convert_source("cloud {\n  api_server\n}")
        .expect("source should convert");

    let api = node(&diagram, "cloud.api_server");
    assert_eq!(api.label, "api_server");
    assert_eq!(api.width, 120.0);
    assert_eq!(node(&diagram, "cloud").label, "cloud");
}

#[test]
fn test_sugiyama_positions_connected_nodes() {
    let converter = Converter::default();
    let source = "client_web -> api_gateway\napi_gateway -> orders_db\nwidget";
    let diagram = converter
        .convert_source(source)
        .expect("source should convert");

    assert_eq!(diagram.nodes.len(), 4);
    for n in &diagram.nodes {
        assert!(n.width >= 120.0 && n.width <= 200.0, "{} width", n.id);
        assert_eq!(n.height, 50.0);
        assert!(n.x >= 0.0 && n.y >= 0.0, "{} is in positive space", n.id);
    }

    let web = node(&diagram, "client_web");
    let api = node(&diagram, "api_gateway");
    let db = node(&diagram, "orders_db");
    assert!(web.y < api.y && api.y < db.y, "ranks run top to bottom");

    // Not connected to anything, so only the fallback places it.
    let widget = node(&diagram, "widget");
    assert_eq!((widget.x, widget.y), (550.0, 350.0));
}

#[test]
fn test_sugiyama_respects_direction() {
    let source = "direction: right\nsource_node -> sink_node";
    let diagram = Converter::default()
        .convert_source(source)
        .expect("source should convert");

    let source_node = node(&diagram, "source_node");
    let sink_node = node(&diagram, "sink_node");
    assert!(source_node.x < sink_node.x);
}

#[test]
fn test_layout_engines_agree_on_sizes() {
    let with_engine = Converter::default()
        .convert_source(STACK)
        .expect("source should convert");
    let without_engine = fallback_only()
        .convert_source(STACK)
        .expect("source should convert");

    let sizes = |diagram: &OutputDiagram| -> Vec<(f32, f32)> {
        diagram.nodes.iter().map(|n| (n.width, n.height)).collect()
    };
    assert_eq!(sizes(&with_engine), sizes(&without_engine));
}

#[test]
fn test_fallback_is_deterministic() {
    let converter = fallback_only();
    let first = converter.convert_source(STACK).expect("converts");
    let second = converter.convert_source(STACK).expect("converts");
    assert_eq!(first, second);
}

#[test]
fn test_parse_error_keeps_source() {
    let source = "direction: sideways\na -> b";
    let err = Converter::default()
        .convert_source(source)
        .expect_err("invalid direction should fail");

    match err {
        D2JsonError::Parse { err, src } => {
            assert_eq!(src, source);
            assert!(!err.diagnostics().is_empty());
        }
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn test_to_json_uses_output_config() {
    let converter = fallback_only();
    let diagram = converter.convert_source("a").expect("converts");
    let json = converter.to_json(&diagram).expect("serializes");

    assert_eq!(
        json,
        r#"{"nodes":[{"id":"a","label":"a","x":550.0,"y":350.0,"width":120.0,"height":50.0}],"edges":[]}"#
    );
}

#[test]
fn test_empty_source_yields_empty_diagram() {
    let diagram = Converter::default()
        .convert_source("# nothing here\n")
        .expect("converts");
    assert_eq!(diagram, OutputDiagram::default());
}
