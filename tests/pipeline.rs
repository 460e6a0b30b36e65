use std::collections::HashSet;

use graph_viewer::graph::{EdgeRecord, Graph, graph_from_response, normalize};
use graph_viewer::{ForceGraphState, GraphError, ViewerConfig, build_frame};
use reqwest::{StatusCode, Url};

const BODY: &str = r#"{
	"graph": [
		{"source": "alice@example.org", "target": "bob@example.org", "relationship": "SENT_EMAIL"},
		{"source": "bob@example.org", "target": "carol@example.org", "relationship": "SENT_EMAIL"},
		{"source": "alice@example.org", "target": "bob@example.org", "relationship": "SENT_EMAIL"},
		{"source": 17, "target": "alice@example.org", "relationship": "KNOWS"}
	]
}"#;

fn endpoint() -> Url {
	Url::parse("http://localhost:8000/api/get_graph").unwrap()
}

fn load(status: StatusCode, body: &str) -> Result<Graph, GraphError> {
	graph_from_response(&endpoint(), status, body, &ViewerConfig::default())
}

#[test]
fn response_to_frame() {
	let graph = load(StatusCode::OK, BODY).unwrap();
	assert_eq!(graph.nodes.len(), 4);
	assert_eq!(graph.edges.len(), 4);
	assert_eq!(graph.relationships(), ["SENT_EMAIL", "KNOWS"]);

	let mut state = ForceGraphState::new(&graph, &ViewerConfig::default(), 1024.0, 768.0);
	state.simulation.run_to_end();
	let frame = build_frame(&state);
	assert_eq!(frame.line_count(), 4);
	assert_eq!(frame.circle_count(), 4);
	assert!(
		state
			.simulation
			.particles()
			.iter()
			.all(|p| p.x.is_finite() && p.y.is_finite())
	);
}

#[test]
fn self_loops_reach_the_screen() {
	let body = r#"{"graph": [
		{"source": "z", "target": "z", "relationship": "SELF"},
		{"source": "z", "target": "y", "relationship": "KNOWS"}
	]}"#;
	let graph = load(StatusCode::OK, body).unwrap();
	assert_eq!(graph.nodes.len(), 2);

	let mut state = ForceGraphState::new(&graph, &ViewerConfig::default(), 800.0, 600.0);
	state.simulation.run_to_end();
	let frame = build_frame(&state);
	assert_eq!(frame.line_count() + frame.loop_count(), graph.edges.len());
	assert_eq!(frame.loop_count(), 1);
}

#[test]
fn node_count_matches_distinct_identifiers() {
	let records = [
		EdgeRecord::new("1", "2", "r"),
		EdgeRecord::new("2", "3", "r"),
		EdgeRecord::new("3", "1", "r"),
		EdgeRecord::new("4", "4", "r"),
		EdgeRecord::new("1", "2", "r"),
	];
	let graph = normalize(&records);
	let distinct: HashSet<_> = records
		.iter()
		.flat_map(|r| [r.source.clone(), r.target.clone()])
		.collect();
	assert_eq!(graph.nodes.len(), distinct.len());
	assert_eq!(graph.edges.len(), records.len());
}

#[test]
fn failed_responses_never_reach_the_renderer() {
	assert_eq!(
		load(StatusCode::NOT_FOUND, BODY),
		Err(GraphError::Status {
			status: 404,
			url: endpoint().to_string(),
		})
	);
	assert!(matches!(
		load(StatusCode::OK, "Internal Server Error"),
		Err(GraphError::MalformedPayload { .. })
	));
}

#[test]
fn empty_graph_is_not_an_error() {
	let graph = load(StatusCode::OK, r#"{"graph": []}"#).unwrap();
	assert!(graph.is_empty());

	let mut state = ForceGraphState::new(&graph, &ViewerConfig::default(), 800.0, 600.0);
	state.tick(0.016);
	assert_eq!(build_frame(&state).primitive_count(), 0);
}

#[test]
fn reloading_keeps_topology() {
	let first = load(StatusCode::OK, BODY).unwrap();
	let second = load(StatusCode::OK, BODY).unwrap();
	assert_eq!(first.nodes, second.nodes);
	assert_eq!(first.edges, second.edges);
}
