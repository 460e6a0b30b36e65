//! Loading a graph: fetch the edge list, then normalize it.

mod fetch;
mod normalize;
mod types;

use log::{info, warn};
use reqwest::{StatusCode, Url};

pub use fetch::{decode_response, fetch_graph};
pub use normalize::normalize;
pub use types::{Edge, EdgeRecord, Graph, GraphPayload, Node, NodeId};

use crate::config::ViewerConfig;
use crate::error::GraphError;

/// Fetch then normalize. A fetch failure returns before normalization runs.
pub async fn load_graph(url: &Url, config: &ViewerConfig) -> Result<Graph, GraphError> {
	let payload = fetch_graph(url).await?;
	build_graph(payload, config)
}

/// Same pipeline for a response that has already been received.
pub fn graph_from_response(
	url: &Url,
	status: StatusCode,
	body: &str,
	config: &ViewerConfig,
) -> Result<Graph, GraphError> {
	let payload = decode_response(url, status, body)?;
	build_graph(payload, config)
}

/// Enforce the edge limit and normalize.
pub fn build_graph(payload: GraphPayload, config: &ViewerConfig) -> Result<Graph, GraphError> {
	if payload.graph.len() > config.max_edges {
		return Err(GraphError::TooLarge {
			edges: payload.graph.len(),
			limit: config.max_edges,
		});
	}

	let graph = normalize(&payload.graph);
	if graph.is_empty() {
		warn!("Graph endpoint returned no edges");
	} else {
		info!(
			"Loaded graph: {} nodes, {} edges, {} relationship kinds",
			graph.nodes.len(),
			graph.edges.len(),
			graph.relationships().len()
		);
	}
	Ok(graph)
}
