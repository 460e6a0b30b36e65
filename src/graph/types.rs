use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer};

/// A node identifier. The backend may send strings or numeric database ids.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub String);

impl NodeId {
	/// The identifier as text.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for NodeId {
	fn from(id: &str) -> Self {
		NodeId(id.to_string())
	}
}

impl<'de> Deserialize<'de> for NodeId {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		#[derive(Deserialize)]
		#[serde(untagged)]
		enum Raw {
			Text(String),
			Int(i64),
			Uint(u64),
		}

		Ok(NodeId(match Raw::deserialize(deserializer)? {
			Raw::Text(s) => s,
			Raw::Int(n) => n.to_string(),
			Raw::Uint(n) => n.to_string(),
		}))
	}
}

/// One labelled edge as received from the endpoint.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct EdgeRecord {
	/// Tail of the edge.
	pub source: NodeId,
	/// Head of the edge.
	pub target: NodeId,
	/// Relationship label; empty when the backend omits it.
	#[serde(default)]
	pub relationship: String,
}

impl EdgeRecord {
	/// Convenience constructor, mostly for fixtures.
	pub fn new(source: &str, target: &str, relationship: &str) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			relationship: relationship.into(),
		}
	}
}

/// Response body of the graph endpoint.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct GraphPayload {
	/// Edge records, duplicates included.
	pub graph: Vec<EdgeRecord>,
}

/// A node, known only through the edges that mention it.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	/// The identifier that introduced the node.
	pub id: NodeId,
}

/// A normalized edge; endpoints index into [`Graph::nodes`].
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
	/// Index of the source node.
	pub source: usize,
	/// Index of the target node.
	pub target: usize,
	/// Relationship label.
	pub relationship: String,
}

/// Nodes in order of first appearance plus every edge of the payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Graph {
	/// Distinct nodes, first appearance first.
	pub nodes: Vec<Node>,
	/// One edge per received record.
	pub edges: Vec<Edge>,
	pub(crate) index: HashMap<NodeId, usize>,
}

impl Graph {
	/// No nodes and no edges.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.edges.is_empty()
	}

	/// Position of `id` in [`Graph::nodes`].
	pub fn node_index(&self, id: &NodeId) -> Option<usize> {
		self.index.get(id).copied()
	}

	/// Edge endpoints per node, indexed like [`Graph::nodes`]. A self-loop
	/// counts twice.
	pub fn degrees(&self) -> Vec<usize> {
		let mut degree = vec![0; self.nodes.len()];
		for e in &self.edges {
			degree[e.source] += 1;
			degree[e.target] += 1;
		}
		degree
	}

	/// Distinct relationship labels, first appearance first.
	pub fn relationships(&self) -> Vec<&str> {
		let mut seen = Vec::new();
		for edge in &self.edges {
			if !seen.contains(&edge.relationship.as_str()) {
				seen.push(edge.relationship.as_str());
			}
		}
		seen
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn numeric_ids_become_text() {
		let payload: GraphPayload = serde_json::from_str(
			r#"{"graph": [{"source": 4, "target": "x", "relationship": "SENT_EMAIL"}]}"#,
		)
		.unwrap();
		assert_eq!(payload.graph[0].source, NodeId::from("4"));
		assert_eq!(payload.graph[0].target, NodeId::from("x"));
	}

	#[test]
	fn missing_relationship_is_empty() {
		let payload: GraphPayload =
			serde_json::from_str(r#"{"graph": [{"source": "a", "target": "b"}]}"#).unwrap();
		assert_eq!(payload.graph[0].relationship, "");
	}

	#[test]
	fn missing_endpoint_is_rejected() {
		let res = serde_json::from_str::<GraphPayload>(r#"{"graph": [{"source": "a"}]}"#);
		assert!(res.is_err());
	}
}
