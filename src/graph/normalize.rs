use std::collections::HashMap;

use super::types::{Edge, EdgeRecord, Graph, Node, NodeId};

/// Derive the node set and the typed edge list from raw edge records.
///
/// Every record becomes exactly one [`Edge`]; duplicates are kept. Each
/// identifier seen as a source or target becomes exactly one [`Node`], in order
/// of first appearance.
pub fn normalize(records: &[EdgeRecord]) -> Graph {
	let mut nodes = Vec::new();
	let mut index: HashMap<NodeId, usize> = HashMap::new();
	let mut intern = |id: &NodeId| -> usize {
		*index.entry(id.clone()).or_insert_with(|| {
			nodes.push(Node { id: id.clone() });
			nodes.len() - 1
		})
	};

	let edges = records
		.iter()
		.map(|record| Edge {
			source: intern(&record.source),
			target: intern(&record.target),
			relationship: record.relationship.clone(),
		})
		.collect();

	Graph {
		nodes,
		edges,
		index,
	}
}
