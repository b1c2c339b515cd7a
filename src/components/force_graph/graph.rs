//! Validated, immutable graph consumed by the solver and renderer.
//!
//! Links are resolved to node indices once at ingestion, so downstream code
//! never has to handle a dangling endpoint.

use std::collections::HashMap;

use super::error::{GraphValidationError, LinkEndpoint};
use super::types::{GraphData, NodeKind};

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	pub id: String,
	pub name: String,
	pub kind: NodeKind,
}

/// A link between two node indices. Direction is presentation-only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Link {
	pub source: usize,
	pub target: usize,
}

#[derive(Clone, Debug, Default)]
pub struct Graph {
	nodes: Vec<Node>,
	links: Vec<Link>,
	index: HashMap<String, usize>,
}

impl Graph {
	/// Validates a payload and resolves link endpoints.
	pub fn from_data(data: &GraphData) -> Result<Self, GraphValidationError> {
		let mut index = HashMap::with_capacity(data.nodes.len());
		let mut nodes = Vec::with_capacity(data.nodes.len());

		for (i, node) in data.nodes.iter().enumerate() {
			if node.id.is_empty() {
				return Err(GraphValidationError::EmptyId { index: i });
			}
			if index.insert(node.id.clone(), i).is_some() {
				return Err(GraphValidationError::DuplicateId {
					id: node.id.clone(),
				});
			}
			nodes.push(Node {
				id: node.id.clone(),
				name: node.name.clone(),
				kind: node.kind.clone(),
			});
		}

		let resolve = |i: usize, id: &str, endpoint: LinkEndpoint| {
			index
				.get(id)
				.copied()
				.ok_or_else(|| GraphValidationError::DanglingLink {
					index: i,
					endpoint,
					id: id.to_string(),
				})
		};

		let links = data
			.links
			.iter()
			.enumerate()
			.map(|(i, link)| {
				Ok(Link {
					source: resolve(i, &link.source, LinkEndpoint::Source)?,
					target: resolve(i, &link.target, LinkEndpoint::Target)?,
				})
			})
			.collect::<Result<Vec<_>, _>>()?;

		Ok(Self {
			nodes,
			links,
			index,
		})
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn links(&self) -> &[Link] {
		&self.links
	}

	pub fn node(&self, idx: usize) -> Option<&Node> {
		self.nodes.get(idx)
	}

	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Number of link endpoints touching each node, self-links counted twice.
	pub fn degrees(&self) -> Vec<usize> {
		let mut counts = vec![0; self.nodes.len()];
		for link in &self.links {
			counts[link.source] += 1;
			counts[link.target] += 1;
		}
		counts
	}
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;
	use crate::components::force_graph::types::{GraphLink, GraphNode};

	fn node(id: &str) -> GraphNode {
		GraphNode {
			id: id.into(),
			name: id.to_uppercase(),
			kind: NodeKind::Backend,
		}
	}

	fn link(source: &str, target: &str) -> GraphLink {
		GraphLink {
			source: source.into(),
			target: target.into(),
		}
	}

	#[test]
	fn resolves_sample_links_to_indices() {
		let graph = Graph::from_data(&GraphData::sample()).unwrap();
		assert_eq!(graph.len(), 4);
		assert_eq!(graph.links()[2], Link { source: 2, target: 3 });
		assert_eq!(graph.index_of("db"), Some(3));
		assert_eq!(graph.degrees(), vec![2, 1, 2, 1]);
	}

	#[test]
	fn rejects_duplicate_id() {
		let data = GraphData {
			nodes: vec![node("a"), node("b"), node("a")],
			links: vec![],
		};
		assert_eq!(
			Graph::from_data(&data).unwrap_err(),
			GraphValidationError::DuplicateId { id: "a".into() }
		);
	}

	#[test]
	fn rejects_empty_id() {
		let data = GraphData {
			nodes: vec![node("a"), node("")],
			links: vec![],
		};
		assert_eq!(
			Graph::from_data(&data).unwrap_err(),
			GraphValidationError::EmptyId { index: 1 }
		);
	}

	#[test]
	fn rejects_dangling_target() {
		let data = GraphData {
			nodes: vec![node("a"), node("b")],
			links: vec![link("a", "b"), link("b", "ghost")],
		};
		assert_eq!(
			Graph::from_data(&data).unwrap_err(),
			GraphValidationError::DanglingLink {
				index: 1,
				endpoint: LinkEndpoint::Target,
				id: "ghost".into(),
			}
		);
	}

	#[test]
	fn empty_payload_is_valid() {
		let graph = Graph::from_data(&GraphData::default()).unwrap();
		assert!(graph.is_empty());
		assert!(graph.links().is_empty());
	}

	proptest! {
		#[test]
		fn any_duplicated_id_is_rejected(
			ids in prop::collection::hash_set("[a-z]{1,6}", 1..12),
			pick in any::<prop::sample::Index>(),
		) {
			let ids: Vec<String> = ids.into_iter().collect();
			let dup = pick.get(&ids).clone();
			let mut nodes: Vec<GraphNode> = ids.iter().map(|id| node(id)).collect();
			nodes.push(node(&dup));
			let data = GraphData { nodes, links: vec![] };
			prop_assert_eq!(
				Graph::from_data(&data).unwrap_err(),
				GraphValidationError::DuplicateId { id: dup }
			);
		}

		#[test]
		fn any_unknown_endpoint_is_rejected(
			ids in prop::collection::hash_set("[a-z]{1,6}", 1..12),
			pick in any::<prop::sample::Index>(),
		) {
			let ids: Vec<String> = ids.into_iter().collect();
			let known = pick.get(&ids).clone();
			let nodes: Vec<GraphNode> = ids.iter().map(|id| node(id)).collect();
			let data = GraphData {
				nodes,
				links: vec![link(&known, "UNKNOWN")],
			};
			let is_dangling = matches!(
				Graph::from_data(&data),
				Err(GraphValidationError::DanglingLink { .. })
			);
			prop_assert!(is_dangling);
		}
	}
}
