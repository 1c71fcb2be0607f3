//! Conversion of a [`GraphDataset`] into renderable elements.

use std::collections::{HashMap, HashSet};

use super::error::{Endpoint, GraphError, Result};
use super::types::GraphDataset;

/// A node as the surface draws it.
#[derive(Clone, Debug, PartialEq)]
pub struct Vertex {
	pub id: String,
	pub label: String,
	pub category: String,
	pub importance: Option<u8>,
	pub total_degree: Option<u32>,
}

/// An edge as the surface draws it. Endpoints are vertex indices.
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
	pub id: String,
	pub source: usize,
	pub target: usize,
	pub label: String,
	pub weight: Option<f64>,
}

/// Vertices and links in dataset order, plus lookup tables.
#[derive(Clone, Debug, Default)]
pub struct RenderElements {
	pub vertices: Vec<Vertex>,
	pub links: Vec<Link>,
	index: HashMap<String, usize>,
	link_index: HashMap<String, usize>,
	/// Incident link indices per vertex.
	incident: Vec<Vec<usize>>,
}

impl RenderElements {
	/// Number of vertices.
	pub fn len(&self) -> usize {
		self.vertices.len()
	}

	/// True when there are no vertices.
	pub fn is_empty(&self) -> bool {
		self.vertices.is_empty()
	}

	/// Vertex index for a node id.
	pub fn vertex_index(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	/// Link index for an edge id.
	pub fn link_index(&self, id: &str) -> Option<usize> {
		self.link_index.get(id).copied()
	}

	/// Links touching vertex `idx`, with their link indices.
	pub fn incident_links(&self, idx: usize) -> impl Iterator<Item = (usize, &Link)> {
		self.incident
			.get(idx)
			.into_iter()
			.flatten()
			.map(|&l| (l, &self.links[l]))
	}

	/// Vertex indices one hop away from `idx`, in either direction.
	pub fn neighbors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
		self.incident_links(idx)
			.map(move |(_, l)| if l.source == idx { l.target } else { l.source })
	}

	/// Degree used for sizing and ordering: the declared one, else counted links.
	pub fn degree(&self, idx: usize) -> u32 {
		self.vertices[idx]
			.total_degree
			.unwrap_or_else(|| self.incident.get(idx).map_or(0, |v| v.len() as u32))
	}

	/// Distinct categories, first-seen order.
	pub fn categories(&self) -> Vec<String> {
		let mut seen = HashSet::new();
		self.vertices
			.iter()
			.filter(|v| seen.insert(v.category.as_str()))
			.map(|v| v.category.clone())
			.collect()
	}
}

/// Convert a dataset into renderable elements.
///
/// Fails on the first edge whose source or target is not a node of the same
/// dataset. Node ids are trusted to be unique.
pub fn build(dataset: &GraphDataset) -> Result<RenderElements> {
	let mut index = HashMap::with_capacity(dataset.nodes.len());
	let vertices: Vec<Vertex> = dataset
		.nodes
		.iter()
		.enumerate()
		.map(|(i, node)| {
			index.insert(node.id.clone(), i);
			Vertex {
				id: node.id.clone(),
				label: node.name.clone(),
				category: node.category.clone(),
				importance: node.importance,
				total_degree: node.total_degree,
			}
		})
		.collect();

	let resolve = |edge: &str, id: &str, endpoint| {
		index.get(id).copied().ok_or_else(|| GraphError::MalformedDataset {
			edge: edge.to_string(),
			endpoint,
			node: id.to_string(),
		})
	};

	let mut incident = vec![Vec::new(); vertices.len()];
	let mut link_index = HashMap::with_capacity(dataset.edges.len());
	let mut links = Vec::with_capacity(dataset.edges.len());
	for (i, edge) in dataset.edges.iter().enumerate() {
		let source = resolve(&edge.id, &edge.source, Endpoint::Source)?;
		let target = resolve(&edge.id, &edge.target, Endpoint::Target)?;
		incident[source].push(i);
		if target != source {
			incident[target].push(i);
		}
		link_index.insert(edge.id.clone(), i);
		links.push(Link {
			id: edge.id.clone(),
			source,
			target,
			label: edge.relationship.clone(),
			weight: edge.weight,
		});
	}

	Ok(RenderElements {
		vertices,
		links,
		index,
		link_index,
		incident,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::knowledge_graph::types::{GraphEdge, GraphNode};

	fn node(id: &str, category: &str) -> GraphNode {
		GraphNode {
			id: id.into(),
			name: format!("Node {id}"),
			category: category.into(),
			importance: None,
			total_degree: None,
			properties: None,
		}
	}

	fn edge(id: &str, source: &str, target: &str) -> GraphEdge {
		GraphEdge {
			id: id.into(),
			source: source.into(),
			target: target.into(),
			relationship: "rel".into(),
			weight: None,
			properties: None,
		}
	}

	#[test]
	fn keeps_counts_and_ids() {
		let data = GraphDataset::new(
			vec![node("a", "Host"), node("b", "Pathogen"), node("c", "Host")],
			vec![edge("e1", "a", "b"), edge("e2", "b", "c")],
		);
		let elements = build(&data).unwrap();
		assert_eq!(elements.vertices.len(), 3);
		assert_eq!(elements.links.len(), 2);
		let ids: Vec<_> = elements.vertices.iter().map(|v| v.id.as_str()).collect();
		assert_eq!(ids, ["a", "b", "c"]);
		assert_eq!(elements.vertices[0].label, "Node a");
		assert_eq!(elements.links[1].id, "e2");
		assert_eq!(elements.categories(), ["Host", "Pathogen"]);
	}

	#[test]
	fn categories_keep_first_seen_order() {
		let data = GraphDataset::new(
			vec![
				node("a", "Vector"),
				node("b", "Host"),
				node("c", "Vector"),
				node("d", "Pathogen"),
			],
			vec![],
		);
		let elements = build(&data).unwrap();
		assert_eq!(elements.categories(), ["Vector", "Host", "Pathogen"]);
	}

	#[test]
	fn neighbors_are_undirected() {
		let data = GraphDataset::new(
			vec![node("a", "x"), node("b", "x"), node("c", "x")],
			vec![edge("e1", "a", "b"), edge("e2", "c", "b")],
		);
		let elements = build(&data).unwrap();
		let mut around_b: Vec<_> = elements.neighbors(1).collect();
		around_b.sort();
		assert_eq!(around_b, [0, 2]);
		assert_eq!(elements.degree(1), 2);
		assert_eq!(elements.degree(0), 1);
	}

	#[test]
	fn incident_links_carry_their_indices() {
		let data = GraphDataset::new(
			vec![node("a", "x"), node("b", "x"), node("c", "x")],
			vec![edge("e1", "a", "b"), edge("e2", "a", "c"), edge("loop", "b", "b")],
		);
		let elements = build(&data).unwrap();
		let around_b: Vec<_> = elements
			.incident_links(1)
			.map(|(i, l)| (i, l.id.as_str()))
			.collect();
		assert_eq!(around_b, [(0, "e1"), (2, "loop")]);
		assert_eq!(elements.incident_links(2).count(), 1);
		assert_eq!(elements.incident_links(9).count(), 0);
	}

	#[test]
	fn dangling_target_is_rejected() {
		let data = GraphDataset::new(vec![node("a", "x")], vec![edge("e1", "a", "zz")]);
		match build(&data) {
			Err(GraphError::MalformedDataset { edge, endpoint, node }) => {
				assert_eq!(edge, "e1");
				assert_eq!(endpoint, Endpoint::Target);
				assert_eq!(node, "zz");
			}
			other => panic!("expected malformed dataset, got {other:?}"),
		}
	}

	#[test]
	fn empty_dataset_builds() {
		let elements = build(&GraphDataset::default()).unwrap();
		assert!(elements.is_empty());
	}
}
