//! Dataset types as delivered by the knowledge graph backend.

use serde::{Deserialize, Serialize};

/// A domain concept in the knowledge graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
	/// Unique identifier within a dataset. Edges reference nodes by this id.
	pub id: String,
	/// Display label.
	pub name: String,
	/// Open-ended category, e.g. "Pathogen" or "Host". Drives color and filtering.
	pub category: String,
	/// Optional importance ranking, 1 (low) to 5 (high).
	#[serde(default)]
	pub importance: Option<u8>,
	/// Optional number of incident edges. Drives node size.
	#[serde(default, alias = "totalDegree")]
	pub total_degree: Option<u32>,
	/// Free-form attributes, shown in the detail panel only.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub properties: Option<serde_json::Map<String, serde_json::Value>>,
}

/// A directed relationship between two nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
	/// Unique identifier within a dataset.
	pub id: String,
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// Display label, e.g. "infects".
	pub relationship: String,
	/// Optional numeric weight.
	#[serde(default)]
	pub weight: Option<f64>,
	/// Free-form attributes, carried through untouched.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub properties: Option<serde_json::Map<String, serde_json::Value>>,
}

/// One visualization pass worth of nodes and edges.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDataset {
	/// All nodes. Ids are expected to be unique.
	#[serde(default)]
	pub nodes: Vec<GraphNode>,
	/// All edges. Endpoints must resolve within `nodes`.
	#[serde(default)]
	pub edges: Vec<GraphEdge>,
	/// Total node count on the backend, which may exceed `nodes.len()` when paged.
	#[serde(default)]
	pub total_nodes: Option<usize>,
	/// Total edge count on the backend.
	#[serde(default)]
	pub total_edges: Option<usize>,
}

impl GraphDataset {
	/// Build a dataset from nodes and edges, with totals equal to the list lengths.
	pub fn new(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
		let (total_nodes, total_edges) = (Some(nodes.len()), Some(edges.len()));
		Self {
			nodes,
			edges,
			total_nodes,
			total_edges,
		}
	}

	/// Parse the backend's JSON payload.
	pub fn from_json(text: &str) -> super::error::Result<Self> {
		Ok(serde_json::from_str(text)?)
	}

	/// True when there is nothing to draw.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

/// Aggregate figures shown in the header. Never used for layout or filtering.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
	/// Node count.
	pub total_nodes: usize,
	/// Edge count.
	pub total_edges: usize,
	/// Mean degree, absent for an empty graph.
	#[serde(default)]
	pub avg_degree: Option<f64>,
}

impl StatsSummary {
	/// Derive the summary from a dataset when the backend did not send one.
	pub fn from_dataset(data: &GraphDataset) -> Self {
		let total_nodes = data.total_nodes.unwrap_or(data.nodes.len());
		let total_edges = data.total_edges.unwrap_or(data.edges.len());
		let avg_degree = (!data.nodes.is_empty())
			.then(|| 2.0 * data.edges.len() as f64 / data.nodes.len() as f64);
		Self {
			total_nodes,
			total_edges,
			avg_degree,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_backend_payload() {
		let json = r#"{
			"nodes": [
				{"id": "A", "name": "Pine Wood Nematode", "category": "Pathogen", "importance": 5, "total_degree": 3},
				{"id": "B", "name": "Pine Tree", "category": "Host", "totalDegree": 1}
			],
			"edges": [
				{"id": "e1", "source": "A", "target": "B", "relationship": "infects", "weight": 0.8}
			],
			"total_nodes": 120,
			"total_edges": 340
		}"#;
		let data = GraphDataset::from_json(json).unwrap();
		assert_eq!(data.nodes.len(), 2);
		assert_eq!(data.nodes[0].importance, Some(5));
		assert_eq!(data.nodes[1].total_degree, Some(1));
		assert_eq!(data.nodes[1].importance, None);
		assert_eq!(data.edges[0].weight, Some(0.8));
		assert_eq!(data.total_nodes, Some(120));
	}

	#[test]
	fn rejects_invalid_json() {
		assert!(GraphDataset::from_json("{\"nodes\": [").is_err());
	}

	#[test]
	fn stats_fall_back_to_list_lengths() {
		let data: GraphDataset =
			serde_json::from_str(r#"{"nodes": [{"id": "a", "name": "a", "category": "x"}, {"id": "b", "name": "b", "category": "x"}], "edges": [{"id": "e", "source": "a", "target": "b", "relationship": "r"}]}"#)
				.unwrap();
		let stats = StatsSummary::from_dataset(&data);
		assert_eq!(stats.total_nodes, 2);
		assert_eq!(stats.total_edges, 1);
		assert_eq!(stats.avg_degree, Some(1.0));
		assert_eq!(StatsSummary::from_dataset(&GraphDataset::default()).avg_degree, None);
	}
}
