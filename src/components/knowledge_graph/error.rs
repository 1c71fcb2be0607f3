//! Error types for the knowledge graph surface.

use thiserror::Error;

/// Result type alias using [`GraphError`].
pub type Result<T> = std::result::Result<T, GraphError>;

/// Which end of an edge failed to resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
	/// The edge's `source`.
	Source,
	/// The edge's `target`.
	Target,
}

impl std::fmt::Display for Endpoint {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Endpoint::Source => "source",
			Endpoint::Target => "target",
		})
	}
}

/// Errors surfaced to the user instead of a graph.
#[derive(Error, Debug)]
pub enum GraphError {
	/// An edge references a node id that is not part of the dataset.
	#[error("Malformed dataset: edge '{edge}' has {endpoint} '{node}' which is not a node in this dataset.")]
	MalformedDataset {
		/// Offending edge id.
		edge: String,
		/// The end that did not resolve.
		endpoint: Endpoint,
		/// The missing node id.
		node: String,
	},

	/// The embedded graph payload could not be parsed.
	#[error("Invalid graph JSON: {0}")]
	InvalidJson(#[from] serde_json::Error),
}
