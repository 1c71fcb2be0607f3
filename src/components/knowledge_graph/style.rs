//! Category colors, degree sizing, and composition with overlay state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::model::{Link, Vertex};
use super::overlay::ElementState;

/// Injected style table. Swap the palette without touching the resolver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
	/// Category name to CSS color. Keys match in any case.
	pub palette: BTreeMap<String, String>,
	/// Color for categories missing from `palette`.
	pub default_color: String,
	/// Size per unit of degree.
	pub scale_factor: f64,
	/// Smallest node diameter.
	pub min_size: f64,
	/// Largest node diameter.
	pub max_size: f64,
}

impl Default for StyleConfig {
	fn default() -> Self {
		let palette = [
			("pathogen", "#ef4444"),
			("host", "#10b981"),
			("vector", "#f59e0b"),
			("symptom", "#8b5cf6"),
			("treatment", "#3b82f6"),
			("environment", "#06b6d4"),
			("location", "#ec4899"),
			("mechanism", "#6366f1"),
			("compound", "#84cc16"),
		]
		.into_iter()
		.map(|(k, v)| (k.to_string(), v.to_string()))
		.collect();
		Self {
			palette,
			default_color: "#6b7280".into(),
			scale_factor: 3.0,
			min_size: 30.0,
			max_size: 80.0,
		}
	}
}

pub const SELECTED_BORDER: &str = "#2563eb";
pub const NEIGHBOR_BORDER: &str = "#93c5fd";
pub const MATCH_HALO: &str = "#facc15";
/// Color of an edge with no highlight.
pub const EDGE_COLOR: &str = "#cbd5e1";
pub const EDGE_HIGHLIGHT: &str = "#2563eb";
pub const LABEL_COLOR: &str = "#333333";
pub const EDGE_LABEL_COLOR: &str = "#64748b";

/// Opacity applied to nodes failing the filter.
pub const DIMMED_ALPHA: f64 = 0.2;

/// Fully resolved look of one node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeStyle {
	pub color: String,
	pub size: f64,
	pub alpha: f64,
	pub border: Option<(&'static str, f64)>,
	pub halo: Option<&'static str>,
}

/// Fully resolved look of one link.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeStyle {
	pub color: &'static str,
	pub width: f64,
}

/// Maps categories to colors and degrees to sizes.
#[derive(Clone, Debug, Default)]
pub struct StyleResolver {
	config: StyleConfig,
}

impl StyleResolver {
	/// Wrap `config`, normalized: palette keys lower-cased, size bounds
	/// finite, non-negative and ordered.
	pub fn new(mut config: StyleConfig) -> Self {
		config.palette = config
			.palette
			.into_iter()
			.map(|(k, v)| (k.to_lowercase(), v))
			.collect();
		let defaults = StyleConfig::default();
		if !(config.min_size.is_finite() && config.min_size >= 0.0) {
			config.min_size = defaults.min_size;
		}
		if !(config.max_size.is_finite() && config.max_size >= 0.0) {
			config.max_size = defaults.max_size;
		}
		if config.min_size > config.max_size {
			std::mem::swap(&mut config.min_size, &mut config.max_size);
		}
		if !config.scale_factor.is_finite() {
			config.scale_factor = defaults.scale_factor;
		}
		Self { config }
	}

	/// The normalized configuration.
	pub fn config(&self) -> &StyleConfig {
		&self.config
	}

	/// Palette color for `category`, case-insensitive, else the default color.
	pub fn color_for(&self, category: &str) -> &str {
		self.config
			.palette
			.get(&category.to_lowercase())
			.unwrap_or(&self.config.default_color)
	}

	/// Node diameter: `degree * scale_factor` clamped to `[min_size, max_size]`.
	/// A missing degree counts as 1.
	pub fn size_for(&self, total_degree: Option<u32>) -> f64 {
		let degree = total_degree.unwrap_or(1) as f64;
		(degree * self.config.scale_factor)
			.max(self.config.min_size)
			.min(self.config.max_size)
	}

	/// Base node style composed with its overlay flags.
	pub fn resolve_node(&self, vertex: &Vertex, state: ElementState) -> NodeStyle {
		let border = if state.focused {
			Some((SELECTED_BORDER, 4.0))
		} else if state.neighbor {
			Some((NEIGHBOR_BORDER, 3.0))
		} else {
			None
		};
		NodeStyle {
			color: self.color_for(&vertex.category).to_string(),
			size: self.size_for(vertex.total_degree),
			alpha: if state.dimmed { DIMMED_ALPHA } else { 1.0 },
			border,
			halo: state.matched.then_some(MATCH_HALO),
		}
	}

	/// Edges are highlighted only inside the focused neighborhood.
	pub fn resolve_edge(&self, _link: &Link, state: ElementState) -> EdgeStyle {
		if state.neighbor {
			EdgeStyle {
				color: EDGE_HIGHLIGHT,
				width: 3.0,
			}
		} else {
			EdgeStyle {
				color: EDGE_COLOR,
				width: 2.0,
			}
		}
	}

	/// Palette entries for the legend, sorted by category.
	pub fn legend(&self) -> Vec<(String, String)> {
		self.config
			.palette
			.iter()
			.map(|(k, v)| (k.clone(), v.clone()))
			.collect()
	}
}
