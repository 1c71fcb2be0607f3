//! Selection, search and filter overlays over the rendered elements.
//!
//! Each overlay is a membership set over vertex/link indices. The overlays never
//! touch one another: a setter only recomputes its own set and reports the
//! elements whose derived [`ElementState`] flipped as a result.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use super::model::{RenderElements, Vertex};

/// Lowest importance the filter panel offers.
pub const MIN_IMPORTANCE: u8 = 1;
/// Highest importance the filter panel offers.
pub const MAX_IMPORTANCE: u8 = 5;

/// Derived per-element flags. Base styling is composed with these in `style`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ElementState {
	/// The focused node.
	pub focused: bool,
	/// A node or link directly incident to the focused node.
	pub neighbor: bool,
	/// Label matches the active search term.
	pub matched: bool,
	/// Node fails the active filter.
	pub dimmed: bool,
}

/// Attribute filter as sent by the filter panel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPredicate {
	/// Accepted categories. Empty accepts every category.
	#[serde(default)]
	pub categories: Vec<String>,
	/// Inclusive lower bound on importance.
	pub min_importance: u8,
	/// Inclusive upper bound on importance.
	pub max_importance: u8,
}

impl Default for FilterPredicate {
	fn default() -> Self {
		Self {
			categories: Vec::new(),
			min_importance: MIN_IMPORTANCE,
			max_importance: MAX_IMPORTANCE,
		}
	}
}

impl FilterPredicate {
	/// Nodes without an importance always pass the range check.
	pub fn accepts(&self, vertex: &Vertex) -> bool {
		let category_ok =
			self.categories.is_empty() || self.categories.iter().any(|c| *c == vertex.category);
		let importance_ok = vertex
			.importance
			.is_none_or(|i| self.min_importance <= i && i <= self.max_importance);
		category_ok && importance_ok
	}
}

/// Ids of the elements whose visual state changed after a setter call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Restyle {
	/// Node ids, sorted.
	pub nodes: Vec<String>,
	/// Edge ids, sorted.
	pub links: Vec<String>,
}

impl Restyle {
	/// Nothing to redraw.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.links.is_empty()
	}

	/// Total number of elements to redraw.
	pub fn len(&self) -> usize {
		self.nodes.len() + self.links.len()
	}

	fn from_indices(
		elements: &RenderElements,
		nodes: impl IntoIterator<Item = usize>,
		links: impl IntoIterator<Item = usize>,
	) -> Self {
		let nodes: BTreeSet<_> = nodes
			.into_iter()
			.map(|i| elements.vertices[i].id.clone())
			.collect();
		let links: BTreeSet<_> = links
			.into_iter()
			.map(|i| elements.links[i].id.clone())
			.collect();
		Self {
			nodes: nodes.into_iter().collect(),
			links: links.into_iter().collect(),
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
struct Selection {
	focus: usize,
	nodes: HashSet<usize>,
	links: HashSet<usize>,
}

impl Selection {
	fn around(elements: &RenderElements, focus: usize) -> Self {
		let mut nodes = HashSet::new();
		let mut links = HashSet::new();
		for (i, link) in elements.incident_links(focus) {
			links.insert(i);
			let other = if link.source == focus { link.target } else { link.source };
			if other != focus {
				nodes.insert(other);
			}
		}
		Self { focus, nodes, links }
	}

	fn node_flags(sel: Option<&Self>, idx: usize) -> (bool, bool) {
		sel.map_or((false, false), |s| (s.focus == idx, s.nodes.contains(&idx)))
	}

	fn link_flag(sel: Option<&Self>, idx: usize) -> bool {
		sel.is_some_and(|s| s.links.contains(&idx))
	}
}

#[derive(Clone, Debug)]
struct FilterOverlay {
	predicate: FilterPredicate,
	dimmed: HashSet<usize>,
}

/// The three overlays. Created empty, reset on dataset replacement.
#[derive(Clone, Debug, Default)]
pub struct ViewState {
	selection: Option<Selection>,
	search_term: String,
	matches: HashSet<usize>,
	filter: Option<FilterOverlay>,
}

impl ViewState {
	/// Empty overlays.
	pub fn new() -> Self {
		Self::default()
	}

	/// Drop every overlay.
	pub fn reset(&mut self) {
		*self = Self::default();
	}

	/// Focus `id` and highlight its direct neighborhood, or clear with `None`.
	///
	/// Ids that do not name a vertex clear the selection. Focus and
	/// neighborhood always change together.
	pub fn set_selection(&mut self, elements: &RenderElements, id: Option<&str>) -> Restyle {
		let focus = id.and_then(|id| elements.vertex_index(id));
		if focus == self.focus_index() {
			return Restyle::default();
		}
		let old = self.selection.take();
		self.selection = focus.map(|f| Selection::around(elements, f));
		let new = self.selection.as_ref();

		let touched_nodes: BTreeSet<usize> = [old.as_ref(), new]
			.into_iter()
			.flatten()
			.flat_map(|s| s.nodes.iter().copied().chain([s.focus]))
			.collect();
		let touched_links: BTreeSet<usize> = [old.as_ref(), new]
			.into_iter()
			.flatten()
			.flat_map(|s| s.links.iter().copied())
			.collect();

		Restyle::from_indices(
			elements,
			touched_nodes
				.into_iter()
				.filter(|&i| Selection::node_flags(old.as_ref(), i) != Selection::node_flags(new, i)),
			touched_links
				.into_iter()
				.filter(|&i| Selection::link_flag(old.as_ref(), i) != Selection::link_flag(new, i)),
		)
	}

	/// Match node labels against `term`, case-insensitively.
	///
	/// A blank term means no active search, so nothing matches.
	pub fn set_search_term(&mut self, elements: &RenderElements, term: &str) -> Restyle {
		let term = term.trim();
		if term == self.search_term {
			return Restyle::default();
		}
		let needle = term.to_lowercase();
		let matches: HashSet<usize> = if needle.is_empty() {
			HashSet::new()
		} else {
			elements
				.vertices
				.iter()
				.enumerate()
				.filter(|(_, v)| v.label.to_lowercase().contains(&needle))
				.map(|(i, _)| i)
				.collect()
		};
		let changed: Vec<usize> = self.matches.symmetric_difference(&matches).copied().collect();
		self.search_term = term.to_string();
		self.matches = matches;
		Restyle::from_indices(elements, changed, [])
	}

	/// Dim nodes failing `predicate`, or lift all dimming with `None`.
	///
	/// Links are never dimmed by the filter.
	pub fn set_filter(
		&mut self,
		elements: &RenderElements,
		predicate: Option<FilterPredicate>,
	) -> Restyle {
		if predicate.as_ref() == self.filter.as_ref().map(|f| &f.predicate) {
			return Restyle::default();
		}
		let next = predicate.map(|predicate| {
			let dimmed = elements
				.vertices
				.iter()
				.enumerate()
				.filter(|(_, v)| !predicate.accepts(v))
				.map(|(i, _)| i)
				.collect();
			FilterOverlay { predicate, dimmed }
		});
		let empty = HashSet::new();
		let before = self.filter.as_ref().map_or(&empty, |f| &f.dimmed);
		let after = next.as_ref().map_or(&empty, |f| &f.dimmed);
		let changed: Vec<usize> = before.symmetric_difference(after).copied().collect();
		self.filter = next;
		Restyle::from_indices(elements, changed, [])
	}

	/// Flags for vertex `idx`.
	pub fn node_state(&self, idx: usize) -> ElementState {
		let (focused, neighbor) = Selection::node_flags(self.selection.as_ref(), idx);
		ElementState {
			focused,
			neighbor,
			matched: self.matches.contains(&idx),
			dimmed: self.filter.as_ref().is_some_and(|f| f.dimmed.contains(&idx)),
		}
	}

	/// Flags for link `idx`. Only the selection overlay affects links.
	pub fn link_state(&self, idx: usize) -> ElementState {
		ElementState {
			neighbor: Selection::link_flag(self.selection.as_ref(), idx),
			..ElementState::default()
		}
	}

	/// Flags for any element id, node or edge.
	pub fn state_of(&self, elements: &RenderElements, id: &str) -> Option<ElementState> {
		elements
			.vertex_index(id)
			.map(|i| self.node_state(i))
			.or_else(|| elements.link_index(id).map(|i| self.link_state(i)))
	}

	/// Index of the focused vertex.
	pub fn focus_index(&self) -> Option<usize> {
		self.selection.as_ref().map(|s| s.focus)
	}

	/// Id of the focused node.
	pub fn focus<'a>(&self, elements: &'a RenderElements) -> Option<&'a str> {
		self.focus_index().map(|i| elements.vertices[i].id.as_str())
	}

	/// Node and edge ids adjacent to the focus. Empty without a focus.
	pub fn neighborhood(&self, elements: &RenderElements) -> BTreeSet<String> {
		let Some(sel) = &self.selection else {
			return BTreeSet::new();
		};
		sel.nodes
			.iter()
			.map(|&i| elements.vertices[i].id.clone())
			.chain(sel.links.iter().map(|&i| elements.links[i].id.clone()))
			.collect()
	}

	/// The active (trimmed) search term, empty when none.
	pub fn search_term(&self) -> &str {
		&self.search_term
	}

	/// Ids of nodes matching the search term.
	pub fn matches(&self, elements: &RenderElements) -> BTreeSet<String> {
		self.matches
			.iter()
			.map(|&i| elements.vertices[i].id.clone())
			.collect()
	}

	/// The active filter, if any.
	pub fn filter(&self) -> Option<&FilterPredicate> {
		self.filter.as_ref().map(|f| &f.predicate)
	}

	/// Ids of nodes dimmed by the filter.
	pub fn dimmed(&self, elements: &RenderElements) -> BTreeSet<String> {
		self.filter
			.iter()
			.flat_map(|f| f.dimmed.iter())
			.map(|&i| elements.vertices[i].id.clone())
			.collect()
	}
}
