//! The visualization surface: one dataset, laid out, styled and explorable.

use std::sync::Arc;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::controller::{InteractionController, InteractionEvent, Reaction, Scene};
use super::error::Result;
use super::layout::{LayoutAlgorithm, LayoutEngine, LayoutOptions, LayoutProgress, Point};
use super::model::{self, RenderElements};
use super::overlay::{FilterPredicate, Restyle, ViewState};
use super::style::{EdgeStyle, NodeStyle, StyleConfig, StyleResolver};
use super::types::{GraphDataset, GraphNode};
use super::viewport::{Viewport, ViewportConfig};

/// Everything tunable about a surface.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceConfig {
	/// Palette and node size table.
	#[serde(default)]
	pub style: StyleConfig,
	/// Layout tuning.
	#[serde(default)]
	pub layout: LayoutOptions,
	/// Zoom and fit constants.
	#[serde(default)]
	pub viewport: ViewportConfig,
}

/// Handle returned by [`GraphSurface::on_node_selected`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type NodeListener = Box<dyn Fn(&GraphNode)>;

/// Owns the model, style resolver, layout engine, overlays and controller for
/// one canvas.
pub struct GraphSurface {
	dataset: Arc<GraphDataset>,
	elements: RenderElements,
	style: StyleResolver,
	layout: LayoutEngine,
	view: ViewState,
	viewport: Viewport,
	controller: InteractionController,
	listeners: Vec<(ListenerId, NodeListener)>,
	next_listener: u64,
	error: Option<String>,
}

impl GraphSurface {
	/// Empty surface for a canvas of `width` by `height` pixels.
	pub fn new(width: f64, height: f64, config: SurfaceConfig) -> Self {
		Self {
			dataset: Arc::default(),
			elements: RenderElements::default(),
			style: StyleResolver::new(config.style),
			layout: LayoutEngine::new(config.layout),
			view: ViewState::new(),
			viewport: Viewport::new(width, height, config.viewport),
			controller: InteractionController::new(),
			listeners: Vec::new(),
			next_listener: 0,
			error: None,
		}
	}

	/// Show `dataset`. A no-op if it is the dataset already shown.
	///
	/// Rebuilds the elements, resets every overlay and starts the default
	/// layout. A malformed dataset clears the canvas and is kept as the
	/// displayed error. An empty one leaves an idle canvas.
	pub fn render(&mut self, dataset: Arc<GraphDataset>) -> Result<()> {
		if Arc::ptr_eq(&self.dataset, &dataset) {
			return match self.error {
				Some(_) => model::build(&self.dataset).map(drop),
				None => Ok(()),
			};
		}

		self.layout.cancel();
		self.view.reset();
		self.controller.reset_gestures();
		self.dataset = dataset;

		let elements = match model::build(&self.dataset) {
			Ok(elements) => elements,
			Err(e) => {
				warn!("knowledge-graph: {e}");
				self.elements = RenderElements::default();
				self.layout.load(&self.elements);
				self.error = Some(e.to_string());
				return Err(e);
			}
		};
		self.error = None;
		self.elements = elements;
		self.layout.load(&self.elements);
		info!(
			"knowledge-graph: loaded {} nodes, {} edges",
			self.elements.vertices.len(),
			self.elements.links.len()
		);

		if !self.elements.is_empty() {
			self.layout.run(&self.elements, LayoutAlgorithm::default());
		}
		self.fit();
		Ok(())
	}

	/// Register a listener for selection of a node. Not called on clear.
	pub fn on_node_selected(&mut self, callback: impl Fn(&GraphNode) + 'static) -> ListenerId {
		self.next_listener += 1;
		let id = ListenerId(self.next_listener);
		self.listeners.push((id, Box::new(callback)));
		id
	}

	/// Unregister a listener. Returns false if it was not registered.
	pub fn remove_listener(&mut self, id: ListenerId) -> bool {
		let before = self.listeners.len();
		self.listeners.retain(|(l, _)| *l != id);
		self.listeners.len() != before
	}

	/// Forwarded to [`ViewState::set_search_term`].
	pub fn set_search_term(&mut self, term: &str) -> Restyle {
		self.view.set_search_term(&self.elements, term)
	}

	/// Forwarded to [`ViewState::set_filter`].
	pub fn set_filter(&mut self, predicate: Option<FilterPredicate>) -> Restyle {
		self.view.set_filter(&self.elements, predicate)
	}

	/// Focus a node programmatically, or clear with `None`.
	pub fn select(&mut self, id: Option<&str>) -> Restyle {
		let restyle = self.view.set_selection(&self.elements, id);
		if let Some(idx) = self.view.focus_index() {
			if !restyle.is_empty() {
				self.notify(idx);
			}
		}
		restyle
	}

	/// Feed one input event through the controller.
	pub fn dispatch(&mut self, event: InteractionEvent, now_ms: u64) -> Vec<Reaction> {
		let mut scene = Scene {
			dataset: &self.dataset,
			elements: &self.elements,
			view: &mut self.view,
			layout: &mut self.layout,
			viewport: &mut self.viewport,
			style: &self.style,
		};
		let reactions = self.controller.dispatch(&mut scene, event, now_ms);
		for reaction in &reactions {
			if let Reaction::NodeSelected(node) = reaction {
				for (_, listener) in &self.listeners {
					listener(node);
				}
			}
		}
		reactions
	}

	/// Advance layout by one frame. Fits the view when a run completes.
	pub fn tick(&mut self, dt_ms: f64) -> LayoutProgress {
		let progress = self.layout.tick(dt_ms);
		if matches!(progress, LayoutProgress::Completed { .. }) {
			self.fit();
		}
		progress
	}

	/// The canvas changed size. Keeps the current transform.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.viewport.resize(width, height);
	}

	/// Release the layout run, listeners and elements. Safe to call twice.
	pub fn teardown(&mut self) {
		self.layout.cancel();
		self.listeners.clear();
		self.controller.reset_gestures();
		self.view.reset();
		self.elements = RenderElements::default();
		self.layout.load(&self.elements);
		self.dataset = Arc::default();
		self.error = None;
	}

	fn notify(&self, idx: usize) {
		if let Some(node) = self.dataset.nodes.get(idx) {
			for (_, listener) in &self.listeners {
				listener(node);
			}
		}
	}

	fn fit(&mut self) {
		let mut scene = Scene {
			dataset: &self.dataset,
			elements: &self.elements,
			view: &mut self.view,
			layout: &mut self.layout,
			viewport: &mut self.viewport,
			style: &self.style,
		};
		scene.fit();
	}

	/// Elements of the dataset on screen.
	pub fn elements(&self) -> &RenderElements {
		&self.elements
	}

	/// Selection, search and filter overlays.
	pub fn view(&self) -> &ViewState {
		&self.view
	}

	/// Layout engine and node positions.
	pub fn layout(&self) -> &LayoutEngine {
		&self.layout
	}

	/// Current pan and zoom.
	pub fn viewport(&self) -> &Viewport {
		&self.viewport
	}

	/// Gesture state, including the hovered node.
	pub fn controller(&self) -> &InteractionController {
		&self.controller
	}

	/// Message of the last rejected dataset.
	pub fn error(&self) -> Option<&str> {
		self.error.as_deref()
	}

	/// Full record of the focused node.
	pub fn focused_node(&self) -> Option<&GraphNode> {
		self.view.focus_index().and_then(|i| self.dataset.nodes.get(i))
	}

	/// Graph-space position of node `idx`.
	pub fn position(&self, idx: usize) -> Option<Point> {
		self.layout.position(idx)
	}

	/// Resolved style of node `idx`.
	pub fn node_style(&self, idx: usize) -> NodeStyle {
		self.style
			.resolve_node(&self.elements.vertices[idx], self.view.node_state(idx))
	}

	/// Resolved style of edge `idx`.
	pub fn edge_style(&self, idx: usize) -> EdgeStyle {
		self.style
			.resolve_edge(&self.elements.links[idx], self.view.link_state(idx))
	}
}

impl Drop for GraphSurface {
	fn drop(&mut self) {
		self.teardown();
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use super::*;
	use crate::components::knowledge_graph::types::GraphEdge;

	fn dataset(target: &str) -> Arc<GraphDataset> {
		let node = |id: &str, name: &str, category: &str| GraphNode {
			id: id.into(),
			name: name.into(),
			category: category.into(),
			importance: None,
			total_degree: None,
			properties: None,
		};
		Arc::new(GraphDataset::new(
			vec![
				node("A", "Pine Wood Nematode", "Pathogen"),
				node("B", "Pine Tree", "Host"),
			],
			vec![GraphEdge {
				id: "e1".into(),
				source: "A".into(),
				target: target.into(),
				relationship: "infects".into(),
				weight: None,
				properties: None,
			}],
		))
	}

	#[test]
	fn same_dataset_does_not_restart_layout() {
		let mut surface = GraphSurface::new(800.0, 600.0, SurfaceConfig::default());
		let data = dataset("B");
		surface.render(data.clone()).unwrap();
		let run = surface.layout().current_run();
		assert!(run.is_some());
		surface.render(data.clone()).unwrap();
		assert_eq!(surface.layout().current_run(), run);
		surface.render(Arc::new((*data).clone())).unwrap();
		assert_ne!(surface.layout().current_run(), run);
	}

	#[test]
	fn new_dataset_resets_overlays() {
		let mut surface = GraphSurface::new(800.0, 600.0, SurfaceConfig::default());
		surface.render(dataset("B")).unwrap();
		surface.select(Some("A"));
		surface.set_search_term("pine");
		surface.render(dataset("B")).unwrap();
		assert_eq!(surface.view().focus_index(), None);
		assert_eq!(surface.view().search_term(), "");
	}

	#[test]
	fn malformed_dataset_is_kept_as_error() {
		let mut surface = GraphSurface::new(800.0, 600.0, SurfaceConfig::default());
		surface.render(dataset("B")).unwrap();
		let bad = dataset("C");
		assert!(surface.render(bad.clone()).is_err());
		assert!(surface.error().is_some_and(|e| e.contains("'C'")));
		assert!(surface.elements().is_empty());
		assert!(!surface.layout().is_running());
		assert!(surface.render(bad).is_err());
		surface.render(dataset("B")).unwrap();
		assert_eq!(surface.error(), None);
	}

	#[test]
	fn empty_dataset_is_idle() {
		let mut surface = GraphSurface::new(800.0, 600.0, SurfaceConfig::default());
		surface.render(Arc::new(GraphDataset::default())).unwrap();
		assert!(surface.elements().is_empty());
		assert_eq!(surface.tick(16.0), LayoutProgress::Idle);
		assert_eq!(surface.error(), None);
	}

	#[test]
	fn listeners_fire_on_select_only() {
		let mut surface = GraphSurface::new(800.0, 600.0, SurfaceConfig::default());
		surface.render(dataset("B")).unwrap();
		let seen = Rc::new(RefCell::new(Vec::new()));
		let sink = seen.clone();
		surface.on_node_selected(move |n| sink.borrow_mut().push(n.id.clone()));
		surface.dispatch(InteractionEvent::TapNode("B".into()), 0);
		surface.dispatch(InteractionEvent::TapCanvas, 0);
		surface.select(Some("A"));
		surface.select(Some("A"));
		assert_eq!(*seen.borrow(), ["B", "A"]);
	}

	#[test]
	fn teardown_drops_listeners_and_run() {
		let mut surface = GraphSurface::new(800.0, 600.0, SurfaceConfig::default());
		surface.render(dataset("B")).unwrap();
		let hits = Rc::new(RefCell::new(0));
		let sink = hits.clone();
		let id = surface.on_node_selected(move |_| *sink.borrow_mut() += 1);
		surface.teardown();
		assert!(!surface.layout().is_running());
		assert!(!surface.remove_listener(id));
		surface.render(dataset("B")).unwrap();
		surface.select(Some("A"));
		assert_eq!(*hits.borrow(), 0);
		surface.teardown();
		surface.teardown();
	}

	#[test]
	fn completed_layout_fits_view() {
		let mut surface = GraphSurface::new(800.0, 600.0, SurfaceConfig::default());
		surface.render(dataset("B")).unwrap();
		surface.dispatch(InteractionEvent::ChooseLayout(LayoutAlgorithm::Grid), 0);
		surface.dispatch(InteractionEvent::ZoomIn, 0);
		while surface.layout().is_running() {
			surface.tick(100.0);
		}
		// Grid extent: two 30px nodes 100 apart -> 130 x 30.
		assert!((surface.viewport().zoom() - 740.0 / 130.0).abs() < 1e-9);
	}
}
