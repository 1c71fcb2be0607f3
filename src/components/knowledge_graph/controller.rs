//! Input event table: what each pointer or control event does to the overlays,
//! the layout and the viewport.
//!
//! The controller never sees the DOM. The canvas component translates browser
//! events into [`InteractionEvent`]s in canvas pixel coordinates and acts on the
//! returned [`Reaction`]s.

use super::layout::{LayoutAlgorithm, LayoutEngine, Point, RunId};
use super::model::RenderElements;
use super::overlay::{Restyle, ViewState};
use super::style::StyleResolver;
use super::types::{GraphDataset, GraphNode};
use super::viewport::{Bounds, Viewport};

/// Pointer travel, in pixels, below which a press/release counts as a tap.
pub const TAP_SLOP: f64 = 4.0;
/// Upscale factor of exported images.
pub const EXPORT_SCALE: f64 = 2.0;
/// Background painted under exported images.
pub const EXPORT_BACKGROUND: &str = "#ffffff";

/// Input understood by the controller. Coordinates are canvas pixels.
#[derive(Clone, Debug, PartialEq)]
pub enum InteractionEvent {
	/// Press and release without travel; resolved to `TapNode` or `TapCanvas`.
	Tap {
		/// Canvas x.
		x: f64,
		/// Canvas y.
		y: f64,
	},
	/// Tap on a node.
	TapNode(String),
	/// Tap on empty canvas.
	TapCanvas,
	/// Zoom in one step about the canvas center.
	ZoomIn,
	/// Zoom out one step about the canvas center.
	ZoomOut,
	/// Fit every element into view.
	Fit,
	/// Mouse wheel; negative `delta_y` zooms in.
	Wheel {
		/// Cursor x.
		x: f64,
		/// Cursor y.
		y: f64,
		/// Scroll amount.
		delta_y: f64,
	},
	/// Button pressed. Starts a node drag or a pan.
	PointerDown {
		/// Canvas x.
		x: f64,
		/// Canvas y.
		y: f64,
	},
	/// Pointer moved, with or without a button held.
	PointerMove {
		/// Canvas x.
		x: f64,
		/// Canvas y.
		y: f64,
	},
	/// Button released. Short travel turns into a tap.
	PointerUp {
		/// Canvas x.
		x: f64,
		/// Canvas y.
		y: f64,
	},
	/// Pointer left the canvas; ends any drag.
	PointerLeave,
	/// Open or close the layout choice menu.
	ToggleLayoutMenu,
	/// Re-run layout with the chosen algorithm.
	ChooseLayout(LayoutAlgorithm),
	/// Rasterize the canvas for download.
	Export,
}

/// What the host should do after an event.
#[derive(Clone, Debug, PartialEq)]
pub enum Reaction {
	/// Selection moved to this node. Forward to node-selected listeners.
	NodeSelected(GraphNode),
	/// Selection was cleared.
	SelectionCleared,
	/// These elements changed visual state.
	Restyled(Restyle),
	/// Pan or zoom changed.
	ViewportChanged,
	/// A layout run started.
	LayoutStarted(RunId),
	/// The layout menu opened (`true`) or closed (`false`).
	LayoutMenu(bool),
	/// Produce a PNG download.
	ExportRequested(ExportRequest),
}

/// Parameters of an image export.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportRequest {
	/// Suggested download name.
	pub file_name: String,
	/// Pixel ratio of the image relative to the canvas.
	pub scale: f64,
	/// CSS color filled before painting.
	pub background: &'static str,
}

impl ExportRequest {
	/// Request stamped with `now_ms` in the file name.
	pub fn at(now_ms: u64) -> Self {
		Self {
			file_name: format!("knowledge-graph-{now_ms}.png"),
			scale: EXPORT_SCALE,
			background: EXPORT_BACKGROUND,
		}
	}
}

/// Borrowed view of the surface state the controller mutates.
pub struct Scene<'a> {
	pub dataset: &'a GraphDataset,
	pub elements: &'a RenderElements,
	pub view: &'a mut ViewState,
	pub layout: &'a mut LayoutEngine,
	pub viewport: &'a mut Viewport,
	pub style: &'a StyleResolver,
}

impl Scene<'_> {
	/// Topmost vertex under the screen point.
	pub fn node_at(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.viewport.screen_to_graph(sx, sy);
		// Later vertices are drawn on top, so search back to front.
		(0..self.elements.len()).rev().find(|&i| {
			let Some(p) = self.layout.position(i) else {
				return false;
			};
			let radius = self.style.size_for(self.elements.vertices[i].total_degree) / 2.0;
			(p.x - gx).hypot(p.y - gy) < radius
		})
	}

	/// Extent of every node including its radius.
	pub fn bounds(&self) -> Option<Bounds> {
		Bounds::around(self.layout.positions().iter().enumerate().map(|(i, p)| {
			let radius = self.style.size_for(self.elements.vertices[i].total_degree) / 2.0;
			(p.x, p.y, radius)
		}))
	}

	pub fn fit(&mut self) {
		let bounds = self.bounds();
		self.viewport.fit(bounds);
	}
}

#[derive(Clone, Debug, Default)]
struct Press {
	start_x: f64,
	start_y: f64,
	last_x: f64,
	last_y: f64,
	node: Option<usize>,
	node_start: Point,
	moved: bool,
}

/// Gesture and menu state, plus the event table.
#[derive(Clone, Debug, Default)]
pub struct InteractionController {
	layout_menu_open: bool,
	press: Option<Press>,
	hover: Option<usize>,
}

impl InteractionController {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn layout_menu_open(&self) -> bool {
		self.layout_menu_open
	}

	/// Vertex under the pointer while no button is held.
	pub fn hovered(&self) -> Option<usize> {
		self.hover
	}

	/// True while a node drag or a pan is in progress.
	pub fn is_dragging(&self) -> bool {
		self.press.as_ref().is_some_and(|p| p.moved)
	}

	/// Forget gestures in progress. Menu state survives.
	pub fn reset_gestures(&mut self) {
		self.press = None;
		self.hover = None;
	}

	/// Apply `event` to `scene`. `now_ms` is the wall clock, used to name exports.
	pub fn dispatch(
		&mut self,
		scene: &mut Scene<'_>,
		event: InteractionEvent,
		now_ms: u64,
	) -> Vec<Reaction> {
		match event {
			InteractionEvent::Tap { x, y } => {
				let next = match scene.node_at(x, y) {
					Some(idx) => InteractionEvent::TapNode(scene.elements.vertices[idx].id.clone()),
					None => InteractionEvent::TapCanvas,
				};
				self.dispatch(scene, next, now_ms)
			}
			InteractionEvent::TapNode(id) => {
				let already = scene.view.focus(scene.elements) == Some(id.as_str());
				let target = (!already).then_some(id.as_str());
				let restyle = scene.view.set_selection(scene.elements, target);
				let mut out = vec![Reaction::Restyled(restyle)];
				match scene.view.focus_index() {
					Some(idx) => out.push(Reaction::NodeSelected(scene.dataset.nodes[idx].clone())),
					None => out.push(Reaction::SelectionCleared),
				}
				out
			}
			InteractionEvent::TapCanvas => {
				let restyle = scene.view.set_selection(scene.elements, None);
				vec![Reaction::Restyled(restyle), Reaction::SelectionCleared]
			}
			InteractionEvent::ZoomIn => {
				scene.viewport.zoom_in();
				vec![Reaction::ViewportChanged]
			}
			InteractionEvent::ZoomOut => {
				scene.viewport.zoom_out();
				vec![Reaction::ViewportChanged]
			}
			InteractionEvent::Fit => {
				scene.fit();
				vec![Reaction::ViewportChanged]
			}
			InteractionEvent::Wheel { x, y, delta_y } => {
				let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
				scene.viewport.zoom_at(factor, x, y);
				vec![Reaction::ViewportChanged]
			}
			InteractionEvent::PointerDown { x, y } => {
				let node = scene.node_at(x, y);
				let node_start = node.and_then(|i| scene.layout.position(i)).unwrap_or_default();
				self.hover = None;
				self.press = Some(Press {
					start_x: x,
					start_y: y,
					last_x: x,
					last_y: y,
					node,
					node_start,
					moved: false,
				});
				Vec::new()
			}
			InteractionEvent::PointerMove { x, y } => {
				let Some(press) = self.press.as_mut() else {
					self.hover = scene.node_at(x, y);
					return Vec::new();
				};
				if !press.moved && (x - press.start_x).hypot(y - press.start_y) < TAP_SLOP {
					return Vec::new();
				}
				press.moved = true;
				let k = scene.viewport.zoom();
				let out = match press.node {
					Some(idx) => {
						let p = Point::new(
							press.node_start.x + (x - press.start_x) / k,
							press.node_start.y + (y - press.start_y) / k,
						);
						scene.layout.pin(idx, p);
						Vec::new()
					}
					None => {
						scene.viewport.pan_by(x - press.last_x, y - press.last_y);
						vec![Reaction::ViewportChanged]
					}
				};
				press.last_x = x;
				press.last_y = y;
				out
			}
			InteractionEvent::PointerUp { x, y } => match self.press.take() {
				Some(press) if !press.moved => self.dispatch(scene, InteractionEvent::Tap { x, y }, now_ms),
				_ => Vec::new(),
			},
			InteractionEvent::PointerLeave => {
				self.reset_gestures();
				Vec::new()
			}
			InteractionEvent::ToggleLayoutMenu => {
				self.layout_menu_open = !self.layout_menu_open;
				vec![Reaction::LayoutMenu(self.layout_menu_open)]
			}
			InteractionEvent::ChooseLayout(algorithm) => {
				let run = scene.layout.run(scene.elements, algorithm);
				let mut out = vec![Reaction::LayoutStarted(run)];
				if std::mem::take(&mut self.layout_menu_open) {
					out.push(Reaction::LayoutMenu(false));
				}
				out
			}
			InteractionEvent::Export => vec![Reaction::ExportRequested(ExportRequest::at(now_ms))],
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::knowledge_graph::layout::LayoutOptions;
	use crate::components::knowledge_graph::model::build;
	use crate::components::knowledge_graph::types::GraphEdge;
	use crate::components::knowledge_graph::viewport::ViewportConfig;

	struct Fixture {
		dataset: GraphDataset,
		elements: RenderElements,
		view: ViewState,
		layout: LayoutEngine,
		viewport: Viewport,
		style: StyleResolver,
		controller: InteractionController,
	}

	impl Fixture {
		fn new() -> Self {
			let node = |id: &str, name: &str, category: &str| GraphNode {
				id: id.into(),
				name: name.into(),
				category: category.into(),
				importance: None,
				total_degree: None,
				properties: None,
			};
			let dataset = GraphDataset::new(
				vec![
					node("A", "Pine Wood Nematode", "Pathogen"),
					node("B", "Pine Tree", "Host"),
				],
				vec![GraphEdge {
					id: "e1".into(),
					source: "A".into(),
					target: "B".into(),
					relationship: "infects".into(),
					weight: None,
					properties: None,
				}],
			);
			let elements = build(&dataset).unwrap();
			let mut layout = LayoutEngine::new(LayoutOptions::default());
			layout.load(&elements);
			// Grid with two nodes: A at (-50, 0), B at (50, 0).
			layout.run(&elements, LayoutAlgorithm::Grid);
			layout.run_to_completion(500.0);
			Self {
				dataset,
				elements,
				view: ViewState::new(),
				layout,
				viewport: Viewport::new(400.0, 400.0, ViewportConfig::default()),
				style: StyleResolver::default(),
				controller: InteractionController::new(),
			}
		}

		fn send(&mut self, event: InteractionEvent) -> Vec<Reaction> {
			let mut scene = Scene {
				dataset: &self.dataset,
				elements: &self.elements,
				view: &mut self.view,
				layout: &mut self.layout,
				viewport: &mut self.viewport,
				style: &self.style,
			};
			self.controller.dispatch(&mut scene, event, 1_700_000_000_000)
		}
	}

	fn selected(reactions: &[Reaction]) -> Option<&GraphNode> {
		reactions.iter().find_map(|r| match r {
			Reaction::NodeSelected(node) => Some(node),
			_ => None,
		})
	}

	#[test]
	fn tap_on_node_selects_and_reports_it() {
		let mut f = Fixture::new();
		// Viewport origin is the canvas center; A sits 50px left of it.
		let reactions = f.send(InteractionEvent::Tap { x: 150.0, y: 200.0 });
		assert_eq!(selected(&reactions).map(|n| n.id.as_str()), Some("A"));
		assert_eq!(f.view.focus(&f.elements), Some("A"));
	}

	#[test]
	fn tap_on_blank_canvas_clears() {
		let mut f = Fixture::new();
		f.send(InteractionEvent::TapNode("B".into()));
		let reactions = f.send(InteractionEvent::Tap { x: 10.0, y: 10.0 });
		assert!(reactions.contains(&Reaction::SelectionCleared));
		assert_eq!(f.view.focus_index(), None);
		assert!(f.view.neighborhood(&f.elements).is_empty());
	}

	#[test]
	fn tapping_the_focused_node_again_clears() {
		let mut f = Fixture::new();
		f.send(InteractionEvent::TapNode("A".into()));
		let reactions = f.send(InteractionEvent::TapNode("A".into()));
		assert!(selected(&reactions).is_none());
		assert!(reactions.contains(&Reaction::SelectionCleared));
	}

	#[test]
	fn press_and_release_in_place_is_a_tap() {
		let mut f = Fixture::new();
		f.send(InteractionEvent::PointerDown { x: 250.0, y: 200.0 });
		f.send(InteractionEvent::PointerMove { x: 251.0, y: 201.0 });
		let reactions = f.send(InteractionEvent::PointerUp { x: 251.0, y: 201.0 });
		assert_eq!(selected(&reactions).map(|n| n.id.as_str()), Some("B"));
	}

	#[test]
	fn dragging_a_node_pins_it_without_selecting() {
		let mut f = Fixture::new();
		f.send(InteractionEvent::PointerDown { x: 250.0, y: 200.0 });
		f.send(InteractionEvent::PointerMove { x: 270.0, y: 230.0 });
		assert!(f.controller.is_dragging());
		let reactions = f.send(InteractionEvent::PointerUp { x: 270.0, y: 230.0 });
		assert!(reactions.is_empty());
		assert_eq!(f.layout.position(1), Some(Point::new(70.0, 30.0)));
		assert_eq!(f.view.focus_index(), None);
	}

	#[test]
	fn dragging_the_background_pans() {
		let mut f = Fixture::new();
		f.send(InteractionEvent::PointerDown { x: 10.0, y: 10.0 });
		f.send(InteractionEvent::PointerMove { x: 40.0, y: 30.0 });
		f.send(InteractionEvent::PointerUp { x: 40.0, y: 30.0 });
		assert_eq!((f.viewport.transform.x, f.viewport.transform.y), (230.0, 220.0));
	}

	#[test]
	fn zoom_controls_step_by_fixed_factor() {
		let mut f = Fixture::new();
		f.send(InteractionEvent::ZoomIn);
		assert!((f.viewport.zoom() - 1.2).abs() < 1e-9);
		f.send(InteractionEvent::ZoomOut);
		f.send(InteractionEvent::ZoomOut);
		assert!((f.viewport.zoom() - 1.0 / 1.2).abs() < 1e-9);
	}

	#[test]
	fn choosing_a_layout_closes_the_menu() {
		let mut f = Fixture::new();
		assert_eq!(f.send(InteractionEvent::ToggleLayoutMenu), [Reaction::LayoutMenu(true)]);
		let reactions = f.send(InteractionEvent::ChooseLayout(LayoutAlgorithm::Circular));
		assert!(matches!(reactions[0], Reaction::LayoutStarted(_)));
		assert_eq!(reactions[1], Reaction::LayoutMenu(false));
		assert!(!f.controller.layout_menu_open());
		assert!(f.layout.is_running());
	}

	#[test]
	fn export_names_file_by_timestamp() {
		let mut f = Fixture::new();
		let reactions = f.send(InteractionEvent::Export);
		assert_eq!(
			reactions,
			[Reaction::ExportRequested(ExportRequest {
				file_name: "knowledge-graph-1700000000000.png".into(),
				scale: 2.0,
				background: "#ffffff",
			})]
		);
	}

	#[test]
	fn fit_frames_all_nodes() {
		let mut f = Fixture::new();
		f.send(InteractionEvent::ZoomIn);
		f.send(InteractionEvent::Fit);
		// Extent is 130 x 30 graph units; 340px of width available.
		assert!((f.viewport.zoom() - 340.0 / 130.0).abs() < 1e-9);
	}
}
