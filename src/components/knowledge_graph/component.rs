use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::controller::{InteractionEvent, Reaction};
use super::layout::LayoutAlgorithm;
use super::overlay::FilterPredicate;
use super::render;
use super::style::StyleResolver;
use super::surface::{GraphSurface, SurfaceConfig};
use super::types::{GraphDataset, GraphNode};

/// Keystrokes closer together than this are folded into one search.
const SEARCH_DEBOUNCE_MS: f64 = 150.0;
/// Longest frame delta fed to the layout, so a backgrounded tab does not jump.
const MAX_FRAME_MS: f64 = 100.0;

type FrameClosure = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Browser resources owned by one mounted canvas. Dropping releases them.
struct CanvasResources {
	surface: Rc<RefCell<Option<GraphSurface>>>,
	animate: FrameClosure,
	frame: Rc<Cell<Option<i32>>>,
	resize_cb: FrameClosure,
}

impl Drop for CanvasResources {
	fn drop(&mut self) {
		if let Some(window) = web_sys::window() {
			if let Some(id) = self.frame.take() {
				let _ = window.cancel_animation_frame(id);
			}
			if let Some(cb) = self.resize_cb.borrow_mut().take() {
				let _ = window
					.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}
		self.animate.borrow_mut().take();
		if let Some(mut surface) = self.surface.borrow_mut().take() {
			surface.teardown();
		}
		debug!("knowledge-graph: canvas resources released");
	}
}

fn canvas_point(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

fn window_size(window: &Window) -> (f64, f64) {
	(
		window
			.inner_width()
			.ok()
			.and_then(|v| v.as_f64())
			.unwrap_or(800.0),
		window
			.inner_height()
			.ok()
			.and_then(|v| v.as_f64())
			.unwrap_or(600.0),
	)
}

/// Interactive knowledge graph canvas.
///
/// `data` is shown as soon as the canvas mounts and re-shown whenever the
/// signal yields a different `Arc`. `search_term` and `filter` are applied as
/// overlays; `on_node_select` receives the full node on every selection.
#[component]
pub fn KnowledgeGraphCanvas(
	/// Dataset to show.
	#[prop(into)]
	data: Signal<Arc<GraphDataset>>,
	/// Label search; empty clears it.
	#[prop(into)]
	search_term: Signal<String>,
	/// Attribute filter; `None` clears it.
	#[prop(into)]
	filter: Signal<Option<FilterPredicate>>,
	/// Called with the full node whenever a node is selected.
	#[prop(optional)]
	on_node_select: Option<Callback<GraphNode>>,
	/// Style, layout and viewport tuning.
	#[prop(optional)]
	config: SurfaceConfig,
	/// Size the canvas to the window.
	#[prop(default = false)]
	fullscreen: bool,
	/// Fixed canvas width in pixels.
	#[prop(default = None)]
	width: Option<f64>,
	/// Fixed canvas height in pixels.
	#[prop(default = None)]
	height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let surface: Rc<RefCell<Option<GraphSurface>>> = Rc::new(RefCell::new(None));
	let animate: FrameClosure = Rc::new(RefCell::new(None));
	let resize_cb: FrameClosure = Rc::new(RefCell::new(None));
	let frame: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
	let pending_search: Rc<RefCell<Option<(String, f64)>>> = Rc::new(RefCell::new(None));

	let error = RwSignal::new(None::<String>);
	let menu_open = RwSignal::new(false);
	let legend = StyleResolver::new(config.style.clone()).legend();

	let resources = StoredValue::new_local(Some(CanvasResources {
		surface: surface.clone(),
		animate: animate.clone(),
		frame: frame.clone(),
		resize_cb: resize_cb.clone(),
	}));
	on_cleanup(move || {
		let _ = resources.try_update_value(|r| r.take());
	});

	let (surface_init, animate_init, resize_cb_init, frame_init, pending_init) = (
		surface.clone(),
		animate.clone(),
		resize_cb.clone(),
		frame.clone(),
		pending_search.clone(),
	);
	Effect::new(move |_| {
		let dataset = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();

		if surface_init.borrow().is_none() {
			let Some(window) = web_sys::window() else {
				return;
			};
			let (w, h) = if fullscreen {
				window_size(&window)
			} else {
				(
					width.unwrap_or_else(|| {
						canvas
							.parent_element()
							.map(|p| p.client_width() as f64)
							.unwrap_or(800.0)
					}),
					height.unwrap_or_else(|| {
						canvas
							.parent_element()
							.map(|p| p.client_height() as f64)
							.unwrap_or(600.0)
					}),
				)
			};
			canvas.set_width(w as u32);
			canvas.set_height(h as u32);

			let ctx: CanvasRenderingContext2d = match canvas
				.get_context("2d")
				.ok()
				.flatten()
				.and_then(|c| c.dyn_into().ok())
			{
				Some(ctx) => ctx,
				None => {
					warn!("knowledge-graph: canvas has no 2d context");
					return;
				}
			};

			let mut new_surface = GraphSurface::new(w, h, config.clone());
			new_surface.on_node_selected(move |node| {
				if let Some(cb) = on_node_select {
					cb.run(node.clone());
				}
			});
			*surface_init.borrow_mut() = Some(new_surface);

			if fullscreen {
				let (surface_resize, canvas_resize) = (surface_init.clone(), canvas.clone());
				*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
					let Some(win) = web_sys::window() else {
						return;
					};
					let (nw, nh) = window_size(&win);
					canvas_resize.set_width(nw as u32);
					canvas_resize.set_height(nh as u32);
					if let Some(ref mut s) = *surface_resize.borrow_mut() {
						s.resize(nw, nh);
					}
				}));
				if let Some(ref cb) = *resize_cb_init.borrow() {
					let _ = window
						.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
				}
			}

			let (surface_anim, animate_inner, frame_inner, pending_anim) = (
				surface_init.clone(),
				animate_init.clone(),
				frame_init.clone(),
				pending_init.clone(),
			);
			let last = Cell::new(js_sys::Date::now());
			*animate_init.borrow_mut() = Some(Closure::new(move || {
				let now = js_sys::Date::now();
				let dt = (now - last.replace(now)).clamp(0.0, MAX_FRAME_MS);
				if let Some(ref mut s) = *surface_anim.borrow_mut() {
					let due = matches!(&*pending_anim.borrow(), Some((_, at)) if *at <= now);
					if due {
						if let Some((term, _)) = pending_anim.borrow_mut().take() {
							s.set_search_term(&term);
						}
					}
					s.tick(dt);
					render::render(s, &ctx);
				}
				if let Some(ref cb) = *animate_inner.borrow() {
					frame_inner.set(web_sys::window().and_then(|w| {
						w.request_animation_frame(cb.as_ref().unchecked_ref()).ok()
					}));
				}
			}));
			if let Some(ref cb) = *animate_init.borrow() {
				frame_init.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
			}
		}

		if let Some(ref mut s) = *surface_init.borrow_mut() {
			match s.render(dataset) {
				Ok(()) => error.set(None),
				Err(e) => error.set(Some(e.to_string())),
			}
			// The host's current inputs still apply to the new dataset.
			s.set_search_term(&search_term.get_untracked());
			s.set_filter(filter.get_untracked());
		}
	});

	let pending_effect = pending_search.clone();
	Effect::new(move |_| {
		let term = search_term.get();
		*pending_effect.borrow_mut() = Some((term, js_sys::Date::now() + SEARCH_DEBOUNCE_MS));
	});

	let surface_filter = surface.clone();
	Effect::new(move |_| {
		let predicate = filter.get();
		if let Some(ref mut s) = *surface_filter.borrow_mut() {
			s.set_filter(predicate);
		}
	});

	let surface_send = surface.clone();
	let send = Rc::new(move |event: InteractionEvent| {
		let reactions = match surface_send.borrow_mut().as_mut() {
			Some(s) => s.dispatch(event, js_sys::Date::now() as u64),
			None => return,
		};
		for reaction in reactions {
			match reaction {
				Reaction::LayoutMenu(open) => menu_open.set(open),
				Reaction::ExportRequested(request) => {
					if let Some(s) = surface_send.borrow().as_ref() {
						if let Err(e) = render::export_png(s, &request) {
							warn!("knowledge-graph: export failed: {:?}", e);
						}
					}
				}
				_ => {}
			}
		}
	});

	let pointer = |make: fn(f64, f64) -> InteractionEvent| {
		let send = send.clone();
		move |ev: MouseEvent| {
			let Some(canvas) = canvas_ref.get() else {
				return;
			};
			let canvas: HtmlCanvasElement = canvas.into();
			let (x, y) = canvas_point(&canvas, &ev);
			send(make(x, y));
		}
	};
	let on_mousedown = pointer(|x, y| InteractionEvent::PointerDown { x, y });
	let on_mousemove = pointer(|x, y| InteractionEvent::PointerMove { x, y });
	let on_mouseup = pointer(|x, y| InteractionEvent::PointerUp { x, y });

	let send_leave = send.clone();
	let on_mouseleave = move |_: MouseEvent| send_leave(InteractionEvent::PointerLeave);

	let send_wheel = send.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = canvas_point(&canvas, &ev);
		send_wheel(InteractionEvent::Wheel {
			x,
			y,
			delta_y: ev.delta_y(),
		});
	};

	let control = |event: InteractionEvent| {
		let send = send.clone();
		move |_: MouseEvent| send(event.clone())
	};

	let layout_items = LayoutAlgorithm::ALL
		.into_iter()
		.map(|algorithm| {
			view! {
				<button class="graph-menu-item" on:click=control(InteractionEvent::ChooseLayout(algorithm))>
					{algorithm.label()}
				</button>
			}
		})
		.collect_view();

	let legend_items = legend
		.into_iter()
		.map(|(category, color)| {
			view! {
				<div class="graph-legend-item">
					<span class="graph-legend-swatch" style:background-color=color />
					<span class="graph-legend-label">{category}</span>
				</div>
			}
		})
		.collect_view();

	view! {
		<div class="knowledge-graph">
			<canvas
				node_ref=canvas_ref
				class="knowledge-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			{move || error.get().map(|msg| view! { <div class="graph-error" role="alert">{msg}</div> })}
			<div class="graph-controls">
				<button title="Fit to canvas" on:click=control(InteractionEvent::Fit)>"⤢"</button>
				<button title="Zoom in" on:click=control(InteractionEvent::ZoomIn)>"+"</button>
				<button title="Zoom out" on:click=control(InteractionEvent::ZoomOut)>"−"</button>
				<button title="Layout" on:click=control(InteractionEvent::ToggleLayoutMenu)>"☰"</button>
				<div
					class="graph-menu"
					style:display=move || if menu_open.get() { "flex" } else { "none" }
				>
					{layout_items}
				</div>
				<button title="Export PNG" on:click=control(InteractionEvent::Export)>"⭳"</button>
			</div>
			<div class="graph-legend">
				<h3>"Categories"</h3>
				{legend_items}
			</div>
		</div>
	}
}
