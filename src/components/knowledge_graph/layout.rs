//! Node placement: an iterative force simulation plus closed-form layouts.
//!
//! The engine runs one layout at a time. Starting a run supersedes whatever was
//! in flight; the superseded run is dropped and never writes positions again.
//! Runs advance cooperatively through [`LayoutEngine::tick`], one animation
//! frame per call.

use std::collections::{HashSet, VecDeque};
use std::f64::consts::PI;

use force_graph::{EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use super::model::RenderElements;

/// Identifies one layout run. Later runs have larger ids.
pub type RunId = u64;

/// The layouts offered by the layout menu.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutAlgorithm {
	/// Physical simulation; the default.
	#[default]
	ForceDirected,
	/// Evenly spaced on one circle.
	Circular,
	/// Row-major square grid.
	Grid,
	/// Rings by degree, highest degree innermost.
	Concentric,
	/// Levels by breadth-first distance from the best-connected node.
	Breadthfirst,
}

impl LayoutAlgorithm {
	/// Menu order.
	pub const ALL: [LayoutAlgorithm; 5] = [
		LayoutAlgorithm::ForceDirected,
		LayoutAlgorithm::Circular,
		LayoutAlgorithm::Grid,
		LayoutAlgorithm::Concentric,
		LayoutAlgorithm::Breadthfirst,
	];

	/// Menu label.
	pub fn label(self) -> &'static str {
		match self {
			LayoutAlgorithm::ForceDirected => "Force-directed",
			LayoutAlgorithm::Circular => "Circular",
			LayoutAlgorithm::Grid => "Grid",
			LayoutAlgorithm::Concentric => "Concentric",
			LayoutAlgorithm::Breadthfirst => "Hierarchical",
		}
	}
}

/// Tuning for every layout. All values are constants, not semantics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutOptions {
	/// Hard cap on simulation steps.
	pub max_iterations: usize,
	/// Simulation steps per animation frame.
	pub iterations_per_tick: usize,
	/// A step is calm when no node moves further than this.
	pub convergence_threshold: f64,
	/// Steps always taken before convergence is considered.
	pub min_iterations: usize,
	/// Consecutive calm steps that count as converged.
	pub settle_steps: usize,
	/// Simulated seconds per step.
	pub time_step: f32,
	/// Repulsion between every pair of nodes.
	pub force_charge: f32,
	/// Edge spring stiffness.
	pub force_spring: f32,
	/// Upper bound on the force applied to one node.
	pub force_max: f32,
	/// Velocity scale of the simulation.
	pub node_speed: f32,
	/// Velocity kept from one step to the next.
	pub damping_factor: f32,
	/// Fraction of the distance to the origin removed per step.
	pub gravity: f64,
	/// Node mass fed to the simulation.
	pub mass: f32,
	/// Distance between neighbours in closed-form layouts.
	pub spacing: f64,
	/// Radius of the seed circle.
	pub initial_radius: f64,
	/// Duration of the animated move to a closed-form layout.
	pub transition_ms: f64,
}

impl Default for LayoutOptions {
	fn default() -> Self {
		Self {
			max_iterations: 1000,
			iterations_per_tick: 20,
			convergence_threshold: 0.5,
			min_iterations: 200,
			settle_steps: 10,
			time_step: 0.016,
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
			gravity: 0.01,
			mass: 10.0,
			spacing: 100.0,
			initial_radius: 100.0,
			transition_ms: 500.0,
		}
	}
}

/// A graph-space position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	fn lerp(self, to: Point, t: f64) -> Point {
		if t >= 1.0 {
			return to;
		}
		Point::new(self.x + (to.x - self.x) * t, self.y + (to.y - self.y) * t)
	}
}

/// Outcome of one [`LayoutEngine::tick`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LayoutProgress {
	/// Nothing running.
	Idle,
	/// The run advanced and is not finished.
	Running(RunId),
	/// The run finished during this tick.
	Completed {
		/// The run that finished.
		run: RunId,
		/// What it laid out.
		algorithm: LayoutAlgorithm,
		/// The simulation hit the iteration cap before converging.
		timed_out: bool,
	},
}

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Evenly spaced points on a circle, starting at the top.
fn ring(n: usize, radius: f64) -> impl Iterator<Item = Point> {
	(0..n).map(move |i| {
		if n == 1 {
			return Point::default();
		}
		let angle = (i as f64) * 2.0 * PI / n as f64 - PI / 2.0;
		Point::new(radius * angle.cos(), radius * angle.sin())
	})
}

fn ring_radius(n: usize, spacing: f64) -> f64 {
	(spacing * n as f64 / (2.0 * PI)).max(spacing)
}

/// Seed placement for a fresh dataset.
pub fn seed_positions(n: usize, options: &LayoutOptions) -> Vec<Point> {
	ring(n, options.initial_radius).collect()
}

/// Closed-form placement for `algorithm`. Force-directed falls back to the seed circle.
pub fn place(
	elements: &RenderElements,
	algorithm: LayoutAlgorithm,
	options: &LayoutOptions,
) -> Vec<Point> {
	let n = elements.len();
	let spacing = options.spacing;
	match algorithm {
		LayoutAlgorithm::ForceDirected => seed_positions(n, options),
		LayoutAlgorithm::Circular => ring(n, ring_radius(n, spacing)).collect(),
		LayoutAlgorithm::Grid => {
			let cols = (n as f64).sqrt().ceil().max(1.0) as usize;
			let rows = n.div_ceil(cols);
			let (ox, oy) = (
				(cols - 1) as f64 * spacing / 2.0,
				rows.saturating_sub(1) as f64 * spacing / 2.0,
			);
			(0..n)
				.map(|i| {
					Point::new(
						(i % cols) as f64 * spacing - ox,
						(i / cols) as f64 * spacing - oy,
					)
				})
				.collect()
		}
		LayoutAlgorithm::Concentric => concentric(elements, spacing),
		LayoutAlgorithm::Breadthfirst => breadthfirst(elements, spacing),
	}
}

fn by_degree_desc(elements: &RenderElements) -> Vec<usize> {
	let mut order: Vec<usize> = (0..elements.len()).collect();
	order.sort_by(|&a, &b| elements.degree(b).cmp(&elements.degree(a)).then(a.cmp(&b)));
	order
}

fn concentric(elements: &RenderElements, spacing: f64) -> Vec<Point> {
	let order = by_degree_desc(elements);
	let Some(&first) = order.first() else {
		return Vec::new();
	};
	let max_degree = elements.degree(first);
	let level_width = (max_degree / 4).max(1);

	let mut levels: Vec<Vec<usize>> = Vec::new();
	let mut current_level = None;
	for idx in order {
		let level = (max_degree - elements.degree(idx)) / level_width;
		if current_level != Some(level) {
			levels.push(Vec::new());
			current_level = Some(level);
		}
		if let Some(last) = levels.last_mut() {
			last.push(idx);
		}
	}

	let mut out = vec![Point::default(); elements.len()];
	let mut radius: f64 = 0.0;
	for (depth, members) in levels.iter().enumerate() {
		radius = if depth == 0 && members.len() == 1 {
			0.0
		} else {
			(radius + spacing).max(ring_radius(members.len(), spacing))
		};
		let points = if members.len() == 1 && radius > 0.0 {
			vec![Point::new(0.0, -radius)]
		} else {
			ring(members.len(), radius).collect()
		};
		for (&idx, p) in members.iter().zip(points) {
			out[idx] = p;
		}
	}
	out
}

fn breadthfirst(elements: &RenderElements, spacing: f64) -> Vec<Point> {
	let n = elements.len();
	let mut depth = vec![usize::MAX; n];
	let mut rows: Vec<Vec<usize>> = Vec::new();
	for root in by_degree_desc(elements) {
		if depth[root] != usize::MAX {
			continue;
		}
		depth[root] = 0;
		let mut queue = VecDeque::from([root]);
		while let Some(idx) = queue.pop_front() {
			let d = depth[idx];
			if rows.len() <= d {
				rows.resize_with(d + 1, Vec::new);
			}
			rows[d].push(idx);
			let mut next: Vec<usize> = elements.neighbors(idx).collect();
			next.sort_unstable();
			next.dedup();
			for nb in next {
				if depth[nb] == usize::MAX {
					depth[nb] = d + 1;
					queue.push_back(nb);
				}
			}
		}
	}

	let mut out = vec![Point::default(); n];
	let oy = rows.len().saturating_sub(1) as f64 * spacing / 2.0;
	for (d, row) in rows.iter().enumerate() {
		let ox = (row.len() - 1) as f64 * spacing / 2.0;
		for (i, &idx) in row.iter().enumerate() {
			out[idx] = Point::new(i as f64 * spacing - ox, d as f64 * spacing - oy);
		}
	}
	out
}

struct Simulation {
	graph: ForceGraph<usize, ()>,
	iteration: usize,
	/// Consecutive steps below the convergence threshold.
	calm: usize,
	seed: Vec<Point>,
}

impl Simulation {
	fn new(
		elements: &RenderElements,
		start: &[Point],
		pinned: &HashSet<usize>,
		options: &LayoutOptions,
	) -> Self {
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: options.force_charge,
			force_spring: options.force_spring,
			force_max: options.force_max,
			node_speed: options.node_speed,
			damping_factor: options.damping_factor,
		});
		let seed = seed_positions(elements.len(), options);
		let handles: Vec<_> = start
			.iter()
			.enumerate()
			.map(|(i, p)| {
				graph.add_node(NodeData {
					x: p.x as f32,
					y: p.y as f32,
					mass: options.mass,
					is_anchor: pinned.contains(&i),
					user_data: i,
				})
			})
			.collect();
		for link in elements.links.iter().filter(|l| l.source != l.target) {
			graph.add_edge(handles[link.source], handles[link.target], EdgeData::default());
		}
		Self {
			graph,
			iteration: 0,
			calm: 0,
			seed,
		}
	}

	/// One simulation step, tracking how long the graph has been calm.
	fn step(&mut self, options: &LayoutOptions, positions: &mut [Point]) {
		let moved = self.advance(options, positions);
		self.calm = if moved < options.convergence_threshold {
			self.calm + 1
		} else {
			0
		};
	}

	/// Velocities start at zero, so an early lull is not a resting state.
	fn converged(&self, options: &LayoutOptions) -> bool {
		self.iteration >= options.min_iterations && self.calm >= options.settle_steps.max(1)
	}

	/// Returns the largest distance any node moved.
	fn advance(&mut self, options: &LayoutOptions, positions: &mut [Point]) -> f64 {
		self.graph.update(options.time_step);
		let gravity = options.gravity as f32;
		self.graph.visit_nodes_mut(|node| {
			if !node.data.is_anchor {
				node.data.x -= node.data.x * gravity;
				node.data.y -= node.data.y * gravity;
			}
		});

		let mut moved: f64 = 0.0;
		let mut lost = Vec::new();
		self.graph.visit_nodes(|node| {
			let i = node.data.user_data;
			let p = Point::new(node.x() as f64, node.y() as f64);
			if p.x.is_finite() && p.y.is_finite() {
				let prev = positions[i];
				moved = moved.max(((p.x - prev.x).powi(2) + (p.y - prev.y).powi(2)).sqrt());
				positions[i] = p;
			} else {
				lost.push(i);
			}
		});
		if !lost.is_empty() {
			let seed = &self.seed;
			self.graph.visit_nodes_mut(|node| {
				let i = node.data.user_data;
				if lost.contains(&i) {
					node.data.x = seed[i].x as f32;
					node.data.y = seed[i].y as f32;
				}
			});
			for &i in &lost {
				positions[i] = self.seed[i];
			}
		}
		self.iteration += 1;
		moved
	}

	fn pin(&mut self, idx: usize, p: Point) {
		self.graph.visit_nodes_mut(|node| {
			if node.data.user_data == idx {
				node.data.x = p.x as f32;
				node.data.y = p.y as f32;
				node.data.is_anchor = true;
			}
		});
	}
}

enum RunKind {
	Simulation(Simulation),
	Transition {
		from: Vec<Point>,
		to: Vec<Point>,
		elapsed_ms: f64,
	},
}

struct ActiveRun {
	id: RunId,
	algorithm: LayoutAlgorithm,
	kind: RunKind,
}

/// Owns node positions and the single in-flight layout run.
pub struct LayoutEngine {
	options: LayoutOptions,
	algorithm: LayoutAlgorithm,
	positions: Vec<Point>,
	pinned: HashSet<usize>,
	active: Option<ActiveRun>,
	last_run: RunId,
}

impl LayoutEngine {
	pub fn new(options: LayoutOptions) -> Self {
		Self {
			options,
			algorithm: LayoutAlgorithm::default(),
			positions: Vec::new(),
			pinned: HashSet::new(),
			active: None,
			last_run: 0,
		}
	}

	pub fn options(&self) -> &LayoutOptions {
		&self.options
	}

	/// Algorithm of the most recent run.
	pub fn algorithm(&self) -> LayoutAlgorithm {
		self.algorithm
	}

	pub fn positions(&self) -> &[Point] {
		&self.positions
	}

	pub fn position(&self, idx: usize) -> Option<Point> {
		self.positions.get(idx).copied()
	}

	/// Id of the in-flight run.
	pub fn current_run(&self) -> Option<RunId> {
		self.active.as_ref().map(|r| r.id)
	}

	pub fn is_running(&self) -> bool {
		self.active.is_some()
	}

	/// Reset for a new set of elements: cancel the run, drop pins, seed positions.
	pub fn load(&mut self, elements: &RenderElements) {
		self.cancel();
		self.pinned.clear();
		self.positions = seed_positions(elements.len(), &self.options);
	}

	/// Drop the in-flight run, if any. Positions stay where they are.
	pub fn cancel(&mut self) {
		if let Some(run) = self.active.take() {
			trace!("layout: discarding run {} ({:?})", run.id, run.algorithm);
		}
	}

	/// Start `algorithm` from the current positions, superseding any run in flight.
	pub fn run(&mut self, elements: &RenderElements, algorithm: LayoutAlgorithm) -> RunId {
		self.cancel();
		if self.positions.len() != elements.len() {
			self.positions = seed_positions(elements.len(), &self.options);
		}
		self.last_run += 1;
		let kind = match algorithm {
			LayoutAlgorithm::ForceDirected => RunKind::Simulation(Simulation::new(
				elements,
				&self.positions,
				&self.pinned,
				&self.options,
			)),
			_ => RunKind::Transition {
				from: self.positions.clone(),
				to: place(elements, algorithm, &self.options),
				elapsed_ms: 0.0,
			},
		};
		debug!(
			"layout: run {} {:?} over {} nodes",
			self.last_run,
			algorithm,
			elements.len()
		);
		self.algorithm = algorithm;
		self.active = Some(ActiveRun {
			id: self.last_run,
			algorithm,
			kind,
		});
		self.last_run
	}

	/// Advance the in-flight run by one frame of `dt_ms` milliseconds.
	pub fn tick(&mut self, dt_ms: f64) -> LayoutProgress {
		let Some(run) = self.active.as_mut() else {
			return LayoutProgress::Idle;
		};
		let (done, timed_out) = match &mut run.kind {
			RunKind::Simulation(sim) => {
				let mut done = false;
				for _ in 0..self.options.iterations_per_tick.max(1) {
					sim.step(&self.options, &mut self.positions);
					if sim.converged(&self.options) {
						done = true;
						break;
					}
					if sim.iteration >= self.options.max_iterations {
						break;
					}
				}
				let timed_out = !done && sim.iteration >= self.options.max_iterations;
				(done || timed_out, timed_out)
			}
			RunKind::Transition {
				from,
				to,
				elapsed_ms,
			} => {
				*elapsed_ms += dt_ms.max(0.0);
				let t = if self.options.transition_ms <= 0.0 {
					1.0
				} else {
					(*elapsed_ms / self.options.transition_ms).min(1.0)
				};
				let eased = ease_out_cubic(t);
				for (i, p) in self.positions.iter_mut().enumerate() {
					if !self.pinned.contains(&i) {
						*p = from[i].lerp(to[i], eased);
					}
				}
				(t >= 1.0, false)
			}
		};
		let id = run.id;
		if !done {
			return LayoutProgress::Running(id);
		}
		let algorithm = run.algorithm;
		self.active = None;
		if timed_out {
			debug!(
				"layout: run {} hit the {} iteration cap, keeping best-effort positions",
				id, self.options.max_iterations
			);
		} else {
			debug!("layout: run {} ({:?}) complete", id, algorithm);
		}
		LayoutProgress::Completed {
			run: id,
			algorithm,
			timed_out,
		}
	}

	/// Tick until the in-flight run completes. Returns its final progress.
	pub fn run_to_completion(&mut self, dt_ms: f64) -> LayoutProgress {
		let mut last = LayoutProgress::Idle;
		while self.is_running() {
			last = self.tick(dt_ms);
		}
		last
	}

	/// Move a node by hand and keep it there for the rest of this dataset.
	pub fn pin(&mut self, idx: usize, p: Point) {
		let Some(slot) = self.positions.get_mut(idx) else {
			return;
		};
		*slot = p;
		self.pinned.insert(idx);
		if let Some(ActiveRun {
			kind: RunKind::Simulation(sim),
			..
		}) = self.active.as_mut()
		{
			sim.pin(idx, p);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::knowledge_graph::model::build;
	use crate::components::knowledge_graph::types::{GraphDataset, GraphEdge, GraphNode};

	fn elements(n: usize, edges: &[(usize, usize)]) -> RenderElements {
		let nodes = (0..n)
			.map(|i| GraphNode {
				id: format!("n{i}"),
				name: format!("Node {i}"),
				category: "host".into(),
				importance: None,
				total_degree: None,
				properties: None,
			})
			.collect();
		let edges = edges
			.iter()
			.enumerate()
			.map(|(i, &(s, t))| GraphEdge {
				id: format!("e{i}"),
				source: format!("n{s}"),
				target: format!("n{t}"),
				relationship: "rel".into(),
				weight: None,
				properties: None,
			})
			.collect();
		build(&GraphDataset::new(nodes, edges)).unwrap()
	}

	fn distinct(points: &[Point]) -> bool {
		points.iter().enumerate().all(|(i, a)| {
			points[i + 1..]
				.iter()
				.all(|b| (a.x - b.x).abs() > 1e-6 || (a.y - b.y).abs() > 1e-6)
		})
	}

	#[test]
	fn closed_form_layouts_place_every_node_apart() {
		let els = elements(7, &[(0, 1), (0, 2), (0, 3), (1, 4), (2, 5), (5, 6)]);
		let options = LayoutOptions::default();
		for algorithm in LayoutAlgorithm::ALL {
			let points = place(&els, algorithm, &options);
			assert_eq!(points.len(), 7, "{algorithm:?}");
			assert!(distinct(&points), "{algorithm:?} overlaps: {points:?}");
		}
	}

	#[test]
	fn grid_is_row_major() {
		let els = elements(4, &[]);
		let points = place(&els, LayoutAlgorithm::Grid, &LayoutOptions::default());
		assert_eq!(points[0], Point::new(-50.0, -50.0));
		assert_eq!(points[1], Point::new(50.0, -50.0));
		assert_eq!(points[3], Point::new(50.0, 50.0));
	}

	#[test]
	fn breadthfirst_levels_follow_hops() {
		let els = elements(4, &[(0, 1), (1, 2), (1, 3)]);
		let points = place(&els, LayoutAlgorithm::Breadthfirst, &LayoutOptions::default());
		// n1 has the highest degree and becomes the root row.
		assert!(points[1].y < points[0].y);
		assert_eq!(points[0].y, points[2].y);
		assert_eq!(points[2].y, points[3].y);
	}

	#[test]
	fn concentric_puts_hub_in_the_middle() {
		let els = elements(5, &[(0, 1), (0, 2), (0, 3), (0, 4)]);
		let points = place(&els, LayoutAlgorithm::Concentric, &LayoutOptions::default());
		assert_eq!(points[0], Point::default());
		assert!(points[1..].iter().all(|p| (p.x.hypot(p.y) - 100.0).abs() < 1e-9));
	}

	#[test]
	fn transition_animates_then_lands_on_target() {
		let els = elements(3, &[(0, 1)]);
		let mut engine = LayoutEngine::new(LayoutOptions::default());
		engine.load(&els);
		let run = engine.run(&els, LayoutAlgorithm::Grid);
		assert_eq!(engine.tick(250.0), LayoutProgress::Running(run));
		let target = place(&els, LayoutAlgorithm::Grid, engine.options());
		assert_ne!(engine.positions(), target.as_slice());
		assert_eq!(
			engine.tick(250.0),
			LayoutProgress::Completed {
				run,
				algorithm: LayoutAlgorithm::Grid,
				timed_out: false
			}
		);
		assert_eq!(engine.positions(), target.as_slice());
		assert_eq!(engine.tick(16.0), LayoutProgress::Idle);
	}

	#[test]
	fn newer_run_supersedes_older_one() {
		let els = elements(6, &[(0, 1), (1, 2), (3, 4)]);
		let mut engine = LayoutEngine::new(LayoutOptions::default());
		engine.load(&els);
		let first = engine.run(&els, LayoutAlgorithm::Circular);
		engine.tick(100.0);
		let second = engine.run(&els, LayoutAlgorithm::Grid);
		assert!(second > first);
		assert_eq!(engine.current_run(), Some(second));
		match engine.run_to_completion(16.0) {
			LayoutProgress::Completed { run, algorithm, .. } => {
				assert_eq!(run, second);
				assert_eq!(algorithm, LayoutAlgorithm::Grid);
			}
			other => panic!("unexpected {other:?}"),
		}
		assert_eq!(
			engine.positions(),
			place(&els, LayoutAlgorithm::Grid, engine.options()).as_slice()
		);
	}

	#[test]
	fn force_directed_is_deterministic_and_finite() {
		let els = elements(8, &[(0, 1), (1, 2), (2, 3), (3, 0), (4, 5), (6, 7), (0, 6)]);
		let run_once = || {
			let mut engine = LayoutEngine::new(LayoutOptions::default());
			engine.load(&els);
			engine.run(&els, LayoutAlgorithm::ForceDirected);
			let progress = engine.run_to_completion(16.0);
			assert!(matches!(progress, LayoutProgress::Completed { .. }));
			engine.positions().to_vec()
		};
		let a = run_once();
		let b = run_once();
		assert_eq!(a, b);
		assert!(a.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
	}

	#[test]
	fn force_directed_spreads_a_tree_off_the_seed_ring() {
		let edges: Vec<_> = (1..30).map(|i| (i, i / 2)).collect();
		let els = elements(30, &edges);
		let options = LayoutOptions::default();
		let seed = seed_positions(30, &options);
		let mut engine = LayoutEngine::new(options.clone());
		engine.load(&els);
		engine.run(&els, LayoutAlgorithm::ForceDirected);

		let mut ticks = 0;
		while engine.is_running() {
			engine.tick(16.0);
			ticks += 1;
		}
		assert!(
			ticks * options.iterations_per_tick >= options.min_iterations,
			"stopped after {ticks} frames"
		);
		let furthest = engine
			.positions()
			.iter()
			.zip(&seed)
			.map(|(p, s)| (p.x - s.x).hypot(p.y - s.y))
			.fold(0.0, f64::max);
		assert!(furthest > 10.0, "nodes stayed on the seed ring: {furthest}");
	}

	#[test]
	fn early_lull_is_not_convergence() {
		let els = elements(4, &[(0, 1), (1, 2), (2, 3)]);
		let options = LayoutOptions {
			convergence_threshold: f64::INFINITY,
			min_iterations: 40,
			settle_steps: 5,
			iterations_per_tick: 10,
			..LayoutOptions::default()
		};
		let mut engine = LayoutEngine::new(options);
		engine.load(&els);
		let run = engine.run(&els, LayoutAlgorithm::ForceDirected);
		for _ in 0..3 {
			assert_eq!(engine.tick(16.0), LayoutProgress::Running(run));
		}
		assert_eq!(
			engine.tick(16.0),
			LayoutProgress::Completed {
				run,
				algorithm: LayoutAlgorithm::ForceDirected,
				timed_out: false
			}
		);
	}

	#[test]
	fn iteration_cap_is_accepted() {
		let els = elements(5, &[(0, 1), (1, 2), (2, 3), (3, 4)]);
		let options = LayoutOptions {
			max_iterations: 3,
			iterations_per_tick: 1,
			convergence_threshold: 0.0,
			..LayoutOptions::default()
		};
		let mut engine = LayoutEngine::new(options);
		engine.load(&els);
		let run = engine.run(&els, LayoutAlgorithm::ForceDirected);
		assert_eq!(engine.tick(16.0), LayoutProgress::Running(run));
		assert_eq!(engine.tick(16.0), LayoutProgress::Running(run));
		assert_eq!(
			engine.tick(16.0),
			LayoutProgress::Completed {
				run,
				algorithm: LayoutAlgorithm::ForceDirected,
				timed_out: true
			}
		);
		assert_eq!(engine.positions().len(), 5);
	}

	#[test]
	fn pinned_nodes_hold_through_transitions() {
		let els = elements(3, &[]);
		let mut engine = LayoutEngine::new(LayoutOptions::default());
		engine.load(&els);
		engine.pin(1, Point::new(500.0, 500.0));
		engine.run(&els, LayoutAlgorithm::Grid);
		engine.run_to_completion(100.0);
		assert_eq!(engine.position(1), Some(Point::new(500.0, 500.0)));
		engine.load(&els);
		assert_ne!(engine.position(1), Some(Point::new(500.0, 500.0)));
	}
}
