//! Pan/zoom transform between graph space and canvas pixels.

use serde::{Deserialize, Serialize};

/// Zoom and fit constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
	/// Multiplier per zoom-in click.
	pub zoom_step: f64,
	/// Lowest zoom, relative to the fit baseline.
	pub min_zoom: f64,
	/// Highest zoom, relative to the fit baseline.
	pub max_zoom: f64,
	/// Pixels kept free around the graph when fitting.
	pub fit_padding: f64,
}

impl Default for ViewportConfig {
	fn default() -> Self {
		Self {
			zoom_step: 1.2,
			min_zoom: 0.1,
			max_zoom: 3.0,
			fit_padding: 30.0,
		}
	}
}

/// Screen position = graph position * k + (x, y).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self { x: 0.0, y: 0.0, k: 1.0 }
	}
}

/// Axis-aligned extent in graph space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	pub min_x: f64,
	pub min_y: f64,
	pub max_x: f64,
	pub max_y: f64,
}

impl Bounds {
	/// Smallest box holding every circle `(x, y, radius)`. `None` when empty.
	pub fn around(circles: impl IntoIterator<Item = (f64, f64, f64)>) -> Option<Self> {
		circles.into_iter().fold(None, |acc, (x, y, r)| {
			let b = Bounds {
				min_x: x - r,
				min_y: y - r,
				max_x: x + r,
				max_y: y + r,
			};
			Some(match acc {
				None => b,
				Some(a) => Bounds {
					min_x: a.min_x.min(b.min_x),
					min_y: a.min_y.min(b.min_y),
					max_x: a.max_x.max(b.max_x),
					max_y: a.max_y.max(b.max_y),
				},
			})
		})
	}

	pub fn width(&self) -> f64 {
		self.max_x - self.min_x
	}

	pub fn height(&self) -> f64 {
		self.max_y - self.min_y
	}

	pub fn center(&self) -> (f64, f64) {
		(
			(self.min_x + self.max_x) / 2.0,
			(self.min_y + self.max_y) / 2.0,
		)
	}
}

/// The canvas window onto the graph.
#[derive(Clone, Debug)]
pub struct Viewport {
	pub transform: ViewTransform,
	pub width: f64,
	pub height: f64,
	baseline: f64,
	config: ViewportConfig,
}

impl Viewport {
	pub fn new(width: f64, height: f64, config: ViewportConfig) -> Self {
		Self {
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			width,
			height,
			baseline: 1.0,
			config,
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	pub fn zoom(&self) -> f64 {
		self.transform.k
	}

	/// Zoom reached by the last fit; the clamp range is relative to it.
	pub fn baseline(&self) -> f64 {
		self.baseline
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn graph_to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
		(
			gx * self.transform.k + self.transform.x,
			gy * self.transform.k + self.transform.y,
		)
	}

	/// Multiply zoom by `factor`, keeping the graph point under `(sx, sy)` fixed.
	pub fn zoom_at(&mut self, factor: f64, sx: f64, sy: f64) {
		let (lo, hi) = (
			self.config.min_zoom * self.baseline,
			self.config.max_zoom * self.baseline,
		);
		let new_k = (self.transform.k * factor).clamp(lo, hi);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn zoom_in(&mut self) {
		self.zoom_at(self.config.zoom_step, self.width / 2.0, self.height / 2.0);
	}

	pub fn zoom_out(&mut self) {
		self.zoom_at(1.0 / self.config.zoom_step, self.width / 2.0, self.height / 2.0);
	}

	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.transform.x += dx;
		self.transform.y += dy;
	}

	/// Center `bounds` with the configured padding and make that zoom the new baseline.
	pub fn fit(&mut self, bounds: Option<Bounds>) {
		let Some(bounds) = bounds else {
			self.transform = ViewTransform {
				x: self.width / 2.0,
				y: self.height / 2.0,
				k: 1.0,
			};
			self.baseline = 1.0;
			return;
		};
		let pad = self.config.fit_padding;
		let (avail_w, avail_h) = (
			(self.width - 2.0 * pad).max(1.0),
			(self.height - 2.0 * pad).max(1.0),
		);
		let fits = [avail_w / bounds.width(), avail_h / bounds.height()];
		let k = fits
			.into_iter()
			.filter(|k| k.is_finite() && *k > 0.0)
			.fold(f64::INFINITY, f64::min);
		let k = if k.is_finite() { k } else { 1.0 };
		let (cx, cy) = bounds.center();
		self.transform = ViewTransform {
			x: self.width / 2.0 - cx * k,
			y: self.height / 2.0 - cy * k,
			k,
		};
		self.baseline = k;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn close(a: f64, b: f64) -> bool {
		(a - b).abs() < 1e-9
	}

	#[test]
	fn fit_centers_and_pads() {
		let mut vp = Viewport::new(800.0, 600.0, ViewportConfig::default());
		vp.fit(Bounds::around([(0.0, 0.0, 10.0), (200.0, 100.0, 10.0)]));
		// 740 / 220 vs 540 / 120: width limits.
		assert!(close(vp.zoom(), 740.0 / 220.0));
		let (sx, sy) = vp.graph_to_screen(100.0, 50.0);
		assert!(close(sx, 400.0) && close(sy, 300.0));
		let (left, _) = vp.graph_to_screen(-10.0, 0.0);
		assert!(close(left, 30.0));
	}

	#[test]
	fn zoom_is_clamped_relative_to_baseline() {
		let mut vp = Viewport::new(800.0, 600.0, ViewportConfig::default());
		vp.fit(Bounds::around([(0.0, 0.0, 270.0)]));
		let base = vp.baseline();
		assert!(close(base, 1.0));
		for _ in 0..50 {
			vp.zoom_in();
		}
		assert!(close(vp.zoom(), 3.0 * base));
		for _ in 0..100 {
			vp.zoom_out();
		}
		assert!(close(vp.zoom(), 0.1 * base));
	}

	#[test]
	fn zoom_in_then_out_is_identity() {
		let mut vp = Viewport::new(400.0, 400.0, ViewportConfig::default());
		let before = vp.transform;
		vp.zoom_in();
		assert!(close(vp.zoom(), 1.2));
		vp.zoom_out();
		assert!(close(vp.transform.k, before.k));
		assert!(close(vp.transform.x, before.x));
	}

	#[test]
	fn wheel_zoom_keeps_anchor_fixed() {
		let mut vp = Viewport::new(400.0, 400.0, ViewportConfig::default());
		let anchor = vp.screen_to_graph(50.0, 80.0);
		vp.zoom_at(1.5, 50.0, 80.0);
		let after = vp.screen_to_graph(50.0, 80.0);
		assert!(close(anchor.0, after.0) && close(anchor.1, after.1));
	}

	#[test]
	fn fit_of_nothing_resets() {
		let mut vp = Viewport::new(400.0, 200.0, ViewportConfig::default());
		vp.pan_by(30.0, 30.0);
		vp.fit(None);
		assert_eq!(vp.transform, ViewTransform { x: 200.0, y: 100.0, k: 1.0 });
	}
}
