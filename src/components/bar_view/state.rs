use std::collections::BTreeSet;

use log::debug;

use crate::components::color::Rgb;
use crate::playback::{Fade, Scene, Transition};

/// Band padding between bars, as a fraction of one band step.
pub const BAND_PADDING: f64 = 0.2;
/// Headroom above the tallest bar.
pub const DOMAIN_HEADROOM: f64 = 1.1;
const MIN_ZOOM: f64 = 0.5;
const MAX_ZOOM: f64 = 3.0;

/// What a bar currently stands for in the partition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BarRole {
	/// Not highlighted.
	#[default]
	Default,
	/// The pivot of the current partition.
	Pivot,
	/// Compared against the pivot.
	Comparing,
	/// Being swapped.
	Swapping,
	/// In its final position.
	Sorted,
}

impl BarRole {
	/// Fill colour of a bar in this role.
	pub fn color(self) -> Rgb {
		match self {
			Self::Default => Rgb::hex(0x4f8fca),
			Self::Pivot => Rgb::hex(0xff5722),
			Self::Comparing => Rgb::hex(0xffeb3b),
			Self::Swapping => Rgb::hex(0x9c27b0),
			Self::Sorted => Rgb::hex(0x4caf50),
		}
	}
}

/// One array element: its height and its role colour, both fading.
#[derive(Clone, Debug)]
pub(crate) struct Bar {
	pub value: Fade<f64>,
	role: BarRole,
	pub tint: Fade<Rgb>,
}

impl Bar {
	fn new(value: f64) -> Self {
		Self {
			value: Fade::new(value),
			role: BarRole::Default,
			tint: Fade::new(BarRole::Default.color()),
		}
	}

	pub fn role(&self) -> BarRole {
		self.role
	}

	fn set_role(&mut self, role: BarRole, transition: Transition) {
		self.role = role;
		self.tint.set(role.color(), transition);
	}
}

/// Horizontal placement of `n` bars across `width`, with [`BAND_PADDING`]
/// on both sides and between bars.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Band {
	pub step: f64,
	pub bandwidth: f64,
	pub start: f64,
}

impl Band {
	pub fn new(n: usize, width: f64) -> Self {
		let step = width / (n.max(1) as f64 + BAND_PADDING);
		Self {
			step,
			bandwidth: step * (1.0 - BAND_PADDING),
			start: step * BAND_PADDING,
		}
	}

	/// Left edge of bar `i`.
	pub fn x(&self, i: usize) -> f64 {
		self.start + self.step * i as f64
	}

	/// Horizontal center of bar `i`.
	pub fn center(&self, i: usize) -> f64 {
		self.x(i) + self.bandwidth / 2.0
	}
}

/// Scene of a sorting visualization: one bar per array element, the
/// partition pointers and the active subarray.
pub struct BarScene {
	initial: Vec<f64>,
	bars: Vec<Bar>,
	domain: Fade<f64>,
	sorted: BTreeSet<usize>,
	pointers: (Option<i64>, Option<i64>),
	range: Option<(usize, usize)>,
	pub(crate) width: f64,
	pub(crate) height: f64,
	pub(crate) zoom: f64,
	transition_ms: f64,
}

fn domain_of(values: &[f64]) -> f64 {
	let max = values.iter().copied().fold(0.0_f64, f64::max);
	if max > 0.0 { max * DOMAIN_HEADROOM } else { 1.0 }
}

impl BarScene {
	/// A scene over `array`, with role colours fading over `transition_ms`.
	pub fn new(array: Vec<f64>, width: f64, height: f64, transition_ms: f64) -> Self {
		Self {
			bars: array.iter().copied().map(Bar::new).collect(),
			domain: Fade::new(domain_of(&array)),
			initial: array,
			sorted: BTreeSet::new(),
			pointers: (None, None),
			range: None,
			width,
			height,
			zoom: 1.0,
			transition_ms,
		}
	}

	/// Number of bars.
	pub fn len(&self) -> usize {
		self.bars.len()
	}

	/// Whether there are no bars.
	pub fn is_empty(&self) -> bool {
		self.bars.is_empty()
	}

	pub(crate) fn bars(&self) -> &[Bar] {
		&self.bars
	}

	/// The values the bars are heading to.
	pub fn values(&self) -> Vec<f64> {
		self.bars.iter().map(|b| b.value.target()).collect()
	}

	/// Top of the value axis.
	pub fn domain(&self) -> &Fade<f64> {
		&self.domain
	}

	/// Role of bar `i`.
	pub fn role(&self, i: usize) -> Option<BarRole> {
		self.bars.get(i).map(Bar::role)
	}

	/// The `(i, j)` partition pointers.
	pub fn pointers(&self) -> (Option<i64>, Option<i64>) {
		self.pointers
	}

	/// The active subarray, inclusive.
	pub fn range(&self) -> Option<(usize, usize)> {
		self.range
	}

	/// Replaces the displayed array. A different length rebinds the bars to
	/// the new indices instead of animating heights.
	pub fn show_array(&mut self, values: &[f64], transition: Transition) {
		if values.len() != self.bars.len() {
			debug!("rebinding {} bars to {}", self.bars.len(), values.len());
			self.bars = values.iter().copied().map(Bar::new).collect();
			self.sorted.retain(|&i| i < values.len());
			self.range = self.range.filter(|&(_, high)| high < values.len());
			self.restore_roles(Transition::Instant);
		} else {
			for (bar, &value) in self.bars.iter_mut().zip(values) {
				if bar.value.target() != value {
					bar.value.set(value, transition);
				}
			}
		}
		let domain = domain_of(values);
		if self.domain.target() != domain {
			self.domain.set(domain, transition);
		}
	}

	/// Drops pivot, comparing and swapping highlights; sorted bars stay.
	pub fn clear_transient(&mut self, transition: Transition) {
		self.restore_roles(transition);
	}

	fn restore_roles(&mut self, transition: Transition) {
		for (i, bar) in self.bars.iter_mut().enumerate() {
			let role = if self.sorted.contains(&i) {
				BarRole::Sorted
			} else {
				BarRole::Default
			};
			if bar.role != role {
				bar.set_role(role, transition);
			}
		}
	}

	/// Paints the listed bars. `Sorted` is remembered until reset.
	pub fn paint(&mut self, indices: &[usize], role: BarRole, transition: Transition) {
		for &i in indices {
			if role == BarRole::Sorted {
				self.sorted.insert(i);
			}
			if let Some(bar) = self.bars.get_mut(i) {
				bar.set_role(role, transition);
			}
		}
	}

	/// Replaces both partition pointers.
	pub fn set_pointers(&mut self, i: Option<i64>, j: Option<i64>) {
		self.pointers = (i, j);
	}

	/// Replaces the bracketed subarray.
	pub fn set_range(&mut self, range: Option<(usize, usize)>) {
		self.range = range;
	}

	pub(crate) fn band(&self, inner_width: f64) -> Band {
		Band::new(self.bars.len(), inner_width)
	}

	/// Scales the chart, clamped.
	pub fn zoom_by(&mut self, factor: f64) {
		self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
	}

	/// Back to 1:1.
	pub fn reset_view(&mut self) {
		self.zoom = 1.0;
	}

	/// Follows the canvas size.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

impl Scene for BarScene {
	fn reset(&mut self) {
		self.bars = self.initial.iter().copied().map(Bar::new).collect();
		self.domain = Fade::new(domain_of(&self.initial));
		self.sorted.clear();
		self.pointers = (None, None);
		self.range = None;
	}

	fn advance(&mut self, dt_ms: f64) {
		let duration = self.transition_ms;
		for bar in &mut self.bars {
			bar.value.advance(dt_ms, duration);
			bar.tint.advance(dt_ms, duration);
		}
		self.domain.advance(dt_ms, duration);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn scene() -> BarScene {
		BarScene::new(vec![5.0, 3.0, 8.0, 1.0], 600.0, 400.0, 500.0)
	}

	fn close(a: f64, b: f64) -> bool {
		(a - b).abs() < 1e-9
	}

	#[test]
	fn band_layout_pads_both_sides() {
		let band = Band::new(4, 420.0);
		assert!(close(band.step, 100.0));
		assert!(close(band.bandwidth, 80.0));
		assert!(close(band.x(0), 20.0));
		assert!(close(band.center(3), 360.0));
		// Last bar ends one padding short of the edge.
		assert!(close(band.x(3) + band.bandwidth + band.start, 420.0));
	}

	#[test]
	fn domain_leaves_headroom() {
		let s = scene();
		assert!(close(s.domain().target(), 8.8));
		let empty = BarScene::new(vec![], 600.0, 400.0, 500.0);
		assert_eq!(empty.domain().target(), 1.0);
	}

	#[test]
	fn sorted_marks_survive_transient_clears() {
		let mut s = scene();
		s.paint(&[0], BarRole::Sorted, Transition::Instant);
		s.paint(&[0, 2], BarRole::Comparing, Transition::Instant);
		assert_eq!(s.role(0), Some(BarRole::Comparing));
		s.clear_transient(Transition::Instant);
		assert_eq!(s.role(0), Some(BarRole::Sorted));
		assert_eq!(s.role(2), Some(BarRole::Default));
	}

	#[test]
	fn role_colours_fade_in() {
		let mut s = scene();
		s.paint(&[1], BarRole::Pivot, Transition::Animated);
		let tint = s.bars()[1].tint;
		assert_eq!(tint.current(), BarRole::Default.color());
		assert_eq!(tint.target(), BarRole::Pivot.color());
		s.advance(500.0);
		assert_eq!(s.bars()[1].tint.current(), BarRole::Pivot.color());
		assert_eq!(BarRole::Sorted.color(), Rgb(0x4c, 0xaf, 0x50));
	}

	#[test]
	fn length_changes_rebind_the_bars() {
		let mut s = scene();
		s.paint(&[3], BarRole::Sorted, Transition::Instant);
		s.set_range(Some((1, 3)));
		s.show_array(&[2.0, 4.0], Transition::Animated);
		assert_eq!(s.len(), 2);
		assert_eq!(s.values(), vec![2.0, 4.0]);
		assert_eq!(s.role(1), Some(BarRole::Default));
		assert_eq!(s.range(), None);
		assert!(s.bars().iter().all(|b| b.value.is_settled()));
	}

	#[test]
	fn reset_restores_the_mounted_array() {
		let mut s = scene();
		s.show_array(&[1.0, 3.0, 8.0, 5.0], Transition::Animated);
		s.paint(&[0], BarRole::Sorted, Transition::Animated);
		s.set_pointers(Some(-1), Some(0));
		s.reset();
		assert_eq!(s.values(), vec![5.0, 3.0, 8.0, 1.0]);
		assert_eq!(s.role(0), Some(BarRole::Default));
		assert_eq!(s.pointers(), (None, None));
		s.clear_transient(Transition::Instant);
		assert_eq!(s.role(0), Some(BarRole::Default));
	}

	#[test]
	fn zoom_stays_in_bounds() {
		let mut s = scene();
		s.zoom_by(10.0);
		assert_eq!(s.zoom, 3.0);
		s.zoom_by(0.01);
		assert_eq!(s.zoom, 0.5);
	}
}
