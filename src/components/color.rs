//! Palette helpers shared by the canvas renderers.

use crate::playback::Blend;

/// An opaque canvas colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
	/// `0xRRGGBB`.
	pub const fn hex(value: u32) -> Self {
		Self((value >> 16) as u8, (value >> 8) as u8, value as u8)
	}

	/// Linear blend, `t = 0` is `self`.
	pub fn mix(self, other: Rgb, t: f64) -> Rgb {
		let t = t.clamp(0.0, 1.0);
		let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
		Rgb(lerp(self.0, other.0), lerp(self.1, other.1), lerp(self.2, other.2))
	}

	/// `rgb(r, g, b)` for a canvas fill or stroke style.
	pub fn css(self) -> String {
		format!("rgb({}, {}, {})", self.0, self.1, self.2)
	}
}

impl Blend for Rgb {
	fn blend(self, other: Rgb, t: f64) -> Rgb {
		self.mix(other, t)
	}
}
