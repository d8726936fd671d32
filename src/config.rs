//! Per-instance configuration handed to a visualization at construction time.

use serde::Deserialize;

use crate::error::{VizError, VizResult};

/// Timing knobs for playback.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlaybackConfig {
	/// Steps-per-interval multiplier; 2.0 plays twice as fast.
	pub speed: f64,
	/// Delay between steps at speed 1.0.
	pub base_interval_ms: f64,
	/// Duration of an animated style transition.
	pub transition_ms: f64,
}

impl Default for PlaybackConfig {
	fn default() -> Self {
		Self {
			speed: 1.0,
			base_interval_ms: 1000.0,
			transition_ms: 500.0,
		}
	}
}

impl PlaybackConfig {
	/// Delay between two timer ticks at the current speed.
	pub fn interval_ms(&self) -> u32 {
		(self.base_interval_ms / self.speed).round().max(1.0) as u32
	}

	/// Returns a copy with `speed` replaced, rejecting non-positive values.
	pub fn with_speed(self, speed: f64) -> VizResult<Self> {
		if !speed.is_finite() || speed <= 0.0 {
			return Err(VizError::InvalidSpeed(speed));
		}
		Ok(Self { speed, ..self })
	}
}

/// Speed presets offered by the control panel.
pub const SPEED_PRESETS: &[(&str, f64)] = &[
	("Slow", 0.5),
	("Normal", 1.0),
	("Fast", 2.0),
	("Very fast", 5.0),
];

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn interval_is_inverse_of_speed() {
		let config = PlaybackConfig::default();
		assert_eq!(config.interval_ms(), 1000);
		assert_eq!(config.with_speed(2.0).unwrap().interval_ms(), 500);
		assert_eq!(config.with_speed(3.0).unwrap().interval_ms(), 333);
	}

	#[test]
	fn rejects_non_positive_speeds() {
		let config = PlaybackConfig::default();
		assert_eq!(config.with_speed(0.0), Err(VizError::InvalidSpeed(0.0)));
		assert!(config.with_speed(-1.0).is_err());
		assert!(config.with_speed(f64::NAN).is_err());
	}

	#[test]
	fn missing_fields_fall_back_to_defaults() {
		let config: PlaybackConfig = serde_json::from_str(r#"{"speed": 4}"#).unwrap();
		assert_eq!(config.speed, 4.0);
		assert_eq!(config.transition_ms, 500.0);
	}
}
