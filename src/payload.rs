//! The bundle an upstream producer hands to the page: which algorithm, the
//! dataset it ran on, and the precomputed steps.

use serde::Deserialize;

use crate::components::graph_view::GraphData;
use crate::config::PlaybackConfig;
use crate::error::{VizError, VizResult};
use crate::steps::{Algorithm, Step};

/// Id of the `<script type="application/json">` element a page may embed.
pub const PAYLOAD_ELEMENT_ID: &str = "viz-payload";

/// Initial dataset: a graph for the traversals, a number array for sorting.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Dataset {
	/// Nodes and links for DFS, BFS and Dijkstra.
	Graph(GraphData),
	/// Numbers for QuickSort.
	Array(Vec<f64>),
}

#[derive(Deserialize)]
struct RawPayload {
	algorithm: String,
	dataset: Dataset,
	#[serde(default)]
	steps: Vec<Step>,
	#[serde(default)]
	config: PlaybackConfig,
}

/// A decoded and checked payload.
#[derive(Clone, Debug, PartialEq)]
pub struct Payload {
	/// Which algorithm the steps came from.
	pub algorithm: Algorithm,
	/// The data the steps ran on.
	pub dataset: Dataset,
	/// Precomputed steps, in order.
	pub steps: Vec<Step>,
	/// Timing.
	pub config: PlaybackConfig,
}

impl Payload {
	/// Decodes a payload and checks that the dataset suits the algorithm.
	pub fn from_json(text: &str) -> VizResult<Self> {
		let raw: RawPayload = serde_json::from_str(text)?;
		let payload = Self {
			algorithm: raw.algorithm.parse()?,
			dataset: raw.dataset,
			steps: raw.steps,
			config: raw.config,
		};
		payload.validate()?;
		Ok(payload)
	}

	fn validate(&self) -> VizResult<()> {
		match (&self.dataset, self.algorithm.is_graph()) {
			(Dataset::Graph(data), true) => data.validate(),
			(Dataset::Array(_), false) => Ok(()),
			(Dataset::Graph(_), false) => Err(VizError::payload(format!(
				"{} needs an array dataset, got a graph",
				self.algorithm.display_name()
			))),
			(Dataset::Array(_), true) => Err(VizError::payload(format!(
				"{} needs a graph dataset, got an array",
				self.algorithm.display_name()
			))),
		}?;
		if !self.config.speed.is_finite() || self.config.speed <= 0.0 {
			return Err(VizError::InvalidSpeed(self.config.speed));
		}
		Ok(())
	}

	/// The bundled demo payload for `algorithm`.
	pub fn demo(algorithm: Algorithm) -> VizResult<Self> {
		Self::from_json(demo_json(algorithm))
	}
}

fn demo_json(algorithm: Algorithm) -> &'static str {
	match algorithm {
		Algorithm::Dfs => include_str!("../fixtures/dfs.json"),
		Algorithm::Bfs => include_str!("../fixtures/bfs.json"),
		Algorithm::Dijkstra => include_str!("../fixtures/dijkstra.json"),
		Algorithm::QuickSort => include_str!("../fixtures/quicksort.json"),
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn decodes_a_graph_payload() {
		let text = json!({
			"algorithm": "BFS",
			"dataset": {
				"nodes": [{"id": 0}, {"id": 1, "x": 10, "y": 20}],
				"links": [{"source": 0, "target": 1}],
			},
			"steps": [{"type": "visit", "node": 0}],
			"config": {"speed": 2},
		})
		.to_string();
		let payload = Payload::from_json(&text).unwrap();
		assert_eq!(payload.algorithm, Algorithm::Bfs);
		assert_eq!(payload.steps.len(), 1);
		assert_eq!(payload.config.speed, 2.0);
		let Dataset::Graph(data) = payload.dataset else {
			panic!("expected a graph");
		};
		assert_eq!(data.links[0].weight, 1.0);
		assert!(!data.directed);
	}

	#[test]
	fn decodes_an_array_payload() {
		let text = r#"{"algorithm": "quicksort", "dataset": [5, 3, 8, 1]}"#;
		let payload = Payload::from_json(text).unwrap();
		assert_eq!(payload.dataset, Dataset::Array(vec![5.0, 3.0, 8.0, 1.0]));
		assert!(payload.steps.is_empty());
		assert_eq!(payload.config, PlaybackConfig::default());
	}

	#[test]
	fn dataset_must_suit_the_algorithm() {
		let err = Payload::from_json(r#"{"algorithm": "dfs", "dataset": [1, 2]}"#).unwrap_err();
		assert!(err.to_string().contains("needs a graph dataset"));
		let err = Payload::from_json(r#"{"algorithm": "quicksort", "dataset": {"nodes": []}}"#).unwrap_err();
		assert!(err.to_string().contains("needs an array dataset"));
	}

	#[test]
	fn rejects_unknown_algorithms_and_bad_graphs() {
		let err = Payload::from_json(r#"{"algorithm": "astar", "dataset": [1]}"#).unwrap_err();
		assert_eq!(err, VizError::UnknownAlgorithm("astar".into()));
		let err = Payload::from_json(
			r#"{"algorithm": "bfs", "dataset": {"nodes": [{"id": 0}], "links": [{"source": 0, "target": 7}]}}"#,
		)
		.unwrap_err();
		assert!(err.to_string().contains("missing node 7"));
		assert!(matches!(Payload::from_json("{"), Err(VizError::Payload(_))));
	}

	#[test]
	fn every_demo_decodes() {
		for algorithm in Algorithm::ALL {
			let payload = Payload::demo(algorithm).unwrap();
			assert_eq!(payload.algorithm, algorithm);
			assert!(!payload.steps.is_empty());
		}
	}
}
