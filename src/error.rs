//! Error type shared by the playback engine, the interpreters and the graph editor.

use crate::steps::NodeId;

/// Result alias used across the crate.
pub type VizResult<T> = Result<T, VizError>;

/// Everything that can go wrong while decoding, replaying or editing.
///
/// None of these escape the playback loop: they are logged and shown in the
/// explanation panel, and the offending step or edit is skipped.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum VizError {
	/// A step record lacks a field its `type` requires.
	#[error("step {index} (`{kind}`) is missing the `{field}` field")]
	MissingField {
		/// Position of the step in the sequence.
		index: usize,
		/// The declared step type.
		kind: String,
		/// The absent field, by its wire name.
		field: &'static str,
	},

	/// The step `type` tag is not one the crate knows about.
	#[error("step {index} has unknown type `{kind}`")]
	UnknownStepType {
		/// Position of the step in the sequence.
		index: usize,
		/// The unrecognised tag.
		kind: String,
	},

	/// A known step type that the selected algorithm never produces.
	#[error("{algorithm} does not use `{kind}` steps (step {index})")]
	UnsupportedStep {
		/// Position of the step in the sequence.
		index: usize,
		/// Display name of the active algorithm.
		algorithm: &'static str,
		/// The step type.
		kind: String,
	},

	/// The step is well formed but refers to something the scene does not have.
	#[error("step {index}: {message}")]
	InvalidStep {
		/// Position of the step in the sequence.
		index: usize,
		/// What was wrong.
		message: String,
	},

	/// An edit named a node that is not in the graph.
	#[error("node {0} does not exist")]
	UnknownNode(NodeId),

	/// An edit named an edge that is not in the graph.
	#[error("there is no edge from node {0} to node {1}")]
	UnknownEdge(NodeId, NodeId),

	/// Adding this edge would duplicate an existing one.
	#[error("an edge already exists from node {0} to node {1}")]
	DuplicateEdge(NodeId, NodeId),

	/// Edits are not allowed while precomputed steps are playing.
	#[error("pause playback before editing the graph")]
	PlaybackActive,

	/// Speeds must be finite and strictly positive.
	#[error("speed must be a positive number, got {0}")]
	InvalidSpeed(f64),

	/// The algorithm tag is not one of `dfs`, `bfs`, `dijkstra`, `quicksort`.
	#[error("unknown algorithm `{0}`")]
	UnknownAlgorithm(String),

	/// The payload could not be decoded or does not fit together.
	#[error("invalid payload: {0}")]
	Payload(String),

	/// The clock refused to start a timer.
	#[error("could not start the playback timer: {0}")]
	Timer(String),
}

impl VizError {
	pub(crate) fn missing(index: usize, kind: &str, field: &'static str) -> Self {
		Self::MissingField {
			index,
			kind: kind.to_string(),
			field,
		}
	}

	pub(crate) fn invalid(index: usize, message: impl Into<String>) -> Self {
		Self::InvalidStep {
			index,
			message: message.into(),
		}
	}

	pub(crate) fn payload(message: impl Into<String>) -> Self {
		Self::Payload(message.into())
	}
}

impl From<serde_json::Error> for VizError {
	fn from(err: serde_json::Error) -> Self {
		Self::Payload(err.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn messages_name_the_offending_parts() {
		let err = VizError::missing(3, "visit", "node");
		assert_eq!(err.to_string(), "step 3 (`visit`) is missing the `node` field");

		let err = VizError::DuplicateEdge(NodeId(1), NodeId(2));
		assert!(err.to_string().contains("from node 1 to node 2"));
	}

	#[test]
	fn json_errors_become_payload_errors() {
		let err: VizError = serde_json::from_str::<u32>("nope").unwrap_err().into();
		assert!(matches!(err, VizError::Payload(_)));
	}
}
