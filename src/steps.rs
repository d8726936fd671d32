//! Step records produced upstream and the algorithm tags that select how they are read.
//!
//! A step is one immutable entry of a precomputed algorithm trace. The record
//! keeps every field optional so that a sequence with one bad entry still
//! decodes; the interpreters validate fields when the step is applied and turn
//! gaps into [`VizError::MissingField`].

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::error::{VizError, VizResult};

/// Identifier of a graph node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// A tentative shortest-path distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Distance {
	/// A reached node.
	Finite(f64),
	/// Not reached yet.
	Infinite,
}

impl fmt::Display for Distance {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Finite(v) if v.is_finite() => write!(f, "{v}"),
			_ => f.write_str("∞"),
		}
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDistance {
	Number(f64),
	Text(String),
}

impl<'de> Deserialize<'de> for Distance {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		match RawDistance::deserialize(deserializer)? {
			RawDistance::Number(v) if v.is_finite() => Ok(Self::Finite(v)),
			RawDistance::Number(_) => Ok(Self::Infinite),
			RawDistance::Text(text) => {
				let text = text.trim();
				match text.to_ascii_lowercase().as_str() {
					"infinity" | "inf" | "+infinity" | "∞" => Ok(Self::Infinite),
					_ => text
						.parse::<f64>()
						.map(|v| {
							if v.is_finite() {
								Self::Finite(v)
							} else {
								Self::Infinite
							}
						})
						.map_err(|_| de::Error::custom(format!("`{text}` is not a distance"))),
				}
			}
		}
	}
}

/// The algorithms a visualization can replay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
	/// Depth-first search.
	Dfs,
	/// Breadth-first search.
	Bfs,
	/// Dijkstra's single-source shortest paths.
	Dijkstra,
	/// QuickSort with Lomuto partitioning.
	#[serde(alias = "quick_sort")]
	QuickSort,
}

impl Algorithm {
	/// Every supported algorithm, in menu order.
	pub const ALL: [Algorithm; 4] = [Self::Dfs, Self::Bfs, Self::Dijkstra, Self::QuickSort];

	/// The wire tag.
	pub fn tag(self) -> &'static str {
		match self {
			Self::Dfs => "dfs",
			Self::Bfs => "bfs",
			Self::Dijkstra => "dijkstra",
			Self::QuickSort => "quicksort",
		}
	}

	/// Human readable name used in titles.
	pub fn display_name(self) -> &'static str {
		match self {
			Self::Dfs => "Depth-First Search",
			Self::Bfs => "Breadth-First Search",
			Self::Dijkstra => "Dijkstra's Algorithm",
			Self::QuickSort => "QuickSort",
		}
	}

	/// Whether the algorithm runs on a graph dataset.
	pub fn is_graph(self) -> bool {
		!matches!(self, Self::QuickSort)
	}

	/// Step types this algorithm produces.
	pub fn accepts(self, kind: StepKind) -> bool {
		use StepKind::*;
		match self {
			Self::Dfs | Self::Bfs => matches!(kind, Visit | Explore | Complete | Backtrack),
			Self::Dijkstra => matches!(kind, Distance | Visit | Relax | Complete | Path),
			Self::QuickSort => matches!(kind, Pivot | Pointers | Compare | Swap | Sorted | Range),
		}
	}
}

impl FromStr for Algorithm {
	type Err = VizError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"dfs" => Ok(Self::Dfs),
			"bfs" => Ok(Self::Bfs),
			"dijkstra" => Ok(Self::Dijkstra),
			"quicksort" | "quick_sort" => Ok(Self::QuickSort),
			_ => Err(VizError::UnknownAlgorithm(s.to_string())),
		}
	}
}

impl fmt::Display for Algorithm {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.display_name())
	}
}

/// Known values of a step's `type` tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepKind {
	/// A node is visited.
	Visit,
	/// An edge is explored.
	Explore,
	/// A node is finished.
	Complete,
	/// The search walks back along an edge.
	Backtrack,
	/// A tentative distance is set.
	Distance,
	/// An edge relaxation is attempted.
	Relax,
	/// The final shortest-path tree.
	Path,
	/// A pivot is chosen.
	Pivot,
	/// The partition pointers move.
	Pointers,
	/// Two elements are compared.
	Compare,
	/// Two elements are swapped.
	Swap,
	/// Elements reach their final position.
	Sorted,
	/// A subarray becomes active.
	Range,
}

impl StepKind {
	/// Parses a wire tag.
	pub fn parse(tag: &str) -> Option<Self> {
		Some(match tag {
			"visit" => Self::Visit,
			"explore" => Self::Explore,
			"complete" => Self::Complete,
			"backtrack" => Self::Backtrack,
			"distance" => Self::Distance,
			"relax" => Self::Relax,
			"path" => Self::Path,
			"pivot" => Self::Pivot,
			"pointers" => Self::Pointers,
			"compare" => Self::Compare,
			"swap" => Self::Swap,
			"sorted" => Self::Sorted,
			"range" => Self::Range,
			_ => return None,
		})
	}
}

/// One record of a precomputed trace, in the producer's wire shape.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
	/// The `type` tag.
	#[serde(rename = "type")]
	pub kind: String,
	/// Node of `visit`, `complete` and `distance`.
	pub node: Option<NodeId>,
	/// Edge source of `explore`, `backtrack` and `relax`.
	pub from: Option<NodeId>,
	/// Edge target of `explore`, `backtrack` and `relax`.
	pub to: Option<NodeId>,
	/// New tentative distance of `distance`.
	pub distance: Option<Distance>,
	/// Whether a `relax` improved the distance.
	pub success: Option<bool>,
	/// Distance after a `relax`.
	pub new_distance: Option<Distance>,
	/// Shortest-path tree edges of `path`.
	pub edges: Option<Vec<(NodeId, NodeId)>>,
	/// Pivot index.
	pub pivot: Option<usize>,
	/// Indices being compared.
	pub comparing: Option<Vec<usize>>,
	/// Indices being swapped.
	pub swapping: Option<Vec<usize>>,
	/// Indices now in their final position.
	pub sorted: Option<Vec<usize>>,
	/// Active subarray, inclusive bounds.
	pub range: Option<(usize, usize)>,
	/// Full array snapshot after the step.
	pub array: Option<Vec<f64>>,
	/// Partition boundary pointer; `-1` before the first element.
	#[serde(rename = "i_pointer")]
	pub i_pointer: Option<i64>,
	/// Scan pointer.
	#[serde(rename = "j_pointer")]
	pub j_pointer: Option<i64>,
	/// Producer-authored description of what happened.
	pub action: Option<String>,
	/// Producer-authored description of why.
	pub reason: Option<String>,
}

impl Step {
	/// A bare step of the given type.
	pub fn new(kind: &str) -> Self {
		Self {
			kind: kind.to_string(),
			..Self::default()
		}
	}

	/// Resolves the `type` tag.
	pub fn kind(&self, index: usize) -> VizResult<StepKind> {
		StepKind::parse(&self.kind).ok_or_else(|| VizError::UnknownStepType {
			index,
			kind: self.kind.clone(),
		})
	}

	/// Unwraps a field the step type requires.
	pub(crate) fn need<T>(&self, index: usize, field: &'static str, value: Option<T>) -> VizResult<T> {
		value.ok_or_else(|| VizError::missing(index, &self.kind, field))
	}

	/// The producer's `action` text, if non-blank.
	pub fn action_text(&self) -> Option<&str> {
		self.action.as_deref().filter(|s| !s.trim().is_empty())
	}

	/// The producer's `reason` text, if non-blank.
	pub fn reason_text(&self) -> Option<&str> {
		self.reason.as_deref().filter(|s| !s.trim().is_empty())
	}
}
