use std::collections::HashSet;

use serde::Deserialize;

use crate::error::{VizError, VizResult};
use crate::steps::NodeId;

fn default_weight() -> f64 {
	1.0
}

/// A node of the input graph.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GraphNode {
	/// Unique id.
	pub id: NodeId,
	/// Initial x, if laid out already.
	#[serde(default)]
	pub x: Option<f64>,
	/// Initial y, if laid out already.
	#[serde(default)]
	pub y: Option<f64>,
	/// Pinned at `(x, y)`; the automatic layout never moves it.
	#[serde(default)]
	pub fixed: bool,
}

impl GraphNode {
	/// An unplaced node.
	pub fn new(id: u32) -> Self {
		Self {
			id: NodeId(id),
			x: None,
			y: None,
			fixed: false,
		}
	}

	/// A node fixed at `(x, y)`.
	pub fn pinned_at(id: NodeId, x: f64, y: f64) -> Self {
		Self {
			id,
			x: Some(x),
			y: Some(y),
			fixed: true,
		}
	}

	/// `(x, y)` when both are set.
	pub fn position(&self) -> Option<(f64, f64)> {
		self.x.zip(self.y)
	}
}

/// A weighted link between two nodes.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GraphLink {
	/// Start node.
	pub source: NodeId,
	/// End node.
	pub target: NodeId,
	/// Edge weight, 1 when absent.
	#[serde(default = "default_weight")]
	pub weight: f64,
}

impl GraphLink {
	/// A link between raw ids.
	pub fn new(source: u32, target: u32, weight: f64) -> Self {
		Self {
			source: NodeId(source),
			target: NodeId(target),
			weight,
		}
	}

	/// Whether this link connects `from` to `to`, in either direction unless `directed`.
	pub fn joins(&self, from: NodeId, to: NodeId, directed: bool) -> bool {
		(self.source == from && self.target == to)
			|| (!directed && self.source == to && self.target == from)
	}
}

/// The dataset of a graph visualization. Links refer to nodes by id only.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct GraphData {
	/// Every node.
	pub nodes: Vec<GraphNode>,
	/// Every link.
	#[serde(default)]
	pub links: Vec<GraphLink>,
	/// Whether links only run from source to target.
	#[serde(default)]
	pub directed: bool,
}

impl GraphData {
	/// Whether a node with `id` exists.
	pub fn contains(&self, id: NodeId) -> bool {
		self.nodes.iter().any(|n| n.id == id)
	}

	/// One greater than the largest id, or `0` for an empty graph.
	pub fn next_node_id(&self) -> NodeId {
		self.nodes
			.iter()
			.map(|n| n.id.0 + 1)
			.max()
			.map(NodeId)
			.unwrap_or(NodeId(0))
	}

	/// Whether `from` and `to` are already linked, respecting direction.
	pub fn has_link(&self, from: NodeId, to: NodeId) -> bool {
		self.links.iter().any(|l| l.joins(from, to, self.directed))
	}

	/// Adds a node with an unused id.
	pub fn add_node(&mut self, node: GraphNode) -> VizResult<NodeId> {
		if self.contains(node.id) {
			return Err(VizError::payload(format!("node {} already exists", node.id)));
		}
		let id = node.id;
		self.nodes.push(node);
		Ok(id)
	}

	/// Adds a link between existing nodes, refusing duplicates.
	pub fn add_link(&mut self, link: GraphLink) -> VizResult<()> {
		for id in [link.source, link.target] {
			if !self.contains(id) {
				return Err(VizError::UnknownNode(id));
			}
		}
		if self.has_link(link.source, link.target) {
			return Err(VizError::DuplicateEdge(link.source, link.target));
		}
		self.links.push(link);
		Ok(())
	}

	/// Removes a node and every link touching it.
	pub fn remove_node(&mut self, id: NodeId) -> VizResult<usize> {
		if !self.contains(id) {
			return Err(VizError::UnknownNode(id));
		}
		self.nodes.retain(|n| n.id != id);
		let before = self.links.len();
		self.links.retain(|l| l.source != id && l.target != id);
		Ok(before - self.links.len())
	}

	/// Removes the link stored as `source -> target`.
	pub fn remove_link(&mut self, source: NodeId, target: NodeId) -> VizResult<()> {
		let before = self.links.len();
		self.links
			.retain(|l| !(l.source == source && l.target == target));
		if self.links.len() == before {
			return Err(VizError::UnknownEdge(source, target));
		}
		Ok(())
	}

	/// Rejects duplicate ids and links to missing nodes.
	pub fn validate(&self) -> VizResult<()> {
		let mut seen = HashSet::new();
		for node in &self.nodes {
			if !seen.insert(node.id) {
				return Err(VizError::payload(format!("duplicate node id {}", node.id)));
			}
		}
		for link in &self.links {
			for id in [link.source, link.target] {
				if !seen.contains(&id) {
					return Err(VizError::payload(format!(
						"link {} -> {} refers to missing node {id}",
						link.source, link.target
					)));
				}
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample(directed: bool) -> GraphData {
		GraphData {
			nodes: vec![GraphNode::new(0), GraphNode::new(2)],
			links: vec![GraphLink::new(0, 2, 3.0)],
			directed,
		}
	}

	#[test]
	fn next_id_follows_the_largest() {
		assert_eq!(sample(false).next_node_id(), NodeId(3));
		assert_eq!(GraphData::default().next_node_id(), NodeId(0));
	}

	#[test]
	fn undirected_links_match_both_ways() {
		let g = sample(false);
		assert!(g.has_link(NodeId(2), NodeId(0)));
		let g = sample(true);
		assert!(!g.has_link(NodeId(2), NodeId(0)));
		assert!(g.has_link(NodeId(0), NodeId(2)));
	}

	#[test]
	fn duplicate_links_are_rejected() {
		let mut g = sample(false);
		assert_eq!(
			g.add_link(GraphLink::new(2, 0, 1.0)),
			Err(VizError::DuplicateEdge(NodeId(2), NodeId(0)))
		);
		let mut g = sample(true);
		assert!(g.add_link(GraphLink::new(2, 0, 1.0)).is_ok());
		assert_eq!(g.links.len(), 2);
	}

	#[test]
	fn removing_a_node_drops_its_links() {
		let mut g = sample(false);
		assert_eq!(g.remove_node(NodeId(2)), Ok(1));
		assert!(g.links.is_empty());
		assert_eq!(g.remove_node(NodeId(2)), Err(VizError::UnknownNode(NodeId(2))));
	}

	#[test]
	fn removing_a_missing_link_changes_nothing() {
		let mut g = sample(false);
		assert!(g.remove_link(NodeId(2), NodeId(0)).is_err());
		assert_eq!(g, sample(false));
		assert!(g.remove_link(NodeId(0), NodeId(2)).is_ok());
	}

	#[test]
	fn decodes_with_defaults() {
		let g: GraphData = serde_json::from_str(
			r#"{"nodes":[{"id":0},{"id":1,"x":10,"y":20,"fixed":true}],"links":[{"source":0,"target":1}]}"#,
		)
		.unwrap();
		assert!(!g.directed);
		assert_eq!(g.links[0].weight, 1.0);
		assert_eq!(g.nodes[1].position(), Some((10.0, 20.0)));
		assert!(g.validate().is_ok());
	}

	#[test]
	fn validation_catches_dangling_links() {
		let mut g = sample(false);
		g.links.push(GraphLink::new(0, 9, 1.0));
		assert!(matches!(g.validate(), Err(VizError::Payload(_))));
	}
}
