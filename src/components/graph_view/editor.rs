//! Live graph editing: the select/add-node/add-edge/delete state machine.
//!
//! The editor mutates a [`GraphData`] directly and writes confirmation text to
//! an [`ExplanationSink`]. It knows nothing about playback or layout; the
//! [`GraphVisualizer`](super::visualizer::GraphVisualizer) pauses, freezes and
//! relayouts around it.

use log::info;

use super::types::{GraphData, GraphLink, GraphNode};
use crate::error::{VizError, VizResult};
use crate::explain::{ExplanationSink, escape, paragraph, strong};
use crate::steps::NodeId;

/// What a click on the canvas does.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EditMode {
	/// Drag nodes and pan.
	#[default]
	Select,
	/// Click empty space to add a node.
	AddNode,
	/// Click two nodes to join them.
	AddEdge,
	/// Click a node or edge to remove it.
	Delete,
}

impl EditMode {
	/// Every mode, in toolbar order.
	pub const ALL: [EditMode; 4] = [Self::Select, Self::AddNode, Self::AddEdge, Self::Delete];

	/// Toolbar label.
	pub fn label(self) -> &'static str {
		match self {
			Self::Select => "Select",
			Self::AddNode => "Add Node",
			Self::AddEdge => "Add Edge",
			Self::Delete => "Delete",
		}
	}

	/// Tooltip for the toolbar button.
	pub fn hint(self) -> &'static str {
		match self {
			Self::Select => "Drag nodes to reposition. Drag the background to pan the view.",
			Self::AddNode => "Click on the empty canvas to add a new node.",
			Self::AddEdge => "Click a source node, then a target node to create an edge.",
			Self::Delete => "Click on a node or an edge to delete it.",
		}
	}
}

/// The weight dialog opened once both ends of a new edge are chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgePrompt {
	/// First node clicked.
	pub source: NodeId,
	/// Second node clicked.
	pub target: NodeId,
	/// Whether the new edge has a direction.
	pub directed: bool,
}

impl EdgePrompt {
	/// Heading of the weight dialog.
	pub fn title(&self) -> String {
		let kind = if self.directed { "Directed " } else { "" };
		format!("Add {kind}Edge Weight")
	}

	/// Question under the heading.
	pub fn question(&self) -> String {
		let kind = if self.directed { "directed " } else { "" };
		format!(
			"Enter weight for {kind}edge from node {} to node {}:",
			self.source, self.target
		)
	}
}

/// Reads a typed weight the way a browser number field is usually read:
/// leading digits after an optional sign, ignoring the rest. Anything that
/// does not give a positive integer becomes `1`.
pub fn parse_weight(text: &str) -> f64 {
	let text = text.trim_start();
	let (negative, digits) = match text.as_bytes().first() {
		Some(b'-') => (true, &text[1..]),
		Some(b'+') => (false, &text[1..]),
		_ => (false, text),
	};
	let end = digits
		.find(|c: char| !c.is_ascii_digit())
		.unwrap_or(digits.len());
	match digits[..end].parse::<u32>() {
		Ok(value) if value > 0 && !negative => value as f64,
		_ => 1.0,
	}
}

/// Edit mode, the pending edge source and the open weight prompt.
#[derive(Clone, Debug, Default)]
pub struct GraphEditor {
	mode: EditMode,
	pending_source: Option<NodeId>,
	prompt: Option<EdgePrompt>,
	user_edited: bool,
}

impl GraphEditor {
	/// The active mode.
	pub fn mode(&self) -> EditMode {
		self.mode
	}

	/// Node picked as the source of a new edge.
	pub fn pending_source(&self) -> Option<NodeId> {
		self.pending_source
	}

	/// The weight dialog, while one is open.
	pub fn prompt(&self) -> Option<EdgePrompt> {
		self.prompt
	}

	/// Set by the first mutation and only cleared by a full graph reset.
	pub fn is_user_edited(&self) -> bool {
		self.user_edited
	}

	/// Switches mode and explains what the new mode does.
	pub fn set_mode(&mut self, mode: EditMode, sink: &mut dyn ExplanationSink) {
		self.mode = mode;
		self.pending_source = None;
		self.prompt = None;
		sink.set_title(&format!("Graph Editor: {} Mode", mode.label()));
		sink.set_step(&strong(&format!("{} Mode Activated", mode.label())));
		sink.set_reason(&paragraph(&escape(mode.hint())));
	}

	/// Back to select without touching the panel; used when playback starts.
	pub fn leave_editing(&mut self) {
		self.mode = EditMode::Select;
		self.pending_source = None;
		self.prompt = None;
	}

	/// A click that hit neither a node nor an edge, in graph coordinates.
	pub fn click_canvas(
		&mut self,
		data: &mut GraphData,
		x: f64,
		y: f64,
		sink: &mut dyn ExplanationSink,
	) -> VizResult<bool> {
		if self.mode != EditMode::AddNode {
			return Ok(false);
		}
		let id = data.add_node(GraphNode::pinned_at(data.next_node_id(), x, y))?;
		self.user_edited = true;
		info!("added node {id} at ({x:.0}, {y:.0})");
		sink.set_title(&format!("Graph Editor: Node {id} Added"));
		sink.set_step(&format!(
			"{} Created node {id} at position ({}, {}).",
			strong("Node Added:"),
			x.round(),
			y.round()
		));
		sink.set_reason(&paragraph(
			"Click anywhere on the empty canvas to add more nodes, or switch to a different editing mode.",
		));
		Ok(true)
	}

	/// Handles a click on node `id`. Returns whether `data` changed.
	pub fn click_node(&mut self, data: &mut GraphData, id: NodeId, sink: &mut dyn ExplanationSink) -> VizResult<bool> {
		match self.mode {
			EditMode::AddEdge => {
				if !data.contains(id) {
					return Err(VizError::UnknownNode(id));
				}
				match self.pending_source {
					None => {
						self.pending_source = Some(id);
						let kind = if data.directed { "directed" } else { "undirected" };
						sink.set_title(&format!("Graph Editor: Creating Edge from Node {id}"));
						sink.set_step(&format!(
							"{} Selected node {id} as source. Now click another node to create an edge.",
							strong(&format!("Edge Creation ({kind}):"))
						));
					}
					Some(source) if source != id => {
						self.prompt = Some(EdgePrompt {
							source,
							target: id,
							directed: data.directed,
						});
					}
					// Same node twice: keep waiting for a different target.
					Some(_) => {}
				}
				Ok(false)
			}
			EditMode::Delete => {
				let removed = data.remove_node(id)?;
				self.user_edited = true;
				info!("deleted node {id} and {removed} edges");
				sink.set_title(&format!("Graph Editor: Node {id} Deleted"));
				sink.set_step(&format!(
					"{} Removed node {id} and all connected edges.",
					strong("Node Deleted:")
				));
				sink.set_reason(&paragraph(&escape(EditMode::Delete.hint())));
				Ok(true)
			}
			EditMode::Select | EditMode::AddNode => Ok(false),
		}
	}

	/// A click on the edge stored as `source -> target`.
	pub fn click_edge(
		&mut self,
		data: &mut GraphData,
		source: NodeId,
		target: NodeId,
		sink: &mut dyn ExplanationSink,
	) -> VizResult<bool> {
		if self.mode != EditMode::Delete {
			return Ok(false);
		}
		data.remove_link(source, target)?;
		self.user_edited = true;
		info!("deleted edge {source} -> {target}");
		sink.set_title("Graph Editor: Edge Deleted");
		sink.set_step(&format!(
			"{} Removed edge between nodes {source} and {target}.",
			strong("Edge Deleted:")
		));
		sink.set_reason(&paragraph(&escape(EditMode::Delete.hint())));
		Ok(true)
	}

	/// Confirms the weight dialog. The pending selection is cleared whether or
	/// not the edge could be added.
	pub fn confirm_edge(&mut self, data: &mut GraphData, text: &str, sink: &mut dyn ExplanationSink) -> VizResult<bool> {
		let Some(prompt) = self.prompt.take() else {
			return Ok(false);
		};
		self.pending_source = None;
		let weight = parse_weight(text);
		data.add_link(GraphLink {
			source: prompt.source,
			target: prompt.target,
			weight,
		})?;
		self.user_edited = true;
		info!("added edge {} -> {} ({weight})", prompt.source, prompt.target);
		let kind = if prompt.directed { "directed " } else { "" };
		sink.set_title("Graph Editor: Edge Added");
		sink.set_step(&format!(
			"{} Created {kind}edge from node {} to node {} with weight {weight}.",
			strong("Edge Added:"),
			prompt.source,
			prompt.target
		));
		sink.set_reason(&paragraph(&escape(EditMode::AddEdge.hint())));
		Ok(true)
	}

	/// Closes the weight dialog without adding an edge.
	pub fn cancel_edge(&mut self) {
		self.prompt = None;
		self.pending_source = None;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::explain::Explanation;

	fn sparse() -> GraphData {
		GraphData {
			nodes: vec![GraphNode::new(0), GraphNode::new(2)],
			links: vec![],
			directed: false,
		}
	}

	#[test]
	fn new_nodes_take_the_next_id() {
		let mut data = sparse();
		let mut editor = GraphEditor::default();
		let mut panel = Explanation::default();
		editor.set_mode(EditMode::AddNode, &mut panel);
		assert_eq!(panel.title, "Graph Editor: Add Node Mode");

		assert_eq!(editor.click_canvas(&mut data, 10.0, 20.0, &mut panel), Ok(true));
		assert_eq!(editor.click_canvas(&mut data, 30.0, 40.0, &mut panel), Ok(true));
		let ids: Vec<u32> = data.nodes.iter().map(|n| n.id.0).collect();
		assert_eq!(ids, vec![0, 2, 3, 4]);
		assert_eq!(data.nodes[3].position(), Some((30.0, 40.0)));
		assert!(data.nodes[3].fixed);
		assert!(editor.is_user_edited());
		assert_eq!(panel.title, "Graph Editor: Node 4 Added");
	}

	#[test]
	fn clicking_canvas_outside_add_node_does_nothing() {
		let mut data = sparse();
		let mut editor = GraphEditor::default();
		let mut panel = Explanation::default();
		assert_eq!(editor.click_canvas(&mut data, 1.0, 1.0, &mut panel), Ok(false));
		assert_eq!(data, sparse());
		assert!(!editor.is_user_edited());
	}

	#[test]
	fn same_node_twice_keeps_the_pending_source() {
		let mut data = GraphData {
			nodes: (0..3).map(GraphNode::new).collect(),
			..GraphData::default()
		};
		let mut editor = GraphEditor::default();
		let mut panel = Explanation::default();
		editor.set_mode(EditMode::AddEdge, &mut panel);
		editor.click_node(&mut data, NodeId(1), &mut panel).unwrap();
		editor.click_node(&mut data, NodeId(1), &mut panel).unwrap();
		assert_eq!(editor.pending_source(), Some(NodeId(1)));
		assert_eq!(editor.prompt(), None);
		assert!(data.links.is_empty());
	}

	#[test]
	fn edges_are_added_through_the_prompt() {
		let mut data = sparse();
		let mut editor = GraphEditor::default();
		let mut panel = Explanation::default();
		editor.set_mode(EditMode::AddEdge, &mut panel);
		editor.click_node(&mut data, NodeId(0), &mut panel).unwrap();
		editor.click_node(&mut data, NodeId(2), &mut panel).unwrap();
		let prompt = editor.prompt().unwrap();
		assert_eq!(prompt.question(), "Enter weight for edge from node 0 to node 2:");

		assert_eq!(editor.confirm_edge(&mut data, "7kg", &mut panel), Ok(true));
		assert_eq!(data.links, vec![GraphLink::new(0, 2, 7.0)]);
		assert_eq!(editor.pending_source(), None);
		assert!(panel.step.contains("with weight 7"));

		// Reverse orientation of an undirected edge is a duplicate.
		editor.click_node(&mut data, NodeId(2), &mut panel).unwrap();
		editor.click_node(&mut data, NodeId(0), &mut panel).unwrap();
		assert_eq!(
			editor.confirm_edge(&mut data, "3", &mut panel),
			Err(VizError::DuplicateEdge(NodeId(2), NodeId(0)))
		);
		assert_eq!(data.links.len(), 1);
		assert_eq!(editor.pending_source(), None);
	}

	#[test]
	fn cancelling_leaves_the_graph_alone() {
		let mut data = sparse();
		let mut editor = GraphEditor::default();
		let mut panel = Explanation::default();
		editor.set_mode(EditMode::AddEdge, &mut panel);
		editor.click_node(&mut data, NodeId(0), &mut panel).unwrap();
		editor.click_node(&mut data, NodeId(2), &mut panel).unwrap();
		editor.cancel_edge();
		assert_eq!(editor.prompt(), None);
		assert_eq!(editor.pending_source(), None);
		assert_eq!(data, sparse());
		assert!(!editor.is_user_edited());
	}

	#[test]
	fn delete_mode_removes_nodes_and_edges() {
		let mut data = sparse();
		data.links.push(GraphLink::new(0, 2, 1.0));
		let mut editor = GraphEditor::default();
		let mut panel = Explanation::default();
		editor.set_mode(EditMode::Delete, &mut panel);

		assert_eq!(editor.click_edge(&mut data, NodeId(0), NodeId(2), &mut panel), Ok(true));
		assert!(data.links.is_empty());
		assert_eq!(
			editor.click_edge(&mut data, NodeId(0), NodeId(2), &mut panel),
			Err(VizError::UnknownEdge(NodeId(0), NodeId(2)))
		);
		assert_eq!(editor.click_node(&mut data, NodeId(2), &mut panel), Ok(true));
		assert_eq!(data.nodes.len(), 1);
		assert_eq!(panel.title, "Graph Editor: Node 2 Deleted");
	}

	#[test]
	fn weights_read_like_number_fields() {
		assert_eq!(parse_weight("12"), 12.0);
		assert_eq!(parse_weight("  5 apples"), 5.0);
		assert_eq!(parse_weight("+3"), 3.0);
		assert_eq!(parse_weight("abc"), 1.0);
		assert_eq!(parse_weight(""), 1.0);
		assert_eq!(parse_weight("0"), 1.0);
		assert_eq!(parse_weight("-4"), 1.0);
	}
}
