use log::debug;

use super::state::{EdgeRole, EdgeStyle, GraphScene, NodeRole};
use crate::error::{VizError, VizResult};
use crate::explain::{ExplanationSink, action_or, paragraph, reason_or, strong};
use crate::playback::{Interpreter, StepCursor, Transition};
use crate::steps::{Algorithm, NodeId, Step, StepKind};

const EXPLORE_WIDTH: f64 = 3.0;
const BACKTRACK_WIDTH: f64 = 2.0;
const PATH_WIDTH: f64 = 4.0;

/// Reads DFS, BFS and Dijkstra steps into a [`GraphScene`].
#[derive(Clone, Copy, Debug)]
pub struct GraphInterpreter {
	algorithm: Algorithm,
}

impl GraphInterpreter {
	/// Fails for algorithms that do not run on a graph.
	pub fn new(algorithm: Algorithm) -> VizResult<Self> {
		if !algorithm.is_graph() {
			return Err(VizError::payload(format!(
				"{} does not run on a graph",
				algorithm.display_name()
			)));
		}
		Ok(Self { algorithm })
	}

	fn node(scene: &GraphScene, index: usize, id: NodeId) -> VizResult<NodeId> {
		if scene.contains(id) {
			Ok(id)
		} else {
			Err(VizError::invalid(index, format!("node {id} is not in the graph")))
		}
	}

	/// Both ends of an edge step. The edge itself may be missing or stored the
	/// other way round; the step then paints nothing but still explains itself.
	fn ends(scene: &GraphScene, index: usize, step: &Step) -> VizResult<(NodeId, NodeId)> {
		let from = Self::node(scene, index, step.need(index, "from", step.from)?)?;
		let to = Self::node(scene, index, step.need(index, "to", step.to)?)?;
		Ok((from, to))
	}
}

/// Highlights `from -> to` as stored; a directed graph holding only the
/// reverse edge gets no highlight.
fn highlight(scene: &mut GraphScene, from: NodeId, to: NodeId, width: f64, transition: Transition) {
	let style = EdgeStyle::new(EdgeRole::Highlighted, width);
	if scene.paint_link(from, to, style, transition) == 0 {
		debug!("no edge {from} -> {to} to highlight");
	}
}

/// What a validated step paints, computed before the scene is touched.
enum Paint {
	Node(NodeId, NodeRole),
	Edge(NodeId, NodeId, f64),
	Distance(NodeId, String),
	Relax {
		from: NodeId,
		to: NodeId,
		label: Option<String>,
	},
	Path(Vec<(NodeId, NodeId)>),
}

impl Interpreter for GraphInterpreter {
	type Scene = GraphScene;

	fn algorithm(&self) -> Algorithm {
		self.algorithm
	}

	fn apply(
		&self,
		cursor: StepCursor<'_>,
		scene: &mut GraphScene,
		sink: &mut dyn ExplanationSink,
		transition: Transition,
	) -> VizResult<()> {
		let index = cursor.index();
		let step = cursor.step();
		let kind = step.kind(index)?;
		let unsupported = || VizError::UnsupportedStep {
			index,
			algorithm: self.algorithm.display_name(),
			kind: step.kind.clone(),
		};
		if !self.algorithm.accepts(kind) {
			return Err(unsupported());
		}
		let name = self.algorithm.display_name();

		let (paint, title, body, reason) = match kind {
			StepKind::Visit => {
				let node = Self::node(scene, index, step.need(index, "node", step.node)?)?;
				(
					Paint::Node(node, NodeRole::Visited),
					format!("{name}: Visiting Node {node}"),
					format!("Visiting node {node}"),
					format!("{name} marks node {node} as visited."),
				)
			}
			StepKind::Explore => {
				let (from, to) = Self::ends(scene, index, step)?;
				(
					Paint::Edge(from, to, EXPLORE_WIDTH),
					format!("{name}: Exploring Edge from {from} to {to}"),
					format!("Exploring edge from {from} to {to}"),
					format!("{name} follows the edge to look at neighbor {to}."),
				)
			}
			StepKind::Complete => {
				let node = Self::node(scene, index, step.need(index, "node", step.node)?)?;
				(
					Paint::Node(node, NodeRole::Current),
					format!("{name}: Completed Node {node}"),
					format!("Completed node {node}"),
					"Every neighbor of this node has been handled.".to_string(),
				)
			}
			StepKind::Backtrack => {
				let (from, to) = Self::ends(scene, index, step)?;
				(
					Paint::Edge(from, to, BACKTRACK_WIDTH),
					format!("{name}: Backtracking to Node {to}"),
					format!("Backtracking from {from} to {to}"),
					"The search walks back once a branch is exhausted.".to_string(),
				)
			}
			StepKind::Distance => {
				let node = Self::node(scene, index, step.need(index, "node", step.node)?)?;
				let distance = step.need(index, "distance", step.distance)?;
				(
					Paint::Distance(node, distance.to_string()),
					format!("{name}: Setting Distance for Node {node}"),
					format!("Distance of node {node} is now {distance}"),
					"This is the shortest distance known so far.".to_string(),
				)
			}
			StepKind::Relax => {
				let (from, to) = Self::ends(scene, index, step)?;
				let success = step.success.unwrap_or(false);
				let label = if success {
					Some(step.need(index, "newDistance", step.new_distance)?.to_string())
				} else {
					None
				};
				let (verb, reason) = match &label {
					Some(d) => (
						"Relaxing",
						format!("Going through node {from} gives node {to} a shorter distance of {d}."),
					),
					None => (
						"Checking",
						format!("Going through node {from} does not improve the distance of node {to}."),
					),
				};
				(
					Paint::Relax { from, to, label },
					format!("{name}: {verb} Edge from {from} to {to}"),
					format!("{verb} edge from {from} to {to}"),
					reason,
				)
			}
			StepKind::Path => {
				let edges = step.need(index, "edges", step.edges.clone())?;
				for &(from, to) in &edges {
					Self::node(scene, index, from)?;
					Self::node(scene, index, to)?;
				}
				(
					Paint::Path(edges),
					format!("{name}: Final Shortest Paths"),
					"Final shortest paths".to_string(),
					"The highlighted edges form the shortest-path tree from the start node.".to_string(),
				)
			}
			_ => return Err(unsupported()),
		};

		match paint {
			Paint::Node(node, role) => {
				scene.paint_nodes(|id| id == node, role, transition);
			}
			Paint::Edge(from, to, width) => {
				highlight(scene, from, to, width, transition);
			}
			// Only the named node's label changes; every other label keeps its value.
			Paint::Distance(node, label) => {
				scene.set_distance(node, &label);
			}
			Paint::Relax { from, to, label } => {
				highlight(scene, from, to, EXPLORE_WIDTH, transition);
				if let Some(label) = label {
					scene.set_distance(to, &label);
				}
			}
			Paint::Path(edges) => {
				let style = EdgeStyle::new(EdgeRole::ShortestPath, PATH_WIDTH);
				for (from, to) in edges {
					if scene.paint_connection(from, to, style, transition) == 0 {
						debug!("path edge {from} - {to} is not in the graph");
					}
				}
			}
		}
		debug!("step {index}: {title}");

		sink.set_title(&title);
		sink.set_step(&action_or(step.action_text(), || paragraph(&strong(&body))));
		sink.set_reason(&reason_or(step.reason_text(), || paragraph(&reason)));
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::components::graph_view::state::LayoutConfig;
	use crate::components::graph_view::types::{GraphData, GraphLink, GraphNode};
	use crate::config::PlaybackConfig;
	use crate::playback::Player;
	use crate::playback::tests::ManualTicker;

	fn four_cycle() -> GraphData {
		GraphData {
			nodes: (0..4).map(GraphNode::new).collect(),
			links: vec![
				GraphLink::new(0, 1, 1.0),
				GraphLink::new(1, 2, 1.0),
				GraphLink::new(2, 3, 1.0),
				GraphLink::new(3, 0, 1.0),
			],
			directed: false,
		}
	}

	fn steps(raw: serde_json::Value) -> Vec<Step> {
		serde_json::from_value(raw).unwrap()
	}

	fn player(algorithm: Algorithm, data: &GraphData, steps: Vec<Step>) -> Player<GraphInterpreter, ManualTicker> {
		let scene = GraphScene::new(
			data,
			algorithm == Algorithm::Dijkstra,
			800.0,
			500.0,
			LayoutConfig::default(),
			500.0,
		);
		Player::new(
			GraphInterpreter::new(algorithm).unwrap(),
			scene,
			steps,
			PlaybackConfig::default(),
			ManualTicker::default(),
		)
	}

	#[test]
	fn bfs_visit_and_explore_then_step_back() {
		let mut p = player(
			Algorithm::Bfs,
			&four_cycle(),
			steps(json!([
				{"type": "visit", "node": 0},
				{"type": "explore", "from": 0, "to": 1},
			])),
		);
		p.step_forward();
		p.step_forward();
		assert_eq!(p.scene().node_role(NodeId(0)), Some(NodeRole::Visited));
		assert_eq!(
			p.scene().edge_style(NodeId(0), NodeId(1)),
			Some(EdgeStyle::new(EdgeRole::Highlighted, 3.0))
		);
		assert_eq!(p.explanation().title, "Breadth-First Search: Exploring Edge from 0 to 1");

		p.step_backward();
		assert_eq!(p.scene().node_role(NodeId(0)), Some(NodeRole::Visited));
		assert_eq!(p.scene().edge_style(NodeId(0), NodeId(1)), Some(EdgeStyle::BASELINE));
		assert_eq!(p.explanation().title, "Breadth-First Search: Visiting Node 0");
	}

	#[test]
	fn distance_labels_follow_relaxation() {
		let mut p = player(
			Algorithm::Dijkstra,
			&four_cycle(),
			steps(json!([
				{"type": "distance", "node": 2, "distance": "Infinity"},
				{"type": "relax", "from": 1, "to": 2, "success": true, "newDistance": 7},
				{"type": "relax", "from": 3, "to": 2, "success": false, "newDistance": 7},
			])),
		);
		p.step_forward();
		assert_eq!(p.scene().distance_label(NodeId(2)).as_deref(), Some("∞"));
		p.step_forward();
		assert_eq!(p.scene().distance_label(NodeId(2)).as_deref(), Some("7"));
		assert_eq!(p.explanation().title, "Dijkstra's Algorithm: Relaxing Edge from 1 to 2");
		p.step_forward();
		assert_eq!(p.explanation().title, "Dijkstra's Algorithm: Checking Edge from 3 to 2");
		assert_eq!(p.scene().distance_label(NodeId(2)).as_deref(), Some("7"));
	}

	#[test]
	fn path_paints_the_whole_tree() {
		let mut p = player(
			Algorithm::Dijkstra,
			&four_cycle(),
			steps(json!([{"type": "path", "edges": [[0, 1], [2, 1], [0, 3]]}])),
		);
		p.step_forward();
		let path = EdgeStyle::new(EdgeRole::ShortestPath, 4.0);
		assert_eq!(p.scene().edge_style(NodeId(1), NodeId(0)), Some(path));
		assert_eq!(p.scene().edge_style(NodeId(1), NodeId(2)), Some(path));
		assert_eq!(p.scene().edge_style(NodeId(2), NodeId(3)), Some(EdgeStyle::BASELINE));
	}

	#[test]
	fn producer_text_overrides_templates() {
		let mut p = player(
			Algorithm::Dfs,
			&four_cycle(),
			steps(json!([{"type": "visit", "node": 1, "action": "Visiting node 1", "reason": "It is unvisited."}])),
		);
		p.step_forward();
		assert_eq!(p.explanation().step, "<p><strong>Visiting node 1</strong></p>");
		assert_eq!(p.explanation().reason, "<p>It is unvisited.</p>");
	}

	#[test]
	fn bad_steps_leave_the_scene_alone() {
		let mut p = player(
			Algorithm::Bfs,
			&four_cycle(),
			steps(json!([
				{"type": "visit"},
				{"type": "visit", "node": 9},
				{"type": "relax", "from": 0, "to": 1, "success": true, "newDistance": 1},
				{"type": "path", "edges": [[0, 1], [0, 2]]},
				{"type": "explore", "from": 0, "to": 9},
			])),
		);
		for _ in 0..5 {
			p.step_forward();
			assert!(p.explanation().step.contains("Error:"), "{}", p.explanation().step);
		}
		assert_eq!(p.index(), 5);
		assert!((0..4).all(|i| p.scene().node_role(NodeId(i)) == Some(NodeRole::Unvisited)));
		assert_eq!(p.scene().edge_style(NodeId(0), NodeId(1)), Some(EdgeStyle::BASELINE));
	}

	#[test]
	fn directed_graphs_only_highlight_stored_orientation() {
		let mut data = four_cycle();
		data.directed = true;
		let mut p = player(
			Algorithm::Dfs,
			&data,
			steps(json!([
				{"type": "explore", "from": 1, "to": 0},
				{"type": "backtrack", "from": 0, "to": 1},
			])),
		);
		p.step_forward();
		assert!(!p.explanation().step.contains("Error:"));
		assert_eq!(p.explanation().title, "Depth-First Search: Exploring Edge from 1 to 0");
		assert_eq!(p.scene().edge_style(NodeId(0), NodeId(1)), Some(EdgeStyle::BASELINE));
		p.step_forward();
		assert_eq!(
			p.scene().edge_style(NodeId(0), NodeId(1)),
			Some(EdgeStyle::new(EdgeRole::Highlighted, 2.0))
		);
		assert_eq!(p.explanation().title, "Depth-First Search: Backtracking to Node 1");
	}

	#[test]
	fn reversed_edges_keep_labels_and_producer_text() {
		// Producers walk directed graphs as if undirected, so they name edges
		// against their stored direction.
		let data = GraphData {
			nodes: (0..3).map(GraphNode::new).collect(),
			links: vec![GraphLink::new(0, 1, 2.0), GraphLink::new(1, 2, 3.0)],
			directed: true,
		};
		let mut p = player(
			Algorithm::Dijkstra,
			&data,
			steps(json!([
				{"type": "distance", "node": 1, "distance": 0},
				{"type": "relax", "from": 1, "to": 0, "success": true, "newDistance": 2,
					"action": "Trying to relax edge from 1 to 0 (weight: 2)"},
				{"type": "relax", "from": 1, "to": 2, "success": true, "newDistance": 3},
				{"type": "path", "edges": [[1, 2], [1, 0]]},
			])),
		);
		p.step_forward();
		p.step_forward();
		assert_eq!(p.scene().distance_label(NodeId(0)).as_deref(), Some("2"));
		assert_eq!(
			p.explanation().step,
			"<p><strong>Trying to relax edge from 1 to 0 (weight: 2)</strong></p>"
		);
		assert_eq!(p.scene().edge_style(NodeId(0), NodeId(1)), Some(EdgeStyle::BASELINE));

		p.step_forward();
		p.step_forward();
		let path = EdgeStyle::new(EdgeRole::ShortestPath, 4.0);
		assert_eq!(p.scene().edge_style(NodeId(1), NodeId(2)), Some(path));
		assert_eq!(p.scene().edge_style(NodeId(0), NodeId(1)), Some(path));
		assert_eq!(p.scene().distance_label(NodeId(2)).as_deref(), Some("3"));
		assert_eq!(p.explanation().title, "Dijkstra's Algorithm: Final Shortest Paths");
	}

	#[test]
	fn path_skips_edges_the_graph_lacks() {
		let mut p = player(
			Algorithm::Dijkstra,
			&four_cycle(),
			steps(json!([{"type": "path", "edges": [[0, 2], [2, 3]]}])),
		);
		p.step_forward();
		assert!(!p.explanation().step.contains("Error:"));
		assert_eq!(
			p.scene().edge_style(NodeId(3), NodeId(2)),
			Some(EdgeStyle::new(EdgeRole::ShortestPath, 4.0))
		);
	}

	#[test]
	fn quicksort_is_not_a_graph_algorithm() {
		assert!(GraphInterpreter::new(Algorithm::QuickSort).is_err());
	}
}
