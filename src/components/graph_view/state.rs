use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::debug;

use super::types::{GraphData, GraphLink};
use crate::components::color::Rgb;
use crate::playback::{Fade, Scene, Transition};
use crate::steps::NodeId;

/// Node circle radius in graph units.
pub const NODE_RADIUS: f64 = 25.0;
/// Edge width outside any highlight.
pub const BASE_EDGE_WIDTH: f64 = 2.0;
const EDGE_HIT_TOLERANCE: f64 = 6.0;
const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 5.0;

/// Traversal state of a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NodeRole {
	/// Not reached yet.
	#[default]
	Unvisited,
	/// Reached by the traversal.
	Visited,
	/// Finished by the traversal (`complete`).
	Current,
}

impl NodeRole {
	/// Fill colour of a node in this role.
	pub fn color(self) -> Rgb {
		match self {
			Self::Unvisited => Rgb::hex(0x4f8fca),
			Self::Visited => Rgb::hex(0xff5722),
			Self::Current => Rgb::hex(0xffeb3b),
		}
	}
}

/// Highlight state of an edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EdgeRole {
	/// Not highlighted.
	#[default]
	Default,
	/// Being explored or relaxed.
	Highlighted,
	/// Part of the final shortest-path tree.
	ShortestPath,
}

impl EdgeRole {
	/// Stroke colour of an edge in this role.
	pub fn color(self) -> Rgb {
		match self {
			Self::Default => Rgb::hex(0x777777),
			Self::Highlighted => Rgb::hex(0xff5722),
			Self::ShortestPath => Rgb::hex(0x9c27b0),
		}
	}
}

/// What an edge is painted as.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeStyle {
	/// Colour role.
	pub role: EdgeRole,
	/// Stroke width.
	pub width: f64,
}

impl EdgeStyle {
	/// The unhighlighted look.
	pub const BASELINE: Self = Self {
		role: EdgeRole::Default,
		width: BASE_EDGE_WIDTH,
	};

	/// A role at a given width.
	pub fn new(role: EdgeRole, width: f64) -> Self {
		Self { role, width }
	}
}

/// Per-node payload carried through the force simulation.
#[derive(Clone, Debug, Default)]
pub(crate) struct NodeInfo {
	pub id: NodeId,
	role: NodeRole,
	pub tint: Fade<Rgb>,
	pub distance: String,
}

impl NodeInfo {
	fn new(id: NodeId) -> Self {
		Self {
			id,
			role: NodeRole::Unvisited,
			tint: Fade::new(NodeRole::Unvisited.color()),
			distance: "∞".into(),
		}
	}

	fn set_role(&mut self, role: NodeRole, transition: Transition) {
		self.role = role;
		self.tint.set(role.color(), transition);
	}
}

/// A drawn link with its current style and the fades towards it.
#[derive(Clone, Debug)]
pub(crate) struct EdgeView {
	pub link: GraphLink,
	style: EdgeStyle,
	pub tint: Fade<Rgb>,
	pub width: Fade<f64>,
}

impl EdgeView {
	fn new(link: &GraphLink) -> Self {
		Self {
			link: link.clone(),
			style: EdgeStyle::BASELINE,
			tint: Fade::new(EdgeStyle::BASELINE.role.color()),
			width: Fade::new(EdgeStyle::BASELINE.width),
		}
	}

	pub fn style(&self) -> EdgeStyle {
		self.style
	}

	fn set_style(&mut self, style: EdgeStyle, transition: Transition) {
		self.style = style;
		self.tint.set(style.role.color(), transition);
		self.width.set(style.width, transition);
	}
}

#[derive(Clone, Debug)]
pub(crate) struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self { x: 0.0, y: 0.0, k: 1.0 }
	}
}

#[derive(Clone, Debug, Default)]
pub(crate) struct DragState {
	pub active: bool,
	pub node: Option<NodeId>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f64,
	pub node_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Whether the force layout is still moving nodes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LayoutPhase {
	/// Physics is moving unpinned nodes; settles after `remaining` seconds.
	Running {
		/// Seconds of physics left.
		remaining: f32,
	},
	/// Physics finished on its own and every node was pinned.
	Settled,
	/// An edit froze the layout; only a full graph reset restarts physics.
	Frozen,
}

/// Force simulation tuning.
#[derive(Clone, Copy, Debug)]
pub struct LayoutConfig {
	/// Repulsion between nodes.
	pub force_charge: f32,
	/// Pull along edges.
	pub force_spring: f32,
	/// Cap on any single force.
	pub force_max: f32,
	/// Velocity scale.
	pub node_speed: f32,
	/// Per-tick velocity decay.
	pub damping_factor: f32,
	/// Physics time before every node is pinned.
	pub settle_seconds: f32,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			force_charge: 400.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
			settle_seconds: 3.0,
		}
	}
}

/// Scene of a graph visualization: node and edge styling, distance labels,
/// the pan/zoom transform, and a force layout that only runs until it settles
/// or an edit freezes it.
pub struct GraphScene {
	pub(super) graph: ForceGraph<NodeInfo, ()>,
	nodes: HashMap<NodeId, DefaultNodeIdx>,
	edges: Vec<EdgeView>,
	directed: bool,
	show_distances: bool,
	pending: Option<NodeId>,
	pub(crate) transform: ViewTransform,
	pub(crate) drag: DragState,
	pub(crate) pan: PanState,
	pub(crate) width: f64,
	pub(crate) height: f64,
	layout: LayoutPhase,
	config: LayoutConfig,
	transition_ms: f64,
}

impl GraphScene {
	/// Lays `data` out across a `width` by `height` canvas.
	pub fn new(
		data: &GraphData,
		show_distances: bool,
		width: f64,
		height: f64,
		config: LayoutConfig,
		transition_ms: f64,
	) -> Self {
		let mut scene = Self {
			graph: Self::simulation(&config),
			nodes: HashMap::new(),
			edges: Vec::new(),
			directed: data.directed,
			show_distances,
			pending: None,
			transform: ViewTransform::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			width,
			height,
			layout: Self::initial_phase(data, &config),
			config,
			transition_ms,
		};
		scene.build(data, &HashMap::new());
		scene
	}

	fn simulation(config: &LayoutConfig) -> ForceGraph<NodeInfo, ()> {
		ForceGraph::new(SimulationParameters {
			force_charge: config.force_charge,
			force_spring: config.force_spring,
			force_max: config.force_max,
			node_speed: config.node_speed,
			damping_factor: config.damping_factor,
		})
	}

	/// Physics only runs for a graph nobody has laid out yet.
	fn initial_phase(data: &GraphData, config: &LayoutConfig) -> LayoutPhase {
		if !data.nodes.is_empty() && data.nodes.iter().all(|n| n.position().is_none()) {
			LayoutPhase::Running {
				remaining: config.settle_seconds,
			}
		} else {
			LayoutPhase::Settled
		}
	}

	fn build(&mut self, data: &GraphData, previous: &HashMap<NodeId, (f32, f32, bool)>) {
		let mut graph = Self::simulation(&self.config);
		let mut nodes = HashMap::new();
		let anchor_all = !matches!(self.layout, LayoutPhase::Running { .. });
		let count = data.nodes.len().max(1);
		let radius = self.width.min(self.height) / 3.0;

		for (i, node) in data.nodes.iter().enumerate() {
			let (x, y, pinned) = if let Some(&kept) = previous.get(&node.id) {
				kept
			} else if let Some((x, y)) = node.position() {
				(x as f32, y as f32, node.fixed || anchor_all)
			} else {
				let angle = (i as f64) * 2.0 * PI / count as f64;
				(
					(self.width / 2.0 + radius * angle.cos()) as f32,
					(self.height / 2.0 + radius * angle.sin()) as f32,
					false,
				)
			};
			let idx = graph.add_node(NodeData {
				x,
				y,
				mass: 10.0,
				is_anchor: pinned || anchor_all,
				user_data: NodeInfo::new(node.id),
			});
			nodes.insert(node.id, idx);
		}

		let mut edges = Vec::new();
		for link in &data.links {
			if let (Some(&src), Some(&tgt)) = (nodes.get(&link.source), nodes.get(&link.target)) {
				graph.add_edge(src, tgt, EdgeData::default());
				edges.push(EdgeView::new(link));
			}
		}

		self.graph = graph;
		self.nodes = nodes;
		self.edges = edges;
		self.directed = data.directed;
		if self.pending.is_some_and(|id| !self.nodes.contains_key(&id)) {
			self.pending = None;
		}
	}

	/// `(x, y, pinned)` of every node currently in the scene.
	fn snapshot_positions(&self) -> HashMap<NodeId, (f32, f32, bool)> {
		let mut positions = HashMap::new();
		self.graph.visit_nodes(|node| {
			positions.insert(
				node.data.user_data.id,
				(node.x(), node.y(), node.data.is_anchor),
			);
		});
		positions
	}

	/// Rebinds the scene to an edited dataset. Existing nodes keep their
	/// position and pin; styles return to the baseline.
	pub fn relayout(&mut self, data: &GraphData) {
		let previous = self.snapshot_positions();
		self.build(data, &previous);
		debug!(
			"relayout: {} nodes, {} edges, layout {:?}",
			self.nodes.len(),
			self.edges.len(),
			self.layout
		);
	}

	/// Pins every node and stops physics for good.
	pub fn freeze_layout(&mut self) {
		if self.layout != LayoutPhase::Frozen {
			debug!("layout frozen");
		}
		self.layout = LayoutPhase::Frozen;
		self.pin_all();
	}

	/// Forgets every position and pin, then lets physics lay `data` out again.
	pub fn restart_layout(&mut self, data: &GraphData) {
		self.layout = Self::initial_phase(data, &self.config);
		self.pending = None;
		self.build(data, &HashMap::new());
	}

	fn pin_all(&mut self) {
		self.graph.visit_nodes_mut(|node| node.data.is_anchor = true);
	}

	/// Current layout phase.
	pub fn layout_phase(&self) -> LayoutPhase {
		self.layout
	}

	/// Whether edges have a direction.
	pub fn is_directed(&self) -> bool {
		self.directed
	}

	/// Whether distance labels are drawn.
	pub fn shows_distances(&self) -> bool {
		self.show_distances
	}

	/// Whether node `id` is in the scene.
	pub fn contains(&self, id: NodeId) -> bool {
		self.nodes.contains_key(&id)
	}

	pub(crate) fn edges(&self) -> &[EdgeView] {
		&self.edges
	}

	/// Highlighted source of an edge being added.
	pub fn pending(&self) -> Option<NodeId> {
		self.pending
	}

	/// Sets or clears the pending edge source.
	pub fn set_pending(&mut self, pending: Option<NodeId>) {
		self.pending = pending;
	}

	/// Paints every node `select` accepts. Returns how many were painted.
	pub fn paint_nodes(&mut self, select: impl Fn(NodeId) -> bool, role: NodeRole, transition: Transition) -> usize {
		let mut painted = 0;
		self.graph.visit_nodes_mut(|node| {
			if select(node.data.user_data.id) {
				node.data.user_data.set_role(role, transition);
				painted += 1;
			}
		});
		painted
	}

	pub(crate) fn paint_edges(
		&mut self,
		select: impl Fn(&EdgeView) -> bool,
		style: EdgeStyle,
		transition: Transition,
	) -> usize {
		let mut painted = 0;
		for edge in self.edges.iter_mut().filter(|e| select(e)) {
			edge.set_style(style, transition);
			painted += 1;
		}
		painted
	}

	/// Paints the edge `from -> to`, or both orientations when undirected.
	pub fn paint_link(&mut self, from: NodeId, to: NodeId, style: EdgeStyle, transition: Transition) -> usize {
		let directed = self.directed;
		self.paint_edges(|e| e.link.joins(from, to, directed), style, transition)
	}

	/// Paints every edge between `from` and `to`, whichever way it is stored.
	pub fn paint_connection(&mut self, from: NodeId, to: NodeId, style: EdgeStyle, transition: Transition) -> usize {
		self.paint_edges(|e| e.link.joins(from, to, false), style, transition)
	}

	/// Sets the distance label of `id`. Returns whether the node exists.
	pub fn set_distance(&mut self, id: NodeId, text: &str) -> bool {
		let mut found = false;
		self.graph.visit_nodes_mut(|node| {
			if node.data.user_data.id == id {
				node.data.user_data.distance = text.to_string();
				found = true;
			}
		});
		found
	}

	/// Role node `id` is heading to.
	pub fn node_role(&self, id: NodeId) -> Option<NodeRole> {
		let mut role = None;
		self.graph.visit_nodes(|node| {
			if node.data.user_data.id == id {
				role = Some(node.data.user_data.role);
			}
		});
		role
	}

	/// Distance label of node `id`.
	pub fn distance_label(&self, id: NodeId) -> Option<String> {
		let mut label = None;
		self.graph.visit_nodes(|node| {
			if node.data.user_data.id == id {
				label = Some(node.data.user_data.distance.clone());
			}
		});
		label
	}

	/// Style of the edge `from -> to`, or either way when undirected.
	pub fn edge_style(&self, from: NodeId, to: NodeId) -> Option<EdgeStyle> {
		self.edges
			.iter()
			.find(|e| e.link.joins(from, to, self.directed))
			.map(EdgeView::style)
	}

	/// Position of node `id` in graph units.
	pub fn position(&self, id: NodeId) -> Option<(f64, f64)> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.data.user_data.id == id {
				found = Some((node.x() as f64, node.y() as f64));
			}
		});
		found
	}

	/// Whether node `id` is pinned.
	pub fn is_pinned(&self, id: NodeId) -> bool {
		let mut pinned = false;
		self.graph.visit_nodes(|node| {
			if node.data.user_data.id == id {
				pinned = node.data.is_anchor;
			}
		});
		pinned
	}

	/// Drag target: repositions and pins.
	pub fn move_node(&mut self, id: NodeId, x: f64, y: f64) {
		self.graph.visit_nodes_mut(|node| {
			if node.data.user_data.id == id {
				node.data.x = x as f32;
				node.data.y = y as f32;
				node.data.is_anchor = true;
			}
		});
	}

	/// Every node and edge back to the baseline style.
	pub fn reset_styles(&mut self) {
		self.graph.visit_nodes_mut(|node| {
			node.data.user_data.set_role(NodeRole::Unvisited, Transition::Instant);
			node.data.user_data.distance = "∞".into();
		});
		for edge in &mut self.edges {
			edge.set_style(EdgeStyle::BASELINE, Transition::Instant);
		}
	}

	/// Canvas pixels to graph units.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// The node under canvas point `(sx, sy)`.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<NodeId> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			if (dx * dx + dy * dy).sqrt() < NODE_RADIUS {
				found = Some(node.data.user_data.id);
			}
		});
		found
	}

	/// The stored `(source, target)` of the edge under the cursor.
	pub fn edge_at_position(&self, sx: f64, sy: f64) -> Option<(NodeId, NodeId)> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let positions = self.snapshot_positions();
		let tolerance = EDGE_HIT_TOLERANCE / self.transform.k;
		self.edges
			.iter()
			.filter_map(|e| {
				let &(x1, y1, _) = positions.get(&e.link.source)?;
				let &(x2, y2, _) = positions.get(&e.link.target)?;
				let d = segment_distance((gx, gy), (x1 as f64, y1 as f64), (x2 as f64, y2 as f64));
				(d < tolerance).then_some((d, (e.link.source, e.link.target)))
			})
			.min_by(|a, b| a.0.total_cmp(&b.0))
			.map(|(_, key)| key)
	}

	/// Select-mode press: grabs the node under the pointer, else starts a pan.
	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		if let Some(id) = self.node_at_position(sx, sy) {
			let (node_start_x, node_start_y) = self.position(id).unwrap_or((0.0, 0.0));
			self.drag = DragState {
				active: true,
				node: Some(id),
				start_x: sx,
				start_y: sy,
				node_start_x,
				node_start_y,
			};
		} else {
			self.pan = PanState {
				active: true,
				start_x: sx,
				start_y: sy,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
			};
		}
	}

	/// Drags the grabbed node or pans the view.
	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		if self.drag.active {
			if let Some(id) = self.drag.node {
				let k = self.transform.k;
				let x = self.drag.node_start_x + (sx - self.drag.start_x) / k;
				let y = self.drag.node_start_y + (sy - self.drag.start_y) / k;
				self.move_node(id, x, y);
			}
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
		}
	}

	/// Ends any drag or pan.
	pub fn pointer_up(&mut self) {
		self.drag = DragState::default();
		self.pan = PanState::default();
	}

	/// Zooms about canvas point `(sx, sy)`, clamped.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Zooms about the canvas centre.
	pub fn zoom_by(&mut self, factor: f64) {
		self.zoom_at(self.width / 2.0, self.height / 2.0, factor);
	}

	/// Back to the untransformed view.
	pub fn reset_view(&mut self) {
		self.transform = ViewTransform::default();
	}

	/// Follows the canvas size.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Node positions keyed by id, for drawing edges.
	pub fn positions(&self) -> HashMap<NodeId, (f64, f64)> {
		self.snapshot_positions()
			.into_iter()
			.map(|(id, (x, y, _))| (id, (x as f64, y as f64)))
			.collect()
	}

	fn tick_layout(&mut self, dt: f32) {
		let LayoutPhase::Running { remaining } = self.layout else {
			return;
		};
		self.graph.update(dt);
		let remaining = remaining - dt;
		if remaining > 0.0 {
			self.layout = LayoutPhase::Running { remaining };
		} else {
			debug!("layout settled; pinning {} nodes", self.nodes.len());
			self.layout = LayoutPhase::Settled;
			self.pin_all();
		}
	}
}

impl Scene for GraphScene {
	fn reset(&mut self) {
		self.reset_styles();
	}

	fn advance(&mut self, dt_ms: f64) {
		let duration = self.transition_ms;
		self.graph
			.visit_nodes_mut(|node| node.data.user_data.tint.advance(dt_ms, duration));
		for edge in &mut self.edges {
			edge.tint.advance(dt_ms, duration);
			edge.width.advance(dt_ms, duration);
		}
		self.tick_layout((dt_ms / 1000.0) as f32);
	}
}

fn segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
	let (dx, dy) = (b.0 - a.0, b.1 - a.1);
	let len_sq = dx * dx + dy * dy;
	let t = if len_sq < 1e-9 {
		0.0
	} else {
		(((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0)
	};
	let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
	((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}
