//! One mounted graph visualization: dataset, editor and player together.

use log::{info, warn};

use super::editor::{EditMode, GraphEditor};
use super::interpret::GraphInterpreter;
use super::state::{GraphScene, LayoutConfig};
use super::types::GraphData;
use crate::config::PlaybackConfig;
use crate::error::{VizError, VizResult};
use crate::explain::{Explanation, ExplanationSink, paragraph};
use crate::playback::{Command, PlaybackStatus, Player, Ticker};
use crate::steps::{Algorithm, NodeId, Step};

/// Owns the dataset and keeps live edits and step playback apart: edits are
/// refused while playing, and starting playback leaves edit mode.
pub struct GraphVisualizer<T: Ticker> {
	data: GraphData,
	original: GraphData,
	editor: GraphEditor,
	player: Player<GraphInterpreter, T>,
}

impl<T: Ticker> GraphVisualizer<T> {
	/// Mounts `data` and `steps` for `algorithm` on a `size` canvas.
	pub fn new(
		algorithm: Algorithm,
		data: GraphData,
		steps: Vec<Step>,
		config: PlaybackConfig,
		layout: LayoutConfig,
		size: (f64, f64),
		ticker: T,
	) -> VizResult<Self> {
		data.validate()?;
		let interpreter = GraphInterpreter::new(algorithm)?;
		let scene = GraphScene::new(
			&data,
			algorithm == Algorithm::Dijkstra,
			size.0,
			size.1,
			layout,
			config.transition_ms,
		);
		info!(
			"mounted {} on {} nodes / {} links",
			algorithm.tag(),
			data.nodes.len(),
			data.links.len()
		);
		Ok(Self {
			original: data.clone(),
			data,
			editor: GraphEditor::default(),
			player: Player::new(interpreter, scene, steps, config, ticker),
		})
	}

	/// The dataset, including edits.
	pub fn data(&self) -> &GraphData {
		&self.data
	}

	/// Edit mode state.
	pub fn editor(&self) -> &GraphEditor {
		&self.editor
	}

	/// The scene.
	pub fn scene(&self) -> &GraphScene {
		self.player.scene()
	}

	/// The scene, for pointer and view changes.
	pub fn scene_mut(&mut self) -> &mut GraphScene {
		self.player.scene_mut()
	}

	/// The explanation panel contents.
	pub fn explanation(&self) -> &Explanation {
		self.player.explanation()
	}

	/// Snapshot for the control panel.
	pub fn status(&self) -> PlaybackStatus {
		self.player.status()
	}

	/// Current timing configuration.
	pub fn config(&self) -> PlaybackConfig {
		self.player.config()
	}

	/// Whether the graph was edited since mounting.
	pub fn is_user_edited(&self) -> bool {
		self.editor.is_user_edited()
	}

	/// Runs a control-surface command. Anything that starts playback first
	/// drops out of edit mode.
	pub fn dispatch(&mut self, command: Command) {
		let starts = match command {
			Command::Play => true,
			Command::TogglePlay => !self.player.is_playing(),
			_ => false,
		};
		if starts && self.editor.mode() != EditMode::Select {
			self.editor.leave_editing();
			self.scene_mut().set_pending(None);
		}
		self.player.dispatch(command);
	}

	/// Interval callback.
	pub fn on_timer(&mut self) {
		self.player.on_tick();
	}

	/// Advances fades and the layout by `dt_ms`.
	pub fn advance_frame(&mut self, dt_ms: f64) {
		self.player.advance_frame(dt_ms);
	}

	/// Switches edit mode. Any mode but select pauses playback and freezes the
	/// automatic layout for good.
	pub fn set_mode(&mut self, mode: EditMode) {
		if mode != EditMode::Select {
			self.player.pause();
			self.scene_mut().freeze_layout();
		}
		self.editor.set_mode(mode, self.player.explanation_mut());
		self.scene_mut().set_pending(None);
	}

	/// A click in an edit mode, in canvas pixels.
	pub fn click(&mut self, sx: f64, sy: f64) {
		if self.editor.mode() == EditMode::Select {
			return;
		}
		let scene = self.player.scene();
		let target = if let Some(id) = scene.node_at_position(sx, sy) {
			Target::Node(id)
		} else if let Some((source, target)) = scene.edge_at_position(sx, sy) {
			Target::Edge(source, target)
		} else {
			let (x, y) = scene.screen_to_graph(sx, sy);
			Target::Canvas(x, y)
		};
		self.edit(|editor, data, note| match target {
			Target::Node(id) => editor.click_node(data, id, note),
			Target::Edge(source, target) => editor.click_edge(data, source, target, note),
			Target::Canvas(x, y) => editor.click_canvas(data, x, y, note),
		});
	}

	/// Adds the prompted edge with the typed weight.
	pub fn confirm_edge(&mut self, weight: &str) {
		self.edit(|editor, data, note| editor.confirm_edge(data, weight, note));
	}

	/// Closes the weight dialog.
	pub fn cancel_edge(&mut self) {
		self.editor.cancel_edge();
		self.scene_mut().set_pending(None);
	}

	fn edit(
		&mut self,
		op: impl FnOnce(&mut GraphEditor, &mut GraphData, &mut dyn ExplanationSink) -> VizResult<bool>,
	) {
		if self.player.is_playing() {
			self.report(&VizError::PlaybackActive);
			return;
		}
		let mut note = Explanation::default();
		match op(&mut self.editor, &mut self.data, &mut note as &mut dyn ExplanationSink) {
			Ok(changed) => {
				if changed {
					self.commit();
				}
				if note != Explanation::default() {
					*self.player.explanation_mut() = note;
				}
			}
			Err(err) => {
				self.editor.cancel_edge();
				self.report(&err);
			}
		}
		let pending = self.editor.pending_source();
		self.scene_mut().set_pending(pending);
	}

	/// Settles an edit: no physics, baseline styles, playback back at zero.
	fn commit(&mut self) {
		let scene = self.player.scene_mut();
		scene.freeze_layout();
		scene.relayout(&self.data);
		self.player.reset();
	}

	fn report(&mut self, err: &VizError) {
		warn!("edit rejected: {err}");
		let panel = self.player.explanation_mut();
		panel.set_title("Graph Editor: Error");
		panel.show_error(err);
	}

	/// Restores the dataset as mounted and lets the automatic layout run again.
	pub fn reset_graph(&mut self) {
		self.player.reset();
		self.data = self.original.clone();
		self.editor = GraphEditor::default();
		let data = &self.data;
		self.player.scene_mut().restart_layout(data);
		info!("graph reset to {} nodes / {} links", data.nodes.len(), data.links.len());
		let panel = self.player.explanation_mut();
		panel.set_title("Graph Editor: Graph Reset");
		panel.set_step(&paragraph("The graph is back to its original nodes and edges."));
		panel.set_reason(&paragraph(EditMode::Select.hint()));
	}
}

#[derive(Clone, Copy)]
enum Target {
	Node(NodeId),
	Edge(NodeId, NodeId),
	Canvas(f64, f64),
}
