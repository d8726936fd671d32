use std::cell::RefCell;
use std::rc::{Rc, Weak};

use leptos::prelude::*;
use log::error;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::editor::{EdgePrompt, EditMode};
use super::render;
use super::state::LayoutConfig;
use super::types::GraphData;
use super::visualizer::GraphVisualizer;
use crate::components::controls::{Dispatch, ExplanationPanel, PanelSignals, control_panel};
use crate::components::listeners::{
	AnimationLoop, IntervalTicker, ListenerGuard, MountedHooks, fit_to_parent, keyboard_shortcuts,
};
use crate::config::PlaybackConfig;
use crate::explain::{Explanation, ExplanationSink};
use crate::playback::Command;
use crate::steps::{Algorithm, Step};

type Viz = GraphVisualizer<IntervalTicker>;

/// Signals mirroring the visualizer for the view.
#[derive(Clone, Copy)]
struct Mirror {
	panel: PanelSignals,
	mode: RwSignal<EditMode>,
	prompt: RwSignal<Option<EdgePrompt>>,
}

impl Mirror {
	fn sync(&self, viz: &Viz) {
		self.panel.sync(viz.explanation(), viz.status(), viz.config().speed);
		let mode = viz.editor().mode();
		if self.mode.get_untracked() != mode {
			self.mode.set(mode);
		}
		let prompt = viz.editor().prompt();
		if self.prompt.get_untracked() != prompt {
			self.prompt.set(prompt);
		}
	}
}

#[derive(Clone)]
struct Handle {
	viz: Rc<RefCell<Option<Viz>>>,
	mirror: Mirror,
}

impl Handle {
	/// Runs `f` on the mounted visualizer, then refreshes the signals.
	fn update(&self, f: impl FnOnce(&mut Viz)) {
		let mut slot = self.viz.borrow_mut();
		let Some(viz) = slot.as_mut() else {
			return;
		};
		f(viz);
		self.mirror.sync(viz);
	}

	fn downgrade(&self) -> (Weak<RefCell<Option<Viz>>>, Mirror) {
		(Rc::downgrade(&self.viz), self.mirror)
	}
}

fn canvas_point(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

/// Editable graph canvas that replays DFS, BFS or Dijkstra steps.
#[component]
pub fn GraphVisualization(
	/// DFS, BFS or Dijkstra.
	algorithm: Algorithm,
	/// The graph before any step or edit.
	data: GraphData,
	/// Steps to replay.
	steps: Vec<Step>,
	/// Speed and timing.
	#[prop(optional)]
	config: PlaybackConfig,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let mirror = Mirror {
		panel: PanelSignals::new(config.speed),
		mode: RwSignal::new(EditMode::Select),
		prompt: RwSignal::new(None),
	};
	let weight = RwSignal::new("1".to_string());
	let handle = Handle {
		viz: Rc::new(RefCell::new(None)),
		mirror,
	};
	let hooks = StoredValue::new_local(None::<MountedHooks>);

	let handle_init = handle.clone();
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if handle_init.viz.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let (w, h) = fit_to_parent(&canvas);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			error!("canvas has no 2d context");
			return;
		};

		let ticker = IntervalTicker::new();
		let on_tick = ticker.handler();
		let viz = match GraphVisualizer::new(
			algorithm,
			data.clone(),
			steps.clone(),
			config,
			LayoutConfig::default(),
			(w, h),
			ticker,
		) {
			Ok(viz) => viz,
			Err(err) => {
				error!("cannot mount {}: {err}", algorithm.tag());
				let mut panel = Explanation::default();
				panel.set_title(&format!("{} Visualization", algorithm.display_name()));
				panel.show_error(&err);
				mirror.panel.explanation.set(panel);
				return;
			}
		};
		mirror.sync(&viz);
		*handle_init.viz.borrow_mut() = Some(viz);

		let (weak, tick_mirror) = handle_init.downgrade();
		*on_tick.borrow_mut() = Some(Box::new(move || {
			if let Some(viz) = weak.upgrade() {
				if let Some(viz) = viz.borrow_mut().as_mut() {
					viz.on_timer();
					tick_mirror.sync(viz);
				}
			}
		}));

		let frame_viz = handle_init.viz.clone();
		let frame = AnimationLoop::start(move |dt| {
			if let Some(viz) = frame_viz.borrow_mut().as_mut() {
				viz.advance_frame(dt);
				render::render(viz.scene(), &ctx);
			}
		});

		let key_handle = handle_init.clone();
		let keys = keyboard_shortcuts(move |command| key_handle.update(|viz| viz.dispatch(command)));

		let resize_handle = handle_init.clone();
		let resize = ListenerGuard::on_window("resize", move |_| {
			let (w, h) = fit_to_parent(&canvas);
			resize_handle.update(|viz| viz.scene_mut().resize(w, h));
		});

		hooks.set_value(Some(MountedHooks::new(frame, keys, resize)));
	});

	let dispatch: Dispatch = {
		let handle = handle.clone();
		Rc::new(move |command: Command| handle.update(|viz| viz.dispatch(command)))
	};

	let handle_md = handle.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = canvas_point(&canvas.into(), &ev);
		handle_md.update(|viz| {
			if viz.editor().mode() == EditMode::Select {
				viz.scene_mut().pointer_down(x, y);
			} else {
				viz.click(x, y);
			}
		});
	};

	let handle_mm = handle.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = canvas_point(&canvas.into(), &ev);
		if let Some(viz) = handle_mm.viz.borrow_mut().as_mut() {
			viz.scene_mut().pointer_move(x, y);
		}
	};

	let handle_mu = handle.clone();
	let on_pointer_release = move |_: MouseEvent| {
		if let Some(viz) = handle_mu.viz.borrow_mut().as_mut() {
			viz.scene_mut().pointer_up();
		}
	};
	let on_mouseleave = on_pointer_release.clone();

	let handle_wh = handle.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = canvas_point(&canvas.into(), &ev);
		if let Some(viz) = handle_wh.viz.borrow_mut().as_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			viz.scene_mut().zoom_at(x, y, factor);
		}
	};

	let zoom = |factor: Option<f64>| {
		let handle = handle.clone();
		move |_: MouseEvent| {
			if let Some(viz) = handle.viz.borrow_mut().as_mut() {
				match factor {
					Some(factor) => viz.scene_mut().zoom_by(factor),
					None => viz.scene_mut().reset_view(),
				}
			}
		}
	};
	let (on_zoom_in, on_zoom_out, on_zoom_reset) = (zoom(Some(1.2)), zoom(Some(1.0 / 1.2)), zoom(None));

	let handle_reset = handle.clone();
	let on_reset_graph = move |_: MouseEvent| handle_reset.update(|viz| viz.reset_graph());

	let mode_buttons = EditMode::ALL
		.into_iter()
		.map(|m| {
			let handle = handle.clone();
			view! {
				<button
					class="editor-button"
					class:active=move || mirror.mode.get() == m
					title=m.hint()
					on:click=move |_| handle.update(|viz| viz.set_mode(m))
				>
					{m.label()}
				</button>
			}
		})
		.collect_view();

	// Reactive children must be `Send`, so the dialog reaches the handle through local storage.
	let stored = StoredValue::new_local(handle.clone());
	let confirm = move || {
		let text = weight.get_untracked();
		stored.with_value(|h| h.update(|viz| viz.confirm_edge(&text)));
		weight.set("1".to_string());
	};
	let dialog = move || {
		mirror.prompt.get().map(|prompt| {
			view! {
				<div class="weight-dialog">
					<h3>{prompt.title()}</h3>
					<p>{prompt.question()}</p>
					<input
						type="number"
						min="1"
						prop:value=move || weight.get()
						on:input=move |ev| weight.set(event_target_value(&ev))
						on:keydown=move |ev| {
							if ev.key() == "Enter" {
								confirm();
							}
						}
					/>
					<div class="dialog-buttons">
						<button
							class="cancel"
							on:click=move |_| stored.with_value(|h| h.update(|viz| viz.cancel_edge()))
						>
							"Cancel"
						</button>
						<button class="confirm" on:click=move |_| confirm()>
							"Add Edge"
						</button>
					</div>
				</div>
			}
		})
	};

	view! {
		<div class="visualization graph-visualization">
			<div class="editor-controls">
				{mode_buttons}
				<button class="editor-button" on:click=on_reset_graph>
					"Reset Graph"
				</button>
				<span class="zoom-controls">
					<button title="Zoom in" on:click=on_zoom_in>"+"</button>
					<button title="Zoom out" on:click=on_zoom_out>"−"</button>
					<button title="Reset view" on:click=on_zoom_reset>"1:1"</button>
				</span>
			</div>
			<div class="canvas-container">
				<canvas
					node_ref=canvas_ref
					class="graph-canvas"
					on:mousedown=on_mousedown
					on:mousemove=on_mousemove
					on:mouseup=on_pointer_release
					on:mouseleave=on_mouseleave
					on:wheel=on_wheel
					style:cursor=move || match mirror.mode.get() {
						EditMode::Select => "grab",
						EditMode::AddNode => "crosshair",
						EditMode::AddEdge => "pointer",
						EditMode::Delete => "not-allowed",
					}
				/>
				{dialog}
			</div>
			{control_panel(mirror.panel.status, mirror.panel.speed, dispatch)}
			<ExplanationPanel explanation=mirror.panel.explanation />
		</div>
	}
}
