use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{error, info};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::interpret::QuickSortInterpreter;
use super::render;
use super::state::BarScene;
use crate::components::controls::{Dispatch, ExplanationPanel, PanelSignals, control_panel};
use crate::components::listeners::{
	AnimationLoop, IntervalTicker, ListenerGuard, MountedHooks, fit_to_parent, keyboard_shortcuts,
};
use crate::config::PlaybackConfig;
use crate::playback::{Command, Player};
use crate::steps::Step;

type Viz = Player<QuickSortInterpreter, IntervalTicker>;

fn sync(panel: &PanelSignals, viz: &Viz) {
	panel.sync(viz.explanation(), viz.status(), viz.config().speed);
}

/// Animated QuickSort bars with playback controls and an explanation panel.
#[component]
pub fn BarVisualization(
	/// Values before the first step.
	array: Vec<f64>,
	/// QuickSort steps to replay.
	steps: Vec<Step>,
	/// Speed and timing.
	#[prop(optional)]
	config: PlaybackConfig,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let panel = PanelSignals::new(config.speed);
	let viz: Rc<RefCell<Option<Viz>>> = Rc::new(RefCell::new(None));
	let hooks = StoredValue::new_local(None::<MountedHooks>);

	let update = {
		let viz = viz.clone();
		move |f: &dyn Fn(&mut Viz)| {
			if let Some(viz) = viz.borrow_mut().as_mut() {
				f(viz);
				sync(&panel, viz);
			}
		}
	};

	let viz_init = viz.clone();
	let update_init = update.clone();
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if viz_init.borrow().is_some() {
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
		let scene = BarScene::new(array.clone(), w, h, config.transition_ms);
		let player = Player::new(QuickSortInterpreter, scene, steps.clone(), config, ticker);
		info!("mounted quicksort on {} values", array.len());
		sync(&panel, &player);
		*viz_init.borrow_mut() = Some(player);

		let weak = Rc::downgrade(&viz_init);
		*on_tick.borrow_mut() = Some(Box::new(move || {
			if let Some(viz) = weak.upgrade() {
				if let Some(viz) = viz.borrow_mut().as_mut() {
					viz.on_tick();
					sync(&panel, viz);
				}
			}
		}));

		let frame_viz = viz_init.clone();
		let frame = AnimationLoop::start(move |dt| {
			if let Some(viz) = frame_viz.borrow_mut().as_mut() {
				viz.advance_frame(dt);
				render::render(viz.scene(), &ctx);
			}
		});

		let key_update = update_init.clone();
		let keys = keyboard_shortcuts(move |command| key_update(&|viz| viz.dispatch(command)));

		let resize_update = update_init.clone();
		let resize = ListenerGuard::on_window("resize", move |_| {
			let (w, h) = fit_to_parent(&canvas);
			resize_update(&|viz| viz.scene_mut().resize(w, h));
		});

		hooks.set_value(Some(MountedHooks::new(frame, keys, resize)));
	});

	let dispatch: Dispatch = {
		let update = update.clone();
		Rc::new(move |command: Command| update(&|viz| viz.dispatch(command)))
	};

	let viz_wheel = viz.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some(viz) = viz_wheel.borrow_mut().as_mut() {
			viz.scene_mut().zoom_by(if ev.delta_y() > 0.0 { 0.9 } else { 1.1 });
		}
	};

	let zoom = |factor: Option<f64>| {
		let viz = viz.clone();
		move |_: MouseEvent| {
			if let Some(viz) = viz.borrow_mut().as_mut() {
				match factor {
					Some(factor) => viz.scene_mut().zoom_by(factor),
					None => viz.scene_mut().reset_view(),
				}
			}
		}
	};
	let (on_zoom_in, on_zoom_out, on_zoom_reset) = (zoom(Some(1.2)), zoom(Some(1.0 / 1.2)), zoom(None));

	view! {
		<div class="visualization bar-visualization">
			<div class="editor-controls">
				<span class="legend">
					<span class="swatch pivot">"Pivot"</span>
					<span class="swatch comparing">"Comparing"</span>
					<span class="swatch swapping">"Swapping"</span>
					<span class="swatch sorted">"Sorted"</span>
				</span>
				<span class="zoom-controls">
					<button title="Zoom in" on:click=on_zoom_in>"+"</button>
					<button title="Zoom out" on:click=on_zoom_out>"−"</button>
					<button title="Reset view" on:click=on_zoom_reset>"1:1"</button>
				</span>
			</div>
			<div class="canvas-container">
				<canvas node_ref=canvas_ref class="bar-canvas" on:wheel=on_wheel />
			</div>
			{control_panel(panel.status, panel.speed, dispatch)}
			<ExplanationPanel explanation=panel.explanation />
		</div>
	}
}
