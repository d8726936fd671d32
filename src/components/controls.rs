//! Playback buttons, the step scrubber, the speed selector and the
//! explanation panel. Both visualizations share them.

use std::rc::Rc;

use leptos::ev;
use leptos::prelude::*;

use crate::config::SPEED_PRESETS;
use crate::explain::Explanation;
use crate::playback::{Command, PlaybackStatus};

/// Sends a control command to the mounted visualization.
pub type Dispatch = Rc<dyn Fn(Command)>;

/// Signals mirroring a player's explanation, status and speed for the view.
#[derive(Clone, Copy)]
pub struct PanelSignals {
	/// Mirrors the explanation panel.
	pub explanation: RwSignal<Explanation>,
	/// Mirrors the step counter and play state.
	pub status: RwSignal<PlaybackStatus>,
	/// Mirrors the speed multiplier.
	pub speed: RwSignal<f64>,
}

impl PanelSignals {
	/// Signals for a player that starts at `speed`.
	pub fn new(speed: f64) -> Self {
		Self {
			explanation: RwSignal::new(Explanation::default()),
			status: RwSignal::new(PlaybackStatus::default()),
			speed: RwSignal::new(speed),
		}
	}

	/// Writes only the signals whose value changed.
	pub fn sync(&self, explanation: &Explanation, status: PlaybackStatus, speed: f64) {
		if self.explanation.with_untracked(|e| e != explanation) {
			self.explanation.set(explanation.clone());
		}
		if self.status.get_untracked() != status {
			self.status.set(status);
		}
		if self.speed.get_untracked() != speed {
			self.speed.set(speed);
		}
	}
}

/// Reset, previous, play/pause and next buttons, the scrubber, the step counter and the speed selector.
pub fn control_panel(status: RwSignal<PlaybackStatus>, speed: RwSignal<f64>, dispatch: Dispatch) -> impl IntoView {
	let (seek, set_speed) = (dispatch.clone(), dispatch.clone());
	let send = move |command: Command| {
		let dispatch = dispatch.clone();
		move |_: ev::MouseEvent| dispatch(command)
	};
	let on_reset = send(Command::Reset);
	let on_prev = send(Command::Prev);
	let on_toggle = send(Command::TogglePlay);
	let on_next = send(Command::Next);

	view! {
		<div class="controls">
			<button class="control-button" title="Reset (R)" on:click=on_reset>
				"Reset"
			</button>
			<button class="control-button" title="Previous step (Left)" on:click=on_prev>
				"Previous"
			</button>
			<button class="control-button primary" title="Play / pause (Space)" on:click=on_toggle>
				{move || if status.get().playing { "Pause" } else { "Play" }}
			</button>
			<button class="control-button" title="Next step (Right)" on:click=on_next>
				"Next"
			</button>
			<input
				class="step-slider"
				type="range"
				min="0"
				prop:max=move || status.get().len.to_string()
				prop:value=move || status.get().index.to_string()
				on:input=move |ev| {
					if let Ok(target) = event_target_value(&ev).parse::<usize>() {
						seek(Command::Seek(target));
					}
				}
			/>
			<span class="step-counter">{move || status.get().counter()}</span>
			<label class="speed-control">
				"Speed "
				<select on:change=move |ev| {
					if let Ok(value) = event_target_value(&ev).parse::<f64>() {
						set_speed(Command::SetSpeed(value));
					}
				}>
					{SPEED_PRESETS
						.iter()
						.map(|&(label, value)| {
							view! {
								<option value=value.to_string() selected=move || speed.get() == value>
									{format!("{label} ({value}x)")}
								</option>
							}
						})
						.collect_view()}
				</select>
			</label>
		</div>
	}
}

/// Title, step and reason of the current step.
#[component]
pub fn ExplanationPanel(
	/// Panel contents; step and reason are trusted HTML.
	explanation: RwSignal<Explanation>,
) -> impl IntoView {
	view! {
		<div class="explanation-panel">
			<h3 class="explanation-title">{move || explanation.with(|e| e.title.clone())}</h3>
			<div class="explanation-section">
				<h4>"Current Step"</h4>
				<div class="explanation-step" inner_html=move || explanation.with(|e| e.step.clone()) />
			</div>
			<div class="explanation-section">
				<h4>"Explanation"</h4>
				<div class="explanation-reason" inner_html=move || explanation.with(|e| e.reason.clone()) />
			</div>
		</div>
	}
}
