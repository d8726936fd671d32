//! Step playback: the state machine that replays, rewinds and scrubs a trace.
//!
//! A [`Player`] owns everything a visualization mutates while replaying: the
//! step sequence, the scene, the explanation panel and the timer handle. The
//! index counts how many steps have been applied, so it ranges over
//! `0..=steps.len()`. Going backwards resets the scene and replays from zero,
//! because a step does not carry enough information to undo itself.

use log::{debug, info, warn};

use crate::config::PlaybackConfig;
use crate::error::VizResult;
use crate::explain::{Explanation, ExplanationSink};
use crate::steps::{Algorithm, Step};

/// Whether a paint should fade in or land immediately.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
	/// Used when stepping live.
	Animated,
	/// Used while fast-replaying during a backward seek.
	Instant,
}

pub(crate) fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Values a [`Fade`] can interpolate between.
pub trait Blend: Copy {
	/// `t = 0` is `self`, `t = 1` is `other`.
	fn blend(self, other: Self, t: f64) -> Self;
}

impl Blend for f64 {
	fn blend(self, other: f64, t: f64) -> f64 {
		self + (other - self) * t
	}
}

/// A style value that moves from its previous value to a target over time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fade<T> {
	from: T,
	to: T,
	progress: f64,
}

impl<T: Blend> Fade<T> {
	/// A settled value.
	pub fn new(value: T) -> Self {
		Self {
			from: value,
			to: value,
			progress: 1.0,
		}
	}

	/// The value the fade is heading to.
	pub fn target(&self) -> T {
		self.to
	}

	/// The eased value to draw right now.
	pub fn current(&self) -> T {
		self.from.blend(self.to, ease_out_cubic(self.progress))
	}

	/// Retargets the fade. An animated retarget starts from what is on screen,
	/// so a fade cut short by the next step does not jump.
	pub fn set(&mut self, value: T, transition: Transition) {
		match transition {
			Transition::Instant => *self = Self::new(value),
			Transition::Animated => {
				self.from = self.current();
				self.to = value;
				self.progress = 0.0;
			}
		}
	}

	/// Moves the fade forward by `dt_ms`.
	pub fn advance(&mut self, dt_ms: f64, duration_ms: f64) {
		self.progress = if duration_ms <= 0.0 {
			1.0
		} else {
			(self.progress + dt_ms / duration_ms).min(1.0)
		};
	}

	/// Whether the fade has reached its target.
	pub fn is_settled(&self) -> bool {
		self.progress >= 1.0
	}
}

impl<T: Blend + Default> Default for Fade<T> {
	fn default() -> Self {
		Self::new(T::default())
	}
}

/// The visual state a trace is replayed into.
pub trait Scene {
	/// Restores the baseline style and the dataset the scene was mounted with.
	fn reset(&mut self);
	/// Advances running transitions by `dt_ms`.
	fn advance(&mut self, dt_ms: f64);
}

/// The step being applied plus the steps before it.
#[derive(Clone, Copy, Debug)]
pub struct StepCursor<'a> {
	steps: &'a [Step],
	index: usize,
}

impl<'a> StepCursor<'a> {
	/// Points at `steps[index]`; `index` must be in bounds.
	pub fn new(steps: &'a [Step], index: usize) -> Self {
		debug_assert!(index < steps.len());
		Self { steps, index }
	}

	/// The current step.
	pub fn step(&self) -> &'a Step {
		&self.steps[self.index]
	}

	/// Zero-based position of the current step.
	pub fn index(&self) -> usize {
		self.index
	}

	/// Steps applied before this one, oldest first.
	pub fn earlier(&self) -> &'a [Step] {
		&self.steps[..self.index]
	}

	/// Length of the whole sequence.
	pub fn total(&self) -> usize {
		self.steps.len()
	}
}

/// Maps one step onto scene paints and explanation text.
pub trait Interpreter {
	/// The scene this interpreter paints.
	type Scene: Scene;

	/// The algorithm whose steps are read.
	fn algorithm(&self) -> Algorithm;

	/// Applies the step under `cursor`. Validation happens before any paint, so
	/// a rejected step leaves the scene untouched.
	fn apply(
		&self,
		cursor: StepCursor<'_>,
		scene: &mut Self::Scene,
		sink: &mut dyn ExplanationSink,
		transition: Transition,
	) -> VizResult<()>;
}

/// Cancels a running timer when dropped.
pub struct TimerGuard {
	cancel: Option<Box<dyn FnOnce()>>,
}

impl TimerGuard {
	/// Wraps the clock-specific cancellation.
	pub fn new(cancel: impl FnOnce() + 'static) -> Self {
		Self {
			cancel: Some(Box::new(cancel)),
		}
	}
}

impl Drop for TimerGuard {
	fn drop(&mut self) {
		if let Some(cancel) = self.cancel.take() {
			cancel();
		}
	}
}

/// A repeating clock. The tick callback is wired by whoever builds the ticker
/// and is expected to call [`Player::on_tick`].
pub trait Ticker {
	/// Starts ticking every `period_ms` until the guard is dropped.
	fn start(&mut self, period_ms: u32) -> VizResult<TimerGuard>;
}

/// Control surface commands, shared by buttons and keyboard shortcuts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
	/// Apply the next step.
	Next,
	/// Go back one step.
	Prev,
	/// Start or pause playback.
	TogglePlay,
	/// Start playback.
	Play,
	/// Pause playback.
	Pause,
	/// Back to before the first step.
	Reset,
	/// Change the speed multiplier.
	SetSpeed(f64),
	/// Jump to an index.
	Seek(usize),
}

impl Command {
	/// Keyboard shortcut mapping: Right, Left, Space and R.
	pub fn from_key(key: &str) -> Option<Self> {
		match key {
			"ArrowRight" => Some(Self::Next),
			"ArrowLeft" => Some(Self::Prev),
			" " | "Spacebar" => Some(Self::TogglePlay),
			"r" | "R" => Some(Self::Reset),
			_ => None,
		}
	}
}

/// What the control panel shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaybackStatus {
	/// Steps applied so far.
	pub index: usize,
	/// Length of the sequence.
	pub len: usize,
	/// Whether the timer is running.
	pub playing: bool,
}

impl PlaybackStatus {
	/// `Step: k / N`.
	pub fn counter(&self) -> String {
		format!("Step: {} / {}", self.index, self.len)
	}
}

/// Replays a step sequence into a scene.
pub struct Player<I: Interpreter, T: Ticker> {
	steps: Vec<Step>,
	interpreter: I,
	scene: I::Scene,
	explanation: Explanation,
	index: usize,
	config: PlaybackConfig,
	ticker: T,
	timer: Option<TimerGuard>,
}

impl<I: Interpreter, T: Ticker> Player<I, T> {
	/// Builds a player at index 0 with the scene at its baseline.
	pub fn new(interpreter: I, scene: I::Scene, steps: Vec<Step>, config: PlaybackConfig, ticker: T) -> Self {
		let mut player = Self {
			steps,
			interpreter,
			scene,
			explanation: Explanation::default(),
			index: 0,
			config,
			ticker,
			timer: None,
		};
		player.explanation.clear(&player.baseline_title());
		info!(
			"{} player ready with {} steps",
			player.interpreter.algorithm().tag(),
			player.steps.len()
		);
		player
	}

	fn baseline_title(&self) -> String {
		format!("{} Visualization", self.interpreter.algorithm().display_name())
	}

	/// Steps applied so far.
	pub fn index(&self) -> usize {
		self.index
	}

	/// Length of the sequence.
	pub fn len(&self) -> usize {
		self.steps.len()
	}

	/// Whether the sequence is empty.
	pub fn is_empty(&self) -> bool {
		self.steps.is_empty()
	}

	/// Whether the timer is running.
	pub fn is_playing(&self) -> bool {
		self.timer.is_some()
	}

	/// Snapshot for the control panel.
	pub fn status(&self) -> PlaybackStatus {
		PlaybackStatus {
			index: self.index,
			len: self.steps.len(),
			playing: self.is_playing(),
		}
	}

	/// The algorithm being replayed.
	pub fn algorithm(&self) -> Algorithm {
		self.interpreter.algorithm()
	}

	/// Current timing configuration.
	pub fn config(&self) -> PlaybackConfig {
		self.config
	}

	/// The scene.
	pub fn scene(&self) -> &I::Scene {
		&self.scene
	}

	/// The scene, for edits that bypass the step sequence.
	pub fn scene_mut(&mut self) -> &mut I::Scene {
		&mut self.scene
	}

	/// The explanation panel contents.
	pub fn explanation(&self) -> &Explanation {
		&self.explanation
	}

	/// The explanation panel, for messages that are not step text.
	pub fn explanation_mut(&mut self) -> &mut Explanation {
		&mut self.explanation
	}

	fn apply_at(&mut self, index: usize, transition: Transition) {
		let cursor = StepCursor::new(&self.steps, index);
		debug!("applying step {index} ({})", cursor.step().kind);
		if let Err(err) = self
			.interpreter
			.apply(cursor, &mut self.scene, &mut self.explanation, transition)
		{
			warn!("skipping step {index}: {err}");
			self.explanation.show_error(&err);
		}
	}

	fn advance(&mut self, transition: Transition) -> bool {
		if self.index >= self.steps.len() {
			return false;
		}
		self.apply_at(self.index, transition);
		self.index += 1;
		true
	}

	/// Applies the next step. No-op at the end.
	pub fn step_forward(&mut self) -> bool {
		self.pause();
		self.advance(Transition::Animated)
	}

	/// Goes back one step by replaying from zero. No-op at the start.
	pub fn step_backward(&mut self) -> bool {
		self.pause();
		if self.index == 0 {
			return false;
		}
		self.replay_to(self.index - 1);
		true
	}

	/// Scrubs to `target`, clamped to the sequence length.
	pub fn seek(&mut self, target: usize) {
		self.pause();
		let target = target.min(self.steps.len());
		if target < self.index {
			self.replay_to(target);
			return;
		}
		while self.index < target {
			let transition = if self.index + 1 == target {
				Transition::Animated
			} else {
				Transition::Instant
			};
			self.advance(transition);
		}
	}

	fn replay_to(&mut self, target: usize) {
		self.scene.reset();
		self.explanation.clear(&self.baseline_title());
		for index in 0..target {
			self.apply_at(index, Transition::Instant);
		}
		self.index = target;
		if target > 0 {
			// Once more, animated, so the latest highlight fades in like a live step.
			self.apply_at(target - 1, Transition::Animated);
		}
	}

	/// Starts the timer; restarts from zero when already at the end.
	pub fn play(&mut self) {
		if self.is_playing() || self.steps.is_empty() {
			return;
		}
		if self.index >= self.steps.len() {
			self.reset();
		}
		self.start_timer();
	}

	fn start_timer(&mut self) {
		match self.ticker.start(self.config.interval_ms()) {
			Ok(guard) => self.timer = Some(guard),
			Err(err) => {
				warn!("{err}");
				self.explanation.show_error(&err);
			}
		}
	}

	/// Cancels the timer.
	pub fn pause(&mut self) {
		self.timer = None;
	}

	/// Play when paused, pause when playing.
	pub fn toggle_play(&mut self) {
		if self.is_playing() {
			self.pause();
		} else {
			self.play();
		}
	}

	/// Back to index 0 with the baseline scene and an empty panel.
	pub fn reset(&mut self) {
		self.pause();
		self.index = 0;
		self.scene.reset();
		self.explanation.clear(&self.baseline_title());
	}

	/// Changes the speed; a running timer is restarted with the new interval.
	pub fn set_speed(&mut self, speed: f64) -> VizResult<()> {
		self.config = self.config.with_speed(speed)?;
		if self.is_playing() {
			self.timer = None;
			self.start_timer();
		}
		Ok(())
	}

	/// Timer callback: one step, stopping at the end.
	pub fn on_tick(&mut self) {
		if !self.is_playing() {
			return;
		}
		self.advance(Transition::Animated);
		if self.index >= self.steps.len() {
			self.pause();
		}
	}

	/// Advances style transitions by `dt_ms`.
	pub fn advance_frame(&mut self, dt_ms: f64) {
		self.scene.advance(dt_ms);
	}

	/// Runs a control-surface command.
	pub fn dispatch(&mut self, command: Command) {
		match command {
			Command::Next => {
				self.step_forward();
			}
			Command::Prev => {
				self.step_backward();
			}
			Command::TogglePlay => self.toggle_play(),
			Command::Play => self.play(),
			Command::Pause => self.pause(),
			Command::Reset => self.reset(),
			Command::SetSpeed(speed) => {
				if let Err(err) = self.set_speed(speed) {
					warn!("{err}");
					self.explanation.show_error(&err);
				}
			}
			Command::Seek(target) => self.seek(target),
		}
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use std::cell::{Cell, RefCell};
	use std::collections::BTreeSet;
	use std::rc::Rc;

	use super::*;
	use crate::error::VizError;
	use crate::steps::NodeId;

	/// Ticker that never fires on its own; tests call `on_tick` by hand.
	#[derive(Clone, Default)]
	pub(crate) struct ManualTicker {
		pub active: Rc<Cell<usize>>,
		pub periods: Rc<RefCell<Vec<u32>>>,
	}

	impl Ticker for ManualTicker {
		fn start(&mut self, period_ms: u32) -> VizResult<TimerGuard> {
			self.periods.borrow_mut().push(period_ms);
			let active = self.active.clone();
			active.set(active.get() + 1);
			Ok(TimerGuard::new(move || active.set(active.get() - 1)))
		}
	}

	struct BrokenTicker;

	impl Ticker for BrokenTicker {
		fn start(&mut self, _: u32) -> VizResult<TimerGuard> {
			Err(VizError::Timer("no window".into()))
		}
	}

	#[derive(Default)]
	struct MarkScene {
		marks: BTreeSet<u32>,
		resets: usize,
	}

	impl Scene for MarkScene {
		fn reset(&mut self) {
			self.marks.clear();
			self.resets += 1;
		}

		fn advance(&mut self, _: f64) {}
	}

	struct MarkInterpreter;

	impl Interpreter for MarkInterpreter {
		type Scene = MarkScene;

		fn algorithm(&self) -> Algorithm {
			Algorithm::Bfs
		}

		fn apply(
			&self,
			cursor: StepCursor<'_>,
			scene: &mut MarkScene,
			sink: &mut dyn ExplanationSink,
			_: Transition,
		) -> VizResult<()> {
			let step = cursor.step();
			let node = step.need(cursor.index(), "node", step.node)?;
			scene.marks.insert(node.0);
			sink.set_step(&format!("mark {node}"));
			Ok(())
		}
	}

	fn mark(id: u32) -> Step {
		Step {
			node: Some(NodeId(id)),
			..Step::new("visit")
		}
	}

	fn player<T: Ticker>(steps: Vec<Step>, ticker: T) -> Player<MarkInterpreter, T> {
		Player::new(MarkInterpreter, MarkScene::default(), steps, PlaybackConfig::default(), ticker)
	}

	fn marks<T: Ticker>(p: &Player<MarkInterpreter, T>) -> Vec<u32> {
		p.scene().marks.iter().copied().collect()
	}

	#[test]
	fn forward_and_backward_stay_in_bounds() {
		let mut p = player(vec![mark(0), mark(1)], ManualTicker::default());
		assert!(!p.step_backward());
		assert_eq!(p.index(), 0);

		assert!(p.step_forward());
		assert!(p.step_forward());
		assert!(!p.step_forward());
		assert_eq!(p.index(), 2);
		assert_eq!(marks(&p), vec![0, 1]);

		assert!(p.step_backward());
		assert_eq!(p.index(), 1);
		assert_eq!(marks(&p), vec![0]);
		assert_eq!(p.explanation().step, "mark 0");
	}

	#[test]
	fn seeking_matches_stepping_forward() {
		let steps: Vec<Step> = (0..6).map(mark).collect();
		for k in 0..=steps.len() {
			let mut forward = player(steps.clone(), ManualTicker::default());
			forward.reset();
			for _ in 0..k {
				forward.step_forward();
			}
			for start in 0..=steps.len() {
				let mut seeker = player(steps.clone(), ManualTicker::default());
				seeker.seek(start);
				seeker.seek(k);
				assert_eq!(seeker.index(), k);
				assert_eq!(marks(&seeker), marks(&forward), "k={k} start={start}");
				assert_eq!(seeker.explanation(), forward.explanation(), "k={k} start={start}");
			}
		}
	}

	#[test]
	fn reset_is_idempotent() {
		let mut p = player(vec![mark(0), mark(1)], ManualTicker::default());
		p.step_forward();
		p.reset();
		let once = (p.index(), marks(&p), p.explanation().clone());
		p.reset();
		assert_eq!((p.index(), marks(&p), p.explanation().clone()), once);
		assert_eq!(once.2.title, "Breadth-First Search Visualization");
		assert!(once.2.step.is_empty());
	}

	#[test]
	fn play_then_pause_leaves_no_timer() {
		let ticker = ManualTicker::default();
		let mut p = player(vec![mark(0), mark(1)], ticker.clone());
		p.play();
		assert!(p.is_playing());
		assert_eq!(ticker.active.get(), 1);
		p.pause();
		assert_eq!(p.index(), 0);
		assert!(!p.is_playing());
		assert_eq!(ticker.active.get(), 0);
	}

	#[test]
	fn ticks_run_to_the_end_and_stop() {
		let ticker = ManualTicker::default();
		let mut p = player(vec![mark(0), mark(1)], ticker.clone());
		p.play();
		p.on_tick();
		assert!(p.is_playing());
		p.on_tick();
		assert_eq!(p.index(), 2);
		assert!(!p.is_playing());
		assert_eq!(ticker.active.get(), 0);

		// Playing again from the end starts over.
		p.play();
		assert_eq!(p.index(), 0);
		assert!(p.scene().marks.is_empty());
		assert!(p.is_playing());
	}

	#[test]
	fn manual_steps_cancel_the_timer() {
		let ticker = ManualTicker::default();
		let mut p = player(vec![mark(0), mark(1)], ticker.clone());
		p.play();
		p.step_forward();
		assert!(!p.is_playing());
		assert_eq!(ticker.active.get(), 0);
	}

	#[test]
	fn speed_change_restarts_a_running_timer() {
		let ticker = ManualTicker::default();
		let mut p = player(vec![mark(0)], ticker.clone());
		p.set_speed(4.0).unwrap();
		assert!(ticker.periods.borrow().is_empty());
		p.play();
		p.dispatch(Command::SetSpeed(2.0));
		assert_eq!(*ticker.periods.borrow(), vec![250, 500]);
		assert_eq!(ticker.active.get(), 1);

		p.dispatch(Command::SetSpeed(-1.0));
		assert_eq!(p.config().speed, 2.0);
		assert!(p.explanation().step.contains("positive"));
	}

	#[test]
	fn malformed_steps_are_reported_and_skipped() {
		let ticker = ManualTicker::default();
		let mut p = player(vec![mark(0), Step::new("visit"), mark(2)], ticker.clone());
		p.play();
		p.on_tick();
		p.on_tick();
		assert_eq!(p.index(), 2);
		assert!(p.is_playing());
		assert!(p.explanation().step.contains("missing the `node` field"));
		p.on_tick();
		assert_eq!(marks(&p), vec![0, 2]);
		assert!(!p.is_playing());
	}

	#[test]
	fn timer_failures_leave_the_player_paused() {
		let mut p = player(vec![mark(0)], BrokenTicker);
		p.play();
		assert!(!p.is_playing());
		assert!(p.explanation().step.contains("no window"));
	}

	#[test]
	fn dropping_the_player_cancels_the_timer() {
		let ticker = ManualTicker::default();
		let mut p = player(vec![mark(0)], ticker.clone());
		p.play();
		drop(p);
		assert_eq!(ticker.active.get(), 0);
	}

	#[test]
	fn keys_map_to_commands() {
		assert_eq!(Command::from_key("ArrowRight"), Some(Command::Next));
		assert_eq!(Command::from_key(" "), Some(Command::TogglePlay));
		assert_eq!(Command::from_key("R"), Some(Command::Reset));
		assert_eq!(Command::from_key("x"), None);
	}

	#[test]
	fn fades_interpolate_toward_the_target() {
		let mut fade = Fade::new(0.0_f64);
		fade.set(10.0, Transition::Animated);
		assert_eq!(fade.target(), 10.0);
		assert_eq!(fade.current(), 0.0);
		assert!(!fade.is_settled());
		fade.advance(250.0, 500.0);
		assert!(fade.current() > 5.0 && fade.current() < 10.0);
		fade.advance(1000.0, 500.0);
		assert!(fade.is_settled());
		assert_eq!(fade.current(), 10.0);

		fade.set(3.0, Transition::Instant);
		assert_eq!((fade.current(), fade.target()), (3.0, 3.0));
	}

	#[test]
	fn cut_short_fades_continue_from_the_drawn_value() {
		let mut fade = Fade::new(0.0_f64);
		fade.set(10.0, Transition::Animated);
		fade.advance(200.0, 500.0);
		let drawn = fade.current();
		assert!(drawn > 0.0 && drawn < 10.0);

		fade.set(20.0, Transition::Animated);
		assert!((fade.current() - drawn).abs() < 1e-9);
		assert_eq!(fade.target(), 20.0);
		fade.advance(500.0, 500.0);
		assert!((fade.current() - 20.0).abs() < 1e-9);
	}
}
