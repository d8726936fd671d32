use std::fmt::Write as _;

use log::debug;

use super::state::{BarRole, BarScene};
use crate::error::{VizError, VizResult};
use crate::explain::{ExplanationSink, action_or, paragraph, reason_or};
use crate::playback::{Interpreter, StepCursor, Transition};
use crate::steps::{Algorithm, Step, StepKind};

/// Reads QuickSort steps into a [`BarScene`].
#[derive(Clone, Copy, Debug, Default)]
pub struct QuickSortInterpreter;

fn check_index(index: usize, i: usize, len: usize) -> VizResult<usize> {
	if i < len {
		Ok(i)
	} else {
		Err(VizError::invalid(
			index,
			format!("index {i} is outside the array of {len} bars"),
		))
	}
}

fn check_all(index: usize, indices: &[usize], len: usize) -> VizResult<()> {
	indices.iter().try_for_each(|&i| check_index(index, i, len).map(|_| ()))
}

fn check_pair(step: &Step, index: usize, field: &'static str, value: Option<&Vec<usize>>, len: usize) -> VizResult<(usize, usize)> {
	let pair = step.need(index, field, value)?;
	match pair.as_slice() {
		&[a, b] => Ok((check_index(index, a, len)?, check_index(index, b, len)?)),
		_ => Err(VizError::invalid(index, format!("`{field}` needs exactly two indices"))),
	}
}

/// Value of the pivot in force at the current step, looking back through
/// earlier steps when the step itself does not name one.
fn pivot_value(cursor: &StepCursor<'_>, values: &[f64]) -> Option<f64> {
	let step = cursor.step();
	if let Some(&[_, pivot]) = step.comparing.as_deref() {
		return values.get(pivot).copied();
	}
	std::iter::once(step)
		.chain(cursor.earlier().iter().rev())
		.find_map(|s| {
			let pivot = s.pivot?;
			s.array.as_ref()?.get(pivot).copied()
		})
}

fn is_full(sorted: &[usize], len: usize) -> bool {
	sorted.len() == len
}

impl QuickSortInterpreter {
	fn validate(&self, step: &Step, kind: StepKind, index: usize, len: usize) -> VizResult<()> {
		match kind {
			StepKind::Pivot => {
				check_index(index, step.need(index, "pivot", step.pivot)?, len)?;
			}
			StepKind::Compare => {
				check_pair(step, index, "comparing", step.comparing.as_ref(), len)?;
			}
			StepKind::Swap => {
				check_pair(step, index, "swapping", step.swapping.as_ref(), len)?;
			}
			StepKind::Sorted => {
				check_all(index, step.need(index, "sorted", step.sorted.as_ref())?, len)?;
			}
			StepKind::Range => {
				step.need(index, "range", step.range)?;
			}
			StepKind::Pointers => {
				step.need(index, "j_pointer", step.j_pointer)?;
			}
			_ => {}
		}
		if let Some(p) = step.pivot {
			check_index(index, p, len)?;
		}
		if let Some((low, high)) = step.range {
			if low > high || high >= len {
				return Err(VizError::invalid(
					index,
					format!("range [{low}, {high}] does not fit the array of {len} bars"),
				));
			}
		}
		if let Some(i) = step.i_pointer {
			if i < -1 || i >= len as i64 {
				return Err(VizError::invalid(index, format!("i pointer {i} is outside the array")));
			}
		}
		if let Some(j) = step.j_pointer {
			if j < 0 || j >= len as i64 {
				return Err(VizError::invalid(index, format!("j pointer {j} is outside the array")));
			}
		}
		Ok(())
	}

	fn title(&self, step: &Step, kind: StepKind, values: &[f64]) -> String {
		let name = Algorithm::QuickSort.display_name();
		match kind {
			StepKind::Pivot => {
				let value = step.pivot.and_then(|p| values.get(p)).copied().unwrap_or_default();
				format!("{name}: Selecting Pivot ({value})")
			}
			StepKind::Pointers => format!("{name}: Moving Partition Pointers"),
			StepKind::Compare => format!("{name}: Comparing Elements"),
			StepKind::Swap => format!("{name}: Swapping Elements"),
			StepKind::Sorted => {
				if step.sorted.as_deref().is_some_and(|s| is_full(s, values.len())) {
					format!("{name}: Array Sorted Successfully")
				} else {
					format!("{name}: Partial Sorting Complete")
				}
			}
			StepKind::Range => {
				let (low, high) = step.range.unwrap_or_default();
				format!("{name}: Processing Subarray [{low}...{high}]")
			}
			_ => name.to_string(),
		}
	}

	fn body(&self, step: &Step, kind: StepKind, values: &[f64]) -> String {
		let at = |i: usize| values.get(i).copied().unwrap_or_default();
		match kind {
			StepKind::Pivot => {
				let p = step.pivot.unwrap_or_default();
				format!("<p><strong>Selected pivot:</strong> Value {} at index {p}</p>", at(p))
			}
			StepKind::Pointers => {
				let mut text = "<p><strong>Partition pointers:</strong>".to_string();
				if let Some(i) = step.i_pointer {
					let _ = write!(text, " i={i}");
				}
				if let Some(j) = step.j_pointer {
					let _ = write!(text, " j={j}");
				}
				text + "</p>"
			}
			StepKind::Compare => match step.comparing.as_deref() {
				Some(&[a, b]) => format!(
					"<p><strong>Comparing:</strong> Value {} at index {a} with pivot value {} at index {b}</p>",
					at(a),
					at(b)
				),
				_ => String::new(),
			},
			StepKind::Swap => match step.swapping.as_deref() {
				Some(&[a, b]) => format!(
					"<p><strong>Swapping elements:</strong> Value {} at index {a} with value {} at index {b}</p>",
					at(a),
					at(b)
				),
				_ => String::new(),
			},
			StepKind::Sorted => {
				let sorted = step.sorted.as_deref().unwrap_or_default();
				if is_full(sorted, values.len()) {
					"<p><strong>Array is now fully sorted!</strong></p>".to_string()
				} else {
					let elements: Vec<String> = sorted.iter().map(|&i| format!("{} (index {i})", at(i))).collect();
					format!(
						"<p><strong>Element(s) in final position:</strong> {}</p>",
						elements.join(", ")
					)
				}
			}
			StepKind::Range => {
				let (low, high) = step.range.unwrap_or_default();
				format!("<p><strong>Processing subarray:</strong> From index {low} to {high}</p>")
			}
			_ => String::new(),
		}
	}

	fn reason(&self, cursor: &StepCursor<'_>, kind: StepKind, values: &[f64]) -> String {
		let step = cursor.step();
		let at = |i: usize| values.get(i).copied().unwrap_or_default();
		match kind {
			StepKind::Compare => match (step.i_pointer, step.j_pointer, step.comparing.as_deref()) {
				(Some(_), Some(j), Some(&[_, pivot])) => {
					let (value, pivot) = (at(j as usize), at(pivot));
					paragraph(&format!(
						"Comparing element {value} (j={j}) with pivot {pivot}. If {value} ≤ {pivot}, i will advance and we'll swap elements."
					))
				}
				(Some(i), Some(j), _) => paragraph(&format!(
					"Comparing element at position j={j}. Current partition boundary is at i={i}."
				)),
				_ => String::new(),
			},
			StepKind::Swap => {
				let Some(&[a, b]) = step.swapping.as_deref() else {
					return String::new();
				};
				let (va, vb) = (at(a), at(b));
				let pointers = match (step.i_pointer, step.j_pointer) {
					(Some(i), Some(j)) if i == a as i64 && j == b as i64 => format!(" (i={i}, j={j})"),
					_ => String::new(),
				};
				let text = match pivot_value(cursor, values) {
					Some(p) if va <= p && vb > p => {
						format!("Swapped {va} and {vb}{pointers} because {va} ≤ pivot ({p}) and should move left.")
					}
					Some(p) if vb <= p && va > p => {
						format!("Swapped {va} and {vb}{pointers} because {vb} ≤ pivot ({p}) and should move left.")
					}
					Some(p) if step.range.is_some_and(|(_, high)| high == b) => {
						format!("Final swap: placing pivot {p} at its correct sorted position.")
					}
					Some(p) => {
						format!("Swapped {va} and {vb}{pointers} to reposition elements around pivot ({p}).")
					}
					None => format!("Swapped {va} and {vb}{pointers} to arrange elements in sorted order."),
				};
				paragraph(&text)
			}
			StepKind::Pivot => paragraph("The pivot element is used to partition the array into two sections."),
			StepKind::Sorted => {
				if step.sorted.as_deref().is_some_and(|s| is_full(s, values.len())) {
					paragraph("All elements are now in their correct positions.")
				} else {
					paragraph("This element has found its final sorted position and won't be moved again.")
				}
			}
			StepKind::Pointers => paragraph(
				"i marks the last element known to be ≤ the pivot; j scans the rest of the subarray.",
			),
			StepKind::Range => paragraph("QuickSort partitions this subarray around a pivot, then recurses on both sides."),
			_ => String::new(),
		}
	}
}

impl Interpreter for QuickSortInterpreter {
	type Scene = BarScene;

	fn algorithm(&self) -> Algorithm {
		Algorithm::QuickSort
	}

	fn apply(
		&self,
		cursor: StepCursor<'_>,
		scene: &mut BarScene,
		sink: &mut dyn ExplanationSink,
		transition: Transition,
	) -> VizResult<()> {
		let index = cursor.index();
		let step = cursor.step();
		let kind = step.kind(index)?;
		if !Algorithm::QuickSort.accepts(kind) {
			return Err(VizError::UnsupportedStep {
				index,
				algorithm: Algorithm::QuickSort.display_name(),
				kind: step.kind.clone(),
			});
		}
		let values = match &step.array {
			Some(array) => array.clone(),
			None => scene.values(),
		};
		self.validate(step, kind, index, values.len())?;

		scene.clear_transient(transition);
		if step.array.is_some() {
			scene.show_array(&values, transition);
		}
		if step.range.is_some() {
			scene.set_range(step.range);
		}
		scene.set_pointers(step.i_pointer, step.j_pointer);
		if let Some(p) = step.pivot {
			scene.paint(&[p], BarRole::Pivot, transition);
		}
		if let Some(comparing) = &step.comparing {
			scene.paint(comparing, BarRole::Comparing, transition);
		}
		if let Some(swapping) = &step.swapping {
			scene.paint(swapping, BarRole::Swapping, transition);
		}
		if let Some(sorted) = &step.sorted {
			scene.paint(sorted, BarRole::Sorted, transition);
		}

		let title = self.title(step, kind, &values);
		debug!("step {index}: {title}");
		sink.set_title(&title);
		sink.set_step(&action_or(step.action_text(), || self.body(step, kind, &values)));
		sink.set_reason(&reason_or(step.reason_text(), || self.reason(&cursor, kind, &values)));
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::config::PlaybackConfig;
	use crate::playback::Player;
	use crate::playback::tests::ManualTicker;

	fn player(steps: serde_json::Value) -> Player<QuickSortInterpreter, ManualTicker> {
		Player::new(
			QuickSortInterpreter,
			BarScene::new(vec![5.0, 3.0, 8.0, 1.0], 600.0, 400.0, 500.0),
			serde_json::from_value(steps).unwrap(),
			PlaybackConfig::default(),
			ManualTicker::default(),
		)
	}

	#[test]
	fn pivot_then_swap_updates_the_bars() {
		let mut p = player(json!([
			{"type": "pivot", "array": [5, 3, 8, 1], "pivot": 0},
			{"type": "swap", "swapping": [0, 3], "array": [1, 3, 8, 5]},
		]));
		p.step_forward();
		assert_eq!(p.scene().role(0), Some(BarRole::Pivot));
		assert_eq!(p.explanation().title, "QuickSort: Selecting Pivot (5)");

		p.step_forward();
		assert_eq!(p.scene().values(), vec![1.0, 3.0, 8.0, 5.0]);
		assert_eq!(p.scene().role(0), Some(BarRole::Swapping));
		assert_eq!(p.scene().role(3), Some(BarRole::Swapping));
		assert_eq!(p.scene().role(1), Some(BarRole::Default));
		assert_eq!(
			p.explanation().reason,
			"<p>Swapped 1 and 5 to reposition elements around pivot (5).</p>"
		);

		p.step_backward();
		assert_eq!(p.scene().values(), vec![5.0, 3.0, 8.0, 1.0]);
		assert_eq!(p.scene().role(0), Some(BarRole::Pivot));
	}

	#[test]
	fn comparisons_explain_against_the_pivot() {
		let mut p = player(json!([
			{"type": "compare", "comparing": [1, 3], "i_pointer": -1, "j_pointer": 1, "range": [0, 3]},
		]));
		p.step_forward();
		assert_eq!(p.scene().pointers(), (Some(-1), Some(1)));
		assert_eq!(p.scene().range(), Some((0, 3)));
		assert_eq!(
			p.explanation().step,
			"<p><strong>Comparing:</strong> Value 3 at index 1 with pivot value 1 at index 3</p>"
		);
		assert!(p.explanation().reason.contains("Comparing element 3 (j=1) with pivot 1."));
	}

	#[test]
	fn sorted_marks_persist_and_pointers_clear() {
		let mut p = player(json!([
			{"type": "pointers", "i_pointer": 0, "j_pointer": 1},
			{"type": "sorted", "sorted": [2]},
			{"type": "compare", "comparing": [2, 3]},
			{"type": "range", "range": [0, 1]},
		]));
		p.step_forward();
		assert_eq!(p.scene().pointers(), (Some(0), Some(1)));
		p.step_forward();
		assert_eq!(p.scene().pointers(), (None, None));
		assert_eq!(p.explanation().title, "QuickSort: Partial Sorting Complete");
		p.step_forward();
		assert_eq!(p.scene().role(2), Some(BarRole::Comparing));
		p.step_forward();
		assert_eq!(p.scene().role(2), Some(BarRole::Sorted));
		assert_eq!(p.scene().role(3), Some(BarRole::Default));
		assert_eq!(p.explanation().title, "QuickSort: Processing Subarray [0...1]");
	}

	#[test]
	fn swap_reason_finds_an_earlier_pivot() {
		let mut p = player(json!([
			{"type": "pivot", "pivot": 3, "array": [5, 3, 8, 4]},
			{"type": "swap", "swapping": [0, 1], "array": [3, 5, 8, 4], "i_pointer": 0, "j_pointer": 1},
			{"type": "swap", "swapping": [3, 3], "range": [0, 3], "array": [3, 5, 8, 4]},
		]));
		p.seek(2);
		assert_eq!(
			p.explanation().reason,
			"<p>Swapped 3 and 5 (i=0, j=1) because 3 ≤ pivot (4) and should move left.</p>"
		);
		p.step_forward();
		assert_eq!(
			p.explanation().reason,
			"<p>Final swap: placing pivot 4 at its correct sorted position.</p>"
		);
	}

	#[test]
	fn full_sort_is_announced() {
		let mut p = player(json!([{"type": "sorted", "sorted": [0, 1, 2, 3], "array": [1, 3, 5, 8]}]));
		p.step_forward();
		assert_eq!(p.explanation().title, "QuickSort: Array Sorted Successfully");
		assert!((0..4).all(|i| p.scene().role(i) == Some(BarRole::Sorted)));
	}

	#[test]
	fn out_of_range_indices_are_rejected_before_painting() {
		let mut p = player(json!([
			{"type": "swap", "swapping": [0, 9], "array": [1, 3, 8, 5]},
			{"type": "compare", "comparing": [0]},
			{"type": "pivot"},
			{"type": "visit", "node": 0},
		]));
		p.step_forward();
		assert!(p.explanation().step.contains("index 9 is outside"));
		assert_eq!(p.scene().values(), vec![5.0, 3.0, 8.0, 1.0]);
		p.step_forward();
		assert!(p.explanation().step.contains("exactly two"));
		p.step_forward();
		assert!(p.explanation().step.contains("`pivot` field"));
		p.step_forward();
		assert!(p.explanation().step.contains("does not use `visit`"));
	}

	#[test]
	fn snapshots_of_a_new_length_rebind() {
		let mut p = player(json!([{"type": "range", "range": [0, 4], "array": [9, 7, 5, 3, 1]}]));
		p.step_forward();
		assert_eq!(p.scene().len(), 5);
		assert_eq!(p.scene().range(), Some((0, 4)));
		p.reset();
		assert_eq!(p.scene().len(), 4);
	}
}
