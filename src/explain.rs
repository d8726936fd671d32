//! The explanation panel: title, what happened, and why.

use crate::error::VizError;

/// Receives the three independent text updates of a step.
///
/// `step` and `reason` take pre-formatted rich text (HTML fragments built
/// with [`paragraph`] and [`strong`]); `title` is plain text.
pub trait ExplanationSink {
	/// Replaces the heading.
	fn set_title(&mut self, title: &str);
	/// Replaces the "current step" body.
	fn set_step(&mut self, html: &str);
	/// Replaces the "explanation" body.
	fn set_reason(&mut self, html: &str);

	/// Shows an error in place of the step body, keeping the title.
	fn show_error(&mut self, err: &VizError) {
		self.set_step(&paragraph(&format!("{} {}", strong("Error:"), escape(&err.to_string()))));
	}
}

/// In-memory explanation state; the UI mirrors it into signals.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Explanation {
	/// Plain-text heading.
	pub title: String,
	/// Rich-text step body.
	pub step: String,
	/// Rich-text reasoning body.
	pub reason: String,
}

impl Explanation {
	/// Empties both bodies and sets the heading.
	pub fn clear(&mut self, title: &str) {
		self.title = title.to_string();
		self.step.clear();
		self.reason.clear();
	}
}

impl ExplanationSink for Explanation {
	fn set_title(&mut self, title: &str) {
		self.title = title.to_string();
	}

	fn set_step(&mut self, html: &str) {
		self.step = html.to_string();
	}

	fn set_reason(&mut self, html: &str) {
		self.reason = html.to_string();
	}
}

/// Escapes producer-supplied text before it is embedded in rich text.
pub fn escape(text: &str) -> String {
	htmlize::escape_text(text).into_owned()
}

/// Wraps already-formatted rich text in a paragraph.
pub fn paragraph(inner: &str) -> String {
	format!("<p>{inner}</p>")
}

/// Bold fragment from plain text.
pub fn strong(text: &str) -> String {
	format!("<strong>{}</strong>", escape(text))
}

/// Body text for a step: the producer's `action` when present, else the template.
pub fn action_or(action: Option<&str>, template: impl FnOnce() -> String) -> String {
	match action {
		Some(action) => paragraph(&strong(action)),
		None => template(),
	}
}

/// Reasoning text for a step: the producer's `reason` when present, else the template.
pub fn reason_or(reason: Option<&str>, template: impl FnOnce() -> String) -> String {
	match reason {
		Some(reason) => paragraph(&escape(reason)),
		None => template(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::steps::NodeId;

	#[test]
	fn supplied_text_wins_over_templates() {
		let body = action_or(Some("Visiting node 3"), || unreachable!());
		assert_eq!(body, "<p><strong>Visiting node 3</strong></p>");
		let body = reason_or(None, || paragraph("fallback"));
		assert_eq!(body, "<p>fallback</p>");
	}

	#[test]
	fn supplied_text_is_escaped() {
		let body = reason_or(Some("a < b && c"), String::new);
		assert_eq!(body, "<p>a &lt; b &amp;&amp; c</p>");
	}

	#[test]
	fn errors_replace_the_step_body_only() {
		let mut panel = Explanation::default();
		panel.set_title("BFS");
		panel.set_reason("<p>why</p>");
		panel.show_error(&VizError::UnknownNode(NodeId(9)));
		assert_eq!(panel.title, "BFS");
		assert_eq!(panel.reason, "<p>why</p>");
		assert!(panel.step.contains("node 9 does not exist"));
	}
}
