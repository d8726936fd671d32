pub mod demo;
pub mod home;
pub mod not_found;

use leptos::error::Errors;
use leptos::prelude::*;

use crate::error::VizResult;
use crate::payload::{PAYLOAD_ELEMENT_ID, Payload};

/// The payload a host page embedded in `<script id="viz-payload">`, if any.
pub fn embedded_payload() -> Option<VizResult<Payload>> {
	let text = web_sys::window()?
		.document()?
		.get_element_by_id(PAYLOAD_ELEMENT_ID)?
		.text_content()?;
	Some(Payload::from_json(&text))
}

/// Error boundary shared by the pages that mount a visualization.
pub fn error_fallback(errors: ArcRwSignal<Errors>) -> impl IntoView {
	view! {
		<h1>"Uh oh! Something went wrong!"</h1>

		<p>"Errors: "</p>
		<ul>
			{move || {
				errors
					.get()
					.into_iter()
					.map(|(_, e)| view! { <li>{e.to_string()}</li> })
					.collect_view()
			}}
		</ul>
	}
}
