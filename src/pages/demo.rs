use leptos::prelude::*;
use leptos_router::hooks::use_params_map;
use log::warn;

use super::error_fallback;
use crate::components::Visualization;
use crate::error::VizResult;
use crate::payload::Payload;
use crate::steps::Algorithm;

fn demo_payload(tag: &str) -> VizResult<Payload> {
	let payload = tag.parse::<Algorithm>().and_then(Payload::demo);
	if let Err(err) = &payload {
		warn!("no demo for `{tag}`: {err}");
	}
	payload
}

/// Bundled demo for the algorithm named in the route.
#[component]
pub fn DemoPage() -> impl IntoView {
	let params = use_params_map();

	view! {
		<ErrorBoundary fallback=error_fallback>
			{move || {
				let tag = params.with(|p| p.get("algorithm")).unwrap_or_default();
				demo_payload(&tag).map(|payload| view! { <Visualization payload=payload /> })
			}}
		</ErrorBoundary>
	}
}
