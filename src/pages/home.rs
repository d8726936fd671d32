use leptos::prelude::*;
use leptos_router::components::A;

use super::{embedded_payload, error_fallback};
use crate::components::Visualization;
use crate::steps::Algorithm;

/// Home page: the embedded payload when the host page supplies one,
/// otherwise an index of the bundled demos.
#[component]
pub fn Home() -> impl IntoView {
	match embedded_payload() {
		Some(payload) => view! {
			<ErrorBoundary fallback=error_fallback>
				{payload.map(|payload| view! { <Visualization payload=payload /> })}
			</ErrorBoundary>
		}
		.into_any(),
		None => view! {
			<div class="demo-index">
				<h1>"Algorithm Stepper"</h1>
				<p class="subtitle">
					"Step through precomputed traces. Right/Left step, Space plays, R resets."
				</p>
				<ul>
					{Algorithm::ALL
						.into_iter()
						.map(|algorithm| {
							view! {
								<li>
									<A href=format!("/demo/{}", algorithm.tag())>{algorithm.display_name()}</A>
								</li>
							}
						})
						.collect_view()}
				</ul>
			</div>
		}
		.into_any(),
	}
}
