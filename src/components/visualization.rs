use leptos::prelude::*;

use super::bar_view::BarVisualization;
use super::graph_view::GraphVisualization;
use crate::payload::{Dataset, Payload};

/// Mounts the visualization matching the payload's dataset.
#[component]
pub fn Visualization(
	/// A decoded and checked payload.
	payload: Payload,
) -> impl IntoView {
	let Payload {
		algorithm,
		dataset,
		steps,
		config,
	} = payload;
	let body = match dataset {
		Dataset::Graph(data) => view! { <GraphVisualization algorithm=algorithm data=data steps=steps config=config /> }.into_any(),
		Dataset::Array(array) => view! { <BarVisualization array=array steps=steps config=config /> }.into_any(),
	};
	view! {
		<section class="visualization-frame">
			<h2>{algorithm.display_name()}</h2>
			{body}
		</section>
	}
}
