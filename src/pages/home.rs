use leptos::prelude::*;
use leptos_router::hooks::use_query_map;
use log::error;

use crate::components::force_graph::ForceGraphCanvas;
use crate::config::ViewerConfig;
use crate::graph::load_graph;

/// URL of the current page, used to resolve a relative graph endpoint.
fn page_url() -> String {
	web_sys::window()
		.and_then(|w| w.location().href().ok())
		.unwrap_or_default()
}

/// Graph page: fetch once, then hand the graph to the canvas.
#[component]
pub fn Home() -> impl IntoView {
	let query = use_query_map();
	let config =
		query.with_untracked(|q| ViewerConfig::default().with_overrides(|key| q.get(key)));

	let load_config = config.clone();
	let graph = LocalResource::new(move || {
		let config = load_config.clone();
		async move {
			let url = config.resolve_endpoint(&page_url())?;
			load_graph(&url, &config)
				.await
				.inspect_err(|e| error!("Graph load failed: {e}"))
		}
	});

	let graph_view = move || {
		let config = config.clone();
		Suspend::new(async move {
			graph.await.map(|graph| {
				let empty = graph.is_empty();
				view! {
					<ForceGraphCanvas graph=graph config=config fullscreen=true />
					<Show when=move || empty>
						<p class="graph-status">"The graph endpoint returned no edges."</p>
					</Show>
				}
			})
		})
	};

	view! {
		<ErrorBoundary fallback=|errors| {
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
		}>

			<div class="fullscreen-graph">
				<Suspense fallback=|| view! { <p class="graph-status">"Loading graph..."</p> }>
					{graph_view}
				</Suspense>
				<div class="graph-overlay">
					<h1>"Knowledge Graph"</h1>
					<p class="subtitle">"Drag nodes to pin them. Scroll to zoom. Drag background to pan."</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}
