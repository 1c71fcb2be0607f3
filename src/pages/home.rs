use std::collections::BTreeSet;
use std::sync::Arc;

use leptos::prelude::*;

use crate::components::knowledge_graph::{
	FilterPredicate, GraphDataset, GraphEdge, GraphNode, KnowledgeGraphCanvas, MAX_IMPORTANCE,
	MIN_IMPORTANCE, StatsSummary, build,
};
use crate::load_graph_data;

fn node(id: &str, name: &str, category: &str, importance: u8, degree: u32) -> GraphNode {
	GraphNode {
		id: id.into(),
		name: name.into(),
		category: category.into(),
		importance: Some(importance),
		total_degree: Some(degree),
		properties: None,
	}
}

fn edge(id: &str, source: &str, target: &str, relationship: &str) -> GraphEdge {
	GraphEdge {
		id: id.into(),
		source: source.into(),
		target: target.into(),
		relationship: relationship.into(),
		weight: None,
		properties: None,
	}
}

/// Small pine wilt dataset shown when the page carries no graph-data payload.
fn sample_data() -> GraphDataset {
	let nodes = vec![
		node("pwn", "Pine Wood Nematode", "Pathogen", 5, 8),
		node("msb", "Japanese Pine Sawyer", "Vector", 4, 2),
		node("pine", "Pine Tree", "Host", 5, 3),
		node("bp", "Black Pine", "Host", 3, 1),
		node("wilt", "Needle Wilting", "Symptom", 3, 2),
		node("resin", "Reduced Resin Flow", "Symptom", 2, 1),
		node("inj", "Trunk Injection", "Treatment", 4, 1),
		node("temp", "High Summer Temperature", "Environment", 2, 1),
		node("east_asia", "East Asia", "Location", 1, 1),
	];
	let edges = vec![
		edge("e1", "pwn", "pine", "infects"),
		edge("e2", "msb", "pwn", "transmits"),
		edge("e3", "msb", "pine", "feeds on"),
		edge("e4", "pwn", "bp", "infects"),
		edge("e5", "pwn", "wilt", "causes"),
		edge("e6", "wilt", "pine", "observed in"),
		edge("e7", "pwn", "resin", "causes"),
		edge("e8", "inj", "pwn", "controls"),
		edge("e9", "temp", "pwn", "accelerates"),
		edge("e10", "pwn", "east_asia", "found in"),
	];
	GraphDataset::new(nodes, edges)
}

fn importance_options(selected: RwSignal<u8>) -> impl IntoView {
	(MIN_IMPORTANCE..=MAX_IMPORTANCE)
		.map(|level| {
			view! {
				<option value=level.to_string() selected=move || selected.get() == level>
					{level.to_string()}
				</option>
			}
		})
		.collect_view()
}

#[component]
fn StatsHeader(stats: StatsSummary) -> impl IntoView {
	let avg = stats
		.avg_degree
		.map(|d| format!("{:.2}", d))
		.unwrap_or_else(|| "-".into());
	view! {
		<div class="stats">
			<span>"Nodes: " {stats.total_nodes}</span>
			<span>"Edges: " {stats.total_edges}</span>
			<span>"Avg degree: " {avg}</span>
		</div>
	}
}

#[component]
fn SearchBar(term: RwSignal<String>) -> impl IntoView {
	view! {
		<div class="search-bar">
			<input
				type="search"
				placeholder="Search nodes..."
				prop:value=move || term.get()
				on:input=move |ev| term.set(event_target_value(&ev))
			/>
			<button
				class="search-clear"
				style:display=move || if term.with(|t| t.is_empty()) { "none" } else { "inline" }
				on:click=move |_| term.set(String::new())
			>
				"×"
			</button>
		</div>
	}
}

#[component]
fn FilterPanel(categories: Vec<String>, filter: RwSignal<Option<FilterPredicate>>) -> impl IntoView {
	let chosen = RwSignal::new(BTreeSet::<String>::new());
	let min = RwSignal::new(MIN_IMPORTANCE);
	let max = RwSignal::new(MAX_IMPORTANCE);

	let apply = move |_| {
		filter.set(Some(FilterPredicate {
			categories: chosen.get_untracked().into_iter().collect(),
			min_importance: min.get_untracked(),
			max_importance: max.get_untracked(),
		}));
	};
	let reset = move |_| {
		chosen.set(BTreeSet::new());
		min.set(MIN_IMPORTANCE);
		max.set(MAX_IMPORTANCE);
		filter.set(None);
	};

	let boxes = categories
		.into_iter()
		.map(|category| {
			let (checked, toggled) = (category.clone(), category.clone());
			view! {
				<label class="filter-category">
					<input
						type="checkbox"
						prop:checked=move || chosen.with(|c| c.contains(&checked))
						on:change=move |ev| {
							let on = event_target_checked(&ev);
							chosen
								.update(|c| {
									if on {
										c.insert(toggled.clone());
									} else {
										c.remove(&toggled);
									}
								});
						}
					/>
					{category}
				</label>
			}
		})
		.collect_view();

	view! {
		<div class="filter-panel">
			<h3>"Filters"</h3>
			<div class="filter-categories">{boxes}</div>
			<label>
				"Min importance "
				<select on:change=move |ev| {
					min.set(event_target_value(&ev).parse().unwrap_or(MIN_IMPORTANCE))
				}>{importance_options(min)}</select>
			</label>
			<label>
				"Max importance "
				<select on:change=move |ev| {
					max.set(event_target_value(&ev).parse().unwrap_or(MAX_IMPORTANCE))
				}>{importance_options(max)}</select>
			</label>
			<div class="filter-actions">
				<button on:click=apply>"Apply"</button>
				<button on:click=reset>"Reset"</button>
			</div>
		</div>
	}
}

#[component]
fn NodeDetails(selected: RwSignal<Option<GraphNode>>) -> impl IntoView {
	move || {
		selected.get().map(|node| {
			let properties = node
				.properties
				.unwrap_or_default()
				.into_iter()
				.map(|(key, value)| {
					let value = match value {
						serde_json::Value::String(s) => s,
						other => other.to_string(),
					};
					view! {
						<dt>{key}</dt>
						<dd>{value}</dd>
					}
				})
				.collect_view();
			view! {
				<aside class="node-details">
					<button class="close" on:click=move |_| selected.set(None)>
						"×"
					</button>
					<h2>{node.name}</h2>
					<p class="category">{node.category}</p>
					<dl>
						<dt>"Id"</dt>
						<dd>{node.id}</dd>
						<dt>"Importance"</dt>
						<dd>{node.importance.map(|i| i.to_string()).unwrap_or_else(|| "-".into())}</dd>
						<dt>"Connections"</dt>
						<dd>{node.total_degree.map(|d| d.to_string()).unwrap_or_else(|| "-".into())}</dd>
						{properties}
					</dl>
				</aside>
			}
		})
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let dataset = Arc::new(load_graph_data().unwrap_or_else(sample_data));
	let stats = StatsSummary::from_dataset(&dataset);
	// A malformed dataset offers no categories; the canvas shows the error.
	let categories = build(&dataset)
		.map(|elements| elements.categories())
		.unwrap_or_default();
	let graph_data = Signal::derive(move || dataset.clone());

	let search = RwSignal::new(String::new());
	let filter = RwSignal::new(None::<FilterPredicate>);
	let selected = RwSignal::new(None::<GraphNode>);
	let on_select = Callback::new(move |node: GraphNode| selected.set(Some(node)));

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

			<div class="explorer">
				<header class="explorer-header">
					<h1>"Knowledge Graph"</h1>
					<StatsHeader stats=stats />
					<SearchBar term=search />
				</header>
				<div class="explorer-body">
					<FilterPanel categories=categories filter=filter />
					<div class="graph-container">
						<KnowledgeGraphCanvas
							data=graph_data
							search_term=search
							filter=filter
							on_node_select=on_select
						/>
					</div>
					<NodeDetails selected=selected />
				</div>
			</div>
		</ErrorBoundary>
	}
}
