//! arch-diagram: Interactive force-directed architecture diagram for the dashboard.
//!
//! This crate provides a WASM-based diagram component that lays out typed
//! service nodes with a force simulation, with dragging, hover emphasis, and
//! resize re-centering.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::force_graph::{
	ArchitectureDiagram, DiagramEngine, EngineConfig, EngineError, GraphData, GraphLink,
	GraphNode, GraphValidationError, NodeKind, Theme,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("arch-diagram: logging initialized");
}

/// What a `<script>` JSON element held.
#[derive(Debug)]
enum ScriptPayload<T> {
	/// No such element, or it has no text.
	Absent,
	Parsed(T),
	/// Present but not valid for `T`.
	Malformed,
}

/// Text content of `<script id="{id}">`, if the element exists.
fn script_text(id: &str) -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

fn parse_script<T: DeserializeOwned>(id: &str, text: Option<&str>) -> ScriptPayload<T> {
	let Some(text) = text else {
		return ScriptPayload::Absent;
	};
	match serde_json::from_str(text) {
		Ok(value) => ScriptPayload::Parsed(value),
		Err(e) => {
			warn!("arch-diagram: failed to parse #{id}: {e}");
			ScriptPayload::Malformed
		}
	}
}

/// Graph to show for a `graph-data` payload. A page without one gets the
/// sample architecture; a malformed one gets an empty graph, which renders
/// the "no data" placeholder.
fn graph_for_page(payload: ScriptPayload<GraphData>) -> GraphData {
	match payload {
		ScriptPayload::Parsed(data) => {
			info!(
				"arch-diagram: loaded {} nodes, {} links",
				data.nodes.len(),
				data.links.len()
			);
			data
		}
		ScriptPayload::Absent => {
			info!("arch-diagram: no payload on page, showing sample architecture");
			GraphData::sample()
		}
		ScriptPayload::Malformed => GraphData::default(),
	}
}

/// Load graph data from a script element with id="graph-data".
/// Expected format: JSON with { nodes: [...], links: [...] }
fn load_graph_data() -> GraphData {
	let text = script_text("graph-data");
	graph_for_page(parse_script("graph-data", text.as_deref()))
}

/// Load engine tuning from a script element with id="diagram-config".
fn load_config() -> EngineConfig {
	let text = script_text("diagram-config");
	match parse_script("diagram-config", text.as_deref()) {
		ScriptPayload::Parsed(config) => {
			info!("arch-diagram: loaded diagram config");
			config
		}
		ScriptPayload::Absent | ScriptPayload::Malformed => EngineConfig::default(),
	}
}

/// Dark theme when the browser asks for a dark color scheme.
fn page_theme() -> Theme {
	let prefers_dark = web_sys::window()
		.and_then(|w| w.match_media("(prefers-color-scheme: dark)").ok().flatten())
		.is_some_and(|query| query.matches());
	if prefers_dark { Theme::dark() } else { Theme::light() }
}

/// Main application component.
/// Loads the architecture payload from the DOM and renders the diagram.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let graph_data = load_graph_data();
	let graph_signal = Signal::derive(move || graph_data.clone());
	let config = load_config();
	let theme = page_theme();

	view! {
		<Html attr:lang="en" attr:dir="ltr" />
		<Title text="System Architecture" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<section class="architecture">
			<h2>"System Architecture"</h2>
			<div class="architecture-canvas">
				<ArchitectureDiagram data=graph_signal config=config theme=theme />
			</div>
			<p class="hint">"Drag nodes to reposition. Hover a node for details."</p>
		</section>
	}
}
