//! Pointer and resize handling.
//!
//! The controller never touches the solver. Each input event yields a list of
//! [`Intent`]s which [`super::state::DiagramState::apply`] carries out through
//! the solver's public pin/heat API. Intents name nodes by id, so an intent
//! that outlives a graph replacement resolves to nothing and is dropped.

use serde::Deserialize;

use super::types::Viewport;

/// A requested change to solver or presentation state.
#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
	/// Hold a node at a fixed position.
	Pin { node: String, x: f64, y: f64 },
	/// Release a pinned node.
	Unpin { node: String },
	/// Set the alpha the solver decays toward.
	Heat { alpha_target: f64 },
	/// Raise alpha to at least this value.
	Reheat { alpha: f64 },
	/// Move the centering target to the middle of a new viewport.
	Recenter { viewport: Viewport },
	/// Change which node is emphasized. Purely presentational.
	Emphasize { node: Option<String> },
}

/// A node under the pointer, with its position at the time of the hit.
#[derive(Clone, Debug, PartialEq)]
pub struct Hit {
	pub id: String,
	pub x: f64,
	pub y: f64,
}

/// Tracks an in-progress node drag operation.
#[derive(Clone, Debug, PartialEq)]
pub struct DragState {
	pub node: String,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f64,
	pub node_start_y: f64,
}

/// How hard interactions heat the solver.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
	/// Alpha target held while a node is being dragged.
	pub drag_alpha_target: f64,
	/// Alpha the solver is raised to after a resize.
	pub resize_alpha: f64,
}

impl Default for InteractionConfig {
	fn default() -> Self {
		Self {
			drag_alpha_target: 0.3,
			resize_alpha: 0.3,
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct InteractionController {
	config: InteractionConfig,
	drag: Option<DragState>,
	hovered: Option<String>,
}

impl InteractionController {
	pub fn new(config: InteractionConfig) -> Self {
		Self {
			config,
			drag: None,
			hovered: None,
		}
	}

	/// Starts a drag when the pointer lands on a node.
	pub fn pointer_down(&mut self, x: f64, y: f64, hit: Option<Hit>) -> Vec<Intent> {
		let Some(hit) = hit else {
			return Vec::new();
		};
		let intents = vec![
			Intent::Pin {
				node: hit.id.clone(),
				x: hit.x,
				y: hit.y,
			},
			Intent::Heat {
				alpha_target: self.config.drag_alpha_target,
			},
		];
		self.drag = Some(DragState {
			node: hit.id,
			start_x: x,
			start_y: y,
			node_start_x: hit.x,
			node_start_y: hit.y,
		});
		intents
	}

	/// Moves the dragged node, or updates hover emphasis when not dragging.
	pub fn pointer_move(&mut self, x: f64, y: f64, hit: Option<Hit>) -> Vec<Intent> {
		if let Some(drag) = &self.drag {
			return vec![Intent::Pin {
				node: drag.node.clone(),
				x: drag.node_start_x + (x - drag.start_x),
				y: drag.node_start_y + (y - drag.start_y),
			}];
		}

		let hovered = hit.map(|hit| hit.id);
		if hovered == self.hovered {
			return Vec::new();
		}
		self.hovered = hovered.clone();
		vec![Intent::Emphasize { node: hovered }]
	}

	/// Ends a drag; the solver cools back to rest.
	pub fn pointer_up(&mut self) -> Vec<Intent> {
		match self.drag.take() {
			Some(drag) => vec![
				Intent::Unpin { node: drag.node },
				Intent::Heat { alpha_target: 0.0 },
			],
			None => Vec::new(),
		}
	}

	/// Pointer left the surface: end any drag and drop hover emphasis.
	pub fn pointer_leave(&mut self) -> Vec<Intent> {
		let mut intents = self.pointer_up();
		if self.hovered.take().is_some() {
			intents.push(Intent::Emphasize { node: None });
		}
		intents
	}

	pub fn resize(&mut self, viewport: Viewport) -> Vec<Intent> {
		vec![
			Intent::Recenter { viewport },
			Intent::Reheat {
				alpha: self.config.resize_alpha,
			},
		]
	}

	pub fn is_dragging(&self) -> bool {
		self.drag.is_some()
	}

	/// Forgets drag and hover, e.g. after the graph is replaced.
	pub fn reset(&mut self) {
		self.drag = None;
		self.hovered = None;
	}
}
