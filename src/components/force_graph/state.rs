//! Per-mount diagram state: the validated graph, its solver, and emphasis.
//!
//! This is the single owner of layout state for one mounted diagram. The
//! interaction layer reaches it only through [`DiagramState::apply`], and the
//! render adapter only reads it.

use log::debug;

use super::graph::Graph;
use super::interaction::{Hit, Intent};
use super::simulation::{ForceConfig, Simulation};
use super::theme::NodeStyle;
use super::types::Viewport;

pub struct DiagramState {
	graph: Graph,
	simulation: Simulation,
	viewport: Viewport,
	emphasized: Option<usize>,
}

impl DiagramState {
	/// Builds fresh solver state for `graph`. Nothing carries over from any
	/// previous graph.
	pub fn new(graph: Graph, viewport: Viewport, forces: &ForceConfig) -> Self {
		let simulation = Simulation::new(&graph, viewport, forces);
		Self {
			graph,
			simulation,
			viewport,
			emphasized: None,
		}
	}

	pub fn graph(&self) -> &Graph {
		&self.graph
	}

	pub fn simulation(&self) -> &Simulation {
		&self.simulation
	}

	pub fn viewport(&self) -> Viewport {
		self.viewport
	}

	pub fn emphasized(&self) -> Option<usize> {
		self.emphasized
	}

	/// True while the solver still has motion to produce.
	pub fn is_active(&self) -> bool {
		!self.simulation.is_at_rest()
	}

	/// Advances the solver one step unless it is already at rest.
	pub fn tick(&mut self) {
		if self.simulation.is_at_rest() {
			return;
		}
		self.simulation.tick();
		if self.simulation.is_at_rest() {
			debug!(
				"arch-diagram: layout at rest after {} ticks (alpha {:.4})",
				self.simulation.ticks(),
				self.simulation.alpha()
			);
		}
	}

	/// Topmost node whose disc contains `(x, y)`. The emphasized node is drawn
	/// last, so it is checked first.
	pub fn hit(&self, x: f64, y: f64, style: &NodeStyle) -> Option<Hit> {
		let contains = |idx: usize| {
			let radius = if self.emphasized == Some(idx) {
				style.emphasized_radius
			} else {
				style.radius
			};
			self.simulation.node(idx).is_some_and(|n| {
				let (dx, dy) = (n.x - x, n.y - y);
				dx * dx + dy * dy <= radius * radius
			})
		};

		let idx = self
			.emphasized
			.filter(|&idx| contains(idx))
			.or_else(|| (0..self.graph.len()).rev().find(|&idx| contains(idx)))?;
		let node = self.simulation.node(idx)?;
		Some(Hit {
			id: self.graph.node(idx)?.id.clone(),
			x: node.x,
			y: node.y,
		})
	}

	/// Carries out one intent. Returns whether the result needs a redraw.
	/// Intents naming a node this graph does not contain are dropped.
	pub fn apply(&mut self, intent: Intent) -> bool {
		match intent {
			Intent::Pin { node, x, y } => match self.graph.index_of(&node) {
				Some(idx) => self.simulation.pin(idx, x, y),
				None => drop_stale("pin", &node),
			},
			Intent::Unpin { node } => match self.graph.index_of(&node) {
				Some(idx) => self.simulation.unpin(idx),
				None => drop_stale("unpin", &node),
			},
			Intent::Heat { alpha_target } => {
				self.simulation.set_alpha_target(alpha_target);
				true
			}
			Intent::Reheat { alpha } => {
				self.simulation.reheat(alpha);
				true
			}
			Intent::Recenter { viewport } => {
				self.viewport = viewport;
				let (cx, cy) = viewport.center();
				self.simulation.set_center(cx, cy);
				true
			}
			Intent::Emphasize { node: None } => self.emphasized.take().is_some(),
			Intent::Emphasize { node: Some(node) } => match self.graph.index_of(&node) {
				Some(idx) => self.emphasized.replace(idx) != Some(idx),
				None => drop_stale("emphasize", &node),
			},
		}
	}

	/// `"{name} ({type})"` for the emphasized node.
	pub fn tooltip(&self) -> Option<String> {
		let node = self.graph.node(self.emphasized?)?;
		Some(format!("{} ({})", node.name, node.kind))
	}
}

fn drop_stale(action: &str, node: &str) -> bool {
	debug!("arch-diagram: dropping {action} for unknown node {node}");
	false
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::theme::Theme;
	use crate::components::force_graph::types::GraphData;

	fn sample() -> DiagramState {
		let graph = Graph::from_data(&GraphData::sample()).unwrap();
		DiagramState::new(graph, Viewport::new(800.0, 600.0), &ForceConfig::default())
	}

	#[test]
	fn hit_finds_node_under_pointer() {
		let state = sample();
		let style = Theme::default().node;
		let db = *state.simulation().node(3).unwrap();

		let hit = state.hit(db.x + 30.0, db.y, &style).unwrap();
		assert_eq!(hit.id, "db");
		assert_eq!((hit.x, hit.y), (db.x, db.y));
		assert!(state.hit(-500.0, -500.0, &style).is_none());
	}

	#[test]
	fn emphasized_node_has_larger_hit_area() {
		let mut state = sample();
		let style = Theme::default().node;
		let db = *state.simulation().node(3).unwrap();
		assert!(state.hit(db.x + 43.0, db.y, &style).is_none());

		state.apply(Intent::Emphasize {
			node: Some("db".into()),
		});
		assert_eq!(state.hit(db.x + 43.0, db.y, &style).unwrap().id, "db");
	}

	#[test]
	fn pin_intent_reaches_solver() {
		let mut state = sample();
		assert!(state.apply(Intent::Pin {
			node: "api".into(),
			x: 10.0,
			y: 20.0
		}));
		state.tick();
		let api = state.simulation().node(2).unwrap();
		assert_eq!((api.x, api.y), (10.0, 20.0));

		assert!(state.apply(Intent::Unpin { node: "api".into() }));
		assert!(!state.simulation().node(2).unwrap().is_pinned());
	}

	#[test]
	fn stale_intents_are_dropped() {
		let mut state = sample();
		assert!(!state.apply(Intent::Pin {
			node: "gone".into(),
			x: 0.0,
			y: 0.0
		}));
		assert!(!state.apply(Intent::Unpin { node: "gone".into() }));
		assert!(!state.apply(Intent::Emphasize {
			node: Some("gone".into())
		}));
		assert!(state.simulation().nodes().iter().all(|n| !n.is_pinned()));
	}

	#[test]
	fn emphasis_toggles_and_reports_tooltip() {
		let mut state = sample();
		assert!(state.tooltip().is_none());
		assert!(state.apply(Intent::Emphasize {
			node: Some("client".into())
		}));
		assert!(!state.apply(Intent::Emphasize {
			node: Some("client".into())
		}));
		assert_eq!(state.tooltip().as_deref(), Some("Next.js Client (frontend)"));
		assert!(state.apply(Intent::Emphasize { node: None }));
		assert!(!state.apply(Intent::Emphasize { node: None }));
		assert_eq!(state.emphasized(), None);
	}

	#[test]
	fn emphasis_leaves_solver_untouched() {
		let mut state = sample();
		let before = state.simulation().alpha();
		state.apply(Intent::Emphasize {
			node: Some("db".into()),
		});
		assert_eq!(state.simulation().alpha(), before);
		assert_eq!(state.simulation().alpha_target(), 0.0);
	}

	#[test]
	fn recenter_moves_viewport_and_center() {
		let mut state = sample();
		let viewport = Viewport::new(1200.0, 900.0);
		state.apply(Intent::Recenter { viewport });
		assert_eq!(state.viewport(), viewport);
		assert_eq!(state.simulation().center(), (600.0, 450.0));
	}

	#[test]
	fn tick_stops_at_rest() {
		let mut state = sample();
		while state.is_active() {
			state.tick();
		}
		let ticks = state.simulation().ticks();
		state.tick();
		assert_eq!(state.simulation().ticks(), ticks);
	}
}
