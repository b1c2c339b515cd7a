//! Force-directed layout solver.
//!
//! Owns every piece of per-node runtime state (position, velocity, pin) in a
//! vector parallel to [`Graph::nodes`], so the graph itself stays immutable.
//! Each [`Simulation::tick`] combines four forces:
//!
//! - link springs pulling connected pairs toward `link_distance`
//! - many-body repulsion via a Barnes–Hut [`QuadTree`]
//! - a centering pull on the free nodes' centroid
//! - disc collision, resolved by direct displacement after integration
//!
//! Force magnitudes are scaled by `alpha`, which decays geometrically toward
//! `alpha_target`. Once both are below `alpha_min` the solver is at rest.

use std::f64::consts::PI;

use serde::Deserialize;

use super::graph::Graph;
use super::quadtree::{QuadTree, Repulsion};
use super::rng::XorShift64Star;
use super::types::Viewport;

pub const DEFAULT_SEED: u64 = 0x5EED;

/// Solver tuning. Defaults reproduce the dashboard's layout.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
	/// Rest length of link springs.
	pub link_distance: f64,
	/// Per-node charge; negative repels.
	pub charge_strength: f64,
	/// Barnes–Hut opening angle.
	pub theta: f64,
	/// Repulsion is softened below this distance.
	pub distance_min: f64,
	/// Fraction of the centroid offset corrected per tick.
	pub center_strength: f64,
	/// Collision disc radius per node.
	pub collide_radius: f64,
	/// Collision relaxation passes per tick.
	pub collide_iterations: usize,
	/// Starting alpha for a fresh layout.
	pub alpha: f64,
	/// Below this, with no target holding it up, the layout is at rest.
	pub alpha_min: f64,
	/// Fraction of the gap to the alpha target closed per tick.
	pub alpha_decay: f64,
	/// Fraction of velocity lost per tick.
	pub velocity_decay: f64,
	/// Minimum radius of the initial placement circle.
	pub initial_radius: f64,
	/// Seed for initial jitter and coincident-node nudges. Unset means a
	/// fixed seed; hosts wanting varied layouts supply their own.
	pub seed: Option<u64>,
}

impl Default for ForceConfig {
	fn default() -> Self {
		let alpha_min: f64 = 0.001;
		Self {
			link_distance: 150.0,
			charge_strength: -300.0,
			theta: 0.9,
			distance_min: 1.0,
			center_strength: 0.1,
			collide_radius: 60.0,
			collide_iterations: 1,
			alpha: 1.0,
			alpha_min,
			// Cools from 1.0 to alpha_min in ~300 ticks.
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			velocity_decay: 0.4,
			initial_radius: 100.0,
			seed: None,
		}
	}
}

/// Solver-owned runtime state of one node.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NodeState {
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	/// Pinned x; overrides the integrated position while set.
	pub fx: Option<f64>,
	/// Pinned y; overrides the integrated position while set.
	pub fy: Option<f64>,
}

impl NodeState {
	pub fn is_pinned(&self) -> bool {
		self.fx.is_some() || self.fy.is_some()
	}

	pub fn position(&self) -> (f64, f64) {
		(self.x, self.y)
	}
}

#[derive(Clone, Copy, Debug)]
struct Spring {
	source: usize,
	target: usize,
	strength: f64,
	/// Share of the correction applied to the target.
	bias: f64,
}

pub struct Simulation {
	config: ForceConfig,
	nodes: Vec<NodeState>,
	springs: Vec<Spring>,
	charges: Vec<f64>,
	center: (f64, f64),
	alpha: f64,
	alpha_target: f64,
	rng: XorShift64Star,
	ticks: u64,
}

impl Simulation {
	/// Places every node of `graph` on a circle around the viewport center.
	pub fn new(graph: &Graph, viewport: Viewport, config: &ForceConfig) -> Self {
		let mut rng = XorShift64Star::new(config.seed.unwrap_or(DEFAULT_SEED));
		let center = viewport.center();
		let n = graph.len();

		let radius = config
			.initial_radius
			.max(n as f64 * config.collide_radius / PI);
		let nodes = (0..n)
			.map(|i| {
				let angle = (i as f64) * 2.0 * PI / n as f64;
				let jx = (rng.next_f64() - 0.5) * 2.0;
				let jy = (rng.next_f64() - 0.5) * 2.0;
				NodeState {
					x: center.0 + radius * angle.cos() + jx,
					y: center.1 + radius * angle.sin() + jy,
					..NodeState::default()
				}
			})
			.collect();

		let degrees = graph.degrees();
		let springs = graph
			.links()
			.iter()
			.map(|link| {
				let (ds, dt) = (degrees[link.source] as f64, degrees[link.target] as f64);
				Spring {
					source: link.source,
					target: link.target,
					strength: 1.0 / ds.min(dt),
					bias: ds / (ds + dt),
				}
			})
			.collect();

		Self {
			config: config.clone(),
			nodes,
			springs,
			charges: vec![config.charge_strength; n],
			center,
			alpha: config.alpha,
			alpha_target: 0.0,
			rng,
			ticks: 0,
		}
	}

	/// Advances the layout by one step.
	pub fn tick(&mut self) {
		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
		let alpha = self.alpha;

		self.apply_springs(alpha);
		self.apply_charge(alpha);
		self.integrate();
		self.apply_center();
		for _ in 0..self.config.collide_iterations {
			self.apply_collisions();
		}
		self.ticks += 1;
	}

	/// Ticks until at rest or `max_ticks` is reached; returns ticks taken.
	#[cfg(test)]
	pub fn run_to_rest(&mut self, max_ticks: usize) -> usize {
		let mut taken = 0;
		while !self.is_at_rest() && taken < max_ticks {
			self.tick();
			taken += 1;
		}
		taken
	}

	/// True once alpha has cooled below `alpha_min` with nothing holding it up.
	pub fn is_at_rest(&self) -> bool {
		let min = self.config.alpha_min;
		self.nodes.is_empty() || (self.alpha < min && self.alpha_target < min)
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	#[cfg(test)]
	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	/// Sets the value alpha decays toward. Above `alpha_min` the solver never rests.
	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target.max(0.0);
	}

	/// Raises alpha to at least `alpha`, waking a resting solver.
	pub fn reheat(&mut self, alpha: f64) {
		self.alpha = self.alpha.max(alpha);
	}

	#[cfg(test)]
	pub fn center(&self) -> (f64, f64) {
		self.center
	}

	pub fn set_center(&mut self, x: f64, y: f64) {
		self.center = (x, y);
	}

	/// Holds node `idx` at `(x, y)`. Returns false for an unknown index.
	pub fn pin(&mut self, idx: usize, x: f64, y: f64) -> bool {
		let Some(node) = self.nodes.get_mut(idx) else {
			return false;
		};
		node.fx = Some(x);
		node.fy = Some(y);
		true
	}

	/// Releases node `idx` back to the forces. Returns false for an unknown index.
	pub fn unpin(&mut self, idx: usize) -> bool {
		let Some(node) = self.nodes.get_mut(idx) else {
			return false;
		};
		node.fx = None;
		node.fy = None;
		true
	}

	pub fn nodes(&self) -> &[NodeState] {
		&self.nodes
	}

	pub fn node(&self, idx: usize) -> Option<&NodeState> {
		self.nodes.get(idx)
	}

	pub fn ticks(&self) -> u64 {
		self.ticks
	}

	fn apply_springs(&mut self, alpha: f64) {
		let distance = self.config.link_distance;
		for spring in &self.springs {
			let (s, t) = (self.nodes[spring.source], self.nodes[spring.target]);
			let mut dx = t.x + t.vx - s.x - s.vx;
			let mut dy = t.y + t.vy - s.y - s.vy;
			if dx == 0.0 {
				dx = self.rng.jiggle();
			}
			if dy == 0.0 {
				dy = self.rng.jiggle();
			}
			let l = (dx * dx + dy * dy).sqrt();
			let k = (l - distance) / l * alpha * spring.strength;
			let (dx, dy) = (dx * k, dy * k);

			let target = &mut self.nodes[spring.target];
			target.vx -= dx * spring.bias;
			target.vy -= dy * spring.bias;
			let source = &mut self.nodes[spring.source];
			source.vx += dx * (1.0 - spring.bias);
			source.vy += dy * (1.0 - spring.bias);
		}
	}

	fn apply_charge(&mut self, alpha: f64) {
		if self.nodes.len() < 2 {
			return;
		}
		let positions: Vec<(f64, f64)> = self.nodes.iter().map(NodeState::position).collect();
		let tree = QuadTree::build(&positions, &self.charges);
		let params = Repulsion {
			theta2: self.config.theta * self.config.theta,
			distance_min2: self.config.distance_min * self.config.distance_min,
			alpha,
		};
		for (i, node) in self.nodes.iter_mut().enumerate() {
			let (dvx, dvy) = tree.force_on(i, params, &mut self.rng);
			node.vx += dvx;
			node.vy += dvy;
		}
	}

	fn integrate(&mut self) {
		let keep = 1.0 - self.config.velocity_decay;
		for node in &mut self.nodes {
			match node.fx {
				Some(fx) => {
					node.x = fx;
					node.vx = 0.0;
				}
				None => {
					node.vx *= keep;
					node.x += node.vx;
				}
			}
			match node.fy {
				Some(fy) => {
					node.y = fy;
					node.vy = 0.0;
				}
				None => {
					node.vy *= keep;
					node.y += node.vy;
				}
			}
		}
	}

	fn apply_center(&mut self) {
		let (mut sx, mut sy, mut count) = (0.0, 0.0, 0usize);
		for node in self.nodes.iter().filter(|n| !n.is_pinned()) {
			sx += node.x;
			sy += node.y;
			count += 1;
		}
		if count == 0 {
			return;
		}
		let strength = self.config.center_strength;
		let shift_x = (self.center.0 - sx / count as f64) * strength;
		let shift_y = (self.center.1 - sy / count as f64) * strength;
		for node in self.nodes.iter_mut().filter(|n| !n.is_pinned()) {
			node.x += shift_x;
			node.y += shift_y;
		}
	}

	/// Pairwise overlap resolution. Pinned nodes never move; a free node
	/// touching a pinned one takes the whole displacement.
	fn apply_collisions(&mut self) {
		let min_dist = self.config.collide_radius * 2.0;
		let n = self.nodes.len();
		for i in 0..n {
			for j in (i + 1)..n {
				let (a, b) = (self.nodes[i], self.nodes[j]);
				let (pinned_a, pinned_b) = (a.is_pinned(), b.is_pinned());
				if pinned_a && pinned_b {
					continue;
				}
				let mut dx = b.x - a.x;
				let mut dy = b.y - a.y;
				if dx == 0.0 {
					dx = self.rng.jiggle();
				}
				if dy == 0.0 {
					dy = self.rng.jiggle();
				}
				let d2 = dx * dx + dy * dy;
				if d2 >= min_dist * min_dist {
					continue;
				}
				let d = d2.sqrt();
				let overlap = (min_dist - d) / d;
				let (wa, wb) = match (pinned_a, pinned_b) {
					(true, _) => (0.0, 1.0),
					(_, true) => (1.0, 0.0),
					_ => (0.5, 0.5),
				};
				let a = &mut self.nodes[i];
				a.x -= dx * overlap * wa;
				a.y -= dy * overlap * wa;
				let b = &mut self.nodes[j];
				b.x += dx * overlap * wb;
				b.y += dy * overlap * wb;
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::{GraphData, GraphLink, GraphNode, NodeKind};

	fn sample() -> (Graph, Simulation) {
		let graph = Graph::from_data(&GraphData::sample()).unwrap();
		let sim = Simulation::new(&graph, Viewport::new(800.0, 600.0), &ForceConfig::default());
		(graph, sim)
	}

	fn distance(a: &NodeState, b: &NodeState) -> f64 {
		((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
	}

	fn centroid(nodes: &[NodeState]) -> (f64, f64) {
		let n = nodes.len() as f64;
		let (sx, sy) = nodes
			.iter()
			.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
		(sx / n, sy / n)
	}

	#[test]
	fn sample_settles_near_rest_length_without_overlap() {
		let (graph, mut sim) = sample();
		let taken = sim.run_to_rest(10_000);
		assert!(sim.is_at_rest());
		assert!((250..=400).contains(&taken), "took {taken} ticks");

		let nodes = sim.nodes();
		for link in graph.links() {
			let d = distance(&nodes[link.source], &nodes[link.target]);
			assert!((120.0..=180.0).contains(&d), "link length {d}");
		}
		for i in 0..nodes.len() {
			for j in (i + 1)..nodes.len() {
				let d = distance(&nodes[i], &nodes[j]);
				assert!(d >= 120.0 - 1e-3, "nodes {i} and {j} overlap at {d}");
			}
		}
	}

	#[test]
	fn settled_layout_is_centered() {
		let (_, mut sim) = sample();
		sim.run_to_rest(10_000);
		let (cx, cy) = centroid(sim.nodes());
		assert!((cx - 400.0).abs() < 1.0 && (cy - 300.0).abs() < 1.0);
	}

	#[test]
	fn fixed_seed_is_reproducible() {
		let (_, mut a) = sample();
		let (_, mut b) = sample();
		a.run_to_rest(10_000);
		b.run_to_rest(10_000);
		assert_eq!(a.nodes(), b.nodes());
	}

	#[test]
	fn different_seeds_converge_alike() {
		let graph = Graph::from_data(&GraphData::sample()).unwrap();
		for seed in [1, 7, 42, 12345] {
			let config = ForceConfig {
				seed: Some(seed),
				..ForceConfig::default()
			};
			let mut sim = Simulation::new(&graph, Viewport::new(800.0, 600.0), &config);
			sim.run_to_rest(10_000);
			for link in graph.links() {
				let d = distance(&sim.nodes()[link.source], &sim.nodes()[link.target]);
				assert!((120.0..=180.0).contains(&d), "seed {seed}: link length {d}");
			}
		}
	}

	#[test]
	fn pinned_node_holds_exact_position() {
		let (_, mut sim) = sample();
		assert!(sim.pin(3, 100.0, 120.0));
		sim.set_alpha_target(0.3);
		for _ in 0..200 {
			sim.tick();
			let db = sim.node(3).unwrap();
			assert_eq!((db.x, db.y), (100.0, 120.0));
			assert_eq!((db.vx, db.vy), (0.0, 0.0));
		}
		assert!(!sim.is_at_rest());
	}

	#[test]
	fn pinned_node_still_tethers_neighbors() {
		let (_, mut sim) = sample();
		sim.pin(3, 100.0, 120.0);
		sim.run_to_rest(10_000);
		let api = sim.node(2).unwrap();
		let d = ((api.x - 100.0).powi(2) + (api.y - 120.0).powi(2)).sqrt();
		assert!(d < 250.0, "api drifted {d} away from pinned db");
	}

	#[test]
	fn pinned_node_repels_free_neighbor() {
		let data = GraphData {
			nodes: ["anchor", "free"]
				.into_iter()
				.map(|id| GraphNode {
					id: id.into(),
					name: id.into(),
					kind: NodeKind::Backend,
				})
				.collect(),
			links: Vec::new(),
		};
		let graph = Graph::from_data(&data).unwrap();
		let config = ForceConfig {
			collide_radius: 0.0,
			center_strength: 0.0,
			..ForceConfig::default()
		};
		let mut sim = Simulation::new(&graph, Viewport::new(800.0, 600.0), &config);
		sim.pin(0, 400.0, 300.0);
		sim.pin(1, 450.0, 300.0);
		sim.tick();
		sim.unpin(1);

		let gap = |sim: &Simulation| {
			let free = sim.node(1).unwrap();
			((free.x - 400.0).powi(2) + (free.y - 300.0).powi(2)).sqrt()
		};
		let mut last = gap(&sim);
		assert_eq!(last, 50.0);
		for _ in 0..5 {
			sim.tick();
			let now = gap(&sim);
			assert!(now > last, "free node moved from {last} to {now}");
			last = now;
			let anchor = sim.node(0).unwrap();
			assert_eq!((anchor.x, anchor.y), (400.0, 300.0));
		}
	}

	#[test]
	fn unpin_lets_layout_cool_to_rest() {
		let (_, mut sim) = sample();
		sim.pin(0, 400.0, 300.0);
		sim.set_alpha_target(0.3);
		for _ in 0..100 {
			sim.tick();
		}
		sim.unpin(0);
		sim.set_alpha_target(0.0);
		let taken = sim.run_to_rest(10_000);
		assert!(sim.is_at_rest());
		assert!(taken < 1000);
		assert!(!sim.node(0).unwrap().is_pinned());
	}

	#[test]
	fn pin_unknown_index_is_rejected() {
		let (_, mut sim) = sample();
		assert!(!sim.pin(99, 0.0, 0.0));
		assert!(!sim.unpin(99));
	}

	#[test]
	fn reheat_wakes_resting_solver() {
		let (_, mut sim) = sample();
		sim.run_to_rest(10_000);
		let ticks = sim.ticks();
		sim.reheat(0.3);
		assert!(!sim.is_at_rest());
		assert_eq!(sim.alpha(), 0.3);
		sim.run_to_rest(10_000);
		assert!(sim.ticks() > ticks);
	}

	#[test]
	fn alpha_target_wakes_resting_solver() {
		let (_, mut sim) = sample();
		sim.run_to_rest(10_000);
		sim.set_alpha_target(0.3);
		assert!(!sim.is_at_rest());
		for _ in 0..50 {
			sim.tick();
		}
		assert!(sim.alpha() > 0.1);
		sim.set_alpha_target(0.0);
		sim.run_to_rest(10_000);
		assert!(sim.is_at_rest());
	}

	#[test]
	fn reheat_never_lowers_alpha() {
		let (_, mut sim) = sample();
		sim.reheat(0.3);
		assert_eq!(sim.alpha(), 1.0);
	}

	#[test]
	fn recenters_after_viewport_change() {
		let (_, mut sim) = sample();
		sim.run_to_rest(10_000);
		sim.set_center(600.0, 450.0);
		sim.reheat(0.3);
		sim.run_to_rest(10_000);
		let (cx, cy) = centroid(sim.nodes());
		assert!((cx - 600.0).abs() < 1.0, "centroid x {cx}");
		assert!((cy - 450.0).abs() < 1.0, "centroid y {cy}");
	}

	#[test]
	fn empty_graph_is_at_rest() {
		let graph = Graph::from_data(&GraphData::default()).unwrap();
		let mut sim = Simulation::new(&graph, Viewport::new(800.0, 600.0), &ForceConfig::default());
		assert!(sim.is_at_rest());
		assert_eq!(sim.run_to_rest(10), 0);
	}

	#[test]
	fn larger_tree_stays_finite_and_separated() {
		let mut rng = XorShift64Star::new(3);
		let nodes = (0..120)
			.map(|i| GraphNode {
				id: format!("n{i}"),
				name: format!("Node {i}"),
				kind: NodeKind::Backend,
			})
			.collect();
		let links = (1..120)
			.map(|i| GraphLink {
				source: format!("n{i}"),
				target: format!("n{}", (rng.next_f64() * i as f64) as usize),
			})
			.collect();
		let graph = Graph::from_data(&GraphData { nodes, links }).unwrap();
		let mut sim = Simulation::new(&graph, Viewport::new(800.0, 600.0), &ForceConfig::default());
		sim.run_to_rest(10_000);

		let states = sim.nodes();
		assert!(states.iter().all(|n| n.x.is_finite() && n.y.is_finite()));
		let closest = (0..states.len())
			.flat_map(|i| ((i + 1)..states.len()).map(move |j| (i, j)))
			.map(|(i, j)| distance(&states[i], &states[j]))
			.fold(f64::INFINITY, f64::min);
		assert!(closest > 100.0, "closest pair {closest}");
	}
}
