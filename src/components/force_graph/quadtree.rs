//! Barnes–Hut quad-tree for the many-body (repulsion) force.
//!
//! Cells far enough from a node, measured by `cell_size² / θ² < distance²`, act
//! as a single charge at their |charge|-weighted centroid. Everything else is
//! summed exactly at the leaves. With θ = 0.9 the aggregated cells introduce a
//! relative error of roughly θ² on the far-field contribution, which is not
//! visible in the settled layout.

use super::rng::XorShift64Star;

/// Coincident points stop subdividing at this depth.
const MAX_DEPTH: usize = 32;

#[derive(Clone, Debug)]
struct Quad {
	x0: f64,
	y0: f64,
	size: f64,
	children: [Option<usize>; 4],
	points: Vec<usize>,
	charge: f64,
	cx: f64,
	cy: f64,
}

impl Quad {
	fn new(x0: f64, y0: f64, size: f64) -> Self {
		Self {
			x0,
			y0,
			size,
			children: [None; 4],
			points: Vec::new(),
			charge: 0.0,
			cx: 0.0,
			cy: 0.0,
		}
	}

	fn is_leaf(&self) -> bool {
		self.children.iter().all(Option::is_none)
	}
}

/// Parameters for one repulsion query.
#[derive(Clone, Copy, Debug)]
pub struct Repulsion {
	/// Barnes–Hut opening angle, squared.
	pub theta2: f64,
	/// Squared distance below which the force is softened.
	pub distance_min2: f64,
	pub alpha: f64,
}

/// Arena-backed quad-tree over a snapshot of node positions.
pub struct QuadTree<'a> {
	quads: Vec<Quad>,
	positions: &'a [(f64, f64)],
	charges: &'a [f64],
}

impl<'a> QuadTree<'a> {
	/// Builds the tree and accumulates cell charges. `charges[i]` belongs to `positions[i]`.
	pub fn build(positions: &'a [(f64, f64)], charges: &'a [f64]) -> Self {
		let mut tree = Self {
			quads: Vec::new(),
			positions,
			charges,
		};
		if positions.is_empty() {
			return tree;
		}

		let (mut x0, mut y0) = (f64::INFINITY, f64::INFINITY);
		let (mut x1, mut y1) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
		for &(x, y) in positions {
			x0 = x0.min(x);
			y0 = y0.min(y);
			x1 = x1.max(x);
			y1 = y1.max(y);
		}
		let size = (x1 - x0).max(y1 - y0).max(1.0);
		tree.quads.push(Quad::new(x0, y0, size));

		for i in 0..positions.len() {
			tree.insert(0, i, 0);
		}
		tree.accumulate(0);
		tree
	}

	/// Total charge of the tree.
	#[cfg(test)]
	pub fn total_charge(&self) -> f64 {
		self.quads.first().map_or(0.0, |q| q.charge)
	}

	fn insert(&mut self, q: usize, i: usize, depth: usize) {
		if self.quads[q].is_leaf() {
			let quad = &self.quads[q];
			let coincident = quad
				.points
				.first()
				.is_some_and(|&p| self.positions[p] == self.positions[i]);
			if quad.points.is_empty() || coincident || depth >= MAX_DEPTH {
				self.quads[q].points.push(i);
				return;
			}
			let existing = std::mem::take(&mut self.quads[q].points);
			for p in existing {
				self.insert_child(q, p, depth);
			}
		}
		self.insert_child(q, i, depth);
	}

	fn insert_child(&mut self, q: usize, i: usize, depth: usize) {
		let (x, y) = self.positions[i];
		let quad = &self.quads[q];
		let half = quad.size / 2.0;
		let right = x >= quad.x0 + half;
		let below = y >= quad.y0 + half;
		let slot = usize::from(right) | (usize::from(below) << 1);

		let child = match quad.children[slot] {
			Some(child) => child,
			None => {
				let x0 = if right { quad.x0 + half } else { quad.x0 };
				let y0 = if below { quad.y0 + half } else { quad.y0 };
				self.quads.push(Quad::new(x0, y0, half));
				let child = self.quads.len() - 1;
				self.quads[q].children[slot] = Some(child);
				child
			}
		};
		self.insert(child, i, depth + 1);
	}

	fn accumulate(&mut self, q: usize) {
		let (mut charge, mut wx, mut wy, mut weight) = (0.0, 0.0, 0.0, 0.0);

		if self.quads[q].is_leaf() {
			for &p in &self.quads[q].points {
				let c = self.charges[p];
				let (x, y) = self.positions[p];
				charge += c;
				wx += c.abs() * x;
				wy += c.abs() * y;
				weight += c.abs();
			}
		} else {
			let children = self.quads[q].children;
			for child in children.into_iter().flatten() {
				self.accumulate(child);
				let cq = &self.quads[child];
				charge += cq.charge;
				wx += cq.charge.abs() * cq.cx;
				wy += cq.charge.abs() * cq.cy;
				weight += cq.charge.abs();
			}
		}

		let quad = &mut self.quads[q];
		quad.charge = charge;
		if weight > 0.0 {
			quad.cx = wx / weight;
			quad.cy = wy / weight;
		}
	}

	/// Velocity change on node `i` from every other charge in the tree.
	pub fn force_on(&self, i: usize, params: Repulsion, rng: &mut XorShift64Star) -> (f64, f64) {
		let mut acc = (0.0, 0.0);
		if !self.quads.is_empty() {
			self.visit(0, i, params, rng, &mut acc);
		}
		acc
	}

	fn visit(
		&self,
		q: usize,
		i: usize,
		params: Repulsion,
		rng: &mut XorShift64Star,
		acc: &mut (f64, f64),
	) {
		let quad = &self.quads[q];
		if quad.charge == 0.0 {
			return;
		}
		let (x, y) = self.positions[i];

		if !quad.is_leaf() {
			let (dx, dy) = (quad.cx - x, quad.cy - y);
			let mut l = dx * dx + dy * dy;
			if quad.size * quad.size / params.theta2 < l {
				if l < params.distance_min2 {
					l = (params.distance_min2 * l).sqrt();
				}
				acc.0 += dx * quad.charge * params.alpha / l;
				acc.1 += dy * quad.charge * params.alpha / l;
				return;
			}
			for child in quad.children.iter().flatten() {
				self.visit(*child, i, params, rng, acc);
			}
			return;
		}

		for &p in &quad.points {
			if p == i {
				continue;
			}
			let (px, py) = self.positions[p];
			let mut dx = px - x;
			let mut dy = py - y;
			if dx == 0.0 {
				dx = rng.jiggle();
			}
			if dy == 0.0 {
				dy = rng.jiggle();
			}
			let mut l = dx * dx + dy * dy;
			if l < params.distance_min2 {
				l = (params.distance_min2 * l).sqrt();
			}
			acc.0 += dx * self.charges[p] * params.alpha / l;
			acc.1 += dy * self.charges[p] * params.alpha / l;
		}
	}
}
