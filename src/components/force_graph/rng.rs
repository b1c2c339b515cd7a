//! Seeded pseudo-random source for initial jitter and coincident-node nudges.

/// xorshift64* generator. Small, fast, and reproducible from a seed.
#[derive(Clone, Debug)]
pub struct XorShift64Star {
	state: u64,
}

impl XorShift64Star {
	pub fn new(seed: u64) -> Self {
		Self { state: seed.max(1) }
	}

	pub fn next_u64(&mut self) -> u64 {
		let mut x = self.state;
		x ^= x >> 12;
		x ^= x << 25;
		x ^= x >> 27;
		self.state = x;
		x.wrapping_mul(0x2545F4914F6CDD1D_u64)
	}

	/// Uniform in `[0, 1)` with 53 bits of precision.
	pub fn next_f64(&mut self) -> f64 {
		let u = self.next_u64() >> 11;
		(u as f64) / ((1u64 << 53) as f64)
	}

	/// Tiny random offset used to break ties between coincident positions.
	pub fn jiggle(&mut self) -> f64 {
		(self.next_f64() - 0.5) * 1e-6
	}
}
