//! Force-directed layout over an arena of particles.
//!
//! One particle per node, indexed like [`Graph::nodes`]. Each tick applies a
//! link force, a many-body repulsion and a centering force, then integrates
//! velocities. Cooling follows the d3-force model: `alpha` decays towards
//! `alpha_target` and the simulation stops once it drops below `alpha_min`.

use std::f64::consts::PI;

use log::debug;

use crate::config::SimulationConfig;
use crate::graph::Graph;

const INITIAL_RADIUS: f64 = 10.0;

/// Per-node layout state. Only the simulation writes to it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Particle {
	/// Position in graph space.
	pub x: f64,
	/// See `x`.
	pub y: f64,
	/// Velocity, in graph units per tick.
	pub vx: f64,
	/// See `vx`.
	pub vy: f64,
	/// Pinned position; a pinned particle does not move on its own.
	pub fx: Option<f64>,
	/// See `fx`.
	pub fy: Option<f64>,
}

#[derive(Clone, Copy, Debug)]
struct Link {
	source: usize,
	target: usize,
	strength: f64,
	bias: f64,
}

/// Seeded linear congruential generator, used only to separate coincident
/// particles. Keeps layouts reproducible for a given input.
#[derive(Clone, Debug)]
struct Lcg(u64);

impl Lcg {
	const M: u64 = 4_294_967_296;

	fn next(&mut self) -> f64 {
		self.0 = (1_664_525 * self.0 + 1_013_904_223) % Self::M;
		self.0 as f64 / Self::M as f64
	}

	fn jiggle(&mut self) -> f64 {
		(self.next() - 0.5) * 1e-6
	}
}

/// The layout simulation for one graph.
#[derive(Clone, Debug)]
pub struct Simulation {
	particles: Vec<Particle>,
	links: Vec<Link>,
	config: SimulationConfig,
	center: (f64, f64),
	alpha: f64,
	alpha_target: f64,
	ticks: usize,
	rng: Lcg,
}

impl Simulation {
	/// Place every node on a phyllotaxis spiral around `center`.
	pub fn new(graph: &Graph, config: SimulationConfig, center: (f64, f64)) -> Self {
		let golden = PI * (3.0 - 5f64.sqrt());
		let particles = (0..graph.nodes.len())
			.map(|i| {
				let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
				let angle = i as f64 * golden;
				Particle {
					x: center.0 + radius * angle.cos(),
					y: center.1 + radius * angle.sin(),
					..Particle::default()
				}
			})
			.collect();

		let degree = graph.degrees();
		let links = graph
			.edges
			.iter()
			.map(|e| {
				let (ds, dt) = (degree[e.source] as f64, degree[e.target] as f64);
				Link {
					source: e.source,
					target: e.target,
					strength: 1.0 / ds.min(dt),
					bias: ds / (ds + dt),
				}
			})
			.collect();

		Self {
			particles,
			links,
			config,
			center,
			alpha: 1.0,
			alpha_target: 0.0,
			ticks: 0,
			rng: Lcg(1),
		}
	}

	/// Read-only view of the arena.
	pub fn particles(&self) -> &[Particle] {
		&self.particles
	}

	/// Current temperature; forces are scaled by it.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Ticks run since the last (re)heat.
	pub fn ticks(&self) -> usize {
		self.ticks
	}

	/// Whether another tick would still move anything.
	///
	/// `max_ticks` only bounds cooling; a positive `alpha_target` (the user is
	/// dragging) keeps the simulation live for as long as it is held.
	pub fn is_running(&self) -> bool {
		let cooled = self.alpha < self.config.alpha_min && self.alpha_target < self.config.alpha_min;
		let interacting = self.alpha_target > 0.0;
		!cooled && (interacting || self.ticks < self.config.max_ticks)
	}

	/// Advance one step. Returns `false` once the layout has converged.
	pub fn tick(&mut self) -> bool {
		if !self.is_running() {
			return false;
		}
		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
		self.ticks += 1;

		self.apply_links();
		self.apply_charge();
		self.apply_center();
		self.integrate();

		if !self.is_running() {
			debug!(
				"Layout settled after {} ticks (alpha {:.4})",
				self.ticks, self.alpha
			);
		}
		true
	}

	/// Run until converged or `max_ticks`.
	pub fn run_to_end(&mut self) {
		while self.tick() {}
	}

	/// Pin a particle at `(x, y)`.
	pub fn pin(&mut self, idx: usize, x: f64, y: f64) {
		if let Some(p) = self.particles.get_mut(idx) {
			p.fx = Some(x);
			p.fy = Some(y);
			p.x = x;
			p.y = y;
		}
	}

	/// Release a pinned particle back to the forces.
	pub fn unpin(&mut self, idx: usize) {
		if let Some(p) = self.particles.get_mut(idx) {
			p.fx = None;
			p.fy = None;
		}
	}

	/// Keep the simulation warm while the user interacts with it, or let it
	/// cool again with `alpha_target = 0`. Either way the tick budget restarts.
	pub fn reheat(&mut self, alpha_target: f64) {
		self.alpha_target = alpha_target;
		if alpha_target > 0.0 {
			self.alpha = self.alpha.max(alpha_target);
		}
		self.ticks = 0;
	}

	fn apply_links(&mut self) {
		let alpha = self.alpha;
		let distance = self.config.link_distance;
		for link in &self.links {
			if link.source == link.target {
				continue;
			}
			let (s, t) = (self.particles[link.source], self.particles[link.target]);
			let mut x = t.x + t.vx - s.x - s.vx;
			let mut y = t.y + t.vy - s.y - s.vy;
			if x == 0.0 {
				x = self.rng.jiggle();
			}
			if y == 0.0 {
				y = self.rng.jiggle();
			}
			let len = (x * x + y * y).sqrt();
			let l = (len - distance) / len * alpha * link.strength;
			let (x, y) = (x * l, y * l);

			let target = &mut self.particles[link.target];
			target.vx -= x * link.bias;
			target.vy -= y * link.bias;
			let source = &mut self.particles[link.source];
			source.vx += x * (1.0 - link.bias);
			source.vy += y * (1.0 - link.bias);
		}
	}

	fn apply_charge(&mut self) {
		let n = self.particles.len();
		let strength = self.config.charge_strength * self.alpha;
		let min2 = self.config.charge_distance_min * self.config.charge_distance_min;
		let mut dv = vec![(0.0, 0.0); n];

		for i in 0..n {
			for j in 0..n {
				if i == j {
					continue;
				}
				let (a, b) = (self.particles[i], self.particles[j]);
				let mut x = b.x - a.x;
				let mut y = b.y - a.y;
				if x == 0.0 {
					x = self.rng.jiggle();
				}
				if y == 0.0 {
					y = self.rng.jiggle();
				}
				let mut l = x * x + y * y;
				if l < min2 {
					l = (min2 * l).sqrt();
				}
				let w = strength / l;
				dv[i].0 += x * w;
				dv[i].1 += y * w;
			}
		}

		for (p, (dx, dy)) in self.particles.iter_mut().zip(dv) {
			p.vx += dx;
			p.vy += dy;
		}
	}

	fn apply_center(&mut self) {
		let n = self.particles.len();
		if n == 0 {
			return;
		}
		let (sx, sy) = self
			.particles
			.iter()
			.fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
		let dx = (sx / n as f64 - self.center.0) * self.config.center_strength;
		let dy = (sy / n as f64 - self.center.1) * self.config.center_strength;
		for p in &mut self.particles {
			p.x -= dx;
			p.y -= dy;
		}
	}

	fn integrate(&mut self) {
		let keep = 1.0 - self.config.velocity_decay;
		for p in &mut self.particles {
			match p.fx {
				Some(fx) => {
					p.x = fx;
					p.vx = 0.0;
				}
				None => {
					p.vx *= keep;
					p.x += p.vx;
				}
			}
			match p.fy {
				Some(fy) => {
					p.y = fy;
					p.vy = 0.0;
				}
				None => {
					p.vy *= keep;
					p.y += p.vy;
				}
			}
		}
	}
}
