use std::collections::{HashMap, HashSet};

use crate::config::ViewerConfig;
use crate::graph::Graph;

use super::simulation::Simulation;

const COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

/// Drawn node radius, in graph units.
pub const NODE_RADIUS: f64 = 5.0;
/// Pointer distance that still counts as hitting a node.
pub const HIT_RADIUS: f64 = 12.0;
/// Alpha target while a node is being dragged.
pub const DRAG_ALPHA: f64 = 0.3;

/// How a node is drawn.
#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	/// The node identifier.
	pub label: String,
	/// CSS colour.
	pub color: String,
}

/// Edge endpoints (particle indices) and the label shown on hover.
#[derive(Clone, Debug, Default)]
pub struct EdgeInfo {
	/// Source particle.
	pub source: usize,
	/// Target particle.
	pub target: usize,
	/// Relationship label.
	pub relationship: String,
}

/// Pan offset `(x, y)` in screen pixels and zoom factor `k`.
#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	/// Horizontal offset.
	pub x: f64,
	/// Vertical offset.
	pub y: f64,
	/// Zoom.
	pub k: f64,
}

/// A node drag in progress.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	/// Whether a node is held.
	pub active: bool,
	/// The held node.
	pub node_idx: Option<usize>,
	/// Pointer position at drag start, screen space.
	pub start_x: f64,
	/// See `start_x`.
	pub start_y: f64,
	/// Node position at drag start, graph space.
	pub node_start_x: f64,
	/// See `node_start_x`.
	pub node_start_y: f64,
}

/// A background pan in progress.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	/// Whether the background is held.
	pub active: bool,
	/// Pointer position at pan start.
	pub start_x: f64,
	/// See `start_x`.
	pub start_y: f64,
	/// Transform offset at pan start.
	pub transform_start_x: f64,
	/// See `transform_start_x`.
	pub transform_start_y: f64,
}

/// Hover highlight, including the node fading out after the pointer left.
#[derive(Clone, Debug, Default)]
pub struct HoverState {
	/// Node under the pointer.
	pub node: Option<usize>,
	/// Nodes sharing an edge with `node`.
	pub neighbors: HashSet<usize>,
	/// Highlight progress in `[0, 1]`.
	pub highlight_t: f64,
	/// Previously hovered node, still fading.
	pub prev_node: Option<usize>,
	/// Neighbours of `prev_node`.
	pub prev_neighbors: HashSet<usize>,
	delay_t: f64,
}

/// Everything the canvas needs between frames: the simulation, the node and
/// edge presentation, and the pointer interaction state.
pub struct ForceGraphState {
	/// Layout engine; owns the particle arena.
	pub simulation: Simulation,
	/// Per-node presentation, indexed like the particles.
	pub nodes: Vec<NodeInfo>,
	/// Every edge of the graph.
	pub edges: Vec<EdgeInfo>,
	/// Current pan and zoom.
	pub transform: ViewTransform,
	/// Node drag.
	pub drag: DragState,
	/// Background pan.
	pub pan: PanState,
	/// Hover highlight.
	pub hover: HoverState,
	/// Canvas width in pixels.
	pub width: f64,
	/// Canvas height in pixels.
	pub height: f64,
	/// Label every node, not only highlighted ones.
	pub show_all_labels: bool,
	/// Seconds elapsed, drives the edge dash animation.
	pub flow_time: f64,
}

impl ForceGraphState {
	/// Lay out `graph` around the middle of a `width` x `height` canvas.
	pub fn new(graph: &Graph, config: &ViewerConfig, width: f64, height: f64) -> Self {
		let simulation = Simulation::new(
			graph,
			config.simulation.clone(),
			(width / 2.0, height / 2.0),
		);

		// colour by the first relationship each node takes part in
		let kinds: HashMap<&str, usize> = graph
			.relationships()
			.into_iter()
			.enumerate()
			.map(|(i, r)| (r, i))
			.collect();
		let mut group = vec![None; graph.nodes.len()];
		for edge in &graph.edges {
			let kind = kinds.get(edge.relationship.as_str()).copied();
			for idx in [edge.source, edge.target] {
				if group[idx].is_none() {
					group[idx] = kind;
				}
			}
		}

		let nodes = graph
			.nodes
			.iter()
			.zip(group)
			.map(|(node, g)| NodeInfo {
				label: node.id.to_string(),
				color: COLORS[g.unwrap_or(0) % COLORS.len()].into(),
			})
			.collect();
		let edges = graph
			.edges
			.iter()
			.map(|e| EdgeInfo {
				source: e.source,
				target: e.target,
				relationship: e.relationship.clone(),
			})
			.collect();

		Self {
			simulation,
			nodes,
			edges,
			transform: ViewTransform {
				x: 0.0,
				y: 0.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			show_all_labels: graph.nodes.len() <= config.label_threshold,
			flow_time: 0.0,
		}
	}

	/// Undo the view transform.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node under a screen position.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		// HIT_RADIUS is in world-space, scales with zoom like nodes
		self.simulation
			.particles()
			.iter()
			.enumerate()
			.rev()
			.find(|(_, p)| ((p.x - gx).powi(2) + (p.y - gy).powi(2)).sqrt() < HIT_RADIUS)
			.map(|(idx, _)| idx)
	}

	/// Change the hovered node and recompute its neighbours.
	pub fn set_hover(&mut self, node: Option<usize>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// Save previous state for fade-out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			for edge in &self.edges {
				if edge.source == idx {
					self.hover.neighbors.insert(edge.target);
				} else if edge.target == idx {
					self.hover.neighbors.insert(edge.source);
				}
			}
		}
	}

	/// Hovered, fading, or a neighbour of either.
	pub fn is_highlighted(&self, idx: usize) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	/// Hovered or fading.
	pub fn is_hovered(&self, idx: usize) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	/// Whether any highlight is showing.
	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	/// Start dragging the node under the pointer, or panning if there is none.
	pub fn pointer_down(&mut self, x: f64, y: f64) {
		if let Some(idx) = self.node_at_position(x, y) {
			let p = self.simulation.particles()[idx];
			self.drag = DragState {
				active: true,
				node_idx: Some(idx),
				start_x: x,
				start_y: y,
				node_start_x: p.x,
				node_start_y: p.y,
			};
			self.simulation.pin(idx, p.x, p.y);
			self.simulation.reheat(DRAG_ALPHA);
		} else {
			self.pan = PanState {
				active: true,
				start_x: x,
				start_y: y,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
			};
		}
	}

	/// Move a held node, pan, or update hover.
	pub fn pointer_move(&mut self, x: f64, y: f64) {
		// Update hover state when not dragging
		if !self.drag.active {
			let hovered = self.node_at_position(x, y);
			self.set_hover(hovered);
		}

		if self.drag.active {
			if let Some(idx) = self.drag.node_idx {
				let (dx, dy) = (
					(x - self.drag.start_x) / self.transform.k,
					(y - self.drag.start_y) / self.transform.k,
				);
				self.simulation
					.pin(idx, self.drag.node_start_x + dx, self.drag.node_start_y + dy);
			}
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (x - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (y - self.pan.start_y);
		}
	}

	/// End a drag or pan. A dragged node stays pinned where it was dropped.
	pub fn pointer_up(&mut self) {
		if self.drag.active {
			self.simulation.reheat(0.0);
		}
		self.drag = DragState::default();
		self.pan.active = false;
	}

	/// Pointer left the canvas.
	pub fn pointer_leave(&mut self) {
		self.pointer_up();
		self.set_hover(None);
	}

	/// Zoom around a screen position; scale stays within `[0.1, 10]`.
	pub fn zoom(&mut self, x: f64, y: f64, zoom_in: bool) {
		let factor = if zoom_in { 1.1 } else { 0.9 };
		let new_k = (self.transform.k * factor).clamp(0.1, 10.0);
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// One animation frame: advance the layout and the highlight fade.
	pub fn tick(&mut self, dt: f64) {
		self.simulation.tick();
		self.flow_time += dt;

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	/// Canvas size changed; the layout centre stays put.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{EdgeRecord, normalize};

	fn state() -> ForceGraphState {
		let graph = normalize(&[
			EdgeRecord::new("A", "B", "knows"),
			EdgeRecord::new("B", "C", "knows"),
			EdgeRecord::new("C", "D", "sent"),
		]);
		ForceGraphState::new(&graph, &ViewerConfig::default(), 800.0, 600.0)
	}

	fn screen_pos(s: &ForceGraphState, idx: usize) -> (f64, f64) {
		let p = s.simulation.particles()[idx];
		(
			p.x * s.transform.k + s.transform.x,
			p.y * s.transform.k + s.transform.y,
		)
	}

	#[test]
	fn colours_follow_first_relationship() {
		let s = state();
		assert_eq!(s.nodes[0].color, COLORS[0]);
		assert_eq!(s.nodes[2].color, COLORS[0]);
		assert_eq!(s.nodes[3].color, COLORS[1]);
		assert_eq!(s.nodes[3].label, "D");
	}

	#[test]
	fn hover_collects_neighbors() {
		let mut s = state();
		s.set_hover(Some(1));
		assert_eq!(s.hover.neighbors, HashSet::from([0, 2]));
		assert!(s.is_highlighted(0));
		assert!(!s.is_highlighted(3));

		s.set_hover(None);
		assert_eq!(s.hover.prev_node, Some(1));
		assert!(s.has_active_highlight());
	}

	#[test]
	fn highlight_fades_out_after_hover_ends() {
		let mut s = state();
		s.set_hover(Some(0));
		for _ in 0..120 {
			s.tick(0.016);
		}
		assert!(s.hover.highlight_t > 0.5);
		s.set_hover(None);
		for _ in 0..600 {
			s.tick(0.016);
		}
		assert_eq!(s.hover.highlight_t, 0.0);
		assert!(!s.has_active_highlight());
	}

	#[test]
	fn dragging_pins_the_node() {
		let mut s = state();
		let start = s.simulation.particles()[3];
		let (x, y) = screen_pos(&s, 3);
		s.pointer_down(x, y);
		assert_eq!(s.drag.node_idx, Some(3));
		s.pointer_move(x + 40.0, y + 10.0);
		s.pointer_up();
		let p = s.simulation.particles()[3];
		let (fx, fy) = (p.fx.unwrap(), p.fy.unwrap());
		assert!((fx - (start.x + 40.0)).abs() < 1e-9);
		assert!((fy - (start.y + 10.0)).abs() < 1e-9);
		assert!(!s.drag.active);
	}

	#[test]
	fn long_drag_keeps_neighbours_following() {
		let mut s = state();
		let frames = ViewerConfig::default().simulation.max_ticks + 100;
		let (x, y) = screen_pos(&s, 0);
		s.pointer_down(x, y);
		for _ in 0..frames {
			s.pointer_move(x, y);
			s.tick(0.016);
		}
		assert!(s.simulation.is_running());

		let before = s.simulation.particles()[1];
		s.pointer_move(x + 300.0, y + 300.0);
		s.tick(0.016);
		let after = s.simulation.particles()[1];
		assert_ne!((before.x, before.y), (after.x, after.y));

		// released: the layout cools and stops again
		s.pointer_up();
		for _ in 0..frames {
			s.tick(0.016);
		}
		assert!(!s.simulation.is_running());
		assert!(s.simulation.alpha() < ViewerConfig::default().simulation.alpha_min);
	}

	#[test]
	fn background_drag_pans() {
		let mut s = state();
		s.pointer_down(5.0, 5.0);
		assert!(s.pan.active);
		s.pointer_move(25.0, 15.0);
		assert_eq!((s.transform.x, s.transform.y), (20.0, 10.0));
		s.pointer_leave();
		assert!(!s.pan.active);
	}

	#[test]
	fn zoom_is_clamped() {
		let mut s = state();
		for _ in 0..100 {
			s.zoom(400.0, 300.0, true);
		}
		assert_eq!(s.transform.k, 10.0);
		for _ in 0..200 {
			s.zoom(400.0, 300.0, false);
		}
		assert!((s.transform.k - 0.1).abs() < 1e-9);
	}
}
