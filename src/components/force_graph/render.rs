use std::f64::consts::{FRAC_1_SQRT_2, PI};

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{ForceGraphState, NODE_RADIUS};

const BACKGROUND: &str = "#1a1a2e";
const LOOP_RADIUS: f64 = NODE_RADIUS * 1.2;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// A single drawing command in graph space.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
	/// Dashed edge line.
	Line {
		/// Start, just outside the source node.
		from: (f64, f64),
		/// End, just before the arrow head.
		to: (f64, f64),
		/// Stroke opacity.
		alpha: f64,
		/// Stroke width.
		width: f64,
	},
	/// Dashed circle beside a node for an edge from the node to itself.
	Loop {
		/// Circle centre.
		center: (f64, f64),
		/// Circle radius.
		radius: f64,
		/// Stroke opacity.
		alpha: f64,
		/// Stroke width.
		width: f64,
	},
	/// Filled arrow head at the target end of an edge.
	Arrow {
		/// Tip, then the two back corners.
		points: [(f64, f64); 3],
		/// Fill opacity.
		alpha: f64,
	},
	/// Node disc.
	Circle {
		/// Node position.
		center: (f64, f64),
		/// Disc radius.
		radius: f64,
		/// Fill colour.
		color: String,
		/// Fill opacity.
		alpha: f64,
	},
	/// Radial glow behind a highlighted node.
	Glow {
		/// Node position.
		center: (f64, f64),
		/// Gradient start radius.
		inner: f64,
		/// Gradient end radius.
		outer: f64,
		/// Opacity at the centre.
		alpha: f64,
	},
	/// Outline around the hovered node.
	Ring {
		/// Node position.
		center: (f64, f64),
		/// Ring radius.
		radius: f64,
		/// Stroke opacity.
		alpha: f64,
		/// Stroke width.
		width: f64,
	},
	/// Node or relationship label.
	Text {
		/// Baseline start.
		at: (f64, f64),
		/// Label text.
		text: String,
		/// Fill colour.
		color: String,
		/// Font size in pixels.
		size: f64,
	},
}

/// Everything drawn in one animation frame, in paint order.
#[derive(Clone, Debug, Default)]
pub struct Frame {
	/// Canvas width.
	pub width: f64,
	/// Canvas height.
	pub height: f64,
	/// Pan offset and zoom `(x, y, k)`.
	pub transform: (f64, f64, f64),
	/// Dash length, gap and offset for edge lines.
	pub dash: (f64, f64, f64),
	/// Drawing commands, back to front.
	pub primitives: Vec<Primitive>,
}

impl Frame {
	/// Number of drawing commands.
	pub fn primitive_count(&self) -> usize {
		self.primitives.len()
	}

	fn count(&self, pred: impl Fn(&Primitive) -> bool) -> usize {
		self.primitives.iter().filter(|p| pred(p)).count()
	}

	/// Straight edges drawn.
	pub fn line_count(&self) -> usize {
		self.count(|p| matches!(p, Primitive::Line { .. }))
	}

	/// Self-loop edges drawn.
	pub fn loop_count(&self) -> usize {
		self.count(|p| matches!(p, Primitive::Loop { .. }))
	}

	/// Node discs drawn.
	pub fn circle_count(&self) -> usize {
		self.count(|p| matches!(p, Primitive::Circle { .. }))
	}
}

/// Read the particle arena and produce this frame's primitives.
///
/// Each edge becomes a line and arrow head, or a loop when it starts and ends
/// at the same node. An edge between two distinct nodes that currently sit on
/// the same spot has no direction to draw and is left out of that frame.
pub fn build_frame(state: &ForceGraphState) -> Frame {
	let k = state.transform.k;
	let (dash, gap) = (8.0 / k, 4.0 / k);
	let mut frame = Frame {
		width: state.width,
		height: state.height,
		transform: (state.transform.x, state.transform.y, k),
		dash: (dash, gap, -(state.flow_time * 30.0) % (dash + gap)),
		primitives: Vec::new(),
	};
	push_edges(state, &mut frame.primitives);
	push_nodes(state, &mut frame.primitives);
	frame
}

fn push_edges(state: &ForceGraphState, out: &mut Vec<Primitive>) {
	let particles = state.simulation.particles();
	let k = state.transform.k;
	let (line_width, arrow_size, font) = (1.5 / k, 8.0 / k, 9.0 / k.max(0.5));
	let t = ease_out_cubic(state.hover.highlight_t);

	for edge in &state.edges {
		let (n1, n2) = (particles[edge.source], particles[edge.target]);
		let is_highlighted =
			state.is_highlighted(edge.source) && state.is_highlighted(edge.target);

		// t=0: all edges at base (0.6), t=1: highlighted at 0.9, others at 0.15
		let (edge_alpha, arrow_alpha, width) = if is_highlighted {
			(0.6 + 0.3 * t, 0.8 + 0.1 * t, line_width * (1.0 + 0.3 * t))
		} else {
			(0.6 - 0.45 * t, 0.8 - 0.45 * t, line_width * (1.0 - 0.3 * t))
		};
		let show_label = is_highlighted && t > 0.01 && !edge.relationship.is_empty();

		if edge.source == edge.target {
			let offset = LOOP_RADIUS * FRAC_1_SQRT_2 + NODE_RADIUS * 0.5;
			let center = (n1.x + offset, n1.y - offset);
			out.push(Primitive::Loop {
				center,
				radius: LOOP_RADIUS,
				alpha: edge_alpha,
				width,
			});
			if show_label {
				out.push(relationship_label(
					&edge.relationship,
					(center.0, center.1 - LOOP_RADIUS - 3.0 / k),
					t,
					font,
				));
			}
			continue;
		}

		let (dx, dy) = (n2.x - n1.x, n2.y - n1.y);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}

		let (ux, uy) = (dx / dist, dy / dist);
		out.push(Primitive::Line {
			from: (n1.x + ux * NODE_RADIUS, n1.y + uy * NODE_RADIUS),
			to: (
				n2.x - ux * (NODE_RADIUS + arrow_size),
				n2.y - uy * (NODE_RADIUS + arrow_size),
			),
			alpha: edge_alpha,
			width,
		});

		let (tip_x, tip_y) = (n2.x - ux * NODE_RADIUS, n2.y - uy * NODE_RADIUS);
		let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		out.push(Primitive::Arrow {
			points: [
				(tip_x, tip_y),
				(back_x + px, back_y + py),
				(back_x - px, back_y - py),
			],
			alpha: arrow_alpha,
		});

		if show_label {
			out.push(relationship_label(
				&edge.relationship,
				((n1.x + n2.x) / 2.0, (n1.y + n2.y) / 2.0 - 3.0 / k),
				t,
				font,
			));
		}
	}
}

fn relationship_label(text: &str, at: (f64, f64), t: f64, size: f64) -> Primitive {
	Primitive::Text {
		at,
		text: text.to_string(),
		color: format!("rgba(180, 210, 255, {})", t),
		size,
	}
}

fn push_nodes(state: &ForceGraphState, out: &mut Vec<Primitive>) {
	let particles = state.simulation.particles();
	let (has_highlight, t, k) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.highlight_t),
		state.transform.k,
	);
	let font = 10.0 / k.max(0.5);

	for (idx, (p, info)) in particles.iter().zip(&state.nodes).enumerate() {
		if has_highlight && state.is_highlighted(idx) {
			continue;
		}
		let (alpha, radius) = (1.0 - 0.7 * t, NODE_RADIUS * (1.0 - 0.15 * t));
		out.push(Primitive::Circle {
			center: (p.x, p.y),
			radius,
			color: info.color.clone(),
			alpha,
		});
		if state.show_all_labels {
			out.push(Primitive::Text {
				at: (p.x + radius + 3.0, p.y + 3.0),
				text: info.label.clone(),
				color: format!("rgba(255, 255, 255, {})", alpha * 0.8),
				size: font,
			});
		}
	}

	if !has_highlight {
		return;
	}

	for (idx, (p, info)) in particles.iter().zip(&state.nodes).enumerate() {
		if !state.is_highlighted(idx) {
			continue;
		}
		let is_hovered = state.is_hovered(idx);
		let is_neighbor =
			state.hover.neighbors.contains(&idx) || state.hover.prev_neighbors.contains(&idx);

		let (radius, glow_radius) = if is_hovered {
			(
				NODE_RADIUS * (1.0 + 0.35 * t),
				NODE_RADIUS * (1.8 + 1.2 * t),
			)
		} else if is_neighbor {
			(NODE_RADIUS * (1.0 + 0.2 * t), NODE_RADIUS * (1.4 + 0.6 * t))
		} else {
			(NODE_RADIUS, 0.0)
		};

		if glow_radius > 0.0 && t > 0.01 {
			out.push(Primitive::Glow {
				center: (p.x, p.y),
				inner: radius * 0.3,
				outer: glow_radius,
				alpha: if is_hovered { 0.35 * t } else { 0.2 * t },
			});
		}

		out.push(Primitive::Circle {
			center: (p.x, p.y),
			radius,
			color: info.color.clone(),
			alpha: 1.0,
		});

		if is_hovered && t > 0.01 {
			out.push(Primitive::Ring {
				center: (p.x, p.y),
				radius: radius + 2.0 / k,
				alpha: 0.7 * t,
				width: 1.5 / k,
			});
		}

		out.push(Primitive::Text {
			at: (p.x + radius + 3.0, p.y + 3.0),
			text: info.label.clone(),
			color: "white".into(),
			size: font,
		});
	}
}

/// Paint a frame onto the canvas.
pub fn paint(frame: &Frame, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, frame.width, frame.height);
	ctx.save();
	let (tx, ty, k) = frame.transform;
	let _ = ctx.translate(tx, ty);
	let _ = ctx.scale(k, k);

	let (dash, gap, offset) = frame.dash;
	let dashes = js_sys::Array::of2(&JsValue::from_f64(dash), &JsValue::from_f64(gap));
	let solid = js_sys::Array::new();

	for primitive in &frame.primitives {
		match primitive {
			Primitive::Line {
				from,
				to,
				alpha,
				width,
			} => {
				ctx.set_stroke_style_str(&format!("rgba(100, 180, 255, {})", alpha));
				ctx.set_line_width(*width);
				let _ = ctx.set_line_dash(&dashes);
				ctx.set_line_dash_offset(offset);
				ctx.begin_path();
				ctx.move_to(from.0, from.1);
				ctx.line_to(to.0, to.1);
				ctx.stroke();
				let _ = ctx.set_line_dash(&solid);
			}
			Primitive::Loop {
				center,
				radius,
				alpha,
				width,
			} => {
				ctx.set_stroke_style_str(&format!("rgba(100, 180, 255, {})", alpha));
				ctx.set_line_width(*width);
				let _ = ctx.set_line_dash(&dashes);
				ctx.set_line_dash_offset(offset);
				ctx.begin_path();
				let _ = ctx.arc(center.0, center.1, *radius, 0.0, 2.0 * PI);
				ctx.stroke();
				let _ = ctx.set_line_dash(&solid);
			}
			Primitive::Arrow { points, alpha } => {
				ctx.set_fill_style_str(&format!("rgba(100, 180, 255, {})", alpha));
				ctx.begin_path();
				ctx.move_to(points[0].0, points[0].1);
				ctx.line_to(points[1].0, points[1].1);
				ctx.line_to(points[2].0, points[2].1);
				ctx.close_path();
				ctx.fill();
			}
			Primitive::Circle {
				center,
				radius,
				color,
				alpha,
			} => {
				ctx.set_global_alpha(*alpha);
				ctx.begin_path();
				let _ = ctx.arc(center.0, center.1, *radius, 0.0, 2.0 * PI);
				ctx.set_fill_style_str(color);
				ctx.fill();
				ctx.set_global_alpha(1.0);
			}
			Primitive::Glow {
				center,
				inner,
				outer,
				alpha,
			} => paint_glow(ctx, *center, *inner, *outer, *alpha),
			Primitive::Ring {
				center,
				radius,
				alpha,
				width,
			} => {
				ctx.begin_path();
				let _ = ctx.arc(center.0, center.1, *radius, 0.0, 2.0 * PI);
				ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {})", alpha));
				ctx.set_line_width(*width);
				ctx.stroke();
			}
			Primitive::Text {
				at,
				text,
				color,
				size,
			} => {
				ctx.set_fill_style_str(color);
				ctx.set_font(&format!("{}px sans-serif", size));
				let _ = ctx.fill_text(text, at.0, at.1);
			}
		}
	}
	ctx.restore();
}

fn paint_glow(
	ctx: &CanvasRenderingContext2d,
	(x, y): (f64, f64),
	inner: f64,
	outer: f64,
	alpha: f64,
) {
	let Ok(gradient) = ctx.create_radial_gradient(x, y, inner, x, y, outer) else {
		return;
	};
	let stops = [
		(0.0, format!("rgba(255, 255, 255, {})", alpha)),
		(0.6, format!("rgba(200, 220, 255, {})", alpha * 0.3)),
		(1.0, "rgba(255, 255, 255, 0)".to_string()),
	];
	for (offset, color) in &stops {
		if gradient.add_color_stop(*offset as f32, color).is_err() {
			return;
		}
	}
	ctx.begin_path();
	let _ = ctx.arc(x, y, outer, 0.0, 2.0 * PI);
	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill();
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::ViewerConfig;
	use crate::graph::{EdgeRecord, normalize};

	fn state(records: &[EdgeRecord], config: &ViewerConfig) -> ForceGraphState {
		ForceGraphState::new(&normalize(records), config, 800.0, 600.0)
	}

	#[test]
	fn empty_graph_draws_nothing() {
		let mut s = state(&[], &ViewerConfig::default());
		s.tick(0.016);
		let frame = build_frame(&s);
		assert_eq!(frame.primitive_count(), 0);
		assert_eq!((frame.width, frame.height), (800.0, 600.0));
	}

	#[test]
	fn one_line_per_edge_one_circle_per_node() {
		let config = ViewerConfig {
			label_threshold: 0,
			..ViewerConfig::default()
		};
		let mut s = state(
			&[
				EdgeRecord::new("A", "B", "knows"),
				EdgeRecord::new("B", "C", "knows"),
			],
			&config,
		);
		for _ in 0..10 {
			s.tick(0.016);
		}
		let frame = build_frame(&s);
		assert_eq!(frame.line_count(), 2);
		assert_eq!(frame.circle_count(), 3);
		// line + arrow per edge, circle per node, no labels
		assert_eq!(frame.primitive_count(), 7);
	}

	#[test]
	fn self_loops_are_drawn_as_loops() {
		let config = ViewerConfig {
			label_threshold: 0,
			..ViewerConfig::default()
		};
		let mut s = state(
			&[
				EdgeRecord::new("z", "z", "self"),
				EdgeRecord::new("z", "y", "r"),
			],
			&config,
		);
		s.tick(0.016);
		let frame = build_frame(&s);
		assert_eq!(frame.loop_count(), 1);
		assert_eq!(frame.line_count(), 1);

		let p = s.simulation.particles()[0];
		let center = frame
			.primitives
			.iter()
			.find_map(|prim| match prim {
				Primitive::Loop { center, .. } => Some(*center),
				_ => None,
			})
			.unwrap();
		assert!(center.0 > p.x && center.1 < p.y);
	}

	#[test]
	fn hovered_self_loop_shows_its_relationship() {
		let mut s = state(&[EdgeRecord::new("z", "z", "self")], &ViewerConfig::default());
		s.set_hover(Some(0));
		for _ in 0..60 {
			s.tick(0.016);
		}
		let has_label = build_frame(&s).primitives.iter().any(
			|p| matches!(p, Primitive::Text { text, .. } if text == "self"),
		);
		assert!(has_label);
	}

	#[test]
	fn small_graphs_get_labels() {
		let s = state(&[EdgeRecord::new("A", "B", "knows")], &ViewerConfig::default());
		let labels: Vec<_> = build_frame(&s)
			.primitives
			.into_iter()
			.filter_map(|p| match p {
				Primitive::Text { text, .. } => Some(text),
				_ => None,
			})
			.collect();
		assert_eq!(labels, ["A", "B"]);
	}

	#[test]
	fn hovered_edges_show_their_relationship() {
		let mut s = state(
			&[
				EdgeRecord::new("A", "B", "knows"),
				EdgeRecord::new("C", "D", "sent"),
			],
			&ViewerConfig::default(),
		);
		s.set_hover(Some(0));
		for _ in 0..60 {
			s.tick(0.016);
		}
		let texts: Vec<_> = build_frame(&s)
			.primitives
			.into_iter()
			.filter_map(|p| match p {
				Primitive::Text { text, .. } => Some(text),
				_ => None,
			})
			.collect();
		assert!(texts.contains(&"knows".to_string()));
		assert!(!texts.contains(&"sent".to_string()));
	}

	#[test]
	fn frame_follows_the_arena() {
		let mut s = state(&[EdgeRecord::new("A", "B", "knows")], &ViewerConfig::default());
		s.simulation.run_to_end();
		let p = s.simulation.particles()[0];
		let frame = build_frame(&s);
		let circle = frame
			.primitives
			.iter()
			.find_map(|prim| match prim {
				Primitive::Circle { center, .. } => Some(*center),
				_ => None,
			})
			.unwrap();
		assert_eq!(circle, (p.x, p.y));
	}
}
