//! Projection of diagram state to drawable primitives, and the canvas painter.
//!
//! [`project`] is a pure read of the diagram state; it performs no layout and
//! never mutates the solver. [`draw`] paints a [`Frame`] in z-order:
//! 1. Background (or the placeholder, when there is nothing else)
//! 2. Link segments and their arrowheads
//! 3. Node discs with icons, the emphasized disc last
//! 4. Labels

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::DiagramState;
use super::theme::{Color, Theme};
use super::types::Viewport;

/// Triangle drawn at the target rim of a segment.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct Arrowhead {
	pub tip: (f64, f64),
	pub left: (f64, f64),
	pub right: (f64, f64),
}

/// One link, spanning its endpoints' centers.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	#[allow(missing_docs)]
	pub x1: f64,
	#[allow(missing_docs)]
	pub y1: f64,
	#[allow(missing_docs)]
	pub x2: f64,
	#[allow(missing_docs)]
	pub y2: f64,
	/// Stroke color.
	pub color: Color,
	/// Line width in pixels.
	pub width: f64,
	/// `None` when arrowheads are disabled or the endpoints overlap.
	pub arrow: Option<Arrowhead>,
}

/// One node disc with its icon.
#[derive(Clone, Debug, PartialEq)]
pub struct Disc {
	/// Node id.
	pub id: String,
	#[allow(missing_docs)]
	pub x: f64,
	#[allow(missing_docs)]
	pub y: f64,
	#[allow(missing_docs)]
	pub radius: f64,
	#[allow(missing_docs)]
	pub fill: Color,
	#[allow(missing_docs)]
	pub stroke: Color,
	#[allow(missing_docs)]
	pub stroke_width: f64,
	/// Type glyph.
	pub icon: &'static str,
	/// Icon font size in pixels.
	pub icon_size: f64,
	/// `"{name} ({type})"`.
	pub tooltip: String,
	/// Drawn enlarged, on top.
	pub emphasized: bool,
}

/// Node name drawn below its disc.
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
	/// Node id.
	pub id: String,
	/// Node display name.
	pub text: String,
	#[allow(missing_docs)]
	pub x: f64,
	#[allow(missing_docs)]
	pub y: f64,
	/// CSS font shorthand.
	pub font: String,
	/// Text fill.
	pub color: Color,
}

/// Centered "no data" message.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct Placeholder {
	pub text: &'static str,
	pub x: f64,
	pub y: f64,
	pub font: String,
	pub color: Color,
}

/// Everything needed to paint one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
	/// Size the surface is painted at.
	pub viewport: Viewport,
	/// Fill behind everything else.
	pub background: Color,
	/// Links, drawn first.
	pub segments: Vec<Segment>,
	/// Node discs, emphasized last.
	pub discs: Vec<Disc>,
	/// Node names, drawn last.
	pub labels: Vec<Label>,
	/// Set only when there is nothing else to draw.
	pub placeholder: Option<Placeholder>,
	/// Tooltip of the emphasized node, if any.
	pub tooltip: Option<String>,
}

impl Frame {
	/// The neutral "no data" frame.
	pub fn placeholder(viewport: Viewport, theme: &Theme) -> Self {
		let (x, y) = viewport.center();
		let style = &theme.placeholder;
		Self {
			viewport,
			background: theme.background,
			segments: Vec::new(),
			discs: Vec::new(),
			labels: Vec::new(),
			placeholder: Some(Placeholder {
				text: style.text,
				x,
				y,
				font: format!("{}px {}", style.font_size, theme.label.font_family),
				color: style.color,
			}),
			tooltip: None,
		}
	}

	/// False if any primitive sits at a non-finite coordinate.
	pub fn is_finite(&self) -> bool {
		let finite = |x: f64, y: f64| x.is_finite() && y.is_finite();
		self.segments
			.iter()
			.all(|s| finite(s.x1, s.y1) && finite(s.x2, s.y2))
			&& self.discs.iter().all(|d| finite(d.x, d.y))
			&& self.labels.iter().all(|l| finite(l.x, l.y))
	}
}

/// Maps the current solver positions and emphasis to drawable primitives.
pub fn project(state: &DiagramState, theme: &Theme) -> Frame {
	let viewport = state.viewport();
	let graph = state.graph();
	if graph.is_empty() {
		return Frame::placeholder(viewport, theme);
	}

	let positions = state.simulation().nodes();
	let emphasized = state.emphasized();
	let radius_of = |idx: usize| {
		if emphasized == Some(idx) {
			theme.node.emphasized_radius
		} else {
			theme.node.radius
		}
	};

	let segments = graph
		.links()
		.iter()
		.map(|link| {
			let (s, t) = (positions[link.source], positions[link.target]);
			Segment {
				source: graph.nodes()[link.source].id.clone(),
				target: graph.nodes()[link.target].id.clone(),
				x1: s.x,
				y1: s.y,
				x2: t.x,
				y2: t.y,
				color: theme.link.color,
				width: theme.link.width,
				arrow: arrowhead(
					s.position(),
					t.position(),
					radius_of(link.target),
					theme.link.arrow_size,
				),
			}
		})
		.collect();

	let order = (0..graph.len())
		.filter(|&idx| Some(idx) != emphasized)
		.chain(emphasized);

	let mut discs = Vec::with_capacity(graph.len());
	let mut labels = Vec::with_capacity(graph.len());
	for idx in order {
		let node = &graph.nodes()[idx];
		let pos = positions[idx];
		let kind = theme.kind_style(&node.kind);
		let is_emphasized = emphasized == Some(idx);

		discs.push(Disc {
			id: node.id.clone(),
			x: pos.x,
			y: pos.y,
			radius: radius_of(idx),
			fill: kind.fill,
			stroke: theme.node.stroke,
			stroke_width: theme.node.stroke_width,
			icon: kind.icon,
			icon_size: if is_emphasized {
				theme.node.emphasized_icon_size
			} else {
				theme.node.icon_size
			},
			tooltip: format!("{} ({})", node.name, node.kind),
			emphasized: is_emphasized,
		});

		let (font_size, color) = if is_emphasized {
			(theme.label.emphasized_font_size, kind.fill)
		} else {
			(theme.label.font_size, theme.label.color)
		};
		labels.push(Label {
			id: node.id.clone(),
			text: node.name.clone(),
			x: pos.x,
			y: pos.y + theme.label.offset,
			font: theme.label.font(font_size),
			color,
		});
	}

	Frame {
		viewport,
		background: theme.background,
		segments,
		discs,
		labels,
		placeholder: None,
		tooltip: state.tooltip(),
	}
}

/// Arrowhead whose tip touches the target disc's rim. None when the discs
/// overlap or arrows are disabled.
fn arrowhead(from: (f64, f64), to: (f64, f64), rim: f64, size: f64) -> Option<Arrowhead> {
	let (dx, dy) = (to.0 - from.0, to.1 - from.1);
	let dist = (dx * dx + dy * dy).sqrt();
	if size <= 0.0 || dist <= rim + size {
		return None;
	}
	let (ux, uy) = (dx / dist, dy / dist);
	let tip = (to.0 - ux * rim, to.1 - uy * rim);
	let base = (tip.0 - ux * size, tip.1 - uy * size);
	let half = size / 2.0;
	Some(Arrowhead {
		tip,
		left: (base.0 - uy * half, base.1 + ux * half),
		right: (base.0 + uy * half, base.1 - ux * half),
	})
}

/// Paints a frame onto a 2D canvas context.
pub fn draw(frame: &Frame, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(&frame.background.to_css());
	ctx.fill_rect(0.0, 0.0, frame.viewport.width, frame.viewport.height);

	if let Some(placeholder) = &frame.placeholder {
		draw_placeholder(placeholder, ctx);
		return;
	}

	draw_segments(&frame.segments, ctx);
	draw_discs(&frame.discs, ctx);
	draw_labels(&frame.labels, ctx);
}

fn draw_placeholder(placeholder: &Placeholder, ctx: &CanvasRenderingContext2d) {
	ctx.set_font(&placeholder.font);
	ctx.set_fill_style_str(&placeholder.color.to_css());
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text(placeholder.text, placeholder.x, placeholder.y);
}

fn draw_segments(segments: &[Segment], ctx: &CanvasRenderingContext2d) {
	for segment in segments {
		let css = segment.color.to_css();
		ctx.set_stroke_style_str(&css);
		ctx.set_line_width(segment.width);
		ctx.begin_path();
		ctx.move_to(segment.x1, segment.y1);
		ctx.line_to(segment.x2, segment.y2);
		ctx.stroke();

		if let Some(arrow) = &segment.arrow {
			ctx.set_fill_style_str(&css);
			ctx.begin_path();
			ctx.move_to(arrow.tip.0, arrow.tip.1);
			ctx.line_to(arrow.left.0, arrow.left.1);
			ctx.line_to(arrow.right.0, arrow.right.1);
			ctx.close_path();
			ctx.fill();
		}
	}
}

fn draw_discs(discs: &[Disc], ctx: &CanvasRenderingContext2d) {
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	for disc in discs {
		ctx.begin_path();
		let _ = ctx.arc(disc.x, disc.y, disc.radius, 0.0, PI * 2.0);
		ctx.set_fill_style_str(&disc.fill.to_css());
		ctx.fill();
		ctx.set_stroke_style_str(&disc.stroke.to_css());
		ctx.set_line_width(disc.stroke_width);
		ctx.stroke();

		ctx.set_font(&format!("{}px sans-serif", disc.icon_size));
		let _ = ctx.fill_text(disc.icon, disc.x, disc.y);
	}
}

fn draw_labels(labels: &[Label], ctx: &CanvasRenderingContext2d) {
	ctx.set_text_align("center");
	ctx.set_text_baseline("alphabetic");
	for label in labels {
		ctx.set_font(&label.font);
		ctx.set_fill_style_str(&label.color.to_css());
		let _ = ctx.fill_text(&label.text, label.x, label.y);
	}
}
