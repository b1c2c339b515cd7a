//! Visual theming for the architecture diagram.
//!
//! Provides colors and per-type node styles. Every visual constant the render
//! adapter uses lives here, so layout code never sees a color.

use super::types::NodeKind;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

#[allow(missing_docs)]
impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// `#rrggbb` when opaque, `rgba(...)` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Fill and glyph for one node type.
#[derive(Clone, Debug)]
pub struct KindStyle {
	/// Disc fill.
	pub fill: Color,
	/// Glyph drawn at the disc center.
	pub icon: &'static str,
}

/// Node disc and icon sizing.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	/// Disc radius, also the hit radius.
	pub radius: f64,
	/// Radius while hovered.
	pub emphasized_radius: f64,
	/// Disc outline.
	pub stroke: Color,
	/// Outline width in pixels.
	pub stroke_width: f64,
	/// Icon font size in pixels.
	pub icon_size: f64,
	/// Icon font size while hovered.
	pub emphasized_icon_size: f64,
}

/// Text label drawn below each node.
#[derive(Clone, Debug)]
pub struct LabelStyle {
	/// Distance from the node center to the label baseline.
	pub offset: f64,
	/// Font size in pixels.
	pub font_size: f64,
	/// Font size while the node is hovered.
	pub emphasized_font_size: f64,
	/// Text fill.
	pub color: Color,
	/// Bold weight.
	pub bold: bool,
	/// CSS font family list.
	pub font_family: &'static str,
}

impl LabelStyle {
	/// CSS font shorthand at `size` pixels.
	pub fn font(&self, size: f64) -> String {
		let weight = if self.bold { "bold " } else { "" };
		format!("{weight}{size}px {}", self.font_family)
	}
}

/// Link line style.
#[derive(Clone, Debug)]
pub struct LinkStyle {
	/// Stroke and arrowhead fill.
	pub color: Color,
	/// Line width in pixels.
	pub width: f64,
	/// Arrowhead length at the target end; 0 disables arrowheads.
	pub arrow_size: f64,
}

/// Shown in place of the diagram when there is nothing to draw.
#[derive(Clone, Debug)]
pub struct PlaceholderStyle {
	/// Message drawn at the viewport center.
	pub text: &'static str,
	/// Text fill.
	pub color: Color,
	/// Font size in pixels.
	pub font_size: f64,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Short name, used in logs.
	pub name: &'static str,
	/// Canvas fill behind everything else.
	pub background: Color,
	/// Disc and icon sizing.
	pub node: NodeStyle,
	/// Name labels.
	pub label: LabelStyle,
	/// Link lines and arrowheads.
	pub link: LinkStyle,
	/// Empty or rejected diagram message.
	pub placeholder: PlaceholderStyle,
	#[allow(missing_docs)]
	pub frontend: KindStyle,
	#[allow(missing_docs)]
	pub auth: KindStyle,
	#[allow(missing_docs)]
	pub backend: KindStyle,
	#[allow(missing_docs)]
	pub database: KindStyle,
	/// Used for any type outside the known set.
	pub fallback: KindStyle,
}

impl Theme {
	/// The dashboard's light theme (default)
	pub fn light() -> Self {
		Self {
			name: "light",
			background: Color::rgb(255, 255, 255),
			node: NodeStyle {
				radius: 40.0,
				emphasized_radius: 45.0,
				stroke: Color::rgb(255, 255, 255),
				stroke_width: 2.0,
				icon_size: 24.0,
				emphasized_icon_size: 28.0,
			},
			label: LabelStyle {
				offset: 60.0,
				font_size: 14.0,
				emphasized_font_size: 16.0,
				color: Color::rgb(31, 41, 55),
				bold: true,
				font_family: "sans-serif",
			},
			link: LinkStyle {
				color: Color::rgba(153, 153, 153, 0.6),
				width: 2.0,
				arrow_size: 10.0,
			},
			placeholder: PlaceholderStyle {
				text: "No architecture data available",
				color: Color::rgb(107, 114, 128),
				font_size: 16.0,
			},
			frontend: KindStyle {
				fill: Color::rgb(59, 130, 246),
				icon: "⚛️",
			},
			auth: KindStyle {
				fill: Color::rgb(16, 185, 129),
				icon: "🔐",
			},
			backend: KindStyle {
				fill: Color::rgb(245, 158, 11),
				icon: "⚙️",
			},
			database: KindStyle {
				fill: Color::rgb(239, 68, 68),
				icon: "💾",
			},
			fallback: KindStyle {
				fill: Color::rgb(107, 114, 128),
				icon: "●",
			},
		}
	}

	/// Dark dashboard background; node colors are unchanged.
	pub fn dark() -> Self {
		let light = Self::light();
		Self {
			name: "dark",
			background: Color::rgb(17, 24, 39),
			label: LabelStyle {
				color: Color::rgb(229, 231, 235),
				..light.label
			},
			placeholder: PlaceholderStyle {
				color: Color::rgb(156, 163, 175),
				..light.placeholder
			},
			..light
		}
	}

	/// Style for `kind`, falling back for unknown types.
	pub fn kind_style(&self, kind: &NodeKind) -> &KindStyle {
		match kind {
			NodeKind::Frontend => &self.frontend,
			NodeKind::Auth => &self.auth,
			NodeKind::Backend => &self.backend,
			NodeKind::Database => &self.database,
			NodeKind::Unknown(_) => &self.fallback,
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::light()
	}
}
