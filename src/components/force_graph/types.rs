//! Graph payload structures accepted by the diagram engine.
//!
//! These mirror the JSON shape served by the architecture endpoint:
//! `{ nodes: [{ id, name, type }], links: [{ source, target }] }`.
//! They carry no invariants; the engine validates them on mount and update.

use std::fmt;

use serde::Deserialize;

/// The closed set of node types the dashboard knows how to style.
///
/// Anything else deserializes into [`NodeKind::Unknown`] and is drawn with the
/// fallback style instead of failing the whole payload.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum NodeKind {
	/// Browser client.
	Frontend,
	/// Identity provider.
	Auth,
	/// Server-side service.
	Backend,
	/// Data store.
	Database,
	/// Any other type string, kept verbatim. Empty when the payload omits it.
	Unknown(String),
}

impl Default for NodeKind {
	fn default() -> Self {
		NodeKind::Unknown(String::new())
	}
}

impl NodeKind {
	/// The payload spelling of this type.
	pub fn as_str(&self) -> &str {
		match self {
			NodeKind::Frontend => "frontend",
			NodeKind::Auth => "auth",
			NodeKind::Backend => "backend",
			NodeKind::Database => "database",
			NodeKind::Unknown(raw) => raw,
		}
	}
}

impl From<String> for NodeKind {
	fn from(raw: String) -> Self {
		match raw.as_str() {
			"frontend" => NodeKind::Frontend,
			"auth" => NodeKind::Auth,
			"backend" => NodeKind::Backend,
			"database" => NodeKind::Database,
			_ => NodeKind::Unknown(raw),
		}
	}
}

impl From<&str> for NodeKind {
	fn from(raw: &str) -> Self {
		NodeKind::from(raw.to_string())
	}
}

impl fmt::Display for NodeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A node in the payload.
#[derive(Clone, Debug, Deserialize)]
pub struct GraphNode {
	/// Unique identifier for this node. Used to reference nodes in links.
	pub id: String,
	/// Display label drawn below the node.
	pub name: String,
	/// Node type, selects fill color and icon. Missing means unknown.
	#[serde(rename = "type", default)]
	pub kind: NodeKind,
}

/// A directed edge between two nodes.
#[derive(Clone, Debug, Deserialize)]
pub struct GraphLink {
	/// Source node ID.
	pub source: String,
	/// Target node ID.
	pub target: String,
}

/// Complete graph payload: nodes and links.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphData {
	/// Nodes in payload order.
	pub nodes: Vec<GraphNode>,
	/// Links referencing node ids.
	pub links: Vec<GraphLink>,
}

impl GraphData {
	/// The default architecture shown when the page carries no payload.
	pub fn sample() -> Self {
		let node = |id: &str, name: &str, kind: NodeKind| GraphNode {
			id: id.into(),
			name: name.into(),
			kind,
		};
		let link = |source: &str, target: &str| GraphLink {
			source: source.into(),
			target: target.into(),
		};

		GraphData {
			nodes: vec![
				node("client", "Next.js Client", NodeKind::Frontend),
				node("auth", "OAuth Provider", NodeKind::Auth),
				node("api", "Backend API", NodeKind::Backend),
				node("db", "Database", NodeKind::Database),
			],
			links: vec![
				link("client", "auth"),
				link("client", "api"),
				link("api", "db"),
			],
		}
	}

	/// True when there are no nodes to draw.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

/// Size of the rendering surface. Graph coordinates map 1:1 onto it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	#[allow(missing_docs)]
	pub width: f64,
	#[allow(missing_docs)]
	pub height: f64,
}

impl Viewport {
	#[allow(missing_docs)]
	pub fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	/// Midpoint, the target of the centering force.
	pub fn center(&self) -> (f64, f64) {
		(self.width / 2.0, self.height / 2.0)
	}

	/// Sizes a viewport from what the host surface reports, substituting the
	/// configured defaults for zero dimensions and enforcing the minimum height.
	/// Returns `None` when either dimension is negative or not finite.
	pub fn from_surface(width: f64, height: f64, config: &ViewportConfig) -> Option<Self> {
		let pick = |reported: f64, fallback: f64| {
			if reported == 0.0 { fallback } else { reported }
		};
		let width = pick(width, config.default_width);
		let height = pick(height, config.default_height);

		let usable = |v: f64| v.is_finite() && v > 0.0;
		(usable(width) && usable(height)).then(|| Self {
			width,
			height: height.max(config.min_height),
		})
	}
}

/// Fallback sizing applied when the host surface reports no size.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
	/// Width used when the surface reports 0.
	pub default_width: f64,
	/// Height used when the surface reports 0.
	pub default_height: f64,
	/// The diagram never renders shorter than this.
	pub min_height: f64,
}

impl Default for ViewportConfig {
	fn default() -> Self {
		Self {
			default_width: 800.0,
			default_height: 600.0,
			min_height: 600.0,
		}
	}
}
