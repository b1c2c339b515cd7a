//! Error types surfaced by graph ingestion and the engine lifecycle.

/// A payload that cannot be turned into a validated graph.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GraphValidationError {
	/// A node's id is the empty string.
	#[error("node at index {index} has an empty id")]
	EmptyId {
		/// Position in the node list.
		index: usize,
	},
	/// Two nodes share an id.
	#[error("duplicate node id: {id}")]
	DuplicateId {
		/// The repeated id.
		id: String,
	},
	/// A link names a node id that is not in the payload.
	#[error("link {index} references unknown {endpoint} node: {id}")]
	DanglingLink {
		/// Position in the link list.
		index: usize,
		/// Which end failed.
		endpoint: LinkEndpoint,
		/// The unresolved id.
		id: String,
	},
}

/// Which end of a link failed to resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum LinkEndpoint {
	Source,
	Target,
}

impl std::fmt::Display for LinkEndpoint {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			LinkEndpoint::Source => "source",
			LinkEndpoint::Target => "target",
		})
	}
}

/// Failures reported by [`super::DiagramEngine`] operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
	/// The payload was rejected.
	#[error(transparent)]
	Validation(#[from] GraphValidationError),
	/// The surface is gone or has no usable area.
	#[error("rendering surface unavailable: {reason}")]
	SurfaceUnavailable {
		/// What the surface reported.
		reason: String,
	},
}

pub type Result<T> = std::result::Result<T, EngineError>;
