use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
	#[error("graph engine has been disposed")]
	Disposed,
	#[error("unknown vertex {0}")]
	UnknownVertex(usize),
	#[error("unknown edge {0}")]
	UnknownEdge(usize),
	#[error("unknown highlight overlay {0}")]
	UnknownOverlay(usize),
}

/// Failure reported by a context menu provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MenuError {
	#[error("menu provider failed: {0}")]
	Provider(String),
	#[error("menu request was cancelled")]
	Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown layout direction `{0}`")]
pub struct ParseDirectionError(pub String);
