//! Errors raised while loading a graph.

use thiserror::Error;

/// Everything that can stop the fetch/normalize pipeline.
///
/// Variants carry rendered messages rather than the underlying error values so
/// the error can be cloned into reactive state and compared in tests.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GraphError {
	/// The configured endpoint could not be turned into an absolute URL.
	#[error("invalid graph endpoint `{endpoint}`: {message}")]
	InvalidEndpoint {
		/// The configured endpoint.
		endpoint: String,
		/// Why it could not be resolved.
		message: String,
	},

	/// The request never produced a response.
	#[error("request to {url} failed: {message}")]
	Network {
		/// Requested URL.
		url: String,
		/// Transport error text.
		message: String,
	},

	/// The server answered with a non-success status.
	#[error("{url} responded with HTTP {status}")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Requested URL.
		url: String,
	},

	/// The body was not a `{ "graph": [...] }` document.
	#[error("malformed graph payload at line {line}, column {column}: {message}")]
	MalformedPayload {
		/// 1-based line of the parse error.
		line: usize,
		/// 1-based column of the parse error.
		column: usize,
		/// Parser message.
		message: String,
	},

	/// More edges than the viewer is configured to lay out.
	#[error("graph has {edges} edges, more than the limit of {limit}")]
	TooLarge {
		/// Edges in the payload.
		edges: usize,
		/// Configured `max_edges`.
		limit: usize,
	},
}

impl From<serde_json::Error> for GraphError {
	fn from(err: serde_json::Error) -> Self {
		GraphError::MalformedPayload {
			line: err.line(),
			column: err.column(),
			message: err.to_string(),
		}
	}
}
