//! Pipeline-level error types shared across the refresh flow, the link chain, and transports.

// self
use crate::_prelude::*;

/// Pipeline-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error returned to callers of the link chain.
#[derive(Debug, ThisError)]
pub enum Error {
	/// The access token could not be renewed; the session must be re-established.
	#[error(transparent)]
	Refresh(#[from] RefreshError),
	/// The operation could not be delivered or its response could not be read.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
}
impl Error {
	/// Returns `true` when the caller should treat the session as invalid and re-authenticate.
	pub fn requires_reauthentication(&self) -> bool {
		matches!(self, Self::Refresh(_))
	}
}

/// Configuration and validation failures raised while assembling a client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// An endpoint is missing from the builder.
	#[error("Missing {endpoint} endpoint.")]
	MissingEndpoint {
		/// Which endpoint was not supplied.
		endpoint: &'static str,
	},
	/// An endpoint string cannot be parsed.
	#[error("The {endpoint} endpoint is not a valid URL.")]
	InvalidEndpoint {
		/// Which endpoint failed to parse.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// An endpoint uses a scheme other than `http` or `https`.
	#[error("The {endpoint} endpoint must use http or https: {url}.")]
	UnsupportedScheme {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// The refresh response field name is blank.
	#[error("The access token field name must not be empty.")]
	EmptyAccessTokenField,
	/// The request timeout is zero or negative.
	#[error("The request timeout must be positive, got {timeout}.")]
	NonPositiveTimeout {
		/// Rejected timeout.
		timeout: Duration,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures of the token renewal exchange.
///
/// The value is `Clone` because a single settled exchange hands the same error to every
/// operation that joined it.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RefreshError {
	/// The refresh endpoint was unreachable or answered with a non-success status.
	#[error("Refresh endpoint request failed: {message}.")]
	Network {
		/// HTTP status code, when the server answered.
		status: Option<u16>,
		/// Transport- or server-supplied description.
		message: String,
	},
	/// The refresh endpoint answered successfully but without a usable token field.
	#[error("Refresh endpoint returned an unexpected body: {message}.")]
	Shape {
		/// Description of what was missing or malformed.
		message: String,
	},
}
impl RefreshError {
	/// Builds a [`RefreshError::Network`] for an unreachable endpoint.
	pub fn unreachable(message: impl Into<String>) -> Self {
		Self::Network { status: None, message: message.into() }
	}

	/// Builds a [`RefreshError::Network`] for a non-success HTTP status.
	pub fn rejected(status: u16) -> Self {
		let message = format!("server answered with HTTP {status}");

		Self::Network { status: Some(status), message }
	}

	/// HTTP status associated with the failure, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Network { status, .. } => *status,
			Self::Shape { .. } => None,
		}
	}
}

/// Failures raised by a [`Transport`](crate::transport::Transport) while sending an operation.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while sending the operation.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Server answered with a non-success status.
	#[error("GraphQL endpoint answered with HTTP {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Truncated response body for diagnostics.
		body: String,
	},
	/// Response body could not be parsed as a GraphQL response.
	#[error("GraphQL endpoint returned a malformed response body.")]
	Decode {
		/// Structured parsing failure with the offending JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// HTTP status associated with the failure, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } => Some(*status),
			_ => None,
		}
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn refresh_errors_surface_through_pipeline_error() {
		let err: Error = RefreshError::rejected(401).into();

		assert!(err.requires_reauthentication());
		assert!(err.to_string().contains("HTTP 401"));
		assert!(matches!(err, Error::Refresh(ref inner) if inner.status() == Some(401)));
	}

	#[test]
	fn transport_errors_do_not_require_reauthentication() {
		let err: Error = TransportError::Status { status: 502, body: "bad gateway".into() }.into();

		assert!(!err.requires_reauthentication());
		assert!(matches!(err, Error::Transport(ref inner) if inner.status() == Some(502)));
	}

	#[test]
	fn shape_errors_carry_no_status() {
		let err = RefreshError::Shape { message: "missing accessToken".into() };

		assert_eq!(err.status(), None);
		assert_eq!(err.clone(), err);
	}
}
