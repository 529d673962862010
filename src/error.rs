//! Provider-level error types shared by the adapter, transports, and OAuth legs.

// self
use crate::_prelude::*;

/// Provider-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical provider error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, deadline).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Upstream answered, but not with something usable.
	#[error(transparent)]
	Upstream(#[from] UpstreamError),

	/// Session carries no access token; raised before any network call.
	#[error("Session is missing an access token.")]
	MissingCredential,
	/// Profile response lacks a non-empty `data.email` string.
	#[error("Profile response does not contain an email address.")]
	MissingEmailField,
	/// Redeem was attempted without an authorization code.
	#[error("Authorization code is missing.")]
	MissingCode,
	/// The `state` returned by the authorization redirect does not match the one issued.
	#[error("Authorization state mismatch.")]
	StateMismatch,
	/// Provider rejected the grant (e.g., bad or reused code).
	#[error("Provider rejected the grant: {reason}.")]
	InvalidGrant {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// Client authentication failed or credentials are malformed.
	#[error("Client authentication failed: {reason}.")]
	InvalidClient {
		/// Provider-supplied reason string.
		reason: String,
	},
}
impl Error {
	/// Returns `true` when the failure came from the outbound request itself (transport error or
	/// unusable upstream response) rather than from local preconditions or response content.
	pub fn is_upstream_request_error(&self) -> bool {
		matches!(self, Self::Transport(_) | Self::Upstream(_))
	}

	/// Returns `true` when the caller's request deadline elapsed.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Self::Transport(TransportError::TimedOut { .. }))
	}
}

/// Configuration and request-construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed (e.g., a token with characters illegal in headers).
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// A configured endpoint cannot be used by the OAuth client.
	#[error("The {endpoint} endpoint is invalid.")]
	InvalidEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// Redirect URI cannot be parsed.
	#[error("Redirect URI is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// Token endpoint returned a non-positive or out-of-range `expires_in`.
	#[error("The expires_in value is out of the supported range.")]
	ExpiresInOutOfRange,
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

/// Upstream responses that arrived but could not be used.
#[derive(Debug, ThisError)]
pub enum UpstreamError {
	/// Endpoint answered with a non-success HTTP status.
	#[error("{endpoint} endpoint returned HTTP {status}.")]
	Status {
		/// Which endpoint answered.
		endpoint: &'static str,
		/// HTTP status code.
		status: u16,
		/// Truncated response body for diagnostics.
		body_preview: String,
	},
	/// Token endpoint returned an unexpected but well-formed response.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	TokenEndpoint {
		/// Provider- or adapter-supplied message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint responded with JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO, deadline).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the {endpoint} endpoint.")]
	Network {
		/// Which endpoint was being called.
		endpoint: &'static str,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request could not be built from the adapter's inputs (e.g., a token with characters
	/// illegal in headers), so nothing was sent.
	#[error("Request to the {endpoint} endpoint could not be built.")]
	InvalidRequest {
		/// Which endpoint was being called.
		endpoint: &'static str,
		/// Request construction failure.
		#[source]
		source: oauth2::http::Error,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
	/// The request context's deadline elapsed before the provider answered.
	#[error("Request to the {endpoint} endpoint timed out.")]
	TimedOut {
		/// Which endpoint was being called.
		endpoint: &'static str,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(endpoint: &'static str, src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { endpoint, source: Box::new(src) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn upstream_request_errors_group_transport_and_status() {
		let transport: Error = TransportError::TimedOut { endpoint: "profile" }.into();
		let status: Error = UpstreamError::Status {
			endpoint: "profile",
			status: 502,
			body_preview: "bad gateway".into(),
		}
		.into();

		assert!(transport.is_upstream_request_error());
		assert!(transport.is_timeout());
		assert!(status.is_upstream_request_error());
		assert!(!status.is_timeout());
		assert!(!Error::MissingCredential.is_upstream_request_error());
		assert!(!Error::MissingEmailField.is_upstream_request_error());
	}

	#[test]
	fn unbuildable_requests_count_as_upstream_request_errors() {
		let source = oauth2::http::Request::builder()
			.header("authorization", "Bearer bad\ntoken")
			.body(())
			.expect_err("Header values with a newline should be rejected.");
		let err: Error = TransportError::InvalidRequest { endpoint: "profile", source }.into();

		assert!(err.is_upstream_request_error());
		assert!(!err.is_timeout());
		assert_eq!(err.to_string(), "Request to the profile endpoint could not be built.");
	}

	#[test]
	fn messages_name_the_endpoint() {
		let err = Error::from(TransportError::TimedOut { endpoint: "validate" });

		assert_eq!(err.to_string(), "Request to the validate endpoint timed out.");
	}
}
