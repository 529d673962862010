//! OAuth client facade: transport error mapping and the authorization-code redeem leg.

pub use oauth2;

// std
use std::borrow::Cow;
// crates.io
use oauth2::{
	AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, HttpClientError,
	PkceCodeVerifier, RedirectUrl, RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError, BasicTokenResponse},
};
// self
use crate::{
	_prelude::*,
	auth::SessionState,
	error::{ConfigError, TransportError, UpstreamError},
	http::{ProviderHttpClient, RequestContext, ResponseMetadata, ResponseMetadataSlot},
	provider::ProviderData,
};

const REDEEM_ENDPOINT: &str = "redeem";

/// Maps HTTP transport failures into provider [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted while calling `endpoint` into a provider error.
	fn map_transport_error(
		&self,
		endpoint: &'static str,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		endpoint: &'static str,
		_metadata: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(endpoint, *inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) =>
				TransportError::Network { endpoint, source: message.into() }.into(),
			_ => TransportError::Network { endpoint, source: "Unknown HTTP client error.".into() }
				.into(),
		}
	}
}

/// Exchanges an authorization code at the configured redeem URL.
///
/// The client secret travels in the request body. The returned session carries the access
/// and refresh tokens plus creation and expiry instants.
pub(crate) async fn redeem_code<C, M>(
	data: &ProviderData,
	http_client: &C,
	mapper: &M,
	ctx: &RequestContext,
	redirect_uri: &Url,
	code: &str,
	code_verifier: Option<&str>,
) -> Result<SessionState>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	if code.is_empty() {
		return Err(Error::MissingCode);
	}

	let auth_url = AuthUrl::new(data.login_url.to_string())
		.map_err(|source| ConfigError::InvalidEndpoint { endpoint: "login", source })?;
	let token_url = TokenUrl::new(data.redeem_url.to_string())
		.map_err(|source| ConfigError::InvalidEndpoint { endpoint: REDEEM_ENDPOINT, source })?;
	let redirect_url = RedirectUrl::new(redirect_uri.to_string())
		.map_err(|source| ConfigError::InvalidRedirect { source })?;
	let mut oauth_client = BasicClient::new(ClientId::new(data.client_id.clone()))
		.set_auth_uri(auth_url)
		.set_token_uri(token_url)
		.set_auth_type(AuthType::RequestBody);

	if let Some(secret) = data.client_secret.as_ref() {
		oauth_client = oauth_client.set_client_secret(ClientSecret::new(secret.expose().to_owned()));
	}

	let meta = ResponseMetadataSlot::default();
	let handle = http_client.handle(ctx, meta.clone());
	let mut request = oauth_client
		.exchange_code(AuthorizationCode::new(code.to_owned()))
		.set_redirect_uri(Cow::Owned(redirect_url));

	if let Some(verifier) = code_verifier {
		request = request.set_pkce_verifier(PkceCodeVerifier::new(verifier.to_owned()));
	}

	let response = request
		.request_async(&handle)
		.await
		.map_err(|err| map_request_error(meta.take(), err, mapper))?;

	session_from_token_response(response)
}

fn session_from_token_response(response: BasicTokenResponse) -> Result<SessionState> {
	let now = OffsetDateTime::now_utc();
	let mut session = SessionState::new(response.access_token().secret().to_owned()).created_at(now);

	if let Some(refresh) = response.refresh_token() {
		session = session.with_refresh_token(refresh.secret().to_owned());
	}
	if let Some(expires_in) = response.expires_in().filter(|value| !value.is_zero()) {
		let secs =
			i64::try_from(expires_in.as_secs()).map_err(|_| ConfigError::ExpiresInOutOfRange)?;
		let expires_on =
			now.checked_add(Duration::seconds(secs)).ok_or(ConfigError::ExpiresInOutOfRange)?;

		session = session.expires_on(expires_on);
	}

	Ok(session)
}

fn map_request_error<E, M>(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
	mapper: &M,
) -> Error
where
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	let meta_ref = meta.as_ref();

	match err {
		RequestTokenError::ServerResponse(response) => map_server_response_error(response, meta_ref),
		RequestTokenError::Request(error) =>
			mapper.map_transport_error(REDEEM_ENDPOINT, meta_ref, error),
		RequestTokenError::Parse(error, _body) =>
			UpstreamError::TokenResponseParse { source: error, status: meta_status(meta_ref) }.into(),
		RequestTokenError::Other(message) => UpstreamError::TokenEndpoint {
			message,
			status: meta_status(meta_ref),
		}
		.into(),
	}
}

fn map_server_response_error(response: BasicErrorResponse, meta: Option<&ResponseMetadata>) -> Error {
	let code: &str = response.error().as_ref();
	let message = match response.error_description() {
		Some(description) => format!("{code}: {description}"),
		None => code.to_owned(),
	};

	if code.eq_ignore_ascii_case("invalid_grant") || code.eq_ignore_ascii_case("access_denied") {
		Error::InvalidGrant { reason: message }
	} else if code.eq_ignore_ascii_case("invalid_client")
		|| code.eq_ignore_ascii_case("unauthorized_client")
	{
		Error::InvalidClient { reason: message }
	} else {
		UpstreamError::TokenEndpoint {
			message,
			status: meta_status(meta),
		}
		.into()
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(endpoint: &'static str, err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return TransportError::TimedOut { endpoint }.into();
	}

	TransportError::network(endpoint, err).into()
}

fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::{
		AccessToken, EmptyExtraTokenFields, RefreshToken, StandardErrorResponse,
		basic::{BasicErrorResponseType, BasicTokenType},
	};
	// self
	use super::*;

	fn token_response(expires_in: Option<u64>) -> BasicTokenResponse {
		let mut response = BasicTokenResponse::new(
			AccessToken::new("access".into()),
			BasicTokenType::Bearer,
			EmptyExtraTokenFields {},
		);

		response.set_refresh_token(Some(RefreshToken::new("refresh".into())));
		response.set_expires_in(expires_in.map(std::time::Duration::from_secs).as_ref());

		response
	}

	#[test]
	fn token_response_becomes_session() {
		let session = session_from_token_response(token_response(Some(3600)))
			.expect("Token response should map into a session.");
		let created_at = session.created_at.expect("Creation instant should be stamped.");

		assert_eq!(session.access_token.expose(), "access");
		assert_eq!(session.refresh_token.as_ref().map(|secret| secret.expose()), Some("refresh"));
		assert_eq!(session.expires_on, Some(created_at + Duration::hours(1)));
	}

	#[test]
	fn zero_expiry_leaves_session_open_ended() {
		let session = session_from_token_response(token_response(Some(0)))
			.expect("Token response should map into a session.");

		assert!(session.expires_on.is_none());
	}

	#[test]
	fn server_errors_are_classified() {
		let invalid_grant = StandardErrorResponse::new(
			BasicErrorResponseType::InvalidGrant,
			Some("code already used".into()),
			None,
		);
		let invalid_client =
			StandardErrorResponse::new(BasicErrorResponseType::InvalidClient, None, None);
		let unsupported =
			StandardErrorResponse::new(BasicErrorResponseType::UnsupportedGrantType, None, None);
		let meta = ResponseMetadata { status: Some(400) };

		assert!(matches!(
			map_server_response_error(invalid_grant, Some(&meta)),
			Error::InvalidGrant { reason } if reason == "invalid_grant: code already used"
		));
		assert!(matches!(
			map_server_response_error(invalid_client, Some(&meta)),
			Error::InvalidClient { .. }
		));
		assert!(matches!(
			map_server_response_error(unsupported, Some(&meta)),
			Error::Upstream(UpstreamError::TokenEndpoint { status: Some(400), .. })
		));
	}
}
