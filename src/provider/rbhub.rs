//! RBHub (Rocket Beans hub) identity-provider adapter.
//!
//! RBHub speaks plain OAuth 2.0: the login and redeem legs run through the generic helpers,
//! the profile endpoint (`/v1/user/self`) answers `{ "data": { "email": ... } }`, and the
//! same endpoint doubles as the token validation URL.

// std
use std::sync::LazyLock;
// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, SessionState},
	error::UpstreamError,
	http::{self, ProviderHttpClient, RequestContext},
	oauth::{self, TransportErrorMapper},
	obs::{self, CallKind, CallOutcome, CallSpan},
	provider::{
		HeaderStrategy, Provider, ProviderData, ProviderDefaults, ProviderFuture, ProviderOptions,
		body_preview, validate_token,
	},
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

/// Provider display name.
pub const RBHUB_PROVIDER_NAME: &str = "RBHub";
/// Scopes requested unless overridden.
pub const RBHUB_DEFAULT_SCOPE: &str = "user.info user.email.read";
/// Authorization endpoint.
pub const RBHUB_DEFAULT_LOGIN_URL: &str = "https://hub.rocketbeans.de/beanshub/oauth2/authorize";
/// Token endpoint.
pub const RBHUB_DEFAULT_REDEEM_URL: &str = "https://api.hub.rocketbeans.de/v1/oauth2/token";
/// Profile endpoint, also used for validation.
pub const RBHUB_DEFAULT_PROFILE_URL: &str = "https://api.hub.rocketbeans.de/v1/user/self";

const PROFILE_ENDPOINT: &str = "profile";
const EMAIL_PATH: &str = "data.email";

static RBHUB_DEFAULTS: LazyLock<ProviderDefaults> = LazyLock::new(|| ProviderDefaults {
	name: RBHUB_PROVIDER_NAME,
	login_url: static_url(RBHUB_DEFAULT_LOGIN_URL),
	redeem_url: static_url(RBHUB_DEFAULT_REDEEM_URL),
	profile_url: static_url(RBHUB_DEFAULT_PROFILE_URL),
	validate_url: static_url(RBHUB_DEFAULT_PROFILE_URL),
	scope: ScopeSet::from_str(RBHUB_DEFAULT_SCOPE)
		.expect("RBHub default scope must be a valid scope string."),
});

#[cfg(feature = "reqwest")]
/// RBHub adapter specialized for the crate's default reqwest transport stack.
pub type ReqwestRbhubProvider = RbhubProvider<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Vendor defaults RBHub registers with.
pub fn rbhub_defaults() -> &'static ProviderDefaults {
	&RBHUB_DEFAULTS
}

/// RBHub adapter.
///
/// Holds only the merged configuration and shared transport handles, so one instance can
/// serve concurrent host requests.
pub struct RbhubProvider<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	data: ProviderData,
	http_client: Arc<C>,
	transport_mapper: Arc<M>,
}
impl<C, M> RbhubProvider<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates an adapter on top of a caller-provided transport + mapper pair.
	pub fn with_http_client(
		options: ProviderOptions,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			data: ProviderData::from_options(options, rbhub_defaults(), HeaderStrategy::Oidc),
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
		}
	}

	/// Merged configuration.
	pub fn data(&self) -> &ProviderData {
		&self.data
	}

	/// Fetches the profile and returns its `data.email` value.
	pub async fn get_email_address(
		&self,
		ctx: &RequestContext,
		session: &SessionState,
	) -> Result<String> {
		const KIND: CallKind = CallKind::EmailAddress;

		let span = CallSpan::new(KIND, "get_email_address");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span.instrument(self.fetch_email(ctx, session)).await;

		obs::record_call_outcome(KIND, CallOutcome::of(&result));

		result
	}

	/// Returns `true` only when the validate endpoint accepts the session's access token.
	pub async fn validate_session(&self, ctx: &RequestContext, session: &SessionState) -> bool {
		const KIND: CallKind = CallKind::ValidateSession;

		let span = CallSpan::new(KIND, "validate_session");
		let token = session.access_token.expose();
		let header = self.data.header_strategy.header(token);

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let valid = span
			.instrument(validate_token(
				ctx,
				self.http_client.as_ref(),
				self.transport_mapper.as_ref(),
				&self.data.validate_url,
				token,
				&header,
			))
			.await;

		obs::record_call_outcome(
			KIND,
			if valid { CallOutcome::Success } else { CallOutcome::Failure },
		);

		valid
	}

	/// Exchanges an authorization code at the redeem endpoint.
	pub async fn redeem(
		&self,
		ctx: &RequestContext,
		redirect_uri: &Url,
		code: &str,
		code_verifier: Option<&str>,
	) -> Result<SessionState> {
		const KIND: CallKind = CallKind::Redeem;

		let span = CallSpan::new(KIND, "redeem");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(oauth::redeem_code(
				&self.data,
				self.http_client.as_ref(),
				self.transport_mapper.as_ref(),
				ctx,
				redirect_uri,
				code,
				code_verifier,
			))
			.await;

		obs::record_call_outcome(KIND, CallOutcome::of(&result));

		result
	}

	async fn fetch_email(&self, ctx: &RequestContext, session: &SessionState) -> Result<String> {
		if !session.has_access_token() {
			return Err(Error::MissingCredential);
		}

		let header = self.data.header_strategy.header(session.access_token.expose());
		let response = http::get(
			self.http_client.as_ref(),
			self.transport_mapper.as_ref(),
			ctx,
			PROFILE_ENDPOINT,
			&self.data.profile_url,
			&header,
		)
		.await?;
		let status = response.status();

		if !status.is_success() {
			return Err(UpstreamError::Status {
				endpoint: PROFILE_ENDPOINT,
				status: status.as_u16(),
				body_preview: body_preview(response.body()),
			}
			.into());
		}

		extract_email(response.body()).ok_or(Error::MissingEmailField)
	}
}
#[cfg(feature = "reqwest")]
impl RbhubProvider<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates an adapter with its own reqwest-backed transport.
	///
	/// The transport never follows redirects; fails only if the HTTP client cannot be built.
	pub fn new(options: ProviderOptions) -> Result<Self> {
		Ok(Self::with_http_client(options, ReqwestHttpClient::new()?, ReqwestTransportErrorMapper))
	}
}
impl<C, M> Provider for RbhubProvider<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn data(&self) -> &ProviderData {
		&self.data
	}

	fn redeem<'a>(
		&'a self,
		ctx: &'a RequestContext,
		redirect_uri: &'a Url,
		code: &'a str,
		code_verifier: Option<&'a str>,
	) -> ProviderFuture<'a, Result<SessionState>> {
		Box::pin(RbhubProvider::redeem(self, ctx, redirect_uri, code, code_verifier))
	}

	fn get_email_address<'a>(
		&'a self,
		ctx: &'a RequestContext,
		session: &'a SessionState,
	) -> ProviderFuture<'a, Result<String>> {
		Box::pin(RbhubProvider::get_email_address(self, ctx, session))
	}

	fn validate_session<'a>(
		&'a self,
		ctx: &'a RequestContext,
		session: &'a SessionState,
	) -> ProviderFuture<'a, bool> {
		Box::pin(RbhubProvider::validate_session(self, ctx, session))
	}
}
impl<C, M> Clone for RbhubProvider<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			data: self.data.clone(),
			http_client: Arc::clone(&self.http_client),
			transport_mapper: Arc::clone(&self.transport_mapper),
		}
	}
}
impl<C, M> Debug for RbhubProvider<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RbhubProvider").field("data", &self.data).finish()
	}
}

/// Reads a non-empty string at `data.email`; anything else (including a non-JSON body)
/// yields `None`.
fn extract_email(body: &[u8]) -> Option<String> {
	let json = serde_json::from_slice::<Value>(body).ok()?;
	let mut current = &json;

	for segment in EMAIL_PATH.split('.') {
		current = current.get(segment)?;
	}

	current.as_str().filter(|email| !email.is_empty()).map(str::to_owned)
}

fn static_url(raw: &'static str) -> Url {
	Url::parse(raw).expect("RBHub default endpoints must be valid URLs.")
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn defaults_match_vendor_endpoints() {
		let defaults = rbhub_defaults();

		assert_eq!(defaults.name, "RBHub");
		assert_eq!(
			defaults.login_url.as_str(),
			"https://hub.rocketbeans.de/beanshub/oauth2/authorize"
		);
		assert_eq!(defaults.redeem_url.as_str(), "https://api.hub.rocketbeans.de/v1/oauth2/token");
		assert_eq!(defaults.profile_url.as_str(), "https://api.hub.rocketbeans.de/v1/user/self");
		assert_eq!(defaults.validate_url, defaults.profile_url);
		assert_eq!(defaults.scope.normalized(), "user.info user.email.read");
	}

	#[test]
	fn extract_email_reads_nested_field() {
		assert_eq!(
			extract_email(br#"{"data":{"email":"x@y.z","name":"bean"}}"#),
			Some("x@y.z".into())
		);
		assert_eq!(extract_email(br#"{"data":{"email":""}}"#), None);
		assert_eq!(extract_email(br#"{"data":{"email":42}}"#), None);
		assert_eq!(extract_email(br#"{"data":{}}"#), None);
		assert_eq!(extract_email(br#"{"email":"x@y.z"}"#), None);
		assert_eq!(extract_email(b"not json"), None);
		assert_eq!(extract_email(b""), None);
	}
}
