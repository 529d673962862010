//! Provider capability trait and the pieces adapters are assembled from.
//!
//! `data` holds the merged configuration (`ProviderData`) built from vendor defaults and
//! caller overrides. `header` derives the authorization headers attached to every call.
//! `validate` is the shared token-validation routine. `rbhub` is the RBHub adapter.

pub mod data;
pub mod header;
pub mod rbhub;
pub mod validate;

pub use data::*;
pub use header::*;
pub use rbhub::*;
pub use validate::*;

// self
use crate::{
	_prelude::*,
	auth::{LoginRequest, SessionState},
	http::RequestContext,
};

/// Boxed future returned by [`Provider`] operations.
pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a + Send>>;

/// Capability set every vendor adapter exposes to the host.
///
/// The trait is object safe so hosts can keep adapters behind `Arc<dyn Provider>` in their
/// registry. Every operation is a stateless round trip; adapters never mutate the session.
pub trait Provider
where
	Self: Send + Sync,
{
	/// Merged provider configuration.
	fn data(&self) -> &ProviderData;

	/// Builds the authorize URL the host redirects the user to.
	fn login_url(&self, request: &LoginRequest) -> Url {
		self.data().login_url_for(request)
	}

	/// Exchanges an authorization code for a fresh session.
	fn redeem<'a>(
		&'a self,
		ctx: &'a RequestContext,
		redirect_uri: &'a Url,
		code: &'a str,
		code_verifier: Option<&'a str>,
	) -> ProviderFuture<'a, Result<SessionState>>;

	/// Resolves the email address of the session's user.
	fn get_email_address<'a>(
		&'a self,
		ctx: &'a RequestContext,
		session: &'a SessionState,
	) -> ProviderFuture<'a, Result<String>>;

	/// Returns `true` only when the provider confirms the session's access token.
	fn validate_session<'a>(
		&'a self,
		ctx: &'a RequestContext,
		session: &'a SessionState,
	) -> ProviderFuture<'a, bool>;
}

const BODY_PREVIEW_LIMIT: usize = 256;

/// Lossy, length-bounded rendering of a response body for errors and logs.
pub(crate) fn body_preview(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);

	if text.chars().count() <= BODY_PREVIEW_LIMIT {
		return text.into_owned();
	}

	let mut buf: String = text.chars().take(BODY_PREVIEW_LIMIT).collect();

	buf.push('…');

	buf
}
