//! Host-owned session state read by provider adapters.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Session record the host keeps per authenticated user.
///
/// Adapters only read it; the host owns persistence and rotation. An empty access token means
/// the session carries no credential and provider calls fail fast.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
	/// Access token presented to provider APIs.
	pub access_token: TokenSecret,
	/// Refresh token, if the provider issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Raw ID token, if the provider issued one.
	pub id_token: Option<TokenSecret>,
	/// Email address resolved for the session.
	pub email: Option<String>,
	/// User identifier resolved for the session.
	pub user: Option<String>,
	/// Instant the session was created.
	#[serde(with = "time::serde::rfc3339::option")]
	pub created_at: Option<OffsetDateTime>,
	/// Instant the access token stops being valid.
	#[serde(with = "time::serde::rfc3339::option")]
	pub expires_on: Option<OffsetDateTime>,
}
impl SessionState {
	/// Creates a session holding only an access token.
	pub fn new(access_token: impl Into<TokenSecret>) -> Self {
		Self { access_token: access_token.into(), ..Default::default() }
	}

	/// Sets the refresh token.
	pub fn with_refresh_token(mut self, token: impl Into<TokenSecret>) -> Self {
		self.refresh_token = Some(token.into());

		self
	}

	/// Sets the email address.
	pub fn with_email(mut self, email: impl Into<String>) -> Self {
		self.email = Some(email.into());

		self
	}

	/// Sets the creation instant.
	pub fn created_at(mut self, instant: OffsetDateTime) -> Self {
		self.created_at = Some(instant);

		self
	}

	/// Sets the expiry instant.
	pub fn expires_on(mut self, instant: OffsetDateTime) -> Self {
		self.expires_on = Some(instant);

		self
	}

	/// Returns `true` if an access token is present.
	pub fn has_access_token(&self) -> bool {
		!self.access_token.is_empty()
	}

	/// Returns `true` if the session expired at the provided instant.
	///
	/// Sessions without an expiry never expire.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_on.is_some_and(|expires_on| instant >= expires_on)
	}

	/// Returns `true` if the session is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Age of the session at the provided instant, if the creation time is known.
	pub fn age_at(&self, instant: OffsetDateTime) -> Option<Duration> {
		self.created_at.map(|created_at| instant - created_at)
	}
}
impl Debug for SessionState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionState")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("id_token", &self.id_token.as_ref().map(|_| "<redacted>"))
			.field("email", &self.email)
			.field("user", &self.user)
			.field("created_at", &self.created_at)
			.field("expires_on", &self.expires_on)
			.finish()
	}
}
