//! Shared token-validation routine used by provider adapters.

// self
use crate::{
	_prelude::*,
	http::{self, ProviderHttpClient, RequestContext},
	oauth::TransportErrorMapper,
	obs,
	provider::{AuthorizationHeader, body_preview},
};

const VALIDATE_ENDPOINT: &str = "validate";
const ACCESS_TOKEN_PARAM: &str = "access_token";

/// Asks the provider whether `access_token` is currently valid.
///
/// Returns `true` only for an HTTP 200 answer. An empty token short-circuits to `false`
/// without a request. When `header` is empty the token travels as the `access_token` query
/// parameter instead. Transport failures and non-200 statuses are logged (token stripped)
/// and collapse to `false`.
pub async fn validate_token<C, M>(
	ctx: &RequestContext,
	client: &C,
	mapper: &M,
	validate_url: &Url,
	access_token: &str,
	header: &AuthorizationHeader,
) -> bool
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	if access_token.is_empty() {
		return false;
	}

	let mut endpoint = validate_url.clone();

	if header.is_empty() {
		endpoint.query_pairs_mut().append_pair(ACCESS_TOKEN_PARAM, access_token);
	}

	match http::get(client, mapper, ctx, VALIDATE_ENDPOINT, &endpoint, header).await {
		Ok(response) => {
			let status = response.status().as_u16();

			obs::log_validation_status(
				&strip_token(&endpoint),
				status,
				&body_preview(response.body()),
			);

			status == 200
		},
		Err(e) => {
			obs::log_validation_error(&strip_token(&endpoint), &e);

			false
		},
	}
}

/// Renders `endpoint` for logs with any `access_token` query value shortened to its first
/// three characters.
pub fn strip_token(endpoint: &Url) -> String {
	if !endpoint.query_pairs().any(|(key, _)| key == ACCESS_TOKEN_PARAM) {
		return endpoint.to_string();
	}

	let pairs = endpoint
		.query_pairs()
		.map(|(key, value)| {
			let value = if key == ACCESS_TOKEN_PARAM {
				let mut kept: String = value.chars().take(3).collect();

				kept.push_str("...");

				kept
			} else {
				value.into_owned()
			};

			(key.into_owned(), value)
		})
		.collect::<Vec<_>>();
	let mut stripped = endpoint.clone();

	stripped.query_pairs_mut().clear().extend_pairs(pairs);

	stripped.to_string()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn strip_token_shortens_access_token_only() {
		let url = Url::parse("https://api.example.com/v1/user/self?access_token=abcdef123&x=1")
			.expect("Test URL should parse.");
		let stripped = strip_token(&url);

		assert!(stripped.contains("access_token=abc..."));
		assert!(stripped.contains("x=1"));
		assert!(!stripped.contains("abcdef123"));
	}

	#[test]
	fn strip_token_leaves_clean_urls_alone() {
		let url = Url::parse("https://api.example.com/v1/user/self").expect("Test URL should parse.");

		assert_eq!(strip_token(&url), "https://api.example.com/v1/user/self");
	}
}
