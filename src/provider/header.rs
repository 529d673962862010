//! Authorization header construction shared by provider calls.

// self
use crate::_prelude::*;

const AUTHORIZATION: &str = "Authorization";
const ACCEPT: &str = "Accept";
const ACCEPT_APPLICATION_JSON: &str = "application/json";
const TOKEN_TYPE_BEARER: &str = "Bearer";
const NO_EXTRA: [(&str, &str); 0] = [];

/// Header set derived from an access token for a single call.
///
/// A pure function of its inputs; nothing is cached between calls. `Debug` redacts the
/// authorization value.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthorizationHeader(BTreeMap<String, String>);
impl AuthorizationHeader {
	/// Builds `Authorization: <prefix> <token>` on top of `extra` headers.
	///
	/// The authorization entry always wins over an `extra` entry of the same name.
	pub fn authorization<I, K, V>(prefix: &str, token: &str, extra: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		let mut headers: BTreeMap<String, String> = BTreeMap::new();

		for (name, value) in extra {
			headers.insert(name.into(), value.into());
		}

		headers.retain(|name, _| !name.eq_ignore_ascii_case(AUTHORIZATION));
		headers.insert(AUTHORIZATION.to_owned(), format!("{prefix} {token}"));

		Self(headers)
	}

	/// Looks up a header value by case-insensitive name.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.0
			.iter()
			.find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}

	/// Iterates over `(name, value)` pairs.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
	}

	/// Number of headers.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when no headers are set.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl Debug for AuthorizationHeader {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let mut map = f.debug_map();

		for (name, value) in self.0.iter() {
			if name.eq_ignore_ascii_case(AUTHORIZATION) {
				map.entry(name, &"<redacted>");
			} else {
				map.entry(name, value);
			}
		}

		map.finish()
	}
}

/// How a provider turns an access token into request headers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum HeaderStrategy {
	/// `Authorization: Bearer <token>` plus `Accept: application/json`.
	#[default]
	Oidc,
	/// `Authorization: Bearer <token>` only.
	Bearer,
	/// `Authorization: <prefix> <token>` for providers with a non-standard scheme.
	Custom {
		/// Scheme placed before the token.
		prefix: String,
	},
}
impl HeaderStrategy {
	/// Derives the header set for `token`.
	pub fn header(&self, token: &str) -> AuthorizationHeader {
		match self {
			HeaderStrategy::Oidc => AuthorizationHeader::authorization(
				TOKEN_TYPE_BEARER,
				token,
				[(ACCEPT, ACCEPT_APPLICATION_JSON)],
			),
			HeaderStrategy::Bearer =>
				AuthorizationHeader::authorization(TOKEN_TYPE_BEARER, token, NO_EXTRA),
			HeaderStrategy::Custom { prefix } =>
				AuthorizationHeader::authorization(prefix, token, NO_EXTRA),
		}
	}
}
