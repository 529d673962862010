//! Provider configuration: vendor defaults, caller overrides, and the merged result.

// self
use crate::{
	_prelude::*,
	auth::{LoginRequest, ScopeSet, TokenSecret},
	provider::HeaderStrategy,
};

const DEFAULT_APPROVAL_PROMPT: &str = "force";

/// Vendor defaults an adapter registers with.
///
/// Values are process-wide constants; adapters expose them through a `LazyLock` so they are
/// parsed once and never mutated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderDefaults {
	/// Display name of the provider.
	pub name: &'static str,
	/// Authorization endpoint.
	pub login_url: Url,
	/// Token endpoint used to redeem authorization codes.
	pub redeem_url: Url,
	/// Endpoint returning the authenticated user's profile.
	pub profile_url: Url,
	/// Endpoint used to check whether an access token is still valid.
	pub validate_url: Url,
	/// Scopes requested when the caller does not override them.
	pub scope: ScopeSet,
}

/// Caller-supplied configuration; every unset field falls back to the vendor default.
///
/// Deserializable so hosts can load it straight from their configuration files.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderOptions {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret for confidential clients.
	pub client_secret: Option<TokenSecret>,
	/// Overrides the authorization endpoint.
	pub login_url: Option<Url>,
	/// Overrides the token endpoint.
	pub redeem_url: Option<Url>,
	/// Overrides the profile endpoint.
	pub profile_url: Option<Url>,
	/// Overrides the validation endpoint.
	pub validate_url: Option<Url>,
	/// Overrides the requested scopes.
	pub scope: Option<ScopeSet>,
	/// Overrides the `approval_prompt` parameter (`force` by default; empty disables it).
	pub approval_prompt: Option<String>,
}
impl ProviderOptions {
	/// Sets the client identifier.
	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = client_id.into();

		self
	}

	/// Sets the client secret.
	pub fn client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(TokenSecret::new(secret));

		self
	}

	/// Overrides the authorization endpoint.
	pub fn login_url(mut self, url: Url) -> Self {
		self.login_url = Some(url);

		self
	}

	/// Overrides the token endpoint.
	pub fn redeem_url(mut self, url: Url) -> Self {
		self.redeem_url = Some(url);

		self
	}

	/// Overrides the profile endpoint.
	pub fn profile_url(mut self, url: Url) -> Self {
		self.profile_url = Some(url);

		self
	}

	/// Overrides the validation endpoint.
	pub fn validate_url(mut self, url: Url) -> Self {
		self.validate_url = Some(url);

		self
	}

	/// Overrides the requested scopes.
	pub fn scope(mut self, scope: ScopeSet) -> Self {
		self.scope = Some(scope);

		self
	}

	/// Overrides the `approval_prompt` parameter.
	pub fn approval_prompt(mut self, prompt: impl Into<String>) -> Self {
		self.approval_prompt = Some(prompt.into());

		self
	}
}

/// Merged, immutable provider configuration consumed by adapters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderData {
	/// Display name of the provider.
	pub name: &'static str,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret, if any.
	pub client_secret: Option<TokenSecret>,
	/// Authorization endpoint.
	pub login_url: Url,
	/// Token endpoint.
	pub redeem_url: Url,
	/// Profile endpoint.
	pub profile_url: Url,
	/// Validation endpoint.
	pub validate_url: Url,
	/// Requested scopes.
	pub scope: ScopeSet,
	/// `approval_prompt` parameter; empty omits it.
	pub approval_prompt: String,
	/// How access tokens become request headers.
	pub header_strategy: HeaderStrategy,
}
impl ProviderData {
	/// Merges `options` over `defaults`; each field is defaulted independently.
	pub fn from_options(
		options: ProviderOptions,
		defaults: &ProviderDefaults,
		header_strategy: HeaderStrategy,
	) -> Self {
		let ProviderOptions {
			client_id,
			client_secret,
			login_url,
			redeem_url,
			profile_url,
			validate_url,
			scope,
			approval_prompt,
		} = options;

		Self {
			name: defaults.name,
			client_id,
			client_secret,
			login_url: login_url.unwrap_or_else(|| defaults.login_url.clone()),
			redeem_url: redeem_url.unwrap_or_else(|| defaults.redeem_url.clone()),
			profile_url: profile_url.unwrap_or_else(|| defaults.profile_url.clone()),
			validate_url: validate_url.unwrap_or_else(|| defaults.validate_url.clone()),
			scope: scope.unwrap_or_else(|| defaults.scope.clone()),
			approval_prompt: approval_prompt.unwrap_or_else(|| DEFAULT_APPROVAL_PROMPT.to_owned()),
			header_strategy,
		}
	}

	/// Builds the authorize URL for `request`.
	pub fn login_url_for(&self, request: &LoginRequest) -> Url {
		let mut url = self.login_url.clone();
		let mut pairs = url.query_pairs_mut();

		if !self.approval_prompt.is_empty() {
			pairs.append_pair("approval_prompt", &self.approval_prompt);
		}

		pairs.append_pair("response_type", "code");
		pairs.append_pair("client_id", &self.client_id);
		pairs.append_pair("redirect_uri", request.redirect_uri.as_str());

		if !self.scope.is_empty() {
			pairs.append_pair("scope", &self.scope.normalized());
		}

		pairs.append_pair("state", &request.state);

		if let Some(pkce) = request.pkce.as_ref() {
			pairs.append_pair("code_challenge", pkce.challenge());
			pairs.append_pair("code_challenge_method", pkce.method().as_str());
		}

		drop(pairs);

		url
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Test URL should parse.")
	}

	fn defaults() -> ProviderDefaults {
		ProviderDefaults {
			name: "Example",
			login_url: url("https://id.example.com/authorize"),
			redeem_url: url("https://api.example.com/token"),
			profile_url: url("https://api.example.com/me"),
			validate_url: url("https://api.example.com/me"),
			scope: ScopeSet::from_str("profile email").expect("Scope fixture should parse."),
		}
	}

	#[test]
	fn overrides_win_field_by_field() {
		let options = ProviderOptions::default()
			.client_id("client")
			.profile_url(url("https://proxy.internal/me"))
			.scope(ScopeSet::new(["openid"]).expect("Scope override should be valid."));
		let data = ProviderData::from_options(options, &defaults(), HeaderStrategy::Oidc);

		assert_eq!(data.profile_url.as_str(), "https://proxy.internal/me");
		assert_eq!(data.validate_url.as_str(), "https://api.example.com/me");
		assert_eq!(data.login_url.as_str(), "https://id.example.com/authorize");
		assert_eq!(data.scope.normalized(), "openid");
		assert_eq!(data.approval_prompt, "force");
		assert_eq!(data.client_id, "client");
	}

	#[test]
	fn login_url_carries_oauth_parameters() {
		let data = ProviderData::from_options(
			ProviderOptions::default().client_id("client"),
			&defaults(),
			HeaderStrategy::Oidc,
		);
		let request = LoginRequest::new(url("https://proxy.example.com/oauth2/callback"))
			.with_state("state-1");
		let login = data.login_url_for(&request);
		let pairs: std::collections::HashMap<_, _> = login.query_pairs().into_owned().collect();
		let pkce = request.pkce.as_ref().expect("PKCE should be enabled by default.");

		assert_eq!(pairs.get("approval_prompt"), Some(&"force".into()));
		assert_eq!(pairs.get("response_type"), Some(&"code".into()));
		assert_eq!(pairs.get("client_id"), Some(&"client".into()));
		assert_eq!(
			pairs.get("redirect_uri"),
			Some(&"https://proxy.example.com/oauth2/callback".into())
		);
		assert_eq!(pairs.get("scope"), Some(&"profile email".into()));
		assert_eq!(pairs.get("state"), Some(&"state-1".into()));
		assert_eq!(pairs.get("code_challenge"), Some(&pkce.challenge().to_owned()));
		assert_eq!(pairs.get("code_challenge_method"), Some(&"S256".into()));
	}

	#[test]
	fn empty_approval_prompt_is_omitted() {
		let data = ProviderData::from_options(
			ProviderOptions::default().approval_prompt(""),
			&defaults(),
			HeaderStrategy::Oidc,
		);
		let request =
			LoginRequest::new(url("https://proxy.example.com/cb")).without_pkce().with_state("s");
		let login = data.login_url_for(&request);

		assert!(login.query_pairs().all(|(key, _)| key != "approval_prompt"));
		assert!(login.query_pairs().all(|(key, _)| key != "code_challenge"));
	}

	#[test]
	fn options_deserialize_from_config() {
		let options: ProviderOptions = serde_json::from_str(
			r#"{
				"client_id": "from-config",
				"client_secret": "shh",
				"profile_url": "https://mirror.example.com/v1/user/self",
				"scope": "user.info"
			}"#,
		)
		.expect("Options should deserialize from JSON config.");

		assert_eq!(options.client_id, "from-config");
		assert_eq!(options.client_secret.as_ref().map(TokenSecret::expose), Some("shh"));
		assert_eq!(
			options.profile_url.as_ref().map(Url::as_str),
			Some("https://mirror.example.com/v1/user/self")
		);
		assert!(options.login_url.is_none());
		assert_eq!(options.scope.as_ref().map(ScopeSet::normalized), Some("user.info".into()));
	}
}
