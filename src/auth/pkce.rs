//! Login-leg state: the opaque `state` value and the PKCE verifier/challenge pair.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

const STATE_LEN: usize = 32;
const PKCE_VERIFIER_LEN: usize = 64;

/// Supported PKCE challenge methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PkceCodeChallengeMethod {
	/// SHA-256 based PKCE (RFC 7636 S256).
	S256,
}
impl PkceCodeChallengeMethod {
	/// Returns the RFC 7636 identifier for the challenge method.
	pub fn as_str(self) -> &'static str {
		match self {
			PkceCodeChallengeMethod::S256 => "S256",
		}
	}
}

/// PKCE verifier + derived challenge.
#[derive(Clone)]
pub struct PkcePair {
	verifier: String,
	challenge: String,
	method: PkceCodeChallengeMethod,
}
impl PkcePair {
	/// Generates a fresh random verifier and its S256 challenge.
	pub fn generate() -> Self {
		Self::from_verifier(random_string(PKCE_VERIFIER_LEN))
	}

	/// Derives the S256 challenge for a caller-supplied verifier.
	pub fn from_verifier(verifier: impl Into<String>) -> Self {
		let verifier = verifier.into();
		let challenge = compute_pkce_challenge(&verifier);

		Self { verifier, challenge, method: PkceCodeChallengeMethod::S256 }
	}

	/// Secret verifier the host must keep until the redeem call.
	pub fn verifier(&self) -> &str {
		&self.verifier
	}

	/// Challenge sent on the authorize URL.
	pub fn challenge(&self) -> &str {
		&self.challenge
	}

	/// Challenge method sent on the authorize URL.
	pub fn method(&self) -> PkceCodeChallengeMethod {
		self.method
	}
}
impl Debug for PkcePair {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PkcePair")
			.field("verifier", &"<redacted>")
			.field("challenge", &self.challenge)
			.field("method", &self.method)
			.finish()
	}
}

/// Inputs for building an authorize URL.
#[derive(Clone, Debug)]
pub struct LoginRequest {
	/// Redirect URI the provider sends the user back to.
	pub redirect_uri: Url,
	/// Opaque state value that must round-trip via the redirect handler.
	pub state: String,
	/// PKCE pair, when the host wants code-challenge protection.
	pub pkce: Option<PkcePair>,
}
impl LoginRequest {
	/// Creates a request with a random state and a fresh PKCE pair.
	pub fn new(redirect_uri: Url) -> Self {
		Self { redirect_uri, state: random_string(STATE_LEN), pkce: Some(PkcePair::generate()) }
	}

	/// Overrides the state value (hosts that encode their own CSRF payload).
	pub fn with_state(mut self, state: impl Into<String>) -> Self {
		self.state = state.into();

		self
	}

	/// Disables PKCE for providers or clients that do not support it.
	pub fn without_pkce(mut self) -> Self {
		self.pkce = None;

		self
	}

	/// Validates the returned `state` parameter after the authorization redirect.
	pub fn validate_state(&self, returned_state: &str) -> Result<()> {
		if returned_state == self.state {
			Ok(())
		} else {
			Err(Error::StateMismatch)
		}
	}
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

fn compute_pkce_challenge(verifier: &str) -> String {
	let mut hasher = Sha256::new();
	hasher.update(verifier.as_bytes());
	let digest = hasher.finalize();
	URL_SAFE_NO_PAD.encode(digest)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn redirect() -> Url {
		Url::parse("https://proxy.example.com/oauth2/callback")
			.expect("Redirect URL fixture should parse successfully.")
	}

	#[test]
	fn challenge_matches_rfc_7636_vector() {
		let pair = PkcePair::from_verifier("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk");

		assert_eq!(pair.challenge(), "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
		assert_eq!(pair.method().as_str(), "S256");
	}

	#[test]
	fn new_requests_generate_state_and_pkce() {
		let request = LoginRequest::new(redirect());
		let pkce = request.pkce.as_ref().expect("PKCE should be enabled by default.");

		assert_eq!(request.state.len(), STATE_LEN);
		assert_eq!(pkce.verifier().len(), PKCE_VERIFIER_LEN);
		assert!(LoginRequest::new(redirect()).without_pkce().pkce.is_none());
	}

	#[test]
	fn state_validation_errors_on_mismatch() {
		let request = LoginRequest::new(redirect()).with_state("expected");

		assert!(request.validate_state("expected").is_ok());

		let err = request.validate_state("other").expect_err("State mismatch should fail.");

		assert!(matches!(err, Error::StateMismatch));
	}
}
