//! RBHub identity-provider adapter for OAuth 2.0 reverse-proxy hosts: vendor defaults, profile
//! lookups, and session validation behind one provider trait.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		http::ReqwestHttpClient,
		provider::{ProviderOptions, RbhubProvider, ReqwestRbhubProvider},
	};

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Returns options whose every endpoint points at the provided mock server base URL.
	///
	/// Paths mirror the vendor defaults so tests can assert against the real routes.
	pub fn mock_options(base: &str) -> ProviderOptions {
		let endpoint = |path: &str| {
			Url::parse(&format!("{base}{path}")).expect("Mock endpoint URL should parse.")
		};

		ProviderOptions::default()
			.client_id("rbhub-client")
			.client_secret("rbhub-secret")
			.login_url(endpoint("/beanshub/oauth2/authorize"))
			.redeem_url(endpoint("/v1/oauth2/token"))
			.profile_url(endpoint("/v1/user/self"))
			.validate_url(endpoint("/v1/user/self"))
	}

	/// Constructs an RBHub provider backed by the insecure reqwest transport used across
	/// integration tests.
	pub fn build_reqwest_test_provider(options: ProviderOptions) -> ReqwestRbhubProvider {
		RbhubProvider::with_http_client(
			options,
			test_reqwest_http_client(),
			crate::oauth::ReqwestTransportErrorMapper,
		)
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
