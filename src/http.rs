//! Transport primitives shared by the profile, validation, and redeem calls.
//!
//! The module exposes [`ProviderHttpClient`] alongside [`ResponseMetadata`],
//! [`ResponseMetadataSlot`], and [`RequestContext`] so hosts can integrate custom HTTP
//! clients without losing the adapter's error mapping. Implementations call
//! [`ResponseMetadataSlot::take`] before dispatching a request and
//! [`ResponseMetadataSlot::store`] once an HTTP status is known.

// std
use std::{ops::Deref, time::Duration as StdDuration};
// crates.io
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
	http::{Method, Request},
};
#[cfg(feature = "reqwest")] use reqwest::redirect::Policy;
// self
use crate::{
	_prelude::*, error::TransportError, oauth::TransportErrorMapper, provider::AuthorizationHeader,
};
#[cfg(feature = "reqwest")] use crate::error::ConfigError;

/// Abstraction over HTTP transports used by provider adapters.
///
/// The trait is the adapter's only dependency on an HTTP stack. Each call asks for a
/// short-lived [`AsyncHttpClient`] handle bound to the caller's [`RequestContext`] and a
/// [`ResponseMetadataSlot`]. The same handle type serves the plain GET helper and the
/// `oauth2` crate during code redemption, so one transport covers every outbound leg.
pub trait ProviderHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle tied to a request context and metadata slot.
	///
	/// The request future returned by [`AsyncHttpClient::call`] must be `Send` so provider
	/// futures can hop executors.
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds a handle that honors `ctx` and records outcomes in `slot`.
	///
	/// # Contract
	///
	/// - Call [`ResponseMetadataSlot::take`] before submitting the HTTP request so stale
	///   information never leaks across calls.
	/// - Save the status with [`ResponseMetadataSlot::store`] once known.
	/// - Abort the request once [`RequestContext::timeout`] elapses.
	fn handle(&self, ctx: &RequestContext, slot: ResponseMetadataSlot) -> Self::Handle;
}

/// Caller-supplied bounds for a single provider call.
///
/// Dropping the returned future always cancels the request; the context adds an explicit
/// deadline that transports enforce and surface as a timeout error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RequestContext {
	timeout: Option<StdDuration>,
}
impl RequestContext {
	/// Context without a deadline.
	pub fn background() -> Self {
		Self::default()
	}

	/// Bounds the call to the provided duration.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Deadline applied to the call, if any.
	pub fn timeout(&self) -> Option<StdDuration> {
		self.timeout
	}
}

/// Captures metadata from the most recent HTTP response for downstream error mapping.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadata {
	/// HTTP status code returned by the endpoint, if available.
	pub status: Option<u16>,
}

/// Thread-safe slot for sharing [`ResponseMetadata`] between transport and error layers.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadataSlot(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Stores new metadata for the current request.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Returns the captured metadata, if any, consuming it from the slot.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}
}

/// Issues a GET to `url` carrying `header`, bound to `ctx`.
///
/// Any HTTP status is returned as a response; only failures to issue the request (including
/// header values the request cannot carry) become errors. The `endpoint` label flows into error
/// messages.
pub async fn get<C, M>(
	client: &C,
	mapper: &M,
	ctx: &RequestContext,
	endpoint: &'static str,
	url: &Url,
	header: &AuthorizationHeader,
) -> Result<HttpResponse>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let mut builder = Request::builder().method(Method::GET).uri(url.as_str());

	for (name, value) in header.iter() {
		builder = builder.header(name, value);
	}

	let request: HttpRequest = builder
		.body(Vec::new())
		.map_err(|source| TransportError::InvalidRequest { endpoint, source })?;
	let slot = ResponseMetadataSlot::default();
	let handle = client.handle(ctx, slot.clone());

	handle
		.call(request)
		.await
		.map_err(|err| mapper.map_transport_error(endpoint, slot.take().as_ref(), err))
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Token endpoints must not redirect: a followed redirect would re-post the authorization code
/// and client secret to the `Location` target. [`ReqwestHttpClient::new`] disables redirects;
/// configure any custom [`ReqwestClient`] passed to [`ReqwestHttpClient::with_client`] the same
/// way, because that client is handed to the `oauth2` crate during code redemption.
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Builds a client that never follows redirects.
	pub fn new() -> Result<Self> {
		let client = ReqwestClient::builder()
			.redirect(Policy::none())
			.build()
			.map_err(ConfigError::http_client_build)?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ProviderHttpClient for ReqwestHttpClient {
	type Handle = InstrumentedHandle;
	type TransportError = ReqwestError;

	fn handle(&self, ctx: &RequestContext, slot: ResponseMetadataSlot) -> Self::Handle {
		InstrumentedHandle::new(self.0.clone(), ctx.timeout(), slot)
	}
}

#[cfg(feature = "reqwest")]
struct InstrumentedHttpClient {
	client: ReqwestClient,
	timeout: Option<StdDuration>,
	slot: ResponseMetadataSlot,
}

/// Handle returned by [`ReqwestHttpClient`] that applies the context deadline and captures
/// response metadata.
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct InstrumentedHandle(Arc<InstrumentedHttpClient>);
#[cfg(feature = "reqwest")]
impl InstrumentedHandle {
	fn new(client: ReqwestClient, timeout: Option<StdDuration>, slot: ResponseMetadataSlot) -> Self {
		Self(Arc::new(InstrumentedHttpClient { client, timeout, slot }))
	}
}
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for InstrumentedHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = Arc::clone(&self.0);

		Box::pin(async move {
			client.slot.take();

			let mut request: reqwest::Request = request.try_into().map_err(Box::new)?;

			if let Some(timeout) = client.timeout {
				*request.timeout_mut() = Some(timeout);
			}

			let response = client.client.execute(request).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();

			client.slot.store(ResponseMetadata { status: Some(status.as_u16()) });

			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}
