// self
use crate::{_prelude::*, obs::CallKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// A span builder used by provider calls.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a new span tagged with the provided call kind + stage.
	pub fn new(kind: CallKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("rbhub_provider.call", call = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs a validation request that never produced a response.
///
/// `endpoint` must already have its token stripped.
pub fn log_validation_error(endpoint: &str, error: &dyn StdError) {
	#[cfg(feature = "tracing")]
	{
		tracing::error!(endpoint, %error, "token validation request failed");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (endpoint, error);
	}
}

/// Logs the status returned by the validate endpoint.
///
/// `endpoint` must already have its token stripped.
pub fn log_validation_status(endpoint: &str, status: u16, body: &str) {
	#[cfg(feature = "tracing")]
	{
		if status == 200 {
			tracing::debug!(endpoint, status, "token validation succeeded");
		} else {
			tracing::error!(endpoint, status, body, "token validation request failed");
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (endpoint, status, body);
	}
}
