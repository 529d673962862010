// self
use crate::obs::{CallKind, CallOutcome};

/// Counter incremented once per call attempt and once per finished call.
pub const CALL_TOTAL: &str = "rbhub_provider_call_total";

/// Records a call outcome via the global metrics recorder (when enabled).
pub fn record_call_outcome(kind: CallKind, outcome: CallOutcome) {
	let [(call_key, call), (outcome_key, outcome)] = call_labels(kind, outcome);

	#[cfg(feature = "metrics")]
	{
		metrics::counter!(CALL_TOTAL, call_key => call, outcome_key => outcome).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (call_key, call, outcome_key, outcome);
	}
}

/// Label pairs attached to [`CALL_TOTAL`].
pub fn call_labels(kind: CallKind, outcome: CallOutcome) -> [(&'static str, &'static str); 2] {
	[("call", kind.as_str()), ("outcome", outcome.as_str())]
}
