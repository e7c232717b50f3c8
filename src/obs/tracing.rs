// self
use crate::{_prelude::*, error::RefreshFailure, obs::Operation};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOperation<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOperation<F> = F;

/// A span builder used by client operations.
#[derive(Clone, Debug)]
pub struct OperationSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OperationSpan {
	/// Creates a new span tagged with the provided operation + stage.
	pub fn new(operation: Operation, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"portfolio_client.operation",
				operation = operation.as_str(),
				stage
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (operation, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOperation<Fut>
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

/// Emits a warning when a terminal refresh failure ends the session.
pub fn warn_session_expired(reason: &RefreshFailure, redirect_to: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(%reason, redirect_to, "session expired; credentials cleared");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (reason, redirect_to);
	}
}

/// Emits a warning when the task driving a refresh was dropped mid-flight.
pub fn warn_refresh_abandoned(waiters: usize) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(waiters, "refresh abandoned before it settled");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = waiters;
	}
}

/// Emits a warning when credentials could not be removed from the store.
pub fn warn_wipe_failed(error: &dyn StdError) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(error = %error, "failed to wipe stored credentials");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = error;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn warnings_are_noops_without_subscriber() {
		warn_session_expired(&RefreshFailure::MissingRefreshToken, "/login");
		warn_refresh_abandoned(2);
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = OperationSpan::new(Operation::Refresh, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
