// self
use crate::obs::{Operation, Outcome};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_outcome(operation: Operation, outcome: Outcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"portfolio_client_operation_total",
			"operation" => operation.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (operation, outcome);
	}
}

/// Records `Success` or `Failure` depending on `result`, then hands it back.
pub fn record_result<T, E>(operation: Operation, result: Result<T, E>) -> Result<T, E> {
	record_outcome(operation, if result.is_ok() { Outcome::Success } else { Outcome::Failure });

	result
}
