//! Counters and histograms published through the `metrics` facade.
//!
//! `ride_gateway_op_total` carries an `op` label (`request`, `refresh`, or `logout`) and an
//! `outcome` label (`attempt`, `success`, or `failure`). `ride_gateway_refresh_waiters` records
//! how many queued requests each refresh settled.

// self
use crate::obs::{OpKind, Outcome};

/// Records a gateway operation outcome via the global metrics recorder (when enabled).
pub fn record_outcome(kind: OpKind, outcome: Outcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"ride_gateway_op_total",
			"op" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records the size of the queue a leader settled.
pub fn record_refresh_waiters(waiters: usize) {
	#[cfg(feature = "metrics")]
	{
		metrics::histogram!("ride_gateway_refresh_waiters").record(waiters as f64);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = waiters;
	}
}
