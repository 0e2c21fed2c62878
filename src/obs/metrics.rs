// self
use crate::{grant::GrantType, obs::RelayOutcome};

/// Bumps `dropbox_token_relay_grant_total{grant, outcome}`; compiled out without `metrics`.
pub fn record_grant_outcome(grant: GrantType, outcome: RelayOutcome) {
	#[cfg(feature = "metrics")]
	{
		let grant = grant.as_str();
		let outcome = outcome.as_str();

		metrics::counter!("dropbox_token_relay_grant_total", "grant" => grant, "outcome" => outcome)
			.increment(1);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = (grant, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn every_outcome_records_without_a_global_recorder() {
		for outcome in
			[RelayOutcome::Attempt, RelayOutcome::Passthrough, RelayOutcome::Rejected, RelayOutcome::Unreachable]
		{
			record_grant_outcome(GrantType::RefreshToken, outcome);
		}
	}
}
