//! Observability helpers for relayed grants.
//!
//! # Feature Flags
//!
//! - Spans named `dropbox_token_relay.grant` carry the `grant` and `stage` (call site) fields.
//! - Enable `metrics` to increment the `dropbox_token_relay_grant_total` counter for every
//!   attempt/passthrough/rejection/unreachable outcome, labeled by `grant` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each relayed grant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RelayOutcome {
	/// A well-formed request is about to be forwarded.
	Attempt,
	/// The upstream response was relayed to the caller, whatever its status.
	Passthrough,
	/// The inbound body was malformed; upstream was not contacted.
	Rejected,
	/// The token endpoint could not be reached.
	Unreachable,
}
impl RelayOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RelayOutcome::Attempt => "attempt",
			RelayOutcome::Passthrough => "passthrough",
			RelayOutcome::Rejected => "rejected",
			RelayOutcome::Unreachable => "unreachable",
		}
	}
}
impl Display for RelayOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
