// crates.io
use tracing::{Span, instrument::Instrumented};
// self
use crate::{_prelude::*, grant::GrantType};

/// Span wrapper used by relay operations.
#[derive(Clone, Debug)]
pub struct RelaySpan {
	span: Span,
}
impl RelaySpan {
	/// Creates a new span tagged with the provided grant + stage.
	pub fn new(grant: GrantType, stage: &'static str) -> Self {
		let span = tracing::info_span!("dropbox_token_relay.grant", grant = grant.as_str(), stage);

		Self { span }
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		use tracing::Instrument;

		fut.instrument(self.span.clone())
	}
}
