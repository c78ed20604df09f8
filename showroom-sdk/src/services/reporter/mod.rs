pub mod ui;

use std::sync::Arc;

use crate::services::reporter::ui::ProgressSink;

/// A service for forwarding progress updates to whatever the caller
/// subscribed, mirroring each update into the log.
#[derive(Clone)]
pub struct Reporter {
	sink: Arc<dyn ProgressSink>,
}

impl Reporter {
	pub fn new(sink: Arc<dyn ProgressSink>) -> Self {
		Self { sink }
	}

	pub fn report(&self, message: &str, fraction: f64) {
		self.sink.report(message, Some(fraction));
		tracing::debug!(progress = fraction, "{message}");
	}

	pub fn indeterminate(&self, message: &str) {
		self.sink.report(message, None);
		tracing::debug!("{message}");
	}
}
