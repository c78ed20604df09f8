/// An abstract sink for progress updates. Consumers that drive a UI must
/// marshal onto their own presentation thread; updates are delivered in
/// the order the runner issued them.
pub trait ProgressSink: Send + Sync {
	/// `fraction` is in `0.0..=1.0`; `None` means indeterminate.
	fn report(&self, message: &str, fraction: Option<f64>);
}

/// Discards every report. Useful for headless callers and tests.
pub struct NullSink;

impl ProgressSink for NullSink {
	fn report(&self, _message: &str, _fraction: Option<f64>) {}
}
