use std::path::PathBuf;

use crate::error::Error;

/// The per-unit result of one run. Created when a unit completes or
/// fails, appended to the run's summary, never mutated afterwards.
#[derive(Debug)]
pub struct Outcome {
	pub unit_id: String,
	pub name: String,
	/// The destination the artifact was produced at, or the captured error.
	pub result: Result<PathBuf, Error>,
}

impl Outcome {
	pub fn succeeded(&self) -> bool {
		self.result.is_ok()
	}
}

/// Terminal state of a run. Cancellation is not an error; per-unit
/// failures do not affect this state (a run with failed units still
/// completes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
	Completed,
	Cancelled,
}

/// Everything the caller gets back from one run.
#[derive(Debug)]
pub struct RunSummary {
	/// Per-unit outcomes, in queue order.
	pub outcomes: Vec<Outcome>,
	pub state: RunState,
	/// Units the runner got to before completing or being cancelled.
	pub processed: usize,
	/// Units the queue held when the run started.
	pub total: usize,
	/// Artifacts confirmed durably written by driver callbacks.
	pub written: usize,
	/// A failed finalize (flush or shutdown) lands here; the outcomes
	/// collected before it are preserved above.
	pub finalize_error: Option<Error>,
}

impl RunSummary {
	pub fn succeeded(&self) -> usize {
		self.outcomes.iter().filter(|outcome| outcome.succeeded()).count()
	}

	pub fn failed(&self) -> usize {
		self.outcomes.len() - self.succeeded()
	}

	/// True when every unit ran, none failed, and finalize went through.
	pub fn is_clean(&self) -> bool {
		self.state == RunState::Completed && self.failed() == 0 && self.finalize_error.is_none()
	}
}
