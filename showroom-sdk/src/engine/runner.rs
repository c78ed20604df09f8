use std::{
	path::{Path, PathBuf},
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};

use tokio_util::sync::CancellationToken;

use crate::{
	PROJECT_NAME,
	checksum::Checksum,
	engine::outcome::{Outcome, RunState, RunSummary},
	error::RunError,
	options::GenerationOptions,
	plugins::driver::{DriverSlot, ProduceRequest},
	queue::{WorkQueue, WorkUnit},
	services::reporter::Reporter,
};

/// Redirects a unit's output path at run time (e.g. temp-file mode)
/// without touching the queue itself.
pub type DestinationOverride = dyn Fn(&WorkUnit) -> PathBuf + Send + Sync;

/// The orchestrating state machine: steps through the queue in order,
/// drives the render driver one unit at a time, isolates per-unit
/// failures, honors cancellation between units, and always finalizes the
/// driver before returning.
///
/// `run` is an async fn meant to live on a worker task; the caller's
/// control flow stays free to watch for cancellation.
pub struct BatchRunner {
	reporter: Reporter,
	cancel: CancellationToken,
	unit_bias: f64,
}

impl BatchRunner {
	pub fn new(reporter: Reporter, cancel: CancellationToken) -> Self {
		Self {
			reporter,
			cancel,
			unit_bias: 0.5,
		}
	}

	/// Position within a unit's progress step reported while that unit is
	/// in production (0.0 = "about to start", 1.0 = "done").
	pub fn with_unit_bias(mut self, bias: f64) -> Self {
		self.unit_bias = bias.clamp(0.0, 1.0);
		self
	}

	pub async fn run(
		&self,
		queue: &WorkQueue,
		options: &GenerationOptions,
		driver: DriverSlot,
		overrides: Option<&DestinationOverride>,
	) -> Result<RunSummary, RunError> {
		let (driver, owned) = driver.into_parts();
		driver.apply_options(options).await.map_err(RunError::DriverUnavailable)?;

		let total = queue.unit_count();
		let written = Arc::new(AtomicUsize::new(0));
		let mut outcomes: Vec<Outcome> = Vec::with_capacity(total);
		let mut cancelled = false;

		if total > 0 {
			let step = 1.0 / total as f64;
			let tag = format!(
				"{PROJECT_NAME}/{} {}",
				env!("CARGO_PKG_VERSION"),
				Checksum::compute(options, true)
			);

			'items: for item in queue.items() {
				if item.units.is_empty() {
					continue;
				}
				for unit in &item.units {
					if self.cancel.is_cancelled() {
						tracing::info!(unit = %unit.id, "Cancellation observed; stopping before the next unit");
						cancelled = true;
						break 'items;
					}

					let done = outcomes.len() as f64;
					self.reporter
						.report(&format!("Rendering {}", unit.name), (done + self.unit_bias) * step);

					let destination = overrides
						.map(|redirect| redirect(unit))
						.unwrap_or_else(|| unit.destination.clone());
					let request = ProduceRequest {
						source: unit.source.clone(),
						destination: destination.clone(),
						name: unit.name.clone(),
						tag: tag.clone(),
						on_ready: {
							let written = written.clone();
							Arc::new(move |path: &Path| {
								written.fetch_add(1, Ordering::SeqCst);
								tracing::debug!(path = %path.display(), "Artifact durably written");
							})
						},
						cancel: self.cancel.clone(),
					};

					let result = match driver.produce(request).await {
						Ok(()) => Ok(destination),
						Err(error) => {
							tracing::warn!(unit = %unit.id, %error, "Unit failed; continuing with the rest of the batch");
							Err(error)
						}
					};
					outcomes.push(Outcome {
						unit_id: unit.id.clone(),
						name: unit.name.clone(),
						result,
					});
					self.reporter
						.report(&format!("Finished {}", unit.name), outcomes.len() as f64 * step);
				}
			}
		}

		// Finalize no matter how the loop ended: work the driver deferred
		// must complete or fail now, never stay queued.
		let mut finalize_error = driver.flush().await.err();
		if owned {
			if let Err(error) = driver.shutdown().await {
				finalize_error.get_or_insert(error);
			}
		}
		if let Some(error) = &finalize_error {
			tracing::error!(%error, "Finalize failed; artifacts from this run may not all be durable");
		}

		let summary = RunSummary {
			processed: outcomes.len(),
			total,
			written: written.load(Ordering::SeqCst),
			state: if cancelled { RunState::Cancelled } else { RunState::Completed },
			finalize_error,
			outcomes,
		};
		match summary.state {
			RunState::Completed if total == 0 => self.reporter.report("Nothing to generate", 1.0),
			RunState::Completed => self
				.reporter
				.report(&format!("{} of {} rendered", summary.succeeded(), total), 1.0),
			RunState::Cancelled => self.reporter.report(
				&format!("Cancelled: {} of {} rendered", summary.succeeded(), total),
				summary.processed as f64 / total.max(1) as f64,
			),
		}
		Ok(summary)
	}
}
