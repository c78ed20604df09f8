use std::{
	path::{Path, PathBuf},
	sync::Arc,
};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{error::Error, options::GenerationOptions};

/// Invoked by a driver at most once per produced artifact, only after the
/// artifact has been durably written to its destination.
pub type ReadyCallback = Arc<dyn Fn(&Path) + Send + Sync>;

/// Everything a driver needs to produce one artifact.
pub struct ProduceRequest {
	/// Directory holding the unit's source data.
	pub source: PathBuf,
	/// Final resting place of the artifact, overrides already applied.
	pub destination: PathBuf,
	/// Display name, used in error reports.
	pub name: String,
	/// Provenance string embedded into whatever the driver writes
	/// alongside the artifact. Carries the run's checksum.
	pub tag: String,
	pub on_ready: ReadyCallback,
	/// Drivers may honor this mid-render for an early abort; ignoring it
	/// is allowed and merely bounds cancellation latency by the slowest
	/// single render.
	pub cancel: CancellationToken,
}

/// The stateful offscreen renderer behind the pipeline. One driver
/// instance renders one artifact at a time; the runner never issues a
/// second `produce` before the first has returned.
///
/// Drivers may defer part of the work internally (encoding, disk writes);
/// `flush` awaits all of it. Concrete implementations live in
/// `showroom-std` and are selected by asset kind at construction time.
#[async_trait]
pub trait RenderDriver: Send + Sync {
	/// Renders one artifact. A returned error means this unit failed;
	/// it never aborts the batch.
	async fn produce(&self, request: ProduceRequest) -> Result<(), Error>;

	/// Waits until all internally deferred work has completed or failed.
	async fn flush(&self) -> Result<(), Error>;

	/// Applies a new options snapshot without discarding work already in
	/// flight under the previous one.
	async fn apply_options(&self, options: &GenerationOptions) -> Result<(), Error>;

	/// Releases the renderer. Pending work is awaited first, so calling
	/// this with renders still queued is safe.
	async fn shutdown(&self) -> Result<(), Error> {
		self.flush().await
	}
}

/// Who is responsible for shutting the driver down once the run ends.
/// A run exclusively owns the driver either way; `Borrowed` only means
/// disposal stays with the caller.
pub enum DriverSlot {
	Owned(Arc<dyn RenderDriver>),
	Borrowed(Arc<dyn RenderDriver>),
}

impl DriverSlot {
	pub(crate) fn into_parts(self) -> (Arc<dyn RenderDriver>, bool) {
		match self {
			DriverSlot::Owned(driver) => (driver, true),
			DriverSlot::Borrowed(driver) => (driver, false),
		}
	}
}
