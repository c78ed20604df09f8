pub mod preview;
pub mod shadow;
pub mod trackmap;

use std::{
	io::{BufWriter, Write},
	path::Path,
	sync::Arc,
};

use image::{DynamicImage, ImageFormat, codecs::jpeg::JpegEncoder};
use showroom_sdk::{error::Error, plugins::driver::RenderDriver};
use tokio::{sync::Mutex, task::JoinHandle};

use crate::drivers::{preview::PreviewDriver, shadow::ShadowDriver, trackmap::TrackMapDriver};

/// Which derived asset a run produces. Selects the concrete driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
	Preview,
	Shadows,
	TrackMap,
}

impl AssetKind {
	pub fn key(&self) -> &'static str {
		match self {
			AssetKind::Preview => "preview",
			AssetKind::Shadows => "shadows",
			AssetKind::TrackMap => "trackmap",
		}
	}
}

pub fn driver_for(kind: AssetKind) -> Arc<dyn RenderDriver> {
	match kind {
		AssetKind::Preview => Arc::new(PreviewDriver::new()),
		AssetKind::Shadows => Arc::new(ShadowDriver::new()),
		AssetKind::TrackMap => Arc::new(TrackMapDriver::new()),
	}
}

/// Encode-and-write work the drivers defer out of the render path.
///
/// Jobs run on the blocking pool, strictly in submission order (each task
/// awaits its predecessor), so ready callbacks fire in queue order.
/// Failures are parked until the next [`DeferredWrites::settle`].
pub(crate) struct DeferredWrites {
	tail: Mutex<Option<JoinHandle<()>>>,
	failures: Arc<Mutex<Vec<Error>>>,
}

impl DeferredWrites {
	pub(crate) fn new() -> Self {
		Self {
			tail: Mutex::new(None),
			failures: Arc::new(Mutex::new(Vec::new())),
		}
	}

	pub(crate) async fn push<F>(&self, job: F)
	where
		F: FnOnce() -> Result<(), Error> + Send + 'static,
	{
		let mut tail = self.tail.lock().await;
		let previous = tail.take();
		let failures = self.failures.clone();
		*tail = Some(tokio::spawn(async move {
			if let Some(previous) = previous {
				let _ = previous.await;
			}
			match tokio::task::spawn_blocking(job).await {
				Ok(Ok(())) => {}
				Ok(Err(error)) => failures.lock().await.push(error),
				Err(join) => failures.lock().await.push(Error::Background(join.to_string())),
			}
		}));
	}

	/// Awaits everything submitted so far and surfaces the first failure;
	/// the rest are logged.
	pub(crate) async fn settle(&self) -> Result<(), Error> {
		let tail = self.tail.lock().await.take();
		if let Some(tail) = tail {
			let _ = tail.await;
		}
		let mut failures = self.failures.lock().await;
		let mut drained = failures.drain(..);
		match drained.next() {
			None => Ok(()),
			Some(first) => {
				for error in drained {
					tracing::warn!(%error, "Additional deferred write failure");
				}
				Err(first)
			}
		}
	}
}

/// Writes through a temp file in the destination's directory, so a
/// crashed run never leaves a half-written artifact behind.
pub(crate) fn write_atomic<F>(destination: &Path, encode: F) -> Result<(), Error>
where
	F: FnOnce(&mut std::fs::File) -> Result<(), Error>,
{
	let parent = destination.parent().unwrap_or_else(|| Path::new("."));
	let mut staged = tempfile::NamedTempFile::new_in(parent)?;
	encode(staged.as_file_mut())?;
	staged.persist(destination).map_err(|persist| Error::Io(persist.error))?;
	Ok(())
}

pub(crate) fn save_png(destination: &Path, image: &DynamicImage) -> Result<(), Error> {
	write_atomic(destination, |file| {
		let mut writer = BufWriter::new(file);
		image.write_to(&mut writer, ImageFormat::Png)?;
		writer.flush()?;
		Ok(())
	})
}

pub(crate) fn save_jpeg(destination: &Path, image: &DynamicImage, quality: u8) -> Result<(), Error> {
	write_atomic(destination, |file| {
		let mut writer = BufWriter::new(file);
		let encoder = JpegEncoder::new_with_quality(&mut writer, quality);
		image.to_rgb8().write_with_encoder(encoder)?;
		writer.flush()?;
		Ok(())
	})
}
