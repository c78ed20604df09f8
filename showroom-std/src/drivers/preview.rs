use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use image::{DynamicImage, Rgba, RgbaImage, imageops, imageops::FilterType};
use showroom_sdk::{
	error::Error,
	options::{GenerationOptions, LightingMode},
	plugins::driver::{ProduceRequest, RenderDriver},
	utils::fs::ensure_parent_dir_exists,
};
use tokio::sync::RwLock;

use crate::drivers::{DeferredWrites, save_jpeg};

const JPEG_QUALITY: u8 = 92;
const SOURCE_FILE: &str = "livery.png";

/// Produces skin preview images by compositing the skin's livery plate
/// onto a studio canvas, supersampled by `iterations` and downscaled
/// with Lanczos. Pixel work runs on the blocking pool; encoding and the
/// durable write are deferred until `flush`.
pub struct PreviewDriver {
	options: RwLock<Arc<GenerationOptions>>,
	pending: DeferredWrites,
}

impl PreviewDriver {
	pub fn new() -> Self {
		Self {
			options: RwLock::new(Arc::new(GenerationOptions::default())),
			pending: DeferredWrites::new(),
		}
	}
}

impl Default for PreviewDriver {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl RenderDriver for PreviewDriver {
	async fn produce(&self, request: ProduceRequest) -> Result<(), Error> {
		let options = self.options.read().await.clone();
		tracing::debug!(unit = %request.name, tag = %request.tag, "Rendering preview");

		let source = request.source.clone();
		let rendered = tokio::task::spawn_blocking(move || render_preview(&options, &source))
			.await
			.map_err(|join| Error::Background(join.to_string()))??;

		ensure_parent_dir_exists(&request.destination).await?;
		let destination = request.destination;
		let on_ready = request.on_ready;
		self.pending
			.push(move || {
				save_jpeg(&destination, &rendered, JPEG_QUALITY)?;
				on_ready(&destination);
				Ok(())
			})
			.await;
		Ok(())
	}

	async fn flush(&self) -> Result<(), Error> {
		self.pending.settle().await
	}

	async fn apply_options(&self, options: &GenerationOptions) -> Result<(), Error> {
		*self.options.write().await = Arc::new(options.clone());
		Ok(())
	}
}

fn render_preview(options: &GenerationOptions, source: &Path) -> Result<DynamicImage, Error> {
	let livery = source.join(SOURCE_FILE);
	if !livery.exists() {
		return Err(Error::MissingSource { path: livery });
	}
	let subject = image::open(&livery)?;

	let supersample = options.iterations.clamp(1, 4);
	let out_width = options.width.max(16);
	let out_height = options.height.max(16);
	let width = out_width * supersample;
	let height = out_height * supersample;

	let [r, g, b] = options.background;
	let mut canvas = RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255]));

	let margin = (height / 8).min(width / 4);
	let subject = subject
		.resize(width - margin * 2, height - margin * 2, FilterType::Lanczos3)
		.to_rgba8();
	let x = (width - subject.width()) / 2;
	let y = (height - subject.height()) / 2;
	imageops::overlay(&mut canvas, &subject, i64::from(x), i64::from(y));

	let canvas = match options.lighting {
		LightingMode::Studio => canvas,
		LightingMode::Sunny => imageops::brighten(&canvas, 16),
		LightingMode::Dark => imageops::brighten(&canvas, -48),
	};

	Ok(DynamicImage::ImageRgba8(canvas).resize_exact(out_width, out_height, FilterType::Lanczos3))
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicBool, Ordering};

	use tokio_util::sync::CancellationToken;

	use super::*;

	#[tokio::test]
	async fn renders_a_preview_at_the_configured_size() {
		let dir = tempfile::tempdir().unwrap();
		let skin = dir.path().join("skins/red");
		std::fs::create_dir_all(&skin).unwrap();
		RgbaImage::from_pixel(16, 16, Rgba([200, 20, 20, 255]))
			.save(skin.join("livery.png"))
			.unwrap();

		let driver = PreviewDriver::new();
		let options = GenerationOptions {
			width: 64,
			height: 36,
			iterations: 1,
			..Default::default()
		};
		driver.apply_options(&options).await.unwrap();

		let destination = skin.join("preview.jpg");
		let ready = Arc::new(AtomicBool::new(false));
		let flag = ready.clone();
		driver
			.produce(ProduceRequest {
				source: skin.clone(),
				destination: destination.clone(),
				name: "car/red".into(),
				tag: "showroom/test".into(),
				on_ready: Arc::new(move |_| flag.store(true, Ordering::SeqCst)),
				cancel: CancellationToken::new(),
			})
			.await
			.unwrap();
		driver.flush().await.unwrap();

		assert!(ready.load(Ordering::SeqCst));
		let produced = image::open(&destination).unwrap();
		assert_eq!((produced.width(), produced.height()), (64, 36));
	}

	#[tokio::test]
	async fn missing_livery_fails_the_unit() {
		let dir = tempfile::tempdir().unwrap();
		let driver = PreviewDriver::new();

		let result = driver
			.produce(ProduceRequest {
				source: dir.path().to_path_buf(),
				destination: dir.path().join("preview.jpg"),
				name: "car/red".into(),
				tag: "showroom/test".into(),
				on_ready: Arc::new(|_| {}),
				cancel: CancellationToken::new(),
			})
			.await;

		assert!(matches!(result, Err(Error::MissingSource { .. })));
		driver.flush().await.unwrap();
	}
}
