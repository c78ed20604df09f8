use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use image::{DynamicImage, GrayImage, Rgba, RgbaImage, imageops, imageops::FilterType};
use showroom_sdk::{
	error::Error,
	options::GenerationOptions,
	plugins::driver::{ProduceRequest, RenderDriver},
	utils::fs::ensure_parent_dir_exists,
};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::drivers::{DeferredWrites, save_png};

/// Baked shadow textures are square, matching the UV layout the game
/// expects regardless of preview resolution.
const SHADOW_SIZE: u32 = 512;
const BODY_MASK: &str = "data/body_mask.png";
const WHEEL_MASK: &str = "data/wheel_mask.png";
const WHEEL_COUNT: usize = 4;

/// Bakes ambient-occlusion ground shadows from a car's body mask:
/// repeated gaussian passes (`blur`) soften the silhouette, `iterations`
/// deepens the occlusion. Honors cancellation between blur passes, so a
/// long bake can be aborted early.
pub struct ShadowDriver {
	options: RwLock<Arc<GenerationOptions>>,
	pending: DeferredWrites,
}

impl ShadowDriver {
	pub fn new() -> Self {
		Self {
			options: RwLock::new(Arc::new(GenerationOptions::default())),
			pending: DeferredWrites::new(),
		}
	}
}

impl Default for ShadowDriver {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl RenderDriver for ShadowDriver {
	async fn produce(&self, request: ProduceRequest) -> Result<(), Error> {
		let options = self.options.read().await.clone();
		tracing::debug!(unit = %request.name, tag = %request.tag, "Baking shadows");

		let source = request.source.clone();
		let name = request.name.clone();
		let cancel = request.cancel.clone();
		let (body, wheels) = tokio::task::spawn_blocking(move || render_shadows(&options, &source, &name, &cancel))
			.await
			.map_err(|join| Error::Background(join.to_string()))??;

		ensure_parent_dir_exists(&request.destination).await?;
		let destination = request.destination;
		let on_ready = request.on_ready;
		self.pending
			.push(move || {
				save_png(&destination, &DynamicImage::ImageRgba8(body))?;
				if let Some(wheel) = wheels {
					let parent = destination.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
					let wheel = DynamicImage::ImageRgba8(wheel);
					for index in 0..WHEEL_COUNT {
						save_png(&parent.join(format!("tyre_{index}_shadow.png")), &wheel)?;
					}
				}
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

type BakedShadows = (RgbaImage, Option<RgbaImage>);

fn render_shadows(
	options: &GenerationOptions,
	source: &Path,
	name: &str,
	cancel: &CancellationToken,
) -> Result<BakedShadows, Error> {
	let body_mask = source.join(BODY_MASK);
	if !body_mask.exists() {
		return Err(Error::MissingSource { path: body_mask });
	}

	let opacity = (0.5 + options.iterations as f32 * 0.1).min(0.9);
	let body = bake(image::open(&body_mask)?.to_luma8(), options.blur, opacity, name, cancel)?;

	let wheel_mask = source.join(WHEEL_MASK);
	let wheels = if wheel_mask.exists() {
		Some(bake(image::open(&wheel_mask)?.to_luma8(), options.blur, opacity, name, cancel)?)
	} else {
		None
	};

	Ok((body, wheels))
}

fn bake(mask: GrayImage, blur_passes: u32, opacity: f32, name: &str, cancel: &CancellationToken) -> Result<RgbaImage, Error> {
	let mut mask = imageops::resize(&mask, SHADOW_SIZE, SHADOW_SIZE, FilterType::Triangle);
	for _ in 0..blur_passes {
		if cancel.is_cancelled() {
			return Err(Error::Render {
				name: name.to_string(),
				reason: "shadow bake aborted by cancellation".into(),
			});
		}
		mask = imageops::blur(&mask, 2.5);
	}

	let mut shadow = RgbaImage::new(SHADOW_SIZE, SHADOW_SIZE);
	for (mask_pixel, shadow_pixel) in mask.pixels().zip(shadow.pixels_mut()) {
		let alpha = (f32::from(mask_pixel.0[0]) * opacity) as u8;
		*shadow_pixel = Rgba([0, 0, 0, alpha]);
	}
	Ok(shadow)
}
