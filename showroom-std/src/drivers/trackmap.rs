use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use image::{DynamicImage, Rgba, RgbaImage};
use showroom_sdk::{
	error::Error,
	options::GenerationOptions,
	plugins::driver::{ProduceRequest, RenderDriver},
	utils::fs::ensure_parent_dir_exists,
};
use tokio::sync::RwLock;

use crate::drivers::{DeferredWrites, save_png};

const SOURCE_FILE: &str = "data/map.csv";
const OUTLINE_COLOR: Rgba<u8> = Rgba([24, 24, 26, 255]);
const STROKE_COLOR: Rgba<u8> = Rgba([240, 240, 240, 255]);

/// Rasterizes a track's centerline into an outline image: the polyline is
/// scaled to fit the canvas minus `padding`, then stamped twice — a wider
/// dark underlay and the light stroke on top.
pub struct TrackMapDriver {
	options: RwLock<Arc<GenerationOptions>>,
	pending: DeferredWrites,
}

impl TrackMapDriver {
	pub fn new() -> Self {
		Self {
			options: RwLock::new(Arc::new(GenerationOptions::default())),
			pending: DeferredWrites::new(),
		}
	}
}

impl Default for TrackMapDriver {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl RenderDriver for TrackMapDriver {
	async fn produce(&self, request: ProduceRequest) -> Result<(), Error> {
		let options = self.options.read().await.clone();
		tracing::debug!(unit = %request.name, tag = %request.tag, "Rasterizing track map");

		let source = request.source.clone();
		let rendered = tokio::task::spawn_blocking(move || render_map(&options, &source))
			.await
			.map_err(|join| Error::Background(join.to_string()))??;

		ensure_parent_dir_exists(&request.destination).await?;
		let destination = request.destination;
		let on_ready = request.on_ready;
		self.pending
			.push(move || {
				save_png(&destination, &rendered)?;
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

fn render_map(options: &GenerationOptions, source: &Path) -> Result<DynamicImage, Error> {
	let csv = source.join(SOURCE_FILE);
	if !csv.exists() {
		return Err(Error::MissingSource { path: csv });
	}
	let points = parse_centerline(&csv)?;

	let width = options.width.max(64);
	let height = options.height.max(64);
	let stroke = options.stroke.max(1.0);
	let padding = options.padding.max(stroke);

	let (min_x, max_x) = bounds(points.iter().map(|point| point.0));
	let (min_y, max_y) = bounds(points.iter().map(|point| point.1));
	let span_x = (max_x - min_x).max(f32::EPSILON);
	let span_y = (max_y - min_y).max(f32::EPSILON);
	let scale = ((width as f32 - 2.0 * padding) / span_x)
		.min((height as f32 - 2.0 * padding) / span_y)
		.max(f32::EPSILON);
	let offset_x = (width as f32 - span_x * scale) / 2.0 - min_x * scale;
	let offset_y = (height as f32 - span_y * scale) / 2.0 - min_y * scale;
	let projected: Vec<(f32, f32)> = points
		.iter()
		.map(|(x, y)| (x * scale + offset_x, y * scale + offset_y))
		.collect();

	let mut canvas = RgbaImage::new(width, height);
	for (radius, color) in [(stroke * 0.8, OUTLINE_COLOR), (stroke * 0.5, STROKE_COLOR)] {
		for segment in projected.windows(2) {
			draw_segment(&mut canvas, segment[0], segment[1], radius, color);
		}
	}
	Ok(DynamicImage::ImageRgba8(canvas))
}

fn parse_centerline(path: &Path) -> Result<Vec<(f32, f32)>, Error> {
	let invalid = |reason: String| Error::InvalidData {
		path: path.to_path_buf(),
		reason,
	};
	let content = std::fs::read_to_string(path)?;
	let mut points = Vec::new();
	for (index, line) in content.lines().enumerate() {
		let line = line.trim();
		if line.is_empty() || line.starts_with('#') {
			continue;
		}
		let (x, y) = line
			.split_once(',')
			.ok_or_else(|| invalid(format!("line {}: expected `x,y`", index + 1)))?;
		let x = x
			.trim()
			.parse()
			.map_err(|_| invalid(format!("line {}: bad x coordinate", index + 1)))?;
		let y = y
			.trim()
			.parse()
			.map_err(|_| invalid(format!("line {}: bad y coordinate", index + 1)))?;
		points.push((x, y));
	}
	if points.len() < 2 {
		return Err(invalid("a track outline needs at least two points".into()));
	}
	Ok(points)
}

fn bounds(values: impl Iterator<Item = f32>) -> (f32, f32) {
	values.fold((f32::MAX, f32::MIN), |(min, max), value| (min.min(value), max.max(value)))
}

fn draw_segment(canvas: &mut RgbaImage, from: (f32, f32), to: (f32, f32), radius: f32, color: Rgba<u8>) {
	let length = ((to.0 - from.0).powi(2) + (to.1 - from.1).powi(2)).sqrt();
	let steps = (length * 2.0).ceil().max(1.0) as u32;
	for step in 0..=steps {
		let t = step as f32 / steps as f32;
		let x = from.0 + (to.0 - from.0) * t;
		let y = from.1 + (to.1 - from.1) * t;
		stamp_disc(canvas, x, y, radius, color);
	}
}

fn stamp_disc(canvas: &mut RgbaImage, cx: f32, cy: f32, radius: f32, color: Rgba<u8>) {
	let radius = radius.max(0.5);
	let min_x = ((cx - radius).floor() as i64).max(0);
	let max_x = ((cx + radius).ceil() as i64).min(i64::from(canvas.width()) - 1);
	let min_y = ((cy - radius).floor() as i64).max(0);
	let max_y = ((cy + radius).ceil() as i64).min(i64::from(canvas.height()) - 1);
	for y in min_y..=max_y {
		for x in min_x..=max_x {
			let dx = x as f32 - cx;
			let dy = y as f32 - cy;
			if dx * dx + dy * dy <= radius * radius {
				canvas.put_pixel(x as u32, y as u32, color);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use tokio_util::sync::CancellationToken;

	use super::*;

	fn track_with_centerline(dir: &Path, content: &str) {
		let data = dir.join("data");
		std::fs::create_dir_all(&data).unwrap();
		std::fs::write(data.join("map.csv"), content).unwrap();
	}

	fn request(dir: &Path) -> ProduceRequest {
		ProduceRequest {
			source: dir.to_path_buf(),
			destination: dir.join("map.png"),
			name: "monza".into(),
			tag: "showroom/test".into(),
			on_ready: Arc::new(|_| {}),
			cancel: CancellationToken::new(),
		}
	}

	#[tokio::test]
	async fn rasterizes_an_outline() {
		let dir = tempfile::tempdir().unwrap();
		track_with_centerline(dir.path(), "0,0\n100,0\n100,50\n0,50\n0,0\n");

		let driver = TrackMapDriver::new();
		let options = GenerationOptions {
			width: 128,
			height: 128,
			..Default::default()
		};
		driver.apply_options(&options).await.unwrap();
		driver.produce(request(dir.path())).await.unwrap();
		driver.flush().await.unwrap();

		let map = image::open(dir.path().join("map.png")).unwrap().to_rgba8();
		assert_eq!((map.width(), map.height()), (128, 128));
		// the stroke must have landed somewhere
		assert!(map.pixels().any(|pixel| pixel.0[3] > 0));
	}

	#[tokio::test]
	async fn malformed_centerline_fails_the_unit() {
		let dir = tempfile::tempdir().unwrap();
		track_with_centerline(dir.path(), "0,0\nnot-a-number,5\n");

		let driver = TrackMapDriver::new();
		let result = driver.produce(request(dir.path())).await;
		assert!(matches!(result, Err(Error::InvalidData { .. })));
	}

	#[tokio::test]
	async fn missing_centerline_fails_the_unit() {
		let dir = tempfile::tempdir().unwrap();
		let driver = TrackMapDriver::new();
		let result = driver.produce(request(dir.path())).await;
		assert!(matches!(result, Err(Error::MissingSource { .. })));
	}
}
