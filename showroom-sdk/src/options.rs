use std::{path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Scene lighting applied by the preview drivers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LightingMode {
	#[default]
	Studio,
	Sunny,
	Dark,
}

impl LightingMode {
	pub fn key(&self) -> &'static str {
		match self {
			LightingMode::Studio => "studio",
			LightingMode::Sunny => "sunny",
			LightingMode::Dark => "dark",
		}
	}
}

impl FromStr for LightingMode {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"studio" => Ok(LightingMode::Studio),
			"sunny" => Ok(LightingMode::Sunny),
			"dark" => Ok(LightingMode::Dark),
			other => Err(format!("unknown lighting mode: {other}")),
		}
	}
}

/// Flags that change how artifacts are delivered or what the tool does
/// afterwards, but never the rendered pixels. Folded into the checksum
/// only on request (see [`crate::checksum::Checksum::compute`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct VolatileOptions {
	/// Redirect artifacts into a session temp directory instead of the
	/// content tree.
	pub temp_destination: bool,
	/// Reveal the output directory once the run finishes.
	pub open_when_done: bool,
}

/// A configuration snapshot for one run. Owned by the caller and read-only
/// for the duration of the run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GenerationOptions {
	/// Output width of preview images, in pixels.
	pub width: u32,
	/// Output height of preview images, in pixels.
	pub height: u32,
	/// Supersampling factor for previews and accumulation passes for shadows.
	pub iterations: u32,
	/// Blur passes applied to baked shadow textures.
	pub blur: u32,
	pub lighting: LightingMode,
	/// Canvas background as RGB.
	pub background: [u8; 3],
	/// Margin around track outlines, in output pixels.
	pub padding: f32,
	/// Stroke width of track outlines, in output pixels.
	pub stroke: f32,
	pub volatile: VolatileOptions,
}

impl Default for GenerationOptions {
	fn default() -> Self {
		Self {
			width: 1024,
			height: 576,
			iterations: 2,
			blur: 3,
			lighting: LightingMode::default(),
			background: [28, 28, 30],
			padding: 32.0,
			stroke: 10.0,
			volatile: VolatileOptions::default(),
		}
	}
}

impl GenerationOptions {
	/// Loads a snapshot from a TOML preset file. Unspecified fields fall
	/// back to their defaults.
	pub async fn from_preset(path: &Path) -> Result<Self, Error> {
		let content = tokio::fs::read_to_string(path).await?;
		Ok(toml::from_str(&content)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn preset_falls_back_to_defaults() {
		let options: GenerationOptions = toml::from_str("iterations = 8").unwrap();
		assert_eq!(options.iterations, 8);
		assert_eq!(options.width, GenerationOptions::default().width);
		assert_eq!(options.volatile, VolatileOptions::default());
	}

	#[test]
	fn lighting_parses_case_insensitively() {
		assert_eq!("Sunny".parse::<LightingMode>().unwrap(), LightingMode::Sunny);
		assert!("noon".parse::<LightingMode>().is_err());
	}
}
