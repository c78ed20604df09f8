use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for everything the pipeline and its drivers can do.
#[derive(Error, Debug)]
pub enum Error {
	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Image(#[from] image::ImageError),

	#[error("Error encoding stamp or fingerprint")]
	Json(#[from] serde_json::Error),

	#[error("Error in preset file: {0}")]
	Preset(#[from] toml::de::Error),

	#[error("Missing source data: {path:?}")]
	MissingSource { path: PathBuf },

	#[error("Invalid source data in {path:?}: {reason}")]
	InvalidData { path: PathBuf, reason: String },

	#[error("Renderer rejected {name}: {reason}")]
	Render { name: String, reason: String },

	#[error("Deferred write failed: {0}")]
	Background(String),

	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

/// Run-level failures, distinct from per-item failures which are recorded
/// in the run's outcomes and never escape `BatchRunner::run`.
#[derive(Error, Debug)]
pub enum RunError {
	#[error("The render driver could not be configured")]
	DriverUnavailable(#[source] Error),
}
