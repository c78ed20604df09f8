use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use showroom_sdk::{PROJECT_NAME, checksum::Checksum, error::Error};

/// The sidecar persisted next to each generated artifact. Lets a later
/// run decide the artifact is current and skip it before anything is
/// queued.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Stamp {
	pub checksum: Checksum,
	pub tool: String,
}

pub fn sidecar_path(artifact: &Path) -> PathBuf {
	let mut path = artifact.as_os_str().to_owned();
	path.push(".stamp");
	PathBuf::from(path)
}

pub async fn write(artifact: &Path, checksum: &Checksum) -> Result<(), Error> {
	let stamp = Stamp {
		checksum: checksum.clone(),
		tool: format!("{PROJECT_NAME}/{}", env!("CARGO_PKG_VERSION")),
	};
	let encoded = serde_json::to_vec_pretty(&stamp)?;
	tokio::fs::write(sidecar_path(artifact), encoded).await?;
	Ok(())
}

/// True when the artifact exists and its stamp matches `checksum`.
/// A missing, unreadable, or malformed stamp means "stale".
pub async fn is_current(artifact: &Path, checksum: &Checksum) -> bool {
	if !tokio::fs::try_exists(artifact).await.unwrap_or(false) {
		return false;
	}
	let Ok(encoded) = tokio::fs::read(sidecar_path(artifact)).await else {
		return false;
	};
	match serde_json::from_slice::<Stamp>(&encoded) {
		Ok(stamp) => stamp.checksum == *checksum,
		Err(_) => false,
	}
}

#[cfg(test)]
mod tests {
	use showroom_sdk::options::GenerationOptions;

	use super::*;

	#[tokio::test]
	async fn stamped_artifacts_are_current() {
		let dir = tempfile::tempdir().unwrap();
		let artifact = dir.path().join("preview.jpg");
		tokio::fs::write(&artifact, b"jpeg bytes").await.unwrap();

		let checksum = Checksum::compute(&GenerationOptions::default(), false);
		write(&artifact, &checksum).await.unwrap();

		assert!(is_current(&artifact, &checksum).await);
	}

	#[tokio::test]
	async fn changed_options_invalidate_the_stamp() {
		let dir = tempfile::tempdir().unwrap();
		let artifact = dir.path().join("preview.jpg");
		tokio::fs::write(&artifact, b"jpeg bytes").await.unwrap();

		let checksum = Checksum::compute(&GenerationOptions::default(), false);
		write(&artifact, &checksum).await.unwrap();

		let mut changed = GenerationOptions::default();
		changed.iterations += 1;
		let other = Checksum::compute(&changed, false);
		assert!(!is_current(&artifact, &other).await);
	}

	#[tokio::test]
	async fn missing_artifact_is_stale_even_with_a_stamp() {
		let dir = tempfile::tempdir().unwrap();
		let artifact = dir.path().join("preview.jpg");

		let checksum = Checksum::compute(&GenerationOptions::default(), false);
		// stamp exists, artifact does not
		tokio::fs::write(sidecar_path(&artifact), b"{}").await.unwrap();
		assert!(!is_current(&artifact, &checksum).await);
	}

	#[tokio::test]
	async fn malformed_stamps_mean_stale() {
		let dir = tempfile::tempdir().unwrap();
		let artifact = dir.path().join("preview.jpg");
		tokio::fs::write(&artifact, b"jpeg bytes").await.unwrap();
		tokio::fs::write(sidecar_path(&artifact), b"not json").await.unwrap();

		let checksum = Checksum::compute(&GenerationOptions::default(), false);
		assert!(!is_current(&artifact, &checksum).await);
	}
}
