use std::fmt::Display;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::options::GenerationOptions;

/// A deterministic fingerprint of one [`GenerationOptions`] snapshot,
/// used to decide whether a previously generated artifact is stale.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Checksum(String);

impl Checksum {
	/// Derives the fingerprint from an options snapshot. Pure and
	/// infallible: identical field values always produce an identical
	/// checksum, byte for byte, across runs and platforms.
	///
	/// Every field that affects rendered output must be folded into the
	/// hasher here; `include_volatile` additionally folds in the
	/// delivery-only flags, for call sites that want the finer
	/// granularity ("what to stamp" vs "is this stale").
	pub fn compute(options: &GenerationOptions, include_volatile: bool) -> Self {
		let mut hasher = Sha256::new();
		hasher.update(b"showroom.fingerprint.v1");
		hasher.update(options.width.to_le_bytes());
		hasher.update(options.height.to_le_bytes());
		hasher.update(options.iterations.to_le_bytes());
		hasher.update(options.blur.to_le_bytes());
		hasher.update(options.lighting.key().as_bytes());
		hasher.update(options.background);
		hasher.update(options.padding.to_le_bytes());
		hasher.update(options.stroke.to_le_bytes());
		if include_volatile {
			let volatile = &options.volatile;
			hasher.update([u8::from(volatile.temp_destination), u8::from(volatile.open_when_done)]);
		}
		Self(format!("{:x}", hasher.finalize()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl Display for Checksum {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::options::LightingMode;
	use pretty_assertions::assert_eq;

	#[test]
	fn identical_snapshots_share_a_checksum() {
		let a = GenerationOptions::default();
		let b = GenerationOptions::default();
		assert_eq!(Checksum::compute(&a, false), Checksum::compute(&b, false));
		assert_eq!(Checksum::compute(&a, true), Checksum::compute(&b, true));
	}

	#[test]
	fn render_affecting_fields_change_the_checksum() {
		let base = GenerationOptions::default();
		let mut changed = base.clone();
		changed.iterations += 1;
		assert_ne!(Checksum::compute(&base, false), Checksum::compute(&changed, false));

		let mut changed = base.clone();
		changed.lighting = LightingMode::Dark;
		assert_ne!(Checksum::compute(&base, false), Checksum::compute(&changed, false));
	}

	#[test]
	fn volatile_flags_only_count_when_asked() {
		let base = GenerationOptions::default();
		let mut delivered_differently = base.clone();
		delivered_differently.volatile.temp_destination = true;

		assert_eq!(
			Checksum::compute(&base, false),
			Checksum::compute(&delivered_differently, false)
		);
		assert_ne!(
			Checksum::compute(&base, true),
			Checksum::compute(&delivered_differently, true)
		);
	}

	#[test]
	fn checksum_is_lowercase_hex() {
		let checksum = Checksum::compute(&GenerationOptions::default(), false);
		assert_eq!(checksum.as_str().len(), 64);
		assert!(checksum.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
	}
}
