use async_trait::async_trait;
use clap::Parser;
use showroom_std::drivers::AssetKind;

use crate::cmd::{Cmd, generate::Generate};

/// Rasterize track maps from the tracks' recorded centerlines.
#[derive(Parser, Debug)]
pub struct Trackmap {
	#[command(flatten)]
	generate: Generate,
}

#[async_trait]
impl Cmd for Trackmap {
	async fn run(self) -> anyhow::Result<()> {
		self.generate.execute(AssetKind::TrackMap).await
	}
}
