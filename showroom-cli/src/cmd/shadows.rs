use async_trait::async_trait;
use clap::Parser;
use showroom_std::drivers::AssetKind;

use crate::cmd::{Cmd, generate::Generate};

/// Bake ambient-occlusion ground shadows for cars in the content tree.
#[derive(Parser, Debug)]
pub struct Shadows {
	#[command(flatten)]
	generate: Generate,
}

#[async_trait]
impl Cmd for Shadows {
	async fn run(self) -> anyhow::Result<()> {
		self.generate.execute(AssetKind::Shadows).await
	}
}
