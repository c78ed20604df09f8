use async_trait::async_trait;
use clap::Parser;
use showroom_std::drivers::AssetKind;

use crate::cmd::{Cmd, generate::Generate};

/// Generate skin preview images for cars in the content tree.
#[derive(Parser, Debug)]
pub struct Preview {
	#[command(flatten)]
	generate: Generate,
}

#[async_trait]
impl Cmd for Preview {
	async fn run(self) -> anyhow::Result<()> {
		self.generate.execute(AssetKind::Preview).await
	}
}
