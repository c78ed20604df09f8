use async_trait::async_trait;
use clap::{Parser, Subcommand};

use crate::cmd::{preview::Preview, shadows::Shadows, trackmap::Trackmap};

mod generate;
mod preview;
mod shadows;
mod trackmap;

#[derive(Subcommand)]
enum Command {
	Preview(Preview),
	Shadows(Shadows),
	Trackmap(Trackmap),
}

#[derive(Parser)]
#[command(about, author, version)]
pub struct App {
	#[command(subcommand)]
	command: Command,
}

#[async_trait]
pub trait Cmd {
	async fn run(self) -> anyhow::Result<()>;
}

#[async_trait]
impl Cmd for App {
	async fn run(self) -> anyhow::Result<()> {
		match self.command {
			Command::Preview(cmd) => cmd.run().await,
			Command::Shadows(cmd) => cmd.run().await,
			Command::Trackmap(cmd) => cmd.run().await,
		}
	}
}
