use crate::cmd::{App, Cmd};
use anyhow::Result;
use clap::Parser;
mod cli;
mod cmd;
mod logging;

#[tokio::main]
async fn main() -> Result<()> {
	let _guard = logging::init();
	let app: App = App::parse();
	app.run().await
}
