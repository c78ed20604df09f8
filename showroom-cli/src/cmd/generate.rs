use std::{collections::HashSet, path::PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueHint};
use showroom_sdk::{
	checksum::Checksum,
	engine::{
		RunState,
		runner::{BatchRunner, DestinationOverride},
	},
	options::{GenerationOptions, LightingMode},
	plugins::driver::DriverSlot,
	queue::WorkUnit,
	services::reporter::Reporter,
};
use showroom_std::{content, drivers, drivers::AssetKind, stamp};
use tokio_util::sync::CancellationToken;

use crate::cli::CliUi;

/// Arguments shared by every asset-generating subcommand.
#[derive(Parser, Default, Debug)]
pub struct Generate {
	/// Installation root holding `cars/` and `tracks/`
	#[arg(long, short = 'r', default_value = ".", value_hint = ValueHint::DirPath)]
	root: PathBuf,
	#[arg(long, help = "A space-separated list of car or track ids to restrict the run to", value_delimiter = ' ', num_args = 1..)]
	ids: Option<Vec<String>>,
	/// TOML preset with generation options
	#[arg(long, short = 'p', value_hint = ValueHint::FilePath)]
	preset: Option<PathBuf>,
	/// Regenerate even when an artifact's stamp is current
	#[arg(long)]
	force: bool,
	/// Render into a session temp directory instead of the content tree
	#[arg(long)]
	temp: bool,
	#[arg(long)]
	width: Option<u32>,
	#[arg(long)]
	height: Option<u32>,
	#[arg(long)]
	iterations: Option<u32>,
	#[arg(long)]
	blur: Option<u32>,
	#[arg(long, value_parser = parse_lighting)]
	lighting: Option<LightingMode>,
}

fn parse_lighting(value: &str) -> Result<LightingMode, String> {
	value.parse()
}

impl Generate {
	async fn options(&self) -> Result<GenerationOptions> {
		let mut options = match &self.preset {
			Some(path) => GenerationOptions::from_preset(path)
				.await
				.with_context(|| format!("could not load preset {}", path.display()))?,
			None => GenerationOptions::default(),
		};
		if let Some(width) = self.width {
			options.width = width;
		}
		if let Some(height) = self.height {
			options.height = height;
		}
		if let Some(iterations) = self.iterations {
			options.iterations = iterations;
		}
		if let Some(blur) = self.blur {
			options.blur = blur;
		}
		if let Some(lighting) = self.lighting {
			options.lighting = lighting;
		}
		options.volatile.temp_destination = self.temp;
		Ok(options)
	}

	pub async fn execute(self, kind: AssetKind) -> Result<()> {
		let options = self.options().await?;
		let checksum = Checksum::compute(&options, false);
		tracing::info!(kind = kind.key(), root = %self.root.display(), %checksum, "Starting generation run");
		let ui = CliUi::new();

		let mut queue = content::scan(&self.root, kind, self.ids.as_deref())?;

		// Staleness is decided here, before anything is queued; the
		// runner regenerates whatever it is handed.
		if !self.force {
			let total_before = queue.unit_count();
			let mut fresh = HashSet::new();
			for item in queue.items() {
				for unit in &item.units {
					if stamp::is_current(&unit.destination, &checksum).await {
						fresh.insert(unit.id.clone());
					}
				}
			}
			queue.retain_units(|unit| !fresh.contains(&unit.id));
			let skipped = total_before - queue.unit_count();
			if skipped > 0 {
				ui.info(&format!("Skipped {skipped} up-to-date artifacts (--force regenerates them)"));
			}
		}

		let cancel = CancellationToken::new();
		let signal = cancel.clone();
		tokio::spawn(async move {
			if tokio::signal::ctrl_c().await.is_ok() {
				tracing::info!("Ctrl-C received; cancelling after the current item");
				signal.cancel();
			}
		});

		let staging_root = if self.temp {
			Some(tempfile::tempdir().context("could not create staging directory")?.keep())
		} else {
			None
		};
		let redirect: Option<Box<DestinationOverride>> = staging_root.clone().map(|base| {
			Box::new(move |unit: &WorkUnit| {
				let file = unit
					.destination
					.file_name()
					.map(PathBuf::from)
					.unwrap_or_else(|| PathBuf::from("artifact"));
				base.join(&unit.id).join(file)
			}) as Box<DestinationOverride>
		});

		let driver = drivers::driver_for(kind);
		let runner = BatchRunner::new(Reporter::new(ui.clone()), cancel);
		let summary = runner
			.run(&queue, &options, DriverSlot::Owned(driver), redirect.as_deref())
			.await?;
		ui.finish();

		// Stamp what landed in the content tree so the next run can skip it.
		if !self.temp {
			for outcome in summary.outcomes.iter().filter(|outcome| outcome.succeeded()) {
				if let Ok(path) = &outcome.result {
					if let Err(error) = stamp::write(path, &checksum).await {
						tracing::warn!(%error, path = %path.display(), "Could not write stamp");
					}
				}
			}
		}

		for outcome in &summary.outcomes {
			if let Err(error) = &outcome.result {
				ui.error(&format!("{}: {error}", outcome.name));
			}
		}
		if let Some(error) = &summary.finalize_error {
			ui.error(&format!("Finalize failed, artifacts may not all be durable: {error}"));
		}
		match summary.state {
			RunState::Completed => ui.success(&format!("{} of {} rendered", summary.succeeded(), summary.total)),
			RunState::Cancelled => ui.warning(&format!("Cancelled: {} of {} rendered", summary.succeeded(), summary.total)),
		}
		if let Some(base) = &staging_root {
			ui.info(&format!("Artifacts staged under {}", base.display()));
		}

		if summary.failed() > 0 || summary.finalize_error.is_some() {
			bail!("{} of {} items failed", summary.failed(), summary.total);
		}
		if summary.state == RunState::Cancelled {
			bail!("run cancelled");
		}
		Ok(())
	}
}
