use console::{Emoji, style};
use indicatif::{ProgressBar, ProgressStyle};
use showroom_sdk::services::reporter::ui::ProgressSink;
use std::sync::Arc;

/// Bar resolution; the runner reports fractions, indicatif wants ticks.
const SCALE: u64 = 10_000;

/// The CLI-specific progress sink: a single indicatif bar fed by the
/// runner's fractional reports, plus styled one-off messages for the
/// final summary.
pub struct CliUi {
	bar: ProgressBar,
}

impl CliUi {
	pub fn new() -> Arc<Self> {
		let bar = ProgressBar::new(SCALE);
		bar.set_style(
			ProgressStyle::with_template("{wide_msg} {percent:>3}% [{bar:40.cyan/blue}]")
				.unwrap()
				.progress_chars("=>-"),
		);
		Arc::new(Self { bar })
	}

	/// Clears the bar; call before printing the run summary.
	pub fn finish(&self) {
		self.bar.finish_and_clear();
	}

	pub fn success(&self, message: &str) {
		println!("{} {}", style(Emoji("✔", "✓")).green(), message);
	}

	pub fn info(&self, message: &str) {
		println!("{} {}", style(Emoji("ℹ", "i")).blue(), message);
	}

	pub fn warning(&self, message: &str) {
		println!("{} {}", style(Emoji("⚠", "!")).yellow(), message);
	}

	pub fn error(&self, message: &str) {
		eprintln!("{} {}", style(Emoji("✖", "X")).red(), style(message).red());
	}
}

impl ProgressSink for CliUi {
	fn report(&self, message: &str, fraction: Option<f64>) {
		match fraction {
			Some(fraction) => self.bar.set_position((fraction.clamp(0.0, 1.0) * SCALE as f64) as u64),
			None => self.bar.tick(),
		}
		self.bar.set_message(message.to_string());
	}
}
