use chrono::Local;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
	EnvFilter, Layer,
	filter::LevelFilter,
	fmt::{self},
	layer::SubscriberExt,
	util::SubscriberInitExt,
};

pub fn init() -> WorkerGuard {
	// 1. Determine the destination directory for logs.
	let logs_dir = dirs::data_local_dir()
		.unwrap_or_else(|| PathBuf::from("."))
		.join("showroom")
		.join("logs");

	// 2. Create a non-blocking file appender for the current run.
	// Milliseconds in the timestamp keep concurrent runs apart.
	let timestamp = Local::now().format("%Y-%m-%d-%H-%M-%S%.3f");
	let log_file = format!("{timestamp}.log");
	let file_appender = tracing_appender::rolling::never(&logs_dir, log_file);
	let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

	// 3. Full trace to the file, only what RUST_LOG asks for on stderr.
	let file_layer = fmt::layer()
		.with_writer(non_blocking_writer)
		.with_ansi(false)
		.pretty()
		.with_filter(LevelFilter::TRACE);

	let stderr_layer = fmt::layer()
		.with_writer(std::io::stderr)
		.with_target(false)
		.with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")));

	// 4. Combine the layers and initialize the global subscriber.
	tracing_subscriber::registry().with(file_layer).with(stderr_layer).init();

	tracing::debug!("Logging initialized. Log file in: {}", logs_dir.display());

	// 5. Return the guard to the caller.
	guard
}
