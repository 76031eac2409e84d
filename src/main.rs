//! prometheus alertmanager client that builds an alert from the command line
//!
//! Features:
//! - labels and annotations given as url query formatted values
//! - validation of label names and the mandatory `alertname` label
//! - prints the alert, or posts it to alertmanager with an optional bearer token
use anyhow::{Context, Result};
use settings::Settings;

mod alert;
mod dispatcher;
mod error;
mod labelset;
mod log;
mod pipeline;
mod settings;
mod timestamp;

#[cfg(test)]
mod testing;

/// the entry point of the program
#[tokio::main(flavor = "current_thread")]
pub async fn main() -> Result<()> {
	let settings = Settings::load().context("failed to load config and command line arguments")?;

	log::setup_logging(&settings.log).context("could not setup logging")?;

	let outcome = pipeline::run(&settings, &mut std::io::stdout())
		.await
		.context("alert command failed")?;

	tracing::info!(?outcome, "done");

	Ok(())
}
