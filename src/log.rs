//! tracing setup, everything is written to stderr
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing_subscriber::{
	filter::LevelFilter, fmt, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
	EnvFilter,
};

/// log settings, `level` is one of error, warn, info, debug or trace
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogSettings {
	pub level: String,
}

impl Default for LogSettings {
	fn default() -> Self {
		Self { level: String::from("warn") }
	}
}

/// installs the global subscriber, logs go to stderr so stdout only carries
/// the alert or the response status
pub fn setup_logging(settings: &LogSettings) -> Result<()> {
	let level = tracing::Level::from_str(settings.level.as_str())
		.with_context(|| format!("invalid log level {:?}", settings.level))?;

	let fmt_layer = fmt::layer().with_writer(std::io::stderr);

	let filter_layer = EnvFilter::default()
		.add_directive(LevelFilter::from_level(level).into())
		.add_directive("hyper=warn".parse()?)
		.add_directive("reqwest=warn".parse()?);

	tracing_subscriber::registry()
		.with(filter_layer)
		.with(fmt_layer)
		.try_init()
		.context("a global subscriber is already installed")?;

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unknown_level_is_rejected() {
		let settings = LogSettings { level: String::from("loud") };
		assert!(setup_logging(&settings).is_err());
	}
}
