//! parse -> validate -> dispatch, the first failure aborts the invocation
use std::io::Write;

use crate::{
	alert::Alert,
	dispatcher::{Dispatcher, Outcome},
	error::Error,
	labelset::parse_label_set,
	settings::{AlertArgs, Settings},
	timestamp::parse_timestamp,
};

/// Builds the alert from the raw arguments and validates it.
pub fn build_alert(args: &AlertArgs) -> Result<Alert, Error> {
	let alert = Alert {
		labels: parse_label_set(&args.labels)?,
		annotations: parse_label_set(&args.annotations)?,
		starts_at: parse_timestamp(&args.starts_at)?,
		ends_at: parse_timestamp(&args.ends_at)?,
		generator_url: String::new(),
	};

	alert.validate()?;

	Ok(alert)
}

/// Runs one invocation, the alert or the response status ends up in `out`.
pub async fn run<W: Write>(settings: &Settings, out: &mut W) -> Result<Outcome, Error> {
	let alert = build_alert(&settings.alert)?;
	tracing::debug!(?alert, "built alert");

	Dispatcher::from_settings(settings)?.dispatch(&alert, out).await
}
