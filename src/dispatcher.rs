//! Prints the alert or hands it to alertmanager.
//!
//! Exactly one delivery attempt is made, failures are reported to the caller
//! and never retried.
use std::{io::Write, time::Duration};

use http::StatusCode;
use url::Url;

use crate::{alert::Alert, error::Error, settings::Settings};

/// what happened to the alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
	/// serialized to the output
	Printed,
	/// posted, with the status the target answered
	Delivered(StatusCode),
}

#[derive(Debug, Clone)]
pub enum Dispatcher {
	/// no target configured
	Print,
	Send {
		client: reqwest::Client,
		url: Url,
		token: Option<String>,
	},
}

impl Dispatcher {
	pub fn from_settings(settings: &Settings) -> Result<Self, Error> {
		match &settings.target_url {
			Some(url) => Self::send(url.clone(), settings.token.clone(), settings.timeout),
			None => {
				if settings.token.is_some() {
					tracing::debug!("no target url configured, ignoring token");
				}
				Ok(Self::Print)
			}
		}
	}

	/// Constructs a dispatcher posting to `url`.
	///
	/// # Arguments
	///
	/// * `token` - sent as bearer credential if present
	///
	/// * `timeout` - whole request timeout, the transport default if `None`
	pub fn send(url: Url, token: Option<String>, timeout: Option<Duration>) -> Result<Self, Error> {
		let mut builder = reqwest::Client::builder();
		if let Some(timeout) = timeout {
			builder = builder.timeout(timeout);
		}
		let client = builder.build().map_err(Error::Client)?;

		Ok(Self::Send { client, url, token })
	}

	/// Writes the serialized alert or the response status of the target to
	/// `out`.
	pub async fn dispatch<W: Write>(&self, alert: &Alert, out: &mut W) -> Result<Outcome, Error> {
		match self {
			Self::Print => {
				let body = serde_json::to_string(alert)?;
				writeln!(out, "{body}")?;

				Ok(Outcome::Printed)
			}
			Self::Send { client, url, token } => {
				let mut request = client.post(url.clone()).json(alert);
				if let Some(token) = token {
					request = request.bearer_auth(token);
				}

				tracing::debug!(%url, "sending alert");

				let response = request
					.send()
					.await
					.map_err(|source| Error::Transport { url: url.clone(), source })?;

				let status = response.status();
				if !status.is_success() {
					tracing::warn!(%url, %status, "alert was not accepted");
				}

				writeln!(out, "{}", status.as_u16())?;

				Ok(Outcome::Delivered(status))
			}
		}
	}
}
