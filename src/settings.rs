//! command line arguments, an optional config file and the environment,
//! merged into one [Settings] value per invocation
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use config::Config;
use serde::{de, Deserialize, Deserializer};
use serde_with::{serde_as, DurationSecondsWithFrac};
use url::Url;

use crate::log::LogSettings;

/// prefix of environment variables overriding the config file, e.g.
/// `AMCLIENT_TARGET_URL` or `AMCLIENT_LOG__LEVEL`
const ENV_PREFIX: &str = "AMCLIENT";

/// the raw alert arguments, parsed later by the pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertArgs {
	pub labels: Vec<String>,
	pub annotations: Vec<String>,
	/// empty if not given
	pub starts_at: String,
	/// empty if not given
	pub ends_at: String,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
	/// where to send the alert, printed if unset
	#[serde(default, deserialize_with = "non_empty_url")]
	pub target_url: Option<Url>,
	/// bearer token, only used together with `target_url`
	#[serde(default)]
	pub token: Option<String>,
	/// request timeout, the transport default if unset
	#[serde_as(as = "Option<DurationSecondsWithFrac<f64>>")]
	#[serde(default)]
	pub timeout: Option<Duration>,
	#[serde(default)]
	pub log: LogSettings,
	#[serde(skip)]
	pub alert: AlertArgs,
}

impl Settings {
	/// Loads the settings from the process arguments, exits with a usage
	/// message if they are malformed.
	pub fn load() -> Result<Self> {
		Self::from_matches(&command().get_matches(), environment())
	}

	#[cfg(test)]
	pub fn try_from_args<I, T>(args: I) -> Result<Self>
	where
		I: IntoIterator<Item = T>,
		T: Into<std::ffi::OsString> + Clone,
	{
		Self::try_from_args_with_env(args, environment())
	}

	/// like [Settings::try_from_args] but reading variables from `env`
	#[cfg(test)]
	fn try_from_args_with_env<I, T>(args: I, env: config::Environment) -> Result<Self>
	where
		I: IntoIterator<Item = T>,
		T: Into<std::ffi::OsString> + Clone,
	{
		let matches = command()
			.try_get_matches_from(args)
			.context("invalid command line arguments")?;

		Self::from_matches(&matches, env)
	}

	fn from_matches(opts: &ArgMatches, env: config::Environment) -> Result<Self> {
		let opts = opts
			.subcommand_matches("alert")
			.context("missing alert subcommand")?;

		let mut conf = Config::builder();
		if let Some(config_path) = opts.value_of("config") {
			conf = conf.add_source(config::File::with_name(config_path));
		}
		let conf = conf
			.add_source(env)
			.build()
			.context("can't load config")?;

		let mut settings: Settings = conf.try_deserialize().context("can't load config")?;

		if let Some(level) = opts.value_of("level") {
			settings.log.level = level.to_string();
		}

		if let Some(target_url) = opts.value_of("targetURL") {
			settings.target_url = parse_target_url(target_url)?;
		}

		if let Some(token) = opts.value_of("token") {
			settings.token = Some(token.to_string());
		}
		settings.token = settings.token.filter(|token| !token.is_empty());

		let values = |name: &str| -> Vec<String> {
			opts.values_of(name)
				.map(|values| values.map(String::from).collect())
				.unwrap_or_default()
		};

		settings.alert = AlertArgs {
			labels: values("label"),
			annotations: values("annotation"),
			starts_at: opts.value_of("startsAt").unwrap_or_default().to_string(),
			ends_at: opts.value_of("endsAt").unwrap_or_default().to_string(),
		};

		Ok(settings)
	}
}

/// variables like `AMCLIENT_TOKEN`, nested keys separated by `__`
fn environment() -> config::Environment {
	config::Environment::with_prefix(ENV_PREFIX)
		.prefix_separator("_")
		.separator("__")
}

fn command() -> Command<'static> {
	Command::new(clap::crate_name!())
		.version(clap::crate_version!())
		.about(clap::crate_description!())
		.author(clap::crate_authors!())
		.subcommand_required(true)
		.arg_required_else_help(true)
		.args(&[
			Arg::new("config")
				.help("path of config file")
				.takes_value(true)
				.short('c')
				.long("config")
				.global(true),
			Arg::new("level")
				.help("log level")
				.possible_values(["Error", "Warn", "Info", "Debug", "Trace"])
				.ignore_case(true)
				.takes_value(true)
				.long("log")
				.global(true),
		])
		.subcommand(
			Command::new("alert")
				.about("build an alert, then print it or send it to alertmanager")
				.args(&[
					Arg::new("label")
						.help("labels; url query formatted values. 'alertname' one of the labels")
						.takes_value(true)
						.multiple_occurrences(true)
						.required(true)
						.short('l')
						.long("label"),
					Arg::new("annotation")
						.help("annotations; url query formatted values")
						.takes_value(true)
						.multiple_occurrences(true)
						.short('a')
						.long("annotation"),
					Arg::new("startsAt")
						.help("starts at, e.g. 2006-01-02T15:04:05.000Z")
						.takes_value(true)
						.short('s')
						.long("startsAt"),
					Arg::new("endsAt")
						.help("ends at, e.g. 2006-01-02T15:04:05.000Z")
						.takes_value(true)
						.short('e')
						.long("endsAt"),
					Arg::new("targetURL")
						.help("the target url to send the alert to, the alert is printed if omitted")
						.takes_value(true)
						.short('t')
						.long("targetURL"),
					Arg::new("token")
						.help("bearer token sent along with the alert")
						.takes_value(true)
						.long("token"),
				]),
		)
}

/// an empty url means no target
fn parse_target_url(url: &str) -> Result<Option<Url>> {
	if url.is_empty() {
		return Ok(None);
	}

	Url::parse(url)
		.map(Some)
		.with_context(|| format!("invalid target url {url:?}"))
}

fn non_empty_url<'de, D>(deserializer: D) -> Result<Option<Url>, D::Error>
where
	D: Deserializer<'de>,
{
	Option::<String>::deserialize(deserializer)?
		.map_or(Ok(None), |url| parse_target_url(&url))
		.map_err(de::Error::custom)
}
