//! error kinds of the alert pipeline
use thiserror::Error;
use url::Url;

use crate::timestamp::TIMESTAMP_LAYOUT;

/// malformed label/annotation query strings or timestamps
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
	/// a `%` which isn't followed by two hex digits
	#[error("invalid URL escape {escape:?} in {query:?}")]
	InvalidEscape { query: String, escape: String },
	/// an escaped label name or value which isn't UTF-8
	#[error("{component:?} in {query:?} doesn't decode to valid UTF-8")]
	InvalidUtf8 { query: String, component: String },
	#[error("timestamp {input:?} doesn't match layout {}", TIMESTAMP_LAYOUT)]
	InvalidTimestamp { input: String },
}

/// structurally invalid alert
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
	#[error("invalid label name {0:?}")]
	InvalidLabel(String),
	#[error("'alertname' label must be set")]
	MissingAlertName,
}

/// everything that can abort an invocation, first failure wins
#[derive(Error, Debug)]
pub enum Error {
	#[error(transparent)]
	Parse(#[from] ParseError),
	#[error(transparent)]
	Validation(#[from] ValidationError),
	#[error("failed to construct http client")]
	Client(#[source] reqwest::Error),
	#[error("failed to send alert to {url}")]
	Transport {
		url: Url,
		#[source]
		source: reqwest::Error,
	},
	#[error("failed to serialize alert")]
	Serialize(#[from] serde_json::Error),
	#[error("failed to write output")]
	Output(#[from] std::io::Error),
}
