//! the alert we send to alertmanager
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::{error::ValidationError, labelset::LabelSet, timestamp::AlertTime};

/// name of the label every alert has to carry
pub const ALERTNAME: &str = "alertname";

/// A generic representation of an alert in the prometheus eco-system, shaped
/// like the alerts alertmanager accepts on its api.
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
	/// Label value pairs for purpose of aggregation, matching, and disposition
	/// dispatching. This must minimally include an "alertname" label.
	pub labels: LabelSet,

	/// Extra key/value information which does not define alert identity.
	#[serde(default, skip_serializing_if = "LabelSet::is_empty")]
	pub annotations: LabelSet,

	/// The known time range for this alert. Both ends are optional.
	#[serde_as(as = "Option<AlertTime>")]
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub starts_at: Option<DateTime<Utc>>,
	#[serde_as(as = "Option<AlertTime>")]
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub ends_at: Option<DateTime<Utc>>,

	#[serde(rename = "generatorURL", default, skip_serializing_if = "String::is_empty")]
	pub generator_url: String,
}

impl Alert {
	/// Validates labels, the presence of [ALERTNAME] and the annotations, in
	/// that order.
	pub fn validate(&self) -> Result<(), ValidationError> {
		self.labels.validate()?;

		if !self.labels.contains_key(ALERTNAME) {
			return Err(ValidationError::MissingAlertName);
		}

		self.annotations.validate()
	}
}
