//! label sets and their construction from url query formatted values
use std::{
	collections::BTreeMap,
	ops::{Deref, DerefMut},
};

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ValidationError};

/// A wrapper around [BTreeMap] mapping label names to label values.
///
/// Used for both the identifying labels and the annotations of an alert. Keys
/// are kept sorted so serialized alerts are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet {
	inner: BTreeMap<String, String>,
}

impl Deref for LabelSet {
	type Target = BTreeMap<String, String>;

	fn deref(&self) -> &Self::Target {
		&self.inner
	}
}

impl DerefMut for LabelSet {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.inner
	}
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LabelSet {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self {
			inner: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
		}
	}
}

impl LabelSet {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}

	/// Checks every label name, returning the first invalid one.
	///
	/// Values are arbitrary unicode and always valid.
	pub fn validate(&self) -> Result<(), ValidationError> {
		match self.inner.keys().find(|name| !is_valid_label_name(name)) {
			Some(name) => Err(ValidationError::InvalidLabel(name.clone())),
			None => Ok(()),
		}
	}
}

/// label names match `[a-zA-Z_][a-zA-Z0-9_]*`
pub fn is_valid_label_name(name: &str) -> bool {
	let mut chars = name.chars();
	match chars.next() {
		Some(first) if first.is_ascii_alphabetic() || first == '_' => {
			chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
		}
		_ => false,
	}
}

/// Builds a [LabelSet] from url query formatted values like `alertname=HighCPU`
/// or `severity=critical&team=infra`.
///
/// Keys of later values overwrite keys of earlier values. A key repeated inside
/// a single value keeps its first occurrence.
///
/// # Arguments
///
/// * `values` - the raw `--label`/`--annotation` arguments
pub fn parse_label_set<S: AsRef<str>>(values: &[S]) -> Result<LabelSet, ParseError> {
	values.iter().try_fold(LabelSet::new(), |mut set, value| {
		set.extend(parse_query(value.as_ref())?);
		Ok(set)
	})
}

/// decodes one query string, `&` and `;` both separate pairs
fn parse_query(query: &str) -> Result<BTreeMap<String, String>, ParseError> {
	let mut pairs = BTreeMap::new();

	for pair in query.split(&['&', ';'][..]).filter(|pair| !pair.is_empty()) {
		let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
		let key = unescape(query, key)?;
		let value = unescape(query, value)?;

		pairs.entry(key).or_insert(value);
	}

	Ok(pairs)
}

/// `+` is a space, escapes have to be well formed and decode to UTF-8
fn unescape(query: &str, component: &str) -> Result<String, ParseError> {
	check_escapes(query, component)?;

	let spaced = component.replace('+', " ");
	percent_decode_str(&spaced)
		.decode_utf8()
		.map(|decoded| decoded.into_owned())
		.map_err(|_| ParseError::InvalidUtf8 {
			query: query.to_owned(),
			component: component.to_owned(),
		})
}

/// [percent_decode_str] passes malformed escapes through verbatim, we reject them
fn check_escapes(query: &str, component: &str) -> Result<(), ParseError> {
	let bytes = component.as_bytes();

	for (i, _) in component.match_indices('%') {
		match bytes.get(i + 1..i + 3) {
			Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {}
			_ => {
				return Err(ParseError::InvalidEscape {
					query: query.to_owned(),
					escape: component[i..].chars().take(3).collect(),
				})
			}
		}
	}

	Ok(())
}
