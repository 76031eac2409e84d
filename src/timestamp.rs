//! the fixed timestamp layout alerts are built and serialized with
use chrono::{DateTime, NaiveDateTime, TimeZone, Timelike, Utc};
use serde::{de, Deserialize, Deserializer, Serializer};
use serde_with::{DeserializeAs, SerializeAs};

use crate::error::ParseError;

/// human readable form of the only accepted layout, millisecond precision UTC
pub const TIMESTAMP_LAYOUT: &str = "YYYY-MM-DDTHH:MM:SS.mmmZ";

/// strftime form of [TIMESTAMP_LAYOUT]
const FORMAT: &str = "%Y-%m-%dT%H:%M:%S.%3fZ";

/// Parses a timestamp in [TIMESTAMP_LAYOUT].
///
/// An empty string means no time bound was given and yields `None`.
pub fn parse_timestamp(input: &str) -> Result<Option<DateTime<Utc>>, ParseError> {
	if input.is_empty() {
		return Ok(None);
	}

	let invalid = || ParseError::InvalidTimestamp { input: input.to_owned() };

	// chrono accepts single digit fields and leap seconds, the layout doesn't
	if !matches_layout(input) {
		return Err(invalid());
	}

	let time = NaiveDateTime::parse_from_str(input, FORMAT).map_err(|_| invalid())?;
	if time.nanosecond() >= 1_000_000_000 {
		return Err(invalid());
	}

	Ok(Some(Utc.from_utc_datetime(&time)))
}

/// Formats `time` in [TIMESTAMP_LAYOUT].
pub fn format_timestamp(time: &DateTime<Utc>) -> String {
	time.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// checks digits and separators position by position
fn matches_layout(input: &str) -> bool {
	input.len() == TIMESTAMP_LAYOUT.len()
		&& input
			.bytes()
			.zip(TIMESTAMP_LAYOUT.bytes())
			.all(|(c, l)| match l {
				b'Y' | b'M' | b'D' | b'H' | b'S' | b'm' => c.is_ascii_digit(),
				_ => c == l,
			})
}

/// [serde_with] adapter putting [DateTime] on the wire in [TIMESTAMP_LAYOUT]
pub struct AlertTime;

impl SerializeAs<DateTime<Utc>> for AlertTime {
	fn serialize_as<S>(source: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&format_timestamp(source))
	}
}

impl<'de> DeserializeAs<'de, DateTime<Utc>> for AlertTime {
	fn deserialize_as<D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
	where
		D: Deserializer<'de>,
	{
		let input = String::deserialize(deserializer)?;
		parse_timestamp(&input)
			.map_err(de::Error::custom)?
			.ok_or_else(|| de::Error::custom("empty timestamp"))
	}
}

#[cfg(test)]
mod tests {
	use chrono::NaiveDate;

	use super::*;

	fn utc(ymd: (i32, u32, u32), h: u32, m: u32, s: u32, milli: u32) -> DateTime<Utc> {
		let time = NaiveDate::from_ymd_opt(ymd.0, ymd.1, ymd.2)
			.and_then(|date| date.and_hms_milli_opt(h, m, s, milli))
			.unwrap();
		Utc.from_utc_datetime(&time)
	}

	#[test]
	fn empty_input_is_no_bound() {
		assert_eq!(parse_timestamp(""), Ok(None));
	}

	#[test]
	fn parses_millisecond_utc() {
		let parsed = parse_timestamp("2020-01-02T03:04:05.000Z").unwrap();
		assert_eq!(parsed, Some(utc((2020, 1, 2), 3, 4, 5, 0)));

		let parsed = parse_timestamp("1999-12-31T23:59:59.123Z").unwrap();
		assert_eq!(parsed, Some(utc((1999, 12, 31), 23, 59, 59, 123)));
	}

	#[test]
	fn rejects_other_layouts() {
		for input in [
			"2020-01-02",
			"2020-01-02T03:04:05Z",
			"2020-01-02T03:04:05.0Z",
			"2020-01-02T03:04:05.000000Z",
			"2020-01-02T03:04:05.000",
			"2020-01-02T03:04:05.000+00:00",
			"2020-01-02 03:04:05.000Z",
			"2020-1-02T03:04:05.000Z",
			"2020-13-02T03:04:05.000Z",
			"2020-02-30T03:04:05.000Z",
			"2020-01-02T24:04:05.000Z",
			"2020-01-02T23:59:60.000Z",
			" 2020-01-02T03:04:05.000Z",
		] {
			assert_eq!(
				parse_timestamp(input),
				Err(ParseError::InvalidTimestamp { input: input.to_owned() }),
				"{input}"
			);
		}
	}

	#[test]
	fn formats_with_milliseconds() {
		let time = utc((2020, 1, 2), 3, 4, 5, 60);
		assert_eq!(format_timestamp(&time), "2020-01-02T03:04:05.060Z");

		let time = utc((2020, 1, 2), 3, 4, 5, 0);
		assert_eq!(parse_timestamp(&format_timestamp(&time)).unwrap(), Some(time));
	}
}
