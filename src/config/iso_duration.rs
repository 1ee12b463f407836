//! ISO-8601 durations (`PT1S`, `PT2.5S`, `PT1M30S`, `P1DT2H`) for the config file.

use std::fmt;
use std::time::Duration;

/// A duration string that is not a supported ISO-8601 duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsoDurationError(pub String);

impl fmt::Display for IsoDurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid ISO-8601 duration: {}", self.0)
    }
}

impl std::error::Error for IsoDurationError {}

/// Parses `P[nD][T[nH][nM][n[.n]S]]`. Signs are rejected; only seconds may
/// carry a fraction.
pub fn parse(text: &str) -> Result<Duration, IsoDurationError> {
    let err = || IsoDurationError(text.to_string());
    let upper = text.trim().to_ascii_uppercase();
    let body = upper.strip_prefix('P').ok_or_else(err)?;

    let (date_part, time_part) = match body.split_once('T') {
        Some((date, time)) if !time.is_empty() => (date, Some(time)),
        Some(_) => return Err(err()),
        None => (body, None),
    };

    let mut total = Duration::ZERO;
    let mut components = 0;

    if !date_part.is_empty() {
        let days = date_part.strip_suffix('D').ok_or_else(err)?;
        total = add_units(total, days, 86_400).ok_or_else(err)?;
        components += 1;
    }

    if let Some(mut rest) = time_part {
        // Units must appear in order, each at most once
        for (unit, seconds_per_unit) in [('H', 3_600u64), ('M', 60)] {
            if let Some((value, tail)) = rest.split_once(unit) {
                total = add_units(total, value, seconds_per_unit).ok_or_else(err)?;
                rest = tail;
                components += 1;
            }
        }
        if !rest.is_empty() {
            let seconds = rest.strip_suffix('S').ok_or_else(err)?;
            total = total.checked_add(parse_seconds(seconds).ok_or_else(err)?).ok_or_else(err)?;
            components += 1;
        }
    }

    if components == 0 {
        return Err(err());
    }
    Ok(total)
}

/// Formats a duration as `PT<seconds>S`, keeping only significant fraction digits.
pub fn format(duration: Duration) -> String {
    let nanos = duration.subsec_nanos();
    if nanos == 0 {
        return format!("PT{}S", duration.as_secs());
    }
    let fraction = format!("{:09}", nanos);
    format!("PT{}.{}S", duration.as_secs(), fraction.trim_end_matches('0'))
}

/// `total + value * seconds_per_unit`, or `None` on overflow or a malformed value.
fn add_units(total: Duration, value: &str, seconds_per_unit: u64) -> Option<Duration> {
    let secs = parse_whole(value)?.checked_mul(seconds_per_unit)?;
    total.checked_add(Duration::from_secs(secs))
}

fn parse_whole(value: &str) -> Option<u64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

fn parse_seconds(value: &str) -> Option<Duration> {
    let (whole, fraction) = match value.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (value, None),
    };
    let secs = parse_whole(whole)?;
    let nanos = match fraction {
        None => 0,
        Some(digits) => {
            if digits.is_empty() || digits.len() > 9 || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            format!("{:0<9}", digits).parse::<u32>().ok()?
        }
    };
    Some(Duration::new(secs, nanos))
}

/// `#[serde(with = "iso_duration::option")]` for `Option<Duration>` fields.
pub mod option {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_some(&super::format(*duration)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(text) => super::parse(&text).map(Some).map_err(D::Error::custom),
            None => Ok(None),
        }
    }
}
