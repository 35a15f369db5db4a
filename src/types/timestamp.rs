use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Timestamp of a bar: the wall-clock time as written, plus the UTC offset
/// when the input carried one (`2015-01-02 09:15:00+05:30`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timestamp {
    datetime: NaiveDateTime,
    offset: Option<FixedOffset>,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid timestamp: {0:?}")]
pub struct TimestampParseError(pub String);

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%:z"];

impl Timestamp {
    pub fn new(datetime: NaiveDateTime) -> Self {
        Self {
            datetime,
            offset: None,
        }
    }

    pub fn with_offset(datetime: DateTime<FixedOffset>) -> Self {
        Self {
            datetime: datetime.naive_local(),
            offset: Some(*datetime.offset()),
        }
    }

    /// Wall-clock time, without the offset.
    pub fn naive_local(&self) -> NaiveDateTime {
        self.datetime
    }

    pub fn offset(&self) -> Option<FixedOffset> {
        self.offset
    }
}

impl FromStr for Timestamp {
    type Err = TimestampParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self::with_offset(dt));
        }
        for format in OFFSET_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(s, format) {
                return Ok(Self::with_offset(dt));
            }
        }
        for format in NAIVE_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
                return Ok(Self::new(dt));
            }
        }

        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(Self::new)
            .ok_or_else(|| TimestampParseError(s.to_string()))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.datetime.format("%Y-%m-%dT%H:%M:%S%.f"))?;
        match self.offset {
            Some(offset) => write!(f, "{}", offset),
            None => Ok(()),
        }
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(datetime: NaiveDateTime) -> Self {
        Self::new(datetime)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> String {
        s.parse::<Timestamp>().unwrap().to_string()
    }

    #[test]
    fn test_parse_iso_naive() {
        assert_eq!(ts("2024-02-19T10:30:00"), "2024-02-19T10:30:00");
        assert_eq!(ts("2024-02-19 10:30:00"), "2024-02-19T10:30:00");
    }

    #[test]
    fn test_parse_date_only_is_midnight() {
        assert_eq!(ts("2024-02-01"), "2024-02-01T00:00:00");
    }

    #[test]
    fn test_parse_offset_keeps_wall_clock_and_offset() {
        assert_eq!(ts("2015-01-02 09:15:00+05:30"), "2015-01-02T09:15:00+05:30");
        assert_eq!(ts("2015-01-02T09:15:00+05:30"), "2015-01-02T09:15:00+05:30");
        assert_eq!(ts("2015-01-02T09:15:00Z"), "2015-01-02T09:15:00+00:00");

        let stamp: Timestamp = "2015-01-02 09:15:00+05:30".parse().unwrap();
        assert_eq!(stamp.naive_local().to_string(), "2015-01-02 09:15:00");
        assert_eq!(stamp.offset(), FixedOffset::east_opt(5 * 3600 + 30 * 60));
    }

    #[test]
    fn test_naive_input_has_no_offset() {
        let stamp: Timestamp = "2024-02-19T10:30:00".parse().unwrap();
        assert_eq!(stamp.offset(), None);
    }

    #[test]
    fn test_offset_survives_serde() {
        let stamp: Timestamp = serde_json::from_str("\"2015-01-02T09:15:00+05:30\"").unwrap();
        assert_eq!(
            serde_json::to_string(&stamp).unwrap(),
            "\"2015-01-02T09:15:00+05:30\""
        );
    }

    #[test]
    fn test_parse_fractional_seconds() {
        assert_eq!(ts("2024-02-19T10:30:00.250"), "2024-02-19T10:30:00.250");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("yesterday".parse::<Timestamp>().is_err());
        assert!("".parse::<Timestamp>().is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let stamp: Timestamp = serde_json::from_str("\"2024-02-19T10:30:00\"").unwrap();
        assert_eq!(serde_json::to_string(&stamp).unwrap(), "\"2024-02-19T10:30:00\"");
    }
}
