pub mod chart;

use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub use chart::{ChartEnvelope, ChartError, ChartMeta, ChartResponse, ChartResult, PricePoint};

#[derive(Debug, Default, Clone, Deserialize, Serialize, Copy, PartialEq, Eq, Hash)]
pub enum Interval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "2m")]
    TwoMinutes,
    #[default]
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "60m")]
    OneHour,
    #[serde(rename = "1d")]
    OneDay,
}

impl Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Interval::OneMinute => write!(f, "1m"),
            Interval::TwoMinutes => write!(f, "2m"),
            Interval::FiveMinutes => write!(f, "5m"),
            Interval::FifteenMinutes => write!(f, "15m"),
            Interval::ThirtyMinutes => write!(f, "30m"),
            Interval::OneHour => write!(f, "60m"),
            Interval::OneDay => write!(f, "1d"),
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize, Serialize, Copy, PartialEq, Eq, Hash)]
pub enum Range {
    #[default]
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "5d")]
    FiveDays,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "ytd")]
    YearToDate,
}

impl Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Range::OneDay => write!(f, "1d"),
            Range::FiveDays => write!(f, "5d"),
            Range::OneMonth => write!(f, "1mo"),
            Range::ThreeMonths => write!(f, "3mo"),
            Range::YearToDate => write!(f, "ytd"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_values() {
        assert_eq!(Interval::default().to_string(), "5m");
        assert_eq!(Range::default().to_string(), "1d");
        assert_eq!(Interval::OneHour.to_string(), "60m");
        assert_eq!(Range::YearToDate.to_string(), "ytd");
    }

    #[test]
    fn test_serde_matches_display() {
        let interval: Interval = serde_json::from_str(r#""15m""#).unwrap();
        assert_eq!(interval, Interval::FifteenMinutes);
        assert_eq!(serde_json::to_string(&Range::OneMonth).unwrap(), r#""1mo""#);
    }
}
