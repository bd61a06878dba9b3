use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use ustr::Ustr;

use crate::{Error, Result};

/// One plotted observation of the intraday series.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PricePoint {
    /// Local wall-clock time of the bar, `HH:MM`.
    pub time: String,
    pub price: f64,
    /// Bar open time in epoch seconds.
    pub timestamp: i64,
}

impl PricePoint {
    pub fn new(timestamp: i64, price: f64) -> Self {
        Self {
            time: format_local_time(timestamp),
            price,
            timestamp,
        }
    }
}

pub fn format_local_time(timestamp: i64) -> String {
    match DateTime::from_timestamp(timestamp, 0) {
        Some(utc) => utc.with_timezone(&Local).format("%H:%M").to_string(),
        None => String::from("--:--"),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartEnvelope {
    pub chart: ChartResponse,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResponse {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ChartError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartError {
    pub code: Ustr,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    #[serde(default)]
    pub indicators: Indicators,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    #[serde(default)]
    pub symbol: Option<Ustr>,
    #[serde(default)]
    pub currency: Option<Ustr>,
    #[serde(default)]
    pub regular_market_price: Option<f64>,
    #[serde(default)]
    pub exchange_timezone_name: Option<Ustr>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteBars>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteBars {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

impl ChartEnvelope {
    /// Takes the first chart result, surfacing the api's own error object when present.
    pub fn into_result(self) -> Result<ChartResult> {
        if let Some(err) = self.chart.error {
            return Err(Error::ChartApi {
                code: err.code,
                description: err.description,
            });
        }
        self.chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or(Error::NoChartResult)
    }
}

impl ChartResult {
    /// Zips timestamps with closing prices, skipping bars with no close.
    pub fn price_points(&self) -> Result<Vec<PricePoint>> {
        let closes: &[Option<f64>] = self
            .indicators
            .quote
            .first()
            .map(|q| q.close.as_slice())
            .unwrap_or_default();

        if self.timestamp.is_empty() && closes.is_empty() {
            return Ok(vec![]);
        }
        if self.timestamp.len() != closes.len() {
            return Err(Error::MisalignedSeries {
                timestamps: self.timestamp.len(),
                closes: closes.len(),
            });
        }

        Ok(self
            .timestamp
            .iter()
            .zip(closes)
            .filter_map(|(&ts, close)| close.map(|price| PricePoint::new(ts, price)))
            .collect())
    }
}
