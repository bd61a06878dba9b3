use bon::Builder;
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use ustr::{Ustr, ustr};

use crate::{
    Result,
    models::{Interval, Range},
};

pub const DEFAULT_CHART_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Where and how often the widget pulls its series.
#[derive(Debug, Clone, PartialEq, Builder, Deserialize, Serialize)]
#[serde(default)]
pub struct FeedConfig {
    #[builder(into, default = ustr("SPY"))]
    pub symbol: Ustr,
    #[builder(default)]
    pub interval: Interval,
    #[builder(default)]
    pub range: Range,
    #[builder(into, default = DEFAULT_CHART_BASE_URL.to_string())]
    pub base_url: String,
    #[builder(default = Duration::from_secs(5 * 60))]
    pub refresh_interval: Duration,
    #[builder(default = Duration::from_secs(30))]
    pub request_timeout: Duration,
    /// Without a policy a failed fetch ends the refresh chain.
    pub retry: Option<RetryPolicy>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Builder, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryPolicy {
    #[builder(default = Duration::from_millis(500))]
    pub initial_interval: Duration,
    #[builder(default = Duration::from_secs(30))]
    pub max_interval: Duration,
    #[builder(default = Duration::from_secs(2 * 60))]
    pub max_elapsed: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Clone, PartialEq, Builder, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewConfig {
    #[builder(default = 75.0)]
    pub fov: f32,
    #[builder(default = 0.1)]
    pub near: f32,
    #[builder(default = 1000.0)]
    pub far: f32,
    #[builder(default = 5.0)]
    pub camera_distance: f32,
    #[builder(default = 0.05)]
    pub damping_factor: f32,
    #[builder(default = 0x4299E1)]
    pub point_color: u32,
    #[builder(default = [0.26, 0.6, 0.89])]
    pub vertex_color: [f32; 3],
    #[builder(default = 0.05)]
    pub point_size: f32,
    #[builder(default = 0.8)]
    pub point_opacity: f32,
    #[builder(default = 0x4299E1)]
    pub line_color: u32,
    #[builder(default = 0.5)]
    pub line_opacity: f32,
    #[builder(default = Duration::from_secs(20))]
    pub rotation_period: Duration,
    /// Display refresh tick driving the render loop.
    #[builder(default = Duration::from_micros(16_667))]
    pub frame_interval: Duration,
    #[builder(default = [0, 0, 0, 0])]
    pub clear_color: [u8; 4],
    #[builder(default = 0xffffff)]
    pub ambient_color: u32,
    #[builder(default = 0.5)]
    pub ambient_intensity: f32,
    #[builder(default = 0xffffff)]
    pub directional_color: u32,
    #[builder(default = 0.5)]
    pub directional_intensity: f32,
    #[builder(default = [0.0, 1.0, 1.0])]
    pub directional_position: [f32; 3],
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Identifiers and styling of the two summary labels.
#[derive(Debug, Clone, PartialEq, Builder, Deserialize, Serialize)]
#[serde(default)]
pub struct LabelConfig {
    #[builder(into, default = ustr("current-price"))]
    pub price_label: Ustr,
    #[builder(into, default = ustr("price-change"))]
    pub change_label: Ustr,
    #[builder(into, default = ustr("#48bb78"))]
    pub positive_color: Ustr,
    #[builder(into, default = ustr("#f56565"))]
    pub negative_color: Ustr,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Builder, Deserialize, Serialize)]
#[serde(default)]
pub struct WidgetConfig {
    #[builder(default)]
    pub feed: FeedConfig,
    #[builder(default)]
    pub view: ViewConfig,
    #[builder(default)]
    pub labels: LabelConfig,
}

impl WidgetConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// One derivative written by the export pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Deserialize, Serialize)]
pub struct ExportTarget {
    #[builder(into)]
    pub path: PathBuf,
    pub max_width: u32,
    pub quality: u8,
    #[builder(default = true)]
    #[serde(default = "default_progressive")]
    pub progressive: bool,
}

fn default_progressive() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Builder, Deserialize, Serialize)]
pub struct ExportConfig {
    #[builder(into)]
    pub input: PathBuf,
    /// Written in order; a failure skips every later target.
    pub targets: Vec<ExportTarget>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        let output_dir = Path::new("assets").join("images");
        Self {
            input: PathBuf::from("/Applications/HKU/Z5/Exported/未命名导出/DSC_2223.jpg"),
            targets: vec![
                ExportTarget::builder()
                    .path(output_dir.join("background.jpg"))
                    .max_width(1920)
                    .quality(80)
                    .build(),
                ExportTarget::builder()
                    .path(output_dir.join("background-mobile.jpg"))
                    .max_width(800)
                    .quality(70)
                    .build(),
            ],
        }
    }
}

impl ExportConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_defaults() {
        let feed = FeedConfig::default();
        assert_eq!(feed.symbol.as_str(), "SPY");
        assert_eq!(feed.interval, Interval::FiveMinutes);
        assert_eq!(feed.range, Range::OneDay);
        assert_eq!(feed.refresh_interval, Duration::from_secs(300));
        assert!(feed.retry.is_none());
    }

    #[test]
    fn test_export_defaults() {
        let config = ExportConfig::default();
        assert_eq!(config.targets.len(), 2);
        assert_eq!(config.targets[0].max_width, 1920);
        assert_eq!(config.targets[0].quality, 80);
        assert_eq!(config.targets[1].max_width, 800);
        assert_eq!(config.targets[1].quality, 70);
        assert!(config.targets.iter().all(|t| t.progressive));
        assert!(config.targets[1].path.ends_with("background-mobile.jpg"));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: WidgetConfig =
            serde_json::from_str(r#"{"feed":{"symbol":"QQQ"},"labels":{"price_label":"px"}}"#)
                .unwrap();
        assert_eq!(config.feed.symbol.as_str(), "QQQ");
        assert_eq!(config.feed.base_url, DEFAULT_CHART_BASE_URL);
        assert_eq!(config.labels.price_label.as_str(), "px");
        assert_eq!(config.labels.change_label.as_str(), "price-change");
        assert_eq!(config.view.fov, 75.0);
    }

    #[test]
    fn test_builder_overrides() {
        let feed = FeedConfig::builder()
            .symbol("AAPL")
            .refresh_interval(Duration::from_secs(60))
            .retry(RetryPolicy::default())
            .build();
        assert_eq!(feed.symbol.as_str(), "AAPL");
        assert_eq!(feed.refresh_interval, Duration::from_secs(60));
        assert!(feed.retry.is_some());
    }
}
