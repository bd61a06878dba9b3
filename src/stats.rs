use tracing::warn;

use crate::{config::LabelConfig, models::PricePoint, surface::Labels};

/// Latest price and session change of the displayed series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceStats {
    pub current: f64,
    pub first: f64,
    /// Percentage change rounded to two decimals.
    pub change_percent: f64,
}

impl PriceStats {
    /// `None` for an empty series or one whose first price cannot be divided by.
    pub fn from_points(points: &[PricePoint]) -> Option<Self> {
        let first = points.first()?.price;
        let current = points.last()?.price;
        if first == 0.0 || !first.is_finite() || !current.is_finite() {
            return None;
        }
        let raw = (current - first) / first * 100.0;
        let mut change_percent = (raw * 100.0).round() / 100.0;
        // Rounding a small loss can leave -0.0, which would print as "-0.00".
        if change_percent == 0.0 {
            change_percent = 0.0;
        }
        Some(Self {
            current,
            first,
            change_percent,
        })
    }

    /// Zero counts as a gain.
    pub fn is_gain(&self) -> bool {
        self.change_percent >= 0.0
    }

    pub fn change_fixed(&self) -> String {
        format!("{:.2}", self.change_percent)
    }

    pub fn price_text(&self) -> String {
        format!("${:.2}", self.current)
    }

    pub fn change_text(&self) -> String {
        format!("{}%", self.change_fixed())
    }

    pub fn apply(&self, labels: &dyn Labels, config: &LabelConfig) {
        labels.set_text(config.price_label, &self.price_text());
        labels.set_text(config.change_label, &self.change_text());
        let color = if self.is_gain() {
            config.positive_color
        } else {
            config.negative_color
        };
        labels.set_color(config.change_label, color);
    }
}

pub fn refresh_stats(
    points: &[PricePoint],
    labels: &dyn Labels,
    config: &LabelConfig,
) -> Option<PriceStats> {
    // The empty case is already reported by the geometry rebuild.
    if points.is_empty() {
        return None;
    }
    let Some(stats) = PriceStats::from_points(points) else {
        warn!("No usable prices for summary stats, labels left unchanged.");
        return None;
    };
    stats.apply(labels, config);
    Some(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::LabelBoard;

    fn series(prices: &[f64]) -> Vec<PricePoint> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &price)| PricePoint::new(i as i64 * 300, price))
            .collect()
    }

    #[test]
    fn test_rise() {
        let stats = PriceStats::from_points(&series(&[100.0, 110.0])).unwrap();
        assert_eq!(stats.change_fixed(), "10.00");
        assert!(stats.is_gain());
    }

    #[test]
    fn test_fall_selects_negative_color() {
        let board = LabelBoard::new();
        let config = LabelConfig::default();
        let stats = refresh_stats(&series(&[100.0, 90.0]), &board, &config).unwrap();
        assert_eq!(stats.change_fixed(), "-10.00");

        let change = board.get("price-change").unwrap();
        assert_eq!(change.text, "-10.00%");
        assert_eq!(change.color, Some(config.negative_color));
        assert_eq!(board.get("current-price").unwrap().text, "$90.00");
    }

    #[test]
    fn test_unchanged_uses_positive_color() {
        let board = LabelBoard::new();
        let config = LabelConfig::default();
        refresh_stats(&series(&[250.0, 249.9999, 250.0]), &board, &config).unwrap();
        let change = board.get("price-change").unwrap();
        assert_eq!(change.text, "0.00%");
        assert_eq!(change.color.unwrap().as_str(), "#48bb78");

        let tiny_loss = PriceStats::from_points(&series(&[100.0, 99.999])).unwrap();
        assert_eq!(tiny_loss.change_fixed(), "0.00");
        assert!(tiny_loss.is_gain());
    }

    #[test]
    fn test_unusable_series_leaves_labels() {
        let board = LabelBoard::new();
        let config = LabelConfig::default();
        assert!(refresh_stats(&[], &board, &config).is_none());
        assert!(refresh_stats(&series(&[0.0, 5.0]), &board, &config).is_none());
        assert!(board.is_empty());
    }
}
