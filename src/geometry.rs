//! Plot-space coordinates for a price series.
//!
//! x spreads the series over `[-2, 2)` by index, y normalizes price against the
//! series range into `[-1, 1]`, z is a shallow sine ripple for depth.

use crate::models::PricePoint;

pub const X_EXTENT: f32 = 4.0;
pub const Z_AMPLITUDE: f32 = 0.5;
pub const Z_FREQUENCY: f32 = 0.1;

pub fn price_range(points: &[PricePoint]) -> Option<(f64, f64)> {
    points.iter().map(|p| p.price).fold(None, |acc, price| match acc {
        None => Some((price, price)),
        Some((min, max)) => Some((min.min(price), max.max(price))),
    })
}

pub fn plot_x(index: usize, len: usize) -> f32 {
    (index as f32 / len as f32) * X_EXTENT - X_EXTENT / 2.0
}

/// A flat series has no spread to normalize against and sits on y = 0.
pub fn plot_y(price: f64, min: f64, max: f64) -> f32 {
    let spread = max - min;
    if spread <= 0.0 || !spread.is_finite() {
        return 0.0;
    }
    ((price - min) / spread * 2.0 - 1.0) as f32
}

pub fn plot_z(index: usize) -> f32 {
    (index as f32 * Z_FREQUENCY).sin() * Z_AMPLITUDE
}

pub fn plot_positions(points: &[PricePoint]) -> Vec<[f32; 3]> {
    let Some((min, max)) = price_range(points) else {
        return vec![];
    };
    let len = points.len();
    points
        .iter()
        .enumerate()
        .map(|(i, p)| [plot_x(i, len), plot_y(p.price, min, max), plot_z(i)])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(prices: &[f64]) -> Vec<PricePoint> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &price)| PricePoint::new(1_700_000_000 + i as i64 * 300, price))
            .collect()
    }

    #[test]
    fn test_empty_series_has_no_positions() {
        assert!(plot_positions(&[]).is_empty());
        assert_eq!(price_range(&[]), None);
    }

    #[test]
    fn test_bounds_and_ordering() {
        let points = series(&[451.2, 449.8, 452.6, 450.0, 453.1, 448.9, 452.0]);
        let positions = plot_positions(&points);
        assert_eq!(positions.len(), points.len());

        for pair in positions.windows(2) {
            assert!(pair[0][0] < pair[1][0], "x must increase with index");
        }
        for [x, y, z] in &positions {
            assert!((-2.0..=2.0).contains(x));
            assert!((-1.0..=1.0).contains(y));
            assert!(z.abs() <= Z_AMPLITUDE);
        }
        assert_eq!(positions[0][0], -2.0);
        // min is 448.9 at index 5, max is 453.1 at index 4
        assert_eq!(positions[5][1], -1.0);
        assert_eq!(positions[4][1], 1.0);
    }

    #[test]
    fn test_flat_series_maps_to_zero() {
        let positions = plot_positions(&series(&[100.0, 100.0, 100.0]));
        assert!(positions.iter().all(|p| p[1] == 0.0));
    }

    #[test]
    fn test_single_point() {
        let positions = plot_positions(&series(&[42.0]));
        assert_eq!(positions, vec![[-2.0, 0.0, 0.0]]);
    }

    #[test]
    fn test_depth_ripple() {
        assert_eq!(plot_z(0), 0.0);
        assert!((plot_z(10) - 1.0f32.sin() * 0.5).abs() < 1e-6);
    }
}
