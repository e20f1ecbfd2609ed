//! Behavior tests for derived metrics (trend classification and
//! sparkline normalization)

use ecosim_monitor_core::metrics::{
    normalize, trend, TrendDirection, SPARKLINE_HEIGHT, SPARKLINE_PADDING, SPARKLINE_WIDTH,
};

#[test]
fn test_ten_percent_rise_classifies_up() {
    let t = trend(&[100.0, 110.0]);
    assert_eq!(t.direction, TrendDirection::Up);
    assert!((t.percent - 10.0).abs() < 1e-9);
}

#[test]
fn test_dead_band_absorbs_hundredth_percent_drop() {
    let t = trend(&[100.0, 99.99]);
    assert_eq!(t.direction, TrendDirection::Neutral);
}

#[test]
fn test_zero_previous_point_yields_zero_percent() {
    let t = trend(&[0.0, 5.0]);
    assert_eq!(t.percent, 0.0);
    assert_eq!(t.direction, TrendDirection::Neutral);
}

#[test]
fn test_trend_ignores_everything_before_the_last_two_points() {
    let falling_then_rising = [1000.0, 400.0, 100.0, 120.0];
    assert_eq!(trend(&falling_then_rising).direction, TrendDirection::Up);
}

#[test]
fn test_flat_series_normalizes_without_division_error() {
    let points = normalize(&[5.0, 5.0, 5.0]);

    assert_eq!(points.len(), 3);
    for point in &points {
        assert!(point.x.is_finite());
        assert!(point.y.is_finite());
    }
    // Flat series draws along the bottom of the padded viewport
    assert!(points.iter().all(|p| p.y == SPARKLINE_HEIGHT - SPARKLINE_PADDING));
}

#[test]
fn test_normalize_spans_the_viewport() {
    let points = normalize(&[2.0, 8.0, 5.0]);

    assert_eq!(points[0].x, 0.0);
    assert_eq!(points[2].x, SPARKLINE_WIDTH);
    // Larger value draws higher (smaller y)
    assert!(points[1].y < points[0].y);
    assert_eq!(points[0].y, SPARKLINE_HEIGHT - SPARKLINE_PADDING);
    assert_eq!(points[1].y, SPARKLINE_PADDING);
}

#[test]
fn test_degenerate_series_yield_neutral_and_empty() {
    assert_eq!(trend(&[]).direction, TrendDirection::Neutral);
    assert_eq!(trend(&[7.0]).direction, TrendDirection::Neutral);
    assert!(normalize(&[]).is_empty());
    assert!(normalize(&[7.0]).is_empty());
}
