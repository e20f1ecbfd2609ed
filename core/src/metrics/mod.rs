//! Derived indicator metrics
//!
//! Pure, stateless transforms over a numeric series extracted from the
//! history buffer: trend classification for indicator cards and min-max
//! normalization for sparkline rendering.
//!
//! Both functions tolerate series of length 0 or 1 by returning a
//! neutral/empty result, and never divide by zero.

/// Percent-change threshold below which a movement is classified as
/// neutral. Suppresses flicker from floating-point noise between
/// near-identical ticks.
pub const TREND_DEAD_BAND: f64 = 0.01;

/// Sparkline output coordinate space, matching the console's chart
/// viewport.
pub const SPARKLINE_WIDTH: f64 = 100.0;
pub const SPARKLINE_HEIGHT: f64 = 50.0;

/// Inset that keeps the polyline clear of the viewport edges.
pub const SPARKLINE_PADDING: f64 = 5.0;

/// Direction of the most recent movement in a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Up,
    Down,
    Neutral,
}

/// Trend of the last two points of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trend {
    /// Percent change from the previous point to the last point
    pub percent: f64,
    pub direction: TrendDirection,
}

impl Trend {
    pub const NEUTRAL: Trend = Trend {
        percent: 0.0,
        direction: TrendDirection::Neutral,
    };
}

/// A normalized sparkline vertex in the fixed output coordinate space.
///
/// The vertical axis follows drawing convention: larger values map to
/// smaller `y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SparklinePoint {
    pub x: f64,
    pub y: f64,
}

/// Classify the movement between the last two points of a series.
///
/// Computes `(last - prev) / prev * 100` when `prev != 0`, else 0, and
/// applies the [`TREND_DEAD_BAND`] to pick a direction. Series shorter
/// than two points yield [`Trend::NEUTRAL`].
///
/// # Example
///
/// ```rust
/// use ecosim_monitor_core::metrics::{trend, TrendDirection};
///
/// let t = trend(&[100.0, 110.0]);
/// assert_eq!(t.direction, TrendDirection::Up);
/// assert!((t.percent - 10.0).abs() < 1e-9);
/// ```
pub fn trend(series: &[f64]) -> Trend {
    if series.len() < 2 {
        return Trend::NEUTRAL;
    }

    let prev = series[series.len() - 2];
    let last = series[series.len() - 1];

    let percent = if prev != 0.0 {
        (last - prev) / prev * 100.0
    } else {
        0.0
    };

    let direction = if percent > TREND_DEAD_BAND {
        TrendDirection::Up
    } else if percent < -TREND_DEAD_BAND {
        TrendDirection::Down
    } else {
        TrendDirection::Neutral
    };

    Trend { percent, direction }
}

/// Map a series onto sparkline coordinates.
///
/// Values are min-max normalized over the full series (falling back to a
/// unit range when `min == max`) and spread evenly across the horizontal
/// axis. Series shorter than two points yield an empty polyline.
pub fn normalize(series: &[f64]) -> Vec<SparklinePoint> {
    if series.len() < 2 {
        return Vec::new();
    }

    let min = series.iter().fold(f64::INFINITY, |a, &b| a.min(b));
    let max = series.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let range = if max - min == 0.0 { 1.0 } else { max - min };

    let span = (series.len() - 1) as f64;
    series
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            let x = i as f64 / span * SPARKLINE_WIDTH;
            let normalized = (value - min) / range;
            let y = (SPARKLINE_HEIGHT - SPARKLINE_PADDING)
                - normalized * (SPARKLINE_HEIGHT - 2.0 * SPARKLINE_PADDING);
            SparklinePoint { x, y }
        })
        .collect()
}
