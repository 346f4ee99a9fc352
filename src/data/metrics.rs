use std::fmt;

use chrono::NaiveDateTime;

use super::model::CanonicalSeries;

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

/// Descriptive statistics over the valid readings of a series, in the
/// field order of a pandas-style `describe()`.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (ddof = 1); NaN for a single reading.
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

impl SummaryStats {
    /// Compute over valid readings only; `None` when none exist (the
    /// validator rejects that case before metrics ever run).
    pub fn compute(series: &CanonicalSeries) -> Option<Self> {
        let mut vals: Vec<f64> = series.valid_values().collect();
        if vals.is_empty() {
            return None;
        }

        let count = vals.len();
        let mean = vals.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let ss: f64 = vals.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        } else {
            f64::NAN
        };

        vals.sort_by(|a, b| a.total_cmp(b));
        Some(SummaryStats {
            count,
            mean,
            std,
            min: vals[0],
            q25: percentile(&vals, 0.25),
            q50: percentile(&vals, 0.50),
            q75: percentile(&vals, 0.75),
            max: vals[count - 1],
        })
    }
}

/// Linear-interpolation percentile over an ascending slice.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = q * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

// ---------------------------------------------------------------------------
// Rolling mean
// ---------------------------------------------------------------------------

/// Trailing moving average: position `i` holds the mean of the valid
/// readings in the window of up to `window` positions ending at `i`.
///
/// The window is clamped to at least 1 and uses whatever points exist near
/// the start (no leading NaN ramp-in); a window containing only invalid
/// readings yields a NaN slot.
pub fn rolling_mean(series: &CanonicalSeries, window: usize) -> Vec<f64> {
    let window = window.max(1);
    let values = &series.values;

    (0..values.len())
        .map(|i| {
            let start = i + 1 - window.min(i + 1);
            let mut sum = 0.0;
            let mut n = 0usize;
            for &v in &values[start..=i] {
                if !v.is_nan() {
                    sum += v;
                    n += 1;
                }
            }
            if n == 0 { f64::NAN } else { sum / n as f64 }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Last reading
// ---------------------------------------------------------------------------

/// Snapshot of the most recent valid reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LastReading {
    pub position: usize,
    pub value: f64,
    /// Timestamp of that row; `None` for ordinal indices and invalid-time
    /// markers ("unavailable").
    pub time: Option<NaiveDateTime>,
}

/// The valid reading at the highest index position.
pub fn last_reading(series: &CanonicalSeries) -> Option<LastReading> {
    series
        .values
        .iter()
        .rposition(|v| !v.is_nan())
        .map(|position| LastReading {
            position,
            value: series.values[position],
            time: series.index.timestamp(position),
        })
}

// ---------------------------------------------------------------------------
// Status classification
// ---------------------------------------------------------------------------

/// Tier of the most recent reading against the operator thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StatusTier {
    Ok,
    Warning,
    Critical,
}

impl fmt::Display for StatusTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusTier::Ok => write!(f, "OK"),
            StatusTier::Warning => write!(f, "WARNING"),
            StatusTier::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Thresholds are inclusive lower bounds; the critical check runs first so
/// a tie at `critical` classifies as Critical even when the thresholds are
/// inverted.
pub fn classify(last_value: f64, warning: f64, critical: f64) -> StatusTier {
    if last_value >= critical {
        StatusTier::Critical
    } else if last_value >= warning {
        StatusTier::Warning
    } else {
        StatusTier::Ok
    }
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

pub const DEFAULT_HISTOGRAM_BINS: usize = 30;

/// One equal-width bucket of the value histogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram of the valid readings over [min, max]; the top
/// edge is inclusive. Undefined for a degenerate series, so callers must
/// check `is_degenerate()` first; this returns `None` in that case.
pub fn histogram(series: &CanonicalSeries, bins: usize) -> Option<Vec<HistogramBin>> {
    let bins = bins.max(1);
    let (min, max) = series.value_range()?;
    if min == max {
        return None;
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in series.valid_values() {
        let slot = (((v - min) / width) as usize).min(bins - 1);
        counts[slot] += 1;
    }

    Some(
        counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                lower: min + i as f64 * width,
                upper: min + (i + 1) as f64 * width,
                count,
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{loader, validate};

    fn series_of(values: &[f64]) -> CanonicalSeries {
        CanonicalSeries {
            index: crate::data::model::SeriesIndex::Ordinal(values.len()),
            values: values.to_vec(),
            invalid_times: 0,
            invalid_values: values.iter().filter(|v| v.is_nan()).count(),
        }
    }

    #[test]
    fn summary_matches_describe_semantics() {
        let series = series_of(&[10.0, 20.0, 30.0, f64::NAN, 50.0]);
        let stats = SummaryStats::compute(&series).unwrap();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean, 27.5);
        assert!((stats.std - 17.0783).abs() < 1e-3);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.q25, 17.5);
        assert_eq!(stats.q50, 25.0);
        assert_eq!(stats.q75, 35.0);
        assert_eq!(stats.max, 50.0);
    }

    #[test]
    fn std_of_single_reading_is_nan() {
        let stats = SummaryStats::compute(&series_of(&[5.0])).unwrap();
        assert!(stats.std.is_nan());
        assert_eq!(stats.q50, 5.0);
    }

    #[test]
    fn rolling_first_position_is_first_value() {
        let series = series_of(&[3.0, 5.0, 7.0]);
        for w in [1, 2, 10, 120] {
            assert_eq!(rolling_mean(&series, w)[0], 3.0);
        }
    }

    #[test]
    fn rolling_uses_available_points_at_start() {
        let series = series_of(&[2.0, 4.0, 6.0, 8.0]);
        let rolled = rolling_mean(&series, 3);
        assert_eq!(rolled, vec![2.0, 3.0, 4.0, 6.0]);
    }

    #[test]
    fn rolling_window_is_clamped_and_may_exceed_length() {
        let series = series_of(&[1.0, 2.0, 3.0]);
        assert_eq!(rolling_mean(&series, 0), rolling_mean(&series, 1));
        assert_eq!(rolling_mean(&series, 500), vec![1.0, 1.5, 2.0]);
    }

    #[test]
    fn rolling_skips_invalid_readings() {
        let series = series_of(&[10.0, f64::NAN, 30.0]);
        let rolled = rolling_mean(&series, 2);
        assert_eq!(rolled[0], 10.0);
        assert_eq!(rolled[1], 10.0); // window {10, NaN}
        assert_eq!(rolled[2], 30.0); // window {NaN, 30}
    }

    #[test]
    fn last_reading_skips_trailing_markers() {
        let series = series_of(&[1.0, 9.0, f64::NAN]);
        let last = last_reading(&series).unwrap();
        assert_eq!(last.position, 1);
        assert_eq!(last.value, 9.0);
        assert_eq!(last.time, None);
    }

    #[test]
    fn last_reading_carries_timestamp_when_time_indexed() {
        let csv = b"Time,PPM\n2024-05-01 00:00:00,50\n2024-05-01 01:00:00,150\n2024-05-01 02:00:00,250\n";
        let series = validate::coerce(loader::ingest(csv).unwrap()).unwrap();
        let last = last_reading(&series).unwrap();
        assert_eq!(last.value, 250.0);
        assert_eq!(
            last.time.unwrap().format("%H:%M").to_string(),
            "02:00"
        );
    }

    #[test]
    fn status_sequence_of_scenario_a() {
        // warning=100, critical=200 → [OK, WARNING, CRITICAL]
        let tiers: Vec<StatusTier> = [50.0, 150.0, 250.0]
            .iter()
            .map(|&v| classify(v, 100.0, 200.0))
            .collect();
        assert_eq!(
            tiers,
            vec![StatusTier::Ok, StatusTier::Warning, StatusTier::Critical]
        );
    }

    #[test]
    fn status_thresholds_are_inclusive_critical_first() {
        assert_eq!(classify(100.0, 100.0, 200.0), StatusTier::Warning);
        assert_eq!(classify(200.0, 100.0, 200.0), StatusTier::Critical);
        // Inverted thresholds: the critical check still wins on ties.
        assert_eq!(classify(150.0, 200.0, 100.0), StatusTier::Critical);
    }

    #[test]
    fn status_is_monotonic_in_the_reading() {
        let mut prev = StatusTier::Ok;
        for v in 0..400 {
            let tier = classify(v as f64, 100.0, 200.0);
            assert!(tier >= prev);
            prev = tier;
        }
    }

    #[test]
    fn histogram_counts_cover_all_valid_readings() {
        let series = series_of(&[0.0, 1.0, 2.0, 3.0, 4.0, f64::NAN]);
        let bins = histogram(&series, 4).unwrap();
        assert_eq!(bins.len(), 4);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 5);
        // Top edge inclusive: 4.0 lands in the last bucket.
        assert_eq!(bins[3].count, 2);
        assert_eq!(bins[0].lower, 0.0);
        assert_eq!(bins[3].upper, 4.0);
    }

    #[test]
    fn histogram_is_undefined_for_degenerate_series() {
        let series = series_of(&[42.0, 42.0]);
        assert!(histogram(&series, DEFAULT_HISTOGRAM_BINS).is_none());
    }
}
