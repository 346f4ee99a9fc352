use super::model::{CanonicalSeries, DegenerateSeries};

// ---------------------------------------------------------------------------
// FilterResult – a positional view over the series
// ---------------------------------------------------------------------------

/// Positions of the rows selected by a value predicate, in original index
/// order. A view, not a copy; rendering and export resolve positions back
/// through the series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterResult {
    positions: Vec<usize>,
}

impl FilterResult {
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// The unfiltered view: every row, invalid ones included.
    pub fn full(series: &CanonicalSeries) -> Self {
        FilterResult {
            positions: (0..series.len()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Range filters
// ---------------------------------------------------------------------------

/// Rows with value strictly above `lower`. Invalid readings never match.
pub fn greater_than(
    series: &CanonicalSeries,
    lower: f64,
) -> Result<FilterResult, DegenerateSeries> {
    select(series, |v| v > lower)
}

/// Rows with value strictly below `upper`. Invalid readings never match.
pub fn less_than(
    series: &CanonicalSeries,
    upper: f64,
) -> Result<FilterResult, DegenerateSeries> {
    select(series, |v| v < upper)
}

/// Strict intersection of both bounds; only produced when the caller asks
/// for combined mode explicitly.
pub fn combined(
    series: &CanonicalSeries,
    lower: f64,
    upper: f64,
) -> Result<FilterResult, DegenerateSeries> {
    select(series, |v| v > lower && v < upper)
}

/// The set that gets exported. Combined mode is the strict intersection;
/// the default is the deduplicated union of the two one-sided filters.
/// The union default looks surprising next to the two display panes but
/// matches the source behavior and is preserved deliberately.
pub fn export_selection(
    series: &CanonicalSeries,
    lower: f64,
    upper: f64,
    combined_mode: bool,
) -> Result<FilterResult, DegenerateSeries> {
    if combined_mode {
        combined(series, lower, upper)
    } else {
        select(series, |v| v > lower || v < upper)
    }
}

/// Shared predicate walk. A degenerate series disables filtering entirely:
/// slider bounds collapse to a single point, which is degenerate input
/// rather than an error, and the caller shows the full series instead.
fn select(
    series: &CanonicalSeries,
    predicate: impl Fn(f64) -> bool,
) -> Result<FilterResult, DegenerateSeries> {
    if series.is_degenerate() {
        return Err(DegenerateSeries);
    }

    let positions = series
        .values
        .iter()
        .enumerate()
        .filter(|(_, &v)| !v.is_nan() && predicate(v))
        .map(|(i, _)| i)
        .collect();

    Ok(FilterResult { positions })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::SeriesIndex;

    fn series_of(values: &[f64]) -> CanonicalSeries {
        CanonicalSeries {
            index: SeriesIndex::Ordinal(values.len()),
            values: values.to_vec(),
            invalid_times: 0,
            invalid_values: values.iter().filter(|v| v.is_nan()).count(),
        }
    }

    #[test]
    fn comparisons_are_strict_and_order_preserving() {
        let series = series_of(&[50.0, 150.0, 100.0, 250.0]);
        let above = greater_than(&series, 100.0).unwrap();
        assert_eq!(above.positions(), &[1, 3]);
        let below = less_than(&series, 100.0).unwrap();
        assert_eq!(below.positions(), &[0]);
    }

    #[test]
    fn invalid_readings_never_match() {
        let series = series_of(&[10.0, f64::NAN, 30.0]);
        let above = greater_than(&series, 0.0).unwrap();
        assert_eq!(above.positions(), &[0, 2]);
        let below = less_than(&series, 100.0).unwrap();
        assert_eq!(below.positions(), &[0, 2]);
    }

    #[test]
    fn combined_is_a_strict_intersection() {
        let series = series_of(&[50.0, 150.0, 250.0]);
        let result = combined(&series, 100.0, 200.0).unwrap();
        assert_eq!(result.positions(), &[1]);
    }

    #[test]
    fn default_export_is_the_union_of_both_panes() {
        let series = series_of(&[50.0, 150.0, 250.0]);
        // lower=100, upper=200: pane one selects {150, 250}, pane two
        // selects {50, 150}; the union keeps one copy of 150.
        let union = export_selection(&series, 100.0, 200.0, false).unwrap();
        assert_eq!(union.positions(), &[0, 1, 2]);
        let intersection = export_selection(&series, 100.0, 200.0, true).unwrap();
        assert_eq!(intersection.positions(), &[1]);
    }

    #[test]
    fn degenerate_series_disables_filtering() {
        let series = series_of(&[42.0, 42.0, 42.0]);
        assert_eq!(greater_than(&series, 0.0), Err(DegenerateSeries));
        assert_eq!(less_than(&series, 100.0), Err(DegenerateSeries));
        assert_eq!(combined(&series, 0.0, 100.0), Err(DegenerateSeries));
        // The caller falls back to the full view, one row per reading.
        assert_eq!(FilterResult::full(&series).len(), 3);
    }
}
