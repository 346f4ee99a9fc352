use super::model::{CanonicalSeries, PipelineError, RawSeries};

// ---------------------------------------------------------------------------
// Numeric coercion
// ---------------------------------------------------------------------------

/// Coerce the raw value column to numbers, producing the
/// [`CanonicalSeries`] the rest of the pipeline consumes.
///
/// Every entry keeps its index position: cells that do not parse as a
/// finite number become NaN markers rather than being dropped. Only a
/// column with *no* numeric entries at all is fatal
/// ([`PipelineError::NoNumericData`]).
pub fn coerce(raw: RawSeries) -> Result<CanonicalSeries, PipelineError> {
    let values: Vec<f64> = raw.raw_values.iter().map(|cell| coerce_cell(cell)).collect();

    let invalid_values = values.iter().filter(|v| v.is_nan()).count();
    if invalid_values == values.len() {
        return Err(PipelineError::NoNumericData);
    }

    Ok(CanonicalSeries {
        index: raw.index,
        values,
        invalid_times: raw.invalid_times,
        invalid_values,
    })
}

/// One cell: trimmed float parse, NaN marker on failure. Non-finite inputs
/// (`inf`, explicit `NaN`) count as invalid too so that min/max and the
/// filter predicates stay well defined.
fn coerce_cell(cell: &str) -> f64 {
    match cell.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::SeriesIndex;

    fn raw(values: &[&str]) -> RawSeries {
        RawSeries {
            index: SeriesIndex::Ordinal(values.len()),
            raw_values: values.iter().map(|s| s.to_string()).collect(),
            invalid_times: 0,
        }
    }

    #[test]
    fn mixed_column_keeps_markers_in_place() {
        // Scenario B shape: one bad cell among numbers.
        let series = coerce(raw(&["10", "20", "30", "abc", "50"])).unwrap();
        assert_eq!(series.len(), 5);
        assert_eq!(series.invalid_values, 1);
        assert!(series.values[3].is_nan());
        let mean: f64 =
            series.valid_values().sum::<f64>() / series.valid_count() as f64;
        assert_eq!(mean, 27.5);
    }

    #[test]
    fn all_invalid_is_fatal() {
        // Scenario D: the pipeline halts before any metric is computed.
        let err = coerce(raw(&["abc", "def", ""])).unwrap_err();
        assert!(matches!(err, PipelineError::NoNumericData));
    }

    #[test]
    fn coercion_is_idempotent() {
        let first = coerce(raw(&["1.5", "2.5", "x", "4.0"])).unwrap();
        let rendered: Vec<String> = first.values.iter().map(|v| v.to_string()).collect();
        let second = coerce(RawSeries {
            index: first.index.clone(),
            raw_values: rendered,
            invalid_times: 0,
        })
        .unwrap();
        assert_eq!(first.values.len(), second.values.len());
        for (a, b) in first.values.iter().zip(&second.values) {
            assert!(a == b || (a.is_nan() && b.is_nan()));
        }
    }

    #[test]
    fn non_finite_inputs_are_markers() {
        let series = coerce(raw(&["inf", "NaN", "-inf", "7"])).unwrap();
        assert_eq!(series.invalid_values, 3);
        assert_eq!(series.valid_count(), 1);
    }

    #[test]
    fn constant_column_flags_degenerate() {
        // Scenario C: not an error, just a condition downstream must check.
        let series = coerce(raw(&["42", "42", "42"])).unwrap();
        assert!(series.is_degenerate());
    }

    #[test]
    fn whitespace_is_tolerated() {
        let series = coerce(raw(&[" 12.5 ", "\t3"])).unwrap();
        assert_eq!(series.values, vec![12.5, 3.0]);
    }
}
