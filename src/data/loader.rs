use chrono::{NaiveDate, NaiveDateTime};

use super::model::{PipelineError, RawSeries, RawTable, SeriesIndex, TIME_COLUMN};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Ingest raw upload bytes into a normalized [`RawSeries`].
///
/// Steps:
/// 1. parse the bytes as delimited text with a header row
/// 2. select and rename the value column (positional rule below)
/// 3. parse a `Time` column into timestamps when present, sort ascending
///
/// The value column rule is deliberately positional and name-blind: the
/// first column other than the literal `Time`, or simply the first column
/// when no `Time` exists. No numeric sniffing happens here; a non-numeric
/// pick is accepted and rejected later by the validator.
pub fn ingest(bytes: &[u8]) -> Result<RawSeries, PipelineError> {
    let table = parse_table(bytes)?;
    normalize(table)
}

// ---------------------------------------------------------------------------
// CSV parsing
// ---------------------------------------------------------------------------

fn parse_table(bytes: &[u8]) -> Result<RawTable, PipelineError> {
    let mut reader = csv::ReaderBuilder::new().from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| PipelineError::Parse(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(PipelineError::Parse("the file has no columns".into()));
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| PipelineError::Parse(e.to_string()))?;
        rows.push(record.iter().map(|cell| cell.trim().to_string()).collect());
    }

    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// Normalization: column selection + time index
// ---------------------------------------------------------------------------

fn normalize(table: RawTable) -> Result<RawSeries, PipelineError> {
    let time_col = table.headers.iter().position(|h| h == TIME_COLUMN);

    // Positional rule: first non-Time column, else the first column.
    let value_col = match time_col {
        Some(t) => (0..table.headers.len()).find(|&i| i != t).ok_or_else(|| {
            PipelineError::Parse("the file has no value column besides 'Time'".into())
        })?,
        None => 0,
    };

    let raw_values: Vec<String> = table
        .rows
        .iter()
        .map(|row| row.get(value_col).cloned().unwrap_or_default())
        .collect();

    let Some(time_col) = time_col else {
        return Ok(RawSeries {
            index: SeriesIndex::Ordinal(raw_values.len()),
            raw_values,
            invalid_times: 0,
        });
    };

    let time_cells: Vec<&str> = table
        .rows
        .iter()
        .map(|row| row.get(time_col).map(String::as_str).unwrap_or(""))
        .collect();

    let format = detect_time_format(&time_cells);
    let timestamps: Vec<Option<NaiveDateTime>> = time_cells
        .iter()
        .map(|cell| format.and_then(|fmt| parse_time(cell, fmt)))
        .collect();
    let invalid_times = timestamps.iter().filter(|t| t.is_none()).count();

    // Sort rows ascending by timestamp; invalid-time markers keep their
    // relative order and land after all valid timestamps.
    let mut paired: Vec<(Option<NaiveDateTime>, String)> =
        timestamps.into_iter().zip(raw_values).collect();
    paired.sort_by_key(|(ts, _)| (ts.is_none(), *ts));

    let (timestamps, raw_values): (Vec<_>, Vec<_>) = paired.into_iter().unzip();

    Ok(RawSeries {
        index: SeriesIndex::Time(timestamps),
        raw_values,
        invalid_times,
    })
}

// ---------------------------------------------------------------------------
// Timestamp parsing
// ---------------------------------------------------------------------------

/// Formats tried when detecting how the `Time` column is written, most
/// specific first.
const TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
];

/// Pick the format with the highest parse success rate over a sample of
/// the column. `None` when nothing parses at all.
fn detect_time_format(values: &[&str]) -> Option<&'static str> {
    let sample: Vec<&str> = values
        .iter()
        .copied()
        .filter(|s| !s.is_empty())
        .take(100)
        .collect();
    if sample.is_empty() {
        return None;
    }

    let mut best: Option<&'static str> = None;
    let mut best_score = 0usize;
    for &fmt in TIME_FORMATS {
        let score = sample.iter().filter(|s| parse_time(s, fmt).is_some()).count();
        if score > best_score {
            best_score = score;
            best = Some(fmt);
        }
    }
    best
}

fn parse_time(value: &str, format: &'static str) -> Option<NaiveDateTime> {
    // Trailing Z (UTC) is common in logger exports; chrono's naive parsers
    // reject it, so strip it up front.
    let value = value.strip_suffix('Z').unwrap_or(value);

    if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
        Some(dt)
    } else if let Ok(d) = NaiveDate::parse_from_str(value, format) {
        d.and_hms_opt(0, 0, 0)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_column_selects_first_other_column() {
        // With a Time column the value column is the first *other* one,
        // not a best-guess numeric column.
        let csv = b"Time,PPM,humidity\n2024-05-01 00:00:00,50,80\n2024-05-01 01:00:00,60,81\n";
        let series = ingest(csv).unwrap();
        assert_eq!(series.raw_values, vec!["50", "60"]);
        assert!(series.index.is_time());
        assert_eq!(series.invalid_times, 0);
    }

    #[test]
    fn time_column_position_does_not_matter() {
        let csv = b"PPM,Time\n50,2024-05-01 00:00:00\n";
        let series = ingest(csv).unwrap();
        assert_eq!(series.raw_values, vec!["50"]);
        assert!(series.index.is_time());
    }

    #[test]
    fn without_time_first_column_wins_with_ordinal_index() {
        let csv = b"PPM,other\n10,x\n20,y\n30,z\n";
        let series = ingest(csv).unwrap();
        assert_eq!(series.raw_values, vec!["10", "20", "30"]);
        assert_eq!(series.index, SeriesIndex::Ordinal(3));
    }

    #[test]
    fn rows_are_sorted_ascending_by_timestamp() {
        let csv = b"Time,PPM\n2024-05-01 02:00:00,3\n2024-05-01 00:00:00,1\n2024-05-01 01:00:00,2\n";
        let series = ingest(csv).unwrap();
        assert_eq!(series.raw_values, vec!["1", "2", "3"]);
    }

    #[test]
    fn unparseable_timestamps_become_markers_sorted_last() {
        let csv = b"Time,PPM\nnot-a-date,9\n2024-05-01 00:00:00,1\n2024-05-01 01:00:00,2\n";
        let series = ingest(csv).unwrap();
        assert_eq!(series.invalid_times, 1);
        // Marker row kept, moved to the end.
        assert_eq!(series.raw_values, vec!["1", "2", "9"]);
        assert!(series.index.timestamp(2).is_none());
        assert_eq!(series.index.len(), 3);
    }

    #[test]
    fn empty_upload_is_a_parse_error() {
        assert!(matches!(ingest(b""), Err(PipelineError::Parse(_))));
    }

    #[test]
    fn time_only_table_is_a_parse_error() {
        let csv = b"Time\n2024-05-01 00:00:00\n";
        assert!(matches!(ingest(csv), Err(PipelineError::Parse(_))));
    }

    #[test]
    fn ragged_rows_are_a_parse_error() {
        let csv = b"PPM,other\n10,x\n20\n";
        assert!(matches!(ingest(csv), Err(PipelineError::Parse(_))));
    }

    #[test]
    fn iso8601_with_trailing_z_parses() {
        let csv = b"Time,PPM\n2024-05-01T00:00:00Z,1\n2024-05-01T01:00:00Z,2\n";
        let series = ingest(csv).unwrap();
        assert_eq!(series.invalid_times, 0);
        assert!(series.index.timestamp(0).is_some());
    }
}
