use std::fmt;

use chrono::NaiveDateTime;
use thiserror::Error;

/// Canonical name every downstream component reads the readings under.
pub const VALUE_COLUMN: &str = "variable";

/// Column name (case-sensitive) that switches the ingestor to time-indexed
/// mode.
pub const TIME_COLUMN: &str = "Time";

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Fatal pipeline failures. Either one aborts the pass before any metric or
/// chart is produced; the UI shows only the message.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Malformed or empty upload.
    #[error("could not parse the file: {0}")]
    Parse(String),

    /// The value column contains no numeric entries after coercion.
    #[error("the value column contains no numeric data")]
    NoNumericData,
}

/// Non-fatal condition: every valid reading has the same value, so range
/// sliders collapse to a single point and filtering is disabled. The caller
/// must present the full unfiltered series instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("all readings share a single value; range filtering is disabled")]
pub struct DegenerateSeries;

// ---------------------------------------------------------------------------
// RawTable – the upload as parsed, before any normalization
// ---------------------------------------------------------------------------

/// Ordered columns exactly as the file named them; string cells, no
/// invariants yet.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    /// Row-major cells; every row has `headers.len()` entries.
    pub rows: Vec<Vec<String>>,
}

// ---------------------------------------------------------------------------
// SeriesIndex – timestamps when a Time column parsed, ordinals otherwise
// ---------------------------------------------------------------------------

/// Index of a series: one entry per row, always the same length as the
/// value vector.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesIndex {
    /// Parsed `Time` column; `None` marks an entry whose timestamp did not
    /// parse (kept in place, never dropped).
    Time(Vec<Option<NaiveDateTime>>),
    /// Dense zero-based fallback when no `Time` column exists; holds the
    /// row count.
    Ordinal(usize),
}

impl SeriesIndex {
    pub fn len(&self) -> usize {
        match self {
            SeriesIndex::Time(ts) => ts.len(),
            SeriesIndex::Ordinal(n) => *n,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the series carries real timestamps.
    pub fn is_time(&self) -> bool {
        matches!(self, SeriesIndex::Time(_))
    }

    /// Timestamp at `pos`; `None` for ordinal indices and invalid-time
    /// markers alike.
    pub fn timestamp(&self, pos: usize) -> Option<NaiveDateTime> {
        match self {
            SeriesIndex::Time(ts) => ts.get(pos).copied().flatten(),
            SeriesIndex::Ordinal(_) => None,
        }
    }

    /// Display / export label for one position: ISO-8601 for timestamps,
    /// the plain integer for ordinals, empty for invalid-time markers.
    pub fn label(&self, pos: usize) -> String {
        match self {
            SeriesIndex::Time(ts) => match ts.get(pos).copied().flatten() {
                Some(t) => t.format("%Y-%m-%dT%H:%M:%S").to_string(),
                None => String::new(),
            },
            SeriesIndex::Ordinal(_) => pos.to_string(),
        }
    }

    /// Header name of the index column in tables and exports.
    pub fn column_name(&self) -> &'static str {
        match self {
            SeriesIndex::Time(_) => TIME_COLUMN,
            SeriesIndex::Ordinal(_) => "index",
        }
    }
}

impl fmt::Display for SeriesIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesIndex::Time(ts) => write!(f, "time index ({} rows)", ts.len()),
            SeriesIndex::Ordinal(n) => write!(f, "ordinal index ({n} rows)"),
        }
    }
}

// ---------------------------------------------------------------------------
// RawSeries – normalized but not yet coerced
// ---------------------------------------------------------------------------

/// Output of the ingestor: index built, value column selected and renamed,
/// but the readings still raw text. The validator turns this into a
/// [`CanonicalSeries`].
#[derive(Debug, Clone)]
pub struct RawSeries {
    pub index: SeriesIndex,
    /// Raw cells of the canonical value column, one per index position.
    pub raw_values: Vec<String>,
    /// How many `Time` entries failed to parse (non-fatal warning).
    pub invalid_times: usize,
}

// ---------------------------------------------------------------------------
// CanonicalSeries – the normalized form every component consumes
// ---------------------------------------------------------------------------

/// The single-variable series all downstream logic operates on. Invariant:
/// `index.len() == values.len()`; every row keeps its position even when
/// its value is invalid. NaN is the invalid-value marker; such rows are
/// excluded from statistics but retained in the full view.
#[derive(Debug, Clone)]
pub struct CanonicalSeries {
    pub index: SeriesIndex,
    pub values: Vec<f64>,
    pub invalid_times: usize,
    pub invalid_values: usize,
}

impl CanonicalSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Valid readings only, in index order.
    pub fn valid_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied().filter(|v| !v.is_nan())
    }

    pub fn valid_count(&self) -> usize {
        self.valid_values().count()
    }

    /// (min, max) over valid readings; `None` only for an all-invalid
    /// series, which the validator already rejects.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut it = self.valid_values();
        let first = it.next()?;
        let (min, max) = it.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Some((min, max))
    }

    /// Zero-variance check: every valid reading has the same value.
    pub fn is_degenerate(&self) -> bool {
        matches!(self.value_range(), Some((lo, hi)) if lo == hi)
    }
}
