use std::fmt::Write as _;

use anyhow::{Context, Result};

use super::filter::FilterResult;
use super::metrics::{LastReading, StatusTier, SummaryStats};
use super::model::{CanonicalSeries, VALUE_COLUMN};

/// Default file name offered for the filtered-data download.
pub const FILTERED_CSV_NAME: &str = "datos_filtrados_sensor_gas.csv";

/// Default file name offered for the statistical-summary download.
pub const SUMMARY_TXT_NAME: &str = "resumen_sensor_gas.txt";

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

/// Serialize the selected rows as UTF-8 CSV text: index column (ISO-8601
/// timestamps when time-indexed, plain integers otherwise) plus the value
/// column. Invalid-time rows get an empty index cell; invalid-value rows an
/// empty value cell.
pub fn export_csv(series: &CanonicalSeries, selection: &FilterResult) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record([series.index.column_name(), VALUE_COLUMN])
        .context("writing CSV header")?;

    for &pos in selection.positions() {
        let value = series.values[pos];
        let cell = if value.is_nan() {
            String::new()
        } else {
            value.to_string()
        };
        writer
            .write_record([series.index.label(pos), cell])
            .with_context(|| format!("writing CSV row {pos}"))?;
    }

    let bytes = writer.into_inner().context("flushing CSV buffer")?;
    String::from_utf8(bytes).context("CSV output was not UTF-8")
}

// ---------------------------------------------------------------------------
// Summary export
// ---------------------------------------------------------------------------

/// Fixed-format text block of the summary statistics, in `describe()` field
/// order, with the display unit and the current status appended.
pub fn export_summary_txt(
    stats: &SummaryStats,
    unit: &str,
    last: Option<&LastReading>,
    status: Option<StatusTier>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Resumen estadístico - sensor de gas");
    let _ = writeln!(out, "Unidad: {unit}");
    let _ = writeln!(out, "Count: {}", stats.count);
    let _ = writeln!(out, "Mean:  {:.2}", stats.mean);
    let _ = writeln!(out, "Std:   {:.2}", stats.std);
    let _ = writeln!(out, "Min:   {:.2}", stats.min);
    let _ = writeln!(out, "25%:   {:.2}", stats.q25);
    let _ = writeln!(out, "50%:   {:.2}", stats.q50);
    let _ = writeln!(out, "75%:   {:.2}", stats.q75);
    let _ = writeln!(out, "Max:   {:.2}", stats.max);

    if let Some(last) = last {
        match last.time {
            Some(t) => {
                let _ = writeln!(
                    out,
                    "Última lectura: {:.2} {unit} ({})",
                    last.value,
                    t.format("%Y-%m-%dT%H:%M:%S")
                );
            }
            None => {
                let _ = writeln!(out, "Última lectura: {:.2} {unit}", last.value);
            }
        }
    }
    if let Some(status) = status {
        let _ = writeln!(out, "Estado: {status}");
    }

    out
}
