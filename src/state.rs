use std::fmt;

use crate::data;
use crate::data::metrics::{
    self, HistogramBin, LastReading, StatusTier, SummaryStats, DEFAULT_HISTOGRAM_BINS,
};
use crate::data::model::CanonicalSeries;

// ---------------------------------------------------------------------------
// Operator parameters
// ---------------------------------------------------------------------------

/// Display unit label; cosmetic only, no conversion math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitLabel {
    #[default]
    Ppm,
    MgPerM3Estimated,
}

impl UnitLabel {
    pub const ALL: [UnitLabel; 2] = [UnitLabel::Ppm, UnitLabel::MgPerM3Estimated];
}

impl fmt::Display for UnitLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitLabel::Ppm => write!(f, "ppm"),
            UnitLabel::MgPerM3Estimated => write!(f, "mg/m³ (estimado)"),
        }
    }
}

/// Chart styles of the visualization tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    #[default]
    Line,
    Area,
    Bar,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [ChartKind::Line, ChartKind::Area, ChartKind::Bar];
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartKind::Line => write!(f, "Línea"),
            ChartKind::Area => write!(f, "Área"),
            ChartKind::Bar => write!(f, "Barra"),
        }
    }
}

/// UI range of the rolling-window slider.
pub const ROLLING_WINDOW_RANGE: std::ops::RangeInclusive<usize> = 1..=120;

/// Everything the operator can change; supplied to the pipeline on every
/// render, per the presentation-layer contract.
#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    pub unit: UnitLabel,
    pub warning_threshold: f64,
    pub critical_threshold: f64,
    pub rolling_window: usize,
    pub chart: ChartKind,
    pub show_raw: bool,
    /// Lower bound of the "greater than" pane.
    pub lower_bound: f64,
    /// Upper bound of the "less than" pane.
    pub upper_bound: f64,
    /// Export the strict intersection instead of the union default.
    pub combined_export: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            unit: UnitLabel::default(),
            warning_threshold: 100.0,
            critical_threshold: 200.0,
            rolling_window: 10,
            chart: ChartKind::default(),
            show_raw: false,
            lower_bound: 0.0,
            upper_bound: 0.0,
            combined_export: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Derived results
// ---------------------------------------------------------------------------

/// Metrics bundle recomputed whenever the series or a parameter changes;
/// never cached across uploads.
#[derive(Debug, Clone)]
pub struct Derived {
    pub stats: SummaryStats,
    pub rolling: Vec<f64>,
    pub last: LastReading,
    pub status: StatusTier,
    /// `None` for a degenerate series (histogram undefined there).
    pub histogram: Option<Vec<HistogramBin>>,
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Tabs of the central panel, mirroring the dashboard layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Visualization,
    Statistics,
    Filters,
    SiteInfo,
}

impl Tab {
    pub const ALL: [Tab; 4] = [
        Tab::Visualization,
        Tab::Statistics,
        Tab::Filters,
        Tab::SiteInfo,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Visualization => "📈 Visualización",
            Tab::Statistics => "📊 Estadísticas",
            Tab::Filters => "🔍 Filtros",
            Tab::SiteInfo => "🗺 Información del Sitio",
        }
    }
}

/// The full session context: one uploaded series, the operator parameters,
/// and the derived results. Rebuilt from scratch on every upload; owns
/// everything, nothing ambient.
pub struct SessionState {
    pub series: Option<CanonicalSeries>,
    pub params: Params,
    pub derived: Option<Derived>,
    pub active_tab: Tab,
    /// Fatal pipeline message shown instead of any partial output.
    pub error_message: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            series: None,
            params: Params::default(),
            derived: None,
            active_tab: Tab::default(),
            error_message: None,
        }
    }
}

impl SessionState {
    /// Run the full pipeline over freshly uploaded bytes. On failure the
    /// previous series and all derived results are discarded so no stale
    /// partial charts survive.
    pub fn load_bytes(&mut self, bytes: &[u8]) {
        match data::run(bytes) {
            Ok(series) => {
                // Both filter sliders start at the mean.
                let mean = series.valid_values().sum::<f64>() / series.valid_count() as f64;
                self.params.lower_bound = mean;
                self.params.upper_bound = mean;
                self.series = Some(series);
                self.error_message = None;
                self.recompute();
            }
            Err(err) => {
                log::error!("pipeline failed: {err}");
                self.series = None;
                self.derived = None;
                self.error_message = Some(err.to_string());
            }
        }
    }

    /// Recompute the derived bundle from the current series and parameters.
    /// Called after every parameter change; no caching beyond one render.
    pub fn recompute(&mut self) {
        self.params.rolling_window = self
            .params
            .rolling_window
            .clamp(*ROLLING_WINDOW_RANGE.start(), *ROLLING_WINDOW_RANGE.end());

        self.derived = self.series.as_ref().and_then(|series| {
            let stats = SummaryStats::compute(series)?;
            let last = metrics::last_reading(series)?;
            Some(Derived {
                rolling: metrics::rolling_mean(series, self.params.rolling_window),
                status: metrics::classify(
                    last.value,
                    self.params.warning_threshold,
                    self.params.critical_threshold,
                ),
                histogram: metrics::histogram(series, DEFAULT_HISTOGRAM_BINS),
                stats,
                last,
            })
        });
    }

    /// Non-fatal warning about unparseable `Time` entries, rendered
    /// alongside normal output.
    pub fn invalid_time_warning(&self) -> Option<String> {
        let series = self.series.as_ref()?;
        (series.invalid_times > 0).then(|| {
            format!(
                "{} entradas de 'Time' no se pudieron interpretar; se ordenan al final",
                series.invalid_times
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::metrics::StatusTier;

    #[test]
    fn defaults_match_the_configuration_surface() {
        let params = Params::default();
        assert_eq!(params.warning_threshold, 100.0);
        assert_eq!(params.critical_threshold, 200.0);
        assert_eq!(params.rolling_window, 10);
        assert_eq!(params.unit.to_string(), "ppm");
    }

    #[test]
    fn load_initializes_bounds_to_the_mean() {
        let mut state = SessionState::default();
        state.load_bytes(b"PPM\n10\n20\n30\n");
        assert_eq!(state.params.lower_bound, 20.0);
        assert_eq!(state.params.upper_bound, 20.0);
        assert!(state.error_message.is_none());
        assert!(state.derived.is_some());
    }

    #[test]
    fn fatal_errors_leave_no_partial_results() {
        let mut state = SessionState::default();
        state.load_bytes(b"PPM\n10\n20\n");
        assert!(state.series.is_some());

        // A bad second upload must clear the first one entirely.
        state.load_bytes(b"PPM\nabc\ndef\n");
        assert!(state.series.is_none());
        assert!(state.derived.is_none());
        assert!(state.error_message.is_some());
    }

    #[test]
    fn recompute_tracks_threshold_changes() {
        let mut state = SessionState::default();
        state.load_bytes(b"PPM\n50\n150\n");
        assert_eq!(state.derived.as_ref().unwrap().status, StatusTier::Warning);

        state.params.warning_threshold = 160.0;
        state.recompute();
        assert_eq!(state.derived.as_ref().unwrap().status, StatusTier::Ok);
    }

    #[test]
    fn rolling_window_is_clamped_to_its_range() {
        let mut state = SessionState::default();
        state.load_bytes(b"PPM\n1\n2\n3\n");
        state.params.rolling_window = 0;
        state.recompute();
        assert_eq!(state.params.rolling_window, 1);
        state.params.rolling_window = 999;
        state.recompute();
        assert_eq!(state.params.rolling_window, 120);
    }

    #[test]
    fn invalid_time_warning_surfaces_non_fatally() {
        let mut state = SessionState::default();
        state.load_bytes(b"Time,PPM\nbad,1\n2024-05-01 00:00:00,2\n");
        assert!(state.error_message.is_none());
        assert!(state.invalid_time_warning().unwrap().starts_with('1'));
        assert!(state.derived.is_some());
    }
}
