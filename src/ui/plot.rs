use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, HLine, Legend, Line, Plot, PlotPoints};

use crate::data::metrics::{HistogramBin, StatusTier};
use crate::data::model::CanonicalSeries;
use crate::state::{ChartKind, Derived, Params};
use crate::theme;

// ---------------------------------------------------------------------------
// Main reading chart (visualization tab)
// ---------------------------------------------------------------------------

/// Render the main chart: the readings in index order as line, area, or
/// bars, with the rolling mean overlaid and both thresholds drawn as
/// horizontal lines. Invalid readings leave gaps.
pub fn reading_chart(ui: &mut Ui, series: &CanonicalSeries, derived: &Derived, params: &Params) {
    let x_label = if series.index.is_time() {
        "Tiempo (orden de lectura)"
    } else {
        "Lectura"
    };

    Plot::new("reading_chart")
        .legend(Legend::default())
        .x_axis_label(x_label)
        .y_axis_label(params.unit.to_string())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            let valid_points = || -> PlotPoints {
                series
                    .values
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| !v.is_nan())
                    .map(|(i, &v)| [i as f64, v])
                    .collect()
            };

            match params.chart {
                ChartKind::Line => {
                    plot_ui.line(
                        Line::new(valid_points())
                            .name("lecturas")
                            .color(theme::ACCENT)
                            .width(1.5),
                    );
                }
                ChartKind::Area => {
                    plot_ui.line(
                        Line::new(valid_points())
                            .name("lecturas")
                            .color(theme::ACCENT)
                            .fill(0.0)
                            .width(1.5),
                    );
                }
                ChartKind::Bar => {
                    let bars: Vec<Bar> = series
                        .values
                        .iter()
                        .enumerate()
                        .filter(|(_, v)| !v.is_nan())
                        .map(|(i, &v)| {
                            Bar::new(i as f64, v).width(0.8).fill(theme::value_color(
                                v,
                                params.warning_threshold,
                                params.critical_threshold,
                            ))
                        })
                        .collect();
                    plot_ui.bar_chart(BarChart::new(bars).name("lecturas"));
                }
            }

            let rolling: PlotPoints = derived
                .rolling
                .iter()
                .enumerate()
                .filter(|(_, v)| !v.is_nan())
                .map(|(i, &v)| [i as f64, v])
                .collect();
            plot_ui.line(
                Line::new(rolling)
                    .name(format!("media móvil ({})", params.rolling_window))
                    .color(Color32::WHITE)
                    .width(1.0),
            );

            plot_ui.hline(
                HLine::new(params.warning_threshold)
                    .name("umbral de advertencia")
                    .color(theme::status_color(StatusTier::Warning)),
            );
            plot_ui.hline(
                HLine::new(params.critical_threshold)
                    .name("umbral crítico")
                    .color(theme::status_color(StatusTier::Critical)),
            );
        });
}

// ---------------------------------------------------------------------------
// Histogram (statistics tab)
// ---------------------------------------------------------------------------

/// Equal-width histogram of the valid readings; each bucket colored by
/// where its center sits relative to the thresholds.
pub fn histogram_chart(ui: &mut Ui, bins: &[HistogramBin], params: &Params) {
    let bars: Vec<Bar> = bins
        .iter()
        .map(|bin| {
            let center = (bin.lower + bin.upper) / 2.0;
            Bar::new(center, bin.count as f64)
                .width((bin.upper - bin.lower) * 0.95)
                .fill(theme::value_color(
                    center,
                    params.warning_threshold,
                    params.critical_threshold,
                ))
        })
        .collect();

    Plot::new("histogram_chart")
        .x_axis_label(params.unit.to_string())
        .y_axis_label("Frecuencia")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("distribución"));
        });
}
