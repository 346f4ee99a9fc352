use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::export::{self, FILTERED_CSV_NAME, SUMMARY_TXT_NAME};
use crate::data::filter::{self, FilterResult};
use crate::data::model::{CanonicalSeries, VALUE_COLUMN};
use crate::state::{ChartKind, SessionState, Tab, UnitLabel, ROLLING_WINDOW_RANGE};
use crate::theme;
use crate::ui::plot;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut SessionState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Archivo", |ui: &mut Ui| {
            if ui.button("📁 Abrir CSV…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(series) = &state.series {
            ui.label(format!(
                "{} lecturas, {} válidas",
                series.len(),
                series.valid_count()
            ));
        }

        if let Some(msg) = &state.error_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Side panel – operator parameters
// ---------------------------------------------------------------------------

/// Render the parameter panel. Any change triggers a full recompute of the
/// derived results; nothing is cached across interactions.
pub fn side_panel(ui: &mut Ui, state: &mut SessionState) {
    ui.heading(RichText::new("Parámetros").color(theme::ACCENT));
    ui.separator();

    let mut changed = false;

    ui.label("Unidad");
    egui::ComboBox::from_id_salt("unit")
        .selected_text(state.params.unit.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            for unit in UnitLabel::ALL {
                changed |= ui
                    .selectable_value(&mut state.params.unit, unit, unit.to_string())
                    .changed();
            }
        });
    ui.add_space(8.0);

    ui.label("Umbral de advertencia");
    changed |= ui
        .add(egui::DragValue::new(&mut state.params.warning_threshold).speed(1.0))
        .changed();

    ui.label("Umbral crítico");
    changed |= ui
        .add(egui::DragValue::new(&mut state.params.critical_threshold).speed(1.0))
        .changed();
    ui.add_space(8.0);

    ui.label("Ventana de media móvil");
    changed |= ui
        .add(egui::Slider::new(
            &mut state.params.rolling_window,
            ROLLING_WINDOW_RANGE,
        ))
        .changed();

    if changed {
        state.recompute();
    }
}

// ---------------------------------------------------------------------------
// Central panel – tabs
// ---------------------------------------------------------------------------

/// Render the central panel: fatal errors replace everything, the
/// invalid-time warning renders alongside normal output.
pub fn central(ui: &mut Ui, state: &mut SessionState) {
    if let Some(msg) = state.error_message.clone() {
        ui.add_space(24.0);
        ui.vertical_centered(|ui: &mut Ui| {
            ui.heading(RichText::new(format!("⚠ {msg}")).color(Color32::RED));
            ui.label("Asegúrese de que el archivo CSV tenga al menos una columna con datos.");
        });
        return;
    }

    if state.series.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Abra un archivo CSV con lecturas  (Archivo → Abrir CSV…)");
        });
        return;
    }

    if let Some(warning) = state.invalid_time_warning() {
        ui.label(RichText::new(format!("⚠ {warning}")).color(Color32::from_rgb(0xff, 0xb7, 0x03)));
        ui.separator();
    }

    ui.horizontal(|ui: &mut Ui| {
        for tab in Tab::ALL {
            if ui
                .selectable_label(state.active_tab == tab, tab.title())
                .clicked()
            {
                state.active_tab = tab;
            }
        }
    });
    ui.separator();

    match state.active_tab {
        Tab::Visualization => visualization_tab(ui, state),
        Tab::Statistics => statistics_tab(ui, state),
        Tab::Filters => filters_tab(ui, state),
        Tab::SiteInfo => site_info_tab(ui),
    }
}

// ---------------------------------------------------------------------------
// Visualization tab
// ---------------------------------------------------------------------------

fn visualization_tab(ui: &mut Ui, state: &mut SessionState) {
    ui.label("Tipo de gráfico");
    egui::ComboBox::from_id_salt("chart_kind")
        .selected_text(state.params.chart.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            for kind in ChartKind::ALL {
                ui.selectable_value(&mut state.params.chart, kind, kind.to_string());
            }
        });

    let (Some(series), Some(derived)) = (&state.series, &state.derived) else {
        return;
    };

    let chart_height = if state.params.show_raw {
        ui.available_height() * 0.6
    } else {
        (ui.available_height() - 32.0).max(120.0)
    };
    ui.allocate_ui([ui.available_width(), chart_height].into(), |ui: &mut Ui| {
        plot::reading_chart(ui, series, derived, &state.params);
    });

    ui.checkbox(&mut state.params.show_raw, "🔎 Mostrar datos crudos");
    if state.params.show_raw {
        data_table(ui, "raw_data", series, FilterResult::full(series).positions());
    }
}

// ---------------------------------------------------------------------------
// Statistics tab
// ---------------------------------------------------------------------------

fn statistics_tab(ui: &mut Ui, state: &mut SessionState) {
    let (Some(series), Some(derived)) = (&state.series, &state.derived) else {
        return;
    };
    let stats = &derived.stats;
    let unit = state.params.unit;

    ui.columns(2, |cols: &mut [Ui]| {
        let ui = &mut cols[0];
        ui.heading(RichText::new("Análisis Estadístico").color(theme::ACCENT));
        egui::Grid::new("stats_grid").striped(true).show(ui, |ui: &mut Ui| {
            let mut row = |name: &str, value: String| {
                ui.strong(name);
                ui.label(value);
                ui.end_row();
            };
            row("Count", stats.count.to_string());
            row("Mean", format!("{:.2}", stats.mean));
            row("Std", format!("{:.2}", stats.std));
            row("Min", format!("{:.2}", stats.min));
            row("25%", format!("{:.2}", stats.q25));
            row("50%", format!("{:.2}", stats.q50));
            row("75%", format!("{:.2}", stats.q75));
            row("Max", format!("{:.2}", stats.max));
        });

        let ui = &mut cols[1];
        ui.heading(RichText::new("Última lectura").color(theme::ACCENT));
        ui.label(
            RichText::new(format!("{:.2} {unit}", derived.last.value))
                .size(28.0)
                .strong(),
        );
        match derived.last.time {
            Some(t) => ui.label(format!("Hora: {}", t.format("%Y-%m-%d %H:%M:%S"))),
            None => ui.label("Hora: no disponible"),
        };
        ui.label(
            RichText::new(format!("Estado: {}", derived.status))
                .color(theme::status_color(derived.status))
                .strong(),
        );

        ui.add_space(8.0);
        if ui.button("⬇ Descargar resumen").clicked() {
            let text = export::export_summary_txt(
                stats,
                &unit.to_string(),
                Some(&derived.last),
                Some(derived.status),
            );
            save_text_dialog(SUMMARY_TXT_NAME, "Guardar resumen", &text);
        }
    });

    ui.separator();
    match &derived.histogram {
        Some(bins) => plot::histogram_chart(ui, bins, &state.params),
        None => {
            // Degenerate series: the histogram is undefined (min == max).
            ui.label(format!(
                "Todos los valores son iguales ({:.2}); no hay distribución que mostrar.",
                series.value_range().map(|(lo, _)| lo).unwrap_or(f64::NAN)
            ));
        }
    }
}

// ---------------------------------------------------------------------------
// Filters tab
// ---------------------------------------------------------------------------

fn filters_tab(ui: &mut Ui, state: &mut SessionState) {
    let Some(series) = &state.series else { return };

    let Some((min, max)) = series.value_range() else {
        return;
    };

    if series.is_degenerate() {
        // Slider bounds collapse to a single point: filtering is disabled
        // and the full series is shown instead.
        ui.label(
            RichText::new(format!(
                "⚠ Todos los valores en el dataset son iguales: {min:.2}"
            ))
            .color(Color32::from_rgb(0xff, 0xb7, 0x03)),
        );
        ui.label("No es posible aplicar filtros cuando no hay variación en los datos.");
        data_table(ui, "degenerate_full", series, FilterResult::full(series).positions());
        return;
    }

    let params = &mut state.params;
    ui.columns(2, |cols: &mut [Ui]| {
        let ui = &mut cols[0];
        ui.add(
            egui::Slider::new(&mut params.lower_bound, min..=max).text("Valor mínimo"),
        );
        if let Ok(above) = filter::greater_than(series, params.lower_bound) {
            ui.label(format!(
                "Registros con valor superior a {:.2}: {}",
                params.lower_bound,
                above.len()
            ));
            data_table(ui, "filter_above", series, above.positions());
        }

        let ui = &mut cols[1];
        ui.add(
            egui::Slider::new(&mut params.upper_bound, min..=max).text("Valor máximo"),
        );
        if let Ok(below) = filter::less_than(series, params.upper_bound) {
            ui.label(format!(
                "Registros con valor inferior a {:.2}: {}",
                params.upper_bound,
                below.len()
            ));
            data_table(ui, "filter_below", series, below.positions());
        }
    });

    ui.separator();
    ui.checkbox(
        &mut params.combined_export,
        "Exportar solo el rango combinado (mínimo < valor < máximo)",
    );
    if ui.button("⬇ Descargar datos filtrados").clicked() {
        match filter::export_selection(
            series,
            params.lower_bound,
            params.upper_bound,
            params.combined_export,
        ) {
            Ok(selection) => match export::export_csv(series, &selection) {
                Ok(text) => {
                    save_text_dialog(FILTERED_CSV_NAME, "Guardar datos filtrados", &text)
                }
                Err(e) => log::error!("CSV export failed: {e:#}"),
            },
            Err(e) => log::warn!("export skipped: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Site info tab
// ---------------------------------------------------------------------------

fn site_info_tab(ui: &mut Ui) {
    ui.columns(2, |cols: &mut [Ui]| {
        let ui = &mut cols[0];
        ui.heading(RichText::new("📍 Ubicación del Sensor").color(theme::ACCENT));
        ui.strong("Universidad EAFIT");
        ui.label("• Latitud: 6.2006");
        ui.label("• Longitud: -75.5783");
        ui.label("• Altitud: ~1,495 metros sobre el nivel del mar");

        let ui = &mut cols[1];
        ui.heading(RichText::new("🔧 Detalles del Sensor").color(theme::ACCENT));
        ui.label("• Tipo: ESP32");
        ui.label("• Variable medida: concentración de gas");
        ui.label("• Frecuencia de medición: según configuración");
        ui.label("• Ubicación: campus universitario");
    });
}

// ---------------------------------------------------------------------------
// Data table
// ---------------------------------------------------------------------------

/// Two-column table (index, value) over a positional selection. Invalid
/// rows are rendered dimmed, never dropped.
fn data_table(ui: &mut Ui, id: &str, series: &CanonicalSeries, positions: &[usize]) {
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto().at_least(150.0))
            .column(Column::remainder())
            .max_scroll_height(240.0)
            .header(18.0, |mut header| {
                header.col(|ui| {
                    ui.strong(series.index.column_name());
                });
                header.col(|ui| {
                    ui.strong(VALUE_COLUMN);
                });
            })
            .body(|body| {
                body.rows(16.0, positions.len(), |mut row| {
                    let pos = positions[row.index()];
                    row.col(|ui| {
                        let label = series.index.label(pos);
                        if label.is_empty() {
                            ui.weak("(tiempo inválido)");
                        } else {
                            ui.label(label);
                        }
                    });
                    row.col(|ui| {
                        let value = series.values[pos];
                        if value.is_nan() {
                            ui.weak("(no numérico)");
                        } else {
                            ui.label(format!("{value:.2}"));
                        }
                    });
                });
            });
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut SessionState) {
    let file = rfd::FileDialog::new()
        .set_title("Seleccione archivo CSV con lecturas")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        match std::fs::read(&path) {
            Ok(bytes) => {
                state.load_bytes(&bytes);
                if let Some(series) = &state.series {
                    log::info!(
                        "loaded {}: {} rows, {}",
                        path.display(),
                        series.len(),
                        series.index
                    );
                }
            }
            Err(e) => {
                log::error!("failed to read {}: {e}", path.display());
                state.error_message = Some(format!("No se pudo leer el archivo: {e}"));
            }
        }
    }
}

fn save_text_dialog(default_name: &str, title: &str, contents: &str) {
    let file = rfd::FileDialog::new()
        .set_title(title)
        .set_file_name(default_name)
        .save_file();

    if let Some(path) = file {
        match std::fs::write(&path, contents) {
            Ok(()) => log::info!("wrote {}", path.display()),
            Err(e) => log::error!("failed to write {}: {e}", path.display()),
        }
    }
}
