use eframe::egui::{self, Color32, RichText, Ui};

use crate::report::round2;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – station selector and metrics
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Air Quality Dashboard");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone what we need so we can mutate state inside the combo box.
    let stations = dataset.stations().to_vec();
    let current = state.selected_station.clone().unwrap_or_default();

    ui.strong("Select Station");
    let mut picked = None;
    egui::ComboBox::from_id_salt("station_select")
        .selected_text(&current)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for station in &stations {
                if ui.selectable_label(current == *station, station).clicked() {
                    picked = Some(station.clone());
                }
            }
        });
    if let Some(station) = picked {
        if station != current {
            state.select_station(station);
        }
    }

    ui.add_space(8.0);
    ui.separator();

    let Some(view) = &state.view else {
        return;
    };

    for pair in view.metrics.chunks(2) {
        ui.columns(2, |cols: &mut [Ui]| {
            for (col, (pollutant, value)) in cols.iter_mut().zip(pair) {
                metric(col, &pollutant.to_string(), *value);
            }
        });
    }
}

fn metric(ui: &mut Ui, label: &str, value: f64) {
    ui.group(|ui: &mut Ui| {
        ui.set_width(ui.available_width());
        ui.label(RichText::new(label).small());
        ui.label(RichText::new(format_metric(value)).size(22.0).strong());
    });
}

fn format_metric(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else {
        format!("{:.2}", round2(value))
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.report.is_some(), egui::Button::new("Export summary…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} records loaded, {} stations",
                ds.len(),
                ds.stations().len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open air quality data")
        .add_filter("Supported files", &["csv", "parquet", "pq", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.load(&path);
    }
}

fn export_dialog(state: &mut AppState) {
    let Some(report) = &state.report else {
        return;
    };
    let file = rfd::FileDialog::new()
        .set_title("Export summary")
        .set_file_name("air_quality_summary.json")
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        match report.export_json(&path) {
            Ok(()) => log::info!("Exported summary to {}", path.display()),
            Err(e) => {
                log::error!("Failed to export summary: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
