use eframe::egui::{self, ScrollArea};

use crate::config::ViewerConfig;
use crate::state::AppState;
use crate::ui::{heatmap, panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct AirQualityApp {
    pub state: AppState,
}

impl AirQualityApp {
    /// Create the app, loading the configured dataset if it exists.
    pub fn new(config: &ViewerConfig) -> Self {
        let mut state = AppState::default();
        if config.dataset_path.exists() {
            state.load(&config.dataset_path);
        } else {
            log::info!(
                "No dataset at {}; waiting for File → Open",
                config.dataset_path.display()
            );
        }
        Self { state }
    }
}

impl eframe::App for AirQualityApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: station selector and metrics ----
        egui::SidePanel::left("station_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.report.is_none() {
                ui.centered_and_justified(|ui| {
                    ui.heading("Open a file to view air quality  (File → Open…)");
                });
                return;
            }
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    plot::trend_section(ui, &self.state);
                    ui.add_space(16.0);
                    plot::ranking_section(ui, &self.state);
                    ui.add_space(16.0);
                    heatmap::correlation_section(ui, &self.state);
                });
        });
    }
}
