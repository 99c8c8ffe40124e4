use std::path::Path;

use crate::data::loader::load_file;
use crate::data::model::Dataset;
use crate::report::{Report, StationView};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<Dataset>,

    /// Station chosen in the selector.
    pub selected_station: Option<String>,

    /// Summaries from the last render trigger.
    pub report: Option<Report>,

    /// Metrics and trend of the selected station.
    pub view: Option<StationView>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Load a file and make it the current dataset. On failure the previous
    /// dataset stays in place and the error is shown.
    pub fn load(&mut self, path: &Path) {
        match load_file(path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} records from {} stations ({}) with numeric columns {:?}",
                    dataset.len(),
                    dataset.stations().len(),
                    path.display(),
                    dataset.numeric_columns().collect::<Vec<_>>()
                );
                if dataset.is_empty() {
                    log::warn!("{} contains no records", path.display());
                }
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error loading {}: {e}", path.display()));
            }
        }
    }

    /// Ingest a newly loaded dataset and select its first station.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.selected_station = dataset.stations().first().cloned();
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refresh();
    }

    /// Change the selected station and recompute.
    pub fn select_station(&mut self, station: String) {
        self.selected_station = Some(station);
        self.refresh();
    }

    /// Recompute every summary from the dataset and look up the selection.
    pub fn refresh(&mut self) {
        let Some(dataset) = &self.dataset else {
            return;
        };
        let report = Report::build(dataset);

        self.view = None;
        if let Some(station) = &self.selected_station {
            match report.station_view(station) {
                Ok(view) => {
                    self.view = Some(view);
                    self.status_message = None;
                }
                Err(e) => {
                    log::warn!("Station lookup failed: {e}");
                    self.status_message = Some(format!("Error: {e}"));
                }
            }
        }
        self.report = Some(report);
    }
}
