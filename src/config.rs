use std::path::PathBuf;

/// Dataset loaded on startup when no path is given.
pub const DEFAULT_DATASET_PATH: &str = "dashboard/air_all_station_data.csv";

/// Startup settings for the viewer window.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub dataset_path: PathBuf,
    pub window_size: [f32; 2],
    pub min_window_size: [f32; 2],
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            window_size: [1280.0, 900.0],
            min_window_size: [800.0, 600.0],
        }
    }
}

impl ViewerConfig {
    /// Build from command-line arguments (program name excluded). The first
    /// argument, if any, replaces the dataset path.
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> Self {
        let mut config = Self::default();
        if let Some(path) = args.into_iter().next() {
            config.dataset_path = PathBuf::from(path);
        }
        config
    }
}
