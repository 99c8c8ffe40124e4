use std::path::Path;

use anyhow::Context;
use serde::Serialize;

use crate::data::correlation::{correlation_matrix, CorrelationMatrix};
use crate::data::error::LookupError;
use crate::data::model::{Dataset, Pollutant};
use crate::data::ranking::{rank_stations, RankKey, RankedStations};
use crate::data::yearly::{aggregate, YearPoint, YearlyStationMeans};

// ---------------------------------------------------------------------------
// Report – everything one render of the dashboard needs
// ---------------------------------------------------------------------------

/// The summaries computed from a dataset for one render.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub yearly: YearlyStationMeans,
    pub by_pm25: RankedStations,
    pub by_pm10: RankedStations,
    pub correlation: CorrelationMatrix,
}

/// Order of the metric tiles.
pub const METRIC_ORDER: [Pollutant; 6] = [
    Pollutant::Pm10,
    Pollutant::Pm25,
    Pollutant::So2,
    Pollutant::No2,
    Pollutant::Co,
    Pollutant::O3,
];

/// What the dashboard shows for the selected station.
#[derive(Debug, Clone, PartialEq)]
pub struct StationView {
    pub station: String,
    /// Mean per pollutant, in [`METRIC_ORDER`].
    pub metrics: Vec<(Pollutant, f64)>,
    pub trend: Vec<YearPoint>,
}

impl Report {
    /// Run every summary over `dataset`. Nothing is reused between calls.
    pub fn build(dataset: &Dataset) -> Self {
        log::debug!("Computing report over {} records", dataset.len());
        Report {
            yearly: aggregate(dataset),
            by_pm25: rank_stations(dataset, RankKey::Pm25),
            by_pm10: rank_stations(dataset, RankKey::Pm10),
            correlation: correlation_matrix(dataset),
        }
    }

    /// Look up the metrics and yearly trend of one station.
    ///
    /// PM10, SO2 and CO come from the PM10 ranking; PM2.5, NO2 and O3 from
    /// the PM2.5 ranking.
    pub fn station_view(&self, station: &str) -> Result<StationView, LookupError> {
        let pm10 = self.by_pm10.get(station)?;
        let pm25 = self.by_pm25.get(station)?;

        let metrics = METRIC_ORDER
            .iter()
            .map(|&p| {
                let source = match p {
                    Pollutant::Pm10 | Pollutant::So2 | Pollutant::Co => pm10,
                    Pollutant::Pm25 | Pollutant::No2 | Pollutant::O3 => pm25,
                };
                (p, source.mean(p))
            })
            .collect();

        Ok(StationView {
            station: station.to_string(),
            metrics,
            trend: self.yearly.station_series(station)?,
        })
    }

    /// Write every summary as pretty-printed JSON.
    pub fn export_json(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self).context("serializing report")?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

/// Round for display the way the metric tiles show values.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            Record::new("A", 2013, [10.0, 20.0, 1.0, 2.0, 3.0, 4.0]),
            Record::new("A", 2014, [20.0, 30.0, 3.0, 4.0, 5.0, 6.0]),
            Record::new("B", 2013, [5.0, 5.0, 1.0, 1.0, 1.0, 1.0]),
        ])
    }

    #[test]
    fn station_view_orders_metrics_and_trend() {
        let report = Report::build(&dataset());
        let view = report.station_view("A").unwrap();

        let pollutants: Vec<Pollutant> = view.metrics.iter().map(|(p, _)| *p).collect();
        assert_eq!(pollutants, METRIC_ORDER.to_vec());
        let values: Vec<f64> = view.metrics.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![25.0, 15.0, 2.0, 3.0, 4.0, 5.0]);

        let years: Vec<i32> = view.trend.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2013, 2014]);
        assert_eq!(view.trend[1].mean.pm10, 30.0);
    }

    #[test]
    fn unknown_station_fails_lookup() {
        let report = Report::build(&dataset());
        assert_eq!(
            report.station_view("Nowhere"),
            Err(LookupError::StationNotFound("Nowhere".into()))
        );
    }

    #[test]
    fn both_rankings_cover_every_station() {
        let report = Report::build(&dataset());
        assert_eq!(report.by_pm25.len(), 2);
        assert_eq!(report.by_pm10.len(), 2);
        assert_eq!(report.by_pm25.key, RankKey::Pm25);
        assert_eq!(report.by_pm10.key, RankKey::Pm10);
    }

    #[test]
    fn exports_summaries_as_json() {
        let report = Report::build(&dataset());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        report.export_json(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["by_pm25"]["key"], "Pm25");
        assert_eq!(json["by_pm25"]["entries"][0]["station"], "A");
        assert_eq!(json["yearly"]["groups"]["A"]["2014"]["pm10"], 30.0);
        assert_eq!(json["correlation"]["columns"][0], "year");
    }

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(round2(82.7734), 82.77);
        assert_eq!(round2(1.005_1), 1.01);
        assert!(round2(f64::NAN).is_nan());
    }
}
