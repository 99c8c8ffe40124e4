use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use super::error::LookupError;
use super::mean::Mean;
use super::model::{Dataset, Pollutant, PollutantValues};

/// Pollutant a station ranking can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RankKey {
    Pm25,
    Pm10,
}

impl RankKey {
    pub fn pollutant(self) -> Pollutant {
        match self {
            RankKey::Pm25 => Pollutant::Pm25,
            RankKey::Pm10 => Pollutant::Pm10,
        }
    }
}

impl fmt::Display for RankKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.pollutant().fmt(f)
    }
}

/// Mean of every pollutant over all records of one station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationMean {
    pub station: String,
    pub means: PollutantValues,
    /// Number of records in the group.
    pub count: usize,
}

impl StationMean {
    pub fn mean(&self, pollutant: Pollutant) -> f64 {
        self.means.get(pollutant)
    }
}

/// Station means ordered by one pollutant, highest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedStations {
    pub key: RankKey,
    pub entries: Vec<StationMean>,
}

impl RankedStations {
    pub fn get(&self, station: &str) -> Result<&StationMean, LookupError> {
        self.entries
            .iter()
            .find(|e| e.station == station)
            .ok_or_else(|| LookupError::StationNotFound(station.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Group records by station and average all six pollutants, in first-seen
/// station order.
pub fn station_means(dataset: &Dataset) -> Vec<StationMean> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, [Mean; 6]> = HashMap::new();

    for r in &dataset.records {
        let acc = groups.entry(r.station.as_str()).or_insert_with(|| {
            order.push(r.station.as_str());
            [Mean::default(); 6]
        });
        for (i, p) in Pollutant::ALL.iter().enumerate() {
            acc[i].push(r.value(*p));
        }
    }

    order
        .into_iter()
        .filter_map(|station| {
            let acc = groups.remove(station)?;
            Some(StationMean {
                station: station.to_string(),
                means: PollutantValues::new(acc.map(|m| m.value())),
                count: acc[0].count(),
            })
        })
        .collect()
}

/// Rank stations by their mean of `key`, highest first.
///
/// The sort is stable: stations with equal means keep their first-seen
/// order. NaN means sort after every number.
pub fn rank_stations(dataset: &Dataset, key: RankKey) -> RankedStations {
    let pollutant = key.pollutant();
    let mut entries = station_means(dataset);
    entries.sort_by(|a, b| descending_nan_last(a.mean(pollutant), b.mean(pollutant)));
    RankedStations { key, entries }
}

fn descending_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;

    fn worked_example() -> Dataset {
        Dataset::from_records(vec![
            Record::new("A", 2013, [10.0, 20.0, 1.0, 1.0, 1.0, 1.0]),
            Record::new("A", 2013, [20.0, 30.0, 1.0, 1.0, 1.0, 1.0]),
            Record::new("B", 2013, [5.0, 5.0, 1.0, 1.0, 1.0, 1.0]),
        ])
    }

    fn order(ranked: &RankedStations) -> Vec<&str> {
        ranked.entries.iter().map(|e| e.station.as_str()).collect()
    }

    #[test]
    fn ranks_worked_example_by_pm25() {
        let ranked = rank_stations(&worked_example(), RankKey::Pm25);
        assert_eq!(order(&ranked), vec!["A", "B"]);
        assert_eq!(ranked.entries[0].mean(Pollutant::Pm25), 15.0);
        assert_eq!(ranked.entries[1].mean(Pollutant::Pm25), 5.0);
    }

    #[test]
    fn ranking_is_a_sorted_permutation_of_stations() {
        let ds = Dataset::from_records(vec![
            Record::new("Dongsi", 2013, [80.0, 110.0, 1.0, 1.0, 1.0, 1.0]),
            Record::new("Dingling", 2013, [60.0, 130.0, 1.0, 1.0, 1.0, 1.0]),
            Record::new("Tiantan", 2014, [90.0, 100.0, 1.0, 1.0, 1.0, 1.0]),
            Record::new("Dongsi", 2014, [70.0, 90.0, 1.0, 1.0, 1.0, 1.0]),
        ]);

        for key in [RankKey::Pm25, RankKey::Pm10] {
            let ranked = rank_stations(&ds, key);
            let mut stations = order(&ranked);
            stations.sort_unstable();
            assert_eq!(stations, vec!["Dingling", "Dongsi", "Tiantan"]);

            let means: Vec<f64> = ranked.entries.iter().map(|e| e.mean(key.pollutant())).collect();
            assert!(means.windows(2).all(|w| w[0] >= w[1]), "{key}: {means:?}");
        }

        assert_eq!(order(&rank_stations(&ds, RankKey::Pm10)), vec!["Dingling", "Dongsi", "Tiantan"]);
    }

    #[test]
    fn group_sizes_sum_to_dataset_len() {
        let ds = worked_example();
        let total: usize = station_means(&ds).iter().map(|m| m.count).sum();
        assert_eq!(total, ds.len());
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let ds = Dataset::from_records(vec![
            Record::new("Zeta", 2013, [5.0; 6]),
            Record::new("Alpha", 2013, [5.0; 6]),
            Record::new("Mid", 2013, [9.0; 6]),
        ]);
        let ranked = rank_stations(&ds, RankKey::Pm25);
        assert_eq!(order(&ranked), vec!["Mid", "Zeta", "Alpha"]);
    }

    #[test]
    fn nan_means_sort_last() {
        let ds = Dataset::from_records(vec![
            Record::new("Gap", 2013, [f64::NAN, 1.0, 1.0, 1.0, 1.0, 1.0]),
            Record::new("Low", 2013, [1.0; 6]),
            Record::new("High", 2013, [3.0; 6]),
        ]);
        let ranked = rank_stations(&ds, RankKey::Pm25);
        assert_eq!(order(&ranked), vec!["High", "Low", "Gap"]);
    }

    #[test]
    fn computes_all_six_means() {
        let ds = Dataset::from_records(vec![
            Record::new("A", 2013, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
            Record::new("A", 2014, [3.0, 4.0, 5.0, 6.0, 7.0, 8.0]),
        ]);
        let means = &station_means(&ds)[0];
        let values: Vec<f64> = Pollutant::ALL.iter().map(|p| means.mean(*p)).collect();
        assert_eq!(values, vec![2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn unknown_station_is_a_lookup_error() {
        let ranked = rank_stations(&worked_example(), RankKey::Pm10);
        assert_eq!(ranked.get("Z"), Err(LookupError::StationNotFound("Z".into())));
        assert_eq!(ranked.get("B").unwrap().mean(Pollutant::Pm10), 5.0);
    }

    #[test]
    fn ranking_is_idempotent() {
        let ds = worked_example();
        assert_eq!(rank_stations(&ds, RankKey::Pm10), rank_stations(&ds, RankKey::Pm10));
    }
}
