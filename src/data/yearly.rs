use std::collections::BTreeMap;

use serde::Serialize;

use super::error::LookupError;
use super::mean::Mean;
use super::model::{Dataset, Pollutant};

/// Mean particulate levels for one (station, year) group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearMean {
    pub pm25: f64,
    pub pm10: f64,
}

/// One point of a station's yearly trend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearPoint {
    pub year: i32,
    pub mean: YearMean,
}

/// Per-(station, year) means of PM2.5 and PM10.
///
/// Stored as station → year → mean so a station's series comes out in
/// ascending year order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct YearlyStationMeans {
    groups: BTreeMap<String, BTreeMap<i32, YearMean>>,
}

impl YearlyStationMeans {
    /// All yearly means of a station, ascending by year.
    pub fn station_series(&self, station: &str) -> Result<Vec<YearPoint>, LookupError> {
        let years = self
            .groups
            .get(station)
            .ok_or_else(|| LookupError::StationNotFound(station.to_string()))?;
        Ok(years
            .iter()
            .map(|(&year, &mean)| YearPoint { year, mean })
            .collect())
    }
}

// Lookups used to inspect a result by key.
#[cfg(test)]
impl YearlyStationMeans {
    /// Number of (station, year) groups.
    pub fn len(&self) -> usize {
        self.groups.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Mean for one (station, year) pair.
    pub fn get(&self, station: &str, year: i32) -> Result<YearMean, LookupError> {
        let years = self
            .groups
            .get(station)
            .ok_or_else(|| LookupError::StationNotFound(station.to_string()))?;
        years.get(&year).copied().ok_or_else(|| LookupError::YearNotFound {
            station: station.to_string(),
            year,
        })
    }

    /// Iterate over every group as `(station, year, mean)` in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i32, YearMean)> {
        self.groups.iter().flat_map(|(station, years)| {
            years
                .iter()
                .map(move |(&year, &mean)| (station.as_str(), year, mean))
        })
    }
}

/// Group records by (station, year) and average PM2.5 and PM10 per group.
///
/// Missing values are not skipped; a NaN in a group makes that group's mean
/// NaN.
pub fn aggregate(dataset: &Dataset) -> YearlyStationMeans {
    let mut acc: BTreeMap<&str, BTreeMap<i32, (Mean, Mean)>> = BTreeMap::new();
    for r in &dataset.records {
        let (pm25, pm10) = acc
            .entry(r.station.as_str())
            .or_default()
            .entry(r.year)
            .or_default();
        pm25.push(r.value(Pollutant::Pm25));
        pm10.push(r.value(Pollutant::Pm10));
    }

    let groups = acc
        .into_iter()
        .map(|(station, years)| {
            let years = years
                .into_iter()
                .map(|(year, (pm25, pm10))| {
                    let mean = YearMean {
                        pm25: pm25.value(),
                        pm10: pm10.value(),
                    };
                    (year, mean)
                })
                .collect();
            (station.to_string(), years)
        })
        .collect();

    YearlyStationMeans { groups }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::data::model::Record;

    fn worked_example() -> Dataset {
        Dataset::from_records(vec![
            Record::new("A", 2013, [10.0, 20.0, 1.0, 1.0, 1.0, 1.0]),
            Record::new("A", 2013, [20.0, 30.0, 1.0, 1.0, 1.0, 1.0]),
            Record::new("B", 2013, [5.0, 5.0, 1.0, 1.0, 1.0, 1.0]),
        ])
    }

    #[test]
    fn averages_each_station_year_group() {
        let yearly = aggregate(&worked_example());
        assert_eq!(yearly.get("A", 2013).unwrap(), YearMean { pm25: 15.0, pm10: 25.0 });
        assert_eq!(yearly.get("B", 2013).unwrap(), YearMean { pm25: 5.0, pm10: 5.0 });
    }

    #[test]
    fn one_entry_per_distinct_station_year() {
        let ds = Dataset::from_records(vec![
            Record::new("A", 2014, [1.0; 6]),
            Record::new("A", 2013, [3.0; 6]),
            Record::new("B", 2013, [5.0; 6]),
            Record::new("A", 2014, [7.0; 6]),
            Record::new("A", 2013, [9.0; 6]),
        ]);
        let yearly = aggregate(&ds);

        let expected: HashSet<(String, i32)> = ds
            .records
            .iter()
            .map(|r| (r.station.clone(), r.year))
            .collect();
        let actual: HashSet<(String, i32)> = yearly
            .iter()
            .map(|(s, y, _)| (s.to_string(), y))
            .collect();
        assert_eq!(yearly.len(), expected.len());
        assert_eq!(actual, expected);

        for (station, year, mean) in yearly.iter() {
            let rows: Vec<f64> = ds
                .records
                .iter()
                .filter(|r| r.station == station && r.year == year)
                .map(|r| r.value(Pollutant::Pm25))
                .collect();
            let manual = rows.iter().sum::<f64>() / rows.len() as f64;
            assert_eq!(mean.pm25, manual);
        }
    }

    #[test]
    fn single_record_group_is_its_own_mean() {
        let ds = Dataset::from_records(vec![Record::new("C", 2016, [42.0, 84.0, 0.0, 0.0, 0.0, 0.0])]);
        let yearly = aggregate(&ds);
        assert_eq!(yearly.get("C", 2016).unwrap(), YearMean { pm25: 42.0, pm10: 84.0 });
    }

    #[test]
    fn missing_value_poisons_the_group_mean() {
        let ds = Dataset::from_records(vec![
            Record::new("A", 2013, [f64::NAN, 10.0, 1.0, 1.0, 1.0, 1.0]),
            Record::new("A", 2013, [4.0, 20.0, 1.0, 1.0, 1.0, 1.0]),
        ]);
        let mean = aggregate(&ds).get("A", 2013).unwrap();
        assert!(mean.pm25.is_nan());
        assert_eq!(mean.pm10, 15.0);
    }

    #[test]
    fn series_is_sorted_by_year() {
        let ds = Dataset::from_records(vec![
            Record::new("A", 2015, [3.0; 6]),
            Record::new("A", 2013, [1.0; 6]),
            Record::new("A", 2014, [2.0; 6]),
        ]);
        let series = aggregate(&ds).station_series("A").unwrap();
        let years: Vec<i32> = series.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2013, 2014, 2015]);
        assert_eq!(series[1].mean.pm25, 2.0);
    }

    #[test]
    fn unknown_station_is_a_lookup_error() {
        let yearly = aggregate(&worked_example());
        assert_eq!(
            yearly.station_series("Z"),
            Err(LookupError::StationNotFound("Z".into()))
        );
        assert_eq!(
            yearly.get("Z", 2013),
            Err(LookupError::StationNotFound("Z".into()))
        );
    }

    #[test]
    fn missing_year_of_known_station_names_the_year() {
        let yearly = aggregate(&worked_example());
        let err = yearly.get("A", 1999).unwrap_err();
        assert_eq!(
            err,
            LookupError::YearNotFound {
                station: "A".into(),
                year: 1999
            }
        );
        assert_eq!(err.to_string(), "station 'A' has no data for 1999");
    }

    #[test]
    fn empty_dataset_yields_empty_result() {
        let yearly = aggregate(&Dataset::default());
        assert!(yearly.is_empty());
        assert!(yearly.station_series("A").is_err());
    }

    #[test]
    fn aggregation_is_idempotent() {
        let ds = worked_example();
        assert_eq!(aggregate(&ds), aggregate(&ds));
    }
}
