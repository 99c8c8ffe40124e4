use std::fmt;

use serde::Serialize;

use super::error::DataFormatError;

// ---------------------------------------------------------------------------
// Pollutant – one of the six measurement columns
// ---------------------------------------------------------------------------

/// A pollutant measurement column. Column names are matched literally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Pollutant {
    Pm25,
    Pm10,
    So2,
    No2,
    Co,
    O3,
}

impl Pollutant {
    /// All pollutants in dataset column order.
    pub const ALL: [Pollutant; 6] = [
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::So2,
        Pollutant::No2,
        Pollutant::Co,
        Pollutant::O3,
    ];

    /// The header name of this pollutant's column.
    pub fn column(self) -> &'static str {
        match self {
            Pollutant::Pm25 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::So2 => "SO2",
            Pollutant::No2 => "NO2",
            Pollutant::Co => "CO",
            Pollutant::O3 => "O3",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// One value per pollutant, indexable by [`Pollutant`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PollutantValues([f64; 6]);

impl PollutantValues {
    pub fn new(values: [f64; 6]) -> Self {
        Self(values)
    }

    pub fn get(&self, pollutant: Pollutant) -> f64 {
        self.0[pollutant.index()]
    }

    pub fn set(&mut self, pollutant: Pollutant, value: f64) {
        self.0[pollutant.index()] = value;
    }
}

// ---------------------------------------------------------------------------
// Cell – a single raw value read by a loader, before schema resolution
// ---------------------------------------------------------------------------

/// A dynamically-typed table cell as produced by the CSV, JSON and Parquet
/// readers.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Float(f64),
    Null,
}

impl Cell {
    /// Guess the type of a CSV text cell. Empty cells and the usual NaN
    /// spellings are missing values.
    pub fn guess(s: &str) -> Cell {
        let s = s.trim();
        if s.is_empty() || matches!(s, "NA" | "NaN" | "nan" | "N/A") {
            return Cell::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return Cell::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return Cell::Float(f);
        }
        Cell::Text(s.to_string())
    }

    /// Numeric view of the cell. Missing values become NaN; text is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Integer(i) => Some(*i as f64),
            Cell::Float(v) => Some(*v),
            Cell::Null => Some(f64::NAN),
            Cell::Text(_) => None,
        }
    }

    fn is_numeric(&self) -> bool {
        !matches!(self, Cell::Text(_))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Integer(i) => write!(f, "{i}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Null => write!(f, "<null>"),
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the dataset
// ---------------------------------------------------------------------------

/// A single station observation (one row of the source table).
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub station: String,
    pub year: i32,
    pub pollutants: PollutantValues,
    /// Values of the dataset's extra numeric columns, aligned with
    /// [`Dataset::extra_columns`].
    pub extra: Vec<f64>,
}

impl Record {
    /// Build a record without extra columns.
    pub fn new(station: impl Into<String>, year: i32, pollutants: [f64; 6]) -> Self {
        Self {
            station: station.into(),
            year,
            pollutants: PollutantValues::new(pollutants),
            extra: Vec::new(),
        }
    }

    pub fn value(&self, pollutant: Pollutant) -> f64 {
        self.pollutants.get(pollutant)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// Where a numeric column's values live inside a [`Record`].
#[derive(Debug, Clone, Copy, PartialEq)]
enum ColumnSource {
    Year,
    Pollutant(Pollutant),
    Extra(usize),
}

/// The full parsed dataset. Never mutated after loading.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<Record>,
    /// Names of the numeric columns beyond `year` and the six pollutants.
    pub extra_columns: Vec<String>,
    /// Every numeric column in header order, with its location in a record.
    numeric: Vec<(String, ColumnSource)>,
    /// Distinct station names in first-seen order.
    stations: Vec<String>,
}

impl Dataset {
    /// Build a dataset from records that only carry the required columns.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut numeric = vec![("year".to_string(), ColumnSource::Year)];
        numeric.extend(
            Pollutant::ALL
                .iter()
                .map(|p| (p.column().to_string(), ColumnSource::Pollutant(*p))),
        );
        let stations = distinct_stations(&records);
        Dataset {
            records,
            extra_columns: Vec::new(),
            numeric,
            stations,
        }
    }

    /// Resolve a raw table into a dataset.
    ///
    /// `station`, `year` and the six pollutant columns are required. Every
    /// other column whose cells are all numeric or missing is kept as an
    /// extra numeric column; text columns are dropped.
    pub fn from_table(headers: &[String], rows: Vec<Vec<Cell>>) -> Result<Self, DataFormatError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| DataFormatError::MissingColumn(name.to_string()))
        };

        let station_idx = find("station")?;
        let year_idx = find("year")?;
        let mut pollutant_idx = [0usize; 6];
        for p in Pollutant::ALL {
            pollutant_idx[p.index()] = find(p.column())?;
        }

        let required = |i: usize| i == station_idx || i == year_idx || pollutant_idx.contains(&i);

        let extra_idx: Vec<usize> = (0..headers.len())
            .filter(|&i| !required(i))
            .filter(|&i| rows.iter().all(|r| r.get(i).map_or(true, Cell::is_numeric)))
            .collect();

        let mut numeric = Vec::new();
        for (i, name) in headers.iter().enumerate() {
            let source = if i == year_idx {
                ColumnSource::Year
            } else if let Some(p) = Pollutant::ALL.iter().find(|p| pollutant_idx[p.index()] == i) {
                ColumnSource::Pollutant(*p)
            } else if let Some(k) = extra_idx.iter().position(|&e| e == i) {
                ColumnSource::Extra(k)
            } else {
                continue;
            };
            numeric.push((name.clone(), source));
        }

        let null = Cell::Null;
        let mut records = Vec::with_capacity(rows.len());
        for (row_no, row) in rows.iter().enumerate() {
            let cell = |i: usize| row.get(i).unwrap_or(&null);

            let station = match cell(station_idx) {
                Cell::Null => return Err(DataFormatError::MissingStation { row: row_no }),
                other => other.to_string(),
            };

            let year = match cell(year_idx) {
                Cell::Integer(y) => i32::try_from(*y).ok(),
                Cell::Float(y) if y.fract() == 0.0 && YEAR_RANGE.contains(y) => Some(*y as i32),
                _ => None,
            }
            .ok_or_else(|| DataFormatError::InvalidYear {
                row: row_no,
                value: cell(year_idx).to_string(),
            })?;

            let mut pollutants = PollutantValues::default();
            for p in Pollutant::ALL {
                let c = cell(pollutant_idx[p.index()]);
                let v = c.as_f64().ok_or_else(|| DataFormatError::InvalidNumber {
                    row: row_no,
                    column: p.column().to_string(),
                    value: c.to_string(),
                })?;
                pollutants.set(p, v);
            }

            let extra = extra_idx
                .iter()
                .map(|&i| cell(i).as_f64().unwrap_or(f64::NAN))
                .collect();

            records.push(Record {
                station,
                year,
                pollutants,
                extra,
            });
        }

        let stations = distinct_stations(&records);
        Ok(Dataset {
            records,
            extra_columns: extra_idx.iter().map(|&i| headers[i].clone()).collect(),
            numeric,
            stations,
        })
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct station names in first-seen order.
    pub fn stations(&self) -> &[String] {
        &self.stations
    }

    /// Names of all numeric columns in header order.
    pub fn numeric_columns(&self) -> impl Iterator<Item = &str> {
        self.numeric.iter().map(|(name, _)| name.as_str())
    }

    /// All values of one numeric column, or `None` if no such column exists.
    pub fn column_values(&self, name: &str) -> Option<Vec<f64>> {
        let (_, source) = self.numeric.iter().find(|(n, _)| n == name)?;
        let values = self
            .records
            .iter()
            .map(|r| match *source {
                ColumnSource::Year => r.year as f64,
                ColumnSource::Pollutant(p) => r.value(p),
                ColumnSource::Extra(k) => r.extra.get(k).copied().unwrap_or(f64::NAN),
            })
            .collect();
        Some(values)
    }
}

const YEAR_RANGE: std::ops::RangeInclusive<f64> = i32::MIN as f64..=i32::MAX as f64;

fn distinct_stations(records: &[Record]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    records
        .iter()
        .filter(|r| seen.insert(r.station.as_str()))
        .map(|r| r.station.clone())
        .collect()
}
