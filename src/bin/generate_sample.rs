use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const POLLUTANTS: [&str; 6] = ["PM2.5", "PM10", "SO2", "NO2", "CO", "O3"];
const WIND: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Station name and a pollution multiplier.
const STATIONS: [(&str, f64); 12] = [
    ("Aotizhongxin", 1.05),
    ("Changping", 0.85),
    ("Dingling", 0.75),
    ("Dongsi", 1.12),
    ("Guanyuan", 1.06),
    ("Gucheng", 1.10),
    ("Huairou", 0.80),
    ("Nongzhanguan", 1.08),
    ("Shunyi", 0.93),
    ("Tiantan", 1.02),
    ("Wanliu", 1.04),
    ("Wanshouxiqiao", 1.09),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// One generated day of observations.
struct Row {
    no: i64,
    year: i64,
    month: i64,
    day: i64,
    pollutants: [f64; 6],
    /// Missing on roughly one day in a hundred.
    temp: Option<f64>,
    wd: &'static str,
    station: &'static str,
}

fn generate(rng: &mut SimpleRng) -> Vec<Row> {
    let mut rows = Vec::new();
    let mut no = 1;
    for (station, factor) in STATIONS {
        for year in 2013..=2017 {
            // Slow improvement year on year.
            let trend = 1.0 - (year - 2013) as f64 * 0.06;
            for month in 1..=12 {
                // Winter heating season is dirtier and colder.
                let season = (2.0 * std::f64::consts::PI * (month as f64 - 1.0) / 12.0).cos();
                for day in 1..=28 {
                    let smog = (factor * trend * (1.0 + 0.35 * season) * rng.gauss(1.0, 0.3)).max(0.05);
                    let base = [80.0, 105.0, 15.0, 50.0, 1200.0, 55.0];
                    let mut pollutants = [0.0; 6];
                    for (i, slot) in pollutants.iter_mut().enumerate() {
                        // O3 runs opposite to the particulates.
                        let level = if i == 5 { base[i] * (2.0 - smog) } else { base[i] * smog };
                        *slot = level.max(1.0);
                    }
                    let temp = rng.gauss(13.0 - 15.0 * season, 3.0);
                    rows.push(Row {
                        no,
                        year,
                        month,
                        day,
                        pollutants,
                        temp: (rng.next_f64() > 0.01).then_some(temp),
                        wd: WIND[(rng.next_u64() % WIND.len() as u64) as usize],
                        station,
                    });
                    no += 1;
                }
            }
        }
    }
    rows
}

fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    let mut header = vec!["No", "year", "month", "day"];
    header.extend(POLLUTANTS);
    header.extend(["TEMP", "wd", "station"]);
    writer.write_record(&header)?;

    for r in rows {
        let mut record = vec![r.no.to_string(), r.year.to_string(), r.month.to_string(), r.day.to_string()];
        record.extend(r.pollutants.iter().map(|v| format!("{v:.1}")));
        record.push(r.temp.map(|t| format!("{t:.1}")).unwrap_or_default());
        record.push(r.wd.to_string());
        record.push(r.station.to_string());
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[Row]) -> Result<()> {
    let int_column = |f: fn(&Row) -> i64| -> ArrayRef {
        Arc::new(Int64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let mut fields = vec![
        Field::new("No", DataType::Int64, false),
        Field::new("year", DataType::Int64, false),
        Field::new("month", DataType::Int64, false),
        Field::new("day", DataType::Int64, false),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        int_column(|r: &Row| r.no),
        int_column(|r: &Row| r.year),
        int_column(|r: &Row| r.month),
        int_column(|r: &Row| r.day),
    ];

    for (i, name) in POLLUTANTS.iter().enumerate() {
        fields.push(Field::new(*name, DataType::Float64, false));
        let values: Vec<f64> = rows.iter().map(|r| r.pollutants[i]).collect();
        columns.push(Arc::new(Float64Array::from(values)));
    }

    fields.push(Field::new("TEMP", DataType::Float64, true));
    columns.push(Arc::new(Float64Array::from(rows.iter().map(|r| r.temp).collect::<Vec<_>>())));
    fields.push(Field::new("wd", DataType::Utf8, false));
    columns.push(Arc::new(StringArray::from(rows.iter().map(|r| r.wd).collect::<Vec<_>>())));
    fields.push(Field::new("station", DataType::Utf8, false));
    columns.push(Arc::new(StringArray::from(rows.iter().map(|r| r.station).collect::<Vec<_>>())));

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let out_dir = PathBuf::from(std::env::args().nth(1).unwrap_or_else(|| "dashboard".to_string()));
    std::fs::create_dir_all(&out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    let csv_path = out_dir.join("air_all_station_data.csv");
    write_csv(&csv_path, &rows)?;
    let parquet_path = out_dir.join("air_all_station_data.parquet");
    write_parquet(&parquet_path, &rows)?;

    log::info!(
        "Wrote {} rows for {} stations to {} and {}",
        rows.len(),
        STATIONS.len(),
        csv_path.display(),
        parquet_path.display()
    );
    println!("Wrote {} rows to {}", rows.len(), out_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn pollutants_are_complete_so_station_means_are_finite() {
        let rows = generate(&mut SimpleRng::new(42));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("air_all_station_data.csv");
        write_csv(&path, &rows).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        let col = |name: &str| headers.iter().position(|h| h == name).unwrap();
        let station = col("station");
        let pollutants: Vec<usize> = POLLUTANTS.iter().map(|p| col(*p)).collect();
        let temp = col("TEMP");

        let mut sums: HashMap<String, ([f64; 6], usize)> = HashMap::new();
        let mut missing_temp = 0;
        for record in reader.records() {
            let record = record.unwrap();
            let (sum, count) = sums.entry(record[station].to_string()).or_default();
            for (k, &i) in pollutants.iter().enumerate() {
                sum[k] += record[i].parse::<f64>().unwrap();
            }
            *count += 1;
            if record[temp].is_empty() {
                missing_temp += 1;
            }
        }

        assert_eq!(sums.len(), STATIONS.len());
        for (station, (sum, count)) in &sums {
            for total in sum {
                let mean = total / *count as f64;
                assert!(mean.is_finite() && mean > 0.0, "{station}: {mean}");
            }
        }
        assert!(missing_temp > 0);
    }

    #[test]
    fn writes_readable_parquet() {
        let rows = generate(&mut SimpleRng::new(7));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("air_all_station_data.parquet");
        write_parquet(&path, &rows).unwrap();

        let file = std::fs::File::open(&path).unwrap();
        let reader = parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder::try_new(file)
            .unwrap()
            .build()
            .unwrap();
        let total: usize = reader.map(|batch| batch.unwrap().num_rows()).sum();
        assert_eq!(total, rows.len());
    }
}
