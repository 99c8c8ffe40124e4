use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray,
    StringArray,
};
use arrow::compute::{can_cast_types, cast};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::DataFormatError;
use super::model::{Cell, Dataset};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an air-quality dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with `station`, `year` and the six pollutant columns
/// * `.parquet` – same column names; string station, integer year
/// * `.json`    – `[{ "station": "...", "year": 2013, "PM2.5": ..., ... }, ...]`
pub fn load_file(path: &Path) -> Result<Dataset, DataFormatError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        other => Err(DataFormatError::UnsupportedExtension(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Dataset, DataFormatError> {
    let reader = csv::Reader::from_path(path)?;
    read_csv(reader)
}

/// Read CSV from any source. Every cell's type is guessed independently;
/// column types are resolved afterwards by [`Dataset::from_table`].
pub fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Dataset, DataFormatError> {
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(Cell::guess).collect());
    }

    Dataset::from_table(&headers, rows)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "station": "Aotizhongxin", "year": 2013, "PM2.5": 4.0, "PM10": 4.0, ... },
///   ...
/// ]
/// ```
///
/// The columns are the union of all object keys, in the order they first
/// appear; a key absent from an object is a missing value in that row.
fn load_json(path: &Path) -> Result<Dataset, DataFormatError> {
    let text = std::fs::read_to_string(path)?;
    parse_json(&text)
}

fn parse_json(text: &str) -> Result<Dataset, DataFormatError> {
    let root: JsonValue =
        serde_json::from_str(text).map_err(|e| DataFormatError::Json(e.to_string()))?;

    let records = root
        .as_array()
        .ok_or_else(|| DataFormatError::Json("expected top-level JSON array".into()))?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| DataFormatError::Json(format!("row {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(JsonValue::as_object)
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or(Cell::Null))
                .collect::<Vec<Cell>>()
        })
        .collect();

    Dataset::from_table(&headers, rows)
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::String(s) => Cell::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Cell::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Cell::Float(f)
            } else {
                Cell::Text(n.to_string())
            }
        }
        JsonValue::Null => Cell::Null,
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file containing station observations.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Nulls become missing values.
/// Categorical and narrow integer columns are cast before reading; a column
/// that cannot be read as text or numbers fails the load.
fn load_parquet(path: &Path) -> Result<Dataset, DataFormatError> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let columns = batch
            .columns()
            .iter()
            .zip(&headers)
            .map(|(col, name)| normalize_column(name, col))
            .collect::<Result<Vec<ArrayRef>, DataFormatError>>()?;
        for row in 0..batch.num_rows() {
            let cells = columns
                .iter()
                .zip(&headers)
                .map(|(col, name)| extract_cell(name, col, row))
                .collect::<Result<Vec<Cell>, DataFormatError>>()?;
            rows.push(cells);
        }
    }

    Dataset::from_table(&headers, rows)
}

// -- Parquet / Arrow helpers --

fn downcast<'a, T: 'static>(col: &'a ArrayRef) -> Result<&'a T, DataFormatError> {
    col.as_any().downcast_ref::<T>().ok_or_else(|| {
        arrow::error::ArrowError::CastError(format!(
            "unexpected array type for {:?}",
            col.data_type()
        ))
        .into()
    })
}

fn unsupported(column: &str, data_type: &DataType) -> DataFormatError {
    DataFormatError::UnsupportedType {
        column: column.to_string(),
        data_type: format!("{data_type:?}"),
    }
}

/// Cast a column to one of the types [`extract_cell`] reads.
///
/// Dictionary (categorical) columns are unpacked to their values, other
/// integers widen to `Int64`, and any remaining type Arrow can render as
/// text becomes `Utf8`.
fn normalize_column(name: &str, col: &ArrayRef) -> Result<ArrayRef, DataFormatError> {
    let target = match col.data_type() {
        DataType::Utf8
        | DataType::LargeUtf8
        | DataType::Int32
        | DataType::Int64
        | DataType::Float32
        | DataType::Float64 => return Ok(Arc::clone(col)),
        DataType::Int8 | DataType::Int16 | DataType::UInt8 | DataType::UInt16 | DataType::UInt32 => {
            DataType::Int64
        }
        DataType::UInt64 | DataType::Float16 | DataType::Decimal128(..) | DataType::Decimal256(..) => {
            DataType::Float64
        }
        DataType::Dictionary(_, values) => {
            let unpacked = cast(col, values.as_ref())?;
            return normalize_column(name, &unpacked);
        }
        other if can_cast_types(other, &DataType::Utf8) => DataType::Utf8,
        other => return Err(unsupported(name, other)),
    };
    Ok(cast(col, &target)?)
}

/// Extract a single cell from a normalized Arrow column at a given row.
fn extract_cell(name: &str, col: &ArrayRef, row: usize) -> Result<Cell, DataFormatError> {
    if col.is_null(row) {
        return Ok(Cell::Null);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => Cell::Text(downcast::<StringArray>(col)?.value(row).to_string()),
        DataType::LargeUtf8 => {
            Cell::Text(downcast::<LargeStringArray>(col)?.value(row).to_string())
        }
        DataType::Int32 => Cell::Integer(downcast::<Int32Array>(col)?.value(row) as i64),
        DataType::Int64 => Cell::Integer(downcast::<Int64Array>(col)?.value(row)),
        DataType::Float32 => Cell::Float(downcast::<Float32Array>(col)?.value(row) as f64),
        DataType::Float64 => Cell::Float(downcast::<Float64Array>(col)?.value(row)),
        other => return Err(unsupported(name, other)),
    };
    Ok(cell)
}
