/// Data layer: core types, loading, and the summary computations.
///
/// Architecture:
/// ```text
///  .csv / .parquet / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<Record>, numeric columns, stations
///   └──────────┘
///        │
///        ├──────────────┬───────────────┐
///        ▼              ▼               ▼
///   ┌──────────┐  ┌──────────┐  ┌─────────────┐
///   │  yearly   │  │ ranking  │  │ correlation │
///   └──────────┘  └──────────┘  └─────────────┘
/// ```

pub mod correlation;
pub mod error;
pub mod loader;
pub mod model;
pub mod ranking;
pub mod yearly;

mod mean;
