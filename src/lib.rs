/// race_card_service: state-level race/ethnicity disparity cards.
///
/// # Module structure
///
/// ```text
/// race_card_service
/// ├── model       — shared data types (RaceRecord, GroupEntry, ShapingResult, RaceDataError, …)
/// ├── groups      — demographic group registry (labels, display names, bar styles)
/// ├── format      — number and percent formatting for card text
/// ├── config      — card configuration loader (cards.toml)
/// ├── logging     — leveled, stage-tagged logging
/// ├── ingest
/// │   ├── race_data — dataset parsing, file loading, HTTP fetch
/// │   └── fixtures (test only) — representative dataset payloads
/// ├── analysis
/// │   ├── groupings — shapes one state's record into ordered group entries
/// │   └── cards     — per-variant card model (chart mode, bars, text)
/// ├── export      — parallel card building and JSON file output
/// └── endpoint    — JSON HTTP API over the loaded dataset
/// ```

/// Public modules
pub mod analysis;
pub mod config;
pub mod endpoint;
pub mod export;
pub mod format;
pub mod groups;
pub mod ingest;
pub mod logging;
pub mod model;
