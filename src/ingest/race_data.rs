/// Race/ethnicity dataset loader.
///
/// Reads the per-state dataset the cards are built from. The JSON mirrors the
/// static data query the cards were originally fed by:
///
/// ```text
/// { "data": {
///     "allCovidRaceDataCombined": { "nodes": [ RaceRecord, ... ] },
///     "allCovidRaceDataSeparate": { "nodes": [ RaceRecord, ... ] },
///     "allCovidStateInfo":        { "nodes": [ StateInfo, ... ] } } }
/// ```
///
/// The `data` envelope is optional. See `fixtures.rs` for annotated examples.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::model::{RaceDataError, RaceRecord, StateInfo};

/// National totals share the node lists but never get a card.
pub const NATIONAL_CODE: &str = "US";

// ---------------------------------------------------------------------------
// Serde structures
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResult {
    all_covid_race_data_combined: NodeList<RaceRecord>,
    all_covid_race_data_separate: NodeList<RaceRecord>,
    all_covid_state_info: NodeList<StateInfo>,
}

#[derive(Deserialize)]
struct NodeList<T> {
    nodes: Vec<T>,
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// Parsed dataset with lookups by two-letter state code.
#[derive(Debug, Clone, Default)]
pub struct RaceDataset {
    /// States reporting race and ethnicity as one combined breakdown.
    pub combined: Vec<RaceRecord>,
    /// States reporting race and ethnicity separately.
    pub separate: Vec<RaceRecord>,
    pub states: Vec<StateInfo>,
}

impl RaceDataset {
    /// Race record for a state; separate-reporting data takes precedence.
    pub fn record_for(&self, state: &str) -> Option<&RaceRecord> {
        self.separate
            .iter()
            .find(|r| r.state == state)
            .or_else(|| self.combined.iter().find(|r| r.state == state))
    }

    pub fn state_info(&self, state: &str) -> Option<&StateInfo> {
        self.states.iter().find(|s| s.state == state)
    }

    /// True if the state appears in the combined race+ethnicity list.
    pub fn is_combined(&self, state: &str) -> bool {
        self.combined.iter().any(|r| r.state == state)
    }

    /// State codes in state-info order.
    pub fn state_codes(&self) -> Vec<&str> {
        self.states.iter().map(|s| s.state.as_str()).collect()
    }

    /// Record and info together, or `StateNotFound` if either is missing.
    pub fn lookup(&self, state: &str) -> Result<(&RaceRecord, &StateInfo), RaceDataError> {
        let record = self
            .record_for(state)
            .ok_or_else(|| RaceDataError::StateNotFound(state.to_string()))?;
        let info = self
            .state_info(state)
            .ok_or_else(|| RaceDataError::StateNotFound(state.to_string()))?;
        Ok((record, info))
    }
}

// ---------------------------------------------------------------------------
// Parsing and loading
// ---------------------------------------------------------------------------

/// Parses the dataset JSON, with or without the `data` envelope.
///
/// # Errors
/// - `RaceDataError::ParseError` — malformed JSON, missing node lists, or a
///   numeric field holding non-numeric text.
pub fn parse_dataset(json: &str) -> Result<RaceDataset, RaceDataError> {
    let mut value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| RaceDataError::ParseError(format!("JSON deserialization failed: {}", e)))?;

    let data = value.as_object_mut().and_then(|m| m.remove("data"));
    let body = data.unwrap_or(value);

    let result: QueryResult = serde_json::from_value(body)
        .map_err(|e| RaceDataError::ParseError(format!("Unexpected dataset shape: {}", e)))?;

    let not_national = |state: &str| state != NATIONAL_CODE;

    Ok(RaceDataset {
        combined: result
            .all_covid_race_data_combined
            .nodes
            .into_iter()
            .filter(|r| not_national(r.state.as_str()))
            .collect(),
        separate: result
            .all_covid_race_data_separate
            .nodes
            .into_iter()
            .filter(|r| not_national(r.state.as_str()))
            .collect(),
        states: result
            .all_covid_state_info
            .nodes
            .into_iter()
            .filter(|s| not_national(s.state.as_str()))
            .collect(),
    })
}

/// Reads and parses a dataset file.
pub fn load_dataset_file<P: AsRef<Path>>(path: P) -> Result<RaceDataset, RaceDataError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .map_err(|e| RaceDataError::Io(format!("{}: {}", path.display(), e)))?;
    parse_dataset(&contents)
}

/// Fetches and parses the dataset over HTTP.
///
/// # Errors
/// - `RaceDataError::RequestFailed` — connection or body read failure.
/// - `RaceDataError::HttpError` — non-2xx status.
/// - `RaceDataError::ParseError` — see `parse_dataset`.
pub fn fetch_dataset(
    client: &reqwest::blocking::Client,
    url: &str,
) -> Result<RaceDataset, RaceDataError> {
    let response = client
        .get(url)
        .send()
        .map_err(|e| RaceDataError::RequestFailed(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(RaceDataError::HttpError(status.as_u16()));
    }

    let body = response
        .text()
        .map_err(|e| RaceDataError::RequestFailed(e.to_string()))?;
    parse_dataset(&body)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
