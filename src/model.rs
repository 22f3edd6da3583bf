/// Core data types for the race disparity card service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic beyond simple accessors, and no I/O.

use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Scaling
// ---------------------------------------------------------------------------

/// Dataset rates are per 1,000 people; cards show them per 100,000.
pub const PER_CAPITA_SCALE: f64 = 100.0;

// ---------------------------------------------------------------------------
// Demographic groups
// ---------------------------------------------------------------------------

/// The six race/ethnicity reporting categories, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DemographicGroup {
    Black,
    #[serde(rename = "Hispanic/Latino")]
    HispanicLatino,
    Asian,
    #[serde(rename = "AIAN")]
    Aian,
    White,
    #[serde(rename = "NHPI")]
    Nhpi,
}

impl DemographicGroup {
    /// Canonical order. Ties in "worst group" resolve to the earliest entry.
    pub const ALL: [DemographicGroup; 6] = [
        DemographicGroup::Black,
        DemographicGroup::HispanicLatino,
        DemographicGroup::Asian,
        DemographicGroup::Aian,
        DemographicGroup::White,
        DemographicGroup::Nhpi,
    ];

    /// Short label used as the group identifier in card data.
    pub fn label(&self) -> &'static str {
        match self {
            DemographicGroup::Black => "Black",
            DemographicGroup::HispanicLatino => "Hispanic/Latino",
            DemographicGroup::Asian => "Asian",
            DemographicGroup::Aian => "AIAN",
            DemographicGroup::White => "White",
            DemographicGroup::Nhpi => "NHPI",
        }
    }
}

impl std::fmt::Display for DemographicGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Display category tag for a group's bars. Consumers map it to a style;
/// nothing in this crate interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BarStyle {
    #[serde(rename = "barBlack")]
    Black,
    #[serde(rename = "barLatinx")]
    Latinx,
    #[serde(rename = "barAsian")]
    Asian,
    #[serde(rename = "barAian")]
    Aian,
    #[serde(rename = "barWhite")]
    White,
    #[serde(rename = "barNhpi")]
    Nhpi,
}

// ---------------------------------------------------------------------------
// Input records
// ---------------------------------------------------------------------------

/// One state's race/ethnicity record from the dataset.
///
/// Rates are per 1,000 people. Every numeric field is `None` when the state
/// did not report it (empty string, null, or missing in the source JSON).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceRecord {
    pub state: String,
    #[serde(default)]
    pub state_name: Option<String>,

    // Share of cases/deaths with known race+ethnicity (combined states)
    #[serde(default, deserialize_with = "reported_value")]
    pub known_race_eth_pos: Option<f64>,
    #[serde(default, deserialize_with = "reported_value")]
    pub known_race_eth_death: Option<f64>,

    // Separate race and ethnicity shares (separate states)
    #[serde(default, deserialize_with = "reported_value")]
    pub known_race_pos: Option<f64>,
    #[serde(default, deserialize_with = "reported_value")]
    pub known_race_death: Option<f64>,
    #[serde(default, deserialize_with = "reported_value")]
    pub known_eth_pos: Option<f64>,
    #[serde(default, deserialize_with = "reported_value")]
    pub known_eth_death: Option<f64>,

    #[serde(default, deserialize_with = "reported_value")]
    pub black_pos_percap: Option<f64>,
    #[serde(default, deserialize_with = "reported_value")]
    pub black_death_percap: Option<f64>,
    #[serde(default, rename = "latinXPosPercap", deserialize_with = "reported_value")]
    pub latinx_pos_percap: Option<f64>,
    #[serde(default, rename = "latinXDeathPercap", deserialize_with = "reported_value")]
    pub latinx_death_percap: Option<f64>,
    #[serde(default, deserialize_with = "reported_value")]
    pub asian_pos_percap: Option<f64>,
    #[serde(default, deserialize_with = "reported_value")]
    pub asian_death_percap: Option<f64>,
    #[serde(default, deserialize_with = "reported_value")]
    pub aian_pos_percap: Option<f64>,
    #[serde(default, deserialize_with = "reported_value")]
    pub aian_death_percap: Option<f64>,
    #[serde(default, deserialize_with = "reported_value")]
    pub white_pos_percap: Option<f64>,
    #[serde(default, deserialize_with = "reported_value")]
    pub white_death_percap: Option<f64>,
    #[serde(default, deserialize_with = "reported_value")]
    pub nhpi_pos_percap: Option<f64>,
    #[serde(default, deserialize_with = "reported_value")]
    pub nhpi_death_percap: Option<f64>,
}

impl RaceRecord {
    /// Returns `(cases_per_1k, deaths_per_1k)` for a group.
    pub fn rates_for(&self, group: DemographicGroup) -> (Option<f64>, Option<f64>) {
        match group {
            DemographicGroup::Black => (self.black_pos_percap, self.black_death_percap),
            DemographicGroup::HispanicLatino => (self.latinx_pos_percap, self.latinx_death_percap),
            DemographicGroup::Asian => (self.asian_pos_percap, self.asian_death_percap),
            DemographicGroup::Aian => (self.aian_pos_percap, self.aian_death_percap),
            DemographicGroup::White => (self.white_pos_percap, self.white_death_percap),
            DemographicGroup::Nhpi => (self.nhpi_pos_percap, self.nhpi_death_percap),
        }
    }
}

/// Accepts a number, a numeric string, an empty string, or null.
///
/// Empty, null, and non-finite values all mean "not reported". A non-empty
/// string that does not parse as a number is an error.
fn reported_value<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawValue {
        Number(f64),
        Text(String),
    }

    match Option::<RawValue>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawValue::Number(v)) => Ok(v.is_finite().then_some(v)),
        Some(RawValue::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<f64>()
                .map(|v| v.is_finite().then_some(v))
                .map_err(|_| serde::de::Error::custom(format!("invalid numeric value '{}'", s)))
        }
    }
}

/// State metadata from the dataset's state info list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateInfo {
    pub state: String,
    pub name: String,
    pub child_slug: SlugNode,
    #[serde(default)]
    pub child_population: Option<PopulationNode>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SlugNode {
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PopulationNode {
    #[serde(default)]
    pub population: Option<u64>,
}

impl StateInfo {
    pub fn slug(&self) -> &str {
        &self.child_slug.slug
    }

    pub fn population(&self) -> Option<u64> {
        self.child_population.as_ref().and_then(|p| p.population)
    }
}

// ---------------------------------------------------------------------------
// Shaped output
// ---------------------------------------------------------------------------

/// A demographic group's rates rescaled to per 100,000 people.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupEntry {
    #[serde(rename = "label")]
    pub group: DemographicGroup,
    pub style: BarStyle,
    pub cases: f64,
    pub deaths: f64,
}

impl GroupEntry {
    pub fn label(&self) -> &'static str {
        self.group.label()
    }
}

/// Groups for one state, ordered by cases descending, plus chart summaries.
///
/// All summary fields are `None` when no group has both rates reported,
/// and the whole structure is empty when there was no record at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapingResult {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cases_per_cap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_deaths_per_cap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worst_cases_group: Option<DemographicGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worst_deaths_group: Option<DemographicGroup>,
}

impl ShapingResult {
    /// True when there is nothing to chart.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when loading or looking up race data.
#[derive(Debug, PartialEq)]
pub enum RaceDataError {
    /// Non-2xx HTTP response from the data source.
    HttpError(u16),
    /// The request could not be sent or the body could not be read.
    RequestFailed(String),
    /// The dataset could not be deserialized.
    ParseError(String),
    /// No record or state info exists for the requested state code.
    StateNotFound(String),
    /// Reading or writing a local file failed.
    Io(String),
}

impl std::fmt::Display for RaceDataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RaceDataError::HttpError(code) => write!(f, "HTTP error: {}", code),
            RaceDataError::RequestFailed(msg) => write!(f, "Request failed: {}", msg),
            RaceDataError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            RaceDataError::StateNotFound(state) => write!(f, "State not found: {}", state),
            RaceDataError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for RaceDataError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
