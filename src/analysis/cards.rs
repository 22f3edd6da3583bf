/// Social card model.
///
/// Turns a state's shaped groups into everything a renderer needs for one
/// card: which charts to draw, bar widths, the headline and notes text, or
/// the "no data" notice for states that did not report. The output is plain
/// data; turning it into markup or an image happens elsewhere.

use chrono::NaiveDate;
use serde::Serialize;

use crate::analysis::groupings::shape_groups;
use crate::config::{CardConfig, CardVariant};
use crate::format::{format_number, format_percent};
use crate::groups;
use crate::model::{BarStyle, DemographicGroup, GroupEntry, RaceRecord, ShapingResult, StateInfo};

pub const CASES_HEADER: &str = "Cases per 100,000 people";
pub const DEATHS_HEADER: &str = "Deaths per 100,000 people";
pub const BETTER_DATA_CALL: &str =
    "Help us get better data: www.covidtracking.com/race/get-better-data";
pub const GROUPS_FOOTNOTE: &str = "Graphic only includes demographic groups reported by the state.";

// ---------------------------------------------------------------------------
// Chart mode
// ---------------------------------------------------------------------------

/// Which bar charts a card shows, based on whether the state reported any
/// race/ethnicity data for cases and for deaths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartMode {
    Both,
    CasesOnly,
    DeathsOnly,
    NoCharts,
}

impl ChartMode {
    pub fn from_coverage(no_cases: bool, no_deaths: bool) -> Self {
        match (no_cases, no_deaths) {
            (true, true) => ChartMode::NoCharts,
            (false, true) => ChartMode::CasesOnly,
            (true, false) => ChartMode::DeathsOnly,
            (false, false) => ChartMode::Both,
        }
    }

    pub fn shows_cases(&self) -> bool {
        matches!(self, ChartMode::Both | ChartMode::CasesOnly)
    }

    pub fn shows_deaths(&self) -> bool {
        matches!(self, ChartMode::Both | ChartMode::DeathsOnly)
    }

    /// Phrase describing the rates on the card.
    pub fn type_of_rates(&self) -> &'static str {
        match self {
            ChartMode::CasesOnly => "case rates",
            ChartMode::DeathsOnly => "death rates",
            ChartMode::Both | ChartMode::NoCharts => "infection and death rates",
        }
    }
}

/// Chart mode from the record's known-share fields.
///
/// Combined states report one race+ethnicity share; separate states are
/// judged on their race share. Only an explicit zero counts as "no data";
/// an unreported share does not.
pub fn chart_mode(record: &RaceRecord, combined: bool) -> ChartMode {
    let (known_cases, known_deaths) = if combined {
        (record.known_race_eth_pos, record.known_race_eth_death)
    } else {
        (record.known_race_pos, record.known_race_death)
    };
    ChartMode::from_coverage(known_cases == Some(0.0), known_deaths == Some(0.0))
}

// ---------------------------------------------------------------------------
// Bars
// ---------------------------------------------------------------------------

/// Bar width as a percent of the chart, floored at `min_fraction`.
///
/// A missing or zero maximum draws every bar at the floor.
pub fn bar_width_percent(value: f64, max: Option<f64>, min_fraction: f64) -> f64 {
    match max {
        Some(max) if max > 0.0 => {
            let ratio = value / max;
            if ratio > min_fraction {
                ratio * 100.0
            } else {
                min_fraction * 100.0
            }
        }
        _ => min_fraction * 100.0,
    }
}

/// One row of the card's bar charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardBar {
    pub label: DemographicGroup,
    pub full_name: &'static str,
    pub style: BarStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cases: Option<BarValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deaths: Option<BarValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarValue {
    pub value: f64,
    pub display: String,
    pub width_percent: f64,
}

fn bar_value(value: f64, max: Option<f64>, min_fraction: f64) -> BarValue {
    BarValue {
        value,
        display: format_number(value),
        width_percent: bar_width_percent(value, max, min_fraction),
    }
}

fn build_bars(shaped: &ShapingResult, mode: ChartMode, min_fraction: f64) -> Vec<CardBar> {
    let mut entries: Vec<&GroupEntry> = shaped.groups.iter().collect();
    if mode == ChartMode::DeathsOnly {
        entries.sort_by(|a, b| b.deaths.total_cmp(&a.deaths));
    }

    entries
        .into_iter()
        .map(|entry| CardBar {
            label: entry.group,
            full_name: groups::info(entry.group).full_name,
            style: entry.style,
            cases: mode
                .shows_cases()
                .then(|| bar_value(entry.cases, shaped.max_cases_per_cap, min_fraction)),
            deaths: mode
                .shows_deaths()
                .then(|| bar_value(entry.deaths, shaped.max_deaths_per_cap, min_fraction)),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// Name used in card body text. DC reads better with an article.
pub fn display_state_name(name: &str) -> String {
    if name == "District of Columbia" {
        "The District of Columbia".to_string()
    } else {
        name.to_string()
    }
}

fn as_of_phrase(as_of: NaiveDate) -> String {
    as_of.format("%B %-d").to_string()
}

fn worst_name(group: Option<DemographicGroup>) -> &'static str {
    group
        .and_then(|g| groups::display_name(g.label()))
        .unwrap_or("not reported")
}

/// Headline naming the groups with the highest case and death rates.
pub fn lede_text(state_name: &str, shaped: &ShapingResult, as_of: NaiveDate) -> String {
    format!(
        "In {}, as of {}, Worst cases: {}, Worst deaths: {}",
        state_name,
        as_of_phrase(as_of),
        worst_name(shaped.worst_cases_group),
        worst_name(shaped.worst_deaths_group),
    )
}

/// Footnote on how much of the state's data has race/ethnicity attached.
pub fn notes_text(record: &RaceRecord, display_name: &str) -> String {
    let coverage = if record.known_race_eth_pos.is_some() {
        format!(
            "{} has reported race and ethnicity data for {} of cases and {} of deaths.",
            display_name,
            format_percent(record.known_race_eth_pos),
            format_percent(record.known_race_eth_death),
        )
    } else {
        format!(
            "{} has reported race data for {} of cases and {} of deaths, \
             and ethnicity data for {} of cases and {} of deaths.",
            display_name,
            format_percent(record.known_race_pos),
            format_percent(record.known_race_death),
            format_percent(record.known_eth_pos),
            format_percent(record.known_eth_death),
        )
    };
    format!("Notes: {} {}", coverage, GROUPS_FOOTNOTE)
}

/// Shown instead of charts when the state reported nothing usable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoDataNotice {
    pub message: String,
    pub call_to_action: &'static str,
}

pub fn no_data_notice(display_name: &str, as_of: NaiveDate) -> NoDataNotice {
    NoDataNotice {
        message: format!(
            "As of {}, {} did not report race and ethnicity data to allow for this comparison.",
            as_of_phrase(as_of),
            display_name
        ),
        call_to_action: BETTER_DATA_CALL,
    }
}

// ---------------------------------------------------------------------------
// Card
// ---------------------------------------------------------------------------

/// Size and destination of the rendered card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderTarget {
    pub variant: String,
    pub width: f64,
    pub height: f64,
    pub square: bool,
    pub relative_path: String,
    pub filename: String,
}

/// Everything needed to draw one state's card in one variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SocialCard {
    pub state: String,
    pub state_name: String,
    pub display_name: String,
    pub as_of: NaiveDate,
    pub chart_mode: ChartMode,
    pub type_of_rates: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lede: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cases_header: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deaths_header: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bars: Vec<CardBar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_data: Option<NoDataNotice>,
    pub render: RenderTarget,
}

/// Builds one card for a state.
///
/// `combined` says whether the state reports race and ethnicity as a single
/// breakdown, which decides which known-share fields drive the chart mode.
pub fn build_card(
    record: &RaceRecord,
    info: &StateInfo,
    combined: bool,
    variant: &CardVariant,
    config: &CardConfig,
    as_of: NaiveDate,
) -> SocialCard {
    let state_name = record
        .state_name
        .clone()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| info.name.clone());
    let display_name = display_state_name(&state_name);
    let mode = chart_mode(record, combined);

    let render = RenderTarget {
        variant: variant.name.clone(),
        width: variant.width,
        height: variant.height,
        square: variant.square,
        relative_path: config.output.relative_path.clone(),
        filename: format!("{}{}", info.slug(), variant.filename_suffix),
    };

    let mut card = SocialCard {
        state: record.state.clone(),
        state_name,
        display_name,
        as_of,
        chart_mode: mode,
        type_of_rates: mode.type_of_rates(),
        lede: None,
        cases_header: None,
        deaths_header: None,
        bars: Vec::new(),
        notes: None,
        no_data: None,
        render,
    };

    if mode == ChartMode::NoCharts {
        card.no_data = Some(no_data_notice(&card.display_name, as_of));
        return card;
    }

    let shaped = shape_groups(Some(record), info.population());
    card.lede = Some(lede_text(&card.state_name, &shaped, as_of));
    card.cases_header = mode.shows_cases().then_some(CASES_HEADER);
    card.deaths_header = mode.shows_deaths().then_some(DEATHS_HEADER);
    card.bars = build_bars(&shaped, mode, config.bars.min_width_fraction);
    card.notes = Some(notes_text(record, &card.display_name));
    card
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
