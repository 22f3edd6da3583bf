/// Demographic group shaping.
///
/// `shape_groups` takes one state's flat race record and turns it into the
/// list of bars a card draws: one entry per group that reported both a case
/// rate and a death rate, rescaled to per 100,000 people and ordered by case
/// rate. It also computes the maxima the bar widths are scaled against and
/// the groups with the highest case and death rates.

use crate::groups::GROUP_REGISTRY;
use crate::model::{DemographicGroup, GroupEntry, RaceRecord, ShapingResult, PER_CAPITA_SCALE};

// ---------------------------------------------------------------------------
// Shaping
// ---------------------------------------------------------------------------

/// Shapes a state's record into ordered group entries plus summaries.
///
/// - A missing record yields an empty result.
/// - A group is kept only if both its case and death rates are reported.
/// - Maxima and worst groups are `None` when no group is kept.
/// - Worst-group ties go to the earliest group in canonical order.
/// - Entries are returned sorted by `cases` descending; ties keep canonical
///   order.
///
/// `population` is accepted for callers that already have it but is not
/// used in the current computation.
pub fn shape_groups(record: Option<&RaceRecord>, _population: Option<u64>) -> ShapingResult {
    let Some(record) = record else {
        return ShapingResult::default();
    };

    // Built in canonical order; the scans and the stable sort below rely on it.
    let mut groups: Vec<GroupEntry> = GROUP_REGISTRY
        .iter()
        .filter_map(|info| {
            let (cases, deaths) = record.rates_for(info.group);
            Some(GroupEntry {
                group: info.group,
                style: info.style,
                cases: cases? * PER_CAPITA_SCALE,
                deaths: deaths? * PER_CAPITA_SCALE,
            })
        })
        .collect();

    let worst_cases = first_max_by(&groups, |g| g.cases);
    let worst_deaths = first_max_by(&groups, |g| g.deaths);

    groups.sort_by(|a, b| b.cases.total_cmp(&a.cases));

    ShapingResult {
        groups,
        max_cases_per_cap: worst_cases.map(|(_, v)| v),
        max_deaths_per_cap: worst_deaths.map(|(_, v)| v),
        worst_cases_group: worst_cases.map(|(g, _)| g),
        worst_deaths_group: worst_deaths.map(|(g, _)| g),
    }
}

/// Linear scan for the largest metric value. Only a strictly larger value
/// replaces the current best, so the earliest entry wins a tie.
fn first_max_by<F>(entries: &[GroupEntry], metric: F) -> Option<(DemographicGroup, f64)>
where
    F: Fn(&GroupEntry) -> f64,
{
    let mut best: Option<(DemographicGroup, f64)> = None;
    for entry in entries {
        let value = metric(entry);
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((entry.group, value)),
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{fixtures::*, race_data::parse_dataset};
    use crate::model::BarStyle;

    fn record_with(rates: &[(DemographicGroup, Option<f64>, Option<f64>)]) -> RaceRecord {
        let mut record = RaceRecord {
            state: "XX".to_string(),
            ..Default::default()
        };
        for (group, cases, deaths) in rates {
            let (c, d) = match group {
                DemographicGroup::Black => (&mut record.black_pos_percap, &mut record.black_death_percap),
                DemographicGroup::HispanicLatino => (&mut record.latinx_pos_percap, &mut record.latinx_death_percap),
                DemographicGroup::Asian => (&mut record.asian_pos_percap, &mut record.asian_death_percap),
                DemographicGroup::Aian => (&mut record.aian_pos_percap, &mut record.aian_death_percap),
                DemographicGroup::White => (&mut record.white_pos_percap, &mut record.white_death_percap),
                DemographicGroup::Nhpi => (&mut record.nhpi_pos_percap, &mut record.nhpi_death_percap),
            };
            *c = *cases;
            *d = *deaths;
        }
        record
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    // --- Absent and empty inputs ---------------------------------------------

    #[test]
    fn test_absent_record_yields_empty_result() {
        let result = shape_groups(None, Some(5_000_000));
        assert!(result.is_empty());
        assert_eq!(result, ShapingResult::default());
    }

    #[test]
    fn test_no_complete_groups_yields_no_summaries() {
        let record = record_with(&[
            (DemographicGroup::Black, Some(1.0), None),
            (DemographicGroup::White, None, Some(0.2)),
        ]);
        let result = shape_groups(Some(&record), None);

        assert!(result.groups.is_empty());
        assert_eq!(result.max_cases_per_cap, None);
        assert_eq!(result.max_deaths_per_cap, None);
        assert_eq!(result.worst_cases_group, None);
        assert_eq!(result.worst_deaths_group, None);
    }

    // --- Worked examples ------------------------------------------------------

    #[test]
    fn test_black_and_white_example() {
        let record = record_with(&[
            (DemographicGroup::Black, Some(1.2), Some(0.3)),
            (DemographicGroup::White, Some(0.5), Some(0.1)),
        ]);
        let result = shape_groups(Some(&record), Some(4_903_185));

        let labels: Vec<_> = result.groups.iter().map(|g| g.label()).collect();
        assert_eq!(labels, vec!["Black", "White"]);
        assert_close(result.groups[0].cases, 120.0);
        assert_close(result.groups[0].deaths, 30.0);
        assert_close(result.groups[1].cases, 50.0);
        assert_close(result.groups[1].deaths, 10.0);
        assert_close(result.max_cases_per_cap.unwrap(), 120.0);
        assert_close(result.max_deaths_per_cap.unwrap(), 30.0);
        assert_eq!(result.worst_cases_group, Some(DemographicGroup::Black));
        assert_eq!(result.worst_deaths_group, Some(DemographicGroup::Black));
    }

    #[test]
    fn test_partial_group_is_dropped_entirely() {
        let record = record_with(&[
            (DemographicGroup::Black, Some(1.2), Some(0.3)),
            (DemographicGroup::Asian, Some(9.0), None),
        ]);
        let result = shape_groups(Some(&record), None);

        assert_eq!(result.groups.len(), 1);
        assert!(
            result.groups.iter().all(|g| g.group != DemographicGroup::Asian),
            "Asian has cases but no deaths and must be excluded"
        );
        assert_close(result.max_cases_per_cap.unwrap(), 120.0);
    }

    // --- Ordering and tie-breaks ---------------------------------------------

    #[test]
    fn test_groups_sorted_by_cases_descending() {
        let record = record_with(&[
            (DemographicGroup::Black, Some(0.5), Some(0.9)),
            (DemographicGroup::HispanicLatino, Some(2.0), Some(0.1)),
            (DemographicGroup::Nhpi, Some(1.0), Some(0.2)),
        ]);
        let result = shape_groups(Some(&record), None);

        let labels: Vec<_> = result.groups.iter().map(|g| g.label()).collect();
        assert_eq!(labels, vec!["Hispanic/Latino", "NHPI", "Black"]);
        for pair in result.groups.windows(2) {
            assert!(pair[0].cases >= pair[1].cases);
        }
    }

    #[test]
    fn test_worst_cases_and_deaths_can_differ() {
        let record = record_with(&[
            (DemographicGroup::Black, Some(0.5), Some(0.9)),
            (DemographicGroup::HispanicLatino, Some(2.0), Some(0.1)),
        ]);
        let result = shape_groups(Some(&record), None);

        assert_eq!(result.worst_cases_group, Some(DemographicGroup::HispanicLatino));
        assert_eq!(result.worst_deaths_group, Some(DemographicGroup::Black));
        assert_close(result.max_deaths_per_cap.unwrap(), 90.0);
    }

    #[test]
    fn test_ties_resolve_to_canonical_order() {
        let record = record_with(&[
            (DemographicGroup::White, Some(1.0), Some(0.4)),
            (DemographicGroup::Asian, Some(1.0), Some(0.4)),
            (DemographicGroup::Aian, Some(1.0), Some(0.4)),
        ]);
        let result = shape_groups(Some(&record), None);

        // Asian precedes AIAN precedes White in canonical order.
        assert_eq!(result.worst_cases_group, Some(DemographicGroup::Asian));
        assert_eq!(result.worst_deaths_group, Some(DemographicGroup::Asian));
        let labels: Vec<_> = result.groups.iter().map(|g| g.label()).collect();
        assert_eq!(labels, vec!["Asian", "AIAN", "White"]);
    }

    #[test]
    fn test_zero_rates_are_kept() {
        let record = record_with(&[(DemographicGroup::Nhpi, Some(0.0), Some(0.0))]);
        let result = shape_groups(Some(&record), None);

        assert_eq!(result.groups.len(), 1, "zero is a reported value, not a blank");
        assert_eq!(result.worst_cases_group, Some(DemographicGroup::Nhpi));
        assert_close(result.max_cases_per_cap.unwrap(), 0.0);
    }

    #[test]
    fn test_entries_carry_registry_style() {
        let record = record_with(&[
            (DemographicGroup::HispanicLatino, Some(1.0), Some(0.1)),
            (DemographicGroup::Aian, Some(2.0), Some(0.2)),
        ]);
        let result = shape_groups(Some(&record), None);

        assert_eq!(result.groups[0].style, BarStyle::Aian);
        assert_eq!(result.groups[1].style, BarStyle::Latinx);
    }

    #[test]
    fn test_population_does_not_change_result() {
        let record = record_with(&[(DemographicGroup::Black, Some(1.2), Some(0.3))]);
        assert_eq!(
            shape_groups(Some(&record), None),
            shape_groups(Some(&record), Some(39_512_223))
        );
    }

    // --- Fixture-driven -------------------------------------------------------

    #[test]
    fn test_shape_separate_state_fixture() {
        let dataset = parse_dataset(fixture_dataset_json()).expect("fixture should parse");
        let record = dataset.record_for("AL").expect("Alabama should have a record");
        let result = shape_groups(Some(record), None);

        // Alabama fixture reports Black, Hispanic/Latino, Asian and White
        // completely; AIAN is blank and NHPI lacks a death rate.
        let labels: Vec<_> = result.groups.iter().map(|g| g.label()).collect();
        assert_eq!(labels, vec!["Hispanic/Latino", "Black", "White", "Asian"]);
        assert_eq!(result.worst_cases_group, Some(DemographicGroup::HispanicLatino));
        assert_eq!(result.worst_deaths_group, Some(DemographicGroup::Black));
    }

    #[test]
    fn test_result_json_uses_output_field_names() {
        let record = record_with(&[(DemographicGroup::Black, Some(1.2), Some(0.3))]);
        let json = serde_json::to_value(shape_groups(Some(&record), None)).unwrap();

        assert_eq!(json["groups"][0]["label"], "Black");
        assert_eq!(json["groups"][0]["style"], "barBlack");
        assert_eq!(json["worstCasesGroup"], "Black");
        assert_eq!(json["worstDeathsGroup"], "Black");
        assert!(json.get("maxCasesPerCap").is_some());
    }
}
