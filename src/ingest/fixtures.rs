/// Test fixtures: representative race/ethnicity dataset payloads.
///
/// These fixtures are structurally complete but cut down to a handful of
/// states. They reflect the shape of the static data query result:
///
///   data.allCovidRaceDataSeparate.nodes[]  — states reporting race and
///                                            ethnicity separately
///     .knownRacePos / .knownRaceDeath       — share of cases/deaths with race
///     .knownEthPos / .knownEthDeath         — share with ethnicity
///   data.allCovidRaceDataCombined.nodes[]  — states with one combined category
///     .knownRaceEthPos / .knownRaceEthDeath
///   both lists:
///     .<group>PosPercap / .<group>DeathPercap — rates per 1,000 people
///   data.allCovidStateInfo.nodes[]
///     .childSlug.slug, .childPopulation.population
///
/// Note: numeric fields arrive as numbers, numeric strings, or "" when the
/// state did not report them. Parsers must handle all three.

/// Four states plus a national row:
/// - AL (separate): AIAN blank, NHPI has cases but no deaths.
/// - OH (in both lists): separate record should win.
/// - DC (combined): full data.
/// - GU: state info only, no race record, null population.
#[cfg(test)]
pub(crate) fn fixture_dataset_json() -> &'static str {
    r#"{
      "data": {
        "allCovidRaceDataSeparate": {
          "nodes": [
            {
              "state": "AL",
              "stateName": "Alabama",
              "knownRacePos": "0.93",
              "knownRaceDeath": "0.97",
              "knownEthPos": "0.62",
              "knownEthDeath": "0.71",
              "blackPctPos": "0.35",
              "blackPosPercap": 2.5,
              "blackDeathPercap": 0.12,
              "latinXPosPercap": "3.1",
              "latinXDeathPercap": "0.05",
              "asianPosPercap": 0.8,
              "asianDeathPercap": 0.02,
              "aianPosPercap": "",
              "aianDeathPercap": "",
              "whitePosPercap": 1.9,
              "whiteDeathPercap": 0.09,
              "nhpiPosPercap": 0.9,
              "nhpiDeathPercap": ""
            },
            {
              "state": "OH",
              "stateName": "Ohio",
              "knownRacePos": 0.85,
              "knownRaceDeath": 0.95,
              "knownEthPos": 0.6,
              "knownEthDeath": 0.8,
              "blackPosPercap": 2.0,
              "blackDeathPercap": 0.1,
              "latinXPosPercap": 1.5,
              "latinXDeathPercap": 0.03,
              "whitePosPercap": 1.0,
              "whiteDeathPercap": 0.08
            }
          ]
        },
        "allCovidRaceDataCombined": {
          "nodes": [
            {
              "state": "DC",
              "stateName": "District of Columbia",
              "knownRaceEthPos": "0.97",
              "knownRaceEthDeath": "0.99",
              "blackPosPercap": 2.2,
              "blackDeathPercap": 0.15,
              "latinXPosPercap": 3.0,
              "latinXDeathPercap": 0.08,
              "asianPosPercap": 0.7,
              "asianDeathPercap": 0.01,
              "whitePosPercap": 0.9,
              "whiteDeathPercap": 0.03
            },
            {
              "state": "OH",
              "stateName": "Ohio",
              "knownRaceEthPos": 0.5,
              "knownRaceEthDeath": 0.5
            },
            {
              "state": "US",
              "stateName": "United States",
              "knownRaceEthPos": 0.9,
              "knownRaceEthDeath": 0.9
            }
          ]
        },
        "allCovidStateInfo": {
          "nodes": [
            { "state": "AL", "name": "Alabama", "childSlug": { "slug": "alabama" }, "childPopulation": { "population": 4903185 } },
            { "state": "OH", "name": "Ohio", "childSlug": { "slug": "ohio" }, "childPopulation": { "population": 11689100 } },
            { "state": "DC", "name": "District of Columbia", "childSlug": { "slug": "district-of-columbia" }, "childPopulation": { "population": 705749 } },
            { "state": "GU", "name": "Guam", "childSlug": { "slug": "guam" }, "childPopulation": { "population": null } },
            { "state": "US", "name": "United States", "childSlug": { "slug": "us" }, "childPopulation": { "population": 328239523 } }
          ]
        }
      }
    }"#
}

/// Query result without the `data` envelope; one separate state.
#[cfg(test)]
pub(crate) fn fixture_bare_dataset_json() -> &'static str {
    r#"{
      "allCovidRaceDataSeparate": {
        "nodes": [
          { "state": "WY", "stateName": "Wyoming", "whitePosPercap": "1.1", "whiteDeathPercap": "0.01" }
        ]
      },
      "allCovidRaceDataCombined": { "nodes": [] },
      "allCovidStateInfo": {
        "nodes": [
          { "state": "WY", "name": "Wyoming", "childSlug": { "slug": "wyoming" } }
        ]
      }
    }"#
}

/// A rate holding text that is neither blank nor a number.
#[cfg(test)]
pub(crate) fn fixture_bad_rate_json() -> &'static str {
    r#"{
      "allCovidRaceDataSeparate": {
        "nodes": [ { "state": "TX", "blackPosPercap": "lots" } ]
      },
      "allCovidRaceDataCombined": { "nodes": [] },
      "allCovidStateInfo": { "nodes": [] }
    }"#
}
