/// Data ingest for the race disparity cards.
///
/// Submodules:
/// - `race_data` — dataset parsing, file loading, and HTTP fetch.
/// - `fixtures` (test only) — representative dataset payloads.

pub mod race_data;

#[cfg(test)]
pub(crate) mod fixtures;
