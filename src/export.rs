/// Card export
///
/// Builds card models for every state in the dataset, one per configured
/// variant, and writes each as a JSON file named after the card's render
/// target. Cards are built on a thread pool; each state is independent, so
/// jobs share nothing but an `Arc` of the configuration.

use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use threadpool::ThreadPool;

use crate::analysis::cards::{build_card, SocialCard};
use crate::config::CardConfig;
use crate::ingest::race_data::RaceDataset;
use crate::logging::{self, Stage};
use crate::model::RaceDataError;

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Cards built for one state, in variant order.
#[derive(Debug, Clone)]
pub struct StateCards {
    pub state: String,
    pub cards: Vec<SocialCard>,
}

/// Output of [`build_all_cards`].
#[derive(Debug, Default)]
pub struct CardBuild {
    /// Cards per state, in state-info order.
    pub built: Vec<StateCards>,
    /// States with state info but no race record.
    pub skipped: Vec<String>,
    /// States whose card job never reported back.
    pub unfinished: Vec<String>,
}

/// Outcome of an export run
#[derive(Debug, Default)]
pub struct ExportSummary {
    /// Files written successfully.
    pub written: Vec<PathBuf>,
    /// States with state info but no race record.
    pub skipped: Vec<String>,
    /// `(filename or state, error)` for each card that could not be built
    /// or written.
    pub failed: Vec<(String, String)>,
}

impl ExportSummary {
    pub fn total_cards(&self) -> usize {
        self.written.len() + self.failed.len()
    }
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

/// Builds cards for every state (or one state when `only_state` is set).
///
/// States with no race record are skipped. A job that dies before sending
/// its cards leaves its state in `unfinished`.
///
/// # Errors
/// `RaceDataError::StateNotFound` if `only_state` names a state with no
/// record or no state info.
pub fn build_all_cards(
    dataset: &RaceDataset,
    config: &CardConfig,
    as_of: NaiveDate,
    only_state: Option<&str>,
) -> Result<CardBuild, RaceDataError> {
    let codes: Vec<String> = match only_state {
        Some(state) => {
            dataset.lookup(state)?;
            vec![state.to_string()]
        }
        None => dataset.state_codes().into_iter().map(String::from).collect(),
    };

    // ThreadPool::new panics on zero workers.
    let pool = ThreadPool::new(config.workers.max(1));
    let shared_config = Arc::new(config.clone());
    let (tx, rx) = mpsc::channel();
    let mut skipped = Vec::new();
    let mut queued = Vec::new();

    for code in &codes {
        let (record, info) = match dataset.lookup(code) {
            Ok(found) => found,
            Err(e) => {
                logging::log_data_failure(Some(code.as_str()), "Card lookup", &e);
                skipped.push(code.clone());
                continue;
            }
        };

        let record = record.clone();
        let info = info.clone();
        let combined = dataset.is_combined(code);
        let config = Arc::clone(&shared_config);
        let tx = tx.clone();
        queued.push(code.clone());

        pool.execute(move || {
            let cards = config
                .variants
                .iter()
                .map(|variant| build_card(&record, &info, combined, variant, &config, as_of))
                .collect();
            // Receiver outlives the pool; a send error means the caller gave up.
            let _ = tx.send(StateCards {
                state: record.state.clone(),
                cards,
            });
        });
    }
    drop(tx);

    let mut built: Vec<StateCards> = rx.iter().collect();
    let unfinished = unfinished_states(&queued, &built);
    for state in &unfinished {
        logging::error(Stage::Export, Some(state.as_str()), "card job did not finish");
    }

    // Completion order is arbitrary; restore state-info order.
    built.sort_by_key(|s| codes.iter().position(|c| *c == s.state).unwrap_or(usize::MAX));

    Ok(CardBuild {
        built,
        skipped,
        unfinished,
    })
}

/// Queued states with no entry in `built`, in queue order.
fn unfinished_states(queued: &[String], built: &[StateCards]) -> Vec<String> {
    queued
        .iter()
        .filter(|code| !built.iter().any(|s| s.state == **code))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Directory cards are written to: `{directory}/{relative_path}`.
pub fn output_dir(config: &CardConfig) -> PathBuf {
    Path::new(&config.output.directory).join(&config.output.relative_path)
}

fn write_card(dir: &Path, card: &SocialCard) -> Result<PathBuf, String> {
    let path = dir.join(format!("{}.json", card.render.filename));
    let body = serde_json::to_string_pretty(card).map_err(|e| e.to_string())?;
    fs::write(&path, body).map_err(|e| format!("{}: {}", path.display(), e))?;
    Ok(path)
}

/// Builds and writes all cards.
///
/// Individual write failures are recorded in the summary and logged; only a
/// failed lookup of `only_state` or an unusable output directory aborts.
pub fn export_cards(
    dataset: &RaceDataset,
    config: &CardConfig,
    as_of: NaiveDate,
    only_state: Option<&str>,
) -> Result<ExportSummary, RaceDataError> {
    let dir = output_dir(config);
    fs::create_dir_all(&dir)
        .map_err(|e| RaceDataError::Io(format!("{}: {}", dir.display(), e)))?;

    let CardBuild {
        built,
        skipped,
        unfinished,
    } = build_all_cards(dataset, config, as_of, only_state)?;

    let mut summary = ExportSummary {
        skipped,
        failed: unfinished
            .into_iter()
            .map(|state| (state, "card job did not finish".to_string()))
            .collect(),
        ..Default::default()
    };

    for state_cards in &built {
        for card in &state_cards.cards {
            match write_card(&dir, card) {
                Ok(path) => {
                    logging::debug(
                        Stage::Export,
                        Some(state_cards.state.as_str()),
                        &format!("wrote {} ({:?})", path.display(), card.chart_mode),
                    );
                    summary.written.push(path);
                }
                Err(e) => {
                    logging::error(Stage::Export, Some(state_cards.state.as_str()), &e);
                    summary.failed.push((card.render.filename.clone(), e));
                }
            }
        }
    }

    logging::log_export_summary(
        summary.total_cards(),
        summary.written.len(),
        summary.skipped.len(),
        summary.failed.len(),
    );

    Ok(summary)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
