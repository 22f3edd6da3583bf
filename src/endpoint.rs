/// HTTP endpoint for querying card data
///
/// Provides a small JSON API so renderers and other tools can pull shaped
/// groups or full card models per state without running an export.
///
/// Endpoints:
/// - GET /health - Service health check
/// - GET /states - State codes and names in the loaded dataset
/// - GET /state/{code} - Card model (first variant, or ?variant=NAME)
/// - GET /state/{code}/groups - Shaped demographic groups

use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::borrow::Cow;

use crate::analysis::cards::build_card;
use crate::analysis::groupings::shape_groups;
use crate::config::CardConfig;
use crate::ingest::race_data::RaceDataset;
use crate::logging::{self, Stage};

type JsonResponse = tiny_http::Response<std::io::Cursor<Vec<u8>>>;

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

/// Entry in the /states listing
#[derive(Debug, Serialize)]
pub struct StateSummary {
    pub state: String,
    pub name: String,
    pub slug: String,
    pub has_race_data: bool,
    pub combined: bool,
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// A parsed request path.
#[derive(Debug, PartialEq)]
pub enum Route<'a> {
    Health,
    States,
    Card { state: &'a str, variant: Option<Cow<'a, str>> },
    Groups { state: &'a str },
    NotFound,
}

/// Splits a request URL into a route. The `variant` query value is
/// percent-decoded; state codes are matched case-insensitively by the
/// handlers, not here.
pub fn route(url: &str) -> Route<'_> {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));
    let path = path.trim_end_matches('/');

    let variant = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == "variant")
        .map(|(_, v)| urlencoding::decode(v).unwrap_or(Cow::Borrowed(v)))
        .filter(|v| !v.is_empty());

    match path {
        "/health" => Route::Health,
        "/states" => Route::States,
        _ => match path.strip_prefix("/state/") {
            Some(rest) => match rest.split_once('/') {
                None if !rest.is_empty() => Route::Card { state: rest, variant },
                Some((state, "groups")) if !state.is_empty() => Route::Groups { state },
                _ => Route::NotFound,
            },
            None => Route::NotFound,
        },
    }
}

/// Produces the status code and JSON body for a request URL.
pub fn handle(url: &str, dataset: &RaceDataset, config: &CardConfig, as_of: NaiveDate) -> (u16, serde_json::Value) {
    match route(url) {
        Route::Health => (
            200,
            serde_json::json!({
                "status": "ok",
                "service": "race_card_service",
                "version": env!("CARGO_PKG_VERSION"),
                "states": dataset.states.len()
            }),
        ),
        Route::States => {
            let states: Vec<StateSummary> = dataset
                .states
                .iter()
                .map(|s| StateSummary {
                    state: s.state.clone(),
                    name: s.name.clone(),
                    slug: s.slug().to_string(),
                    has_race_data: dataset.record_for(&s.state).is_some(),
                    combined: dataset.is_combined(&s.state),
                })
                .collect();
            to_json(200, &states)
        }
        Route::Groups { state } => {
            let state = state.to_ascii_uppercase();
            match dataset.lookup(&state) {
                Ok((record, info)) => to_json(200, &shape_groups(Some(record), info.population())),
                Err(e) => not_found_state(&state, &e.to_string()),
            }
        }
        Route::Card { state, variant } => {
            let state = state.to_ascii_uppercase();
            let variant = match variant {
                Some(name) => config.variant(&name),
                None => config.variants.first(),
            };
            let Some(variant) = variant else {
                return (
                    404,
                    serde_json::json!({
                        "error": "Unknown variant",
                        "available_variants": config.variants.iter().map(|v| v.name.as_str()).collect::<Vec<_>>()
                    }),
                );
            };
            match dataset.lookup(&state) {
                Ok((record, info)) => {
                    let card = build_card(record, info, dataset.is_combined(&state), variant, config, as_of);
                    to_json(200, &card)
                }
                Err(e) => not_found_state(&state, &e.to_string()),
            }
        }
        Route::NotFound => (
            404,
            serde_json::json!({
                "error": "Not found",
                "available_endpoints": ["/health", "/states", "/state/{code}", "/state/{code}/groups"]
            }),
        ),
    }
}

fn not_found_state(state: &str, message: &str) -> (u16, serde_json::Value) {
    (404, serde_json::json!({ "error": message, "state": state }))
}

fn to_json<T: Serialize>(status: u16, value: &T) -> (u16, serde_json::Value) {
    match serde_json::to_value(value) {
        Ok(json) => (status, json),
        Err(e) => (500, serde_json::json!({ "error": format!("Serialization failed: {}", e) })),
    }
}

// ---------------------------------------------------------------------------
// HTTP Server
// ---------------------------------------------------------------------------

/// Start HTTP endpoint server on the specified port. Blocks serving requests.
pub fn start_endpoint_server(port: u16, dataset: RaceDataset, config: CardConfig) -> Result<(), String> {
    let server = tiny_http::Server::http(format!("0.0.0.0:{}", port))
        .map_err(|e| format!("Failed to start HTTP server: {}", e))?;

    logging::info(Stage::Http, None, &format!("📡 HTTP endpoint listening on http://0.0.0.0:{}", port));
    logging::info(Stage::Http, None, "GET /state/{code} - Card model (?variant=NAME)");
    logging::info(Stage::Http, None, "GET /state/{code}/groups - Shaped groups");
    logging::info(Stage::Http, None, "GET /states - Loaded states");
    logging::info(Stage::Http, None, "GET /health - Service health check");

    for request in server.incoming_requests() {
        let url = request.url().to_string();
        // Cards carry the date they were built for; "today" is local to the service.
        let (status, json) = handle(&url, &dataset, &config, Local::now().date_naive());
        logging::debug(Stage::Http, None, &format!("{} {} -> {}", request.method(), url, status));

        if let Err(e) = request.respond(create_response(status, &json)) {
            logging::warn(Stage::Http, None, &format!("Failed to send response: {}", e));
        }
    }

    Ok(())
}

/// Create HTTP response with JSON body
fn create_response(status_code: u16, json: &serde_json::Value) -> JsonResponse {
    let body = serde_json::to_string_pretty(json).unwrap_or_else(|_| json.to_string());
    let response = tiny_http::Response::from_data(body.into_bytes())
        .with_status_code(tiny_http::StatusCode::from(status_code));

    match tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        Ok(header) => response.with_header(header),
        Err(_) => response,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{fixtures::*, race_data::parse_dataset};

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 10, 16).unwrap()
    }

    fn call(url: &str) -> (u16, serde_json::Value) {
        let dataset = parse_dataset(fixture_dataset_json()).unwrap();
        handle(url, &dataset, &CardConfig::default(), as_of())
    }

    #[test]
    fn test_route_parsing() {
        assert_eq!(route("/health"), Route::Health);
        assert_eq!(route("/states/"), Route::States);
        assert_eq!(route("/state/AL"), Route::Card { state: "AL", variant: None });
        assert_eq!(
            route("/state/AL?variant=square"),
            Route::Card { state: "AL", variant: Some("square".into()) }
        );
        assert_eq!(
            route("/state/AL?variant=story%20card"),
            Route::Card { state: "AL", variant: Some("story card".into()) }
        );
        assert_eq!(route("/state/al/groups"), Route::Groups { state: "al" });
        assert_eq!(route("/state/"), Route::NotFound);
        assert_eq!(route("/state/AL/deaths"), Route::NotFound);
        assert_eq!(route("/site/05568500"), Route::NotFound);
    }

    #[test]
    fn test_health() {
        let (status, json) = call("/health");
        assert_eq!(status, 200);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["states"], 4);
    }

    #[test]
    fn test_states_listing() {
        let (status, json) = call("/states");
        assert_eq!(status, 200);
        let states = json.as_array().expect("array");
        assert_eq!(states.len(), 4);
        let guam = states.iter().find(|s| s["state"] == "GU").expect("Guam listed");
        assert_eq!(guam["has_race_data"], false);
        let dc = states.iter().find(|s| s["state"] == "DC").expect("DC listed");
        assert_eq!(dc["combined"], true);
    }

    #[test]
    fn test_groups_endpoint_is_case_insensitive() {
        let (status, json) = call("/state/al/groups");
        assert_eq!(status, 200);
        assert_eq!(json["worstCasesGroup"], "Hispanic/Latino");
        assert_eq!(json["groups"].as_array().map(|g| g.len()), Some(4));
    }

    #[test]
    fn test_card_endpoint_variants() {
        let (status, json) = call("/state/DC");
        assert_eq!(status, 200);
        assert_eq!(json["render"]["variant"], "landscape");

        let (status, json) = call("/state/DC?variant=square");
        assert_eq!(status, 200);
        assert_eq!(json["render"]["filename"], "district-of-columbia-square");

        let (status, json) = call("/state/DC?variant=poster");
        assert_eq!(status, 404);
        assert_eq!(json["error"], "Unknown variant");
    }

    #[test]
    fn test_card_endpoint_decodes_variant_name() {
        let dataset = parse_dataset(fixture_dataset_json()).unwrap();
        let mut config = CardConfig::default();
        let mut story = config.variants[1].clone();
        story.name = "story card".to_string();
        story.filename_suffix = "-story".to_string();
        config.variants.push(story);

        let (status, json) = handle("/state/DC?variant=story%20card", &dataset, &config, as_of());
        assert_eq!(status, 200);
        assert_eq!(json["render"]["variant"], "story card");
        assert_eq!(json["render"]["filename"], "district-of-columbia-story");
    }

    #[test]
    fn test_unknown_state_is_404() {
        let (status, json) = call("/state/GU");
        assert_eq!(status, 404);
        assert_eq!(json["state"], "GU");

        let (status, _) = call("/state/ZZ/groups");
        assert_eq!(status, 404);
    }

    #[test]
    fn test_unknown_path_lists_endpoints() {
        let (status, json) = call("/nope");
        assert_eq!(status, 404);
        assert!(json["available_endpoints"].is_array());
    }
}
