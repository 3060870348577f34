// HTTP request handlers for the query API

use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse};

use crate::api::models::{GamesResult, HealthResponse};
use crate::model::GameId;
use crate::store::StoreHandle;

/// Shared state for every worker.
pub struct ApiState {
    pub store: Arc<StoreHandle>,
    pub max_results: i64,
}

/// Health check endpoint
pub async fn health_check(state: web::Data<ApiState>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        games: state.store.snapshot().len(),
    })
}

/// `GET /Games/ByName?name=<substring>`
pub async fn find_by_name(req: HttpRequest, state: web::Data<ApiState>) -> HttpResponse {
    let name = query_param(&req, "name").unwrap_or_default();
    let store = state.store.snapshot();
    let games = store.find_by_title(&name, state.max_results);

    tracing::debug!(name = %name, matched = games.len(), "find by name");

    HttpResponse::Ok().json(GamesResult {
        games,
        image_base_urls: store.image_base_urls(),
    })
}

/// `GET /Games/ByIds?ids=<csv>`
pub async fn find_by_ids(req: HttpRequest, state: web::Data<ApiState>) -> HttpResponse {
    let ids = query_param(&req, "ids")
        .map(|raw| parse_ids(&raw))
        .unwrap_or_default();
    let store = state.store.snapshot();
    let games = store.find_by_ids(&ids, state.max_results);

    tracing::debug!(requested = ids.len(), matched = games.len(), "find by ids");

    HttpResponse::Ok().json(GamesResult {
        games,
        image_base_urls: store.image_base_urls(),
    })
}

/// First value of a query parameter, matching the key case-insensitively.
fn query_param(req: &HttpRequest, key: &str) -> Option<String> {
    url::form_urlencoded::parse(req.query_string().as_bytes())
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v.into_owned())
}

/// Comma-separated ids; anything that isn't an integer is dropped.
pub fn parse_ids(raw: &str) -> Vec<GameId> {
    raw.split(',')
        .filter_map(|part| part.trim().parse::<GameId>().ok())
        .collect()
}
