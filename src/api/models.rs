// Response bodies for the query API

use indexmap::IndexMap;
use serde::Serialize;

use crate::model::Game;

/// Body of both `/Games` endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GamesResult<'a> {
    pub games: Vec<&'a Game>,
    pub image_base_urls: &'a IndexMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub games: usize,
}
