//! Normalized games as served by the mirror and persisted in `_clean.json`.
//!
//! Field names keep the PascalCase shape existing API consumers expect.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::dump::{GameId, GamesDbDate, LookupItem, PlatformId};
use super::nullable::{NullBool, NullInt, NullString};

/// The normalized snapshot document: every game plus the image CDN prefixes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CleanDb {
    #[serde(default)]
    pub games: Vec<Game>,
    #[serde(default)]
    pub image_base_urls: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Game {
    #[serde(rename = "ID")]
    pub id: GameId,
    pub title: String,
    pub platform: Platform,
    pub release_date: Option<GamesDbDate>,
    #[serde(default)]
    pub overview: NullString,
    #[serde(default)]
    pub youtube: NullString,
    #[serde(default)]
    pub players: NullInt,
    #[serde(default)]
    pub is_coop: NullBool,
    #[serde(default)]
    pub rating: NullString,
    #[serde(default)]
    pub developers: Vec<GameRef>,
    #[serde(default)]
    pub genres: Vec<GameRef>,
    #[serde(default)]
    pub publishers: Vec<GameRef>,
    #[serde(default)]
    pub alternate_names: Vec<String>,
    #[serde(default)]
    pub uids: Vec<Uid>,
    #[serde(default)]
    pub images: Vec<Image>,
}

/// Platform copied inline into every game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Platform {
    #[serde(rename = "ID")]
    pub id: PlatformId,
    pub name: String,
    pub alias: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Image {
    pub id: i64,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(default)]
    pub side: NullString,
    pub filename: String,
    #[serde(default)]
    pub resolution: NullString,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uid {
    #[serde(rename = "UID")]
    pub uid: String,
    #[serde(rename = "GamesUidsPatternsID")]
    pub games_uids_patterns_id: i64,
}

/// A genre/developer/publisher reference.
///
/// `Resolved` when a side table was available at transform time, otherwise
/// the raw upstream id. Serialized untagged: `{"id":1,"name":"Action"}` or `1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GameRef {
    Resolved(LookupItem),
    Id(i64),
}

impl GameRef {
    pub fn id(&self) -> i64 {
        match self {
            GameRef::Resolved(item) => item.id,
            GameRef::Id(id) => *id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_game() -> Game {
        Game {
            id: 1,
            title: "Halo".into(),
            platform: Platform {
                id: 14,
                name: "Microsoft Xbox".into(),
                alias: "microsoft-xbox".into(),
            },
            release_date: Some(GamesDbDate::parse("2001-11-15").unwrap()),
            overview: NullString::present(String::new()),
            youtube: NullString::absent(),
            players: NullInt::present(4),
            is_coop: NullBool::present(true),
            rating: NullString::present("M - Mature".into()),
            developers: vec![GameRef::Resolved(LookupItem {
                id: 1389,
                name: "Bungie".into(),
            })],
            genres: vec![GameRef::Id(8)],
            publishers: vec![],
            alternate_names: vec![],
            uids: vec![Uid {
                uid: "4D530004".into(),
                games_uids_patterns_id: 2,
            }],
            images: vec![Image {
                id: 5,
                kind: "boxart".into(),
                side: NullString::present("front".into()),
                filename: "boxart/front/1-1.jpg".into(),
                resolution: NullString::absent(),
            }],
        }
    }

    #[test]
    fn game_serializes_with_api_field_names() {
        let value = serde_json::to_value(sample_game()).unwrap();
        assert_eq!(value["ID"], json!(1));
        assert_eq!(value["Platform"]["Alias"], json!("microsoft-xbox"));
        assert_eq!(value["ReleaseDate"], json!("2001-11-15"));
        assert_eq!(value["Overview"], json!(null));
        assert_eq!(value["Players"], json!(4));
        assert_eq!(value["IsCoop"], json!(true));
        assert_eq!(value["Developers"], json!([{ "id": 1389, "name": "Bungie" }]));
        assert_eq!(value["Genres"], json!([8]));
        assert_eq!(value["Publishers"], json!([]));
        assert_eq!(value["Uids"][0]["GamesUidsPatternsID"], json!(2));
        assert_eq!(value["Images"][0]["Type"], json!("boxart"));
        assert_eq!(value["Images"][0]["Resolution"], json!(null));
    }

    #[test]
    fn snapshot_reloads_both_reference_shapes() {
        let db = CleanDb {
            games: vec![sample_game()],
            image_base_urls: IndexMap::from([("original".to_string(), "https://cdn/".to_string())]),
        };
        let bytes = serde_json::to_vec(&db).unwrap();
        let back: CleanDb = serde_json::from_slice(&bytes).unwrap();
        let game = &back.games[0];
        assert_eq!(game.developers, sample_game().developers);
        assert_eq!(game.genres, vec![GameRef::Id(8)]);
        // Empty overview does not survive the wire.
        assert_eq!(game.overview, NullString::absent());
        assert_eq!(back.image_base_urls["original"], "https://cdn/");
    }
}
