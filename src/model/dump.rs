//! Raw shapes of the TheGamesDB JSON dump (`database-latest.json`) and of the
//! baked genre/developer/publisher lookup documents.
//!
//! The dump is denormalized: games carry foreign keys into the `include`
//! tables. Optional upstream fields stay `Option` here; collapsing them into
//! presence-aware values happens in [`crate::transform`].

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub type GameId = i64;
pub type PlatformId = i64;

const GAMESDB_DATE_FORMAT: &str = "%Y-%m-%d";

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DumpDb {
    #[serde(default)]
    pub last_edit_id: i64,
    #[serde(default)]
    pub include: DumpIncludes,
    #[serde(default)]
    pub data: DumpGamesData,
}

impl DumpDb {
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DumpIncludes {
    #[serde(default)]
    pub platform: DumpPlatformsData,
    #[serde(rename = "boxart", default)]
    pub images: DumpImagesData,
}

// ---------- platforms ----------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DumpPlatformsData {
    /// Keyed by platform id; the JSON keys are stringified integers.
    #[serde(rename = "data", default)]
    pub by_id: HashMap<PlatformId, DumpPlatform>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpPlatform {
    #[serde(default)]
    pub id: PlatformId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub alias: String,
}

// ---------- images ----------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DumpImagesData {
    #[serde(rename = "base_url", default)]
    pub base_urls: IndexMap<String, String>,
    /// Keyed by game id.
    #[serde(rename = "data", default)]
    pub by_game_id: HashMap<GameId, Vec<DumpImage>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpImage {
    #[serde(default)]
    pub id: i64,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default)]
    pub side: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub filename: String,
    #[serde(default)]
    pub resolution: Option<String>,
}

// ---------- games ----------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DumpGamesData {
    #[serde(default)]
    pub games: Vec<DumpGame>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DumpGame {
    pub id: GameId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub game_title: String,
    #[serde(rename = "platform", default)]
    pub platform_id: PlatformId,
    #[serde(default)]
    pub release_date: Option<GamesDbDate>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub youtube: Option<String>,
    #[serde(default)]
    pub players: Option<i32>,
    /// "Yes"/"No" upstream.
    #[serde(default)]
    pub coop: Option<String>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(rename = "developers", default)]
    pub developer_ids: Option<Vec<i64>>,
    #[serde(rename = "genres", default)]
    pub genre_ids: Option<Vec<i64>>,
    #[serde(rename = "publishers", default)]
    pub publisher_ids: Option<Vec<i64>>,
    #[serde(alias = "alternates", default)]
    pub alternatives: Option<Vec<String>>,
    #[serde(default)]
    pub uids: Option<Vec<DumpUid>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpUid {
    #[serde(default, deserialize_with = "null_as_default")]
    pub uid: String,
    #[serde(default)]
    pub games_uids_patterns_id: i64,
}

/// A `YYYY-MM-DD` calendar date as used throughout TheGamesDB.
///
/// Decoding anything else is an error, which fails the whole dump decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GamesDbDate(pub NaiveDate);

#[derive(Debug, thiserror::Error)]
pub enum DateError {
    #[error("expected YYYY-MM-DD")]
    Layout,
    #[error(transparent)]
    Calendar(#[from] chrono::ParseError),
}

impl GamesDbDate {
    /// Strict fixed-width parse. chrono alone accepts unpadded fields and
    /// leading spaces, which would not survive re-encoding.
    pub fn parse(raw: &str) -> Result<Self, DateError> {
        let fixed_width = raw.len() == 10
            && raw.bytes().enumerate().all(|(i, b)| match i {
                4 | 7 => b == b'-',
                _ => b.is_ascii_digit(),
            });
        if !fixed_width {
            return Err(DateError::Layout);
        }
        Ok(Self(NaiveDate::parse_from_str(raw, GAMESDB_DATE_FORMAT)?))
    }
}

impl fmt::Display for GamesDbDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(GAMESDB_DATE_FORMAT))
    }
}

impl Serialize for GamesDbDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GamesDbDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw)
            .map_err(|err| D::Error::custom(format!("invalid release date {raw:?}: {err}")))
    }
}

// ---------- baked lookup tables ----------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupItem {
    pub id: i64,
    pub name: String,
}

/// Which side table a lookup document carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    Genres,
    Developers,
    Publishers,
}

impl LookupKind {
    pub const ALL: [LookupKind; 3] = [
        LookupKind::Genres,
        LookupKind::Developers,
        LookupKind::Publishers,
    ];

    /// Key under `data` in the API envelope, e.g. `data.genres`.
    pub fn key(&self) -> &'static str {
        match self {
            LookupKind::Genres => "genres",
            LookupKind::Developers => "developers",
            LookupKind::Publishers => "publishers",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            LookupKind::Genres => "genres.json",
            LookupKind::Developers => "developers.json",
            LookupKind::Publishers => "publishers.json",
        }
    }

    pub fn singular(&self) -> &'static str {
        match self {
            LookupKind::Genres => "genre",
            LookupKind::Developers => "developer",
            LookupKind::Publishers => "publisher",
        }
    }
}

/// `/Genres`, `/Developers` and `/Publishers` API responses share this envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LookupDocument {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub status: String,
    /// Holds the table under [`LookupKind::key`] next to a `count` field.
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl LookupDocument {
    /// Flattens the table for `kind` into an id-keyed map. A document without
    /// that table yields an empty map.
    pub fn into_table(mut self, kind: LookupKind) -> serde_json::Result<HashMap<i64, LookupItem>> {
        let Some(raw) = self.data.remove(kind.key()) else {
            return Ok(HashMap::new());
        };
        let items: HashMap<String, LookupItem> = serde_json::from_value(raw)?;
        Ok(items.into_values().map(|item| (item.id, item)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "code": 200,
        "last_edit_id": 42,
        "include": {
            "platform": { "data": { "7": { "id": 7, "name": "Nintendo Entertainment System (NES)", "alias": "nintendo-entertainment-system-nes" } } },
            "boxart": {
                "base_url": { "original": "https://cdn.thegamesdb.net/images/original/", "small": "https://cdn.thegamesdb.net/images/small/" },
                "data": { "1": [ { "id": 11, "type": "boxart", "side": "front", "filename": "boxart/front/1-1.jpg", "resolution": null } ] }
            }
        },
        "data": { "count": 1, "games": [
            { "id": 1, "game_title": "Halo: Combat Evolved", "release_date": "2001-11-15", "platform": 7,
              "players": 4, "overview": "x", "coop": "Yes", "developers": [1389], "genres": null,
              "alternates": ["Halo"], "uids": [ { "uid": "SLUS-00001", "games_uids_patterns_id": 3 } ] }
        ] }
    }"#;

    #[test]
    fn decodes_sample_dump() {
        let dump = DumpDb::from_slice(SAMPLE.as_bytes()).unwrap();
        assert_eq!(dump.last_edit_id, 42);
        assert_eq!(dump.include.platform.by_id[&7].alias, "nintendo-entertainment-system-nes");
        assert_eq!(dump.include.images.by_game_id[&1][0].side.as_deref(), Some("front"));
        let keys: Vec<_> = dump.include.images.base_urls.keys().cloned().collect();
        assert_eq!(keys, vec!["original", "small"]);

        let game = &dump.data.games[0];
        assert_eq!(game.platform_id, 7);
        assert_eq!(game.release_date.unwrap().to_string(), "2001-11-15");
        assert_eq!(game.developer_ids.as_deref(), Some(&[1389][..]));
        assert!(game.genre_ids.is_none());
        assert!(game.publisher_ids.is_none());
        assert_eq!(game.alternatives.as_deref(), Some(&["Halo".to_string()][..]));
        assert_eq!(game.uids.as_ref().unwrap()[0].games_uids_patterns_id, 3);
    }

    #[test]
    fn malformed_date_fails_the_whole_decode() {
        let raw = r#"{"last_edit_id":1,"data":{"games":[
            {"id":1,"game_title":"ok","platform":1,"release_date":"2001-01-01"},
            {"id":2,"game_title":"bad","platform":1,"release_date":"15/11/2001"}
        ]}}"#;
        let err = DumpDb::from_slice(raw.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("invalid release date"));

        let unpadded = r#"{"data":{"games":[
            {"id":1,"game_title":"t","platform":1,"release_date":"2001-1-5"}
        ]}}"#;
        assert!(DumpDb::from_slice(unpadded.as_bytes()).is_err());
    }

    #[test]
    fn date_requires_fixed_width_layout() {
        for raw in ["2001-1-5", " 2001-01-05", "2001-01- 5", "1-01-05", "2001-01-05 "] {
            assert!(
                matches!(GamesDbDate::parse(raw), Err(DateError::Layout)),
                "{raw:?} should be rejected"
            );
        }
        assert!(matches!(
            GamesDbDate::parse("2001-02-30"),
            Err(DateError::Calendar(_))
        ));
        assert_eq!(GamesDbDate::parse("2001-01-05").unwrap().to_string(), "2001-01-05");
    }

    #[test]
    fn null_date_is_absent() {
        let raw = r#"{"data":{"games":[{"id":1,"game_title":"t","platform":1,"release_date":null}]}}"#;
        let dump = DumpDb::from_slice(raw.as_bytes()).unwrap();
        assert!(dump.data.games[0].release_date.is_none());
    }

    #[test]
    fn date_reencodes_in_fixed_format() {
        let date = GamesDbDate::parse("1999-03-07").unwrap();
        assert_eq!(serde_json::to_string(&date).unwrap(), "\"1999-03-07\"");
    }

    #[test]
    fn lookup_document_flattens_by_item_id() {
        let raw = r#"{"code":200,"status":"Success","data":{"count":2,"genres":{
            "1":{"id":1,"name":"Action"},"2":{"id":2,"name":"Adventure"}}}}"#;
        let doc: LookupDocument = serde_json::from_str(raw).unwrap();
        assert_eq!(doc.code, 200);
        let table = doc.into_table(LookupKind::Genres).unwrap();
        assert_eq!(table[&2].name, "Adventure");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn lookup_document_without_table_is_empty() {
        let doc: LookupDocument = serde_json::from_str(r#"{"data":{"count":0}}"#).unwrap();
        assert!(doc.into_table(LookupKind::Publishers).unwrap().is_empty());
    }
}
