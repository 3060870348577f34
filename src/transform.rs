//! Dump → normalized games.
//!
//! Foreign keys are resolved against the dump's `include` tables and, when
//! supplied, the genre/developer/publisher side tables. Nothing in here fails:
//! a dangling reference degrades to an empty or zero value and a warning.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::model::dump::{DumpDb, DumpGame, DumpImage, LookupItem, LookupKind};
use crate::model::{CleanDb, Game, GameRef, Image, NullBool, NullInt, NullString, Platform, Uid};

pub type LookupTable = HashMap<i64, LookupItem>;

/// Optional side tables. A missing table keeps that relation as raw ids.
#[derive(Debug, Clone, Default)]
pub struct Lookups {
    pub genres: Option<LookupTable>,
    pub developers: Option<LookupTable>,
    pub publishers: Option<LookupTable>,
}

impl Lookups {
    /// No side tables: every relation passes raw ids through.
    pub fn unresolved() -> Self {
        Self::default()
    }

    pub fn table(&self, kind: LookupKind) -> Option<&LookupTable> {
        match kind {
            LookupKind::Genres => self.genres.as_ref(),
            LookupKind::Developers => self.developers.as_ref(),
            LookupKind::Publishers => self.publishers.as_ref(),
        }
    }

    pub fn set(&mut self, kind: LookupKind, table: LookupTable) {
        let slot = match kind {
            LookupKind::Genres => &mut self.genres,
            LookupKind::Developers => &mut self.developers,
            LookupKind::Publishers => &mut self.publishers,
        };
        *slot = Some(table);
    }
}

/// Normalize every game in `dump`, preserving dump order.
pub fn normalize(dump: &DumpDb, lookups: &Lookups) -> Vec<Game> {
    dump.data
        .games
        .iter()
        .map(|source| normalize_game(dump, source, lookups))
        .collect()
}

/// Build the full snapshot document, consuming the dump.
pub fn build_clean_db(dump: DumpDb, lookups: &Lookups) -> CleanDb {
    let games = normalize(&dump, lookups);
    CleanDb {
        games,
        image_base_urls: dump.include.images.base_urls,
    }
}

pub fn normalize_game(dump: &DumpDb, source: &DumpGame, lookups: &Lookups) -> Game {
    let platform = match dump.include.platform.by_id.get(&source.platform_id) {
        Some(p) => Platform {
            id: p.id,
            name: p.name.clone(),
            alias: p.alias.clone(),
        },
        None => {
            debug!(
                game_id = source.id,
                platform_id = source.platform_id,
                "platform not found"
            );
            Platform::default()
        }
    };

    let images: Vec<Image> = dump
        .include
        .images
        .by_game_id
        .get(&source.id)
        .map(|entries| entries.iter().map(normalize_image).collect())
        .unwrap_or_default();

    Game {
        id: source.id,
        title: source.game_title.clone(),
        platform,
        release_date: source.release_date,
        overview: non_empty(source.overview.as_ref()),
        youtube: non_empty(source.youtube.as_ref()),
        players: non_zero(source.players),
        is_coop: coop_flag(source.coop.as_deref()),
        rating: non_empty(source.rating.as_ref()),
        developers: resolve_refs(
            source.id,
            LookupKind::Developers,
            source.developer_ids.as_deref(),
            lookups,
        ),
        genres: resolve_refs(
            source.id,
            LookupKind::Genres,
            source.genre_ids.as_deref(),
            lookups,
        ),
        publishers: resolve_refs(
            source.id,
            LookupKind::Publishers,
            source.publisher_ids.as_deref(),
            lookups,
        ),
        alternate_names: source.alternatives.clone().unwrap_or_default(),
        uids: source
            .uids
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|u| Uid {
                uid: u.uid.clone(),
                games_uids_patterns_id: u.games_uids_patterns_id,
            })
            .collect(),
        images,
    }
}

fn normalize_image(img: &DumpImage) -> Image {
    Image {
        id: img.id,
        kind: img.kind.clone(),
        side: non_empty(img.side.as_ref()),
        filename: img.filename.clone(),
        resolution: non_empty(img.resolution.as_ref()),
    }
}

fn resolve_refs(
    game_id: i64,
    kind: LookupKind,
    ids: Option<&[i64]>,
    lookups: &Lookups,
) -> Vec<GameRef> {
    let ids = ids.unwrap_or_default();
    let Some(table) = lookups.table(kind) else {
        return ids.iter().copied().map(GameRef::Id).collect();
    };
    ids.iter()
        .filter_map(|id| match table.get(id) {
            Some(item) => Some(GameRef::Resolved(item.clone())),
            None => {
                warn!(game_id, kind = kind.singular(), id, "lookup id not found");
                None
            }
        })
        .collect()
}

/// Empty strings upstream mean "not set".
fn non_empty(value: Option<&String>) -> NullString {
    match value {
        Some(v) if !v.is_empty() => NullString::present(v.clone()),
        _ => NullString::absent(),
    }
}

/// Zero players upstream means "not set".
fn non_zero(value: Option<i32>) -> NullInt {
    match value {
        Some(v) if v != 0 => NullInt::present(v),
        _ => NullInt::absent(),
    }
}

fn coop_flag(value: Option<&str>) -> NullBool {
    match value {
        Some(v) => NullBool::present(v.eq_ignore_ascii_case("yes")),
        None => NullBool::absent(),
    }
}
