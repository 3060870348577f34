//! In-memory query store over the normalized snapshot.
//!
//! A [`QueryStore`] is immutable once built. [`StoreHandle`] is what the HTTP
//! layer holds: readers grab an `Arc` to the current store, and a reload
//! swaps in a whole new one, so nobody ever sees a half-built store.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

use indexmap::IndexMap;

use crate::model::{CleanDb, Game, GameId};

#[derive(Debug, Default)]
pub struct QueryStore {
    games: Vec<Game>,
    /// Lowercased titles, parallel to `games`.
    title_keys: Vec<String>,
    image_base_urls: IndexMap<String, String>,
}

impl QueryStore {
    pub fn new(games: Vec<Game>, image_base_urls: IndexMap<String, String>) -> Self {
        let title_keys = games.iter().map(|g| g.title.to_lowercase()).collect();
        Self {
            games,
            title_keys,
            image_base_urls,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn image_base_urls(&self) -> &IndexMap<String, String> {
        &self.image_base_urls
    }

    /// Games whose id is in `ids`, in store order. Duplicate ids collapse and
    /// the order of `ids` is irrelevant. `limit <= 0` means no cap.
    pub fn find_by_ids(&self, ids: &[GameId], limit: i64) -> Vec<&Game> {
        if ids.is_empty() {
            return Vec::new();
        }
        let wanted: HashSet<GameId> = ids.iter().copied().collect();
        self.scan(limit, |idx| wanted.contains(&self.games[idx].id))
    }

    /// Case-insensitive substring match on the title, in store order.
    /// An empty needle matches everything. `limit <= 0` means no cap.
    pub fn find_by_title(&self, title: &str, limit: i64) -> Vec<&Game> {
        let needle = title.to_lowercase();
        self.scan(limit, |idx| self.title_keys[idx].contains(&needle))
    }

    fn scan(&self, limit: i64, is_match: impl Fn(usize) -> bool) -> Vec<&Game> {
        let cap = usize::try_from(limit)
            .ok()
            .filter(|n| *n > 0)
            .unwrap_or(usize::MAX);
        (0..self.games.len())
            .filter(|idx| is_match(*idx))
            .take(cap)
            .map(|idx| &self.games[idx])
            .collect()
    }
}

impl From<CleanDb> for QueryStore {
    fn from(db: CleanDb) -> Self {
        QueryStore::new(db.games, db.image_base_urls)
    }
}

/// Shared, swappable pointer to the current store.
#[derive(Debug)]
pub struct StoreHandle {
    current: RwLock<Arc<QueryStore>>,
}

impl StoreHandle {
    pub fn new(store: QueryStore) -> Self {
        Self {
            current: RwLock::new(Arc::new(store)),
        }
    }

    /// The store as of now. Holding the `Arc` pins that version even if a
    /// reload happens meanwhile.
    pub fn snapshot(&self) -> Arc<QueryStore> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the store, returning the previous one.
    pub fn replace(&self, store: QueryStore) -> Arc<QueryStore> {
        let next = Arc::new(store);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Platform;

    fn game(id: GameId, title: &str) -> Game {
        Game {
            id,
            title: title.to_string(),
            platform: Platform::default(),
            release_date: None,
            overview: Default::default(),
            youtube: Default::default(),
            players: Default::default(),
            is_coop: Default::default(),
            rating: Default::default(),
            developers: vec![],
            genres: vec![],
            publishers: vec![],
            alternate_names: vec![],
            uids: vec![],
            images: vec![],
        }
    }

    fn store() -> QueryStore {
        QueryStore::new(
            vec![
                game(5, "Metroid"),
                game(7, "Super Mario Bros."),
                game(9, "Super Metroid"),
                game(11, "Mario Kart 64"),
            ],
            IndexMap::new(),
        )
    }

    fn ids(found: &[&Game]) -> Vec<GameId> {
        found.iter().map(|g| g.id).collect()
    }

    #[test]
    fn no_ids_no_results() {
        assert!(store().find_by_ids(&[], 0).is_empty());
        assert!(QueryStore::empty().find_by_ids(&[], 10).is_empty());
    }

    #[test]
    fn id_results_follow_store_order() {
        let s = store();
        assert_eq!(ids(&s.find_by_ids(&[11, 5, 9], 0)), vec![5, 9, 11]);
        assert_eq!(ids(&s.find_by_ids(&[11, 404], -1)), vec![11]);
    }

    #[test]
    fn duplicate_ids_collapse_and_limit_stops_early() {
        let s = store();
        assert_eq!(ids(&s.find_by_ids(&[7, 7, 9], 1)), vec![7]);
        assert_eq!(ids(&s.find_by_ids(&[9, 7, 7], 0)), vec![7, 9]);
    }

    #[test]
    fn title_match_is_case_insensitive_substring() {
        let s = store();
        assert_eq!(ids(&s.find_by_title("METROID", 0)), vec![5, 9]);
        assert_eq!(ids(&s.find_by_title("mario", 1)), vec![7]);
        assert!(s.find_by_title("zelda", 0).is_empty());
    }

    #[test]
    fn empty_title_matches_everything_up_to_limit() {
        let s = store();
        assert_eq!(ids(&s.find_by_title("", 2)), vec![5, 7]);
        assert_eq!(ids(&s.find_by_title("", 0)), vec![5, 7, 9, 11]);
        assert_eq!(ids(&s.find_by_title("", -3)).len(), 4);
    }

    #[test]
    fn replace_leaves_pinned_snapshots_intact() {
        let handle = StoreHandle::new(store());
        let pinned = handle.snapshot();

        let previous = handle.replace(QueryStore::new(vec![game(1, "Tetris")], IndexMap::new()));
        assert_eq!(previous.len(), 4);
        assert_eq!(pinned.len(), 4);
        assert_eq!(ids(&handle.snapshot().find_by_title("", 0)), vec![1]);
    }
}
