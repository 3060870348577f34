//! Cache-validation metadata persisted between sync runs (`_meta.json`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bump when the stored shape changes; older files are discarded, which also
/// drops the stored ETag and forces a full download.
pub const META_VERSION: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CacheMetadata {
    pub version: u32,
    #[serde(default)]
    pub ran_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub db_dump_etag: String,
    #[serde(rename = "DbDumpLastEditID", default)]
    pub db_dump_last_edit_id: i64,
    #[serde(rename = "GamesLastEditID", default)]
    pub games_last_edit_id: i64,
}

#[derive(Deserialize)]
struct VersionProbe {
    #[serde(rename = "Version", default)]
    version: u32,
}

impl Default for CacheMetadata {
    fn default() -> Self {
        Self {
            version: META_VERSION,
            ran_at: None,
            saved_at: None,
            db_dump_etag: String::new(),
            db_dump_last_edit_id: 0,
            games_last_edit_id: 0,
        }
    }
}

impl CacheMetadata {
    pub fn fresh() -> Self {
        Self::default()
    }

    /// Decode a stored document. `Ok(None)` means it was written by another
    /// schema version and should be replaced with [`CacheMetadata::fresh`].
    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Option<Self>> {
        let probe: VersionProbe = serde_json::from_slice(bytes)?;
        if probe.version != META_VERSION {
            return Ok(None);
        }
        serde_json::from_slice(bytes).map(Some)
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }

    /// Validator to send upstream; `None` makes the fetch unconditional.
    pub fn validator(&self) -> Option<&str> {
        Some(self.db_dump_etag.as_str()).filter(|tag| !tag.is_empty())
    }

    pub fn mark_ran(&mut self, at: DateTime<Utc>) {
        self.ran_at = Some(at);
    }

    pub fn record_download(&mut self, etag: Option<String>, at: DateTime<Utc>) {
        self.db_dump_etag = etag.unwrap_or_default();
        self.saved_at = Some(at);
    }

    pub fn record_dump_edit_id(&mut self, last_edit_id: i64) {
        self.db_dump_last_edit_id = last_edit_id;
        // Games can never be ahead of the dump that fed them.
        self.games_last_edit_id = self.games_last_edit_id.min(last_edit_id);
    }

    /// Incremental reconciliation of previously applied games is not
    /// implemented; only the bookkeeping advances.
    pub fn apply_game_updates(&mut self) {
        self.games_last_edit_id = self.db_dump_last_edit_id;
    }
}
