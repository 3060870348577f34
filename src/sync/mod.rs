//! Dump sync: load metadata, revalidate against the origin, rebuild the
//! normalized snapshot when new content arrived, persist metadata.
//!
//! A run is sequential and not reentrant; callers serialize invocations
//! against the same data dir. Any error aborts the run before metadata is
//! written, so a retry starts from the last committed state.

pub mod files;
pub mod meta;
pub mod origin;

use bytes::Bytes;
use chrono::Utc;
use tracing::info;

use crate::error::SyncError;
use crate::model::{CleanDb, DumpDb};
use crate::transform::{build_clean_db, Lookups};

pub use files::{DataDir, CLEAN_FILE, DUMP_FILE, META_FILE};
pub use meta::{CacheMetadata, META_VERSION};
pub use origin::{DumpOrigin, FetchOutcome, HttpOrigin, DEFAULT_DUMP_URL};

#[derive(Debug)]
pub enum SyncOutcome {
    /// Origin answered 304; dump and snapshot were left alone.
    NotModified,
    /// A new snapshot was written and is returned for the caller to serve.
    Updated(CleanDb),
}

#[derive(Debug)]
pub struct SyncReport {
    pub meta: CacheMetadata,
    pub outcome: SyncOutcome,
}

pub struct Pipeline<O> {
    origin: O,
    data_dir: DataDir,
    lookups: Option<Lookups>,
}

impl<O: DumpOrigin> Pipeline<O> {
    /// Lookup tables are read from the data dir on every transform unless
    /// overridden with [`Pipeline::with_lookups`].
    pub fn new(origin: O, data_dir: DataDir) -> Self {
        Self {
            origin,
            data_dir,
            lookups: None,
        }
    }

    pub fn with_lookups(mut self, lookups: Lookups) -> Self {
        self.lookups = Some(lookups);
        self
    }

    pub fn data_dir(&self) -> &DataDir {
        &self.data_dir
    }

    pub async fn run(&self) -> Result<SyncReport, SyncError> {
        self.data_dir.ensure_exists().await?;
        let mut meta = self.load_metadata().await?;

        let outcome = match self.conditional_fetch(&mut meta).await? {
            Some(body) => {
                SyncOutcome::Updated(self.transform_and_persist(body, &mut meta).await?)
            }
            None => SyncOutcome::NotModified,
        };

        self.persist_metadata(&meta).await?;
        Ok(SyncReport { meta, outcome })
    }

    /// Re-derive the snapshot from the dump already on disk, without
    /// contacting the origin. Useful after changing the lookup tables.
    pub async fn rebuild(&self) -> Result<SyncReport, SyncError> {
        let mut meta = self.load_metadata().await?;
        let body = Bytes::from(self.data_dir.read_dump().await?);
        let clean = self.transform_and_persist(body, &mut meta).await?;
        self.persist_metadata(&meta).await?;
        Ok(SyncReport {
            meta,
            outcome: SyncOutcome::Updated(clean),
        })
    }

    async fn load_metadata(&self) -> Result<CacheMetadata, SyncError> {
        let mut meta = self.data_dir.read_meta().await?;
        meta.mark_ran(Utc::now());
        info!(
            etag = %meta.db_dump_etag,
            db_dump_last_edit_id = meta.db_dump_last_edit_id,
            games_last_edit_id = meta.games_last_edit_id,
            "meta loaded"
        );
        Ok(meta)
    }

    async fn conditional_fetch(
        &self,
        meta: &mut CacheMetadata,
    ) -> Result<Option<Bytes>, SyncError> {
        info!(conditional = meta.validator().is_some(), "downloading db dump");
        let fetched = self.origin.fetch(meta.validator()).await?;
        match fetched {
            FetchOutcome::NotModified => {
                info!("dump not modified since last download");
                Ok(None)
            }
            FetchOutcome::Modified { body, etag } => {
                self.data_dir.write_dump(&body).await?;
                meta.record_download(etag, Utc::now());
                info!(etag = %meta.db_dump_etag, bytes = body.len(), "dump saved");
                Ok(Some(body))
            }
        }
    }

    async fn transform_and_persist(
        &self,
        body: Bytes,
        meta: &mut CacheMetadata,
    ) -> Result<CleanDb, SyncError> {
        let lookups = match &self.lookups {
            Some(lookups) => lookups.clone(),
            None => self.data_dir.read_lookups().await?,
        };

        // Decoding and normalizing a full dump is CPU-bound.
        let (clean, last_edit_id, encoded) =
            tokio::task::spawn_blocking(move || -> Result<_, SyncError> {
                let dump =
                    DumpDb::from_slice(&body).map_err(|e| SyncError::decode(DUMP_FILE, e))?;
                let last_edit_id = dump.last_edit_id;
                let clean = build_clean_db(dump, &lookups);
                let encoded =
                    serde_json::to_vec(&clean).map_err(|e| SyncError::encode(CLEAN_FILE, e))?;
                Ok((clean, last_edit_id, encoded))
            })
            .await??;

        meta.record_dump_edit_id(last_edit_id);
        info!(last_edit_id, games = clean.games.len(), "dump parsed");

        meta.apply_game_updates();
        info!(
            games_last_edit_id = meta.games_last_edit_id,
            "game updates recorded (incremental apply not implemented)"
        );

        self.data_dir.write_clean_bytes(&encoded).await?;
        info!(path = %self.data_dir.clean_path().display(), "snapshot saved");
        Ok(clean)
    }

    async fn persist_metadata(&self, meta: &CacheMetadata) -> Result<(), SyncError> {
        self.data_dir.write_meta(meta).await?;
        info!("meta saved");
        Ok(())
    }
}
