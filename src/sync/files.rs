//! Durable artifacts under the data directory.
//!
//! Every artifact is read and written whole. Writes land in a sibling
//! `.tmp` file first and are renamed into place, so a crash mid-write leaves
//! the previous version intact.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::SyncError;
use crate::model::dump::{LookupDocument, LookupKind};
use crate::model::CleanDb;
use crate::sync::meta::CacheMetadata;
use crate::transform::Lookups;

pub const META_FILE: &str = "_meta.json";
pub const DUMP_FILE: &str = "_dump.json";
pub const CLEAN_FILE: &str = "_clean.json";

#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn meta_path(&self) -> PathBuf {
        self.root.join(META_FILE)
    }

    pub fn dump_path(&self) -> PathBuf {
        self.root.join(DUMP_FILE)
    }

    pub fn clean_path(&self) -> PathBuf {
        self.root.join(CLEAN_FILE)
    }

    /// Create the directory if missing; fail if the path is something else.
    pub async fn ensure_exists(&self) -> Result<(), SyncError> {
        match tokio::fs::metadata(&self.root).await {
            Ok(md) if md.is_dir() => Ok(()),
            Ok(_) => Err(SyncError::NotADirectory(self.root.clone())),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(dir = %self.root.display(), "creating data dir");
                tokio::fs::create_dir_all(&self.root)
                    .await
                    .map_err(|e| SyncError::io(&self.root, e))
            }
            Err(err) => Err(SyncError::io(&self.root, err)),
        }
    }

    /// Stored metadata, or a fresh instance when missing or from another
    /// schema version.
    pub async fn read_meta(&self) -> Result<CacheMetadata, SyncError> {
        let path = self.meta_path();
        let Some(bytes) = read_optional(&path).await? else {
            info!("no meta found");
            return Ok(CacheMetadata::fresh());
        };
        match CacheMetadata::from_json(&bytes).map_err(|e| SyncError::decode(META_FILE, e))? {
            Some(meta) => Ok(meta),
            None => {
                warn!("stored meta is from another version; starting fresh");
                Ok(CacheMetadata::fresh())
            }
        }
    }

    pub async fn write_meta(&self, meta: &CacheMetadata) -> Result<(), SyncError> {
        let bytes = meta.to_json().map_err(|e| SyncError::encode(META_FILE, e))?;
        write_atomic(&self.meta_path(), &bytes).await
    }

    pub async fn read_dump(&self) -> Result<Vec<u8>, SyncError> {
        let path = self.dump_path();
        tokio::fs::read(&path).await.map_err(|e| SyncError::io(path, e))
    }

    pub async fn write_dump(&self, body: &[u8]) -> Result<(), SyncError> {
        write_atomic(&self.dump_path(), body).await
    }

    /// The last normalized snapshot, if one was ever written.
    pub async fn read_clean(&self) -> Result<Option<CleanDb>, SyncError> {
        let Some(bytes) = read_optional(&self.clean_path()).await? else {
            return Ok(None);
        };
        tokio::task::spawn_blocking(move || serde_json::from_slice::<CleanDb>(&bytes))
            .await?
            .map(Some)
            .map_err(|e| SyncError::decode(CLEAN_FILE, e))
    }

    pub async fn write_clean_bytes(&self, bytes: &[u8]) -> Result<(), SyncError> {
        write_atomic(&self.clean_path(), bytes).await
    }

    /// Side tables found next to the dump. A missing file leaves that
    /// relation unresolved; a present but unreadable one is an error.
    pub async fn read_lookups(&self) -> Result<Lookups, SyncError> {
        let mut lookups = Lookups::unresolved();
        for kind in LookupKind::ALL {
            let path = self.root.join(kind.file_name());
            let Some(bytes) = read_optional(&path).await? else {
                debug!(file = kind.file_name(), "no lookup table; ids stay raw");
                continue;
            };
            let table = serde_json::from_slice::<LookupDocument>(&bytes)
                .and_then(|doc| doc.into_table(kind))
                .map_err(|e| SyncError::decode(kind.file_name(), e))?;
            info!(kind = kind.key(), entries = table.len(), "loaded lookup table");
            lookups.set(kind, table);
        }
        Ok(lookups)
    }
}

async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, SyncError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(SyncError::io(path, err)),
    }
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), SyncError> {
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes)
        .await
        .map_err(|e| SyncError::io(&tmp, e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| SyncError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_missing_dir_and_rejects_files() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = DataDir::new(tmp.path().join("a/b"));
        nested.ensure_exists().await.unwrap();
        assert!(nested.root().is_dir());

        let file = tmp.path().join("plain");
        std::fs::write(&file, b"x").unwrap();
        let err = DataDir::new(&file).ensure_exists().await.unwrap_err();
        assert!(matches!(err, SyncError::NotADirectory(_)));
    }

    #[tokio::test]
    async fn meta_defaults_when_missing_and_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = DataDir::new(tmp.path());
        let mut meta = dir.read_meta().await.unwrap();
        assert_eq!(meta, CacheMetadata::fresh());

        meta.db_dump_etag = "\"abc\"".into();
        meta.db_dump_last_edit_id = 9;
        dir.write_meta(&meta).await.unwrap();
        assert_eq!(dir.read_meta().await.unwrap(), meta);
        assert!(!tmp.path().join("_meta.json.tmp").exists());
    }

    #[tokio::test]
    async fn corrupt_meta_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(META_FILE), b"{{").unwrap();
        let err = DataDir::new(tmp.path()).read_meta().await.unwrap_err();
        assert!(matches!(err, SyncError::Decode { .. }));
    }

    #[tokio::test]
    async fn missing_snapshot_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(DataDir::new(tmp.path()).read_clean().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn lookups_follow_files_present() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("genres.json"),
            br#"{"code":200,"status":"Success","data":{"count":1,"genres":{"1":{"id":1,"name":"Action"}}}}"#,
        )
        .unwrap();
        let lookups = DataDir::new(tmp.path()).read_lookups().await.unwrap();
        assert_eq!(lookups.genres.as_ref().unwrap()[&1].name, "Action");
        assert!(lookups.developers.is_none());
        assert!(lookups.publishers.is_none());
    }

    #[tokio::test]
    async fn unreadable_lookup_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("publishers.json"), b"not json").unwrap();
        let err = DataDir::new(tmp.path()).read_lookups().await.unwrap_err();
        assert!(err.to_string().contains("publishers.json"));
    }
}
