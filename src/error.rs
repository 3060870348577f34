use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a sync run. Nothing past the failing stage is
/// committed, so the next run starts from the last persisted metadata.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("origin request failed: {0}")]
    Origin(#[from] reqwest::Error),
    #[error("origin returned http {status}")]
    OriginStatus { status: u16 },
    #[error("io on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("decode {artifact}: {source}")]
    Decode {
        artifact: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("encode {artifact}: {source}")]
    Encode {
        artifact: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("transform worker failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl SyncError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn decode(artifact: impl Into<String>, source: serde_json::Error) -> Self {
        SyncError::Decode {
            artifact: artifact.into(),
            source,
        }
    }

    pub(crate) fn encode(artifact: impl Into<String>, source: serde_json::Error) -> Self {
        SyncError::Encode {
            artifact: artifact.into(),
            source,
        }
    }
}
