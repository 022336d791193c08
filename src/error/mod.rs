use crate::archive::ArchiveError;
use crate::config::ConfigError;
use crate::snapshot::SnapshotError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("liveness endpoint failed to start: {0}")]
    Health(#[source] std::io::Error),
    #[error("failed to write rendered image: {0}")]
    Render(#[source] std::io::Error),
}
