use domain::catalog::CatalogError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("Not found: {0}: {1}")]
    NotFound(String, String),
    /// 存储层检测到并发写冲突，调用方可以重试
    #[error("Conflict, retry later: {0}")]
    ConflictRetryable(String),
    #[error("Catalog store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Play count of song {0} cannot be incremented any further")]
    PlayCountOverflow(String),
}

impl AppError {
    pub fn song_not_found(id: impl ToString) -> Self {
        AppError::NotFound("Song".to_string(), id.to_string())
    }

    pub fn user_not_found(user: impl ToString) -> Self {
        AppError::NotFound("User".to_string(), user.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(..))
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(msg) => AppError::NotFound("Catalog".to_string(), msg),
            CatalogError::Conflict(msg) => AppError::ConflictRetryable(msg),
            CatalogError::Unavailable(msg) => AppError::StoreUnavailable(msg),
        }
    }
}
