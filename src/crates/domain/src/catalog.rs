use crate::engagement::{LikeRecord, PlayRecord};
use crate::song::Song;
use crate::user::User;
use crate::value::{SongId, UserId, UserRef};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Entity not found: {0}")]
    NotFound(String),
    #[error("Write conflict: {0}")]
    Conflict(String),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// 曲库存储
///
/// 持久化由实现方负责，单条记录的写入必须是原子的；
/// 跨记录的聚合语义由 application 层保证。
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_song(&self, id: SongId) -> Result<Option<Song>, CatalogError>;
    async fn find_user(&self, user: &UserRef) -> Result<Option<User>, CatalogError>;
    async fn update_song_play_count(&self, id: SongId, new_count: u64)
        -> Result<(), CatalogError>;

    async fn upsert_play_record(
        &self,
        user_id: UserId,
        song_id: SongId,
        played_at: NaiveDateTime,
    ) -> Result<(), CatalogError>;
    async fn find_play_record(
        &self,
        user_id: UserId,
        song_id: SongId,
    ) -> Result<Option<PlayRecord>, CatalogError>;
    async fn all_play_records_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<PlayRecord>, CatalogError>;

    async fn create_like_record(&self, user_id: UserId, song_id: SongId)
        -> Result<(), CatalogError>;
    async fn delete_like_record(&self, user_id: UserId, song_id: SongId)
        -> Result<(), CatalogError>;
    async fn find_like_record(
        &self,
        user_id: UserId,
        song_id: SongId,
    ) -> Result<Option<LikeRecord>, CatalogError>;
    async fn all_like_records_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<LikeRecord>, CatalogError>;
    /// 按歌曲分组统计喜欢数，没有喜欢记录的歌曲不会出现在结果里
    async fn count_likes_by_song(&self) -> Result<HashMap<SongId, u64>, CatalogError>;

    async fn all_songs(&self) -> Result<Vec<Song>, CatalogError>;
}
