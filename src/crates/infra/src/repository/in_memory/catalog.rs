use async_trait::async_trait;
use chrono::NaiveDateTime;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use domain::catalog::{CatalogError, CatalogStore};
use domain::engagement::{EngagementKey, LikeRecord, PlayRecord};
use domain::song::Song;
use domain::user::User;
use domain::value::{SongId, UserId, UserRef};
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

/// 内存曲库
///
/// 每条记录的写入都在 DashMap 的分片锁内完成，满足单条记录原子写入的要求。
#[derive(Clone, Default)]
pub struct InMemoryCatalogStore {
    songs: Arc<DashMap<SongId, Song>>,
    users: Arc<DashMap<UserId, User>>,
    /// 邮箱 -> 用户 id
    emails: Arc<DashMap<String, UserId>>,
    plays: Arc<DashMap<EngagementKey, PlayRecord>>,
    likes: Arc<DashMap<EngagementKey, LikeRecord>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_song(&self, song: Song) {
        self.songs.insert(song.id, song);
    }

    /// 添加用户，邮箱已被其他用户占用时返回 Conflict
    pub fn insert_user(&self, user: User) -> Result<(), CatalogError> {
        match self.emails.entry(user.email.clone()) {
            Entry::Occupied(existing) if *existing.get() != user.id => {
                return Err(CatalogError::Conflict(format!(
                    "email {} already belongs to user {}",
                    user.email,
                    existing.get()
                )));
            }
            Entry::Occupied(_) => {}
            Entry::Vacant(vacant) => {
                vacant.insert(user.id);
            }
        }
        if let Some(previous) = self.users.insert(user.id, user.clone()) {
            if previous.email != user.email {
                self.emails.remove(&previous.email);
            }
        }
        Ok(())
    }

    /// 删除歌曲，同时删除引用它的播放记录和喜欢记录
    pub fn remove_song(&self, id: SongId) -> Option<Song> {
        let removed = self.songs.remove(&id).map(|(_, song)| song);
        if removed.is_some() {
            self.plays.retain(|key, _| key.song_id != id);
            self.likes.retain(|key, _| key.song_id != id);
            debug!("Removed song {} and its engagement records", id);
        }
        removed
    }

    /// 管理员重置播放次数
    pub fn reset_play_count(&self, id: SongId) -> Result<(), CatalogError> {
        let mut song = self
            .songs
            .get_mut(&id)
            .ok_or_else(|| CatalogError::NotFound(format!("song {}", id)))?;
        song.play_count = 0;
        Ok(())
    }

    pub fn play_record_count(&self) -> usize {
        self.plays.len()
    }

    pub fn like_record_count(&self) -> usize {
        self.likes.len()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn find_song(&self, id: SongId) -> Result<Option<Song>, CatalogError> {
        Ok(self.songs.get(&id).map(|v| v.clone()))
    }

    async fn find_user(&self, user: &UserRef) -> Result<Option<User>, CatalogError> {
        let id = match user {
            UserRef::Id(id) => *id,
            UserRef::Email(email) => match self.emails.get(email) {
                Some(id) => *id,
                None => return Ok(None),
            },
        };
        // 邮箱索引与用户表分开写入，这里再核对一次
        Ok(self
            .users
            .get(&id)
            .map(|v| v.clone())
            .filter(|found| found.matches(user)))
    }

    async fn update_song_play_count(
        &self,
        id: SongId,
        new_count: u64,
    ) -> Result<(), CatalogError> {
        let mut song = self
            .songs
            .get_mut(&id)
            .ok_or_else(|| CatalogError::NotFound(format!("song {}", id)))?;
        song.play_count = new_count;
        Ok(())
    }

    async fn upsert_play_record(
        &self,
        user_id: UserId,
        song_id: SongId,
        played_at: NaiveDateTime,
    ) -> Result<(), CatalogError> {
        let record = PlayRecord::new(user_id, song_id, played_at);
        self.plays.insert(record.key(), record);
        Ok(())
    }

    async fn find_play_record(
        &self,
        user_id: UserId,
        song_id: SongId,
    ) -> Result<Option<PlayRecord>, CatalogError> {
        Ok(self
            .plays
            .get(&EngagementKey::new(user_id, song_id))
            .map(|v| v.clone()))
    }

    async fn all_play_records_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<PlayRecord>, CatalogError> {
        Ok(self
            .plays
            .iter()
            .filter(|e| e.key().user_id == user_id)
            .map(|e| e.value().clone())
            .collect())
    }

    async fn create_like_record(
        &self,
        user_id: UserId,
        song_id: SongId,
    ) -> Result<(), CatalogError> {
        let record = LikeRecord::new(user_id, song_id);
        match self.likes.entry(record.key()) {
            Entry::Occupied(existing) => Err(CatalogError::Conflict(format!(
                "like record {} already exists",
                existing.key()
            ))),
            Entry::Vacant(vacant) => {
                vacant.insert(record);
                Ok(())
            }
        }
    }

    async fn delete_like_record(
        &self,
        user_id: UserId,
        song_id: SongId,
    ) -> Result<(), CatalogError> {
        let key = EngagementKey::new(user_id, song_id);
        self.likes
            .remove(&key)
            .map(|_| ())
            .ok_or_else(|| CatalogError::NotFound(format!("like record {}", key)))
    }

    async fn find_like_record(
        &self,
        user_id: UserId,
        song_id: SongId,
    ) -> Result<Option<LikeRecord>, CatalogError> {
        Ok(self
            .likes
            .get(&EngagementKey::new(user_id, song_id))
            .map(|v| v.clone()))
    }

    async fn all_like_records_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<LikeRecord>, CatalogError> {
        Ok(self
            .likes
            .iter()
            .filter(|e| e.key().user_id == user_id)
            .map(|e| e.value().clone())
            .collect())
    }

    async fn count_likes_by_song(&self) -> Result<HashMap<SongId, u64>, CatalogError> {
        let mut counts = HashMap::new();
        for entry in self.likes.iter() {
            *counts.entry(entry.key().song_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn all_songs(&self) -> Result<Vec<Song>, CatalogError> {
        Ok(self.songs.iter().map(|e| e.value().clone()).collect())
    }
}
