use crate::value::{SongId, UserId};
use chrono::NaiveDateTime;
use std::fmt;

/// 播放记录
///
/// 每个 (user, song) 至多一条；重复播放只刷新 `last_played_at`，不会追加新记录。
#[derive(Debug, Clone, PartialEq)]
pub struct PlayRecord {
    pub user_id: UserId,
    pub song_id: SongId,
    pub last_played_at: NaiveDateTime,
}

impl PlayRecord {
    pub fn new(user_id: UserId, song_id: SongId, last_played_at: NaiveDateTime) -> Self {
        Self {
            user_id,
            song_id,
            last_played_at,
        }
    }

    pub fn key(&self) -> EngagementKey {
        EngagementKey::new(self.user_id, self.song_id)
    }
}

/// 喜欢记录，存在即表示“已喜欢”
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LikeRecord {
    pub user_id: UserId,
    pub song_id: SongId,
}

impl LikeRecord {
    pub fn new(user_id: UserId, song_id: SongId) -> Self {
        Self { user_id, song_id }
    }

    pub fn key(&self) -> EngagementKey {
        EngagementKey::new(self.user_id, self.song_id)
    }
}

/// (user, song) 组合键，播放记录、喜欢记录和逐对加锁都按它区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EngagementKey {
    pub user_id: UserId,
    pub song_id: SongId,
}

impl EngagementKey {
    pub fn new(user_id: UserId, song_id: SongId) -> Self {
        Self { user_id, song_id }
    }
}

impl fmt::Display for EngagementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(user {}, song {})", self.user_id, self.song_id)
    }
}

/// 切换喜欢状态之后的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeState {
    Liked,
    Unliked,
}

impl LikeState {
    pub fn is_liked(&self) -> bool {
        matches!(self, LikeState::Liked)
    }
}

impl fmt::Display for LikeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LikeState::Liked => write!(f, "liked"),
            LikeState::Unliked => write!(f, "unliked"),
        }
    }
}
