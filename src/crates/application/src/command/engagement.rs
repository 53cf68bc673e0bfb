use crate::error::AppError;
use crate::shared::{resolve_song, resolve_user, Clock, KeyedLocks, SnapshotGate};
use domain::catalog::CatalogStore;
use domain::engagement::{EngagementKey, LikeState, PlayRecord};
use domain::value::{SongId, UserRef};
use log::{debug, error, warn};
use std::sync::Arc;

/// 参与度写入服务
///
/// 唯一会修改参与度状态（播放次数、播放记录、喜欢记录）的组件。
/// - 播放次数的读改写按歌曲加锁串行化，同一首歌的并发播放不会丢失计数；
/// - 喜欢的切换按 (user, song) 加锁，每次调用恰好翻转一次；
/// - 不同的键之间互不阻塞。
pub struct EngagementStore {
    catalog: Arc<dyn CatalogStore>,
    clock: Arc<dyn Clock>,
    gate: SnapshotGate,
    /// 为每首歌维护一个锁，串行化播放次数的读改写
    song_locks: KeyedLocks<SongId>,
    /// 为每个 (user, song) 组合维护一个锁，串行化喜欢状态的切换
    pair_locks: KeyedLocks<EngagementKey>,
}

impl EngagementStore {
    pub fn new(catalog: Arc<dyn CatalogStore>, clock: Arc<dyn Clock>, gate: SnapshotGate) -> Self {
        Self {
            catalog,
            clock,
            gate,
            song_locks: KeyedLocks::new(),
            pair_locks: KeyedLocks::new(),
        }
    }

    /// 记录一次播放：播放次数加一，并刷新（或创建）该用户对这首歌的播放记录
    pub async fn record_play(
        &self,
        user: &UserRef,
        song_id: SongId,
    ) -> Result<PlayRecord, AppError> {
        let user = resolve_user(self.catalog.as_ref(), user).await?;

        let _song_guard = self.song_locks.lock(&song_id).await;
        // 持锁之后再读歌曲，拿到的播放次数才是最新的
        let song = resolve_song(self.catalog.as_ref(), song_id).await?;

        let _gate = self.gate.enter_write().await;
        let played_at = self.clock.now();
        let previous = song.play_count;
        let next = previous
            .checked_add(1)
            .ok_or_else(|| AppError::PlayCountOverflow(song_id.to_string()))?;
        self.catalog.update_song_play_count(song_id, next).await?;

        if let Err(e) = self
            .catalog
            .upsert_play_record(user.id, song_id, played_at)
            .await
        {
            warn!(
                "Failed to upsert play record for {}, restoring play count of song {} to {}: {}",
                EngagementKey::new(user.id, song_id),
                song_id,
                previous,
                e
            );
            if let Err(restore_err) = self
                .catalog
                .update_song_play_count(song_id, previous)
                .await
            {
                error!(
                    "Failed to restore play count of song {}: {}",
                    song_id, restore_err
                );
            }
            return Err(e.into());
        }

        debug!(
            "Recorded play of song {} by user {}, play count {} -> {}",
            song_id,
            user.id,
            previous,
            next
        );
        Ok(PlayRecord::new(user.id, song_id, played_at))
    }

    /// 切换喜欢状态：没有喜欢记录则创建（Liked），已有则删除（Unliked）
    pub async fn toggle_like(
        &self,
        user: &UserRef,
        song_id: SongId,
    ) -> Result<LikeState, AppError> {
        let user = resolve_user(self.catalog.as_ref(), user).await?;
        resolve_song(self.catalog.as_ref(), song_id).await?;

        let key = EngagementKey::new(user.id, song_id);
        let _pair_guard = self.pair_locks.lock(&key).await;
        let _gate = self.gate.enter_write().await;

        let state = match self.catalog.find_like_record(user.id, song_id).await? {
            Some(_) => {
                self.catalog.delete_like_record(user.id, song_id).await?;
                LikeState::Unliked
            }
            None => {
                self.catalog.create_like_record(user.id, song_id).await?;
                LikeState::Liked
            }
        };
        debug!("Toggled like for {}: {}", key, state);
        Ok(state)
    }

    /// 从喜欢列表中移除；歌曲不在列表里时返回 NotFound
    pub async fn remove_like(&self, user: &UserRef, song_id: SongId) -> Result<(), AppError> {
        let user = resolve_user(self.catalog.as_ref(), user).await?;
        resolve_song(self.catalog.as_ref(), song_id).await?;

        let key = EngagementKey::new(user.id, song_id);
        let _pair_guard = self.pair_locks.lock(&key).await;
        let _gate = self.gate.enter_write().await;

        if self
            .catalog
            .find_like_record(user.id, song_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(
                "LikeRecord".to_string(),
                format!("song {} is not on the liked list of user {}", song_id, user.id),
            ));
        }
        self.catalog.delete_like_record(user.id, song_id).await?;
        debug!("Removed like for {}", key);
        Ok(())
    }

    /// 锁表中仍然存在的条目数（歌曲锁加 (user, song) 锁）
    pub fn live_lock_count(&self) -> usize {
        self.song_locks.len() + self.pair_locks.len()
    }

    pub async fn is_liked(&self, user: &UserRef, song_id: SongId) -> Result<bool, AppError> {
        let user = resolve_user(self.catalog.as_ref(), user).await?;
        resolve_song(self.catalog.as_ref(), song_id).await?;
        Ok(self
            .catalog
            .find_like_record(user.id, song_id)
            .await?
            .is_some())
    }
}
