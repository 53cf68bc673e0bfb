use crate::error::AppError;
use crate::query::config::ViewConfig;
use crate::shared::SnapshotGate;
use domain::catalog::CatalogStore;
use domain::song::Song;
use domain::value::SongId;
use log::warn;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

/// 排行榜：播放最多、喜欢最多
///
/// 两个榜单都是“值越大越靠前”，相同的值按歌曲 id 升序排列，保证结果稳定。
pub struct RankingEngine {
    catalog: Arc<dyn CatalogStore>,
    gate: SnapshotGate,
    config: Arc<dyn ViewConfig>,
}

impl RankingEngine {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        gate: SnapshotGate,
        config: Arc<dyn ViewConfig>,
    ) -> Self {
        Self {
            catalog,
            gate,
            config,
        }
    }

    /// 播放次数最多的 n 首歌，播放次数为 0 的歌曲也参与排序（排在最后）
    pub async fn top_played(&self, n: usize) -> Result<Vec<Song>, AppError> {
        let songs = {
            let _snapshot = self.gate.enter_snapshot().await;
            self.catalog.all_songs().await?
        };
        Ok(rank_by_play_count(songs, n))
    }

    pub async fn top_played_default(&self) -> Result<Vec<Song>, AppError> {
        self.top_played(self.config.default_top_size()).await
    }

    /// 喜欢数最多的 n 首歌，没有任何喜欢的歌曲不会出现，结果不足 n 首时不补齐
    pub async fn top_liked(&self, n: usize) -> Result<Vec<Song>, AppError> {
        let (counts, songs) = {
            let _snapshot = self.gate.enter_snapshot().await;
            let counts = self.catalog.count_likes_by_song().await?;
            let songs = self.catalog.all_songs().await?;
            (counts, songs)
        };

        let mut songs_by_id: HashMap<SongId, Song> =
            songs.into_iter().map(|song| (song.id, song)).collect();
        let mut result = Vec::with_capacity(n.min(counts.len()));
        for (song_id, _) in rank_by_like_count(counts) {
            if result.len() >= n {
                break;
            }
            match songs_by_id.remove(&song_id) {
                Some(song) => result.push(song),
                None => warn!("Liked song {} no longer exists in catalog, skipped", song_id),
            }
        }
        Ok(result)
    }

    pub async fn top_liked_default(&self) -> Result<Vec<Song>, AppError> {
        self.top_liked(self.config.default_top_size()).await
    }
}

/// 按播放次数降序、id 升序排序后取前 n 首
pub fn rank_by_play_count(mut songs: Vec<Song>, n: usize) -> Vec<Song> {
    songs.sort_by_key(|song| (Reverse(song.play_count), song.id));
    songs.truncate(n);
    songs
}

/// 按喜欢数降序、id 升序排序，喜欢数为 0 的条目被丢弃
pub fn rank_by_like_count(counts: HashMap<SongId, u64>) -> Vec<(SongId, u64)> {
    let mut ranked: Vec<(SongId, u64)> = counts
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .collect();
    ranked.sort_by_key(|(song_id, count)| (Reverse(*count), *song_id));
    ranked
}
