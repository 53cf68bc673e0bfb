use crate::error::AppError;
use crate::shared::{resolve_user, SnapshotGate};
use domain::catalog::CatalogStore;
use domain::engagement::PlayRecord;
use domain::song::Song;
use domain::value::UserRef;
use futures::future::try_join_all;
use log::warn;
use std::cmp::Reverse;
use std::sync::Arc;

/// 用户收听历史
///
/// 播放记录按 (user, song) 覆盖更新而不是追加，所以每首歌只出现一次，
/// 重复播放只会把它往前移。
pub struct HistoryProjector {
    catalog: Arc<dyn CatalogStore>,
    gate: SnapshotGate,
}

impl HistoryProjector {
    pub fn new(catalog: Arc<dyn CatalogStore>, gate: SnapshotGate) -> Self {
        Self { catalog, gate }
    }

    /// 最近播放的排在最前
    pub async fn history(&self, user: &UserRef) -> Result<Vec<Song>, AppError> {
        let user = resolve_user(self.catalog.as_ref(), user).await?;
        let (records, songs) = {
            let _snapshot = self.gate.enter_snapshot().await;
            let records = order_by_recency(self.catalog.all_play_records_for_user(user.id).await?);
            let songs = try_join_all(
                records
                    .iter()
                    .map(|record| self.catalog.find_song(record.song_id)),
            )
            .await?;
            (records, songs)
        };

        Ok(records
            .iter()
            .zip(songs)
            .filter_map(|(record, song)| {
                if song.is_none() {
                    warn!(
                        "Played song {} no longer exists in catalog, skipped from history of user {}",
                        record.song_id, record.user_id
                    );
                }
                song
            })
            .collect())
    }
}

/// 按最后播放时间降序，时间相同按歌曲 id 升序
pub fn order_by_recency(mut records: Vec<PlayRecord>) -> Vec<PlayRecord> {
    records.sort_by_key(|record| (Reverse(record.last_played_at), record.song_id));
    records
}
