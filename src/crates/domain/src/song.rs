use crate::value::{AlbumId, ArtistId, SongId};

/// 歌曲
///
/// 歌曲由曲库管理维护，参与度模块只会修改 `play_count`。
/// `play_count` 只增不减，管理员重置除外。
#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    pub id: SongId,
    pub name: String,
    pub artist_id: ArtistId,
    pub album_id: Option<AlbumId>,
    pub play_count: u64,
}

impl Song {
    pub fn new(id: SongId, name: &str, artist_id: ArtistId, album_id: Option<AlbumId>) -> Self {
        Self {
            id,
            name: String::from(name),
            artist_id,
            album_id,
            play_count: 0,
        }
    }

    pub fn with_play_count(mut self, play_count: u64) -> Self {
        self.play_count = play_count;
        self
    }

    /// 名称前缀匹配（忽略大小写）
    pub fn name_starts_with(&self, prefix: &str) -> bool {
        self.name
            .to_lowercase()
            .starts_with(&prefix.to_lowercase())
    }
}
