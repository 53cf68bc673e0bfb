use crate::error::AppError;
use crate::shared::{resolve_song, resolve_user};
use domain::catalog::CatalogStore;
use domain::song::Song;
use domain::value::{AlbumId, ArtistId, SongId, UserRef};
use futures::future::try_join_all;
use log::warn;
use std::sync::Arc;

/// 曲库的直通查询
#[derive(Clone)]
pub struct CatalogQueries {
    catalog: Arc<dyn CatalogStore>,
}

impl CatalogQueries {
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self { catalog }
    }

    /// 整个曲库，按歌曲 id 升序
    pub async fn all_songs(&self) -> Result<Vec<Song>, AppError> {
        self.filter_songs(|_| true).await
    }

    pub async fn get_song(&self, id: SongId) -> Result<Song, AppError> {
        resolve_song(self.catalog.as_ref(), id).await
    }

    /// 按歌名前缀搜索（忽略大小写）
    pub async fn search_songs(&self, prefix: &str) -> Result<Vec<Song>, AppError> {
        self.filter_songs(|song| song.name_starts_with(prefix)).await
    }

    pub async fn songs_by_album(&self, album_id: AlbumId) -> Result<Vec<Song>, AppError> {
        self.filter_songs(|song| song.album_id == Some(album_id))
            .await
    }

    pub async fn songs_by_artist(&self, artist_id: ArtistId) -> Result<Vec<Song>, AppError> {
        self.filter_songs(|song| song.artist_id == artist_id).await
    }

    /// 用户喜欢的歌曲，按歌曲 id 升序
    pub async fn liked_songs(&self, user: &UserRef) -> Result<Vec<Song>, AppError> {
        let user = resolve_user(self.catalog.as_ref(), user).await?;
        let mut records = self.catalog.all_like_records_for_user(user.id).await?;
        records.sort_by_key(|record| record.song_id);
        let songs = try_join_all(
            records
                .iter()
                .map(|record| self.catalog.find_song(record.song_id)),
        )
        .await?;
        Ok(records
            .iter()
            .zip(songs)
            .filter_map(|(record, song)| {
                if song.is_none() {
                    warn!(
                        "Liked song {} no longer exists in catalog, skipped from likes of user {}",
                        record.song_id, record.user_id
                    );
                }
                song
            })
            .collect())
    }

    async fn filter_songs<F>(&self, predicate: F) -> Result<Vec<Song>, AppError>
    where
        F: Fn(&Song) -> bool,
    {
        let mut songs: Vec<Song> = self
            .catalog
            .all_songs()
            .await?
            .into_iter()
            .filter(|song| predicate(song))
            .collect();
        songs.sort_by_key(|song| song.id);
        Ok(songs)
    }
}
