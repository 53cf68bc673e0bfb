use crate::error::AppError;
use crate::query::config::ViewConfig;
use crate::shared::SnapshotGate;
use domain::catalog::CatalogStore;
use domain::song::Song;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// 随机推荐
///
/// 在整个曲库上无放回地均匀抽样，每首歌只抽一次随机数，
/// 不使用“给每一行一个随机排序键”的做法。
pub struct SamplingEngine {
    catalog: Arc<dyn CatalogStore>,
    gate: SnapshotGate,
    config: Arc<dyn ViewConfig>,
    rng: Mutex<StdRng>,
}

impl SamplingEngine {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        gate: SnapshotGate,
        config: Arc<dyn ViewConfig>,
    ) -> Self {
        let rng = match config.sample_seed() {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            catalog,
            gate,
            config,
            rng: Mutex::new(rng),
        }
    }

    /// 随机取 n 首不重复的歌；曲库不足 n 首时返回全部
    pub async fn sample(&self, n: usize) -> Result<Vec<Song>, AppError> {
        let mut songs = {
            let _snapshot = self.gate.enter_snapshot().await;
            self.catalog.all_songs().await?
        };
        // 先按 id 排好，固定种子时结果才可复现
        songs.sort_by_key(|song| song.id);
        let mut rng = self.rng.lock();
        Ok(sample_songs(songs, n, &mut *rng))
    }

    pub async fn sample_default(&self) -> Result<Vec<Song>, AppError> {
        self.sample(self.config.default_sample_size()).await
    }
}

/// 从 songs 中无放回地均匀抽取 n 首
pub fn sample_songs<R: Rng + ?Sized>(songs: Vec<Song>, n: usize, rng: &mut R) -> Vec<Song> {
    if songs.len() <= n {
        return songs;
    }
    let picked = index::sample(rng, songs.len(), n);
    let mut slots: Vec<Option<Song>> = songs.into_iter().map(Some).collect();
    picked.iter().filter_map(|i| slots[i].take()).collect()
}
