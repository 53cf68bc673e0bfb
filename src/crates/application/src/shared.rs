use crate::error::AppError;
use chrono::{Duration, NaiveDateTime, Utc};
use dashmap::DashMap;
use domain::catalog::CatalogStore;
use domain::song::Song;
use domain::user::User;
use domain::value::{SongId, UserRef};
use parking_lot::Mutex as SyncMutex;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// 时间来源，播放时间戳都从这里取
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}

/// 手动推进的时钟，用于回放和测试
#[derive(Debug)]
pub struct ManualClock {
    current: SyncMutex<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            current: SyncMutex::new(start),
        }
    }

    pub fn set(&self, at: NaiveDateTime) {
        *self.current.lock() = at;
    }

    pub fn advance(&self, by: Duration) -> NaiveDateTime {
        let mut current = self.current.lock();
        *current += by;
        *current
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.current.lock()
    }
}

/// 按键加锁的锁表
///
/// 每个键一把异步互斥锁，不同键之间互不阻塞。
/// 最后一个持有者释放后条目即被移除，锁表大小只取决于正在使用的键。
pub struct KeyedLocks<K>
where
    K: Eq + Hash,
{
    locks: DashMap<K, Arc<Mutex<()>>>,
}

impl<K> KeyedLocks<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// 获取指定键的锁
    fn get_lock(&self, key: &K) -> Arc<Mutex<()>> {
        // DashMap::entry 的 or_insert_with 是原子操作，确保只创建一个锁
        self.locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// 等待并持有指定键的锁，返回的守卫释放时清理空闲条目
    pub async fn lock(&self, key: &K) -> KeyedGuard<'_, K> {
        let guard = self.get_lock(key).lock_owned().await;
        KeyedGuard {
            locks: &self.locks,
            key: key.clone(),
            guard: Some(guard),
        }
    }

    /// 正在被持有或等待的键的数量
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// 锁表中某个键的守卫
pub struct KeyedGuard<'a, K>
where
    K: Eq + Hash,
{
    locks: &'a DashMap<K, Arc<Mutex<()>>>,
    key: K,
    guard: Option<OwnedMutexGuard<()>>,
}

impl<K> Drop for KeyedGuard<'_, K>
where
    K: Eq + Hash,
{
    fn drop(&mut self) {
        // 先释放互斥锁，再检查是否只剩锁表自己持有这把锁；
        // remove_if 与 get_lock 在同一个分片锁内执行，不会删掉别人刚拿到的锁
        self.guard.take();
        self.locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

impl<K> Default for KeyedLocks<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

/// 快照闸门
///
/// 写操作持有共享锁，写与写之间不会互相阻塞；
/// 读视图在收集快照期间持有独占锁，保证看不到写了一半的多记录更新
/// （例如播放次数已加一但播放记录还没刷新）。
#[derive(Clone, Default)]
pub struct SnapshotGate {
    inner: Arc<RwLock<()>>,
}

impl SnapshotGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn enter_write(&self) -> RwLockReadGuard<'_, ()> {
        self.inner.read().await
    }

    pub async fn enter_snapshot(&self) -> RwLockWriteGuard<'_, ()> {
        self.inner.write().await
    }
}

/// 按邮箱或 id 查找用户，找不到返回 NotFound
pub async fn resolve_user(catalog: &dyn CatalogStore, user: &UserRef) -> Result<User, AppError> {
    catalog
        .find_user(user)
        .await?
        .ok_or_else(|| AppError::user_not_found(user))
}

pub async fn resolve_song(catalog: &dyn CatalogStore, id: SongId) -> Result<Song, AppError> {
    catalog
        .find_song(id)
        .await?
        .ok_or_else(|| AppError::song_not_found(id))
}
