//! 用户锁注册表
//!
//! 每个用户 ID 对应一把进程内互斥锁，惰性创建并跨调用复用。

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use point_shared::observability::metrics;

use crate::error::{PointError, Result};

/// 锁配置
#[derive(Debug, Clone, Default)]
pub struct LockConfig {
    /// 获取锁的最长等待时间，None 表示无限等待
    pub acquire_timeout: Option<Duration>,
}

/// 用户锁注册表
///
/// 注册表自身的并发保护由 DashMap 的分片锁提供，只覆盖 map 的读写，
/// 不会在持有分片锁期间等待用户锁。
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: DashMap<i64, Arc<Mutex<()>>>,
    config: LockConfig,
}

impl LockRegistry {
    pub fn new(config: LockConfig) -> Self {
        Self {
            locks: DashMap::new(),
            config,
        }
    }

    /// 获取用户对应的锁句柄，不存在时创建
    ///
    /// entry API 在分片写锁内完成"检查-创建"，并发的首次调用者拿到同一把锁。
    /// 新建条目时更新注册表规模指标（须在释放分片锁之后读取 len）。
    fn handle(&self, user_id: i64) -> Arc<Mutex<()>> {
        let (lock, created) = match self.locks.entry(user_id) {
            Entry::Occupied(entry) => (entry.get().clone(), false),
            Entry::Vacant(entry) => {
                let lock = Arc::new(Mutex::new(()));
                entry.insert(lock.clone());
                (lock, true)
            }
        };
        if created {
            metrics::set_lock_registry_size(self.len());
        }
        lock
    }

    /// 获取用户锁
    ///
    /// 返回的守卫在 drop 时释放锁。配置了超时且等待超时时返回 `LockTimeout`。
    #[instrument(skip(self))]
    pub async fn acquire(&self, user_id: i64) -> Result<UserLockGuard> {
        let lock = self.handle(user_id);
        let started = Instant::now();

        let guard = match self.config.acquire_timeout {
            None => lock.lock_owned().await,
            Some(timeout) => match tokio::time::timeout(timeout, lock.lock_owned()).await {
                Ok(guard) => guard,
                Err(_) => {
                    let waited_ms = started.elapsed().as_millis() as u64;
                    warn!(user_id, waited_ms, "User lock acquisition timed out");
                    return Err(PointError::LockTimeout { user_id, waited_ms });
                }
            },
        };

        debug!(
            user_id,
            waited_us = started.elapsed().as_micros() as u64,
            "User lock acquired"
        );
        Ok(UserLockGuard { _guard: guard })
    }

    /// 清理空闲锁
    ///
    /// 只移除没有持有者也没有等待者的条目（引用计数仅剩注册表自身）。
    /// 句柄只能在分片锁内从 map 克隆出去，retain 同样持有分片锁，
    /// 因此不会出现同一用户同时存在两把锁的情况。返回清理的条目数。
    pub fn evict_idle(&self) -> usize {
        let before = self.locks.len();
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        let remaining = self.locks.len();
        metrics::set_lock_registry_size(remaining);
        let evicted = before.saturating_sub(remaining);
        if evicted > 0 {
            debug!(evicted, remaining, "Idle user locks evicted");
        }
        evicted
    }

    /// 启动后台空闲锁清理任务
    pub fn spawn_sweeper(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // 第一次 tick 立即返回
            ticker.tick().await;
            loop {
                ticker.tick().await;
                self.evict_idle();
            }
        })
    }

    /// 当前注册的用户锁数量
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// 用户锁守卫
///
/// 持有期间同一用户的其他操作被阻塞，drop 时自动释放
#[derive(Debug)]
pub struct UserLockGuard {
    _guard: OwnedMutexGuard<()>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 从 Prometheus 文本中读取注册表规模
    fn registry_size_gauge(rendered: &str) -> Option<f64> {
        rendered
            .lines()
            .find_map(|line| line.strip_prefix("point_lock_registry_size "))
            .and_then(|value| value.trim().parse().ok())
    }

    #[test]
    fn test_lock_config_default() {
        let config = LockConfig::default();
        assert_eq!(config.acquire_timeout, None);
    }

    #[test]
    fn test_same_user_shares_one_lock() {
        let registry = LockRegistry::default();
        let a = registry.handle(1);
        let b = registry.handle(1);
        let c = registry.handle(2);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_acquire_creates_single_lock() {
        let registry = Arc::new(LockRegistry::default());
        let handles: Vec<_> = (0..64)
            .map(|_| {
                let registry = registry.clone();
                tokio::spawn(async move { registry.handle(99) })
            })
            .collect();

        let mut locks = Vec::new();
        for h in handles {
            locks.push(h.await.unwrap());
        }
        assert!(locks.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_acquire_is_mutually_exclusive() {
        let registry = Arc::new(LockRegistry::default());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..32)
            .map(|_| {
                let registry = registry.clone();
                let inside = inside.clone();
                let max_inside = max_inside.clone();
                tokio::spawn(async move {
                    let _guard = registry.acquire(7).await.unwrap();
                    let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                    max_inside.fetch_max(now, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                    inside.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();

        for t in tasks {
            t.await.unwrap();
        }
        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_different_users_do_not_block() {
        let registry = LockRegistry::default();
        let _a = registry.acquire(1).await.unwrap();
        let b = tokio::time::timeout(Duration::from_millis(100), registry.acquire(2)).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn test_acquire_times_out_while_held() {
        let registry = LockRegistry::new(LockConfig {
            acquire_timeout: Some(Duration::from_millis(20)),
        });
        let guard = registry.acquire(3).await.unwrap();

        let err = registry.acquire(3).await.unwrap_err();
        assert!(matches!(err, PointError::LockTimeout { user_id: 3, .. }));

        drop(guard);
        assert!(registry.acquire(3).await.is_ok());
    }

    #[tokio::test]
    async fn test_evict_idle_keeps_held_locks() {
        let registry = LockRegistry::default();
        let held = registry.acquire(1).await.unwrap();
        drop(registry.acquire(2).await.unwrap());
        drop(registry.acquire(3).await.unwrap());
        assert_eq!(registry.len(), 3);

        assert_eq!(registry.evict_idle(), 2);
        assert_eq!(registry.len(), 1);

        drop(held);
        assert_eq!(registry.evict_idle(), 1);
        assert!(registry.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_evicts_idle_locks() {
        let registry = Arc::new(LockRegistry::default());
        drop(registry.acquire(1).await.unwrap());
        let sweeper = registry.clone().spawn_sweeper(Duration::from_secs(60));

        tokio::time::sleep(Duration::from_secs(61)).await;
        tokio::task::yield_now().await;
        assert!(registry.is_empty());
        sweeper.abort();
    }

    #[tokio::test]
    async fn test_evicted_user_gets_fresh_working_lock() {
        let registry = LockRegistry::default();
        drop(registry.acquire(5).await.unwrap());
        registry.evict_idle();
        let guard = registry.acquire(5).await.unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.acquire(5).now_or_never().is_none());
        drop(guard);
    }

    #[test]
    fn test_registry_size_gauge_tracks_inserts_and_evictions() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let registry = LockRegistry::default();

        ::metrics::with_local_recorder(&recorder, || {
            registry.handle(1);
            registry.handle(2);
            registry.handle(3);
            // 已存在的用户不新增条目
            registry.handle(2);
        });
        assert_eq!(registry_size_gauge(&handle.render()), Some(3.0));

        let held = registry.handle(1);
        ::metrics::with_local_recorder(&recorder, || {
            assert_eq!(registry.evict_idle(), 2);
        });
        assert_eq!(registry_size_gauge(&handle.render()), Some(1.0));
        drop(held);
    }
}
