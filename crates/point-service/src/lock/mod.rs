//! 用户锁模块
//!
//! 按用户 ID 串行化余额的读-改-写，不同用户之间完全并行。
//!
//! ## 使用示例
//!
//! ```ignore
//! let registry = LockRegistry::new(LockConfig::default());
//!
//! // 守卫存活期间同一用户的其他操作等待
//! let _guard = registry.acquire(user_id).await?;
//! let current = users.select_by_id(user_id).await?;
//! users.insert_or_update(user_id, current.point + amount).await?;
//! ```

mod lock_registry;

pub use lock_registry::{LockConfig, LockRegistry, UserLockGuard};
