//! 积分账本服务
//!
//! 维护每个用户的积分余额与只追加的积分流水。
//!
//! ## 核心功能
//!
//! - **积分查询**：读取用户当前余额，与并发变更互斥
//! - **流水查询**：按写入顺序返回用户的充值/使用记录
//! - **积分充值**：余额增加正整数金额，并记录 CHARGE 流水
//! - **积分使用**：余额减少正整数金额，余额不足时拒绝，并记录 USE 流水
//!
//! 同一用户的读-改-写通过用户锁串行执行，不同用户完全并行。
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `repository`: 余额与流水仓储
//! - `lock`: 用户锁注册表
//! - `service`: 业务服务层
//! - `handlers` / `routes` / `state`: HTTP 接入层

pub mod error;
pub mod handlers;
pub mod lock;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;

pub use error::{PointError, Result, StoreError};
pub use lock::{LockConfig, LockRegistry, UserLockGuard};
pub use models::*;
pub use repository::{
    PointHistoryRepository, PointHistoryRepositoryTrait, UserPointRepository,
    UserPointRepositoryTrait,
};
pub use service::{PointRequest, PointService};
pub use state::{AppState, InMemoryPointService};
