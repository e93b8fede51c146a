//! 仓储层
//!
//! 余额仓储与流水仓储的接口定义及内存实现。
//!
//! ## 设计原则
//!
//! - 仓储只负责数据存取，不包含业务逻辑
//! - 并发控制（按用户串行化）由服务层决定
//! - 定义 trait 接口以支持 mock 测试

mod latency;
mod point_history_repo;
mod traits;
mod user_point_repo;

pub use point_history_repo::PointHistoryRepository;
pub use traits::*;
pub use user_point_repo::UserPointRepository;
