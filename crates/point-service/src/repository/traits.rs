//! 仓储 Trait 定义
//!
//! 服务层依赖抽象而非具体实现，支持 mock 测试和替换存储后端

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{PointHistory, TransactionType, UserPoint};

/// 积分余额仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserPointRepositoryTrait: Send + Sync {
    /// 查询余额，没有记录的用户返回余额为 0 的记录
    async fn select_by_id(&self, user_id: i64) -> Result<UserPoint, StoreError>;

    /// 写入新余额，返回带最新更新时间的记录
    async fn insert_or_update(&self, user_id: i64, point: i64) -> Result<UserPoint, StoreError>;
}

/// 积分流水仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PointHistoryRepositoryTrait: Send + Sync {
    /// 追加一条流水，返回分配了 ID 的记录
    async fn insert(
        &self,
        user_id: i64,
        amount: i64,
        transaction_type: TransactionType,
        time_millis: i64,
    ) -> Result<PointHistory, StoreError>;

    /// 按写入顺序返回用户的全部流水
    async fn select_all_by_user_id(&self, user_id: i64) -> Result<Vec<PointHistory>, StoreError>;
}
