//! 积分账本服务
//!
//! 处理积分查询、流水查询、充值与使用，保证同一用户的余额变更串行执行：
//! - 请求校验（用户 ID、金额）
//! - 按用户加锁
//! - 读取余额 -> 计算新余额 -> 追加流水 -> 写入余额
//! - 所有写入完成后才释放锁
//!
//! 不同用户的操作互不阻塞。

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, instrument};

use point_shared::observability::metrics;

use crate::error::{PointError, Result};
use crate::lock::LockRegistry;
use crate::models::{PointHistory, TransactionType, UserPoint, now_millis};
use crate::repository::{PointHistoryRepositoryTrait, UserPointRepositoryTrait};
use crate::service::dto::{PointRequest, parse_user_id};

/// 积分账本服务
///
/// 余额仓储是余额的唯一来源，服务不跨调用缓存余额
pub struct PointService<U, H> {
    user_points: Arc<U>,
    histories: Arc<H>,
    locks: Arc<LockRegistry>,
}

impl<U, H> PointService<U, H>
where
    U: UserPointRepositoryTrait,
    H: PointHistoryRepositoryTrait,
{
    pub fn new(user_points: Arc<U>, histories: Arc<H>, locks: Arc<LockRegistry>) -> Self {
        Self {
            user_points,
            histories,
            locks,
        }
    }

    pub fn lock_registry(&self) -> &Arc<LockRegistry> {
        &self.locks
    }

    /// 查询用户积分
    ///
    /// 同样持有用户锁，保证不会读到并发变更的中间状态
    #[instrument(skip(self))]
    pub async fn point(&self, user_id: &str) -> Result<UserPoint> {
        let started = Instant::now();
        let result = self.read_point(user_id).await;
        observe("point", started, &result);
        result
    }

    /// 查询用户积分流水
    ///
    /// 流水只追加，快照读取无需用户锁
    #[instrument(skip(self))]
    pub async fn history(&self, user_id: &str) -> Result<Vec<PointHistory>> {
        let started = Instant::now();
        let result = self.read_history(user_id).await;
        observe("history", started, &result);
        result
    }

    /// 充值积分
    #[instrument(skip(self, request), fields(amount = %request.amount))]
    pub async fn charge(&self, user_id: &str, request: PointRequest) -> Result<UserPoint> {
        let started = Instant::now();
        let result = self.apply(user_id, &request, TransactionType::Charge).await;
        observe(TransactionType::Charge.verb(), started, &result);
        result
    }

    /// 使用积分
    ///
    /// 余额不足时不产生任何写入
    #[instrument(skip(self, request), fields(amount = %request.amount))]
    pub async fn use_point(&self, user_id: &str, request: PointRequest) -> Result<UserPoint> {
        let started = Instant::now();
        let result = self.apply(user_id, &request, TransactionType::Use).await;
        observe(TransactionType::Use.verb(), started, &result);
        result
    }

    // ==================== 私有方法 ====================

    async fn read_point(&self, user_id: &str) -> Result<UserPoint> {
        let user_id = parse_user_id(user_id)?;
        let _guard = self.locks.acquire(user_id).await?;

        self.user_points
            .select_by_id(user_id)
            .await
            .map_err(PointError::store("point"))
    }

    async fn read_history(&self, user_id: &str) -> Result<Vec<PointHistory>> {
        let user_id = parse_user_id(user_id)?;

        self.histories
            .select_all_by_user_id(user_id)
            .await
            .map_err(PointError::store("history"))
    }

    /// 执行一次余额变更
    ///
    /// 金额校验只依赖请求本身，在加锁前完成；余额充足性依赖共享状态，
    /// 必须在加锁并读取余额之后判断。
    async fn apply(
        &self,
        user_id: &str,
        request: &PointRequest,
        kind: TransactionType,
    ) -> Result<UserPoint> {
        let user_id = parse_user_id(user_id)?;
        let amount = request.validated_amount(kind)?;
        let operation = kind.verb();

        let _guard = self.locks.acquire(user_id).await?;

        let current = self
            .user_points
            .select_by_id(user_id)
            .await
            .map_err(PointError::store(operation))?;

        let new_point = next_balance(current.point, amount, kind)?;

        self.histories
            .insert(user_id, amount, kind, now_millis())
            .await
            .map_err(PointError::store(operation))?;

        // 流水已写入，余额写入失败会导致两者不一致，只能记录下来人工核对
        let updated = self
            .user_points
            .insert_or_update(user_id, new_point)
            .await
            .map_err(|source| {
                error!(
                    user_id,
                    amount,
                    transaction_type = %kind,
                    error = %source,
                    "Balance write failed after history append"
                );
                PointError::StoreUnavailable { operation, source }
            })?;

        info!(
            user_id,
            amount,
            transaction_type = %kind,
            before = current.point,
            after = updated.point,
            "Point balance updated"
        );

        Ok(updated)
    }
}

/// 计算变更后的余额
fn next_balance(current: i64, amount: i64, kind: TransactionType) -> Result<i64> {
    match kind {
        TransactionType::Charge => current
            .checked_add(amount)
            .ok_or(PointError::BalanceOverflow { current, amount }),
        TransactionType::Use if amount > current => Err(PointError::InsufficientBalance {
            requested: amount,
            available: current,
        }),
        TransactionType::Use => Ok(current - amount),
    }
}

fn observe<T>(operation: &'static str, started: Instant, result: &Result<T>) {
    let status = match result {
        Ok(_) => "success",
        Err(e) => e.error_code(),
    };
    metrics::record_point_operation(operation, status, started.elapsed().as_secs_f64());
}
