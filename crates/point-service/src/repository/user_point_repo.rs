//! 积分余额内存仓储

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use point_shared::config::StoreConfig;

use super::latency::SimulatedLatency;
use super::traits::UserPointRepositoryTrait;
use crate::error::StoreError;
use crate::models::{UserPoint, now_millis};

/// 积分余额仓储
///
/// 基于 DashMap 的内存实现，余额的唯一权威来源
#[derive(Debug, Default)]
pub struct UserPointRepository {
    points: DashMap<i64, UserPoint>,
    latency: SimulatedLatency,
}

impl UserPointRepository {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            points: DashMap::new(),
            latency: SimulatedLatency::from_config(config),
        }
    }

    /// 已持久化余额的用户数
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

fn check_id(user_id: i64) -> Result<(), StoreError> {
    if user_id <= 0 {
        return Err(StoreError::InvalidId(user_id));
    }
    Ok(())
}

#[async_trait]
impl UserPointRepositoryTrait for UserPointRepository {
    async fn select_by_id(&self, user_id: i64) -> Result<UserPoint, StoreError> {
        check_id(user_id)?;
        self.latency.wait().await;

        Ok(self
            .points
            .get(&user_id)
            .map(|p| p.value().clone())
            .unwrap_or_else(|| UserPoint::empty(user_id, now_millis())))
    }

    async fn insert_or_update(&self, user_id: i64, point: i64) -> Result<UserPoint, StoreError> {
        check_id(user_id)?;
        self.latency.wait().await;

        let record = UserPoint {
            id: user_id,
            point,
            update_millis: now_millis(),
        };
        self.points.insert(user_id, record.clone());
        debug!(user_id, point, "User point persisted");

        Ok(record)
    }
}
