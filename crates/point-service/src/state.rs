//! 应用状态定义

use std::sync::Arc;

use crate::repository::{PointHistoryRepository, UserPointRepository};
use crate::service::PointService;

/// 使用内存仓储的积分服务
pub type InMemoryPointService = PointService<UserPointRepository, PointHistoryRepository>;

/// Axum 应用共享状态
pub struct AppState<U, H> {
    pub service: Arc<PointService<U, H>>,
}

impl<U, H> AppState<U, H> {
    pub fn new(service: Arc<PointService<U, H>>) -> Self {
        Self { service }
    }
}

// 手动实现 Clone，避免要求仓储类型本身可克隆
impl<U, H> Clone for AppState<U, H> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}
