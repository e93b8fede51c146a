//! 路由配置模块

use axum::{
    Router, middleware,
    routing::{get, patch},
};
use tower_http::trace::TraceLayer;

use point_shared::observability::middleware as obs_middleware;

use crate::handlers;
use crate::repository::{PointHistoryRepositoryTrait, UserPointRepositoryTrait};
use crate::state::AppState;

/// 构建积分相关路由
pub fn point_routes<U, H>() -> Router<AppState<U, H>>
where
    U: UserPointRepositoryTrait + 'static,
    H: PointHistoryRepositoryTrait + 'static,
{
    Router::new()
        .route("/point/{id}", get(handlers::get_point::<U, H>))
        .route("/point/{id}/histories", get(handlers::get_histories::<U, H>))
        .route("/point/{id}/charge", patch(handlers::charge::<U, H>))
        .route("/point/{id}/use", patch(handlers::use_point::<U, H>))
}

/// 构建完整应用（路由 + 中间件 + 状态）
pub fn build_router<U, H>(state: AppState<U, H>) -> Router
where
    U: UserPointRepositoryTrait + 'static,
    H: PointHistoryRepositoryTrait + 'static,
{
    Router::new()
        .route("/health", get(handlers::health))
        .merge(point_routes::<U, H>())
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
