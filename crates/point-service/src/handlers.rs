//! 积分 API 处理器
//!
//! 只负责参数提取与响应转换，业务规则全部在 `PointService` 中。

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use tracing::instrument;

use crate::error::PointError;
use crate::models::{PointHistory, UserPoint};
use crate::repository::{PointHistoryRepositoryTrait, UserPointRepositoryTrait};
use crate::service::PointRequest;
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, PointError>;

/// 查询用户积分
///
/// GET /point/{id}
#[instrument(skip(state))]
pub async fn get_point<U, H>(
    State(state): State<AppState<U, H>>,
    Path(id): Path<String>,
) -> ApiResult<UserPoint>
where
    U: UserPointRepositoryTrait + 'static,
    H: PointHistoryRepositoryTrait + 'static,
{
    Ok(Json(state.service.point(&id).await?))
}

/// 查询用户积分流水
///
/// GET /point/{id}/histories
#[instrument(skip(state))]
pub async fn get_histories<U, H>(
    State(state): State<AppState<U, H>>,
    Path(id): Path<String>,
) -> ApiResult<Vec<PointHistory>>
where
    U: UserPointRepositoryTrait + 'static,
    H: PointHistoryRepositoryTrait + 'static,
{
    Ok(Json(state.service.history(&id).await?))
}

/// 充值积分
///
/// PATCH /point/{id}/charge
#[instrument(skip(state, body))]
pub async fn charge<U, H>(
    State(state): State<AppState<U, H>>,
    Path(id): Path<String>,
    body: Result<Json<PointRequest>, JsonRejection>,
) -> ApiResult<UserPoint>
where
    U: UserPointRepositoryTrait + 'static,
    H: PointHistoryRepositoryTrait + 'static,
{
    let Json(request) = body.map_err(reject)?;
    Ok(Json(state.service.charge(&id, request).await?))
}

/// 使用积分
///
/// PATCH /point/{id}/use
#[instrument(skip(state, body))]
pub async fn use_point<U, H>(
    State(state): State<AppState<U, H>>,
    Path(id): Path<String>,
    body: Result<Json<PointRequest>, JsonRejection>,
) -> ApiResult<UserPoint>
where
    U: UserPointRepositoryTrait + 'static,
    H: PointHistoryRepositoryTrait + 'static,
{
    let Json(request) = body.map_err(reject)?;
    Ok(Json(state.service.use_point(&id, request).await?))
}

/// 健康检查
pub async fn health() -> &'static str {
    "OK"
}

fn reject(rejection: JsonRejection) -> PointError {
    PointError::InvalidRequest(rejection.body_text())
}
