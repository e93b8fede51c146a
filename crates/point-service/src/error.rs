//! 积分服务错误类型
//!
//! 区分用户可修正的业务错误与存储层故障，业务错误不会被包装成存储错误。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::models::TransactionType;

/// 存储层错误
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("invalid id: {0}")]
    InvalidId(i64),

    #[error("store backend failure: {0}")]
    Backend(String),
}

/// 积分服务错误类型
#[derive(Debug, Error)]
pub enum PointError {
    // === 请求校验错误 ===
    #[error("invalid user id: {0:?}")]
    InvalidUserId(String),

    #[error("{} amount must be a positive integer", .kind.verb())]
    InvalidAmount { kind: TransactionType },

    #[error("invalid request body: {0}")]
    InvalidRequest(String),

    // === 余额相关错误 ===
    #[error("balance is insufficient")]
    InsufficientBalance { requested: i64, available: i64 },

    #[error("balance would overflow: current={current}, amount={amount}")]
    BalanceOverflow { current: i64, amount: i64 },

    // === 系统错误 ===
    #[error("timed out waiting for user lock: user_id={user_id}, waited_ms={waited_ms}")]
    LockTimeout { user_id: i64, waited_ms: u64 },

    #[error("point store unavailable during {operation}")]
    StoreUnavailable {
        operation: &'static str,
        #[source]
        source: StoreError,
    },
}

/// 积分服务 Result 类型别名
pub type Result<T> = std::result::Result<T, PointError>;

impl PointError {
    /// 将存储错误包装为服务不可用
    pub fn store(operation: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::StoreUnavailable { operation, source }
    }

    /// 是否为客户端可修正的错误
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            Self::LockTimeout { .. } | Self::StoreUnavailable { .. }
        )
    }

    /// 获取错误码（用于 API 响应和指标标签）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidUserId(_) => "INVALID_USER_ID",
            Self::InvalidAmount { .. } => "INVALID_AMOUNT",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::BalanceOverflow { .. } => "BALANCE_OVERFLOW",
            Self::LockTimeout { .. } => "LOCK_TIMEOUT",
            Self::StoreUnavailable { .. } => "STORE_UNAVAILABLE",
        }
    }

    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

impl IntoResponse for PointError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // 存储层故障只返回通用提示，详细信息仅记录日志
        let message = match &self {
            Self::StoreUnavailable { operation, source } => {
                tracing::error!(operation, error = %source, "Point store operation failed");
                "point service is temporarily unavailable, please retry".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
        });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_amount_messages() {
        assert_eq!(
            PointError::InvalidAmount {
                kind: TransactionType::Charge
            }
            .to_string(),
            "charge amount must be a positive integer"
        );
        assert_eq!(
            PointError::InvalidAmount {
                kind: TransactionType::Use
            }
            .to_string(),
            "use amount must be a positive integer"
        );
    }

    #[test]
    fn test_insufficient_balance_message() {
        let err = PointError::InsufficientBalance {
            requested: 71,
            available: 70,
        };
        assert_eq!(err.to_string(), "balance is insufficient");
        assert_eq!(err.error_code(), "INSUFFICIENT_BALANCE");
    }

    #[test]
    fn test_client_error_classification() {
        assert!(PointError::InvalidUserId("abc".to_string()).is_client_error());
        assert!(
            PointError::InsufficientBalance {
                requested: 2,
                available: 1
            }
            .is_client_error()
        );
        assert!(
            !PointError::LockTimeout {
                user_id: 1,
                waited_ms: 10
            }
            .is_client_error()
        );
        let store_err = PointError::store("charge")(StoreError::Backend("down".to_string()));
        assert!(!store_err.is_client_error());
        assert_eq!(store_err.error_code(), "STORE_UNAVAILABLE");
    }

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            PointError::InvalidAmount {
                kind: TransactionType::Charge
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PointError::InvalidRequest("missing amount".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PointError::store("point")(StoreError::Backend("x".to_string())).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            PointError::LockTimeout {
                user_id: 1,
                waited_ms: 5
            }
            .status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_store_unavailable_keeps_source() {
        use std::error::Error as _;

        let err = PointError::store("use")(StoreError::InvalidId(0));
        assert_eq!(err.to_string(), "point store unavailable during use");
        assert_eq!(err.source().unwrap().to_string(), "invalid id: 0");
    }
}
