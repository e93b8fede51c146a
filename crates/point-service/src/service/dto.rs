//! 数据传输对象

use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::error::{PointError, Result};
use crate::models::TransactionType;

/// 充值/使用请求体
///
/// 保留原始 JSON 数值，由服务层判定是否为正整数，避免 `50.5` 被静默截断
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRequest {
    pub amount: Number,
}

impl PointRequest {
    pub fn new(amount: i64) -> Self {
        Self {
            amount: Number::from(amount),
        }
    }

    /// 非整数金额（NaN、无穷大时返回 None）
    pub fn from_f64(amount: f64) -> Option<Self> {
        Number::from_f64(amount).map(|amount| Self { amount })
    }

    /// 校验金额为正整数
    ///
    /// 小数部分为 0 的浮点写法（`50.0`、`1e2`）按整数接受
    pub fn validated_amount(&self, kind: TransactionType) -> Result<i64> {
        self.amount
            .as_i64()
            .or_else(|| self.amount.as_f64().and_then(whole_f64_to_i64))
            .filter(|amount| *amount > 0)
            .ok_or(PointError::InvalidAmount { kind })
    }
}

/// 2^63，i64 无法表示的最小浮点数
const I64_UPPER_BOUND: f64 = 9_223_372_036_854_775_808.0;

fn whole_f64_to_i64(value: f64) -> Option<i64> {
    (value.is_finite()
        && value.fract() == 0.0
        && value >= i64::MIN as f64
        && value < I64_UPPER_BOUND)
        .then_some(value as i64)
}

/// 解析路径中的用户 ID，必须是正整数
pub fn parse_user_id(raw: &str) -> Result<i64> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| PointError::InvalidUserId(raw.to_string()))
}
