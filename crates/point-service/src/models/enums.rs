//! 积分服务枚举类型定义

use serde::{Deserialize, Serialize};
use std::fmt;

/// 积分流水类型
///
/// 流水金额始终为正数，增减方向由类型决定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// 充值 - 余额增加
    Charge,
    /// 使用 - 余额减少
    Use,
}

impl TransactionType {
    /// 线上传输名称（与 JSON 序列化一致）
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Charge => "CHARGE",
            Self::Use => "USE",
        }
    }

    /// 操作名，用于错误信息和指标标签
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Charge => "charge",
            Self::Use => "use",
        }
    }

    /// 余额变动方向
    pub fn sign(&self) -> i64 {
        match self {
            Self::Charge => 1,
            Self::Use => -1,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
