//! 用户积分与积分流水模型

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::TransactionType;

/// 当前 Unix 毫秒时间戳
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// 用户积分余额
///
/// 每个用户一条，余额始终非负，仅通过充值或使用变更
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPoint {
    /// 用户 ID
    pub id: i64,
    /// 当前余额
    pub point: i64,
    /// 最后变更时间（毫秒）
    pub update_millis: i64,
}

impl UserPoint {
    /// 尚无记录的用户视为余额为 0
    pub fn empty(id: i64, update_millis: i64) -> Self {
        Self {
            id,
            point: 0,
            update_millis,
        }
    }
}

/// 积分流水
///
/// 仅追加，写入后不再修改或删除
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointHistory {
    /// 存储分配的自增 ID
    pub id: i64,
    pub user_id: i64,
    /// 变动数量（始终为正数，方向由 transaction_type 决定）
    pub amount: i64,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub time_millis: i64,
}

impl PointHistory {
    /// 带符号的变动值
    pub fn signed_amount(&self) -> i64 {
        self.amount * self.transaction_type.sign()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_point_wire_format() {
        let point = UserPoint {
            id: 1,
            point: 100,
            update_millis: 1_700_000_000_000,
        };
        assert_eq!(
            serde_json::to_value(&point).unwrap(),
            json!({ "id": 1, "point": 100, "updateMillis": 1_700_000_000_000_i64 })
        );
    }

    #[test]
    fn test_point_history_wire_format() {
        let history = PointHistory {
            id: 7,
            user_id: 1,
            amount: 50,
            transaction_type: TransactionType::Use,
            time_millis: 42,
        };
        assert_eq!(
            serde_json::to_value(&history).unwrap(),
            json!({ "id": 7, "userId": 1, "amount": 50, "type": "USE", "timeMillis": 42 })
        );
        assert_eq!(history.signed_amount(), -50);
    }

    #[test]
    fn test_empty_user_point() {
        let point = UserPoint::empty(9, 123);
        assert_eq!(point.point, 0);
        assert_eq!(point.id, 9);
        assert_eq!(point.update_millis, 123);
    }
}
