//! 积分流水内存仓储

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use point_shared::config::StoreConfig;

use super::latency::SimulatedLatency;
use super::traits::PointHistoryRepositoryTrait;
use crate::error::StoreError;
use crate::models::{PointHistory, TransactionType};

#[derive(Debug)]
struct HistoryTable {
    /// 下一条流水的 ID
    cursor: i64,
    rows: Vec<PointHistory>,
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self {
            cursor: 1,
            rows: Vec::new(),
        }
    }
}

/// 积分流水仓储
///
/// 仅追加的内存表，ID 单调递增，按写入顺序返回
#[derive(Debug, Default)]
pub struct PointHistoryRepository {
    table: Mutex<HistoryTable>,
    latency: SimulatedLatency,
}

impl PointHistoryRepository {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            table: Mutex::new(HistoryTable::default()),
            latency: SimulatedLatency::from_config(config),
        }
    }

    /// 全部流水条数
    pub fn len(&self) -> usize {
        self.table.lock().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PointHistoryRepositoryTrait for PointHistoryRepository {
    async fn insert(
        &self,
        user_id: i64,
        amount: i64,
        transaction_type: TransactionType,
        time_millis: i64,
    ) -> Result<PointHistory, StoreError> {
        if user_id <= 0 {
            return Err(StoreError::InvalidId(user_id));
        }
        self.latency.wait().await;

        let mut table = self.table.lock();
        let history = PointHistory {
            id: table.cursor,
            user_id,
            amount,
            transaction_type,
            time_millis,
        };
        table.cursor += 1;
        table.rows.push(history.clone());
        drop(table);

        debug!(
            history_id = history.id,
            user_id,
            amount,
            transaction_type = %transaction_type,
            "Point history appended"
        );
        Ok(history)
    }

    async fn select_all_by_user_id(&self, user_id: i64) -> Result<Vec<PointHistory>, StoreError> {
        self.latency.wait().await;

        Ok(self
            .table
            .lock()
            .rows
            .iter()
            .filter(|h| h.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ids_are_monotonic() {
        let repo = PointHistoryRepository::default();
        let first = repo
            .insert(1, 10, TransactionType::Charge, 1)
            .await
            .unwrap();
        let second = repo.insert(2, 5, TransactionType::Charge, 2).await.unwrap();
        let third = repo.insert(1, 3, TransactionType::Use, 3).await.unwrap();
        assert_eq!((first.id, second.id, third.id), (1, 2, 3));
        assert_eq!(repo.len(), 3);
    }

    #[tokio::test]
    async fn test_select_returns_user_rows_in_insertion_order() {
        let repo = PointHistoryRepository::default();
        repo.insert(1, 50, TransactionType::Charge, 10).await.unwrap();
        repo.insert(2, 99, TransactionType::Charge, 11).await.unwrap();
        repo.insert(1, 80, TransactionType::Use, 12).await.unwrap();

        let rows = repo.select_all_by_user_id(1).await.unwrap();
        let amounts: Vec<_> = rows.iter().map(|h| (h.amount, h.transaction_type)).collect();
        assert_eq!(
            amounts,
            vec![(50, TransactionType::Charge), (80, TransactionType::Use)]
        );
    }

    #[tokio::test]
    async fn test_unknown_user_has_empty_history() {
        let repo = PointHistoryRepository::default();
        assert!(repo.select_all_by_user_id(7).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_non_positive_id() {
        let repo = PointHistoryRepository::default();
        let result = repo.insert(0, 10, TransactionType::Charge, 1).await;
        assert!(matches!(result, Err(StoreError::InvalidId(0))));
        assert!(repo.is_empty());
    }
}
