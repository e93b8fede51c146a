//! 模拟存储 I/O 延迟

use rand::Rng;
use std::time::Duration;

use point_shared::config::StoreConfig;

/// 每次调用前随机等待 `0..=max` 毫秒，max 为 0 时不等待
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SimulatedLatency {
    max_millis: u64,
}

impl SimulatedLatency {
    pub(crate) fn from_config(config: &StoreConfig) -> Self {
        Self {
            max_millis: config.simulated_latency_ms,
        }
    }

    pub(crate) async fn wait(&self) {
        if self.max_millis == 0 {
            return;
        }
        let millis = rand::rng().random_range(0..=self.max_millis);
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
}
