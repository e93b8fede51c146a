//! 领域模型

mod enums;
mod user_point;

pub use enums::TransactionType;
pub use user_point::{PointHistory, UserPoint, now_millis};
