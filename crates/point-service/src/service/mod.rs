//! 服务层
//!
//! 实现积分业务逻辑，协调用户锁与仓储层。
//!
//! ## 模块结构
//!
//! - `dto`: 请求体与参数解析
//! - `point_service`: 积分账本服务

pub mod dto;
pub mod point_service;

pub use dto::*;
pub use point_service::PointService;
