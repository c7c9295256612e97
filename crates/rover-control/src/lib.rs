//! 规避控制层
//!
//! - [`TrendDetector`]：按各通道距离趋势决定前进或停车
//! - [`CycleCoordinator`]：每个控制周期串联趋势检测和模糊转向修正，无锁发布输出
//! - [`AvoidanceConfig`]：TOML 配置及到各运行时配置的转换

pub mod action;
pub mod config;
pub mod coordinator;
mod error;
pub mod trend;

pub use action::Action;
pub use config::{
    AvoidanceConfig, ChannelPins, ChannelSettings, ControlSettings, SonarSettings, TrendSettings,
};
pub use coordinator::{CycleCoordinator, CycleOutput};
pub use error::{ConfigError, ControlError};
pub use trend::{TrendConfig, TrendDetector};
