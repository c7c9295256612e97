//! Rover SDK - 小车障碍规避决策核心
//!
//! # 架构设计
//!
//! 从底层到高层：
//!
//! - **测距层** (`sonar`): 触发/回波时序抽象、模拟与 GPIO 后端、距离估计
//! - **驱动层** (`driver`): 每通道轮询线程、无锁最新值寄存器、钩子与录制
//! - **推理层** (`fuzzy`): 135 条规则的模糊转向修正
//! - **控制层** (`control`): 趋势检测、控制周期协调、配置
//! - **工具层** (`tools`): 离线回放与统计
//!
//! # 快速开始
//!
//! ```rust
//! use rover_sdk::prelude::*;
//!
//! let config = AvoidanceConfig::default();
//! let mut coordinator = CycleCoordinator::from_config(&config).unwrap();
//! let output = coordinator
//!     .tick(0.0, &ChannelDistances::new(120.0, 80.0, 140.0))
//!     .unwrap();
//! assert_eq!(output.action, Action::Forward);
//! ```

pub mod logging;
pub mod prelude;
pub mod runtime;

pub use rover_control as control;
pub use rover_driver as driver;
pub use rover_fuzzy as fuzzy;
pub use rover_sonar as sonar;
pub use rover_tools as tools;

pub use logging::init_logger;
pub use runtime::start_sensor_array;
#[cfg(feature = "rppal")]
pub use runtime::gpio_sources;

pub use rover_control::{Action, AvoidanceConfig, ControlError, CycleCoordinator, CycleOutput};
pub use rover_driver::{ChannelDistances, ChannelId, DriverError, SensorArray};
pub use rover_fuzzy::{FuzzyError, FuzzySteering};
pub use rover_sonar::SonarError;
