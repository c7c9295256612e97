//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use rover_sdk::prelude::*;
//! ```

// 控制层（推荐入口）
pub use rover_control::{Action, AvoidanceConfig, CycleCoordinator, CycleOutput, TrendDetector};

// 驱动层
pub use rover_driver::{ChannelDistances, ChannelId, PollConfig, SensorArray, SensorArrayBuilder};

// 推理与测距
pub use rover_fuzzy::{FuzzySteering, Sample};
pub use rover_sonar::{DistanceEstimator, EstimatorConfig, TimingSource};

// 错误类型
pub use rover_control::{ConfigError, ControlError};
pub use rover_driver::DriverError;
pub use rover_fuzzy::FuzzyError;
pub use rover_sonar::SonarError;
