//! # Rover Sonar
//!
//! 超声波测距层：
//! - [`TimingSource`]：触发/回波时序抽象，后端在构造时选定
//! - [`mock`]：无硬件的模拟后端（测试、仿真）
//! - `gpio`：Raspberry Pi GPIO 后端（需启用 `rppal` feature）
//! - [`DistanceEstimator`]：超时回退、重试与滑动平均
//!
//! 超时是常态而不是错误：估计器总是返回一个距离，
//! 收不到回波时返回哨兵距离（默认 800cm）。

mod error;
pub mod estimator;
#[cfg(feature = "rppal")]
pub mod gpio;
pub mod mock;
pub mod timing;
pub mod window;

pub use error::{EchoTimeout, SonarError};
pub use estimator::{DEFAULT_SENTINEL_CM, DistanceEstimator, EstimatorConfig, Reading};
#[cfg(feature = "rppal")]
pub use gpio::GpioSonar;
pub use timing::{
    Level, SPEED_OF_SOUND_CM_S, TimingSource, distance_to_pulse, poll_until, pulse_to_distance,
};
pub use window::RingWindow;
