//! 传感器驱动层
//!
//! 本模块管理超声波测距通道的轮询线程，包括：
//! - 每通道一个轮询线程，读数完成即发布到最新值寄存器（原子 f64，无锁）
//! - 协作式停止：停止标志在两次读数之间检查，Drop 时带超时 join
//! - 原子计数器指标
//! - 钩子系统：读数回调、异步录制
//!
//! 控制周期只读取寄存器中最近发布的值，不与轮询线程做阻塞交接。

mod array;
mod builder;
pub mod channel;
mod error;
pub mod hooks;
pub mod metrics;
pub mod pipeline;
pub mod recording;

pub use array::{JOIN_TIMEOUT, SensorArray};
pub use builder::SensorArrayBuilder;
pub use channel::{ChannelDistances, ChannelId, DistanceRegister};
pub use error::DriverError;
pub use hooks::{HookManager, ReadingCallback, ReadingEvent};
pub use metrics::{ChannelMetrics, MetricsSnapshot};
pub use pipeline::{PollConfig, SensorContext, poll_loop};
pub use recording::{AsyncRecordingHook, DEFAULT_RECORDING_CAPACITY, RecordedReading};
