//! # Rover Tools - 离线评估工具
//!
//! **依赖原则**: 只依赖 `rover-fuzzy`，不引入传感器和线程
//!
//! ## 包含模块
//!
//! - `samples` - 采样 CSV 读写与回放
//! - `statistics` - 回放耗时与偏差统计（可选）
//!
//! ## Feature Flags
//!
//! - `default` - 无默认 features
//! - `full` - 启用所有功能（包含 statistics）
//! - `statistics` - 启用统计模块

pub mod samples;

#[cfg(feature = "statistics")]
pub mod statistics;

pub use samples::{
    InvalidRow, LabelledOutcome, LabelledRow, ReplayOutcome, ReplayReport, ReplayRow, SampleError,
    evaluate_labelled, read_labelled, read_labelled_file, read_replay, read_replay_file, replay,
};
#[cfg(feature = "statistics")]
pub use statistics::{ReplaySummary, Spread};
