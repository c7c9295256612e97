//! Builder 模式实现
//!
//! 提供链式构造 [`SensorArray`] 的便捷方式。

use crate::array::{Launcher, SensorArray};
use crate::channel::ChannelId;
use crate::error::DriverError;
use crate::hooks::ReadingCallback;
use crate::pipeline::{PollConfig, SensorContext, poll_loop};
use rover_sonar::{DEFAULT_SENTINEL_CM, DistanceEstimator, TimingSource};
use std::sync::Arc;
use std::thread;

/// 传感器阵列 Builder（链式构造）
///
/// # Example
///
/// ```
/// use rover_driver::{ChannelId, PollConfig, SensorArrayBuilder};
/// use rover_sonar::{DistanceEstimator, EstimatorConfig, mock::ScriptedEcho};
///
/// let estimator = |d: f64| {
///     DistanceEstimator::new(ScriptedEcho::from_distances([d]), EstimatorConfig::default())
///         .unwrap()
/// };
/// let array = SensorArrayBuilder::new()
///     .channel(ChannelId::Front, estimator(120.0), PollConfig::default())
///     .channel(ChannelId::FrontLeft, estimator(90.0), PollConfig::default())
///     .channel(ChannelId::FrontRight, estimator(60.0), PollConfig::default())
///     .build()
///     .unwrap();
/// array.shutdown().unwrap();
/// ```
pub struct SensorArrayBuilder {
    launchers: Vec<(ChannelId, Launcher)>,
    hooks: Vec<Arc<dyn ReadingCallback>>,
    /// 寄存器初值（首次读数完成前对外报告的距离）
    initial_cm: f64,
    duplicate: Option<ChannelId>,
}

impl Default for SensorArrayBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorArrayBuilder {
    pub fn new() -> Self {
        Self {
            launchers: Vec::new(),
            hooks: Vec::new(),
            initial_cm: DEFAULT_SENTINEL_CM,
            duplicate: None,
        }
    }

    /// 添加一个通道
    ///
    /// 估计器被移动到该通道的轮询线程中。
    pub fn channel<T>(
        mut self,
        channel: ChannelId,
        estimator: DistanceEstimator<T>,
        poll: PollConfig,
    ) -> Self
    where
        T: TimingSource + 'static,
    {
        if self.launchers.iter().any(|(c, _)| *c == channel) {
            self.duplicate.get_or_insert(channel);
            return self;
        }

        let launch: Launcher = Box::new(move |ctx, is_running| {
            thread::Builder::new()
                .name(format!("sonar-{}", channel))
                .spawn(move || poll_loop(estimator, channel, ctx, poll, is_running))
        });
        self.launchers.push((channel, launch));
        self
    }

    /// 注册读数钩子（在线程启动前生效）
    pub fn hook(mut self, callback: Arc<dyn ReadingCallback>) -> Self {
        self.hooks.push(callback);
        self
    }

    /// 设置寄存器初值（默认哨兵距离 800cm）
    pub fn initial_distance(mut self, distance_cm: f64) -> Self {
        self.initial_cm = distance_cm;
        self
    }

    /// 构建并启动三路完整阵列
    ///
    /// # 错误
    /// - `DriverError::MissingChannel`: 三个通道中有未配置的
    /// - `DriverError::DuplicateChannel`: 同一通道配置了多次
    /// - `DriverError::Spawn`: 线程创建失败
    pub fn build(self) -> Result<SensorArray, DriverError> {
        for channel in ChannelId::ALL {
            if !self.launchers.iter().any(|(c, _)| *c == channel) {
                return Err(DriverError::MissingChannel(channel));
            }
        }
        self.build_partial()
    }

    /// 构建并启动，只要求至少一个通道（单通道调试用）
    pub fn build_partial(self) -> Result<SensorArray, DriverError> {
        if let Some(channel) = self.duplicate {
            return Err(DriverError::DuplicateChannel(channel));
        }
        if self.launchers.is_empty() {
            return Err(DriverError::MissingChannel(ChannelId::Front));
        }

        let ctx = Arc::new(SensorContext::new(self.initial_cm));
        {
            let mut hooks = ctx.hooks.write().map_err(|_| DriverError::PoisonedLock)?;
            for hook in self.hooks {
                hooks.add_callback(hook);
            }
        }

        SensorArray::start(ctx, self.launchers)
    }
}
