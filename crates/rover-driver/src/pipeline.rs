//! 轮询循环
//!
//! 每个测距通道一个线程，循环执行：读数 -> 发布到寄存器 -> 触发钩子 -> 等待 `poll_delay`。
//! 停止标志在两次读数之间检查；正在进行的读数总会完成或超时后再退出，
//! 不会留下未结束的触发脉冲。

use crate::channel::{ChannelDistances, ChannelId, DistanceRegister};
use crate::hooks::{HookManager, ReadingEvent};
use crate::metrics::ChannelMetrics;
use rover_sonar::{DistanceEstimator, TimingSource};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::{info, trace};
#[cfg(feature = "realtime")]
use tracing::warn;

/// 轮询配置（POD）
#[derive(Debug, Clone, PartialEq)]
pub struct PollConfig {
    /// 两次读数之间的等待时间
    pub poll_delay: Duration,
    /// 等待期间检查停止标志的间隔
    pub shutdown_check_interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            poll_delay: Duration::from_millis(60),
            shutdown_check_interval: Duration::from_millis(5),
        }
    }
}

impl PollConfig {
    pub fn with_poll_delay(poll_delay: Duration) -> Self {
        Self {
            poll_delay,
            ..Self::default()
        }
    }
}

/// 传感器阵列的共享状态
///
/// 寄存器和指标按通道下标存放；钩子由所有通道共享。
pub struct SensorContext {
    registers: [DistanceRegister; 3],
    metrics: [ChannelMetrics; 3],
    /// 读数钩子（运行时可增删）
    pub hooks: RwLock<HookManager>,
    epoch: Instant,
}

impl SensorContext {
    /// 所有寄存器以 `initial_cm`（通常为哨兵距离）初始化
    pub fn new(initial_cm: f64) -> Self {
        Self {
            registers: [
                DistanceRegister::new(initial_cm),
                DistanceRegister::new(initial_cm),
                DistanceRegister::new(initial_cm),
            ],
            metrics: Default::default(),
            hooks: RwLock::new(HookManager::new()),
            epoch: Instant::now(),
        }
    }

    pub fn register(&self, channel: ChannelId) -> &DistanceRegister {
        &self.registers[channel.index()]
    }

    pub fn metrics(&self, channel: ChannelId) -> &ChannelMetrics {
        &self.metrics[channel.index()]
    }

    /// 读取三路最新距离
    pub fn distances(&self) -> ChannelDistances {
        ChannelDistances::new(
            self.register(ChannelId::Front).load(),
            self.register(ChannelId::FrontLeft).load(),
            self.register(ChannelId::FrontRight).load(),
        )
    }

    /// 自创建以来经过的微秒数
    pub fn elapsed_us(&self) -> u64 {
        self.epoch.elapsed().as_micros() as u64
    }
}

/// 单通道轮询主循环
///
/// # 参数
/// - `estimator`: 该通道的距离估计器（被移动到轮询线程，独占）
/// - `channel`: 通道
/// - `ctx`: 共享状态
/// - `config`: 轮询配置
/// - `is_running`: 运行标志（Drop 时置 false）
pub fn poll_loop<T: TimingSource>(
    mut estimator: DistanceEstimator<T>,
    channel: ChannelId,
    ctx: Arc<SensorContext>,
    config: PollConfig,
    is_running: Arc<AtomicBool>,
) {
    // 设置线程优先级（可选 feature）
    #[cfg(feature = "realtime")]
    {
        use thread_priority::*;

        match set_current_thread_priority(ThreadPriority::Max) {
            Ok(_) => {
                info!("Sonar {} thread priority set to MAX (realtime)", channel);
            },
            Err(e) => {
                warn!(
                    "Failed to set sonar {} thread priority: {}. \
                    On Linux, you may need to run with CAP_SYS_NICE or use rtkit.",
                    channel, e
                );
            },
        }
    }

    info!(
        "Sonar {} polling started (backend={}, poll_delay={:?})",
        channel,
        estimator.source().name(),
        config.poll_delay
    );

    let register = ctx.register(channel);
    let metrics = ctx.metrics(channel);

    loop {
        // Acquire: 看到 false 时必须能看到停止前的所有写入
        if !is_running.load(Ordering::Acquire) {
            trace!("Sonar {}: is_running flag is false, exiting", channel);
            break;
        }

        // 读数总是在超时预算内返回
        let reading = estimator.read();

        metrics.measurements.fetch_add(1, Ordering::Relaxed);
        metrics
            .retries
            .fetch_add(u64::from(reading.attempts.saturating_sub(1)), Ordering::Relaxed);
        if reading.timed_out {
            metrics.echo_timeouts.fetch_add(1, Ordering::Relaxed);
        }
        if reading.trigger_faults > 0 {
            metrics
                .trigger_faults
                .fetch_add(u64::from(reading.trigger_faults), Ordering::Relaxed);
        }

        register.store(reading.smoothed_cm);
        metrics.publishes.fetch_add(1, Ordering::Relaxed);

        // 使用 try_read 避免阻塞，锁被持有时跳过本次触发
        if let Ok(hooks) = ctx.hooks.try_read()
            && !hooks.is_empty()
        {
            hooks.trigger_all(&ReadingEvent {
                channel,
                timestamp_us: ctx.elapsed_us(),
                reading,
            });
        }

        sleep_while_running(config.poll_delay, config.shutdown_check_interval, &is_running);
    }

    info!("Sonar {} polling stopped", channel);
}

/// 分片睡眠，运行标志变为 false 时提前返回
fn sleep_while_running(total: Duration, slice: Duration, is_running: &AtomicBool) {
    let slice = slice.max(Duration::from_millis(1));
    let deadline = Instant::now() + total;
    loop {
        if !is_running.load(Ordering::Acquire) {
            return;
        }
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        spin_sleep::sleep((deadline - now).min(slice));
    }
}
