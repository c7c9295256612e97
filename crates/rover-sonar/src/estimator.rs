//! 距离估计
//!
//! 一次测量：触发 -> 等待上升沿 -> 计时高电平 -> 换算距离。
//! 任一步超时都以哨兵距离（默认 800cm）代替，并按配置重试。
//! 有效读数进入平滑窗口，对外报告窗口均值。

use crate::error::SonarError;
use crate::timing::{Level, TimingSource, pulse_to_distance};
use crate::window::RingWindow;
use std::time::Duration;
use tracing::{debug, warn};

/// 默认哨兵距离（cm），表示"超出量程 / 无回波"
pub const DEFAULT_SENTINEL_CM: f64 = 800.0;

/// 距离估计配置
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorConfig {
    /// 哨兵距离（cm）
    pub sentinel_cm: f64,
    /// 每个边沿的等待预算
    pub echo_timeout: Duration,
    /// 平滑窗口长度
    pub smoothing_window: usize,
    /// 超时后的最大重试次数（总尝试次数 = max_retries + 1）
    pub max_retries: u32,
    /// 连续多少次读数超时后清空平滑窗口（0 表示从不清空）
    ///
    /// 障碍物离开量程后，窗口里的旧读数不会一直保留。
    pub stale_after_timeouts: u32,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            sentinel_cm: DEFAULT_SENTINEL_CM,
            echo_timeout: Duration::from_millis(40),
            smoothing_window: 5,
            max_retries: 2,
            stale_after_timeouts: 5,
        }
    }
}

impl EstimatorConfig {
    /// 检查配置
    ///
    /// # 错误
    /// - `SonarError::InvalidConfig`: 哨兵距离非正、超时为零或窗口长度为零
    pub fn validate(&self) -> Result<(), SonarError> {
        if !(self.sentinel_cm.is_finite() && self.sentinel_cm > 0.0) {
            return Err(SonarError::InvalidConfig(format!(
                "sentinel_cm must be > 0, got {}",
                self.sentinel_cm
            )));
        }
        if self.echo_timeout.is_zero() {
            return Err(SonarError::InvalidConfig(
                "echo_timeout must be > 0".to_string(),
            ));
        }
        if self.smoothing_window == 0 {
            return Err(SonarError::InvalidConfig(
                "smoothing_window must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    /// 单次读数的最坏耗时（每次尝试两个边沿）
    pub fn worst_case_latency(&self) -> Duration {
        self.echo_timeout * 2 * (self.max_retries + 1)
    }
}

/// 一次读数的结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// 本次原始距离（超时为哨兵距离）
    pub raw_cm: f64,
    /// 平滑窗口均值（窗口为空时为哨兵距离）
    pub smoothed_cm: f64,
    /// 所有尝试均未收到回波
    pub timed_out: bool,
    /// 实际尝试次数
    pub attempts: u32,
    /// 其中超时的次数
    pub timeouts: u32,
    /// 其中触发失败的次数
    pub trigger_faults: u32,
}

/// 距离估计器
///
/// 持有一个时序源和平滑窗口，每个通道一个实例，由该通道的轮询线程独占。
///
/// # Example
///
/// ```
/// use rover_sonar::{DistanceEstimator, EstimatorConfig, mock::ScriptedEcho};
///
/// let source = ScriptedEcho::from_distances([42.0]);
/// let mut estimator = DistanceEstimator::new(source, EstimatorConfig::default()).unwrap();
/// let d = estimator.measure();
/// assert!((d - 42.0).abs() < 1e-6);
/// ```
pub struct DistanceEstimator<T> {
    source: T,
    config: EstimatorConfig,
    history: RingWindow,
    consecutive_timeouts: u32,
}

impl<T: TimingSource> DistanceEstimator<T> {
    pub fn new(source: T, config: EstimatorConfig) -> Result<Self, SonarError> {
        config.validate()?;
        let history = RingWindow::new(config.smoothing_window);
        Ok(Self {
            source,
            config,
            history,
            consecutive_timeouts: 0,
        })
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    pub fn source(&self) -> &T {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut T {
        &mut self.source
    }

    pub fn into_source(self) -> T {
        self.source
    }

    /// 单次原始测量（不重试、不平滑）
    ///
    /// # 错误
    /// - `SonarError::Timeout`: 上升沿或下降沿在预算内未出现
    /// - 触发失败时返回时序源的错误
    pub fn try_measure_raw(&mut self) -> Result<f64, SonarError> {
        let budget = self.config.echo_timeout;
        self.source.trigger()?;
        self.source.wait_for_edge(Level::High, budget)?;
        let pulse = self.source.wait_for_edge(Level::Low, budget)?;
        Ok(pulse_to_distance(pulse))
    }

    /// 完整读数：带重试的原始测量 + 平滑
    ///
    /// 总是返回，最坏耗时见 [`EstimatorConfig::worst_case_latency`]。
    pub fn read(&mut self) -> Reading {
        let sentinel = self.config.sentinel_cm;
        let max_attempts = self.config.max_retries + 1;

        let mut raw = None;
        let mut attempts = 0;
        let mut timeouts = 0;
        let mut trigger_faults = 0;

        while attempts < max_attempts {
            attempts += 1;
            match self.try_measure_raw() {
                Ok(d) => {
                    raw = Some(d);
                    break;
                },
                Err(SonarError::Timeout) => {
                    timeouts += 1;
                    debug!(
                        "Echo timeout on {} (attempt {}/{})",
                        self.source.name(),
                        attempts,
                        max_attempts
                    );
                },
                Err(e) => {
                    trigger_faults += 1;
                    warn!("Measurement failed on {}: {}", self.source.name(), e);
                },
            }
        }

        match raw {
            Some(d) => {
                self.consecutive_timeouts = 0;
                if d < sentinel {
                    self.history.push(d);
                }
            },
            None => {
                self.consecutive_timeouts = self.consecutive_timeouts.saturating_add(1);
                let stale_after = self.config.stale_after_timeouts;
                if stale_after > 0
                    && self.consecutive_timeouts == stale_after
                    && !self.history.is_empty()
                {
                    debug!(
                        "{} consecutive timeouts on {}, dropping smoothing history",
                        stale_after,
                        self.source.name()
                    );
                    self.history.clear();
                }
            },
        }

        Reading {
            raw_cm: raw.unwrap_or(sentinel),
            smoothed_cm: self.smoothed(),
            timed_out: raw.is_none(),
            attempts,
            timeouts,
            trigger_faults,
        }
    }

    /// 平滑后的距离（cm）
    pub fn measure(&mut self) -> f64 {
        self.read().smoothed_cm
    }

    /// 当前平滑值（不触发测量）
    pub fn smoothed(&self) -> f64 {
        self.history.mean().unwrap_or(self.config.sentinel_cm)
    }

    /// 平滑窗口（从旧到新）
    pub fn history(&self) -> &RingWindow {
        &self.history
    }

    /// 清空平滑窗口
    pub fn reset(&mut self) {
        self.history.clear();
        self.consecutive_timeouts = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EchoTimeout;
    use crate::mock::{FixedPulse, ScriptedEcho, SilentEcho};
    use approx::assert_relative_eq;
    use std::time::Instant;

    /// 预算大于脚本中最长的回波（70cm 约 4.1ms）
    fn test_config() -> EstimatorConfig {
        EstimatorConfig {
            echo_timeout: Duration::from_millis(50),
            ..EstimatorConfig::default()
        }
    }

    #[test]
    fn test_silent_source_yields_sentinel_within_budget() {
        let config = test_config();
        let budget = config.worst_case_latency();
        let mut est = DistanceEstimator::new(SilentEcho, config).unwrap();

        let start = Instant::now();
        let reading = est.read();
        let elapsed = start.elapsed();

        assert_eq!(reading.raw_cm, DEFAULT_SENTINEL_CM);
        assert_eq!(reading.smoothed_cm, DEFAULT_SENTINEL_CM);
        assert!(reading.timed_out);
        assert_eq!(reading.attempts, 3);
        assert_eq!(reading.timeouts, 3);
        // 上升沿即超时，每次尝试只消耗一个预算
        assert!(elapsed < budget + Duration::from_millis(100), "elapsed = {:?}", elapsed);
    }

    #[test]
    fn test_known_pulse_converts_to_distance() {
        let pulse = Duration::from_micros(2915);
        let mut est = DistanceEstimator::new(FixedPulse::new(pulse), test_config()).unwrap();
        let reading = est.read();
        assert_relative_eq!(reading.raw_cm, pulse.as_secs_f64() * 34300.0 / 2.0, epsilon = 1e-9);
        assert!(!reading.timed_out);
        assert_eq!(reading.attempts, 1);
    }

    #[test]
    fn test_identical_readings_smooth_to_same_value() {
        let pulse = Duration::from_micros(1000);
        let mut est = DistanceEstimator::new(FixedPulse::new(pulse), test_config()).unwrap();
        let v = pulse_to_distance(pulse);
        for _ in 0..3 {
            est.measure();
        }
        assert_relative_eq!(est.smoothed(), v, epsilon = 1e-12);
    }

    #[test]
    fn test_smoothing_is_mean_of_window() {
        let config = EstimatorConfig {
            smoothing_window: 3,
            ..test_config()
        };
        let source = ScriptedEcho::from_distances([10.0, 20.0, 30.0, 40.0]);
        let mut est = DistanceEstimator::new(source, config).unwrap();
        assert_relative_eq!(est.measure(), 10.0, epsilon = 1e-4);
        assert_relative_eq!(est.measure(), 15.0, epsilon = 1e-4);
        assert_relative_eq!(est.measure(), 20.0, epsilon = 1e-4);
        // 窗口满，最旧的 10 被丢弃
        assert_relative_eq!(est.measure(), 30.0, epsilon = 1e-4);
    }

    #[test]
    fn test_timeout_not_folded_into_history() {
        let config = EstimatorConfig {
            max_retries: 0,
            ..test_config()
        };
        let source = ScriptedEcho::new([Some(50.0), None, Some(70.0)]);
        let mut est = DistanceEstimator::new(source, config).unwrap();

        assert_relative_eq!(est.measure(), 50.0, epsilon = 1e-4);

        let reading = est.read();
        assert!(reading.timed_out);
        assert_eq!(reading.raw_cm, DEFAULT_SENTINEL_CM);
        assert_relative_eq!(reading.smoothed_cm, 50.0, epsilon = 1e-4);

        assert_relative_eq!(est.measure(), 60.0, epsilon = 1e-4);
        assert_eq!(est.history().len(), 2);
    }

    #[test]
    fn test_retry_recovers_from_single_timeout() {
        let source = ScriptedEcho::new([None, Some(60.0)]);
        let mut est = DistanceEstimator::new(source, test_config()).unwrap();
        let reading = est.read();
        assert!(!reading.timed_out);
        assert_eq!(reading.attempts, 2);
        assert_eq!(reading.timeouts, 1);
        assert_relative_eq!(reading.raw_cm, 60.0, epsilon = 1e-4);
        assert_eq!(est.source().trigger_count(), 2);
    }

    #[test]
    fn test_stale_history_dropped_after_consecutive_timeouts() {
        let config = EstimatorConfig {
            max_retries: 0,
            stale_after_timeouts: 2,
            ..test_config()
        };
        let source = ScriptedEcho::new([Some(30.0), None]);
        let mut est = DistanceEstimator::new(source, config).unwrap();
        assert_relative_eq!(est.measure(), 30.0, epsilon = 1e-4);
        assert_relative_eq!(est.measure(), 30.0, epsilon = 1e-4);
        assert_eq!(est.measure(), DEFAULT_SENTINEL_CM);
    }

    #[test]
    fn test_out_of_range_echo_not_folded() {
        // 回波超过哨兵距离：报告原始值，但不进入平滑窗口
        let config = EstimatorConfig {
            echo_timeout: Duration::from_millis(100),
            ..EstimatorConfig::default()
        };
        let source = ScriptedEcho::from_distances([900.0]);
        let mut est = DistanceEstimator::new(source, config).unwrap();
        let reading = est.read();
        assert!(!reading.timed_out);
        assert!(reading.raw_cm > DEFAULT_SENTINEL_CM);
        assert_eq!(reading.smoothed_cm, DEFAULT_SENTINEL_CM);
        assert!(est.history().is_empty());
    }

    struct BrokenTrigger;

    impl TimingSource for BrokenTrigger {
        fn trigger(&mut self) -> Result<(), SonarError> {
            Err(SonarError::Gpio("pin busy".into()))
        }

        fn wait_for_edge(&mut self, _: Level, _: Duration) -> Result<Duration, EchoTimeout> {
            unreachable!("trigger never succeeds")
        }
    }

    #[test]
    fn test_trigger_fault_yields_sentinel() {
        let mut est = DistanceEstimator::new(BrokenTrigger, test_config()).unwrap();
        let reading = est.read();
        assert!(reading.timed_out);
        assert_eq!(reading.trigger_faults, 3);
        assert_eq!(reading.timeouts, 0);
        assert_eq!(reading.raw_cm, DEFAULT_SENTINEL_CM);
        assert!(matches!(est.try_measure_raw(), Err(SonarError::Gpio(_))));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad = [
            EstimatorConfig {
                smoothing_window: 0,
                ..EstimatorConfig::default()
            },
            EstimatorConfig {
                sentinel_cm: 0.0,
                ..EstimatorConfig::default()
            },
            EstimatorConfig {
                echo_timeout: Duration::ZERO,
                ..EstimatorConfig::default()
            },
        ];
        for config in bad {
            assert!(matches!(
                DistanceEstimator::new(SilentEcho, config),
                Err(SonarError::InvalidConfig(_))
            ));
        }
    }
}
