//! 测距时序抽象
//!
//! 触发/回波式超声波模块只需要两个原语：发出触发脉冲、等待回波线到达某电平。
//! 距离估计完全建立在这两个原语和单调时钟之上，与具体后端无关。

use crate::error::{EchoTimeout, SonarError};
use std::time::{Duration, Instant};

/// 声速（cm/s）
pub const SPEED_OF_SOUND_CM_S: f64 = 34300.0;

/// 回波线电平
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

/// 测距时序源
///
/// 后端在构造时选定（GPIO、模拟等），估计器只通过本 trait 访问硬件。
pub trait TimingSource: Send {
    /// 发出一次触发脉冲，返回时脉冲已经结束
    fn trigger(&mut self) -> Result<(), SonarError>;

    /// 等待回波线到达 `level`，返回从调用开始到该电平出现经过的时间
    ///
    /// 超过 `timeout` 仍未出现时返回 [`EchoTimeout`]，不得无限阻塞。
    fn wait_for_edge(&mut self, level: Level, timeout: Duration) -> Result<Duration, EchoTimeout>;

    /// 后端名称（用于日志）
    fn name(&self) -> &'static str {
        "unknown"
    }
}

impl<T: TimingSource + ?Sized> TimingSource for Box<T> {
    fn trigger(&mut self) -> Result<(), SonarError> {
        (**self).trigger()
    }

    fn wait_for_edge(&mut self, level: Level, timeout: Duration) -> Result<Duration, EchoTimeout> {
        (**self).wait_for_edge(level, timeout)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// 忙等直到 `ready` 返回 `true` 或超时
///
/// 供轮询式后端实现 `wait_for_edge` 使用。
pub fn poll_until(timeout: Duration, mut ready: impl FnMut() -> bool) -> Result<Duration, EchoTimeout> {
    let start = Instant::now();
    loop {
        if ready() {
            return Ok(start.elapsed());
        }
        if start.elapsed() >= timeout {
            return Err(EchoTimeout);
        }
        std::hint::spin_loop();
    }
}

/// 回波高电平时长 -> 距离（cm）：`t * 34300 / 2`
pub fn pulse_to_distance(pulse: Duration) -> f64 {
    pulse.as_secs_f64() * SPEED_OF_SOUND_CM_S / 2.0
}

/// 距离（cm）-> 回波高电平时长
pub fn distance_to_pulse(distance_cm: f64) -> Duration {
    Duration::from_secs_f64((distance_cm.max(0.0) * 2.0) / SPEED_OF_SOUND_CM_S)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pulse_to_distance() {
        // 1ms 往返 -> 17.15cm
        assert_relative_eq!(pulse_to_distance(Duration::from_millis(1)), 17.15, epsilon = 1e-9);
        assert_eq!(pulse_to_distance(Duration::ZERO), 0.0);
    }

    #[test]
    fn test_distance_to_pulse_inverse() {
        // Duration 只有纳秒精度，1ns 约 1.7e-5cm
        let pulse = distance_to_pulse(100.0);
        assert_relative_eq!(pulse_to_distance(pulse), 100.0, epsilon = 1e-4);
    }

    #[test]
    fn test_poll_until_times_out() {
        let start = Instant::now();
        let result = poll_until(Duration::from_millis(5), || false);
        assert_eq!(result, Err(EchoTimeout));
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(5));
        assert!(elapsed < Duration::from_millis(500));
    }

    #[test]
    fn test_poll_until_returns_when_ready() {
        let mut calls = 0;
        let result = poll_until(Duration::from_secs(1), || {
            calls += 1;
            calls == 3
        });
        assert!(result.is_ok());
        assert_eq!(calls, 3);
    }
}
