//! 测距通道性能指标
//!
//! 零开销的原子计数器，轮询线程写入，任意线程可读取快照，不引入锁竞争。

use std::sync::atomic::{AtomicU64, Ordering};

/// 单通道实时指标
///
/// # 使用示例
///
/// ```rust
/// use rover_driver::ChannelMetrics;
/// use std::sync::atomic::Ordering;
///
/// let metrics = ChannelMetrics::new();
/// metrics.measurements.fetch_add(1, Ordering::Relaxed);
///
/// let snapshot = metrics.snapshot();
/// assert_eq!(snapshot.measurements, 1);
/// ```
#[derive(Debug, Default)]
pub struct ChannelMetrics {
    /// 完成的读数次数（含超时）
    pub measurements: AtomicU64,
    /// 读数超时次数（所有尝试都没有回波）
    pub echo_timeouts: AtomicU64,
    /// 重试次数（尝试次数 - 1 的累计）
    pub retries: AtomicU64,
    /// 触发失败次数
    pub trigger_faults: AtomicU64,
    /// 寄存器发布次数
    pub publishes: AtomicU64,
}

impl ChannelMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取指标快照
    ///
    /// 使用 `Ordering::Relaxed`，不同计数器之间可能有微小的时间差。
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            measurements: self.measurements.load(Ordering::Relaxed),
            echo_timeouts: self.echo_timeouts.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            trigger_faults: self.trigger_faults.load(Ordering::Relaxed),
            publishes: self.publishes.load(Ordering::Relaxed),
        }
    }

    /// 重置所有计数器
    pub fn reset(&self) {
        self.measurements.store(0, Ordering::Relaxed);
        self.echo_timeouts.store(0, Ordering::Relaxed);
        self.retries.store(0, Ordering::Relaxed);
        self.trigger_faults.store(0, Ordering::Relaxed);
        self.publishes.store(0, Ordering::Relaxed);
    }
}

/// 指标快照（不可变）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub measurements: u64,
    pub echo_timeouts: u64,
    pub retries: u64,
    pub trigger_faults: u64,
    pub publishes: u64,
}

impl MetricsSnapshot {
    /// 超时率（百分比），没有读数时为 0
    pub fn timeout_rate(&self) -> f64 {
        if self.measurements == 0 {
            return 0.0;
        }
        (self.echo_timeouts as f64 / self.measurements as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_metrics_default() {
        let snapshot = ChannelMetrics::new().snapshot();
        assert_eq!(snapshot, MetricsSnapshot::default());
        assert_eq!(snapshot.timeout_rate(), 0.0);
    }

    #[test]
    fn test_timeout_rate() {
        let metrics = ChannelMetrics::new();
        metrics.measurements.fetch_add(8, Ordering::Relaxed);
        metrics.echo_timeouts.fetch_add(2, Ordering::Relaxed);
        assert_eq!(metrics.snapshot().timeout_rate(), 25.0);
    }

    #[test]
    fn test_metrics_reset() {
        let metrics = ChannelMetrics::new();
        metrics.publishes.fetch_add(100, Ordering::Relaxed);
        metrics.reset();
        assert_eq!(metrics.snapshot().publishes, 0);
    }

    #[test]
    fn test_metrics_concurrent_updates() {
        let metrics = Arc::new(ChannelMetrics::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let m = metrics.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        m.measurements.fetch_add(1, Ordering::Relaxed);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(metrics.snapshot().measurements, 4000);
    }
}
