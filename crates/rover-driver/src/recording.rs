//! 异步录制钩子
//!
//! 轮询线程只做一次 `try_send`，落盘等慢操作由接收端所在的线程完成。
//!
//! - 有界队列，队列满或接收端关闭时丢弃新读数并计数，不阻塞轮询线程
//! - 时间戳取自读数事件本身，不在回调里重新取时钟
//!
//! # 使用示例
//!
//! ```rust
//! use rover_driver::recording::AsyncRecordingHook;
//! use rover_driver::hooks::ReadingCallback;
//! use std::sync::Arc;
//!
//! let (hook, rx) = AsyncRecordingHook::new();
//! let dropped = hook.dropped_readings().clone();
//! let callback = Arc::new(hook) as Arc<dyn ReadingCallback>;
//!
//! std::thread::spawn(move || {
//!     while let Ok(record) = rx.recv() {
//!         // 写入 CSV ...
//!         let _ = record;
//!     }
//! });
//! # let _ = (callback, dropped);
//! ```

use crate::channel::ChannelId;
use crate::hooks::{ReadingCallback, ReadingEvent};
use crossbeam_channel::{Receiver, Sender, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// 默认队列容量（三路各 ~20Hz 时约 2.5 分钟）
pub const DEFAULT_RECORDING_CAPACITY: usize = 10_000;

/// 录制的一条读数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedReading {
    pub timestamp_us: u64,
    pub channel: ChannelId,
    pub raw_cm: f64,
    pub smoothed_cm: f64,
    pub timed_out: bool,
}

impl From<&ReadingEvent> for RecordedReading {
    fn from(event: &ReadingEvent) -> Self {
        Self {
            timestamp_us: event.timestamp_us,
            channel: event.channel,
            raw_cm: event.reading.raw_cm,
            smoothed_cm: event.reading.smoothed_cm,
            timed_out: event.reading.timed_out,
        }
    }
}

/// 异步录制钩子（有界队列）
pub struct AsyncRecordingHook {
    tx: Sender<RecordedReading>,
    /// 丢弃计数（队列满或接收端已关闭）
    dropped_readings: Arc<AtomicU64>,
    /// 成功入队计数
    recorded_readings: Arc<AtomicU64>,
}

impl AsyncRecordingHook {
    /// 创建默认容量的录制钩子，返回 `(hook, rx)`
    #[must_use]
    pub fn new() -> (Self, Receiver<RecordedReading>) {
        Self::with_capacity(DEFAULT_RECORDING_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> (Self, Receiver<RecordedReading>) {
        let (tx, rx) = bounded(capacity);
        let hook = Self {
            tx,
            dropped_readings: Arc::new(AtomicU64::new(0)),
            recorded_readings: Arc::new(AtomicU64::new(0)),
        };
        (hook, rx)
    }

    /// 丢弃计数器（注册前先 clone 持有）
    #[must_use]
    pub fn dropped_readings(&self) -> &Arc<AtomicU64> {
        &self.dropped_readings
    }

    #[must_use]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_readings.load(Ordering::Relaxed)
    }

    /// 入队计数器
    #[must_use]
    pub fn recorded_readings(&self) -> &Arc<AtomicU64> {
        &self.recorded_readings
    }

    #[must_use]
    pub fn recorded_count(&self) -> u64 {
        self.recorded_readings.load(Ordering::Relaxed)
    }
}

impl ReadingCallback for AsyncRecordingHook {
    #[inline]
    fn on_reading(&self, event: &ReadingEvent) {
        if self.tx.try_send(RecordedReading::from(event)).is_err() {
            // 队列满时丢弃新读数，保留旧读数
            self.dropped_readings.fetch_add(1, Ordering::Relaxed);
        } else {
            self.recorded_readings.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rover_sonar::Reading;
    use std::thread;
    use std::time::Duration;

    fn event(channel: ChannelId, timestamp_us: u64) -> ReadingEvent {
        ReadingEvent {
            channel,
            timestamp_us,
            reading: Reading {
                raw_cm: 800.0,
                smoothed_cm: 55.0,
                timed_out: true,
                attempts: 3,
                timeouts: 3,
                trigger_faults: 0,
            },
        }
    }

    #[test]
    fn test_recording_hook_basic() {
        let (hook, rx) = AsyncRecordingHook::new();
        let callback = Arc::new(hook) as Arc<dyn ReadingCallback>;

        callback.on_reading(&event(ChannelId::FrontRight, 12345));

        let record = rx.recv_timeout(Duration::from_millis(100)).unwrap();
        assert_eq!(record.timestamp_us, 12345);
        assert_eq!(record.channel, ChannelId::FrontRight);
        assert_eq!(record.raw_cm, 800.0);
        assert_eq!(record.smoothed_cm, 55.0);
        assert!(record.timed_out);
    }

    #[test]
    fn test_recording_hook_drops_when_full() {
        let (hook, rx) = AsyncRecordingHook::with_capacity(2);
        let dropped = hook.dropped_readings().clone();
        let recorded = hook.recorded_readings().clone();

        for i in 0..5 {
            hook.on_reading(&event(ChannelId::Front, i));
        }

        assert_eq!(recorded.load(Ordering::Relaxed), 2);
        assert_eq!(dropped.load(Ordering::Relaxed), 3);
        // 保留的是最早的两条
        assert_eq!(rx.try_recv().unwrap().timestamp_us, 0);
        assert_eq!(rx.try_recv().unwrap().timestamp_us, 1);
    }

    #[test]
    fn test_recording_hook_receiver_closed() {
        let (hook, rx) = AsyncRecordingHook::new();
        drop(rx);
        for i in 0..10 {
            hook.on_reading(&event(ChannelId::Front, i));
        }
        assert_eq!(hook.dropped_count(), 10);
        assert_eq!(hook.recorded_count(), 0);
    }

    #[test]
    fn test_recording_hook_concurrent() {
        let (hook, rx) = AsyncRecordingHook::new();
        let callback = Arc::new(hook) as Arc<dyn ReadingCallback>;

        let handles: Vec<_> = ChannelId::ALL
            .into_iter()
            .map(|channel| {
                let cb = callback.clone();
                thread::spawn(move || {
                    for i in 0..10 {
                        cb.on_reading(&event(channel, i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut count = 0;
        while rx.try_recv().is_ok() {
            count += 1;
        }
        assert_eq!(count, 30);
    }
}
