//! 钩子系统
//!
//! 轮询线程每完成一次读数就触发已注册的回调，用于录制、诊断等旁路处理。
//!
//! # 使用示例
//!
//! ```rust
//! use rover_driver::hooks::{HookManager, ReadingCallback};
//! use rover_driver::recording::AsyncRecordingHook;
//! use std::sync::Arc;
//!
//! let mut hooks = HookManager::new();
//! let (hook, _rx) = AsyncRecordingHook::new();
//! hooks.add_callback(Arc::new(hook) as Arc<dyn ReadingCallback>);
//! assert_eq!(hooks.len(), 1);
//! ```

use crate::channel::ChannelId;
use rover_sonar::Reading;
use std::sync::Arc;

/// 一次读数事件
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadingEvent {
    pub channel: ChannelId,
    /// 读数完成时刻（相对传感器阵列启动，微秒）
    pub timestamp_us: u64,
    pub reading: Reading,
}

/// 读数回调
///
/// 在轮询线程上同步调用，实现必须非阻塞：
/// 禁止 I/O 和长时间持锁，推荐用 `crossbeam_channel::Sender::try_send` 转交给其他线程。
pub trait ReadingCallback: Send + Sync {
    fn on_reading(&self, event: &ReadingEvent);
}

/// 钩子管理器
///
/// 回调列表本身不是线程安全的，由外部通过 `RwLock<HookManager>` 同步。
#[derive(Default)]
pub struct HookManager {
    callbacks: Vec<Arc<dyn ReadingCallback>>,
}

impl HookManager {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    pub fn add_callback(&mut self, callback: Arc<dyn ReadingCallback>) {
        self.callbacks.push(callback);
    }

    /// 移除所有回调
    pub fn clear(&mut self) {
        self.callbacks.clear();
    }

    /// 触发所有回调（在轮询线程中调用）
    pub fn trigger_all(&self, event: &ReadingEvent) {
        for callback in self.callbacks.iter() {
            callback.on_reading(event);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}
