//! 传感器阵列
//!
//! 对外的 [`SensorArray`]：持有各通道轮询线程，提供最新距离的无锁读取。
//! Drop 时置停止标志并等待线程退出。

use crate::channel::{ChannelDistances, ChannelId};
use crate::error::DriverError;
use crate::hooks::ReadingCallback;
use crate::metrics::MetricsSnapshot;
use crate::pipeline::SensorContext;
use crossbeam_channel::{RecvTimeoutError, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{JoinHandle, spawn};
use std::time::Duration;
use tracing::{error, info};

/// 等待轮询线程退出的超时
///
/// 单次读数的最坏耗时（默认 3 次尝试 × 2 个边沿 × 40ms）远小于此值。
pub const JOIN_TIMEOUT: Duration = Duration::from_secs(2);

/// 带超时的线程 join
trait JoinTimeout {
    fn join_timeout(self, timeout: Duration) -> Result<(), DriverError>;
}

impl<T: Send + 'static> JoinTimeout for JoinHandle<T> {
    fn join_timeout(self, timeout: Duration) -> Result<(), DriverError> {
        let name = self.thread().name().unwrap_or("sonar").to_string();
        let (tx, rx) = bounded(1);

        // 看门狗线程代为 join，主线程只等待信号
        spawn(move || {
            let panicked = self.join().is_err();
            let _ = tx.send(panicked);
        });

        match rx.recv_timeout(timeout) {
            Ok(false) => Ok(()),
            Ok(true) => Err(DriverError::IoThread(format!("{} panicked", name))),
            // 超时后看门狗继续等待，进程退出时由 OS 回收
            Err(RecvTimeoutError::Timeout) => Err(DriverError::IoThread(format!(
                "{} did not exit within {:?}",
                name, timeout
            ))),
            Err(RecvTimeoutError::Disconnected) => {
                Err(DriverError::IoThread(format!("{} watchdog lost", name)))
            },
        }
    }
}

/// 轮询线程的启动闭包（由 Builder 生成，捕获具体的估计器类型）
pub(crate) type Launcher =
    Box<dyn FnOnce(Arc<SensorContext>, Arc<AtomicBool>) -> std::io::Result<JoinHandle<()>> + Send>;

/// 超声波传感器阵列
///
/// 每个通道一个轮询线程，控制周期通过 [`distances`](Self::distances)
/// 读取各通道最近发布的平滑距离。
pub struct SensorArray {
    ctx: Arc<SensorContext>,
    threads: Vec<(ChannelId, JoinHandle<()>)>,
    /// 运行标志（用于线程生命周期联动）
    is_running: Arc<AtomicBool>,
}

impl SensorArray {
    /// 启动各通道的轮询线程（内部方法，由 Builder 调用）
    ///
    /// 某个线程创建失败时，已启动的线程随返回的错误一起被停止。
    pub(crate) fn start(
        ctx: Arc<SensorContext>,
        launchers: Vec<(ChannelId, Launcher)>,
    ) -> Result<Self, DriverError> {
        let mut array = Self {
            ctx,
            threads: Vec::with_capacity(launchers.len()),
            is_running: Arc::new(AtomicBool::new(true)),
        };

        for (channel, launch) in launchers {
            let handle = launch(array.ctx.clone(), array.is_running.clone())
                .map_err(DriverError::Spawn)?;
            array.threads.push((channel, handle));
        }

        info!(
            "Sensor array started with {} channel(s)",
            array.threads.len()
        );
        Ok(array)
    }

    /// 已启动的通道（按构建顺序）
    pub fn channels(&self) -> Vec<ChannelId> {
        self.threads.iter().map(|(c, _)| *c).collect()
    }

    /// 某通道最近发布的平滑距离（cm）
    pub fn latest(&self, channel: ChannelId) -> f64 {
        self.ctx.register(channel).load()
    }

    /// 三路最新距离（未启动的通道为初始值）
    pub fn distances(&self) -> ChannelDistances {
        self.ctx.distances()
    }

    /// 某通道的指标快照
    pub fn metrics(&self, channel: ChannelId) -> MetricsSnapshot {
        self.ctx.metrics(channel).snapshot()
    }

    /// 运行中注册读数钩子
    pub fn add_hook(&self, callback: Arc<dyn ReadingCallback>) -> Result<(), DriverError> {
        let mut hooks = self.ctx.hooks.write().map_err(|_| DriverError::PoisonedLock)?;
        hooks.add_callback(callback);
        Ok(())
    }

    pub fn context(&self) -> &Arc<SensorContext> {
        &self.ctx
    }

    /// 运行标志为 true 且所有轮询线程都还活着
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Acquire)
            && self.threads.iter().all(|(_, h)| !h.is_finished())
    }

    /// 停止并等待所有轮询线程退出
    ///
    /// 返回第一个未能按时退出（或 panic）的线程错误。
    pub fn shutdown(mut self) -> Result<(), DriverError> {
        self.stop_and_join()
    }

    fn stop_and_join(&mut self) -> Result<(), DriverError> {
        // Release: 之前的所有写入对看到 false 的线程可见
        self.is_running.store(false, Ordering::Release);

        let mut first_err = None;
        for (channel, handle) in self.threads.drain(..) {
            if let Err(e) = handle.join_timeout(JOIN_TIMEOUT) {
                error!(
                    "Sonar {} thread panicked or failed to shut down within {:?}: {}",
                    channel, JOIN_TIMEOUT, e
                );
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

impl Drop for SensorArray {
    fn drop(&mut self) {
        // 错误已在 stop_and_join 中记录
        let _ = self.stop_and_join();
    }
}
