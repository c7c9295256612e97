//! sonar 命令
//!
//! 单通道测距：按配置中的引脚和轮询间隔持续测量并逐条输出，直到 Ctrl-C。
//! 启用 `rppal` feature 时使用 GPIO，否则使用固定距离的模拟回波。

use anyhow::Result;
use clap::Args;
use crossbeam_channel::RecvTimeoutError;
use rover_sdk::AvoidanceConfig;
use rover_sdk::driver::{AsyncRecordingHook, ChannelId, ReadingCallback};
use rover_sdk::start_sensor_array;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::warn;

/// 单通道测距参数
#[derive(Args, Debug)]
pub struct SonarCommand {
    /// 通道（front / front_left / front_right）
    pub channel: ChannelId,

    /// 读数条数（0 表示直到 Ctrl-C）
    #[arg(short = 'n', long, default_value_t = 0)]
    pub count: u64,

    /// 模拟回波的障碍物距离（cm，未启用 GPIO 时使用）
    #[arg(long, default_value_t = 100.0)]
    pub distance: f64,

    /// 模拟回波的噪声幅度（cm）
    #[arg(long, default_value_t = 0.0)]
    pub jitter: f64,
}

impl SonarCommand {
    pub fn execute(&self, config: &AvoidanceConfig) -> Result<()> {
        let running = Arc::new(AtomicBool::new(true));
        let r = running.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            r.store(false, Ordering::SeqCst);
            eprintln!("\n收到退出信号，正在关闭...");
        }) {
            warn!("Failed to install Ctrl-C handler: {}", e);
        }

        let (hook, rx) = AsyncRecordingHook::new();
        let hooks = [Arc::new(hook) as Arc<dyn ReadingCallback>];
        let channels = [self.channel];

        #[cfg(feature = "rppal")]
        let array = start_sensor_array(config, &channels, rover_sdk::gpio_sources(config), &hooks)?;

        #[cfg(not(feature = "rppal"))]
        let array = {
            use rover_sdk::sonar::mock::{DistanceHandle, SimulatedEcho};
            let distance = DistanceHandle::new(self.distance);
            let jitter = self.jitter;
            start_sensor_array(
                config,
                &channels,
                move |_, _| Ok(SimulatedEcho::new(distance.clone()).with_jitter(jitter, 1)),
                &hooks,
            )?
        };
        drop(hooks);

        let pins = config.channels.get(self.channel);
        eprintln!(
            "📡 {} (trigger={}, echo={}, poll {}ms)，按 Ctrl-C 停止",
            self.channel, pins.trigger_pin, pins.echo_pin, pins.poll_delay_ms
        );
        println!("timestamp_us,channel,raw_cm,smoothed_cm,timed_out");

        let mut received = 0;
        while running.load(Ordering::SeqCst) {
            match rx.recv_timeout(Duration::from_millis(100)) {
                Ok(record) => {
                    println!(
                        "{},{},{:.2},{:.2},{}",
                        record.timestamp_us,
                        record.channel,
                        record.raw_cm,
                        record.smoothed_cm,
                        record.timed_out
                    );
                    received += 1;
                    if self.count > 0 && received >= self.count {
                        break;
                    }
                },
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        array.shutdown()?;
        Ok(())
    }
}
