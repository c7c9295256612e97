//! simulate 命令
//!
//! 用模拟回波驱动三路轮询线程，按配置的控制周期运行完整的规避循环。
//! 每个周期输出一行 CSV：`tick,action,angle,front,front_left,front_right`。

use crate::utils;
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use crossbeam_channel::Receiver;
use rover_sdk::control::CycleCoordinator;
use rover_sdk::driver::{AsyncRecordingHook, ChannelId, ReadingCallback, RecordedReading};
use rover_sdk::sonar::mock::{DistanceHandle, SimulatedEcho};
use rover_sdk::start_sensor_array;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use tracing::warn;

/// 障碍物场景
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scenario {
    /// 三路空旷
    Clear,
    /// 正前方障碍物逐渐接近
    Approach,
    /// 左前方障碍物接近后保持
    Left,
    /// 右前方障碍物接近后保持
    Right,
    /// 右前方在第 10 个周期后失去回波
    Lost,
}

impl Scenario {
    /// 第 `tick` 个周期的三路距离（front, front_left, front_right），`None` 表示无回波
    fn distances(self, tick: u64) -> [Option<f64>; 3] {
        let closing = |from: f64, to: f64, step: f64| (from - step * tick as f64).max(to);
        match self {
            Scenario::Clear => [Some(200.0); 3],
            Scenario::Approach => [Some(closing(200.0, 20.0, 4.0)), Some(150.0), Some(150.0)],
            Scenario::Left => [Some(120.0), Some(closing(140.0, 25.0, 5.0)), Some(140.0)],
            Scenario::Right => [Some(120.0), Some(140.0), Some(closing(140.0, 25.0, 5.0))],
            Scenario::Lost => [
                Some(120.0),
                Some(100.0),
                if tick < 10 { Some(90.0) } else { None },
            ],
        }
    }

    fn apply(self, tick: u64, handles: &[DistanceHandle; 3]) {
        for (handle, distance) in handles.iter().zip(self.distances(tick)) {
            match distance {
                Some(d) => handle.set(d),
                None => handle.set_silent(),
            }
        }
    }
}

/// 仿真参数
#[derive(Args, Debug)]
pub struct SimulateCommand {
    /// 障碍物场景
    #[arg(short, long, value_enum, default_value_t = Scenario::Approach)]
    pub scenario: Scenario,

    /// 运行的控制周期数
    #[arg(short, long, default_value_t = 100)]
    pub ticks: u64,

    /// 测距噪声幅度（cm）
    #[arg(long, default_value_t = 0.0)]
    pub jitter: f64,

    /// 噪声随机种子
    #[arg(long, default_value_t = 7)]
    pub seed: u64,

    /// 把每条读数录制到 CSV
    #[arg(short, long)]
    pub record: Option<PathBuf>,
}

/// 录制文件的一行
#[derive(Serialize)]
struct ReadingRow {
    timestamp_us: u64,
    channel: &'static str,
    raw_cm: f64,
    smoothed_cm: f64,
    timed_out: bool,
}

impl From<&RecordedReading> for ReadingRow {
    fn from(r: &RecordedReading) -> Self {
        Self {
            timestamp_us: r.timestamp_us,
            channel: r.channel.name(),
            raw_cm: r.raw_cm,
            smoothed_cm: r.smoothed_cm,
            timed_out: r.timed_out,
        }
    }
}

/// 录制线程：接收端关闭（所有钩子被释放）后写完并返回行数
fn spawn_writer(path: &Path, rx: Receiver<RecordedReading>) -> Result<JoinHandle<Result<u64>>> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("创建录制文件失败: {}", path.display()))?;
    let handle = thread::Builder::new()
        .name("recorder".into())
        .spawn(move || {
            let mut count = 0;
            for record in rx.iter() {
                writer.serialize(ReadingRow::from(&record))?;
                count += 1;
            }
            writer.flush()?;
            Ok(count)
        })
        .context("创建录制线程失败")?;
    Ok(handle)
}

impl SimulateCommand {
    pub async fn execute(&self, config_path: Option<&Path>) -> Result<()> {
        let config = utils::load_config(config_path)?;

        let start = self.scenario.distances(0);
        let handles: [DistanceHandle; 3] =
            std::array::from_fn(|i| DistanceHandle::new(start[i].unwrap_or(f64::NAN)));

        let mut hooks: Vec<Arc<dyn ReadingCallback>> = Vec::new();
        let mut recording = None;
        if let Some(path) = &self.record {
            let (hook, rx) = AsyncRecordingHook::new();
            let dropped = hook.dropped_readings().clone();
            hooks.push(Arc::new(hook));
            recording = Some((path.clone(), spawn_writer(path, rx)?, dropped));
        }

        let jitter = self.jitter;
        let seed = self.seed;
        let array = start_sensor_array(
            &config,
            &ChannelId::ALL,
            |channel, _| {
                Ok(SimulatedEcho::new(handles[channel.index()].clone())
                    .with_jitter(jitter, seed.wrapping_add(channel.index() as u64)))
            },
            &hooks,
        )?;
        drop(hooks);

        let mut coordinator = CycleCoordinator::from_config(&config)?;

        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!();
                eprintln!("🛑 收到停止信号，正在停止仿真...");
                running_clone.store(false, Ordering::SeqCst);
            }
        });

        eprintln!(
            "💡 场景 {:?}，{} 个周期，周期 {:?}",
            self.scenario,
            self.ticks,
            config.tick()
        );
        println!("tick,action,angle,front,front_left,front_right");

        let mut interval = tokio::time::interval(config.tick());
        let mut angle = 0.0;
        for tick in 0..self.ticks {
            interval.tick().await;
            if !running.load(Ordering::SeqCst) {
                break;
            }

            self.scenario.apply(tick, &handles);
            match coordinator.tick_from(angle, &array) {
                Ok(output) => {
                    // 停车周期不改变舵角
                    if output.corrected {
                        angle = output.angle;
                    }
                    println!(
                        "{},{},{:.4},{:.1},{:.1},{:.1}",
                        output.tick,
                        output.action,
                        output.angle,
                        output.distances.front,
                        output.distances.front_left,
                        output.distances.front_right
                    );
                },
                Err(e) => warn!("Cycle skipped: {}", e),
            }
        }

        let metrics: Vec<_> = ChannelId::ALL
            .iter()
            .map(|&c| (c, array.metrics(c)))
            .collect();

        // 停止轮询线程（阻塞 join）
        tokio::task::spawn_blocking(move || array.shutdown()).await??;

        for (channel, m) in metrics {
            eprintln!(
                "   {:<11} 读数 {}，超时 {} ({:.1}%)",
                channel,
                m.measurements,
                m.echo_timeouts,
                m.timeout_rate()
            );
        }

        if let Some((path, writer, dropped)) = recording {
            let count = writer
                .join()
                .map_err(|_| anyhow::anyhow!("录制线程异常退出"))??;
            eprintln!(
                "✅ 已录制 {} 条读数到 {}（丢弃 {}）",
                count,
                path.display(),
                dropped.load(Ordering::Relaxed)
            );
        }
        Ok(())
    }
}
