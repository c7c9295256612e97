//! 模拟时序源（无硬件依赖）
//!
//! - [`FixedPulse`]: 每次返回固定的回波时长
//! - [`SilentEcho`]: 永远收不到回波
//! - [`ScriptedEcho`]: 按脚本逐次返回距离，`None` 表示无回波
//! - [`SimulatedEcho`]: 距离由外部通过 [`DistanceHandle`] 实时设置，可叠加随机抖动
//!
//! 收不到回波时，模拟源会真实地等满超时预算再返回，与硬件行为一致；
//! 收到回波时立即返回，不模拟飞行时间。

use crate::error::{EchoTimeout, SonarError};
use crate::timing::{Level, TimingSource, distance_to_pulse};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// 模拟一次回波：上升沿立即到达，高电平持续 `pending`
fn simulated_edge(
    pending: &mut Option<Duration>,
    level: Level,
    timeout: Duration,
) -> Result<Duration, EchoTimeout> {
    match (level, *pending) {
        (Level::High, Some(_)) => Ok(Duration::ZERO),
        (Level::Low, Some(pulse)) if pulse <= timeout => {
            *pending = None;
            Ok(pulse)
        },
        _ => {
            *pending = None;
            spin_sleep::sleep(timeout);
            Err(EchoTimeout)
        },
    }
}

/// 固定回波时长
#[derive(Debug, Clone)]
pub struct FixedPulse {
    pulse: Duration,
    pending: Option<Duration>,
}

impl FixedPulse {
    pub fn new(pulse: Duration) -> Self {
        Self {
            pulse,
            pending: None,
        }
    }
}

impl TimingSource for FixedPulse {
    fn trigger(&mut self) -> Result<(), SonarError> {
        self.pending = Some(self.pulse);
        Ok(())
    }

    fn wait_for_edge(&mut self, level: Level, timeout: Duration) -> Result<Duration, EchoTimeout> {
        simulated_edge(&mut self.pending, level, timeout)
    }

    fn name(&self) -> &'static str {
        "fixed-pulse"
    }
}

/// 永远收不到回波
#[derive(Debug, Clone, Default)]
pub struct SilentEcho;

impl TimingSource for SilentEcho {
    fn trigger(&mut self) -> Result<(), SonarError> {
        Ok(())
    }

    fn wait_for_edge(&mut self, level: Level, timeout: Duration) -> Result<Duration, EchoTimeout> {
        simulated_edge(&mut None, level, timeout)
    }

    fn name(&self) -> &'static str {
        "silent"
    }
}

/// 脚本化回波
///
/// 每次触发消费脚本中的一项；脚本耗尽后重复最后一项。
#[derive(Debug, Clone)]
pub struct ScriptedEcho {
    script: VecDeque<Option<f64>>,
    last: Option<f64>,
    pending: Option<Duration>,
    triggers: u64,
}

impl ScriptedEcho {
    /// `None` 项表示该次测量无回波
    pub fn new(script: impl IntoIterator<Item = Option<f64>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            last: None,
            pending: None,
            triggers: 0,
        }
    }

    /// 全部是有效回波的脚本
    pub fn from_distances(distances: impl IntoIterator<Item = f64>) -> Self {
        Self::new(distances.into_iter().map(Some))
    }

    /// 已触发次数
    pub fn trigger_count(&self) -> u64 {
        self.triggers
    }
}

impl TimingSource for ScriptedEcho {
    fn trigger(&mut self) -> Result<(), SonarError> {
        self.triggers += 1;
        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }
        self.pending = self.last.map(distance_to_pulse);
        Ok(())
    }

    fn wait_for_edge(&mut self, level: Level, timeout: Duration) -> Result<Duration, EchoTimeout> {
        simulated_edge(&mut self.pending, level, timeout)
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// 模拟距离的共享句柄
///
/// 写入 NaN 表示障碍物超出量程（无回波）。
#[derive(Debug, Clone)]
pub struct DistanceHandle(Arc<AtomicU64>);

impl DistanceHandle {
    pub fn new(distance_cm: f64) -> Self {
        Self(Arc::new(AtomicU64::new(distance_cm.to_bits())))
    }

    pub fn set(&self, distance_cm: f64) {
        self.0.store(distance_cm.to_bits(), Ordering::Relaxed);
    }

    /// 模拟无回波
    pub fn set_silent(&self) {
        self.set(f64::NAN);
    }

    pub fn get(&self) -> Option<f64> {
        let d = f64::from_bits(self.0.load(Ordering::Relaxed));
        if d.is_nan() { None } else { Some(d) }
    }
}

/// 外部驱动的模拟回波
///
/// 用于仿真：控制线程通过 [`DistanceHandle`] 改变障碍物距离，
/// 轮询线程持有 `SimulatedEcho` 进行测量。
#[derive(Debug)]
pub struct SimulatedEcho {
    distance: DistanceHandle,
    jitter_cm: f64,
    rng: StdRng,
    pending: Option<Duration>,
}

impl SimulatedEcho {
    pub fn new(distance: DistanceHandle) -> Self {
        Self {
            distance,
            jitter_cm: 0.0,
            rng: StdRng::seed_from_u64(0),
            pending: None,
        }
    }

    /// 在每次测量上叠加 `[-jitter_cm, jitter_cm]` 的均匀噪声
    pub fn with_jitter(mut self, jitter_cm: f64, seed: u64) -> Self {
        self.jitter_cm = jitter_cm.abs();
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn handle(&self) -> DistanceHandle {
        self.distance.clone()
    }
}

impl TimingSource for SimulatedEcho {
    fn trigger(&mut self) -> Result<(), SonarError> {
        self.pending = self.distance.get().map(|d| {
            let noise = if self.jitter_cm > 0.0 {
                self.rng.gen_range(-self.jitter_cm..=self.jitter_cm)
            } else {
                0.0
            };
            distance_to_pulse(d + noise)
        });
        Ok(())
    }

    fn wait_for_edge(&mut self, level: Level, timeout: Duration) -> Result<Duration, EchoTimeout> {
        simulated_edge(&mut self.pending, level, timeout)
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}
