//! 控制周期协调
//!
//! 每个控制周期：读取三路最新距离 -> 趋势检测 -> 未停车时做模糊转向修正 -> 发布输出。
//! 输出通过 `ArcSwap` 发布，执行器线程可以无锁读取最近一次的结果。

use crate::action::Action;
use crate::config::AvoidanceConfig;
use crate::error::ControlError;
use crate::trend::TrendDetector;
use arc_swap::ArcSwap;
use rover_driver::{ChannelDistances, SensorArray};
use rover_fuzzy::{FuzzySteering, Sample};
use rover_sonar::DEFAULT_SENTINEL_CM;
use std::sync::Arc;
use tracing::{info, trace, warn};

/// 一个控制周期的输出
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleOutput {
    /// 周期序号（从 1 开始，0 表示尚未运行）
    pub tick: u64,
    pub action: Action,
    /// 转向角 `[-1, 1]`；停车周期为未修正的输入角
    pub angle: f64,
    /// 本周期是否经过模糊修正
    pub corrected: bool,
    /// 本周期使用的距离
    pub distances: ChannelDistances,
}

impl Default for CycleOutput {
    fn default() -> Self {
        Self {
            tick: 0,
            action: Action::Forward,
            angle: 0.0,
            corrected: false,
            distances: ChannelDistances::uniform(DEFAULT_SENTINEL_CM),
        }
    }
}

/// 控制周期协调器
///
/// 通道映射：front_left -> left，front -> center，front_right -> right。
pub struct CycleCoordinator {
    steering: FuzzySteering,
    trend: TrendDetector,
    output: Arc<ArcSwap<CycleOutput>>,
    ticks: u64,
    rejected: u64,
}

impl CycleCoordinator {
    pub fn new(steering: FuzzySteering, trend: TrendDetector) -> Self {
        Self {
            steering,
            trend,
            output: Arc::new(ArcSwap::from_pointee(CycleOutput::default())),
            ticks: 0,
            rejected: 0,
        }
    }

    /// 标准规则库 + 配置中的趋势参数
    pub fn from_config(config: &AvoidanceConfig) -> Result<Self, ControlError> {
        Ok(Self::new(
            FuzzySteering::new()?,
            TrendDetector::new(config.trend_config()),
        ))
    }

    /// 执行一个控制周期
    ///
    /// 输入先整体校验，再做趋势检测；趋势判定为 `Stop` 时不做转向修正。
    ///
    /// # 错误
    /// - `ControlError::Fuzzy`: 输入越界；本周期不发布，趋势窗口不更新，
    ///   上一次的输出保持不变
    pub fn tick(
        &mut self,
        angle: f64,
        distances: &ChannelDistances,
    ) -> Result<CycleOutput, ControlError> {
        self.ticks += 1;
        let tick = self.ticks;
        let previous = self.latest();

        let sample = Sample::new(
            angle,
            distances.front_left,
            distances.front,
            distances.front_right,
        );
        if let Err(e) = sample.check() {
            self.rejected += 1;
            warn!("Cycle {}: {}, keeping previous output", tick, e);
            return Err(e.into());
        }

        let action = self.trend.observe_cycle(distances);
        let (angle, corrected) = if action.allows_steering() {
            let corrected =
                self.steering
                    .correct(sample.angle, sample.left, sample.center, sample.right);
            (corrected, true)
        } else {
            (sample.angle, false)
        };
        let output = CycleOutput {
            tick,
            action,
            angle,
            corrected,
            distances: *distances,
        };

        if output.action != previous.action {
            info!(
                "Cycle {}: action {} -> {} (front={:.1}, front_left={:.1}, front_right={:.1})",
                tick,
                previous.action,
                output.action,
                distances.front,
                distances.front_left,
                distances.front_right
            );
        }
        trace!("Cycle {}: {} angle {:.4}", tick, output.action, output.angle);

        self.output.store(Arc::new(output));
        Ok(output)
    }

    /// 从传感器阵列读取最新距离并执行一个控制周期
    pub fn tick_from(
        &mut self,
        angle: f64,
        sensors: &SensorArray,
    ) -> Result<CycleOutput, ControlError> {
        let distances = sensors.distances();
        self.tick(angle, &distances)
    }

    /// 最近发布的输出（无锁）
    pub fn latest(&self) -> CycleOutput {
        **self.output.load()
    }

    /// 输出的共享句柄（交给执行器线程）
    pub fn output_handle(&self) -> Arc<ArcSwap<CycleOutput>> {
        self.output.clone()
    }

    pub fn steering(&self) -> &FuzzySteering {
        &self.steering
    }

    pub fn trend(&self) -> &TrendDetector {
        &self.trend
    }

    /// 已执行的周期数
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// 因输入越界被拒绝的周期数
    pub fn rejected(&self) -> u64 {
        self.rejected
    }
}
