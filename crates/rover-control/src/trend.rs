//! 障碍物趋势检测
//!
//! 每个通道保留最近 `window` 个距离。最新距离进入近距离阈值，
//! 且窗口内没有任何一对相邻读数是"前小后大"（距离在增加）时，该通道判为 `Stop`。
//! 三个通道的判定取 OR。最新距离为负，或窗口内有非有限值时，该通道判为 `Forward`。
//!
//! 判定每周期从窗口重新计算，不锁存：窗口里出现一次距离增加就会立即恢复 `Forward`。

use crate::action::Action;
use rover_driver::{ChannelDistances, ChannelId};
use rover_sonar::RingWindow;
use tracing::debug;

/// 趋势检测配置
#[derive(Debug, Clone, PartialEq)]
pub struct TrendConfig {
    /// 近距离阈值（cm，含）
    pub near_threshold_cm: f64,
    /// 历史窗口长度
    pub window: usize,
    /// 历史窗口的预填充距离（cm）
    pub initial_distance_cm: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            near_threshold_cm: 50.0,
            window: 5,
            initial_distance_cm: 10_000.0,
        }
    }
}

/// 障碍物趋势检测器
#[derive(Debug, Clone)]
pub struct TrendDetector {
    config: TrendConfig,
    histories: [RingWindow; 3],
}

impl Default for TrendDetector {
    fn default() -> Self {
        Self::new(TrendConfig::default())
    }
}

impl TrendDetector {
    /// 创建检测器，各通道窗口以 `initial_distance_cm` 填满
    pub fn new(config: TrendConfig) -> Self {
        let fill = || RingWindow::filled(config.window, config.initial_distance_cm);
        Self {
            histories: [fill(), fill(), fill()],
            config,
        }
    }

    pub fn config(&self) -> &TrendConfig {
        &self.config
    }

    /// 记录单个通道的最新距离，返回该通道的判定
    pub fn observe(&mut self, channel: ChannelId, latest_cm: f64) -> Action {
        self.histories[channel.index()].push(latest_cm);
        self.verdict(channel)
    }

    /// 记录三个通道的本周期距离，返回合并后的动作
    ///
    /// 先写入全部三个通道，再按 front、front_left、front_right 的顺序判定。
    pub fn observe_cycle(&mut self, distances: &ChannelDistances) -> Action {
        for (channel, distance) in distances.iter() {
            self.histories[channel.index()].push(distance);
        }

        let stop = ChannelId::ALL
            .into_iter()
            .find(|&c| self.verdict(c) == Action::Stop);
        match stop {
            Some(channel) => {
                debug!(
                    "Trend stop on {} (latest={:?})",
                    channel,
                    self.histories[channel.index()].latest()
                );
                Action::Stop
            },
            None => Action::Forward,
        }
    }

    /// 按当前窗口计算单个通道的判定（不写入新数据）
    pub fn verdict(&self, channel: ChannelId) -> Action {
        let history = &self.histories[channel.index()];
        let Some(latest) = history.latest() else {
            return Action::Forward;
        };

        // 负数视为传感器错误；NaN 两个比较都不成立
        if !(latest >= 0.0 && latest <= self.config.near_threshold_cm) {
            return Action::Forward;
        }

        let mut previous = None;
        for value in history.iter() {
            // 窗口内的非有限值同样视为传感器错误，趋势无从判断
            if !value.is_finite() {
                return Action::Forward;
            }
            if let Some(prev) = previous
                && prev < value
            {
                return Action::Forward;
            }
            previous = Some(value);
        }
        Action::Stop
    }

    /// 某通道的历史窗口（旧 -> 新）
    pub fn history(&self, channel: ChannelId) -> &RingWindow {
        &self.histories[channel.index()]
    }

    /// 恢复为预填充状态
    pub fn reset(&mut self) {
        for history in self.histories.iter_mut() {
            *history = RingWindow::filled(self.config.window, self.config.initial_distance_cm);
        }
    }
}
