//! 规避系统配置
//!
//! TOML 文件，各节缺省字段取默认值：
//!
//! ```toml
//! [sonar]
//! sentinel_cm = 800.0
//! echo_timeout_ms = 40
//!
//! [trend]
//! near_threshold_cm = 50.0
//!
//! [channels.front]
//! trigger_pin = 18
//! echo_pin = 24
//! poll_delay_ms = 60
//! ```

use crate::error::ConfigError;
use crate::trend::TrendConfig;
use rover_driver::{ChannelId, PollConfig};
use rover_sonar::EstimatorConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// BCM 编号上限（Raspberry Pi 40 针排针）
pub const MAX_BCM_PIN: u8 = 27;

/// 规避系统配置
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AvoidanceConfig {
    /// 测距
    pub sonar: SonarSettings,
    /// 趋势检测
    pub trend: TrendSettings,
    /// 控制周期
    pub control: ControlSettings,
    /// 各通道引脚和轮询间隔
    pub channels: ChannelSettings,
}

/// 测距设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SonarSettings {
    /// 哨兵距离（cm）
    pub sentinel_cm: f64,
    /// 每个边沿的等待预算（ms）
    pub echo_timeout_ms: u64,
    /// 平滑窗口长度
    pub smoothing_window: usize,
    /// 超时重试次数
    pub max_retries: u32,
    /// 触发脉冲宽度（µs）
    pub trigger_pulse_us: u64,
    /// 连续超时多少次后清空平滑窗口（0 表示从不）
    pub stale_after_timeouts: u32,
}

impl Default for SonarSettings {
    fn default() -> Self {
        let estimator = EstimatorConfig::default();
        Self {
            sentinel_cm: estimator.sentinel_cm,
            echo_timeout_ms: estimator.echo_timeout.as_millis() as u64,
            smoothing_window: estimator.smoothing_window,
            max_retries: estimator.max_retries,
            trigger_pulse_us: 10,
            stale_after_timeouts: estimator.stale_after_timeouts,
        }
    }
}

/// 趋势检测设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendSettings {
    /// 近距离阈值（cm，含）
    pub near_threshold_cm: f64,
    /// 历史窗口长度
    pub window: usize,
    /// 历史窗口预填充距离（cm）
    pub initial_distance_cm: f64,
}

impl Default for TrendSettings {
    fn default() -> Self {
        let trend = TrendConfig::default();
        Self {
            near_threshold_cm: trend.near_threshold_cm,
            window: trend.window,
            initial_distance_cm: trend.initial_distance_cm,
        }
    }
}

/// 控制周期设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSettings {
    /// 控制周期（ms）
    pub tick_ms: u64,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self { tick_ms: 50 }
    }
}

/// 三个通道的设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSettings {
    pub front: ChannelPins,
    pub front_left: ChannelPins,
    pub front_right: ChannelPins,
}

/// 通道引脚（BCM 编号）和轮询间隔
///
/// 写出通道表时必须给出两个引脚。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelPins {
    pub trigger_pin: u8,
    pub echo_pin: u8,
    #[serde(default = "default_poll_delay_ms")]
    pub poll_delay_ms: u64,
}

fn default_poll_delay_ms() -> u64 {
    PollConfig::default().poll_delay.as_millis() as u64
}

impl ChannelPins {
    pub fn new(trigger_pin: u8, echo_pin: u8) -> Self {
        Self {
            trigger_pin,
            echo_pin,
            poll_delay_ms: default_poll_delay_ms(),
        }
    }
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            front: ChannelPins::new(18, 24),
            front_left: ChannelPins::new(17, 27),
            front_right: ChannelPins::new(22, 23),
        }
    }
}

impl ChannelSettings {
    pub fn get(&self, channel: ChannelId) -> &ChannelPins {
        match channel {
            ChannelId::Front => &self.front,
            ChannelId::FrontLeft => &self.front_left,
            ChannelId::FrontRight => &self.front_right,
        }
    }
}

impl AvoidanceConfig {
    /// 从 TOML 文本解析并检查
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        debug!("Loaded config from {}", path.as_ref().display());
        Self::from_toml_str(&content)
    }

    /// 文件存在时加载，否则返回默认配置
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// 保存到文件（自动创建父目录）
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        self.validate()?;
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml_string()?)?;
        debug!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// 检查取值范围
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sonar = &self.sonar;
        if !(sonar.sentinel_cm.is_finite() && sonar.sentinel_cm > 0.0) {
            return Err(invalid(format!(
                "sonar.sentinel_cm must be > 0, got {}",
                sonar.sentinel_cm
            )));
        }
        if sonar.echo_timeout_ms == 0 {
            return Err(invalid("sonar.echo_timeout_ms must be > 0"));
        }
        if sonar.smoothing_window == 0 {
            return Err(invalid("sonar.smoothing_window must be >= 1"));
        }

        let trend = &self.trend;
        if !(trend.near_threshold_cm.is_finite() && trend.near_threshold_cm >= 0.0) {
            return Err(invalid(format!(
                "trend.near_threshold_cm must be >= 0, got {}",
                trend.near_threshold_cm
            )));
        }
        if trend.window == 0 {
            return Err(invalid("trend.window must be >= 1"));
        }
        if !trend.initial_distance_cm.is_finite() {
            return Err(invalid("trend.initial_distance_cm must be finite"));
        }

        if self.control.tick_ms == 0 {
            return Err(invalid("control.tick_ms must be > 0"));
        }

        let mut used: Vec<(u8, ChannelId)> = Vec::with_capacity(6);
        for channel in ChannelId::ALL {
            let pins = self.channels.get(channel);
            for pin in [pins.trigger_pin, pins.echo_pin] {
                if pin > MAX_BCM_PIN {
                    return Err(invalid(format!(
                        "channels.{}: pin {} is not a BCM header pin",
                        channel, pin
                    )));
                }
                if let Some((_, owner)) = used.iter().find(|(p, _)| *p == pin) {
                    return Err(invalid(format!(
                        "channels.{}: pin {} already used by {}",
                        channel, pin, owner
                    )));
                }
                used.push((pin, channel));
            }
        }
        Ok(())
    }

    /// 测距估计器配置
    pub fn estimator_config(&self) -> EstimatorConfig {
        EstimatorConfig {
            sentinel_cm: self.sonar.sentinel_cm,
            echo_timeout: Duration::from_millis(self.sonar.echo_timeout_ms),
            smoothing_window: self.sonar.smoothing_window,
            max_retries: self.sonar.max_retries,
            stale_after_timeouts: self.sonar.stale_after_timeouts,
        }
    }

    pub fn trigger_pulse(&self) -> Duration {
        Duration::from_micros(self.sonar.trigger_pulse_us)
    }

    /// 趋势检测配置
    pub fn trend_config(&self) -> TrendConfig {
        TrendConfig {
            near_threshold_cm: self.trend.near_threshold_cm,
            window: self.trend.window,
            initial_distance_cm: self.trend.initial_distance_cm,
        }
    }

    /// 某通道的轮询配置
    pub fn poll_config(&self, channel: ChannelId) -> PollConfig {
        PollConfig::with_poll_delay(Duration::from_millis(
            self.channels.get(channel).poll_delay_ms,
        ))
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.control.tick_ms)
    }

    /// 按点分路径读取一项（如 `trend.near_threshold_cm`）
    pub fn get_value(&self, key: &str) -> Result<toml::Value, ConfigError> {
        let root = toml::Value::try_from(self)?;
        let mut node = &root;
        for part in key.split('.') {
            node = node
                .get(part)
                .ok_or_else(|| invalid(format!("unknown config key '{}'", key)))?;
        }
        Ok(node.clone())
    }

    /// 按点分路径设置一项，`raw` 按 TOML 值解析（解析失败时视为字符串）
    ///
    /// 设置后整体重新检查，失败时配置保持不变。
    pub fn set_value(&mut self, key: &str, raw: &str) -> Result<(), ConfigError> {
        let mut root = toml::Value::try_from(&*self)?;
        let parts: Vec<&str> = key.split('.').collect();
        let (leaf, path) = parts
            .split_last()
            .ok_or_else(|| invalid("empty config key"))?;

        let mut node = &mut root;
        for part in path {
            node = node
                .get_mut(*part)
                .ok_or_else(|| invalid(format!("unknown config key '{}'", key)))?;
        }
        let table = node
            .as_table_mut()
            .ok_or_else(|| invalid(format!("unknown config key '{}'", key)))?;
        let current = table
            .get(*leaf)
            .ok_or_else(|| invalid(format!("unknown config key '{}'", key)))?;
        if current.is_table() {
            return Err(invalid(format!("'{}' is a section, not a value", key)));
        }

        let value = match (parse_value(raw), current) {
            (toml::Value::Integer(i), toml::Value::Float(_)) => toml::Value::Float(i as f64),
            (value, _) => value,
        };
        table.insert((*leaf).to_string(), value);

        let updated: Self = root.try_into()?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

fn parse_value(raw: &str) -> toml::Value {
    toml::from_str::<toml::Table>(&format!("value = {}", raw))
        .ok()
        .and_then(|mut t| t.remove("value"))
        .unwrap_or_else(|| toml::Value::String(raw.to_string()))
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = AvoidanceConfig::default();
        config.validate().unwrap();
        assert_eq!(config.estimator_config(), EstimatorConfig::default());
        assert_eq!(config.trend_config(), TrendConfig::default());
        assert_eq!(config.poll_config(ChannelId::Front), PollConfig::default());
        assert_eq!(config.tick(), Duration::from_millis(50));
        assert_eq!(config.trigger_pulse(), Duration::from_micros(10));
        assert_eq!(config.channels.front.trigger_pin, 18);
        assert_eq!(config.channels.front.echo_pin, 24);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = AvoidanceConfig::from_toml_str(
            r#"
[trend]
near_threshold_cm = 60.0

[channels.front_left]
trigger_pin = 5
echo_pin = 6
"#,
        )
        .unwrap();
        assert_eq!(config.trend.near_threshold_cm, 60.0);
        assert_eq!(config.trend.window, 5);
        assert_eq!(config.sonar, SonarSettings::default());
        assert_eq!(config.channels.front_left, ChannelPins::new(5, 6));
        // 未写出的通道保持默认
        assert_eq!(config.channels.front, ChannelPins::new(18, 24));
    }

    #[test]
    fn test_channel_table_requires_pins() {
        let err = AvoidanceConfig::from_toml_str("[channels.front]\npoll_delay_ms = 100\n");
        assert!(matches!(err, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AvoidanceConfig::default();
        config.trend.window = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = AvoidanceConfig::default();
        config.sonar.sentinel_cm = -1.0;
        assert!(config.validate().is_err());

        let mut config = AvoidanceConfig::default();
        config.sonar.echo_timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = AvoidanceConfig::default();
        config.trend.near_threshold_cm = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_shared_pins() {
        let mut config = AvoidanceConfig::default();
        config.channels.front_right.echo_pin = 18;
        let err = config.validate().unwrap_err();
        assert!(format!("{}", err).contains("already used by front"));

        let mut config = AvoidanceConfig::default();
        config.channels.front.trigger_pin = 40;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rover").join("avoidance.toml");

        let mut config = AvoidanceConfig::default();
        config.control.tick_ms = 100;
        config.channels.front.poll_delay_ms = 250;
        config.save(&path).unwrap();

        let loaded = AvoidanceConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(
            loaded.poll_config(ChannelId::Front).poll_delay,
            Duration::from_millis(250)
        );
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempdir().unwrap();
        let config = AvoidanceConfig::load_or_default(dir.path().join("none.toml")).unwrap();
        assert_eq!(config, AvoidanceConfig::default());
        assert!(matches!(
            AvoidanceConfig::load(dir.path().join("none.toml")),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_get_and_set_value() {
        let mut config = AvoidanceConfig::default();
        assert_eq!(
            config.get_value("trend.near_threshold_cm").unwrap(),
            toml::Value::Float(50.0)
        );

        // 整数写入浮点字段
        config.set_value("trend.near_threshold_cm", "60").unwrap();
        assert_eq!(config.trend.near_threshold_cm, 60.0);

        config.set_value("channels.front_left.poll_delay_ms", "120").unwrap();
        assert_eq!(config.channels.front_left.poll_delay_ms, 120);

        assert!(config.set_value("trend.nope", "1").is_err());
        assert!(config.set_value("trend", "1").is_err());
        assert!(config.get_value("sonar.nope").is_err());
    }

    #[test]
    fn test_set_value_keeps_config_on_failure() {
        let mut config = AvoidanceConfig::default();
        assert!(config.set_value("trend.window", "0").is_err());
        assert!(config.set_value("sonar.max_retries", "\"many\"").is_err());
        assert_eq!(config, AvoidanceConfig::default());
    }
}
