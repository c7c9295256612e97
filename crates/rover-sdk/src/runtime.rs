//! 按配置启动传感器阵列

use rover_control::{AvoidanceConfig, ChannelPins, ControlError};
use rover_driver::{ChannelId, DriverError, ReadingCallback, SensorArray, SensorArrayBuilder};
use rover_sonar::{DistanceEstimator, SonarError, TimingSource};
use std::sync::Arc;
use tracing::info;

/// 为 `channels` 中的每个通道创建时序源并启动轮询线程
///
/// 三个通道齐全时按完整阵列构建，否则按部分阵列构建（单通道调试）。
/// 寄存器初值为配置中的哨兵距离。
///
/// # 错误
/// - `ControlError::Driver`: 时序源创建失败、估计器配置非法、通道重复或线程创建失败
pub fn start_sensor_array<T, F>(
    config: &AvoidanceConfig,
    channels: &[ChannelId],
    mut make_source: F,
    hooks: &[Arc<dyn ReadingCallback>],
) -> Result<SensorArray, ControlError>
where
    T: TimingSource + 'static,
    F: FnMut(ChannelId, &ChannelPins) -> Result<T, SonarError>,
{
    let estimator_config = config.estimator_config();
    let mut builder = SensorArrayBuilder::new().initial_distance(config.sonar.sentinel_cm);

    for &channel in channels {
        let pins = config.channels.get(channel);
        let source = make_source(channel, pins).map_err(DriverError::from)?;
        info!(
            "Channel {}: backend={}, trigger_pin={}, echo_pin={}",
            channel,
            source.name(),
            pins.trigger_pin,
            pins.echo_pin
        );
        let estimator =
            DistanceEstimator::new(source, estimator_config.clone()).map_err(DriverError::from)?;
        builder = builder.channel(channel, estimator, config.poll_config(channel));
    }
    for hook in hooks {
        builder = builder.hook(hook.clone());
    }

    let complete = ChannelId::ALL.iter().all(|c| channels.contains(c));
    let array = if complete {
        builder.build()?
    } else {
        builder.build_partial()?
    };
    Ok(array)
}

/// GPIO 时序源工厂（按配置中的引脚和触发脉冲宽度）
#[cfg(feature = "rppal")]
pub fn gpio_sources(
    config: &AvoidanceConfig,
) -> impl FnMut(ChannelId, &ChannelPins) -> Result<rover_sonar::GpioSonar, SonarError> + use<> {
    let pulse = config.trigger_pulse();
    move |_, pins| rover_sonar::GpioSonar::new(pins.trigger_pin, pins.echo_pin, pulse)
}
