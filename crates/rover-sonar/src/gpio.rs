//! Raspberry Pi GPIO 后端（rppal）
//!
//! 触发引脚输出高电平 `trigger_pulse`（默认 10µs）后拉低，
//! 回波引脚的高电平时长即声波往返时间。引脚编号为 BCM 编号。

use crate::error::{EchoTimeout, SonarError};
use crate::timing::{Level, TimingSource, poll_until};
use rppal::gpio::{Gpio, InputPin, OutputPin};
use std::time::Duration;
use tracing::debug;

/// 默认触发脉冲宽度
pub const DEFAULT_TRIGGER_PULSE: Duration = Duration::from_micros(10);

/// GPIO 超声波时序源
pub struct GpioSonar {
    trigger: OutputPin,
    echo: InputPin,
    trigger_pulse: Duration,
}

impl GpioSonar {
    /// 占用触发/回波引脚
    ///
    /// # 错误
    /// - `SonarError::Gpio`: GPIO 不可用或引脚已被占用
    pub fn new(trigger_pin: u8, echo_pin: u8, trigger_pulse: Duration) -> Result<Self, SonarError> {
        let gpio = Gpio::new()?;
        let mut trigger = gpio.get(trigger_pin)?.into_output();
        trigger.set_low();
        let echo = gpio.get(echo_pin)?.into_input();
        debug!(
            "GPIO sonar ready (trigger={}, echo={}, pulse={:?})",
            trigger_pin, echo_pin, trigger_pulse
        );
        Ok(Self {
            trigger,
            echo,
            trigger_pulse,
        })
    }
}

impl TimingSource for GpioSonar {
    fn trigger(&mut self) -> Result<(), SonarError> {
        self.trigger.set_high();
        spin_sleep::sleep(self.trigger_pulse);
        self.trigger.set_low();
        Ok(())
    }

    fn wait_for_edge(&mut self, level: Level, timeout: Duration) -> Result<Duration, EchoTimeout> {
        let echo = &self.echo;
        match level {
            Level::High => poll_until(timeout, || echo.is_high()),
            Level::Low => poll_until(timeout, || echo.is_low()),
        }
    }

    fn name(&self) -> &'static str {
        "gpio"
    }
}
