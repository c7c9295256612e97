//! 测距层错误类型定义

use thiserror::Error;

/// 回波等待超时
///
/// 由 [`TimingSource::wait_for_edge`](crate::TimingSource::wait_for_edge) 返回。
/// 超时是常见情况，估计器在内部吸收，不向上传播。
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Echo timeout")]
pub struct EchoTimeout;

/// 测距层统一错误类型
#[derive(Error, Debug)]
pub enum SonarError {
    /// GPIO 访问失败（引脚占用、权限不足等）
    #[error("GPIO Error: {0}")]
    Gpio(String),
    /// 单次测量未收到回波
    #[error("Echo timeout")]
    Timeout,
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl From<EchoTimeout> for SonarError {
    fn from(_: EchoTimeout) -> Self {
        SonarError::Timeout
    }
}

#[cfg(feature = "rppal")]
impl From<rppal::gpio::Error> for SonarError {
    fn from(e: rppal::gpio::Error) -> Self {
        SonarError::Gpio(e.to_string())
    }
}
