//! 驱动层错误类型定义

use crate::channel::ChannelId;
use rover_sonar::SonarError;
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 测距层错误（后端初始化失败等）
    #[error("Sonar error: {0}")]
    Sonar(#[from] SonarError),

    /// 构建传感器阵列时缺少通道
    #[error("Missing sonar channel: {0}")]
    MissingChannel(ChannelId),

    /// 同一通道配置了多次
    #[error("Duplicate sonar channel: {0}")]
    DuplicateChannel(ChannelId),

    /// 轮询线程创建失败
    #[error("Failed to spawn polling thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// 轮询线程错误（panic 或未能在超时内退出）
    #[error("IO thread error: {0}")]
    IoThread(String),

    /// 锁被毒化（线程 panic）
    #[error("Poisoned lock (thread panic)")]
    PoisonedLock,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_error_display() {
        let err = DriverError::MissingChannel(ChannelId::FrontLeft);
        assert_eq!(format!("{}", err), "Missing sonar channel: front_left");

        let err = DriverError::IoThread("sonar-front did not exit".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("IO thread") && msg.contains("sonar-front"));

        let err = DriverError::PoisonedLock;
        assert!(format!("{}", err).contains("Poisoned lock"));
    }

    #[test]
    fn test_from_sonar_error() {
        let err: DriverError = SonarError::InvalidConfig("window".into()).into();
        match err {
            DriverError::Sonar(SonarError::InvalidConfig(msg)) => assert_eq!(msg, "window"),
            other => panic!("Expected Sonar variant, got {:?}", other),
        }
    }
}
