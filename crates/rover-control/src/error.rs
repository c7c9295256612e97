//! 控制层错误类型

use rover_driver::DriverError;
use rover_fuzzy::FuzzyError;
use thiserror::Error;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// 控制周期错误
#[derive(Error, Debug)]
pub enum ControlError {
    #[error("Fuzzy steering error: {0}")]
    Fuzzy(#[from] FuzzyError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),
}
