//! 配置文件定位

use anyhow::{Context, Result};
use rover_sdk::AvoidanceConfig;
use std::path::{Path, PathBuf};

/// 默认配置文件路径
pub fn default_config_path() -> Result<PathBuf> {
    let mut path = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("无法确定配置目录"))?;
    path.push("rover");
    path.push("avoidance.toml");
    Ok(path)
}

/// `--config` 优先，否则默认路径
pub fn config_path(override_path: Option<&Path>) -> Result<PathBuf> {
    match override_path {
        Some(path) => Ok(path.to_path_buf()),
        None => default_config_path(),
    }
}

/// 加载配置，文件不存在时返回默认配置
pub fn load_config(override_path: Option<&Path>) -> Result<AvoidanceConfig> {
    let path = config_path(override_path)?;
    AvoidanceConfig::load_or_default(&path)
        .with_context(|| format!("读取配置文件失败: {}", path.display()))
}
