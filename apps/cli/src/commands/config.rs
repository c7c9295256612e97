//! 配置管理命令
//!
//! 读写规避系统的 TOML 配置。键使用点分路径，如 `trend.near_threshold_cm`、
//! `channels.front.trigger_pin`。

use crate::utils;
use anyhow::{Context, Result};
use clap::Subcommand;
use rover_sdk::AvoidanceConfig;
use std::path::Path;

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 设置配置项
    Set {
        /// 配置项（点分路径）
        key: String,

        /// 新值（TOML 语法，如 60、40.5、"text"）
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// 获取配置项
    Get {
        /// 配置项（点分路径），all 输出完整配置
        #[arg(default_value = "all")]
        key: String,
    },

    /// 写出默认配置
    Init {
        /// 覆盖已存在的文件
        #[arg(long)]
        force: bool,
    },

    /// 检查配置
    Check,
}

impl ConfigCommand {
    pub fn execute(self, config_path: Option<&Path>) -> Result<()> {
        let path = utils::config_path(config_path)?;

        match self {
            ConfigCommand::Set { key, value } => {
                let mut config = utils::load_config(Some(path.as_path()))?;
                config
                    .set_value(&key, &value)
                    .with_context(|| format!("无法设置 {}", key))?;
                config
                    .save(&path)
                    .with_context(|| format!("写入配置文件失败: {}", path.display()))?;
                println!("✅ {} = {}", key, config.get_value(&key)?);
            },

            ConfigCommand::Get { key } => {
                let config = utils::load_config(Some(path.as_path()))?;
                if key == "all" {
                    print!("{}", config.to_toml_string()?);
                } else {
                    println!("{}", config.get_value(&key)?);
                }
            },

            ConfigCommand::Init { force } => {
                if path.exists() && !force {
                    anyhow::bail!("❌ 配置文件已存在: {}（使用 --force 覆盖）", path.display());
                }
                AvoidanceConfig::default()
                    .save(&path)
                    .with_context(|| format!("写入配置文件失败: {}", path.display()))?;
                println!("✅ 已写出默认配置: {}", path.display());
            },

            ConfigCommand::Check => {
                let exists = path.exists();
                let config = utils::load_config(Some(path.as_path()))?;
                println!("配置文件: {}", path.display());
                if !exists {
                    println!("  (文件不存在，使用默认配置)");
                }
                println!(
                    "  测距: 哨兵 {}cm, 超时 {}ms, 窗口 {}, 重试 {}",
                    config.sonar.sentinel_cm,
                    config.sonar.echo_timeout_ms,
                    config.sonar.smoothing_window,
                    config.sonar.max_retries
                );
                println!(
                    "  趋势: 阈值 {}cm, 窗口 {}",
                    config.trend.near_threshold_cm, config.trend.window
                );
                println!("  控制周期: {}ms", config.control.tick_ms);
                println!("✅ 配置有效");
            },
        }
        Ok(())
    }
}
