//! # Rover CLI
//!
//! 障碍规避决策核心的命令行工具。
//!
//! ```bash
//! # 单次推理
//! rover-cli eval --angle 0 --left 140 --center 20 --right 140 --explain
//!
//! # 回放实车记录
//! rover-cli replay picar-readings.csv
//!
//! # 仿真（模拟回波）
//! rover-cli simulate --scenario approach --record readings.csv
//!
//! # 单通道测距
//! rover-cli sonar front_left
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod utils;

use commands::{
    ConfigCommand, EvalCommand, ReplayCommand, RulesCommand, SimulateCommand, SonarCommand,
};

/// Rover CLI - 障碍规避命令行工具
#[derive(Parser, Debug)]
#[command(name = "rover-cli")]
#[command(about = "Command-line interface for the rover obstacle avoidance core", long_about = None)]
#[command(version)]
struct Cli {
    /// 配置文件路径（默认 <config_dir>/rover/avoidance.toml）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 计算一次转向修正
    Eval {
        #[command(flatten)]
        args: EvalCommand,
    },

    /// 列出规则表
    Rules {
        #[command(flatten)]
        args: RulesCommand,
    },

    /// 回放 CSV 采样
    Replay {
        #[command(flatten)]
        args: ReplayCommand,
    },

    /// 用模拟回波运行完整控制周期
    Simulate {
        #[command(flatten)]
        args: SimulateCommand,
    },

    /// 单通道测距
    Sonar {
        #[command(flatten)]
        args: SonarCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    rover_sdk::init_logger("rover_cli=info,warn");

    let cli = Cli::parse();
    let config_path = cli.config;

    match cli.command {
        Commands::Config(cmd) => cmd.execute(config_path.as_deref()),

        Commands::Eval { args } => args.execute(),

        Commands::Rules { args } => args.execute(),

        Commands::Replay { args } => args.execute(),

        Commands::Simulate { args } => args.execute(config_path.as_deref()).await,

        Commands::Sonar { args } => {
            // 阻塞式轮询，放到专用线程
            let config = utils::load_config(config_path.as_deref())?;
            tokio::task::spawn_blocking(move || args.execute(&config)).await?
        },
    }
}
