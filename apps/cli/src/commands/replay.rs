//! replay 命令
//!
//! 回放实车记录的 CSV 采样，逐行输出修正角并统计推理耗时；
//! `--labelled` 时按标注文件格式读取并在标注旁输出修正角。

use anyhow::{Context, Result};
use clap::Args;
use rover_sdk::FuzzySteering;
use rover_sdk::tools::{
    ReplaySummary, evaluate_labelled, read_labelled_file, read_replay_file, replay,
};
use std::path::PathBuf;

/// 回放参数
#[derive(Args, Debug)]
pub struct ReplayCommand {
    /// CSV 文件路径
    pub input: PathBuf,

    /// 标注文件格式（id, angle, left, center, right, rule）
    #[arg(long)]
    pub labelled: bool,

    /// 只输出统计，不输出逐行结果
    #[arg(short, long)]
    pub quiet: bool,
}

impl ReplayCommand {
    pub fn execute(&self) -> Result<()> {
        if !self.input.exists() {
            anyhow::bail!("❌ 采样文件不存在: {}", self.input.display());
        }

        let steering = FuzzySteering::new().context("规则库不完整")?;
        if self.labelled {
            self.run_labelled(&steering)
        } else {
            self.run_replay(&steering)
        }
    }

    fn run_replay(&self, steering: &FuzzySteering) -> Result<()> {
        let rows = read_replay_file(&self.input)
            .with_context(|| format!("读取采样文件失败: {}", self.input.display()))?;
        let report = replay(steering, &rows);

        if !self.quiet {
            println!("row,angle_in,left,center,right,angle_computed,angle_out,interval,latency_us");
            for o in &report.outcomes {
                println!(
                    "{},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{}",
                    o.row,
                    o.input.angle_in,
                    o.input.left,
                    o.input.center,
                    o.input.right,
                    o.angle,
                    o.input.angle_out,
                    o.input.interval,
                    o.latency.as_micros()
                );
            }
        }

        let summary = ReplaySummary::from_report(&report);
        let (latency, deviation) = (summary.latency_us, summary.deviation);
        eprintln!();
        eprintln!("📊 {} 行", summary.rows());
        eprintln!(
            "   耗时 (µs): avg {:.1}, min {:.0}, max {:.0}, std {:.1}, p50 {:.1}, p95 {:.1}, p99 {:.1}",
            latency.mean,
            latency.min,
            latency.max,
            latency.std_dev,
            latency.p50,
            latency.p95,
            latency.p99
        );
        eprintln!(
            "   与记录输出角偏差: avg {:.4}, max {:.4}, p95 {:.4}",
            deviation.mean, deviation.max, deviation.p95
        );

        if let Some(invalid) = report.invalid {
            anyhow::bail!("❌ 第 {} 行越界，回放停止: {}", invalid.row, invalid.error);
        }
        Ok(())
    }

    fn run_labelled(&self, steering: &FuzzySteering) -> Result<()> {
        let rows = read_labelled_file(&self.input)
            .with_context(|| format!("读取标注文件失败: {}", self.input.display()))?;

        let mut rejected = 0;
        println!("id,angle,left,center,right,rule,output_angle");
        for outcome in evaluate_labelled(steering, rows) {
            let row = &outcome.row;
            match outcome.result {
                Ok(angle) => println!(
                    "{},{:.4},{:.4},{:.4},{:.4},{},{:.4}",
                    row.id, row.angle, row.left, row.center, row.right, row.rule, angle
                ),
                Err(e) => {
                    rejected += 1;
                    println!(
                        "{},{:.4},{:.4},{:.4},{:.4},{},invalid",
                        row.id, row.angle, row.left, row.center, row.right, row.rule
                    );
                    eprintln!("⚠️  {}: {}", row.id, e);
                },
            }
        }

        if rejected > 0 {
            eprintln!("⚠️  {} 行越界", rejected);
        }
        Ok(())
    }
}
