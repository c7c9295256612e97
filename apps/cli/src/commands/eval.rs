//! eval 命令
//!
//! 对单个采样做一次转向修正，可选列出激活的规则

use anyhow::{Context, Result};
use clap::Args;
use rover_sdk::fuzzy::{AngleTerm, FuzzySteering, Sample};

/// 单次推理参数
#[derive(Args, Debug)]
pub struct EvalCommand {
    /// 当前转向角 [-1, 1]
    #[arg(long, allow_negative_numbers = true)]
    pub angle: f64,

    /// 左前方距离（cm）
    #[arg(long, allow_negative_numbers = true)]
    pub left: f64,

    /// 正前方距离（cm）
    #[arg(long, allow_negative_numbers = true)]
    pub center: f64,

    /// 右前方距离（cm）
    #[arg(long, allow_negative_numbers = true)]
    pub right: f64,

    /// 列出激活的规则和各输出项强度
    #[arg(long)]
    pub explain: bool,
}

impl EvalCommand {
    pub fn execute(&self) -> Result<()> {
        let steering = FuzzySteering::new().context("规则库不完整")?;
        let sample = Sample::new(self.angle, self.left, self.center, self.right);

        if !self.explain {
            let angle = steering.evaluate(&sample)?;
            println!("{:.4}", angle);
            return Ok(());
        }

        let inference = steering.explain(&sample)?;
        println!("{:.4}", inference.angle);
        if inference.degenerate {
            println!("⚠️  没有规则激活，输出为输入角");
        }

        println!();
        println!("输出项强度:");
        for term in AngleTerm::ALL {
            println!("  {:<9} {:.3}", term.name(), inference.strengths[term.index()]);
        }

        println!();
        println!("激活规则 ({}):", inference.fired.len());
        for fired in &inference.fired {
            println!("  {:.3}  {}", fired.strength, fired.rule);
        }
        Ok(())
    }
}
