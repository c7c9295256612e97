//! rules 命令
//!
//! 打印规则表，可按输入角或输出角过滤

use anyhow::{Result, anyhow};
use clap::Args;
use rover_sdk::fuzzy::{AngleTerm, RuleBase};

/// 规则表参数
#[derive(Args, Debug)]
pub struct RulesCommand {
    /// 只显示该输入角的规则（farleft/midleft/center/midright/farright）
    #[arg(long)]
    pub angle: Option<String>,

    /// 只显示该输出角的规则
    #[arg(long)]
    pub output: Option<String>,
}

fn parse_term(name: &str) -> Result<AngleTerm> {
    AngleTerm::from_name(&name.to_ascii_lowercase())
        .ok_or_else(|| anyhow!("未知的转向角模糊项: {}", name))
}

impl RulesCommand {
    pub fn execute(&self) -> Result<()> {
        let angle = self.angle.as_deref().map(parse_term).transpose()?;
        let output = self.output.as_deref().map(parse_term).transpose()?;

        let rules = RuleBase::standard()?;
        let mut shown = 0;
        for (i, rule) in rules.iter().enumerate() {
            if angle.is_some_and(|a| a != rule.angle) || output.is_some_and(|o| o != rule.output) {
                continue;
            }
            println!("{:3}  {}", i + 1, rule);
            shown += 1;
        }

        eprintln!("{} / {} rules", shown, rules.len());
        Ok(())
    }
}
