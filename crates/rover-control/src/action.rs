//! 规避动作

use std::fmt;
use std::str::FromStr;

/// 趋势检测器给出的动作
///
/// 目前只会产生 `Forward` 和 `Stop`；超车和倒车为预留动作，
/// 没有检测逻辑会产生它们。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Action {
    #[default]
    Forward,
    Stop,
    /// 预留：从右侧超越
    OvertakeRight,
    /// 预留：从左侧超越
    OvertakeLeft,
    /// 预留：倒车
    Reverse,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Forward,
        Action::Stop,
        Action::OvertakeRight,
        Action::OvertakeLeft,
        Action::Reverse,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Action::Forward => "forward",
            Action::Stop => "stop",
            Action::OvertakeRight => "overtake-right",
            Action::OvertakeLeft => "overtake-left",
            Action::Reverse => "reverse",
        }
    }

    /// 是否允许本周期进行转向修正
    pub fn allows_steering(self) -> bool {
        !matches!(self, Action::Stop)
    }

    pub fn is_reserved(self) -> bool {
        matches!(
            self,
            Action::OvertakeRight | Action::OvertakeLeft | Action::Reverse
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Action::ALL
            .into_iter()
            .find(|a| a.name() == normalized)
            .ok_or_else(|| format!("unknown action '{}'", s))
    }
}
