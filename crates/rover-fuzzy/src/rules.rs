//! 规则库
//!
//! 135 条规则覆盖 5 × 3 × 3 × 3 的前件组合，每个组合恰好对应一个后件。
//! 规则表作为数据保存，启动时由 [`RuleBase::from_rules`] 检查完备性与唯一性。
//!
//! 部分组合的后件并不左右对称（例如 center 输入角下的
//! `far & med & far -> midright` 与 `med & med & med -> midright`），
//! 规则表按数据保存，不做对称化推导。

use crate::error::FuzzyError;
use crate::variable::{AngleTerm, DistanceTerm};
use std::fmt;

/// 一条规则：`angle & left & center & right -> output`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rule {
    pub angle: AngleTerm,
    pub left: DistanceTerm,
    pub center: DistanceTerm,
    pub right: DistanceTerm,
    pub output: AngleTerm,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} & {} & {} & {} -> {}",
            self.angle, self.left, self.center, self.right, self.output
        )
    }
}

const fn rule(
    angle: AngleTerm,
    left: DistanceTerm,
    center: DistanceTerm,
    right: DistanceTerm,
    output: AngleTerm,
) -> Rule {
    Rule {
        angle,
        left,
        center,
        right,
        output,
    }
}

use AngleTerm::{Center as C, FarLeft as FL, FarRight as FR, MidLeft as ML, MidRight as MR};
use DistanceTerm::{Far as F, Med as M, Near as N};

/// 规则数量
pub const RULE_COUNT: usize = 5 * 3 * 3 * 3;

/// 标准规则表（输入角 & 左距离 & 中距离 & 右距离 -> 输出角）
#[rustfmt::skip]
pub const RULE_TABLE: [Rule; RULE_COUNT] = [
    // farleft 输入角
    rule(FL, F, F, F, FL),
    rule(FL, F, F, M, FL),
    rule(FL, F, F, N, FL),
    rule(FL, F, M, F, FL),
    rule(FL, F, M, M, FL),
    rule(FL, F, M, N, FL),
    rule(FL, F, N, F, FL),
    rule(FL, F, N, M, FL),
    rule(FL, F, N, N, FL),

    rule(FL, M, F, F, C),
    rule(FL, M, F, M, C),
    rule(FL, M, F, N, C),
    rule(FL, M, M, F, MR),
    rule(FL, M, M, M, FL),
    rule(FL, M, M, N, FL),
    rule(FL, M, N, F, FR),
    rule(FL, M, N, M, FL),
    rule(FL, M, N, N, FL),

    rule(FL, N, F, F, C),
    rule(FL, N, F, M, C),
    rule(FL, N, F, N, C),
    rule(FL, N, M, F, MR),
    rule(FL, N, M, M, C),
    rule(FL, N, M, N, C),
    rule(FL, N, N, F, FR),
    rule(FL, N, N, M, FR),
    rule(FL, N, N, N, FL),

    // midleft 输入角
    rule(ML, F, F, F, ML),
    rule(ML, F, F, M, ML),
    rule(ML, F, F, N, ML),
    rule(ML, F, M, F, ML),
    rule(ML, F, M, M, ML),
    rule(ML, F, M, N, ML),
    rule(ML, F, N, F, ML),
    rule(ML, F, N, M, ML),
    rule(ML, F, N, N, ML),

    rule(ML, M, F, F, C),
    rule(ML, M, F, M, C),
    rule(ML, M, F, N, C),
    rule(ML, M, M, F, MR),
    rule(ML, M, M, M, ML),
    rule(ML, M, M, N, ML),
    rule(ML, M, N, F, MR),
    rule(ML, M, N, M, ML),
    rule(ML, M, N, N, ML),

    rule(ML, N, F, F, C),
    rule(ML, N, F, M, C),
    rule(ML, N, F, N, C),
    rule(ML, N, M, F, MR),
    rule(ML, N, M, M, C),
    rule(ML, N, M, N, C),
    rule(ML, N, N, F, FR),
    rule(ML, N, N, M, FR),
    rule(ML, N, N, N, ML),

    // center 输入角
    rule(C, F, F, F, C),
    rule(C, F, F, M, C),
    rule(C, F, F, N, C),
    rule(C, F, M, F, MR),
    rule(C, F, M, M, ML),
    rule(C, F, M, N, ML),
    rule(C, F, N, F, FR),
    rule(C, F, N, M, FL),
    rule(C, F, N, N, FL),

    rule(C, M, F, F, C),
    rule(C, M, F, M, C),
    rule(C, M, F, N, C),
    rule(C, M, M, F, MR),
    rule(C, M, M, M, MR),
    rule(C, M, M, N, ML),
    rule(C, M, N, F, FR),
    rule(C, M, N, M, FR),
    rule(C, M, N, N, FL),

    rule(C, N, F, F, C),
    rule(C, N, F, M, C),
    rule(C, N, F, N, C),
    rule(C, N, M, F, MR),
    rule(C, N, M, M, C),
    rule(C, N, M, N, C),
    rule(C, N, N, F, FR),
    rule(C, N, N, M, FR),
    rule(C, N, N, N, C),

    // midright 输入角
    rule(MR, F, F, F, MR),
    rule(MR, F, F, M, C),
    rule(MR, F, F, N, C),
    rule(MR, F, M, F, MR),
    rule(MR, F, M, M, ML),
    rule(MR, F, M, N, ML),
    rule(MR, F, N, F, MR),
    rule(MR, F, N, M, ML),
    rule(MR, F, N, N, FL),

    rule(MR, M, F, F, MR),
    rule(MR, M, F, M, C),
    rule(MR, M, F, N, C),
    rule(MR, M, M, F, MR),
    rule(MR, M, M, M, MR),
    rule(MR, M, M, N, C),
    rule(MR, M, N, F, MR),
    rule(MR, M, N, M, MR),
    rule(MR, M, N, N, FL),

    rule(MR, N, F, F, MR),
    rule(MR, N, F, M, C),
    rule(MR, N, F, N, C),
    rule(MR, N, M, F, MR),
    rule(MR, N, M, M, MR),
    rule(MR, N, M, N, C),
    rule(MR, N, N, F, MR),
    rule(MR, N, N, M, MR),
    rule(MR, N, N, N, MR),

    // farright 输入角
    rule(FR, F, F, F, FR),
    rule(FR, F, F, M, C),
    rule(FR, F, F, N, C),
    rule(FR, F, M, F, FR),
    rule(FR, F, M, M, ML),
    rule(FR, F, M, N, ML),
    rule(FR, F, N, F, FR),
    rule(FR, F, N, M, FL),
    rule(FR, F, N, N, FL),

    rule(FR, M, F, F, FR),
    rule(FR, M, F, M, C),
    rule(FR, M, F, N, C),
    rule(FR, M, M, F, FR),
    rule(FR, M, M, M, FR),
    rule(FR, M, M, N, C),
    rule(FR, M, N, F, FR),
    rule(FR, M, N, M, FR),
    rule(FR, M, N, N, FL),

    rule(FR, N, F, F, FR),
    rule(FR, N, F, M, C),
    rule(FR, N, F, N, C),
    rule(FR, N, M, F, FR),
    rule(FR, N, M, M, FR),
    rule(FR, N, M, N, C),
    rule(FR, N, N, F, FR),
    rule(FR, N, N, M, FR),
    rule(FR, N, N, N, FR),
];

/// 以前件下标索引的查找表
type Lookup = [[[[AngleTerm; 3]; 3]; 3]; 5];

/// 规则库（不可变）
///
/// 内部是按 `(angle, left, center, right)` 下标索引的 5×3×3×3 查找表。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleBase {
    table: Lookup,
}

impl RuleBase {
    /// 使用标准规则表构建
    pub fn standard() -> Result<Self, FuzzyError> {
        Self::from_rules(&RULE_TABLE)
    }

    /// 从规则列表构建，并检查完备性与唯一性
    ///
    /// # 错误
    /// - `FuzzyError::DuplicateRule`: 同一前件组合出现多次
    /// - `FuzzyError::MissingRule`: 某个前件组合没有规则
    pub fn from_rules(rules: &[Rule]) -> Result<Self, FuzzyError> {
        let mut slots: [[[[Option<AngleTerm>; 3]; 3]; 3]; 5] = [[[[None; 3]; 3]; 3]; 5];

        for r in rules {
            let slot = &mut slots[r.angle.index()][r.left.index()][r.center.index()]
                [r.right.index()];
            if slot.is_some() {
                return Err(FuzzyError::DuplicateRule {
                    angle: r.angle,
                    left: r.left,
                    center: r.center,
                    right: r.right,
                });
            }
            *slot = Some(r.output);
        }

        let mut table: Lookup = [[[[AngleTerm::Center; 3]; 3]; 3]; 5];
        for angle in AngleTerm::ALL {
            for left in DistanceTerm::ALL {
                for center in DistanceTerm::ALL {
                    for right in DistanceTerm::ALL {
                        let (a, l, c, r) =
                            (angle.index(), left.index(), center.index(), right.index());
                        match slots[a][l][c][r] {
                            Some(output) => table[a][l][c][r] = output,
                            None => {
                                return Err(FuzzyError::MissingRule {
                                    angle,
                                    left,
                                    center,
                                    right,
                                });
                            },
                        }
                    }
                }
            }
        }

        Ok(Self { table })
    }

    /// 查询某个前件组合的后件
    pub fn consequent(
        &self,
        angle: AngleTerm,
        left: DistanceTerm,
        center: DistanceTerm,
        right: DistanceTerm,
    ) -> AngleTerm {
        self.table[angle.index()][left.index()][center.index()][right.index()]
    }

    /// 按下标查询（推理热路径使用）
    pub(crate) fn consequent_at(&self, a: usize, l: usize, c: usize, r: usize) -> AngleTerm {
        self.table[a][l][c][r]
    }

    /// 按 (angle, left, center, right) 字典序遍历全部规则
    pub fn iter(&self) -> impl Iterator<Item = Rule> + '_ {
        AngleTerm::ALL.into_iter().flat_map(move |angle| {
            DistanceTerm::ALL.into_iter().flat_map(move |left| {
                DistanceTerm::ALL.into_iter().flat_map(move |center| {
                    DistanceTerm::ALL.into_iter().map(move |right| Rule {
                        angle,
                        left,
                        center,
                        right,
                        output: self.consequent(angle, left, center, right),
                    })
                })
            })
        })
    }

    pub fn len(&self) -> usize {
        RULE_COUNT
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}
