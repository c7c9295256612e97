//! 模糊控制层错误类型定义

use crate::variable::{AngleTerm, DistanceTerm};
use thiserror::Error;

/// 模糊控制层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FuzzyError {
    /// 输入样本超出取值范围（角度不在 [-1, 1]，或距离为负 / NaN）
    #[error("Invalid input: {field} = {value}")]
    InvalidInput {
        /// 出错的字段名（"angle" / "left" / "center" / "right"）
        field: &'static str,
        value: f64,
    },

    /// 梯形隶属函数断点非法（要求 a <= b <= c <= d 且均为有限值）
    #[error("Invalid trapezoid breakpoints: ({a}, {b}, {c}, {d})")]
    InvalidTrapezoid { a: f64, b: f64, c: f64, d: f64 },

    /// 规则表中出现重复的前件组合
    #[error("Duplicate rule: {angle} & {left} & {center} & {right}")]
    DuplicateRule {
        angle: AngleTerm,
        left: DistanceTerm,
        center: DistanceTerm,
        right: DistanceTerm,
    },

    /// 规则表未覆盖某个前件组合
    #[error("Missing rule: {angle} & {left} & {center} & {right}")]
    MissingRule {
        angle: AngleTerm,
        left: DistanceTerm,
        center: DistanceTerm,
        right: DistanceTerm,
    },

    /// 聚合输出面积为零（没有任何规则被激活）
    ///
    /// 规则表完备时不应出现，出现即说明规则表完整性有问题。
    #[error("Degenerate aggregation: no rule fired")]
    DegenerateAggregation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuzzy_error_display() {
        let err = FuzzyError::InvalidInput {
            field: "angle",
            value: 1.5,
        };
        assert_eq!(format!("{}", err), "Invalid input: angle = 1.5");

        let err = FuzzyError::MissingRule {
            angle: AngleTerm::FarLeft,
            left: DistanceTerm::Near,
            center: DistanceTerm::Med,
            right: DistanceTerm::Far,
        };
        assert_eq!(
            format!("{}", err),
            "Missing rule: farleft & near & med & far"
        );

        let err = FuzzyError::DegenerateAggregation;
        assert!(format!("{}", err).contains("no rule fired"));
    }
}
