//! 语言变量与模糊项
//!
//! - 转向角：论域 `[-1.0, 1.0]`，5 个模糊项（farleft / midleft / center / midright / farright）
//! - 距离：论域 `[0, 140]` cm，3 个模糊项（near / med / far）
//!
//! 模型在构造后不可变。

use crate::error::FuzzyError;
use crate::membership::Trapezoid;
use std::fmt;

/// 转向角论域下限
pub const MIN_ANGLE: f64 = -1.0;
/// 转向角论域上限
pub const MAX_ANGLE: f64 = 1.0;
/// 距离论域下限（cm）
pub const MIN_DISTANCE: f64 = 0.0;
/// 距离论域上限（cm）
pub const MAX_DISTANCE: f64 = 140.0;

/// 转向角模糊项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AngleTerm {
    FarLeft = 0,
    MidLeft = 1,
    Center = 2,
    MidRight = 3,
    FarRight = 4,
}

impl AngleTerm {
    /// 按论域从左到右排列的全部模糊项
    pub const ALL: [AngleTerm; 5] = [
        AngleTerm::FarLeft,
        AngleTerm::MidLeft,
        AngleTerm::Center,
        AngleTerm::MidRight,
        AngleTerm::FarRight,
    ];

    /// 在 `ALL` 中的下标
    pub fn index(self) -> usize {
        self as usize
    }

    /// 模糊项名称
    pub fn name(self) -> &'static str {
        match self {
            AngleTerm::FarLeft => "farleft",
            AngleTerm::MidLeft => "midleft",
            AngleTerm::Center => "center",
            AngleTerm::MidRight => "midright",
            AngleTerm::FarRight => "farright",
        }
    }

    /// 从名称解析
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl fmt::Display for AngleTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 距离模糊项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DistanceTerm {
    Near = 0,
    Med = 1,
    Far = 2,
}

impl DistanceTerm {
    pub const ALL: [DistanceTerm; 3] = [DistanceTerm::Near, DistanceTerm::Med, DistanceTerm::Far];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            DistanceTerm::Near => "near",
            DistanceTerm::Med => "med",
            DistanceTerm::Far => "far",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl fmt::Display for DistanceTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 语言变量
///
/// 一个连续量及其有序的模糊项集合。`N` 为模糊项数量，
/// 模糊项按论域从左到右排列，相邻项之间重叠。
#[derive(Debug, Clone)]
pub struct LinguisticVariable<T: Copy, const N: usize> {
    name: &'static str,
    min: f64,
    max: f64,
    terms: [(T, Trapezoid); N],
}

impl<T: Copy, const N: usize> LinguisticVariable<T, N> {
    pub fn new(name: &'static str, min: f64, max: f64, terms: [(T, Trapezoid); N]) -> Self {
        Self {
            name,
            min,
            max,
            terms,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 论域 `(min, max)`
    pub fn universe(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    pub fn terms(&self) -> &[(T, Trapezoid); N] {
        &self.terms
    }

    /// 第 `index` 个模糊项的隶属函数
    pub fn term(&self, index: usize) -> &Trapezoid {
        &self.terms[index].1
    }

    /// 模糊化：计算 `x` 对每个模糊项的隶属度
    ///
    /// `x` 先被钳位到论域内，论域外的读数（例如 800cm 的哨兵距离）
    /// 等同于论域边缘的读数。
    pub fn fuzzify(&self, x: f64) -> [f64; N] {
        let x = x.clamp(self.min, self.max);
        let mut degrees = [0.0; N];
        for (degree, (_, mf)) in degrees.iter_mut().zip(self.terms.iter()) {
            *degree = mf.membership(x);
        }
        degrees
    }
}

/// 转向角语言变量（输入与输出共用同一组模糊项）
pub fn steering_angle(name: &'static str) -> Result<LinguisticVariable<AngleTerm, 5>, FuzzyError> {
    Ok(LinguisticVariable::new(
        name,
        MIN_ANGLE,
        MAX_ANGLE,
        [
            (AngleTerm::FarLeft, Trapezoid::new(-1.0, -1.0, -0.7, -0.5)?),
            (AngleTerm::MidLeft, Trapezoid::new(-0.7, -0.5, -0.3, -0.1)?),
            (AngleTerm::Center, Trapezoid::new(-0.3, -0.1, 0.1, 0.3)?),
            (AngleTerm::MidRight, Trapezoid::new(0.1, 0.3, 0.5, 0.7)?),
            (AngleTerm::FarRight, Trapezoid::new(0.5, 0.7, 1.0, 1.0)?),
        ],
    ))
}

/// 距离语言变量（cm）
pub fn distance(name: &'static str) -> Result<LinguisticVariable<DistanceTerm, 3>, FuzzyError> {
    Ok(LinguisticVariable::new(
        name,
        MIN_DISTANCE,
        MAX_DISTANCE,
        [
            (DistanceTerm::Near, Trapezoid::new(0.0, 0.0, 40.0, 50.0)?),
            (DistanceTerm::Med, Trapezoid::new(40.0, 50.0, 90.0, 100.0)?),
            (DistanceTerm::Far, Trapezoid::new(90.0, 100.0, MAX_DISTANCE, MAX_DISTANCE)?),
        ],
    ))
}

/// 转向修正模型：4 个输入变量 + 1 个输出变量
#[derive(Debug, Clone)]
pub struct SteeringModel {
    pub input_angle: LinguisticVariable<AngleTerm, 5>,
    pub left_distance: LinguisticVariable<DistanceTerm, 3>,
    pub center_distance: LinguisticVariable<DistanceTerm, 3>,
    pub right_distance: LinguisticVariable<DistanceTerm, 3>,
    pub output_angle: LinguisticVariable<AngleTerm, 5>,
}

impl SteeringModel {
    /// 构建标准模型
    pub fn standard() -> Result<Self, FuzzyError> {
        Ok(Self {
            input_angle: steering_angle("InputAngle")?,
            left_distance: distance("LeftDistance")?,
            center_distance: distance("CenterDistance")?,
            right_distance: distance("RightDistance")?,
            output_angle: steering_angle("OutputAngle")?,
        })
    }
}
