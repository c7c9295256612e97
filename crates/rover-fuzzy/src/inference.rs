//! Mamdani 推理
//!
//! 模糊化 -> 规则激活（min）-> 聚合（max）-> 重心法解模糊。
//! 推理过程无堆分配，可在每个控制周期同步调用。

use crate::defuzz::{OutputUniverse, centroid};
use crate::error::FuzzyError;
use crate::rules::{Rule, RuleBase};
use crate::variable::{AngleTerm, DistanceTerm, MAX_ANGLE, MIN_ANGLE, SteeringModel};
use tracing::{debug, error, warn};

/// 一次输入采样：当前转向角 + 左/中/右三路距离（cm）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub angle: f64,
    pub left: f64,
    pub center: f64,
    pub right: f64,
}

impl Sample {
    pub fn new(angle: f64, left: f64, center: f64, right: f64) -> Self {
        Self {
            angle,
            left,
            center,
            right,
        }
    }

    /// 范围检查
    ///
    /// 角度必须在 `[-1, 1]`，三路距离必须 `>= 0`。NaN 总是非法。
    pub fn check(&self) -> Result<(), FuzzyError> {
        if !(MIN_ANGLE..=MAX_ANGLE).contains(&self.angle) {
            return Err(FuzzyError::InvalidInput {
                field: "angle",
                value: self.angle,
            });
        }
        for (field, value) in [
            ("left", self.left),
            ("center", self.center),
            ("right", self.right),
        ] {
            // `!(v >= 0)` 同时拒绝 NaN
            if !(value >= 0.0) {
                return Err(FuzzyError::InvalidInput { field, value });
            }
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.check().is_ok()
    }
}

/// 被激活的一条规则及其激活强度
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiredRule {
    pub rule: Rule,
    pub strength: f64,
}

/// 单次推理的完整过程（用于诊断和 CLI 展示）
#[derive(Debug, Clone, PartialEq)]
pub struct Inference {
    /// 修正后的转向角
    pub angle: f64,
    /// 激活强度大于 0 的规则，按强度降序
    pub fired: Vec<FiredRule>,
    /// 每个输出项的截断强度（按 `AngleTerm::ALL` 顺序）
    pub strengths: [f64; 5],
    /// 聚合面积为零，结果回退为输入角
    pub degenerate: bool,
}

/// 模糊转向修正器
///
/// 模型和规则库在构造时确定，之后不可变；`correct` 只读共享状态，
/// 可以在多个线程间共享（`&self`）。
///
/// # Example
///
/// ```
/// use rover_fuzzy::FuzzySteering;
///
/// let steering = FuzzySteering::new().unwrap();
/// assert!(steering.validate(0.0, 140.0, 140.0, 140.0));
/// let angle = steering.correct(0.0, 140.0, 140.0, 140.0);
/// assert!(angle.abs() < 0.3);
/// ```
#[derive(Debug, Clone)]
pub struct FuzzySteering {
    model: SteeringModel,
    rules: RuleBase,
    output: OutputUniverse,
}

impl FuzzySteering {
    /// 使用标准模型和标准规则表构建
    ///
    /// 规则表的完备性和唯一性在这里检查，失败时返回错误。
    pub fn new() -> Result<Self, FuzzyError> {
        Self::with_rules(RuleBase::standard()?)
    }

    /// 使用自定义规则库构建
    pub fn with_rules(rules: RuleBase) -> Result<Self, FuzzyError> {
        let model = SteeringModel::standard()?;
        let output = OutputUniverse::new(&model.output_angle);
        Ok(Self {
            model,
            rules,
            output,
        })
    }

    pub fn model(&self) -> &SteeringModel {
        &self.model
    }

    pub fn rules(&self) -> &RuleBase {
        &self.rules
    }

    /// 检查输入是否可以进入推理
    ///
    /// 非法输入记录 `warn!` 并返回 `false`，调用方不应再调用 [`correct`](Self::correct)。
    pub fn validate(&self, angle: f64, left: f64, center: f64, right: f64) -> bool {
        match Sample::new(angle, left, center, right).check() {
            Ok(()) => true,
            Err(e) => {
                warn!("Rejected sample: {}", e);
                false
            },
        }
    }

    /// 计算修正后的转向角（输入应先经过 [`validate`](Self::validate)）
    ///
    /// 结果在 `[-1, 1]`。没有任何规则激活时返回输入角并记录 `error!`。
    pub fn correct(&self, angle: f64, left: f64, center: f64, right: f64) -> f64 {
        let strengths = self.output_strengths(&Sample::new(angle, left, center, right));
        let agg = self.output.aggregate(&strengths);
        match centroid(self.output.xs(), &agg) {
            Some(x) => x,
            None => {
                error!(
                    "{} (angle={}, left={}, center={}, right={}), returning input angle",
                    FuzzyError::DegenerateAggregation,
                    angle,
                    left,
                    center,
                    right
                );
                angle
            },
        }
    }

    /// 校验后推理
    pub fn evaluate(&self, sample: &Sample) -> Result<f64, FuzzyError> {
        sample.check()?;
        Ok(self.correct(sample.angle, sample.left, sample.center, sample.right))
    }

    /// 校验后推理，并返回激活的规则列表
    pub fn explain(&self, sample: &Sample) -> Result<Inference, FuzzyError> {
        sample.check()?;

        let mut fired = Vec::new();
        self.for_each_fired(sample, |rule, strength| {
            fired.push(FiredRule { rule, strength });
        });
        fired.sort_by(|a, b| b.strength.total_cmp(&a.strength));

        let strengths = strengths_of(fired.iter().map(|f| (f.rule, f.strength)));
        let agg = self.output.aggregate(&strengths);
        let (angle, degenerate) = match centroid(self.output.xs(), &agg) {
            Some(x) => (x, false),
            None => (sample.angle, true),
        };
        debug!("Inference fired {} rules, output {:.4}", fired.len(), angle);

        Ok(Inference {
            angle,
            fired,
            strengths,
            degenerate,
        })
    }

    /// 每个输出项的截断强度：`S_t = max { strength(rule) | rule.output == t }`
    ///
    /// 按输出项先取 max 再截断，与逐条规则截断后取 max 等价。
    fn output_strengths(&self, sample: &Sample) -> [f64; 5] {
        let mut strengths = [0.0_f64; 5];
        self.for_each_fired(sample, |rule, strength| {
            fold_strength(&mut strengths, rule, strength)
        });
        strengths
    }

    /// 遍历激活强度大于 0 的规则
    ///
    /// 每个输入至多落在两个相邻模糊项内，实际访问的组合不超过 16 个。
    fn for_each_fired(&self, sample: &Sample, mut f: impl FnMut(Rule, f64)) {
        let a = self.model.input_angle.fuzzify(sample.angle);
        let l = self.model.left_distance.fuzzify(sample.left);
        let c = self.model.center_distance.fuzzify(sample.center);
        let r = self.model.right_distance.fuzzify(sample.right);

        for (ai, &ma) in a.iter().enumerate() {
            if ma <= 0.0 {
                continue;
            }
            for (li, &ml) in l.iter().enumerate() {
                let s_l = ma.min(ml);
                if s_l <= 0.0 {
                    continue;
                }
                for (ci, &mc) in c.iter().enumerate() {
                    let s_c = s_l.min(mc);
                    if s_c <= 0.0 {
                        continue;
                    }
                    for (ri, &mr) in r.iter().enumerate() {
                        let strength = s_c.min(mr);
                        if strength <= 0.0 {
                            continue;
                        }
                        let rule = Rule {
                            angle: AngleTerm::ALL[ai],
                            left: DistanceTerm::ALL[li],
                            center: DistanceTerm::ALL[ci],
                            right: DistanceTerm::ALL[ri],
                            output: self.rules.consequent_at(ai, li, ci, ri),
                        };
                        f(rule, strength);
                    }
                }
            }
        }
    }
}

fn fold_strength(strengths: &mut [f64; 5], rule: Rule, strength: f64) {
    let slot = &mut strengths[rule.output.index()];
    if strength > *slot {
        *slot = strength;
    }
}

/// 由已收集的激活规则求各输出项的截断强度
fn strengths_of(fired: impl IntoIterator<Item = (Rule, f64)>) -> [f64; 5] {
    let mut strengths = [0.0_f64; 5];
    for (rule, strength) in fired {
        fold_strength(&mut strengths, rule, strength);
    }
    strengths
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn steering() -> FuzzySteering {
        FuzzySteering::new().unwrap()
    }

    #[test]
    fn test_clear_path_keeps_center() {
        let s = steering();
        let angle = s.correct(0.0, 140.0, 140.0, 140.0);
        assert!((-0.3..=0.3).contains(&angle), "angle = {}", angle);
        assert_relative_eq!(angle, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_hard_left_boxed_in_stays_far_left() {
        let s = steering();
        let angle = s.correct(-1.0, 0.0, 0.0, 0.0);
        assert!((-1.0..=-0.5).contains(&angle), "angle = {}", angle);
    }

    #[test]
    fn test_obstacle_ahead_steers_right() {
        // 居中、正前方近、两侧空旷 -> farright
        let s = steering();
        let angle = s.correct(0.0, 140.0, 20.0, 140.0);
        assert!(angle >= 0.5, "angle = {}", angle);
    }

    #[test]
    fn test_sentinel_distance_equals_far() {
        let s = steering();
        assert_eq!(
            s.correct(0.2, 800.0, 800.0, 800.0),
            s.correct(0.2, 140.0, 140.0, 140.0)
        );
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let s = steering();
        assert!(s.validate(1.0, 0.0, 0.0, 0.0));
        assert!(s.validate(-1.0, 800.0, 0.0, 3.5));
        assert!(!s.validate(1.01, 10.0, 10.0, 10.0));
        assert!(!s.validate(0.0, -1.0, 10.0, 10.0));
        assert!(!s.validate(0.0, 10.0, f64::NAN, 10.0));
        assert!(!s.validate(f64::NAN, 10.0, 10.0, 10.0));
    }

    #[test]
    fn test_evaluate_reports_field() {
        let s = steering();
        let err = s.evaluate(&Sample::new(0.0, 10.0, 10.0, -5.0)).unwrap_err();
        assert_eq!(
            err,
            FuzzyError::InvalidInput {
                field: "right",
                value: -5.0
            }
        );
    }

    #[test]
    fn test_explain_matches_correct() {
        let s = steering();
        let sample = Sample::new(0.15, 45.0, 95.0, 120.0);
        let inference = s.explain(&sample).unwrap();
        assert!(!inference.degenerate);
        assert_eq!(
            inference.angle,
            s.correct(sample.angle, sample.left, sample.center, sample.right)
        );
        // 角度 0.15、左 45、中 95 各落在两个模糊项内，右 120 只在 far
        assert_eq!(inference.fired.len(), 8);
        assert!(
            inference
                .fired
                .windows(2)
                .all(|w| w[0].strength >= w[1].strength)
        );
    }

    #[test]
    fn test_explain_strengths_match_direct_pass() {
        let s = steering();
        for sample in [
            Sample::new(0.15, 45.0, 95.0, 120.0),
            Sample::new(-0.7, 10.0, 60.0, 800.0),
            Sample::new(1.0, 0.0, 0.0, 0.0),
        ] {
            let inference = s.explain(&sample).unwrap();
            assert_eq!(inference.strengths, s.output_strengths(&sample));
        }
    }

    #[test]
    fn test_output_strength_is_max_of_rules() {
        let s = steering();
        let inference = s.explain(&Sample::new(0.15, 45.0, 95.0, 120.0)).unwrap();
        for term in AngleTerm::ALL {
            let expected = inference
                .fired
                .iter()
                .filter(|f| f.rule.output == term)
                .map(|f| f.strength)
                .fold(0.0, f64::max);
            assert_eq!(inference.strengths[term.index()], expected);
        }
    }

    #[test]
    fn test_correct_is_deterministic() {
        let s = steering();
        let first = s.correct(-0.35, 62.0, 47.0, 133.0);
        for _ in 0..10 {
            assert_eq!(s.correct(-0.35, 62.0, 47.0, 133.0), first);
        }
    }
}
