//! 模糊转向修正
//!
//! 本 crate 实现障碍规避中的转向角修正，包括：
//! - 梯形隶属函数与语言变量（转向角 5 项，距离 3 项）
//! - 135 条规则的完备规则库
//! - Mamdani 推理（min 激活、max 聚合）与分段线性重心解模糊
//!
//! 不依赖任何硬件，推理是纯函数，无堆分配。
//!
//! # Example
//!
//! ```
//! use rover_fuzzy::{FuzzySteering, Sample};
//!
//! let steering = FuzzySteering::new().unwrap();
//! let sample = Sample::new(0.0, 140.0, 20.0, 140.0);
//! let angle = steering.evaluate(&sample).unwrap();
//! assert!(angle > 0.5); // 正前方有障碍，右侧空旷 -> 向右
//! ```

pub mod defuzz;
mod error;
pub mod inference;
pub mod membership;
pub mod rules;
pub mod variable;

pub use defuzz::{OUTPUT_POINTS, OUTPUT_STEP, OutputUniverse, centroid};
pub use error::FuzzyError;
pub use inference::{FiredRule, FuzzySteering, Inference, Sample};
pub use membership::Trapezoid;
pub use rules::{RULE_COUNT, RULE_TABLE, Rule, RuleBase};
pub use variable::{
    AngleTerm, DistanceTerm, LinguisticVariable, MAX_ANGLE, MAX_DISTANCE, MIN_ANGLE,
    MIN_DISTANCE, SteeringModel,
};
