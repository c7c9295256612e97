//! 重心法解模糊
//!
//! 输出论域按固定步长采样，聚合曲线在采样点之间按分段线性处理，
//! 每一段分别求面积与形心，再按面积加权得到整体重心。

use crate::variable::{AngleTerm, LinguisticVariable};

/// 输出论域采样步长
pub const OUTPUT_STEP: f64 = 0.1;

/// 输出论域采样点数（`[-1, 1)`，步长 0.1）
pub const OUTPUT_POINTS: usize = 20;

/// 采样后的输出论域
///
/// 预先计算每个采样点对每个输出模糊项的隶属度，推理热路径上不再求值梯形函数。
#[derive(Debug, Clone)]
pub struct OutputUniverse {
    xs: [f64; OUTPUT_POINTS],
    /// `memberships[term][i]`：第 i 个采样点对该输出项的隶属度
    memberships: [[f64; OUTPUT_POINTS]; 5],
}

impl OutputUniverse {
    pub fn new(output: &LinguisticVariable<AngleTerm, 5>) -> Self {
        let (min, _) = output.universe();
        let mut xs = [0.0; OUTPUT_POINTS];
        for (i, x) in xs.iter_mut().enumerate() {
            // 按下标乘步长，避免累加误差
            *x = min + OUTPUT_STEP * i as f64;
        }

        let mut memberships = [[0.0; OUTPUT_POINTS]; 5];
        for (term, row) in memberships.iter_mut().enumerate() {
            let mf = output.term(term);
            for (mu, &x) in row.iter_mut().zip(xs.iter()) {
                *mu = mf.membership(x);
            }
        }

        Self { xs, memberships }
    }

    /// 采样点
    pub fn xs(&self) -> &[f64; OUTPUT_POINTS] {
        &self.xs
    }

    /// 按各输出项的截断强度聚合：`agg(x) = max_t min(S_t, mu_t(x))`
    pub fn aggregate(&self, strengths: &[f64; 5]) -> [f64; OUTPUT_POINTS] {
        let mut agg = [0.0_f64; OUTPUT_POINTS];
        for (row, &s) in self.memberships.iter().zip(strengths.iter()) {
            if s <= 0.0 {
                continue;
            }
            for (a, &mu) in agg.iter_mut().zip(row.iter()) {
                *a = a.max(mu.min(s));
            }
        }
        agg
    }
}

/// 分段线性重心
///
/// 总面积为零时返回 `None`，由调用方决定回退策略。
pub fn centroid(xs: &[f64], mu: &[f64]) -> Option<f64> {
    let mut moment_sum = 0.0;
    let mut area_sum = 0.0;

    for (x, y) in xs.windows(2).zip(mu.windows(2)) {
        let (x1, x2) = (x[0], x[1]);
        let (y1, y2) = (y[0], y[1]);

        if (y1 == 0.0 && y2 == 0.0) || x1 == x2 {
            continue;
        }

        let width = x2 - x1;
        let (moment, area) = if y1 == y2 {
            // 矩形
            (0.5 * (x1 + x2), width * y1)
        } else if y1 == 0.0 {
            // 上升三角形
            (2.0 / 3.0 * width + x1, 0.5 * width * y2)
        } else if y2 == 0.0 {
            // 下降三角形
            (1.0 / 3.0 * width + x1, 0.5 * width * y1)
        } else {
            // 梯形
            (
                (2.0 / 3.0 * width * (y2 + 0.5 * y1)) / (y1 + y2) + x1,
                0.5 * width * (y1 + y2),
            )
        };

        moment_sum += moment * area;
        area_sum += area;
    }

    if area_sum > 0.0 {
        Some(moment_sum / area_sum)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::steering_angle;
    use approx::assert_relative_eq;

    #[test]
    fn test_output_universe_samples() {
        let universe = OutputUniverse::new(&steering_angle("out").unwrap());
        let xs = universe.xs();
        assert_eq!(xs[0], -1.0);
        assert_relative_eq!(xs[OUTPUT_POINTS - 1], 0.9, epsilon = 1e-12);
    }

    #[test]
    fn test_centroid_of_rectangle() {
        let xs = [0.0, 1.0, 2.0];
        let mu = [0.5, 0.5, 0.5];
        assert_relative_eq!(centroid(&xs, &mu).unwrap(), 1.0);
    }

    #[test]
    fn test_centroid_of_symmetric_triangle() {
        let xs = [-1.0, 0.0, 1.0];
        let mu = [0.0, 1.0, 0.0];
        assert_relative_eq!(centroid(&xs, &mu).unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_centroid_of_ramp() {
        // 单个上升三角形，形心在 2/3 处
        let xs = [0.0, 3.0];
        let mu = [0.0, 1.0];
        assert_relative_eq!(centroid(&xs, &mu).unwrap(), 2.0);
    }

    #[test]
    fn test_zero_area_has_no_centroid() {
        let xs = [0.0, 1.0, 2.0];
        assert_eq!(centroid(&xs, &[0.0, 0.0, 0.0]), None);
        assert_eq!(centroid(&[], &[]), None);
    }

    #[test]
    fn test_aggregate_clips_each_term() {
        let universe = OutputUniverse::new(&steering_angle("out").unwrap());
        // 只有 center 激活，强度 0.4
        let agg = universe.aggregate(&[0.0, 0.0, 0.4, 0.0, 0.0]);
        assert!(agg.iter().all(|&m| m <= 0.4));
        assert_relative_eq!(agg[10], 0.4); // x = 0.0
        assert_eq!(agg[0], 0.0); // x = -1.0
        let c = centroid(universe.xs(), &agg).unwrap();
        assert_relative_eq!(c, 0.0, epsilon = 1e-9);
    }
}
