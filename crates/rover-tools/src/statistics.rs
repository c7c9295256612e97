//! # 回放统计
//!
//! 汇总一次回放的推理耗时和与记录输出角的偏差（可选模块）。
//!
//! 需要启用 `statistics` feature：
//! ```toml
//! rover-tools = { workspace = true, features = ["statistics"] }
//! ```

use crate::samples::ReplayReport;
use statrs::statistics::{Data, OrderStatistics, Statistics};

/// 一组观测值的分布概况
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Spread {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// 总体标准差
    pub std_dev: f64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
}

impl Spread {
    /// 空输入返回全零
    pub fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let std_dev = if values.len() > 1 {
            values.population_std_dev()
        } else {
            0.0
        };
        let mut data = Data::new(values.to_vec());

        Self {
            count: values.len(),
            mean: values.mean(),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            std_dev,
            p50: data.percentile(50),
            p95: data.percentile(95),
            p99: data.percentile(99),
        }
    }
}

/// 回放汇总
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplaySummary {
    /// 单次推理耗时（微秒）
    pub latency_us: Spread,
    /// |修正角 - 记录输出角|
    pub deviation: Spread,
}

impl ReplaySummary {
    /// 只统计成功推理的行；越界行不参与
    pub fn from_report(report: &ReplayReport) -> Self {
        let latencies: Vec<f64> = report.latencies_us().into_iter().map(|us| us as f64).collect();
        let deviations: Vec<f64> = report.outcomes.iter().map(|o| o.deviation().abs()).collect();
        Self {
            latency_us: Spread::of(&latencies),
            deviation: Spread::of(&deviations),
        }
    }

    pub fn rows(&self) -> usize {
        self.latency_us.count
    }

    /// 耗时抖动（标准差，微秒）
    pub fn jitter_us(&self) -> f64 {
        self.latency_us.std_dev
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples::{ReplayOutcome, ReplayRow};
    use approx::assert_relative_eq;
    use std::time::Duration;

    fn outcome(row: usize, angle: f64, angle_out: f64, micros: u64) -> ReplayOutcome {
        ReplayOutcome {
            row,
            input: ReplayRow {
                angle_in: 0.0,
                left: 140.0,
                center: 140.0,
                right: 140.0,
                angle_out,
                interval: 0.05,
            },
            angle,
            latency: Duration::from_micros(micros),
        }
    }

    #[test]
    fn test_spread_of_readings() {
        let spread = Spread::of(&[40.0, 55.0, 70.0, 46.0, 64.0]);

        assert_eq!(spread.count, 5);
        assert_eq!(spread.min, 40.0);
        assert_eq!(spread.max, 70.0);
        assert_relative_eq!(spread.mean, 55.0, epsilon = 1e-9);
        // 总体方差 = (225 + 0 + 225 + 81 + 81) / 5
        assert_relative_eq!(spread.std_dev, (612.0f64 / 5.0).sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_percentiles_are_ordered() {
        let values: Vec<f64> = (1..=200).map(f64::from).collect();
        let spread = Spread::of(&values);

        assert!(spread.min <= spread.p50);
        assert!(spread.p50 <= spread.p95);
        assert!(spread.p95 <= spread.p99);
        assert!(spread.p99 <= spread.max);
        assert!((spread.p50 - 100.5).abs() < 1.0);
    }

    #[test]
    fn test_single_value_has_no_spread() {
        let spread = Spread::of(&[0.25]);
        assert_eq!(spread.std_dev, 0.0);
        assert_relative_eq!(spread.p95, 0.25);
    }

    #[test]
    fn test_empty_report() {
        let summary = ReplaySummary::from_report(&ReplayReport::default());
        assert_eq!(summary.rows(), 0);
        assert_eq!(summary.latency_us, Spread::default());
        assert_eq!(summary.jitter_us(), 0.0);
    }

    #[test]
    fn test_summary_uses_absolute_deviation() {
        let report = ReplayReport {
            outcomes: vec![
                outcome(1, 0.10, 0.30, 12),
                outcome(2, -0.40, -0.10, 18),
                outcome(3, 0.00, 0.00, 15),
            ],
            invalid: None,
        };
        let summary = ReplaySummary::from_report(&report);

        assert_eq!(summary.rows(), 3);
        assert_eq!(summary.latency_us.min, 12.0);
        assert_eq!(summary.latency_us.max, 18.0);
        assert_relative_eq!(summary.latency_us.mean, 15.0, epsilon = 1e-9);
        assert_relative_eq!(summary.deviation.max, 0.3, epsilon = 1e-9);
        assert_relative_eq!(summary.deviation.min, 0.0, epsilon = 1e-9);
    }
}
