//! # 采样文件
//!
//! 两种 CSV（首行为表头，按列位置读取，表头名称不参与解析）：
//!
//! - 回放文件：`angle_in, left, center, right, angle_out, interval`
//!   （实车记录：输入角、三路距离、当时输出的角度、控制周期秒数）
//! - 标注文件：`id, angle, left, center, right, rule`
//!
//! 回放在第一条越界的行停止，之前的结果保留在报告中。

use csv::{ReaderBuilder, StringRecord, Trim};
use rover_fuzzy::{FuzzyError, FuzzySteering, Sample};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::{Duration, Instant};
use thiserror::Error;

/// 采样文件错误
#[derive(Error, Debug)]
pub enum SampleError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Row {row}: expected {expected} columns, found {found}")]
    ColumnCount {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// 回放文件的一行
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplayRow {
    pub angle_in: f64,
    pub left: f64,
    pub center: f64,
    pub right: f64,
    /// 记录时实际输出的角度
    pub angle_out: f64,
    /// 记录时的控制周期（秒）
    pub interval: f64,
}

impl ReplayRow {
    pub fn sample(&self) -> Sample {
        Sample::new(self.angle_in, self.left, self.center, self.right)
    }
}

/// 标注文件的一行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelledRow {
    pub id: String,
    pub angle: f64,
    pub left: f64,
    pub center: f64,
    pub right: f64,
    /// 期望命中的规则（自由文本）
    pub rule: String,
}

impl LabelledRow {
    pub fn sample(&self) -> Sample {
        Sample::new(self.angle, self.left, self.center, self.right)
    }
}

/// 回放单行的结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplayOutcome {
    /// 数据行号（从 1 开始，不含表头）
    pub row: usize,
    pub input: ReplayRow,
    /// 计算得到的修正角
    pub angle: f64,
    /// 单次推理耗时
    pub latency: Duration,
}

impl ReplayOutcome {
    /// 与记录中的输出角之差
    pub fn deviation(&self) -> f64 {
        self.angle - self.input.angle_out
    }
}

/// 回放停止处的越界行
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidRow {
    pub row: usize,
    pub error: FuzzyError,
}

/// 回放报告
#[derive(Debug, Clone, Default)]
pub struct ReplayReport {
    pub outcomes: Vec<ReplayOutcome>,
    /// 第一条越界的行（如有），回放在此停止
    pub invalid: Option<InvalidRow>,
}

impl ReplayReport {
    /// 每行推理耗时（微秒）
    pub fn latencies_us(&self) -> Vec<u64> {
        self.outcomes
            .iter()
            .map(|o| o.latency.as_micros() as u64)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.invalid.is_none()
    }
}

/// 标注行的评估结果
#[derive(Debug, Clone, PartialEq)]
pub struct LabelledOutcome {
    pub row: LabelledRow,
    /// 修正角；越界行为对应的错误
    pub result: Result<f64, FuzzyError>,
}

fn reader<R: Read>(input: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(input)
}

fn read_rows<R, T>(input: R, expected: usize) -> Result<Vec<T>, SampleError>
where
    R: Read,
    T: for<'de> Deserialize<'de>,
{
    let mut rdr = reader(input);
    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    let mut row = 0;
    while rdr.read_record(&mut record)? {
        row += 1;
        if record.len() < expected {
            return Err(SampleError::ColumnCount {
                row,
                expected,
                found: record.len(),
            });
        }
        // 按位置反序列化，多余的列忽略
        let trimmed: StringRecord = record.iter().take(expected).collect();
        rows.push(trimmed.deserialize(None)?);
    }
    Ok(rows)
}

/// 读取回放 CSV
pub fn read_replay<R: Read>(input: R) -> Result<Vec<ReplayRow>, SampleError> {
    read_rows(input, 6)
}

pub fn read_replay_file<P: AsRef<Path>>(path: P) -> Result<Vec<ReplayRow>, SampleError> {
    read_replay(File::open(path)?)
}

/// 读取标注 CSV
pub fn read_labelled<R: Read>(input: R) -> Result<Vec<LabelledRow>, SampleError> {
    read_rows(input, 6)
}

pub fn read_labelled_file<P: AsRef<Path>>(path: P) -> Result<Vec<LabelledRow>, SampleError> {
    read_labelled(File::open(path)?)
}

/// 逐行推理并计时，遇到第一条越界的行停止
pub fn replay(steering: &FuzzySteering, rows: &[ReplayRow]) -> ReplayReport {
    let mut report = ReplayReport {
        outcomes: Vec::with_capacity(rows.len()),
        invalid: None,
    };
    for (i, input) in rows.iter().enumerate() {
        let row = i + 1;
        let sample = input.sample();
        let start = Instant::now();
        match steering.evaluate(&sample) {
            Ok(angle) => report.outcomes.push(ReplayOutcome {
                row,
                input: *input,
                angle,
                latency: start.elapsed(),
            }),
            Err(error) => {
                report.invalid = Some(InvalidRow { row, error });
                break;
            },
        }
    }
    report
}

/// 逐行评估标注文件（越界行单独记录错误，不中断）
pub fn evaluate_labelled(steering: &FuzzySteering, rows: Vec<LabelledRow>) -> Vec<LabelledOutcome> {
    rows.into_iter()
        .map(|row| {
            let result = steering.evaluate(&row.sample());
            LabelledOutcome { row, result }
        })
        .collect()
}
