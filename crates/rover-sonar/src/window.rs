//! 定长环形窗口
//!
//! 满员后追加新值会丢弃最旧的值。迭代顺序总是从旧到新。

/// 定长环形窗口（f64）
#[derive(Debug, Clone, PartialEq)]
pub struct RingWindow {
    buf: Vec<f64>,
    /// 下一个写入位置
    head: usize,
    len: usize,
}

impl RingWindow {
    /// 创建空窗口
    ///
    /// `capacity` 为 0 时按 1 处理。
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0.0; capacity.max(1)],
            head: 0,
            len: 0,
        }
    }

    /// 创建已填满 `value` 的窗口
    pub fn filled(capacity: usize, value: f64) -> Self {
        let capacity = capacity.max(1);
        Self {
            buf: vec![value; capacity],
            head: 0,
            len: capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.buf.len()
    }

    /// 追加一个值，满员时丢弃最旧的值
    pub fn push(&mut self, value: f64) {
        self.buf[self.head] = value;
        self.head = (self.head + 1) % self.buf.len();
        if self.len < self.buf.len() {
            self.len += 1;
        }
    }

    /// 最新的值
    pub fn latest(&self) -> Option<f64> {
        if self.len == 0 {
            return None;
        }
        let idx = (self.head + self.buf.len() - 1) % self.buf.len();
        Some(self.buf[idx])
    }

    /// 算术平均，空窗口返回 `None`
    pub fn mean(&self) -> Option<f64> {
        if self.len == 0 {
            return None;
        }
        Some(self.iter().sum::<f64>() / self.len as f64)
    }

    /// 从旧到新迭代
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let cap = self.buf.len();
        let start = (self.head + cap - self.len) % cap;
        (0..self.len).map(move |i| self.buf[(start + i) % cap])
    }

    /// 清空
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }
}
