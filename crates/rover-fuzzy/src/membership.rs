//! 梯形隶属函数

use crate::error::FuzzyError;

/// 梯形隶属函数 `(a <= b <= c <= d)`
///
/// 隶属度在 `a` 处为 0，线性上升到 `b` 处为 1，保持 1 到 `c`，
/// 再线性下降到 `d` 处为 0。允许 `a == b`（左肩）或 `c == d`（右肩）。
///
/// # Example
///
/// ```
/// use rover_fuzzy::Trapezoid;
///
/// let near = Trapezoid::new(0.0, 0.0, 40.0, 50.0).unwrap();
/// assert_eq!(near.membership(0.0), 1.0);
/// assert_eq!(near.membership(45.0), 0.5);
/// assert_eq!(near.membership(50.0), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trapezoid {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
}

impl Trapezoid {
    /// 创建梯形隶属函数
    ///
    /// # 错误
    /// - `FuzzyError::InvalidTrapezoid`: 断点无序或包含非有限值
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Result<Self, FuzzyError> {
        let finite = a.is_finite() && b.is_finite() && c.is_finite() && d.is_finite();
        if !finite || a > b || b > c || c > d {
            return Err(FuzzyError::InvalidTrapezoid { a, b, c, d });
        }
        Ok(Self { a, b, c, d })
    }

    /// 四个断点 `(a, b, c, d)`
    pub fn breakpoints(&self) -> (f64, f64, f64, f64) {
        (self.a, self.b, self.c, self.d)
    }

    /// 支撑集 `[a, d]`
    pub fn support(&self) -> (f64, f64) {
        (self.a, self.d)
    }

    /// 计算 `x` 处的隶属度，结果在 `[0, 1]`
    pub fn membership(&self, x: f64) -> f64 {
        if x < self.a || x > self.d {
            0.0
        } else if x < self.b {
            // 此分支 a < b 必然成立
            (x - self.a) / (self.b - self.a)
        } else if x <= self.c {
            1.0
        } else if x < self.d {
            (self.d - x) / (self.d - self.c)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rejects_unordered_breakpoints() {
        assert!(Trapezoid::new(0.0, 10.0, 5.0, 20.0).is_err());
        assert!(Trapezoid::new(0.0, f64::NAN, 5.0, 20.0).is_err());
        assert!(Trapezoid::new(0.0, 0.0, 0.0, 0.0).is_ok());
    }

    #[test]
    fn test_interior_shape() {
        let t = Trapezoid::new(40.0, 50.0, 90.0, 100.0).unwrap();
        assert_eq!(t.membership(30.0), 0.0);
        assert_eq!(t.membership(40.0), 0.0);
        assert_relative_eq!(t.membership(42.5), 0.25);
        assert_eq!(t.membership(50.0), 1.0);
        assert_eq!(t.membership(70.0), 1.0);
        assert_eq!(t.membership(90.0), 1.0);
        assert_relative_eq!(t.membership(95.0), 0.5);
        assert_eq!(t.membership(100.0), 0.0);
        assert_eq!(t.membership(120.0), 0.0);
    }

    #[test]
    fn test_shoulders() {
        let left = Trapezoid::new(-1.0, -1.0, -0.7, -0.5).unwrap();
        assert_eq!(left.membership(-1.0), 1.0);
        assert_eq!(left.membership(-1.5), 0.0);

        let right = Trapezoid::new(90.0, 100.0, 140.0, 140.0).unwrap();
        assert_eq!(right.membership(140.0), 1.0);
        assert_eq!(right.membership(140.1), 0.0);
    }
}
