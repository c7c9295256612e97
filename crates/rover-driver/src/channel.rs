//! 测距通道与最新值寄存器
//!
//! 每个通道的轮询线程是其寄存器的唯一写者，控制周期每拍读取一次。
//! f64 以位模式存入 `AtomicU64`，单次原子读写即可保证读到完整的值，无需加锁。

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

/// 测距通道（前向三路）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChannelId {
    Front = 0,
    FrontLeft = 1,
    FrontRight = 2,
}

impl ChannelId {
    /// 固定的求值顺序：front, front_left, front_right
    pub const ALL: [ChannelId; 3] = [ChannelId::Front, ChannelId::FrontLeft, ChannelId::FrontRight];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            ChannelId::Front => "front",
            ChannelId::FrontLeft => "front_left",
            ChannelId::FrontRight => "front_right",
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChannelId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "front" => Ok(ChannelId::Front),
            "front_left" | "front-left" => Ok(ChannelId::FrontLeft),
            "front_right" | "front-right" => Ok(ChannelId::FrontRight),
            other => Err(format!(
                "unknown channel '{}', expected front, front_left or front_right",
                other
            )),
        }
    }
}

/// 最新值寄存器（单写者、单读者，无锁）
#[derive(Debug)]
pub struct DistanceRegister {
    bits: AtomicU64,
}

impl DistanceRegister {
    pub fn new(initial_cm: f64) -> Self {
        Self {
            bits: AtomicU64::new(initial_cm.to_bits()),
        }
    }

    /// 发布新值
    pub fn store(&self, distance_cm: f64) {
        self.bits.store(distance_cm.to_bits(), Ordering::Release);
    }

    /// 读取最近发布的值
    pub fn load(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }
}

/// 三路距离的一次读取
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelDistances {
    pub front: f64,
    pub front_left: f64,
    pub front_right: f64,
}

impl ChannelDistances {
    pub fn new(front: f64, front_left: f64, front_right: f64) -> Self {
        Self {
            front,
            front_left,
            front_right,
        }
    }

    /// 所有通道相同距离
    pub fn uniform(distance_cm: f64) -> Self {
        Self::new(distance_cm, distance_cm, distance_cm)
    }

    pub fn get(&self, channel: ChannelId) -> f64 {
        match channel {
            ChannelId::Front => self.front,
            ChannelId::FrontLeft => self.front_left,
            ChannelId::FrontRight => self.front_right,
        }
    }

    pub fn set(&mut self, channel: ChannelId, distance_cm: f64) {
        match channel {
            ChannelId::Front => self.front = distance_cm,
            ChannelId::FrontLeft => self.front_left = distance_cm,
            ChannelId::FrontRight => self.front_right = distance_cm,
        }
    }

    /// 按固定顺序迭代 `(channel, distance)`
    pub fn iter(&self) -> impl Iterator<Item = (ChannelId, f64)> + '_ {
        ChannelId::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}
