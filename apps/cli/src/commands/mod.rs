//! 命令定义和实现

pub mod config;
pub mod eval;
pub mod replay;
pub mod rules;
pub mod simulate;
pub mod sonar;

pub use config::ConfigCommand;
pub use eval::EvalCommand;
pub use replay::ReplayCommand;
pub use rules::RulesCommand;
pub use simulate::SimulateCommand;
pub use sonar::SonarCommand;
