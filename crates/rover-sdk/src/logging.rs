//! 日志初始化
//!
//! `RUST_LOG` 优先；未设置时使用调用方给出的默认过滤规则。
//! `log` crate 的记录通过 `tracing-log` 转发。输出到 stderr，stdout 留给命令输出。

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// 安装全局日志订阅者（重复调用无效果）
///
/// # Example
///
/// ```
/// rover_sdk::init_logger("rover=info");
/// rover_sdk::init_logger("rover=debug"); // no-op
/// ```
pub fn init_logger(default_directive: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive));

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish();
        // 其他代码可能已经安装过订阅者，此时保留已有的
        if tracing::subscriber::set_global_default(subscriber).is_err() {
            return;
        }
        let _ = tracing_log::LogTracer::init();
    });
}
