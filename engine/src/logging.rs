//! 日志初始化（仅供二进制入口使用）
//!
//! 库代码只通过 `tracing` 宏输出事件，不安装 subscriber；
//! 未初始化时日志被丢弃，行为不受影响。

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// 默认过滤级别，可被 `RUST_LOG` 覆盖
const DEFAULT_FILTER: &str = "env_vault=info";

pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "env_vault=debug" } else { DEFAULT_FILTER })
    });

    // 重复初始化（例如测试中）时忽略错误
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
