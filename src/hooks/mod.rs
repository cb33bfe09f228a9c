//! Built-in hooks
//!
//! Each hook reads its flat option table from `[hooks.<name>]` and is
//! skipped when `enabled = false`.

pub mod command_logger;
pub mod correlation_monitor;
pub mod position_guard;
pub mod session_memory;
pub mod signal_sizer;
pub mod spread_monitor;
pub mod target_hit;
pub mod trade_journal;

pub use command_logger::CommandLogger;
pub use correlation_monitor::CorrelationMonitor;
pub use position_guard::PositionGuard;
pub use session_memory::SessionMemory;
pub use signal_sizer::SignalSizer;
pub use spread_monitor::SpreadMonitor;
pub use target_hit::TargetHit;
pub use trade_journal::TradeJournal;

use crate::config::Config;
use crate::hook::{Dispatcher, Hook, HookError, HookOptions};
use std::path::Path;
use std::sync::Arc;

/// Names of all built-in hooks in registration order
pub const HOOK_NAMES: [&str; 8] = [
    command_logger::NAME,
    session_memory::NAME,
    target_hit::NAME,
    spread_monitor::NAME,
    correlation_monitor::NAME,
    trade_journal::NAME,
    position_guard::NAME,
    signal_sizer::NAME,
];

fn build_hook(
    name: &str,
    data_dir: &Path,
    options: &HookOptions,
) -> Result<Option<Arc<dyn Hook>>, HookError> {
    let hook: Arc<dyn Hook> = match name {
        command_logger::NAME => Arc::new(CommandLogger::from_options(data_dir, options)?),
        session_memory::NAME => Arc::new(SessionMemory::from_options(data_dir, options)?),
        target_hit::NAME => Arc::new(TargetHit::from_options(data_dir, options)?),
        spread_monitor::NAME => Arc::new(SpreadMonitor::from_options(data_dir, options)?),
        correlation_monitor::NAME => Arc::new(CorrelationMonitor::from_options(data_dir, options)?),
        trade_journal::NAME => Arc::new(TradeJournal::from_options(data_dir, options)?),
        position_guard::NAME => Arc::new(PositionGuard::from_options(data_dir, options)?),
        signal_sizer::NAME => Arc::new(SignalSizer::from_options(options)?),
        _ => return Ok(None),
    };
    Ok(Some(hook))
}

/// Build every enabled built-in hook
pub fn build_hooks(config: &Config) -> Result<Vec<Arc<dyn Hook>>, HookError> {
    for name in config.hooks.keys() {
        if !HOOK_NAMES.contains(&name.as_str()) {
            tracing::warn!(hook = %name, "Ignoring options for unknown hook");
        }
    }

    let mut hooks = Vec::new();
    for name in HOOK_NAMES {
        let options = config.hook_options(name);
        if !options.enabled() {
            tracing::info!(hook = name, "Hook disabled");
            continue;
        }
        if let Some(hook) = build_hook(name, &config.data_dir, &options)? {
            hooks.push(hook);
        }
    }

    Ok(hooks)
}

/// Dispatcher with every enabled built-in hook registered
pub fn dispatcher(config: &Config) -> Result<Dispatcher, HookError> {
    Ok(Dispatcher::new(build_hooks(config)?))
}
