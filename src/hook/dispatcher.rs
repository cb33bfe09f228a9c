//! Event fan-out to hooks

use super::Hook;
use crate::event::Event;
use crate::telemetry::record_invocation;
use futures_util::future::join_all;
use futures_util::FutureExt;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

/// Result of running one hook against one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "lowercase")]
pub enum HookOutcome {
    /// Hook was not interested in the event
    Skipped,
    /// Hook ran to completion
    Completed,
    /// Hook returned an error or panicked
    Failed(String),
}

impl HookOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            HookOutcome::Skipped => "skipped",
            HookOutcome::Completed => "completed",
            HookOutcome::Failed(_) => "failed",
        }
    }
}

/// Per-hook report for a dispatched event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookReport {
    pub hook: &'static str,
    pub outcome: HookOutcome,
}

/// Runs registered hooks for each event
///
/// Interested hooks run concurrently, each on its own copy of the event, so
/// no ordering holds across hook types. A dispatch finishes before it
/// returns, which keeps invocations of the same hook sequential.
#[derive(Clone, Default)]
pub struct Dispatcher {
    hooks: Vec<Arc<dyn Hook>>,
}

impl Dispatcher {
    pub fn new(hooks: Vec<Arc<dyn Hook>>) -> Self {
        Self { hooks }
    }

    /// Register another hook
    pub fn register(&mut self, hook: Arc<dyn Hook>) {
        self.hooks.push(hook);
    }

    /// Names of registered hooks in registration order
    pub fn hook_names(&self) -> Vec<&'static str> {
        self.hooks.iter().map(|h| h.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Dispatch one event
    ///
    /// Messages pushed by hooks are appended to `event.messages` in
    /// registration order once all hooks finished.
    pub async fn dispatch(&self, event: &mut Event) -> Vec<HookReport> {
        let base_len = event.messages.len();

        let tasks: Vec<_> = self
            .hooks
            .iter()
            .map(|hook| {
                let hook = Arc::clone(hook);
                let mut local = event.clone();
                async move {
                    if !hook.interested(&local) {
                        return (
                            HookReport {
                                hook: hook.name(),
                                outcome: HookOutcome::Skipped,
                            },
                            Vec::new(),
                        );
                    }

                    let start = Instant::now();
                    let result = AssertUnwindSafe(hook.handle(&mut local))
                        .catch_unwind()
                        .await;

                    let outcome = match result {
                        Ok(Ok(())) => HookOutcome::Completed,
                        Ok(Err(e)) => {
                            tracing::error!(hook = hook.name(), error = %e, "Hook failed");
                            HookOutcome::Failed(e.to_string())
                        }
                        Err(_) => {
                            tracing::error!(hook = hook.name(), "Hook panicked");
                            HookOutcome::Failed("hook panicked".to_string())
                        }
                    };
                    record_invocation(hook.name(), outcome.label(), start.elapsed());

                    let pushed = local.messages.split_off(base_len.min(local.messages.len()));
                    (
                        HookReport {
                            hook: hook.name(),
                            outcome,
                        },
                        pushed,
                    )
                }
            })
            .collect();

        let results = join_all(tasks).await;

        let mut reports = Vec::with_capacity(results.len());
        for (report, pushed) in results {
            event.messages.extend(pushed);
            reports.push(report);
        }

        tracing::debug!(
            event = %event.kind,
            ran = reports.iter().filter(|r| r.outcome != HookOutcome::Skipped).count(),
            messages = event.messages.len() - base_len,
            "Event dispatched"
        );

        reports
    }
}
