//! Hook contract
//!
//! A hook is a self-contained reaction to one family of events. The
//! dispatcher asks every hook whether it cares about an event and runs the
//! interested ones; a hook failure never reaches the caller.

mod dispatcher;
mod error;
mod options;

pub use dispatcher::{Dispatcher, HookOutcome, HookReport};
pub use error::HookError;
pub use options::HookOptions;

use crate::event::Event;
use async_trait::async_trait;

/// Trait for event hook implementations
#[async_trait]
pub trait Hook: Send + Sync {
    /// Stable hook identifier, also the configuration table name
    fn name(&self) -> &'static str;

    /// Cheap filter on event kind/action
    ///
    /// Events rejected here must not cause any side effect.
    fn interested(&self, event: &Event) -> bool;

    /// React to an event the hook declared interest in
    ///
    /// Missing context is a silent no-op (`Ok(())`), not an error.
    async fn handle(&self, event: &mut Event) -> Result<(), HookError>;
}
