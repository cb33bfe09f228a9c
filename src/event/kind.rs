//! Event kind names

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named event family emitted by the gateway
///
/// Unknown names are preserved in [`EventKind::Other`] so they round-trip
/// unchanged and simply match no hook.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    /// Chat command issued by a user (`/new`, `/reset`, ...)
    Command,
    /// Order filled on an exchange or broker
    TradeExecuted,
    /// Market data update (price or top of book)
    MarketTick,
    /// Last-trade price update used for price alerts
    PriceTick,
    /// Portfolio positions changed
    PortfolioChanged,
    /// Trading signal received from a signal source
    SignalReceived,
    /// Any other event name
    Other(String),
}

impl EventKind {
    /// Wire name of the event kind
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Command => "command",
            EventKind::TradeExecuted => "trade:executed",
            EventKind::MarketTick => "market:tick",
            EventKind::PriceTick => "price_tick",
            EventKind::PortfolioChanged => "portfolio:changed",
            EventKind::SignalReceived => "signal:received",
            EventKind::Other(name) => name,
        }
    }
}

impl From<&str> for EventKind {
    fn from(name: &str) -> Self {
        match name {
            "command" => EventKind::Command,
            "trade:executed" => EventKind::TradeExecuted,
            "market:tick" => EventKind::MarketTick,
            "price_tick" => EventKind::PriceTick,
            "portfolio:changed" => EventKind::PortfolioChanged,
            "signal:received" => EventKind::SignalReceived,
            other => EventKind::Other(other.to_string()),
        }
    }
}

impl From<String> for EventKind {
    fn from(name: String) -> Self {
        EventKind::from(name.as_str())
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
