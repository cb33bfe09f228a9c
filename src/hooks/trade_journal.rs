//! Trade journal
//!
//! Appends executed trades to a JSON Lines journal.

use crate::event::{Event, EventKind};
use crate::hook::{Hook, HookError, HookOptions};
use crate::store::JsonLinesLog;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const NAME: &str = "trade-journal";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeJournalOptions {
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    /// Push an execution summary to the user
    #[serde(default = "default_true")]
    pub notify: bool,
}

fn default_log_file() -> PathBuf {
    PathBuf::from("logs/trades.log")
}
fn default_true() -> bool {
    true
}

impl Default for TradeJournalOptions {
    fn default() -> Self {
        Self {
            log_file: default_log_file(),
            notify: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    pub timestamp: DateTime<Utc>,
    pub symbol: Option<String>,
    pub side: Option<String>,
    pub quantity: Option<Decimal>,
    pub price: Option<Decimal>,
    pub pnl: Option<Decimal>,
    pub order_id: Option<String>,
    pub exchange: Option<String>,
    pub session_key: Option<String>,
}

impl TradeRecord {
    pub fn from_event(event: &Event) -> Self {
        let ctx = &event.context;
        Self {
            timestamp: event.timestamp,
            symbol: ctx.symbol.clone(),
            side: ctx.side.clone(),
            quantity: ctx.quantity,
            price: ctx.price,
            pnl: ctx.pnl,
            order_id: ctx.order_id.clone(),
            exchange: ctx.exchange.clone(),
            session_key: event.session_key.clone(),
        }
    }

    pub fn summary(&self) -> String {
        let mut out = format!(
            "Executed {} {} {} @ {}",
            self.side.as_deref().unwrap_or("trade"),
            self.quantity.map(|q| q.normalize().to_string()).unwrap_or_else(|| "?".to_string()),
            self.symbol.as_deref().unwrap_or("?"),
            self.price.map(|p| p.normalize().to_string()).unwrap_or_else(|| "market".to_string()),
        );
        if let Some(pnl) = self.pnl {
            out.push_str(&format!(" (P&L {})", pnl.normalize()));
        }
        out
    }
}

pub struct TradeJournal {
    log: JsonLinesLog,
    notify: bool,
}

impl TradeJournal {
    pub fn new(data_dir: &Path, options: TradeJournalOptions) -> Self {
        Self {
            log: JsonLinesLog::new(data_dir.join(options.log_file)),
            notify: options.notify,
        }
    }

    pub fn from_options(data_dir: &Path, options: &HookOptions) -> Result<Self, HookError> {
        Ok(Self::new(data_dir, options.parse(NAME)?))
    }

    pub fn log(&self) -> &JsonLinesLog {
        &self.log
    }
}

#[async_trait]
impl Hook for TradeJournal {
    fn name(&self) -> &'static str {
        NAME
    }

    fn interested(&self, event: &Event) -> bool {
        event.kind == EventKind::TradeExecuted
    }

    async fn handle(&self, event: &mut Event) -> Result<(), HookError> {
        let record = TradeRecord::from_event(event);
        if record.symbol.is_none() {
            tracing::debug!("trade:executed without symbol, ignoring");
            return Ok(());
        }

        self.log.append(&record).await?;
        if self.notify {
            event.push_message(record.summary());
        }
        Ok(())
    }
}
