//! Price target alerts
//!
//! Keeps a book of price targets (take profit, stop loss, support,
//! resistance) and fires an alert the first time a `price_tick` crosses
//! one. A fired target moves from the active list to a bounded history and
//! can never fire again.

use crate::event::{Event, EventKind};
use crate::hook::{Hook, HookError, HookOptions};
use crate::store::{SnapshotStore, StoreResult};
use crate::telemetry::record_alerts;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use uuid::Uuid;

pub const NAME: &str = "target-hit";

/// Which side of the threshold triggers the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Fires when `price >= threshold`
    Above,
    /// Fires when `price <= threshold`
    Below,
}

impl Direction {
    pub fn is_hit(self, price: Decimal, threshold: Decimal) -> bool {
        match self {
            Direction::Above => price >= threshold,
            Direction::Below => price <= threshold,
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "above" => Ok(Direction::Above),
            "below" => Ok(Direction::Below),
            other => Err(format!("unknown direction '{other}', expected above or below")),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Above => f.write_str("above"),
            Direction::Below => f.write_str("below"),
        }
    }
}

/// Purpose of a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// Take profit
    Tp,
    /// Stop loss
    Sl,
    Support,
    Resistance,
}

impl TargetKind {
    pub fn label(self) -> &'static str {
        match self {
            TargetKind::Tp => "take profit",
            TargetKind::Sl => "stop loss",
            TargetKind::Support => "support",
            TargetKind::Resistance => "resistance",
        }
    }
}

impl FromStr for TargetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tp" => Ok(TargetKind::Tp),
            "sl" => Ok(TargetKind::Sl),
            "support" => Ok(TargetKind::Support),
            "resistance" => Ok(TargetKind::Resistance),
            other => Err(format!(
                "unknown target type '{other}', expected tp, sl, support or resistance"
            )),
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TargetKind::Tp => "tp",
            TargetKind::Sl => "sl",
            TargetKind::Support => "support",
            TargetKind::Resistance => "resistance",
        };
        f.write_str(s)
    }
}

/// An active price target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceTarget {
    pub id: Uuid,
    pub symbol: String,
    pub price: Decimal,
    pub direction: Direction,
    #[serde(rename = "type")]
    pub kind: TargetKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub triggered: bool,
}

impl PriceTarget {
    pub fn new(
        symbol: impl Into<String>,
        price: Decimal,
        direction: Direction,
        kind: TargetKind,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: symbol.into(),
            price,
            direction,
            kind,
            note: None,
            created_at: Utc::now(),
            triggered: false,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Whether a tick for `symbol` at `price` fires this target
    pub fn matches(&self, symbol: &str, price: Decimal) -> bool {
        !self.triggered
            && self.symbol.eq_ignore_ascii_case(symbol)
            && self.direction.is_hit(price, self.price)
    }
}

/// A target that has fired
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggeredTarget {
    pub id: Uuid,
    pub symbol: String,
    pub price: Decimal,
    pub direction: Direction,
    #[serde(rename = "type")]
    pub kind: TargetKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub price_at_trigger: Decimal,
    pub triggered_at: DateTime<Utc>,
}

impl TriggeredTarget {
    fn from_target(target: PriceTarget, price_at_trigger: Decimal, at: DateTime<Utc>) -> Self {
        Self {
            id: target.id,
            symbol: target.symbol,
            price: target.price,
            direction: target.direction,
            kind: target.kind,
            note: target.note,
            created_at: target.created_at,
            price_at_trigger,
            triggered_at: at,
        }
    }

    /// User-facing alert line
    pub fn alert_message(&self) -> String {
        let cmp = match self.direction {
            Direction::Above => ">=",
            Direction::Below => "<=",
        };
        let mut message = format!(
            "Target hit: {} {} at {} ({} {} {})",
            self.symbol,
            self.kind.label(),
            self.price_at_trigger,
            self.price_at_trigger,
            cmp,
            self.price
        );
        if let Some(note) = &self.note {
            message.push_str(" - ");
            message.push_str(note);
        }
        message
    }
}

/// Persisted target state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetBook {
    #[serde(default)]
    pub targets: Vec<PriceTarget>,
    #[serde(default)]
    pub history: Vec<TriggeredTarget>,
}

impl TargetBook {
    pub fn add(&mut self, target: PriceTarget) {
        self.targets.push(target);
    }

    /// Remove an active target by id
    pub fn remove(&mut self, id: Uuid) -> Option<PriceTarget> {
        let idx = self.targets.iter().position(|t| t.id == id)?;
        Some(self.targets.remove(idx))
    }

    /// Active targets for a symbol
    pub fn for_symbol<'a>(&'a self, symbol: &'a str) -> impl Iterator<Item = &'a PriceTarget> {
        self.targets
            .iter()
            .filter(move |t| t.symbol.eq_ignore_ascii_case(symbol))
    }

    /// Apply a price tick
    ///
    /// Fired targets leave the active list and are appended to the history.
    /// When the history grows past `history_cap` only the last
    /// `history_keep` entries are retained.
    pub fn evaluate(
        &mut self,
        symbol: &str,
        price: Decimal,
        at: DateTime<Utc>,
        history_cap: usize,
        history_keep: usize,
    ) -> Vec<TriggeredTarget> {
        let (fired, active): (Vec<_>, Vec<_>) = std::mem::take(&mut self.targets)
            .into_iter()
            .partition(|t| t.matches(symbol, price));
        self.targets = active;

        let fired: Vec<TriggeredTarget> = fired
            .into_iter()
            .map(|mut t| {
                t.triggered = true;
                TriggeredTarget::from_target(t, price, at)
            })
            .collect();

        if !fired.is_empty() {
            self.history.extend(fired.iter().cloned());
            if self.history.len() > history_cap {
                let excess = self.history.len().saturating_sub(history_keep);
                self.history.drain(..excess);
            }
        }

        fired
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetHitOptions {
    /// State file, relative to the data directory
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,
    #[serde(default = "default_history_keep")]
    pub history_keep: usize,
}

fn default_state_file() -> PathBuf {
    PathBuf::from("targets/price-targets.json")
}
fn default_history_cap() -> usize {
    100
}
fn default_history_keep() -> usize {
    50
}

impl Default for TargetHitOptions {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
            history_cap: default_history_cap(),
            history_keep: default_history_keep(),
        }
    }
}

impl TargetHitOptions {
    pub fn store(&self, data_dir: &Path) -> SnapshotStore<TargetBook> {
        SnapshotStore::new(data_dir.join(&self.state_file))
    }
}

pub struct TargetHit {
    store: SnapshotStore<TargetBook>,
    history_cap: usize,
    history_keep: usize,
}

impl TargetHit {
    pub fn new(data_dir: &Path, options: TargetHitOptions) -> Self {
        Self {
            store: options.store(data_dir),
            history_cap: options.history_cap,
            history_keep: options.history_keep.min(options.history_cap),
        }
    }

    pub fn from_options(data_dir: &Path, options: &HookOptions) -> Result<Self, HookError> {
        Ok(Self::new(data_dir, options.parse(NAME)?))
    }

    /// Current target book
    pub async fn book(&self) -> StoreResult<TargetBook> {
        self.store.load().await
    }
}

#[async_trait]
impl Hook for TargetHit {
    fn name(&self) -> &'static str {
        NAME
    }

    fn interested(&self, event: &Event) -> bool {
        event.kind == EventKind::PriceTick
    }

    async fn handle(&self, event: &mut Event) -> Result<(), HookError> {
        let (Some(symbol), Some(price)) = (event.context.symbol.clone(), event.context.price)
        else {
            tracing::debug!("price_tick without symbol or price, ignoring");
            return Ok(());
        };

        let mut book = self.store.load().await?;
        let fired = book.evaluate(
            &symbol,
            price,
            event.timestamp,
            self.history_cap,
            self.history_keep,
        );

        if fired.is_empty() {
            return Ok(());
        }

        self.store.save(&book).await?;
        record_alerts(NAME, fired.len());

        for hit in &fired {
            tracing::info!(
                symbol = %hit.symbol,
                kind = %hit.kind,
                threshold = %hit.price,
                price = %hit.price_at_trigger,
                "Price target hit"
            );
            event.push_message(hit.alert_message());
        }

        Ok(())
    }
}
