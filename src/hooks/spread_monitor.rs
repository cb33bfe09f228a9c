//! Bid/ask spread monitoring
//!
//! Keeps a rolling window of spread snapshots per symbol and exchange and
//! alerts on spreads that are wide in absolute terms or unusually wide
//! compared to the window.

use crate::event::{Event, EventKind};
use crate::hook::{Hook, HookError, HookOptions};
use crate::stats::{mean, std_dev};
use crate::store::{JsonLinesLog, SnapshotStore, StoreResult};
use crate::telemetry::record_alerts;
use async_trait::async_trait;
use chrono::{DateTime, Timelike, Utc};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const NAME: &str = "spread-monitor";

const DEFAULT_EXCHANGE: &str = "default";

/// Top-of-book spread at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadSnapshot {
    pub timestamp: DateTime<Utc>,
    pub bid: f64,
    pub ask: f64,
    pub spread: f64,
    pub mid: f64,
    pub spread_pct: f64,
    pub spread_bps: f64,
}

impl SpreadSnapshot {
    /// Derive spread figures; `None` when the mid price is not positive
    pub fn new(bid: f64, ask: f64, timestamp: DateTime<Utc>) -> Option<Self> {
        let mid = (bid + ask) / 2.0;
        if !(mid > 0.0) || !mid.is_finite() {
            return None;
        }
        let spread = ask - bid;
        let spread_pct = spread / mid * 100.0;

        Some(Self {
            timestamp,
            bid,
            ask,
            spread,
            mid,
            spread_pct,
            spread_bps: spread_pct * 100.0,
        })
    }
}

/// Statistics of `spreadPct` over a window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadStats {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    /// Mean spread percentage per UTC hour of day (only hours with samples)
    pub by_hour: BTreeMap<u32, f64>,
}

impl SpreadStats {
    pub fn from_window(window: &[SpreadSnapshot]) -> Self {
        let pcts: Vec<f64> = window.iter().map(|s| s.spread_pct).collect();

        let mut buckets: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
        for snapshot in window {
            buckets
                .entry(snapshot.timestamp.hour())
                .or_default()
                .push(snapshot.spread_pct);
        }
        let by_hour = buckets
            .into_iter()
            .map(|(hour, values)| (hour, mean(&values)))
            .collect();

        Self {
            count: window.len(),
            mean: mean(&pcts),
            std_dev: std_dev(&pcts),
            by_hour,
        }
    }
}

/// Why a spread alert fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreadAlertReason {
    /// Above the configured absolute threshold
    AboveThreshold,
    /// Far above the window mean
    Anomaly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadAlert {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub exchange: String,
    pub reason: SpreadAlertReason,
    pub spread_pct: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub samples: usize,
}

impl SpreadAlert {
    pub fn message(&self) -> String {
        match self.reason {
            SpreadAlertReason::AboveThreshold => format!(
                "Wide spread on {} ({}): {:.4}%",
                self.symbol, self.exchange, self.spread_pct
            ),
            SpreadAlertReason::Anomaly => format!(
                "Unusual spread on {} ({}): {:.4}% vs mean {:.4}% (sd {:.4}%)",
                self.symbol, self.exchange, self.spread_pct, self.mean, self.std_dev
            ),
        }
    }
}

/// Persisted spread windows keyed by `SYMBOL@exchange`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpreadHistory {
    #[serde(default)]
    pub windows: BTreeMap<String, Vec<SpreadSnapshot>>,
    /// Stats of each window as of its latest snapshot
    #[serde(default)]
    pub stats: BTreeMap<String, SpreadStats>,
}

impl SpreadHistory {
    pub fn key(symbol: &str, exchange: &str) -> String {
        format!("{}@{}", symbol.to_ascii_uppercase(), exchange)
    }

    /// Append a snapshot, keeping at most `max_samples` per window
    pub fn record(&mut self, key: &str, snapshot: SpreadSnapshot, max_samples: usize) -> &[SpreadSnapshot] {
        let window = self.windows.entry(key.to_string()).or_default();
        window.push(snapshot);
        if window.len() > max_samples {
            let excess = window.len() - max_samples;
            window.drain(..excess);
        }
        window
    }

    pub fn window(&self, key: &str) -> Option<&[SpreadSnapshot]> {
        self.windows.get(key).map(Vec::as_slice)
    }

    /// Recompute and keep the stats of a window
    pub fn refresh_stats(&mut self, key: &str) -> SpreadStats {
        let stats = SpreadStats::from_window(self.window(key).unwrap_or(&[]));
        self.stats.insert(key.to_string(), stats.clone());
        stats
    }

    pub fn stats(&self, key: &str) -> Option<&SpreadStats> {
        self.stats.get(key)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadMonitorOptions {
    /// Absolute alert level, in percent of mid
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold: f64,
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,
    /// Window size above which the statistical check applies
    #[serde(default = "default_min_samples_for_stats")]
    pub min_samples_for_stats: usize,
    #[serde(default = "default_stddev_multiplier")]
    pub stddev_multiplier: f64,
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
    #[serde(default = "default_alert_log")]
    pub alert_log: PathBuf,
}

fn default_alert_threshold() -> f64 {
    0.5
}
fn default_max_samples() -> usize {
    1500
}
fn default_min_samples_for_stats() -> usize {
    100
}
fn default_stddev_multiplier() -> f64 {
    2.0
}
fn default_state_file() -> PathBuf {
    PathBuf::from("spread/spread-history.json")
}
fn default_alert_log() -> PathBuf {
    PathBuf::from("spread/alerts.log")
}

impl Default for SpreadMonitorOptions {
    fn default() -> Self {
        Self {
            alert_threshold: default_alert_threshold(),
            max_samples: default_max_samples(),
            min_samples_for_stats: default_min_samples_for_stats(),
            stddev_multiplier: default_stddev_multiplier(),
            state_file: default_state_file(),
            alert_log: default_alert_log(),
        }
    }
}

impl SpreadMonitorOptions {
    /// Decide whether the current snapshot warrants an alert
    pub fn evaluate(&self, current: &SpreadSnapshot, stats: &SpreadStats) -> Option<SpreadAlertReason> {
        if current.spread_pct > self.alert_threshold {
            return Some(SpreadAlertReason::AboveThreshold);
        }
        if stats.count > self.min_samples_for_stats
            && current.spread_pct > stats.mean + self.stddev_multiplier * stats.std_dev
        {
            return Some(SpreadAlertReason::Anomaly);
        }
        None
    }
}

pub struct SpreadMonitor {
    options: SpreadMonitorOptions,
    store: SnapshotStore<SpreadHistory>,
    alerts: JsonLinesLog,
}

impl SpreadMonitor {
    pub fn new(data_dir: &Path, options: SpreadMonitorOptions) -> Self {
        Self {
            store: SnapshotStore::new(data_dir.join(&options.state_file)),
            alerts: JsonLinesLog::new(data_dir.join(&options.alert_log)),
            options,
        }
    }

    pub fn from_options(data_dir: &Path, options: &HookOptions) -> Result<Self, HookError> {
        Ok(Self::new(data_dir, options.parse(NAME)?))
    }

    pub async fn history(&self) -> StoreResult<SpreadHistory> {
        self.store.load().await
    }

    pub fn alert_log(&self) -> &JsonLinesLog {
        &self.alerts
    }
}

#[async_trait]
impl Hook for SpreadMonitor {
    fn name(&self) -> &'static str {
        NAME
    }

    fn interested(&self, event: &Event) -> bool {
        event.kind == EventKind::MarketTick
            && event.context.bid.is_some()
            && event.context.ask.is_some()
    }

    async fn handle(&self, event: &mut Event) -> Result<(), HookError> {
        let ctx = &event.context;
        let (Some(symbol), Some(bid), Some(ask)) = (ctx.symbol.clone(), ctx.bid, ctx.ask) else {
            tracing::debug!("market:tick without symbol, bid or ask, ignoring");
            return Ok(());
        };
        let exchange = ctx
            .exchange
            .clone()
            .unwrap_or_else(|| DEFAULT_EXCHANGE.to_string());

        let (Some(bid), Some(ask)) = (bid.to_f64(), ask.to_f64()) else {
            return Ok(());
        };
        let Some(snapshot) = SpreadSnapshot::new(bid, ask, event.timestamp) else {
            tracing::debug!(%symbol, bid, ask, "Non-positive mid price, ignoring");
            return Ok(());
        };

        let key = SpreadHistory::key(&symbol, &exchange);
        let mut history = self.store.load().await?;
        history.record(&key, snapshot.clone(), self.options.max_samples);
        let stats = history.refresh_stats(&key);
        self.store.save(&history).await?;

        let Some(reason) = self.options.evaluate(&snapshot, &stats) else {
            return Ok(());
        };

        let alert = SpreadAlert {
            timestamp: event.timestamp,
            symbol,
            exchange,
            reason,
            spread_pct: snapshot.spread_pct,
            mean: stats.mean,
            std_dev: stats.std_dev,
            samples: stats.count,
        };

        tracing::info!(
            symbol = %alert.symbol,
            exchange = %alert.exchange,
            reason = ?alert.reason,
            spread_pct = alert.spread_pct,
            "Spread alert"
        );
        record_alerts(NAME, 1);
        self.alerts.append(&alert).await?;
        event.push_message(alert.message());

        Ok(())
    }
}
