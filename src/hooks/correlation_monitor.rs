//! Cross-asset correlation monitoring
//!
//! Tracks prices for a configured symbol set, recomputes the Pearson
//! correlation matrix of their returns on every tick and flags pairs that
//! are highly correlated or whose correlation moved sharply since the last
//! evaluation.

use crate::event::{Event, EventKind};
use crate::hook::{Hook, HookError, HookOptions};
use crate::stats::{pair_key, simple_returns, CorrelationMatrix};
use crate::store::{JsonLinesLog, SnapshotStore, StoreResult};
use crate::telemetry::record_alerts;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const NAME: &str = "correlation-monitor";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationOptions {
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,
    /// Number of returns kept per symbol
    #[serde(default = "default_lookback")]
    pub lookback: usize,
    /// Returns both series need before a pair is evaluated
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
    #[serde(default = "default_high_correlation")]
    pub high_correlation: f64,
    #[serde(default = "default_change_threshold")]
    pub change_threshold: f64,
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
    #[serde(default = "default_alert_log")]
    pub alert_log: PathBuf,
}

fn default_symbols() -> Vec<String> {
    vec!["BTC".to_string(), "ETH".to_string(), "SOL".to_string()]
}
fn default_lookback() -> usize {
    50
}
fn default_min_samples() -> usize {
    10
}
fn default_high_correlation() -> f64 {
    0.8
}
fn default_change_threshold() -> f64 {
    0.2
}
fn default_state_file() -> PathBuf {
    PathBuf::from("correlation/correlation-state.json")
}
fn default_alert_log() -> PathBuf {
    PathBuf::from("correlation/alerts.log")
}

impl Default for CorrelationOptions {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            lookback: default_lookback(),
            min_samples: default_min_samples(),
            high_correlation: default_high_correlation(),
            change_threshold: default_change_threshold(),
            state_file: default_state_file(),
            alert_log: default_alert_log(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationAlertKind {
    /// `|corr|` at or above the high-correlation level
    High,
    /// Correlation moved by at least the change threshold
    Change,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationAlert {
    pub timestamp: DateTime<Utc>,
    pub kind: CorrelationAlertKind,
    pub pair: String,
    pub correlation: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<f64>,
}

impl CorrelationAlert {
    pub fn message(&self) -> String {
        match (self.kind, self.previous) {
            (CorrelationAlertKind::Change, Some(prev)) => format!(
                "Correlation shift {}: {:.2} -> {:.2}",
                self.pair, prev, self.correlation
            ),
            _ => format!(
                "High correlation {}: {:.2}",
                self.pair, self.correlation
            ),
        }
    }
}

/// Persisted monitor state
///
/// `previous` holds the last evaluated correlation per pair (`A/B`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationState {
    #[serde(default)]
    pub prices: BTreeMap<String, Vec<f64>>,
    #[serde(default)]
    pub previous: BTreeMap<String, f64>,
    #[serde(default)]
    pub matrix: CorrelationMatrix,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CorrelationState {
    /// Append a price, keeping `lookback + 1` prices per symbol
    pub fn record_price(&mut self, symbol: &str, price: f64, lookback: usize) {
        let series = self.prices.entry(symbol.to_string()).or_default();
        series.push(price);
        let cap = lookback + 1;
        if series.len() > cap {
            let excess = series.len() - cap;
            series.drain(..excess);
        }
    }

    /// Rebuild the matrix and return alerts for eligible pairs
    pub fn evaluate(&mut self, options: &CorrelationOptions, at: DateTime<Utc>) -> Vec<CorrelationAlert> {
        let series: Vec<(String, Vec<f64>)> = options
            .symbols
            .iter()
            .map(|s| {
                let prices = self.prices.get(s).map(Vec::as_slice).unwrap_or(&[]);
                (s.clone(), simple_returns(prices))
            })
            .collect();

        let matrix = CorrelationMatrix::compute(&series);
        let mut alerts = Vec::new();

        for (i, (a, returns_a)) in series.iter().enumerate() {
            for (b, returns_b) in series.iter().skip(i + 1) {
                if returns_a.len() < options.min_samples || returns_b.len() < options.min_samples {
                    continue;
                }
                let Some(corr) = matrix.get(a, b) else {
                    continue;
                };
                let key = pair_key(a, b);

                if corr.abs() >= options.high_correlation {
                    alerts.push(CorrelationAlert {
                        timestamp: at,
                        kind: CorrelationAlertKind::High,
                        pair: key.clone(),
                        correlation: corr,
                        previous: None,
                    });
                }

                if let Some(prev) = self.previous.get(&key).copied() {
                    if (corr - prev).abs() >= options.change_threshold {
                        alerts.push(CorrelationAlert {
                            timestamp: at,
                            kind: CorrelationAlertKind::Change,
                            pair: key.clone(),
                            correlation: corr,
                            previous: Some(prev),
                        });
                    }
                }

                self.previous.insert(key, corr);
            }
        }

        self.matrix = matrix;
        self.updated_at = Some(at);
        alerts
    }
}

pub struct CorrelationMonitor {
    options: CorrelationOptions,
    store: SnapshotStore<CorrelationState>,
    alerts: JsonLinesLog,
}

impl CorrelationMonitor {
    pub fn new(data_dir: &Path, options: CorrelationOptions) -> Self {
        Self {
            store: SnapshotStore::new(data_dir.join(&options.state_file)),
            alerts: JsonLinesLog::new(data_dir.join(&options.alert_log)),
            options,
        }
    }

    pub fn from_options(data_dir: &Path, options: &HookOptions) -> Result<Self, HookError> {
        Ok(Self::new(data_dir, options.parse(NAME)?))
    }

    pub async fn state(&self) -> StoreResult<CorrelationState> {
        self.store.load().await
    }

    pub fn alert_log(&self) -> &JsonLinesLog {
        &self.alerts
    }

    fn tracked_symbol(&self, symbol: &str) -> Option<&str> {
        self.options
            .symbols
            .iter()
            .find(|s| s.eq_ignore_ascii_case(symbol))
            .map(String::as_str)
    }
}

#[async_trait]
impl Hook for CorrelationMonitor {
    fn name(&self) -> &'static str {
        NAME
    }

    fn interested(&self, event: &Event) -> bool {
        event.kind == EventKind::MarketTick
            && event
                .context
                .symbol
                .as_deref()
                .and_then(|s| self.tracked_symbol(s))
                .is_some()
    }

    async fn handle(&self, event: &mut Event) -> Result<(), HookError> {
        let Some(symbol) = event
            .context
            .symbol
            .as_deref()
            .and_then(|s| self.tracked_symbol(s))
            .map(str::to_string)
        else {
            return Ok(());
        };
        let Some(price) = event
            .context
            .reference_price()
            .and_then(|p| p.to_f64())
            .filter(|p| *p > 0.0)
        else {
            tracing::debug!(%symbol, "market:tick without usable price, ignoring");
            return Ok(());
        };

        let mut state = self.store.load().await?;
        state.record_price(&symbol, price, self.options.lookback);
        let alerts = state.evaluate(&self.options, event.timestamp);
        self.store.save(&state).await?;

        if alerts.is_empty() {
            return Ok(());
        }

        record_alerts(NAME, alerts.len());
        self.alerts.append_all(&alerts).await?;
        for alert in &alerts {
            tracing::info!(
                pair = %alert.pair,
                kind = ?alert.kind,
                correlation = alert.correlation,
                "Correlation alert"
            );
            event.push_message(alert.message());
        }

        Ok(())
    }
}
