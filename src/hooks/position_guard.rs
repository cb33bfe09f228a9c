//! Position guard
//!
//! On portfolio changes, warns about positions trading close to their stop
//! loss or held longer than allowed.

use crate::event::{Event, EventKind, PositionSnapshot};
use crate::hook::{Hook, HookError, HookOptions};
use crate::store::JsonLinesLog;
use crate::telemetry::record_alerts;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const NAME: &str = "position-guard";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionGuardOptions {
    /// Warn when price is within this percentage of the stop loss
    #[serde(default = "default_sl_proximity_pct")]
    pub sl_proximity_pct: Decimal,
    /// Warn when a position has been open longer than this
    #[serde(default = "default_max_hold_hours")]
    pub max_hold_hours: i64,
    #[serde(default = "default_alert_log")]
    pub alert_log: PathBuf,
}

fn default_sl_proximity_pct() -> Decimal {
    Decimal::ONE
}
fn default_max_hold_hours() -> i64 {
    72
}
fn default_alert_log() -> PathBuf {
    PathBuf::from("logs/position-alerts.log")
}

impl Default for PositionGuardOptions {
    fn default() -> Self {
        Self {
            sl_proximity_pct: default_sl_proximity_pct(),
            max_hold_hours: default_max_hold_hours(),
            alert_log: default_alert_log(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionWarningKind {
    StopLossProximity,
    MaxHoldExceeded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionWarning {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub kind: PositionWarningKind,
    pub message: String,
}

impl PositionGuardOptions {
    /// Warnings for one position at time `now`
    pub fn check(&self, position: &PositionSnapshot, now: DateTime<Utc>) -> Vec<PositionWarning> {
        let mut warnings = Vec::new();

        if let Some(stop) = position.stop_loss {
            if let Some(distance_pct) = stop_distance_pct(position.current_price, stop) {
                if distance_pct <= self.sl_proximity_pct {
                    warnings.push(PositionWarning {
                        timestamp: now,
                        symbol: position.symbol.clone(),
                        kind: PositionWarningKind::StopLossProximity,
                        message: format!(
                            "{} is {}% away from its stop loss at {}",
                            position.symbol,
                            distance_pct.round_dp(2).normalize(),
                            stop.normalize()
                        ),
                    });
                }
            }
        }

        if let Some(opened_at) = position.opened_at {
            let held = now - opened_at;
            if held.num_minutes() > self.max_hold_hours.saturating_mul(60) {
                warnings.push(PositionWarning {
                    timestamp: now,
                    symbol: position.symbol.clone(),
                    kind: PositionWarningKind::MaxHoldExceeded,
                    message: format!(
                        "{} has been open for {}h (limit {}h)",
                        position.symbol,
                        held.num_hours(),
                        self.max_hold_hours
                    ),
                });
            }
        }

        warnings
    }
}

/// Distance between price and stop as a percentage of price
///
/// `None` for a zero price or when the ratio leaves the Decimal range.
fn stop_distance_pct(price: Decimal, stop: Decimal) -> Option<Decimal> {
    if price.is_zero() {
        return None;
    }
    price
        .checked_sub(stop)?
        .abs()
        .checked_div(price)?
        .checked_mul(Decimal::ONE_HUNDRED)
}

pub struct PositionGuard {
    options: PositionGuardOptions,
    alerts: JsonLinesLog,
}

impl PositionGuard {
    pub fn new(data_dir: &Path, options: PositionGuardOptions) -> Self {
        Self {
            alerts: JsonLinesLog::new(data_dir.join(&options.alert_log)),
            options,
        }
    }

    pub fn from_options(data_dir: &Path, options: &HookOptions) -> Result<Self, HookError> {
        Ok(Self::new(data_dir, options.parse(NAME)?))
    }

    pub fn alert_log(&self) -> &JsonLinesLog {
        &self.alerts
    }
}

#[async_trait]
impl Hook for PositionGuard {
    fn name(&self) -> &'static str {
        NAME
    }

    fn interested(&self, event: &Event) -> bool {
        event.kind == EventKind::PortfolioChanged
    }

    async fn handle(&self, event: &mut Event) -> Result<(), HookError> {
        let warnings: Vec<PositionWarning> = event
            .context
            .positions
            .iter()
            .flat_map(|p| self.options.check(p, event.timestamp))
            .collect();

        if warnings.is_empty() {
            return Ok(());
        }

        record_alerts(NAME, warnings.len());
        self.alerts.append_all(&warnings).await?;
        for warning in warnings {
            tracing::info!(symbol = %warning.symbol, kind = ?warning.kind, "Position warning");
            event.push_message(warning.message);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn position(current: Decimal, stop: Option<Decimal>, opened_hours_ago: Option<i64>) -> PositionSnapshot {
        PositionSnapshot {
            symbol: "ETH".to_string(),
            side: Some("long".to_string()),
            entry_price: dec!(3000),
            current_price: current,
            quantity: Some(dec!(1)),
            stop_loss: stop,
            opened_at: opened_hours_ago.map(|h| Utc::now() - Duration::hours(h)),
        }
    }

    #[test]
    fn test_stop_loss_proximity() {
        let options = PositionGuardOptions::default();
        let now = Utc::now();

        // 2950 vs 2930: 0.68% away
        let warnings = options.check(&position(dec!(2950), Some(dec!(2930)), None), now);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, PositionWarningKind::StopLossProximity);
        assert!(warnings[0].message.contains("0.68%"));

        // 3000 vs 2900: 3.33% away
        assert!(options
            .check(&position(dec!(3000), Some(dec!(2900)), None), now)
            .is_empty());
    }

    #[test]
    fn test_degenerate_prices_are_skipped() {
        let options = PositionGuardOptions::default();
        let now = Utc::now();

        // 1e6 away from a 1e-28 price does not fit a Decimal
        let dust = position(dec!(0.0000000000000000000000000001), Some(dec!(1000000)), None);
        assert!(options.check(&dust, now).is_empty());

        let zero = position(Decimal::ZERO, Some(dec!(2900)), None);
        assert!(options.check(&zero, now).is_empty());
    }

    #[test]
    fn test_max_hold() {
        let options = PositionGuardOptions::default();
        let now = Utc::now();

        let warnings = options.check(&position(dec!(3000), None, Some(80)), now);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, PositionWarningKind::MaxHoldExceeded);

        assert!(options
            .check(&position(dec!(3000), None, Some(10)), now)
            .is_empty());
    }

    #[tokio::test]
    async fn test_handle_logs_and_notifies() {
        let temp_dir = TempDir::new().unwrap();
        let options = HookOptions::new()
            .with("slProximityPct", 5)
            .with("maxHoldHours", 24);
        let hook = PositionGuard::from_options(temp_dir.path(), &options).unwrap();

        let mut event = Event::new(EventKind::PortfolioChanged);
        event.context.positions = vec![
            position(dec!(3000), Some(dec!(2900)), Some(30)),
            position(dec!(3000), None, None),
        ];
        hook.handle(&mut event).await.unwrap();

        assert_eq!(event.messages.len(), 2);
        let logged: Vec<PositionWarning> = hook.alert_log().read_all().await.unwrap();
        assert_eq!(logged.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_portfolio_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let hook = PositionGuard::new(temp_dir.path(), PositionGuardOptions::default());

        let mut event = Event::new(EventKind::PortfolioChanged);
        hook.handle(&mut event).await.unwrap();

        assert!(event.messages.is_empty());
        assert!(!hook.alert_log().path().exists());
    }
}
