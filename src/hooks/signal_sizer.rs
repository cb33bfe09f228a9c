//! Risk-based lot sizing for incoming signals
//!
//! Sizes a signal so that hitting its stop loss loses a fixed percentage of
//! the account balance.

use crate::event::{Event, EventKind};
use crate::hook::{Hook, HookError, HookOptions};
use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

pub const NAME: &str = "signal-sizer";

/// Fixed-risk lot sizer
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotSizer {
    /// Percentage of balance risked per trade
    #[serde(default = "default_risk_pct")]
    pub risk_pct: Decimal,
    /// Fallback balance when the signal carries none
    #[serde(default = "default_account_balance")]
    pub account_balance: Decimal,
    /// Units per lot
    #[serde(default = "default_contract_size")]
    pub contract_size: Decimal,
    #[serde(default = "default_lot_step")]
    pub lot_step: Decimal,
    #[serde(default = "default_min_lot")]
    pub min_lot: Decimal,
    #[serde(default = "default_max_lot")]
    pub max_lot: Decimal,
}

fn default_risk_pct() -> Decimal {
    Decimal::ONE
}
fn default_account_balance() -> Decimal {
    dec!(10000)
}
fn default_contract_size() -> Decimal {
    Decimal::ONE
}
fn default_lot_step() -> Decimal {
    dec!(0.01)
}
fn default_min_lot() -> Decimal {
    dec!(0.01)
}
fn default_max_lot() -> Decimal {
    dec!(100)
}

impl Default for LotSizer {
    fn default() -> Self {
        Self {
            risk_pct: default_risk_pct(),
            account_balance: default_account_balance(),
            contract_size: default_contract_size(),
            lot_step: default_lot_step(),
            min_lot: default_min_lot(),
            max_lot: default_max_lot(),
        }
    }
}

/// Sizing result for one signal
#[derive(Debug, Clone, PartialEq)]
pub struct LotSize {
    pub lots: Decimal,
    pub risk_amount: Decimal,
    pub stop_distance: Decimal,
}

impl LotSizer {
    /// Lots to trade for the given entry and stop
    ///
    /// `None` when entry and stop coincide, the balance is not positive or
    /// the arithmetic leaves the Decimal range.
    pub fn calculate(&self, balance: Decimal, entry: Decimal, stop_loss: Decimal) -> Option<LotSize> {
        let stop_distance = entry.checked_sub(stop_loss)?.abs();
        if stop_distance.is_zero() || balance <= Decimal::ZERO || self.contract_size <= Decimal::ZERO {
            return None;
        }

        let risk_amount = balance
            .checked_mul(self.risk_pct)?
            .checked_div(Decimal::ONE_HUNDRED)?;
        let raw = risk_amount
            .checked_div(stop_distance)?
            .checked_div(self.contract_size)?;

        let stepped = if self.lot_step > Decimal::ZERO {
            raw.checked_div(self.lot_step)?
                .floor()
                .checked_mul(self.lot_step)?
        } else {
            raw
        };
        let lots = stepped.max(self.min_lot).min(self.max_lot);

        Some(LotSize {
            lots: lots.normalize(),
            risk_amount: risk_amount.normalize(),
            stop_distance: stop_distance.normalize(),
        })
    }
}

pub struct SignalSizer {
    sizer: LotSizer,
}

impl SignalSizer {
    pub fn new(sizer: LotSizer) -> Self {
        Self { sizer }
    }

    pub fn from_options(options: &HookOptions) -> Result<Self, HookError> {
        Ok(Self::new(options.parse(NAME)?))
    }
}

#[async_trait]
impl Hook for SignalSizer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn interested(&self, event: &Event) -> bool {
        event.kind == EventKind::SignalReceived
    }

    async fn handle(&self, event: &mut Event) -> Result<(), HookError> {
        let ctx = &event.context;
        let (Some(entry), Some(stop)) = (ctx.entry.or(ctx.price), ctx.stop_loss) else {
            tracing::debug!("signal without entry or stop loss, ignoring");
            return Ok(());
        };
        let balance = ctx.account_balance.unwrap_or(self.sizer.account_balance);

        let Some(size) = self.sizer.calculate(balance, entry, stop) else {
            tracing::debug!(%entry, %stop, "Signal cannot be sized");
            return Ok(());
        };

        let message = format!(
            "{} {}: {} lots (risking {} over a {} stop)",
            ctx.symbol.as_deref().unwrap_or("Signal"),
            ctx.side.as_deref().unwrap_or("entry"),
            size.lots,
            size.risk_amount,
            size.stop_distance
        );
        event.push_message(message);

        Ok(())
    }
}
