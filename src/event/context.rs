//! Event context payload

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key-value context attached to an event
///
/// Keys the hooks understand are typed fields. Everything else the gateway
/// sends is kept verbatim in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventContext {
    /// Chat user that triggered the event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
    /// Channel the event originated from (telegram, discord, cli, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Channel a command was issued from, when it differs from `source`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_source: Option<String>,
    /// Gateway session identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Trading symbol
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// Exchange or broker name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
    /// Last price
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    /// Best bid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid: Option<Decimal>,
    /// Best ask
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ask: Option<Decimal>,
    /// Trade or signal side (buy/sell, long/short)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,
    /// Filled quantity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,
    /// Exchange order id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Realized P&L of a closing trade
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pnl: Option<Decimal>,
    /// Signal entry price
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<Decimal>,
    /// Signal or position stop loss
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<Decimal>,
    /// Signal take profit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<Decimal>,
    /// Account balance used for sizing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_balance: Option<Decimal>,
    /// Open positions (portfolio events)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub positions: Vec<PositionSnapshot>,
    /// Keys not listed above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventContext {
    /// Channel name, preferring the command source over the generic source
    pub fn source_name(&self) -> Option<&str> {
        self.command_source.as_deref().or(self.source.as_deref())
    }

    /// Price for this tick: last price, or mid of bid/ask when only the book is known
    pub fn reference_price(&self) -> Option<Decimal> {
        self.price.or_else(|| match (self.bid, self.ask) {
            (Some(bid), Some(ask)) => Some((bid + ask) / Decimal::TWO),
            _ => None,
        })
    }

    /// Look up a key that has no typed field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// A single open position as reported by the portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSnapshot {
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,
    pub entry_price: Decimal,
    pub current_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opened_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_known_and_unknown_keys() {
        let ctx: EventContext = serde_json::from_str(
            r#"{"senderId":"42","symbol":"BTC","price":50500,"mood":"bullish"}"#,
        )
        .unwrap();

        assert_eq!(ctx.sender_id.as_deref(), Some("42"));
        assert_eq!(ctx.symbol.as_deref(), Some("BTC"));
        assert_eq!(ctx.price, Some(dec!(50500)));
        assert_eq!(ctx.get("mood"), Some(&Value::from("bullish")));
        assert!(ctx.get("symbol").is_none());
    }

    #[test]
    fn test_source_name_prefers_command_source() {
        let ctx = EventContext {
            source: Some("gateway".to_string()),
            command_source: Some("telegram".to_string()),
            ..Default::default()
        };
        assert_eq!(ctx.source_name(), Some("telegram"));

        let ctx = EventContext {
            source: Some("discord".to_string()),
            ..Default::default()
        };
        assert_eq!(ctx.source_name(), Some("discord"));
    }

    #[test]
    fn test_reference_price_falls_back_to_mid() {
        let ctx = EventContext {
            bid: Some(dec!(100)),
            ask: Some(dec!(101)),
            ..Default::default()
        };
        assert_eq!(ctx.reference_price(), Some(dec!(100.5)));

        let ctx = EventContext {
            price: Some(dec!(99)),
            bid: Some(dec!(100)),
            ask: Some(dec!(101)),
            ..Default::default()
        };
        assert_eq!(ctx.reference_price(), Some(dec!(99)));

        assert!(EventContext::default().reference_price().is_none());
    }

    #[test]
    fn test_positions_deserialize() {
        let ctx: EventContext = serde_json::from_str(
            r#"{"positions":[{"symbol":"ETH","entryPrice":3000,"currentPrice":2950,"stopLoss":2930}]}"#,
        )
        .unwrap();
        assert_eq!(ctx.positions.len(), 1);
        assert_eq!(ctx.positions[0].stop_loss, Some(dec!(2930)));
        assert!(ctx.positions[0].opened_at.is_none());
    }
}
