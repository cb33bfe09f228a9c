//! End-to-end dispatch through the built-in hooks

use chrono::{TimeZone, Utc};
use kit_hooks::config::Config;
use kit_hooks::event::{Event, EventContext, EventKind};
use kit_hooks::hook::{Dispatcher, HookOutcome};
use kit_hooks::hooks;
use rust_decimal_macros::dec;
use tempfile::TempDir;

fn setup() -> (TempDir, Dispatcher) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config {
        data_dir: temp_dir.path().to_path_buf(),
        ..Default::default()
    };
    let dispatcher = hooks::dispatcher(&config).unwrap();
    (temp_dir, dispatcher)
}

fn new_command() -> Event {
    Event::new(EventKind::Command)
        .with_action("new")
        .with_session_key("agent:main:telegram:12345678")
        .with_timestamp(Utc.with_ymd_and_hms(2026, 5, 4, 9, 30, 0).unwrap())
        .with_context(EventContext {
            source: Some("telegram".to_string()),
            sender_id: Some("7".to_string()),
            ..Default::default()
        })
}

#[tokio::test]
async fn test_new_command_logs_and_saves_memory() {
    let (temp_dir, dispatcher) = setup();

    let mut event = new_command();
    let reports = dispatcher.dispatch(&mut event).await;

    let completed: Vec<&str> = reports
        .iter()
        .filter(|r| r.outcome == HookOutcome::Completed)
        .map(|r| r.hook)
        .collect();
    assert_eq!(completed, vec!["command-logger", "session-memory"]);

    let log = std::fs::read_to_string(temp_dir.path().join("logs/commands.log")).unwrap();
    assert_eq!(log.lines().count(), 1);
    assert!(log.contains("\"action\":\"new\""));

    assert!(temp_dir
        .path()
        .join("memory/2026-05-04/0930-telegram-12345678.md")
        .exists());
    assert_eq!(
        event.messages,
        vec!["Session context saved to memory/2026-05-04/0930-telegram-12345678.md"]
    );
}

#[tokio::test]
async fn test_uninterested_event_has_no_side_effects() {
    let (temp_dir, dispatcher) = setup();

    let mut event = Event::new(EventKind::from("heartbeat"));
    let reports = dispatcher.dispatch(&mut event).await;

    assert!(reports.iter().all(|r| r.outcome == HookOutcome::Skipped));
    assert!(event.messages.is_empty());
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_each_command_appends_one_line() {
    let (temp_dir, dispatcher) = setup();

    for action in ["status", "reset", "help", "stop", "status"] {
        let mut event = Event::new(EventKind::Command).with_action(action);
        dispatcher.dispatch(&mut event).await;
    }

    let log = std::fs::read_to_string(temp_dir.path().join("logs/commands.log")).unwrap();
    assert_eq!(log.lines().count(), 5);
    assert!(!temp_dir.path().join("memory").exists());
}

#[tokio::test]
async fn test_wide_spread_alerts_on_market_tick() {
    let (temp_dir, dispatcher) = setup();

    let mut event = Event::new(EventKind::MarketTick).with_context(EventContext {
        symbol: Some("BTC".to_string()),
        exchange: Some("binance".to_string()),
        bid: Some(dec!(100)),
        ask: Some(dec!(101)),
        ..Default::default()
    });
    let reports = dispatcher.dispatch(&mut event).await;

    assert!(reports
        .iter()
        .filter(|r| r.hook == "spread-monitor" || r.hook == "correlation-monitor")
        .all(|r| r.outcome == HookOutcome::Completed));
    assert_eq!(event.messages.len(), 1);
    assert!(event.messages[0].starts_with("Wide spread on BTC (binance)"));

    assert!(temp_dir.path().join("spread/spread-history.json").exists());
    assert!(temp_dir.path().join("spread/alerts.log").exists());
    assert!(temp_dir.path().join("correlation/correlation-state.json").exists());
}

#[tokio::test]
async fn test_corrupt_state_does_not_fail_dispatch() {
    let (temp_dir, dispatcher) = setup();
    let state = temp_dir.path().join("spread/spread-history.json");
    std::fs::create_dir_all(state.parent().unwrap()).unwrap();
    std::fs::write(&state, "{ not json").unwrap();

    let mut event = Event::new(EventKind::MarketTick).with_context(EventContext {
        symbol: Some("ETH".to_string()),
        bid: Some(dec!(3000.0)),
        ask: Some(dec!(3000.5)),
        ..Default::default()
    });
    let reports = dispatcher.dispatch(&mut event).await;

    assert!(reports
        .iter()
        .all(|r| !matches!(r.outcome, HookOutcome::Failed(_))));
    let rewritten = std::fs::read_to_string(&state).unwrap();
    assert!(rewritten.contains("ETH@"));
}

#[tokio::test]
async fn test_filesystem_failure_is_reported_and_dispatch_continues() {
    let temp_dir = TempDir::new().unwrap();
    let blocked = temp_dir.path().join("blocked");
    std::fs::write(&blocked, "not a directory").unwrap();

    let config = Config {
        data_dir: blocked.clone(),
        ..Default::default()
    };
    let dispatcher = hooks::dispatcher(&config).unwrap();

    let mut command = new_command();
    let reports = dispatcher.dispatch(&mut command).await;

    let failed: Vec<&str> = reports
        .iter()
        .filter(|r| matches!(r.outcome, HookOutcome::Failed(_)))
        .map(|r| r.hook)
        .collect();
    assert_eq!(failed, vec!["command-logger", "session-memory"]);
    assert!(reports
        .iter()
        .filter(|r| !failed.contains(&r.hook))
        .all(|r| r.outcome == HookOutcome::Skipped));
    assert!(command.messages.is_empty());

    // hooks without file access keep working on the same dispatcher
    let mut signal = Event::new(EventKind::SignalReceived).with_context(EventContext {
        symbol: Some("BTC".to_string()),
        side: Some("long".to_string()),
        entry: Some(dec!(50000)),
        stop_loss: Some(dec!(49500)),
        ..Default::default()
    });
    let reports = dispatcher.dispatch(&mut signal).await;
    assert!(reports
        .iter()
        .all(|r| !matches!(r.outcome, HookOutcome::Failed(_))));
    assert_eq!(signal.messages, vec!["BTC long: 0.2 lots (risking 100 over a 500 stop)"]);
    assert_eq!(std::fs::read_to_string(&blocked).unwrap(), "not a directory");
}
