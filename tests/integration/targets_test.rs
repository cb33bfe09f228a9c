//! Price target lifecycle through the CLI command and the dispatcher

use kit_hooks::cli::TargetsCommand;
use kit_hooks::config::Config;
use kit_hooks::event::{Event, EventContext, EventKind};
use kit_hooks::hooks::{self, target_hit::{Direction, TargetHitOptions, TargetKind}};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::TempDir;

fn tick(symbol: &str, price: Decimal) -> Event {
    Event::new(EventKind::PriceTick).with_context(EventContext {
        symbol: Some(symbol.to_string()),
        price: Some(price),
        ..Default::default()
    })
}

#[tokio::test]
async fn test_target_fires_once() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config {
        data_dir: temp_dir.path().to_path_buf(),
        ..Default::default()
    };
    let store = TargetHitOptions::default().store(&config.data_dir);

    TargetsCommand::Add {
        symbol: "BTC".to_string(),
        price: dec!(70000),
        direction: Direction::Above,
        kind: TargetKind::Tp,
        note: None,
    }
    .run(&store)
    .await
    .unwrap();

    let dispatcher = hooks::dispatcher(&config).unwrap();

    let mut below = tick("BTC", dec!(69999));
    dispatcher.dispatch(&mut below).await;
    assert!(below.messages.is_empty());

    let mut hit = tick("BTC", dec!(70100));
    dispatcher.dispatch(&mut hit).await;
    assert_eq!(hit.messages.len(), 1);
    assert!(hit.messages[0].starts_with("Target hit: BTC take profit at 70100"));

    let mut again = tick("BTC", dec!(71000));
    dispatcher.dispatch(&mut again).await;
    assert!(again.messages.is_empty());

    let book = store.load().await.unwrap();
    assert!(book.targets.is_empty());
    assert_eq!(book.history.len(), 1);
    assert_eq!(book.history[0].price_at_trigger, dec!(70100));
}
