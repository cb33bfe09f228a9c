//! Price target management

use crate::config::Config;
use crate::hooks::target_hit::{self, Direction, PriceTarget, TargetBook, TargetHitOptions, TargetKind};
use crate::store::SnapshotStore;
use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Args, Debug)]
pub struct TargetsArgs {
    #[command(subcommand)]
    pub command: TargetsCommand,
}

#[derive(Subcommand, Debug)]
pub enum TargetsCommand {
    /// Add a price target
    Add {
        /// Symbol, e.g. BTC
        symbol: String,
        /// Threshold price
        price: Decimal,
        /// above or below
        direction: Direction,
        /// tp, sl, support or resistance
        #[arg(long = "type", default_value = "tp")]
        kind: TargetKind,
        /// Free-form note appended to the alert
        #[arg(long)]
        note: Option<String>,
    },
    /// List active targets
    List {
        /// Only targets for this symbol
        #[arg(long)]
        symbol: Option<String>,
        /// Also show fired targets
        #[arg(long)]
        history: bool,
    },
    /// Remove an active target
    Remove {
        id: Uuid,
    },
}

impl TargetsArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let options: TargetHitOptions = config
            .hook_options(target_hit::NAME)
            .parse(target_hit::NAME)?;
        let store = options.store(&config.data_dir);

        for line in self.command.run(&store).await? {
            println!("{line}");
        }
        Ok(())
    }
}

impl TargetsCommand {
    /// Apply the command to the target book, returning lines to print
    pub async fn run(&self, store: &SnapshotStore<TargetBook>) -> anyhow::Result<Vec<String>> {
        let mut book = store.load().await?;

        match self {
            TargetsCommand::Add {
                symbol,
                price,
                direction,
                kind,
                note,
            } => {
                let mut target = PriceTarget::new(symbol.to_uppercase(), *price, *direction, *kind);
                if let Some(note) = note {
                    target = target.with_note(note.clone());
                }
                let line = format!("Added {} ({} {} {})", target.id, target.symbol, direction, price);
                tracing::info!(id = %target.id, symbol = %target.symbol, "Price target added");
                book.add(target);
                store.save(&book).await?;
                Ok(vec![line])
            }
            TargetsCommand::List { symbol, history } => {
                let mut lines: Vec<String> = book
                    .targets
                    .iter()
                    .filter(|t| {
                        symbol
                            .as_deref()
                            .map_or(true, |s| t.symbol.eq_ignore_ascii_case(s))
                    })
                    .map(|t| {
                        let mut line = format!(
                            "{}  {} {} {} {}",
                            t.id, t.symbol, t.kind, t.direction, t.price
                        );
                        if let Some(note) = &t.note {
                            line.push_str(&format!("  {note}"));
                        }
                        line
                    })
                    .collect();

                if lines.is_empty() {
                    lines.push("No active targets".to_string());
                }

                if *history {
                    lines.push(format!("History ({}):", book.history.len()));
                    lines.extend(book.history.iter().map(|h| {
                        format!(
                            "{}  {} at {}",
                            h.triggered_at.format("%Y-%m-%d %H:%M:%S"),
                            h.symbol,
                            h.price_at_trigger
                        )
                    }));
                }
                Ok(lines)
            }
            TargetsCommand::Remove { id } => match book.remove(*id) {
                Some(target) => {
                    store.save(&book).await?;
                    Ok(vec![format!("Removed {} ({})", target.id, target.symbol)])
                }
                None => anyhow::bail!("No active target with id {id}"),
            },
        }
    }
}
