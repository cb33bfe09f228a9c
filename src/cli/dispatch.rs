//! Dispatch command implementation

use crate::config::Config;
use crate::event::Event;
use crate::hook::{Dispatcher, HookOutcome};
use crate::hooks;
use clap::Args;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

#[derive(Args, Debug)]
pub struct DispatchArgs {
    /// NDJSON file with one event per line (defaults to stdin)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Print per-hook reports as JSON after each event
    #[arg(long)]
    pub reports: bool,
}

/// Totals for one dispatch run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchSummary {
    pub events: usize,
    pub invalid_lines: usize,
    pub failures: usize,
    pub messages: Vec<String>,
}

impl DispatchArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let dispatcher = hooks::dispatcher(config)?;

        let summary = match &self.input {
            Some(path) => {
                let file = tokio::fs::File::open(path).await?;
                dispatch_lines(&dispatcher, BufReader::new(file), self.reports).await?
            }
            None => dispatch_lines(&dispatcher, BufReader::new(tokio::io::stdin()), self.reports).await?,
        };

        tracing::info!(
            events = summary.events,
            invalid = summary.invalid_lines,
            failures = summary.failures,
            messages = summary.messages.len(),
            "Dispatch finished"
        );
        Ok(())
    }
}

/// Dispatch every NDJSON event read from `reader`
///
/// Blank lines are ignored and unparseable lines are logged and skipped.
/// Pushed messages are printed to stdout as they are produced.
pub async fn dispatch_lines<R>(
    dispatcher: &Dispatcher,
    reader: R,
    print_reports: bool,
) -> anyhow::Result<DispatchSummary>
where
    R: AsyncBufRead + Unpin,
{
    let mut summary = DispatchSummary::default();
    let mut lines = reader.lines();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut event: Event = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(line = line_no, error = %e, "Skipping invalid event");
                summary.invalid_lines += 1;
                continue;
            }
        };

        let reports = dispatcher.dispatch(&mut event).await;
        summary.events += 1;
        summary.failures += reports
            .iter()
            .filter(|r| matches!(r.outcome, HookOutcome::Failed(_)))
            .count();

        if print_reports {
            println!("{}", serde_json::to_string(&reports)?);
        }
        for message in &event.messages {
            println!("{message}");
        }
        summary.messages.extend(event.messages);
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::command_logger::CommandLogger;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_invalid_and_blank_lines_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let logger = CommandLogger::new(temp_dir.path(), Default::default());
        let log_path = logger.log().path().to_path_buf();
        let dispatcher = Dispatcher::new(vec![Arc::new(logger)]);

        let input = concat!(
            "{\"type\":\"command\",\"action\":\"new\",\"sessionKey\":\"agent:main:abc\"}\n",
            "\n",
            "not json\n",
            "{\"type\":\"command\",\"action\":\"reset\"}\n",
        );
        let summary = dispatch_lines(&dispatcher, input.as_bytes(), false)
            .await
            .unwrap();

        assert_eq!(summary.events, 2);
        assert_eq!(summary.invalid_lines, 1);
        assert_eq!(summary.failures, 0);

        let logged = std::fs::read_to_string(log_path).unwrap();
        assert_eq!(logged.lines().count(), 2);
    }
}
