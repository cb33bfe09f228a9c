//! Command audit log
//!
//! Appends every `command` event to a JSON Lines file.

use crate::event::{Event, EventKind};
use crate::hook::{Hook, HookError, HookOptions};
use crate::store::JsonLinesLog;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const NAME: &str = "command-logger";

/// Command logger options
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandLoggerOptions {
    /// Log file, relative to the data directory
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

fn default_log_file() -> PathBuf {
    PathBuf::from("logs/commands.log")
}

impl Default for CommandLoggerOptions {
    fn default() -> Self {
        Self {
            log_file: default_log_file(),
        }
    }
}

/// One logged command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRecord {
    pub timestamp: DateTime<Utc>,
    pub action: Option<String>,
    pub session_key: Option<String>,
    pub sender_id: Option<String>,
    pub source: Option<String>,
    pub session_id: Option<String>,
}

impl CommandRecord {
    pub fn from_event(event: &Event) -> Self {
        Self {
            timestamp: event.timestamp,
            action: event.action.clone(),
            session_key: event.session_key.clone(),
            sender_id: event.context.sender_id.clone(),
            source: event.context.source_name().map(str::to_string),
            session_id: event.context.session_id.clone(),
        }
    }
}

pub struct CommandLogger {
    log: JsonLinesLog,
}

impl CommandLogger {
    pub fn new(data_dir: &Path, options: CommandLoggerOptions) -> Self {
        Self {
            log: JsonLinesLog::new(data_dir.join(options.log_file)),
        }
    }

    pub fn from_options(data_dir: &Path, options: &HookOptions) -> Result<Self, HookError> {
        Ok(Self::new(data_dir, options.parse(NAME)?))
    }

    pub fn log(&self) -> &JsonLinesLog {
        &self.log
    }
}

#[async_trait]
impl Hook for CommandLogger {
    fn name(&self) -> &'static str {
        NAME
    }

    fn interested(&self, event: &Event) -> bool {
        event.kind == EventKind::Command
    }

    async fn handle(&self, event: &mut Event) -> Result<(), HookError> {
        let record = CommandRecord::from_event(event);
        self.log.append(&record).await?;
        tracing::debug!(action = ?record.action, "Command logged");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventContext;
    use tempfile::TempDir;

    fn command(action: &str) -> Event {
        Event::new(EventKind::Command)
            .with_action(action)
            .with_session_key("agent:main:main")
            .with_context(EventContext {
                sender_id: Some("1234".to_string()),
                command_source: Some("telegram".to_string()),
                session_id: Some("sess-1".to_string()),
                ..Default::default()
            })
    }

    #[tokio::test]
    async fn test_logs_command_fields() {
        let temp_dir = TempDir::new().unwrap();
        let hook = CommandLogger::new(temp_dir.path(), CommandLoggerOptions::default());

        let mut event = command("new");
        hook.handle(&mut event).await.unwrap();

        let records: Vec<CommandRecord> = hook.log().read_all().await.unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.action.as_deref(), Some("new"));
        assert_eq!(record.session_key.as_deref(), Some("agent:main:main"));
        assert_eq!(record.sender_id.as_deref(), Some("1234"));
        assert_eq!(record.source.as_deref(), Some("telegram"));
        assert_eq!(record.session_id.as_deref(), Some("sess-1"));
        assert!(temp_dir.path().join("logs/commands.log").exists());
    }

    #[tokio::test]
    async fn test_appends_one_line_per_command() {
        let temp_dir = TempDir::new().unwrap();
        let hook = CommandLogger::new(temp_dir.path(), CommandLoggerOptions::default());

        for action in ["new", "reset", "stop"] {
            let mut event = command(action);
            hook.handle(&mut event).await.unwrap();
            assert!(event.messages.is_empty());
        }

        let content = std::fs::read_to_string(hook.log().path()).unwrap();
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn test_interest() {
        let temp_dir = TempDir::new().unwrap();
        let hook = CommandLogger::new(temp_dir.path(), CommandLoggerOptions::default());
        assert!(hook.interested(&command("new")));
        assert!(!hook.interested(&Event::new(EventKind::PriceTick)));
    }

    #[test]
    fn test_custom_log_file() {
        let temp_dir = TempDir::new().unwrap();
        let options = HookOptions::new().with("logFile", "audit/cmd.jsonl");
        let hook = CommandLogger::from_options(temp_dir.path(), &options).unwrap();
        assert_eq!(hook.log().path(), temp_dir.path().join("audit/cmd.jsonl"));
    }
}
