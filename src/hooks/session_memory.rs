//! Session memory snapshots
//!
//! When a user starts a new session (`/new`), a Markdown summary of the
//! session being closed is written into a dated memory directory so the
//! agent can pick it up later.

use crate::event::{Event, EventKind};
use crate::hook::{Hook, HookError, HookOptions};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const NAME: &str = "session-memory";

const NEW_SESSION_ACTION: &str = "new";
const TAG_LEN: usize = 8;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMemoryOptions {
    /// Memory root, relative to the data directory
    #[serde(default = "default_memory_dir")]
    pub memory_dir: PathBuf,
}

fn default_memory_dir() -> PathBuf {
    PathBuf::from("memory")
}

impl Default for SessionMemoryOptions {
    fn default() -> Self {
        Self {
            memory_dir: default_memory_dir(),
        }
    }
}

pub struct SessionMemory {
    data_dir: PathBuf,
    memory_dir: PathBuf,
}

impl SessionMemory {
    pub fn new(data_dir: &Path, options: SessionMemoryOptions) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            memory_dir: options.memory_dir,
        }
    }

    pub fn from_options(data_dir: &Path, options: &HookOptions) -> Result<Self, HookError> {
        Ok(Self::new(data_dir, options.parse(NAME)?))
    }

    /// Memory file location relative to the data directory
    pub fn relative_path(&self, event: &Event) -> PathBuf {
        let date = event.timestamp.format("%Y-%m-%d").to_string();
        let time = event.timestamp.format("%H%M");
        let source = sanitize(event.context.source_name().unwrap_or("unknown"), usize::MAX);
        let source = if source.is_empty() {
            "unknown".to_string()
        } else {
            source
        };
        let tag = session_tag(event.session_key.as_deref());

        self.memory_dir
            .join(date)
            .join(format!("{time}-{source}-{tag}.md"))
    }
}

/// Short tag from the last `:` segment of a session key
pub fn session_tag(session_key: Option<&str>) -> String {
    let tag = session_key
        .and_then(|key| key.rsplit(':').next())
        .map(|segment| sanitize(segment, TAG_LEN))
        .unwrap_or_default();

    if tag.is_empty() {
        "session".to_string()
    } else {
        tag
    }
}

fn sanitize(raw: &str, max_len: usize) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .take(max_len)
        .collect()
}

fn render_summary(event: &Event) -> String {
    let unknown = "unknown";
    format!(
        "# Session: {}\n\n\
         - **Session Key**: {}\n\
         - **Session ID**: {}\n\
         - **Source**: {}\n\
         - **Sender**: {}\n\
         - **Started new session at**: {}\n",
        event.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        event.session_key.as_deref().unwrap_or(unknown),
        event.context.session_id.as_deref().unwrap_or(unknown),
        event.context.source_name().unwrap_or(unknown),
        event.context.sender_id.as_deref().unwrap_or(unknown),
        event.timestamp.to_rfc3339(),
    )
}

#[async_trait]
impl Hook for SessionMemory {
    fn name(&self) -> &'static str {
        NAME
    }

    fn interested(&self, event: &Event) -> bool {
        event.kind == EventKind::Command && event.is_action(NEW_SESSION_ACTION)
    }

    async fn handle(&self, event: &mut Event) -> Result<(), HookError> {
        let relative = self.relative_path(event);
        let path = self.data_dir.join(&relative);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, render_summary(event)).await?;

        tracing::info!(path = ?path, "Session memory saved");
        event.push_message(format!(
            "Session context saved to {}",
            relative.to_string_lossy()
        ));

        Ok(())
    }
}
