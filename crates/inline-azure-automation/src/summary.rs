//! Operation results and update summaries

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Placeholder the engine prints for secret outputs when secrets are hidden
pub const SECRET_PLACEHOLDER: &str = "[secret]";

/// Kind of engine operation recorded in the stack history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateKind {
    Update,
    Preview,
    Refresh,
    Rename,
    Destroy,
    Import,
    #[serde(other)]
    Other,
}

impl std::fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateKind::Update => write!(f, "update"),
            UpdateKind::Preview => write!(f, "preview"),
            UpdateKind::Refresh => write!(f, "refresh"),
            UpdateKind::Rename => write!(f, "rename"),
            UpdateKind::Destroy => write!(f, "destroy"),
            UpdateKind::Import => write!(f, "import"),
            UpdateKind::Other => write!(f, "other"),
        }
    }
}

/// Final state of an engine operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateState {
    NotStarted,
    InProgress,
    Succeeded,
    Failed,
}

/// One entry of `pulumi stack history --json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSummary {
    pub kind: UpdateKind,

    #[serde(default)]
    pub start_time: Option<String>,

    #[serde(default)]
    pub end_time: Option<String>,

    #[serde(default)]
    pub message: String,

    pub result: UpdateState,

    #[serde(default)]
    pub version: i64,

    /// Resource change counts keyed by action (create, same, delete, ...)
    #[serde(default)]
    pub resource_changes: Option<BTreeMap<String, u64>>,

    #[serde(default)]
    pub environment: HashMap<String, String>,
}

impl UpdateSummary {
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.start_time.as_deref().and_then(parse_history_time)
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.end_time.as_deref().and_then(parse_history_time)
    }

    pub fn is_success(&self) -> bool {
        self.result == UpdateState::Succeeded
    }
}

/// History timestamps are RFC 3339 on current engines and
/// `YYYY-MM-DD HH:MM:SS` (UTC) on older ones
fn parse_history_time(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(time) = DateTime::parse_from_rfc3339(raw) {
        return Some(time.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// A single stack output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputValue {
    pub value: serde_json::Value,
    pub secret: bool,
}

impl OutputValue {
    /// Render the value for display; strings are printed without quotes
    pub fn display(&self) -> String {
        match &self.value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

pub type OutputMap = HashMap<String, OutputValue>;

/// Result of `up`
#[derive(Debug, Clone)]
pub struct UpResult {
    pub stdout: String,
    pub stderr: String,
    pub summary: UpdateSummary,
    pub outputs: OutputMap,
}

/// Result of `refresh`
#[derive(Debug, Clone)]
pub struct RefreshResult {
    pub stdout: String,
    pub stderr: String,
    pub summary: UpdateSummary,
}

/// Result of `destroy`
#[derive(Debug, Clone)]
pub struct DestroyResult {
    pub stdout: String,
    pub stderr: String,
    pub summary: UpdateSummary,
}
