use crate::error::{ReportError, Result};
use crate::git::Commit;
use crate::window::TimeWindow;
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

pub mod console;
pub mod html;
pub mod markdown;
pub mod reporter;

pub use html::HtmlGenerator;
pub use markdown::MarkdownGenerator;
pub use reporter::{export_commits, Exporter, JsonGenerator, Reporter};

pub const DEFAULT_TITLE: &str = "Git Commit Report";

/// Free-form report metadata. `title`, `date_range`, `author` and
/// `team_members` are rendered when present; JSON passes everything through.
pub type Metadata = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Markdown,
    Html,
    Email,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => ".json",
            ExportFormat::Markdown => ".md",
            ExportFormat::Html | ExportFormat::Email => ".html",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "html" => Ok(ExportFormat::Html),
            "email" => Ok(ExportFormat::Email),
            _ => Err(ReportError::UnsupportedExportFormat {
                format: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Json => "json",
            ExportFormat::Markdown => "markdown",
            ExportFormat::Html => "html",
            ExportFormat::Email => "email",
        };
        f.write_str(name)
    }
}

pub fn add_file_extension(path: &str, format: &ExportFormat) -> String {
    let extension = format.extension();

    if path.ends_with(extension) {
        path.to_string()
    } else {
        format!("{}{}", path, extension)
    }
}

/// A named slice of a report, rendered in the order groups are given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitGroup {
    pub name: String,
    pub commits: Vec<Commit>,
}

impl CommitGroup {
    pub fn new(name: impl Into<String>, commits: Vec<Commit>) -> Self {
        Self {
            name: name.into(),
            commits,
        }
    }
}

/// Metadata for an export of `window`, skipping what is not known.
pub fn report_metadata(
    title: Option<&str>,
    window: &TimeWindow,
    author: Option<&str>,
    team_members: &[String],
) -> Metadata {
    let mut metadata = Metadata::new();
    if let Some(title) = title {
        metadata.insert("title".to_string(), Value::String(title.to_string()));
    }
    metadata.insert("date_range".to_string(), Value::String(window.to_string()));
    if let Some(author) = author {
        metadata.insert("author".to_string(), Value::String(author.to_string()));
    }
    if !team_members.is_empty() {
        metadata.insert(
            "team_members".to_string(),
            Value::Array(team_members.iter().cloned().map(Value::String).collect()),
        );
    }
    metadata
}

pub trait OutputGenerator {
    fn generate(
        &self,
        commits: &[Commit],
        metadata: Option<&Metadata>,
        groups: Option<&[CommitGroup]>,
    ) -> Result<String>;
}

pub(crate) fn report_title(metadata: Option<&Metadata>) -> String {
    metadata
        .and_then(|m| m.get("title"))
        .map(display_value)
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}

/// Labelled metadata lines in display order, skipping absent keys.
pub(crate) fn metadata_fields(metadata: &Metadata) -> Vec<(&'static str, String)> {
    [
        ("date_range", "Period"),
        ("author", "Author"),
        ("team_members", "Team Members"),
    ]
    .into_iter()
    .filter_map(|(key, label)| metadata.get(key).map(|value| (label, display_value(value))))
    .collect()
}

/// Strings unquoted, lists comma-joined, anything else as JSON.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Groups to render, or `None` when the report should be a flat list.
pub(crate) fn visible_groups(groups: Option<&[CommitGroup]>) -> Option<Vec<&CommitGroup>> {
    let groups = groups.filter(|g| !g.is_empty())?;
    Some(groups.iter().filter(|g| !g.commits.is_empty()).collect())
}

pub(crate) fn commit_noun(count: usize) -> &'static str {
    if count == 1 {
        "commit"
    } else {
        "commits"
    }
}

pub(crate) fn generated_stamp() -> String {
    Local::now().format(crate::git::TIMESTAMP_FORMAT).to_string()
}
