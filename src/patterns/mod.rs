use serde::{Deserialize, Serialize};
use std::fmt;

pub mod categorizer;
pub mod engine;
pub mod filter;

pub use categorizer::{categorize, group_by_author, Categorizer};
pub use engine::{extract_ticket, group_by_ticket, TicketExtractor, TicketGroup, NO_TICKET_GROUP};
pub use filter::{search, CommitFilter};

/// A ticket reference pattern. When the regex has a capture group, the
/// first group is the ticket id; otherwise the whole match is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketPattern {
    pub name: String,
    pub pattern: String,
}

impl TicketPattern {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
        }
    }
}

/// Built-in patterns in evaluation order. The first one that matches wins.
pub fn default_ticket_patterns() -> Vec<TicketPattern> {
    vec![
        // JIRA-style project keys
        TicketPattern::new("Project Key", r"([A-Z]{2,10}-\d+)"),
        TicketPattern::new("Issue Shorthand", r"#(\d+)"),
        TicketPattern::new("GitHub Issue", r"GH-(\d+)"),
        TicketPattern::new("Ticket Phrase", r"(?:ticket|issue)[:\s]+#?(\d+)"),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComponentLabel {
    Console,
    Server,
    Others,
}

impl ComponentLabel {
    /// Every label, in classification priority order.
    pub const ALL: [ComponentLabel; 3] = [
        ComponentLabel::Console,
        ComponentLabel::Server,
        ComponentLabel::Others,
    ];
}

impl fmt::Display for ComponentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ComponentLabel::Console => "Console",
            ComponentLabel::Server => "Server",
            ComponentLabel::Others => "Others",
        };
        f.write_str(label)
    }
}

/// Keywords that put a message under `label`, matched as lower-case substrings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub label: ComponentLabel,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new<S: AsRef<str>>(label: ComponentLabel, keywords: &[S]) -> Self {
        Self {
            label,
            keywords: keywords
                .iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn matches(&self, lowered_message: &str) -> bool {
        self.keywords
            .iter()
            .any(|keyword| lowered_message.contains(keyword.as_str()))
    }
}

pub const CONSOLE_KEYWORDS: &[&str] = &[
    "console",
    "ui-block",
    "ui block",
    "frontend",
    "react",
    "detail",
    "icon",
    "style",
    "css",
    "component",
    "button",
    "modal",
    "dialog",
    "form",
    "layout",
    "page",
    "view",
    "screen",
    "ui",
    "ux",
];

pub const SERVER_KEYWORDS: &[&str] = &[
    "server",
    "nest-core",
    "nestcore",
    "backend",
    "api",
    "endpoint",
    "controller",
    "service",
    "repository",
    "database",
    "db",
    "query",
    "migration",
];

/// Console rules first, then Server; anything else is `Others`.
pub fn default_category_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new(ComponentLabel::Console, CONSOLE_KEYWORDS),
        CategoryRule::new(ComponentLabel::Server, SERVER_KEYWORDS),
    ]
}
