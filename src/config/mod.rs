use crate::error::Result;
use crate::patterns::{
    default_category_rules, CategoryRule, Categorizer, ComponentLabel, TicketExtractor,
};
use ::config::File;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = ".report-bot.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub team: TeamConfig,
    pub defaults: DefaultsConfig,
    pub categorization: CategorizationConfig,
    pub tickets: TicketConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamConfig {
    pub name: Option<String>,
    pub members: Vec<String>,
    /// Short name to full author name
    pub aliases: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub author: Option<String>,
    pub format: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            author: None,
            format: "markdown".to_string(),
        }
    }
}

/// Empty keyword lists keep the built-in keywords for that label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategorizationConfig {
    pub console_keywords: Vec<String>,
    pub server_keywords: Vec<String>,
}

/// A non-empty pattern list replaces the built-in ticket patterns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketConfig {
    pub patterns: Vec<String>,
}

impl Config {
    /// Loads `explicit` if given, otherwise the first existing file from
    /// [`Config::search_paths`]. No file at all yields the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match Self::search_paths().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::from_file(&path),
            None => {
                debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let settings = ::config::Config::builder()
            .add_source(File::from(path).required(true))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Working directory first, then the user config dir, then home.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("report-bot").join("config.json"));
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(CONFIG_FILE_NAME));
        }
        paths
    }

    pub fn categorizer(&self) -> Categorizer {
        let rules = default_category_rules()
            .into_iter()
            .map(|rule| {
                let configured = match rule.label {
                    ComponentLabel::Console => &self.categorization.console_keywords,
                    ComponentLabel::Server => &self.categorization.server_keywords,
                    ComponentLabel::Others => return rule,
                };
                if configured.is_empty() {
                    rule
                } else {
                    CategoryRule::new(rule.label, configured.as_slice())
                }
            })
            .collect();
        Categorizer::new(rules)
    }

    pub fn ticket_extractor(&self) -> Result<TicketExtractor> {
        if self.tickets.patterns.is_empty() {
            TicketExtractor::with_defaults()
        } else {
            TicketExtractor::from_strings(self.tickets.patterns.as_slice())
        }
    }

    /// Full author name for a team alias, or `name` unchanged.
    pub fn resolve_alias<'a>(&'a self, name: &'a str) -> &'a str {
        self.team
            .aliases
            .get(name)
            .map(String::as_str)
            .unwrap_or(name)
    }

    /// Command-line author, else the configured default, with aliases expanded.
    pub fn effective_author(&self, cli_author: Option<&str>) -> Option<String> {
        cli_author
            .or(self.defaults.author.as_deref())
            .map(|name| self.resolve_alias(name).to_string())
    }

    pub fn team_name(&self) -> &str {
        self.team.name.as_deref().unwrap_or("Team")
    }
}
