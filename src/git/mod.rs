use serde::{Deserialize, Serialize};

pub mod author;
pub mod multi;
pub mod repo;
pub mod stats;

pub use author::AuthorFilter;
pub use multi::{
    aggregate, discover_repositories, group_by_origin, origin_label, MultiRepoAggregator,
    DEFAULT_DISCOVERY_DEPTH,
};
pub use repo::{list_commits, GitRepo};
pub use stats::{compute_stats, count_changed_lines, AuthorStat, RepoStats, StatsAggregator, StatsDelta};

/// Minute-precision rendering used for display and for ordering.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Origin label of commits read from a single repository.
pub const SINGLE_REPO_ORIGIN: &str = ".";

pub const SHORT_HASH_LEN: usize = 7;

/// A non-merge commit with a non-empty subject line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub hash: String,
    pub author: String,
    pub timestamp: String,
    pub message: String,
    pub origin: String,
}

impl Commit {
    pub fn new(
        hash: impl Into<String>,
        author: impl Into<String>,
        timestamp: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            hash: hash.into(),
            author: author.into(),
            timestamp: timestamp.into(),
            message: message.into(),
            origin: SINGLE_REPO_ORIGIN.to_string(),
        }
    }

    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }
}
