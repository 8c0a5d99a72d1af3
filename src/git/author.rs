use crate::error::{ReportError, Result};
use git2::{Config, Repository};
use tracing::{debug, warn};

/// Token that selects the locally configured git identity.
pub const ME: &str = "me";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorFilter {
    /// The repository's configured `user.name`, matched exactly
    Me,
    /// Case-insensitive substring of the author name
    Name(String),
}

impl AuthorFilter {
    /// Blank input means no filter.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
        if raw.eq_ignore_ascii_case(ME) {
            Some(AuthorFilter::Me)
        } else {
            Some(AuthorFilter::Name(raw.to_string()))
        }
    }

    /// Resolution failures for `me` drop the filter instead of erroring.
    pub(crate) fn resolve(&self, repo: &Repository) -> AuthorMatcher {
        match repo.config() {
            Ok(config) => self.resolve_with(&config),
            Err(e) => unresolved(ReportError::AuthorResolutionFailed(e)),
        }
    }

    pub(crate) fn resolve_with(&self, config: &Config) -> AuthorMatcher {
        match self {
            AuthorFilter::Me => match configured_user_name(config) {
                Ok(name) => {
                    debug!("Resolved '{}' to configured user {}", ME, name);
                    AuthorMatcher::Exact(name)
                }
                Err(e) => unresolved(e),
            },
            AuthorFilter::Name(name) => AuthorMatcher::Contains(name.to_lowercase()),
        }
    }
}

fn unresolved(err: ReportError) -> AuthorMatcher {
    warn!("{}; returning commits from all authors", err);
    AuthorMatcher::Any
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AuthorMatcher {
    Any,
    Exact(String),
    Contains(String),
}

impl AuthorMatcher {
    pub(crate) fn matches(&self, author: &str) -> bool {
        match self {
            AuthorMatcher::Any => true,
            AuthorMatcher::Exact(name) => author == name,
            AuthorMatcher::Contains(needle) => author.to_lowercase().contains(needle.as_str()),
        }
    }
}

pub(crate) fn configured_user_name(config: &Config) -> Result<String> {
    config
        .get_string("user.name")
        .map_err(ReportError::AuthorResolutionFailed)
}
