use super::author::{AuthorFilter, AuthorMatcher};
use super::{Commit, SHORT_HASH_LEN, TIMESTAMP_FORMAT};
use crate::error::{ReportError, Result};
use crate::window::TimeWindow;
use chrono::{DateTime, Local};
use git2::{ErrorCode, Oid, Repository, Sort};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct GitRepo {
    repo: Repository,
    path: PathBuf,
}

/// A commit together with the object id needed to diff it later.
pub(crate) struct LoggedCommit {
    pub oid: Oid,
    pub commit: Commit,
}

impl GitRepo {
    /// Opens the working copy containing `path`, searching parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let repo = Repository::discover(path).map_err(|e| {
            debug!("Repository discovery failed for {}: {}", path.display(), e);
            ReportError::RepositoryNotFound {
                path: path.display().to_string(),
            }
        })?;

        let root = repo
            .workdir()
            .unwrap_or_else(|| repo.path())
            .to_path_buf();
        debug!("Opened Git repository at {}", root.display());

        Ok(Self { repo, path: root })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Non-merge commits in `window`, newest first.
    pub fn list_commits(
        &self,
        window: &TimeWindow,
        author: Option<&AuthorFilter>,
    ) -> Result<Vec<Commit>> {
        Ok(self
            .walk(window, author)?
            .into_iter()
            .map(|logged| logged.commit)
            .collect())
    }

    /// Distinct author names in `window`, sorted.
    pub fn authors(&self, window: &TimeWindow) -> Result<Vec<String>> {
        let names: BTreeSet<String> = self
            .walk(window, None)?
            .into_iter()
            .map(|logged| logged.commit.author)
            .collect();
        Ok(names.into_iter().collect())
    }

    pub(crate) fn walk(
        &self,
        window: &TimeWindow,
        author: Option<&AuthorFilter>,
    ) -> Result<Vec<LoggedCommit>> {
        match self.repo.head() {
            Ok(_) => {}
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                debug!("{} has no commits yet", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        }

        let matcher = author
            .map(|filter| filter.resolve(&self.repo))
            .unwrap_or(AuthorMatcher::Any);

        let mut revwalk = self.repo.revwalk()?;
        revwalk.push_head()?;
        revwalk.set_sorting(Sort::TIME)?;

        let mut commits = Vec::new();
        for oid in revwalk {
            let oid = oid?;
            let git_commit = self.repo.find_commit(oid)?;

            if git_commit.parent_count() > 1 {
                continue;
            }

            let Some(committed) = local_time(git_commit.committer().when().seconds()) else {
                debug!("Skipping {} with an out-of-range commit time", oid);
                continue;
            };
            if !window.contains(&committed) {
                continue;
            }

            let signature = git_commit.author();
            let author_name = signature
                .name()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .unwrap_or("Unknown")
                .to_string();
            if !matcher.matches(&author_name) {
                continue;
            }

            let message = subject_line(&String::from_utf8_lossy(git_commit.message_bytes()));
            if message.is_empty() {
                continue;
            }

            let id = oid.to_string();
            commits.push(LoggedCommit {
                oid,
                commit: Commit::new(
                    &id[..SHORT_HASH_LEN.min(id.len())],
                    author_name,
                    committed.format(TIMESTAMP_FORMAT).to_string(),
                    message,
                ),
            });
        }

        info!(
            "Found {} commits in {} for {}",
            commits.len(),
            self.path.display(),
            window
        );
        Ok(commits)
    }
}

/// Lists commits of the repository containing `path`.
pub fn list_commits(
    path: impl AsRef<Path>,
    window: &TimeWindow,
    author: Option<&str>,
) -> Result<Vec<Commit>> {
    let repo = GitRepo::open(path)?;
    repo.list_commits(window, AuthorFilter::parse(author).as_ref())
}

fn local_time(seconds: i64) -> Option<DateTime<Local>> {
    DateTime::from_timestamp(seconds, 0).map(|utc| utc.with_timezone(&Local))
}

fn subject_line(message: &str) -> String {
    message
        .trim()
        .lines()
        .next()
        .unwrap_or("")
        .trim()
        .to_string()
}
