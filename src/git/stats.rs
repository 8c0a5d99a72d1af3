use super::author::AuthorFilter;
use super::repo::GitRepo;
use crate::error::{ReportError, Result};
use crate::window::TimeWindow;
use git2::{DiffFindOptions, DiffFormat, Oid};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorStat {
    pub author: String,
    pub total_commits: usize,
    /// Distinct paths touched, both sides of renames included
    pub files_changed: usize,
    pub insertions: usize,
    pub deletions: usize,
    pub net_lines: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoStats {
    pub total_commits: usize,
    pub total_authors: usize,
    /// Union of touched paths across all authors
    pub total_files_changed: usize,
    pub total_insertions: usize,
    pub total_deletions: usize,
    pub net_lines: i64,
    /// Most commits first; ties keep first-seen order
    pub author_stats: Vec<AuthorStat>,
}

/// Signed change from one period's stats to another's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsDelta {
    pub commits: i64,
    pub authors: i64,
    pub files_changed: i64,
    pub insertions: i64,
    pub deletions: i64,
    pub net_lines: i64,
}

impl RepoStats {
    pub fn empty() -> Self {
        Self {
            total_commits: 0,
            total_authors: 0,
            total_files_changed: 0,
            total_insertions: 0,
            total_deletions: 0,
            net_lines: 0,
            author_stats: Vec::new(),
        }
    }

    pub fn get_top_contributors(&self, limit: usize) -> &[AuthorStat] {
        &self.author_stats[..limit.min(self.author_stats.len())]
    }

    /// `later - self` for every headline figure.
    pub fn compare(&self, later: &RepoStats) -> StatsDelta {
        StatsDelta {
            commits: signed(later.total_commits) - signed(self.total_commits),
            authors: signed(later.total_authors) - signed(self.total_authors),
            files_changed: signed(later.total_files_changed) - signed(self.total_files_changed),
            insertions: signed(later.total_insertions) - signed(self.total_insertions),
            deletions: signed(later.total_deletions) - signed(self.total_deletions),
            net_lines: later.net_lines - self.net_lines,
        }
    }
}

fn signed(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

struct AuthorAccumulator {
    name: String,
    commits: usize,
    files: HashSet<String>,
    insertions: usize,
    deletions: usize,
}

/// Author accumulators kept in the order authors were first seen.
#[derive(Default)]
struct AuthorLedger {
    order: Vec<AuthorAccumulator>,
    index: HashMap<String, usize>,
    all_files: HashSet<String>,
}

impl AuthorLedger {
    fn entry(&mut self, name: &str) -> &mut AuthorAccumulator {
        let slot = match self.index.get(name) {
            Some(&slot) => slot,
            None => {
                self.order.push(AuthorAccumulator {
                    name: name.to_string(),
                    commits: 0,
                    files: HashSet::new(),
                    insertions: 0,
                    deletions: 0,
                });
                self.index.insert(name.to_string(), self.order.len() - 1);
                self.order.len() - 1
            }
        };
        &mut self.order[slot]
    }

    fn record(&mut self, author: &str, diff: Option<CommitDiff>) {
        let Some(diff) = diff else {
            self.entry(author).commits += 1;
            return;
        };

        for path in &diff.paths {
            self.all_files.insert(path.clone());
        }

        let acc = self.entry(author);
        acc.commits += 1;
        acc.insertions += diff.insertions;
        acc.deletions += diff.deletions;
        acc.files.extend(diff.paths);
    }

    fn finish(self) -> RepoStats {
        let mut author_stats: Vec<AuthorStat> = self
            .order
            .into_iter()
            .map(|acc| AuthorStat {
                net_lines: signed(acc.insertions) - signed(acc.deletions),
                author: acc.name,
                total_commits: acc.commits,
                files_changed: acc.files.len(),
                insertions: acc.insertions,
                deletions: acc.deletions,
            })
            .collect();

        // stable: equal counts stay in first-seen order
        author_stats.sort_by(|a, b| b.total_commits.cmp(&a.total_commits));

        let total_insertions: usize = author_stats.iter().map(|a| a.insertions).sum();
        let total_deletions: usize = author_stats.iter().map(|a| a.deletions).sum();

        RepoStats {
            total_commits: author_stats.iter().map(|a| a.total_commits).sum(),
            total_authors: author_stats.len(),
            total_files_changed: self.all_files.len(),
            total_insertions,
            total_deletions,
            net_lines: signed(total_insertions) - signed(total_deletions),
            author_stats,
        }
    }
}

/// Paths and heuristic line counts of one commit against its first parent.
struct CommitDiff {
    paths: Vec<String>,
    insertions: usize,
    deletions: usize,
}

pub struct StatsAggregator<'a> {
    repo: &'a GitRepo,
}

impl<'a> StatsAggregator<'a> {
    pub fn new(repo: &'a GitRepo) -> Self {
        Self { repo }
    }

    pub fn compute(&self, window: &TimeWindow, author: Option<&AuthorFilter>) -> Result<RepoStats> {
        let logged = self.repo.walk(window, author)?;
        let mut ledger = AuthorLedger::default();

        for entry in &logged {
            let diff = match self.diff_against_parent(entry.oid) {
                Ok(diff) => diff,
                Err(source) => {
                    let err = ReportError::DiffUnavailable {
                        hash: entry.commit.hash.clone(),
                        source,
                    };
                    warn!("{}; counting the commit without line stats", err);
                    None
                }
            };
            ledger.record(&entry.commit.author, diff);
        }

        let stats = ledger.finish();
        info!(
            "Stats complete: {} commits, {} authors, {} files, +{} -{}",
            stats.total_commits,
            stats.total_authors,
            stats.total_files_changed,
            stats.total_insertions,
            stats.total_deletions
        );
        Ok(stats)
    }

    /// `None` for root commits, which contribute no line or file changes.
    fn diff_against_parent(&self, oid: Oid) -> std::result::Result<Option<CommitDiff>, git2::Error> {
        let repo = self.repo.repository();
        let commit = repo.find_commit(oid)?;
        if commit.parent_count() == 0 {
            debug!("{} is a root commit, no diff", oid);
            return Ok(None);
        }

        let parent_tree = commit.parent(0)?.tree()?;
        let tree = commit.tree()?;
        let mut diff = repo.diff_tree_to_tree(Some(&parent_tree), Some(&tree), None)?;
        let mut find_opts = DiffFindOptions::new();
        find_opts.renames(true);
        diff.find_similar(Some(&mut find_opts))?;

        let mut paths = Vec::new();
        for delta in diff.deltas() {
            let old_path = delta
                .old_file()
                .path()
                .map(|p| p.to_string_lossy().into_owned());
            let new_path = delta
                .new_file()
                .path()
                .map(|p| p.to_string_lossy().into_owned());

            if let Some(old) = &old_path {
                paths.push(old.clone());
            }
            if let Some(new) = new_path {
                if old_path.as_deref() != Some(new.as_str()) {
                    paths.push(new);
                }
            }
        }

        let mut patch = String::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            if matches!(line.origin(), '+' | '-' | ' ') {
                patch.push(line.origin());
            }
            patch.push_str(&String::from_utf8_lossy(line.content()));
            if !patch.ends_with('\n') {
                patch.push('\n');
            }
            true
        })?;

        let (insertions, deletions) = count_changed_lines(&patch);
        Ok(Some(CommitDiff {
            paths,
            insertions,
            deletions,
        }))
    }
}

/// Counts `+`/`-` prefixed lines of a unified diff, skipping `+++`/`---`.
///
/// This is a textual approximation: a body line whose content itself starts
/// with `++` or `--` is skipped like a file header, and binary patches count
/// as zero since they carry no prefixed lines.
pub fn count_changed_lines(patch: &str) -> (usize, usize) {
    let mut insertions = 0;
    let mut deletions = 0;

    for line in patch.split('\n') {
        if line.starts_with('+') && !line.starts_with("+++") {
            insertions += 1;
        } else if line.starts_with('-') && !line.starts_with("---") {
            deletions += 1;
        }
    }

    (insertions, deletions)
}

/// Computes stats for the repository containing `path`.
pub fn compute_stats(
    path: impl AsRef<Path>,
    window: &TimeWindow,
    author: Option<&str>,
) -> Result<RepoStats> {
    let repo = GitRepo::open(path)?;
    StatsAggregator::new(&repo).compute(window, AuthorFilter::parse(author).as_ref())
}
