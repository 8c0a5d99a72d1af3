use super::author::AuthorFilter;
use super::repo::GitRepo;
use super::Commit;
use crate::output::CommitGroup;
use crate::window::TimeWindow;
use git2::Repository;
use ignore::WalkBuilder;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// How many directory levels below the base discovery descends.
pub const DEFAULT_DISCOVERY_DEPTH: usize = 2;

/// Fans a commit query out over several repositories, one at a time.
pub struct MultiRepoAggregator {
    paths: Vec<PathBuf>,
}

impl MultiRepoAggregator {
    pub fn new<P: AsRef<Path>>(paths: &[P]) -> Self {
        Self {
            paths: paths.iter().map(|p| p.as_ref().to_path_buf()).collect(),
        }
    }

    /// Every repository found under `base`, see [`discover_repositories`].
    pub fn discover(base: impl AsRef<Path>, max_depth: usize) -> Self {
        Self {
            paths: discover_repositories(base, max_depth),
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Merged commits tagged with their origin, newest first.
    ///
    /// Paths that are not repositories, or whose history cannot be read, are
    /// skipped with a warning. Ordering compares the minute-precision
    /// timestamp only, so commits from the same minute keep path order.
    pub fn collect(&self, window: &TimeWindow, author: Option<&AuthorFilter>) -> Vec<Commit> {
        let mut merged = Vec::new();

        for path in &self.paths {
            let origin = origin_label(path);
            let commits = GitRepo::open(path).and_then(|repo| repo.list_commits(window, author));
            match commits {
                Ok(commits) => {
                    debug!("{} commits from {}", commits.len(), origin);
                    merged.extend(commits.into_iter().map(|c| c.with_origin(origin.clone())));
                }
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                }
            }
        }

        merged.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        info!(
            "Aggregated {} commits from {} repositories",
            merged.len(),
            self.paths.len()
        );
        merged
    }
}

pub fn aggregate<P: AsRef<Path>>(
    paths: &[P],
    window: &TimeWindow,
    author: Option<&str>,
) -> Vec<Commit> {
    MultiRepoAggregator::new(paths).collect(window, AuthorFilter::parse(author).as_ref())
}

/// Final directory name of `path`, falling back to the path itself.
pub fn origin_label(path: impl AsRef<Path>) -> String {
    let path = path.as_ref();
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| path.display().to_string())
}

/// Directories under `base` (itself included) that open as repositories.
///
/// A repository is a leaf: nothing below one is reported. `max_depth` counts
/// levels below `base`, so a depth of 1 only inspects direct children.
pub fn discover_repositories(base: impl AsRef<Path>, max_depth: usize) -> Vec<PathBuf> {
    let base = base.as_ref();
    let walker = WalkBuilder::new(base)
        .standard_filters(false)
        .max_depth(Some(max_depth))
        .filter_entry(|entry| entry.file_name() != ".git")
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut found: Vec<PathBuf> = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Discovery skipped an entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_some_and(|t| t.is_dir()) {
            continue;
        }

        let path = entry.path();
        if found.iter().any(|repo| path.starts_with(repo)) {
            continue;
        }

        if Repository::open(path).is_ok() {
            debug!("Discovered repository at {}", path.display());
            found.push(path.to_path_buf());
        }
    }

    info!("Discovered {} repositories under {}", found.len(), base.display());
    found
}

/// One group per origin, ordered by origin name.
pub fn group_by_origin(commits: &[Commit]) -> Vec<CommitGroup> {
    let mut by_origin: BTreeMap<&str, Vec<Commit>> = BTreeMap::new();
    for commit in commits {
        by_origin
            .entry(commit.origin.as_str())
            .or_default()
            .push(commit.clone());
    }

    by_origin
        .into_iter()
        .map(|(origin, commits)| CommitGroup::new(origin, commits))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_label_is_final_component() {
        assert_eq!(origin_label("/home/dev/projects/api-server"), "api-server");
        assert_eq!(origin_label("relative/web/"), "web");
    }

    #[test]
    fn test_origin_label_root_falls_back_to_path() {
        assert_eq!(origin_label("/"), "/");
    }

    #[test]
    fn test_group_by_origin_sorted_by_name() {
        let commits = vec![
            Commit::new("aaaaaaa", "Alice", "2024-01-10 10:00", "one").with_origin("web"),
            Commit::new("bbbbbbb", "Bob", "2024-01-10 09:00", "two").with_origin("api"),
            Commit::new("ccccccc", "Alice", "2024-01-09 10:00", "three").with_origin("web"),
        ];

        let groups = group_by_origin(&commits);
        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["api", "web"]);
        assert_eq!(groups[1].commits.len(), 2);
        assert_eq!(groups[1].commits[0].hash, "aaaaaaa");
    }

    #[test]
    fn test_aggregate_with_only_missing_paths_is_empty() {
        let window = TimeWindow::custom("2024-01-01", "2024-01-31").unwrap();
        let commits = aggregate(&["/nonexistent/commitpulse/one"], &window, None);
        assert!(commits.is_empty());
    }
}
