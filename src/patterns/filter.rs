use crate::git::Commit;

/// Keyword include/exclude filter over commit messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitFilter {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl CommitFilter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn include<S: AsRef<str>>(mut self, keywords: &[S]) -> Self {
        self.include.extend(normalize(keywords));
        self
    }

    #[must_use]
    pub fn exclude<S: AsRef<str>>(mut self, keywords: &[S]) -> Self {
        self.exclude.extend(normalize(keywords));
        self
    }

    /// Builds a filter from comma-separated keyword lists.
    pub fn from_lists(include: Option<&str>, exclude: Option<&str>) -> Self {
        let split = |list: Option<&str>| -> Vec<String> {
            list.map(|l| l.split(',').map(str::to_string).collect())
                .unwrap_or_default()
        };
        Self::new()
            .include(split(include).as_slice())
            .exclude(split(exclude).as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    pub fn accepts(&self, commit: &Commit) -> bool {
        let message = commit.message.to_lowercase();
        let included =
            self.include.is_empty() || self.include.iter().any(|k| message.contains(k.as_str()));
        let excluded = self.exclude.iter().any(|k| message.contains(k.as_str()));
        included && !excluded
    }

    pub fn apply(&self, commits: &[Commit]) -> Vec<Commit> {
        commits.iter().filter(|c| self.accepts(c)).cloned().collect()
    }
}

fn normalize<S: AsRef<str>>(keywords: &[S]) -> impl Iterator<Item = String> + '_ {
    keywords
        .iter()
        .map(|k| k.as_ref().trim().to_lowercase())
        .filter(|k| !k.is_empty())
}

/// Commits whose message contains `keyword`.
pub fn search(commits: &[Commit], keyword: &str, case_sensitive: bool) -> Vec<Commit> {
    if case_sensitive {
        return commits
            .iter()
            .filter(|c| c.message.contains(keyword))
            .cloned()
            .collect();
    }

    let needle = keyword.to_lowercase();
    commits
        .iter()
        .filter(|c| c.message.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commits() -> Vec<Commit> {
        vec![
            Commit::new("a000001", "Alice", "2024-01-15 10:00", "feat: Add login page"),
            Commit::new("a000002", "Bob", "2024-01-15 09:00", "fix: typo in docs"),
            Commit::new("a000003", "Alice", "2024-01-14 10:00", "WIP: login refactor"),
            Commit::new("a000004", "Carol", "2024-01-13 10:00", "chore: bump deps"),
        ]
    }

    fn hashes(commits: &[Commit]) -> Vec<&str> {
        commits.iter().map(|c| c.hash.as_str()).collect()
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let filter = CommitFilter::new();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&commits()).len(), 4);
    }

    #[test]
    fn test_include_keywords() {
        let filtered = CommitFilter::new().include(&["login"]).apply(&commits());
        assert_eq!(hashes(&filtered), vec!["a000001", "a000003"]);
    }

    #[test]
    fn test_exclude_beats_include() {
        let filtered = CommitFilter::new()
            .include(&["login"])
            .exclude(&["wip"])
            .apply(&commits());
        assert_eq!(hashes(&filtered), vec!["a000001"]);
    }

    #[test]
    fn test_from_lists_trims_entries() {
        let filter = CommitFilter::from_lists(Some(" fix , chore,"), None);
        assert_eq!(hashes(&filter.apply(&commits())), vec!["a000002", "a000004"]);
    }

    #[test]
    fn test_search_case_modes() {
        assert_eq!(hashes(&search(&commits(), "LOGIN", false)), vec!["a000001", "a000003"]);
        assert!(search(&commits(), "LOGIN", true).is_empty());
        assert_eq!(hashes(&search(&commits(), "WIP", true)), vec!["a000003"]);
    }
}
