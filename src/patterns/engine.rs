use super::{default_ticket_patterns, TicketPattern};
use crate::error::{ReportError, Result};
use crate::git::Commit;
use crate::output::CommitGroup;
use fancy_regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Group name for commits that reference no ticket.
pub const NO_TICKET_GROUP: &str = "No Ticket";

/// Commits sharing one upper-cased ticket id, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketGroup {
    pub ticket_id: String,
    pub commits: Vec<Commit>,
}

impl From<TicketGroup> for CommitGroup {
    fn from(group: TicketGroup) -> Self {
        CommitGroup::new(group.ticket_id, group.commits)
    }
}

pub struct TicketExtractor {
    compiled_patterns: Vec<(Regex, TicketPattern)>,
}

impl TicketExtractor {
    /// Compiles `patterns` case-insensitively. They replace the defaults.
    pub fn new(patterns: Vec<TicketPattern>) -> Result<Self> {
        debug!("Compiling {} ticket patterns", patterns.len());

        let compiled_patterns = patterns
            .into_iter()
            .map(|pattern| {
                let regex = Regex::new(&format!("(?i){}", pattern.pattern)).map_err(|e| {
                    ReportError::InvalidPattern {
                        pattern: pattern.pattern.clone(),
                        source: Box::new(e),
                    }
                })?;
                Ok((regex, pattern))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { compiled_patterns })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(default_ticket_patterns())
    }

    /// Bare regex strings, named by position.
    pub fn from_strings<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        Self::new(
            patterns
                .iter()
                .enumerate()
                .map(|(i, p)| TicketPattern::new(format!("custom-{}", i + 1), p.as_ref()))
                .collect(),
        )
    }

    pub fn patterns(&self) -> impl Iterator<Item = &TicketPattern> {
        self.compiled_patterns.iter().map(|(_, pattern)| pattern)
    }

    /// The id as written in the message, from the first matching pattern.
    pub fn extract(&self, message: &str) -> Option<String> {
        for (regex, pattern) in &self.compiled_patterns {
            let captures = match regex.captures(message) {
                Ok(Some(captures)) => captures,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Pattern '{}' failed on a message: {}", pattern.name, e);
                    continue;
                }
            };

            // The first matching pattern decides, even when its group is empty.
            let id = if captures.len() > 1 {
                captures.get(1)
            } else {
                captures.get(0)
            };
            return id.map(|m| m.as_str().to_string());
        }
        None
    }

    /// [`TicketExtractor::group`] as report groups, unmatched commits last
    /// under [`NO_TICKET_GROUP`].
    pub fn commit_groups(&self, commits: &[Commit]) -> Vec<CommitGroup> {
        let (tickets, unmatched) = self.group(commits);
        let mut groups: Vec<CommitGroup> = tickets.into_iter().map(CommitGroup::from).collect();
        if !unmatched.is_empty() {
            groups.push(CommitGroup::new(NO_TICKET_GROUP, unmatched));
        }
        groups
    }

    /// Groups sorted by upper-cased id, plus the unmatched commits in order.
    pub fn group(&self, commits: &[Commit]) -> (Vec<TicketGroup>, Vec<Commit>) {
        let mut by_ticket: BTreeMap<String, Vec<Commit>> = BTreeMap::new();
        let mut unmatched = Vec::new();

        for commit in commits {
            match self.extract(&commit.message) {
                Some(id) => by_ticket
                    .entry(id.to_uppercase())
                    .or_default()
                    .push(commit.clone()),
                None => unmatched.push(commit.clone()),
            }
        }

        let groups = by_ticket
            .into_iter()
            .map(|(ticket_id, commits)| TicketGroup { ticket_id, commits })
            .collect::<Vec<_>>();
        debug!(
            "{} ticket groups, {} unmatched commits",
            groups.len(),
            unmatched.len()
        );
        (groups, unmatched)
    }
}

/// `patterns` of `None` uses the built-in set.
pub fn extract_ticket(message: &str, patterns: Option<&[&str]>) -> Result<Option<String>> {
    let extractor = match patterns {
        Some(patterns) => TicketExtractor::from_strings(patterns)?,
        None => TicketExtractor::with_defaults()?,
    };
    Ok(extractor.extract(message))
}

pub fn group_by_ticket(
    commits: &[Commit],
    patterns: Option<&[&str]>,
) -> Result<(Vec<TicketGroup>, Vec<Commit>)> {
    let extractor = match patterns {
        Some(patterns) => TicketExtractor::from_strings(patterns)?,
        None => TicketExtractor::with_defaults()?,
    };
    Ok(extractor.group(commits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extractor() -> TicketExtractor {
        TicketExtractor::with_defaults().unwrap()
    }

    #[test]
    fn test_extract_project_key() {
        assert_eq!(
            extractor().extract("PROJECT-123: add feature"),
            Some("PROJECT-123".to_string())
        );
    }

    #[test]
    fn test_extract_issue_shorthand() {
        assert_eq!(extractor().extract("Closes #456"), Some("456".to_string()));
    }

    #[test]
    fn test_extract_none() {
        assert_eq!(extractor().extract("no ticket here"), None);
    }

    #[test]
    fn test_extract_is_case_insensitive() {
        assert_eq!(
            extractor().extract("fix for proj-42 regression"),
            Some("proj-42".to_string())
        );
    }

    #[test]
    fn test_extract_ticket_phrase() {
        assert_eq!(
            extractor().extract("Resolve ticket: 77 in parser"),
            Some("77".to_string())
        );
    }

    #[test]
    fn test_first_pattern_wins() {
        assert_eq!(
            extractor().extract("ABC-1 also fixes #2"),
            Some("ABC-1".to_string())
        );
    }

    #[test]
    fn test_custom_patterns_replace_defaults() {
        let custom = TicketExtractor::from_strings(&[r"TASK(\d+)"]).unwrap();
        assert_eq!(custom.extract("TASK12 done"), Some("12".to_string()));
        assert_eq!(custom.extract("PROJECT-123 done"), None);
    }

    #[test]
    fn test_pattern_without_group_returns_whole_match() {
        let custom = TicketExtractor::from_strings(&[r"REQ-\d+"]).unwrap();
        assert_eq!(custom.extract("see req-9"), Some("req-9".to_string()));
    }

    #[test]
    fn test_first_matching_pattern_decides_even_without_group() {
        let custom = TicketExtractor::from_strings(&[r"BUG(?:-(\d+))?", r"#(\d+)"]).unwrap();
        assert_eq!(custom.extract("BUG found, see #8"), None);
        assert_eq!(custom.extract("BUG-42 found, see #8"), Some("42".to_string()));
        assert_eq!(custom.extract("crash, see #8"), Some("8".to_string()));
    }

    #[test]
    fn test_commit_groups_append_no_ticket() {
        let commits = vec![
            Commit::new("a000001", "Alice", "2024-01-15 10:00", "ABC-2 second"),
            Commit::new("a000002", "Bob", "2024-01-15 09:00", "tidy up"),
            Commit::new("a000003", "Alice", "2024-01-14 10:00", "ABC-1 first"),
        ];
        let groups = extractor().commit_groups(&commits);
        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["ABC-1", "ABC-2", NO_TICKET_GROUP]);
        assert_eq!(groups[2].commits[0].hash, "a000002");

        let all_ticketed = extractor().commit_groups(&commits[..1]);
        assert_eq!(all_ticketed.len(), 1);
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        match TicketExtractor::from_strings(&["(unclosed"]) {
            Err(ReportError::InvalidPattern { pattern, .. }) => assert_eq!(pattern, "(unclosed"),
            Err(e) => panic!("Expected InvalidPattern, got {}", e),
            Ok(_) => panic!("Expected InvalidPattern, got a compiled extractor"),
        }
    }

    #[test]
    fn test_group_by_ticket_sorts_and_keeps_unmatched() {
        let commits = vec![
            Commit::new("a000001", "Alice", "2024-01-15 10:00", "PROJECT-123: start"),
            Commit::new("a000002", "Bob", "2024-01-15 09:00", "refactor helpers"),
            Commit::new("a000003", "Alice", "2024-01-14 10:00", "project-123 finish"),
            Commit::new("a000004", "Bob", "2024-01-13 10:00", "Fix #789"),
            Commit::new("a000005", "Carol", "2024-01-12 10:00", "PROJECT-456 docs"),
        ];

        let (groups, unmatched) = extractor().group(&commits);
        let ids: Vec<&str> = groups.iter().map(|g| g.ticket_id.as_str()).collect();
        assert_eq!(ids, vec!["789", "PROJECT-123", "PROJECT-456"]);
        assert_eq!(groups[1].commits.len(), 2);
        assert_eq!(groups[1].commits[0].hash, "a000001");
        assert_eq!(unmatched.len(), 1);
        assert_eq!(unmatched[0].hash, "a000002");
    }

    #[test]
    fn test_ticket_group_into_commit_group() {
        let group = TicketGroup {
            ticket_id: "ABC-1".to_string(),
            commits: vec![Commit::new("a000001", "Alice", "2024-01-15 10:00", "ABC-1")],
        };
        let group: CommitGroup = group.into();
        assert_eq!(group.name, "ABC-1");
        assert_eq!(group.commits.len(), 1);
    }
}
