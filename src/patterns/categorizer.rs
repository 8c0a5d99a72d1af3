use super::{default_category_rules, CategoryRule, ComponentLabel};
use crate::git::Commit;
use crate::output::CommitGroup;
use std::collections::{BTreeMap, HashMap};

/// Ordered keyword rules; the first rule whose keywords hit decides the label.
#[derive(Debug, Clone)]
pub struct Categorizer {
    rules: Vec<CategoryRule>,
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::new(default_category_rules())
    }
}

impl Categorizer {
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn classify(&self, message: &str) -> ComponentLabel {
        let lowered = message.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| rule.label)
            .unwrap_or(ComponentLabel::Others)
    }

    /// All three labels are always present, each keeping input order.
    pub fn group_by_component<S: AsRef<str>>(
        &self,
        messages: &[S],
    ) -> BTreeMap<ComponentLabel, Vec<String>> {
        let mut groups: BTreeMap<ComponentLabel, Vec<String>> = ComponentLabel::ALL
            .iter()
            .map(|label| (*label, Vec::new()))
            .collect();

        for message in messages {
            let message = message.as_ref();
            groups
                .entry(self.classify(message))
                .or_default()
                .push(message.to_string());
        }
        groups
    }

    /// Non-empty component groups in priority order, for grouped exports.
    pub fn group_commits(&self, commits: &[Commit]) -> Vec<CommitGroup> {
        let mut buckets: BTreeMap<ComponentLabel, Vec<Commit>> = BTreeMap::new();
        for commit in commits {
            buckets
                .entry(self.classify(&commit.message))
                .or_default()
                .push(commit.clone());
        }

        buckets
            .into_iter()
            .map(|(label, commits)| CommitGroup::new(label.to_string(), commits))
            .collect()
    }
}

pub fn categorize(message: &str) -> ComponentLabel {
    Categorizer::default().classify(message)
}

/// One group per author, busiest first; ties keep first-seen order.
pub fn group_by_author(commits: &[Commit]) -> Vec<CommitGroup> {
    let mut groups: Vec<CommitGroup> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for commit in commits {
        let slot = *index.entry(commit.author.as_str()).or_insert_with(|| {
            groups.push(CommitGroup::new(commit.author.clone(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].commits.push(commit.clone());
    }

    groups.sort_by(|a, b| b.commits.len().cmp(&a.commits.len()));
    groups
}
