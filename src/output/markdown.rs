use super::*;

const TABLE_HEADER: &str = "| Hash | Author | Date | Message |\n|------|--------|------|---------|";

pub struct MarkdownGenerator;

impl MarkdownGenerator {
    fn push_table(lines: &mut Vec<String>, commits: &[Commit]) {
        lines.push(TABLE_HEADER.to_string());
        for commit in commits {
            lines.push(format!(
                "| `{}` | {} | {} | {} |",
                commit.hash,
                cell(&commit.author),
                commit.timestamp,
                cell(&commit.message)
            ));
        }
    }
}

impl OutputGenerator for MarkdownGenerator {
    fn generate(
        &self,
        commits: &[Commit],
        metadata: Option<&Metadata>,
        groups: Option<&[CommitGroup]>,
    ) -> Result<String> {
        let mut lines = vec![format!("# {}\n", report_title(metadata))];

        if let Some(metadata) = metadata {
            for (label, value) in metadata_fields(metadata) {
                lines.push(format!("**{}:** {}\n", label, value));
            }
        }
        lines.push(format!("**Total Commits:** {}\n", commits.len()));
        lines.push(format!("**Generated:** {}\n", generated_stamp()));
        lines.push("---\n".to_string());

        match visible_groups(groups) {
            Some(groups) => {
                for group in groups {
                    lines.push(format!(
                        "## {} ({} {})\n",
                        group.name,
                        group.commits.len(),
                        commit_noun(group.commits.len())
                    ));
                    Self::push_table(&mut lines, &group.commits);
                    lines.push(String::new());
                }
            }
            None => {
                lines.push("## Commits\n".to_string());
                Self::push_table(&mut lines, commits);
            }
        }

        Ok(lines.join("\n"))
    }
}

/// Keeps a pipe in a message from splitting the table row.
fn cell(text: &str) -> String {
    text.replace('|', "\\|")
}
