use super::*;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Wire shape of one exported commit. The origin is left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedCommit {
    pub hash: String,
    pub author: String,
    pub date: String,
    pub message: String,
}

impl From<&Commit> for ExportedCommit {
    fn from(commit: &Commit) -> Self {
        Self {
            hash: commit.hash.clone(),
            author: commit.author.clone(),
            date: commit.timestamp.clone(),
            message: commit.message.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonExport {
    pub metadata: Metadata,
    pub commits: Vec<ExportedCommit>,
    pub total_commits: usize,
    pub exported_at: String,
}

pub struct JsonGenerator;

impl OutputGenerator for JsonGenerator {
    /// Groups do not change JSON output.
    fn generate(
        &self,
        commits: &[Commit],
        metadata: Option<&Metadata>,
        _groups: Option<&[CommitGroup]>,
    ) -> Result<String> {
        let export = JsonExport {
            metadata: metadata.cloned().unwrap_or_default(),
            commits: commits.iter().map(ExportedCommit::from).collect(),
            total_commits: commits.len(),
            exported_at: Local::now().to_rfc3339(),
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }
}

/// Renders commits into one export format.
pub struct Exporter {
    format: ExportFormat,
}

impl Exporter {
    pub fn new(format: ExportFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn render(
        &self,
        commits: &[Commit],
        metadata: Option<&Metadata>,
        groups: Option<&[CommitGroup]>,
    ) -> Result<String> {
        match self.format {
            ExportFormat::Json => JsonGenerator.generate(commits, metadata, groups),
            ExportFormat::Markdown => MarkdownGenerator.generate(commits, metadata, groups),
            ExportFormat::Html => HtmlGenerator::report()?.generate(commits, metadata, groups),
            ExportFormat::Email => HtmlGenerator::email()?.generate(commits, metadata, groups),
        }
    }
}

/// Renders `commits` in the format named by `format`.
pub fn export_commits(
    commits: &[Commit],
    format: &str,
    metadata: Option<&Metadata>,
    groups: Option<&[CommitGroup]>,
) -> Result<String> {
    let format: ExportFormat = format.parse()?;
    Exporter::new(format).render(commits, metadata, groups)
}

/// Sends a rendered export to a file, or to stdout when no path is given.
pub struct Reporter {
    exporter: Exporter,
    output_path: Option<PathBuf>,
}

impl Reporter {
    pub fn new(format: &str, output_path: Option<&str>) -> Result<Self> {
        let format: ExportFormat = format.parse()?;
        let output_path = output_path.map(|p| PathBuf::from(add_file_extension(p, &format)));

        Ok(Self {
            exporter: Exporter::new(format),
            output_path,
        })
    }

    pub fn output_path(&self) -> Option<&PathBuf> {
        self.output_path.as_ref()
    }

    pub fn generate_report(
        &self,
        commits: &[Commit],
        metadata: Option<&Metadata>,
        groups: Option<&[CommitGroup]>,
    ) -> Result<()> {
        let content = self.exporter.render(commits, metadata, groups)?;

        match &self.output_path {
            Some(path) => {
                fs::write(path, content)?;
                info!("Report saved to {}", path.display());
            }
            None => println!("{}", content),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample() -> Vec<Commit> {
        vec![
            Commit::new("abc1234", "Alice", "2024-01-15 10:30", "feat: add login")
                .with_origin("web"),
            Commit::new("def5678", "Bob", "2024-01-14 09:00", "fix: \"quoted\" crash"),
        ]
    }

    #[test]
    fn test_json_empty() {
        let out = export_commits(&[], "json", None, None).unwrap();
        let parsed: JsonExport = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed.total_commits, 0);
        assert!(parsed.commits.is_empty());
        assert!(parsed.metadata.is_empty());
    }

    #[test]
    fn test_json_round_trip_keeps_order_and_drops_origin() {
        let commits = sample();
        let out = export_commits(&commits, "json", None, None).unwrap();
        let parsed: JsonExport = serde_json::from_str(&out).unwrap();

        let expected: Vec<ExportedCommit> = commits.iter().map(ExportedCommit::from).collect();
        assert_eq!(parsed.commits, expected);
        assert_eq!(parsed.total_commits, 2);
        assert!(!out.contains("origin"));
    }

    #[test]
    fn test_json_metadata_passthrough() {
        let metadata = json!({"title": "Weekly", "sprint": 12})
            .as_object()
            .cloned()
            .unwrap();
        let out = export_commits(&sample(), "JSON", Some(&metadata), None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["metadata"]["sprint"], json!(12));
        assert!(value["exported_at"].is_string());
    }

    #[test]
    fn test_unsupported_format() {
        let result = export_commits(&sample(), "pdf", None, None);
        assert!(matches!(
            result,
            Err(ReportError::UnsupportedExportFormat { .. })
        ));
    }

    #[test]
    fn test_reporter_writes_file_with_extension() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("weekly");
        let reporter = Reporter::new("markdown", Some(base.to_str().unwrap())).unwrap();
        reporter.generate_report(&sample(), None, None).unwrap();

        let written = dir.path().join("weekly.md");
        assert_eq!(reporter.output_path(), Some(&written));
        let content = fs::read_to_string(written).unwrap();
        assert!(content.starts_with("# Git Commit Report"));
    }
}
