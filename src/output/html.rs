use super::*;
use rust_embed::RustEmbed;
use serde_json::json;
use std::collections::HashMap;
use tera::{Context, Tera};

#[derive(RustEmbed)]
#[folder = "src/output/templates/"]
#[include = "*.html"]
struct Templates;

const REPORT_TEMPLATE: &str = "report.html";
const EMAIL_TEMPLATE: &str = "email.html";

/// Renders HTML exports from embedded templates. Commit fields and metadata
/// are HTML-escaped by tera since both template names end in `.html`.
pub struct HtmlGenerator {
    tera: Tera,
    template: &'static str,
}

/// One rendered block of commits; flat reports have a single unnamed section.
#[derive(Debug, Serialize)]
struct Section<'a> {
    name: Option<&'a str>,
    count: usize,
    commits: &'a [Commit],
}

impl HtmlGenerator {
    /// Standalone page with an embedded stylesheet.
    pub fn report() -> Result<Self> {
        Self::with_template(REPORT_TEMPLATE)
    }

    /// Mail-client friendly page using inline styles only.
    pub fn email() -> Result<Self> {
        Self::with_template(EMAIL_TEMPLATE)
    }

    fn with_template(template: &'static str) -> Result<Self> {
        let mut tera = Tera::default();

        for file in Templates::iter() {
            let template_name = file.as_ref();
            let template_content = Templates::get(template_name).ok_or_else(|| {
                tera::Error::msg(format!("Template {} not found", template_name))
            })?;
            let template_str = std::str::from_utf8(&template_content.data).map_err(|e| {
                tera::Error::msg(format!("Invalid UTF-8 in template {}: {}", template_name, e))
            })?;

            tera.add_raw_template(template_name, template_str)?;
        }

        tera.register_filter("plural", Self::plural_filter);

        Ok(Self { tera, template })
    }

    fn plural_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
        let count = value.as_u64().unwrap_or(0) as usize;
        Ok(Value::String(commit_noun(count).to_string()))
    }

    fn prepare_template_context(
        &self,
        commits: &[Commit],
        metadata: Option<&Metadata>,
        groups: Option<&[CommitGroup]>,
    ) -> Context {
        let mut context = Context::new();

        context.insert("title", &report_title(metadata));
        context.insert("total_commits", &commits.len());
        context.insert("generated_date", &generated_stamp());

        let fields: Vec<Value> = metadata
            .map(metadata_fields)
            .unwrap_or_default()
            .into_iter()
            .map(|(label, value)| json!({ "label": label, "value": value }))
            .collect();
        context.insert("show_metadata", &metadata.is_some_and(|m| !m.is_empty()));
        context.insert("metadata_fields", &fields);

        let sections: Vec<Section> = match visible_groups(groups) {
            Some(groups) => groups
                .into_iter()
                .map(|group| Section {
                    name: Some(group.name.as_str()),
                    count: group.commits.len(),
                    commits: &group.commits,
                })
                .collect(),
            None => vec![Section {
                name: None,
                count: commits.len(),
                commits,
            }],
        };
        context.insert("sections", &sections);

        context
    }
}

impl OutputGenerator for HtmlGenerator {
    fn generate(
        &self,
        commits: &[Commit],
        metadata: Option<&Metadata>,
        groups: Option<&[CommitGroup]>,
    ) -> Result<String> {
        let context = self.prepare_template_context(commits, metadata, groups);
        let html = self.tera.render(self.template, &context)?;
        Ok(html)
    }
}
