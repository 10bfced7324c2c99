//! `composegenie template` command handler

use std::io::Write;

use serde::Serialize;

use composegenie_catalog::{Template, TemplateCatalog, format_count};

use crate::cli::{TemplateAction, TemplateArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `template` command.
pub async fn execute(args: TemplateArgs, writer: &OutputWriter) -> Result<(), CliError> {
    let templates = TemplateCatalog::builtin()?;

    match args.action {
        TemplateAction::List { category } => {
            writer.render(&TemplateList::build(&templates, category.as_deref())?)
        }
        TemplateAction::Show { id } => writer.render(&TemplateDetail::find(&templates, &id)?),
    }
}

#[derive(Debug, Serialize)]
pub struct TemplateList {
    pub category: Option<String>,
    pub templates: Vec<Template>,
}

impl TemplateList {
    /// An unknown category is an error so typos don't look like an empty list.
    pub fn build(catalog: &TemplateCatalog, category: Option<&str>) -> Result<Self, CliError> {
        if let Some(wanted) = category {
            let known = catalog.categories();
            if !known.iter().any(|c| c.eq_ignore_ascii_case(wanted.trim())) {
                return Err(CliError::Command(format!(
                    "unknown template category '{}' (expected one of: {})",
                    wanted,
                    known.join(", ")
                )));
            }
        }

        Ok(Self {
            category: category.map(str::to_owned),
            templates: catalog.list(category).into_iter().cloned().collect(),
        })
    }
}

impl Render for TemplateList {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        for t in &self.templates {
            writeln!(
                w,
                "{}  {:<24} {:<18} {} services  {} uses",
                t.id.dimmed(),
                t.name.bold(),
                t.category,
                t.services,
                format_count(t.popularity)
            )?;
        }
        writeln!(w, "{} template(s)", self.templates.len())?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct TemplateDetail {
    #[serde(flatten)]
    pub template: Template,
}

impl TemplateDetail {
    pub fn find(catalog: &TemplateCatalog, id: &str) -> Result<Self, CliError> {
        catalog
            .find(id)
            .cloned()
            .map(|template| Self { template })
            .ok_or_else(|| CliError::Command(format!("no template with id '{id}'")))
    }
}

impl Render for TemplateDetail {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let t = &self.template;
        writeln!(w, "{} ({})", t.name.bold(), t.id)?;
        writeln!(w, "  {}", t.description)?;
        writeln!(w, "  Category:  {}", t.category)?;
        writeln!(w, "  Services:  {}", t.services)?;
        if !t.tags.is_empty() {
            writeln!(w, "  Tags:      {}", t.tags.join(", "))?;
        }
        writeln!(w, "  Version:   {} (updated {})", t.version, t.last_updated)?;
        writeln!(w, "  Author:    {}", t.author)?;
        writeln!(w, "  Uses:      {}", format_count(t.popularity))?;
        Ok(())
    }
}
