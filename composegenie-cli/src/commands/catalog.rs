//! `composegenie catalog` command handler

use std::io::Write;
use std::time::Duration;

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

use composegenie_catalog::{Catalog, SearchQuery, format_count};
use composegenie_core::config::ComposeGenieConfig;
use composegenie_core::debounce::{DebouncedReceiver, Debouncer};
use composegenie_core::types::{CatalogImage, Category};

use crate::cli::{CatalogAction, CatalogArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `catalog` command.
pub async fn execute(
    args: CatalogArgs,
    config: &ComposeGenieConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let catalog = Catalog::from_config(&config.catalog)?;

    match args.action {
        CatalogAction::Search { query, category } => {
            let query = SearchQuery::new(parse_category(category.as_deref())?, query);
            writer.render(&SearchReport::build(&catalog, &query))
        }
        CatalogAction::Categories => writer.render(&CategoryReport::build(&catalog)),
        CatalogAction::Watch {
            category,
            debounce_ms,
        } => {
            let base = SearchQuery::new(parse_category(category.as_deref())?, "");
            let delay = Duration::from_millis(debounce_ms.unwrap_or(config.catalog.debounce_ms));
            info!(delay_ms = delay.as_millis() as u64, "watching stdin for queries");

            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            watch(stdin, &catalog, &base, delay, writer, &mut stdout).await
        }
    }
}

/// Parse an optional category flag. `None` means every category.
pub fn parse_category(input: Option<&str>) -> Result<Category, CliError> {
    let Some(input) = input else {
        return Ok(Category::All);
    };
    SearchQuery::parse_category(input).ok_or_else(|| {
        let known: Vec<String> = Category::FIXED.iter().map(Category::to_string).collect();
        CliError::Command(format!(
            "unknown category '{}' (expected one of: {})",
            input,
            known.join(", ")
        ))
    })
}

/// Feed each input line through a debouncer and render results once input pauses.
///
/// At end of input a still-pending query is rendered before returning.
pub async fn watch<R>(
    reader: R,
    catalog: &Catalog,
    base: &SearchQuery,
    delay: Duration,
    writer: &OutputWriter,
    out: &mut dyn Write,
) -> Result<(), CliError>
where
    R: AsyncBufRead + Unpin,
{
    let (mut debouncer, mut settled) = Debouncer::new(delay);
    let mut lines = reader.lines();

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(text) => {
                    debug!(query = %text, "query keystroke");
                    debouncer.push(text);
                }
                None => break,
            },
            Some(text) = settled.recv() => {
                writer.render_to(out, &SearchReport::build(catalog, &base.with_text(text)))?;
            }
        }
    }

    if let Some(text) = last_settled(&debouncer, &mut settled).await {
        writer.render_to(out, &SearchReport::build(catalog, &base.with_text(text)))?;
    }
    Ok(())
}

/// Drain every value that settled or is still scheduled, keeping only the newest.
///
/// A value can already sit in the channel while a newer push is pending, so the
/// channel is emptied until no timer remains.
async fn last_settled<T: Send + 'static>(
    debouncer: &Debouncer<T>,
    settled: &mut DebouncedReceiver<T>,
) -> Option<T> {
    let mut last = None;
    loop {
        while let Some(value) = settled.try_recv() {
            last = Some(value);
        }
        if !debouncer.is_pending() {
            return last;
        }
        match settled.recv().await {
            Some(value) => last = Some(value),
            None => return last,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ImageRow {
    pub name: String,
    pub description: String,
    pub category: String,
    pub official: bool,
    pub verified: bool,
    pub stars: u64,
    pub pulls: u64,
    pub latest_tag: String,
    pub tags: Vec<String>,
}

impl From<&CatalogImage> for ImageRow {
    fn from(image: &CatalogImage) -> Self {
        Self {
            name: image.name.clone(),
            description: image.description.clone(),
            category: image.category.to_string(),
            official: image.official,
            verified: image.verified,
            stars: image.stars,
            pulls: image.pulls,
            latest_tag: image.latest_tag.clone(),
            tags: image.tags.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchReport {
    pub category: String,
    pub query: String,
    pub total: usize,
    pub images: Vec<ImageRow>,
}

impl SearchReport {
    pub fn build(catalog: &Catalog, query: &SearchQuery) -> Self {
        let images: Vec<ImageRow> = catalog
            .search(query)
            .into_iter()
            .map(ImageRow::from)
            .collect();
        Self {
            category: query.category.to_string(),
            query: query.text.clone(),
            total: images.len(),
            images,
        }
    }
}

impl Render for SearchReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let query = if self.query.trim().is_empty() {
            "*".to_owned()
        } else {
            format!("\"{}\"", self.query.trim())
        };
        writeln!(
            w,
            "{} {} in {} ({} found)",
            "Search".bold(),
            query,
            self.category,
            self.total
        )?;

        if self.images.is_empty() {
            writeln!(w, "  No images match.")?;
            return Ok(());
        }

        writeln!(
            w,
            "  {:<16} {:<20} {:>8} {:>8}  {:<12} {}",
            "NAME", "CATEGORY", "STARS", "PULLS", "LATEST", "BADGES"
        )?;
        for image in &self.images {
            let mut badges = Vec::new();
            if image.official {
                badges.push("official".green().to_string());
            }
            if image.verified {
                badges.push("verified".cyan().to_string());
            }
            writeln!(
                w,
                "  {:<16} {:<20} {:>8} {:>8}  {:<12} {}",
                image.name,
                image.category,
                format_count(image.stars),
                format_count(image.pulls),
                image.latest_tag,
                badges.join(" ")
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryRow {
    pub name: String,
    pub images: usize,
}

#[derive(Debug, Serialize)]
pub struct CategoryReport {
    pub categories: Vec<CategoryRow>,
}

impl CategoryReport {
    pub fn build(catalog: &Catalog) -> Self {
        let categories = catalog
            .categories()
            .iter()
            .map(|category| CategoryRow {
                name: category.to_string(),
                images: catalog
                    .search(&SearchQuery::new(category.clone(), ""))
                    .len(),
            })
            .collect();
        Self { categories }
    }
}

impl Render for CategoryReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        for row in &self.categories {
            writeln!(w, "{:<20} {}", row.name, row.images)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;

    fn catalog() -> Catalog {
        Catalog::builtin().expect("embedded dataset is valid")
    }

    fn json_reports(buffer: Vec<u8>) -> Vec<serde_json::Value> {
        let text = String::from_utf8(buffer).expect("valid UTF-8");
        serde_json::Deserializer::from_str(&text)
            .into_iter::<serde_json::Value>()
            .collect::<Result<_, _>>()
            .expect("stream of JSON documents")
    }

    #[test]
    fn test_parse_category_defaults_to_all() {
        assert_eq!(parse_category(None).unwrap(), Category::All);
        assert_eq!(
            parse_category(Some("databases")).unwrap(),
            Category::Databases
        );
    }

    #[test]
    fn test_parse_category_rejects_unknown() {
        let err = parse_category(Some("spaceships")).unwrap_err();
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("spaceships"));
    }

    #[test]
    fn test_search_report_databases() {
        let report = SearchReport::build(&catalog(), &SearchQuery::new(Category::Databases, ""));
        let names: Vec<&str> = report.images.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["mysql", "postgres", "redis", "mongodb"]);
        assert_eq!(report.total, 4);
    }

    #[test]
    fn test_search_report_text_mentions_every_result() {
        let report = SearchReport::build(&catalog(), &SearchQuery::new(Category::All, "re"));
        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("render succeeds");
        let text = String::from_utf8(buffer).expect("valid UTF-8");
        for image in &report.images {
            assert!(text.contains(&image.name), "{} missing", image.name);
        }
    }

    #[test]
    fn test_empty_search_renders_placeholder() {
        let report = SearchReport::build(&catalog(), &SearchQuery::new(Category::All, "zzzz"));
        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("render succeeds");
        assert!(String::from_utf8(buffer).unwrap().contains("No images match."));
    }

    #[test]
    fn test_category_report_counts() {
        let report = CategoryReport::build(&catalog());
        assert_eq!(report.categories.len(), 10);
        assert_eq!(report.categories[0].name, "All");
        assert_eq!(report.categories[0].images, 10);
        let total: usize = report.categories[1..].iter().map(|c| c.images).sum();
        assert_eq!(total, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_renders_only_settled_query() {
        let input: &[u8] = b"r\nre\nred\nredi\n";
        let writer = OutputWriter::new(OutputFormat::Json);
        let mut out = Vec::new();

        watch(
            input,
            &catalog(),
            &SearchQuery::default(),
            Duration::from_millis(300),
            &writer,
            &mut out,
        )
        .await
        .expect("watch succeeds");

        let reports = json_reports(out);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0]["query"], "redi");
        assert_eq!(reports[0]["images"][0]["name"], "redis");
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_settled_skips_stale_value_behind_pending_push() {
        let delay = Duration::from_millis(300);
        let (mut debouncer, mut settled) = Debouncer::new(delay);

        debouncer.push("red".to_owned());
        tokio::time::sleep(delay * 2).await;
        // "red" has settled but was never received; "redis" is still pending.
        debouncer.push("redis".to_owned());

        let last = last_settled(&debouncer, &mut settled).await;
        assert_eq!(last.as_deref(), Some("redis"));
        assert!(settled.try_recv().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_settled_returns_already_settled_value() {
        let delay = Duration::from_millis(300);
        let (mut debouncer, mut settled) = Debouncer::new(delay);

        debouncer.push("nginx".to_owned());
        tokio::time::sleep(delay * 2).await;

        let last = last_settled(&debouncer, &mut settled).await;
        assert_eq!(last.as_deref(), Some("nginx"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_with_no_input_renders_nothing() {
        let input: &[u8] = b"";
        let writer = OutputWriter::new(OutputFormat::Json);
        let mut out = Vec::new();

        watch(
            input,
            &catalog(),
            &SearchQuery::default(),
            Duration::from_millis(300),
            &writer,
            &mut out,
        )
        .await
        .expect("watch succeeds");

        assert!(out.is_empty());
    }
}
