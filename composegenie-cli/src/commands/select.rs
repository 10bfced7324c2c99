//! `composegenie select` command handler

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tracing::{info, warn};

use composegenie_catalog::Catalog;
use composegenie_core::config::ComposeGenieConfig;
use composegenie_core::event::{SelectionChange, SelectionEvent};
use composegenie_core::types::SelectionEntry;
use composegenie_selection::SelectionService;

use crate::cli::{SelectAction, SelectArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `select` command.
pub async fn execute(
    args: SelectArgs,
    config: &ComposeGenieConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let service = SelectionService::from_config(&config.selection);
    let report = match args.action {
        SelectAction::Add { name, tag } => {
            let catalog = Catalog::from_config(&config.catalog)?;
            let entry = resolve_entry(&catalog, name, tag)?;
            apply(&service, Operation::Add, |s| {
                s.add(entry);
            })?
        }
        SelectAction::Remove { name, tag } => apply(&service, Operation::Remove, |s| {
            s.remove(&name, &tag);
        })?,
        SelectAction::List => apply(&service, Operation::List, |_| {})?,
        SelectAction::Clear => apply(&service, Operation::Clear, |s| {
            s.clear();
        })?,
    };
    writer.render(&report)
}

/// Build the entry to add, filling the tag from the catalog's latest tag when omitted.
pub fn resolve_entry(
    catalog: &Catalog,
    name: String,
    tag: Option<String>,
) -> Result<SelectionEntry, CliError> {
    let image = catalog.find(&name);
    match (tag, image) {
        (Some(tag), Some(image)) => {
            if !image.has_tag(&tag) {
                warn!(name = %name, tag = %tag, "tag is not listed in the catalog");
            }
            Ok(SelectionEntry::new(name, tag))
        }
        (Some(tag), None) => {
            warn!(name = %name, "image is not in the catalog");
            Ok(SelectionEntry::new(name, tag))
        }
        (None, Some(image)) => Ok(SelectionEntry::new(name, image.latest_tag.clone())),
        (None, None) => Err(CliError::Command(format!(
            "unknown image '{name}': pass a TAG explicitly"
        ))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Remove,
    List,
    Clear,
}

/// Run one mutation with a listener attached, the same way a view would observe it.
///
/// A failed write is reported as an error rather than as "no change".
pub fn apply<F>(
    service: &SelectionService,
    operation: Operation,
    mutate: F,
) -> Result<SelectionReport, CliError>
where
    F: FnOnce(&SelectionService),
{
    let observed: Arc<Mutex<Vec<ChangeRow>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&observed);
    let subscription = service.subscribe(move |event: &SelectionEvent| {
        info!(event = %event, "selection changed");
        sink.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ChangeRow::from(event));
    });

    service.store().take_write_error();
    mutate(service);
    subscription.unsubscribe();

    if let Some(err) = service.store().take_write_error() {
        return Err(CliError::Storage(err.to_string()));
    }

    let changes = std::mem::take(&mut *observed.lock().unwrap_or_else(PoisonError::into_inner));
    Ok(SelectionReport {
        operation,
        changes,
        entries: service.load(),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangeRow {
    pub change: SelectionChange,
    pub name: String,
    pub tag: String,
}

impl From<&SelectionEvent> for ChangeRow {
    fn from(event: &SelectionEvent) -> Self {
        Self {
            change: event.change,
            name: event.entry.name.clone(),
            tag: event.entry.tag.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SelectionReport {
    pub operation: Operation,
    pub changes: Vec<ChangeRow>,
    pub entries: Vec<SelectionEntry>,
}

impl Render for SelectionReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        for change in &self.changes {
            let reference = format!("{}:{}", change.name, change.tag);
            match change.change {
                SelectionChange::Added => writeln!(w, "{} {}", "+".green(), reference)?,
                SelectionChange::Removed => writeln!(w, "{} {}", "-".red(), reference)?,
            }
        }
        if self.changes.is_empty() && self.operation != Operation::List {
            writeln!(w, "No change.")?;
        }

        if self.entries.is_empty() {
            writeln!(w, "No services selected.")?;
        } else {
            writeln!(w, "{} ({}):", "Selected".bold(), self.entries.len())?;
            for (i, entry) in self.entries.iter().enumerate() {
                writeln!(w, "  {}. {}", i + 1, entry)?;
            }
        }
        Ok(())
    }
}
