//! Progress export and import
//!
//! Export document: `{ "<category>": { "completedSteps": [..], "data": {..} } }`
//! for the selected categories. Import accepts the same shape, ignores
//! unknown top-level keys and merges into the persisted state only after the
//! whole document validated.

use crate::capability::{Localizer, NoticeLevel, Notifier};
use crate::engine::WorkflowEngine;
use crate::error::TransferError;
use crate::state::WorkflowState;
use crate::store::KeyValueStore;
use chrono::NaiveDate;
use realty_catalog::WorkflowCategory;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Exported progress of one category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryExport {
    /// Completed step ids in completion order
    pub completed_steps: Vec<String>,
    /// Step-specific saved values
    #[serde(default)]
    pub data: Map<String, Value>,
}

/// What an import changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Categories merged into persisted state
    pub applied: Vec<WorkflowCategory>,
    /// Top-level keys that name no known category
    pub ignored_keys: Vec<String>,
    /// Imported step ids that the catalog does not know
    pub dropped_steps: Vec<(WorkflowCategory, String)>,
}

/// File name of an export made on `date`
#[must_use]
pub fn export_file_name(date: NaiveDate) -> String {
    format!("workflow-export-{}.json", date.format("%Y-%m-%d"))
}

type ParsedImport = (Vec<(WorkflowCategory, CategoryExport)>, Vec<String>);

/// Validate an import document without touching any state
fn parse_import(text: &str) -> Result<ParsedImport, TransferError> {
    let document: Value = serde_json::from_str(text).map_err(TransferError::Parse)?;
    let Value::Object(entries) = document else {
        return Err(TransferError::NotAnObject);
    };

    let mut categories = Vec::new();
    let mut ignored = Vec::new();
    for (key, value) in entries {
        let Ok(category) = key.parse::<WorkflowCategory>() else {
            ignored.push(key);
            continue;
        };
        let export: CategoryExport =
            serde_json::from_value(value).map_err(|e| TransferError::InvalidCategory {
                category,
                reason: e.to_string(),
            })?;
        categories.push((category, export));
    }
    Ok((categories, ignored))
}

impl<S: KeyValueStore> WorkflowEngine<S> {
    /// Export document for `categories`
    #[must_use]
    pub fn export_document(&self, categories: &[WorkflowCategory]) -> Value {
        let mut document = Map::new();
        for &category in categories {
            let state = self.state(category);
            let export = CategoryExport {
                completed_steps: state.completed_steps().iter().map(str::to_string).collect(),
                data: state.data().clone(),
            };
            // CategoryExport only holds strings and JSON values
            if let Ok(value) = serde_json::to_value(export) {
                document.insert(category.as_str().to_string(), value);
            }
        }
        Value::Object(document)
    }

    /// Pretty-printed export document
    ///
    /// # Errors
    ///
    /// [`TransferError::Store`] if the document cannot be encoded.
    pub fn export_json(&self, categories: &[WorkflowCategory]) -> Result<String, TransferError> {
        serde_json::to_string_pretty(&self.export_document(categories))
            .map_err(|e| TransferError::Store(e.into()))
    }

    /// Write the export for `categories` into `dir`, named after `date`
    ///
    /// # Errors
    ///
    /// [`TransferError::Io`] if the file cannot be written.
    pub fn export_to_dir(
        &self,
        categories: &[WorkflowCategory],
        dir: &Path,
        date: NaiveDate,
        localizer: &dyn Localizer,
        notifier: &dyn Notifier,
    ) -> Result<PathBuf, TransferError> {
        let json = self.export_json(categories)?;
        let path = dir.join(export_file_name(date));
        if let Err(e) = std::fs::write(&path, json) {
            notifier.notify(
                NoticeLevel::Error,
                &format!("{}: {}", localizer.translate("workflow.export.failed"), e),
            );
            return Err(e.into());
        }

        info!("Exported {} workflows to {}", categories.len(), path.display());
        notifier.notify(
            NoticeLevel::Success,
            &format!("{}: {}", localizer.translate("workflow.export.success"), path.display()),
        );
        Ok(path)
    }

    /// Merge an export document into persisted state
    ///
    /// Completed steps are unioned with the existing ones, imported data
    /// keys overwrite existing keys and the active step is kept. Nothing is
    /// written unless the whole document is valid, and if a write fails the
    /// categories already written are restored.
    ///
    /// # Errors
    ///
    /// [`TransferError::Parse`], [`TransferError::NotAnObject`] or
    /// [`TransferError::InvalidCategory`] for a bad document, and
    /// [`TransferError::Store`] if persisting fails.
    pub fn import_json(
        &mut self,
        text: &str,
        localizer: &dyn Localizer,
        notifier: &dyn Notifier,
    ) -> Result<ImportReport, TransferError> {
        let (entries, ignored_keys) = match parse_import(text) {
            Ok(parsed) => parsed,
            Err(e) => return Err(report_failure(e, localizer, notifier)),
        };

        let mut report = ImportReport {
            ignored_keys,
            ..ImportReport::default()
        };
        let mut merged: Vec<(WorkflowCategory, WorkflowState)> =
            Vec::with_capacity(entries.len());
        for (category, export) in entries {
            let Some(definition) = self.definition(category) else {
                report.ignored_keys.push(category.as_str().to_string());
                continue;
            };

            let mut state = self.state(category);
            for step in export.completed_steps {
                if definition.step(&step).is_some() {
                    state.completed_steps_mut().insert(step);
                } else {
                    warn!("Import: dropping unknown step {} in workflow {}", step, category);
                    report.dropped_steps.push((category, step));
                }
            }
            state.data_mut().extend(export.data);
            merged.push((category, state));
        }

        let mut written: Vec<(WorkflowCategory, WorkflowState)> = Vec::with_capacity(merged.len());
        for (category, state) in merged {
            let previous = self.store().load(category);
            if let Err(e) = self.store_mut().save(category, &state) {
                self.restore(written);
                return Err(report_failure(e.into(), localizer, notifier));
            }
            written.push((category, previous));
            report.applied.push(category);
        }

        info!("Imported workflows {:?}", report.applied);
        notifier.notify(NoticeLevel::Success, &localizer.translate("workflow.import.success"));
        Ok(report)
    }

    /// Read `path` and import it
    ///
    /// # Errors
    ///
    /// [`TransferError::Io`] if the file cannot be read, otherwise as
    /// [`import_json`](Self::import_json).
    pub fn import_file(
        &mut self,
        path: &Path,
        localizer: &dyn Localizer,
        notifier: &dyn Notifier,
    ) -> Result<ImportReport, TransferError> {
        match std::fs::read_to_string(path) {
            Ok(text) => self.import_json(&text, localizer, notifier),
            Err(e) => Err(report_failure(e.into(), localizer, notifier)),
        }
    }

    /// Write back the states an aborted import replaced
    fn restore(&mut self, previous: Vec<(WorkflowCategory, WorkflowState)>) {
        for (category, state) in previous.into_iter().rev() {
            if let Err(e) = self.store_mut().save(category, &state) {
                error!("Import rollback of workflow {} failed: {}", category, e);
            }
        }
    }
}

fn report_failure(
    error: TransferError,
    localizer: &dyn Localizer,
    notifier: &dyn Notifier,
) -> TransferError {
    warn!("Import failed: {}", error);
    notifier.notify(
        NoticeLevel::Error,
        &format!("{}: {}", localizer.translate("workflow.import.failed"), error),
    );
    error
}
