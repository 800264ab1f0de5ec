//! Adding a scraped issue to the catalog
//!
//! Planning reads the creator registries and the period's issue store and
//! stages every change; committing writes writers, then pencillers, then
//! issues, each only if it changed. Re-running an ingestion is harmless:
//! an issue already present is left as stored and known creators are
//! skipped.

use crate::creators::{Registry, plan_merge};
use crate::extract::{Draft, Extractor};
use crate::order::next_order;
use crate::store::Missing;
use crate::{Catalog, ChangeSet, Creator, Error, Issue, Result};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOptions {
    /// Store the issue without `period_id`, outside the reading order
    pub unordered: bool,
}

/// Staged result of ingesting one draft
#[derive(Debug, Clone)]
pub struct IngestPlan {
    pub period_id: String,
    /// The issue as stored after the commit
    pub issue: Issue,
    pub writers: ChangeSet<Creator>,
    pub pencillers: ChangeSet<Creator>,
    pub issues: ChangeSet<Issue>,
}

/// What a committed ingestion did
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub period_id: String,
    pub issue_id: String,
    pub order: Option<u32>,
    pub issue_added: bool,
    pub writers_added: Vec<String>,
    pub pencillers_added: Vec<String>,
    pub written: Vec<PathBuf>,
}

impl IngestPlan {
    /// Whether the issue is not in the store yet
    pub fn issue_is_new(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn is_noop(&self) -> bool {
        self.writers.is_empty() && self.pencillers.is_empty() && self.issues.is_empty()
    }

    /// Write the staged changes
    pub fn commit(&self, catalog: &Catalog) -> Result<IngestReport> {
        let mut written = Vec::new();

        for (registry, changes) in [
            (Registry::Writers, &self.writers),
            (Registry::Pencillers, &self.pencillers),
        ] {
            let path = catalog.registry_path(registry);
            if catalog.apply(&path, changes, Missing::Empty)? {
                tracing::debug!(%registry, added = changes.len(), "registry extended");
                written.push(path);
            }
        }

        if catalog.apply_issues(&self.period_id, &self.issues)? {
            written.push(catalog.issues_path(&self.period_id));
            tracing::info!(
                id = %self.issue.id,
                period = %self.period_id,
                order = ?self.issue.order,
                "issue added"
            );
        } else {
            tracing::info!(id = %self.issue.id, period = %self.period_id, "issue already present");
        }

        Ok(IngestReport {
            period_id: self.period_id.clone(),
            issue_id: self.issue.id.clone(),
            order: self.issue.order,
            issue_added: self.issue_is_new(),
            writers_added: ids(&self.writers),
            pencillers_added: ids(&self.pencillers),
            written,
        })
    }
}

fn ids(changes: &ChangeSet<Creator>) -> Vec<String> {
    changes.added().map(|c| c.id.clone()).collect()
}

/// Stage the ingestion of `draft` into `period_id` without touching disk
pub fn plan_ingest(
    catalog: &Catalog,
    period_id: &str,
    draft: &Draft,
    options: IngestOptions,
) -> Result<IngestPlan> {
    catalog.period_dir(period_id)?;

    let mut issue = draft.to_issue()?;
    if let Some(draft_period) = issue.period_id.as_deref()
        && draft_period != period_id
    {
        return Err(Error::PeriodMismatch {
            draft: draft_period.to_string(),
            target: period_id.to_string(),
        });
    }
    issue.period_id = (!options.unordered).then(|| period_id.to_string());

    let stored = catalog.load_issues(period_id)?;
    let mut issues = ChangeSet::new();
    match stored.iter().find(|i| i.id == issue.id) {
        Some(existing) => {
            tracing::debug!(id = %issue.id, "issue already in store");
            issue = existing.clone();
        }
        None => {
            if issue.is_period_scoped() {
                issue.order = Some(next_order(&stored));
            }
            issues.add(issue.clone());
        }
    }

    let writers = plan_merge(
        &catalog.load_registry(Registry::Writers)?,
        &draft.writer_records(),
    );
    let pencillers = plan_merge(
        &catalog.load_registry(Registry::Pencillers)?,
        &draft.penciller_records(),
    );

    Ok(IngestPlan {
        period_id: period_id.to_string(),
        issue,
        writers,
        pencillers,
        issues,
    })
}

/// Extract, plan and commit in one go
///
/// A failed extraction aborts before any store is read or written.
pub fn ingest(
    catalog: &Catalog,
    period_id: &str,
    extractor: &dyn Extractor,
    options: IngestOptions,
) -> Result<IngestReport> {
    let draft = extractor.extract()?;
    plan_ingest(catalog, period_id, &draft, options)?.commit(catalog)
}
