//! Catalog-wide normalization pass
//!
//! For each period: renumber issues, tidy and label editions, check event
//! references. Each store is read, staged and written on its own; a store
//! that cannot be read is reported and skipped while the rest proceeds.

use crate::editions::plan_format;
use crate::labels::plan_labels;
use crate::order::plan_reorder;
use crate::validate::{DanglingReference, ReferenceScope, UnresolvedEditionIssue};
use crate::{Catalog, Edition, Error, Issue, IssueIndex, Result, TitleFormatter, validate};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Which stages run, and where
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Compute everything, write nothing
    pub dry_run: bool,
    pub reorder: bool,
    pub format_editions: bool,
    pub labels: bool,
    pub check: bool,
    /// Periods to process; empty means all
    pub periods: Vec<String>,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            reorder: true,
            format_editions: true,
            labels: true,
            check: true,
            periods: Vec::new(),
        }
    }
}

impl NormalizeOptions {
    /// Every stage disabled; callers switch on the ones they want
    pub fn none() -> Self {
        Self {
            reorder: false,
            format_editions: false,
            labels: false,
            check: false,
            ..Self::default()
        }
    }
}

/// Fate of one store during a pass
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    Written,
    Unchanged,
    /// Would be written outside a dry run
    Planned,
    Missing,
    Skipped { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    /// Staged changes behind the outcome
    pub changes: usize,
    #[serde(flatten)]
    pub status: FileStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NormalizeReport {
    pub files: Vec<FileOutcome>,
    pub dangling: Vec<DanglingReference>,
    pub unresolved: Vec<UnresolvedEditionIssue>,
}

impl NormalizeReport {
    fn record(&mut self, path: PathBuf, changes: usize, status: FileStatus) {
        self.files.push(FileOutcome {
            path,
            changes,
            status,
        });
    }

    fn skip(&mut self, path: PathBuf, error: &Error) {
        let status = match error {
            Error::MissingFile(_) => FileStatus::Missing,
            _ => {
                tracing::warn!(path = %path.display(), error = %error, "store skipped");
                FileStatus::Skipped {
                    reason: error.to_string(),
                }
            }
        };
        self.record(path, 0, status);
    }

    pub fn count(&self, status: &FileStatus) -> usize {
        self.files.iter().filter(|f| &f.status == status).count()
    }

    pub fn skipped(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files
            .iter()
            .filter(|f| matches!(f.status, FileStatus::Skipped { .. }))
    }

    /// Nothing skipped and no broken references
    pub fn is_clean(&self) -> bool {
        self.skipped().next().is_none() && self.dangling.is_empty() && self.unresolved.is_empty()
    }
}

/// Run the pass over the catalog
pub fn normalize(catalog: &Catalog, options: &NormalizeOptions) -> Result<NormalizeReport> {
    let all = catalog.periods()?;
    if let Some(unknown) = options.periods.iter().find(|p| !all.contains(*p)) {
        return Err(Error::PeriodNotFound(unknown.clone()));
    }
    let selected = |period: &str| options.periods.is_empty() || options.periods.iter().any(|p| p == period);

    let mut report = NormalizeReport::default();

    // Issues first: the index and the validator see the renumbered stores.
    let mut issues_by_period: BTreeMap<&str, Vec<Issue>> = BTreeMap::new();
    for period in &all {
        let path = catalog.issues_path(period);
        let current = match catalog.load_issues(period) {
            Ok(issues) => issues,
            Err(e) => {
                if selected(period.as_str()) {
                    report.skip(path, &e);
                } else {
                    tracing::warn!(%period, error = %e, "issues left out of index");
                }
                continue;
            }
        };

        let issues = if options.reorder && selected(period.as_str()) {
            let changes = plan_reorder(&current);
            match changes.apply(&current) {
                Ok(next) => {
                    let status = settle(catalog, &path, &current, &next, options.dry_run);
                    report.record(path, changes.len(), status);
                    next
                }
                Err(e) => {
                    report.skip(path, &e);
                    current
                }
            }
        } else {
            current
        };
        issues_by_period.insert(period.as_str(), issues);
    }

    let mut index = IssueIndex::new();
    for issues in issues_by_period.values() {
        index.extend_from(issues);
    }
    tracing::debug!(issues = index.len(), "issue index built");

    let formatter = catalog.config().title_formatter();
    let validation = &catalog.config().validate;
    if options.check {
        tracing::debug!(scope = %validation.scope, "checking references");
    }

    for period in all.iter().filter(|p| selected(p.as_str())) {
        let check_editions = options.check && validation.check_editions;
        if options.format_editions || options.labels || check_editions {
            let path = catalog.editions_path(period);
            match catalog.load_editions(period) {
                Ok(current) => {
                    match stage_editions(&current, options, &index, &formatter) {
                        Ok((next, changes)) => {
                            if options.format_editions || options.labels {
                                let status = settle(catalog, &path, &current, &next, options.dry_run);
                                report.record(path, changes, status);
                            }
                            if check_editions {
                                report
                                    .unresolved
                                    .extend(validate::unresolved_editions(period, &next, &index));
                            }
                        }
                        Err(e) => report.skip(path, &e),
                    }
                }
                Err(e) => report.skip(path, &e),
            }
        }

        if options.check {
            let path = catalog.events_path(period);
            let events = match catalog.load_events(period) {
                Ok(events) => events,
                Err(e) => {
                    report.skip(path, &e);
                    continue;
                }
            };
            let dangling = match validation.scope {
                ReferenceScope::Period => match issues_by_period.get(period.as_str()) {
                    Some(issues) => validate::validate(period, &events, issues),
                    None => {
                        report.record(
                            path,
                            0,
                            FileStatus::Skipped {
                                reason: "issue store unreadable".to_string(),
                            },
                        );
                        continue;
                    }
                },
                ReferenceScope::Catalog => {
                    validate::validate_with(period, &events, |id| index.contains(id))
                }
            };
            for d in &dangling {
                tracing::warn!(period = %d.period_id, event = %d.event_id, issue = %d.issue_id, "dangling reference");
            }
            report.dangling.extend(dangling);
            report.record(path, 0, FileStatus::Unchanged);
        }
    }

    Ok(report)
}

/// Formatting then labelling, in memory
fn stage_editions(
    current: &[Edition],
    options: &NormalizeOptions,
    index: &IssueIndex,
    formatter: &TitleFormatter,
) -> Result<(Vec<Edition>, usize)> {
    let mut editions = current.to_vec();
    let mut changes = 0;

    if options.format_editions {
        let staged = plan_format(&editions);
        changes += staged.len();
        editions = staged.apply(&editions)?;
    }
    if options.labels {
        let staged = plan_labels(&editions, index, formatter);
        changes += staged.len();
        editions = staged.apply(&editions)?;
    }

    Ok((editions, changes))
}

fn settle<T>(catalog: &Catalog, path: &std::path::Path, current: &[T], next: &[T], dry_run: bool) -> FileStatus
where
    T: PartialEq + Serialize,
{
    if current == next {
        return FileStatus::Unchanged;
    }
    if dry_run {
        return FileStatus::Planned;
    }
    match catalog.commit(path, current, next) {
        Ok(true) => FileStatus::Written,
        Ok(false) => FileStatus::Unchanged,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "write failed");
            FileStatus::Skipped {
                reason: e.to_string(),
            }
        }
    }
}
