//! Referential checks between events, editions and issues
//!
//! Read-only: findings are returned as a report and never abort a pass.

use crate::{Edition, Event, Issue, IssueIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Where an event's issue ids must resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceScope {
    /// The issues of the event's own period
    #[default]
    Period,
    /// Any issue anywhere in the catalog
    Catalog,
}

impl std::str::FromStr for ReferenceScope {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "period" => Ok(ReferenceScope::Period),
            "catalog" | "global" => Ok(ReferenceScope::Catalog),
            _ => Err(crate::Error::Config(format!("unknown reference scope: {}", s))),
        }
    }
}

impl std::fmt::Display for ReferenceScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceScope::Period => write!(f, "period"),
            ReferenceScope::Catalog => write!(f, "catalog"),
        }
    }
}

/// An issue id referenced by an event but not found
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
    pub period_id: String,
    pub event_id: String,
    pub issue_id: String,
}

/// An issue id referenced by an edition that resolves nowhere in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedEditionIssue {
    pub period_id: String,
    pub edition_id: String,
    pub issue_id: String,
}

/// Check the events of `period_id` against that period's issues
pub fn validate(period_id: &str, events: &[Event], issues: &[Issue]) -> Vec<DanglingReference> {
    let known: HashSet<&str> = issues.iter().map(|i| i.id.as_str()).collect();
    validate_with(period_id, events, |id| known.contains(id))
}

/// Check the events of `period_id` against an arbitrary membership test
///
/// Events whose `period_id` differs from `period_id` are not checked.
pub fn validate_with(
    period_id: &str,
    events: &[Event],
    exists: impl Fn(&str) -> bool,
) -> Vec<DanglingReference> {
    events
        .iter()
        .filter(|e| e.period_id.as_deref() == Some(period_id))
        .flat_map(|event| {
            event
                .referenced_issue_ids()
                .into_iter()
                .filter(|&id| !exists(id))
                .map(|id| DanglingReference {
                    period_id: period_id.to_string(),
                    event_id: event.id.clone(),
                    issue_id: id.to_string(),
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Edition issue ids missing from the whole catalog
pub fn unresolved_editions(
    period_id: &str,
    editions: &[Edition],
    index: &IssueIndex,
) -> Vec<UnresolvedEditionIssue> {
    editions
        .iter()
        .flat_map(move |edition| {
            edition
                .issue_ids
                .iter()
                .filter(move |id| !index.contains(id.as_str()))
                .map(move |id| UnresolvedEditionIssue {
                    period_id: period_id.to_string(),
                    edition_id: edition.id.clone(),
                    issue_id: id.clone(),
                })
        })
        .collect()
}
