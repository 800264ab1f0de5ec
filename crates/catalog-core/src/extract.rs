//! Boundary with whatever produces new issue records
//!
//! Fetching and scraping a source page happens elsewhere; the engine only
//! sees the resulting [`Draft`].

use crate::model::Extra;
use crate::{Creator, Error, Issue, Result};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::PathBuf;

/// A scraped issue, with creators still given by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    /// Issue id; derived from `url` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Source page the draft was scraped from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_id: Option<String>,

    #[serde(default)]
    pub title: String,

    /// Writer names
    #[serde(default)]
    pub writers: Vec<String>,

    /// Penciller names
    #[serde(default)]
    pub pencillers: Vec<String>,

    #[serde(flatten)]
    pub extra: Extra,
}

impl Draft {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            url: None,
            period_id: None,
            title: title.into(),
            writers: Vec::new(),
            pencillers: Vec::new(),
            extra: Extra::new(),
        }
    }

    /// The issue id, explicit or taken from the source URL
    pub fn issue_id(&self) -> Result<String> {
        if let Some(id) = self.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
            return Ok(id.to_string());
        }
        self.url
            .as_deref()
            .and_then(crate::id::issue_id_from_url)
            .ok_or_else(|| Error::InvalidDraft("draft has neither an id nor a usable url".into()))
    }

    pub fn writer_records(&self) -> Vec<Creator> {
        creators_from_names(&self.writers)
    }

    pub fn penciller_records(&self) -> Vec<Creator> {
        creators_from_names(&self.pencillers)
    }

    /// The issue record this draft becomes, before any order is assigned
    pub fn to_issue(&self) -> Result<Issue> {
        let mut issue = Issue::new(self.issue_id()?, self.title.trim());
        issue.period_id = self.period_id.clone();
        issue.writers = Some(self.writer_records().into_iter().map(|c| c.id).collect());
        issue.pencillers = Some(self.penciller_records().into_iter().map(|c| c.id).collect());

        // A scraped `order` (or any other typed key) would be written twice.
        issue.extra = self.extra.clone();
        issue
            .extra
            .retain(|key, _| !Issue::FIELDS.contains(&key.as_str()));
        Ok(issue)
    }
}

fn creators_from_names(names: &[String]) -> Vec<Creator> {
    names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(Creator::from_name)
        .collect()
}

/// Produces one draft per ingestion call
pub trait Extractor {
    fn extract(&self) -> Result<Draft>;
}

/// Reads a draft JSON document from a file, or stdin when no path is given
#[derive(Debug, Clone, Default)]
pub struct JsonDraftExtractor {
    path: Option<PathBuf>,
}

impl JsonDraftExtractor {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn stdin() -> Self {
        Self::default()
    }

    fn read_source(&self) -> Result<String> {
        match &self.path {
            Some(path) => Ok(std::fs::read_to_string(path)?),
            None => {
                let mut content = String::new();
                std::io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }
}

impl Extractor for JsonDraftExtractor {
    fn extract(&self) -> Result<Draft> {
        let content = self.read_source()?;
        let draft: Draft = serde_json::from_str(content.trim_start_matches('\u{feff}'))
            .map_err(|e| Error::InvalidDraft(e.to_string()))?;
        draft.issue_id()?;
        Ok(draft)
    }
}
