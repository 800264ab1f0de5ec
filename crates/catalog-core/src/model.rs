//! Catalog record types
//!
//! Every record keeps the fields it does not model in `extra`, in their
//! original key order, so a rewrite never drops data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields carried through untouched
pub type Extra = Map<String, Value>;

/// Anything stored in a JSON array and keyed by `id`
pub trait Record {
    fn id(&self) -> &str;
}

/// A single comic book entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,

    /// Position within the period; present iff `period_id` is
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,

    /// Penciller ids
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pencillers: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_id: Option<String>,

    /// Absent and empty are distinct: an empty title is still authoritative
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Writer ids
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writers: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: Extra,
}

impl Issue {
    /// Keys held by typed fields; never valid in `extra`
    pub const FIELDS: &'static [&'static str] =
        &["id", "order", "pencillers", "period_id", "title", "writers"];

    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            order: None,
            pencillers: Some(Vec::new()),
            period_id: None,
            title: Some(title.into()),
            writers: Some(Vec::new()),
            extra: Extra::new(),
        }
    }

    /// Whether the issue takes part in its period's reading order
    pub fn is_period_scoped(&self) -> bool {
        self.period_id.is_some()
    }
}

impl Record for Issue {
    fn id(&self) -> &str {
        &self.id
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let title = self.title.as_deref().unwrap_or_default();
        match self.order {
            Some(order) => write!(f, "{} [#{}] {}", self.id, order, title),
            None => write!(f, "{} {}", self.id, title),
        }
    }
}

/// A writer or penciller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creator {
    pub id: String,
    pub name: String,

    #[serde(flatten)]
    pub extra: Extra,
}

impl Creator {
    /// Build a creator whose id is derived from the name
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        Self {
            id: crate::id::creator_id(name),
            name: name.to_string(),
            extra: Extra::new(),
        }
    }
}

impl Record for Creator {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A French print edition collecting one or more issues
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edition {
    pub id: String,

    #[serde(default)]
    pub french_title: String,

    #[serde(default)]
    pub issue_ids: Vec<String>,

    #[serde(default)]
    pub link: String,

    #[serde(default)]
    pub image: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_content: Option<Value>,

    /// One display label per entry of `issue_ids`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: Extra,
}

impl Edition {
    pub fn new(id: impl Into<String>, issue_ids: Vec<String>) -> Self {
        Self {
            id: id.into(),
            french_title: String::new(),
            issue_ids,
            link: String::new(),
            image: String::new(),
            table_content: None,
            labels: None,
            extra: Extra::new(),
        }
    }

    /// Title used in reports, falling back to the id
    pub fn display_name(&self) -> &str {
        if self.french_title.is_empty() {
            &self.id
        } else {
            &self.french_title
        }
    }
}

impl Record for Edition {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A group of issues inside an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub issue_ids: Vec<String>,

    #[serde(flatten)]
    pub extra: Extra,
}

/// A storyline grouping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_ids: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Category>>,

    #[serde(flatten)]
    pub extra: Extra,
}

impl Event {
    pub fn new(id: impl Into<String>, period_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            period_id: Some(period_id.into()),
            issue_ids: None,
            categories: None,
            extra: Extra::new(),
        }
    }

    /// Issue ids the event points at: `issue_ids` when present,
    /// otherwise every category's ids in order.
    pub fn referenced_issue_ids(&self) -> Vec<&str> {
        match (&self.issue_ids, &self.categories) {
            (Some(ids), _) => ids.iter().map(String::as_str).collect(),
            (None, Some(categories)) => categories
                .iter()
                .flat_map(|c| c.issue_ids.iter().map(String::as_str))
                .collect(),
            (None, None) => Vec::new(),
        }
    }
}

impl Record for Event {
    fn id(&self) -> &str {
        &self.id
    }
}
