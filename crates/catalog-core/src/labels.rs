//! Display labels for editions
//!
//! Each entry of an edition's `issue_ids` gets a label: the issue's own
//! title when the catalog knows it, otherwise a title formatted from the id.

use crate::{ChangeSet, Edition, Issue, TitleFormatter};
use std::collections::HashMap;

/// Titles of every issue in the catalog, keyed by issue id
///
/// Issues stored without a `title` key are indexed but carry no title.
#[derive(Debug, Clone, Default)]
pub struct IssueIndex {
    titles: HashMap<String, Option<String>>,
}

impl IssueIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one period's issues; ids already indexed keep their first title
    pub fn extend_from(&mut self, issues: &[Issue]) {
        for issue in issues {
            self.titles
                .entry(issue.id.clone())
                .or_insert_with(|| issue.title.clone());
        }
    }

    pub fn from_issues(issues: &[Issue]) -> Self {
        let mut index = Self::new();
        index.extend_from(issues);
        index
    }

    pub fn contains(&self, id: &str) -> bool {
        self.titles.contains_key(id)
    }

    /// Authoritative title, used verbatim even when empty
    pub fn title(&self, id: &str) -> Option<&str> {
        self.titles.get(id).and_then(|t| t.as_deref())
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

/// One label per referenced issue, in order
pub fn infer_labels(edition: &Edition, index: &IssueIndex, formatter: &TitleFormatter) -> Vec<String> {
    edition
        .issue_ids
        .iter()
        .map(|id| match index.title(id) {
            Some(title) => title.to_string(),
            None => formatter.format(id),
        })
        .collect()
}

/// Stage label updates for every edition whose labels are absent or stale
pub fn plan_labels(
    editions: &[Edition],
    index: &IssueIndex,
    formatter: &TitleFormatter,
) -> ChangeSet<Edition> {
    let mut changes = ChangeSet::new();

    for (position, edition) in editions.iter().enumerate() {
        if edition.issue_ids.is_empty() && edition.labels.is_none() {
            continue;
        }
        let labels = infer_labels(edition, index, formatter);
        if edition.labels.as_ref() != Some(&labels) {
            tracing::debug!(edition = %edition.display_name(), "labels updated");
            let mut labelled = edition.clone();
            labelled.labels = Some(labels);
            changes.update(position, labelled);
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> IssueIndex {
        IssueIndex::from_issues(&[
            Issue::new("x-men_2019_1", "X-Men (2019) #1"),
            Issue::new("untitled_2020_1", ""),
        ])
    }

    #[test]
    fn test_indexed_title_wins() {
        let edition = Edition::new("e", vec!["x-men_2019_1".into()]);
        let labels = infer_labels(&edition, &index(), &TitleFormatter::default());
        assert_eq!(labels, vec!["X-Men (2019) #1"]);
    }

    #[test]
    fn test_indexed_title_is_verbatim() {
        let index = IssueIndex::from_issues(&[Issue::new("hulk_2014_1", "hulk: the lowercase one")]);
        let edition = Edition::new("e", vec!["hulk_2014_1".into()]);
        let labels = infer_labels(&edition, &index, &TitleFormatter::default());
        assert_eq!(labels, vec!["hulk: the lowercase one"]);
    }

    #[test]
    fn test_empty_title_is_kept_and_unknown_ids_are_formatted() {
        let edition = Edition::new(
            "e",
            vec!["untitled_2020_1".into(), "thor_2014_annual_1".into()],
        );
        let labels = infer_labels(&edition, &index(), &TitleFormatter::default());
        assert_eq!(labels, vec!["", "Thor (2014) Annual #1"]);
    }

    #[test]
    fn test_issue_without_title_key_is_formatted() {
        let mut bare = Issue::new("moon_knight_2016_5", "");
        bare.title = None;
        let index = IssueIndex::from_issues(&[bare]);
        assert!(index.contains("moon_knight_2016_5"));
        assert_eq!(index.title("moon_knight_2016_5"), None);

        let edition = Edition::new("e", vec!["moon_knight_2016_5".into()]);
        let labels = infer_labels(&edition, &index, &TitleFormatter::default());
        assert_eq!(labels, vec!["Moon Knight (2016) #5"]);
    }

    #[test]
    fn test_first_title_wins_across_periods() {
        let mut index = IssueIndex::new();
        index.extend_from(&[Issue::new("a", "First")]);
        index.extend_from(&[Issue::new("a", "Second")]);
        assert_eq!(index.title("a"), Some("First"));
    }

    #[test]
    fn test_plan_skips_current_labels() {
        let formatter = TitleFormatter::default();
        let mut current = Edition::new("current", vec!["x-men_2019_1".into()]);
        current.labels = Some(vec!["X-Men (2019) #1".into()]);
        let stale = Edition::new("stale", vec!["x-men_2019_1".into()]);
        let empty = Edition::new("empty", vec![]);
        let editions = vec![current, stale, empty];

        let changes = plan_labels(&editions, &index(), &formatter);
        let updated: Vec<_> = changes.updated().map(|e| e.id.as_str()).collect();
        assert_eq!(updated, vec!["stale"]);

        let labelled = changes.apply(&editions).unwrap();
        assert!(plan_labels(&labelled, &index(), &formatter).is_empty());
    }
}
