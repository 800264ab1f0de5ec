//! Reading order of period-scoped issues
//!
//! Within a period, issues carrying a `period_id` are numbered 1..N with no
//! gaps. Issues without a `period_id` carry no order and are kept after the
//! ordered ones.

use crate::{ChangeSet, Issue};

/// Order for an issue appended to `issues`
pub fn next_order(issues: &[Issue]) -> u32 {
    issues
        .iter()
        .filter(|i| i.is_period_scoped())
        .filter_map(|i| i.order)
        .max()
        .unwrap_or(0)
        + 1
}

/// Stage the changes that make `issues` contiguously ordered
///
/// Scoped issues are stably sorted by their current order (issues missing
/// one go last, in collection order) and renumbered from 1. Stray orders
/// on unscoped issues are dropped. Already-normalized input yields an empty
/// change set.
pub fn plan_reorder(issues: &[Issue]) -> ChangeSet<Issue> {
    let (mut scoped, unscoped): (Vec<usize>, Vec<usize>) =
        (0..issues.len()).partition(|&i| issues[i].is_period_scoped());
    scoped.sort_by_key(|&i| (issues[i].order.is_none(), issues[i].order));

    let mut changes = ChangeSet::new();

    for (rank, &index) in scoped.iter().enumerate() {
        let expected = rank as u32 + 1;
        let issue = &issues[index];
        if issue.order != Some(expected) {
            tracing::debug!(id = %issue.id, from = ?issue.order, to = expected, "renumbering issue");
            let mut fixed = issue.clone();
            fixed.order = Some(expected);
            changes.update(index, fixed);
        }
    }

    for &index in &unscoped {
        let issue = &issues[index];
        if issue.order.is_some() {
            tracing::debug!(id = %issue.id, "dropping order from issue without period");
            let mut fixed = issue.clone();
            fixed.order = None;
            changes.update(index, fixed);
        }
    }

    let positions: Vec<usize> = scoped.into_iter().chain(unscoped).collect();
    if positions.iter().enumerate().any(|(slot, &from)| slot != from) {
        changes.reorder(positions);
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scoped(id: &str, order: Option<u32>) -> Issue {
        let mut issue = Issue::new(id, id);
        issue.period_id = Some("p".into());
        issue.order = order;
        issue
    }

    fn unscoped(id: &str, order: Option<u32>) -> Issue {
        let mut issue = Issue::new(id, id);
        issue.order = order;
        issue
    }

    fn rederive(issues: &[Issue]) -> Vec<Issue> {
        plan_reorder(issues).apply(issues).unwrap()
    }

    #[test]
    fn test_next_order_empty() {
        assert_eq!(next_order(&[]), 1);
    }

    #[test]
    fn test_next_order_ignores_unscoped() {
        let issues = vec![scoped("a", Some(4)), unscoped("b", Some(40)), unscoped("c", None)];
        assert_eq!(next_order(&issues), 5);
    }

    #[test]
    fn test_gaps_and_ties_are_closed() {
        let issues: Vec<_> = [1, 2, 5, 5, 8]
            .iter()
            .enumerate()
            .map(|(i, &o)| scoped(&format!("i{}", i), Some(o)))
            .collect();

        let fixed = rederive(&issues);
        let orders: Vec<_> = fixed.iter().map(|i| i.order).collect();
        assert_eq!(orders, vec![Some(1), Some(2), Some(3), Some(4), Some(5)]);
        let ids: Vec<_> = fixed.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["i0", "i1", "i2", "i3", "i4"]);
    }

    #[test]
    fn test_sorts_by_existing_order() {
        let issues = vec![scoped("c", Some(9)), scoped("a", Some(1)), scoped("b", Some(3))];
        let fixed = rederive(&issues);
        let ids: Vec<_> = fixed.iter().map(|i| (i.id.as_str(), i.order)).collect();
        assert_eq!(ids, vec![("a", Some(1)), ("b", Some(2)), ("c", Some(3))]);
    }

    #[test]
    fn test_unscoped_go_last_without_order() {
        let issues = vec![unscoped("x", Some(1)), scoped("a", Some(2)), scoped("b", None)];
        let fixed = rederive(&issues);
        let ids: Vec<_> = fixed.iter().map(|i| (i.id.as_str(), i.order)).collect();
        assert_eq!(ids, vec![("a", Some(1)), ("b", Some(2)), ("x", None)]);
    }

    #[test]
    fn test_normalized_input_is_a_fixed_point() {
        let issues = vec![scoped("a", Some(1)), scoped("b", Some(2)), unscoped("x", None)];
        assert!(plan_reorder(&issues).is_empty());

        let messy = vec![scoped("b", Some(7)), unscoped("x", Some(3)), scoped("a", Some(2))];
        let once = rederive(&messy);
        assert!(plan_reorder(&once).is_empty());
    }
}
