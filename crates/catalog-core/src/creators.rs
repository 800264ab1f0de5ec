//! Merging creators into the shared writer and penciller registries
//!
//! Registries are keyed by creator id. The first name recorded for an id
//! is kept forever; later merges only ever append.

use crate::{ChangeSet, Creator};
use std::collections::HashSet;

/// Which cross-period registry a creator belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Registry {
    Writers,
    Pencillers,
}

impl std::fmt::Display for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Registry::Writers => write!(f, "writers"),
            Registry::Pencillers => write!(f, "pencillers"),
        }
    }
}

/// Stage the creators of `incoming` missing from `registry`, in incoming order
///
/// Ids already present (in the registry or earlier in `incoming`) are skipped.
pub fn plan_merge(registry: &[Creator], incoming: &[Creator]) -> ChangeSet<Creator> {
    let mut known: HashSet<&str> = registry.iter().map(|c| c.id.as_str()).collect();
    let mut changes = ChangeSet::new();

    for creator in incoming {
        if known.insert(creator.id.as_str()) {
            tracing::debug!(id = %creator.id, name = %creator.name, "new creator");
            changes.add(creator.clone());
        }
    }

    changes
}

/// Merge `incoming` into `registry`; the flag reports whether anything was appended
pub fn merge(registry: &[Creator], incoming: &[Creator]) -> (Vec<Creator>, bool) {
    let changes = plan_merge(registry, incoming);
    let mut merged = registry.to_vec();
    merged.extend(changes.added().cloned());
    (merged, !changes.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creator(id: &str, name: &str) -> Creator {
        Creator {
            id: id.into(),
            name: name.into(),
            extra: Default::default(),
        }
    }

    #[test]
    fn test_appends_new_creators_in_order() {
        let registry = vec![creator("a", "A")];
        let incoming = vec![creator("c", "C"), creator("b", "B")];

        let (merged, changed) = merge(&registry, &incoming);
        assert!(changed);
        let ids: Vec<_> = merged.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "b"]);
    }

    #[test]
    fn test_existing_name_is_never_overwritten() {
        let registry = vec![creator("jim_zub", "Jim Zub")];
        let incoming = vec![creator("jim_zub", "JIM ZUB")];

        let (merged, changed) = merge(&registry, &incoming);
        assert!(!changed);
        assert_eq!(merged, registry);
    }

    #[test]
    fn test_duplicates_within_incoming_collapse() {
        let incoming = vec![creator("a", "A"), creator("a", "A again")];
        let (merged, _) = merge(&[], &incoming);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "A");
    }

    #[test]
    fn test_merge_is_idempotent() {
        let incoming = vec![creator("a", "A"), creator("b", "B")];
        let (once, _) = merge(&[], &incoming);
        let (twice, changed) = merge(&once, &incoming);
        assert!(!changed);
        assert_eq!(once, twice);
    }
}
