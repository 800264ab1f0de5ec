//! Tidying of French edition stores
//!
//! Editions are kept sorted by id with their free-text fields trimmed.

use crate::{ChangeSet, Edition};

/// Stage trimming of text fields and sorting by id
pub fn plan_format(editions: &[Edition]) -> ChangeSet<Edition> {
    let mut changes = ChangeSet::new();

    for (index, edition) in editions.iter().enumerate() {
        let mut tidy = edition.clone();
        let trimmed = trim_in_place(&mut tidy.french_title)
            | trim_in_place(&mut tidy.link)
            | trim_in_place(&mut tidy.image);
        if trimmed {
            changes.update(index, tidy);
        }
    }

    let mut positions: Vec<usize> = (0..editions.len()).collect();
    positions.sort_by(|&a, &b| editions[a].id.cmp(&editions[b].id));
    if positions.iter().enumerate().any(|(slot, &from)| slot != from) {
        changes.reorder(positions);
    }

    changes
}

fn trim_in_place(value: &mut String) -> bool {
    let trimmed = value.trim();
    if trimmed.len() == value.len() {
        return false;
    }
    *value = trimmed.to_string();
    true
}
