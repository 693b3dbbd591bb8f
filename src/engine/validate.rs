//! Shape checks for a proposed learning path.
//!
//! These operate on edge pairs only; resolving the endpoints against the
//! item tree happens in [`RelationGraph`](super::RelationGraph).

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::error::{Error, Result};
use crate::models::RelationInput;

/// Check that `edges` can form a single simple path.
///
/// Checks run in a fixed order: start point, branching sources, cycles, then
/// merging targets. A closed loop back onto the start item is therefore
/// reported as a cycle rather than as a second edge into that item.
///
/// Returns the item the start edge points at, if there is a start edge.
pub fn check_path_shape(edges: &[RelationInput]) -> Result<Option<i64>> {
    let mut start = None;
    let mut next: BTreeMap<i64, i64> = BTreeMap::new();

    for edge in edges {
        match edge.from_item_id {
            None => {
                if start.is_some() {
                    return Err(Error::DuplicateStartPoint);
                }
                start = Some(edge.to_item_id);
            }
            Some(from) => {
                if next.insert(from, edge.to_item_id).is_some() {
                    return Err(Error::DuplicateSource { item_id: from });
                }
            }
        }
    }

    // Walk from the start first, then from every other source so cycles
    // detached from the start are caught too.
    let mut cleared = BTreeSet::new();
    let origins = start.into_iter().chain(next.keys().copied());
    for origin in origins {
        if cleared.contains(&origin) {
            continue;
        }
        let mut walked = BTreeSet::new();
        let mut current = Some(origin);
        while let Some(node) = current {
            if cleared.contains(&node) {
                break;
            }
            if !walked.insert(node) {
                return Err(Error::CircularReference { item_id: node });
            }
            current = next.get(&node).copied();
        }
        cleared.extend(walked);
    }

    let mut targets = HashSet::new();
    for edge in edges {
        if !targets.insert(edge.to_item_id) {
            return Err(Error::DuplicateTarget {
                item_id: edge.to_item_id,
            });
        }
    }

    Ok(start)
}
