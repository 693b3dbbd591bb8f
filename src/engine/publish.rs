//! Copying a container's structure into another container.

use std::collections::HashMap;

use super::arena::ItemArena;
use crate::error::Result;
use crate::models::{ContainerRef, RelationInput};
use crate::store::{NewItem, StructureStore};

/// Counts of rows written by [`copy_structure`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopySummary {
    pub items: usize,
    pub relations: usize,
}

/// Copy every item and relation of `from` into `to`.
///
/// Items receive fresh ids; parents are always written before their children
/// and relations are remapped onto the new ids. Relations whose endpoints are
/// missing from the tree are skipped.
pub fn copy_structure<S: StructureStore>(
    store: &mut S,
    from: ContainerRef,
    to: ContainerRef,
) -> Result<CopySummary> {
    let arena = ItemArena::new(store.items(from)?);
    let mut id_map: HashMap<i64, i64> = HashMap::with_capacity(arena.len());

    for root in arena.children(None) {
        for (id, _) in arena.subtree(*root) {
            let Some(item) = arena.get(id) else {
                continue;
            };
            let copy = store.insert_item(
                to,
                NewItem {
                    parent_id: item.parent_id.and_then(|p| id_map.get(&p).copied()),
                    name: item.name.clone(),
                    is_folder: item.is_folder,
                    depth: item.depth,
                    leaf_payload_ref: item.leaf_payload_ref,
                },
            )?;
            id_map.insert(id, copy.id);
        }
    }

    let mut relations = 0;
    for relation in store.relations(from)? {
        let Some(to_item_id) = id_map.get(&relation.to_item_id).copied() else {
            continue;
        };
        let from_item_id = match relation.from_item_id {
            Some(source) => match id_map.get(&source) {
                Some(mapped) => Some(*mapped),
                None => continue,
            },
            None => None,
        };
        store.insert_relation(
            to,
            RelationInput {
                from_item_id,
                to_item_id,
            },
        )?;
        relations += 1;
    }

    Ok(CopySummary {
        items: id_map.len(),
        relations,
    })
}
