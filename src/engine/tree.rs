//! Folder/lesson hierarchy operations.

use std::collections::HashSet;

use chrono::Utc;
use tracing::{debug, info};

use super::arena::ItemArena;
use super::container::{ensure_editable, Container};
use crate::config::EngineConfig;
use crate::error::{Entity, Error, Result};
use crate::models::{
    ContainerRef, CreateFolderInput, CreateItemInput, DeleteSummary, Item, ItemNode,
};
use crate::store::{NewItem, StructureStore};

/// Manages the item tree of a container.
///
/// Runs against whatever store (and therefore transaction) the caller hands
/// in; it never commits on its own.
pub struct ItemTree<'s, S> {
    store: &'s mut S,
    config: &'s EngineConfig,
}

impl<'s, S: StructureStore> ItemTree<'s, S> {
    pub fn new(store: &'s mut S, config: &'s EngineConfig) -> Self {
        Self { store, config }
    }

    pub(crate) fn arena(&self, scope: ContainerRef) -> Result<ItemArena> {
        Ok(ItemArena::new(self.store.items(scope)?))
    }

    /// Gets an item owned by the container. Items of other containers are
    /// reported as not found.
    pub fn item<C: Container + ?Sized>(&self, container: &C, item_id: i64) -> Result<Item> {
        match self.store.item(item_id)? {
            Some(item) if item.belongs_to(container.scope()) => Ok(item),
            _ => Err(Error::not_found(Entity::Item, item_id)),
        }
    }

    /// Root items with their descendants nested, siblings in id order.
    pub fn hierarchy<C: Container + ?Sized>(&self, container: &C) -> Result<Vec<ItemNode>> {
        Ok(self.arena(container.scope())?.hierarchy())
    }

    /// Every leaf item ordered by `(depth, id)`.
    ///
    /// This ordering is independent of the learning path; it is what
    /// automatic path generation linearises.
    pub fn ordered_leaves<C: Container + ?Sized>(&self, container: &C) -> Result<Vec<Item>> {
        Ok(self.arena(container.scope())?.ordered_leaves())
    }

    pub fn create_folder<C: Container + ?Sized>(
        &mut self,
        container: &C,
        input: CreateFolderInput,
    ) -> Result<Item> {
        self.insert(container, input.parent_id, input.name, None)
    }

    pub fn create_item<C: Container + ?Sized>(
        &mut self,
        container: &C,
        input: CreateItemInput,
    ) -> Result<Item> {
        self.insert(
            container,
            input.parent_id,
            input.name,
            Some(input.leaf_payload_ref),
        )
    }

    fn insert<C: Container + ?Sized>(
        &mut self,
        container: &C,
        parent_id: Option<i64>,
        name: String,
        payload: Option<i64>,
    ) -> Result<Item> {
        ensure_editable(container)?;
        validate_name(&name)?;

        let scope = container.scope();
        let parent = self.resolve_parent(scope, parent_id)?;
        let depth = depth_below(parent.as_ref());
        self.check_depth(depth)?;

        let item = self.store.insert_item(
            scope,
            NewItem {
                parent_id,
                name,
                is_folder: payload.is_none(),
                depth,
                leaf_payload_ref: payload,
            },
        )?;

        info!(
            container = %scope,
            item_id = item.id,
            depth = item.depth,
            is_folder = item.is_folder,
            "Item created"
        );

        Ok(item)
    }

    pub fn rename_item<C: Container + ?Sized>(
        &mut self,
        container: &C,
        item_id: i64,
        name: &str,
    ) -> Result<Item> {
        ensure_editable(container)?;
        validate_name(name)?;

        let mut item = self.item(container, item_id)?;
        item.name = name.to_string();
        item.updated_at = Utc::now();
        self.store.update_item(&item)?;

        info!(container = %container.scope(), item_id, "Item renamed");
        Ok(item)
    }

    /// Points a leaf at different content.
    pub fn relink_payload<C: Container + ?Sized>(
        &mut self,
        container: &C,
        item_id: i64,
        payload_ref: i64,
    ) -> Result<Item> {
        ensure_editable(container)?;

        let mut item = self.item(container, item_id)?;
        if item.is_folder {
            return Err(Error::CannotAttachPayloadToFolder { item_id });
        }
        item.leaf_payload_ref = Some(payload_ref);
        item.updated_at = Utc::now();
        self.store.update_item(&item)?;

        info!(container = %container.scope(), item_id, payload_ref, "Item payload relinked");
        Ok(item)
    }

    /// Moves an item (and its whole subtree) under a new parent, or to the
    /// root when `new_parent_id` is `None`.
    ///
    /// The depth bound is checked against the deepest descendant, and every
    /// descendant's depth is rewritten keeping its distance to the moved item.
    pub fn move_item<C: Container + ?Sized>(
        &mut self,
        container: &C,
        item_id: i64,
        new_parent_id: Option<i64>,
    ) -> Result<Item> {
        ensure_editable(container)?;

        let scope = container.scope();
        let arena = self.arena(scope)?;
        let item = arena
            .get(item_id)
            .cloned()
            .ok_or_else(|| Error::not_found(Entity::Item, item_id))?;

        let new_parent = self.resolve_parent(scope, new_parent_id)?;
        if let Some(parent) = &new_parent {
            if arena.is_in_subtree(parent.id, item_id) {
                debug!(item_id, parent_id = parent.id, "Rejected move into own subtree");
                return Err(Error::InvalidParent(format!(
                    "cannot move item {} into itself or its own descendant {}",
                    item_id, parent.id
                )));
            }
        }

        let new_depth = depth_below(new_parent.as_ref());
        self.check_depth(new_depth + arena.relative_height(item_id))?;

        let now = Utc::now();
        let mut moved = item;
        moved.parent_id = new_parent_id;
        moved.depth = new_depth;
        moved.updated_at = now;
        self.store.update_item(&moved)?;

        let mut rewritten = 0usize;
        for (id, level) in arena.subtree(item_id).into_iter().skip(1) {
            let Some(descendant) = arena.get(id) else {
                continue;
            };
            let depth = new_depth + level;
            if descendant.depth != depth {
                let mut updated = descendant.clone();
                updated.depth = depth;
                updated.updated_at = now;
                self.store.update_item(&updated)?;
                rewritten += 1;
            }
        }

        info!(
            container = %scope,
            item_id,
            new_parent = ?new_parent_id,
            depth = new_depth,
            descendants_rewritten = rewritten,
            "Item moved"
        );

        Ok(moved)
    }

    /// Deletes an item together with all of its descendants and every
    /// relation that references any of them.
    pub fn delete_item<C: Container + ?Sized>(
        &mut self,
        container: &C,
        item_id: i64,
    ) -> Result<DeleteSummary> {
        ensure_editable(container)?;

        let scope = container.scope();
        let arena = self.arena(scope)?;
        if arena.get(item_id).is_none() {
            return Err(Error::not_found(Entity::Item, item_id));
        }

        let doomed: Vec<i64> = arena
            .subtree(item_id)
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        let doomed_set: HashSet<i64> = doomed.iter().copied().collect();

        let relation_ids: Vec<i64> = self
            .store
            .relations(scope)?
            .iter()
            .filter(|r| {
                doomed_set.contains(&r.to_item_id)
                    || r.from_item_id.is_some_and(|from| doomed_set.contains(&from))
            })
            .map(|r| r.id)
            .collect();

        let relations_deleted = if relation_ids.is_empty() {
            0
        } else {
            self.store.delete_relations(&relation_ids)?
        };

        // Children before parents.
        let items_deleted = self
            .store
            .delete_items(&doomed.into_iter().rev().collect::<Vec<_>>())?;

        info!(
            container = %scope,
            item_id,
            items_deleted,
            relations_deleted,
            "Item deleted"
        );

        Ok(DeleteSummary {
            items_deleted,
            relations_deleted,
        })
    }

    fn resolve_parent(&self, scope: ContainerRef, parent_id: Option<i64>) -> Result<Option<Item>> {
        let Some(parent_id) = parent_id else {
            return Ok(None);
        };

        let parent = self
            .store
            .item(parent_id)?
            .ok_or_else(|| Error::not_found(Entity::Item, parent_id))?;

        if !parent.belongs_to(scope) {
            return Err(Error::InvalidParent(format!(
                "item {} belongs to another container",
                parent_id
            )));
        }
        if !parent.is_folder {
            return Err(Error::InvalidParent(format!(
                "item {} is not a folder",
                parent_id
            )));
        }

        Ok(Some(parent))
    }

    fn check_depth(&self, depth: u32) -> Result<()> {
        if depth > self.config.max_depth {
            debug!(depth, max = self.config.max_depth, "Rejected item depth");
            return Err(Error::MaxDepthExceeded {
                depth,
                max: self.config.max_depth,
            });
        }
        Ok(())
    }
}

fn depth_below(parent: Option<&Item>) -> u32 {
    parent.map_or(0, |p| p.depth + 1)
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Validation("Item name cannot be empty".to_string()));
    }
    Ok(())
}
