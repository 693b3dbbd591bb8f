//! Learning-path relation operations.
//!
//! The path is stored as independent edge rows. Writes are validated as a
//! whole before anything is stored; reads rebuild the traversal from a map of
//! source item to edge, so storage order does not matter.

use std::collections::{HashMap, HashSet};

use tracing::{info, warn};

use super::container::{ensure_editable, Container};
use super::tree::ItemTree;
use super::validate::check_path_shape;
use crate::config::EngineConfig;
use crate::error::{Entity, Error, Result};
use crate::models::{
    ContainerRef, PathEntry, Relation, RelationBatchResult, RelationInput, RelationPath,
    RelationView,
};
use crate::store::StructureStore;

/// Manages the learning path of a container.
pub struct RelationGraph<'s, S> {
    store: &'s mut S,
    config: &'s EngineConfig,
}

impl<'s, S: StructureStore> RelationGraph<'s, S> {
    pub fn new(store: &'s mut S, config: &'s EngineConfig) -> Self {
        Self { store, config }
    }

    fn tree(&mut self) -> ItemTree<'_, S> {
        ItemTree::new(&mut *self.store, self.config)
    }

    /// Adds edges to the existing path.
    ///
    /// The batch is validated together with the edges already stored, so the
    /// single-path invariants hold afterwards. Nothing is written unless the
    /// whole batch passes.
    pub fn create_relations<C: Container + ?Sized>(
        &mut self,
        container: &C,
        edges: &[RelationInput],
    ) -> Result<RelationBatchResult> {
        let (inserted, start_item_id) = self.append(container, edges)?;
        Ok(RelationBatchResult {
            edge_count: inserted.len(),
            start_item_id,
        })
    }

    /// Adds one edge to the existing path.
    pub fn create_relation<C: Container + ?Sized>(
        &mut self,
        container: &C,
        edge: RelationInput,
    ) -> Result<RelationView> {
        let (inserted, _) = self.append(container, &[edge])?;
        inserted
            .first()
            .map(RelationView::from)
            .ok_or_else(|| Error::Validation("no relation was created".to_string()))
    }

    /// Replaces the whole path with `edges`.
    pub fn update_relations<C: Container + ?Sized>(
        &mut self,
        container: &C,
        edges: &[RelationInput],
    ) -> Result<RelationBatchResult> {
        ensure_editable(container)?;

        let scope = container.scope();
        self.check_endpoints(scope, edges)?;
        let start_item_id = check_path_shape(edges)?;

        let cleared = self.store.delete_all_relations(scope)?;
        let inserted = self.insert_all(scope, edges)?;

        info!(
            container = %scope,
            cleared,
            edge_count = inserted.len(),
            start_item = ?start_item_id,
            "Relations replaced"
        );

        Ok(RelationBatchResult {
            edge_count: inserted.len(),
            start_item_id,
        })
    }

    /// Rebuilds the path by following edges from the start point.
    ///
    /// Returns an empty path when there is no start edge. Traversal stops at
    /// the first revisited item, so corrupted rows cannot loop forever.
    pub fn relations<C: Container + ?Sized>(&self, container: &C) -> Result<RelationPath> {
        let scope = container.scope();
        let relations = self.store.relations(scope)?;
        let views: Vec<RelationView> = relations.iter().map(RelationView::from).collect();

        let Some(start) = relations.iter().find(|r| r.is_start_point()) else {
            return Ok(RelationPath {
                items: Vec::new(),
                relations: views,
            });
        };

        let by_source: HashMap<i64, &Relation> = relations
            .iter()
            .filter_map(|r| r.from_item_id.map(|from| (from, r)))
            .collect();

        let mut ordered = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(start.to_item_id);
        while let Some(item_id) = current {
            if !visited.insert(item_id) {
                warn!(container = %scope, item_id, "Learning path revisits an item, stopping traversal");
                break;
            }
            ordered.push(item_id);
            current = by_source.get(&item_id).map(|r| r.to_item_id);
        }

        let names: HashMap<i64, String> = self
            .store
            .items_by_ids(scope, &ordered)?
            .into_iter()
            .map(|item| (item.id, item.name))
            .collect();

        let mut items = Vec::with_capacity(ordered.len());
        for item_id in ordered {
            let Some(name) = names.get(&item_id) else {
                warn!(container = %scope, item_id, "Learning path references a missing item");
                break;
            };
            items.push(PathEntry {
                item_id,
                name: name.clone(),
                order: items.len() as u32 + 1,
            });
        }

        Ok(RelationPath {
            items,
            relations: views,
        })
    }

    /// Makes `item_id` the first item of the path.
    ///
    /// Any edge already leading into the item is removed first, then the
    /// existing start edge is retargeted (or a new one created).
    pub fn set_start_item<C: Container + ?Sized>(
        &mut self,
        container: &C,
        item_id: i64,
    ) -> Result<RelationView> {
        ensure_editable(container)?;

        let scope = container.scope();
        let item = self.tree().item(container, item_id)?;
        if item.is_folder {
            return Err(Error::FolderInPath { item_id });
        }

        let relations = self.store.relations(scope)?;
        let start = relations.iter().find(|r| r.is_start_point()).cloned();

        if let Some(start) = &start {
            if start.to_item_id == item_id {
                return Ok(RelationView::from(start));
            }
        }

        if let Some(incoming) = relations
            .iter()
            .find(|r| r.to_item_id == item_id && !r.is_start_point())
        {
            self.store.delete_relations(&[incoming.id])?;
        }

        let view = match start {
            Some(mut start) => {
                self.store.retarget_relation(start.id, item_id)?;
                start.to_item_id = item_id;
                RelationView::from(&start)
            }
            None => {
                let created = self
                    .store
                    .insert_relation(scope, RelationInput::start(item_id))?;
                RelationView::from(&created)
            }
        };

        info!(container = %scope, item_id, "Start item set");
        Ok(view)
    }

    /// Replaces the path with one that visits every leaf in `(depth, id)`
    /// order.
    pub fn create_auto_relations<C: Container + ?Sized>(
        &mut self,
        container: &C,
    ) -> Result<RelationBatchResult> {
        ensure_editable(container)?;

        let scope = container.scope();
        let cleared = self.store.delete_all_relations(scope)?;
        let leaves = self.tree().ordered_leaves(container)?;

        let Some(first) = leaves.first() else {
            info!(container = %scope, cleared, "No leaf items, learning path cleared");
            return Ok(RelationBatchResult::default());
        };

        let edges: Vec<RelationInput> = std::iter::once(RelationInput::start(first.id))
            .chain(
                leaves
                    .windows(2)
                    .map(|pair| RelationInput::link(pair[0].id, pair[1].id)),
            )
            .collect();

        let start_item_id = check_path_shape(&edges)?;
        let inserted = self.insert_all(scope, &edges)?;

        info!(
            container = %scope,
            cleared,
            edge_count = inserted.len(),
            "Learning path generated from tree order"
        );

        Ok(RelationBatchResult {
            edge_count: inserted.len(),
            start_item_id,
        })
    }

    /// Deletes one edge. Items after it stay in place but are no longer
    /// reachable from the start until the path is repaired.
    pub fn delete_relation<C: Container + ?Sized>(
        &mut self,
        container: &C,
        relation_id: i64,
    ) -> Result<()> {
        ensure_editable(container)?;

        let scope = container.scope();
        let relation = self
            .store
            .relation(relation_id)?
            .ok_or_else(|| Error::not_found(Entity::Relation, relation_id))?;

        if relation.scope() != scope {
            return Err(Error::InvalidRelationOwnership { relation_id });
        }

        self.store.delete_relations(&[relation_id])?;
        info!(container = %scope, relation_id, "Relation deleted");
        Ok(())
    }

    fn append<C: Container + ?Sized>(
        &mut self,
        container: &C,
        edges: &[RelationInput],
    ) -> Result<(Vec<Relation>, Option<i64>)> {
        ensure_editable(container)?;

        let scope = container.scope();
        self.check_endpoints(scope, edges)?;

        let combined: Vec<RelationInput> = self
            .store
            .relations(scope)?
            .iter()
            .map(|r| RelationInput {
                from_item_id: r.from_item_id,
                to_item_id: r.to_item_id,
            })
            .chain(edges.iter().copied())
            .collect();
        let start_item_id = check_path_shape(&combined)?;

        let inserted = self.insert_all(scope, edges)?;

        info!(
            container = %scope,
            edge_count = inserted.len(),
            start_item = ?start_item_id,
            "Relations created"
        );

        Ok((inserted, start_item_id))
    }

    /// Every endpoint must be a leaf of this container.
    fn check_endpoints(&mut self, scope: ContainerRef, edges: &[RelationInput]) -> Result<()> {
        let arena = self.tree().arena(scope)?;
        let endpoints = edges
            .iter()
            .flat_map(|edge| edge.from_item_id.into_iter().chain([edge.to_item_id]));

        for item_id in endpoints {
            match arena.get(item_id) {
                None => return Err(Error::not_found(Entity::Item, item_id)),
                Some(item) if item.is_folder => return Err(Error::FolderInPath { item_id }),
                Some(_) => {}
            }
        }
        Ok(())
    }

    fn insert_all(&mut self, scope: ContainerRef, edges: &[RelationInput]) -> Result<Vec<Relation>> {
        edges
            .iter()
            .map(|edge| self.store.insert_relation(scope, *edge))
            .collect()
    }
}
