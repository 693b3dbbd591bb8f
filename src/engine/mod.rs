//! Course structure and sequencing engine.
//!
//! [`ItemTree`] and [`RelationGraph`] hold the algorithms and work against
//! any [`StructureStore`](crate::store::StructureStore). [`Engine`] binds
//! them to a [`Database`] and runs every public operation in exactly one
//! immediate transaction, so each call is either fully applied or rolled
//! back.

mod arena;
mod container;
mod graph;
mod publish;
mod tree;
mod validate;

pub use arena::ItemArena;
pub use container::Container;
pub use graph::RelationGraph;
pub use publish::{copy_structure, CopySummary};
pub use tree::ItemTree;
pub use validate::check_path_shape;

use tracing::info;

use crate::config::EngineConfig;
use crate::db::{Database, SqliteStore};
use crate::error::{Entity, Error, Result};
use crate::models::*;
use crate::store::StructureStore;

#[derive(Clone)]
pub struct Engine {
    db: Database,
    config: EngineConfig,
}

impl Engine {
    pub fn new(db: Database, config: EngineConfig) -> Self {
        Self { db, config }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ============================================================
    // Containers
    // ============================================================

    pub fn create_course(&self, input: CreateCourseInput) -> Result<Course> {
        if input.title.trim().is_empty() {
            return Err(Error::Validation("Course title cannot be empty".to_string()));
        }
        self.db.create_course(input)
    }

    pub fn course(&self, id: i64) -> Result<Course> {
        self.db
            .get_course(id)?
            .ok_or_else(|| Error::not_found(Entity::Course, id))
    }

    pub fn list_courses(&self) -> Result<Vec<Course>> {
        self.db.get_all_courses()
    }

    /// Publishes the course's current structure as a new draft snapshot.
    pub fn create_snapshot(&self, course: &Course) -> Result<Snapshot> {
        self.db.transaction(|store| {
            let course = store
                .course(course.id)?
                .ok_or_else(|| Error::not_found(Entity::Course, course.id))?;
            let snapshot = store.insert_snapshot(course.id)?;
            let copied = copy_structure(store, course.scope(), snapshot.scope())?;
            info!(
                course_id = course.id,
                snapshot_id = snapshot.id,
                version = snapshot.version,
                items = copied.items,
                relations = copied.relations,
                "Snapshot created"
            );
            Ok(snapshot)
        })
    }

    pub fn snapshot(&self, id: i64) -> Result<Snapshot> {
        self.db
            .get_snapshot(id)?
            .ok_or_else(|| Error::not_found(Entity::Snapshot, id))
    }

    pub fn list_snapshots(&self, course_id: i64) -> Result<Vec<Snapshot>> {
        self.db.get_snapshots_by_course(course_id)
    }

    /// Stores a new status. Which transitions are allowed is decided by the
    /// caller; only editability follows from the stored status.
    pub fn set_snapshot_status(&self, id: i64, status: SnapshotStatus) -> Result<Snapshot> {
        self.db
            .update_snapshot_status(id, status)?
            .ok_or_else(|| Error::not_found(Entity::Snapshot, id))
    }

    // ============================================================
    // Item tree
    // ============================================================

    pub fn item<C: Container + ?Sized>(&self, container: &C, item_id: i64) -> Result<Item> {
        self.db.transaction(|store| {
            let container = stored_container(store, container)?;
            ItemTree::new(store, &self.config).item(&*container, item_id)
        })
    }

    pub fn create_folder<C: Container + ?Sized>(
        &self,
        container: &C,
        input: CreateFolderInput,
    ) -> Result<Item> {
        self.db.transaction(|store| {
            let container = stored_container(store, container)?;
            ItemTree::new(store, &self.config).create_folder(&*container, input)
        })
    }

    pub fn create_item<C: Container + ?Sized>(
        &self,
        container: &C,
        input: CreateItemInput,
    ) -> Result<Item> {
        self.db.transaction(|store| {
            let container = stored_container(store, container)?;
            ItemTree::new(store, &self.config).create_item(&*container, input)
        })
    }

    pub fn rename_item<C: Container + ?Sized>(
        &self,
        container: &C,
        item_id: i64,
        name: &str,
    ) -> Result<Item> {
        self.db.transaction(|store| {
            let container = stored_container(store, container)?;
            ItemTree::new(store, &self.config).rename_item(&*container, item_id, name)
        })
    }

    pub fn relink_payload<C: Container + ?Sized>(
        &self,
        container: &C,
        item_id: i64,
        payload_ref: i64,
    ) -> Result<Item> {
        self.db.transaction(|store| {
            let container = stored_container(store, container)?;
            ItemTree::new(store, &self.config).relink_payload(&*container, item_id, payload_ref)
        })
    }

    pub fn move_item<C: Container + ?Sized>(
        &self,
        container: &C,
        item_id: i64,
        new_parent_id: Option<i64>,
    ) -> Result<Item> {
        self.db.transaction(|store| {
            let container = stored_container(store, container)?;
            ItemTree::new(store, &self.config).move_item(&*container, item_id, new_parent_id)
        })
    }

    pub fn delete_item<C: Container + ?Sized>(
        &self,
        container: &C,
        item_id: i64,
    ) -> Result<DeleteSummary> {
        self.db.transaction(|store| {
            let container = stored_container(store, container)?;
            ItemTree::new(store, &self.config).delete_item(&*container, item_id)
        })
    }

    pub fn hierarchy<C: Container + ?Sized>(&self, container: &C) -> Result<Vec<ItemNode>> {
        self.db.transaction(|store| {
            let container = stored_container(store, container)?;
            ItemTree::new(store, &self.config).hierarchy(&*container)
        })
    }

    pub fn ordered_leaves<C: Container + ?Sized>(&self, container: &C) -> Result<Vec<Item>> {
        self.db.transaction(|store| {
            let container = stored_container(store, container)?;
            ItemTree::new(store, &self.config).ordered_leaves(&*container)
        })
    }

    // ============================================================
    // Learning path
    // ============================================================

    pub fn create_relations<C: Container + ?Sized>(
        &self,
        container: &C,
        edges: &[RelationInput],
    ) -> Result<RelationBatchResult> {
        self.db.transaction(|store| {
            let container = stored_container(store, container)?;
            RelationGraph::new(store, &self.config).create_relations(&*container, edges)
        })
    }

    pub fn create_relation<C: Container + ?Sized>(
        &self,
        container: &C,
        edge: RelationInput,
    ) -> Result<RelationView> {
        self.db.transaction(|store| {
            let container = stored_container(store, container)?;
            RelationGraph::new(store, &self.config).create_relation(&*container, edge)
        })
    }

    pub fn update_relations<C: Container + ?Sized>(
        &self,
        container: &C,
        edges: &[RelationInput],
    ) -> Result<RelationBatchResult> {
        self.db.transaction(|store| {
            let container = stored_container(store, container)?;
            RelationGraph::new(store, &self.config).update_relations(&*container, edges)
        })
    }

    pub fn relations<C: Container + ?Sized>(&self, container: &C) -> Result<RelationPath> {
        self.db.transaction(|store| {
            let container = stored_container(store, container)?;
            RelationGraph::new(store, &self.config).relations(&*container)
        })
    }

    pub fn set_start_item<C: Container + ?Sized>(
        &self,
        container: &C,
        item_id: i64,
    ) -> Result<RelationView> {
        self.db.transaction(|store| {
            let container = stored_container(store, container)?;
            RelationGraph::new(store, &self.config).set_start_item(&*container, item_id)
        })
    }

    pub fn create_auto_relations<C: Container + ?Sized>(
        &self,
        container: &C,
    ) -> Result<RelationBatchResult> {
        self.db.transaction(|store| {
            let container = stored_container(store, container)?;
            RelationGraph::new(store, &self.config).create_auto_relations(&*container)
        })
    }

    pub fn delete_relation<C: Container + ?Sized>(
        &self,
        container: &C,
        relation_id: i64,
    ) -> Result<()> {
        self.db.transaction(|store| {
            let container = stored_container(store, container)?;
            RelationGraph::new(store, &self.config).delete_relation(&*container, relation_id)
        })
    }
}

/// Re-reads `container` inside the running transaction so existence and
/// editability come from the stored row, not from the caller's copy.
fn stored_container<C: Container + ?Sized>(
    store: &SqliteStore<'_>,
    container: &C,
) -> Result<Box<dyn Container>> {
    let scope = container.scope();
    store
        .container(scope)?
        .ok_or_else(|| Error::not_found(Entity::from(scope.kind), scope.id))
}
