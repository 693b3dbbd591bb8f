//! Persistence gateway used by the structure engine.
//!
//! [`ItemTree`](crate::engine::ItemTree) and
//! [`RelationGraph`](crate::engine::RelationGraph) only talk to storage
//! through this trait, so the caller decides which transaction they run in.

use crate::engine::Container;
use crate::error::Result;
use crate::models::{ContainerRef, Item, Relation, RelationInput};

/// A row to insert into the item table. Depth is computed by the tree.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub parent_id: Option<i64>,
    pub name: String,
    pub is_folder: bool,
    pub depth: u32,
    pub leaf_payload_ref: Option<i64>,
}

pub trait StructureStore {
    /// The stored container behind `scope`, with its current editability.
    fn container(&self, scope: ContainerRef) -> Result<Option<Box<dyn Container>>>;

    /// All items of a container, in id order.
    fn items(&self, scope: ContainerRef) -> Result<Vec<Item>>;

    /// Look an item up regardless of container, so callers can tell
    /// "absent" from "owned by someone else".
    fn item(&self, id: i64) -> Result<Option<Item>>;

    /// Bulk lookup restricted to one container. Unknown ids are skipped.
    fn items_by_ids(&self, scope: ContainerRef, ids: &[i64]) -> Result<Vec<Item>>;

    fn insert_item(&mut self, scope: ContainerRef, item: NewItem) -> Result<Item>;

    /// Persist name, parent, depth and payload of an existing item.
    fn update_item(&mut self, item: &Item) -> Result<()>;

    fn delete_items(&mut self, ids: &[i64]) -> Result<usize>;

    /// All relations of a container, in id order.
    fn relations(&self, scope: ContainerRef) -> Result<Vec<Relation>>;

    fn relation(&self, id: i64) -> Result<Option<Relation>>;

    fn insert_relation(&mut self, scope: ContainerRef, edge: RelationInput) -> Result<Relation>;

    fn retarget_relation(&mut self, id: i64, to_item_id: i64) -> Result<()>;

    fn delete_relations(&mut self, ids: &[i64]) -> Result<usize>;

    fn delete_all_relations(&mut self, scope: ContainerRef) -> Result<usize>;
}
