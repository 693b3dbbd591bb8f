use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ContainerKind, ContainerRef};

/// A node of a container's content hierarchy.
///
/// Items form a tree through `parent_id`, a plain id reference into the same
/// container rather than an owning pointer. Folders organise; leaves carry a
/// reference to external learning content and are the only items that can
/// take part in the learning path.
///
/// `depth` is 0 for root items and `parent.depth + 1` otherwise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: i64,
    pub container_kind: ContainerKind,
    pub container_id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub is_folder: bool,
    pub depth: u32,
    /// Opaque content id. Always `None` for folders.
    pub leaf_payload_ref: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    pub fn scope(&self) -> ContainerRef {
        ContainerRef {
            kind: self.container_kind,
            id: self.container_id,
        }
    }

    pub fn belongs_to(&self, scope: ContainerRef) -> bool {
        self.scope() == scope
    }

    pub fn is_leaf(&self) -> bool {
        !self.is_folder
    }
}

/// Input for creating a folder. `None` parent creates a root folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolderInput {
    pub parent_id: Option<i64>,
    pub name: String,
}

/// Input for creating a leaf item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateItemInput {
    pub parent_id: Option<i64>,
    pub name: String,
    pub leaf_payload_ref: i64,
}

/// An item with its nested children, used for hierarchy responses.
///
/// The `item` fields are flattened into the JSON response, with an additional
/// `children` array containing nested `ItemNode` objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemNode {
    #[serde(flatten)]
    pub item: Item,
    pub children: Vec<ItemNode>,
}

/// What a cascading delete removed.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteSummary {
    pub items_deleted: usize,
    pub relations_deleted: usize,
}
