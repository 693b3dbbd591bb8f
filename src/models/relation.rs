use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ContainerKind, ContainerRef};

/// One edge of a container's learning path.
///
/// Edges are stored as independent rows. Together they must form a single
/// simple path: at most one edge without a source (the start point), every
/// item targeted at most once and left at most once, and no cycles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Relation {
    pub id: i64,
    pub container_kind: ContainerKind,
    pub container_id: i64,
    /// `None` marks the start edge.
    pub from_item_id: Option<i64>,
    pub to_item_id: i64,
    pub created_at: DateTime<Utc>,
}

impl Relation {
    pub fn scope(&self) -> ContainerRef {
        ContainerRef {
            kind: self.container_kind,
            id: self.container_id,
        }
    }

    pub fn is_start_point(&self) -> bool {
        self.from_item_id.is_none()
    }
}

/// A requested edge, before validation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelationInput {
    pub from_item_id: Option<i64>,
    pub to_item_id: i64,
}

impl RelationInput {
    pub fn start(to_item_id: i64) -> Self {
        Self {
            from_item_id: None,
            to_item_id,
        }
    }

    pub fn link(from_item_id: i64, to_item_id: i64) -> Self {
        Self {
            from_item_id: Some(from_item_id),
            to_item_id,
        }
    }
}

/// Per-edge view returned to callers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelationView {
    pub id: i64,
    pub from_item_id: Option<i64>,
    pub to_item_id: i64,
    pub is_start_point: bool,
}

impl From<&Relation> for RelationView {
    fn from(relation: &Relation) -> Self {
        Self {
            id: relation.id,
            from_item_id: relation.from_item_id,
            to_item_id: relation.to_item_id,
            is_start_point: relation.is_start_point(),
        }
    }
}

/// One step of the reconstructed learning path. `order` starts at 1.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PathEntry {
    pub item_id: i64,
    pub name: String,
    pub order: u32,
}

/// The learning path in traversal order plus the raw edges it was built from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationPath {
    pub items: Vec<PathEntry>,
    pub relations: Vec<RelationView>,
}

/// Outcome of a bulk relation write.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelationBatchResult {
    pub edge_count: usize,
    pub start_item_id: Option<i64>,
}
