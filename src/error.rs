//! Error taxonomy for structure and sequencing operations.
//!
//! Every failure is a caller/input error detected before any write, except
//! [`Error::Storage`], which wraps the underlying SQLite failure.
//!
//! Beyond the core tree and path kinds, four variants cover cases the engine
//! also rejects: [`Error::DuplicateSource`] (a branching path),
//! [`Error::FolderInPath`] (a folder used as a path endpoint),
//! [`Error::ContainerNotEditable`] (a frozen snapshot) and
//! [`Error::Validation`] (blank names and titles).

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ContainerKind, ContainerRef};

/// The kind of entity a [`Error::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Course,
    Snapshot,
    Item,
    Relation,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Course => write!(f, "Course"),
            Self::Snapshot => write!(f, "Snapshot"),
            Self::Item => write!(f, "Item"),
            Self::Relation => write!(f, "Relation"),
        }
    }
}

impl From<ContainerKind> for Entity {
    fn from(kind: ContainerKind) -> Self {
        match kind {
            ContainerKind::Course => Self::Course,
            ContainerKind::Snapshot => Self::Snapshot,
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: i64 },

    #[error("Invalid parent: {0}")]
    InvalidParent(String),

    #[error("Maximum depth {max} exceeded: item would be at depth {depth}")]
    MaxDepthExceeded { depth: u32, max: u32 },

    #[error("Item {item_id} is a folder and cannot carry a content payload")]
    CannotAttachPayloadToFolder { item_id: i64 },

    #[error("Learning path has more than one start point")]
    DuplicateStartPoint,

    #[error("Item {item_id} is the target of more than one relation")]
    DuplicateTarget { item_id: i64 },

    #[error("Item {item_id} is the source of more than one relation")]
    DuplicateSource { item_id: i64 },

    #[error("Relations form a cycle through item {item_id}")]
    CircularReference { item_id: i64 },

    #[error("Relation {relation_id} does not belong to this container")]
    InvalidRelationOwnership { relation_id: i64 },

    #[error("Item {item_id} is a folder and cannot be part of the learning path")]
    FolderInPath { item_id: i64 },

    #[error("Container {0} is not editable")]
    ContainerNotEditable(ContainerRef),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl Error {
    pub fn not_found(entity: Entity, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    /// True for every variant except storage failures.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
