//! Domain models for coursepath.
//!
//! # Core Concepts
//!
//! ## Containers
//!
//! - [`Course`]: The live, always-editable container of learning material.
//! - [`Snapshot`]: A versioned, published copy of a course. Its structure can
//!   only change while the snapshot is in [`SnapshotStatus::Draft`].
//! - [`ContainerRef`]: The `(kind, id)` pair that scopes every item and
//!   relation row to exactly one container.
//!
//! ## Structure
//!
//! - [`Item`]: A node of the content hierarchy, either a folder or a leaf that
//!   points at external learning content. Items reference their parent by id.
//! - [`Relation`]: One "comes immediately before" edge of the learning path.
//!   An edge without a source is the start point.

mod container;
mod course;
mod item;
mod relation;
mod snapshot;

pub use container::*;
pub use course::*;
pub use item::*;
pub use relation::*;
pub use snapshot::*;
