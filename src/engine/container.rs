//! The container abstraction the engine is generic over.

use crate::error::{Error, Result};
use crate::models::{ContainerRef, Course, Snapshot, SnapshotStatus};

/// Something that owns a tree of items and a learning path.
///
/// Live courses and snapshots share every structural algorithm; they differ
/// only in where their rows live and whether they may currently change.
pub trait Container {
    fn scope(&self) -> ContainerRef;

    /// Whether structural mutation is currently allowed.
    fn is_editable(&self) -> bool;
}

impl Container for Course {
    fn scope(&self) -> ContainerRef {
        Course::scope(self)
    }

    fn is_editable(&self) -> bool {
        true
    }
}

impl Container for Snapshot {
    fn scope(&self) -> ContainerRef {
        Snapshot::scope(self)
    }

    fn is_editable(&self) -> bool {
        self.status == SnapshotStatus::Draft
    }
}

pub(crate) fn ensure_editable<C: Container + ?Sized>(container: &C) -> Result<()> {
    if container.is_editable() {
        Ok(())
    } else {
        tracing::debug!(container = %container.scope(), "Rejected mutation of frozen container");
        Err(Error::ContainerNotEditable(container.scope()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn snapshot(status: SnapshotStatus) -> Snapshot {
        Snapshot {
            id: 7,
            course_id: 1,
            version: 1,
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_course_is_always_editable() {
        let course = Course {
            id: 1,
            title: "Rust".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(course.is_editable());
        assert!(ensure_editable(&course).is_ok());
    }

    #[test]
    fn test_snapshot_editable_only_in_draft() {
        assert!(snapshot(SnapshotStatus::Draft).is_editable());
        assert!(!snapshot(SnapshotStatus::Active).is_editable());
        assert!(!snapshot(SnapshotStatus::Completed).is_editable());
        assert!(!snapshot(SnapshotStatus::Archived).is_editable());

        let err = ensure_editable(&snapshot(SnapshotStatus::Active)).unwrap_err();
        assert!(matches!(err, Error::ContainerNotEditable(scope) if scope == ContainerRef::snapshot(7)));
    }
}
