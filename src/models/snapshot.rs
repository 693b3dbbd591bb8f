use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ContainerRef;

/// A versioned copy of a course's structure.
///
/// Snapshots start as [`SnapshotStatus::Draft`], when their tree and path may
/// still be adjusted. Once they leave draft their structure is frozen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: i64,
    pub course_id: i64,
    /// Monotonic per course, starting at 1.
    pub version: u32,
    pub status: SnapshotStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn scope(&self) -> ContainerRef {
        ContainerRef::snapshot(self.id)
    }
}

/// The lifecycle state of a snapshot.
///
/// - `Draft`: Structure may still change
/// - `Active`: Published and in use by learners
/// - `Completed`: The run this snapshot served has ended
/// - `Archived`: Kept for reference only
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotStatus {
    Draft,
    Active,
    Completed,
    Archived,
}

impl SnapshotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}
