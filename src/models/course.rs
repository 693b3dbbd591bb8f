use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ContainerRef;

/// A live course.
///
/// Courses are the editable working copy of learning material. Their folder
/// and lesson tree, and the learning path through it, can be reshaped at any
/// time. Published versions are taken as [`Snapshot`](super::Snapshot)s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    pub fn scope(&self) -> ContainerRef {
        ContainerRef::course(self.id)
    }
}

/// Input for creating a new course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCourseInput {
    pub title: String,
}
