use std::fmt;

use serde::{Deserialize, Serialize};

/// Which kind of container owns a row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    Course,
    Snapshot,
}

impl ContainerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Course => "course",
            Self::Snapshot => "snapshot",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "course" => Some(Self::Course),
            "snapshot" => Some(Self::Snapshot),
            _ => None,
        }
    }
}

/// Identifies one container. Items and relations are always queried through one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ContainerRef {
    pub kind: ContainerKind,
    pub id: i64,
}

impl ContainerRef {
    pub fn course(id: i64) -> Self {
        Self {
            kind: ContainerKind::Course,
            id,
        }
    }

    pub fn snapshot(id: i64) -> Self {
        Self {
            kind: ContainerKind::Snapshot,
            id,
        }
    }
}

impl fmt::Display for ContainerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.id)
    }
}
