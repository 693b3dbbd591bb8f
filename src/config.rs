//! Engine configuration loaded from environment variables.

use std::path::PathBuf;

/// Depth bound applied when no override is configured. Root items sit at depth 0.
pub const DEFAULT_MAX_DEPTH: u32 = 10;

#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Deepest allowed item depth (from COURSEPATH_MAX_DEPTH)
    pub max_depth: u32,
    /// Database file (from COURSEPATH_DB). `None` means the platform data directory.
    pub database_path: Option<PathBuf>,
}

impl EngineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let max_depth = match std::env::var("COURSEPATH_MAX_DEPTH") {
            Ok(raw) => raw.trim().parse::<u32>().unwrap_or_else(|_| {
                tracing::warn!(
                    "Ignoring invalid COURSEPATH_MAX_DEPTH={:?}, using {}",
                    raw,
                    DEFAULT_MAX_DEPTH
                );
                DEFAULT_MAX_DEPTH
            }),
            Err(_) => DEFAULT_MAX_DEPTH,
        };

        let database_path = std::env::var_os("COURSEPATH_DB").map(PathBuf::from);

        Self {
            max_depth,
            database_path,
        }
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            database_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_uses_default_depth() {
        let config = EngineConfig::default();
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert!(config.database_path.is_none());
    }

    #[test]
    fn test_with_max_depth_overrides() {
        let config = EngineConfig::default().with_max_depth(3);
        assert_eq!(config.max_depth, 3);
    }
}
