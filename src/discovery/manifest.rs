//! Project manifest (pack.yaml) parsing.
//!
//! The manifest is optional and lives in the input directory. It holds
//! defaults that command-line flags can override.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PackError, Result};

/// Project manifest loaded from pack.yaml.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Patterns of source files to leave out of the build.
    pub excludes: Vec<String>,

    /// Use a cache directory instead of the store's mtime for staleness.
    /// Relative paths resolve against the input directory.
    pub cache_dir: Option<PathBuf>,

    /// Worker threads for compiling (default: one per core).
    pub jobs: Option<usize>,

    /// zlib level, 0-9.
    pub level: Option<u32>,
}

impl Manifest {
    /// Load manifest from a pack.yaml file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PackError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read manifest: {}", e),
        })?;

        Self::parse(&content)
    }

    /// Parse manifest from YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        // An empty document deserializes to unit, not a map.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let manifest: Self = serde_yaml::from_str(content).map_err(|e| PackError::Config {
            message: format!("Invalid manifest: {}", e),
            help: Some("Check pack.yaml syntax".to_string()),
        })?;

        if let Some(level) = manifest.level {
            if level > 9 {
                return Err(PackError::Config {
                    message: format!("Compression level {} is out of range", level),
                    help: Some("Use a zlib level between 0 and 9".to_string()),
                });
            }
        }

        Ok(manifest)
    }

    /// Check if a path should be excluded based on exclude patterns.
    pub fn is_excluded(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.excludes
            .iter()
            .any(|pattern| Self::matches_pattern(&path_str, pattern))
    }

    /// Simple glob pattern matching.
    fn matches_pattern(path: &str, pattern: &str) -> bool {
        if let Some(suffix) = pattern.strip_prefix("**/") {
            // **/dir/* matches anything inside dir anywhere in the path
            if let Some(dir) = suffix.strip_suffix("/*") {
                return path.contains(&format!("/{}/", dir))
                    || path.starts_with(&format!("{}/", dir));
            }
            return path.ends_with(suffix);
        }

        if let Some(suffix) = pattern.strip_prefix('*') {
            if !pattern.contains('/') {
                return path.ends_with(suffix);
            }
        }

        if let Some(prefix) = pattern.strip_suffix("/*") {
            return path.starts_with(&format!("{}/", prefix))
                || path.contains(&format!("/{}/", prefix));
        }

        // File name or path component
        path == pattern
            || path.ends_with(&format!("/{}", pattern))
            || path.contains(&format!("/{}/", pattern))
    }

    /// Cache directory resolved against the input directory.
    pub fn cache_dir_in(&self, root: &Path) -> Option<PathBuf> {
        self.cache_dir.as_ref().map(|dir| {
            if dir.is_absolute() {
                dir.clone()
            } else {
                root.join(dir)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_manifest() {
        let yaml = r#"
excludes:
  - "*.bak"
  - "**/wip/*"
cache_dir: .packcache
jobs: 4
level: 9
"#;
        let manifest = Manifest::parse(yaml).unwrap();

        assert_eq!(manifest.excludes, vec!["*.bak", "**/wip/*"]);
        assert_eq!(manifest.cache_dir, Some(PathBuf::from(".packcache")));
        assert_eq!(manifest.jobs, Some(4));
        assert_eq!(manifest.level, Some(9));
    }

    #[test]
    fn test_parse_empty_manifest() {
        assert_eq!(Manifest::parse("").unwrap(), Manifest::default());
    }

    #[test]
    fn test_parse_rejects_bad_level() {
        let err = Manifest::parse("level: 12").unwrap_err();
        assert!(matches!(err, PackError::Config { .. }));
    }

    #[test]
    fn test_parse_rejects_bad_yaml() {
        assert!(Manifest::parse("jobs: [oops").is_err());
    }

    #[test]
    fn test_is_excluded_extension() {
        let manifest = Manifest {
            excludes: vec!["*.draft.lua".to_string()],
            ..Default::default()
        };

        assert!(manifest.is_excluded(Path::new("code/boss.draft.lua")));
        assert!(!manifest.is_excluded(Path::new("code/boss.lua")));
    }

    #[test]
    fn test_is_excluded_directory() {
        let manifest = Manifest {
            excludes: vec!["**/wip/*".to_string()],
            ..Default::default()
        };

        assert!(manifest.is_excluded(Path::new("game/tiles/wip/a.png")));
        assert!(manifest.is_excluded(Path::new("wip/a.png")));
        assert!(!manifest.is_excluded(Path::new("game/tiles/a.png")));
    }

    #[test]
    fn test_is_excluded_file_name() {
        let manifest = Manifest {
            excludes: vec!["scratch.tmx".to_string()],
            ..Default::default()
        };

        assert!(manifest.is_excluded(Path::new("game/tilemap/scratch.tmx")));
        assert!(!manifest.is_excluded(Path::new("game/tilemap/notscratch.tmx")));
    }

    #[test]
    fn test_cache_dir_resolution() {
        let manifest = Manifest {
            cache_dir: Some(PathBuf::from("cache")),
            ..Default::default()
        };
        assert_eq!(
            manifest.cache_dir_in(Path::new("/game")),
            Some(PathBuf::from("/game/cache"))
        );
        assert_eq!(Manifest::default().cache_dir_in(Path::new("/game")), None);
    }
}
