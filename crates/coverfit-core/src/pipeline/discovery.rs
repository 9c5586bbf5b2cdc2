//! File discovery for finding MP3 files in directory trees.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ProcessingConfig;
use crate::error::{PipelineError, PipelineResult};

/// Discovers eligible audio files under a root directory.
pub struct FileDiscovery {
    config: ProcessingConfig,
}

/// Information about a discovered file.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Full path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl FileDiscovery {
    /// Create a new file discovery instance.
    pub fn new(config: ProcessingConfig) -> Self {
        Self { config }
    }

    /// Recursively find all eligible files under `root`.
    ///
    /// Entries are visited depth-first, sorted by file name within each
    /// directory. Unreadable entries below the root are logged and skipped;
    /// failure to read the root itself is an error.
    pub fn discover(&self, root: &Path) -> PipelineResult<Vec<DiscoveredFile>> {
        if !root.is_dir() {
            return Err(PipelineError::InvalidDirectory(root.to_path_buf()));
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(self.config.follow_links)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(PipelineError::Discovery {
                        path: root.to_path_buf(),
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry under {:?}: {}", root, e);
                    continue;
                }
            };

            let entry_path = entry.path();

            // Unfollowed symlinks still count when they point at a regular file.
            let linked_file = entry.path_is_symlink() && entry_path.is_file();
            if !entry.file_type().is_file() && !linked_file {
                if entry.path_is_symlink() {
                    tracing::debug!("Skipping symlink that is not a file: {:?}", entry_path);
                }
                continue;
            }

            if !self.is_supported(entry_path) {
                tracing::debug!("Skipping non-MP3 file: {:?}", entry_path);
                continue;
            }

            let metadata = if linked_file {
                std::fs::metadata(entry_path).map_err(|e| e.to_string())
            } else {
                entry.metadata().map_err(|e| e.to_string())
            };
            match metadata {
                Ok(meta) => files.push(DiscoveredFile {
                    path: entry_path.to_path_buf(),
                    size: meta.len(),
                }),
                Err(e) => tracing::warn!("Cannot stat {:?}: {}", entry_path, e),
            }
        }

        Ok(files)
    }

    /// Check if a file has a supported extension.
    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.config
                    .extensions
                    .iter()
                    .any(|fmt| fmt.trim_start_matches('.').eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    /// Get total size of all discovered files.
    pub fn total_size(files: &[DiscoveredFile]) -> u64 {
        files.iter().map(|f| f.size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discovery() -> FileDiscovery {
        FileDiscovery::new(ProcessingConfig::default())
    }

    #[test]
    fn test_is_supported() {
        let d = discovery();
        assert!(d.is_supported(Path::new("song.mp3")));
        assert!(d.is_supported(Path::new("SONG.MP3")));
        assert!(d.is_supported(Path::new("dir/Song.Mp3")));
        assert!(!d.is_supported(Path::new("cover.jpg")));
        assert!(!d.is_supported(Path::new("mp3")));
        assert!(!d.is_supported(Path::new("song.mp3.bak")));
    }

    #[test]
    fn test_custom_extensions() {
        let d = FileDiscovery::new(ProcessingConfig {
            extensions: vec![".MP2".to_string(), "mp3".to_string()],
            follow_links: false,
        });
        assert!(d.is_supported(Path::new("a.mp2")));
        assert!(d.is_supported(Path::new("a.mp3")));
    }

    #[test]
    fn test_discover_recurses_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("Artist").join("Album");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("a.mp3"), b"x").unwrap();
        std::fs::write(nested.join("b.MP3"), b"xy").unwrap();
        std::fs::write(nested.join("cover.jpg"), b"xyz").unwrap();
        std::fs::write(nested.join("notes.txt"), b"").unwrap();

        let files = discovery().discover(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        // "Artist" sorts before "a.mp3" (uppercase first), so the nested file comes first.
        assert_eq!(names, vec!["b.MP3", "a.mp3"]);
        assert_eq!(FileDiscovery::total_size(&files), 3);
    }

    #[test]
    fn test_discover_ignores_directories_named_like_mp3() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("album.mp3")).unwrap();

        let files = discovery().discover(dir.path()).unwrap();
        assert!(files.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_includes_symlinked_files() {
        let dir = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        let real = outside.path().join("real.mp3");
        std::fs::write(&real, b"abcd").unwrap();
        std::os::unix::fs::symlink(&real, dir.path().join("link.mp3")).unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("linked_dir")).unwrap();

        let files = discovery().discover(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, dir.path().join("link.mp3"));
        assert_eq!(files[0].size, 4);
    }

    #[test]
    fn test_discover_rejects_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let err = discovery().discover(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidDirectory(_)));
    }

    #[test]
    fn test_discover_rejects_file_root() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.mp3");
        std::fs::write(&file, b"x").unwrap();

        let err = discovery().discover(&file).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidDirectory(_)));
    }

    #[test]
    fn test_total_size() {
        let files = vec![
            DiscoveredFile {
                path: PathBuf::from("a.mp3"),
                size: 100,
            },
            DiscoveredFile {
                path: PathBuf::from("b.mp3"),
                size: 200,
            },
        ];

        assert_eq!(FileDiscovery::total_size(&files), 300);
    }
}
