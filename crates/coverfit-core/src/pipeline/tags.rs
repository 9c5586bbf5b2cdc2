//! ID3v2 cover-art access: read the first embedded picture, replace them all.

use id3::frame::{Content, Picture, PictureType};
use id3::{ErrorKind, Tag, TagLike, Version};
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, PersistError};

use crate::error::{PipelineError, PipelineResult};
use crate::types::{ArtworkEntry, COVER_DESCRIPTION, JPEG_MIME};

/// Reads and rewrites embedded artwork in MP3 files.
pub struct TagRewriter;

impl TagRewriter {
    /// Return the first embedded picture (APIC/PIC) in tag order.
    ///
    /// Fails with `NoTag` if the file has no ID3v2 header and `TagRead` if the
    /// tag cannot be parsed.
    pub fn read_cover_art(path: &Path) -> PipelineResult<Option<ArtworkEntry>> {
        let tag = Self::read_tag(path)?;

        for frame in tag.frames() {
            if frame.id() != "APIC" && frame.id() != "PIC" {
                continue;
            }
            if let Content::Picture(p) = frame.content() {
                return Ok(Some(ArtworkEntry {
                    data: p.data.clone(),
                    mime_type: p.mime_type.clone(),
                    picture_type: p.picture_type,
                    description: p.description.clone(),
                }));
            }
        }

        Ok(None)
    }

    /// Replace every embedded picture with a single JPEG front cover.
    ///
    /// The file is rewritten through a temporary copy in the same directory
    /// and renamed over the original, so a failed write leaves the original
    /// untouched.
    pub fn replace_cover_art(path: &Path, jpeg: Vec<u8>) -> PipelineResult<bool> {
        let mut tag = match Self::read_tag(path) {
            Ok(tag) => tag,
            Err(PipelineError::NoTag(_)) => Tag::with_version(Version::Id3v24),
            Err(e) => return Err(write_error(path, e.to_string())),
        };

        tag.remove_all_pictures();
        tag.add_frame(Picture {
            mime_type: JPEG_MIME.to_string(),
            picture_type: PictureType::CoverFront,
            description: COVER_DESCRIPTION.to_string(),
            data: jpeg,
        });

        // ID3v2.2 is upgraded; everything else keeps the version it was read with.
        let version = match tag.version() {
            Version::Id3v22 => Version::Id3v23,
            v => v,
        };

        Self::write_atomically(path, &tag, version)?;
        tracing::debug!("Replaced album art in {:?} (ID3{:?})", path, version);
        Ok(true)
    }

    fn read_tag(path: &Path) -> PipelineResult<Tag> {
        Tag::read_from_path(path).map_err(|e| match e.kind {
            ErrorKind::NoTag => PipelineError::NoTag(path.to_path_buf()),
            _ => PipelineError::TagRead {
                path: path.to_path_buf(),
                message: e.to_string(),
            },
        })
    }

    fn write_atomically(path: &Path, tag: &Tag, version: Version) -> PipelineResult<()> {
        // Resolve symlinks so the rename lands on the real file, not the link.
        let target = std::fs::canonicalize(path)
            .map_err(|e| write_error(path, format!("Cannot resolve path: {}", e)))?;

        let temp = stage(&target, tag, version)?;
        commit(temp, &target)
    }
}

/// Write a tagged copy of `target` into a temporary file next to it.
fn stage(target: &Path, tag: &Tag, version: Version) -> PipelineResult<NamedTempFile> {
    let dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let temp = tempfile::Builder::new()
        .prefix(".coverfit-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| write_error(target, format!("Cannot create temporary file: {}", e)))?;

    // fs::copy carries the permission bits over to the copy.
    let staged = std::fs::copy(target, temp.path())
        .map_err(|e| write_error(target, format!("Cannot stage copy: {}", e)))
        .and_then(|_| {
            tag.write_to_path(temp.path(), version)
                .map_err(|e| write_error(target, e.to_string()))
        });
    match staged {
        Ok(()) => Ok(temp),
        Err(e) => {
            discard(temp);
            Err(e)
        }
    }
}

/// Rename the staged file over `target`, removing it if that fails.
fn commit(temp: NamedTempFile, target: &Path) -> PipelineResult<()> {
    match temp.persist(target) {
        Ok(_) => Ok(()),
        Err(PersistError { error, file }) => {
            discard(file);
            Err(write_error(
                target,
                format!("Cannot replace file: {}", error),
            ))
        }
    }
}

fn write_error(path: &Path, message: String) -> PipelineError {
    PipelineError::TagWrite {
        path: path.to_path_buf(),
        message,
    }
}

/// Remove a temporary file, warning if that fails.
fn discard(temp: NamedTempFile) {
    let temp_path: PathBuf = temp.path().to_path_buf();
    if let Err(e) = temp.close() {
        tracing::warn!("Could not remove temporary file {:?}: {}", temp_path, e);
    }
}
