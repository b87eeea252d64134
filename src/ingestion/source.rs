//! Reading a single source file fully into memory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PoolResult;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// A source file loaded into memory together with its location metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute (or root-joined) path on disk.
    pub absolute_path: PathBuf,
    /// Path relative to the scan root, using `/` separators.
    pub relative_path: String,
    /// File name including extension.
    pub file_name: String,
    /// Parent directory relative to the scan root (`""` for files at the root).
    pub folder_path: String,
    /// Size on disk in bytes.
    pub size_bytes: u64,
    /// Decoded text content.
    pub content: String,
    /// Number of lines in `content`.
    pub line_count: usize,
}

impl SourceFile {
    /// Read `path` and describe it relative to `root`.
    ///
    /// If `path` is not under `root`, the path is used as given for the relative fields.
    pub fn read(root: impl AsRef<Path>, path: impl AsRef<Path>) -> PoolResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let relative = path.strip_prefix(root.as_ref()).unwrap_or(path);
        Ok(Self::from_bytes(path, relative, &bytes))
    }

    /// Build a source file from bytes already in memory.
    pub fn from_bytes(absolute_path: &Path, relative_path: &Path, bytes: &[u8]) -> Self {
        let content = decode_content(bytes);
        let line_count = content.lines().count();
        Self {
            absolute_path: absolute_path.to_path_buf(),
            relative_path: to_slash(relative_path),
            file_name: relative_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            folder_path: relative_path.parent().map(to_slash).unwrap_or_default(),
            size_bytes: bytes.len() as u64,
            content,
            line_count,
        }
    }

    /// Last directory component containing the file (`"root"` for files at the scan root).
    pub fn parent_folder(&self) -> &str {
        self.folder_path
            .rsplit('/')
            .find(|s| !s.is_empty())
            .unwrap_or("root")
    }
}

/// Decode file bytes as text.
///
/// A UTF-8 BOM is stripped. Invalid UTF-8 falls back to Latin-1, where every byte maps to the
/// code point of the same value, so decoding never fails.
pub fn decode_content(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_owned(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
