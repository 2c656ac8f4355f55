//! Asset sources: raw bytes by filename.
//!
//! The archive format that ships the original game data is not handled
//! here. An [`AssetSource`] only needs to answer "give me the bytes of
//! `NAME.AUD`", and a missing file is an ordinary, expected outcome.
//!
//! Two sources are provided:
//! - [`DirectoryAssets`]: a directory of extracted files, looked up
//!   case-insensitively
//! - [`MemoryAssets`]: an in-memory map, used by tests and synthesized demos

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ahash::AHashMap;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::aud::{decode_aud, DecodeError};
use crate::audio_resource::DecodedClip;

/// Errors from an asset source.
#[derive(Debug, Error)]
pub enum AssetError {
    /// No file with this name.
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// The file exists but could not be read.
    #[error("Failed to read asset '{name}': {source}")]
    Io {
        /// Requested name
        name: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Result type for asset operations.
pub type AssetResult<T> = Result<T, AssetError>;

/// Errors from loading and decoding one AUD asset.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The bytes could not be obtained.
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// The bytes did not decode.
    #[error("Failed to decode '{name}': {source}")]
    Decode {
        /// Requested name
        name: String,
        /// Codec error
        #[source]
        source: DecodeError,
    },
}

impl LoadError {
    /// Whether the asset was simply absent.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Asset(AssetError::NotFound(_)))
    }
}

/// Supplies raw file bytes by name.
pub trait AssetSource {
    /// Reads the whole file.
    fn read(&self, name: &str) -> AssetResult<Vec<u8>>;

    /// Whether a file with this name exists.
    fn contains(&self, name: &str) -> bool;
}

/// Reads and decodes an AUD asset.
pub fn load_aud(source: &dyn AssetSource, name: &str) -> Result<DecodedClip, LoadError> {
    let bytes = source.read(name)?;
    decode_aud(&bytes).map_err(|source| LoadError::Decode {
        name: name.to_string(),
        source,
    })
}

fn index_key(name: &str) -> String {
    name.to_ascii_uppercase()
}

/// Files in a directory tree, matched by file name ignoring case.
#[derive(Debug, Clone)]
pub struct DirectoryAssets {
    root: PathBuf,
    index: AHashMap<String, PathBuf>,
}

impl DirectoryAssets {
    /// Indexes every file under `root`.
    ///
    /// A missing directory yields an empty source.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let mut assets = Self {
            root: root.into(),
            index: AHashMap::new(),
        };
        assets.rescan();
        assets
    }

    /// Rebuilds the file index.
    pub fn rescan(&mut self) {
        self.index.clear();
        let root = self.root.clone();
        self.scan_dir(&root);
        info!(
            "Indexed {} audio assets under {:?}",
            self.index.len(),
            self.root
        );
    }

    fn scan_dir(&mut self, dir: &Path) {
        if !dir.exists() {
            debug!("Asset directory not found: {:?}", dir);
            return;
        }

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to read asset directory {:?}: {}", dir, e);
                return;
            },
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                self.scan_dir(&path);
                continue;
            }
            if let Some(file_name) = path.file_name() {
                let key = index_key(&file_name.to_string_lossy());
                self.index.entry(key).or_insert(path);
            }
        }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of indexed files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no files were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl AssetSource for DirectoryAssets {
    fn read(&self, name: &str) -> AssetResult<Vec<u8>> {
        let path = self
            .index
            .get(&index_key(name))
            .ok_or_else(|| AssetError::NotFound(name.to_string()))?;
        fs::read(path).map_err(|source| AssetError::Io {
            name: name.to_string(),
            source,
        })
    }

    fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&index_key(name))
    }
}

/// In-memory files, matched by name ignoring case.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    files: AHashMap<String, Arc<[u8]>>,
}

impl MemoryAssets {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file.
    pub fn insert(&mut self, name: &str, bytes: impl Into<Arc<[u8]>>) {
        self.files.insert(index_key(name), bytes.into());
    }

    /// Adds a file, builder style.
    #[must_use]
    pub fn with_file(mut self, name: &str, bytes: impl Into<Arc<[u8]>>) -> Self {
        self.insert(name, bytes);
        self
    }

    /// Removes a file.
    pub fn remove(&mut self, name: &str) -> bool {
        self.files.remove(&index_key(name)).is_some()
    }

    /// Number of files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether there are no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl AssetSource for MemoryAssets {
    fn read(&self, name: &str) -> AssetResult<Vec<u8>> {
        self.files
            .get(&index_key(name))
            .map(|bytes| bytes.to_vec())
            .ok_or_else(|| AssetError::NotFound(name.to_string()))
    }

    fn contains(&self, name: &str) -> bool {
        self.files.contains_key(&index_key(name))
    }
}
