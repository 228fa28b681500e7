//! Local read-only assets (code table, icon animations)

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use log::debug;

/// Errors opening an asset
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("asset `{0}` not found")]
    NotFound(String),
    #[error("asset `{name}` unreadable: {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// An open asset with a known size and absolute seeking
pub trait ByteSource {
    /// Total size in bytes
    fn size(&self) -> u64;

    /// Read up to `buf.len()` bytes at the current position
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Move to an absolute byte offset
    fn seek(&mut self, position: u64) -> io::Result<u64>;
}

/// Store of named assets
///
/// Names are absolute within the store, e.g. `/codes.json` or `/100.gif`.
/// Dropping the returned source closes it.
pub trait AssetStore {
    type Source: ByteSource;

    fn open(&self, name: &str) -> Result<Self::Source, AssetError>;
}

/// Adapts a [`ByteSource`] to [`std::io::Read`]
pub struct SourceReader<S> {
    source: S,
}

impl<S: ByteSource> SourceReader<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_inner(self) -> S {
        self.source
    }
}

impl<S: ByteSource> Read for SourceReader<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.source.read(buf)
    }
}

/// A file opened from a [`DirAssetStore`]
#[derive(Debug)]
pub struct FileSource {
    file: File,
    size: u64,
}

impl ByteSource for FileSource {
    fn size(&self) -> u64 {
        self.size
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }

    fn seek(&mut self, position: u64) -> io::Result<u64> {
        self.file.seek(SeekFrom::Start(position))
    }
}

/// Assets stored as files below a root directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirAssetStore {
    root: PathBuf,
}

impl DirAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map an asset name to a file below the root
    ///
    /// Names that would escape the root resolve to nothing.
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name.trim_start_matches('/'));
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        (contained && !name.trim_start_matches('/').is_empty()).then(|| self.root.join(relative))
    }
}

impl AssetStore for DirAssetStore {
    type Source = FileSource;

    fn open(&self, name: &str) -> Result<FileSource, AssetError> {
        let path = self
            .resolve(name)
            .ok_or_else(|| AssetError::NotFound(name.to_owned()))?;
        let file = File::open(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => AssetError::NotFound(name.to_owned()),
            _ => AssetError::Io {
                name: name.to_owned(),
                source,
            },
        })?;
        let size = file
            .metadata()
            .map_err(|source| AssetError::Io {
                name: name.to_owned(),
                source,
            })?
            .len();
        debug!("opened asset {} ({} bytes)", path.display(), size);
        Ok(FileSource { file, size })
    }
}

/// An asset held in memory
#[derive(Debug, Clone)]
pub struct MemorySource {
    data: Arc<[u8]>,
    position: u64,
}

impl ByteSource for MemorySource {
    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let start = usize::try_from(self.position)
            .unwrap_or(usize::MAX)
            .min(self.data.len());
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        self.position += n as u64;
        Ok(n)
    }

    fn seek(&mut self, position: u64) -> io::Result<u64> {
        self.position = position;
        Ok(position)
    }
}

/// Assets held in memory, keyed by name
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetStore {
    assets: HashMap<String, Arc<[u8]>>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.assets.insert(name.into(), Arc::from(data.into()));
    }

    pub fn with(mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(name, data);
        self
    }
}

impl AssetStore for MemoryAssetStore {
    type Source = MemorySource;

    fn open(&self, name: &str) -> Result<MemorySource, AssetError> {
        self.assets
            .get(name)
            .map(|data| MemorySource {
                data: Arc::clone(data),
                position: 0,
            })
            .ok_or_else(|| AssetError::NotFound(name.to_owned()))
    }
}
