//! Weather code table backed by a local JSON asset
//!
//! The table maps a code to a five element row:
//! `["100.gif", "<reserved>", "<reserved>", "晴", "CLEAR"]`. Only the row
//! for the requested code is ever retained.

use log::{debug, warn};

use crate::document::{BoundedDocumentStore, FilterSpec, ParseError};
use crate::traits::{AssetError, AssetStore, SourceReader};

/// Default asset name of the code table
pub const CODE_TABLE_PATH: &str = "/codes.json";

/// Default capacity for a single-row lookup
pub const DEFAULT_LOOKUP_CAPACITY: usize = 512;

const ROW_LEN: usize = 5;

/// One row of the code table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeLookupEntry {
    pub code: String,
    /// Absolute asset path, e.g. `/100.gif`
    pub icon_file: String,
    pub reserved: [String; 2],
    pub text_jp: String,
    pub text_en: String,
}

/// Why a lookup produced nothing
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("code `{0}` not in table")]
    Miss(String),
    #[error(transparent)]
    AssetUnavailable(#[from] AssetError),
    #[error("code table: {0}")]
    Parse(#[from] ParseError),
    #[error("code `{0}` has a malformed row")]
    Shape(String),
}

/// Code table lookups over an [`AssetStore`]
pub struct CodeLookupTable<A> {
    assets: A,
    table: String,
    store: BoundedDocumentStore,
}

impl<A: AssetStore> CodeLookupTable<A> {
    pub fn new(assets: A, table: impl Into<String>, capacity: usize) -> Self {
        Self {
            assets,
            table: table.into(),
            store: BoundedDocumentStore::new(capacity),
        }
    }

    pub fn assets(&self) -> &A {
        &self.assets
    }

    /// Look up `code`, reporting why nothing was found
    ///
    /// The table is reopened and streamed on every call.
    pub fn try_lookup(&self, code: &str) -> Result<CodeLookupEntry, LookupError> {
        if code.is_empty() {
            return Err(LookupError::Miss(String::new()));
        }

        let source = self.assets.open(&self.table)?;
        let doc = self
            .store
            .parse(SourceReader::new(source), &FilterSpec::keep_key(code))?;

        let row = doc
            .root()
            .get(code)
            .ok_or_else(|| LookupError::Miss(code.to_owned()))?;
        let cells = row
            .as_array()
            .filter(|cells| cells.len() >= ROW_LEN)
            .ok_or_else(|| LookupError::Shape(code.to_owned()))?;

        let mut text = cells
            .iter()
            .map(|cell| cell.as_str().map(str::to_owned));
        let mut next = || text.next().flatten().ok_or_else(|| LookupError::Shape(code.to_owned()));
        let icon = next()?;
        let reserved = [next()?, next()?];
        let text_jp = next()?;
        let text_en = next()?;

        Ok(CodeLookupEntry {
            code: code.to_owned(),
            icon_file: format!("/{}", icon.trim_start_matches('/')),
            reserved,
            text_jp,
            text_en,
        })
    }

    /// Look up `code`; misses and unreadable tables are logged and yield `None`
    pub fn lookup(&self, code: &str) -> Option<CodeLookupEntry> {
        match self.try_lookup(code) {
            Ok(entry) => {
                debug!("code {} -> {}", code, entry.icon_file);
                Some(entry)
            }
            Err(e @ LookupError::Miss(_)) => {
                debug!("{}", e);
                None
            }
            Err(e) => {
                warn!("lookup of code {} failed: {}", code, e);
                None
            }
        }
    }
}
