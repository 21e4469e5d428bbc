//! In-memory ledger for tests and embedding. Holds the same JSON text a file would.

use std::path::Path;
use std::sync::Mutex;

use super::{LedgerError, LedgerStore, encode_entries, parse_entries};
use crate::LedgerEntry;

const ORIGIN: &str = "<memory>";

/// `None` contents behave like a ledger file that does not exist yet.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    contents: Mutex<Option<Vec<u8>>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from raw text, e.g. a corrupted ledger.
    pub fn with_contents(text: impl Into<Vec<u8>>) -> Self {
        Self {
            contents: Mutex::new(Some(text.into())),
        }
    }

    pub fn with_entries(entries: &[LedgerEntry]) -> Result<Self, LedgerError> {
        Ok(Self::with_contents(encode_entries(entries)?))
    }

    /// Current raw contents, `None` if never written.
    pub fn contents(&self) -> Option<Vec<u8>> {
        self.contents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl LedgerStore for MemoryLedger {
    fn read_entries(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        match self.contents() {
            Some(bytes) => parse_entries(&bytes, Path::new(ORIGIN)),
            None => Ok(Vec::new()),
        }
    }

    fn write_entries(&self, entries: &[LedgerEntry]) -> Result<(), LedgerError> {
        let bytes = encode_entries(entries)?;
        *self
            .contents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(bytes);
        Ok(())
    }
}
