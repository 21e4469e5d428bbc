use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{LedgerError, LedgerStore, encode_entries, parse_entries};
use crate::LedgerEntry;
use crate::utils::write_atomically;

/// Ledger stored as one JSON array file. Single writer; no locking.
#[derive(Clone, Debug)]
pub struct JsonFileLedger {
    path: PathBuf,
}

impl JsonFileLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerStore for JsonFileLedger {
    fn read_entries(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => parse_entries(&bytes, &self.path),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(LedgerError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Writes `<ledger>.tmp` and renames it over the ledger.
    fn write_entries(&self, entries: &[LedgerEntry]) -> Result<(), LedgerError> {
        let bytes = encode_entries(entries)?;
        write_atomically(&self.path, &bytes).map_err(|source| LedgerError::Write {
            path: self.path.clone(),
            source,
        })
    }
}
