//! Resume ledger: the persisted list of completed items, used to skip work on re-runs.
//!
//! Storage sits behind [`LedgerStore`]. Backends only read and write whole entry lists; the
//! fail-open load and fail-closed merge live in the provided methods so every backend
//! behaves the same.

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileLedger;
pub use memory::MemoryLedger;

use log::{info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::LedgerEntry;
use crate::utils::Colors;

/// Inputs already processed, keyed by input path.
pub type SeenSet = HashSet<PathBuf>;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to read ledger {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to decode ledger {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to encode ledger: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write ledger {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Persistence port for the ledger.
pub trait LedgerStore {
    /// Every stored entry. A ledger that does not exist yet is empty, not an error.
    fn read_entries(&self) -> Result<Vec<LedgerEntry>, LedgerError>;

    /// Replace the stored entries with `entries`.
    fn write_entries(&self, entries: &[LedgerEntry]) -> Result<(), LedgerError>;

    /// Input paths already recorded. Fails open: an unreadable ledger yields an empty set,
    /// so everything is reprocessed rather than the run being blocked.
    fn load_seen(&self) -> SeenSet {
        match self.read_entries() {
            Ok(entries) => entries.into_iter().map(|e| e.input_path).collect(),
            Err(e) => {
                warn!("{e}; treating every input as unprocessed");
                SeenSet::new()
            }
        }
    }

    /// Read the stored entries, append `new_entries`, write the whole list back.
    /// Returns the new total. Fails closed: if the existing ledger cannot be read nothing is
    /// written, so a damaged ledger is never replaced by this run's entries alone.
    fn merge_and_persist(&self, new_entries: &[LedgerEntry]) -> Result<usize, LedgerError> {
        let mut entries = self.read_entries()?;
        entries.extend_from_slice(new_entries);
        self.write_entries(&entries)?;
        Ok(entries.len())
    }
}

/// Drop inputs already in `seen`, keeping the order of the rest.
pub fn filter_unseen(inputs: Vec<PathBuf>, seen: &SeenSet) -> Vec<PathBuf> {
    inputs
        .into_iter()
        .filter(|p| {
            let unseen = !seen.contains(p);
            if !unseen {
                info!(
                    "{} {} already processed",
                    Colors::colorize(Colors::SKIPPED, "Skipped!"),
                    p.display()
                );
            }
            unseen
        })
        .collect()
}

/// Parse ledger text. Blank content and JSON `null` are an empty ledger.
pub fn parse_entries(bytes: &[u8], origin: &Path) -> Result<Vec<LedgerEntry>, LedgerError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    serde_json::from_slice::<Option<Vec<LedgerEntry>>>(bytes)
        .map(Option::unwrap_or_default)
        .map_err(|source| LedgerError::Decode {
            path: origin.to_path_buf(),
            source,
        })
}

/// Serialize entries as a pretty-printed JSON array.
pub fn encode_entries(entries: &[LedgerEntry]) -> Result<Vec<u8>, LedgerError> {
    let mut bytes = serde_json::to_vec_pretty(entries)?;
    bytes.push(b'\n');
    Ok(bytes)
}
