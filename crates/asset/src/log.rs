use crate::error::{ErrorKind, Result};
use vista_digest::DigestRow;

/// Append-only, finalize-once list of digest rows.
///
/// The log itself has no locking; the owning document serializes access.
#[derive(Debug, Default)]
pub(crate) struct DigestLog {
    rows: Vec<DigestRow>,
    finalized: bool,
}

/// A point-in-time copy of a digest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestSnapshot {
    pub rows: Vec<DigestRow>,
    pub finalized: bool,
}

impl DigestLog {
    /// Append rows at the end, optionally closing the log.
    ///
    /// Fails without touching the log if it is already finalized, even when
    /// `rows` is empty.
    pub(crate) fn append(&mut self, rows: Vec<DigestRow>, finalize: bool) -> Result<()> {
        if self.finalized {
            exn::bail!(ErrorKind::AlreadyFinalized);
        }
        self.rows.extend(rows);
        self.finalized = finalize;
        Ok(())
    }

    pub(crate) fn snapshot(&self) -> DigestSnapshot {
        DigestSnapshot {
            rows: self.rows.clone(),
            finalized: self.finalized,
        }
    }
}
