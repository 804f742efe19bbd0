use log::error;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::transaction::LedgerEntry;

/// Append/remove operations on a stored transaction list.
///
/// Every operation returns a new list and leaves the caller's list intact,
/// so a failed save can simply discard the result.
pub struct LedgerService;

impl LedgerService {
    pub fn new() -> Self {
        Self
    }

    /// Append `entry` to the end of `log`.
    pub fn add_entry<T: LedgerEntry>(&self, log: &[T], entry: T) -> Vec<T> {
        let mut next = Vec::with_capacity(log.len() + 1);
        next.extend_from_slice(log);
        next.push(entry);
        next
    }

    /// Remove the entry at storage position `index` (insertion order).
    pub fn delete_entry<T: LedgerEntry>(&self, log: &[T], index: usize) -> Result<Vec<T>, CoreError> {
        if index >= log.len() {
            error!(
                "delete index {index} out of range for ledger of {} entries",
                log.len()
            );
            return Err(CoreError::IndexOutOfRange {
                index,
                len: log.len(),
            });
        }
        let mut next = log.to_vec();
        next.remove(index);
        Ok(next)
    }

    /// Map a row of the newest-first display back to its storage position.
    pub fn display_to_storage_index(&self, len: usize, display_index: usize) -> Result<usize, CoreError> {
        if display_index >= len {
            error!("display index {display_index} out of range for {len} rows");
            return Err(CoreError::IndexOutOfRange {
                index: display_index,
                len,
            });
        }
        Ok(len - 1 - display_index)
    }

    /// The entry shown at `display_index` in the newest-first list.
    pub fn displayed_entry<'a, T>(&self, log: &'a [T], display_index: usize) -> Result<&'a T, CoreError> {
        let index = self.display_to_storage_index(log.len(), display_index)?;
        Ok(&log[index])
    }

    /// Remove the entry shown at `display_index` in the newest-first list.
    pub fn delete_displayed<T: LedgerEntry>(
        &self,
        log: &[T],
        display_index: usize,
    ) -> Result<Vec<T>, CoreError> {
        let index = self.display_to_storage_index(log.len(), display_index)?;
        self.delete_entry(log, index)
    }

    /// Remove the entry with the given id, independent of any ordering.
    pub fn delete_by_id<T: LedgerEntry>(&self, log: &[T], id: Uuid) -> Result<Vec<T>, CoreError> {
        let index = log
            .iter()
            .position(|e| e.id() == id)
            .ok_or_else(|| CoreError::TransactionNotFound(id.to_string()))?;
        self.delete_entry(log, index)
    }

    /// Newest-first view of a list stored in insertion order.
    pub fn display_order<'a, T>(&self, log: &'a [T]) -> Vec<&'a T> {
        log.iter().rev().collect()
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new()
    }
}
