//! Durable log: the append-only sequence of mutation records, behind one trait shared by the
//! file-backed and embedded-database-backed implementations.

mod file;
mod sqlite;

pub use file::FileLog;
pub use sqlite::SqliteLog;

use crate::error::Result;
use crate::record::MutationRecord;

/// Contract shared by every durability backend. `append` must not return until the record is
/// durable; `replay` yields every previously-acknowledged record, in insertion order, exactly
/// once, and positions the log so that subsequent `append`s continue at the true end.
pub trait DurableLog: Send {
	fn append(&mut self, record: &MutationRecord) -> Result<()>;
	fn replay(&mut self) -> Result<Vec<MutationRecord>>;
}
