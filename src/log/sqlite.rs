use std::path::Path;

use ::log::debug;
use rusqlite::{params, Connection};

use super::DurableLog;
use crate::error::{Error, Result};
use crate::record::MutationRecord;

/// Embedded-relational-database durable log: one SQLite table (`commands`) with a monotonic
/// integer primary key and a bincode-encoded payload column. Every insert commits with a full
/// fsync (`synchronous = FULL`, `journal_mode = DELETE`), matching the file-backed log's
/// append-then-fsync discipline.
pub struct SqliteLog {
	conn: Connection,
}

impl SqliteLog {
	pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
		std::fs::create_dir_all(dir.as_ref())?;
		let db_path = dir.as_ref().join("commands.db");
		let conn = Connection::open(&db_path)?;
		conn.execute_batch(
			"PRAGMA synchronous = FULL;
			 PRAGMA journal_mode = DELETE;
			 CREATE TABLE IF NOT EXISTS commands (
			     id      INTEGER PRIMARY KEY AUTOINCREMENT,
			     payload BLOB NOT NULL
			 );",
		)?;
		debug!(target: "durakv::log", "opened sqlite-backed log at {}", db_path.display());
		Ok(SqliteLog { conn })
	}
}

impl DurableLog for SqliteLog {
	fn append(&mut self, record: &MutationRecord) -> Result<()> {
		let payload = bincode::serialize(record).map_err(|e| Error::Corruption(e.to_string()))?;
		self.conn.execute("INSERT INTO commands (payload) VALUES (?1)", params![payload])?;
		Ok(())
	}

	fn replay(&mut self) -> Result<Vec<MutationRecord>> {
		let mut stmt = self.conn.prepare("SELECT payload FROM commands ORDER BY id ASC")?;
		let rows = stmt.query_map(params![], |row| row.get::<_, Vec<u8>>(0))?;

		let mut records = Vec::new();
		for row in rows {
			let payload = row?;
			let record: MutationRecord =
				bincode::deserialize(&payload).map_err(|e| Error::Corruption(e.to_string()))?;
			records.push(record);
		}
		debug!(target: "durakv::log", "replayed {} record(s) from sqlite log", records.len());
		Ok(records)
	}
}
