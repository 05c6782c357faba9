use parking_lot::Mutex;

use crate::applier;
use crate::error::Result;
use crate::index::Index;
use crate::log::DurableLog;
use crate::record::{Key, MutationRecord, Value};

struct ServerState {
	index: Index,
	log: Box<dyn DurableLog>,
}

/// Single-writer server core. Every operation acquires `state` for its entire duration,
/// including the durable-log append and its fsync — this is the one critical section the whole
/// store serializes through; no per-key locking, no lock-free structures.
///
/// The backend is a trait object rather than a static type parameter because the process
/// chooses file-backed vs. embedded-database logging from a runtime flag, not at compile
/// time.
pub struct Server {
	state: Mutex<ServerState>,
}

impl Server {
	pub fn new(index: Index, log: Box<dyn DurableLog>) -> Self {
		Server { state: Mutex::new(ServerState { index, log }) }
	}

	/// Returns whether `key` was already present.
	pub fn put(&self, key: Key, value: Value) -> Result<bool> {
		let mut state = self.state.lock();
		let prev = state.index.get(&key).is_some();
		let record = MutationRecord::Put { key: key.clone(), value: value.clone() };
		state.log.append(&record)?;
		applier::apply(&mut state.index, &record);
		Ok(prev)
	}

	pub fn get(&self, key: &[u8]) -> Option<Value> {
		let state = self.state.lock();
		state.index.get(key).cloned()
	}

	/// Returns the value `key` held before the swap, if any.
	pub fn swap(&self, key: Key, value: Value) -> Result<Option<Value>> {
		let mut state = self.state.lock();
		let prev = state.index.get(&key).cloned();
		let record = MutationRecord::Swap { key: key.clone(), value: value.clone() };
		state.log.append(&record)?;
		applier::apply(&mut state.index, &record);
		Ok(prev)
	}

	/// Returns whether `key` was present before the delete. Logs the delete even when the key
	/// is already absent.
	pub fn delete(&self, key: Key) -> Result<bool> {
		let mut state = self.state.lock();
		let prev = state.index.get(&key).is_some();
		let record = MutationRecord::Delete { key: key.clone() };
		state.log.append(&record)?;
		applier::apply(&mut state.index, &record);
		Ok(prev)
	}

	pub fn scan(&self, start: &[u8], end: &[u8]) -> Vec<(Key, Value)> {
		let state = self.state.lock();
		state.index.scan_range(start, end)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::log::FileLog;

	fn server() -> (Server, tempfile::TempDir) {
		let dir = tempfile::tempdir().unwrap();
		let log = FileLog::open(dir.path().join("log.bin")).unwrap();
		(Server::new(Index::new(), Box::new(log)), dir)
	}

	#[test]
	fn put_get_swap_delete_round_trip() {
		let (server, _dir) = server();
		assert_eq!(server.put(b"a".to_vec(), b"1".to_vec()).unwrap(), false);
		assert_eq!(server.get(b"a"), Some(b"1".to_vec()));
		assert_eq!(server.swap(b"a".to_vec(), b"2".to_vec()).unwrap(), Some(b"1".to_vec()));
		assert_eq!(server.delete(b"a".to_vec()).unwrap(), true);
		assert_eq!(server.get(b"a"), None);
	}

	#[test]
	fn scan_is_inclusive_on_both_ends() {
		let (server, _dir) = server();
		server.put(b"a".to_vec(), b"1".to_vec()).unwrap();
		server.put(b"c".to_vec(), b"3".to_vec()).unwrap();
		server.put(b"b".to_vec(), b"2".to_vec()).unwrap();

		assert_eq!(
			server.scan(b"a", b"c"),
			vec![(b"a".to_vec(), b"1".to_vec()), (b"b".to_vec(), b"2".to_vec()), (b"c".to_vec(), b"3".to_vec())]
		);
		assert_eq!(server.scan(b"b", b"b"), vec![(b"b".to_vec(), b"2".to_vec())]);
		assert!(server.scan(b"d", b"z").is_empty());
	}

	#[test]
	fn delete_of_absent_key_is_still_logged() {
		let (server, _dir) = server();
		assert_eq!(server.delete(b"missing".to_vec()).unwrap(), false);
		assert_eq!(server.delete(b"missing".to_vec()).unwrap(), false);
	}

	#[test]
	fn put_reply_reflects_pre_image() {
		let (server, _dir) = server();
		server.put(b"a".to_vec(), b"1".to_vec()).unwrap();
		assert_eq!(server.put(b"a".to_vec(), b"2".to_vec()).unwrap(), true);
		assert_eq!(server.get(b"a"), Some(b"2".to_vec()));
	}

	/// Bulk-load a few hundred keys with randomly sized filler values and confirm the index and
	/// a full-range scan agree on every one of them.
	#[test]
	fn bulk_load_is_consistent_with_scan() {
		use rand::Rng;

		let (server, _dir) = server();
		let mut rng = rand::thread_rng();
		let mut expected: Vec<(Key, Value)> = Vec::new();

		for i in 0..300u32 {
			let key = format!("k{:05}", i).into_bytes();
			let size = rng.gen_range(1..64);
			let value: Value = (0..size).map(|_| rng.gen::<u8>()).collect();
			server.put(key.clone(), value.clone()).unwrap();
			expected.push((key, value));
		}
		expected.sort();

		assert_eq!(server.scan(b"k00000", b"k99999"), expected);
		for (key, value) in &expected {
			assert_eq!(server.get(key), Some(value.clone()));
		}
	}
}
