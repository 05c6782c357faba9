use serde::{Deserialize, Serialize};

pub type Key = Vec<u8>;
pub type Value = Vec<u8>;

/// One durably-logged mutation. `Put` and `Swap` have identical effect on the index
/// (insert-or-replace); they are kept distinct here purely for traceability in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationRecord {
	Put { key: Key, value: Value },
	Swap { key: Key, value: Value },
	Delete { key: Key },
}

impl MutationRecord {
	pub fn key(&self) -> &Key {
		match self {
			MutationRecord::Put { key, .. } => key,
			MutationRecord::Swap { key, .. } => key,
			MutationRecord::Delete { key } => key,
		}
	}
}
