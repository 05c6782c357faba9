use crate::index::Index;
use crate::record::MutationRecord;

/// Applies a decoded record to the index. Used both during recovery replay and, for the live
/// path, after the server core has already captured the pre-image value it needs for its reply.
pub fn apply(index: &mut Index, record: &MutationRecord) {
	match record {
		MutationRecord::Put { key, value } | MutationRecord::Swap { key, value } => {
			index.upsert(key.clone(), value.clone());
		}
		MutationRecord::Delete { key } => {
			index.remove(key);
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn put_and_swap_both_upsert() {
		let mut idx = Index::new();
		apply(&mut idx, &MutationRecord::Put { key: b"a".to_vec(), value: b"1".to_vec() });
		assert_eq!(idx.get(b"a"), Some(&b"1".to_vec()));
		apply(&mut idx, &MutationRecord::Swap { key: b"a".to_vec(), value: b"2".to_vec() });
		assert_eq!(idx.get(b"a"), Some(&b"2".to_vec()));
	}

	#[test]
	fn delete_removes() {
		let mut idx = Index::new();
		apply(&mut idx, &MutationRecord::Put { key: b"a".to_vec(), value: b"1".to_vec() });
		apply(&mut idx, &MutationRecord::Delete { key: b"a".to_vec() });
		assert_eq!(idx.get(b"a"), None);
	}

	#[test]
	fn delete_of_absent_key_is_a_no_op() {
		let mut idx = Index::new();
		apply(&mut idx, &MutationRecord::Delete { key: b"missing".to_vec() });
		assert_eq!(idx.get(b"missing"), None);
	}
}
