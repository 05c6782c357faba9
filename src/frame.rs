//! Length-prefixed textual framing used by the file-backed durable log.
//!
//! frame := LEN(u32 big-endian) PAYLOAD(LEN bytes, JSON) CRC(u32 little-endian, over PAYLOAD)

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::record::MutationRecord;

/// Payload bytes beyond this size are refused by the writer and treated as corruption by the
/// reader. The two must never drift apart, so they share this one constant.
pub const MAX_FRAME_PAYLOAD: usize = 1024;

#[derive(Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum WireRecord {
	Put {
		#[serde(with = "b64")]
		key: Vec<u8>,
		#[serde(with = "b64")]
		value: Vec<u8>,
	},
	Swap {
		#[serde(with = "b64")]
		key: Vec<u8>,
		#[serde(with = "b64")]
		value: Vec<u8>,
	},
	Delete {
		#[serde(with = "b64")]
		key: Vec<u8>,
	},
}

mod b64 {
	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> std::result::Result<S::Ok, S::Error> {
		s.serialize_str(&base64::encode(bytes))
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Vec<u8>, D::Error> {
		let s = String::deserialize(d)?;
		base64::decode(&s).map_err(serde::de::Error::custom)
	}
}

impl From<&MutationRecord> for WireRecord {
	fn from(r: &MutationRecord) -> Self {
		match r.clone() {
			MutationRecord::Put { key, value } => WireRecord::Put { key, value },
			MutationRecord::Swap { key, value } => WireRecord::Swap { key, value },
			MutationRecord::Delete { key } => WireRecord::Delete { key },
		}
	}
}

impl From<WireRecord> for MutationRecord {
	fn from(r: WireRecord) -> Self {
		match r {
			WireRecord::Put { key, value } => MutationRecord::Put { key, value },
			WireRecord::Swap { key, value } => MutationRecord::Swap { key, value },
			WireRecord::Delete { key } => MutationRecord::Delete { key },
		}
	}
}

/// Encodes one record as `payload` (no length prefix, no checksum — callers that need the full
/// on-disk frame use [`encode_frame`]).
fn encode_payload(record: &MutationRecord) -> Result<Vec<u8>> {
	let wire = WireRecord::from(record);
	let bytes = serde_json::to_vec(&wire).map_err(|e| Error::Corruption(e.to_string()))?;
	if bytes.len() > MAX_FRAME_PAYLOAD {
		return Err(Error::Corruption(format!(
			"encoded record is {} bytes, exceeds the {} byte frame bound",
			bytes.len(),
			MAX_FRAME_PAYLOAD
		)));
	}
	Ok(bytes)
}

/// Encodes a full on-disk frame: 4-byte BE length, payload, 4-byte LE CRC-32 of the payload.
pub fn encode_frame(record: &MutationRecord) -> Result<Vec<u8>> {
	let payload = encode_payload(record)?;
	let mut out = Vec::with_capacity(4 + payload.len() + 4);
	out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
	out.extend_from_slice(&payload);
	out.extend_from_slice(&crc32(&payload).to_le_bytes());
	Ok(out)
}

fn crc32(bytes: &[u8]) -> u32 {
	let mut hasher = Hasher::new();
	hasher.update(bytes);
	hasher.finalize()
}

/// Decodes one payload (already checksum-verified and length-matched by the caller) into a record.
pub fn decode_payload(payload: &[u8]) -> Result<MutationRecord> {
	let wire: WireRecord = serde_json::from_slice(payload).map_err(|e| Error::Corruption(e.to_string()))?;
	Ok(wire.into())
}

pub fn verify_crc(payload: &[u8], expected: u32) -> bool {
	crc32(payload) == expected
}

#[cfg(test)]
mod test {
	use super::*;
	use std::convert::TryInto;

	fn put(k: &str, v: &str) -> MutationRecord {
		MutationRecord::Put { key: k.as_bytes().to_vec(), value: v.as_bytes().to_vec() }
	}

	#[test]
	fn round_trips() {
		for record in [
			put("a", "1"),
			MutationRecord::Swap { key: b"a".to_vec(), value: b"2".to_vec() },
			MutationRecord::Delete { key: b"a".to_vec() },
		] {
			let frame = encode_frame(&record).unwrap();
			let len = u32::from_be_bytes(frame[0..4].try_into().unwrap()) as usize;
			let payload = &frame[4..4 + len];
			let crc = u32::from_le_bytes(frame[4 + len..4 + len + 4].try_into().unwrap());
			assert!(verify_crc(payload, crc));
			assert_eq!(decode_payload(payload).unwrap(), record);
		}
	}

	#[test]
	fn oversized_payload_is_refused_at_encode_time() {
		let huge_value = vec![0u8; MAX_FRAME_PAYLOAD * 2];
		let record = put("a", "x");
		let record = MutationRecord::Put { key: record.key().clone(), value: huge_value };
		assert!(encode_frame(&record).is_err());
	}

	#[test]
	fn bad_crc_is_detected() {
		let frame = encode_frame(&put("a", "1")).unwrap();
		let len = u32::from_be_bytes(frame[0..4].try_into().unwrap()) as usize;
		let payload = &frame[4..4 + len];
		assert!(!verify_crc(payload, 0xDEAD_BEEF));
	}
}
