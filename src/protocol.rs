//! Newline-delimited JSON wire protocol. One request or reply per line; keys and values are
//! base64-encoded so arbitrary byte strings survive the JSON envelope unreinterpreted.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::record::{Key, Value};

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Request {
	Put {
		#[serde(with = "b64")]
		key: Key,
		#[serde(with = "b64")]
		value: Value,
	},
	Get {
		#[serde(with = "b64")]
		key: Key,
	},
	Swap {
		#[serde(with = "b64")]
		key: Key,
		#[serde(with = "b64")]
		value: Value,
	},
	Delete {
		#[serde(with = "b64")]
		key: Key,
	},
	Scan {
		#[serde(with = "b64")]
		start_key: Key,
		#[serde(with = "b64")]
		end_key: Key,
	},
}

/// One reply line. Every RPC maps onto a subset of these fields; unused fields are simply
/// omitted rather than modeled as a tagged union, since the client already knows which request
/// it sent and therefore which fields to expect.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Reply {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub found: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none", default, with = "b64_opt")]
	pub value: Option<Value>,
	#[serde(skip_serializing_if = "Option::is_none", default, with = "b64_opt")]
	pub old_value: Option<Value>,
	#[serde(skip_serializing_if = "Option::is_none", default, with = "b64_pairs_opt")]
	pub pairs: Option<Vec<(Key, Value)>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

impl Reply {
	pub fn found(found: bool) -> Self {
		Reply { found: Some(found), ..Default::default() }
	}

	pub fn get_result(value: Option<Value>) -> Self {
		Reply { found: Some(value.is_some()), value, ..Default::default() }
	}

	pub fn swap_result(old_value: Option<Value>) -> Self {
		Reply { found: Some(old_value.is_some()), old_value, ..Default::default() }
	}

	pub fn pairs(pairs: Vec<(Key, Value)>) -> Self {
		Reply { pairs: Some(pairs), ..Default::default() }
	}

	pub fn error(message: impl Into<String>) -> Self {
		Reply { error: Some(message.into()), ..Default::default() }
	}
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

mod b64_opt {
	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer>(bytes: &Option<Vec<u8>>, s: S) -> std::result::Result<S::Ok, S::Error> {
		match bytes {
			Some(b) => s.serialize_str(&base64::encode(b)),
			None => s.serialize_none(),
		}
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<Vec<u8>>, D::Error> {
		let s: Option<String> = Option::deserialize(d)?;
		match s {
			Some(s) => base64::decode(&s).map(Some).map_err(serde::de::Error::custom),
			None => Ok(None),
		}
	}
}

mod b64_pairs_opt {
	use serde::{Deserialize, Deserializer, Serialize, Serializer};

	#[derive(Serialize, Deserialize)]
	struct Pair {
		key: String,
		value: String,
	}

	pub fn serialize<S: Serializer>(
		pairs: &Option<Vec<(Vec<u8>, Vec<u8>)>>,
		s: S,
	) -> std::result::Result<S::Ok, S::Error> {
		match pairs {
			Some(pairs) => {
				let encoded: Vec<Pair> = pairs
					.iter()
					.map(|(k, v)| Pair { key: base64::encode(k), value: base64::encode(v) })
					.collect();
				s.collect_seq(encoded)
			}
			None => s.serialize_none(),
		}
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(
		d: D,
	) -> std::result::Result<Option<Vec<(Vec<u8>, Vec<u8>)>>, D::Error> {
		let encoded: Option<Vec<Pair>> = Option::deserialize(d)?;
		match encoded {
			Some(encoded) => {
				let pairs = encoded
					.into_iter()
					.map(|p| {
						let key = base64::decode(&p.key).map_err(serde::de::Error::custom)?;
						let value = base64::decode(&p.value).map_err(serde::de::Error::custom)?;
						Ok((key, value))
					})
					.collect::<std::result::Result<Vec<_>, D::Error>>()?;
				Ok(Some(pairs))
			}
			None => Ok(None),
		}
	}
}

/// Parses one line of the wire protocol into a [`Request`].
pub fn parse_request(line: &str) -> Result<Request> {
	serde_json::from_str(line).map_err(|e| Error::Protocol(e.to_string()))
}

/// Serializes a [`Reply`] to one line (without the trailing newline).
pub fn write_reply(reply: &Reply) -> Result<String> {
	serde_json::to_string(reply).map_err(|e| Error::Protocol(e.to_string()))
}
