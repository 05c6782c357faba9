/// Hex-formats a byte string for trace logging, so a raw key can show up in a log line without
/// assuming it's printable UTF-8.
pub fn hex(bytes: &[u8]) -> String {
	hex::encode(bytes)
}
