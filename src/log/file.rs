use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use ::log::{debug, trace, warn};

use super::DurableLog;
use crate::error::{Error, Result};
use crate::frame::{self, MAX_FRAME_PAYLOAD};
use crate::record::MutationRecord;

/// File-backed durable log: a concatenation of length-prefixed, checksummed frames (see
/// [`crate::frame`]). `replay` tolerates exactly one trailing truncated frame (a crash mid-append)
/// by truncating the file back to the last complete frame boundary.
pub struct FileLog {
	path: PathBuf,
	file: File,
}

impl FileLog {
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref().to_path_buf();
		let file = OpenOptions::new().read(true).write(true).create(true).open(&path)?;
		debug!(target: "durakv::log", "opened file-backed log at {}", path.display());
		Ok(FileLog { path, file })
	}

	fn read_frame_header(&mut self) -> Result<Option<(usize, u64)>> {
		let pos = self.file.stream_position()?;
		let mut len_buf = [0u8; 4];
		match self.file.read_exact(&mut len_buf) {
			Ok(()) => {}
			Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
			Err(e) => return Err(Error::Io(e)),
		}
		let len = u32::from_be_bytes(len_buf) as usize;
		Ok(Some((len, pos)))
	}
}

impl DurableLog for FileLog {
	fn append(&mut self, record: &MutationRecord) -> Result<()> {
		let frame = frame::encode_frame(record)?;
		self.file.seek(SeekFrom::End(0))?;
		self.file.write_all(&frame)?;
		self.file.flush()?;
		self.file.sync_data()?;
		trace!(target: "durakv::log", "appended {} byte frame", frame.len());
		Ok(())
	}

	fn replay(&mut self) -> Result<Vec<MutationRecord>> {
		self.file.seek(SeekFrom::Start(0))?;
		let mut records = Vec::new();
		let mut valid_end: u64 = 0;

		loop {
			let (len, frame_start) = match self.read_frame_header()? {
				Some(h) => h,
				None => break,
			};

			if len > MAX_FRAME_PAYLOAD {
				return Err(Error::Corruption(format!(
					"frame at offset {} claims {} bytes, exceeds the {} byte bound",
					frame_start, len, MAX_FRAME_PAYLOAD
				)));
			}

			let mut payload = vec![0u8; len];
			if let Err(e) = self.file.read_exact(&mut payload) {
				if e.kind() == std::io::ErrorKind::UnexpectedEof {
					warn!(target: "durakv::log", "truncating trailing partial frame at offset {}", frame_start);
					break;
				}
				return Err(Error::Io(e));
			}

			let mut crc_buf = [0u8; 4];
			if let Err(e) = self.file.read_exact(&mut crc_buf) {
				if e.kind() == std::io::ErrorKind::UnexpectedEof {
					warn!(target: "durakv::log", "truncating trailing partial frame at offset {}", frame_start);
					break;
				}
				return Err(Error::Io(e));
			}
			let crc = u32::from_le_bytes(crc_buf);
			if !frame::verify_crc(&payload, crc) {
				return Err(Error::Corruption(format!("checksum mismatch at offset {}", frame_start)));
			}

			let record = frame::decode_payload(&payload)?;
			records.push(record);
			valid_end = self.file.stream_position()?;
		}

		self.file.set_len(valid_end)?;
		self.file.seek(SeekFrom::Start(valid_end))?;
		debug!(target: "durakv::log", "replayed {} record(s) from {}", records.len(), self.path.display());
		Ok(records)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use std::io::Write as _;

	fn put(k: &str, v: &str) -> MutationRecord {
		MutationRecord::Put { key: k.as_bytes().to_vec(), value: v.as_bytes().to_vec() }
	}

	#[test]
	fn append_then_replay_round_trips() {
		let _ = env_logger::try_init();
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("log.bin");

		let mut log = FileLog::open(&path).unwrap();
		log.append(&put("a", "1")).unwrap();
		log.append(&MutationRecord::Delete { key: b"a".to_vec() }).unwrap();

		let mut log = FileLog::open(&path).unwrap();
		let records = log.replay().unwrap();
		assert_eq!(records, vec![put("a", "1"), MutationRecord::Delete { key: b"a".to_vec() }]);
	}

	#[test]
	fn trailing_partial_frame_is_truncated_and_ignored() {
		let _ = env_logger::try_init();
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("log.bin");

		{
			let mut log = FileLog::open(&path).unwrap();
			log.append(&put("x", "1")).unwrap();
		}
		{
			let mut file = OpenOptions::new().append(true).open(&path).unwrap();
			file.write_all(&10u32.to_be_bytes()).unwrap();
			file.write_all(&[1, 2, 3]).unwrap();
			file.flush().unwrap();
		}

		let mut log = FileLog::open(&path).unwrap();
		let records = log.replay().unwrap();
		assert_eq!(records, vec![put("x", "1")]);

		log.append(&put("y", "2")).unwrap();
		let mut log = FileLog::open(&path).unwrap();
		let records = log.replay().unwrap();
		assert_eq!(records, vec![put("x", "1"), put("y", "2")]);
	}

	#[test]
	fn oversized_frame_header_aborts_recovery() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("log.bin");
		{
			let mut file = OpenOptions::new().create(true).write(true).open(&path).unwrap();
			file.write_all(&((MAX_FRAME_PAYLOAD as u32) + 1).to_be_bytes()).unwrap();
			file.write_all(&vec![0u8; MAX_FRAME_PAYLOAD + 1]).unwrap();
		}
		let mut log = FileLog::open(&path).unwrap();
		assert!(log.replay().is_err());
	}
}
