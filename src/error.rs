use std::fmt;
use std::io;

/// Every failure this crate returns, from the storage layer up through the wire protocol.
#[derive(Debug)]
pub enum Error {
	Io(io::Error),
	Sqlite(rusqlite::Error),
	/// A frame or row failed to decode: unknown opcode, oversized frame, bad bincode.
	Corruption(String),
	/// A malformed or unrecognized wire request.
	Protocol(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Error::Io(e) => write!(f, "i/o error: {}", e),
			Error::Sqlite(e) => write!(f, "sqlite error: {}", e),
			Error::Corruption(msg) => write!(f, "corrupt record: {}", msg),
			Error::Protocol(msg) => write!(f, "protocol error: {}", msg),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::Io(e) => Some(e),
			Error::Sqlite(e) => Some(e),
			Error::Corruption(_) | Error::Protocol(_) => None,
		}
	}
}

impl From<io::Error> for Error {
	fn from(e: io::Error) -> Self {
		Error::Io(e)
	}
}

impl From<rusqlite::Error> for Error {
	fn from(e: rusqlite::Error) -> Self {
		Error::Sqlite(e)
	}
}
