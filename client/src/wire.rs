use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;

use anyhow::{bail, Context, Result};
use durakv::protocol::{Reply, Request};

/// One TCP connection to a durakv server. Requests are sent one at a time, each followed by a
/// blocking read of its reply — this client never pipelines.
///
/// durakv's wire types are encoded/decoded with `serde_json` directly here rather than through
/// `durakv::protocol::{parse_request,write_reply}`, which are written from the server's point of
/// view and map protocol errors onto `durakv::Error`, not `anyhow::Error`.
pub struct Connection {
	writer: TcpStream,
	reader: BufReader<TcpStream>,
}

impl Connection {
	pub fn connect(addr: &str) -> Result<Self> {
		let stream = TcpStream::connect(addr).with_context(|| format!("connecting to {}", addr))?;
		let reader = BufReader::new(stream.try_clone().context("cloning socket for reading")?);
		Ok(Connection { writer: stream, reader })
	}

	pub fn request(&mut self, request: &Request) -> Result<Reply> {
		let line = serde_json::to_string(request).context("encoding request")?;
		writeln!(self.writer, "{}", line).context("writing request")?;

		let mut response = String::new();
		let n = self.reader.read_line(&mut response).context("reading reply")?;
		if n == 0 {
			bail!("server closed the connection before replying");
		}
		let reply: Reply = serde_json::from_str(response.trim_end()).context("decoding reply")?;
		if let Some(msg) = &reply.error {
			bail!("server error: {}", msg);
		}
		Ok(reply)
	}
}
