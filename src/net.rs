//! Synchronous TCP listener: one thread per connection, all sharing one [`Server`]. Parallelism
//! lives entirely here — the server core itself admits only one active operation at a time.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use ::log::{debug, trace, warn};

use crate::display;
use crate::protocol::{self, Reply, Request};
use crate::server::Server;

pub fn serve(listener: TcpListener, server: Arc<Server>) -> std::io::Result<()> {
	debug!(target: "durakv::net", "listening on {}", listener.local_addr()?);
	for stream in listener.incoming() {
		let stream = match stream {
			Ok(s) => s,
			Err(e) => {
				warn!(target: "durakv::net", "failed to accept connection: {}", e);
				continue;
			}
		};
		let server = Arc::clone(&server);
		thread::spawn(move || handle_connection(stream, server));
	}
	Ok(())
}

fn handle_connection(stream: TcpStream, server: Arc<Server>) {
	let peer = stream.peer_addr().ok();
	trace!(target: "durakv::net", "accepted connection from {:?}", peer);

	let mut writer = match stream.try_clone() {
		Ok(s) => s,
		Err(e) => {
			warn!(target: "durakv::net", "could not clone connection from {:?}: {}", peer, e);
			return;
		}
	};
	let reader = BufReader::new(stream);

	for line in reader.lines() {
		let line = match line {
			Ok(l) => l,
			Err(e) => {
				warn!(target: "durakv::net", "read error from {:?}: {}", peer, e);
				break;
			}
		};
		if line.trim().is_empty() {
			continue;
		}

		let reply = match protocol::parse_request(&line) {
			Ok(req) => dispatch(&server, req),
			Err(e) => Reply::error(e.to_string()),
		};

		let out = match protocol::write_reply(&reply) {
			Ok(s) => s,
			Err(e) => {
				warn!(target: "durakv::net", "failed to encode reply: {}", e);
				continue;
			}
		};
		if let Err(e) = writeln!(writer, "{}", out) {
			warn!(target: "durakv::net", "client at {:?} disconnected before reply delivery: {}", peer, e);
			break;
		}
	}
}

fn dispatch(server: &Server, request: Request) -> Reply {
	match request {
		Request::Put { key, value } => {
			trace!(target: "durakv::net", "put key={}", display::hex(&key));
			match server.put(key, value) {
				Ok(found) => Reply::found(found),
				Err(e) => Reply::error(e.to_string()),
			}
		}
		Request::Get { key } => Reply::get_result(server.get(&key)),
		Request::Swap { key, value } => match server.swap(key, value) {
			Ok(old) => Reply::swap_result(old),
			Err(e) => Reply::error(e.to_string()),
		},
		Request::Delete { key } => match server.delete(key) {
			Ok(found) => Reply::found(found),
			Err(e) => Reply::error(e.to_string()),
		},
		Request::Scan { start_key, end_key } => Reply::pairs(server.scan(&start_key, &end_key)),
	}
}
