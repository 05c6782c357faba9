use anyhow::{Context, Result};
use durakv::protocol::Request;

use crate::wire::Connection;
use crate::Command;

/// Issues a single request built from one command-line invocation and prints its reply.
pub fn run(server: &str, command: Command) -> Result<()> {
	let mut conn = Connection::connect(server).with_context(|| format!("connecting to {}", server))?;

	let request = match &command {
		Command::Put { key, value } => Request::Put { key: key.clone().into_bytes(), value: value.clone().into_bytes() },
		Command::Get { key } => Request::Get { key: key.clone().into_bytes() },
		Command::Swap { key, value } => {
			Request::Swap { key: key.clone().into_bytes(), value: value.clone().into_bytes() }
		}
		Command::Delete { key } => Request::Delete { key: key.clone().into_bytes() },
		Command::Scan { start, end } => {
			Request::Scan { start_key: start.clone().into_bytes(), end_key: end.clone().into_bytes() }
		}
	};

	let reply = conn.request(&request)?;
	print_reply(&command, &reply);
	Ok(())
}

fn print_reply(command: &Command, reply: &durakv::protocol::Reply) {
	match command {
		Command::Put { .. } | Command::Delete { .. } => {
			println!("found: {}", reply.found.unwrap_or(false));
		}
		Command::Get { .. } => match &reply.value {
			Some(v) => println!("found: true, value: {}", String::from_utf8_lossy(v)),
			None => println!("found: false"),
		},
		Command::Swap { .. } => match &reply.old_value {
			Some(v) => println!("found: true, old_value: {}", String::from_utf8_lossy(v)),
			None => println!("found: false"),
		},
		Command::Scan { .. } => {
			for (k, v) in reply.pairs.as_deref().unwrap_or(&[]) {
				println!("{}\t{}", String::from_utf8_lossy(k), String::from_utf8_lossy(v));
			}
		}
	}
}
