use anyhow::{Context, Result};
use durakv::protocol::Request;
use rustyline::error::ReadlineError;
use rustyline::Editor;

use crate::wire::Connection;

pub fn run(server: &str) -> Result<()> {
	let mut conn = Connection::connect(server).with_context(|| format!("connecting to {}", server))?;

	println!("durakv client");
	println!("Server: {}", server);
	println!("Type .help for help, .exit to quit\n");

	let mut rl = Editor::<()>::new();

	loop {
		let readline = rl.readline("durakv> ");
		match readline {
			Ok(line) => {
				let trimmed = line.trim();
				if trimmed.is_empty() {
					continue;
				}
				rl.add_history_entry(trimmed);

				if trimmed == ".exit" || trimmed == ".quit" {
					println!("Goodbye!");
					break;
				}
				if trimmed == ".help" {
					print_help();
					continue;
				}

				match run_line(&mut conn, trimmed) {
					Ok(output) => println!("{}", output),
					Err(e) => eprintln!("Error: {}", e),
				}
			}
			Err(ReadlineError::Interrupted) => {
				println!("^C");
				continue;
			}
			Err(ReadlineError::Eof) => {
				println!("Goodbye!");
				break;
			}
			Err(err) => {
				eprintln!("Error: {:?}", err);
				break;
			}
		}
	}

	Ok(())
}

fn print_help() {
	println!("Commands:");
	println!("  put <key> <value>");
	println!("  get <key>");
	println!("  swap <key> <value>");
	println!("  delete <key>");
	println!("  scan <start> <end>");
	println!("  .help            Show this help");
	println!("  .exit            Exit the shell");
}

fn run_line(conn: &mut Connection, line: &str) -> Result<String> {
	let parts: Vec<&str> = line.split_whitespace().collect();
	let (op, args) = parts.split_first().context("empty command")?;

	let request = match (op.to_ascii_lowercase().as_str(), args) {
		("put", [key, value]) => Request::Put { key: key.as_bytes().to_vec(), value: value.as_bytes().to_vec() },
		("get", [key]) => Request::Get { key: key.as_bytes().to_vec() },
		("swap", [key, value]) => Request::Swap { key: key.as_bytes().to_vec(), value: value.as_bytes().to_vec() },
		("delete", [key]) => Request::Delete { key: key.as_bytes().to_vec() },
		("scan", [start, end]) => Request::Scan { start_key: start.as_bytes().to_vec(), end_key: end.as_bytes().to_vec() },
		(other, _) => anyhow::bail!("unknown command or wrong argument count: {}", other),
	};

	let reply = conn.request(&request)?;
	Ok(format_reply(&request, &reply))
}

fn format_reply(request: &Request, reply: &durakv::protocol::Reply) -> String {
	match request {
		Request::Put { .. } | Request::Delete { .. } => format!("found: {}", reply.found.unwrap_or(false)),
		Request::Get { .. } => match &reply.value {
			Some(v) => format!("found: true, value: {}", String::from_utf8_lossy(v)),
			None => "found: false".to_string(),
		},
		Request::Swap { .. } => match &reply.old_value {
			Some(v) => format!("found: true, old_value: {}", String::from_utf8_lossy(v)),
			None => "found: false".to_string(),
		},
		Request::Scan { .. } => reply
			.pairs
			.as_deref()
			.unwrap_or(&[])
			.iter()
			.map(|(k, v)| format!("{}\t{}", String::from_utf8_lossy(k), String::from_utf8_lossy(v)))
			.collect::<Vec<_>>()
			.join("\n"),
	}
}
